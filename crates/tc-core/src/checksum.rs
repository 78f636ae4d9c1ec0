//! SHA-256 checksum utilities for change detection.

use crate::check::Check;
use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Hash a list of items by hashing each one and then hashing the
/// concatenation of the item digests.
pub fn hash_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(compute_checksum(item.as_ref()).as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Checksum of a whole catalog.
///
/// Rows are sorted by id first, so two catalogs with the same checks in a
/// different order hash identically. Within a row the field order is fixed
/// by [`Check::checksum_fields`].
pub fn catalog_checksum(checks: &[Check]) -> String {
    let mut rows: Vec<&Check> = checks.iter().collect();
    rows.sort_by_key(|c| c.id);
    hash_list(rows.iter().map(|c| hash_list(c.checksum_fields())))
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
