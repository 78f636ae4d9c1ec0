//! Identifier renames that adapt server-dialect bodies to the embedded engine.
//!
//! A rename replaces a bare word (e.g. `SYSDATE` becomes `CURRENT_TIMESTAMP`)
//! in code segments only. Qualified names such as `t.sysdate` are column
//! references and are left alone.

use crate::lexical::{segments, SegmentKind};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

/// Apply `renames` to `sql`.
///
/// Returns `None` when nothing matched, so callers can tell an unchanged body
/// from a rewritten one.
pub fn apply_renames(sql: &str, renames: &BTreeMap<String, String>) -> Option<String> {
    if renames.is_empty() {
        return None;
    }
    let compiled: Vec<(Regex, &str)> = renames
        .iter()
        .filter_map(|(from, to)| {
            RegexBuilder::new(&format!(r"\b{}\b", regex::escape(from)))
                .case_insensitive(true)
                .build()
                .ok()
                .map(|re| (re, to.as_str()))
        })
        .collect();

    let mut changed = false;
    let mut out = String::with_capacity(sql.len());
    for seg in segments(sql) {
        if seg.kind != SegmentKind::Code {
            out.push_str(seg.text);
            continue;
        }
        let mut text = seg.text.to_string();
        for (re, to) in &compiled {
            if let Some(replaced) = replace_unqualified(&text, re, to) {
                text = replaced;
                changed = true;
            }
        }
        out.push_str(&text);
    }
    changed.then_some(out)
}

fn replace_unqualified(text: &str, re: &Regex, to: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut hit = false;
    for m in re.find_iter(text) {
        let before = text[..m.start()].trim_end();
        let after = text[m.end()..].trim_start();
        if before.ends_with('.') || after.starts_with('.') {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(to);
        last = m.end();
        hit = true;
    }
    if !hit {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

#[cfg(test)]
#[path = "rewrite_test.rs"]
mod tests;
