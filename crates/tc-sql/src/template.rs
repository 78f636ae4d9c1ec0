//! Named placeholder substitution for check bodies.
//!
//! Check bodies refer to run parameters as `:trip_id`, `:check_id` (also
//! spelled `:trip_check_id`), `:created_by`, and `:created_date`. Outside
//! string literals a placeholder becomes a SQL literal: integers bare, the
//! run version single-quoted. Inside a literal the raw value is spliced, so
//! `'Run :created_date'` reads naturally. Comments, unknown names, and
//! `::type` casts are left as-is.

use crate::lexical::{segments, SegmentKind};
use regex::Regex;
use std::sync::OnceLock;

/// Parameters a check body may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    TripId,
    CheckId,
    CreatedBy,
    CreatedDate,
}

impl Placeholder {
    /// Resolve a placeholder name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "trip_id" => Some(Placeholder::TripId),
            "check_id" | "trip_check_id" => Some(Placeholder::CheckId),
            "created_by" => Some(Placeholder::CreatedBy),
            "created_date" => Some(Placeholder::CreatedDate),
            _ => None,
        }
    }
}

/// Values bound for one execution of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckParameters {
    pub trip_id: i64,
    pub check_id: i64,
    pub created_by: i64,
    pub created_date: String,
}

impl CheckParameters {
    fn raw(&self, placeholder: Placeholder) -> String {
        match placeholder {
            Placeholder::TripId => self.trip_id.to_string(),
            Placeholder::CheckId => self.check_id.to_string(),
            Placeholder::CreatedBy => self.created_by.to_string(),
            Placeholder::CreatedDate => self.created_date.clone(),
        }
    }

    fn literal(&self, placeholder: Placeholder) -> String {
        match placeholder {
            Placeholder::CreatedDate => format!("'{}'", self.created_date.replace('\'', "''")),
            other => self.raw(other),
        }
    }
}

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"))
}

/// Substitute every known placeholder in `sql`.
pub fn render(sql: &str, params: &CheckParameters) -> String {
    let mut out = String::with_capacity(sql.len() + 32);
    for seg in segments(sql) {
        match seg.kind {
            SegmentKind::Code => substitute(seg.text, &mut out, |p| params.literal(p)),
            SegmentKind::Literal => substitute(seg.text, &mut out, |p| params.raw(p)),
            SegmentKind::Identifier | SegmentKind::Comment => out.push_str(seg.text),
        }
    }
    out
}

/// Placeholders referenced anywhere in `sql`, in order of appearance.
pub fn placeholders(sql: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    for seg in segments(sql) {
        if matches!(seg.kind, SegmentKind::Identifier | SegmentKind::Comment) {
            continue;
        }
        for (_, _, p) in matches(seg.text) {
            if !found.contains(&p) {
                found.push(p);
            }
        }
    }
    found
}

fn matches(text: &str) -> impl Iterator<Item = (usize, usize, Placeholder)> + '_ {
    placeholder_re().captures_iter(text).filter_map(move |caps| {
        let whole = caps.get(0)?;
        if text[..whole.start()].ends_with(':') {
            return None;
        }
        let placeholder = Placeholder::from_name(caps.get(1)?.as_str())?;
        Some((whole.start(), whole.end(), placeholder))
    })
}

fn substitute(text: &str, out: &mut String, value: impl Fn(Placeholder) -> String) {
    let mut last = 0;
    for (start, end, placeholder) in matches(text) {
        out.push_str(&text[last..start]);
        out.push_str(&value(placeholder));
        last = end;
    }
    out.push_str(&text[last..]);
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
