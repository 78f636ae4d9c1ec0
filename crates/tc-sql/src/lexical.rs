//! Splitting SQL text into code, string literals, quoted identifiers, and
//! comments.
//!
//! Dialect scans and rewrites only look at code; placeholders are also
//! substituted inside string literals. Quoted identifiers and comments are
//! never touched, so a quote character inside a comment opens nothing.

/// Kind of a lexical segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Ordinary SQL text
    Code,
    /// Single-quoted string literal, delimiters included
    Literal,
    /// Double-quoted identifier, delimiters included
    Identifier,
    /// `-- ...` up to and including the newline, or `/* ... */`
    Comment,
}

/// A contiguous slice of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

/// Split `sql` into segments. Concatenating the segment texts yields `sql`.
///
/// Doubled quotes inside a literal or identifier are escapes. An
/// unterminated literal runs to the end of the input.
pub fn segments(sql: &str) -> Vec<Segment<'_>> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let (kind, end) = match (bytes[i], bytes.get(i + 1).copied()) {
            (b'\'', _) => (SegmentKind::Literal, quoted_end(bytes, i)),
            (b'"', _) => (SegmentKind::Identifier, quoted_end(bytes, i)),
            (b'-', Some(b'-')) => (SegmentKind::Comment, line_comment_end(bytes, i)),
            (b'/', Some(b'*')) => (SegmentKind::Comment, block_comment_end(bytes, i)),
            _ => {
                i += 1;
                continue;
            }
        };
        if start < i {
            out.push(Segment {
                kind: SegmentKind::Code,
                text: &sql[start..i],
            });
        }
        out.push(Segment {
            kind,
            text: &sql[i..end],
        });
        i = end;
        start = end;
    }

    if start < bytes.len() {
        out.push(Segment {
            kind: SegmentKind::Code,
            text: &sql[start..],
        });
    }
    out
}

/// End (exclusive) of the quoted run opening at `open`.
fn quoted_end(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn line_comment_end(bytes: &[u8], open: usize) -> usize {
    bytes[open..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |nl| open + nl + 1)
}

fn block_comment_end(bytes: &[u8], open: usize) -> usize {
    bytes[open + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |close| open + 2 + close + 2)
}

/// `sql` with every literal, quoted identifier, and comment blanked to
/// spaces.
///
/// Byte offsets are preserved, so positions found in the result are valid in
/// the input.
pub fn code_only(sql: &str) -> String {
    segments(sql)
        .into_iter()
        .map(|seg| match seg.kind {
            SegmentKind::Code => seg.text.to_string(),
            _ => " ".repeat(seg.text.len()),
        })
        .collect()
}

#[cfg(test)]
#[path = "lexical_test.rs"]
mod tests;
