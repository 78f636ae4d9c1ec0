//! Dialect compatibility scans over a check body.
//!
//! Check bodies target a server dialect and frequently do not parse with any
//! sqlparser dialect, so scanning works on the token stream rather than the
//! AST. If even tokenizing fails, a text scan over the code segments is used.

use crate::error::{SqlError, SqlResult};
use crate::lexical::code_only;
use regex::Regex;
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::sync::OnceLock;

static HAVING_RE: OnceLock<Regex> = OnceLock::new();
static GROUP_BY_RE: OnceLock<Regex> = OnceLock::new();
static WORD_RE: OnceLock<Regex> = OnceLock::new();

fn having_re() -> &'static Regex {
    HAVING_RE.get_or_init(|| Regex::new(r"\bHAVING\b").expect("valid regex"))
}

fn group_by_re() -> &'static Regex {
    GROUP_BY_RE.get_or_init(|| Regex::new(r"\bGROUP\s+BY\b").expect("valid regex"))
}

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_$#]*").expect("valid regex"))
}

/// Significant tokens of a check body, whitespace and comments removed
pub fn tokenize(sql: &str) -> SqlResult<Vec<Token>> {
    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(|e| SqlError::TokenizeError(e.to_string()))?;
    Ok(tokens
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_)))
        .collect())
}

/// Scanner over a single check body.
#[derive(Debug)]
pub struct SqlScan {
    source: Source,
}

#[derive(Debug)]
enum Source {
    Tokens(Vec<Token>),
    /// Upper-cased code with literals blanked out
    Text(String),
}

impl SqlScan {
    pub fn new(sql: &str) -> Self {
        let source = match tokenize(sql) {
            Ok(tokens) => Source::Tokens(tokens),
            Err(e) => {
                log::debug!("Falling back to text scan: {e}");
                Source::Text(code_only(sql).to_ascii_uppercase())
            }
        };
        Self { source }
    }

    /// Whether the text scan fallback is in use
    pub fn is_text_fallback(&self) -> bool {
        matches!(self.source, Source::Text(_))
    }

    /// `(+)` outer-join markers outside string literals.
    pub fn uses_legacy_outer_join(&self) -> bool {
        match &self.source {
            Source::Tokens(tokens) => tokens
                .windows(3)
                .any(|w| matches!(w, [Token::LParen, Token::Plus, Token::RParen])),
            Source::Text(code) => code
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .contains("(+)"),
        }
    }

    /// True when the first `HAVING` comes before the first `GROUP BY`.
    ///
    /// Bodies without both clauses are not flagged.
    pub fn having_precedes_group_by(&self) -> bool {
        let (having, group_by) = match &self.source {
            Source::Tokens(tokens) => (
                tokens.iter().position(|t| is_keyword(t, Keyword::HAVING)),
                tokens.windows(2).position(|w| {
                    is_keyword(&w[0], Keyword::GROUP) && is_keyword(&w[1], Keyword::BY)
                }),
            ),
            Source::Text(code) => (
                having_re().find(code).map(|m| m.start()),
                group_by_re().find(code).map(|m| m.start()),
            ),
        };
        matches!((having, group_by), (Some(h), Some(g)) if h < g)
    }

    /// First name from `denied` referenced as a bare word, compared
    /// case-insensitively. Returned in its listed spelling.
    pub fn find_denied_macro<'a>(&self, denied: &'a [String]) -> Option<&'a str> {
        match &self.source {
            Source::Tokens(tokens) => tokens.iter().find_map(|t| match t {
                Token::Word(w) if w.quote_style.is_none() => denied
                    .iter()
                    .find(|d| d.eq_ignore_ascii_case(&w.value))
                    .map(String::as_str),
                _ => None,
            }),
            Source::Text(code) => word_re().find_iter(code).find_map(|word| {
                denied
                    .iter()
                    .find(|d| d.eq_ignore_ascii_case(word.as_str()))
                    .map(String::as_str)
            }),
        }
    }
}

fn is_keyword(token: &Token, keyword: Keyword) -> bool {
    matches!(token, Token::Word(w) if w.quote_style.is_none() && w.keyword == keyword)
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
