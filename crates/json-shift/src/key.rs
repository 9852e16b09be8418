//! Input-side key patterns.
//!
//! A spec key is one of:
//! - a literal: `grade`, `Student[]`, `Student\[\]`
//! - a matcher: `*`, a glob such as `rating-*`, or an alternation `grade|age`
//! - a virtual leaf: `@` (current value), `$` / `$N` (a captured key),
//!   `#text` (a constant)
//!
//! A backslash escapes the next character when it is one of
//! `\ * [ ] | @ $ # &`. Unescaped brackets are ordinary characters, so the
//! escaped and bare spellings of `Student[]` are the same literal, but a
//! single key must not mix the two.

use crate::capture::Capture;
use crate::error::CompileError;

const ESCAPABLE: &[char] = &['\\', '*', '[', ']', '|', '@', '$', '#', '&'];

/// A compiled spec key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    Literal(String),
    Matcher(Matcher),
    /// `@`: emit the input value the enclosing node is positioned on.
    SelfValue,
    /// `$` / `$N`: emit the `N`-th most recent capture as a string.
    CaptureKey(usize),
    /// `#text`: emit the constant string `text`.
    Constant(String),
}

impl KeyPattern {
    /// Virtual keys don't consume an input key and must be leaves.
    pub fn is_virtual(&self) -> bool {
        matches!(
            self,
            KeyPattern::SelfValue | KeyPattern::CaptureKey(_) | KeyPattern::Constant(_)
        )
    }
}

/// Key patterns that bind a capture when they match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Wildcard,
    Glob(Glob),
    Alternation(Vec<Alternative>),
}

impl Matcher {
    /// Match a key, returning the capture to push on success.
    pub fn matches(&self, key: &str) -> Option<Capture> {
        match self {
            Matcher::Wildcard => Some(Capture::new(key, vec![key.to_string()])),
            Matcher::Glob(glob) => glob.captures(key).map(|groups| Capture::new(key, groups)),
            Matcher::Alternation(alternatives) => alternatives.iter().find_map(|alt| match alt {
                Alternative::Literal(text) => (text == key).then(|| Capture::new(key, vec![])),
                Alternative::Glob(glob) => {
                    glob.captures(key).map(|groups| Capture::new(key, groups))
                }
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alternative {
    Literal(String),
    Glob(Glob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GlobPart {
    Text(String),
    Star,
}

/// A key pattern with one or more embedded `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob {
    parts: Vec<GlobPart>,
}

impl Glob {
    fn is_lone_star(&self) -> bool {
        matches!(self.parts.as_slice(), [GlobPart::Star])
    }

    /// Returns the text consumed by each `*`, left to right. Stars are
    /// matched shortest-first; the last one takes whatever remains.
    pub fn captures(&self, key: &str) -> Option<Vec<String>> {
        let mut groups = Vec::new();
        match_parts(&self.parts, key, &mut groups).then_some(groups)
    }
}

fn match_parts(parts: &[GlobPart], rest: &str, groups: &mut Vec<String>) -> bool {
    match parts.split_first() {
        None => rest.is_empty(),
        Some((GlobPart::Text(text), tail)) => rest
            .strip_prefix(text.as_str())
            .is_some_and(|remaining| match_parts(tail, remaining, groups)),
        Some((GlobPart::Star, tail)) => {
            if tail.is_empty() {
                groups.push(rest.to_string());
                return true;
            }
            let cuts = rest.char_indices().map(|(i, _)| i).chain(Some(rest.len()));
            for cut in cuts {
                groups.push(rest[..cut].to_string());
                if match_parts(tail, &rest[cut..], groups) {
                    return true;
                }
                groups.pop();
            }
            false
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tok {
    ch: char,
    escaped: bool,
}

impl Tok {
    fn is(&self, ch: char) -> bool {
        !self.escaped && self.ch == ch
    }
}

fn tokenize(pattern: &str) -> Result<Vec<Tok>, CompileError> {
    let mut toks = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            toks.push(Tok { ch, escaped: false });
            continue;
        }
        match chars.next() {
            Some(next) if ESCAPABLE.contains(&next) => toks.push(Tok {
                ch: next,
                escaped: true,
            }),
            Some(next) => {
                return Err(CompileError::key(
                    pattern,
                    format!("'\\{next}' is not a recognized escape"),
                ))
            }
            None => return Err(CompileError::key(pattern, "dangling escape at end of key")),
        }
    }

    let escaped_bracket = toks.iter().any(|t| t.escaped && matches!(t.ch, '[' | ']'));
    let bare_bracket = toks.iter().any(|t| !t.escaped && matches!(t.ch, '[' | ']'));
    if escaped_bracket && bare_bracket {
        return Err(CompileError::key(
            pattern,
            "brackets must be either all escaped or all unescaped",
        ));
    }
    Ok(toks)
}

fn text_of(toks: &[Tok]) -> String {
    toks.iter().map(|t| t.ch).collect()
}

/// Parse a spec key into a [`KeyPattern`].
pub fn parse_key(pattern: &str) -> Result<KeyPattern, CompileError> {
    let toks = tokenize(pattern)?;

    if let Some(first) = toks.first().filter(|t| !t.escaped) {
        match first.ch {
            '@' if toks.len() == 1 => return Ok(KeyPattern::SelfValue),
            '@' => return Err(CompileError::key(pattern, "'@' must stand alone")),
            '$' => return parse_capture_key(pattern, &toks[1..]),
            '#' => return Ok(KeyPattern::Constant(text_of(&toks[1..]))),
            _ => {}
        }
    }

    let pieces: Vec<&[Tok]> = toks.split(|t| t.is('|')).collect();
    if pieces.len() == 1 {
        return Ok(match parse_alternative(pattern, pieces[0])? {
            Alternative::Literal(text) => KeyPattern::Literal(text),
            Alternative::Glob(glob) if glob.is_lone_star() => KeyPattern::Matcher(Matcher::Wildcard),
            Alternative::Glob(glob) => KeyPattern::Matcher(Matcher::Glob(glob)),
        });
    }

    let mut alternatives = Vec::with_capacity(pieces.len());
    for piece in pieces {
        if piece.is_empty() {
            return Err(CompileError::key(pattern, "empty alternative"));
        }
        alternatives.push(parse_alternative(pattern, piece)?);
    }
    Ok(KeyPattern::Matcher(Matcher::Alternation(alternatives)))
}

fn parse_capture_key(pattern: &str, rest: &[Tok]) -> Result<KeyPattern, CompileError> {
    if rest.is_empty() {
        return Ok(KeyPattern::CaptureKey(1));
    }
    if rest.iter().any(|t| t.escaped || !t.ch.is_ascii_digit()) {
        return Err(CompileError::key(pattern, "'$' takes an optional capture number"));
    }
    let depth: usize = text_of(rest)
        .parse()
        .map_err(|_| CompileError::key(pattern, "capture number is too large"))?;
    if depth == 0 {
        return Err(CompileError::key(pattern, "capture numbers start at 1"));
    }
    Ok(KeyPattern::CaptureKey(depth))
}

fn parse_alternative(pattern: &str, toks: &[Tok]) -> Result<Alternative, CompileError> {
    if !toks.iter().any(|t| t.is('*')) {
        return Ok(Alternative::Literal(text_of(toks)));
    }

    let mut parts = Vec::new();
    let mut text = String::new();
    for tok in toks {
        if tok.is('*') {
            if !text.is_empty() {
                parts.push(GlobPart::Text(std::mem::take(&mut text)));
            } else if matches!(parts.last(), Some(GlobPart::Star)) {
                return Err(CompileError::key(pattern, "adjacent '*' are ambiguous"));
            }
            parts.push(GlobPart::Star);
        } else {
            text.push(tok.ch);
        }
    }
    if !text.is_empty() {
        parts.push(GlobPart::Text(text));
    }
    Ok(Alternative::Glob(Glob { parts }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(pattern: &str) -> Matcher {
        match parse_key(pattern).unwrap() {
            KeyPattern::Matcher(m) => m,
            other => panic!("expected matcher for {pattern:?}, got {other:?}"),
        }
    }

    #[test]
    fn escaped_and_bare_brackets_are_the_same_literal() {
        assert_eq!(
            parse_key("Student[]").unwrap(),
            KeyPattern::Literal("Student[]".into())
        );
        assert_eq!(
            parse_key("Student\\[\\]").unwrap(),
            KeyPattern::Literal("Student[]".into())
        );
    }

    #[test]
    fn inconsistent_escaping_is_rejected() {
        for bad in ["Student\\[]", "Student[\\]", "trailing\\", "bad\\q"] {
            assert!(
                matches!(parse_key(bad), Err(CompileError::MalformedKeyPattern { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn star_forms() {
        assert_eq!(matcher("*"), Matcher::Wildcard);
        assert!(matches!(matcher("rating-*"), Matcher::Glob(_)));
        assert_eq!(parse_key("\\*").unwrap(), KeyPattern::Literal("*".into()));
        assert!(parse_key("a**").is_err());
    }

    #[test]
    fn glob_groups() {
        let m = matcher("*-id-*");
        let cap = m.matches("user-id-42").unwrap();
        assert_eq!(cap.key(), "user-id-42");
        assert_eq!(cap.group(1), Some("user"));
        assert_eq!(cap.group(2), Some("42"));
        assert!(m.matches("user-42").is_none());

        let prefix = matcher("rating-*");
        assert_eq!(prefix.matches("rating-").unwrap().group(1), Some(""));
        assert!(prefix.matches("score-high").is_none());
    }

    #[test]
    fn alternation() {
        let m = matcher("grade|age*");
        assert!(m.matches("grade").is_some());
        assert_eq!(m.matches("ageGroup").unwrap().group(1), Some("Group"));
        assert!(m.matches("gender").is_none());
        assert_eq!(parse_key("a\\|b").unwrap(), KeyPattern::Literal("a|b".into()));
        assert!(parse_key("a||b").is_err());
        assert!(parse_key("a|").is_err());
    }

    #[test]
    fn virtual_keys() {
        assert_eq!(parse_key("@").unwrap(), KeyPattern::SelfValue);
        assert_eq!(parse_key("$").unwrap(), KeyPattern::CaptureKey(1));
        assert_eq!(parse_key("$2").unwrap(), KeyPattern::CaptureKey(2));
        assert_eq!(
            parse_key("#bar chart").unwrap(),
            KeyPattern::Constant("bar chart".into())
        );
        assert_eq!(parse_key("\\@").unwrap(), KeyPattern::Literal("@".into()));
        assert_eq!(parse_key("a@b").unwrap(), KeyPattern::Literal("a@b".into()));
        assert!(parse_key("@foo").is_err());
        assert!(parse_key("$0").is_err());
        assert!(parse_key("$x").is_err());
    }
}
