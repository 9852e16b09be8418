//! Output path templates.
//!
//! Grammar:
//!
//! ```text
//! template := "" | head ( "." key | bracket )*
//! head     := key | bracket
//! key      := ( char | "\" escapable | ref )+
//! bracket  := "[" ( "" | digits | ref ) "]"
//! ref      := "&" ( digits | "(" digits ( "," digits )? ")" )?
//! ```
//!
//! `categories[]`, `[&1].name`, `by-&1.total`, `rows[&(2,1)][0]`.

use crate::error::CompileError;

/// Reference to a captured key: `&depth` or `&(depth,group)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRef {
    /// `1` is the innermost capture.
    pub depth: usize,
    /// `0` is the whole key, `m` the text matched by the `m`-th `*`.
    pub group: usize,
}

/// One piece of an object-key segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPiece {
    Text(String),
    Capture(CaptureRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key, possibly assembled from captures.
    Key(Vec<KeyPiece>),
    /// `[]`
    Append,
    /// `[n]`
    Index(usize),
    /// `[&N]`: the captured key used as an array index.
    CaptureIndex(CaptureRef),
}

/// A compiled output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    source: String,
    segments: Vec<PathSegment>,
}

impl OutputTemplate {
    pub fn parse(source: &str) -> Result<Self, CompileError> {
        let segments = TemplateParser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl std::fmt::Display for OutputTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Largest array index an output path may address, literal or captured.
/// Writing at index `n` materializes `n + 1` slots, so the bound caps the
/// memory a single emission can claim.
pub const MAX_ARRAY_INDEX: usize = 1 << 20;

const ESCAPABLE: &[char] = &['\\', '.', '[', ']', '&'];

struct TemplateParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TemplateParser<'a> {
    fn parse(input: &'a str) -> Result<Vec<PathSegment>, CompileError> {
        let mut parser = Self { input, pos: 0 };
        parser.parse_template()
    }

    fn parse_template(&mut self) -> Result<Vec<PathSegment>, CompileError> {
        let mut segments = Vec::new();
        if self.is_at_end() {
            return Ok(segments);
        }

        if self.peek() == Some('[') {
            segments.push(self.parse_bracket()?);
        } else {
            segments.push(self.parse_key()?);
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    segments.push(self.parse_key()?);
                }
                '[' => segments.push(self.parse_bracket()?),
                _ => return Err(self.error(format!("unexpected '{c}'"))),
            }
        }
        Ok(segments)
    }

    fn parse_key(&mut self) -> Result<PathSegment, CompileError> {
        let mut pieces = Vec::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            match c {
                '.' | '[' => break,
                ']' => return Err(self.error("unbalanced ']'")),
                '\\' => {
                    self.advance();
                    match self.peek() {
                        Some(e) if ESCAPABLE.contains(&e) => {
                            text.push(e);
                            self.advance();
                        }
                        Some(e) => return Err(self.error(format!("'\\{e}' is not a recognized escape"))),
                        None => return Err(self.error("dangling escape")),
                    }
                }
                '&' => {
                    if !text.is_empty() {
                        pieces.push(KeyPiece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(KeyPiece::Capture(self.parse_ref()?));
                }
                _ => {
                    text.push(c);
                    self.advance();
                }
            }
        }

        if !text.is_empty() {
            pieces.push(KeyPiece::Text(text));
        }
        if pieces.is_empty() {
            return Err(self.error("empty key segment"));
        }
        Ok(PathSegment::Key(pieces))
    }

    fn parse_bracket(&mut self) -> Result<PathSegment, CompileError> {
        self.expect('[')?;
        let segment = match self.peek() {
            Some(']') => PathSegment::Append,
            Some('&') => PathSegment::CaptureIndex(self.parse_ref()?),
            Some('0'..='9') => {
                let index = self.parse_number()?;
                if index > MAX_ARRAY_INDEX {
                    return Err(self.error(format!("array index {index} exceeds {MAX_ARRAY_INDEX}")));
                }
                PathSegment::Index(index)
            }
            Some(c) => return Err(self.error(format!("unknown bracket segment starting with '{c}'"))),
            None => return Err(self.error("unbalanced '['")),
        };
        self.expect(']')?;
        Ok(segment)
    }

    fn parse_ref(&mut self) -> Result<CaptureRef, CompileError> {
        self.expect('&')?;
        let (depth, group) = match self.peek() {
            Some('0'..='9') => (self.parse_number()?, 0),
            Some('(') => {
                self.advance();
                let depth = self.parse_number()?;
                let group = if self.peek() == Some(',') {
                    self.advance();
                    self.parse_number()?
                } else {
                    0
                };
                self.expect(')')?;
                (depth, group)
            }
            _ => (1, 0),
        };
        if depth == 0 {
            return Err(self.error("capture references start at &1"));
        }
        Ok(CaptureRef { depth, group })
    }

    fn parse_number(&mut self) -> Result<usize, CompileError> {
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if start == self.pos {
            return Err(self.error("expected a number"));
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| self.error("number is too large"))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), CompileError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None if expected == ']' => Err(self.error("unbalanced '['")),
            None => Err(self.error(format!("expected '{expected}', found end of template"))),
        }
    }

    fn error(&self, reason: impl Into<String>) -> CompileError {
        let reason = reason.into();
        CompileError::template(self.input, format!("{reason} at offset {}", self.pos))
    }
}
