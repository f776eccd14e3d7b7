//! Compound CSS selectors: enough of the grammar to describe entry containers.
//!
//! Supported: tag (or `*`), `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! `[attr*="v"]`, `[attr^="v"]`, and comma-separated alternatives.
//! Combinators (descendant, child, sibling) are not supported.

use std::fmt;
use std::str::FromStr;

use super::Element;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {found:?} at offset {offset} in {input:?}")]
    Unexpected {
        input: String,
        offset: usize,
        found: char,
    },
    #[error("unterminated attribute selector in {0:?}")]
    Unterminated(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

/// A parsed selector list; matches if any alternative matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(SelectorError::Empty);
            }
            alternatives.push(Parser::new(input, part).compound()?);
        }
        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, el: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(el.tag()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id().as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| {
            let Some(value) = el.attr(&a.name) else {
                return false;
            };
            match &a.op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => value == *v,
                AttrOp::Contains(v) => value.contains(v.as_str()),
                AttrOp::Prefix(v) => value.starts_with(v.as_str()),
            }
        })
    }
}

struct Parser<'a> {
    input: &'a str,
    part: &'a str,
    pos: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, part: &'a str) -> Self {
        Self {
            input,
            part,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.part[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            input: self.input.to_string(),
            offset: self.pos,
            found,
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if start == self.pos {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Empty,
            });
        }
        Ok(self.part[start..self.pos].to_string())
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut c = Compound::default();
        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some(ch) if is_ident_char(ch) => c.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }
        while let Some(ch) = self.peek() {
            match ch {
                '#' => {
                    self.bump();
                    c.id = Some(self.ident()?);
                }
                '.' => {
                    self.bump();
                    c.classes.push(self.ident()?);
                }
                '[' => {
                    self.bump();
                    c.attrs.push(self.attribute()?);
                }
                other => return Err(self.unexpected(other)),
            }
        }
        Ok(c)
    }

    fn attribute(&mut self) -> Result<AttrMatch, SelectorError> {
        let name = self.ident()?.to_ascii_lowercase();
        let op = match self.bump() {
            Some(']') => return Ok(AttrMatch { name, op: AttrOp::Exists }),
            Some('=') => AttrOp::Equals(self.value()?),
            Some(m @ ('*' | '^')) => {
                if self.bump() != Some('=') {
                    return Err(SelectorError::Unterminated(self.input.to_string()));
                }
                let v = self.value()?;
                if m == '*' {
                    AttrOp::Contains(v)
                } else {
                    AttrOp::Prefix(v)
                }
            }
            Some(other) => return Err(self.unexpected(other)),
            None => return Err(SelectorError::Unterminated(self.input.to_string())),
        };
        if self.bump() != Some(']') {
            return Err(SelectorError::Unterminated(self.input.to_string()));
        }
        Ok(AttrMatch { name, op })
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == q => return Ok(self.part[start..self.pos - 1].to_string()),
                        Some(_) => continue,
                        None => return Err(SelectorError::Unterminated(self.input.to_string())),
                    }
                }
            }
            _ => self.ident(),
        }
    }
}
