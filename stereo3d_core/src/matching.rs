// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window match expressions.
//!
//! Three user-configurable expressions decide which windows are the desktop
//! background, which are docks and which float in depth. The grammar is a
//! small boolean language over window properties:
//!
//! ```text
//!   expr   := and ('|' and)*
//!   and    := unary ('&' unary)*
//!   unary  := '!' unary | '(' expr ')' | term
//!   term   := 'any' | 'none' | key '=' value
//!   key    := 'type' | 'class' | 'title'
//! ```
//!
//! Keys and window type names are case-insensitive; `class=` and `title=`
//! compare the whole string exactly. A value runs up to the next `|`, `&` or
//! `)` and is trimmed.
//!
//! The classifier only sees the [`MatchRules`] trait, so a host with its own
//! match engine can plug it in instead of [`WindowMatchSet`].

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::str::FromStr;

use thiserror::Error;

use crate::options::StereoOptions;
use crate::window::{WindowInfo, WindowType};

/// Default expression for the desktop background.
pub const DEFAULT_DESKTOP_MATCH: &str = "type=Desktop";
/// Default expression for docks and panels.
pub const DEFAULT_DOCK_MATCH: &str = "type=Dock";
/// Default expression for floating windows.
pub const DEFAULT_WINDOW_MATCH: &str =
    "type=Normal | type=Dialog | type=Utility | type=Toolbar | type=Unknown";

/// The three predicates the classifier evaluates, in priority order.
pub trait MatchRules {
    /// Whether `info` is the desktop background.
    fn is_desktop(&self, info: &WindowInfo) -> bool;

    /// Whether `info` is a dock or panel.
    fn is_dock(&self, info: &WindowInfo) -> bool;

    /// Whether `info` is a floating window.
    fn is_window(&self, info: &WindowInfo) -> bool;
}

/// Errors from [`MatchExpr::parse`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The expression was empty or only whitespace.
    #[error("empty match expression")]
    Empty,
    /// Input ended where a term was expected.
    #[error("match expression ends unexpectedly")]
    UnexpectedEnd,
    /// A character that cannot start or continue the expression.
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected {
        /// The offending character.
        found: char,
        /// Byte offset into the expression.
        offset: usize,
    },
    /// A key other than `type`, `class` or `title`.
    #[error("unknown match key `{key}` at offset {offset}")]
    UnknownKey {
        /// The key as written.
        key: String,
        /// Byte offset into the expression.
        offset: usize,
    },
    /// A `type=` value that names no window type.
    #[error("unknown window type `{name}` at offset {offset}")]
    UnknownType {
        /// The type name as written.
        name: String,
        /// Byte offset into the expression.
        offset: usize,
    },
    /// A parenthesis without its partner.
    #[error("unbalanced parenthesis at offset {offset}")]
    Unbalanced {
        /// Byte offset of the unmatched parenthesis.
        offset: usize,
    },
    /// More than [`MAX_NESTING`] levels of `!` and `(`.
    #[error("match expression nests too deeply at offset {offset}")]
    TooDeep {
        /// Byte offset of the `!` or `(` that went over the limit.
        offset: usize,
    },
}

/// Deepest combined nesting of `!` and `(` that [`MatchExpr::parse`]
/// accepts.
///
/// Parsing, evaluation and drop all recurse once per level.
pub const MAX_NESTING: usize = 64;

/// A parsed match expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchExpr {
    /// Matches every window.
    Any,
    /// Matches no window.
    None,
    /// Matches windows of one type.
    Type(WindowType),
    /// Matches an exact class name.
    Class(String),
    /// Matches an exact title.
    Title(String),
    /// Negation.
    Not(Box<Self>),
    /// All operands match.
    And(Vec<Self>),
    /// Any operand matches.
    Or(Vec<Self>),
}

impl MatchExpr {
    /// Parses an expression.
    pub fn parse(src: &str) -> Result<Self, MatchError> {
        if src.trim().is_empty() {
            return Err(MatchError::Empty);
        }
        let mut parser = Parser {
            src,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(expr),
            Some(')') => Err(MatchError::Unbalanced { offset: parser.pos }),
            Some(found) => Err(MatchError::Unexpected {
                found,
                offset: parser.pos,
            }),
        }
    }

    /// Evaluates the expression against a window.
    #[must_use]
    pub fn matches(&self, info: &WindowInfo) -> bool {
        match self {
            Self::Any => true,
            Self::None => false,
            Self::Type(t) => info.window_type == *t,
            Self::Class(c) => info.class == *c,
            Self::Title(t) => info.title == *t,
            Self::Not(inner) => !inner.matches(info),
            Self::And(terms) => terms.iter().all(|t| t.matches(info)),
            Self::Or(terms) => terms.iter().any(|t| t.matches(info)),
        }
    }
}

impl FromStr for MatchExpr {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expr(&mut self) -> Result<MatchExpr, MatchError> {
        let mut terms = Vec::new();
        terms.push(self.and()?);
        loop {
            self.skip_ws();
            if self.peek() != Some('|') {
                break;
            }
            self.bump();
            terms.push(self.and()?);
        }
        Ok(collapse(terms, MatchExpr::Or))
    }

    fn and(&mut self) -> Result<MatchExpr, MatchError> {
        let mut terms = Vec::new();
        terms.push(self.unary()?);
        loop {
            self.skip_ws();
            if self.peek() != Some('&') {
                break;
            }
            self.bump();
            terms.push(self.unary()?);
        }
        Ok(collapse(terms, MatchExpr::And))
    }

    fn unary(&mut self) -> Result<MatchExpr, MatchError> {
        self.skip_ws();
        match self.peek() {
            Some('!') => {
                self.descend()?;
                self.bump();
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(MatchExpr::Not(Box::new(inner)))
            }
            Some('(') => {
                let open = self.pos;
                self.descend()?;
                self.bump();
                let inner = self.expr()?;
                self.depth -= 1;
                self.skip_ws();
                if self.peek() == Some(')') {
                    self.bump();
                    Ok(inner)
                } else {
                    Err(MatchError::Unbalanced { offset: open })
                }
            }
            _ => self.term(),
        }
    }

    fn descend(&mut self) -> Result<(), MatchError> {
        if self.depth >= MAX_NESTING {
            return Err(MatchError::TooDeep { offset: self.pos });
        }
        self.depth += 1;
        Ok(())
    }

    fn term(&mut self) -> Result<MatchExpr, MatchError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        let key = &self.src[start..self.pos];
        if key.is_empty() {
            return match self.peek() {
                None => Err(MatchError::UnexpectedEnd),
                Some(found) => Err(MatchError::Unexpected { found, offset: start }),
            };
        }

        self.skip_ws();
        if self.peek() != Some('=') {
            if key.eq_ignore_ascii_case("any") {
                return Ok(MatchExpr::Any);
            }
            if key.eq_ignore_ascii_case("none") {
                return Ok(MatchExpr::None);
            }
            return match self.peek() {
                None => Err(MatchError::UnexpectedEnd),
                Some(found) => Err(MatchError::Unexpected {
                    found,
                    offset: self.pos,
                }),
            };
        }
        self.bump();

        let value_start = self.pos;
        while self.peek().is_some_and(|c| !matches!(c, '|' | '&' | ')')) {
            self.bump();
        }
        let value = self.src[value_start..self.pos].trim();
        if value.is_empty() {
            return match self.peek() {
                None => Err(MatchError::UnexpectedEnd),
                Some(found) => Err(MatchError::Unexpected {
                    found,
                    offset: self.pos,
                }),
            };
        }

        if key.eq_ignore_ascii_case("type") {
            WindowType::from_name(value)
                .map(MatchExpr::Type)
                .ok_or_else(|| MatchError::UnknownType {
                    name: String::from(value),
                    offset: value_start,
                })
        } else if key.eq_ignore_ascii_case("class") {
            Ok(MatchExpr::Class(String::from(value)))
        } else if key.eq_ignore_ascii_case("title") {
            Ok(MatchExpr::Title(String::from(value)))
        } else {
            Err(MatchError::UnknownKey {
                key: String::from(key),
                offset: start,
            })
        }
    }
}

fn collapse(mut terms: Vec<MatchExpr>, join: fn(Vec<MatchExpr>) -> MatchExpr) -> MatchExpr {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        join(terms)
    }
}

/// Parsed desktop, dock and window expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowMatchSet {
    /// Selects the background window.
    pub desktop: MatchExpr,
    /// Selects docks.
    pub dock: MatchExpr,
    /// Selects floating windows.
    pub window: MatchExpr,
}

impl WindowMatchSet {
    /// Parses all three expressions.
    pub fn parse(desktop: &str, dock: &str, window: &str) -> Result<Self, MatchError> {
        Ok(Self {
            desktop: MatchExpr::parse(desktop)?,
            dock: MatchExpr::parse(dock)?,
            window: MatchExpr::parse(window)?,
        })
    }

    /// Parses the expressions carried by `options`.
    pub fn from_options(options: &StereoOptions) -> Result<Self, MatchError> {
        Self::parse(
            &options.desktop_match,
            &options.dock_match,
            &options.window_match,
        )
    }
}

impl Default for WindowMatchSet {
    fn default() -> Self {
        Self {
            desktop: MatchExpr::Type(WindowType::Desktop),
            dock: MatchExpr::Type(WindowType::Dock),
            window: MatchExpr::Or(alloc::vec![
                MatchExpr::Type(WindowType::Normal),
                MatchExpr::Type(WindowType::Dialog),
                MatchExpr::Type(WindowType::Utility),
                MatchExpr::Type(WindowType::Toolbar),
                MatchExpr::Type(WindowType::Unknown),
            ]),
        }
    }
}

impl MatchRules for WindowMatchSet {
    fn is_desktop(&self, info: &WindowInfo) -> bool {
        self.desktop.matches(info)
    }

    fn is_dock(&self, info: &WindowInfo) -> bool {
        self.dock.matches(info)
    }

    fn is_window(&self, info: &WindowInfo) -> bool {
        self.window.matches(info)
    }
}
