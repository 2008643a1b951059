//! Sentinel syntax: how a section name turns into the patterns that mark the
//! opening and closing lines of that section, and how lines are tested
//! against those patterns.

use std::fmt;

use regex::Regex;

use crate::error::{EditError, EditResult};

/// Placeholder substituted with the section name in [`TemplateSyntax`].
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Produces the start and end sentinel patterns for a named section.
pub trait SectionSyntax: Send + Sync {
    fn start(&self, name: &str) -> String;
    fn end(&self, name: &str) -> String;
}

/// `<-- name` opens a section and `--> name` closes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultSyntax;

impl SectionSyntax for DefaultSyntax {
    fn start(&self, name: &str) -> String {
        format!("<-- {name}")
    }

    fn end(&self, name: &str) -> String {
        format!("--> {name}")
    }
}

/// Sentinel syntax built from two templates containing [`NAME_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSyntax {
    pub start: String,
    pub end: String,
}

impl TemplateSyntax {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for TemplateSyntax {
    fn default() -> Self {
        Self::new("<-- {name}", "--> {name}")
    }
}

impl SectionSyntax for TemplateSyntax {
    fn start(&self, name: &str) -> String {
        self.start.replace(NAME_PLACEHOLDER, name)
    }

    fn end(&self, name: &str) -> String {
        self.end.replace(NAME_PLACEHOLDER, name)
    }
}

impl<S, E> SectionSyntax for (S, E)
where
    S: Fn(&str) -> String + Send + Sync,
    E: Fn(&str) -> String + Send + Sync,
{
    fn start(&self, name: &str) -> String {
        (self.0)(name)
    }

    fn end(&self, name: &str) -> String {
        (self.1)(name)
    }
}

/// How sentinel patterns are tested against document lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MatchMode {
    /// The line contains the pattern as a plain substring.
    #[default]
    Literal,
    /// The pattern is a regular expression searched anywhere in the line.
    Regex,
}

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::Literal => "literal",
            MatchMode::Regex => "regex",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "literal" => Ok(MatchMode::Literal),
            "regex" => Ok(MatchMode::Regex),
            _ => Err(()),
        }
    }
}

/// A sentinel pattern prepared for repeated line tests.
#[derive(Debug, Clone)]
pub enum SentinelMatcher {
    Literal(String),
    Regex(Regex),
}

impl SentinelMatcher {
    pub fn compile(pattern: String, mode: MatchMode) -> EditResult<Self> {
        match mode {
            MatchMode::Literal => Ok(Self::Literal(pattern)),
            MatchMode::Regex => Regex::new(&pattern)
                .map(Self::Regex)
                .map_err(|source| EditError::InvalidPattern { pattern, source }),
        }
    }

    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Literal(pattern) => line.contains(pattern.as_str()),
            Self::Regex(regex) => regex.is_match(line),
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            Self::Literal(pattern) => pattern,
            Self::Regex(regex) => regex.as_str(),
        }
    }
}
