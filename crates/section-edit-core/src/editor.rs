//! Line buffer that locates sentinel-delimited sections and splices content
//! into them.
//!
//! A section named `toc` under the default syntax looks like:
//!
//! ```text
//! <-- toc
//!   - generated line
//!   --> toc
//! ```
//!
//! Content written into the section is indented with the leading whitespace
//! of the closing sentinel line.

use std::fmt;

use log::{debug, trace};

use crate::error::{EditError, EditResult};
use crate::syntax::{DefaultSyntax, MatchMode, SectionSyntax, SentinelMatcher};

/// Construction-time settings for a [`SectionEditor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorOptions {
    /// Surround replaced content with one blank line on each side unless the
    /// call overrides it.
    pub padding: bool,
    pub match_mode: MatchMode,
}

/// Bounds of a located section.
///
/// `lines` covers `[start_index, end_index)`: the start sentinel and the
/// interior, but not the end sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLocation<'a> {
    pub start_index: usize,
    pub end_index: usize,
    pub indent: String,
    pub lines: &'a [String],
}

impl SectionLocation<'_> {
    /// Lines strictly between the two sentinels.
    pub fn interior(&self) -> &[String] {
        self.lines.get(1..).unwrap_or_default()
    }

    pub fn to_update<'c, S>(
        &self,
        content: &'c [S],
        padding: Option<bool>,
    ) -> SectionUpdate<'c, S> {
        SectionUpdate {
            start_index: self.start_index,
            end_index: self.end_index,
            indent: self.indent.clone(),
            content,
            padding,
        }
    }
}

/// Arguments for [`SectionEditor::update_section`].
#[derive(Debug, Clone)]
pub struct SectionUpdate<'a, S> {
    pub start_index: usize,
    pub end_index: usize,
    pub indent: String,
    pub content: &'a [S],
    /// Overrides [`EditorOptions::padding`] when set.
    pub padding: Option<bool>,
}

pub struct SectionEditor {
    lines: Vec<String>,
    options: EditorOptions,
    syntax: Box<dyn SectionSyntax>,
}

impl SectionEditor {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            options: EditorOptions::default(),
            syntax: Box::new(DefaultSyntax),
        }
    }

    /// Splits `text` on `\n` only. Carriage returns stay attached to their
    /// line.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split('\n').map(str::to_owned).collect())
    }

    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_padding(mut self, padding: bool) -> Self {
        self.options.padding = padding;
        self
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.options.match_mode = match_mode;
        self
    }

    pub fn with_syntax(self, syntax: impl SectionSyntax + 'static) -> Self {
        self.with_boxed_syntax(Box::new(syntax))
    }

    pub fn with_boxed_syntax(mut self, syntax: Box<dyn SectionSyntax>) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn options(&self) -> EditorOptions {
        self.options
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Locates the first start sentinel for `name` and the first end sentinel
    /// after it.
    ///
    /// A line that matches both patterns before any start has been seen is
    /// treated as the start.
    pub fn find_section(&self, name: &str) -> EditResult<SectionLocation<'_>> {
        let start = SentinelMatcher::compile(self.syntax.start(name), self.options.match_mode)?;
        let end = SentinelMatcher::compile(self.syntax.end(name), self.options.match_mode)?;

        let mut start_index = None;
        let mut bounds = None;

        for (index, line) in self.lines.iter().enumerate() {
            match start_index {
                None => {
                    if start.is_match(line) {
                        trace!("section '{name}': start sentinel on line {index}");
                        start_index = Some(index);
                    }
                }
                Some(start_at) => {
                    if end.is_match(line) {
                        trace!("section '{name}': end sentinel on line {index}");
                        bounds = Some((start_at, index, capture_indent(line)));
                        break;
                    }
                }
            }
        }

        let Some((start_index, end_index, indent)) = bounds else {
            debug!(
                "section '{name}' not found (start pattern '{}', end pattern '{}')",
                start.pattern(),
                end.pattern()
            );
            return Err(EditError::section_not_found(name));
        };

        debug!("section '{name}' spans lines {start_index}..={end_index}, indent {indent:?}");

        Ok(SectionLocation {
            start_index,
            end_index,
            indent,
            lines: &self.lines[start_index..end_index],
        })
    }

    pub fn has_section(&self, name: &str) -> EditResult<bool> {
        match self.find_section(name) {
            Ok(_) => Ok(true),
            Err(EditError::SectionNotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Replaces the interior of a section with `content`, leaving both
    /// sentinel lines in place.
    pub fn update_section<S: AsRef<str>>(
        &mut self,
        update: SectionUpdate<'_, S>,
    ) -> EditResult<()> {
        let SectionUpdate {
            start_index,
            end_index,
            indent,
            content,
            padding,
        } = update;

        if start_index >= end_index || end_index >= self.lines.len() {
            return Err(EditError::InvalidRange {
                start: start_index,
                end: end_index,
                len: self.lines.len(),
            });
        }

        let padding = padding.unwrap_or(self.options.padding);
        let mut replacement = Vec::with_capacity(content.len() + 2);
        if padding {
            replacement.push(String::new());
        }
        replacement.extend(indent_lines(&indent, content));
        if padding {
            replacement.push(String::new());
        }

        debug!(
            "replacing {} interior lines after line {start_index} with {}",
            end_index - start_index - 1,
            replacement.len()
        );
        self.lines.splice(start_index + 1..end_index, replacement);
        Ok(())
    }

    pub fn find_and_update_section<S: AsRef<str>>(
        &mut self,
        name: &str,
        content: &[S],
        padding: Option<bool>,
    ) -> EditResult<()> {
        let update = self.find_section(name)?.to_update(content, padding);
        self.update_section(update)
    }

    /// Inserts `content` directly after the start sentinel.
    pub fn prepend_to_section<S: AsRef<str>>(
        &mut self,
        name: &str,
        content: &[S],
    ) -> EditResult<()> {
        let location = self.find_section(name)?;
        let at = location.start_index + 1;
        let indented: Vec<String> = indent_lines(&location.indent, content).collect();
        self.insert_lines(at, indented);
        Ok(())
    }

    /// Inserts `content` directly before the end sentinel.
    pub fn append_to_section<S: AsRef<str>>(
        &mut self,
        name: &str,
        content: &[S],
    ) -> EditResult<()> {
        let location = self.find_section(name)?;
        let at = location.end_index;
        let indented: Vec<String> = indent_lines(&location.indent, content).collect();
        self.insert_lines(at, indented);
        Ok(())
    }

    pub fn serialize(&self) -> String {
        self.lines.join("\n")
    }

    fn insert_lines(&mut self, at: usize, lines: Vec<String>) {
        debug!("inserting {} lines at line {at}", lines.len());
        self.lines.splice(at..at, lines);
    }
}

impl fmt::Debug for SectionEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionEditor")
            .field("lines", &self.lines)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SectionEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

fn capture_indent(line: &str) -> String {
    line.chars()
        .take_while(|ch| matches!(ch, ' ' | '\t'))
        .collect()
}

fn indent_lines<'a, S: AsRef<str>>(
    indent: &'a str,
    content: &'a [S],
) -> impl Iterator<Item = String> + 'a {
    content.iter().map(move |line| {
        let line = line.as_ref();
        if line.is_empty() {
            String::new()
        } else {
            format!("{indent}{line}")
        }
    })
}
