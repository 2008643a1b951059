use std::io::{self, Read};
use std::mem;
use std::path::PathBuf;

use crate::error::{EditError, EditResult};

/// Where the content written into a section comes from.
#[derive(Debug, Clone)]
pub enum PayloadSource {
    File(PathBuf),
    Stdin,
    /// Command-line text where `\n` separates lines.
    Inline(String),
}

/// Loads a payload and splits it into the lines written into a section.
pub fn load_payload(source: &PayloadSource) -> EditResult<Vec<String>> {
    match source {
        PayloadSource::File(path) => std::fs::read_to_string(path)
            .map(|text| payload_lines(&text))
            .map_err(|err| {
                EditError::InvalidContent(format!(
                    "failed to read payload file '{}': {err}",
                    path.display()
                ))
            }),
        PayloadSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(|err| {
                EditError::InvalidContent(format!("failed to read stdin payload: {err}"))
            })?;
            Ok(payload_lines(&buffer))
        }
        PayloadSource::Inline(raw) => inline_lines(raw),
    }
}

/// Splits a payload into section lines. One trailing newline terminates the
/// last line rather than adding an empty one; an empty payload has no lines.
pub fn payload_lines(payload: &str) -> Vec<String> {
    if payload.is_empty() {
        return Vec::new();
    }
    let body = payload.strip_suffix('\n').unwrap_or(payload);
    body.split('\n').map(str::to_owned).collect()
}

/// Decodes inline text into section lines with the same line rules as
/// [`payload_lines`]. Both `\n` escapes and literal line feeds end a line.
/// A carriage return is rejected because it would stay inside a section
/// line and never match a sentinel scan split on `\n`.
fn inline_lines(raw: &str) -> EditResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut chars = raw.char_indices();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '\n' => lines.push(mem::take(&mut line)),
            '\r' => return Err(inline_error(offset, "carriage return; use \\n between lines")),
            '\\' => match chars.next().map(|(_, escaped)| escaped) {
                Some('n') => lines.push(mem::take(&mut line)),
                Some('t') => line.push('\t'),
                Some(escaped @ ('\\' | '"')) => line.push(escaped),
                Some('r') => {
                    return Err(inline_error(offset, "`\\r` is not allowed; use \\n between lines"))
                }
                Some(other) => {
                    return Err(inline_error(offset, &format!("unsupported escape `\\{other}`")))
                }
                None => return Err(inline_error(offset, "dangling backslash")),
            },
            _ => line.push(ch),
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

fn inline_error(offset: usize, reason: &str) -> EditError {
    EditError::InvalidContent(format!("inline payload at byte {offset}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_escapes_become_section_lines() {
        let lines = inline_lines(r#"- a\n\t- \"b\"\n- c\\d"#).unwrap();
        assert_eq!(lines, vec!["- a", "\t- \"b\"", "- c\\d"]);
    }

    #[test]
    fn inline_line_breaks_follow_payload_rules() {
        assert_eq!(inline_lines("").unwrap(), Vec::<String>::new());
        assert_eq!(inline_lines(r"\n").unwrap(), vec![""]);
        assert_eq!(inline_lines(r"- a\n").unwrap(), vec!["- a"]);
        assert_eq!(inline_lines(r"- a\n\n").unwrap(), vec!["- a", ""]);
        assert_eq!(inline_lines("- a\n- b").unwrap(), vec!["- a", "- b"]);
    }

    #[test]
    fn inline_rejects_carriage_returns() {
        for raw in ["- a\r\n- b", r"- a\r\n- b"] {
            let err = inline_lines(raw).unwrap_err();
            assert!(
                matches!(&err, EditError::InvalidContent(message) if message.contains("byte 3")),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn inline_rejects_bad_escapes() {
        let err = inline_lines(r"- a\x").unwrap_err();
        assert!(matches!(err, EditError::InvalidContent(message) if message.contains("`\\x`")));
        assert!(inline_lines(r"- a\").is_err());
    }

    #[test]
    fn trailing_newline_ends_last_line() {
        assert_eq!(payload_lines("- a\n- b\n"), vec!["- a", "- b"]);
        assert_eq!(payload_lines("- a\n- b"), vec!["- a", "- b"]);
    }

    #[test]
    fn blank_lines_inside_payload_are_kept() {
        assert_eq!(payload_lines("- a\n\n- b\n\n"), vec!["- a", "", "- b", ""]);
        assert_eq!(payload_lines("\n"), vec![""]);
        assert_eq!(payload_lines(""), Vec::<String>::new());
    }

    #[test]
    fn reads_payload_file_as_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.txt");
        std::fs::write(&path, "- generated\n- second\n").unwrap();

        let loaded = load_payload(&PayloadSource::File(path)).unwrap();
        assert_eq!(loaded, vec!["- generated", "- second"]);
    }

    #[test]
    fn missing_payload_file_is_invalid_content() {
        let err = load_payload(&PayloadSource::File("/nonexistent/items.txt".into())).unwrap_err();
        assert!(matches!(err, EditError::InvalidContent(message) if message.contains("items.txt")));
    }
}
