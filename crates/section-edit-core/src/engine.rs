use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::diff::build_unified_diff;
use crate::editor::{EditorOptions, SectionEditor};
use crate::error::{EditResult, ExitCode};
use crate::fs::write_atomic;
use crate::payload::{load_payload, PayloadSource};
use crate::syntax::TemplateSyntax;

#[derive(Debug, Clone)]
pub struct EditOptions {
    pub editor: EditorOptions,
    pub syntax: TemplateSyntax,
    pub dry_run: bool,
    pub backup: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            editor: EditorOptions::default(),
            syntax: TemplateSyntax::default(),
            dry_run: false,
            backup: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditRequest {
    pub path: PathBuf,
    pub section: String,
    pub options: EditOptions,
    pub operation: Operation,
}

#[derive(Debug, Clone)]
pub enum Operation {
    Replace(ReplaceOptions),
    Prepend(PayloadSource),
    Append(PayloadSource),
}

impl Operation {
    fn payload(&self) -> &PayloadSource {
        match self {
            Operation::Replace(opts) => &opts.payload,
            Operation::Prepend(source) | Operation::Append(source) => source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplaceOptions {
    pub payload: PayloadSource,
    /// Overrides the configured padding for this replacement.
    pub padding: Option<bool>,
}

#[derive(Debug)]
pub struct EditOutcome {
    pub exit_code: ExitCode,
    pub changed: bool,
    pub diff: Option<String>,
    pub result: String,
}

pub fn apply_edit(request: EditRequest) -> EditResult<EditOutcome> {
    let content = std::fs::read_to_string(&request.path)?;
    let mut editor = build_editor(&content, &request.options);

    // Fail on a missing section before touching stdin or payload files.
    editor.find_section(&request.section)?;

    let lines = load_payload(request.operation.payload())?;
    debug!(
        "applying {} payload lines to section '{}' in {}",
        lines.len(),
        request.section,
        request.path.display()
    );

    match &request.operation {
        Operation::Replace(opts) => {
            editor.find_and_update_section(&request.section, &lines, opts.padding)?
        }
        Operation::Prepend(_) => editor.prepend_to_section(&request.section, &lines)?,
        Operation::Append(_) => editor.append_to_section(&request.section, &lines)?,
    }

    let result = editor.serialize();
    let Some(diff) = build_unified_diff(&content, &result, &request.path.to_string_lossy()) else {
        return Ok(EditOutcome {
            exit_code: ExitCode::Success,
            changed: false,
            diff: None,
            result,
        });
    };

    if request.options.dry_run {
        info!("dry run: leaving {} untouched", request.path.display());
    } else {
        write_atomic(&request.path, &result, request.options.backup)?;
    }

    Ok(EditOutcome {
        exit_code: ExitCode::Success,
        changed: true,
        diff: Some(diff),
        result,
    })
}

/// Reads `path` and returns the interior lines of `section`.
pub fn read_section(path: &Path, section: &str, options: &EditOptions) -> EditResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let editor = build_editor(&content, options);
    let location = editor.find_section(section)?;
    Ok(location.interior().to_vec())
}

fn build_editor(content: &str, options: &EditOptions) -> SectionEditor {
    SectionEditor::from_text(content)
        .with_options(options.editor)
        .with_syntax(options.syntax.clone())
}
