pub mod diff;
pub mod editor;
pub mod engine;
pub mod error;
pub mod fs;
pub mod payload;
pub mod syntax;

pub use editor::{EditorOptions, SectionEditor, SectionLocation, SectionUpdate};
pub use engine::{
    apply_edit, read_section, EditOptions, EditOutcome, EditRequest, Operation, ReplaceOptions,
};
pub use error::{EditError, EditResult, ExitCode};
pub use payload::PayloadSource;
pub use syntax::{DefaultSyntax, MatchMode, SectionSyntax, SentinelMatcher, TemplateSyntax};
