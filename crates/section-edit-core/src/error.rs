use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    NotFound = 1,
    InvalidArguments = 2,
    Io = 3,
    InvalidContent = 4,
    InvalidPattern = 5,
}

impl ExitCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::NotFound),
            2 => Some(Self::InvalidArguments),
            3 => Some(Self::Io),
            4 => Some(Self::InvalidContent),
            5 => Some(Self::InvalidPattern),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("{name} section could not be identified")]
    SectionNotFound { name: String },

    #[error("invalid sentinel pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("section range {start}..{end} is out of bounds for a document of {len} lines")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid content source: {0}")]
    InvalidContent(String),
}

impl EditError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::SectionNotFound { .. } => ExitCode::NotFound,
            Self::InvalidPattern { .. } => ExitCode::InvalidPattern,
            Self::InvalidRange { .. } | Self::InvalidArguments(_) => ExitCode::InvalidArguments,
            Self::Io(_) => ExitCode::Io,
            Self::InvalidContent(_) => ExitCode::InvalidContent,
        }
    }

    pub fn section_not_found(name: impl Into<String>) -> Self {
        Self::SectionNotFound { name: name.into() }
    }
}

pub type EditResult<T> = Result<T, EditError>;
