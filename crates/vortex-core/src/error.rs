use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for script-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    TaskNotFound,
    AmbiguousId,
    InvalidFileType,
    SourceUnavailable,
    ExportWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::TaskNotFound => "E2001",
            Self::AmbiguousId => "E2004",
            Self::InvalidFileType => "E4001",
            Self::SourceUnavailable => "E4002",
            Self::ExportWriteFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::AmbiguousId => "Ambiguous task ID",
            Self::InvalidFileType => "Unsupported file type",
            Self::SourceUnavailable => "Task source unavailable",
            Self::ExportWriteFailed => "Export write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .vortex/config.toml and retry."),
            Self::TaskNotFound => Some("Run `vx list` to see the IDs of loaded tasks."),
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::InvalidFileType => Some("Please upload a CSV file."),
            Self::SourceUnavailable => Some("Check the source URL or network and run refresh."),
            Self::ExportWriteFailed => Some("Check disk space and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by the vortex library.
#[derive(Debug, thiserror::Error)]
pub enum VortexError {
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    #[error("ambiguous task id '{prefix}' matches {}", .matches.join(", "))]
    AmbiguousId {
        prefix: String,
        matches: Vec<String>,
    },

    #[error("unsupported file type for {}: expected a .csv file", .path.display())]
    InvalidFileType { path: PathBuf },

    #[error("failed to load tasks from {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    #[error("failed to parse {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("failed to write export {}: {source}", .path.display())]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VortexError {
    /// The stable machine code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::TaskNotFound { .. } => ErrorCode::TaskNotFound,
            Self::AmbiguousId { .. } => ErrorCode::AmbiguousId,
            Self::InvalidFileType { .. } => ErrorCode::InvalidFileType,
            Self::SourceUnavailable { .. } => ErrorCode::SourceUnavailable,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::ExportWrite { .. } => ErrorCode::ExportWriteFailed,
        }
    }

    /// Remediation text for the operator.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code()
            .hint()
            .unwrap_or_else(|| self.error_code().message())
            .to_string()
    }
}
