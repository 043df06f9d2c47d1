//! Domain error types.

/// Failure of the fund lookup collaborator.
///
/// Transport and data problems are kept apart for logging, but every variant
/// surfaces to the user as the same [`LookupError::user_message`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("fund code is empty")]
    EmptyCode,

    #[error("fund {code} not found")]
    NotFound { code: String },

    #[error("malformed response for fund {code}: {reason}")]
    Malformed { code: String, reason: String },

    #[error("fund data provider unreachable: {reason}")]
    Transport { reason: String },
}

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        "could not fetch fund details, please enter the fund name manually"
    }
}

/// Top-level error type for fundmirror.
#[derive(Debug, thiserror::Error)]
pub enum FundMirrorError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("invalid snapshot: {reason}")]
    Snapshot { reason: String },

    #[error("fund lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("{feature} feature is required for {command}")]
    FeatureDisabled {
        feature: &'static str,
        command: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FundMirrorError {
    /// Process exit status reported by the CLI for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            FundMirrorError::Io(_) | FundMirrorError::FeatureDisabled { .. } => 1,
            FundMirrorError::ConfigParse { .. } | FundMirrorError::ConfigInvalid { .. } => 2,
            FundMirrorError::Storage { .. } => 3,
            FundMirrorError::Snapshot { .. } => 4,
            FundMirrorError::Lookup(_) => 5,
        }
    }
}

impl From<&FundMirrorError> for std::process::ExitCode {
    fn from(err: &FundMirrorError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
