use thiserror::Error;

/// Failures surfaced by matrix loading, tree reconstruction and scoring.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhyloError {
    /// Unusable input matrix: too few taxa, wrong shape, asymmetric,
    /// non-zero diagonal, or negative distances.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// A tree that is disconnected, cyclic, or has unlabeled leaves.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// Two matrices that do not describe the same taxa.
    #[error("label mismatch: {0}")]
    LabelMismatch(String),

    /// Unrecognised tree building method or scoring policy name.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// Error while reading a PHYLIP matrix
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// The line number (1-based)
        line: usize,
        /// A human-readable message explaining the error
        message: String,
    },
}

impl PhyloError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        PhyloError::Parse {
            line,
            message: message.into(),
        }
    }
}
