//! Recoverable conditions recorded on an analysis result.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FwError;

/// Standardized kinds of recoverable issues encountered during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum IssueKind {
    MalformedStructure,
    ToolUnavailable,
    ExtractionWriteFailure,
    Timeout,
    Cancelled,
    IncompleteArtifact,
    UnknownPlatformHint,
    Other,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use IssueKind::*;
        let s = match self {
            MalformedStructure => "MalformedStructure",
            ToolUnavailable => "ToolUnavailable",
            ExtractionWriteFailure => "ExtractionWriteFailure",
            Timeout => "Timeout",
            Cancelled => "Cancelled",
            IncompleteArtifact => "IncompleteArtifact",
            UnknownPlatformHint => "UnknownPlatformHint",
            Other => "Other",
        };
        f.write_str(s)
    }
}

/// Concrete issue with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<FwError> for Issue {
    fn from(err: FwError) -> Self {
        let kind = match &err {
            FwError::MalformedStructure(_) => IssueKind::MalformedStructure,
            FwError::ToolUnavailable(_) => IssueKind::ToolUnavailable,
            FwError::ExtractionWriteFailure { .. } => IssueKind::ExtractionWriteFailure,
            FwError::Timeout { .. } => IssueKind::Timeout,
            FwError::Cancelled => IssueKind::Cancelled,
            _ => IssueKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
