pub mod jira;
pub mod sync;

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Top,
    Mid,
    Leaf,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Top, RecordKind::Mid, RecordKind::Leaf];

    /// Kind of the records created beneath this one.
    pub fn child(self) -> Option<Self> {
        match self {
            RecordKind::Top => Some(RecordKind::Mid),
            RecordKind::Mid => Some(RecordKind::Leaf),
            RecordKind::Leaf => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Top => "top-level",
            RecordKind::Mid => "mid-level",
            RecordKind::Leaf => "leaf",
        })
    }
}

/// Issue type name used for each record kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueTypes {
    pub top: String,
    pub mid: String,
    pub leaf: String,
}

impl IssueTypes {
    pub fn name(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Top => &self.top,
            RecordKind::Mid => &self.mid,
            RecordKind::Leaf => &self.leaf,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtraField {
    pub name: String,
    pub value: serde_json::Value,
}

/// Everything needed for one create call.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub project_key: String,
    pub summary: String,
    pub description: String,
    pub kind: RecordKind,
    pub issue_type: String,
    pub parent_key: Option<String>,
    pub extra_field: Option<ExtraField>,
}

/// A record the tracker has accepted, known from then on only by its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub key: String,
    pub kind: RecordKind,
    pub parent_key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("tracker rejected the record (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("tracker response carried no record key")]
    MissingKey,
}

pub trait Tracker {
    /// Create one record and return its key.
    fn create_record(&mut self, record: &NewRecord) -> Result<String, TrackerError>;
}
