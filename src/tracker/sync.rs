use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::{ExtraField, IssueTypes, NewRecord, RecordKind, RemoteRecord, Tracker, TrackerError};
use crate::diagram::Node;
use crate::hierarchy::{Branch, Tree};

/// Fixed inputs of a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub project_key: String,
    pub issue_types: IssueTypes,
    /// Stamped on mid-level records only.
    pub classification: Option<ExtraField>,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: Vec<RemoteRecord>,
}

impl SyncReport {
    pub fn count(&self, kind: RecordKind) -> usize {
        self.created.iter().filter(|r| r.kind == kind).count()
    }
}

/// A write failed. Whatever was created before it stays in the tracker.
#[derive(Debug, thiserror::Error)]
#[error("failed to create a {kind} record after {} records were created", .created.len())]
pub struct SyncError {
    pub kind: RecordKind,
    pub created: Vec<RemoteRecord>,
    #[source]
    pub source: TrackerError,
}

/// Replays a [`Tree`] into a tracker, parents before children.
pub struct TrackerSync<T> {
    tracker: T,
    config: SyncConfig,
}

impl<T: Tracker> TrackerSync<T> {
    pub fn new(tracker: T, config: SyncConfig) -> Self {
        Self { tracker, config }
    }

    /// One create call per node, depth first. Stops at the first failure.
    pub fn run(&mut self, tree: &Tree) -> Result<SyncReport, SyncError> {
        let pb = ProgressBar::new(tree.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} records")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let mut report = SyncReport::default();
        for root in &tree.roots {
            if let Err((kind, source)) =
                self.create_branch(root, RecordKind::Top, None, &mut report, &pb)
            {
                pb.abandon();
                return Err(SyncError {
                    kind,
                    created: report.created,
                    source,
                });
            }
        }

        pb.finish_and_clear();
        info!("Created {} records in project {}", report.created.len(), self.config.project_key);
        Ok(report)
    }

    fn create_branch(
        &mut self,
        branch: &Branch,
        kind: RecordKind,
        parent_key: Option<&str>,
        report: &mut SyncReport,
        pb: &ProgressBar,
    ) -> Result<(), (RecordKind, TrackerError)> {
        let record = self.new_record(&branch.node, kind, parent_key);
        let key = self
            .tracker
            .create_record(&record)
            .map_err(|e| (kind, e))?;

        match parent_key {
            Some(parent) => info!("Created {} {} under {}: {}", kind, key, parent, record.summary),
            None => info!("Created {} {}: {}", kind, key, record.summary),
        }
        report.created.push(RemoteRecord {
            key: key.clone(),
            kind,
            parent_key: record.parent_key,
        });
        pb.inc(1);

        if let Some(child_kind) = kind.child() {
            for child in &branch.children {
                self.create_branch(child, child_kind, Some(&key), report, pb)?;
            }
        }
        Ok(())
    }

    fn new_record(&self, node: &Node, kind: RecordKind, parent_key: Option<&str>) -> NewRecord {
        let extra_field = match kind {
            RecordKind::Mid => self.config.classification.clone(),
            _ => None,
        };
        NewRecord {
            project_key: self.config.project_key.clone(),
            summary: node.summary.clone(),
            description: node.description.clone(),
            kind,
            issue_type: self.config.issue_types.name(kind).to_string(),
            parent_key: parent_key.map(str::to_string),
            extra_field,
        }
    }
}
