//! One monitoring run.
//!
//! Records are handled strictly one after another. A failure on one record
//! is logged and the run moves on; only reading or rewriting the worksheet
//! can abort it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::monitor::decision::{decide, Decision};
use crate::monitor::error::ServiceResult;
use crate::monitor::provider::{LineItemService, Notifier, SheetStore};
use crate::monitor::types::{LineItemId, LineItemSnapshot, PauseOutcome, TrackedLineItem};
use crate::notify::StatusNotification;

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub paused: Vec<LineItemId>,
    pub pause_failures: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    /// IDs seen as COMPLETED, in observation order.
    pub completed_ids: Vec<LineItemId>,
    pub rows_removed: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} skipped, {} failed, {} paused, {} completed, {} rows removed, {} emails sent ({} failed)",
            self.processed,
            self.skipped,
            self.failed,
            self.paused.len(),
            self.completed_ids.len(),
            self.rows_removed,
            self.emails_sent,
            self.emails_failed,
        )
    }
}

pub struct LineItemMonitor {
    sheets: Arc<dyn SheetStore>,
    line_items: Arc<dyn LineItemService>,
    notifier: Arc<dyn Notifier>,
}

impl LineItemMonitor {
    pub fn new(
        sheets: Arc<dyn SheetStore>,
        line_items: Arc<dyn LineItemService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            sheets,
            line_items,
            notifier,
        }
    }

    /// Run once over every tracked line item.
    ///
    /// 1. Read and validate the worksheet rows
    /// 2. For each record: fetch, decide, pause if needed, email
    /// 3. If anything completed, rewrite the worksheet without it
    pub async fn run_once(&self) -> ServiceResult<RunReport> {
        let mut report = RunReport::default();

        let worksheet = self.sheets.read_worksheet().await?;
        if worksheet.is_empty() {
            tracing::warn!("Worksheet {} is empty, nothing to monitor", self.sheets.store_name());
            return Ok(report);
        }

        let records = worksheet.records()?;
        tracing::info!(
            "Loaded {} tracked line items from {}",
            records.len(),
            self.sheets.store_name()
        );

        for entry in records {
            let record = match entry {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!("Skipping invalid row: {}", err);
                    report.skipped += 1;
                    continue;
                }
            };

            if let Err(err) = self.process_record(&record, &mut report).await {
                tracing::error!(
                    "Line item {} (row {}) failed: {}",
                    record.line_item_id,
                    record.row_number,
                    err
                );
                report.failed += 1;
            }
        }

        if !report.completed_ids.is_empty() {
            let completed: HashSet<LineItemId> = report.completed_ids.iter().cloned().collect();
            report.rows_removed = self.sheets.remove_line_items(&completed).await?;
        }

        tracing::info!("Run finished: {}", report);
        Ok(report)
    }

    async fn process_record(
        &self,
        record: &TrackedLineItem,
        report: &mut RunReport,
    ) -> ServiceResult<()> {
        let id = &record.line_item_id;

        let snapshot = match self.line_items.fetch_line_item(id).await? {
            Some(snapshot) => snapshot,
            None => {
                tracing::warn!("Line item {} not found on Ad Manager", id);
                LineItemSnapshot::not_found()
            }
        };

        let decision = decide(record, &snapshot);
        match decision {
            Decision::Completed => {
                tracing::info!("Line item {} is completed. Removing from monitoring.", id);
                if !report.completed_ids.contains(id) {
                    report.completed_ids.push(id.clone());
                }
            }
            Decision::ThresholdReached { should_pause: true } => {
                tracing::info!(
                    "Impressions: {}. Pausing line item {}.",
                    snapshot.impressions_delivered,
                    id
                );
                self.pause(id, report).await;
            }
            Decision::ThresholdReached { should_pause: false } => {
                tracing::info!(
                    "Impressions: {}. Line item {} is in status '{}', cannot be paused.",
                    snapshot.impressions_delivered,
                    id,
                    snapshot.status_label()
                );
            }
            Decision::Monitoring => {
                tracing::info!(
                    "Impressions: {} of {}. No need to pause line item {} yet.",
                    snapshot.impressions_delivered,
                    record.impression_threshold,
                    id
                );
            }
        }

        let notification = StatusNotification::new(record, &snapshot, decision);
        match self.notifier.notify(&notification).await {
            Ok(()) => report.emails_sent += 1,
            Err(err) => {
                tracing::error!("Failed to send {} email for line item {}: {}", decision.label(), id, err);
                report.emails_failed += 1;
            }
        }

        report.processed += 1;
        Ok(())
    }

    async fn pause(&self, id: &LineItemId, report: &mut RunReport) {
        match self.line_items.pause_line_item(id).await {
            Ok(PauseOutcome::Paused { .. }) => report.paused.push(id.clone()),
            Ok(PauseOutcome::NotPausable { status }) => {
                tracing::info!("Line item {} changed to '{}' before the pause", id, status);
            }
            Ok(PauseOutcome::NotFound) => {
                tracing::warn!("Line item {} disappeared before the pause", id);
            }
            Err(err) => {
                tracing::error!("Failed to pause line item {}: {}", id, err);
                report.pause_failures += 1;
            }
        }
    }
}
