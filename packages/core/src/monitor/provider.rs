//! Service interfaces used by the monitoring run
//!
//! Keeps the run loop independent of Google Sheets, Ad Manager and SMTP so
//! it can be driven by in-memory fakes.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::monitor::error::ServiceResult;
use crate::monitor::types::{LineItemId, LineItemSnapshot, LineItemStatus, PauseOutcome};
use crate::monitor::worksheet::{Cell, Worksheet};
use crate::notify::StatusNotification;

/// The tracking worksheet: a source of records and the target of the
/// post-run rewrite.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read the whole worksheet, header row first.
    async fn read_worksheet(&self) -> ServiceResult<Worksheet>;

    /// Remove every value from the worksheet, keeping the tab itself.
    async fn clear_worksheet(&self) -> ServiceResult<()>;

    /// Append rows after the last non-empty row.
    async fn append_rows(&self, rows: Vec<Vec<Cell>>) -> ServiceResult<()>;

    /// Rewrite the worksheet without the rows for `completed`.
    ///
    /// Re-reads the sheet, clears it, then appends the header and every
    /// remaining row. Not atomic: if the append fails after the clear, the
    /// sheet is left empty or partially repopulated. Returns the number of
    /// rows removed.
    async fn remove_line_items(&self, completed: &HashSet<LineItemId>) -> ServiceResult<usize> {
        let current = self.read_worksheet().await?;
        let retained = current.without_line_items(completed);

        self.clear_worksheet().await?;

        if current.is_empty() {
            tracing::info!("No current data available to append");
            return Ok(0);
        }

        let removed = current.rows.len() - retained.rows.len();
        self.append_rows(retained.to_values()).await?;

        tracing::info!(
            "Worksheet rewritten: {} rows kept, {} removed",
            retained.rows.len(),
            removed
        );
        Ok(removed)
    }

    /// Name used in log lines.
    fn store_name(&self) -> &str;
}

/// Read and pause access to line items on the ad platform.
#[async_trait]
pub trait LineItemService: Send + Sync {
    /// Fetch impressions and status in one query. `None` when the platform
    /// has no line item with this ID.
    async fn fetch_line_item(&self, id: &LineItemId) -> ServiceResult<Option<LineItemSnapshot>>;

    /// Pause the line item if, re-fetched, it is ACTIVE.
    async fn pause_line_item(&self, id: &LineItemId) -> ServiceResult<PauseOutcome>;

    /// Impressions delivered so far, 0 for an unknown line item.
    async fn fetch_impressions(&self, id: &LineItemId) -> ServiceResult<u64> {
        Ok(self
            .fetch_line_item(id)
            .await?
            .map_or(0, |snapshot| snapshot.impressions_delivered))
    }

    async fn fetch_status(&self, id: &LineItemId) -> ServiceResult<Option<LineItemStatus>> {
        Ok(self
            .fetch_line_item(id)
            .await?
            .and_then(|snapshot| snapshot.status))
    }
}

/// Delivery of one status message per processed line item.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &StatusNotification) -> ServiceResult<()>;
}
