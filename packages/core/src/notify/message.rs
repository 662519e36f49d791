use crate::monitor::decision::Decision;
use crate::monitor::types::{LineItemId, LineItemSnapshot, LineItemStatus, TrackedLineItem};

/// Everything needed to render one status email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotification {
    pub line_item_id: LineItemId,
    pub impressions: u64,
    pub threshold: u64,
    pub status: Option<LineItemStatus>,
    pub decision: Decision,
}

impl StatusNotification {
    pub fn new(record: &TrackedLineItem, snapshot: &LineItemSnapshot, decision: Decision) -> Self {
        Self {
            line_item_id: record.line_item_id.clone(),
            impressions: snapshot.impressions_delivered,
            threshold: record.impression_threshold,
            status: snapshot.status.clone(),
            decision,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(LineItemStatus::Completed)
    }

    pub fn subject(&self, prefix: &str) -> String {
        format!("{}Line Item {} Status Update", prefix, self.line_item_id)
    }

    /// The completed body is used iff the status is COMPLETED; every other
    /// status gets the monitoring body.
    pub fn body(&self) -> String {
        if self.is_completed() {
            format!(
                "Hi,\n\n\
                 The line item {} has completed its delivery with {} impressions.\n\
                 The line item will not be paused as it is completed.\n",
                self.line_item_id, self.impressions
            )
        } else {
            format!(
                "Hi,\n\n\
                 The line item {} has delivered {} impressions.\n\
                 Monitoring continues. The line item will be paused upon reaching the threshold of {}.\n",
                self.line_item_id, self.impressions, self.threshold
            )
        }
    }
}
