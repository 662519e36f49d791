//! Per-record decision.
//!
//! Memoryless: the outcome depends only on the stored threshold and the
//! freshly fetched snapshot, so an unchanged line item produces the same
//! decision, and the same email, on every run.

use crate::monitor::types::{LineItemSnapshot, TrackedLineItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Delivery finished: drop the row from the sheet, never pause.
    Completed,
    /// Impressions reached the threshold. Only an ACTIVE line item can be
    /// paused; anything else is reported as-is.
    ThresholdReached { should_pause: bool },
    /// Below threshold, keep watching.
    Monitoring,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Completed => "completed",
            Decision::ThresholdReached { .. } => "threshold reached",
            Decision::Monitoring => "still monitoring",
        }
    }
}

pub fn decide(record: &TrackedLineItem, snapshot: &LineItemSnapshot) -> Decision {
    if snapshot.is_completed() {
        Decision::Completed
    } else if snapshot.impressions_delivered >= record.impression_threshold {
        Decision::ThresholdReached {
            should_pause: snapshot.is_active(),
        }
    } else {
        Decision::Monitoring
    }
}
