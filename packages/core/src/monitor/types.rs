//! Core types for line item monitoring

use std::fmt;

/// Numeric Ad Manager line item ID, kept as its decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineItemId(String);

impl LineItemId {
    /// Accepts a non-empty run of ASCII digits, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for LineItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery status as reported by Ad Manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemStatus {
    Active,
    Paused,
    Completed,
    Other(String),
}

impl LineItemStatus {
    pub fn from_api(raw: &str) -> Self {
        match raw.trim() {
            "ACTIVE" => Self::Active,
            "PAUSED" => Self::Paused,
            "COMPLETED" => Self::Completed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::Completed => "COMPLETED",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for LineItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One worksheet row, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedLineItem {
    pub line_item_id: LineItemId,
    pub impression_threshold: u64,
    /// 1-based sheet row, header included.
    pub row_number: usize,
}

/// Fresh delivery figures for one line item. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemSnapshot {
    pub impressions_delivered: u64,
    pub status: Option<LineItemStatus>,
}

impl LineItemSnapshot {
    pub fn new(impressions_delivered: u64, status: LineItemStatus) -> Self {
        Self {
            impressions_delivered,
            status: Some(status),
        }
    }

    /// What a line item missing from Ad Manager looks like.
    pub fn not_found() -> Self {
        Self {
            impressions_delivered: 0,
            status: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(LineItemStatus::Completed)
    }

    pub fn is_active(&self) -> bool {
        self.status == Some(LineItemStatus::Active)
    }

    pub fn status_label(&self) -> &str {
        self.status.as_ref().map_or("NOT_FOUND", LineItemStatus::as_str)
    }
}

/// Result of asking Ad Manager to pause a line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseOutcome {
    /// The pause action ran; `changes` is the platform's change count.
    Paused { changes: u64 },
    /// The re-fetched status was not ACTIVE, so no action was sent.
    NotPausable { status: LineItemStatus },
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_item_id_accepts_digits_only() {
        assert_eq!(LineItemId::parse(" 6543210 ").unwrap().as_str(), "6543210");
        assert!(LineItemId::parse("").is_none());
        assert!(LineItemId::parse("12a").is_none());
        assert!(LineItemId::parse("-12").is_none());
        assert!(LineItemId::parse("1.5").is_none());
    }

    #[test]
    fn status_round_trips_known_and_unknown_values() {
        assert_eq!(LineItemStatus::from_api("ACTIVE"), LineItemStatus::Active);
        assert_eq!(LineItemStatus::from_api("COMPLETED"), LineItemStatus::Completed);
        let other = LineItemStatus::from_api("READY");
        assert_eq!(other, LineItemStatus::Other("READY".to_string()));
        assert_eq!(other.to_string(), "READY");
    }

    #[test]
    fn not_found_snapshot_has_zero_impressions_and_no_status() {
        let snapshot = LineItemSnapshot::not_found();
        assert_eq!(snapshot.impressions_delivered, 0);
        assert!(!snapshot.is_active());
        assert!(!snapshot.is_completed());
        assert_eq!(snapshot.status_label(), "NOT_FOUND");
    }
}
