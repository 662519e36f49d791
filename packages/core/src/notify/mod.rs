//! Stakeholder notifications
//!
//! One plain-text status email per processed line item.

pub mod email;
pub mod message;

pub use email::SmtpNotifier;
pub use message::StatusNotification;
