//! Line Item Monitoring
//!
//! Reads the tracked line items, checks each one against Ad Manager,
//! pauses those over threshold, emails a status update and prunes
//! completed items from the worksheet.

pub mod decision;
pub mod error;
pub mod provider;
pub mod runner;
pub mod types;
pub mod worksheet;

pub use decision::{decide, Decision};
pub use error::{RecordError, ServiceError, ServiceResult};
pub use provider::{LineItemService, Notifier, SheetStore};
pub use runner::{LineItemMonitor, RunReport};
pub use types::*;
pub use worksheet::Worksheet;
