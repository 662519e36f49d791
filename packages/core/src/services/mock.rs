//! In-memory stand-ins for the Sheets, Ad Manager and SMTP services.
//!
//! Used by the run-loop tests and by integration tests that only need one
//! real client.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::monitor::error::{ServiceError, ServiceResult};
use crate::monitor::provider::{LineItemService, Notifier, SheetStore};
use crate::monitor::types::{LineItemId, LineItemSnapshot, LineItemStatus, PauseOutcome};
use crate::monitor::worksheet::{Cell, Worksheet};
use crate::notify::StatusNotification;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MockSheetStore {
    worksheet: Mutex<Worksheet>,
    clears: AtomicUsize,
    fail_read: bool,
    fail_append: bool,
}

impl MockSheetStore {
    pub fn new(worksheet: Worksheet) -> Self {
        Self {
            worksheet: Mutex::new(worksheet),
            ..Self::default()
        }
    }

    pub fn with_values(values: Vec<Vec<Cell>>) -> Self {
        Self::new(Worksheet::from_values(values))
    }

    pub fn failing_read(mut self) -> Self {
        self.fail_read = true;
        self
    }

    pub fn failing_append(mut self) -> Self {
        self.fail_append = true;
        self
    }

    pub fn worksheet(&self) -> Worksheet {
        lock(&self.worksheet).clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SheetStore for MockSheetStore {
    async fn read_worksheet(&self) -> ServiceResult<Worksheet> {
        if self.fail_read {
            return Err(ServiceError::sheet("mock read failure"));
        }
        Ok(self.worksheet())
    }

    async fn clear_worksheet(&self) -> ServiceResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *lock(&self.worksheet) = Worksheet::default();
        Ok(())
    }

    async fn append_rows(&self, rows: Vec<Vec<Cell>>) -> ServiceResult<()> {
        if self.fail_append {
            return Err(ServiceError::sheet("mock append failure"));
        }

        let mut sheet = lock(&self.worksheet);
        if sheet.is_empty() {
            *sheet = Worksheet::from_values(rows);
        } else {
            sheet.rows.extend(rows);
        }
        Ok(())
    }

    fn store_name(&self) -> &str {
        "mock-sheet"
    }
}

#[derive(Default)]
pub struct MockLineItemService {
    items: Mutex<HashMap<LineItemId, LineItemSnapshot>>,
    fetch_errors: HashSet<LineItemId>,
    pause_errors: HashSet<LineItemId>,
    fetches: AtomicUsize,
    pause_requests: Mutex<Vec<LineItemId>>,
    pause_actions: Mutex<Vec<LineItemId>>,
}

impl MockLineItemService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_item(self, id: u64, impressions: u64, status: LineItemStatus) -> Self {
        lock(&self.items).insert(LineItemId::from(id), LineItemSnapshot::new(impressions, status));
        self
    }

    pub fn with_fetch_error(mut self, id: u64) -> Self {
        self.fetch_errors.insert(LineItemId::from(id));
        self
    }

    pub fn with_pause_error(mut self, id: u64) -> Self {
        self.pause_errors.insert(LineItemId::from(id));
        self
    }

    /// Every call to `pause_line_item`, pausable or not.
    pub fn pause_requests(&self) -> Vec<LineItemId> {
        lock(&self.pause_requests).clone()
    }

    /// Line items the pause action actually ran against.
    pub fn pause_actions(&self) -> Vec<LineItemId> {
        lock(&self.pause_actions).clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LineItemService for MockLineItemService {
    async fn fetch_line_item(&self, id: &LineItemId) -> ServiceResult<Option<LineItemSnapshot>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fetch_errors.contains(id) {
            return Err(ServiceError::network(format!("mock fetch failure for {}", id)));
        }
        Ok(lock(&self.items).get(id).cloned())
    }

    async fn pause_line_item(&self, id: &LineItemId) -> ServiceResult<PauseOutcome> {
        lock(&self.pause_requests).push(id.clone());
        if self.pause_errors.contains(id) {
            return Err(ServiceError::Fault {
                message: format!("mock pause failure for {}", id),
            });
        }

        let mut items = lock(&self.items);
        let Some(snapshot) = items.get_mut(id) else {
            return Ok(PauseOutcome::NotFound);
        };

        match snapshot.status.clone() {
            Some(LineItemStatus::Active) => {
                snapshot.status = Some(LineItemStatus::Paused);
                lock(&self.pause_actions).push(id.clone());
                Ok(PauseOutcome::Paused { changes: 1 })
            }
            Some(status) => Ok(PauseOutcome::NotPausable { status }),
            None => Ok(PauseOutcome::NotFound),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<StatusNotification>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every attempt but reports each one as failed.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<StatusNotification> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &StatusNotification) -> ServiceResult<()> {
        lock(&self.sent).push(notification.clone());
        if self.failing {
            return Err(ServiceError::email("mock SMTP failure"));
        }
        Ok(())
    }
}
