//! The shared key-value store both devices see.
//!
//! `DataLayer` is the seam where a real wearable transport plugs in.
//! `InMemoryDataLayer` is a single store shared by every client in the
//! process; it is what the binary and the tests run against.

use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

use sunshine_core::SyncError;

use crate::record::{DataItem, PutDataRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEventKind {
    Changed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataEvent {
    pub kind: DataEventKind,
    pub item: DataItem,
}

impl DataEvent {
    pub fn changed(item: DataItem) -> Self {
        Self {
            kind: DataEventKind::Changed,
            item,
        }
    }

    pub fn is_changed_at(&self, path: &str) -> bool {
        self.kind == DataEventKind::Changed && self.item.path == path
    }
}

/// Ordered events delivered together to one subscriber
pub type DataEventBatch = Vec<DataEvent>;
pub type DataEventReceiver = mpsc::UnboundedReceiver<DataEventBatch>;

/// What a successful put did to the store
#[derive(Debug, Clone, PartialEq)]
pub enum PutOutcome {
    /// Payload differed from the stored one; subscribers were notified
    Changed(DataItem),
    /// Payload was identical; nothing was stored or delivered
    Unchanged(DataItem),
}

impl PutOutcome {
    pub fn item(&self) -> &DataItem {
        match self {
            PutOutcome::Changed(item) | PutOutcome::Unchanged(item) => item,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, PutOutcome::Changed(_))
    }
}

/// Transport operations a client needs from the platform
pub trait DataLayer: Send + Sync {
    fn connect(&self) -> Result<(), SyncError>;

    /// Store `request` at its path, last value wins.
    fn put_data_item(&self, request: &PutDataRequest) -> Result<PutOutcome, SyncError>;

    fn get_data_item(&self, path: &str) -> Option<DataItem>;

    /// Remove the item at `path`, returning how many were removed.
    fn delete_data_items(&self, path: &str) -> Result<usize, SyncError>;

    /// Receive every change applied from now on, in application order.
    fn subscribe(&self) -> DataEventReceiver;
}

struct StoredItem {
    item: DataItem,
    canonical: Vec<u8>,
}

struct LayerState {
    items: HashMap<String, StoredItem>,
    subscribers: Vec<mpsc::UnboundedSender<DataEventBatch>>,
    reachable: bool,
    suspended: bool,
}

pub struct InMemoryDataLayer {
    state: Mutex<LayerState>,
}

impl Default for InMemoryDataLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDataLayer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LayerState {
                items: HashMap::new(),
                subscribers: Vec::new(),
                reachable: true,
                suspended: false,
            }),
        }
    }

    /// While unreachable, `connect` fails.
    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().reachable = reachable;
    }

    /// While suspended, puts and deletes fail.
    pub fn suspend(&self) {
        self.state.lock().suspended = true;
    }

    pub fn resume(&self) {
        self.state.lock().suspended = false;
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    fn check_available(state: &LayerState) -> Result<(), SyncError> {
        if state.suspended {
            return Err(SyncError::ConnectionSuspended);
        }
        if !state.reachable {
            return Err(SyncError::ConnectionFailed("peer unreachable".to_string()));
        }
        Ok(())
    }

    /// Deliver under the state lock so every subscriber sees the same order.
    fn dispatch(state: &mut LayerState, batch: DataEventBatch) {
        state
            .subscribers
            .retain(|tx| tx.send(batch.clone()).is_ok());
    }
}

impl DataLayer for InMemoryDataLayer {
    fn connect(&self) -> Result<(), SyncError> {
        let state = self.state.lock();
        if !state.reachable {
            return Err(SyncError::ConnectionFailed("peer unreachable".to_string()));
        }
        Ok(())
    }

    fn put_data_item(&self, request: &PutDataRequest) -> Result<PutOutcome, SyncError> {
        let canonical = request.data().to_canonical_bytes()?;
        let item = request.to_item();

        let mut state = self.state.lock();
        Self::check_available(&state)?;

        if let Some(existing) = state.items.get(request.path()) {
            if existing.canonical == canonical {
                tracing::trace!(path = request.path(), "Put left item unchanged");
                return Ok(PutOutcome::Unchanged(item));
            }
        }

        tracing::trace!(
            path = request.path(),
            urgent = request.is_urgent(),
            "Storing data item"
        );
        state.items.insert(
            item.path.clone(),
            StoredItem {
                item: item.clone(),
                canonical,
            },
        );
        Self::dispatch(&mut state, vec![DataEvent::changed(item.clone())]);

        Ok(PutOutcome::Changed(item))
    }

    fn get_data_item(&self, path: &str) -> Option<DataItem> {
        self.state.lock().items.get(path).map(|s| s.item.clone())
    }

    fn delete_data_items(&self, path: &str) -> Result<usize, SyncError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;

        let removed = state.items.remove(path);
        match removed {
            Some(stored) => {
                Self::dispatch(
                    &mut state,
                    vec![DataEvent {
                        kind: DataEventKind::Deleted,
                        item: stored.item,
                    }],
                );
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn subscribe(&self) -> DataEventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().subscribers.push(tx);
        rx
    }
}
