//! Per-component handle on the data layer.
//!
//! A `WearableClient` is created by whoever needs it and passed around
//! explicitly; its connection lives as long as the component owning it.
//! Publishes never block the caller: they run on a spawned task and report
//! back through a `PendingResult`.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use sunshine_core::{Config, SyncError};

use crate::layer::{DataEvent, DataLayer, PutOutcome};
use crate::record::PutDataRequest;
use crate::retry::{self, RetryConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Receives change batches. Batches for one listener are delivered one at
/// a time, in store order.
pub trait DataListener: Send + Sync + 'static {
    fn on_data_changed(&self, events: &[DataEvent]);
}

struct ClientInner {
    layer: Arc<dyn DataLayer>,
    node: String,
    retry: RetryConfig,
    state: Mutex<ConnectionState>,
}

impl ClientInner {
    /// Idempotent: a connected client does nothing.
    fn connect(&self) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        if *state == ConnectionState::Connected {
            return Ok(());
        }

        match self.layer.connect() {
            Ok(()) => {
                *state = ConnectionState::Connected;
                tracing::info!(node = %self.node, "Client has connected");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(node = %self.node, "Connection failed: {}", e);
                Err(e)
            }
        }
    }

    fn put_once(&self, request: &PutDataRequest) -> Result<PutOutcome, SyncError> {
        self.connect()?;
        match self.layer.put_data_item(request) {
            Err(SyncError::ConnectionSuspended) => {
                tracing::warn!(node = %self.node, "Connection suspended");
                *self.state.lock() = ConnectionState::Disconnected;
                Err(SyncError::ConnectionSuspended)
            }
            other => other,
        }
    }
}

#[derive(Clone)]
pub struct WearableClient {
    inner: Arc<ClientInner>,
}

impl WearableClient {
    pub fn new(layer: Arc<dyn DataLayer>, node: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                layer,
                node: node.into(),
                retry: RetryConfig::none(),
                state: Mutex::new(ConnectionState::Disconnected),
            }),
        }
    }

    /// Node name and retry policy taken from `config`
    pub fn from_config(layer: Arc<dyn DataLayer>, config: &Config) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                layer,
                node: config.node_name.clone(),
                retry: RetryConfig::from_sync_config(&config.sync),
                state: Mutex::new(ConnectionState::Disconnected),
            }),
        }
    }

    pub fn node(&self) -> &str {
        &self.inner.node
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.state.lock()
    }

    /// # Errors
    /// `ConnectionFailed` when the layer refuses. Also logged.
    pub fn connect(&self) -> Result<(), SyncError> {
        self.inner.connect()
    }

    pub fn disconnect(&self) {
        let mut state = self.inner.state.lock();
        if *state == ConnectionState::Connected {
            *state = ConnectionState::Disconnected;
            tracing::info!(node = %self.inner.node, "Client disconnected");
        }
    }

    /// Publish on a background task. The outcome is logged there; callers
    /// may additionally await or attach a callback to the returned handle.
    /// Must be called from within a tokio runtime.
    pub fn put_data_item(&self, request: PutDataRequest) -> PendingResult {
        let (tx, rx) = oneshot::channel();
        let path = request.path().to_string();
        let inner = self.inner.clone();

        tokio::spawn(async move {
            let result =
                retry::with_retry(&inner.retry, || async { inner.put_once(&request) }).await;

            match &result {
                Ok(PutOutcome::Changed(item)) => {
                    tracing::debug!(node = %inner.node, path = %item.path, "Data item sent");
                }
                Ok(PutOutcome::Unchanged(item)) => {
                    tracing::debug!(
                        node = %inner.node,
                        path = %item.path,
                        "Data item unchanged; no notification"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        node = %inner.node,
                        path = %request.path(),
                        "Publish failed: {}",
                        e
                    );
                }
            }

            // Receiver may have been dropped by a fire-and-forget caller.
            let _ = tx.send(result);
        });

        PendingResult { path, rx }
    }

    /// Register `listener` for change batches from the layer.
    /// Delivery stops when the returned handle is removed or dropped.
    pub fn add_listener(&self, listener: Arc<dyn DataListener>) -> ListenerHandle {
        let mut rx = self.inner.layer.subscribe();
        let node = self.inner.node.clone();

        let task = tokio::spawn(async move {
            while let Some(batch) = rx.recv().await {
                tracing::trace!(node = %node, events = batch.len(), "Delivering change batch");
                listener.on_data_changed(&batch);
            }
            tracing::debug!(node = %node, "Data layer closed listener channel");
        });

        ListenerHandle { task: Some(task) }
    }
}

/// Completion of a publish started by `WearableClient::put_data_item`.
pub struct PendingResult {
    path: String,
    rx: oneshot::Receiver<Result<PutOutcome, SyncError>>,
}

impl PendingResult {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// # Errors
    /// Whatever the publish reported.
    pub async fn wait(self) -> Result<PutOutcome, SyncError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(SyncError::PublishFailed {
                path: self.path,
                reason: "publish task ended without a result".to_string(),
            }),
        }
    }

    /// Run `callback` with the outcome once it is known.
    pub fn set_result_callback<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<PutOutcome, SyncError>) + Send + 'static,
    {
        tokio::spawn(async move { callback(self.wait().await) })
    }
}

/// Registration returned by `WearableClient::add_listener`
pub struct ListenerHandle {
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn remove(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
