use anyhow::Result;
use std::sync::Arc;

use crate::Config;

/// A long-lived piece of one device's sync stack (a publisher, a listener,
/// or a bundle of both). Owns its transport client; connecting and
/// subscribing happen in `start`, releasing them in `stop`.
pub trait Component: Send + Sync {
    /// Unique identifier for this component
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Acquire resources (connect, register listeners)
    fn start(&mut self, ctx: &ComponentContext) -> Result<()>;

    /// Release resources. Must be safe to call on a component that never started.
    fn stop(&mut self) -> Result<()>;
}

/// Context provided to components when they start
pub struct ComponentContext {
    pub config: Arc<Config>,
}

impl ComponentContext {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}
