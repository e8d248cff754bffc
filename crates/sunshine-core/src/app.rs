use anyhow::Result;
use std::sync::Arc;

use crate::{Component, ComponentContext, Config};

/// Owns the configuration and the components of one process, and drives
/// their start/stop lifecycle.
pub struct App {
    config: Arc<Config>,
    components: Vec<Box<dyn Component>>,
    context: ComponentContext,
}

impl App {
    /// Create an application around an already-loaded configuration
    pub fn with_config(config: Config) -> Self {
        let config = Arc::new(config);
        let context = ComponentContext::new(config.clone());

        Self {
            config,
            components: Vec::new(),
            context,
        }
    }

    pub fn register_component(&mut self, component: Box<dyn Component>) {
        tracing::info!("Registering component: {}", component.name());
        self.components.push(component);
    }

    /// Start all registered components in registration order
    pub fn start(&mut self) -> Result<()> {
        tracing::info!(
            node = %self.config.node_name,
            "Starting {} components",
            self.components.len()
        );

        for component in &mut self.components {
            tracing::debug!("Starting component: {}", component.name());
            component.start(&self.context)?;
        }

        Ok(())
    }

    /// Stop all components. Errors are logged, not propagated, so every
    /// component gets its chance to release resources.
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down");

        for component in self.components.iter_mut().rev() {
            tracing::debug!("Stopping component: {}", component.name());
            if let Err(e) = component.stop() {
                tracing::error!("Error stopping component {}: {}", component.name(), e);
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn components(&self) -> &[Box<dyn Component>] {
        &self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        id: String,
        started: Arc<AtomicUsize>,
        stopped: Arc<AtomicUsize>,
        fail_stop: bool,
    }

    impl Component for Probe {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.id
        }

        fn start(&mut self, _ctx: &ComponentContext) -> Result<()> {
            self.started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.stopped.fetch_add(1, Ordering::SeqCst);
            if self.fail_stop {
                anyhow::bail!("stop failed");
            }
            Ok(())
        }
    }

    #[test]
    fn test_shutdown_stops_every_component_even_on_error() {
        let started = Arc::new(AtomicUsize::new(0));
        let stopped = Arc::new(AtomicUsize::new(0));
        let mut app = App::with_config(Config::default());

        for (i, fail_stop) in [true, false].into_iter().enumerate() {
            app.register_component(Box::new(Probe {
                id: format!("probe-{}", i),
                started: started.clone(),
                stopped: stopped.clone(),
                fail_stop,
            }));
        }

        app.start().unwrap();
        assert_eq!(started.load(Ordering::SeqCst), 2);

        app.shutdown().unwrap();
        assert_eq!(stopped.load(Ordering::SeqCst), 2);
        assert_eq!(app.components().len(), 2);
        assert_eq!(app.components()[0].id(), "probe-0");
    }
}
