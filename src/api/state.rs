//! Application state for the payroll API.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::engine::PayrollEngine;

/// Shared application state.
///
/// Holds the payroll engine and the configuration it was built from.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<PayrollEngine>,
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates the application state.
    pub fn new(engine: PayrollEngine, config: ConfigLoader) -> Self {
        Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
        }
    }

    /// Returns a shared handle to the engine.
    pub fn engine(&self) -> &Arc<PayrollEngine> {
        &self.engine
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }
}
