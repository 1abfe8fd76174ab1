//! Configuration loading and management for the payroll engine.
//!
//! This module loads the engine configuration from a YAML file: calculation
//! parameters, the fact-fetch failure policy, rollback retry settings, the
//! HTTP server address and the demo roster seed.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/engine.yaml").unwrap();
//! println!("Overtime multiplier: {}", loader.config().overtime_multiplier);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, FactFetchPolicy, SeedConfig};
