//! Application state for the Liquidation Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::service::{LiquidationOrchestrator, LiquidationPorts, SigningReconciler};
use crate::store::Notifier;

/// Shared application state.
///
/// Holds the loaded rules and the two use cases built over the store ports.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    signing: Arc<SigningReconciler>,
    liquidations: Arc<LiquidationOrchestrator>,
}

impl AppState {
    /// Wires the use cases over the given ports.
    pub fn new(config: ConfigLoader, ports: LiquidationPorts, notifier: Arc<dyn Notifier>) -> Self {
        let signing = SigningReconciler::new(
            ports.periods.clone(),
            ports.employees.clone(),
            notifier,
            config.rules().signing,
        );
        let liquidations = LiquidationOrchestrator::new(ports, &config);

        Self {
            config: Arc::new(config),
            signing: Arc::new(signing),
            liquidations: Arc::new(liquidations),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// The signing use case.
    pub fn signing(&self) -> &SigningReconciler {
        &self.signing
    }

    /// The liquidation use case.
    pub fn liquidations(&self) -> &LiquidationOrchestrator {
        &self.liquidations
    }
}
