//! Async use cases over the store ports.
//!
//! [`SigningReconciler`] records clock signals; [`LiquidationOrchestrator`]
//! runs and recomputes payroll settlements.

mod liquidation;
mod signing;

pub use liquidation::{
    LiquidationOrchestrator, LiquidationOutcome, LiquidationPorts, LiquidationRequest,
};
pub use signing::{SigningOutcome, SigningReconciler, SigningSignal};
