//! HTTP API module for the Liquidation Engine.
//!
//! This module exposes the signing and liquidation use cases as JSON
//! endpoints:
//!
//! - `POST /signings`: record a clock signal
//! - `POST /liquidations`: run a new liquidation
//! - `PUT /liquidations/:id`: recompute an existing liquidation

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{LiquidationRunRequest, SigningRequest};
pub use response::{ApiError, ApiErrorResponse, SigningResponse};
pub use state::AppState;
