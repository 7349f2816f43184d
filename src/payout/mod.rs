//! Payout engine module.
//!
//! The deterministic heart of the application: pure payout calculation,
//! show reconciliation, and retained-funds allocation, plus the services and
//! HTTP handlers that drive them. Everything an admin previews client-side
//! is recomputed here identically at save time.

pub mod allocation;
pub mod calculators;
pub mod queries;
pub mod reconcile;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{compute_payout, round_rupees, PayoutConfig, PayoutInput, ShowFinancials};
pub use reconcile::{reconcile, Reconciliation, RefundBreakdown};
pub use routes::router;
pub use services::PayoutError;
