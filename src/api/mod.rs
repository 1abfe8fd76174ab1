//! HTTP API for the payroll engine.
//!
//! This module exposes period creation, payroll runs, payslip lookup and
//! period summaries as REST endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CreatePeriodRequest, ACTOR_HEADER, DEFAULT_ACTOR};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
