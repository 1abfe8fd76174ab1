//! Request types for the payroll API.

use axum::http::HeaderMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Header carrying the id of the user performing an action.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Actor recorded when no [`ACTOR_HEADER`] is sent.
pub const DEFAULT_ACTOR: &str = "system";

/// Request body for `POST /periods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePeriodRequest {
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
}

/// Reads the acting user from the request headers.
pub(crate) fn actor_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_ACTOR)
        .to_string()
}
