//! Payroll Run Engine
//!
//! This crate manages payroll periods through their `pending -> processing ->
//! completed` lifecycle, computes one payslip per employee per period from
//! attendance, overtime and reimbursement records, and reports per-period
//! payout summaries. Runs can be cancelled cooperatively and revert the period
//! to `pending` when they do not finish.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
