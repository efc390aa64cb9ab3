//! claimlens: segment analysis of vehicle insurance claims
//!
//! A library for loading a claims dataset, normalizing it, and producing
//! segment breakdowns, per-warranty analysis plans and an illustrative
//! loss indicator.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
