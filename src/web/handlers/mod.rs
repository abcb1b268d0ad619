//! # Request Handlers

pub mod health;
pub mod metrics;
