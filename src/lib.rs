//! stock-pulse: Watchlist quote tracker with live price streaming
//!
//! This library provides the core components for:
//! - Quote lookups against a Yahoo-Finance-style HTTP provider
//! - A durable SQLite registry of tracked symbols
//! - A background refresh scheduler with per-symbol failure isolation
//! - Non-blocking fan-out of price updates to subscribers
//! - An HTTP/WebSocket API over all of the above
//! - Structured logging and Prometheus metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod hub;
pub mod quote;
pub mod registry;
pub mod scheduler;
pub mod telemetry;
