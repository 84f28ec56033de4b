//! Integration tests
//!
//! Every test runs the real router against an in-memory registry and a
//! local stub quote provider.

mod common;
mod config_test;
mod ws_test;
