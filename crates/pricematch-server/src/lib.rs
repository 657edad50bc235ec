//! HTTP gateway layer for the pricematch catalog pipeline.
//!
//! This crate is primarily used by the `pricematch` server binary; the
//! gateway module is public so integration tests can build the router
//! against mock collaborators.

pub mod gateway;
