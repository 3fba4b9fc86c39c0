//! HTTP API: server wiring, routing, and request/response mapping for the
//! storefront catalog.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod store;
