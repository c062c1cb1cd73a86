//! Integration tests
//!
//! `router_tests` drive the router in-process against the in-memory store;
//! `api_tests` hit a running server and are ignored by default.

mod api_tests;
mod router_tests;
