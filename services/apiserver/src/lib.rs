//! Checkvault API server library crate.
//!
//! # Purpose
//! Exposes the HTTP surface, request authentication, configuration, and
//! storage implementations for use by the binary and tests.
//!
//! # Notes
//! Every decision about who may do what is delegated to `checkvault-authz`;
//! handlers here only load records and translate outcomes into responses.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
