//! planboard: plans of todos and notes behind a small REST API.
//!
//! - [`db`]: the plan document store.
//! - [`validation`]: create-time rules for plan bodies.
//! - [`api`]: HTTP handlers and router.
//! - [`client`]: typed HTTP client for the API.
//! - [`ui`]: client-side state for the plan board UI.
//! - [`config`]: layered server configuration.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod models;
pub mod ui;
pub mod validation;
