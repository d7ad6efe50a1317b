//! OTT content API server library.
//!
//! Exposes config, state, error handling, the upload layer and routes so
//! integration tests and the binary entrypoint can both build the router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod resource;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod upload;
