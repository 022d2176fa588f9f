//! services/api/src/lib.rs
//!
//! Library half of the `api` service, shared by the server, the OpenAPI
//! generator and the `catalog-sync` client.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
