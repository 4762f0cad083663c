//! GBP Client - Neutron group-policy REST client
//!
//! Implements [`gbp_common::PolicyStore`] over HTTP:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create | `POST   /v2.0/grouppolicy/{collection}` with `{"<singular>": {...}}` |
//! | list   | `GET    /v2.0/grouppolicy/{collection}?tenant_id=...` |
//! | get    | `GET    /v2.0/grouppolicy/{collection}/{id}` |
//! | update | `PUT    /v2.0/grouppolicy/{collection}/{id}` with `{"<singular>": {...}}` |
//! | delete | `DELETE /v2.0/grouppolicy/{collection}/{id}` |
//!
//! Every call is a single round trip. Nothing is cached or retried.

#![warn(missing_docs)]

pub mod client;
pub mod config;

pub use client::NeutronPolicyClient;
pub use config::{ClientConfig, ConfigError};
