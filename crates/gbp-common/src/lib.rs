//! GBP Common - Shared types for group-policy management
//!
//! This crate provides the management-plane object model for group-based
//! policy and the contract every policy-object store must honor:
//! - Value objects (resource and tenant ids, protocol, direction, id sets)
//! - Resources (EPGs, contracts, policy rules, classifiers, actions)
//! - The `PolicyStore` resource client and its typed accessor
//! - Error taxonomy shared by the client and workflow crates
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      gbp-workflow                            │
//! │   Selection Resolver  ·  Workflow Engine  ·  Workflows       │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ PolicyStore (create/list/get/update/delete)
//!              ┌─────────────────┴──────────────────┐
//!              ▼                                    ▼
//!   ┌─────────────────────┐              ┌─────────────────────┐
//!   │ NeutronPolicyClient │              │ InMemoryPolicyStore │
//!   │    (gbp-client)     │              │   (tests / dev)     │
//!   └─────────────────────┘              └─────────────────────┘
//! ```
//!
//! The store owns every object. Callers only hold request-scoped copies.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::*;
