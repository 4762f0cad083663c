//! Group-Policy Domain Model
//!
//! - **Value Objects**: ResourceId, TenantId, IdSet, Protocol, Direction
//! - **Resources**: EndpointGroup, Contract, PolicyRule, PolicyClassifier, PolicyAction
//! - **Store**: the PolicyStore resource client, typed accessor, in-memory store
//!
//! Cross-references are held by id only. Creating an EPG records the contract
//! ids on the EPG and never touches the contracts themselves.

pub mod value_objects;
pub mod resources;
pub mod store;
pub mod memory;

pub use value_objects::*;
pub use resources::*;
pub use store::*;
pub use memory::InMemoryPolicyStore;
