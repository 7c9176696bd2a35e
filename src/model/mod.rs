//! Desired-state model: stacks, resources, and deferred references.

mod endpoint_service;
mod stack;
mod token;

pub use endpoint_service::{
    EndpointService, EndpointServicePermissions, EndpointServiceSpec, EndpointServiceStatus,
    PermissionsSpec,
};
pub use stack::{Stack, StackId};
pub use token::{LiteralToken, StringToken, resolve_all};
