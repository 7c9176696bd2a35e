//! Cloud API boundary: the consumed remote interface and its types.

mod api;
mod types;

pub use api::EndpointServiceApi;
pub use types::{
    CreateEndpointServiceRequest, ExistingEndpointService, ModifyEndpointServiceRequest,
    ModifyPermissionsRequest, PermissionsInfo, TagMap,
};

#[cfg(test)]
pub use api::MockEndpointServiceApi;
