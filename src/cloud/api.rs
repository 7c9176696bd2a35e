//! The consumed cloud API boundary for endpoint services.
//!
//! Expressed as a narrow trait so an in-memory double can substitute for
//! tests without reaching a real network. A production implementation
//! marshals these calls onto the provider's wire format.

use async_trait::async_trait;

use crate::error::CloudError;
use crate::tracking::TagFilter;

use super::types::{
    CreateEndpointServiceRequest, ExistingEndpointService, ModifyEndpointServiceRequest,
    ModifyPermissionsRequest, PermissionsInfo,
};

/// Blocking (awaited) operations against the endpoint service API.
///
/// Every call is a single remote round trip; retry policy lives with the
/// caller, not here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndpointServiceApi: Send + Sync {
    /// Creates an endpoint service configuration.
    ///
    /// Returns the remote-assigned service ID.
    async fn create_endpoint_service(
        &self,
        request: &CreateEndpointServiceRequest,
    ) -> Result<String, CloudError>;

    /// Modifies an endpoint service configuration.
    async fn modify_endpoint_service(
        &self,
        request: &ModifyEndpointServiceRequest,
    ) -> Result<(), CloudError>;

    /// Deletes the endpoint service configurations with the given IDs.
    async fn delete_endpoint_services(&self, service_ids: &[String]) -> Result<(), CloudError>;

    /// Fetches the allow-listed principals of an endpoint service.
    async fn describe_permissions(&self, service_id: &str) -> Result<PermissionsInfo, CloudError>;

    /// Applies an all-or-nothing change to the allow-listed principals.
    async fn modify_permissions(&self, request: &ModifyPermissionsRequest)
    -> Result<(), CloudError>;

    /// Lists live endpoint services matching any of the tag filters.
    async fn list_endpoint_services(
        &self,
        filters: &[TagFilter],
    ) -> Result<Vec<ExistingEndpointService>, CloudError>;
}
