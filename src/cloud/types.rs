//! Request and snapshot types for the endpoint service cloud API.
//!
//! Requests distinguish "leave unchanged" (`None` / empty) from "clear the
//! field" (an explicit remove flag), because omission alone cannot signal
//! clearing on the remote API.

use serde::Serialize;
use std::collections::BTreeMap;

/// Tag key/value mapping, ordered for deterministic requests.
pub type TagMap = BTreeMap<String, String>;

/// Request to create an endpoint service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateEndpointServiceRequest {
    /// Whether connection requests must be manually accepted.
    pub acceptance_required: Option<bool>,
    /// Private DNS name for the service.
    pub private_dns_name: Option<String>,
    /// Resolved ARNs of the backing network load balancers.
    pub network_load_balancer_arns: Vec<String>,
    /// Tags written on creation, ownership tags included.
    pub tags: TagMap,
}

/// Request to modify an endpoint service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifyEndpointServiceRequest {
    /// Remote ID of the service to modify.
    pub service_id: String,
    /// New acceptance setting; `None` leaves it unchanged.
    pub acceptance_required: Option<bool>,
    /// New private DNS name; `None` leaves it unchanged.
    pub private_dns_name: Option<String>,
    /// Clears the private DNS name; mutually exclusive with setting it.
    pub remove_private_dns_name: bool,
    /// Load balancer ARNs to associate.
    pub add_network_load_balancer_arns: Vec<String>,
    /// Load balancer ARNs to disassociate.
    pub remove_network_load_balancer_arns: Vec<String>,
}

impl ModifyEndpointServiceRequest {
    /// Returns true if the request carries any change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.acceptance_required.is_some()
            || self.private_dns_name.is_some()
            || self.remove_private_dns_name
            || !self.add_network_load_balancer_arns.is_empty()
            || !self.remove_network_load_balancer_arns.is_empty()
    }
}

/// Request to modify the allow-listed principals of an endpoint service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifyPermissionsRequest {
    /// Remote ID of the service.
    pub service_id: String,
    /// Principals to allow.
    pub add_allowed_principals: Vec<String>,
    /// Principals to revoke.
    pub remove_allowed_principals: Vec<String>,
}

/// Fresh snapshot of one live endpoint service.
///
/// Fetched anew every pass; never cached between passes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExistingEndpointService {
    /// Remote service ID.
    pub service_id: String,
    /// Whether connection requests must be manually accepted.
    pub acceptance_required: bool,
    /// Private DNS name, if one is set.
    pub private_dns_name: Option<String>,
    /// ARNs of the associated network load balancers.
    pub network_load_balancer_arns: Vec<String>,
    /// Tags on the live object.
    pub tags: TagMap,
}

/// Snapshot of the allow-listed principals of one endpoint service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionsInfo {
    /// Remote service ID.
    pub service_id: String,
    /// Currently allowed principals.
    pub allowed_principals: Vec<String>,
}
