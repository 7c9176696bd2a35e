//! Desired-state model for VPC endpoint services.
//!
//! A desired resource carries a logical ID (stable within its stack), a
//! typed spec, and a status cell populated after a successful remote
//! mutation. Dependent resources read the status through deferred tokens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

use crate::cloud::TagMap;
use crate::error::TokenError;

use super::stack::StackId;
use super::token::StringToken;

/// Desired configuration of a VPC endpoint service.
#[derive(Debug, Default)]
pub struct EndpointServiceSpec {
    /// Whether connection requests must be manually accepted.
    ///
    /// `None` means unset: creation uses the remote default and updates
    /// leave the field untouched.
    pub acceptance_required: Option<bool>,
    /// Private DNS name for the service.
    ///
    /// `None` on update clears any name set on the live object.
    pub private_dns_name: Option<String>,
    /// Network load balancers backing the service, as deferred references.
    pub network_load_balancer_arns: Vec<Arc<dyn StringToken>>,
    /// User-supplied tags, merged under the ownership tags.
    pub tags: TagMap,
}

/// Remote-assigned attributes of a created endpoint service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointServiceStatus {
    /// Remote service ID, stable across updates.
    pub service_id: String,
}

/// A desired VPC endpoint service within a stack.
#[derive(Debug)]
pub struct EndpointService {
    stack_id: StackId,
    id: String,
    /// Desired configuration.
    pub spec: EndpointServiceSpec,
    status: RwLock<Option<EndpointServiceStatus>>,
}

impl EndpointService {
    /// Creates a new desired endpoint service.
    #[must_use]
    pub fn new(stack_id: StackId, id: impl Into<String>, spec: EndpointServiceSpec) -> Self {
        Self {
            stack_id,
            id: id.into(),
            spec,
            status: RwLock::new(None),
        }
    }

    /// Returns the logical ID, stable within the stack.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the owning stack's identity.
    #[must_use]
    pub const fn stack_id(&self) -> &StackId {
        &self.stack_id
    }

    /// Returns the current status, if a remote mutation has succeeded.
    #[must_use]
    pub fn status(&self) -> Option<EndpointServiceStatus> {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records the status after a successful remote mutation.
    ///
    /// Visible to deferred references of dependent resources processed
    /// later in the same pass.
    pub fn set_status(&self, status: EndpointServiceStatus) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    /// Returns a deferred reference to this service's remote ID.
    #[must_use]
    pub fn service_id_token(self: &Arc<Self>) -> Arc<dyn StringToken> {
        Arc::new(ServiceIdToken {
            resource: Arc::clone(self),
        })
    }
}

/// Token yielding the remote service ID of an [`EndpointService`].
///
/// Fails while the producing resource has no status; re-resolvable once
/// the status is written back.
#[derive(Debug)]
struct ServiceIdToken {
    resource: Arc<EndpointService>,
}

#[async_trait]
impl StringToken for ServiceIdToken {
    async fn resolve(&self) -> Result<String, TokenError> {
        self.resource
            .status()
            .map(|status| status.service_id)
            .ok_or_else(|| TokenError::NotFulfilled {
                resource_id: self.resource.id().to_string(),
            })
    }
}

/// Desired allow-listed principals for an endpoint service.
#[derive(Debug)]
pub struct PermissionsSpec {
    /// Deferred reference to the remote service ID.
    pub service_id: Arc<dyn StringToken>,
    /// Principals allowed to connect, as an unordered set.
    pub allowed_principals: Vec<String>,
}

/// A desired endpoint service permission set within a stack.
#[derive(Debug)]
pub struct EndpointServicePermissions {
    stack_id: StackId,
    id: String,
    /// Desired configuration.
    pub spec: PermissionsSpec,
}

impl EndpointServicePermissions {
    /// Creates a new desired permission set.
    #[must_use]
    pub fn new(stack_id: StackId, id: impl Into<String>, spec: PermissionsSpec) -> Self {
        Self {
            stack_id,
            id: id.into(),
            spec,
        }
    }

    /// Returns the logical ID, stable within the stack.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the owning stack's identity.
    #[must_use]
    pub const fn stack_id(&self) -> &StackId {
        &self.stack_id
    }
}
