//! The desired-state resource graph for one deployment unit.
//!
//! A stack is an ordered, uniquely-keyed collection of desired resources.
//! It is mutated only while the model is built; during a synthesis pass
//! the synthesizer reads it and writes status back through the resources'
//! interior cells.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::StackError;

use super::endpoint_service::{
    EndpointService, EndpointServicePermissions, EndpointServiceSpec, PermissionsSpec,
};

/// Identity of a stack: one logical deployment unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StackId {
    /// Namespace of the deployment unit.
    pub namespace: String,
    /// Name of the deployment unit.
    pub name: String,
}

impl StackId {
    /// Creates a new stack identity.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for StackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// The desired-state resource graph for one deployment unit.
#[derive(Debug)]
pub struct Stack {
    id: StackId,
    resource_ids: HashSet<String>,
    endpoint_services: Vec<Arc<EndpointService>>,
    permissions: Vec<Arc<EndpointServicePermissions>>,
}

impl Stack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new(id: StackId) -> Self {
        Self {
            id,
            resource_ids: HashSet::new(),
            endpoint_services: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// Returns the stack identity.
    #[must_use]
    pub const fn id(&self) -> &StackId {
        &self.id
    }

    /// Registers a desired endpoint service and returns a shared handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the logical ID is already taken.
    pub fn add_endpoint_service(
        &mut self,
        id: impl Into<String>,
        spec: EndpointServiceSpec,
    ) -> Result<Arc<EndpointService>, StackError> {
        let id = id.into();
        self.claim_id(&id)?;
        let resource = Arc::new(EndpointService::new(self.id.clone(), id, spec));
        self.endpoint_services.push(Arc::clone(&resource));
        Ok(resource)
    }

    /// Registers a desired permission set and returns a shared handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the logical ID is already taken.
    pub fn add_permissions(
        &mut self,
        id: impl Into<String>,
        spec: PermissionsSpec,
    ) -> Result<Arc<EndpointServicePermissions>, StackError> {
        let id = id.into();
        self.claim_id(&id)?;
        let resource = Arc::new(EndpointServicePermissions::new(self.id.clone(), id, spec));
        self.permissions.push(Arc::clone(&resource));
        Ok(resource)
    }

    /// Returns the desired endpoint services in registration order.
    #[must_use]
    pub fn endpoint_services(&self) -> &[Arc<EndpointService>] {
        &self.endpoint_services
    }

    /// Returns the desired permission sets in registration order.
    #[must_use]
    pub fn permissions(&self) -> &[Arc<EndpointServicePermissions>] {
        &self.permissions
    }

    fn claim_id(&mut self, id: &str) -> Result<(), StackError> {
        if !self.resource_ids.insert(id.to_string()) {
            return Err(StackError::DuplicateResource {
                resource_id: id.to_string(),
            });
        }
        Ok(())
    }
}
