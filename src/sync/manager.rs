//! Per-resource-type manager issuing idempotent cloud mutations.
//!
//! The manager owns the diff and retry policy for VPC endpoint services:
//! it resolves every deferred reference before building a request, issues
//! at most one mutating call per operation, and retries deletion on the
//! designated transient error class only.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::cloud::{
    CreateEndpointServiceRequest, EndpointServiceApi, ExistingEndpointService,
    ModifyEndpointServiceRequest, ModifyPermissionsRequest, TagMap,
};
use crate::error::{CloudError, Result, SynthesisError};
use crate::model::{
    EndpointService, EndpointServicePermissions, EndpointServiceStatus, resolve_all,
};
use crate::tracking::{TagFilter, TrackingProvider};

use super::diff::string_set_diff;
use super::retry::retry_immediate_on_error;

/// Default interval between deletion attempts while a dependency violation
/// persists.
const DEFAULT_DELETION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default overall deadline for a retried deletion.
const DEFAULT_DELETION_TIMEOUT: Duration = Duration::from_secs(120);

/// Abstraction around endpoint service operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndpointServiceManager: Send + Sync {
    /// Lists live endpoint services matching any of the tag filters.
    async fn list_endpoint_services(
        &self,
        filters: &[TagFilter],
    ) -> Result<Vec<ExistingEndpointService>>;

    /// Creates the endpoint service and returns its status.
    async fn create(&self, resource: &EndpointService) -> Result<EndpointServiceStatus>;

    /// Converges the live object onto the desired spec.
    ///
    /// Issues at most one modify call; a fully converged pair is a no-op.
    async fn update(
        &self,
        resource: &EndpointService,
        existing: &ExistingEndpointService,
    ) -> Result<EndpointServiceStatus>;

    /// Deletes the live endpoint service.
    async fn delete(&self, existing: &ExistingEndpointService) -> Result<()>;

    /// Converges the allow-listed principals of an endpoint service.
    async fn reconcile_permissions(&self, permissions: &EndpointServicePermissions) -> Result<()>;

    /// Converges tags on an already-created endpoint service.
    async fn reconcile_tags(&self, service_id: &str, desired_tags: &TagMap) -> Result<()>;
}

/// Default implementation of [`EndpointServiceManager`].
#[derive(Debug)]
pub struct DefaultEndpointServiceManager<A> {
    api: A,
    tracking: TrackingProvider,
    deletion_poll_interval: Duration,
    deletion_timeout: Duration,
}

impl<A> DefaultEndpointServiceManager<A> {
    /// Creates a new manager with default deletion retry settings.
    #[must_use]
    pub const fn new(api: A, tracking: TrackingProvider) -> Self {
        Self {
            api,
            tracking,
            deletion_poll_interval: DEFAULT_DELETION_POLL_INTERVAL,
            deletion_timeout: DEFAULT_DELETION_TIMEOUT,
        }
    }

    /// Sets the interval between deletion attempts.
    #[must_use]
    pub const fn with_deletion_poll_interval(mut self, interval: Duration) -> Self {
        self.deletion_poll_interval = interval;
        self
    }

    /// Sets the overall deadline for a retried deletion.
    #[must_use]
    pub const fn with_deletion_timeout(mut self, timeout: Duration) -> Self {
        self.deletion_timeout = timeout;
        self
    }
}

#[async_trait]
impl<A: EndpointServiceApi> EndpointServiceManager for DefaultEndpointServiceManager<A> {
    async fn list_endpoint_services(
        &self,
        filters: &[TagFilter],
    ) -> Result<Vec<ExistingEndpointService>> {
        Ok(self.api.list_endpoint_services(filters).await?)
    }

    async fn create(&self, resource: &EndpointService) -> Result<EndpointServiceStatus> {
        // Every deferred reference resolves before the request exists;
        // partial requests are never sent.
        let nlb_arns = resolve_all(&resource.spec.network_load_balancer_arns).await?;
        let tags =
            self.tracking
                .resource_tags(resource.stack_id(), resource.id(), &resource.spec.tags);

        let request = CreateEndpointServiceRequest {
            acceptance_required: resource.spec.acceptance_required,
            private_dns_name: resource.spec.private_dns_name.clone(),
            network_load_balancer_arns: nlb_arns,
            tags,
        };

        info!("Creating endpoint service: {}", resource.id());
        let service_id = self.api.create_endpoint_service(&request).await?;
        info!(
            "Created endpoint service: {} (service ID: {service_id})",
            resource.id()
        );

        Ok(EndpointServiceStatus { service_id })
    }

    async fn update(
        &self,
        resource: &EndpointService,
        existing: &ExistingEndpointService,
    ) -> Result<EndpointServiceStatus> {
        let desired_arns = resolve_all(&resource.spec.network_load_balancer_arns).await?;
        let arn_diff = string_set_diff(&desired_arns, &existing.network_load_balancer_arns);

        let acceptance_required = match resource.spec.acceptance_required {
            Some(desired) if desired != existing.acceptance_required => Some(desired),
            _ => None,
        };

        // Tri-state: unset->set and changed values populate the field;
        // set->unset needs the explicit remove flag.
        let (private_dns_name, remove_private_dns_name) =
            match (&resource.spec.private_dns_name, &existing.private_dns_name) {
                (Some(desired), current) if current.as_deref() != Some(desired.as_str()) => {
                    (Some(desired.clone()), false)
                }
                (None, Some(_)) => (None, true),
                _ => (None, false),
            };

        let request = ModifyEndpointServiceRequest {
            service_id: existing.service_id.clone(),
            acceptance_required,
            private_dns_name,
            remove_private_dns_name,
            add_network_load_balancer_arns: arn_diff.to_add,
            remove_network_load_balancer_arns: arn_diff.to_remove,
        };

        if request.has_changes() {
            info!("Modifying endpoint service: {}", existing.service_id);
            self.api.modify_endpoint_service(&request).await?;
            info!("Modified endpoint service: {}", existing.service_id);
        } else {
            debug!("Endpoint service {} is up to date", existing.service_id);
        }

        Ok(EndpointServiceStatus {
            service_id: existing.service_id.clone(),
        })
    }

    async fn delete(&self, existing: &ExistingEndpointService) -> Result<()> {
        let service_ids = vec![existing.service_id.clone()];

        info!("Deleting endpoint service: {}", existing.service_id);
        let result = retry_immediate_on_error(
            self.deletion_poll_interval,
            self.deletion_timeout,
            CloudError::is_retryable,
            || self.api.delete_endpoint_services(&service_ids),
        )
        .await;

        match result {
            Ok(()) => {
                info!("Deleted endpoint service: {}", existing.service_id);
                Ok(())
            }
            // A retryable error surviving the loop means the deadline passed.
            Err(err) if err.is_retryable() => Err(SynthesisError::DeleteTimedOut {
                service_id: existing.service_id.clone(),
                source: err,
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    async fn reconcile_permissions(&self, permissions: &EndpointServicePermissions) -> Result<()> {
        let service_id = permissions.spec.service_id.resolve().await?;
        debug!("Reconciling permissions for service {service_id}");

        let info = self.api.describe_permissions(&service_id).await?;
        let diff = string_set_diff(&permissions.spec.allowed_principals, &info.allowed_principals);

        if diff.is_empty() {
            debug!("Permissions for service {service_id} are up to date");
            return Ok(());
        }

        let request = ModifyPermissionsRequest {
            service_id: service_id.clone(),
            add_allowed_principals: diff.to_add,
            remove_allowed_principals: diff.to_remove,
        };

        info!(
            "Modifying permissions for service {service_id}: {} to add, {} to remove",
            request.add_allowed_principals.len(),
            request.remove_allowed_principals.len()
        );
        self.api.modify_permissions(&request).await?;
        info!("Modified permissions for service {service_id}");

        Ok(())
    }

    async fn reconcile_tags(&self, service_id: &str, desired_tags: &TagMap) -> Result<()> {
        // Post-creation tag drift is left in place for now; discovery only
        // needs the ownership tags written at create time.
        debug!(
            "Skipping tag reconciliation for service {service_id} ({} desired tags)",
            desired_tags.len()
        );
        Ok(())
    }
}
