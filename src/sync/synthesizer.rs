//! One discover → match/diff → apply pass over a stack.
//!
//! The synthesizer discovers live endpoint services by ownership tag,
//! classifies each pairing as create, update, or delete via set algebra
//! over the logical-id key space, dispatches to the manager, and writes
//! resulting status back onto the desired resources so dependent tokens
//! can resolve later in the same pass.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::cloud::ExistingEndpointService;
use crate::error::{Result, SyncError, SynthesisError};
use crate::model::{EndpointService, Stack};
use crate::tracking::TrackingProvider;

use super::manager::EndpointServiceManager;

/// Synthesizer for endpoint services of one stack.
pub struct Synthesizer<'a, M: EndpointServiceManager> {
    /// Endpoint service manager.
    manager: &'a M,
    /// Tracking provider.
    tracking: &'a TrackingProvider,
    /// Desired-state resource graph.
    stack: &'a Stack,
}

/// Result of one synthesis pass.
#[derive(Debug, Serialize)]
pub struct SynthesisReport {
    /// Number of endpoint services created.
    pub created: usize,
    /// Number of matched endpoint services handed to update.
    pub updated: usize,
    /// Number of orphaned endpoint services deleted.
    pub deleted: usize,
    /// Number of permission sets reconciled.
    pub permissions_reconciled: usize,
}

impl<'a, M: EndpointServiceManager> Synthesizer<'a, M> {
    /// Creates a new synthesizer.
    #[must_use]
    pub const fn new(manager: &'a M, tracking: &'a TrackingProvider, stack: &'a Stack) -> Self {
        Self {
            manager,
            tracking,
            stack,
        }
    }

    /// Runs one full discover-diff-apply pass.
    ///
    /// Idempotent and safe to call repeatedly: every mutation is derived
    /// fresh from current desired and live state. A discovery failure
    /// aborts the pass before any mutation; a failure on one resource is
    /// reported but does not block unrelated resources, and the first such
    /// error becomes the pass result.
    ///
    /// # Errors
    ///
    /// Returns the discovery error, or the first per-resource error.
    pub async fn synthesize(&self) -> Result<SynthesisReport> {
        info!("Starting synthesis for stack {}", self.stack.id());

        let filters = vec![self.tracking.tag_filter(self.stack.id())];
        let live = self.manager.list_endpoint_services(&filters).await?;
        debug!("Discovered {} live endpoint services", live.len());

        let (pairs, orphans, mut errors) = self.match_by_ownership_tag(live);

        let mut report = SynthesisReport {
            created: 0,
            updated: 0,
            deleted: 0,
            permissions_reconciled: 0,
        };

        // Orphans go first so a replaced resource cannot collide with its
        // own leftovers.
        for orphan in orphans {
            match self.manager.delete(&orphan).await {
                Ok(()) => report.deleted += 1,
                Err(err) => errors.push(err),
            }
        }

        // Sequential within the type: no duplicate-create races on one
        // logical ID. Status is written back immediately so dependents
        // resolve against it later in this pass.
        for (resource, matched) in pairs {
            let outcome = match matched {
                None => self.manager.create(&resource).await.inspect(|_| {
                    report.created += 1;
                }),
                Some(live_service) => {
                    self.manager.update(&resource, &live_service).await.inspect(|_| {
                        report.updated += 1;
                    })
                }
            };
            match outcome {
                Ok(status) => resource.set_status(status),
                Err(err) => errors.push(err),
            }
        }

        for permissions in self.stack.permissions() {
            match self.manager.reconcile_permissions(permissions).await {
                Ok(()) => report.permissions_reconciled += 1,
                Err(err) => errors.push(err),
            }
        }

        if let Some(first) = Self::report_errors(errors) {
            return Err(first);
        }

        info!("Synthesis finished for stack {}: {report}", self.stack.id());
        Ok(report)
    }

    /// Pairs desired resources with live objects by the resource-id
    /// ownership tag.
    ///
    /// Returns the desired-side pairings (a missing live object means
    /// create), the live-side orphans (deletion candidates), and any
    /// ambiguous-ownership errors.
    fn match_by_ownership_tag(
        &self,
        live: Vec<ExistingEndpointService>,
    ) -> (
        Vec<(Arc<EndpointService>, Option<ExistingEndpointService>)>,
        Vec<ExistingEndpointService>,
        Vec<SyncError>,
    ) {
        let mut by_id: HashMap<String, Vec<ExistingEndpointService>> = HashMap::new();
        let mut orphans = Vec::new();

        for service in live {
            match self.tracking.resource_id_from_tags(&service.tags) {
                Some(resource_id) => by_id.entry(resource_id).or_default().push(service),
                // Owned by this stack but missing the resource tag: orphan.
                None => orphans.push(service),
            }
        }

        let mut pairs = Vec::new();
        let mut errors = Vec::new();

        for resource in self.stack.endpoint_services() {
            match by_id.remove(resource.id()) {
                None => pairs.push((Arc::clone(resource), None)),
                Some(mut matches) => {
                    if matches.len() > 1 {
                        errors.push(
                            SynthesisError::AmbiguousMatch {
                                resource_id: resource.id().to_string(),
                                count: matches.len(),
                            }
                            .into(),
                        );
                        continue;
                    }
                    pairs.push((Arc::clone(resource), matches.pop()));
                }
            }
        }

        // Live objects whose resource tag matches nothing desired.
        orphans.extend(by_id.into_values().flatten());

        (pairs, orphans, errors)
    }

    /// Logs every collected error and returns the first one.
    fn report_errors(errors: Vec<SyncError>) -> Option<SyncError> {
        for err in &errors {
            error!("Synthesis error: {err}");
        }
        errors.into_iter().next()
    }
}

impl std::fmt::Display for SynthesisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleted, {} permission sets reconciled",
            self.created, self.updated, self.deleted, self.permissions_reconciled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudError;
    use crate::model::{EndpointServiceSpec, EndpointServiceStatus, PermissionsSpec, StackId};
    use crate::sync::manager::MockEndpointServiceManager;

    fn tracking() -> TrackingProvider {
        TrackingProvider::new("sync.aws", "prod-cluster")
    }

    fn stack() -> Stack {
        Stack::new(StackId::new("default", "gateway"))
    }

    fn live_service(service_id: &str, resource_id: Option<&str>) -> ExistingEndpointService {
        let provider = tracking();
        let stack_id = StackId::new("default", "gateway");
        let mut tags = provider.stack_tags(&stack_id);
        if let Some(id) = resource_id {
            tags.insert(provider.resource_tag_key(), id.to_string());
        }
        ExistingEndpointService {
            service_id: service_id.to_string(),
            tags,
            ..ExistingEndpointService::default()
        }
    }

    fn status(service_id: &str) -> EndpointServiceStatus {
        EndpointServiceStatus {
            service_id: service_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_flow() {
        let mut stack = stack();
        let resource = stack
            .add_endpoint_service("endpoint-service", EndpointServiceSpec::default())
            .expect("registration");

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(1)
            .returning(|_| Ok(vec![]));
        manager
            .expect_create()
            .withf(|res| res.id() == "endpoint-service")
            .times(1)
            .returning(|_| Ok(status("vpce-svc-0123")));
        manager.expect_update().times(0);
        manager.expect_delete().times(0);

        let provider = tracking();
        let report = Synthesizer::new(&manager, &provider, &stack)
            .synthesize()
            .await
            .expect("pass succeeds");

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(report.deleted, 0);
        assert_eq!(resource.status(), Some(status("vpce-svc-0123")));
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let stack = stack();
        let orphan = live_service("vpce-svc-0123", Some("endpoint-service"));

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(1)
            .returning({
                let orphan = orphan.clone();
                move |_| Ok(vec![orphan.clone()])
            });
        manager
            .expect_delete()
            .withf(|existing| existing.service_id == "vpce-svc-0123")
            .times(1)
            .returning(|_| Ok(()));
        manager.expect_create().times(0);
        manager.expect_update().times(0);

        let provider = tracking();
        let report = Synthesizer::new(&manager, &provider, &stack)
            .synthesize()
            .await
            .expect("pass succeeds");

        assert_eq!(report.deleted, 1);
    }

    #[tokio::test]
    async fn test_update_flow() {
        let mut stack = stack();
        let resource = stack
            .add_endpoint_service(
                "endpoint-service",
                EndpointServiceSpec {
                    acceptance_required: Some(false),
                    ..EndpointServiceSpec::default()
                },
            )
            .expect("registration");

        let matched = ExistingEndpointService {
            acceptance_required: true,
            ..live_service("vpce-svc-0123", Some("endpoint-service"))
        };

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(1)
            .returning({
                let matched = matched.clone();
                move |_| Ok(vec![matched.clone()])
            });
        manager
            .expect_update()
            .withf(|res, existing| {
                res.id() == "endpoint-service" && existing.service_id == "vpce-svc-0123"
            })
            .times(1)
            .returning(|_, _| Ok(status("vpce-svc-0123")));
        manager.expect_create().times(0);
        manager.expect_delete().times(0);

        let provider = tracking();
        let report = Synthesizer::new(&manager, &provider, &stack)
            .synthesize()
            .await
            .expect("pass succeeds");

        assert_eq!(report.updated, 1);
        assert_eq!(resource.status(), Some(status("vpce-svc-0123")));
    }

    #[tokio::test]
    async fn test_untagged_owned_object_is_deleted() {
        let stack = stack();
        let untagged = live_service("vpce-svc-0123", None);

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(1)
            .returning({
                let untagged = untagged.clone();
                move |_| Ok(vec![untagged.clone()])
            });
        manager
            .expect_delete()
            .withf(|existing| existing.service_id == "vpce-svc-0123")
            .times(1)
            .returning(|_| Ok(()));
        manager.expect_create().times(0);
        manager.expect_update().times(0);

        let provider = tracking();
        let report = Synthesizer::new(&manager, &provider, &stack)
            .synthesize()
            .await
            .expect("pass succeeds");

        assert_eq!(report.deleted, 1);
    }

    #[tokio::test]
    async fn test_ambiguous_match_is_fatal_for_that_resource() {
        let mut stack = stack();
        stack
            .add_endpoint_service("endpoint-service", EndpointServiceSpec::default())
            .expect("registration");

        let first = live_service("vpce-svc-0123", Some("endpoint-service"));
        let second = live_service("vpce-svc-0456", Some("endpoint-service"));

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(1)
            .returning(move |_| Ok(vec![first.clone(), second.clone()]));
        // Neither silently picked, neither deleted.
        manager.expect_create().times(0);
        manager.expect_update().times(0);
        manager.expect_delete().times(0);

        let provider = tracking();
        let err = Synthesizer::new(&manager, &provider, &stack)
            .synthesize()
            .await
            .expect_err("ambiguous ownership");

        assert!(matches!(
            err,
            SyncError::Synthesis(SynthesisError::AmbiguousMatch { resource_id, count: 2 })
                if resource_id == "endpoint-service"
        ));
    }

    #[tokio::test]
    async fn test_discovery_failure_aborts_pass_before_mutations() {
        let mut stack = stack();
        stack
            .add_endpoint_service("endpoint-service", EndpointServiceSpec::default())
            .expect("registration");

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(1)
            .returning(|_| Err(CloudError::api("InternalError", "try later").into()));
        manager.expect_create().times(0);
        manager.expect_update().times(0);
        manager.expect_delete().times(0);
        manager.expect_reconcile_permissions().times(0);

        let provider = tracking();
        let err = Synthesizer::new(&manager, &provider, &stack)
            .synthesize()
            .await
            .expect_err("discovery failure");

        assert!(matches!(err, SyncError::Cloud(_)));
    }

    #[tokio::test]
    async fn test_one_resource_failure_does_not_block_unrelated_resources() {
        let mut stack = stack();
        stack
            .add_endpoint_service("first", EndpointServiceSpec::default())
            .expect("registration");
        let second = stack
            .add_endpoint_service("second", EndpointServiceSpec::default())
            .expect("registration");

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(1)
            .returning(|_| Ok(vec![]));
        manager
            .expect_create()
            .withf(|res| res.id() == "first")
            .times(1)
            .returning(|_| Err(CloudError::api("InternalError", "try later").into()));
        manager
            .expect_create()
            .withf(|res| res.id() == "second")
            .times(1)
            .returning(|_| Ok(status("vpce-svc-0456")));

        let provider = tracking();
        let err = Synthesizer::new(&manager, &provider, &stack)
            .synthesize()
            .await
            .expect_err("first resource failed");

        // The unrelated resource was still created and fulfilled.
        assert!(matches!(err, SyncError::Cloud(_)));
        assert_eq!(second.status(), Some(status("vpce-svc-0456")));
    }

    #[tokio::test]
    async fn test_status_write_back_fulfills_dependent_permissions() {
        let mut stack = stack();
        let resource = stack
            .add_endpoint_service("endpoint-service", EndpointServiceSpec::default())
            .expect("registration");
        stack
            .add_permissions(
                "endpoint-service-permissions",
                PermissionsSpec {
                    service_id: resource.service_id_token(),
                    allowed_principals: vec![String::from("P1")],
                },
            )
            .expect("registration");

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(1)
            .returning(|_| Ok(vec![]));
        manager
            .expect_create()
            .times(1)
            .returning(|_| Ok(status("vpce-svc-0123")));
        manager
            .expect_reconcile_permissions()
            .withf(|permissions| permissions.id() == "endpoint-service-permissions")
            .times(1)
            .returning(|_| Ok(()));

        let provider = tracking();
        let report = Synthesizer::new(&manager, &provider, &stack)
            .synthesize()
            .await
            .expect("pass succeeds");

        assert_eq!(report.permissions_reconciled, 1);

        // The producer's status was written before permissions ran, so its
        // token resolves within the same pass.
        let token = resource.service_id_token();
        assert_eq!(token.resolve().await.expect("fulfilled"), "vpce-svc-0123");
    }

    #[tokio::test]
    async fn test_repeated_pass_with_converged_state_only_updates() {
        let mut stack = stack();
        stack
            .add_endpoint_service("endpoint-service", EndpointServiceSpec::default())
            .expect("registration");
        let matched = live_service("vpce-svc-0123", Some("endpoint-service"));

        let mut manager = MockEndpointServiceManager::new();
        manager
            .expect_list_endpoint_services()
            .times(2)
            .returning({
                let matched = matched.clone();
                move |_| Ok(vec![matched.clone()])
            });
        manager
            .expect_update()
            .times(2)
            .returning(|_, _| Ok(status("vpce-svc-0123")));
        manager.expect_create().times(0);
        manager.expect_delete().times(0);

        let provider = tracking();
        let synthesizer = Synthesizer::new(&manager, &provider, &stack);
        synthesizer.synthesize().await.expect("first pass");
        synthesizer.synthesize().await.expect("second pass");
    }

    #[test]
    fn test_report_serializes() {
        let report = SynthesisReport {
            created: 1,
            updated: 2,
            deleted: 0,
            permissions_reconciled: 1,
        };
        let json = serde_json::to_value(&report).expect("serialization");
        assert_eq!(json["created"], 1);
        assert_eq!(json["updated"], 2);
    }

    #[test]
    fn test_report_display() {
        let report = SynthesisReport {
            created: 1,
            updated: 0,
            deleted: 2,
            permissions_reconciled: 0,
        };
        assert_eq!(
            report.to_string(),
            "1 created, 0 updated, 2 deleted, 0 permission sets reconciled"
        );
    }
}
