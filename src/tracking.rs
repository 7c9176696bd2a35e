//! Ownership tagging and discovery filters.
//!
//! Every created resource carries a deterministic ownership-tag set; the
//! discovery filter built here is its exact inverse at stack scope. Tags
//! are the only correlation between desired and live state, so this
//! symmetry is what makes orphan detection and matching possible.

use std::collections::BTreeMap;
use tracing::trace;

use crate::cloud::TagMap;
use crate::model::StackId;

/// Filter expression for tag-based discovery.
///
/// A live object matches when, for every key, it carries one of the
/// listed values (an empty value list requires only key presence).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagFilter {
    key_values: BTreeMap<String, Vec<String>>,
}

impl TagFilter {
    /// Requires the given key to carry the given value.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_values.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Returns true if the tag set satisfies this filter.
    #[must_use]
    pub fn matches(&self, tags: &TagMap) -> bool {
        self.key_values.iter().all(|(key, values)| {
            tags.get(key)
                .is_some_and(|actual| values.is_empty() || values.iter().any(|v| v == actual))
        })
    }
}

/// Computes ownership tags and their inverse discovery filters.
#[derive(Debug, Clone)]
pub struct TrackingProvider {
    tag_prefix: String,
    cluster_name: String,
}

impl TrackingProvider {
    /// Creates a new tracking provider.
    ///
    /// `tag_prefix` namespaces the reserved ownership keys;
    /// `cluster_name` scopes ownership to one controller installation.
    #[must_use]
    pub fn new(tag_prefix: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        Self {
            tag_prefix: tag_prefix.into(),
            cluster_name: cluster_name.into(),
        }
    }

    /// The reserved tag key identifying the owning cluster.
    #[must_use]
    pub fn cluster_tag_key(&self) -> String {
        format!("{}/cluster", self.tag_prefix)
    }

    /// The reserved tag key identifying the owning stack.
    #[must_use]
    pub fn stack_tag_key(&self) -> String {
        format!("{}/stack", self.tag_prefix)
    }

    /// The reserved tag key identifying the logical resource.
    #[must_use]
    pub fn resource_tag_key(&self) -> String {
        format!("{}/resource", self.tag_prefix)
    }

    /// Ownership tags shared by every resource of a stack.
    #[must_use]
    pub fn stack_tags(&self, stack_id: &StackId) -> TagMap {
        let mut tags = TagMap::new();
        tags.insert(self.cluster_tag_key(), self.cluster_name.clone());
        tags.insert(self.stack_tag_key(), stack_id.to_string());
        tags
    }

    /// Full tag set for one resource: user tags merged under ownership tags.
    ///
    /// Deterministic and pure. Ownership keys are reserved: a user tag with
    /// the same key is overwritten.
    #[must_use]
    pub fn resource_tags(
        &self,
        stack_id: &StackId,
        resource_id: &str,
        user_tags: &TagMap,
    ) -> TagMap {
        let mut tags = user_tags.clone();
        tags.extend(self.stack_tags(stack_id));
        tags.insert(self.resource_tag_key(), resource_id.to_string());
        trace!("Computed {} tags for resource {resource_id}", tags.len());
        tags
    }

    /// Discovery filter finding exactly the live objects owned by a stack.
    ///
    /// The exact inverse of [`Self::resource_tags`] at stack scope: every
    /// object created with those tags matches, and no unrelated object does.
    #[must_use]
    pub fn tag_filter(&self, stack_id: &StackId) -> TagFilter {
        TagFilter::default()
            .with_tag(self.cluster_tag_key(), self.cluster_name.clone())
            .with_tag(self.stack_tag_key(), stack_id.to_string())
    }

    /// Extracts the logical resource ID from a live object's tags.
    #[must_use]
    pub fn resource_id_from_tags(&self, tags: &TagMap) -> Option<String> {
        tags.get(&self.resource_tag_key()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TrackingProvider {
        TrackingProvider::new("sync.aws", "prod-cluster")
    }

    fn stack_id() -> StackId {
        StackId::new("default", "gateway")
    }

    #[test]
    fn test_resource_tags_merge_user_tags() {
        let user_tags = TagMap::from([(String::from("team"), String::from("networking"))]);
        let tags = provider().resource_tags(&stack_id(), "endpoint-service", &user_tags);

        assert_eq!(tags.get("team").map(String::as_str), Some("networking"));
        assert_eq!(
            tags.get("sync.aws/cluster").map(String::as_str),
            Some("prod-cluster")
        );
        assert_eq!(
            tags.get("sync.aws/stack").map(String::as_str),
            Some("default/gateway")
        );
        assert_eq!(
            tags.get("sync.aws/resource").map(String::as_str),
            Some("endpoint-service")
        );
    }

    #[test]
    fn test_user_tags_never_override_ownership_keys() {
        let user_tags = TagMap::from([(
            String::from("sync.aws/stack"),
            String::from("spoofed/stack"),
        )]);
        let tags = provider().resource_tags(&stack_id(), "endpoint-service", &user_tags);

        assert_eq!(
            tags.get("sync.aws/stack").map(String::as_str),
            Some("default/gateway")
        );
    }

    #[test]
    fn test_filter_is_inverse_of_resource_tags() {
        let provider = provider();
        let tags = provider.resource_tags(&stack_id(), "endpoint-service", &TagMap::new());
        let filter = provider.tag_filter(&stack_id());

        assert!(filter.matches(&tags));
    }

    #[test]
    fn test_filter_rejects_unrelated_objects() {
        let provider = provider();
        let filter = provider.tag_filter(&stack_id());

        let other_stack =
            provider.resource_tags(&StackId::new("default", "other"), "endpoint-service", &TagMap::new());
        assert!(!filter.matches(&other_stack));

        let untagged = TagMap::from([(String::from("team"), String::from("networking"))]);
        assert!(!filter.matches(&untagged));
    }

    #[test]
    fn test_resource_id_extraction() {
        let provider = provider();
        let tags = provider.resource_tags(&stack_id(), "endpoint-service", &TagMap::new());

        assert_eq!(
            provider.resource_id_from_tags(&tags).as_deref(),
            Some("endpoint-service")
        );
        assert_eq!(provider.resource_id_from_tags(&TagMap::new()), None);
    }
}
