//! Selection Resolver - store objects as selectable choices
//!
//! 1. `list(tenant)` for the target kind
//! 2. empty names fall back to the id
//! 3. stable sort by name (byte-wise, case-sensitive)
//! 4. project to `(id, name)`
//!
//! A failed list never fails the caller: the choice list comes back empty with
//! a warning, and the step stays usable.

use crate::field::Choice;
use gbp_common::{
    resources, Contract, EndpointGroup, Filters, PolicyAction, PolicyClassifier, PolicyResource, PolicyRule,
    PolicyStore, ResourceKind, TenantId,
};

/// Choices for one field plus the warning raised while fetching them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Sorted choices
    pub choices: Vec<Choice>,
    /// Set when the list call failed
    pub warning: Option<String>,
}

/// Resolves store objects into choices
pub struct SelectionResolver<'a> {
    store: &'a dyn PolicyStore,
}

impl<'a> SelectionResolver<'a> {
    /// Resolver over a store
    pub fn new(store: &'a dyn PolicyStore) -> Self {
        Self { store }
    }

    /// Choices for any kind
    pub async fn resolve(&self, kind: ResourceKind, tenant_id: &TenantId) -> Selection {
        match kind {
            ResourceKind::EndpointGroup => self.choices_for::<EndpointGroup>(tenant_id).await,
            ResourceKind::Contract => self.choices_for::<Contract>(tenant_id).await,
            ResourceKind::PolicyRule => self.choices_for::<PolicyRule>(tenant_id).await,
            ResourceKind::PolicyClassifier => self.choices_for::<PolicyClassifier>(tenant_id).await,
            ResourceKind::PolicyAction => self.choices_for::<PolicyAction>(tenant_id).await,
        }
    }

    /// Choices for a typed kind
    pub async fn choices_for<K: PolicyResource>(&self, tenant_id: &TenantId) -> Selection {
        match resources::<K>(self.store).list(tenant_id, &Filters::new()).await {
            Ok(items) => Selection {
                choices: to_choices(items),
                warning: None,
            },
            Err(e) => {
                let kind = K::KIND;
                let warning = format!("Unable to retrieve {} ({}).", kind.plural_noun(), e);
                tracing::warn!(kind = %kind, tenant = %tenant_id, error = %e, "choice population failed");
                Selection {
                    choices: Vec::new(),
                    warning: Some(warning),
                }
            }
        }
    }
}

/// Apply the name fallback, sort stably by name and project to choices
pub fn to_choices<K: PolicyResource>(mut items: Vec<K>) -> Vec<Choice> {
    for item in &mut items {
        item.set_id_as_name_if_empty();
    }
    // `sort_by` is stable: equal names keep fetch order
    items.sort_by(|a, b| a.name().cmp(b.name()));
    items
        .into_iter()
        .map(|item| Choice::new(item.id().as_str(), item.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbp_common::{InMemoryPolicyStore, PolicyError, PolicyResult, Fields, ResourceId};
    use serde_json::{json, Value};

    struct Unreachable;

    #[async_trait::async_trait]
    impl PolicyStore for Unreachable {
        async fn create(&self, _: ResourceKind, _: &TenantId, _: Fields) -> PolicyResult<Value> {
            Err(PolicyError::transport("connection refused"))
        }
        async fn list(&self, _: ResourceKind, _: &TenantId, _: &Filters) -> PolicyResult<Vec<Value>> {
            Err(PolicyError::transport("connection refused"))
        }
        async fn get(&self, _: ResourceKind, _: &ResourceId) -> PolicyResult<Value> {
            Err(PolicyError::transport("connection refused"))
        }
        async fn update(&self, _: ResourceKind, _: &ResourceId, _: Fields) -> PolicyResult<Value> {
            Err(PolicyError::transport("connection refused"))
        }
        async fn delete(&self, _: ResourceKind, _: &ResourceId) -> PolicyResult<()> {
            Err(PolicyError::transport("connection refused"))
        }
    }

    fn tenant() -> TenantId {
        TenantId::new("t-1").unwrap()
    }

    #[tokio::test]
    async fn test_sorted_with_fallback() {
        let store = InMemoryPolicyStore::new();
        for (id, name) in [("r-3", "web"), ("r-1", ""), ("r-2", "Db"), ("r-4", "db")] {
            store.seed(ResourceKind::PolicyRule, json!({"id": id, "name": name, "tenant_id": "t-1"}));
        }

        let selection = SelectionResolver::new(&store)
            .resolve(ResourceKind::PolicyRule, &tenant())
            .await;

        assert_eq!(selection.warning, None);
        assert_eq!(
            selection.choices,
            vec![
                Choice::new("r-2", "Db"),
                Choice::new("r-4", "db"),
                Choice::new("r-1", "r-1"),
                Choice::new("r-3", "web"),
            ]
        );
    }

    #[tokio::test]
    async fn test_equal_names_keep_fetch_order() {
        let store = InMemoryPolicyStore::new();
        for id in ["c-b", "c-a", "c-c"] {
            store.seed(ResourceKind::Contract, json!({"id": id, "name": "same", "tenant_id": "t-1"}));
        }

        let selection = SelectionResolver::new(&store)
            .choices_for::<Contract>(&tenant())
            .await;
        let ids: Vec<_> = selection.choices.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c-b", "c-a", "c-c"]);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_warning() {
        let selection = SelectionResolver::new(&Unreachable)
            .resolve(ResourceKind::PolicyClassifier, &tenant())
            .await;

        assert!(selection.choices.is_empty());
        assert_eq!(
            selection.warning.as_deref(),
            Some("Unable to retrieve classifiers (connection refused).")
        );
    }

    #[tokio::test]
    async fn test_blank_id_never_becomes_a_blank_choice() {
        let store = InMemoryPolicyStore::new();
        store.seed(ResourceKind::Contract, json!({"id": "", "name": "", "tenant_id": "t-1"}));

        let selection = SelectionResolver::new(&store)
            .resolve(ResourceKind::Contract, &tenant())
            .await;

        assert!(selection.choices.iter().all(|c| !c.label.is_empty()));
        assert!(selection.choices.is_empty());
        assert!(selection
            .warning
            .as_deref()
            .is_some_and(|w| w.starts_with("Unable to retrieve contracts (malformed Contract payload")));
    }
}
