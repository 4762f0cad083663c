//! In-memory policy store (for testing and development)
//!
//! Objects live per kind in insertion order. Ids are UUID v4 strings, the
//! same shape the real service issues.

use super::resources::ResourceKind;
use super::store::{Fields, Filters, PolicyStore};
use super::value_objects::{ResourceId, TenantId};
use crate::error::{PolicyError, PolicyResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// In-memory policy store
pub struct InMemoryPolicyStore {
    objects: RwLock<HashMap<ResourceKind, Vec<Value>>>,
}

impl InMemoryPolicyStore {
    /// Create empty store
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a fully-formed object (must carry an `id`)
    pub fn seed(&self, kind: ResourceKind, object: Value) {
        self.objects.write().entry(kind).or_default().push(object);
    }

    /// Number of stored objects of a kind, across tenants
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.objects.read().get(&kind).map_or(0, Vec::len)
    }

    fn not_found(kind: ResourceKind, id: &ResourceId) -> PolicyError {
        PolicyError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

fn has_id(object: &Value, id: &ResourceId) -> bool {
    object.get("id").and_then(Value::as_str) == Some(id.as_str())
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn create(&self, kind: ResourceKind, tenant_id: &TenantId, mut fields: Fields) -> PolicyResult<Value> {
        let id = uuid::Uuid::new_v4().to_string();
        fields.insert("id".into(), Value::String(id));
        fields.insert("tenant_id".into(), Value::String(tenant_id.to_string()));

        let object = Value::Object(fields);
        self.objects.write().entry(kind).or_default().push(object.clone());
        tracing::debug!(kind = %kind, tenant = %tenant_id, "stored object");
        Ok(object)
    }

    async fn list(&self, kind: ResourceKind, tenant_id: &TenantId, filters: &Filters) -> PolicyResult<Vec<Value>> {
        let tenant = Value::String(tenant_id.to_string());
        let objects = self.objects.read();
        Ok(objects
            .get(&kind)
            .map(|all| {
                all.iter()
                    .filter(|o| o.get("tenant_id") == Some(&tenant))
                    .filter(|o| filters.matches(o))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, kind: ResourceKind, id: &ResourceId) -> PolicyResult<Value> {
        self.objects
            .read()
            .get(&kind)
            .and_then(|all| all.iter().find(|o| has_id(o, id)))
            .cloned()
            .ok_or_else(|| Self::not_found(kind, id))
    }

    async fn update(&self, kind: ResourceKind, id: &ResourceId, fields: Fields) -> PolicyResult<Value> {
        let mut objects = self.objects.write();
        let object = objects
            .get_mut(&kind)
            .and_then(|all| all.iter_mut().find(|o| has_id(o, id)))
            .ok_or_else(|| Self::not_found(kind, id))?;

        if let Some(stored) = object.as_object_mut() {
            for (key, value) in fields {
                // id and owner are immutable
                if key != "id" && key != "tenant_id" {
                    stored.insert(key, value);
                }
            }
        }
        Ok(object.clone())
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> PolicyResult<()> {
        let mut objects = self.objects.write();
        let all = objects
            .get_mut(&kind)
            .ok_or_else(|| Self::not_found(kind, id))?;
        let index = all
            .iter()
            .position(|o| has_id(o, id))
            .ok_or_else(|| Self::not_found(kind, id))?;
        all.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resources::{Contract, PolicyResource};
    use crate::domain::store::resources;
    use serde_json::json;

    fn tenant(s: &str) -> TenantId {
        TenantId::new(s).unwrap()
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_contract_lifecycle() {
        let store = InMemoryPolicyStore::new();
        let contracts = resources::<Contract>(&store);
        let t = tenant("t-1");

        // Create
        let created = contracts
            .create(&t, fields(json!({"name": "web", "policy_rules": []})))
            .await
            .unwrap();
        assert_eq!(created.name, "web");
        assert_eq!(created.tenant_id, Some(t.clone()));

        // Get
        let fetched = contracts.get(created.id()).await.unwrap();
        assert_eq!(fetched, created);

        // Update
        let updated = contracts
            .update(created.id(), fields(json!({"description": "front end", "id": "hijack"})))
            .await
            .unwrap();
        assert_eq!(updated.description, "front end");
        assert_eq!(updated.id, created.id);

        // Delete
        contracts.delete(created.id()).await.unwrap();
        assert!(contracts.get(created.id()).await.unwrap_err().is_not_found());
        assert!(contracts.delete(created.id()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_is_tenant_scoped_and_ordered() {
        let store = InMemoryPolicyStore::new();
        for (name, owner) in [("b", "t-1"), ("a", "t-2"), ("c", "t-1")] {
            store
                .create(ResourceKind::Contract, &tenant(owner), fields(json!({"name": name})))
                .await
                .unwrap();
        }

        let listed = resources::<Contract>(&store)
            .list(&tenant("t-1"), &Filters::new())
            .await
            .unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);

        let filtered = store
            .list(ResourceKind::Contract, &tenant("t-1"), &Filters::new().with("name", "c"))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        let empty = store
            .list(ResourceKind::PolicyAction, &tenant("t-1"), &Filters::new())
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_list_for_display_applies_fallback() {
        let store = InMemoryPolicyStore::new();
        store.seed(ResourceKind::Contract, json!({"id": "c-9", "name": "", "tenant_id": "t-1"}));

        let listed = resources::<Contract>(&store)
            .list_for_display(&tenant("t-1"), &Filters::new())
            .await
            .unwrap();
        assert_eq!(listed[0].name, "c-9");
    }

    #[tokio::test]
    async fn test_decode_failure_is_reported() {
        let store = InMemoryPolicyStore::new();
        store.seed(ResourceKind::Contract, json!({"name": "no id", "tenant_id": "t-1"}));

        let err = resources::<Contract>(&store)
            .list(&tenant("t-1"), &Filters::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PolicyError::Decode { kind: ResourceKind::Contract, .. }));
    }
}
