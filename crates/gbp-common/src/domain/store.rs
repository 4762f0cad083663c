//! Policy store - the resource client contract
//!
//! One operation family per [`ResourceKind`]:
//! - `create` / `list` are tenant-scoped
//! - `get` / `update` / `delete` address an object by id
//!
//! Implementations perform exactly one round trip per call and never retry:
//! creation is not idempotent.

use super::resources::{PolicyResource, ResourceKind};
use super::value_objects::{ResourceId, TenantId};
use crate::error::{PolicyError, PolicyResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Field map submitted on create and update
pub type Fields = serde_json::Map<String, Value>;

/// Equality filters applied to `list`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    /// No filtering
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Iterate filters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check a raw object against every filter
    pub fn matches(&self, object: &Value) -> bool {
        self.0.iter().all(|(field, expected)| match object.get(field) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Number(n)) => n.to_string() == *expected,
            Some(Value::Bool(b)) => b.to_string() == *expected,
            _ => false,
        })
    }
}

/// Resource client over the external policy-object store
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Create an object under a tenant, returning the stored object
    async fn create(&self, kind: ResourceKind, tenant_id: &TenantId, fields: Fields) -> PolicyResult<Value>;

    /// List a tenant's objects; an empty result is not an error
    async fn list(&self, kind: ResourceKind, tenant_id: &TenantId, filters: &Filters) -> PolicyResult<Vec<Value>>;

    /// Fetch one object
    async fn get(&self, kind: ResourceKind, id: &ResourceId) -> PolicyResult<Value>;

    /// Apply a partial update, returning the stored object
    async fn update(&self, kind: ResourceKind, id: &ResourceId, fields: Fields) -> PolicyResult<Value>;

    /// Delete one object
    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> PolicyResult<()>;
}

/// Typed accessor for one resource kind
///
/// ```ignore
/// let contracts = resources::<Contract>(&store).list(&tenant, &Filters::new()).await?;
/// ```
pub struct Resources<'a, K> {
    store: &'a dyn PolicyStore,
    kind: PhantomData<fn() -> K>,
}

/// Typed accessor for `K` over any store
pub fn resources<K: PolicyResource>(store: &dyn PolicyStore) -> Resources<'_, K> {
    Resources {
        store,
        kind: PhantomData,
    }
}

impl<'a, K: PolicyResource> Resources<'a, K> {
    /// Create from a field map
    pub async fn create(&self, tenant_id: &TenantId, fields: Fields) -> PolicyResult<K> {
        let value = self.store.create(K::KIND, tenant_id, fields).await?;
        decode(value)
    }

    /// List in store order
    pub async fn list(&self, tenant_id: &TenantId, filters: &Filters) -> PolicyResult<Vec<K>> {
        self.store
            .list(K::KIND, tenant_id, filters)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// List with the display-name fallback applied, as list views render it
    pub async fn list_for_display(&self, tenant_id: &TenantId, filters: &Filters) -> PolicyResult<Vec<K>> {
        let mut items = self.list(tenant_id, filters).await?;
        for item in &mut items {
            item.set_id_as_name_if_empty();
        }
        Ok(items)
    }

    /// Fetch by id
    pub async fn get(&self, id: &ResourceId) -> PolicyResult<K> {
        let value = self.store.get(K::KIND, id).await?;
        decode(value)
    }

    /// Partial update
    pub async fn update(&self, id: &ResourceId, fields: Fields) -> PolicyResult<K> {
        let value = self.store.update(K::KIND, id, fields).await?;
        decode(value)
    }

    /// Delete by id
    pub async fn delete(&self, id: &ResourceId) -> PolicyResult<()> {
        self.store.delete(K::KIND, id).await
    }
}

/// Decode a raw store object into a typed resource
pub fn decode<K: PolicyResource>(value: Value) -> PolicyResult<K> {
    serde_json::from_value(value).map_err(|e| PolicyError::Decode {
        kind: K::KIND,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filters_match() {
        let filters = Filters::new().with("name", "web").with("shared", "false");
        assert!(filters.matches(&json!({"name": "web", "shared": false})));
        assert!(!filters.matches(&json!({"name": "db", "shared": false})));
        assert!(!filters.matches(&json!({"name": "web"})));
        assert!(Filters::new().matches(&json!({})));
    }

    #[test]
    fn test_decode_rejects_blank_id() {
        use crate::domain::resources::Contract;

        let err = decode::<Contract>(json!({"id": "", "name": ""})).unwrap_err();
        assert!(matches!(err, PolicyError::Decode { kind: ResourceKind::Contract, .. }));
        assert!(decode::<Contract>(json!({"id": "c-1"})).is_ok());
    }
}
