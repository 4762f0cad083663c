//! Neutron group-policy HTTP client

use crate::config::{ClientConfig, ConfigError};
use async_trait::async_trait;
use gbp_common::{Fields, Filters, PolicyError, PolicyResult, PolicyStore, ResourceId, ResourceKind, TenantId};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use url::Url;

const API_PREFIX: [&str; 2] = ["v2.0", "grouppolicy"];

/// Policy store backed by the Neutron group-policy REST API
pub struct NeutronPolicyClient {
    base: Url,
    token: Option<String>,
    client: Client,
}

impl NeutronPolicyClient {
    /// Build a client; fails on a malformed endpoint
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: config.endpoint,
                reason: "expected an http(s) URL".into(),
            });
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base,
            token: config.token,
            client,
        })
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    fn url(&self, kind: ResourceKind, id: Option<&ResourceId>) -> Url {
        let mut url = self.base.clone();
        // cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(API_PREFIX).push(kind.collection());
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    async fn send(&self, req: RequestBuilder) -> PolicyResult<Response> {
        let req = match &self.token {
            Some(token) => req.header("X-Auth-Token", token),
            None => req,
        };
        req.header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PolicyError::transport(e.to_string()))
    }
}

fn wrap(kind: ResourceKind, fields: Fields) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(kind.singular().to_string(), Value::Object(fields));
    Value::Object(body)
}

async fn read_body(kind: ResourceKind, resp: Response) -> PolicyResult<Value> {
    resp.json::<Value>().await.map_err(|e| PolicyError::Decode {
        kind,
        message: e.to_string(),
    })
}

fn unwrap_key(kind: ResourceKind, mut body: Value, key: &str) -> PolicyResult<Value> {
    body.get_mut(key)
        .map(Value::take)
        .ok_or_else(|| PolicyError::Decode {
            kind,
            message: format!("response has no {:?} key", key),
        })
}

/// Pull the message out of a Neutron error body
///
/// Both `{"NeutronError": "..."}` and `{"NeutronError": {"message": "..."}}`
/// are in use.
fn neutron_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("NeutronError")? {
        Value::String(message) => Some(message.clone()),
        error => error.get("message").and_then(Value::as_str).map(String::from),
    }
}

async fn failure(kind: ResourceKind, id: Option<&ResourceId>, resp: Response) -> PolicyError {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return PolicyError::NotFound {
                kind,
                id: id.to_string(),
            };
        }
    }

    let body = resp.text().await.unwrap_or_default();
    let message = neutron_message(&body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            status.to_string()
        } else {
            body.to_string()
        }
    });

    PolicyError::Remote {
        status: Some(status.as_u16()),
        message,
    }
}

#[async_trait]
impl PolicyStore for NeutronPolicyClient {
    async fn create(&self, kind: ResourceKind, tenant_id: &TenantId, mut fields: Fields) -> PolicyResult<Value> {
        let url = self.url(kind, None);
        tracing::debug!(kind = %kind, tenant = %tenant_id, %url, "create");

        fields.insert("tenant_id".into(), Value::String(tenant_id.to_string()));
        let resp = self.send(self.client.post(url).json(&wrap(kind, fields))).await?;
        if !resp.status().is_success() {
            return Err(failure(kind, None, resp).await);
        }

        let body = read_body(kind, resp).await?;
        unwrap_key(kind, body, kind.singular())
    }

    async fn list(&self, kind: ResourceKind, tenant_id: &TenantId, filters: &Filters) -> PolicyResult<Vec<Value>> {
        let url = self.url(kind, None);
        tracing::debug!(kind = %kind, tenant = %tenant_id, %url, "list");

        let mut query = vec![("tenant_id", tenant_id.as_str())];
        query.extend(filters.iter());
        let resp = self.send(self.client.get(url).query(&query)).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(failure(kind, None, resp).await);
        }

        let mut body = read_body(kind, resp).await?;
        match body.get_mut(kind.collection()).map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(PolicyError::Decode {
                kind,
                message: format!("expected a list under {:?}, got {}", kind.collection(), other),
            }),
        }
    }

    async fn get(&self, kind: ResourceKind, id: &ResourceId) -> PolicyResult<Value> {
        let url = self.url(kind, Some(id));
        tracing::debug!(kind = %kind, %id, "get");

        let resp = self.send(self.client.get(url)).await?;
        if !resp.status().is_success() {
            return Err(failure(kind, Some(id), resp).await);
        }

        let body = read_body(kind, resp).await?;
        unwrap_key(kind, body, kind.singular())
    }

    async fn update(&self, kind: ResourceKind, id: &ResourceId, fields: Fields) -> PolicyResult<Value> {
        let url = self.url(kind, Some(id));
        tracing::debug!(kind = %kind, %id, "update");

        let resp = self.send(self.client.put(url).json(&wrap(kind, fields))).await?;
        if !resp.status().is_success() {
            return Err(failure(kind, Some(id), resp).await);
        }

        let body = read_body(kind, resp).await?;
        unwrap_key(kind, body, kind.singular())
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> PolicyResult<()> {
        let url = self.url(kind, Some(id));
        tracing::debug!(kind = %kind, %id, "delete");

        let resp = self.send(self.client.delete(url)).await?;
        if !resp.status().is_success() {
            return Err(failure(kind, Some(id), resp).await);
        }
        Ok(())
    }
}
