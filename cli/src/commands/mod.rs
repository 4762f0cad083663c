//! CLI Commands

pub mod actions;
pub mod classifiers;
pub mod config;
pub mod contracts;
pub mod epg;
pub mod rules;

use crate::output::{OutputFormat, Row};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use gbp_client::{ClientConfig, NeutronPolicyClient};
use gbp_common::{resources, Fields, Filters, IdSet, PolicyResource, ResourceId, TenantId};
use gbp_workflow::{workflows, StepInput, WorkflowError};
use serde_json::Value;

/// Store client plus the tenant every call is scoped to
pub struct Session {
    pub client: NeutronPolicyClient,
    pub tenant_id: TenantId,
}

impl Session {
    pub fn connect(endpoint: Option<String>, token: Option<String>, tenant_id: Option<String>) -> Result<Self> {
        let endpoint = endpoint.context("No endpoint configured (use --endpoint, GBP_ENDPOINT or `gbp config set endpoint`)")?;
        let tenant_id = tenant_id.context("No tenant configured (use --tenant-id, GBP_TENANT_ID or `gbp config set tenant_id`)")?;

        let mut config = ClientConfig::new(endpoint);
        if let Some(token) = token {
            config = config.with_token(token);
        }
        Ok(Self {
            client: NeutronPolicyClient::new(config)?,
            tenant_id: TenantId::new(tenant_id)?,
        })
    }
}

pub async fn list<K: PolicyResource + Row>(session: &Session, format: OutputFormat) -> Result<()> {
    let items = resources::<K>(&session.client)
        .list_for_display(&session.tenant_id, &Filters::new())
        .await
        .with_context(|| format!("Unable to retrieve {}", K::KIND.plural_noun()))?;
    format.print_list(&items);
    Ok(())
}

pub async fn show<K: PolicyResource + Row>(session: &Session, id: &str, format: OutputFormat) -> Result<()> {
    let mut item = resources::<K>(&session.client).get(&ResourceId::new(id)?).await?;
    item.set_id_as_name_if_empty();
    format.print_one(&item);
    Ok(())
}

pub async fn update<K: PolicyResource + Row>(session: &Session, id: &str, fields: Fields, format: OutputFormat) -> Result<()> {
    if fields.is_empty() {
        bail!("Nothing to update: pass at least one field");
    }
    let item = resources::<K>(&session.client)
        .update(&ResourceId::new(id)?, fields)
        .await
        .with_context(|| format!("Unable to update {} {}", K::KIND.label(), id))?;
    println!("{} {} \"{}\".", "Updated".green(), K::KIND.label(), item.display_name());
    format.print_one(&item);
    Ok(())
}

pub async fn delete<K: PolicyResource>(session: &Session, id: &str) -> Result<()> {
    resources::<K>(&session.client)
        .delete(&ResourceId::new(id)?)
        .await
        .with_context(|| format!("Unable to delete {} {}", K::KIND.label(), id))?;
    println!("{} {} {}", "Deleted".green(), K::KIND.label(), id);
    Ok(())
}

/// Drive a kind's creation workflow, feeding the same input to every step
pub async fn create<K: PolicyResource + Row>(session: &Session, input: StepInput, format: OutputFormat) -> Result<()> {
    let mut run = workflows::for_kind(K::KIND).start(session.tenant_id.clone())?;
    run.enter(&session.client).await?;

    loop {
        for warning in &run.choices().warnings {
            eprintln!("{} {}", "Warning:".yellow(), warning);
        }
        let step = run.current_step().map(|s| s.name).unwrap_or_default();
        let before = run.state();
        match run.submit(&session.client, &input).await {
            Ok(state) if state == before => break,
            Ok(_) => continue,
            Err(WorkflowError::Validation(errors)) => {
                for error in errors.iter() {
                    eprintln!("  {} {}", format!("{}:", error.field).yellow(), error.message);
                }
                bail!("{}: invalid input", step);
            }
            Err(e) => return Err(e.into()),
        }
    }

    // The failure message already carries the store error
    let done = run
        .finalize(&session.client)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    println!("{}", done.message.green());
    let mut item: K = gbp_common::decode(done.object)?;
    item.set_id_as_name_if_empty();
    format.print_one(&item);
    Ok(())
}

/// Raw submission with an optional text field
pub fn with_text(input: StepInput, field: &str, value: Option<String>) -> StepInput {
    match value {
        Some(value) => input.with(field, value),
        None => input,
    }
}

/// Insert a text field when given
pub fn put_text(fields: &mut Fields, field: &str, value: Option<String>) {
    if let Some(value) = value {
        fields.insert(field.to_string(), Value::String(value));
    }
}

/// Insert an id list when non-empty, dropping duplicates
pub fn put_ids(fields: &mut Fields, field: &str, ids: Vec<String>) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let ids = ids
        .into_iter()
        .map(ResourceId::new)
        .collect::<Result<IdSet, _>>()?;
    fields.insert(field.to_string(), serde_json::to_value(ids)?);
    Ok(())
}

pub fn join_ids(ids: &IdSet) -> String {
    ids.iter().map(ResourceId::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_helpers() {
        let mut fields = Fields::new();
        put_text(&mut fields, "name", Some("web".into()));
        put_text(&mut fields, "description", None);
        put_ids(&mut fields, "policy_rules", vec!["r-1".into(), "r-2".into(), "r-1".into()]).unwrap();
        put_ids(&mut fields, "policy_actions", vec![]).unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["policy_rules"], json!(["r-1", "r-2"]));
        assert!(put_ids(&mut fields, "policy_rules", vec!["bad id".into()]).is_err());
    }

    #[test]
    fn test_session_requires_endpoint_and_tenant() {
        assert!(Session::connect(None, None, Some("demo".into())).is_err());
        assert!(Session::connect(Some("http://neutron:9696".into()), None, None).is_err());
        assert!(Session::connect(Some("http://neutron:9696".into()), None, Some("demo".into())).is_ok());
    }
}
