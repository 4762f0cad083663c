//! Step input and the accumulating workflow context

use gbp_common::Fields;
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw values submitted for one step, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepInput(BTreeMap<String, Vec<String>>);

impl StepInput {
    /// Empty submission
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value for a field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.entry(field.into()).or_default().push(value.into());
        self
    }

    /// Append several values for a field (multi-selects)
    pub fn with_all<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(field.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Set a toggle field
    pub fn with_flag(self, field: impl Into<String>, on: bool) -> Self {
        self.with(field, if on { "true" } else { "false" })
    }

    /// Values submitted for a field, empty when absent
    pub fn values(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Fields contributed so far, in submission order of the steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowContext(Fields);

impl WorkflowContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a step's contribution; later steps overwrite earlier keys
    pub fn merge(&mut self, contribution: Fields) {
        self.0.extend(contribution);
    }

    /// Raw value of a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Text value, empty when absent or not text
    pub fn text(&self, field: &str) -> &str {
        self.0.get(field).and_then(Value::as_str).unwrap_or("")
    }

    /// Toggle value, false when absent
    pub fn flag(&self, field: &str) -> bool {
        self.0.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Selected ids of a multi-select, empty when absent
    pub fn ids(&self, field: &str) -> Vec<String> {
        self.0
            .get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default()
    }

    /// Copy of the listed fields that are present and not null
    pub fn select(&self, fields: &[&str]) -> Fields {
        fields
            .iter()
            .filter_map(|name| match self.0.get(*name) {
                None | Some(Value::Null) => None,
                Some(value) => Some((name.to_string(), value.clone())),
            })
            .collect()
    }

    /// Every contributed field
    pub fn as_fields(&self) -> &Fields {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_input_accumulates() {
        let input = StepInput::new()
            .with("name", "web")
            .with_all("policy_rules", ["r-1", "r-2"])
            .with("policy_rules", "r-3")
            .with_flag("with_policy", true);

        assert_eq!(input.values("name"), ["web".to_string()]);
        assert_eq!(input.values("policy_rules").len(), 3);
        assert_eq!(input.values("with_policy"), ["true".to_string()]);
        assert!(input.values("missing").is_empty());
    }

    #[test]
    fn test_context_accessors() {
        let mut ctx = WorkflowContext::new();
        let mut step = Fields::new();
        step.insert("name".into(), json!("web"));
        step.insert("with_policy".into(), json!(true));
        step.insert("min_port".into(), Value::Null);
        step.insert("policy_rules".into(), json!(["r-1"]));
        ctx.merge(step);

        assert_eq!(ctx.text("name"), "web");
        assert!(ctx.flag("with_policy"));
        assert!(!ctx.flag("with_action"));
        assert_eq!(ctx.ids("policy_rules"), vec!["r-1".to_string()]);
        assert!(ctx.ids("policy_actions").is_empty());

        let selected = ctx.select(&["name", "min_port", "description"]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected["name"], json!("web"));
    }
}
