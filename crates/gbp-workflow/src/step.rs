//! Step descriptors
//!
//! A step is pure data: the fields it contributes plus an optional
//! cross-field check that runs once every field is individually valid.

use crate::context::StepInput;
use crate::field::{Choice, FieldSpec};
use crate::resolver::SelectionResolver;
use gbp_common::{FieldError, Fields, ResourceKind, TenantId, ValidationErrors};
use std::collections::BTreeMap;
use std::fmt;

/// Cross-field rule over a step's evaluated fields
pub type StepCheck = fn(&Fields) -> Result<(), FieldError>;

/// Choices populated for a step's multi-select fields
#[derive(Debug, Clone, Default)]
pub struct StepChoices {
    by_field: BTreeMap<&'static str, Vec<Choice>>,
    /// Non-fatal warnings raised while resolving
    pub warnings: Vec<String>,
}

impl StepChoices {
    /// Choices of one field, empty when it has none
    pub fn for_field(&self, field: &str) -> &[Choice] {
        self.by_field.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Set the choices of one field
    pub fn insert(&mut self, field: &'static str, choices: Vec<Choice>) {
        self.by_field.insert(field, choices);
    }
}

/// One step of a workflow
#[derive(Clone)]
pub struct Step {
    /// Stable identifier
    pub slug: &'static str,
    /// Title shown to the user
    pub name: &'static str,
    /// Optional hint
    pub help_text: Option<&'static str>,
    /// Declared fields, in display order
    pub fields: Vec<FieldSpec>,
    /// Cross-field check
    pub check: Option<StepCheck>,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("slug", &self.slug)
            .field("name", &self.name)
            .field("fields", &self.contributes())
            .field("check", &self.check.is_some())
            .finish()
    }
}

impl Step {
    /// Empty step
    pub fn new(slug: &'static str, name: &'static str) -> Self {
        Self {
            slug,
            name,
            help_text: None,
            fields: Vec::new(),
            check: None,
        }
    }

    /// Attach a hint
    pub fn with_help(mut self, help_text: &'static str) -> Self {
        self.help_text = Some(help_text);
        self
    }

    /// Append a field
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the cross-field check
    pub fn with_check(mut self, check: StepCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// Context keys this step contributes
    pub fn contributes(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Fields rejected when empty
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields.iter().filter(|f| f.required).map(|f| f.name).collect()
    }

    /// Resolve choices for every multi-select field
    ///
    /// Each source kind is listed once even when several fields share it.
    pub async fn populate_choices(&self, resolver: &SelectionResolver<'_>, tenant_id: &TenantId) -> StepChoices {
        let mut resolved: BTreeMap<ResourceKind, Vec<Choice>> = BTreeMap::new();
        let mut choices = StepChoices::default();

        for field in &self.fields {
            let Some(source) = field.choice_source() else {
                continue;
            };
            if !resolved.contains_key(&source) {
                let selection = resolver.resolve(source, tenant_id).await;
                choices.warnings.extend(selection.warning);
                resolved.insert(source, selection.choices);
            }
            let options = resolved.get(&source).cloned().unwrap_or_default();
            choices.insert(field.name, options);
        }

        choices
    }

    /// Evaluate a submission against the declared fields
    pub fn validate(&self, input: &StepInput, choices: &StepChoices) -> Result<Fields, ValidationErrors> {
        let mut fields = Fields::new();
        let mut errors = ValidationErrors::new();

        for spec in &self.fields {
            match spec.evaluate(input.values(spec.name), choices.for_field(spec.name)) {
                Ok(value) => {
                    fields.insert(spec.name.to_string(), value);
                }
                Err(message) => errors.push(FieldError::new(spec.name, message)),
            }
        }
        errors.into_result()?;

        if let Some(check) = self.check {
            check(&fields).map_err(ValidationErrors::from)?;
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbp_common::InMemoryPolicyStore;
    use serde_json::json;

    fn no_blank_description(fields: &Fields) -> Result<(), FieldError> {
        match fields.get("description").and_then(|v| v.as_str()) {
            Some("") => Err(FieldError::new("description", "Say something.")),
            _ => Ok(()),
        }
    }

    fn details() -> Step {
        Step::new("details", "Details")
            .field(FieldSpec::text("name", "Name").required())
            .field(FieldSpec::text("description", "Description"))
    }

    #[test]
    fn test_descriptor() {
        let step = details();
        assert_eq!(step.contributes(), vec!["name", "description"]);
        assert_eq!(step.required_fields(), vec!["name"]);
    }

    #[test]
    fn test_collects_every_field_error() {
        let step = details();
        let input = StepInput::new().with("description", "x".repeat(81));

        let errors = step.validate(&input, &StepChoices::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("name").count(), 1);
    }

    #[test]
    fn test_check_runs_after_fields_pass() {
        let step = details().with_check(no_blank_description);

        let errors = step
            .validate(&StepInput::new(), &StepChoices::default())
            .unwrap_err();
        assert_eq!(errors.len(), 1, "field errors short-circuit the check");

        let errors = step
            .validate(&StepInput::new().with("name", "web"), &StepChoices::default())
            .unwrap_err();
        assert_eq!(errors.for_field("description").count(), 1);

        let fields = step
            .validate(
                &StepInput::new().with("name", "web").with("description", "front"),
                &StepChoices::default(),
            )
            .unwrap();
        assert_eq!(fields["name"], json!("web"));
    }

    #[tokio::test]
    async fn test_shared_source_listed_once() {
        let store = InMemoryPolicyStore::new();
        store.seed(
            ResourceKind::Contract,
            json!({"id": "c-1", "name": "web", "tenant_id": "t-1"}),
        );
        let step = Step::new("contracts", "Provide/Consume Contract")
            .field(FieldSpec::multi_select("provided_contracts", "Provided", ResourceKind::Contract))
            .field(FieldSpec::multi_select("consumed_contracts", "Consumed", ResourceKind::Contract));

        let tenant = TenantId::new("t-1").unwrap();
        let choices = step
            .populate_choices(&SelectionResolver::new(&store), &tenant)
            .await;

        assert!(choices.warnings.is_empty());
        assert_eq!(choices.for_field("provided_contracts"), [Choice::new("c-1", "web")]);
        assert_eq!(choices.for_field("consumed_contracts"), [Choice::new("c-1", "web")]);
        assert!(choices.for_field("name").is_empty());
    }
}
