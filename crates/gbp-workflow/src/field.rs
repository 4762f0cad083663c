//! Field specs - declarative step fields and one rule evaluator
//!
//! A step declares its fields as data. Raw submissions arrive as lists of
//! strings per field name (checkbox groups submit several values) and are
//! turned into typed context values by [`FieldSpec::evaluate`].

use gbp_common::ResourceKind;
use serde::Serialize;
use serde_json::Value;

/// Maximum length of free-text fields
pub const MAX_TEXT_LEN: usize = 80;

const REQUIRED: &str = "This field is required.";

/// A selectable `(id, label)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Value submitted back when selected
    pub id: String,
    /// Text shown to the user
    pub label: String,
}

impl Choice {
    /// Create a choice
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Value type and constraint of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, trimmed, bounded length
    Text { max_len: usize },
    /// Boolean toggle; absent means false
    Flag,
    /// TCP/UDP port number
    Port,
    /// One value out of a fixed set
    Choice { options: &'static [&'static str] },
    /// Any number of ids out of choices resolved from the store
    MultiSelect { source: ResourceKind },
}

/// One declared field of a step
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Context key the field contributes
    pub name: &'static str,
    /// Label shown next to the input
    pub label: &'static str,
    /// Type and constraint
    pub kind: FieldKind,
    /// Whether an empty submission is rejected
    pub required: bool,
    /// Optional hint shown under the input
    pub help_text: Option<&'static str>,
}

impl FieldSpec {
    fn new(name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            name,
            label,
            kind,
            required,
            help_text: None,
        }
    }

    /// Optional text field of at most [`MAX_TEXT_LEN`] characters
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text { max_len: MAX_TEXT_LEN }, false)
    }

    /// Boolean toggle
    pub fn flag(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Flag, false)
    }

    /// Optional port number
    pub fn port(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Port, false)
    }

    /// Required single choice out of a fixed set
    pub fn choice(name: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(name, label, FieldKind::Choice { options }, true)
    }

    /// Optional multi-select populated from the store
    pub fn multi_select(name: &'static str, label: &'static str, source: ResourceKind) -> Self {
        Self::new(name, label, FieldKind::MultiSelect { source }, false)
    }

    /// Reject empty submissions
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept empty submissions
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Attach a hint
    pub fn with_help(mut self, help_text: &'static str) -> Self {
        self.help_text = Some(help_text);
        self
    }

    /// Store kind backing a multi-select
    pub fn choice_source(&self) -> Option<ResourceKind> {
        match self.kind {
            FieldKind::MultiSelect { source } => Some(source),
            _ => None,
        }
    }

    /// Turn a raw submission into a context value
    ///
    /// `choices` are the populated options of a multi-select and are ignored
    /// for every other kind.
    pub fn evaluate(&self, raw: &[String], choices: &[Choice]) -> Result<Value, String> {
        match &self.kind {
            FieldKind::Text { max_len } => {
                let text = last(raw).trim();
                if text.is_empty() && self.required {
                    return Err(REQUIRED.into());
                }
                let len = text.chars().count();
                if len > *max_len {
                    return Err(format!(
                        "Ensure this value has at most {} characters (it has {}).",
                        max_len, len
                    ));
                }
                Ok(Value::String(text.to_string()))
            }
            FieldKind::Flag => match last(raw).trim().to_ascii_lowercase().as_str() {
                "" | "false" | "off" | "0" | "no" if !self.required => Ok(Value::Bool(false)),
                "" | "false" | "off" | "0" | "no" => Err(REQUIRED.into()),
                "true" | "on" | "1" | "yes" => Ok(Value::Bool(true)),
                _ => Err("Enter a valid boolean.".into()),
            },
            FieldKind::Port => {
                let text = last(raw).trim();
                if text.is_empty() {
                    return if self.required { Err(REQUIRED.into()) } else { Ok(Value::Null) };
                }
                text.parse::<u16>()
                    .map(Value::from)
                    .map_err(|_| "Enter a whole number between 0 and 65535.".into())
            }
            FieldKind::Choice { options } => {
                let text = last(raw).trim();
                if text.is_empty() {
                    return if self.required { Err(REQUIRED.into()) } else { Ok(Value::Null) };
                }
                if options.contains(&text) {
                    Ok(Value::String(text.to_string()))
                } else {
                    Err(not_a_choice(text))
                }
            }
            FieldKind::MultiSelect { .. } => {
                let mut selected: Vec<&str> = Vec::new();
                for id in raw.iter().map(String::as_str).filter(|id| !id.is_empty()) {
                    if !selected.contains(&id) {
                        selected.push(id);
                    }
                }
                if selected.is_empty() && self.required {
                    return Err(REQUIRED.into());
                }
                if let Some(unknown) = selected.iter().find(|id| !choices.iter().any(|c| c.id == **id)) {
                    return Err(not_a_choice(unknown));
                }
                Ok(Value::Array(
                    selected.into_iter().map(|id| Value::String(id.to_string())).collect(),
                ))
            }
        }
    }
}

// Repeated scalar values: the last one wins
fn last(raw: &[String]) -> &str {
    raw.last().map(String::as_str).unwrap_or("")
}

fn not_a_choice(value: &str) -> String {
    format!("Select a valid choice. {} is not one of the available choices.", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_text_trims_and_bounds() {
        let name = FieldSpec::text("name", "Name");
        assert_eq!(name.evaluate(&raw(&["  web  "]), &[]), Ok(json!("web")));
        assert_eq!(name.evaluate(&[], &[]), Ok(json!("")));
        assert!(name.evaluate(&["x".repeat(81)], &[]).is_err());
        assert!(name.evaluate(&["x".repeat(80)], &[]).is_ok());

        let required = FieldSpec::text("name", "Name").required();
        assert_eq!(required.evaluate(&raw(&["   "]), &[]), Err(REQUIRED.to_string()));
    }

    #[test]
    fn test_flag_values() {
        let flag = FieldSpec::flag("with_policy", "With policy");
        assert_eq!(flag.evaluate(&[], &[]), Ok(json!(false)));
        assert_eq!(flag.evaluate(&raw(&["on"]), &[]), Ok(json!(true)));
        assert_eq!(flag.evaluate(&raw(&["False"]), &[]), Ok(json!(false)));
        assert!(flag.evaluate(&raw(&["maybe"]), &[]).is_err());
    }

    #[test]
    fn test_port_values() {
        let port = FieldSpec::port("min_port", "Port Range(Min)");
        assert_eq!(port.evaluate(&raw(&["443"]), &[]), Ok(json!(443)));
        assert_eq!(port.evaluate(&raw(&[""]), &[]), Ok(Value::Null));
        assert!(port.evaluate(&raw(&["65536"]), &[]).is_err());
        assert!(port.evaluate(&raw(&["-1"]), &[]).is_err());
        assert!(port.evaluate(&raw(&["http"]), &[]).is_err());
    }

    #[test]
    fn test_choice_membership() {
        let protocol = FieldSpec::choice("protocol", "Protocol", &["tcp", "udp"]);
        assert_eq!(protocol.evaluate(&raw(&["udp"]), &[]), Ok(json!("udp")));
        assert_eq!(protocol.evaluate(&[], &[]), Err(REQUIRED.to_string()));
        assert!(protocol.evaluate(&raw(&["TCP"]), &[]).is_err());
    }

    #[test]
    fn test_multi_select_filters_blank_and_duplicates() {
        let rules = FieldSpec::multi_select("policy_rules", "Policy Rules", ResourceKind::PolicyRule);
        let choices = vec![Choice::new("r-1", "rule-1"), Choice::new("r-2", "rule-2")];

        assert_eq!(
            rules.evaluate(&raw(&["r-2", "", "r-1", "r-2"]), &choices),
            Ok(json!(["r-2", "r-1"]))
        );
        assert_eq!(rules.evaluate(&[], &choices), Ok(json!([])));
        assert_eq!(
            rules.evaluate(&raw(&["r-9"]), &choices),
            Err(not_a_choice("r-9"))
        );
        assert_eq!(rules.choice_source(), Some(ResourceKind::PolicyRule));
    }

    #[test]
    fn test_multi_select_without_choices_rejects_any_selection() {
        let rules = FieldSpec::multi_select("policy_rules", "Policy Rules", ResourceKind::PolicyRule);
        assert!(rules.evaluate(&raw(&["r-1"]), &[]).is_err());
        assert_eq!(rules.evaluate(&raw(&[""]), &[]), Ok(json!([])));
    }
}
