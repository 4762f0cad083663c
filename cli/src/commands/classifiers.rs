//! Policy classifier commands

use super::{create, delete, list, put_text, show, update, with_text, Session};
use crate::output::{OutputFormat, Row};
use crate::ClassifierCommands;
use anyhow::Result;
use gbp_common::{
    check_port_range, resources, ClassifierAction, Direction, FieldError, Fields, PolicyClassifier, PolicyError,
    PolicyResult, Protocol, ResourceId, ValidationErrors,
};
use gbp_workflow::StepInput;
use serde_json::Value;

impl Row for PolicyClassifier {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Protocol", "Port Range", "Direction", "Action"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.protocol.to_string(),
            self.port_range(),
            self.direction.to_string(),
            self.action.to_string(),
        ]
    }
}

/// Partial update body
///
/// Enum values are checked locally. The port range is checked after merging
/// the given bounds over the stored ones, so a lone `--max-port` below the
/// stored `min_port` is caught before any call.
fn update_fields(
    name: Option<String>,
    protocol: Option<String>,
    min_port: Option<u16>,
    max_port: Option<u16>,
    direction: Option<String>,
    action: Option<String>,
    stored: Option<&PolicyClassifier>,
) -> PolicyResult<Fields> {
    let mut fields = Fields::new();
    let mut errors = ValidationErrors::new();
    put_text(&mut fields, "name", name);

    if let Some(protocol) = protocol {
        match protocol.parse::<Protocol>() {
            Ok(protocol) => {
                fields.insert("protocol".into(), Value::from(protocol.as_str()));
            }
            Err(e) => errors.push(FieldError::new("protocol", e.to_string())),
        }
    }
    if let Some(direction) = direction {
        match direction.parse::<Direction>() {
            Ok(direction) => {
                fields.insert("direction".into(), Value::from(direction.as_str()));
            }
            Err(e) => errors.push(FieldError::new("direction", e.to_string())),
        }
    }
    if let Some(action) = action {
        match action.parse::<ClassifierAction>() {
            Ok(action) => {
                fields.insert("action".into(), Value::from(action.as_str()));
            }
            Err(e) => errors.push(FieldError::new("action", e.to_string())),
        }
    }

    let merged_min = min_port.or_else(|| stored.and_then(|c| c.min_port));
    let merged_max = max_port.or_else(|| stored.and_then(|c| c.max_port));
    if let Err(e) = check_port_range(merged_min, merged_max) {
        errors.push(FieldError::new("max_port", e.to_string()));
    }
    if let Some(port) = min_port {
        fields.insert("min_port".into(), Value::from(port));
    }
    if let Some(port) = max_port {
        fields.insert("max_port".into(), Value::from(port));
    }

    errors.into_result().map_err(PolicyError::Validation)?;
    Ok(fields)
}

pub async fn handle(action: ClassifierCommands, session: &Session, format: OutputFormat) -> Result<()> {
    match action {
        ClassifierCommands::List => list::<PolicyClassifier>(session, format).await,
        ClassifierCommands::Show { id } => show::<PolicyClassifier>(session, &id, format).await,
        ClassifierCommands::Create {
            name,
            protocol,
            min_port,
            max_port,
            direction,
            action,
        } => {
            let input = with_text(StepInput::new(), "name", name);
            let input = with_text(input, "min_port", min_port);
            let input = with_text(input, "max_port", max_port)
                .with("protocol", protocol)
                .with("direction", direction)
                .with("action", action);
            create::<PolicyClassifier>(session, input, format).await
        }
        ClassifierCommands::Update {
            id,
            name,
            protocol,
            min_port,
            max_port,
            direction,
            action,
        } => {
            // Only one bound given: the other comes from the stored classifier
            let stored = match (min_port, max_port) {
                (Some(_), None) | (None, Some(_)) => Some(
                    resources::<PolicyClassifier>(&session.client)
                        .get(&ResourceId::new(&id)?)
                        .await?,
                ),
                _ => None,
            };
            let fields = update_fields(name, protocol, min_port, max_port, direction, action, stored.as_ref())?;
            update::<PolicyClassifier>(session, &id, fields, format).await
        }
        ClassifierCommands::Delete { id } => delete::<PolicyClassifier>(session, &id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(min_port: Option<u16>, max_port: Option<u16>) -> PolicyClassifier {
        let mut classifier: PolicyClassifier = gbp_common::decode(json!({
            "id": "pc-1",
            "name": "web",
            "protocol": "tcp",
            "direction": "in",
            "action": "allow",
        }))
        .unwrap();
        classifier.min_port = min_port;
        classifier.max_port = max_port;
        classifier
    }

    #[test]
    fn test_update_fields() {
        let fields = update_fields(None, Some("udp".into()), Some(53), Some(53), None, Some("redirect".into()), None).unwrap();
        assert_eq!(fields["protocol"], json!("udp"));
        assert_eq!(fields["action"], json!("redirect"));
        assert_eq!(fields["min_port"], json!(53));
        assert!(!fields.contains_key("direction"));
    }

    #[test]
    fn test_update_fields_rejects_bad_input() {
        let err = update_fields(None, Some("gre".into()), None, None, Some("up".into()), None, None).unwrap_err();
        let PolicyError::Validation(errors) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("protocol").count(), 1);
        assert_eq!(errors.for_field("direction").count(), 1);

        let err = update_fields(None, None, Some(100), Some(50), None, None, None).unwrap_err();
        assert!(matches!(&err, PolicyError::Validation(errors) if errors.for_field("max_port").count() == 1));
    }

    #[test]
    fn test_update_port_range_merges_stored_bounds() {
        let current = stored(Some(100), Some(200));

        let err = update_fields(None, None, None, Some(50), None, None, Some(&current)).unwrap_err();
        assert!(matches!(&err, PolicyError::Validation(errors) if errors.for_field("max_port").count() == 1));
        assert!(update_fields(None, None, Some(300), None, None, None, Some(&current)).is_err());

        let fields = update_fields(None, None, None, Some(150), None, None, Some(&current)).unwrap();
        assert_eq!(fields["max_port"], json!(150));
        assert!(!fields.contains_key("min_port"));

        // Both bounds given: stored values are irrelevant
        assert!(update_fields(None, None, Some(10), Some(20), None, None, Some(&current)).is_ok());
        assert!(update_fields(None, None, None, Some(50), None, None, Some(&stored(None, None))).is_ok());
    }
}
