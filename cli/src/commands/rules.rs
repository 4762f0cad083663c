//! Policy rule commands

use super::{create, delete, join_ids, list, put_ids, put_text, show, update, with_text, Session};
use crate::output::{OutputFormat, Row};
use crate::RuleCommands;
use anyhow::Result;
use gbp_common::{Fields, PolicyRule};
use gbp_workflow::StepInput;

impl Row for PolicyRule {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Description", "Classifiers", "Actions"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.description.clone(),
            join_ids(&self.classifiers),
            join_ids(&self.actions),
        ]
    }
}

pub async fn handle(action: RuleCommands, session: &Session, format: OutputFormat) -> Result<()> {
    match action {
        RuleCommands::List => list::<PolicyRule>(session, format).await,
        RuleCommands::Show { id } => show::<PolicyRule>(session, &id, format).await,
        RuleCommands::Create {
            name,
            description,
            classifiers,
            actions,
        } => {
            let input = with_text(StepInput::new(), "name", name);
            let input = with_text(input, "description", description)
                .with_flag("with_classifier", !classifiers.is_empty())
                .with_flag("with_action", !actions.is_empty())
                .with_all("policy_classifiers", classifiers)
                .with_all("policy_actions", actions);
            create::<PolicyRule>(session, input, format).await
        }
        RuleCommands::Update {
            id,
            name,
            description,
            classifiers,
            actions,
        } => {
            let mut fields = Fields::new();
            put_text(&mut fields, "name", name);
            put_text(&mut fields, "description", description);
            put_ids(&mut fields, "policy_classifiers", classifiers)?;
            put_ids(&mut fields, "policy_actions", actions)?;
            update::<PolicyRule>(session, &id, fields, format).await
        }
        RuleCommands::Delete { id } => delete::<PolicyRule>(session, &id).await,
    }
}
