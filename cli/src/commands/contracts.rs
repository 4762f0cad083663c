//! Contract commands

use super::{create, delete, join_ids, list, put_ids, put_text, show, update, with_text, Session};
use crate::output::{OutputFormat, Row};
use crate::ContractCommands;
use anyhow::Result;
use gbp_common::{Contract, Fields};
use gbp_workflow::StepInput;

impl Row for Contract {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Description", "Policy Rules"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.description.clone(),
            join_ids(&self.rules),
        ]
    }
}

/// Rules given on the command line switch the attach step on
fn create_input(name: Option<String>, description: Option<String>, rules: Vec<String>) -> StepInput {
    let input = with_text(StepInput::new(), "name", name);
    with_text(input, "description", description)
        .with_flag("with_policy", !rules.is_empty())
        .with_all("policy_rules", rules)
}

pub async fn handle(action: ContractCommands, session: &Session, format: OutputFormat) -> Result<()> {
    match action {
        ContractCommands::List => list::<Contract>(session, format).await,
        ContractCommands::Show { id } => show::<Contract>(session, &id, format).await,
        ContractCommands::Create {
            name,
            description,
            rules,
        } => create::<Contract>(session, create_input(name, description, rules), format).await,
        ContractCommands::Update {
            id,
            name,
            description,
            rules,
        } => {
            let mut fields = Fields::new();
            put_text(&mut fields, "name", name);
            put_text(&mut fields, "description", description);
            put_ids(&mut fields, "policy_rules", rules)?;
            update::<Contract>(session, &id, fields, format).await
        }
        ContractCommands::Delete { id } => delete::<Contract>(session, &id).await,
    }
}
