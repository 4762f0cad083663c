//! Policy action commands

use super::{create, delete, list, put_text, show, update, with_text, Session};
use crate::output::{OutputFormat, Row};
use crate::ActionCommands;
use anyhow::Result;
use gbp_common::{Fields, PolicyAction};
use gbp_workflow::StepInput;

impl Row for PolicyAction {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.description.clone()]
    }
}

pub async fn handle(action: ActionCommands, session: &Session, format: OutputFormat) -> Result<()> {
    match action {
        ActionCommands::List => list::<PolicyAction>(session, format).await,
        ActionCommands::Show { id } => show::<PolicyAction>(session, &id, format).await,
        ActionCommands::Create { name, description } => {
            let input = with_text(StepInput::new(), "name", name);
            let input = with_text(input, "description", description);
            create::<PolicyAction>(session, input, format).await
        }
        ActionCommands::Update { id, name, description } => {
            let mut fields = Fields::new();
            put_text(&mut fields, "name", name);
            put_text(&mut fields, "description", description);
            update::<PolicyAction>(session, &id, fields, format).await
        }
        ActionCommands::Delete { id } => delete::<PolicyAction>(session, &id).await,
    }
}
