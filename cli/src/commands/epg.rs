//! Endpoint group commands

use super::{create, delete, join_ids, list, put_ids, put_text, show, update, with_text, Session};
use crate::output::{OutputFormat, Row};
use crate::EpgCommands;
use anyhow::Result;
use gbp_common::{EndpointGroup, Fields};
use gbp_workflow::StepInput;

impl Row for EndpointGroup {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Description", "Provided Contracts", "Consumed Contracts"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.description.clone(),
            join_ids(&self.provides),
            join_ids(&self.consumes),
        ]
    }
}

pub async fn handle(action: EpgCommands, session: &Session, format: OutputFormat) -> Result<()> {
    match action {
        EpgCommands::List => list::<EndpointGroup>(session, format).await,
        EpgCommands::Show { id } => show::<EndpointGroup>(session, &id, format).await,
        EpgCommands::Create {
            name,
            description,
            provides,
            consumes,
        } => {
            let input = with_text(StepInput::new(), "name", name);
            let input = with_text(input, "description", description)
                .with_all("provided_contracts", provides)
                .with_all("consumed_contracts", consumes);
            create::<EndpointGroup>(session, input, format).await
        }
        EpgCommands::Update {
            id,
            name,
            description,
            provides,
            consumes,
        } => {
            let mut fields = Fields::new();
            put_text(&mut fields, "name", name);
            put_text(&mut fields, "description", description);
            put_ids(&mut fields, "provided_contracts", provides)?;
            put_ids(&mut fields, "consumed_contracts", consumes)?;
            update::<EndpointGroup>(session, &id, fields, format).await
        }
        EpgCommands::Delete { id } => delete::<EndpointGroup>(session, &id).await,
    }
}
