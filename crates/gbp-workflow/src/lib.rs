//! GBP Workflow - multi-step creation of group-policy objects
//!
//! # Pieces
//!
//! | Module | Role |
//! |--------|------|
//! | [`field`] | declarative field specs and their evaluation |
//! | [`step`] | step descriptors, choice population, step validation |
//! | [`resolver`] | store objects as sorted `(id, name)` choices |
//! | [`engine`] | run state machine and finalize plans |
//! | [`workflows`] | the five creation workflows |
//!
//! # Example
//!
//! ```ignore
//! let mut run = workflows::add_contract().start(tenant)?;
//! run.enter(&store).await?;
//! run.submit(&store, &StepInput::new().with("name", "web-contract")).await?;
//! run.submit(&store, &StepInput::new()).await?;
//! let done = run.finalize(&store).await?;
//! assert_eq!(done.message, "Create Contract \"web-contract\".");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod engine;
pub mod error;
pub mod field;
pub mod resolver;
pub mod step;
pub mod workflows;

pub use context::{StepInput, WorkflowContext};
pub use engine::{Attachment, FinalizePlan, Finalized, MessageTemplate, Workflow, WorkflowRun, WorkflowState};
pub use error::{WorkflowError, WorkflowResult};
pub use field::{Choice, FieldKind, FieldSpec, MAX_TEXT_LEN};
pub use resolver::{to_choices, Selection, SelectionResolver};
pub use step::{Step, StepCheck, StepChoices};
