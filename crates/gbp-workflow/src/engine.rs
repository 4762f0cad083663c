//! Workflow Engine
//!
//! ```text
//! Pending ──enter──▶ InStep(1) ──submit──▶ … ──▶ InStep(N) ──finalize──▶ Finalizing
//!                                                                          │
//!                                                          Succeeded ◀─────┴────▶ Failed
//! ```
//!
//! Steps contribute fields to one shared context. Invalid input keeps the run
//! on the same step and never reaches the store. Finalize issues the create
//! call, then one update per enabled attachment, strictly in order. A failed
//! call ends the run in `Failed`; objects created by earlier calls are kept.

use crate::context::{StepInput, WorkflowContext};
use crate::error::{WorkflowError, WorkflowResult};
use crate::resolver::SelectionResolver;
use crate::step::{Step, StepChoices};
use gbp_common::{Fields, PolicyError, PolicyResult, PolicyStore, ResourceId, ResourceKind, TenantId};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info};

/// Lifecycle of one workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Not started
    Pending,
    /// Collecting input for step `i` (1-based)
    InStep(usize),
    /// Finalize calls in flight
    Finalizing,
    /// Every finalize call succeeded
    Succeeded,
    /// A finalize call failed
    Failed,
}

impl WorkflowState {
    /// True once the run can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InStep(i) => write!(f, "in step {}", i),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Message with a single `{name}` placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate(pub &'static str);

impl MessageTemplate {
    /// Fill in the object name
    pub fn render(&self, name: &str) -> String {
        self.0.replace("{name}", name)
    }
}

/// Secondary association call gated by a toggle from an earlier step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    /// Flag field that enables the call
    pub toggle: &'static str,
    /// Multi-select field sent in the update
    pub field: &'static str,
}

/// Calls issued on finalize
#[derive(Debug, Clone)]
pub struct FinalizePlan {
    /// Kind created
    pub kind: ResourceKind,
    /// Context fields sent on create
    pub fields: Vec<&'static str>,
    /// Updates issued after create, in order
    pub attachments: Vec<Attachment>,
}

impl FinalizePlan {
    /// Plan with a single create call
    pub fn create(kind: ResourceKind, fields: &[&'static str]) -> Self {
        Self {
            kind,
            fields: fields.to_vec(),
            attachments: Vec::new(),
        }
    }

    /// Add a gated association update
    pub fn attach(mut self, toggle: &'static str, field: &'static str) -> Self {
        self.attachments.push(Attachment { toggle, field });
        self
    }

    /// Body of the create call; associations start out empty
    pub fn create_body(&self, ctx: &WorkflowContext) -> Fields {
        let mut body = ctx.select(&self.fields);
        for attachment in &self.attachments {
            body.insert(attachment.field.to_string(), Value::Array(Vec::new()));
        }
        body
    }

    /// Update bodies for every enabled attachment with a non-empty selection
    pub fn attach_bodies(&self, ctx: &WorkflowContext) -> Vec<Fields> {
        self.attachments
            .iter()
            .filter(|a| ctx.flag(a.toggle))
            .filter_map(|a| {
                let ids = ctx.ids(a.field);
                if ids.is_empty() {
                    return None;
                }
                let mut body = Fields::new();
                body.insert(a.field.to_string(), Value::from(ids));
                Some(body)
            })
            .collect()
    }

    /// Run the calls sequentially, returning the last stored object
    pub async fn execute(&self, store: &dyn PolicyStore, tenant_id: &TenantId, ctx: &WorkflowContext) -> PolicyResult<Value> {
        let created = store.create(self.kind, tenant_id, self.create_body(ctx)).await?;
        let updates = self.attach_bodies(ctx);
        if updates.is_empty() {
            return Ok(created);
        }

        let id = created_id(self.kind, &created)?;
        let mut latest = created;
        for body in updates {
            debug!(kind = %self.kind, id = %id, fields = ?body.keys().collect::<Vec<_>>(), "attaching");
            latest = store.update(self.kind, &id, body).await?;
        }
        Ok(latest)
    }
}

fn created_id(kind: ResourceKind, created: &Value) -> PolicyResult<ResourceId> {
    let raw = created.get("id").and_then(Value::as_str).unwrap_or_default();
    ResourceId::new(raw).map_err(|e| PolicyError::Decode {
        kind,
        message: e.to_string(),
    })
}

/// A declared workflow: steps, finalize plan and messages
#[derive(Debug, Clone)]
pub struct Workflow {
    /// Stable identifier
    pub slug: &'static str,
    /// Title
    pub name: &'static str,
    /// Label of the finalize action
    pub finalize_label: &'static str,
    /// Rendered on success
    pub success: MessageTemplate,
    /// Rendered on failure, followed by the error text
    pub failure: MessageTemplate,
    /// Ordered steps
    pub steps: Vec<Step>,
    /// Finalize calls
    pub plan: FinalizePlan,
}

impl Workflow {
    /// Ordered step descriptors
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Index of the step contributing a field
    pub fn step_of(&self, field: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.fields.iter().any(|f| f.name == field))
    }

    /// Begin a run for a tenant
    ///
    /// Fails with [`WorkflowError::NoSteps`] when nothing would collect input.
    pub fn start(self, tenant_id: TenantId) -> WorkflowResult<WorkflowRun> {
        if self.steps.is_empty() {
            return Err(WorkflowError::NoSteps { workflow: self.slug });
        }
        Ok(WorkflowRun {
            workflow: self,
            tenant_id,
            state: WorkflowState::Pending,
            context: WorkflowContext::new(),
            choices: StepChoices::default(),
            completed: 0,
        })
    }
}

/// Result of a successful finalize
#[derive(Debug, Clone, PartialEq)]
pub struct Finalized {
    /// Rendered success message
    pub message: String,
    /// Object as returned by the last call
    pub object: Value,
}

/// One run of a workflow
#[derive(Debug)]
pub struct WorkflowRun {
    workflow: Workflow,
    tenant_id: TenantId,
    state: WorkflowState,
    context: WorkflowContext,
    choices: StepChoices,
    completed: usize,
}

impl WorkflowRun {
    /// Current state
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Declared workflow
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Fields collected so far
    pub fn context(&self) -> &WorkflowContext {
        &self.context
    }

    /// Step currently collecting input
    pub fn current_step(&self) -> Option<&Step> {
        match self.state {
            WorkflowState::InStep(i) => i.checked_sub(1).and_then(|i| self.workflow.steps.get(i)),
            _ => None,
        }
    }

    /// Choices populated for the current step
    pub fn choices(&self) -> &StepChoices {
        &self.choices
    }

    /// Enter the first step and populate its choices
    pub async fn enter(&mut self, store: &dyn PolicyStore) -> WorkflowResult<&StepChoices> {
        if self.state != WorkflowState::Pending {
            return Err(self.invalid("enter"));
        }
        info!(workflow = self.workflow.slug, tenant = %self.tenant_id, "workflow started");
        self.move_to(store, 1).await;
        Ok(&self.choices)
    }

    /// Submit the current step
    ///
    /// Valid input merges into the context and moves to the next step; on the
    /// last step the run stays put, ready to finalize.
    pub async fn submit(&mut self, store: &dyn PolicyStore, input: &StepInput) -> WorkflowResult<WorkflowState> {
        let step = match self.state {
            WorkflowState::InStep(i) => i
                .checked_sub(1)
                .and_then(|index| self.workflow.steps.get(index))
                .map(|step| (i, step)),
            _ => None,
        };
        let Some((i, step)) = step else {
            return Err(self.invalid("submit"));
        };
        let contribution = step.validate(input, &self.choices).map_err(|errors| {
            debug!(workflow = self.workflow.slug, step = step.slug, errors = %errors, "step rejected");
            WorkflowError::Validation(errors)
        })?;

        self.context.merge(contribution);
        self.completed = self.completed.max(i);
        if i < self.workflow.steps.len() {
            self.move_to(store, i + 1).await;
        }
        Ok(self.state)
    }

    /// Issue the finalize calls
    pub async fn finalize(&mut self, store: &dyn PolicyStore) -> WorkflowResult<Finalized> {
        let last = self.workflow.steps.len();
        match self.state {
            WorkflowState::InStep(i) if i == last => {}
            _ => return Err(self.invalid("finalize")),
        }
        if let Some(step) = self.workflow.steps.get(self.completed) {
            return Err(WorkflowError::Incomplete { step: step.slug });
        }

        self.state = WorkflowState::Finalizing;
        let name = self.context.text("name").to_string();
        info!(workflow = self.workflow.slug, name = %name, "finalizing");

        match self.workflow.plan.execute(store, &self.tenant_id, &self.context).await {
            Ok(object) => {
                self.state = WorkflowState::Succeeded;
                let message = self.workflow.success.render(&name);
                info!(workflow = self.workflow.slug, "{}", message);
                Ok(Finalized { message, object })
            }
            Err(source) => {
                self.state = WorkflowState::Failed;
                let message = format!("{}: {}", self.workflow.failure.render(&name), source);
                error!(workflow = self.workflow.slug, error = %source, "{}", message);
                Err(WorkflowError::Finalize { message, source })
            }
        }
    }

    async fn move_to(&mut self, store: &dyn PolicyStore, index: usize) {
        self.state = WorkflowState::InStep(index);
        self.choices = match index.checked_sub(1).and_then(|i| self.workflow.steps.get(i)) {
            Some(step) => {
                step.populate_choices(&SelectionResolver::new(store), &self.tenant_id)
                    .await
            }
            None => StepChoices::default(),
        };
    }

    fn invalid(&self, operation: &'static str) -> WorkflowError {
        WorkflowError::InvalidState {
            state: self.state,
            operation,
        }
    }
}
