//! Creation workflows, one per resource kind

use crate::engine::{FinalizePlan, MessageTemplate, Workflow};
use crate::field::FieldSpec;
use crate::step::Step;
use gbp_common::{
    check_port_range, ClassifierAction, Direction, FieldError, Fields, Protocol, ResourceKind,
};
use serde_json::Value;

/// Create an endpoint group with its provided and consumed contracts
pub fn add_endpoint_group() -> Workflow {
    Workflow {
        slug: "addepg",
        name: "Create EPG",
        finalize_label: "Create",
        success: MessageTemplate("Create EPG \"{name}\"."),
        failure: MessageTemplate("Unable to create EPG \"{name}\""),
        steps: vec![
            Step::new("details", "Create EPG")
                .with_help("Create an endpoint group.")
                .field(FieldSpec::text("name", "Name"))
                .field(FieldSpec::text("description", "Description")),
            Step::new("contracts", "Provide/Consume Contract")
                .with_help("Select contracts provided and consumed by this group.")
                .field(FieldSpec::multi_select(
                    "provided_contracts",
                    "Provided Contracts",
                    ResourceKind::Contract,
                ))
                .field(FieldSpec::multi_select(
                    "consumed_contracts",
                    "Consumed Contracts",
                    ResourceKind::Contract,
                )),
        ],
        plan: FinalizePlan::create(
            ResourceKind::EndpointGroup,
            &["name", "description", "provided_contracts", "consumed_contracts"],
        ),
    }
}

/// Create a contract, optionally attaching policy rules
pub fn add_contract() -> Workflow {
    Workflow {
        slug: "addcontract",
        name: "Create Contract",
        finalize_label: "Create",
        success: MessageTemplate("Create Contract \"{name}\"."),
        failure: MessageTemplate("Unable to create Contract \"{name}\""),
        steps: vec![
            Step::new("details", "Create Contract")
                .with_help("Create a contract for your project.")
                .field(FieldSpec::text("name", "Name"))
                .field(FieldSpec::text("description", "Description"))
                .field(FieldSpec::flag("with_policy", "Create Policy").with_help("Attach policy rules after create.")),
            Step::new("rules", "Rules")
                .with_help("Select policy rules for your contract.")
                .field(
                    FieldSpec::multi_select("policy_rules", "Policy Rules", ResourceKind::PolicyRule)
                        .with_help("Create a contract with selected rules."),
                ),
        ],
        plan: FinalizePlan::create(ResourceKind::Contract, &["name", "description"])
            .attach("with_policy", "policy_rules"),
    }
}

/// Create a policy rule, optionally attaching classifiers and actions
pub fn add_policy_rule() -> Workflow {
    Workflow {
        slug: "addpolicyrule",
        name: "Create Policy-Rule",
        finalize_label: "Create",
        success: MessageTemplate("Create Policy-Rule \"{name}\"."),
        failure: MessageTemplate("Unable to create Policy-Rule \"{name}\""),
        steps: vec![
            Step::new("details", "Create Policy-Rule")
                .field(FieldSpec::text("name", "Name"))
                .field(FieldSpec::text("description", "Description"))
                .field(FieldSpec::flag("with_classifier", "Add Classifier"))
                .field(FieldSpec::flag("with_action", "Add Action")),
            Step::new("classifiers", "Classifiers")
                .with_help("Select classifiers for your policy-rule.")
                .field(FieldSpec::multi_select(
                    "policy_classifiers",
                    "Policy Classifier",
                    ResourceKind::PolicyClassifier,
                )),
            Step::new("actions", "Actions")
                .with_help("Select actions for your policy-rule.")
                .field(FieldSpec::multi_select(
                    "policy_actions",
                    "Policy Action",
                    ResourceKind::PolicyAction,
                )),
        ],
        plan: FinalizePlan::create(ResourceKind::PolicyRule, &["name", "description"])
            .attach("with_classifier", "policy_classifiers")
            .attach("with_action", "policy_actions"),
    }
}

/// Create a traffic classifier
pub fn add_policy_classifier() -> Workflow {
    Workflow {
        slug: "addpolicyclassifier",
        name: "Create Classifier",
        finalize_label: "Create",
        success: MessageTemplate("Create Classifier \"{name}\"."),
        failure: MessageTemplate("Unable to create Classifier \"{name}\""),
        steps: vec![Step::new("details", "Create Classifier")
            .field(FieldSpec::text("name", "Name"))
            .field(FieldSpec::choice("protocol", "Protocol", Protocol::VALUES))
            .field(FieldSpec::port("min_port", "Port Range(Min)"))
            .field(FieldSpec::port("max_port", "Port Range(Max)"))
            .field(FieldSpec::choice("direction", "Direction", Direction::VALUES))
            .field(FieldSpec::choice("action", "Action", ClassifierAction::VALUES))
            .with_check(port_range_check)],
        plan: FinalizePlan::create(
            ResourceKind::PolicyClassifier,
            &["name", "protocol", "min_port", "max_port", "direction", "action"],
        ),
    }
}

/// Create a policy action
pub fn add_policy_action() -> Workflow {
    Workflow {
        slug: "addpolicyaction",
        name: "Create Policy-Action",
        finalize_label: "Create",
        success: MessageTemplate("Create Policy-Action \"{name}\"."),
        failure: MessageTemplate("Unable to create Policy-Action \"{name}\""),
        steps: vec![Step::new("details", "Create Policy-Action")
            .field(FieldSpec::text("name", "Name"))
            .field(FieldSpec::text("description", "Description"))],
        plan: FinalizePlan::create(ResourceKind::PolicyAction, &["name", "description"]),
    }
}

/// Creation workflow of a kind
pub fn for_kind(kind: ResourceKind) -> Workflow {
    match kind {
        ResourceKind::EndpointGroup => add_endpoint_group(),
        ResourceKind::Contract => add_contract(),
        ResourceKind::PolicyRule => add_policy_rule(),
        ResourceKind::PolicyClassifier => add_policy_classifier(),
        ResourceKind::PolicyAction => add_policy_action(),
    }
}

fn port_range_check(fields: &Fields) -> Result<(), FieldError> {
    let port = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|p| u16::try_from(p).ok())
    };
    check_port_range(port("min_port"), port("max_port")).map_err(|e| FieldError::new("max_port", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StepInput;
    use crate::step::StepChoices;

    #[test]
    fn test_every_kind_has_a_workflow() {
        for kind in ResourceKind::ALL {
            let workflow = for_kind(kind);
            assert_eq!(workflow.plan.kind, kind);
            assert!(!workflow.steps().is_empty());
            assert_eq!(workflow.step_of("name"), Some(0), "{} collects the name first", kind);
        }
    }

    #[test]
    fn test_toggles_precede_their_selections() {
        for kind in ResourceKind::ALL {
            let workflow = for_kind(kind);
            for attachment in &workflow.plan.attachments {
                let toggle = workflow.step_of(attachment.toggle);
                let field = workflow.step_of(attachment.field);
                assert!(toggle.is_some() && field.is_some());
                assert!(toggle < field, "{} reads {} too late", workflow.slug, attachment.toggle);
            }
        }
    }

    #[test]
    fn test_create_fields_are_collected() {
        for kind in ResourceKind::ALL {
            let workflow = for_kind(kind);
            for field in &workflow.plan.fields {
                assert!(workflow.step_of(field).is_some(), "{} never collects {}", workflow.slug, field);
            }
        }
    }

    #[test]
    fn test_classifier_port_range() {
        let workflow = add_policy_classifier();
        let step = &workflow.steps()[0];
        let base = StepInput::new()
            .with("protocol", "tcp")
            .with("direction", "in")
            .with("action", "allow");

        let errors = step
            .validate(&base.clone().with("min_port", "100").with("max_port", "50"), &StepChoices::default())
            .unwrap_err();
        assert_eq!(errors.for_field("max_port").count(), 1);

        assert!(step
            .validate(&base.clone().with("min_port", "80").with("max_port", "80"), &StepChoices::default())
            .is_ok());
        assert!(step.validate(&base.clone().with("max_port", "50"), &StepChoices::default()).is_ok());

        let errors = step
            .validate(&base.with("protocol", "sctp"), &StepChoices::default())
            .unwrap_err();
        assert_eq!(errors.for_field("protocol").count(), 1);
    }
}
