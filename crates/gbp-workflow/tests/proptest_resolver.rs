//! Property tests for choice resolution ordering and the name fallback

use gbp_common::{PolicyAction, ResourceId};
use gbp_workflow::to_choices;
use proptest::prelude::*;

fn action(index: usize, name: String) -> PolicyAction {
    PolicyAction {
        id: ResourceId::new(format!("action-{index}")).unwrap(),
        name,
        description: String::new(),
        tenant_id: None,
    }
}

fn actions_strategy() -> impl Strategy<Value = Vec<PolicyAction>> {
    // Small alphabet so equal names and empty names show up often
    prop::collection::vec(prop_oneof![Just(String::new()), "[aAb]{1,2}"], 0..24).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| action(i, name))
            .collect()
    })
}

proptest! {
    #[test]
    fn display_names_are_never_empty(actions in actions_strategy()) {
        for choice in to_choices(actions) {
            prop_assert!(!choice.label.is_empty());
        }
    }

    #[test]
    fn choices_are_sorted_by_label(actions in actions_strategy()) {
        let choices = to_choices(actions);
        for pair in choices.windows(2) {
            prop_assert!(pair[0].label <= pair[1].label);
        }
    }

    #[test]
    fn equal_labels_keep_fetch_order(actions in actions_strategy()) {
        let fetch_order: Vec<String> = actions.iter().map(|a| a.id.to_string()).collect();
        let position = |id: &str| fetch_order.iter().position(|f| f == id);

        let choices = to_choices(actions);
        for pair in choices.windows(2) {
            if pair[0].label == pair[1].label {
                prop_assert!(position(&pair[0].id) < position(&pair[1].id));
            }
        }
    }

    #[test]
    fn every_object_becomes_one_choice(actions in actions_strategy()) {
        let mut ids: Vec<String> = actions.iter().map(|a| a.id.to_string()).collect();
        let mut chosen: Vec<String> = to_choices(actions).into_iter().map(|c| c.id).collect();
        ids.sort();
        chosen.sort();
        prop_assert_eq!(ids, chosen);
    }
}
