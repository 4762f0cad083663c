//! Resources - the five group-policy object kinds
//!
//! Every resource is a request-scoped copy of an object owned by the policy
//! service. Unknown wire fields are ignored so newer servers stay readable.

use super::value_objects::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of policy object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    EndpointGroup,
    Contract,
    PolicyRule,
    PolicyClassifier,
    PolicyAction,
}

impl ResourceKind {
    /// All kinds, leaf-last
    pub const ALL: [ResourceKind; 5] = [
        Self::EndpointGroup,
        Self::Contract,
        Self::PolicyRule,
        Self::PolicyClassifier,
        Self::PolicyAction,
    ];

    /// Key wrapping a single object in request and response bodies
    pub fn singular(&self) -> &'static str {
        match self {
            Self::EndpointGroup => "endpoint_group",
            Self::Contract => "contract",
            Self::PolicyRule => "policy_rule",
            Self::PolicyClassifier => "policy_classifier",
            Self::PolicyAction => "policy_action",
        }
    }

    /// Collection name, used both as URL segment and list-response key
    pub fn collection(&self) -> &'static str {
        match self {
            Self::EndpointGroup => "endpoint_groups",
            Self::Contract => "contracts",
            Self::PolicyRule => "policy_rules",
            Self::PolicyClassifier => "policy_classifiers",
            Self::PolicyAction => "policy_actions",
        }
    }

    /// Label used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::EndpointGroup => "EPG",
            Self::Contract => "Contract",
            Self::PolicyRule => "Policy-Rule",
            Self::PolicyClassifier => "Classifier",
            Self::PolicyAction => "Policy-Action",
        }
    }

    /// Lower-case plural noun, for "unable to retrieve ..." warnings
    pub fn plural_noun(&self) -> &'static str {
        match self {
            Self::EndpointGroup => "endpoint groups",
            Self::Contract => "contracts",
            Self::PolicyRule => "rules",
            Self::PolicyClassifier => "classifiers",
            Self::PolicyAction => "actions",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Common behaviour of every policy object
pub trait PolicyResource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind tag
    const KIND: ResourceKind;

    /// Service-issued id
    fn id(&self) -> &ResourceId;

    /// Name as stored, possibly empty
    fn name(&self) -> &str;

    /// Mutable access to the stored name
    fn name_mut(&mut self) -> &mut String;

    /// Name to show: the id when the stored name is empty
    fn display_name(&self) -> &str {
        if self.name().is_empty() {
            self.id().as_str()
        } else {
            self.name()
        }
    }

    /// Apply the display fallback in place
    fn set_id_as_name_if_empty(&mut self) {
        if self.name().is_empty() {
            let id = self.id().to_string();
            *self.name_mut() = id;
        }
    }
}

macro_rules! policy_resource {
    ($ty:ty, $kind:expr) => {
        impl PolicyResource for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> &ResourceId {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn name_mut(&mut self) -> &mut String {
                &mut self.name
            }
        }
    };
}

/// Endpoint Group: endpoints sharing policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointGroup {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    /// Contracts this group offers
    #[serde(rename = "provided_contracts", default)]
    pub provides: IdSet,
    /// Contracts this group uses
    #[serde(rename = "consumed_contracts", default)]
    pub consumes: IdSet,
}

policy_resource!(EndpointGroup, ResourceKind::EndpointGroup);

/// Contract: an ordered bundle of policy rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(rename = "policy_rules", default)]
    pub rules: IdSet,
}

policy_resource!(Contract, ResourceKind::Contract);

/// Policy Rule: classifiers paired with actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(rename = "policy_classifiers", default)]
    pub classifiers: IdSet,
    #[serde(rename = "policy_actions", default)]
    pub actions: IdSet,
}

policy_resource!(PolicyRule, ResourceKind::PolicyRule);

/// Policy Classifier: traffic match criteria
///
/// # Invariants
/// - `min_port <= max_port` when both are set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyClassifier {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    pub protocol: Protocol,
    #[serde(default)]
    pub min_port: Option<u16>,
    #[serde(default)]
    pub max_port: Option<u16>,
    pub direction: Direction,
    pub action: ClassifierAction,
}

policy_resource!(PolicyClassifier, ResourceKind::PolicyClassifier);

impl PolicyClassifier {
    /// Port range as text, `*` for an open bound
    pub fn port_range(&self) -> String {
        match (self.min_port, self.max_port) {
            (None, None) => "*".into(),
            (Some(p), Some(q)) if p == q => p.to_string(),
            (min, max) => format!(
                "{}-{}",
                min.map_or_else(|| "*".to_string(), |p| p.to_string()),
                max.map_or_else(|| "*".to_string(), |p| p.to_string())
            ),
        }
    }
}

/// Policy Action: what happens to classified traffic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAction {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
}

policy_resource!(PolicyAction, ResourceKind::PolicyAction);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_fallback() {
        let mut contract: Contract = serde_json::from_value(json!({
            "id": "c-1",
            "name": "",
        }))
        .unwrap();

        assert_eq!(contract.display_name(), "c-1");
        contract.set_id_as_name_if_empty();
        assert_eq!(contract.name, "c-1");

        contract.name = "web".into();
        contract.set_id_as_name_if_empty();
        assert_eq!(contract.display_name(), "web");
    }

    #[test]
    fn test_epg_wire_names() {
        let epg: EndpointGroup = serde_json::from_value(json!({
            "id": "e-1",
            "name": "web",
            "tenant_id": "t-1",
            "provided_contracts": ["c-1"],
            "consumed_contracts": ["c-2", "c-2"],
            "unknown": true,
        }))
        .unwrap();

        assert_eq!(epg.provides.len(), 1);
        assert_eq!(epg.consumes.len(), 1);

        let value = serde_json::to_value(&epg).unwrap();
        assert_eq!(value["provided_contracts"], json!(["c-1"]));
        assert_eq!(value["consumed_contracts"], json!(["c-2"]));
    }

    #[test]
    fn test_classifier_decoding() {
        let classifier: PolicyClassifier = serde_json::from_value(json!({
            "id": "pc-1",
            "protocol": "tcp",
            "min_port": 80,
            "max_port": 443,
            "direction": "in",
            "action": "allow",
        }))
        .unwrap();

        assert_eq!(classifier.protocol, Protocol::Tcp);
        assert_eq!(classifier.port_range(), "80-443");
        assert_eq!(classifier.display_name(), "pc-1");

        let bad = serde_json::from_value::<PolicyClassifier>(json!({
            "id": "pc-2",
            "protocol": "sctp",
            "direction": "in",
            "action": "allow",
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ResourceKind::PolicyRule.singular(), "policy_rule");
        assert_eq!(ResourceKind::PolicyRule.collection(), "policy_rules");
        assert_eq!(ResourceKind::EndpointGroup.to_string(), "EPG");
    }
}
