//! Value Objects - Immutable domain primitives with validation
//!
//! Value Objects are:
//! - Immutable
//! - Comparable by value (not identity)
//! - Self-validating

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource identifier (Value Object)
///
/// Opaque string issued by the policy service, usually a UUID.
///
/// # Invariants
/// - Must be non-empty
/// - No whitespace or `/` (ids are used as URL path segments)
/// - Holds for decoded ids too: deserialization goes through [`ResourceId::new`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Create new resource ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if id.is_empty() {
            return Err(DomainError::InvalidResourceId("cannot be empty".into()));
        }
        if id.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(DomainError::InvalidResourceId(format!(
                "{:?} contains whitespace or '/'",
                id
            )));
        }

        Ok(Self(id))
    }

    /// Get inner value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = DomainError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tenant identifier (Value Object)
///
/// Isolation scope for every create and list call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create new tenant ID
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidTenantId("cannot be empty".into()));
        }
        Ok(Self(id))
    }

    /// Get inner value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Ordered set of resource ids (Value Object)
///
/// # Invariants
/// - No duplicates; the first occurrence wins
/// - Insertion order is preserved (contract rules are ordered)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdSet(Vec<ResourceId>);

impl IdSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert if absent, returns false on duplicates
    pub fn insert(&mut self, id: ResourceId) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Membership check
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.0.contains(id)
    }

    /// Number of ids
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no ids are held
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceId> {
        self.0.iter()
    }

    /// Borrow as a slice
    pub fn as_slice(&self) -> &[ResourceId] {
        &self.0
    }
}

impl FromIterator<ResourceId> for IdSet {
    fn from_iter<I: IntoIterator<Item = ResourceId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a ResourceId;
    type IntoIter = std::slice::Iter<'a, ResourceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for IdSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `null` shows up for unset relationships
        let ids = Option::<Vec<ResourceId>>::deserialize(deserializer)?;
        Ok(ids.unwrap_or_default().into_iter().collect())
    }
}

/// Traffic protocol matched by a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Any,
}

impl Protocol {
    /// Every accepted wire value, in menu order
    pub const VALUES: &'static [&'static str] = &["tcp", "udp", "icmp", "any"];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
            Self::Any => "any",
        }
    }
}

impl FromStr for Protocol {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "icmp" => Ok(Self::Icmp),
            "any" => Ok(Self::Any),
            other => Err(DomainError::InvalidEnum {
                field: "protocol",
                value: other.into(),
            }),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic direction matched by a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    Bi,
}

impl Direction {
    /// Every accepted wire value, in menu order
    pub const VALUES: &'static [&'static str] = &["in", "out", "bi"];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Bi => "bi",
        }
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "bi" => Ok(Self::Bi),
            other => Err(DomainError::InvalidEnum {
                field: "direction",
                value: other.into(),
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict attached to a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierAction {
    Allow,
    Redirect,
}

impl ClassifierAction {
    /// Every accepted wire value, in menu order
    pub const VALUES: &'static [&'static str] = &["allow", "redirect"];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Redirect => "redirect",
        }
    }
}

impl FromStr for ClassifierAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(Self::Allow),
            "redirect" => Ok(Self::Redirect),
            other => Err(DomainError::InvalidEnum {
                field: "action",
                value: other.into(),
            }),
        }
    }
}

impl fmt::Display for ClassifierAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a classifier port range
///
/// # Invariants
/// - `min <= max` when both are set; either bound alone is accepted
pub fn check_port_range(min: Option<u16>, max: Option<u16>) -> Result<(), DomainError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(DomainError::InvalidPortRange { min, max }),
        _ => Ok(()),
    }
}

/// Domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("invalid resource ID: {0}")]
    InvalidResourceId(String),

    #[error("invalid tenant ID: {0}")]
    InvalidTenantId(String),

    #[error("invalid {field}: {value:?}")]
    InvalidEnum { field: &'static str, value: String },

    #[error("invalid port range: min {min} is greater than max {max}")]
    InvalidPortRange { min: u16, max: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ResourceId {
        ResourceId::new(s).unwrap()
    }

    #[test]
    fn test_resource_id_valid() {
        assert_eq!(id("4f1c2a3e-aaaa").as_str(), "4f1c2a3e-aaaa");
    }

    #[test]
    fn test_resource_id_rejects_empty_and_slash() {
        assert!(ResourceId::new("").is_err());
        assert!(ResourceId::new("a/b").is_err());
        assert!(ResourceId::new("a b").is_err());
    }

    #[test]
    fn test_resource_id_decode_validates() {
        assert_eq!(serde_json::from_str::<ResourceId>(r#""c-1""#).unwrap(), id("c-1"));
        assert!(serde_json::from_str::<ResourceId>(r#""""#).is_err());
        assert!(serde_json::from_str::<ResourceId>(r#""a/b""#).is_err());
        assert!(serde_json::from_str::<IdSet>(r#"["c-1", ""]"#).is_err());
        assert_eq!(serde_json::to_string(&id("c-1")).unwrap(), r#""c-1""#);
    }

    #[test]
    fn test_tenant_id_blank_fails() {
        assert!(TenantId::new("   ").is_err());
        assert!(TenantId::new("demo").is_ok());
    }

    #[test]
    fn test_id_set_dedupes_in_order() {
        let set: IdSet = vec![id("b"), id("a"), id("b"), id("c")].into_iter().collect();
        let ids: Vec<_> = set.iter().map(ResourceId::as_str).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_id_set_deserialize_null_and_duplicates() {
        let set: IdSet = serde_json::from_str("null").unwrap();
        assert!(set.is_empty());

        let set: IdSet = serde_json::from_str(r#"["x","x","y"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&id("y")));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("udp".parse::<Protocol>().unwrap(), Protocol::Udp);
        assert_eq!("bi".parse::<Direction>().unwrap(), Direction::Bi);
        assert_eq!("redirect".parse::<ClassifierAction>().unwrap(), ClassifierAction::Redirect);
        assert!("sctp".parse::<Protocol>().is_err());
        assert!("IN".parse::<Direction>().is_err());
    }

    #[test]
    fn test_port_range() {
        assert!(check_port_range(Some(80), Some(443)).is_ok());
        assert!(check_port_range(Some(80), Some(80)).is_ok());
        assert!(check_port_range(None, Some(10)).is_ok());
        assert_eq!(
            check_port_range(Some(100), Some(50)),
            Err(DomainError::InvalidPortRange { min: 100, max: 50 })
        );
    }
}
