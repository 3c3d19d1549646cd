//! Query and filter model of the analytics engine.
//!
//! Only the filter list is modelled. Every other top-level query field is kept
//! in [`Query::other`] and serialized back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Comparison operator of a member filter.
///
/// Unknown operators deserialize into [`FilterOperator::Other`] and serialize
/// back to the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Gt,
    Gte,
    Lt,
    Lte,
    Set,
    NotSet,
    InDateRange,
    NotInDateRange,
    BeforeDate,
    AfterDate,
    Other(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Set => "set",
            Self::NotSet => "notSet",
            Self::InDateRange => "inDateRange",
            Self::NotInDateRange => "notInDateRange",
            Self::BeforeDate => "beforeDate",
            Self::AfterDate => "afterDate",
            Self::Other(op) => op,
        }
    }
}

impl From<String> for FilterOperator {
    fn from(op: String) -> Self {
        match op.as_str() {
            "equals" => Self::Equals,
            "notEquals" => Self::NotEquals,
            "contains" => Self::Contains,
            "notContains" => Self::NotContains,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "set" => Self::Set,
            "notSet" => Self::NotSet,
            "inDateRange" => Self::InDateRange,
            "notInDateRange" => Self::NotInDateRange,
            "beforeDate" => Self::BeforeDate,
            "afterDate" => Self::AfterDate,
            _ => Self::Other(op),
        }
    }
}

impl From<&str> for FilterOperator {
    fn from(op: &str) -> Self {
        Self::from(op.to_string())
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        match op {
            FilterOperator::Other(op) => op,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key a member filter names its member under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemberKey {
    #[default]
    Member,
    /// Older queries still send `dimension`.
    Dimension,
}

/// A predicate on a single member: `member operator values`.
///
/// Serializes back to the shape it was read from: the same member key, an
/// empty `values` list only if one was sent, and every key not modelled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMemberFilter", into = "RawMemberFilter")]
pub struct MemberFilter {
    /// Fully qualified member name, e.g. `Orders.location`.
    pub member: String,
    pub member_key: MemberKey,
    pub operator: FilterOperator,
    pub values: Vec<String>,
    /// Write `values` even when empty.
    pub explicit_values: bool,
    /// Keys of the filter object not interpreted by this model.
    pub other: Map<String, Value>,
}

impl MemberFilter {
    pub fn new<M, V, I>(member: M, operator: FilterOperator, values: I) -> Self
    where
        M: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        Self {
            member: member.into(),
            member_key: MemberKey::Member,
            operator,
            values: values.into_iter().map(Into::into).collect(),
            explicit_values: false,
            other: Map::new(),
        }
    }
}

/// Wire shape of [`MemberFilter`].
#[derive(Serialize, Deserialize)]
struct RawMemberFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    member: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dimension: Option<String>,
    operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<String>>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl TryFrom<RawMemberFilter> for MemberFilter {
    type Error = String;

    fn try_from(raw: RawMemberFilter) -> Result<Self, Self::Error> {
        let mut other = raw.other;
        let (member, member_key) = match (raw.member, raw.dimension) {
            (Some(member), dimension) => {
                // `member` wins; a second spelling is kept as an opaque key
                if let Some(dimension) = dimension {
                    other.insert("dimension".to_string(), Value::String(dimension));
                }
                (member, MemberKey::Member)
            }
            (None, Some(dimension)) => (dimension, MemberKey::Dimension),
            (None, None) => return Err("missing field `member`".to_string()),
        };

        Ok(Self {
            member,
            member_key,
            operator: raw.operator,
            explicit_values: raw.values.is_some(),
            values: raw.values.unwrap_or_default(),
            other,
        })
    }
}

impl From<MemberFilter> for RawMemberFilter {
    fn from(filter: MemberFilter) -> Self {
        let (member, dimension) = match filter.member_key {
            MemberKey::Member => (Some(filter.member), None),
            MemberKey::Dimension => (None, Some(filter.member)),
        };
        let values = (filter.explicit_values || !filter.values.is_empty()).then_some(filter.values);

        Self {
            member,
            dimension,
            operator: filter.operator,
            values,
            other: filter.other,
        }
    }
}

/// A node of the filter tree.
///
/// Logical groups nest arbitrarily; order inside every group is significant
/// to the caller and must be preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    And { and: Vec<Filter> },
    Or { or: Vec<Filter> },
    Member(MemberFilter),
}

impl Filter {
    /// Shorthand for a [`Filter::Member`] node.
    pub fn member<M, V, I>(member: M, operator: FilterOperator, values: I) -> Self
    where
        M: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        Self::Member(MemberFilter::new(member, operator, values))
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And { and: filters }
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or { or: filters }
    }

    /// Visit every member filter below this node depth-first, in order.
    pub fn for_each_member<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a MemberFilter),
    {
        match self {
            Self::Member(filter) => visit(filter),
            Self::And { and: children } | Self::Or { or: children } => {
                for child in children {
                    child.for_each_member(visit);
                }
            }
        }
    }
}

/// An analytics query as received from, and returned to, the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Measures, dimensions, time dimensions, limits and anything else.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Query {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            other: Map::new(),
        }
    }

    /// Attach a non-filter field, e.g. `measures`.
    pub fn with_field<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.other.insert(key.into(), value);
        self
    }

    /// All member filters of the tree, depth-first in caller order.
    pub fn member_filters(&self) -> Vec<&MemberFilter> {
        let mut out = Vec::new();
        for filter in &self.filters {
            filter.for_each_member(&mut |m| out.push(m));
        }
        out
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Caller identity and claims forwarded by the engine.
///
/// Opaque to the rewriter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityContext(pub Value);

impl SecurityContext {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// A context carrying no claims.
    pub fn anonymous() -> Self {
        Self(Value::Null)
    }
}
