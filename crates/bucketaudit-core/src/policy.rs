//! Bucket policy document parsing.
//!
//! Policies are inspected structurally: a wildcard principal or a
//! secure-transport condition is recognized by its fields, never by
//! searching the serialized text. Only the fields the controls need are
//! modelled; everything else in the document is ignored.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// The condition key that is `false` for plain-HTTP requests.
const SECURE_TRANSPORT_KEY: &str = "aws:SecureTransport";

/// A single value or a list of values, as IAM documents allow for most fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A bare value.
    One(T),
    /// A list of values.
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    /// Iterate the contained values.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(v) => std::slice::from_ref(v).iter(),
            Self::Many(vs) => vs.iter(),
        }
    }
}

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Effect {
    /// Grants access.
    Allow,
    /// Refuses access.
    Deny,
}

/// Statement principal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    /// `"Principal": "*"`.
    Literal(String),
    /// `"Principal": { "AWS": ... , "Service": ... }`.
    Typed(BTreeMap<String, OneOrMany<String>>),
}

impl Principal {
    /// Whether the principal matches everyone.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        match self {
            Self::Literal(p) => p == "*",
            Self::Typed(map) => map
                .get("AWS")
                .is_some_and(|ids| ids.iter().any(|id| id == "*")),
        }
    }
}

/// One policy statement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// Optional statement id.
    #[serde(default)]
    pub sid: Option<String>,
    /// Allow or Deny.
    pub effect: Effect,
    /// Who the statement applies to.
    #[serde(default)]
    pub principal: Option<Principal>,
    /// Condition operator -> condition key -> value(s).
    #[serde(default)]
    pub condition: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Statement {
    /// `Effect: Allow` for a wildcard principal.
    #[must_use]
    pub fn is_wildcard_allow(&self) -> bool {
        self.effect == Effect::Allow && self.principal.as_ref().is_some_and(Principal::is_wildcard)
    }

    /// `Effect: Deny` when `aws:SecureTransport` is false.
    #[must_use]
    pub fn denies_insecure_transport(&self) -> bool {
        self.effect == Effect::Deny
            && self.condition.values().any(|keys| {
                keys.iter().any(|(key, value)| {
                    key.eq_ignore_ascii_case(SECURE_TRANSPORT_KEY) && is_false(value)
                })
            })
    }

    /// Label for details text: the sid when present.
    #[must_use]
    pub fn label(&self) -> &str {
        self.sid.as_deref().unwrap_or("<unnamed>")
    }
}

/// A parsed bucket policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version.
    #[serde(default)]
    pub version: Option<String>,
    /// Statements; a single object is accepted as a one-element list.
    #[serde(default)]
    pub statement: OneOrMany<Statement>,
}

impl PolicyDocument {
    /// Parse a JSON policy document.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Iterate all statements.
    pub fn statements(&self) -> std::slice::Iter<'_, Statement> {
        self.statement.iter()
    }

    /// Statements that allow everyone.
    pub fn wildcard_allows(&self) -> impl Iterator<Item = &Statement> {
        self.statements().filter(|s| s.is_wildcard_allow())
    }

    /// Whether any statement refuses non-TLS requests.
    #[must_use]
    pub fn enforces_secure_transport(&self) -> bool {
        self.statements().any(Statement::denies_insecure_transport)
    }
}

/// Condition values arrive as `"false"`, `false` or `["false"]`.
fn is_false(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::String(s) => s.eq_ignore_ascii_case("false"),
        Value::Array(items) => !items.is_empty() && items.iter().all(is_false),
        _ => false,
    }
}
