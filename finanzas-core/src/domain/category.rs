//! Category domain model

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// What a category can be used for (`tipo` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CategoryKind {
    Expense = 1,
    Income = 2,
    Both = 3,
}

impl CategoryKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CategoryKind {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Expense),
            2 => Ok(Self::Income),
            3 => Ok(Self::Both),
            other => Err(format!("unknown category kind: {}", other)),
        }
    }
}

impl From<CategoryKind> for u8 {
    fn from(kind: CategoryKind) -> Self {
        kind.as_u8()
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Both => "both",
        };
        f.write_str(name)
    }
}

/// A spending or income category
///
/// Fields the client does not know about are kept in `extra` so an update
/// sends back everything the backend returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CategoryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "icono", default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind),
            ..Default::default()
        }
    }
}
