//! Values returned by the graph store.
//!
//! A query returns ordered [`Row`]s; each row maps a column name to a
//! [`Value`], which is either a scalar or a [`NodeRef`] carrying the node's
//! identity and label set.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::StoreError;

/// Label carried by every article node.
pub const LABEL_ARTICLE: &str = "Article";
/// Label carried by every category node.
pub const LABEL_CATEGORY: &str = "Category";
/// Label marking a redirect page (article or category).
pub const LABEL_REDIRECT: &str = "Redirect";
/// Label marking a disambiguation article.
pub const LABEL_DISAMBIGUATION: &str = "Disambiguation";

/// Store-assigned identity of a node.
///
/// Stable for the lifetime of a store and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Opaque reference to a node: its identity plus its label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    pub labels: BTreeSet<String>,
}

impl NodeRef {
    pub fn new<I, S>(id: NodeId, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// A single column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Node(NodeRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Node(_) => "node",
        }
    }
}

impl From<NodeRef> for Value {
    fn from(node: NodeRef) -> Self {
        Value::Node(node)
    }
}

impl From<Option<String>> for Value {
    fn from(text: Option<String>) -> Self {
        text.map(Value::Text).unwrap_or(Value::Null)
    }
}

/// One result row: column name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    fn require(&self, column: &str) -> Result<&Value, StoreError> {
        self.columns
            .get(column)
            .ok_or_else(|| StoreError::MissingColumn(column.to_string()))
    }

    /// Node reference held in `column`.
    pub fn node(&self, column: &str) -> Result<&NodeRef, StoreError> {
        match self.require(column)? {
            Value::Node(node) => Ok(node),
            other => Err(StoreError::column_type(column, "node", other)),
        }
    }

    /// Non-null text held in `column`.
    pub fn text(&self, column: &str) -> Result<&str, StoreError> {
        match self.require(column)? {
            Value::Text(text) => Ok(text),
            other => Err(StoreError::column_type(column, "text", other)),
        }
    }

    /// Text held in `column`, `None` when null or absent.
    pub fn opt_text(&self, column: &str) -> Result<Option<&str>, StoreError> {
        match self.columns.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Text(text)) => Ok(Some(text)),
            Some(other) => Err(StoreError::column_type(column, "text", other)),
        }
    }

    /// Non-negative integer held in `column`.
    pub fn count(&self, column: &str) -> Result<u32, StoreError> {
        match self.require(column)? {
            Value::Int(raw) => {
                u32::try_from(*raw).map_err(|_| StoreError::OutOfRange {
                    column: column.to_string(),
                    value: *raw,
                })
            }
            other => Err(StoreError::column_type(column, "int", other)),
        }
    }

    /// Integer `>= 1` held in `column`.
    pub fn positive(&self, column: &str) -> Result<u32, StoreError> {
        match self.count(column)? {
            0 => Err(StoreError::OutOfRange {
                column: column.to_string(),
                value: 0,
            }),
            value => Ok(value),
        }
    }

    /// Non-negative integer held in `column`, `None` when null or absent.
    pub fn opt_count(&self, column: &str) -> Result<Option<u32>, StoreError> {
        match self.columns.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.count(column).map(Some),
        }
    }

    /// Float held in `column`, `None` when null or absent. Integers widen.
    pub fn opt_float(&self, column: &str) -> Result<Option<f64>, StoreError> {
        match self.columns.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Float(value)) => Ok(Some(*value)),
            Some(Value::Int(value)) => Ok(Some(*value as f64)),
            Some(other) => Err(StoreError::column_type(column, "float", other)),
        }
    }

    /// Presence flag: null or absent is `false`, integers are `!= 0`.
    pub fn flag(&self, column: &str) -> Result<bool, StoreError> {
        match self.columns.get(column) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(value)) => Ok(*value),
            Some(Value::Int(value)) => Ok(*value != 0),
            Some(other) => Err(StoreError::column_type(column, "bool", other)),
        }
    }
}
