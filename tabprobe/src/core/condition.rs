//! Condition trees for host drill-down and selection.
//!
//! A condition is either empty, a single per-column leaf, or an AND/OR node
//! over child conditions. The serialized form is the host's condition-node
//! shape: `{}`, `{"columnName": .., "val": ..}` / `{"columnName": .., "dVal": ..}`,
//! or `{"op": "AND", "children": [..]}`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::Result;

/// Boolean operator of an internal condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnOperation {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl fmt::Display for ColumnOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnOperation::And => f.write_str("AND"),
            ColumnOperation::Or => f.write_str("OR"),
        }
    }
}

/// The value side of a condition leaf.
///
/// Textual columns compare against `val`, every other column against `dVal`.
/// `dVal` may be NaN when the source value was not numeric; NaN is written
/// as `null` and read back from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionOperand {
    Text {
        val: String,
    },
    Number {
        #[serde(rename = "dVal", deserialize_with = "number_or_nan")]
        d_val: f64,
    },
}

fn number_or_nan<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl ConditionOperand {
    pub fn text(val: impl Into<String>) -> Self {
        ConditionOperand::Text { val: val.into() }
    }

    pub fn number(d_val: f64) -> Self {
        ConditionOperand::Number { d_val }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConditionOperand::Text { val } => Some(val),
            ConditionOperand::Number { .. } => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConditionOperand::Number { d_val } => Some(*d_val),
            ConditionOperand::Text { .. } => None,
        }
    }

    /// Attaches a column name, producing a leaf.
    pub fn into_leaf(self, column_name: impl Into<String>) -> ConditionLeaf {
        ConditionLeaf::new(column_name, self)
    }
}

/// "Column equals value" condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionLeaf {
    #[serde(rename = "columnName")]
    pub column_name: String,
    #[serde(flatten)]
    pub operand: ConditionOperand,
}

impl ConditionLeaf {
    pub fn new(column_name: impl Into<String>, operand: ConditionOperand) -> Self {
        Self {
            column_name: column_name.into(),
            operand,
        }
    }
}

/// A boolean condition over dataset columns.
///
/// Only a literal `{}` reads back as [`ConditionTree::Empty`]; any other
/// object must be a well-formed node or leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "TreeRepr")]
pub enum ConditionTree {
    /// Internal node; children keep their original order
    Node {
        op: ColumnOperation,
        children: Vec<ConditionTree>,
    },
    Leaf(ConditionLeaf),
    /// Matches everything; serialized as `{}`
    Empty {},
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TreeRepr {
    Node {
        op: ColumnOperation,
        children: Vec<ConditionTree>,
    },
    Leaf(ConditionLeaf),
    Empty(EmptyNode),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EmptyNode {}

impl From<TreeRepr> for ConditionTree {
    fn from(repr: TreeRepr) -> Self {
        match repr {
            TreeRepr::Node { op, children } => ConditionTree::Node { op, children },
            TreeRepr::Leaf(leaf) => ConditionTree::Leaf(leaf),
            TreeRepr::Empty(EmptyNode {}) => ConditionTree::Empty {},
        }
    }
}

impl Default for ConditionTree {
    fn default() -> Self {
        ConditionTree::Empty {}
    }
}

impl From<ConditionLeaf> for ConditionTree {
    fn from(leaf: ConditionLeaf) -> Self {
        ConditionTree::Leaf(leaf)
    }
}

impl ConditionTree {
    pub fn empty() -> Self {
        ConditionTree::Empty {}
    }

    pub fn leaf(column_name: impl Into<String>, operand: ConditionOperand) -> Self {
        ConditionTree::Leaf(ConditionLeaf::new(column_name, operand))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionTree::Empty {})
    }

    /// Number of leaves anywhere in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            ConditionTree::Node { children, .. } => children.iter().map(Self::leaf_count).sum(),
            ConditionTree::Leaf(_) => 1,
            ConditionTree::Empty {} => 0,
        }
    }
}

/// Combines conditions under `op`.
///
/// No conditions give the empty node, one condition is returned as-is, and
/// two or more become a single node whose children are exactly the inputs
/// in order. Nested nodes are never flattened.
///
/// # Examples
///
/// ```rust
/// use tabprobe::core::condition::{join_conditions, ColumnOperation, ConditionOperand, ConditionTree};
///
/// let a = ConditionTree::leaf("city", ConditionOperand::text("Oslo"));
/// assert_eq!(join_conditions(ColumnOperation::And, vec![a.clone()]), a);
/// assert!(join_conditions(ColumnOperation::Or, vec![]).is_empty());
/// ```
pub fn join_conditions(op: ColumnOperation, mut conditions: Vec<ConditionTree>) -> ConditionTree {
    match conditions.len() {
        0 => ConditionTree::empty(),
        1 => conditions.remove(0),
        _ => ConditionTree::Node {
            op,
            children: conditions,
        },
    }
}

pub fn join_and(conditions: Vec<ConditionTree>) -> ConditionTree {
    join_conditions(ColumnOperation::And, conditions)
}

pub fn join_or(conditions: Vec<ConditionTree>) -> ConditionTree {
    join_conditions(ColumnOperation::Or, conditions)
}

/// A drill-down request: the condition selecting the rows plus the ids of the
/// rows it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillDown {
    pub condition: ConditionTree,
    pub row_ids: Vec<u64>,
}

impl DrillDown {
    pub fn new(condition: ConditionTree, row_ids: Vec<u64>) -> Self {
        Self { condition, row_ids }
    }

    /// The host's `cdata` payload: the row ids as JSON text.
    pub fn cdata(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.row_ids)?)
    }

    /// The condition object with a `cdata` member, as the host sink expects.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tabprobe::core::condition::{ConditionOperand, ConditionTree, DrillDown};
    ///
    /// let drill = DrillDown::new(ConditionTree::leaf("id", ConditionOperand::number(7.0)), vec![7]);
    /// let json = drill.to_host_json().unwrap();
    /// assert_eq!(json.to_string(), r#"{"cdata":"[7]","columnName":"id","dVal":7.0}"#);
    /// ```
    pub fn to_host_json(&self) -> Result<serde_json::Value> {
        let mut json = serde_json::to_value(&self.condition)?;
        if let Some(obj) = json.as_object_mut() {
            obj.insert("cdata".to_string(), serde_json::Value::String(self.cdata()?));
        }
        Ok(json)
    }
}
