/// The delta document model: an ordered list of insert operations.
///
/// Wire format:
///
/// ```json
/// {"ops":[{"insert":"Title"},{"insert":"\n","attributes":{"header":1}}]}
/// ```
use crate::common::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Formatting attributes of an op, keyed by attribute name.
pub type Attributes = Map<String, Value>;

/// Attribute names that make a newline op a block marker.
const BLOCK_ATTRIBUTES: [&str; 3] = ["header", "list", "indent"];

/// One insert operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Op {
    pub insert: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

impl Op {
    /// An op inserting plain text.
    pub fn text(insert: impl Into<String>) -> Self {
        Self {
            insert: insert.into(),
            attributes: None,
        }
    }

    /// Builder: set one attribute.
    pub fn with_attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes
            .get_or_insert_with(Map::new)
            .insert(name.to_string(), value.into());
        self
    }

    /// Look up an attribute.
    #[inline]
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.as_ref()?.get(name)
    }

    /// Whether this op is a newline carrying paragraph formatting for the
    /// content before it.
    pub fn is_block_marker(&self) -> bool {
        self.insert == "\n" && BLOCK_ATTRIBUTES.iter().any(|name| self.attr(name).is_some())
    }

    /// Whether this marker describes a list item: a non-empty `list` kind or
    /// an `indent`.
    pub fn is_list_marker(&self) -> bool {
        let has_kind = self
            .attr("list")
            .and_then(Value::as_str)
            .is_some_and(|kind| !kind.is_empty());
        has_kind || self.attr("indent").is_some()
    }

    /// Attributes, or `None` once empty.
    pub(crate) fn normalize(mut self) -> Self {
        if self.attributes.as_ref().is_some_and(Map::is_empty) {
            self.attributes = None;
        }
        self
    }
}

/// A delta document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append an op.
    pub fn push(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Parse the JSON wire format.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialize to the JSON wire format.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl FromIterator<Op> for Delta {
    fn from_iter<I: IntoIterator<Item = Op>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let delta = Delta::from_json(
            br##"{"ops":[{"insert":"Grey","attributes":{"color":"#cccccc"}},{"insert":" the "}]}"##,
        )
        .unwrap();
        assert_eq!(delta.len(), 2);
        assert_eq!(delta.ops[0].attr("color"), Some(&json!("#cccccc")));
        assert!(delta.ops[1].attributes.is_none());

        let out: Value = serde_json::from_slice(&delta.to_json().unwrap()).unwrap();
        assert_eq!(out["ops"][1], json!({"insert": " the "}));
    }

    #[test]
    fn test_block_marker() {
        assert!(Op::text("\n").with_attr("header", 2).is_block_marker());
        assert!(Op::text("\n").with_attr("indent", 1).is_block_marker());
        assert!(!Op::text("\n").with_attr("bold", true).is_block_marker());
        assert!(!Op::text("x\n").with_attr("header", 1).is_block_marker());
        assert!(!Op::text("\n").is_block_marker());
    }

    #[test]
    fn test_list_marker() {
        assert!(Op::text("\n").with_attr("list", "bullet").is_list_marker());
        assert!(Op::text("\n").with_attr("indent", 0).is_list_marker());
        assert!(!Op::text("\n").with_attr("list", "").is_list_marker());
        assert!(!Op::text("\n").with_attr("header", 1).is_list_marker());
    }

    #[test]
    fn test_missing_ops_is_empty() {
        assert!(Delta::from_json(b"{}").unwrap().is_empty());
        assert!(Delta::from_json(b"[1,2]").is_err());
    }
}
