//! The visualization artifact — what one query produces.
//!
//! A [`QueryResult`] bundles a markdown explanation, example source code and a
//! [`VisualizationArtifact`]: an ordered list of [`StepFrame`]s whose shape is
//! decided by the artifact's [`VisualizationKind`].
//!
//! These types are only ever built from JSON that already passed the schema
//! validator, or by the fallback generator. Fields the model emitted that we
//! don't model (node pointers, graph coordinates, ...) are kept in `extra`
//! maps, so serializing an artifact gives back the JSON the model produced.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Catch-all for fields we carry through without interpreting.
pub type Extra = Map<String, Value>;

/// The kinds of visualization the presentation layer knows how to draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisualizationKind {
    Array,
    Tree,
    LinkedList,
    Stack,
    Queue,
    Graph,
    Hashmap,
    Recursion,
    /// A kind we don't recognise. Accepted without per-step checks.
    Other(String),
}

impl VisualizationKind {
    /// The wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Array => "array",
            Self::Tree => "tree",
            Self::LinkedList => "linked-list",
            Self::Stack => "stack",
            Self::Queue => "queue",
            Self::Graph => "graph",
            Self::Hashmap => "hashmap",
            Self::Recursion => "recursion",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for VisualizationKind {
    fn from(name: &str) -> Self {
        match name {
            "array" => Self::Array,
            "tree" => Self::Tree,
            "linked-list" => Self::LinkedList,
            "stack" => Self::Stack,
            "queue" => Self::Queue,
            "graph" => Self::Graph,
            "hashmap" => Self::Hashmap,
            "recursion" => Self::Recursion,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VisualizationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The full answer to one query. Replaces any previous result wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Markdown explanation.
    pub message: String,

    /// Example implementation source.
    pub code: String,

    pub visualization: VisualizationArtifact,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationArtifact {
    pub title: String,

    #[serde(rename = "type")]
    pub kind: VisualizationKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "timeComplexity", skip_serializing_if = "Option::is_none")]
    pub time_complexity: Option<String>,

    #[serde(rename = "spaceComplexity", skip_serializing_if = "Option::is_none")]
    pub space_complexity: Option<String>,

    /// Never empty.
    pub steps: Vec<StepFrame>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// One frame of the animation. The variant follows the artifact's kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepFrame {
    /// array, stack, queue
    Sequence(SequenceStep),
    /// tree, linked-list
    Nodes(NodeStep),
    Graph(GraphStep),
    Recursion(RecursionStep),
    Hashmap(HashmapStep),
    /// Unknown kinds: only the common highlight fields are read.
    Freeform(Highlight),
}

impl StepFrame {
    /// The highlight fields shared by every variant.
    pub fn highlight(&self) -> &Highlight {
        match self {
            Self::Sequence(step) => &step.highlight,
            Self::Nodes(step) => &step.highlight,
            Self::Graph(step) => &step.highlight,
            Self::Recursion(step) => &step.highlight,
            Self::Hashmap(step) => &step.highlight,
            Self::Freeform(highlight) => highlight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceStep {
    pub state: Vec<Value>,
    #[serde(flatten)]
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStep {
    pub nodes: Vec<Node>,
    #[serde(flatten)]
    pub highlight: Highlight,
}

/// A tree or linked-list node. `left`/`right`/`next` stay in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: Value,
    pub val: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStep {
    pub nodes: Vec<Value>,
    pub edges: Vec<Value>,
    #[serde(flatten)]
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecursionStep {
    pub stack: Vec<Value>,
    #[serde(flatten)]
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashmapStep {
    pub entries: Vec<Value>,
    #[serde(flatten)]
    pub highlight: Highlight,
}

/// Identifier of the node a frame focuses on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Text(String),
}

/// Optional fields any frame may carry.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Highlight {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "activeIndices", skip_serializing_if = "Option::is_none")]
    pub active_indices: Option<Vec<i64>>,

    #[serde(rename = "activeNodeId", skip_serializing_if = "Option::is_none")]
    pub active_node_id: Option<NodeId>,

    #[serde(rename = "pivotIndex", skip_serializing_if = "Option::is_none")]
    pub pivot_index: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Highlight {
    /// Pick the highlight fields out of what remains of a step object.
    ///
    /// A field whose value has an unexpected shape is left in `extra`
    /// untouched rather than rejected.
    pub fn from_fields(mut fields: Extra) -> Self {
        Self {
            description: take_field(&mut fields, "description"),
            active_indices: take_field(&mut fields, "activeIndices"),
            active_node_id: take_field(&mut fields, "activeNodeId"),
            pivot_index: take_field(&mut fields, "pivotIndex"),
            action: take_field(&mut fields, "action"),
            extra: fields,
        }
    }
}

/// Remove `key` from `map` if its value deserializes as `T`.
///
/// On a shape mismatch the entry stays where it is and `None` is returned.
pub fn take_field<T: DeserializeOwned>(map: &mut Extra, key: &str) -> Option<T> {
    let parsed = T::deserialize(map.get(key)?).ok()?;
    map.remove(key);
    Some(parsed)
}
