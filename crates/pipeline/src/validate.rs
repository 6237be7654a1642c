//! Schema validation of recovered model output.
//!
//! [`validate`] checks a JSON value against the visualization contract,
//! fail-fast, and on success converts it into a typed [`QueryResult`].
//! Each [`VisualizationKind`] maps to exactly one [`StepContract`], which
//! names the fields every step of that kind must carry.
//!
//! Node-id cross references are not part of the contract. They are reported
//! separately by [`dangling_references`].

use std::collections::HashSet;

use algoviz_core::artifact::{
    take_field, Extra, GraphStep, HashmapStep, Highlight, Node, NodeStep, RecursionStep,
    SequenceStep, StepFrame,
};
use algoviz_core::{QueryResult, SchemaError, VisualizationArtifact, VisualizationKind};
use serde_json::Value;

/// Required step fields for a visualization kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepContract {
    /// array, stack, queue
    Sequence,
    /// tree, linked-list: every node needs `id` and `val`
    Nodes,
    Graph,
    Recursion,
    Hashmap,
    /// Unrecognised kinds: nothing beyond the step being an object.
    Permissive,
}

impl StepContract {
    pub fn for_kind(kind: &VisualizationKind) -> Self {
        match kind {
            VisualizationKind::Array | VisualizationKind::Stack | VisualizationKind::Queue => {
                Self::Sequence
            }
            VisualizationKind::Tree | VisualizationKind::LinkedList => Self::Nodes,
            VisualizationKind::Graph => Self::Graph,
            VisualizationKind::Recursion => Self::Recursion,
            VisualizationKind::Hashmap => Self::Hashmap,
            VisualizationKind::Other(_) => Self::Permissive,
        }
    }
}

/// Check `candidate` against the contract and type it.
///
/// The input is not modified. Fields outside the contract are carried into
/// the `extra` maps of the result.
pub fn validate(candidate: &Value) -> Result<QueryResult, SchemaError> {
    let root = candidate.as_object().ok_or(SchemaError::NotAnObject)?;

    let viz = match root.get("visualization") {
        None | Some(Value::Null) => return Err(SchemaError::MissingVisualization),
        Some(Value::Object(viz)) => viz,
        Some(_) => return Err(SchemaError::VisualizationNotObject),
    };

    let title = required_text(viz, "title")?;
    let kind = VisualizationKind::from(required_text(viz, "type")?);

    let steps = match viz.get("steps") {
        None | Some(Value::Null) => return Err(SchemaError::MissingField { field: "steps" }),
        Some(Value::Array(steps)) => steps,
        Some(_) => return Err(SchemaError::StepsNotSequence),
    };
    if steps.is_empty() {
        return Err(SchemaError::NoSteps);
    }

    let contract = StepContract::for_kind(&kind);
    let steps = steps
        .iter()
        .enumerate()
        .map(|(index, step)| step_frame(index, step, contract, &kind))
        .collect::<Result<Vec<_>, _>>()?;

    let mut viz_rest = viz.clone();
    for key in ["title", "type", "steps"] {
        viz_rest.remove(key);
    }
    let visualization = VisualizationArtifact {
        title: title.to_string(),
        kind,
        description: take_field(&mut viz_rest, "description"),
        time_complexity: take_field(&mut viz_rest, "timeComplexity"),
        space_complexity: take_field(&mut viz_rest, "spaceComplexity"),
        steps,
        extra: viz_rest,
    };

    let mut root_rest = root.clone();
    let message = loose_text(root_rest.remove("message"));
    let code = loose_text(root_rest.remove("code"));
    root_rest.remove("visualization");

    Ok(QueryResult {
        message,
        code,
        visualization,
        extra: root_rest,
    })
}

/// A present, non-empty string field of the visualization object.
fn required_text<'a>(viz: &'a Extra, field: &'static str) -> Result<&'a str, SchemaError> {
    match viz.get(field) {
        None | Some(Value::Null) => Err(SchemaError::MissingField { field }),
        Some(Value::String(s)) if s.is_empty() => Err(SchemaError::MissingField { field }),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(SchemaError::InvalidField { field }),
    }
}

/// `message`/`code` are optional; anything that isn't text is rendered as JSON.
fn loose_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

fn step_frame(
    index: usize,
    step: &Value,
    contract: StepContract,
    kind: &VisualizationKind,
) -> Result<StepFrame, SchemaError> {
    let mut fields = step
        .as_object()
        .cloned()
        .ok_or(SchemaError::StepNotObject { step: index })?;

    let mut take_sequence = |field: &'static str| -> Result<Vec<Value>, SchemaError> {
        match fields.remove(field) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SchemaError::MissingStepField {
                step: index,
                field,
                kind: kind.to_string(),
            }),
        }
    };

    let frame = match contract {
        StepContract::Sequence => {
            let state = take_sequence("state")?;
            StepFrame::Sequence(SequenceStep {
                state,
                highlight: Highlight::from_fields(fields),
            })
        }
        StepContract::Nodes => {
            let nodes = take_sequence("nodes")?
                .into_iter()
                .enumerate()
                .map(|(node, value)| typed_node(index, node, value))
                .collect::<Result<Vec<_>, _>>()?;
            StepFrame::Nodes(NodeStep {
                nodes,
                highlight: Highlight::from_fields(fields),
            })
        }
        StepContract::Graph => {
            let nodes = take_sequence("nodes")?;
            let edges = take_sequence("edges")?;
            StepFrame::Graph(GraphStep {
                nodes,
                edges,
                highlight: Highlight::from_fields(fields),
            })
        }
        StepContract::Recursion => {
            let stack = take_sequence("stack")?;
            StepFrame::Recursion(RecursionStep {
                stack,
                highlight: Highlight::from_fields(fields),
            })
        }
        StepContract::Hashmap => {
            let entries = take_sequence("entries")?;
            StepFrame::Hashmap(HashmapStep {
                entries,
                highlight: Highlight::from_fields(fields),
            })
        }
        StepContract::Permissive => StepFrame::Freeform(Highlight::from_fields(fields)),
    };

    Ok(frame)
}

fn typed_node(step: usize, node: usize, value: Value) -> Result<Node, SchemaError> {
    let Value::Object(mut extra) = value else {
        return Err(SchemaError::IncompleteNode { step, node });
    };
    match (extra.remove("id"), extra.remove("val")) {
        (Some(id), Some(val)) => Ok(Node { id, val, extra }),
        _ => Err(SchemaError::IncompleteNode { step, node }),
    }
}

/// A node-id reference that points at no node of its step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub step: usize,
    /// The referencing field, e.g. `left`, `next`, `activeNodeId`, `edges[1].to`.
    pub field: String,
    pub target: String,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "step {}: '{}' refers to unknown node {}",
            self.step, self.field, self.target
        )
    }
}

/// Node-id references in a validated result that resolve to nothing.
///
/// Looks at node pointers (`left`, `right`, `next`), graph edge endpoints and
/// `activeNodeId`, each against the node ids of the same step. `null` and
/// boolean pointers are treated as "no pointer".
pub fn dangling_references(result: &QueryResult) -> Vec<DanglingReference> {
    let mut found = Vec::new();

    for (step, frame) in result.visualization.steps.iter().enumerate() {
        let ids: HashSet<String> = match frame {
            StepFrame::Nodes(s) => s.nodes.iter().filter_map(|n| id_key(&n.id)).collect(),
            StepFrame::Graph(s) => s
                .nodes
                .iter()
                .filter_map(|n| n.get("id").and_then(id_key))
                .collect(),
            _ => continue,
        };
        let mut check = |field: String, target: &Value| {
            if let Some(key) = id_key(target)
                && !ids.contains(&key)
            {
                found.push(DanglingReference {
                    step,
                    field,
                    target: key,
                });
            }
        };

        match frame {
            StepFrame::Nodes(s) => {
                for node in &s.nodes {
                    for pointer in ["left", "right", "next"] {
                        if let Some(target) = node.extra.get(pointer) {
                            check(pointer.to_string(), target);
                        }
                    }
                }
            }
            StepFrame::Graph(s) => {
                for (i, edge) in s.edges.iter().enumerate() {
                    for end in ["from", "to"] {
                        if let Some(target) = edge.get(end) {
                            check(format!("edges[{i}].{end}"), target);
                        }
                    }
                }
            }
            _ => {}
        }

        if let Some(active) = frame.highlight().active_node_id.as_ref() {
            let target = serde_json::to_value(active).unwrap_or(Value::Null);
            check("activeNodeId".to_string(), &target);
        }
    }

    found
}

/// Canonical form of an id: strings as-is, numbers as written.
fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
