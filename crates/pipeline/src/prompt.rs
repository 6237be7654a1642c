//! Prompt assembly: system instructions, then history, then the query.

use algoviz_core::{ConversationTurn, Message};

/// Instructions describing the artifact the model must return.
pub const SYSTEM_PROMPT: &str = r#"You are a Data Structures and Algorithms (DSA) visualization expert.
Explain the requested topic and produce a structured dataset for rendering a step-by-step visualization.

CRITICAL: RETURN ONLY A VALID JSON OBJECT. NO MARKDOWN OUTSIDE THE JSON.

SCHEMA:
{
  "message": "Markdown explanation with headings: # 💡 Intuition, # 🏗️ Example, # 📊 Dry Run Output",
  "code": "A complete Java implementation.",
  "visualization": {
    "title": "Clear title",
    "description": "Short summary.",
    "type": "array" | "tree" | "linked-list" | "stack" | "queue" | "recursion" | "graph" | "hashmap",
    "timeComplexity": "O(...)",
    "spaceComplexity": "O(...)",
    "steps": [
      {
        "description": "What happens in this step",
        "state": [],
        "nodes": [],
        "edges": [],
        "stack": [],
        "entries": [],
        "activeIndices": [0, 1],
        "activeNodeId": "node1"
      }
    ]
  }
}

REQUIRED STEP FIELDS:
- array, stack, queue: "state"
- tree, linked-list: "nodes"
- graph: "nodes" and "edges"
- recursion: "stack"
- hashmap: "entries"
"activeIndices" is optional for array kinds; "activeNodeId" is optional for tree, graph and linked-list.

DATA GUIDELINES:
- array: "state" is an array of primitives, e.g. [1, 2, 3].
- tree: "nodes" is an array of { "id": "1", "val": 10, "left": "2", "right": "3" }. Pointers are node ids.
- linked-list: "nodes" is an array of { "id": "1", "val": 10, "next": "2" }.
- graph: "nodes" have { "id", "val", "x", "y" } with coordinates in 0-500; "edges" have { "from", "to" }.
- recursion: "stack" is an array of { "fn": "name", "args": { "n": 5 }, "val": null }.
- hashmap: "entries" is an array of { "key": "k", "val": "v", "hash": 0 }.
- "steps" must capture the progression of the algorithm, one frame per meaningful change.
"#;

/// Build the message sequence for one completion request.
///
/// `history` must already be windowed. Assistant turns carry the full
/// serialized artifact when the caller kept it.
pub fn assemble(system_prompt: &str, history: &[ConversationTurn], query: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(history.iter().map(ConversationTurn::to_message));
    messages.push(Message::user(query));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_core::Role;

    #[test]
    fn system_first_query_last() {
        let history = vec![
            ConversationTurn::user("Explain stacks"),
            ConversationTurn::assistant("Here is a stack", Some(r#"{"visualization":{}}"#.into())),
        ];
        let messages = assemble(SYSTEM_PROMPT, &history, "Now a queue");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Explain stacks");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, r#"{"visualization":{}}"#);
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].content, "Now a queue");
    }

    #[test]
    fn assistant_without_full_response_uses_text() {
        let history = vec![ConversationTurn::assistant("plain answer", None)];
        let messages = assemble("sys", &history, "q");
        assert_eq!(messages[1].content, "plain answer");
    }

    #[test]
    fn empty_history() {
        let messages = assemble("sys", &[], "Explain bubble sort");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Explain bubble sort");
    }

    #[test]
    fn prompt_names_every_kind() {
        for kind in [
            "array",
            "tree",
            "linked-list",
            "stack",
            "queue",
            "graph",
            "hashmap",
            "recursion",
        ] {
            assert!(SYSTEM_PROMPT.contains(kind), "prompt should mention {kind}");
        }
    }
}
