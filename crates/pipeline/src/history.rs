//! Bounding the caller-supplied conversation history.

use algoviz_core::ConversationTurn;

/// Turns forwarded to the model when nothing else is configured.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// The most recent `limit` turns of `history`, oldest first.
///
/// Callers are expected to trim already; this is applied regardless.
pub fn window(history: &[ConversationTurn], limit: usize) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(limit)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<ConversationTurn> {
        (0..n)
            .map(|i| ConversationTurn::user(format!("turn {i}")))
            .collect()
    }

    #[test]
    fn keeps_most_recent_turns() {
        let history = turns(8);
        let kept = window(&history, DEFAULT_HISTORY_WINDOW);
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[0].text, "turn 3");
        assert_eq!(kept[4].text, "turn 7");
    }

    #[test]
    fn short_history_untouched() {
        let history = turns(2);
        assert_eq!(window(&history, 5), history.as_slice());
        assert!(window(&[], 5).is_empty());
    }

    #[test]
    fn zero_window_drops_everything() {
        assert!(window(&turns(3), 0).is_empty());
    }
}
