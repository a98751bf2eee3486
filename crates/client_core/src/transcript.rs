use shared::{domain::ChatRole, domain::TurnId, protocol::Citation};

/// Apology shown in place of an answer when a chat cycle fails.
pub const CHAT_ERROR_MESSAGE: &str = "❌ Terjadi kesalahan saat mengambil jawaban.";

#[derive(Debug, Clone, PartialEq)]
pub enum TurnKind {
    User {
        content: String,
    },
    Assistant {
        content: String,
        citations: Vec<Citation>,
    },
    /// A cycle that produced no answer. Shown and replayed as an assistant message.
    Error {
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: TurnId,
    pub kind: TurnKind,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            kind: TurnKind::User {
                content: content.into(),
            },
        }
    }

    pub fn assistant(content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            id: TurnId::new(),
            kind: TurnKind::Assistant {
                content: content.into(),
                citations,
            },
        }
    }

    pub fn error() -> Self {
        Self {
            id: TurnId::new(),
            kind: TurnKind::Error {
                content: CHAT_ERROR_MESSAGE.to_string(),
            },
        }
    }

    pub fn role(&self) -> ChatRole {
        match self.kind {
            TurnKind::User { .. } => ChatRole::User,
            TurnKind::Assistant { .. } | TurnKind::Error { .. } => ChatRole::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match &self.kind {
            TurnKind::User { content }
            | TurnKind::Assistant { content, .. }
            | TurnKind::Error { content } => content,
        }
    }

    pub fn citations(&self) -> &[Citation] {
        match &self.kind {
            TurnKind::Assistant { citations, .. } => citations,
            TurnKind::User { .. } | TurnKind::Error { .. } => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TurnKind::Error { .. })
    }
}

/// Conversation log in the order turns were produced. Only the turn controller
/// appends to it; everything else reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_turn_reads_as_assistant_without_citations() {
        let turn = Turn::error();
        assert_eq!(turn.role(), ChatRole::Assistant);
        assert_eq!(turn.content(), CHAT_ERROR_MESSAGE);
        assert!(turn.citations().is_empty());
        assert!(turn.is_error());
    }

    #[test]
    fn fresh_turns_get_distinct_ids() {
        let first = Turn::user("same text");
        let second = Turn::user("same text");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn keeps_consecutive_same_role_turns_in_order() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("one"));
        transcript.push(Turn::user("two"));
        transcript.push(Turn::error());

        let contents: Vec<&str> = transcript.iter().map(Turn::content).collect();
        assert_eq!(contents, vec!["one", "two", CHAT_ERROR_MESSAGE]);
    }
}
