//! Maps a transcript onto the chat request body.

use shared::{
    domain::ChatRole,
    protocol::{ChatRequest, HistoryEntry},
};

use crate::transcript::{Transcript, Turn};

/// Builds the request for the question at the end of `transcript`.
///
/// The final user turn becomes `question`; every turn before it is replayed as
/// `chat_history` with citations dropped. Returns `None` when the transcript does
/// not end in a user turn.
pub fn build_chat_request(transcript: &Transcript) -> Option<ChatRequest> {
    let (last, prior) = transcript.turns().split_last()?;
    if last.role() != ChatRole::User {
        return None;
    }
    Some(chat_request_for(last.content(), prior))
}

fn chat_request_for(question: &str, prior: &[Turn]) -> ChatRequest {
    let chat_history = prior
        .iter()
        .map(|turn| HistoryEntry {
            role: turn.role(),
            content: turn.content().to_string(),
        })
        .collect();

    ChatRequest {
        question: question.to_string(),
        chat_history,
    }
}

#[cfg(test)]
mod tests {
    use shared::protocol::Citation;

    use super::*;

    #[test]
    fn first_question_has_empty_history() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("What was Q1 revenue?"));

        let request = build_chat_request(&transcript).expect("request");
        assert_eq!(request.question, "What was Q1 revenue?");
        assert!(request.chat_history.is_empty());
    }

    #[test]
    fn replays_prior_turns_without_citations() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("What was Q1 revenue?"));
        transcript.push(Turn::assistant(
            "Rp 10B",
            vec![Citation::new(3, "Revenue for Q1 was Rp 10B...")],
        ));
        transcript.push(Turn::user("And Q2?"));
        transcript.push(Turn::error());
        transcript.push(Turn::user("  And Q2? "));

        let request = build_chat_request(&transcript).expect("request");
        assert_eq!(request.question, "  And Q2? ");
        assert_eq!(request.chat_history.len(), transcript.len() - 1);

        let roles: Vec<ChatRole> = request.chat_history.iter().map(|e| e.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant
            ]
        );

        let json = serde_json::to_value(&request).expect("serialize");
        for entry in json["chat_history"].as_array().expect("history array") {
            let keys: Vec<&String> = entry.as_object().expect("entry object").keys().collect();
            assert_eq!(keys.len(), 2, "unexpected history fields: {entry}");
            assert!(entry.get("sources").is_none());
            assert!(entry.get("citations").is_none());
        }
    }

    #[test]
    fn does_not_build_without_trailing_user_turn() {
        let mut transcript = Transcript::new();
        assert!(build_chat_request(&transcript).is_none());

        transcript.push(Turn::user("q"));
        transcript.push(Turn::assistant("a", Vec::new()));
        assert!(build_chat_request(&transcript).is_none());
    }

    #[test]
    fn leaves_transcript_untouched() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("q"));
        let before = transcript.clone();

        let _ = build_chat_request(&transcript);
        assert_eq!(transcript, before);
    }
}
