/// In-memory per-chat sessions: access token and dialogue state
use dashmap::DashMap;
use teloxide::types::ChatId;

use crate::dialogue::Dialogue;

#[derive(Default)]
pub struct Sessions {
    tokens: DashMap<ChatId, String>,
    dialogues: DashMap<ChatId, Dialogue>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self, chat: ChatId) -> Option<String> {
        self.tokens.get(&chat).map(|t| t.value().clone())
    }

    /// Store the token from a successful login, replacing any previous one.
    pub fn set_token(&self, chat: ChatId, token: String) {
        self.tokens.insert(chat, token);
    }

    pub fn drop_token(&self, chat: ChatId) {
        self.tokens.remove(&chat);
    }

    /// Current dialogue state, leaving `Idle` in its place.
    pub fn take_dialogue(&self, chat: ChatId) -> Dialogue {
        self.dialogues
            .remove(&chat)
            .map(|(_, state)| state)
            .unwrap_or_default()
    }

    pub fn set_dialogue(&self, chat: ChatId, state: Dialogue) {
        if state == Dialogue::Idle {
            self.dialogues.remove(&chat);
        } else {
            self.dialogues.insert(chat, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_replaces_token() {
        let sessions = Sessions::new();
        let chat = ChatId(7);

        assert_eq!(sessions.token(chat), None);
        sessions.set_token(chat, "first".into());
        sessions.set_token(chat, "second".into());
        assert_eq!(sessions.token(chat).as_deref(), Some("second"));

        sessions.drop_token(chat);
        assert_eq!(sessions.token(chat), None);
    }

    #[test]
    fn dialogue_defaults_to_idle() {
        let sessions = Sessions::new();
        let chat = ChatId(7);

        assert_eq!(sessions.take_dialogue(chat), Dialogue::Idle);

        sessions.set_dialogue(chat, Dialogue::LoginUsername);
        assert_eq!(sessions.take_dialogue(chat), Dialogue::LoginUsername);
        assert_eq!(sessions.take_dialogue(chat), Dialogue::Idle);
    }

    #[test]
    fn chats_are_independent() {
        let sessions = Sessions::new();
        sessions.set_token(ChatId(1), "a".into());
        sessions.set_dialogue(ChatId(2), Dialogue::CreateTitle);

        assert_eq!(sessions.token(ChatId(2)), None);
        assert_eq!(sessions.take_dialogue(ChatId(1)), Dialogue::Idle);
    }
}
