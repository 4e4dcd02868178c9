/// Reply menu, per-post inline keyboards and callback data
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Posts,
    CreatePost,
    LogIn,
    Register,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Register,
        MenuItem::LogIn,
        MenuItem::Posts,
        MenuItem::CreatePost,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Posts => "Posts",
            MenuItem::CreatePost => "Create post",
            MenuItem::LogIn => "Log in",
            MenuItem::Register => "Register",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.label() == text)
    }
}

/// Main reply keyboard: accounts on the first row, posts on the second.
pub fn main_menu() -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = MenuItem::ALL
        .chunks(2)
        .map(|row| row.iter().map(|item| KeyboardButton::new(item.label())).collect())
        .collect();
    KeyboardMarkup::new(rows)
}

/// Inline button press on a rendered post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    Like(i64),
    Update(i64),
    Delete(i64),
}

impl Callback {
    pub fn parse(data: &str) -> Option<Self> {
        let (kind, id) = data.split_once('_')?;
        let id: i64 = id.parse().ok().filter(|id| *id > 0)?;
        match kind {
            "like" => Some(Callback::Like(id)),
            "update" => Some(Callback::Update(id)),
            "delete" => Some(Callback::Delete(id)),
            _ => None,
        }
    }

    pub fn data(self) -> String {
        match self {
            Callback::Like(id) => format!("like_{}", id),
            Callback::Update(id) => format!("update_{}", id),
            Callback::Delete(id) => format!("delete_{}", id),
        }
    }
}

pub fn post_keyboard(post_id: i64, likes_count: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            format!("👍 {}", likes_count),
            Callback::Like(post_id).data(),
        ),
        InlineKeyboardButton::callback("Edit", Callback::Update(post_id).data()),
        InlineKeyboardButton::callback("Delete", Callback::Delete(post_id).data()),
    ]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn menu_labels_round_trip() {
        for item in MenuItem::ALL {
            assert_eq!(MenuItem::from_label(item.label()), Some(item));
        }
        assert_eq!(MenuItem::from_label("posts"), None);
    }

    #[test]
    fn menu_has_two_rows() {
        let menu = main_menu();
        assert_eq!(menu.keyboard.len(), 2);
        assert_eq!(menu.keyboard[0][0].text, "Register");
        assert_eq!(menu.keyboard[1][1].text, "Create post");
    }

    #[test]
    fn parses_callback_data() {
        assert_eq!(Callback::parse("like_12"), Some(Callback::Like(12)));
        assert_eq!(Callback::parse("update_3"), Some(Callback::Update(3)));
        assert_eq!(Callback::parse("delete_7"), Some(Callback::Delete(7)));
    }

    #[test]
    fn rejects_malformed_callback_data() {
        for data in ["like", "like_", "like_x", "like_-1", "like_0", "share_4", ""] {
            assert_eq!(Callback::parse(data), None, "{data}");
        }
    }

    #[test]
    fn post_keyboard_carries_like_count() {
        let keyboard = post_keyboard(9, 4);
        let row = &keyboard.inline_keyboard[0];

        assert_eq!(row[0].text, "👍 4");
        assert!(matches!(
            &row[0].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "like_9"
        ));
        assert!(matches!(
            &row[2].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "delete_9"
        ));
    }
}
