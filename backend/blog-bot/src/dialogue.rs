/// Per-chat conversation state machine
///
/// `advance` is pure: it takes the current state and one parsed input, and returns the
/// next state, an optional prompt and an optional API action for the handler to run.
use crate::keyboards::MenuItem;

pub const WELCOME: &str =
    "Hi! I am the blog bot. Register or log in, then browse and write posts with the menu below.";
pub const CANCELLED: &str = "Cancelled.";
pub const UNKNOWN: &str = "Unknown message. Use the menu below.";
pub const ASK_REGISTER_USERNAME: &str = "Let's register! Send me a username:";
pub const ASK_REGISTER_PASSWORD: &str = "Great! Now send a password (at least 8 characters):";
pub const ASK_LOGIN_USERNAME: &str = "Send me your username:";
pub const ASK_LOGIN_PASSWORD: &str = "Now send your password:";
pub const ASK_TITLE: &str = "Let's write a post! Send me the title:";
pub const ASK_CONTENT: &str = "Great! Now send the text of the post:";
pub const ASK_EDIT_TITLE: &str = "Send the new title, or - to keep the current one:";
pub const ASK_EDIT_CONTENT: &str = "Send the new text, or - to keep the current one:";
pub const EMPTY_TEXT: &str = "I need some text here. Try again.";
pub const SHORT_PASSWORD: &str = "That password is too short. Try again.";
pub const NOT_LOGGED_IN: &str = "You are not logged in. Use \"Log in\" first.";
pub const LOADING_POSTS: &str = "Loading posts...";

pub const MIN_PASSWORD_CHARS: usize = 8;
const KEEP_CURRENT: &str = "-";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dialogue {
    #[default]
    Idle,
    RegisterUsername,
    RegisterPassword {
        username: String,
    },
    LoginUsername,
    LoginPassword {
        username: String,
    },
    CreateTitle,
    CreateContent {
        title: String,
    },
    EditTitle {
        post_id: i64,
    },
    EditContent {
        post_id: i64,
        title: Option<String>,
    },
}

/// One incoming chat message, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Cancel,
    Menu(MenuItem),
    Text(String),
    /// Stickers, photos and other messages without text
    NonText,
}

impl Input {
    pub fn parse(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Input::NonText;
        };
        let text = text.trim();

        // "/start@my_bot" in group chats
        let command = text.split('@').next().unwrap_or(text);
        match command {
            "/start" => return Input::Start,
            "/cancel" => return Input::Cancel,
            _ => {}
        }

        match MenuItem::from_label(text) {
            Some(item) => Input::Menu(item),
            None => Input::Text(text.to_string()),
        }
    }
}

/// API call requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Register {
        username: String,
        password: String,
    },
    LogIn {
        username: String,
        password: String,
    },
    ListPosts,
    CreatePost {
        title: String,
        content: String,
    },
    UpdatePost {
        post_id: i64,
        title: Option<String>,
        content: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: Dialogue,
    pub reply: Option<&'static str>,
    pub action: Option<Action>,
}

impl Step {
    fn to(next: Dialogue, reply: &'static str) -> Self {
        Self {
            next,
            reply: Some(reply),
            action: None,
        }
    }

    fn run(action: Action) -> Self {
        Self {
            next: Dialogue::Idle,
            reply: None,
            action: Some(action),
        }
    }
}

/// Start editing `post_id` (from an inline `Edit` button).
pub fn begin_edit(post_id: i64, logged_in: bool) -> Step {
    if !logged_in {
        return Step::to(Dialogue::Idle, NOT_LOGGED_IN);
    }
    Step::to(Dialogue::EditTitle { post_id }, ASK_EDIT_TITLE)
}

pub fn advance(state: Dialogue, input: Input, logged_in: bool) -> Step {
    let text = match input {
        Input::Start => return Step::to(Dialogue::Idle, WELCOME),
        Input::Cancel => return Step::to(Dialogue::Idle, CANCELLED),
        Input::Menu(item) => return start_flow(item, logged_in),
        Input::NonText if state == Dialogue::Idle => return Step::to(Dialogue::Idle, UNKNOWN),
        Input::NonText => return Step::to(state, EMPTY_TEXT),
        Input::Text(text) => text,
    };

    if text.is_empty() && state != Dialogue::Idle {
        return Step::to(state, EMPTY_TEXT);
    }

    match state {
        Dialogue::Idle => Step::to(Dialogue::Idle, UNKNOWN),
        Dialogue::RegisterUsername => Step::to(
            Dialogue::RegisterPassword { username: text },
            ASK_REGISTER_PASSWORD,
        ),
        Dialogue::RegisterPassword { username } => {
            if text.chars().count() < MIN_PASSWORD_CHARS {
                return Step::to(Dialogue::RegisterPassword { username }, SHORT_PASSWORD);
            }
            Step::run(Action::Register {
                username,
                password: text,
            })
        }
        Dialogue::LoginUsername => Step::to(
            Dialogue::LoginPassword { username: text },
            ASK_LOGIN_PASSWORD,
        ),
        Dialogue::LoginPassword { username } => Step::run(Action::LogIn {
            username,
            password: text,
        }),
        Dialogue::CreateTitle => Step::to(Dialogue::CreateContent { title: text }, ASK_CONTENT),
        Dialogue::CreateContent { title } => Step::run(Action::CreatePost {
            title,
            content: text,
        }),
        Dialogue::EditTitle { post_id } => Step::to(
            Dialogue::EditContent {
                post_id,
                title: keep_or_replace(text),
            },
            ASK_EDIT_CONTENT,
        ),
        Dialogue::EditContent { post_id, title } => {
            let content = keep_or_replace(text);
            if title.is_none() && content.is_none() {
                return Step::to(Dialogue::Idle, CANCELLED);
            }
            Step::run(Action::UpdatePost {
                post_id,
                title,
                content,
            })
        }
    }
}

fn start_flow(item: MenuItem, logged_in: bool) -> Step {
    match item {
        MenuItem::Register => Step::to(Dialogue::RegisterUsername, ASK_REGISTER_USERNAME),
        MenuItem::LogIn => Step::to(Dialogue::LoginUsername, ASK_LOGIN_USERNAME),
        MenuItem::CreatePost if !logged_in => Step::to(Dialogue::Idle, NOT_LOGGED_IN),
        MenuItem::CreatePost => Step::to(Dialogue::CreateTitle, ASK_TITLE),
        MenuItem::Posts => Step {
            next: Dialogue::Idle,
            reply: Some(LOADING_POSTS),
            action: Some(Action::ListPosts),
        },
    }
}

fn keep_or_replace(text: String) -> Option<String> {
    (text != KEEP_CURRENT).then_some(text)
}
