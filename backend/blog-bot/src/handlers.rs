//! Update handlers and dispatcher setup.
//!
//! Text messages drive the per-chat dialogue; inline buttons under rendered posts drive
//! likes, edits and deletes.

use std::sync::Arc;

use teloxide::dispatching::{DefaultKey, UpdateHandler};
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::client::{ApiClient, ApiError};
use crate::dialogue::{self, Action, Input};
use crate::keyboards::{main_menu, post_keyboard, Callback};
use crate::render::{self, failure_text, NO_POSTS, POSTS_SKIPPED};
use crate::session::Sessions;

/// Shared bot state.
#[derive(Clone)]
pub struct BotState {
    pub api: ApiClient,
    pub sessions: Arc<Sessions>,
}

impl BotState {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            sessions: Arc::new(Sessions::new()),
        }
    }

    /// Message for a failed authenticated call; a 401 also forgets the chat's token.
    fn auth_failure(&self, chat: ChatId, err: &ApiError) -> String {
        if matches!(err, ApiError::Unauthorized(_)) {
            info!(chat_id = chat.0, "token rejected, dropping session");
            self.sessions.drop_token(chat);
        }
        failure_text(err)
    }
}

/// Build the dispatcher with message and callback handlers.
pub fn build_dispatcher(bot: Bot, state: BotState) -> Dispatcher<Bot, anyhow::Error, DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

async fn on_message(bot: Bot, msg: Message, state: BotState) -> anyhow::Result<()> {
    let chat = msg.chat.id;
    let input = Input::parse(msg.text());
    let logged_in = state.sessions.token(chat).is_some();

    let current = state.sessions.take_dialogue(chat);
    let step = dialogue::advance(current, input, logged_in);
    state.sessions.set_dialogue(chat, step.next);

    if let Some(reply) = step.reply {
        bot.send_message(chat, reply)
            .reply_markup(main_menu())
            .await?;
    }

    if let Some(action) = step.action {
        perform(&bot, &state, chat, action).await?;
    }

    Ok(())
}

async fn perform(bot: &Bot, state: &BotState, chat: ChatId, action: Action) -> anyhow::Result<()> {
    match action {
        Action::Register { username, password } => {
            let text = match state.api.register(&username, &password).await {
                Ok(user) => format!(
                    "Registration complete! Your id: {}, your username: {}",
                    user.id, user.username
                ),
                Err(ApiError::Unauthorized(detail)) => format!("Error: {}", detail),
                Err(e) => failure_text(&e),
            };
            bot.send_message(chat, text).reply_markup(main_menu()).await?;
        }
        Action::LogIn { username, password } => {
            let text = match state.api.login(&username, &password).await {
                Ok(token) => {
                    state.sessions.set_token(chat, token.access_token);
                    info!(chat_id = chat.0, %username, "logged in");
                    "You are logged in!".to_string()
                }
                Err(ApiError::Unauthorized(detail)) => format!("Error: {}", detail),
                Err(e) => failure_text(&e),
            };
            bot.send_message(chat, text).reply_markup(main_menu()).await?;
        }
        Action::ListPosts => match state.api.list_posts().await {
            Ok(posts) if posts.is_empty() => {
                bot.send_message(chat, NO_POSTS).await?;
            }
            Ok(posts) => {
                let mut skipped = 0;
                for post in posts {
                    if let Err(e) = bot
                        .send_message(chat, render::post_text(&post))
                        .reply_markup(post_keyboard(post.id, post.likes_count))
                        .await
                    {
                        warn!(error = %e, post_id = post.id, "failed to send post");
                        skipped += 1;
                    }
                }
                if skipped > 0 {
                    bot.send_message(chat, POSTS_SKIPPED).await?;
                }
            }
            Err(e) => {
                bot.send_message(chat, failure_text(&e)).await?;
            }
        },
        Action::CreatePost { title, content } => {
            let Some(token) = state.sessions.token(chat) else {
                bot.send_message(chat, dialogue::NOT_LOGGED_IN).await?;
                return Ok(());
            };
            let text = match state.api.create_post(&token, &title, &content).await {
                Ok(post) => format!("Your post \"{}\" was created!", post.title),
                Err(e) => state.auth_failure(chat, &e),
            };
            bot.send_message(chat, text).reply_markup(main_menu()).await?;
        }
        Action::UpdatePost {
            post_id,
            title,
            content,
        } => {
            let Some(token) = state.sessions.token(chat) else {
                bot.send_message(chat, dialogue::NOT_LOGGED_IN).await?;
                return Ok(());
            };
            match state
                .api
                .update_post(&token, post_id, title.as_deref(), content.as_deref())
                .await
            {
                Ok(post) => {
                    bot.send_message(chat, render::post_text(&post))
                        .reply_markup(post_keyboard(post.id, post.likes_count))
                        .await?;
                }
                Err(e) => {
                    bot.send_message(chat, state.auth_failure(chat, &e)).await?;
                }
            }
        }
    }

    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, state: BotState) -> anyhow::Result<()> {
    let Some(callback) = q.data.as_deref().and_then(Callback::parse) else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };
    let chat = message.chat().id;
    let token = state.sessions.token(chat);

    match callback {
        Callback::Update(post_id) => {
            let step = dialogue::begin_edit(post_id, token.is_some());
            state.sessions.set_dialogue(chat, step.next);
            bot.answer_callback_query(&q.id).await?;
            if let Some(reply) = step.reply {
                bot.send_message(chat, reply).await?;
            }
        }
        Callback::Like(post_id) => {
            let Some(token) = token else {
                bot.answer_callback_query(&q.id)
                    .text(dialogue::NOT_LOGGED_IN)
                    .await?;
                return Ok(());
            };
            match state.api.like_post(&token, post_id).await {
                Ok(like) => {
                    if let Err(e) = bot
                        .edit_message_reply_markup(chat, message.id())
                        .reply_markup(post_keyboard(post_id, like.likes_count))
                        .await
                    {
                        warn!(error = %e, post_id, "failed to refresh like button");
                    }
                    bot.answer_callback_query(&q.id).text(like.detail).await?;
                }
                Err(e) => {
                    bot.answer_callback_query(&q.id)
                        .text(state.auth_failure(chat, &e))
                        .await?;
                }
            }
        }
        Callback::Delete(post_id) => {
            let Some(token) = token else {
                bot.answer_callback_query(&q.id)
                    .text(dialogue::NOT_LOGGED_IN)
                    .await?;
                return Ok(());
            };
            match state.api.delete_post(&token, post_id).await {
                Ok(()) => {
                    if let Err(e) = bot.delete_message(chat, message.id()).await {
                        warn!(error = %e, post_id, "failed to remove deleted post message");
                    }
                    bot.answer_callback_query(&q.id)
                        .text(format!("Post {} deleted", post_id))
                        .await?;
                }
                Err(e) => {
                    bot.answer_callback_query(&q.id)
                        .text(state.auth_failure(chat, &e))
                        .await?;
                }
            }
        }
    }

    Ok(())
}
