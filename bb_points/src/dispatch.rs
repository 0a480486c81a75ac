//! Hands inbound messages off to their own task.
//!
//! The event handler only pushes into the channel, a single loop drains it and spawns
//! one task per message, so a message waiting on the database never holds up the next.

use std::future::Future;
use std::sync::Arc;

use serenity::{client::Context, model::channel::Message};
use tokio::sync::mpsc;

use crate::processor::{InboundMessage, MessageProcessor, Reply};

/// A gateway message together with the context needed to answer it
pub struct Inbound {
    pub ctx: Context,
    pub msg: Message,
}

pub struct DispatcherKey;

impl serenity::prelude::TypeMapKey for DispatcherKey {
    type Value = mpsc::UnboundedSender<Inbound>;
}

/// Starts the dispatch loop. It stops once every sender is dropped.
pub fn spawn<T, F, Fut>(handler: F) -> mpsc::UnboundedSender<T>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<T>();
    tokio::spawn(async move {
        while let Some(item) = rx.recv().await {
            tokio::spawn(handler(item));
        }
        debug!("Dispatcher stopped");
    });
    tx
}

/// The dispatcher used by the bot: every message goes through the processor and
/// every reply it produces is reported back in the channel
pub fn spawn_processor(processor: Arc<MessageProcessor>) -> mpsc::UnboundedSender<Inbound> {
    spawn(move |Inbound { ctx, msg }| {
        let processor = processor.clone();
        async move {
            let inbound = InboundMessage {
                author: msg.author.name.clone(),
                content: msg.content.clone(),
                received_at: chrono::DateTime::from_timestamp(msg.timestamp.unix_timestamp(), 0)
                    .unwrap_or_else(chrono::Utc::now),
            };
            for reply in processor.process(&inbound).await {
                report(&ctx, &msg, reply).await;
            }
        }
    })
}

/// Logs the part of a reply meant for the log and sends the part meant for the user
pub async fn report(ctx: &Context, msg: &Message, reply: Reply) {
    let text = match reply {
        Ok(Some(text)) => text,
        Ok(None) => return,
        Err(e) => {
            if let Some(err) = e.log_message() {
                error!("[{}] {}", msg.author.name, err);
            }
            match e.user_message() {
                Some(text) => text.to_string(),
                None => return,
            }
        }
    };
    if let Err(e) = msg.reply(ctx, text).await {
        error!("Error when sending message: {}", e);
    }
}
