use serenity::{
    client::{Context, EventHandler},
    model::{channel::Message, gateway::Ready},
};

/// Fans every gateway event out to the handlers registered by the modules
pub struct EventHandlerManager {
    inners: Vec<Box<dyn EventHandler>>,
}

impl Default for EventHandlerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandlerManager {
    pub fn new() -> Self {
        Self { inners: Vec::new() }
    }

    pub fn push(&mut self, handler: impl EventHandler + 'static) {
        self.inners.push(Box::new(handler));
    }
}

#[serenity::async_trait]
impl EventHandler for EventHandlerManager {
    async fn ready(&self, ctx: Context, bot: Ready) {
        for handler in &self.inners {
            handler.ready(ctx.clone(), bot.clone()).await;
        }
    }

    async fn message(&self, ctx: Context, new_message: Message) {
        for handler in &self.inners {
            handler.message(ctx.clone(), new_message.clone()).await;
        }
    }
}
