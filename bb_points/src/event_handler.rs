use serenity::{client::Context, model::channel::Message};

pub struct PointEventHandler;

#[serenity::async_trait]
impl serenity::client::EventHandler for PointEventHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let sender = {
            let lock = ctx.data.read().await;
            lock.get::<crate::dispatch::DispatcherKey>().cloned()
        };
        let sender = match sender {
            Some(sender) => sender,
            None => {
                error!("Points dispatcher not in typemap, dropping message");
                return;
            }
        };
        if sender.send(crate::dispatch::Inbound { ctx, msg }).is_err() {
            error!("Points dispatcher stopped, dropping message");
        }
    }
}
