extern crate bb_core;
extern crate bb_database;
extern crate bb_points;

extern crate serenity;
#[macro_use]
extern crate log;
extern crate dotenv;
extern crate tokio;

use bb_core::ModuleDeclaration;
use serenity::client::EventHandler;

static MODULES: &[&ModuleDeclaration] = &[
    &bb_database::module::MODULE_DECLARATION,
    &bb_points::module::MODULE_DECLARATION,
];

struct BbEventHandler;

#[serenity::async_trait]
impl EventHandler for BbEventHandler {
    async fn ready(&self, _ctx: serenity::client::Context, ready: serenity::model::gateway::Ready) {
        info!(
            "Started `{}` on {} guilds",
            ready.user.name,
            ready.guilds.len()
        );
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    if let Err(e) = bb_core::logger::logger_setup() {
        eprintln!("Error when setting up logger: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = bot_launch().await {
        error!("Error when launching bot: {}", e);
        std::process::exit(1);
    }
}

async fn bot_launch() -> Result<(), bb_core::BoxError> {
    let token = std::env::var("BB_DISCORD_BOT_TOKEN").map_err(|_| {
        "Please use `BB_DISCORD_BOT_TOKEN` environement variable(or .env) with your bot's TOKEN"
    })?;

    let mut event_handler = bb_core::event_handler::EventHandlerManager::new();
    event_handler.push(BbEventHandler);
    let mut type_map = serenity::prelude::TypeMap::new();
    let mut intents = serenity::model::gateway::GatewayIntents::empty();

    for module in MODULES {
        (module.register_typemap)(&mut type_map)
            .await
            .map_err(|e| format!("[{}] {}", module.module_name, e))?;
        (module.register_event_handler)(&mut event_handler);
        intents = (module.register_intent)(intents);
        info!("Loaded module `{}`", module.module_name);
    }

    let mut client = serenity::Client::builder(token, intents)
        .event_handler(event_handler)
        .type_map(type_map)
        .await
        .map_err(|e| {
            error!("Error when creating client: {}", e);
            e
        })?;
    info!("Starting Client");
    client.start().await?;
    Ok(())
}
