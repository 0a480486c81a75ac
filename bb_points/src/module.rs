use std::sync::Arc;

use bb_core::BoxError;

pub static MODULE_DECLARATION: bb_core::ModuleDeclaration = bb_core::ModuleDeclaration {
    module_name: "Points",
    register_typemap: |t| Box::pin(register_typemap(t)),
    register_event_handler,
    register_intent,
};

async fn register_typemap(tm: &mut serenity::prelude::TypeMap) -> Result<(), BoxError> {
    let pool = tm
        .get::<bb_database::shared::DatabaseKey>()
        .cloned()
        .ok_or("Database not in typemap, register the database module first")?;
    let config = bb_config::shared::load_or_seed::<crate::shared::PointsConfig>(&pool).await?;
    debug!("Points config: {:?}", config);

    let store = Arc::new(bb_database::PgStore::new(pool));
    let processor = Arc::new(crate::processor::MessageProcessor::new(store, config));
    tm.insert::<crate::dispatch::DispatcherKey>(crate::dispatch::spawn_processor(processor));
    Ok(())
}

fn register_event_handler(eh: &mut bb_core::event_handler::EventHandlerManager) {
    eh.push(crate::event_handler::PointEventHandler);
}

fn register_intent(
    intent: serenity::model::gateway::GatewayIntents,
) -> serenity::model::gateway::GatewayIntents {
    use serenity::model::gateway::GatewayIntents as I;
    intent | I::GUILDS | I::GUILD_MESSAGES | I::DIRECT_MESSAGES | I::MESSAGE_CONTENT
}
