use bb_core::BoxError;

pub static MODULE_DECLARATION: bb_core::ModuleDeclaration = bb_core::ModuleDeclaration {
    module_name: "Database",
    register_typemap: |t| Box::pin(register_typemap(t)),
    register_event_handler,
    register_intent,
};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

async fn register_typemap(tm: &mut serenity::prelude::TypeMap) -> Result<(), BoxError> {
    let url = std::env::var("BB_DATABASE_URL")
        .map_err(|_| "Use `BB_DATABASE_URL` environment variable to set the database url")?;
    let db = sqlx::PgPool::connect(url.as_str()).await?;

    info!("Running database migrations");
    MIGRATOR.run(&db).await?;

    tm.insert::<crate::shared::DatabaseKey>(db);
    Ok(())
}

fn register_event_handler(_: &mut bb_core::event_handler::EventHandlerManager) {}

fn register_intent(
    intent: serenity::model::gateway::GatewayIntents,
) -> serenity::model::gateway::GatewayIntents {
    intent
}
