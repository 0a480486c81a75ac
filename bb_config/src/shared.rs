pub use serde::{de::DeserializeOwned, Serialize};

/// A JSON document stored in the `bot_options` table under `KEY`
pub trait Config: Serialize + DeserializeOwned {
    const KEY: &'static str;
}

type AllResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Turns the stored JSON into `T`, logging and discarding documents that don't fit
pub fn decode<T: Config>(data: serde_json::Value) -> Option<T> {
    match serde_json::value::from_value(data) {
        Ok(val) => Some(val),
        Err(e) => {
            error!(
                "Error when deserializing config `{}`: {}",
                <T as Config>::KEY,
                e
            );
            None
        }
    }
}

pub async fn get_config<T: Config>(database: &sqlx::PgPool) -> AllResult<Option<T>> {
    let res = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT data FROM bot_options WHERE key = $1::varchar(64)",
    )
    .bind(<T as Config>::KEY)
    .fetch_optional(database)
    .await?;
    Ok(res.and_then(decode::<T>))
}

pub async fn get_config_or_default<T: Config + Default>(database: &sqlx::PgPool) -> AllResult<T> {
    get_config::<T>(database)
        .await
        .map(|o| o.unwrap_or_default())
}

pub async fn set_config<T: Config>(database: &sqlx::PgPool, val: &T) -> AllResult<()> {
    sqlx::query(
        "INSERT INTO bot_options (key, data) VALUES ($1::varchar(64), $2::jsonb) ON CONFLICT (key) DO UPDATE SET data = EXCLUDED.data",
    )
    .bind(<T as Config>::KEY)
    .bind(serde_json::value::to_value(val)?)
    .execute(database)
    .await?;
    Ok(())
}

/// Reads the config once, writing the defaults back when the row doesn't exist yet
/// so it can be edited in the table afterwards
pub async fn load_or_seed<T: Config + Default>(database: &sqlx::PgPool) -> AllResult<T> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM bot_options WHERE key = $1::varchar(64)",
    )
    .bind(<T as Config>::KEY)
    .fetch_one(database)
    .await?
        > 0;
    if exists {
        return get_config_or_default::<T>(database).await;
    }
    let val = T::default();
    info!("Seeding default config `{}`", <T as Config>::KEY);
    set_config(database, &val).await?;
    Ok(val)
}
