extern crate bb_config;
extern crate dotenv;
extern crate sqlx;
extern crate tokio;
#[macro_use]
extern crate serde;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct Conf {
    list: Vec<u8>,
    s: String,
    num: u64,
}

impl bb_config::shared::Config for Conf {
    const KEY: &'static str = "simple.json";
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    let pool = sqlx::PgPool::connect(&std::env::var("BB_DATABASE_URL")?).await?;

    let mut conf = bb_config::shared::load_or_seed::<Conf>(&pool).await?;
    dbg!(&conf);

    conf.list.extend_from_slice(&[1, 2, 3, 4]);
    conf.s = now_string();
    conf.num = 7;

    bb_config::shared::set_config(&pool, &conf).await?;
    Ok(())
}

fn now_string() -> String {
    format!("{:?}", std::time::SystemTime::now())
}
