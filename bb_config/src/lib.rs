#[macro_use]
extern crate log;
extern crate serde;
extern crate serde_json;
extern crate sqlx;

pub mod shared;

pub use shared::Config;
