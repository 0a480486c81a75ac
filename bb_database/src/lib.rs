extern crate bb_core;
extern crate serenity;
extern crate sqlx;
#[macro_use]
extern crate log;

#[cfg(any(test, feature = "memory-store"))]
pub mod memory;
pub mod module;
pub mod postgres;
pub mod shared;
pub mod store;

pub use postgres::PgStore;
pub use store::{Store, StoreError, StoreResult};
