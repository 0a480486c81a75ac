#[macro_use]
extern crate log;
#[macro_use]
extern crate bb_core;
extern crate bb_config;
extern crate bb_database;
extern crate chrono;
extern crate once_cell;
extern crate serenity;

pub mod balance;
pub mod classifier;
pub mod commands;
pub mod dispatch;
mod event_handler;
pub mod guard;
pub mod ledger;
pub mod module;
pub mod processor;
pub mod shared;

pub use module::MODULE_DECLARATION;
