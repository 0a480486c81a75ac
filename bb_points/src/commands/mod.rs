//! One file per `!command`. Every command answers with a [`Reply`](crate::processor::Reply).

pub mod checkdb;
pub mod clan_gathering;
pub mod debugschema;
pub mod help;
pub mod listusers;
pub mod mypoints;
