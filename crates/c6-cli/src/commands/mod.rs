//! CLI commands.

pub mod ask;
pub mod ping;
pub mod sql;
pub mod update;
