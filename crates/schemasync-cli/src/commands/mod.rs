//! Command implementations for the schemasync CLI.

mod discover;
mod init;
mod sync;

pub use discover::execute as discover_schema;
pub use init::execute as write_default_config;
pub use sync::execute as sync_client;
