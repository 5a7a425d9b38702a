pub mod config;
pub mod migrate;
pub mod permissions;
pub mod user;
