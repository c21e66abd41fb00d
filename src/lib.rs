pub mod config;
pub mod mounts;
pub mod operations;
pub mod terminal;
