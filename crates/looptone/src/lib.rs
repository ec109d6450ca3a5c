pub mod cli;
pub mod config;
pub mod player;
pub mod runtime;
pub mod sink;
