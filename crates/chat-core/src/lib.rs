pub mod chat;
pub mod config;
mod config_env;
pub mod llm;
pub mod models;
pub mod validation;
