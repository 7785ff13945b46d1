pub mod clock;
pub mod config;
pub mod directory;
pub mod handlers;
pub mod models;
pub mod protocol;
pub mod query;
pub mod service;
pub mod storage;
pub mod utils;
