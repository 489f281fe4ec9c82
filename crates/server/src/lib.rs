pub mod app;
pub mod auth;
pub mod config;
pub mod http;
pub mod limiter;
pub mod pipeline;
pub mod state;
