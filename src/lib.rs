pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod family;
pub mod journal;
pub mod models;
pub mod retry;
pub mod rows;
pub mod setup;
pub mod sheets;
pub mod validation;
