#[macro_use]
pub mod macros;

pub mod app;
pub mod auth;
pub mod calendar;
pub mod chat;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod goals;
pub mod moods;
pub mod notes;
pub mod response;
pub mod scoping;
pub mod settings;
pub mod state;
pub mod store;
pub mod tasks;
pub mod timer;
pub mod users;
pub mod validate;
