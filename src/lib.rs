//! weblog: a server-rendered blogging service — users, posts, comments, and
//! an admin console over MySQL.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod render;
pub mod reply;
pub mod routes;
pub mod schema;
pub mod session;
pub mod sql;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{ApiError, AppError};
pub use reply::Reply;
pub use routes::app;
pub use state::AppState;
pub use store::{Record, Store};
