pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod patch;
pub mod router;
pub mod service;

pub use error::GroceryError;
pub use service::EntityOps;
