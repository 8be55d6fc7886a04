pub mod config;
pub mod errors;
pub mod models;

pub use config::*;
pub use errors::*;
pub use models::*;
