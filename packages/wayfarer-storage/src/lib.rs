pub mod content;
pub mod db;
pub mod likes;
pub mod models;
pub mod schema;
pub mod trending;
pub mod users;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
