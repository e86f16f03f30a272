pub mod config;
pub mod error;
pub mod messages;
pub mod utils;

pub use self::config::*;
pub use self::error::*;
pub use self::messages::*;
pub use self::utils::*;
