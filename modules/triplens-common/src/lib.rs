pub mod config;
pub mod error;
pub mod normalize;
pub mod taxonomy;
pub mod types;

pub use config::Config;
pub use error::TriplensError;
pub use normalize::normalize_base;
pub use types::*;
