pub mod context;
pub mod evidence;
pub mod models;
pub mod paper;
pub mod partition;
pub mod ranking;
pub mod similarity;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
