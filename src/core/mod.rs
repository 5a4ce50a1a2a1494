pub mod error;
pub mod types;

pub use error::{BridgeError, Result};
pub use types::{JsonObject, json_param, non_empty_object};
