pub mod analysis;
pub mod chat;
pub mod health;
pub mod import;
pub mod sessions;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::AppError;

/// Decode a JSON body, reporting shape errors as 400 with a readable detail.
pub(crate) fn parse_body<T: DeserializeOwned>(body: JsonValue) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(format!("Invalid request: {e}")))
}
