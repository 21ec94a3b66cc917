use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extras key under which the terminal returns its serialized result.
pub const EXTRA_RESULT: &str = "RESULT";

/// Data handed back by the payment app when it returns control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnedData {
    pub extras: Option<Map<String, Value>>,
}

impl ReturnedData {
    /// Returned data without any extras bundle.
    pub fn without_extras() -> Self {
        Self { extras: None }
    }

    /// An extras bundle holding `RESULT` as the given raw string.
    pub fn with_result(result: impl Into<String>) -> Self {
        let mut extras = Map::new();
        extras.insert(EXTRA_RESULT.to_string(), Value::String(result.into()));
        Self {
            extras: Some(extras),
        }
    }

    /// Builds the data a terminal would send back for `response`.
    pub fn from_response(response: &TransactionResponse) -> Result<Self> {
        let result = serde_json::to_string(response)
            .map_err(|e| BridgeError::ResponseDecode(e.to_string()))?;
        Ok(Self::with_result(result))
    }
}

/// The normalized terminal outcome delivered to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TransactionResponse {
    pub response_type: String,
    pub status_code: String,
    #[serde(rename = "STATUS_MSG")]
    pub status_message: String,
    pub receipt_data: String,
}

pub struct ResponseDecoder;

impl ResponseDecoder {
    /// Decodes what the payment app returned.
    ///
    /// A missing `RESULT` extra yields an all-empty response. Only a missing
    /// extras bundle or an unparseable `RESULT` is an error.
    pub fn decode(data: Option<&ReturnedData>) -> Result<TransactionResponse> {
        let extras = data
            .and_then(|data| data.extras.as_ref())
            .ok_or_else(|| {
                BridgeError::ResponseDecode("payment app returned no data".to_string())
            })?;

        let raw = extras
            .get(EXTRA_RESULT)
            .and_then(Value::as_str)
            .unwrap_or("{}");

        let result = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(result)) => result,
            Ok(other) => {
                return Err(BridgeError::ResponseDecode(format!(
                    "RESULT is not an object: {other}"
                )));
            }
            Err(e) => return Err(BridgeError::ResponseDecode(e.to_string())),
        };

        Ok(TransactionResponse {
            response_type: text_field(&result, "RESPONSE_TYPE"),
            status_code: text_field(&result, "STATUS_CODE"),
            status_message: text_field(&result, "STATUS_MSG"),
            receipt_data: text_field(&result, "RECEIPT_DATA"),
        })
    }
}

fn text_field(result: &Map<String, Value>, key: &str) -> String {
    match result.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(value)) => value.clone(),
        Some(other) => other.to_string(),
    }
}
