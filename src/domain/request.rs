use crate::error::{BridgeError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Transaction type understood by the payment terminal.
pub const SALE: &str = "SALE";

/// A sale request as supplied by the caller. Immutable once built.
///
/// Amounts stay in the exact text the caller sent; the terminal parses them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub amount: String,
    pub bill_number: String,
    pub source_id: String,
    pub tip_amount: String,
    pub print_flag: String,
}

impl TransactionRequest {
    /// Builds a request from the method channel arguments.
    ///
    /// `tipAmount` is optional: absent, `null` or non-string values all
    /// become an empty tip. Every other key must be a string.
    pub fn from_params(params: &Value) -> Result<Self> {
        let args = params.as_object().ok_or_else(|| {
            BridgeError::Validation("arguments must be a map".to_string())
        })?;

        let tip_amount = args
            .get("tipAmount")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            amount: required(args, "amount")?,
            bill_number: required(args, "billNumber")?,
            source_id: required(args, "sourceId")?,
            tip_amount,
            print_flag: required(args, "printFlag")?,
        })
    }
}

fn required(args: &Map<String, Value>, key: &str) -> Result<String> {
    match args.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(BridgeError::Validation(format!("{key} must be a string"))),
        None => Err(BridgeError::Validation(format!("{key} is required"))),
    }
}

/// The fixed-schema payload the terminal parses.
///
/// Field order and names are part of the terminal contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SalePayload {
    pub amount: String,
    pub tip_amount: String,
    pub tran_type: String,
    pub bill_number: String,
    pub print_flag: String,
    pub source_id: String,
    pub udf1: String,
    pub udf2: String,
    pub udf3: String,
    pub udf4: String,
    pub udf5: String,
}

impl SalePayload {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BridgeError::Launch(e.to_string()))
    }
}

pub struct RequestEncoder;

impl RequestEncoder {
    /// Encodes a validated request. The reserved UDF fields are always empty.
    pub fn encode(request: &TransactionRequest) -> SalePayload {
        SalePayload {
            amount: request.amount.clone(),
            tip_amount: request.tip_amount.clone(),
            tran_type: SALE.to_string(),
            bill_number: request.bill_number.clone(),
            print_flag: request.print_flag.clone(),
            source_id: request.source_id.clone(),
            udf1: String::new(),
            udf2: String::new(),
            udf3: String::new(),
            udf4: String::new(),
            udf5: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> Value {
        json!({
            "amount": "100.00",
            "billNumber": "B1",
            "sourceId": "S1",
            "printFlag": "1",
        })
    }

    #[test]
    fn test_encode_fills_defaults() {
        let request = TransactionRequest::from_params(&params()).unwrap();
        let payload = RequestEncoder::encode(&request);

        assert_eq!(payload.amount, "100.00");
        assert_eq!(payload.tran_type, "SALE");
        assert_eq!(payload.tip_amount, "");
        assert_eq!(payload.udf1, "");
        assert_eq!(payload.udf5, "");
    }

    #[test]
    fn test_payload_keys_in_terminal_order() {
        let request = TransactionRequest::from_params(&params()).unwrap();
        let json = RequestEncoder::encode(&request).to_json().unwrap();

        assert_eq!(
            json,
            r#"{"AMOUNT":"100.00","TIP_AMOUNT":"","TRAN_TYPE":"SALE","BILL_NUMBER":"B1","PRINT_FLAG":"1","SOURCE_ID":"S1","UDF1":"","UDF2":"","UDF3":"","UDF4":"","UDF5":""}"#
        );
    }

    #[test]
    fn test_tip_amount_forwarded() {
        let mut args = params();
        args["tipAmount"] = json!("5.50");
        let request = TransactionRequest::from_params(&args).unwrap();
        assert_eq!(RequestEncoder::encode(&request).tip_amount, "5.50");
    }

    #[test]
    fn test_non_string_tip_is_empty() {
        let mut args = params();
        args["tipAmount"] = json!(5);
        let request = TransactionRequest::from_params(&args).unwrap();
        assert_eq!(request.tip_amount, "");
    }

    #[test]
    fn test_missing_required_field() {
        for key in ["amount", "billNumber", "sourceId", "printFlag"] {
            let mut args = params();
            args.as_object_mut().unwrap().remove(key);
            let err = TransactionRequest::from_params(&args).unwrap_err();
            assert_eq!(err, BridgeError::Validation(format!("{key} is required")));
        }
    }

    #[test]
    fn test_non_string_required_field() {
        let mut args = params();
        args["billNumber"] = json!(42);
        let err = TransactionRequest::from_params(&args).unwrap_err();
        assert_eq!(
            err,
            BridgeError::Validation("billNumber must be a string".to_string())
        );
    }

    #[test]
    fn test_amounts_forwarded_verbatim() {
        for amount in ["0.00", "1,000.00", " 12.5 "] {
            let mut args = params();
            args["amount"] = json!(amount);
            args["tipAmount"] = json!("-1");
            let request = TransactionRequest::from_params(&args).unwrap();
            let payload = RequestEncoder::encode(&request);
            assert_eq!(payload.amount, amount);
            assert_eq!(payload.tip_amount, "-1");
        }
    }

    #[test]
    fn test_arguments_must_be_map() {
        assert!(matches!(
            TransactionRequest::from_params(&json!(["100.00"])),
            Err(BridgeError::Validation(_))
        ));
    }
}
