use chrono::{DateTime, Utc};
use qubic_client::ChainError;
use qubic_client::codec::parse_u64_amount;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Success envelope shared by every route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_in_qubic: Option<Value>,
    pub client_address: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub contract_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimJobRequest {
    pub worker_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOnChainRequest {
    pub seed: Option<String>,
    pub wallet_address: Option<String>,
    pub price_in_qubic: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainActionRequest {
    pub seed: Option<String>,
    pub wallet_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportWalletRequest {
    pub seed: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainResult {
    pub message: &'static str,
    pub transaction_id: String,
    pub target_tick: u64,
    pub current_tick: u64,
    pub details: Value,
}

/// Prices and job ids arrive either as JSON numbers or decimal strings.
/// Anything that does not fit in a u64 is an encoding error.
pub fn parse_amount(value: &Value, field: &str) -> Result<u64, ApiError> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            ChainError::Encoding(format!("{} must be an unsigned 64-bit integer", field)).into()
        }),
        Value::String(s) => Ok(parse_u64_amount(s).map_err(ChainError::from)?),
        _ => Err(ApiError::BadRequest(format!(
            "{} must be a number or a decimal string",
            field
        ))),
    }
}

/// Same rules as [`parse_amount`] for path segments.
pub fn parse_job_id(raw: &str) -> Result<u64, ApiError> {
    Ok(parse_u64_amount(raw).map_err(ChainError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_accepts_numbers_and_strings() {
        assert_eq!(parse_amount(&json!(1000), "price").unwrap(), 1000);
        assert_eq!(parse_amount(&json!("1000"), "price").unwrap(), 1000);
        assert_eq!(
            parse_amount(&json!("18446744073709551615"), "price").unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn test_amount_out_of_range_is_encoding_error() {
        for value in [json!("18446744073709551616"), json!(-5), json!(1.5), json!("12a")] {
            assert!(matches!(
                parse_amount(&value, "price"),
                Err(ApiError::Chain(ChainError::Encoding(_)))
            ));
        }
        assert!(matches!(
            parse_amount(&json!(true), "price"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_envelope_skips_empty_fields() {
        let value = serde_json::to_value(ApiResponse::ok(json!({ "n": 1 }))).unwrap();
        assert_eq!(value, json!({ "success": true, "data": { "n": 1 } }));

        let value =
            serde_json::to_value(ApiResponse::with_message(Vec::<u8>::new(), "done")).unwrap();
        assert_eq!(value["message"], "done");
    }
}
