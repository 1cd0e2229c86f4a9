use std::time::Duration;

use http::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::sources::{FetchError, Grant};

static ACCESS_TOKEN_FIELD: &str = "access_token";
static EXPIRES_IN_FIELD: &str = "expires_in";
static ERROR_FIELD: &str = "error";

/// Classify a token endpoint response.
///
/// The success and error shapes are blended: the body is read once as loose
/// JSON and then checked for an `error` field first, then for the success
/// fields. Anything that satisfies neither shape is a fetch failure.
pub fn parse_token_response(status: StatusCode, body: &str) -> Result<Grant, FetchError> {
    let json_body: Option<Value> = match serde_json::from_str(body) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("token response body is not valid JSON: {}", e);
            None
        }
    };

    let Some(json_body) = json_body else {
        if !status.is_success() {
            return Err(status_rejection(status, body));
        }
        return Err(FetchError::MalformedResponse {
            message: "body is not valid JSON".to_owned(),
        });
    };

    // an empty error field is not a rejection
    if let Some(error) = get_str(&json_body, ERROR_FIELD).filter(|e| !e.is_empty()) {
        let code = get_u64(&json_body, "code")
            .and_then(|c| u32::try_from(c).ok())
            .unwrap_or(status.as_u16() as u32);
        let description = get_str(&json_body, "error_description")
            .or_else(|| get_str(&json_body, "title"))
            .unwrap_or_default();
        return Err(FetchError::Auth {
            code,
            error,
            description,
        });
    }

    if !status.is_success() {
        return Err(status_rejection(status, body));
    }

    let token = get_str(&json_body, ACCESS_TOKEN_FIELD)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FetchError::MalformedResponse {
            message: format!("missing '{}'", ACCESS_TOKEN_FIELD),
        })?;
    let expires_in = get_u64(&json_body, EXPIRES_IN_FIELD).ok_or_else(|| {
        FetchError::MalformedResponse {
            message: format!("missing or invalid '{}'", EXPIRES_IN_FIELD),
        }
    })?;

    debug!(expires_in, "token response parsed");
    Ok(Grant::new(token, Duration::from_secs(expires_in)))
}

fn status_rejection(status: StatusCode, body: &str) -> FetchError {
    FetchError::Auth {
        code: status.as_u16() as u32,
        error: status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned(),
        description: body.chars().take(200).collect(),
    }
}

fn get_str(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_owned)
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn get_u64(value: &Value, field: &str) -> Option<u64> {
    match value.get(field)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
