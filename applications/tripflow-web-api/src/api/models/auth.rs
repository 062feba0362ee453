use serde::{Deserialize, Serialize};

use crate::auth::claims::Session;

/// An access/refresh pair as the backend hands it out. The refresh
/// token is optional because rotation is at the backend's discretion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Peel the backend's `{status, message, result}` envelope off a JSON
/// body, passing bare bodies through untouched.
pub fn unwrap_envelope(body: serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(mut map) if map.contains_key("result") => map
            .remove("result")
            .unwrap_or(serde_json::Value::Null),
        other => other,
    }
}

/// True when an envelope's `status` field reads as success. The backend
/// has been seen returning both the string `"SUCCESS"` and numeric
/// codes, so both spellings are accepted.
pub fn envelope_ok(body: &serde_json::Value) -> bool {
    match body.get("status") {
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("success"),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(|code| (200..300).contains(&code))
            .unwrap_or(false),
        // No envelope at all: the HTTP status already said yes
        None => true,
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct OtpSendRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpVerifyRequest {
    pub email: String,
    pub otp: String,
}

/// What the browser gets back from a successful OTP verification: the
/// pair it must place in local storage, plus the identity projection so
/// the UI can render without another decode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Session,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unwrap_envelope_prefers_result() {
        let body = serde_json::json!({ "status": "SUCCESS", "result": { "accessToken": "a" } });
        assert_eq!(
            unwrap_envelope(body),
            serde_json::json!({ "accessToken": "a" })
        );
    }

    #[test]
    fn test_unwrap_envelope_passes_bare_bodies_through() {
        let body = serde_json::json!({ "accessToken": "a" });
        assert_eq!(unwrap_envelope(body.clone()), body);
    }

    #[test]
    fn test_envelope_ok_spellings() {
        assert!(envelope_ok(&serde_json::json!({ "status": "SUCCESS" })));
        assert!(envelope_ok(&serde_json::json!({ "status": "success" })));
        assert!(envelope_ok(&serde_json::json!({ "status": 200 })));
        assert!(envelope_ok(&serde_json::json!({ "accessToken": "a" })));
        assert!(!envelope_ok(&serde_json::json!({ "status": "FAILED" })));
        assert!(!envelope_ok(&serde_json::json!({ "status": 400 })));
    }

    #[test]
    fn test_token_pair_deserializes_camel_case() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"accessToken":"a","refreshToken":"r"}"#).unwrap();
        assert_eq!(pair.access_token, "a");
        assert_eq!(pair.refresh_token.as_deref(), Some("r"));

        let pair: TokenPair = serde_json::from_str(r#"{"accessToken":"a"}"#).unwrap();
        assert_eq!(pair.refresh_token, None);
    }
}
