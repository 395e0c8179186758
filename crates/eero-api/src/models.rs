// Wire shapes shared by every response: the `{meta, data}` envelope and
// the login payload. Entity payloads stay as `serde_json::Value` here;
// typed mapping happens in `eero-core`.

use serde::Deserialize;
use serde_json::Value;

/// `{ "meta": { "code": 200, "error": null }, "data": ... }`
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub server_time: Option<String>,
}

/// `data` of a successful `POST login`.
#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub user_token: String,
}

/// Best-effort extraction of `meta.error` from an error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|e| e.meta.error)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn envelope_tolerates_missing_meta() {
        let env: Envelope = serde_json::from_str(r#"{"data": [1, 2]}"#).unwrap();
        assert_eq!(env.meta.code, None);
        assert_eq!(env.data, serde_json::json!([1, 2]));
    }

    #[test]
    fn extracts_meta_error() {
        let body = r#"{"meta":{"code":404,"error":"error.network.not_found"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("error.network.not_found"));
        assert_eq!(error_message("<html>"), None);
    }
}
