//! JSON envelope returned by the booking API.
//!
//! Every API response, success or failure, carries a `popup` the front end
//! shows as-is; failures from validation also carry per-field `errors`.

use serde::Serialize;

use crate::validation::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: PopupKind,
}

impl Popup {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: PopupKind::Success,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: PopupKind::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub popup: Popup,
}

impl ApiResponse {
    pub fn ok(popup: Popup) -> Self {
        Self {
            success: true,
            errors: None,
            popup,
        }
    }

    pub fn failed(popup: Popup) -> Self {
        Self {
            success: false,
            errors: None,
            popup,
        }
    }

    pub fn invalid(errors: FieldErrors, popup: Popup) -> Self {
        Self {
            success: false,
            errors: Some(errors),
            popup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let body = serde_json::to_value(ApiResponse::ok(Popup::success("Ok", "Feito"))).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "popup": { "title": "Ok", "message": "Feito", "type": "success" }
            })
        );
    }

    #[test]
    fn test_failure_omits_errors_when_absent() {
        let body = serde_json::to_value(ApiResponse::failed(Popup::error("Erro", "x"))).unwrap();
        assert!(body.get("errors").is_none());
        assert_eq!(body["popup"]["type"], "error");
    }
}
