//! Request parsing, validation, and handlers for the posting API.

use {
    axum::{
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    },
    serde::Deserialize,
    serde_json::{Value, json},
};

use postwright_browser::EditorError;

use crate::server::AppState;

/// Fallback title when the body yields nothing to derive from
/// ("new post", matching what the editor shows for untitled drafts).
const UNTITLED: &str = "새 글";

/// Incoming posting request.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRequest {
    pub action: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub directive: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub replacement: Option<String>,
    /// Accepted for wire compatibility; the service holds a single session.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// A validated operation, ready to hand to the editing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Create { title: String, body: String },
    Append { replacement: String },
    Replace { target: String, replacement: String },
    Remove { target: String },
}

/// API failure, mapped deterministically to an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::NotFound(m) | Self::Internal(m) => m,
        }
    }
}

impl From<EditorError> for ApiError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Validation(m) => Self::Validation(m),
            EditorError::TargetNotFound => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Derive a title for `create`: the explicit one when given, otherwise the
/// first line of the body truncated to `max_chars`.
pub fn derive_title(title: Option<&str>, body: &str, max_chars: usize) -> String {
    if let Some(t) = title {
        let t = t.trim();
        if !t.is_empty() {
            return t.to_string();
        }
    }
    let first_line: String = body
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(max_chars)
        .collect();
    if first_line.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        first_line
    }
}

/// Validate a request into an [`EditOp`]. All validation failures are
/// detected here, before any UI interaction is attempted.
pub fn parse_request(req: &PostRequest, title_max_chars: usize) -> Result<EditOp, ApiError> {
    match req.action.as_str() {
        "create" => {
            let Some(body) = req.body.clone() else {
                return Err(ApiError::Validation("create requires a body".into()));
            };
            let title = derive_title(req.title.as_deref(), &body, title_max_chars);
            Ok(EditOp::Create { title, body })
        },
        "edit" => {
            let directive = req.directive.as_deref().unwrap_or_default().to_lowercase();
            match directive.as_str() {
                "append" => Ok(EditOp::Append {
                    replacement: req.replacement.clone().unwrap_or_default(),
                }),
                "replace" | "remove" => {
                    let target = req.target.clone().unwrap_or_default();
                    if target.is_empty() {
                        return Err(ApiError::Validation("target is empty".into()));
                    }
                    if directive == "replace" {
                        Ok(EditOp::Replace {
                            target,
                            replacement: req.replacement.clone().unwrap_or_default(),
                        })
                    } else {
                        Ok(EditOp::Remove { target })
                    }
                },
                other => Err(ApiError::Validation(format!("unknown directive: {other}"))),
            }
        },
        other => Err(ApiError::Validation(format!("invalid action type: {other}"))),
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn post_to_naver(
    State(state): State<AppState>,
    Json(req): Json<PostRequest>,
) -> Result<Json<Value>, ApiError> {
    let op = parse_request(&req, state.title_max_chars)?;
    match op {
        EditOp::Create { title, body } => {
            state.editor.create(&title, &body).await?;
            Ok(Json(json!({ "status": "created", "title": title })))
        },
        EditOp::Append { replacement } => {
            state.editor.append(&replacement).await?;
            Ok(Json(json!({ "status": "appended", "added": replacement })))
        },
        EditOp::Replace {
            target,
            replacement,
        } => {
            state.editor.replace(&target, &replacement).await?;
            Ok(Json(json!({
                "status": "replaced",
                "target": target,
                "replacement": replacement,
            })))
        },
        EditOp::Remove { target } => {
            state.editor.remove(&target).await?;
            Ok(Json(json!({ "status": "removed", "target": target })))
        },
    }
}

pub async fn current_body(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state.editor.current_body().await?;
    Ok(Json(json!({ "body": body })))
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: Value) -> PostRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn create_derives_title_from_first_body_line() {
        let req = request(json!({ "action": "create", "title": "", "body": "Hello\nWorld" }));
        let op = parse_request(&req, 30).unwrap();
        assert_eq!(
            op,
            EditOp::Create {
                title: "Hello".into(),
                body: "Hello\nWorld".into(),
            }
        );
    }

    #[test]
    fn create_without_body_is_rejected() {
        let req = request(json!({ "action": "create", "title": "T" }));
        let err = parse_request(&req, 30).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn explicit_title_is_kept_verbatim() {
        let req = request(json!({ "action": "create", "title": "My title", "body": "x" }));
        match parse_request(&req, 30).unwrap() {
            EditOp::Create { title, .. } => assert_eq!(title, "My title"),
            other => panic!("unexpected op: {other:?}"),
        }
    }

    #[test]
    fn derived_title_is_truncated_by_chars() {
        let body = "가나다라마바사아자차카타파하".repeat(4);
        let title = derive_title(None, &body, 30);
        assert_eq!(title.chars().count(), 30);
        assert!(body.starts_with(&title));
    }

    #[test]
    fn empty_body_falls_back_to_untitled() {
        assert_eq!(derive_title(None, "", 30), UNTITLED);
        assert_eq!(derive_title(Some("  "), "\n\n", 30), UNTITLED);
    }

    #[test]
    fn append_directive_parses() {
        let req = request(json!({
            "action": "edit", "directive": "append", "replacement": "More text"
        }));
        assert_eq!(
            parse_request(&req, 30).unwrap(),
            EditOp::Append {
                replacement: "More text".into()
            }
        );
    }

    #[test]
    fn replace_directive_parses() {
        let req = request(json!({
            "action": "edit", "directive": "replace", "target": "Hello", "replacement": "Hi"
        }));
        assert_eq!(
            parse_request(&req, 30).unwrap(),
            EditOp::Replace {
                target: "Hello".into(),
                replacement: "Hi".into(),
            }
        );
    }

    #[test]
    fn remove_directive_parses() {
        let req = request(json!({ "action": "edit", "directive": "remove", "target": "World " }));
        assert_eq!(
            parse_request(&req, 30).unwrap(),
            EditOp::Remove {
                target: "World ".into()
            }
        );
    }

    #[test]
    fn directive_matching_is_case_insensitive() {
        let req = request(json!({ "action": "edit", "directive": "APPEND" }));
        assert!(matches!(
            parse_request(&req, 30).unwrap(),
            EditOp::Append { .. }
        ));
    }

    #[test]
    fn unknown_directive_is_rejected() {
        let req = request(json!({ "action": "edit", "directive": "foo" }));
        let err = parse_request(&req, 30).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_directive_is_rejected() {
        let req = request(json!({ "action": "edit" }));
        assert!(parse_request(&req, 30).is_err());
    }

    #[test]
    fn empty_target_on_replace_is_rejected() {
        let req = request(json!({
            "action": "edit", "directive": "replace", "target": "", "replacement": "X"
        }));
        let err = parse_request(&req, 30).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_target_on_remove_is_rejected() {
        let req = request(json!({ "action": "edit", "directive": "remove" }));
        assert!(parse_request(&req, 30).is_err());
    }

    #[test]
    fn unknown_action_is_rejected() {
        let req = request(json!({ "action": "delete-everything" }));
        let err = parse_request(&req, 30).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn editor_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(EditorError::Validation("target is empty".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(EditorError::TargetNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(EditorError::NavigationTimeout("frame".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(EditorError::Auth("no field".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_keeps_underlying_message() {
        let err = ApiError::from(EditorError::SessionInit("chrome missing".into()));
        assert!(err.message().contains("chrome missing"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let resp = health().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
