//! Router assembly and server startup.

use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        routing::{get, post},
    },
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::info,
};

use postwright_browser::EditorService;

use crate::routes;

/// Shared app state.
#[derive(Clone)]
pub struct AppState {
    pub editor: Arc<EditorService>,
    /// Truncation limit for titles derived from the body's first line.
    pub title_max_chars: usize,
}

/// Build the API router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/post-to-naver", post(routes::post_to_naver))
        .route("/current-body", get(routes::current_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn run(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        postwright_config::{Credentials, EditorConfig},
        secrecy::Secret,
    };

    use super::*;

    #[test]
    fn app_builds_with_fresh_state() {
        let credentials = Credentials {
            id: "writer".into(),
            password: Secret::new("pw".into()),
        };
        let state = AppState {
            editor: Arc::new(EditorService::new(EditorConfig::default(), credentials)),
            title_max_chars: 30,
        };
        // No browser is launched until the first edit request.
        let _app = build_app(state);
    }
}
