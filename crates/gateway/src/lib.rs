//! HTTP boundary for the posting service.
//!
//! Three routes: `GET /health`, `POST /post-to-naver`, `GET /current-body`.
//! Requests are validated here, before anything touches the browser; editing
//! failures map deterministically to 400 / 404 / 500.

pub mod routes;
pub mod server;

pub use {
    routes::{ApiError, EditOp, PostRequest},
    server::{AppState, build_app, run},
};
