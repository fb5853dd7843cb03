//! Route handlers.

pub mod dashboard;
pub mod documents;
pub mod graph;
pub mod health;
pub mod session;

use axum::extract::FromRequest;
use serde::Serialize;

use crate::error::ApiError;

/// `Json` whose rejections come back as `ValidationError` bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// What a panel remembers about a request: its target plus the body.
#[derive(Serialize)]
pub(crate) struct Remembered<'a, S: Serialize, T: Serialize> {
    pub scope: &'a S,
    #[serde(flatten)]
    pub request: &'a T,
}
