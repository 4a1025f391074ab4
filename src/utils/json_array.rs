use axum::{
    body::Bytes,
    extract::{FromRef, FromRequest, Request},
};
use encoding_rs::Encoding;
use serde::de::DeserializeOwned;

use super::error::AppError;
use crate::config::BodyEncoding;

/// Request body that is a bare JSON array, e.g. `[{"id": 1, "count": 2}]`.
///
/// The raw bytes are decoded with the configured [`BodyEncoding`] before
/// parsing; any decoding or JSON failure becomes [`AppError::Parse`].
#[derive(Debug, Clone, Default)]
pub struct PlainListJson<T>(pub Vec<T>);

impl<T, S> FromRequest<S> for PlainListJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    BodyEncoding: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let BodyEncoding(encoding) = BodyEncoding::from_ref(state);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Parse(rejection.body_text()))?;

        decode_list(&bytes, encoding).map(PlainListJson)
    }
}

pub fn decode_list<T>(bytes: &[u8], encoding: &'static Encoding) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned,
{
    let text = encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| AppError::Parse(format!("body is not valid {}", encoding.name())))?;

    serde_json::from_str(&text).map_err(|e| AppError::Parse(e.to_string()))
}
