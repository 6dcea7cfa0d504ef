use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{StatusCode, header::CONTENT_TYPE},
};

use crate::GroceryError;
use crate::patch::DecodeError;

/// Raw JSON request body, buffered under the router's body limit.
///
/// Decoding against an entity shape happens later in the patch pipeline;
/// this extractor only enforces the size limit and a JSON content type when
/// one is declared.
pub struct JsonPayload(pub Bytes);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = GroceryError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ct) = req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
            && !ct.starts_with("application/json")
        {
            return Err(DecodeError::Malformed(format!("unsupported content type `{ct}`")).into());
        }

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                GroceryError::PayloadTooLarge
            } else {
                DecodeError::Malformed(rejection.body_text()).into()
            }
        })?;
        Ok(JsonPayload(body))
    }
}
