use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use perch_types::Error;

use crate::error::ApiError;

/// The session token, relocated from the reference surface's payload
/// field to a bearer `Authorization` header. A missing or malformed
/// header is the same access failure as an unknown token.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError(Error::access("token invalid")))?;

        Ok(BearerToken(bearer.token().to_string()))
    }
}
