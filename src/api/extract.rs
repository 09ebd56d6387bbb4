use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::account::Role;
use super::error::ApiError;

pub const ROLE_HEADER: &str = "X-Actor-Role";

/// Caller role asserted by the upstream auth layer. A request without the
/// header acts as a buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingRole(pub Role);

impl ActingRole {
    fn from_headers(req: &HttpRequest) -> Result<Self, ApiError> {
        let Some(value) = req.headers().get(ROLE_HEADER) else {
            return Ok(ActingRole(Role::Buyer));
        };

        let value = value
            .to_str()
            .map_err(|_| ApiError::BadRequest(format!("{ROLE_HEADER} is not valid text")))?;
        value
            .parse::<Role>()
            .map(ActingRole)
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

impl FromRequest for ActingRole {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}
