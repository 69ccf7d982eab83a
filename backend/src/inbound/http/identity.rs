//! Bearer identity extraction for protected endpoints.
//!
//! Implements `FromRequest` for the domain's [`AuthenticatedUser`] capability:
//! a handler that lists it as a parameter cannot run without a verified
//! bearer token, and the resolved identity is the only caller identity the
//! domain will accept.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AuthenticatedUser, Error};
use crate::inbound::http::state::HttpState;

/// Authorization scheme expected on protected endpoints.
const BEARER_PREFIX: &str = "Bearer ";

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?
        .trim();
    if token.is_empty() {
        return Err(Error::unauthorized("missing bearer token"));
    }
    Ok(token.to_owned())
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("http state missing from app data"))?;
            let token = token?;
            state.auth.resolve_caller(&token).await
        })
    }
}
