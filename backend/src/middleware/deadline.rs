//! Request deadline middleware.
//!
//! The upstream service this code replaces had no timeout semantics at all; a
//! stuck persistence call could hold a request open indefinitely. Every
//! request is therefore raced against a bounded deadline, and callers see a
//! 503 with the standard error envelope when it elapses. Dropping the handler
//! future cancels any in-flight work.

use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error as DomainError;

/// Middleware bounding the wall-clock time a request may take.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use actix_web::App;
/// use backend::middleware::deadline::Deadline;
///
/// let app = App::new().wrap(Deadline::new(Duration::from_secs(30)));
/// ```
#[derive(Clone, Copy)]
pub struct Deadline {
    timeout: Duration,
}

impl Deadline {
    /// Create a deadline middleware with the given per-request budget.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Deadline
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = DeadlineMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(DeadlineMiddleware {
            service,
            timeout: self.timeout,
        }))
    }
}

/// Service wrapper produced by [`Deadline`].
///
/// Applications should not use this type directly.
pub struct DeadlineMiddleware<S> {
    service: S,
    timeout: Duration,
}

impl<S, B> Service<ServiceRequest> for DeadlineMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let timeout = self.timeout;
        let path = req.path().to_owned();
        let fut = self.service.call(req);

        Box::pin(async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    warn!(path = %path, timeout_ms = timeout.as_millis(), "request deadline exceeded");
                    Err(DomainError::service_unavailable("request deadline exceeded").into())
                }
            }
        })
    }
}
