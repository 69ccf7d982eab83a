//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AuthGateway, CatalogueCommand, CatalogueQuery, ReviewLedger};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Signup, login, and bearer token resolution.
    pub auth: Arc<dyn AuthGateway>,
    /// Public catalogue read path.
    pub catalogue: Arc<dyn CatalogueQuery>,
    /// Authenticated catalogue mutation.
    pub catalogue_command: Arc<dyn CatalogueCommand>,
    /// Owner-checked review operations.
    pub reviews: Arc<dyn ReviewLedger>,
}

impl HttpState {
    /// Bundle the driving ports for handler injection.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::{
    ///     FixtureAuthGateway, FixtureCatalogueQuery, FixtureReviewLedger,
    /// };
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureAuthGateway),
    ///     Arc::new(FixtureCatalogueQuery),
    ///     Arc::new(FixtureCatalogueQuery),
    ///     Arc::new(FixtureReviewLedger),
    /// );
    /// let _auth = state.auth.clone();
    /// ```
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        catalogue: Arc<dyn CatalogueQuery>,
        catalogue_command: Arc<dyn CatalogueCommand>,
        reviews: Arc<dyn ReviewLedger>,
    ) -> Self {
        Self {
            auth,
            catalogue,
            catalogue_command,
            reviews,
        }
    }
}
