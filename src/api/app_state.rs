use std::sync::Arc;

use crate::observability::ObservabilityState;
use crate::security::Authenticator;
use crate::tutor::TutorSystem;

/// Application state containing all shared services
#[derive(Clone)]
pub struct AppState {
    /// Tutor system facade
    pub tutor: Arc<TutorSystem>,
    /// Metrics and health state
    pub observability: Arc<ObservabilityState>,
    /// API key authenticator
    pub authenticator: Arc<dyn Authenticator>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tutor", &"Arc<TutorSystem>")
            .field("observability", &"Arc<ObservabilityState>")
            .field("authenticator", &"Arc<dyn Authenticator>")
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        tutor: Arc<TutorSystem>,
        observability: Arc<ObservabilityState>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            tutor,
            observability,
            authenticator,
        }
    }
}
