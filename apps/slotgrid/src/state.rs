use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration. `config.grid` is the default grid for panels that
    /// do not bring their own.
    pub config: Config,
}
