//! Shared application state for all routes.

use crate::model::NetworkModel;
use crate::registry::EndpointRegistry;
use crate::settings::Settings;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub model: Arc<NetworkModel>,
    pub registry: Arc<EndpointRegistry>,
    pub settings: Arc<Settings>,
}
