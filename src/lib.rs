//! Gridnet: electric distribution network API with dynamic SQL endpoints.

pub mod db;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod registry;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;

pub use db::{connect_pool, ensure_database_exists};
pub use error::AppError;
pub use migration::apply_migrations;
pub use model::{network_model, EntityDef, NetworkModel};
pub use registry::{EndpointRegistry, RegisteredEndpoint};
pub use routes::{common_routes, endpoint_routes, entity_routes};
pub use service::{CrudService, QueryService, RequestValidator};
pub use settings::Settings;
pub use state::AppState;
