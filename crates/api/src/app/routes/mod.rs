use axum::Router;

pub mod empresas;
pub mod sedes;
pub mod system;

/// Router for the resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/empresas", empresas::router())
        .nest("/sedes", sedes::router())
}
