use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
};

use corporativo_sedes::{CreateSedeRequest, UpdateSedeRequest};

use crate::app::dto::{self, ApiResponse, ListQuery};
use crate::app::errors::service_error_to_response;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sedes).post(create_sede))
        .route(
            "/:id",
            get(get_sede)
                .put(update_sede)
                .patch(update_sede)
                .delete(delete_sede),
        )
}

pub async fn create_sede(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Response {
    let req: CreateSedeRequest = match dto::parse_body(&body) {
        Ok(req) => req,
        Err(res) => return res,
    };
    match services.sedes.create(req).await {
        Ok(sede) => ApiResponse::ok(sede)
            .with_message("Sede creada exitosamente")
            .into_response(),
        Err(e) => service_error_to_response(e, "Error al crear la sede"),
    }
}

pub async fn get_sede(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    match services.sedes.get(&id).await {
        Ok(sede) => ApiResponse::ok(sede).into_response(),
        Err(e) => service_error_to_response(e, "Error al obtener la sede"),
    }
}

pub async fn list_sedes(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let params = match query.into_params() {
        Ok(p) => p,
        Err(res) => return res,
    };
    match services.sedes.list(params).await {
        Ok(page) => ApiResponse::ok(page).into_response(),
        Err(e) => service_error_to_response(e, "Error al listar las sedes"),
    }
}

/// `GET /empresas/:id/sedes`
pub async fn list_sedes_by_empresa(
    Extension(services): Extension<Arc<AppServices>>,
    Path(empresa_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let params = match query.into_params() {
        Ok(p) => p,
        Err(res) => return res,
    };
    match services.sedes.list_by_empresa(&empresa_id, params).await {
        Ok(page) => ApiResponse::ok(page).into_response(),
        Err(e) => service_error_to_response(e, "Error al listar las sedes de la empresa"),
    }
}

pub async fn update_sede(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let req: UpdateSedeRequest = match dto::parse_body(&body) {
        Ok(req) => req,
        Err(res) => return res,
    };
    match services.sedes.update(&id, req).await {
        Ok(sede) => ApiResponse::ok(sede)
            .with_message("Sede actualizada exitosamente")
            .into_response(),
        Err(e) => service_error_to_response(e, "Error al actualizar la sede"),
    }
}

pub async fn delete_sede(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    match services.sedes.delete(&id).await {
        Ok(()) => ApiResponse::ok(())
            .with_message("Sede eliminada exitosamente")
            .into_response(),
        Err(e) => service_error_to_response(e, "Error al eliminar la sede"),
    }
}
