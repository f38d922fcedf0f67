use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
};

use corporativo_empresas::{CreateEmpresaRequest, UpdateEmpresaRequest};

use crate::app::dto::{self, ApiResponse, ListQuery};
use crate::app::errors::service_error_to_response;
use crate::app::routes::sedes;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_empresas).post(create_empresa))
        .route(
            "/:id",
            get(get_empresa)
                .put(update_empresa)
                .patch(update_empresa)
                .delete(delete_empresa),
        )
        .route("/:id/sedes", get(sedes::list_sedes_by_empresa))
}

pub async fn create_empresa(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Response {
    let req: CreateEmpresaRequest = match dto::parse_body(&body) {
        Ok(req) => req,
        Err(res) => return res,
    };
    match services.empresas.create(req).await {
        Ok(empresa) => ApiResponse::ok(empresa)
            .with_message("Empresa creada exitosamente")
            .into_response(),
        Err(e) => service_error_to_response(e, "Error al crear la empresa"),
    }
}

pub async fn get_empresa(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    match services.empresas.get(&id).await {
        Ok(empresa) => ApiResponse::ok(empresa).into_response(),
        Err(e) => service_error_to_response(e, "Error al obtener la empresa"),
    }
}

pub async fn list_empresas(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let params = match query.into_params() {
        Ok(p) => p,
        Err(res) => return res,
    };
    match services.empresas.list(params).await {
        Ok(page) => ApiResponse::ok(page).into_response(),
        Err(e) => service_error_to_response(e, "Error al listar las empresas"),
    }
}

pub async fn update_empresa(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let req: UpdateEmpresaRequest = match dto::parse_body(&body) {
        Ok(req) => req,
        Err(res) => return res,
    };
    match services.empresas.update(&id, req).await {
        Ok(empresa) => ApiResponse::ok(empresa)
            .with_message("Empresa actualizada exitosamente")
            .into_response(),
        Err(e) => service_error_to_response(e, "Error al actualizar la empresa"),
    }
}

pub async fn delete_empresa(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    match services.empresas.delete(&id).await {
        Ok(()) => ApiResponse::ok(())
            .with_message("Empresa eliminada exitosamente")
            .into_response(),
        Err(e) => service_error_to_response(e, "Error al eliminar la empresa"),
    }
}
