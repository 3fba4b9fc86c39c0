use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use storefront_catalog::{
    ArchiveProduct, CreateProduct, IdentifierMode, ProductCommand, ProductDocument, ProductId,
    RestoreProduct, UpdateProduct, assign_identifiers,
};
use storefront_core::AggregateId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).put(update_product))
        .route("/:id/archive", post(archive_product))
        .route("/:id/restore", post(restore_product))
        .route("/:id/events", get(product_events))
}

fn parse_product_id(id: &str) -> Result<ProductId, axum::response::Response> {
    id.parse::<AggregateId>()
        .map(ProductId::new)
        .map_err(|_| errors::invalid_id())
}

fn submitted_document(body: dto::ProductRequest, services: &AppServices) -> ProductDocument {
    let mut document = body.document;
    if body.regenerate_identifiers {
        assign_identifiers(
            &mut document,
            &services.settings().sku_policy,
            IdentifierMode::Regenerate,
        );
    }
    document
}

fn execute(
    services: &AppServices,
    tenant: TenantContext,
    product_id: ProductId,
    command: ProductCommand,
    status: StatusCode,
) -> axum::response::Response {
    match services.execute_product(tenant.tenant_id(), product_id, command) {
        Ok(rm) => (status, Json(rm)).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<dto::ProductRequest>,
) -> axum::response::Response {
    let product_id = ProductId::new(AggregateId::new());

    let cmd = ProductCommand::CreateProduct(CreateProduct {
        tenant_id: tenant.tenant_id(),
        product_id,
        document: submitted_document(body, &services),
        settings: services.settings().clone(),
        occurred_at: Utc::now(),
    });

    execute(&services, tenant, product_id, cmd, StatusCode::CREATED)
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ProductRequest>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = ProductCommand::UpdateProduct(UpdateProduct {
        tenant_id: tenant.tenant_id(),
        product_id,
        document: submitted_document(body, &services),
        settings: services.settings().clone(),
        occurred_at: Utc::now(),
    });

    execute(&services, tenant, product_id, cmd, StatusCode::OK)
}

pub async fn archive_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = ProductCommand::ArchiveProduct(ArchiveProduct {
        tenant_id: tenant.tenant_id(),
        product_id,
        settings: services.settings().clone(),
        occurred_at: Utc::now(),
    });

    execute(&services, tenant, product_id, cmd, StatusCode::OK)
}

pub async fn restore_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = ProductCommand::RestoreProduct(RestoreProduct {
        tenant_id: tenant.tenant_id(),
        product_id,
        settings: services.settings().clone(),
        occurred_at: Utc::now(),
    });

    execute(&services, tenant, product_id, cmd, StatusCode::OK)
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products_get(tenant.tenant_id(), &product_id) {
        Some(rm) => (StatusCode::OK, Json(rm)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    let items = services.products_list(tenant.tenant_id());
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn product_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.product_events(tenant.tenant_id(), product_id) {
        Ok(events) if events.is_empty() => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found")
        }
        Ok(events) => {
            let items = events
                .into_iter()
                .map(dto::EventSummary::from)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
