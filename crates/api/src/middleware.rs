use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use storefront_core::TenantId;

use crate::context::TenantContext;

/// Header carrying the tenant the request acts for.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Resolve the tenant from `X-Tenant-Id` and attach a [`TenantContext`].
pub async fn tenant_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let tenant_id = extract_tenant(req.headers())?;

    req.extensions_mut().insert(TenantContext::new(tenant_id));

    Ok(next.run(req).await)
}

fn extract_tenant(headers: &HeaderMap) -> Result<TenantId, StatusCode> {
    let header = headers.get(TENANT_HEADER).ok_or(StatusCode::UNAUTHORIZED)?;
    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    header.parse::<TenantId>().map_err(|e| {
        tracing::debug!(error = %e, "rejected tenant header");
        StatusCode::UNAUTHORIZED
    })
}
