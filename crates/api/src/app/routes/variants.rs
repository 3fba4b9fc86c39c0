use std::sync::Arc;

use axum::{Json, Router, extract::Extension, routing::post};

use storefront_catalog::{
    Attribute, Combination, IdentifierBase, IdentifierMode, SkuPolicy, VariantGenerator,
    apply_identifiers_to_all, slugify,
};

use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/preview", post(preview))
}

/// Regenerate the form's combinations for the posted selection and fill their
/// identifiers. Nothing is persisted.
pub async fn preview(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::VariantPreviewRequest>,
) -> Json<dto::VariantPreviewResponse> {
    let combinations = preview_combinations(body, &services.settings().sku_policy);
    Json(dto::VariantPreviewResponse {
        count: combinations.len(),
        combinations,
    })
}

fn preview_combinations(body: dto::VariantPreviewRequest, policy: &SkuPolicy) -> Vec<Combination> {
    let attributes = body.attributes.into_iter().map(Attribute::from).collect();

    let mut generator = VariantGenerator::new(attributes);
    generator.set_combinations(body.existing);
    generator.replace_selection(body.selection);

    let base_slug = if body.base.slug.trim().is_empty() {
        slugify(&body.base.product_name)
    } else {
        slugify(&body.base.slug)
    };
    let base = IdentifierBase {
        product_name: &body.base.product_name,
        sku: &body.base.sku,
        slug: &base_slug,
    };
    let mode = if body.regenerate {
        IdentifierMode::Regenerate
    } else {
        IdentifierMode::FillEmpty
    };

    apply_identifiers_to_all(generator.combinations_mut(), &base, policy, mode);

    tracing::debug!(
        count = generator.combinations().len(),
        regenerate = body.regenerate,
        "variant preview"
    );

    generator.combinations().to_vec()
}
