use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    ListParams, PageResponse,
};
use crate::{
    documents::money,
    errors::{ApiError, ServiceError},
    handlers::AppState,
    models::{BomInput, BomMaterialInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Creates the router for BOM endpoints
pub fn bom_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_bom).get(list_boms))
        .route("/:id", get(get_bom).put(update_bom).delete(delete_bom))
        .route("/:id/advance", post(advance_bom))
        .route("/:id/overview", get(bom_overview))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BomRequest {
    #[validate(length(min = 1, message = "id_product is required"))]
    pub id_product: String,
    pub product_name: Option<String>,
    pub product_reference: Option<String>,
    /// Batch size the material quantities are given for
    #[serde(default = "default_batch_quantity")]
    #[validate(custom = "crate::documents::money::validate_decimal")]
    pub quantity: String,
    #[serde(default)]
    #[validate]
    pub materials: Vec<BomMaterialRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BomMaterialRequest {
    #[validate(length(min = 1, message = "id_material is required"))]
    pub id_material: String,
    pub material_name: Option<String>,
    #[serde(alias = "qty")]
    #[validate(custom = "crate::documents::money::validate_decimal")]
    pub quantity: String,
    pub unit: Option<String>,
}

fn default_batch_quantity() -> String {
    "1".to_string()
}

impl BomRequest {
    fn into_input(self) -> Result<BomInput, ServiceError> {
        let materials = self
            .materials
            .into_iter()
            .map(|material| {
                Ok(BomMaterialInput {
                    quantity: money::parse_quantity("quantity", &material.quantity)?,
                    material_id: material.id_material,
                    material_name: material.material_name,
                    unit: material.unit,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(BomInput {
            quantity: money::parse_quantity("quantity", &self.quantity)?,
            product_id: self.id_product,
            product_name: self.product_name,
            product_reference: self.product_reference,
            materials,
        })
    }
}

/// Create a new BOM
async fn create_bom(
    State(state): State<AppState>,
    Json(payload): Json<BomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = payload.into_input().map_err(map_service_error)?;

    let bom = state
        .services
        .boms
        .create(input)
        .await
        .map_err(map_service_error)?;

    info!("BOM created: {}", bom.id);
    Ok(created_response(bom))
}

async fn list_boms(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let boms = state
        .services
        .boms
        .list(params.page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PageResponse::new(boms, params.page)))
}

async fn get_bom(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bom = state
        .services
        .boms
        .get(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(bom))
}

/// Replace a BOM's header and material list
async fn update_bom(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<BomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = payload.into_input().map_err(map_service_error)?;

    let bom = state
        .services
        .boms
        .update(&id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(bom))
}

async fn advance_bom(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bom = state
        .services
        .boms
        .advance_status(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(bom))
}

async fn delete_bom(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .boms
        .delete(&id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

async fn bom_overview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = state
        .services
        .boms
        .overview(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(overview))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn bom_body_accepts_qty_alias_and_defaults_batch_to_one() {
        let payload: BomRequest = serde_json::from_str(
            r#"{"id_product":"PRF-00001","materials":[{"id_material":"MTR-00001","qty":"2.5"}]}"#,
        )
        .unwrap();
        assert!(validate_input(&payload).is_ok());

        let input = payload.into_input().unwrap();
        assert_eq!(input.quantity, dec!(1));
        assert_eq!(input.materials[0].quantity, dec!(2.5));
        assert_eq!(input.materials[0].material_id, "MTR-00001");
    }

    #[test]
    fn nested_material_errors_fail_validation() {
        let payload: BomRequest = serde_json::from_str(
            r#"{"id_product":"PRF-00001","materials":[{"id_material":"","quantity":"x"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            validate_input(&payload),
            Err(ApiError::ValidationError(_))
        ));
    }
}
