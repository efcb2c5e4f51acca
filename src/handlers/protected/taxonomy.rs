// Shared by /stages, /roles and /importances. The router binds the kind when
// it registers each family.
use axum::extract::State;
use uuid::Uuid;

use crate::api::taxonomy::{
    CreateTaxonomyItemRequest, ReorderRequest, TaxonomyItemResponse, UpdateTaxonomyItemRequest,
};
use crate::middleware::{ApiResponse, ApiResult, AppJson, AppPath, AuthUser};
use crate::state::AppState;
use crate::types::TaxonomyKind;

pub async fn list(
    kind: TaxonomyKind,
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<Vec<TaxonomyItemResponse>> {
    let items = state.taxonomy.list(&user, kind, project_id).await?;
    Ok(ApiResponse::success(items))
}

pub async fn create(
    kind: TaxonomyKind,
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
    AppJson(req): AppJson<CreateTaxonomyItemRequest>,
) -> ApiResult<TaxonomyItemResponse> {
    let item = state.taxonomy.create(&user, kind, project_id, req).await?;
    Ok(ApiResponse::created(item))
}

pub async fn get(
    kind: TaxonomyKind,
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, item_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<TaxonomyItemResponse> {
    let item = state.taxonomy.get(&user, kind, project_id, item_id).await?;
    Ok(ApiResponse::success(item))
}

pub async fn update(
    kind: TaxonomyKind,
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, item_id)): AppPath<(Uuid, Uuid)>,
    AppJson(req): AppJson<UpdateTaxonomyItemRequest>,
) -> ApiResult<TaxonomyItemResponse> {
    let item = state.taxonomy.update(&user, kind, project_id, item_id, req).await?;
    Ok(ApiResponse::success(item))
}

pub async fn delete(
    kind: TaxonomyKind,
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, item_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<()> {
    state.taxonomy.delete(&user, kind, project_id, item_id).await?;
    Ok(ApiResponse::no_content())
}

/// PUT .../order - applies every pair or none
pub async fn reorder(
    kind: TaxonomyKind,
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
    AppJson(req): AppJson<ReorderRequest>,
) -> ApiResult<Vec<TaxonomyItemResponse>> {
    let items = state.taxonomy.reorder(&user, kind, project_id, req).await?;
    Ok(ApiResponse::success(items))
}
