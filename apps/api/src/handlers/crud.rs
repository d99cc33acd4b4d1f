//! List/get/create/update/delete written once over [`Resource`].

use axum::extract::State;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::listing::{run_query, ListQuery};
use crate::resource::Resource;
use crate::response::{ApiResponse, Created};
use crate::state::AppState;

/// GET /api/{resource}
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<ApiResponse<Vec<R>>, AppError> {
    state.simulate_latency().await;
    let request = query.parse(state.page_defaults())?;
    let rows = R::collection(&state.store).all().await;
    let page = run_query(rows, &request);
    debug!(
        "Listed {} page {}/{} ({} matching)",
        R::LABEL,
        page.current_page,
        page.total_pages,
        page.total_items
    );
    Ok(ApiResponse::paged(page))
}

/// GET /api/{resource}/:id
pub async fn get_one<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<R>, AppError> {
    state.simulate_latency().await;
    let record = R::collection(&state.store)
        .find(id)
        .await
        .ok_or_else(|| AppError::not_found(R::LABEL, id))?;
    Ok(ApiResponse::ok(record))
}

/// POST /api/{resource}
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    AppJson(input): AppJson<R::Create>,
) -> Result<Created<R>, AppError> {
    state.simulate_latency().await;
    let now = Utc::now();
    let record = R::from_create(input, Uuid::new_v4(), now);
    record.validate(now.date_naive())?;

    let collection = R::collection(&state.store);
    let _writes = collection.lock_writes().await;
    record.check_references(&state.store).await?;
    let record = collection.insert(record).await;
    info!("Created {} {}", R::LABEL, record.id());
    Ok(Created(ApiResponse::with_message(
        record,
        format!("{} created", R::LABEL),
    )))
}

/// PUT /api/{resource}/:id
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<R::Update>,
) -> Result<ApiResponse<R>, AppError> {
    state.simulate_latency().await;
    let collection = R::collection(&state.store);
    let _writes = collection.lock_writes().await;
    let mut record = collection
        .find(id)
        .await
        .ok_or_else(|| AppError::not_found(R::LABEL, id))?;

    let now = Utc::now();
    record.apply_update(patch, now);
    record.validate(now.date_naive())?;
    record.check_references(&state.store).await?;

    let record = collection
        .replace(record)
        .await
        .ok_or_else(|| AppError::not_found(R::LABEL, id))?;
    info!("Updated {} {id}", R::LABEL);
    Ok(ApiResponse::with_message(
        record,
        format!("{} updated", R::LABEL),
    ))
}

/// DELETE /api/{resource}/:id
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<R>, AppError> {
    state.simulate_latency().await;
    let removed = R::collection(&state.store)
        .remove(id)
        .await
        .ok_or_else(|| AppError::not_found(R::LABEL, id))?;
    info!("Deleted {} {id}", R::LABEL);
    Ok(ApiResponse::with_message(
        removed,
        format!("{} deleted", R::LABEL),
    ))
}
