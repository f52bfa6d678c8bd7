//! Handlers for the `/notifications` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gridfund_core::error::CoreError;
use gridfund_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use gridfund_core::types::DbId;
use gridfund_db::models::notification::Notification;
use gridfund_db::repositories::NotificationRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::NotificationListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notifications
///
/// List the authenticated user's notifications, newest first.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationListParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        user.user_id,
        params.unread_only,
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// Unread-count payload.
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let unread = NotificationRepo::unread_count(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { unread },
    }))
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    user: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let updated = NotificationRepo::mark_read(&state.pool, notification_id, user.user_id).await?;
    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }))
    }
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(user: AuthUser, State(state): State<AppState>) -> AppResult<StatusCode> {
    NotificationRepo::mark_all_read(&state.pool, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
