//! Administrative handlers.

use axum::extract::{Path, State};
use axum::Json;
use promptcademy_core::error::CoreError;
use promptcademy_core::roles::is_valid_plan;
use promptcademy_core::types::DbId;
use promptcademy_db::models::user::UserResponse;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::auth::UserBody;
use crate::middleware::rbac::RequireAdmin;
use crate::response::OkResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/plan`.
#[derive(Debug, Deserialize)]
pub struct SetPlanRequest {
    pub plan: String,
}

/// PUT /admin/users/{id}/plan
///
/// Set a user's plan (`free` or `paid`).
pub async fn set_plan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    AppJson(input): AppJson<SetPlanRequest>,
) -> AppResult<Json<OkResponse<UserBody>>> {
    let plan = input.plan.trim();
    if !is_valid_plan(plan) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown plan '{plan}'. Expected one of: free, paid"
        ))));
    }

    let user = state
        .store
        .update_plan(user_id, plan)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    tracing::info!(admin_id = admin.user_id, user_id, plan, "Updated user plan");

    Ok(Json(OkResponse::new(UserBody {
        user: UserResponse::from(&user),
    })))
}
