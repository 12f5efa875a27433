use axum::{extract::State, response::IntoResponse, Json};

use crate::auth::AuthUser;
use crate::db::queries;
use crate::error::AppError;
use crate::AppState;

pub async fn list_wallets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let wallets = queries::list_wallets(&state.db, user_id).await?;
    Ok(Json(wallets))
}
