use actix_web::{web, HttpResponse};

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;

pub async fn health(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    state
        .store
        .health_check()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "courtside-ledger"
    })))
}
