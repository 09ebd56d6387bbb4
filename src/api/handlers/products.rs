use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::api::dto::{RegisterProductRequest, RestockRequest};
use crate::api::error::ApiResult;
use crate::api::extract::ActingRole;
use crate::api::AppState;
use crate::domain::catalog::PriceList;

pub async fn register(
    state: web::Data<AppState>,
    role: ActingRole,
    body: web::Json<RegisterProductRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let product = state
        .catalog_admin
        .register(role.0, body.name, body.image_url, body.prices, body.stock)
        .await?;
    Ok(HttpResponse::Created().json(product))
}

pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let product = state.ledger.catalog().get_product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

pub async fn change_prices(
    state: web::Data<AppState>,
    role: ActingRole,
    path: web::Path<Uuid>,
    body: web::Json<PriceList>,
) -> ApiResult<HttpResponse> {
    let product = state
        .catalog_admin
        .change_prices(role.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(product))
}

pub async fn restock(
    state: web::Data<AppState>,
    role: ActingRole,
    path: web::Path<Uuid>,
    body: web::Json<RestockRequest>,
) -> ApiResult<HttpResponse> {
    let product = state
        .catalog_admin
        .restock(role.0, path.into_inner(), body.units)
        .await?;
    Ok(HttpResponse::Ok().json(product))
}
