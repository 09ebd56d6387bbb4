use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::api::dto::{GrantPointsRequest, OpenAccountRequest};
use crate::api::error::ApiResult;
use crate::api::extract::ActingRole;
use crate::api::AppState;
use crate::domain::account::Address;

pub async fn open(state: web::Data<AppState>, body: web::Json<OpenAccountRequest>) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let account = state.accounts.open(body.display_name, body.starting_points).await?;
    Ok(HttpResponse::Created().json(account))
}

pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let account = state.accounts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(account))
}

pub async fn set_address(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<Address>,
) -> ApiResult<HttpResponse> {
    let account = state
        .accounts
        .set_shipping_address(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(account))
}

pub async fn grant_points(
    state: web::Data<AppState>,
    role: ActingRole,
    path: web::Path<Uuid>,
    body: web::Json<GrantPointsRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let account = state
        .accounts
        .grant_points(role.0, path.into_inner(), body.amount, body.note)
        .await?;
    Ok(HttpResponse::Ok().json(account))
}

pub async fn list_orders(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let orders = state.ledger.list_orders_for_account(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}
