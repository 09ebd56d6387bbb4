use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::api::dto::{
    CancelRequest, CheckoutRequest, CheckoutResponse, OrderQueueQuery, QuoteRequest, SalesSummaryResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ActingRole;
use crate::api::AppState;
use crate::domain::order::{OrderStatus, PaymentMethod};
use crate::ledger::{require_operator, Cart};

pub async fn checkout(state: web::Data<AppState>, body: web::Json<CheckoutRequest>) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let cart: Cart = body.lines.into_iter().collect();

    let orders = state
        .ledger
        .checkout(body.account_id, &cart, body.payment_method)
        .await?;
    Ok(HttpResponse::Created().json(CheckoutResponse { orders }))
}

/// Unit prices, line totals and available stock for a cart
pub async fn quote(state: web::Data<AppState>, body: web::Json<QuoteRequest>) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let cart: Cart = body.lines.into_iter().collect();

    let lines = state
        .ledger
        .catalog()
        .quote(&cart, body.payment_method.currency())
        .await?;
    Ok(HttpResponse::Ok().json(lines))
}

pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let order = state.ledger.get_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn queue(
    state: web::Data<AppState>,
    role: ActingRole,
    query: web::Query<OrderQueueQuery>,
) -> ApiResult<HttpResponse> {
    require_operator(role.0, "view the order queue")?;

    let query = query.into_inner();
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let method = query
        .method
        .as_deref()
        .map(str::parse::<PaymentMethod>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let orders = state.ledger.list_orders_by_status_and_method(status, method).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn ship(state: web::Data<AppState>, role: ActingRole, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let order = state.fulfillment.ship(path.into_inner(), role.0).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn deliver(state: web::Data<AppState>, role: ActingRole, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let order = state.fulfillment.deliver(path.into_inner(), role.0).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// The body is optional; an empty one cancels with no reason, a malformed
/// one is rejected before anything changes
pub async fn cancel(
    state: web::Data<AppState>,
    role: ActingRole,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let reason = parse_cancel_body(&body)?.reason;
    let order = state.fulfillment.cancel(path.into_inner(), role.0, reason).await?;
    Ok(HttpResponse::Ok().json(order))
}

fn parse_cancel_body(body: &[u8]) -> Result<CancelRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CancelRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid cancel body: {e}")))
}

pub async fn sales_summary(state: web::Data<AppState>, role: ActingRole) -> ApiResult<HttpResponse> {
    require_operator(role.0, "view sales")?;

    let summary = state.ledger.sales_summary().await?;
    Ok(HttpResponse::Ok().json(SalesSummaryResponse::from(summary)))
}
