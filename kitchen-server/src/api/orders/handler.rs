//! Order API Handlers

use axum::extract::{Path, State};
use serde::Deserialize;
use shared::order::{NewOrder, Order, OrderId, OrderStatus, PaymentMethod};
use shared::{ApiResponse, Json};

use crate::core::ServerState;
use crate::utils::{AppResult, ok};

type OrderResponse = AppResult<Json<ApiResponse<Order>>>;

/// Body for pay / payment-method
#[derive(Debug, Deserialize)]
pub struct PaymentMethodRequest {
    #[serde(alias = "paymentMethod", alias = "paid_by")]
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AdjustEtaRequest {
    #[serde(alias = "delta")]
    pub delta_minutes: i64,
}

pub async fn create(State(state): State<ServerState>, Json(input): Json<NewOrder>) -> OrderResponse {
    let order = state.orders.create(input).await?;
    Ok(ok(order))
}

pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<OrderId>) -> OrderResponse {
    let order = state.orders.fetch(id).await?;
    Ok(ok(order))
}

pub async fn mark_paid(
    State(state): State<ServerState>,
    Path(id): Path<OrderId>,
    Json(req): Json<PaymentMethodRequest>,
) -> OrderResponse {
    let method: PaymentMethod = req.payment_method.parse()?;
    let order = state.orders.mark_paid(id, method).await?;
    Ok(ok(order))
}

pub async fn change_payment_method(
    State(state): State<ServerState>,
    Path(id): Path<OrderId>,
    Json(req): Json<PaymentMethodRequest>,
) -> OrderResponse {
    let method: PaymentMethod = req.payment_method.parse()?;
    let order = state.orders.set_payment_method(id, method).await?;
    Ok(ok(order))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<OrderId>,
    Json(req): Json<StatusRequest>,
) -> OrderResponse {
    let status: OrderStatus = req.status.parse()?;
    let order = state.orders.mutate_status(id, status).await?;
    Ok(ok(order))
}

pub async fn adjust_eta(
    State(state): State<ServerState>,
    Path(id): Path<OrderId>,
    Json(req): Json<AdjustEtaRequest>,
) -> OrderResponse {
    let order = state.orders.adjust_eta(id, req.delta_minutes).await?;
    Ok(ok(order))
}

pub async fn cancel(State(state): State<ServerState>, Path(id): Path<OrderId>) -> OrderResponse {
    let order = state.orders.cancel(id).await?;
    Ok(ok(order))
}
