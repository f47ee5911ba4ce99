//! REST/WebSocket surface over one engine.
//!
//! Used by the binary and by integration tests. The engine is single-writer;
//! HTTP handlers serialize through a mutex. Admission timestamps are
//! assigned engine-side (`last_timestamp + 1`) because HTTP callers have no
//! coherent clock. `/ws/trades` streams published trade events to every
//! connected client.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::engine::MatchingEngine;
use crate::execution::TradeEvent;
use crate::order::Order;
use crate::publisher::BroadcastTradePublisher;
use crate::types::{OrderId, OrderType, Side};

/// Shared app state: one engine per process plus the trade feed it publishes
/// to.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<MatchingEngine>>,
    trade_feed: BroadcastTradePublisher,
}

impl AppState {
    pub(crate) fn subscribe_trades(&self) -> broadcast::Receiver<TradeEvent> {
        self.trade_feed.subscribe()
    }
}

/// Builds shared app state with the broadcast publisher attached.
pub fn create_app_state() -> AppState {
    let trade_feed = BroadcastTradePublisher::new(64);
    let mut engine = MatchingEngine::new();
    engine.set_trade_publisher(Some(Box::new(trade_feed.clone())));
    AppState {
        engine: Arc::new(Mutex::new(engine)),
        trade_feed,
    }
}

/// Builds the router with the given state.
pub fn create_router_with_state(state: AppState) -> Router<()> {
    Router::new()
        .route("/health", get(health))
        .route("/orders", post(submit_order))
        .route("/orders/cancel", post(cancel_order))
        .route("/bbo", get(bbo))
        .route("/depth", get(depth))
        .route("/trades", get(trades))
        .route("/ws/trades", get(ws_trades))
        .layer(Extension(state))
}

/// Convenience for tests: fresh state + router.
pub fn create_router() -> Router<()> {
    create_router_with_state(create_app_state())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[derive(serde::Deserialize)]
struct SubmitRequest {
    user_id: String,
    order_id: String,
    side: Side,
    order_type: OrderType,
    #[serde(default)]
    price: Option<Decimal>,
    quantity: u64,
}

async fn submit_order(
    Extension(state): Extension<AppState>,
    Json(body): Json<SubmitRequest>,
) -> Response {
    let mut guard = state.engine.lock().expect("lock");
    let timestamp = guard.last_timestamp() + 1;
    let order = {
        match (body.order_type, body.price) {
            (OrderType::Market, _) => Order::market(
                body.user_id.as_str(),
                body.order_id.as_str(),
                body.side,
                body.quantity,
                timestamp,
            ),
            (OrderType::Limit, Some(price)) => Order::limit(
                body.user_id.as_str(),
                body.order_id.as_str(),
                body.side,
                price,
                body.quantity,
                timestamp,
            ),
            (OrderType::Ioc, Some(price)) => Order::ioc(
                body.user_id.as_str(),
                body.order_id.as_str(),
                body.side,
                price,
                body.quantity,
                timestamp,
            ),
            (OrderType::Fok, Some(price)) => Order::fok(
                body.user_id.as_str(),
                body.order_id.as_str(),
                body.side,
                price,
                body.quantity,
                timestamp,
            ),
            (_, None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": "limit price required" })),
                )
                    .into_response()
            }
        }
    };

    match guard.process_order(order) {
        Ok(execution) => (StatusCode::OK, Json(execution)).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(serde::Deserialize)]
struct CancelRequest {
    order_id: String,
}

async fn cancel_order(
    Extension(state): Extension<AppState>,
    Json(body): Json<CancelRequest>,
) -> Response {
    let mut guard = state.engine.lock().expect("lock");
    let cancelled = guard.cancel_order(&OrderId(body.order_id));
    #[derive(serde::Serialize)]
    struct Out {
        cancelled: bool,
    }
    (StatusCode::OK, Json(Out { cancelled })).into_response()
}

async fn bbo(Extension(state): Extension<AppState>) -> Response {
    let guard = state.engine.lock().expect("lock");
    (StatusCode::OK, Json(guard.bbo())).into_response()
}

#[derive(serde::Deserialize)]
struct DepthParams {
    #[serde(default = "default_depth")]
    levels: usize,
}

fn default_depth() -> usize {
    10
}

async fn depth(
    Extension(state): Extension<AppState>,
    Query(params): Query<DepthParams>,
) -> Response {
    let guard = state.engine.lock().expect("lock");
    (StatusCode::OK, Json(guard.l2_snapshot(params.levels))).into_response()
}

async fn trades(Extension(state): Extension<AppState>) -> Response {
    let guard = state.engine.lock().expect("lock");
    (StatusCode::OK, Json(guard.trades().to_vec())).into_response()
}

/// WebSocket trade feed: forwards every published trade event as one JSON
/// text frame, in execution order.
async fn ws_trades(
    Extension(state): Extension<AppState>,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket| handle_trades_socket(state, socket))
}

async fn handle_trades_socket(state: AppState, mut socket: WebSocket) {
    let mut rx = state.subscribe_trades();
    loop {
        tokio::select! {
            res = rx.recv() => {
                match res {
                    Ok(event) => {
                        if let Ok(json) = serde_json::to_string(&event) {
                            if socket.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = socket.recv() => match msg {
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }
}
