//! Trade publishers: fan-out of [`TradeEvent`]s to downstream consumers.
//!
//! The engine hands each event to the attached publisher synchronously,
//! within the same dispatch that produced it. Publishers must never call
//! back into the engine, and must swallow their own delivery failures;
//! `publish` is infallible by signature.

use crate::execution::TradeEvent;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::info;

/// Receives immutable trade events in execution order.
pub trait TradePublisher: Send + Sync {
    fn publish(&self, event: &TradeEvent);
}

/// Collects events in memory. Clones share the same backing buffer, so a
/// test can keep one handle and hand the other to the engine.
#[derive(Clone, Default)]
pub struct InMemoryTradePublisher {
    events: Arc<Mutex<Vec<TradeEvent>>>,
}

impl InMemoryTradePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TradeEvent> {
        self.events.lock().expect("lock").clone()
    }

    pub fn clear(&self) {
        self.events.lock().expect("lock").clear();
    }
}

impl TradePublisher for InMemoryTradePublisher {
    fn publish(&self, event: &TradeEvent) {
        self.events.lock().expect("lock").push(event.clone());
    }
}

/// Emits one structured log line per trade.
pub struct LogTradePublisher;

impl TradePublisher for LogTradePublisher {
    fn publish(&self, event: &TradeEvent) {
        info!(
            buy = %event.buy_order_id,
            sell = %event.sell_order_id,
            price = %event.price,
            quantity = event.quantity,
            "trade"
        );
    }
}

/// Fans events out over a `tokio::sync::broadcast` channel, e.g. to
/// WebSocket market-data clients. Send errors (no subscriber connected) are
/// ignored.
#[derive(Clone)]
pub struct BroadcastTradePublisher {
    tx: broadcast::Sender<TradeEvent>,
}

impl BroadcastTradePublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TradeEvent> {
        self.tx.subscribe()
    }
}

impl TradePublisher for BroadcastTradePublisher {
    fn publish(&self, event: &TradeEvent) {
        let _ = self.tx.send(event.clone());
    }
}
