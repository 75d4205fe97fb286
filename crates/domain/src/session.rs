//! Session-scoped cart storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::SessionId;
use tokio::sync::RwLock;

use crate::cart::Cart;

/// Per-session key-value storage for the cart.
///
/// A cart belongs to exactly one session and is never shared across
/// sessions. `take_cart` is the claim-and-clear primitive the checkout
/// commit relies on: of two concurrent confirms, only one can observe a
/// non-empty cart.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session's cart, or an empty cart if none was stored.
    async fn get_cart(&self, session: SessionId) -> Cart;

    /// Stores the session's cart, replacing any previous value.
    async fn put_cart(&self, session: SessionId, cart: Cart);

    /// Atomically removes and returns the session's cart.
    async fn take_cart(&self, session: SessionId) -> Cart;
}

/// In-memory session store.
///
/// Carts live for the life of the process; session expiry is handled by
/// the external session layer dropping its ids.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    carts: Arc<RwLock<HashMap<SessionId, Cart>>>,
}

impl InMemorySessionStore {
    /// Creates a new empty session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_cart(&self, session: SessionId) -> Cart {
        self.carts
            .read()
            .await
            .get(&session)
            .cloned()
            .unwrap_or_default()
    }

    async fn put_cart(&self, session: SessionId, cart: Cart) {
        self.carts.write().await.insert(session, cart);
    }

    async fn take_cart(&self, session: SessionId) -> Cart {
        self.carts
            .write()
            .await
            .remove(&session)
            .unwrap_or_default()
    }
}
