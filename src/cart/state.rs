//! Menu and Cart State Management
//!
//! [`RestaurantStore`] owns one menu snapshot and one cart and applies every
//! transition to them. [`AppState`] keeps one store per HTTP session.

use super::helpers::{add_item, cart_count, cart_total, change_item_qty, format_item_summary};
use super::models::{CartItem, StoreSnapshot};
use crate::error::{AppError, DataSourceError};
use crate::menu::{MenuItem, RestaurantRepository};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

// =============================================================================
// Restaurant Store
// =============================================================================

/// Holds the current menu and cart.
///
/// Mutations return the resulting [`StoreSnapshot`] and publish it to every
/// receiver obtained from [`RestaurantStore::subscribe`]. A menu load is split
/// into [`begin_load`](Self::begin_load), a fetch that needs no access to the
/// store, and [`finish_load`](Self::finish_load), so cart mutations keep
/// running while a fetch is in flight. When loads overlap, the most recently
/// started one that succeeds wins. Dropping a [`MenuLoad`] discards its result.
pub struct RestaurantStore {
    repo: Arc<dyn RestaurantRepository>,
    menu: Vec<MenuItem>,
    cart: Vec<CartItem>,
    snapshots: watch::Sender<StoreSnapshot>,
    started_loads: u64,
    applied_load: u64,
}

/// A menu fetch detached from its store
pub struct MenuLoad {
    repo: Arc<dyn RestaurantRepository>,
    generation: u64,
}

impl MenuLoad {
    pub async fn fetch(&self) -> Result<Vec<MenuItem>, DataSourceError> {
        self.repo.load_menu().await
    }
}

impl RestaurantStore {
    /// Creates a store with an empty menu and an empty cart.
    pub fn new(repo: Arc<dyn RestaurantRepository>) -> Self {
        let (snapshots, _) = watch::channel(StoreSnapshot::default());

        Self {
            repo,
            menu: Vec::new(),
            cart: Vec::new(),
            snapshots,
            started_loads: 0,
            applied_load: 0,
        }
    }

    /// Creates a store and performs its initial menu load.
    ///
    /// A failed load leaves the menu empty; the error is handed back next to the
    /// usable store.
    pub async fn open(repo: Arc<dyn RestaurantRepository>) -> (Self, Option<DataSourceError>) {
        let mut store = Self::new(repo);
        let error = store.load_menu().await.err();
        (store, error)
    }

    /// Replaces the menu with a fresh load from the repository. On failure the
    /// previous menu is kept.
    pub async fn load_menu(&mut self) -> Result<StoreSnapshot, DataSourceError> {
        let load = self.begin_load();
        let fetched = load.fetch().await;
        self.finish_load(load, fetched)
    }

    /// Starts a menu load that can be fetched without holding the store.
    pub fn begin_load(&mut self) -> MenuLoad {
        self.started_loads += 1;
        MenuLoad {
            repo: self.repo.clone(),
            generation: self.started_loads,
        }
    }

    /// Applies the outcome of `load`. A failure keeps the previous menu; a
    /// success older than the menu already applied is ignored.
    pub fn finish_load(
        &mut self,
        load: MenuLoad,
        fetched: Result<Vec<MenuItem>, DataSourceError>,
    ) -> Result<StoreSnapshot, DataSourceError> {
        match fetched {
            Ok(_) if load.generation < self.applied_load => {
                debug!(
                    generation = load.generation,
                    applied = self.applied_load,
                    "discarding superseded menu load"
                );
                Ok(self.snapshot())
            }
            Ok(menu) => {
                info!(items = menu.len(), "menu loaded");
                self.applied_load = load.generation;
                self.menu = menu;
                Ok(self.publish())
            }
            Err(err) => {
                warn!(error = %err, kept = self.menu.len(), "menu load failed, keeping previous menu");
                Err(err)
            }
        }
    }

    pub fn add_to_cart(&mut self, item: &MenuItem) -> StoreSnapshot {
        add_item(&mut self.cart, item);
        debug!(item_id = %item.id, cart = %format_item_summary(&self.cart), "added to cart");
        self.publish()
    }

    /// Adds `delta` to the quantity of `item_id`, dropping the line at zero.
    /// An id that is not in the cart is a no-op.
    pub fn change_qty(&mut self, item_id: &str, delta: i32) -> StoreSnapshot {
        change_item_qty(&mut self.cart, item_id, delta);
        debug!(item_id, delta, cart = %format_item_summary(&self.cart), "quantity changed");
        self.publish()
    }

    pub fn cart_count(&self) -> u32 {
        cart_count(&self.cart)
    }

    pub fn cart_total(&self) -> f64 {
        cart_total(&self.cart)
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    /// Looks up an item on the current menu by id.
    pub fn menu_item(&self, item_id: &str) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.id == item_id)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            menu: self.menu.clone(),
            cart: self.cart.clone(),
            cart_count: self.cart_count(),
            cart_total: self.cart_total(),
        }
    }

    /// Returns a receiver that always holds the latest snapshot.
    ///
    /// Await `changed()` to be notified of transitions, or `borrow()` to poll.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self) -> StoreSnapshot {
        let snapshot = self.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// A store guarded for use across awaits
pub type SharedStore = Arc<Mutex<RestaurantStore>>;

/// A session's store and the last time a request touched it
pub struct SessionEntry {
    pub store: SharedStore,
    pub last_seen: Instant,
}

/// Session table for the HTTP surface
pub struct AppState {
    /// One store per session, keyed by session id.
    /// Stores are cloned out before locking so no map guard is held across an await.
    pub sessions: DashMap<String, SessionEntry>,

    repo: Arc<dyn RestaurantRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn RestaurantRepository>) -> Self {
        Self {
            sessions: DashMap::new(),
            repo,
        }
    }

    /// Opens a store for a new session and runs its initial menu load.
    pub async fn open_session(&self) -> (String, StoreSnapshot, Option<DataSourceError>) {
        let session_id = super::helpers::new_session_id();
        let (store, error) = RestaurantStore::open(self.repo.clone()).await;
        let snapshot = store.snapshot();

        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                store: Arc::new(Mutex::new(store)),
                last_seen: Instant::now(),
            },
        );
        info!(%session_id, menu_items = snapshot.menu.len(), "session opened");

        (session_id, snapshot, error)
    }

    /// Returns the session's store and marks the session as active.
    pub fn session(&self, session_id: &str) -> Result<SharedStore, AppError> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;
        entry.last_seen = Instant::now();
        Ok(entry.store.clone())
    }

    /// Reloads a session's menu. The store is locked only to start and to
    /// apply the load, never during the fetch. If the session was closed while
    /// the fetch ran, the result is dropped and the session is reported missing.
    pub async fn reload_menu(&self, session_id: &str) -> Result<StoreSnapshot, AppError> {
        let shared = self.session(session_id)?;
        let load = shared.lock().await.begin_load();
        let fetched = load.fetch().await;

        if !self.is_open(session_id, &shared) {
            info!(%session_id, "session closed during menu reload, discarding result");
            return Err(AppError::SessionNotFound(session_id.to_string()));
        }

        let snapshot = shared.lock().await.finish_load(load, fetched)?;
        Ok(snapshot)
    }

    /// Ends a session. A reload still running for it finds the session gone
    /// and discards its result.
    pub fn close_session(&self, session_id: &str) -> Result<(), AppError> {
        if self.sessions.remove(session_id).is_none() {
            return Err(AppError::SessionNotFound(session_id.to_string()));
        }
        info!(%session_id, "session closed");
        Ok(())
    }

    /// Drops every session idle for at least `max_idle`. Returns how many were removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.last_seen.elapsed() < max_idle;
            if !keep {
                evicted += 1;
            }
            keep
        });
        if evicted > 0 {
            info!(evicted, remaining = self.sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    fn is_open(&self, session_id: &str, store: &SharedStore) -> bool {
        self.sessions
            .get(session_id)
            .is_some_and(|entry| Arc::ptr_eq(&entry.store, store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::StaticRestaurantRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn burger() -> MenuItem {
        MenuItem::new("1", "Burger", 500.0)
    }

    fn fries() -> MenuItem {
        MenuItem::new("2", "Fries", 200.0)
    }

    fn menu_repo() -> Arc<dyn RestaurantRepository> {
        Arc::new(StaticRestaurantRepository::new(vec![burger(), fries()]))
    }

    /// Succeeds on the first load and fails on every later one.
    struct FlakyRepository {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RestaurantRepository for FlakyRepository {
        async fn load_menu(&self) -> Result<Vec<MenuItem>, DataSourceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![burger()])
            } else {
                Err(DataSourceError::Unreachable("offline".into()))
            }
        }
    }

    #[test]
    fn new_store_starts_empty() {
        let store = RestaurantStore::new(menu_repo());
        assert!(store.menu().is_empty());
        assert!(store.cart().is_empty());
        assert_eq!(store.cart_count(), 0);
        assert_eq!(store.cart_total(), 0.0);
    }

    #[tokio::test]
    async fn burger_and_fries_scenario() {
        let (mut store, error) = RestaurantStore::open(menu_repo()).await;
        assert!(error.is_none());
        assert_eq!(store.menu(), &[burger(), fries()]);

        store.add_to_cart(&burger());
        store.add_to_cart(&burger());
        let snapshot = store.add_to_cart(&fries());

        assert_eq!(
            snapshot.cart,
            vec![CartItem { item: burger(), qty: 2 }, CartItem::new(fries())]
        );
        assert_eq!(snapshot.cart_count, 3);
        assert_eq!(snapshot.cart_total, 1200.0);
        assert_eq!(store.cart_count(), 3);
        assert_eq!(store.cart_total(), 1200.0);
    }

    #[tokio::test]
    async fn decrement_last_unit_empties_cart() {
        let (mut store, _) = RestaurantStore::open(menu_repo()).await;
        store.add_to_cart(&burger());

        let snapshot = store.change_qty("1", -1);
        assert!(snapshot.cart.is_empty());
        assert!(store.cart().is_empty());

        let snapshot = store.change_qty("1", -1);
        assert!(snapshot.cart.is_empty());
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_menu() {
        let repo = Arc::new(FlakyRepository {
            calls: AtomicUsize::new(0),
        });
        let (mut store, error) = RestaurantStore::open(repo).await;
        assert!(error.is_none());
        store.add_to_cart(&burger());

        let result = store.load_menu().await;
        assert!(matches!(result, Err(DataSourceError::Unreachable(_))));
        assert_eq!(store.menu(), &[burger()]);
        assert_eq!(store.cart_count(), 1);
    }

    #[tokio::test]
    async fn failed_initial_load_returns_usable_store() {
        let repo = Arc::new(FlakyRepository {
            calls: AtomicUsize::new(1),
        });
        let (mut store, error) = RestaurantStore::open(repo).await;

        assert!(error.is_some());
        assert!(store.menu().is_empty());
        assert_eq!(store.add_to_cart(&fries()).cart_count, 1);
    }

    #[tokio::test]
    async fn subscribers_observe_each_transition() {
        let mut store = RestaurantStore::new(menu_repo());
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), StoreSnapshot::default());

        store.load_menu().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().menu.len(), 2);

        store.add_to_cart(&fries());
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen, store.snapshot());
        assert_eq!(seen.cart_total, 200.0);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let state = AppState::new(menu_repo());
        let (first, _, _) = state.open_session().await;
        let (second, snapshot, error) = state.open_session().await;
        assert!(error.is_none());
        assert_eq!(snapshot.menu.len(), 2);
        assert_ne!(first, second);

        state
            .session(&first)
            .unwrap()
            .lock()
            .await
            .add_to_cart(&burger());

        assert_eq!(state.session(&first).unwrap().lock().await.cart_count(), 1);
        assert_eq!(state.session(&second).unwrap().lock().await.cart_count(), 0);
    }

    #[tokio::test]
    async fn superseded_load_does_not_overwrite_newer_menu() {
        let mut store = RestaurantStore::new(menu_repo());
        let older = store.begin_load();
        let newer = store.begin_load();

        store.finish_load(newer, Ok(vec![fries()])).unwrap();
        let snapshot = store.finish_load(older, Ok(vec![burger()])).unwrap();

        assert_eq!(snapshot.menu, vec![fries()]);
        assert_eq!(store.menu(), &[fries()]);
    }

    #[tokio::test]
    async fn cart_changes_while_a_load_is_detached() {
        let (mut store, _) = RestaurantStore::open(menu_repo()).await;
        let load = store.begin_load();

        store.add_to_cart(&burger());
        let fetched = load.fetch().await;
        let snapshot = store.finish_load(load, fetched).unwrap();

        assert_eq!(snapshot.cart_count, 1);
        assert_eq!(snapshot.menu.len(), 2);
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let state = AppState::new(menu_repo());
        state.open_session().await;
        state.open_session().await;

        assert_eq!(state.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(state.sessions.len(), 2);

        assert_eq!(state.evict_idle(Duration::ZERO), 2);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn closed_session_is_gone() {
        let state = AppState::new(menu_repo());
        let (id, _, _) = state.open_session().await;

        state.close_session(&id).unwrap();
        assert!(matches!(
            state.session(&id),
            Err(AppError::SessionNotFound(_))
        ));
        assert!(state.close_session(&id).is_err());
    }
}
