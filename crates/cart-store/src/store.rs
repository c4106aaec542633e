//! The cart store.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use cart_catalog::Catalog;
use cart_core::{Cart, CoreError, Product, ProductId};
use cart_storage::{Cache, KeyValueStore};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::error::{CartError, Operation};
use crate::notice::{Notice, Notifier, TracingNotifier};

/// What a successful operation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CartOutcome {
    /// A new product was appended with an amount of one.
    Added { product_id: ProductId },
    /// An existing product's amount went up by one.
    Incremented { product_id: ProductId, amount: u32 },
    /// An existing product's amount was set.
    Updated { product_id: ProductId, amount: u32 },
    /// A product was removed.
    Removed { product_id: ProductId },
    /// Every product was removed.
    Cleared,
    /// The persisted cart was read back into memory.
    Reloaded { items: usize },
    /// Nothing was requested, nothing changed.
    Unchanged,
}

/// Shopping cart state validated against the catalog and persisted on
/// every change.
///
/// The in-memory cart and the persisted blob move together: a mutation is
/// written to storage first and only then becomes visible through
/// [`cart`](Self::cart). If the write fails the previous cart stays.
///
/// Mutations are serialized. Each one holds the write lock from its first
/// catalog request until its commit, so two concurrent adds of the same
/// product both land.
pub struct CartStore {
    catalog: Arc<dyn Catalog>,
    cache: Cache,
    notifier: Arc<dyn Notifier>,
    config: StoreConfig,
    state: RwLock<Cart>,
    write_lock: Mutex<()>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("config", &self.config)
            .field("cart", &self.cart())
            .finish_non_exhaustive()
    }
}

/// Builder for [`CartStore`].
pub struct CartStoreBuilder {
    catalog: Arc<dyn Catalog>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    config: StoreConfig,
}

impl CartStoreBuilder {
    /// Set the store configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Set where notices go. Defaults to [`TracingNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Load the persisted cart and build the store.
    ///
    /// A missing blob yields an empty cart. A blob that fails to parse, or
    /// that holds duplicate ids or zero amounts, is an error rather than
    /// being silently discarded.
    pub fn build(self) -> Result<CartStore, CartError> {
        let cache = Cache::new(self.storage);
        let cart = load_cart(&cache, &self.config.storage_key)?;
        tracing::debug!(
            key = %self.config.storage_key,
            items = cart.unique_item_count(),
            "cart loaded"
        );

        Ok(CartStore {
            catalog: self.catalog,
            cache,
            notifier: self.notifier,
            config: self.config,
            state: RwLock::new(cart),
            write_lock: Mutex::new(()),
        })
    }
}

fn load_cart(cache: &Cache, key: &str) -> Result<Cart, CartError> {
    match cache.get::<Vec<Product>>(key)? {
        Some(items) => Ok(Cart::from_items(items)?),
        None => Ok(Cart::new()),
    }
}

impl CartStore {
    /// Start building a store over a catalog and a key-value store.
    pub fn builder(catalog: Arc<dyn Catalog>, storage: Arc<dyn KeyValueStore>) -> CartStoreBuilder {
        CartStoreBuilder {
            catalog,
            storage,
            notifier: Arc::new(TracingNotifier),
            config: StoreConfig::default(),
        }
    }

    /// Snapshot of the current cart.
    pub fn cart(&self) -> Cart {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Add one unit of a product.
    ///
    /// Stock is always fetched. A product already in the cart goes up by
    /// one if stock allows; a new product is fetched and appended with an
    /// amount of one if any stock exists. Otherwise the cart is unchanged
    /// and an out-of-stock notice is shown.
    pub async fn add_product(&self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        let result = self.try_add(product_id).await;
        self.report(Operation::Add, Some(product_id), &result);
        result
    }

    /// Remove a product from the cart.
    pub async fn remove_product(&self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        let result = self.try_remove(product_id).await;
        self.report(Operation::Remove, Some(product_id), &result);
        result
    }

    /// Set a product's amount.
    ///
    /// An `amount` of zero or less does nothing: removing is a separate
    /// operation. Otherwise the product must be in the cart and the catalog
    /// must have at least `amount` units.
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<CartOutcome, CartError> {
        if amount <= 0 {
            tracing::debug!(%product_id, amount, "ignoring non-positive amount");
            return Ok(CartOutcome::Unchanged);
        }
        let result = self.try_update(product_id, amount).await;
        self.report(Operation::Update, Some(product_id), &result);
        result
    }

    /// Remove every product.
    pub async fn clear(&self) -> Result<CartOutcome, CartError> {
        let result = self.try_clear().await;
        self.report(Operation::Clear, None, &result);
        result
    }

    /// Re-read the persisted cart, replacing the in-memory one.
    ///
    /// If the blob cannot be read or is invalid the in-memory cart is kept.
    pub async fn reload(&self) -> Result<CartOutcome, CartError> {
        let result = self.try_reload().await;
        self.report(Operation::Reload, None, &result);
        result
    }

    async fn try_reload(&self) -> Result<CartOutcome, CartError> {
        let _guard = self.write_lock.lock().await;
        let cart = load_cart(&self.cache, &self.config.storage_key)?;
        let items = cart.unique_item_count();
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = cart;
        Ok(CartOutcome::Reloaded { items })
    }

    async fn try_add(&self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.cart();

        let stock = self.catalog.stock(product_id).await?;

        match cart.get(product_id).map(|p| p.amount) {
            Some(current) => {
                let next = current.saturating_add(1);
                if !stock.can_fulfill(next) {
                    return Err(CartError::OutOfStock {
                        product_id,
                        requested: i64::from(next),
                        available: stock.amount,
                    });
                }
                cart.set_amount(product_id, next)?;
                self.commit(cart)?;
                Ok(CartOutcome::Incremented {
                    product_id,
                    amount: next,
                })
            }
            None => {
                if stock.is_out_of_stock() {
                    return Err(CartError::OutOfStock {
                        product_id,
                        requested: 1,
                        available: 0,
                    });
                }
                let product = self.catalog.product(product_id).await?;
                if product.id != product_id {
                    return Err(CoreError::IdMismatch {
                        expected: product_id,
                        got: product.id,
                    }
                    .into());
                }
                cart.push_new(product)?;
                self.commit(cart)?;
                Ok(CartOutcome::Added { product_id })
            }
        }
    }

    async fn try_clear(&self) -> Result<CartOutcome, CartError> {
        let _guard = self.write_lock.lock().await;
        self.commit(Cart::new())?;
        Ok(CartOutcome::Cleared)
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.cart();

        if !cart.contains(product_id) {
            return Err(CartError::NotInCart(product_id));
        }
        cart.remove(product_id)?;
        self.commit(cart)?;
        Ok(CartOutcome::Removed { product_id })
    }

    async fn try_update(&self, product_id: ProductId, amount: i64) -> Result<CartOutcome, CartError> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.cart();

        if !cart.contains(product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        let stock = self.catalog.stock(product_id).await?;

        let out_of_stock = CartError::OutOfStock {
            product_id,
            requested: amount,
            available: stock.amount,
        };
        let Ok(amount) = u32::try_from(amount) else {
            return Err(out_of_stock);
        };
        if !stock.can_fulfill(amount) {
            return Err(out_of_stock);
        }

        cart.set_amount(product_id, amount)?;
        self.commit(cart)?;
        Ok(CartOutcome::Updated { product_id, amount })
    }

    /// Persist `next`, then publish it.
    fn commit(&self, next: Cart) -> Result<(), CartError> {
        self.cache.set(&self.config.storage_key, &next)?;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    fn report(
        &self,
        op: Operation,
        product_id: Option<ProductId>,
        result: &Result<CartOutcome, CartError>,
    ) {
        match result {
            Ok(outcome) => tracing::info!(%op, ?product_id, ?outcome, "cart updated"),
            Err(err) => {
                if err.is_rejection() {
                    tracing::warn!(%op, ?product_id, error = %err, "cart operation rejected");
                } else {
                    tracing::error!(%op, ?product_id, error = %err, "cart operation failed");
                }
                if let Some(kind) = err.notice_kind(op) {
                    self.notifier.notify(&Notice::new(kind));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{NoticeKind, RecordingNotifier};
    use async_trait::async_trait;
    use cart_catalog::{FetchError, StaticCatalog};
    use cart_core::Stock;
    use cart_storage::{CacheError, MemoryStore};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const KEY: &str = "@RocketShoes:cart";

    /// Catalog that can be made to fail and that yields before answering,
    /// so concurrent operations interleave.
    #[derive(Default)]
    struct FakeCatalog {
        inner: StaticCatalog,
        fail: AtomicBool,
        wrong_record: AtomicBool,
        stock_calls: AtomicUsize,
        product_calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn with(products: &[(u64, &str, f64, u32)]) -> Self {
            let catalog = Self::default();
            for &(id, title, price, stock) in products {
                let id = ProductId::new(id);
                catalog
                    .inner
                    .insert_product(Product::new(id, title, price, format!("https://img/{id}.jpg")));
                catalog.inner.set_stock(id, stock);
            }
            catalog
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn stock(&self, id: ProductId) -> Result<Stock, FetchError> {
            self.stock_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(FetchError::RequestError("connection reset".into()));
            }
            self.inner.stock(id).await
        }

        async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
            self.product_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let id = if self.wrong_record.load(Ordering::SeqCst) {
                ProductId::new(id.get() + 1)
            } else {
                id
            };
            self.inner.product(id).await
        }
    }

    /// Memory store whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CacheError::StoreError("quota exceeded".into()));
            }
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.inner.delete(key)
        }
    }

    struct Harness {
        store: CartStore,
        catalog: Arc<FakeCatalog>,
        storage: Arc<FlakyStore>,
        notices: Arc<RecordingNotifier>,
    }

    impl Harness {
        fn new(catalog: FakeCatalog) -> Self {
            Self::with_storage(catalog, FlakyStore::default())
        }

        fn with_storage(catalog: FakeCatalog, storage: FlakyStore) -> Self {
            let catalog = Arc::new(catalog);
            let storage = Arc::new(storage);
            let notices = Arc::new(RecordingNotifier::new());
            let store = CartStore::builder(catalog.clone(), storage.clone())
                .notifier(notices.clone())
                .build()
                .unwrap();
            Self {
                store,
                catalog,
                storage,
                notices,
            }
        }

        fn persisted(&self) -> Option<String> {
            self.storage.get(KEY).unwrap()
        }

        fn persisted_cart(&self) -> Cart {
            serde_json::from_str(&self.persisted().unwrap()).unwrap()
        }

        fn amounts(&self) -> Vec<(u64, u32)> {
            self.store.cart().iter().map(|p| (p.id.get(), p.amount)).collect()
        }
    }

    fn shop() -> FakeCatalog {
        FakeCatalog::with(&[
            (1, "Runner", 139.9, 3),
            (2, "Boot", 199.9, 1),
            (3, "Sandal", 59.9, 0),
            (5, "Shoe", 179.9, 3),
        ])
    }

    fn id(n: u64) -> ProductId {
        ProductId::new(n)
    }

    #[tokio::test]
    async fn test_starts_empty_without_persisted_cart() {
        let h = Harness::new(shop());
        assert!(h.store.cart().is_empty());
        assert!(h.persisted().is_none());
    }

    #[tokio::test]
    async fn test_add_new_product() {
        let h = Harness::new(shop());

        let outcome = h.store.add_product(id(5)).await.unwrap();
        assert_eq!(outcome, CartOutcome::Added { product_id: id(5) });

        let cart = h.store.cart();
        assert_eq!(cart.unique_item_count(), 1);
        let shoe = cart.get(id(5)).unwrap();
        assert_eq!(shoe.title, "Shoe");
        assert_eq!(shoe.amount, 1);

        assert_eq!(h.persisted_cart(), cart);
        assert!(h.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_add_new_product_without_stock_is_rejected() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        let before = h.persisted();

        let err = h.store.add_product(id(3)).await.unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { available: 0, .. }));

        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert_eq!(h.persisted(), before);
        assert_eq!(h.notices.kinds(), vec![NoticeKind::OutOfStock]);
        assert_eq!(h.catalog.product_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_add_existing_increments_by_one() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        h.store.add_product(id(5)).await.unwrap();

        let outcome = h.store.add_product(id(1)).await.unwrap();
        assert_eq!(
            outcome,
            CartOutcome::Incremented {
                product_id: id(1),
                amount: 2
            }
        );
        assert_eq!(h.amounts(), vec![(1, 2), (5, 1)]);
        assert_eq!(h.persisted_cart(), h.store.cart());

        // Stock is checked on every add, the product record only once.
        assert_eq!(h.catalog.stock_calls.load(Ordering::SeqCst), 3);
        assert_eq!(h.catalog.product_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_add_existing_at_stock_limit() {
        let h = Harness::new(shop());
        h.store.add_product(id(2)).await.unwrap();
        let before = h.persisted();

        let err = h.store.add_product(id(2)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::OutOfStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(h.amounts(), vec![(2, 1)]);
        assert_eq!(h.persisted(), before);
        assert_eq!(h.notices.kinds(), vec![NoticeKind::OutOfStock]);
    }

    #[tokio::test]
    async fn test_add_catalog_failure_leaves_cart() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        h.catalog.fail.store(true, Ordering::SeqCst);

        let err = h.store.add_product(id(5)).await.unwrap_err();
        assert!(matches!(err, CartError::Catalog(_)));
        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert_eq!(h.notices.kinds(), vec![NoticeKind::AddFailed]);
    }

    #[tokio::test]
    async fn test_add_unknown_product_reports_add_failure() {
        let h = Harness::new(shop());

        let err = h.store.add_product(id(42)).await.unwrap_err();
        assert!(matches!(err, CartError::Catalog(FetchError::NotFound { .. })));
        assert!(h.store.cart().is_empty());
        assert_eq!(h.notices.kinds(), vec![NoticeKind::AddFailed]);
    }

    #[tokio::test]
    async fn test_add_rejects_mismatched_product_record() {
        let h = Harness::new(shop());
        h.catalog.wrong_record.store(true, Ordering::SeqCst);

        let err = h.store.add_product(id(1)).await.unwrap_err();
        assert!(matches!(err, CartError::Core(CoreError::IdMismatch { .. })));
        assert!(h.store.cart().is_empty());
        assert!(h.persisted().is_none());
        assert_eq!(h.notices.kinds(), vec![NoticeKind::AddFailed]);
    }

    #[tokio::test]
    async fn test_remove_present_product() {
        let h = Harness::new(shop());
        for n in [1, 2, 5] {
            h.store.add_product(id(n)).await.unwrap();
        }

        let outcome = h.store.remove_product(id(2)).await.unwrap();
        assert_eq!(outcome, CartOutcome::Removed { product_id: id(2) });
        assert_eq!(h.amounts(), vec![(1, 1), (5, 1)]);
        assert_eq!(h.persisted_cart(), h.store.cart());
    }

    #[tokio::test]
    async fn test_remove_absent_product() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        let before = h.persisted();

        let err = h.store.remove_product(id(9)).await.unwrap_err();
        assert!(matches!(err, CartError::NotInCart(_)));
        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert_eq!(h.persisted(), before);
        assert_eq!(h.notices.kinds(), vec![NoticeKind::RemoveFailed]);
    }

    #[tokio::test]
    async fn test_update_non_positive_is_strict_noop() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        let before = h.persisted();
        let stock_calls = h.catalog.stock_calls.load(Ordering::SeqCst);

        for (target, amount) in [(1, 0), (1, -3), (9, 0)] {
            let outcome = h.store.update_product_amount(id(target), amount).await.unwrap();
            assert_eq!(outcome, CartOutcome::Unchanged);
        }

        assert_eq!(h.persisted(), before);
        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert!(h.notices.notices().is_empty());
        assert_eq!(h.catalog.stock_calls.load(Ordering::SeqCst), stock_calls);
    }

    #[tokio::test]
    async fn test_update_within_stock() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        h.store.add_product(id(5)).await.unwrap();

        let outcome = h.store.update_product_amount(id(1), 3).await.unwrap();
        assert_eq!(
            outcome,
            CartOutcome::Updated {
                product_id: id(1),
                amount: 3
            }
        );
        assert_eq!(h.amounts(), vec![(1, 3), (5, 1)]);
        assert_eq!(h.persisted_cart(), h.store.cart());

        // Lowering works too.
        h.store.update_product_amount(id(1), 2).await.unwrap();
        assert_eq!(h.amounts(), vec![(1, 2), (5, 1)]);
    }

    #[tokio::test]
    async fn test_update_above_stock() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        let before = h.persisted();

        let err = h.store.update_product_amount(id(1), 4).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::OutOfStock {
                requested: 4,
                available: 3,
                ..
            }
        ));
        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert_eq!(h.persisted(), before);
        assert_eq!(h.notices.kinds(), vec![NoticeKind::OutOfStock]);
    }

    #[tokio::test]
    async fn test_update_huge_amount_is_out_of_stock() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();

        let err = h
            .store
            .update_product_amount(id(1), i64::from(u32::MAX) + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { .. }));
    }

    #[tokio::test]
    async fn test_update_absent_product() {
        let h = Harness::new(shop());

        let err = h.store.update_product_amount(id(1), 2).await.unwrap_err();
        assert!(matches!(err, CartError::NotInCart(_)));
        assert_eq!(h.notices.kinds(), vec![NoticeKind::UpdateFailed]);
        // Absence is detected before the catalog is asked.
        assert_eq!(h.catalog.stock_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_catalog_failure() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        h.catalog.fail.store(true, Ordering::SeqCst);

        let err = h.store.update_product_amount(id(1), 2).await.unwrap_err();
        assert!(matches!(err, CartError::Catalog(_)));
        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert_eq!(h.notices.kinds(), vec![NoticeKind::UpdateFailed]);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        let before = h.persisted();
        h.storage.fail_writes.store(true, Ordering::SeqCst);

        assert!(matches!(
            h.store.add_product(id(5)).await,
            Err(CartError::Storage(_))
        ));
        assert!(matches!(
            h.store.update_product_amount(id(1), 2).await,
            Err(CartError::Storage(_))
        ));
        assert!(matches!(
            h.store.remove_product(id(1)).await,
            Err(CartError::Storage(_))
        ));
        assert!(matches!(h.store.clear().await, Err(CartError::Storage(_))));

        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert_eq!(h.persisted(), before);
        assert_eq!(
            h.notices.kinds(),
            vec![
                NoticeKind::AddFailed,
                NoticeKind::UpdateFailed,
                NoticeKind::RemoveFailed,
                NoticeKind::ClearFailed,
            ]
        );
    }

    #[tokio::test]
    async fn test_clear() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();
        h.store.add_product(id(5)).await.unwrap();

        assert_eq!(h.store.clear().await.unwrap(), CartOutcome::Cleared);
        assert!(h.store.cart().is_empty());
        assert_eq!(h.persisted().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_roundtrip_through_storage() {
        let h = Harness::new(shop());
        for n in [5, 1, 2] {
            h.store.add_product(id(n)).await.unwrap();
        }
        h.store.update_product_amount(id(1), 3).await.unwrap();
        let blob = h.persisted().unwrap();

        let storage = Arc::new(MemoryStore::with_value(KEY, blob));
        let fresh = CartStore::builder(Arc::new(shop()), storage).build().unwrap();

        assert_eq!(fresh.cart(), h.store.cart());
        let ids: Vec<u64> = fresh.cart().iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![5, 1, 2]);
    }

    #[tokio::test]
    async fn test_corrupt_persisted_cart_is_an_error() {
        let storage = Arc::new(MemoryStore::with_value(KEY, "{oops"));
        let result = CartStore::builder(Arc::new(shop()), storage).build();
        assert!(matches!(result, Err(CartError::Storage(CacheError::SerializeError(_)))));

        let dup = r#"[{"id":1,"title":"a","price":1,"amount":1},{"id":1,"title":"a","price":1,"amount":2}]"#;
        let storage = Arc::new(MemoryStore::with_value(KEY, dup));
        let result = CartStore::builder(Arc::new(shop()), storage).build();
        assert!(matches!(result, Err(CartError::Core(CoreError::DuplicateProduct(_)))));
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let storage = Arc::new(MemoryStore::new());
        let store = CartStore::builder(Arc::new(shop()), storage.clone())
            .config(StoreConfig::default().with_storage_key("cart:guest"))
            .notifier(Arc::new(crate::notice::NoopNotifier))
            .build()
            .unwrap();

        store.add_product(id(1)).await.unwrap();
        assert!(storage.get("cart:guest").unwrap().is_some());
        assert!(storage.get(KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_writes() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();

        h.storage
            .set(KEY, r#"[{"id":5,"title":"Shoe","price":179.9,"image":"","amount":2}]"#)
            .unwrap();
        let outcome = h.store.reload().await.unwrap();

        assert_eq!(outcome, CartOutcome::Reloaded { items: 1 });
        assert_eq!(h.amounts(), vec![(5, 2)]);
    }

    #[tokio::test]
    async fn test_reload_of_corrupt_blob_keeps_cart_without_notice() {
        let h = Harness::new(shop());
        h.store.add_product(id(1)).await.unwrap();

        h.storage.set(KEY, "not json").unwrap();
        let err = h.store.reload().await.unwrap_err();

        assert!(matches!(err, CartError::Storage(_)));
        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert!(h.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_serialized() {
        let h = Harness::new(shop());

        let (a, b) = tokio::join!(h.store.add_product(id(1)), h.store.add_product(id(1)));
        a.unwrap();
        b.unwrap();

        assert_eq!(h.amounts(), vec![(1, 2)]);
        assert_eq!(h.persisted_cart(), h.store.cart());
    }

    #[tokio::test]
    async fn test_concurrent_adds_across_tasks() {
        let h = Harness::new(shop());
        let store = Arc::new(h.store);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.add_product(id(5)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let cart = store.cart();
        assert_eq!(cart.get(id(5)).unwrap().amount, 3);
        let persisted: Cart = serde_json::from_str(&h.storage.get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, cart);
    }
}
