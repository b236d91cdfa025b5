//! `SqliteCatalogStore`: the persisted local catalog.

use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;
use std::time::Duration;
use storefront_core::bundle::{
    BookmarkItemBundle, CartItemBundle, ManufacturerBundle, OrderBundle, ProductBundle,
};
use storefront_core::catalog_store::{CatalogStore, Result, StoreError};
use storefront_core::model::{
    Advertisement, BookmarkItem, CartItem, Location, Manufacturer, Notification, Order,
    OrderItem, OrderPayment, PaymentProvider, Product, ProductColor, ProductSize, Review, User,
    UserPaymentProvider,
};
use sqlx::error::ErrorKind;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed catalog store.
///
/// Foreign keys are enforced by the database, so constraint failures surface
/// as [`StoreError::ForeignKeyViolation`] and [`StoreError::Conflict`] exactly
/// like the in-memory store reports them.
///
/// Multi-table reads run inside one read transaction, which gives them a
/// consistent snapshot even while the seed loader is writing.
///
/// # Example
///
/// ```no_run
/// use storefront_core::catalog_store::CatalogStore;
/// use storefront_sqlite::SqliteCatalogStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteCatalogStore::connect("sqlite://storefront.db", 4).await?;
/// let created = store.initialize().await?;
/// println!("fresh database: {created}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    /// Wrap an existing pool.
    ///
    /// The pool's connections must have foreign keys enabled for the
    /// constraint guarantees to hold.
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url`.
    ///
    /// Connections use WAL journaling, enforce foreign keys and wait up to
    /// five seconds for a busy database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the URL is invalid or the
    /// connection fails.
    #[tracing::instrument(skip_all, fields(url = %database_url, max_connections = max_connections))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;

        tracing::debug!("Connected to catalog database");
        Ok(Self::from_pool(pool))
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds exactly one connection for its whole lifetime, since
    /// the database disappears with the last connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection fails.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Database(format!("Invalid database URL: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;

        Ok(Self::from_pool(pool))
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn begin_read(&self) -> Result<sqlx::Transaction<'static, sqlx::Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to begin read: {e}")))
    }
}

/// Map a write failure to the store's error vocabulary.
fn write_error(entity: &'static str, key: impl ToString) -> impl FnOnce(sqlx::Error) -> StoreError {
    let key = key.to_string();
    move |err| {
        if let sqlx::Error::Database(db) = &err {
            match db.kind() {
                ErrorKind::ForeignKeyViolation => {
                    return StoreError::ForeignKeyViolation {
                        entity,
                        detail: format!("{key}: {}", db.message()),
                    };
                }
                ErrorKind::UniqueViolation => return StoreError::Conflict { entity, key },
                _ => {}
            }
        }
        StoreError::Database(format!("Failed to write {entity} {key}: {err}"))
    }
}

fn read_error(what: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| StoreError::Database(format!("Failed to load {what}: {err}"))
}

fn group_by<K: Eq + Hash, T>(rows: Vec<T>, key: impl Fn(&T) -> K) -> HashMap<K, Vec<T>> {
    let mut groups: HashMap<K, Vec<T>> = HashMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
}

/// Which products a bundle query loads.
#[derive(Clone, Copy, Debug)]
enum ProductScope {
    All,
    Product(i64),
    /// Products in a user's cart
    Cart(i64),
    /// Products a user bookmarked
    Bookmarks(i64),
}

impl ProductScope {
    /// SQL condition on `column` selecting the scope's products, using `?1`.
    fn condition(self, column: &str) -> String {
        match self {
            Self::All => "?1 IS NULL".to_string(),
            Self::Product(_) => format!("{column} = ?1"),
            Self::Cart(_) => {
                format!("{column} IN (SELECT product_id FROM cart_items WHERE user_id = ?1)")
            }
            Self::Bookmarks(_) => {
                format!("{column} IN (SELECT product_id FROM bookmark_items WHERE user_id = ?1)")
            }
        }
    }

    const fn param(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Product(id) | Self::Cart(id) | Self::Bookmarks(id) => Some(id),
        }
    }
}

/// Load the product bundles in `scope`, ordered by product id.
async fn fetch_bundles(
    conn: &mut SqliteConnection,
    scope: ProductScope,
) -> Result<Vec<ProductBundle>> {
    let products: Vec<Product> = sqlx::query_as(&format!(
        r"
        SELECT id, name, image, price, description, manufacturer_id, basic_color_name
        FROM products
        WHERE {}
        ORDER BY id
        ",
        scope.condition("id")
    ))
    .bind(scope.param())
    .fetch_all(&mut *conn)
    .await
    .map_err(read_error("products"))?;

    if products.is_empty() {
        return Ok(Vec::new());
    }

    let manufacturers: HashMap<i64, Manufacturer> = sqlx::query_as::<_, Manufacturer>(&format!(
        r"
        SELECT id, name, icon
        FROM manufacturers
        WHERE id IN (SELECT manufacturer_id FROM products WHERE {})
        ",
        scope.condition("id")
    ))
    .bind(scope.param())
    .fetch_all(&mut *conn)
    .await
    .map_err(read_error("manufacturers"))?
    .into_iter()
    .map(|m| (m.id, m))
    .collect();

    let colors: Vec<ProductColor> = sqlx::query_as(&format!(
        r"
        SELECT product_id, color_name, image
        FROM product_colors
        WHERE {}
        ORDER BY rowid
        ",
        scope.condition("product_id")
    ))
    .bind(scope.param())
    .fetch_all(&mut *conn)
    .await
    .map_err(read_error("product colors"))?;

    let sizes: Vec<ProductSize> = sqlx::query_as(&format!(
        r"
        SELECT product_id, size
        FROM product_sizes
        WHERE {}
        ORDER BY rowid
        ",
        scope.condition("product_id")
    ))
    .bind(scope.param())
    .fetch_all(&mut *conn)
    .await
    .map_err(read_error("product sizes"))?;

    let reviews: Vec<Review> = sqlx::query_as(&format!(
        r"
        SELECT id, product_id, user_id, rating, comment, created_at
        FROM reviews
        WHERE {}
        ORDER BY created_at, id
        ",
        scope.condition("product_id")
    ))
    .bind(scope.param())
    .fetch_all(&mut *conn)
    .await
    .map_err(read_error("reviews"))?;

    let mut colors = group_by(colors, |c| c.product_id);
    let mut sizes = group_by(sizes, |s| s.product_id);
    let mut reviews = group_by(reviews, |r| r.product_id);

    Ok(products
        .into_iter()
        .map(|product| {
            let id = product.id;
            ProductBundle {
                manufacturer: manufacturers.get(&product.manufacturer_id).cloned(),
                colors: colors.remove(&id).unwrap_or_default(),
                sizes: sizes.remove(&id).unwrap_or_default(),
                reviews: reviews.remove(&id).unwrap_or_default(),
                product,
            }
        })
        .collect())
}

/// The bundles in `scope`, keyed by product id.
async fn fetch_bundle_index(
    conn: &mut SqliteConnection,
    scope: ProductScope,
) -> Result<HashMap<i64, ProductBundle>> {
    Ok(fetch_bundles(conn, scope)
        .await?
        .into_iter()
        .map(|b| (b.product.id, b))
        .collect())
}

impl CatalogStore for SqliteCatalogStore {
    #[tracing::instrument(skip(self))]
    async fn initialize(&self) -> Result<bool> {
        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'products'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("Failed to inspect schema: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(format!("Migration failed: {e}")))?;

        let created = existing == 0;
        tracing::info!(created, "Catalog schema ready");
        Ok(created)
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO users (user_id, name, profile, phone, email, password_hash, token)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                name = excluded.name,
                profile = excluded.profile,
                phone = excluded.phone,
                email = excluded.email,
                password_hash = excluded.password_hash,
                token = excluded.token
            ",
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.profile)
        .bind(&user.phone)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.token)
        .execute(&self.pool)
        .await
        .map_err(write_error("users", user.user_id))?;
        Ok(())
    }

    async fn insert_manufacturer(&self, manufacturer: &Manufacturer) -> Result<()> {
        sqlx::query("INSERT INTO manufacturers (id, name, icon) VALUES (?, ?, ?)")
            .bind(manufacturer.id)
            .bind(&manufacturer.name)
            .bind(&manufacturer.icon)
            .execute(&self.pool)
            .await
            .map_err(write_error("manufacturers", manufacturer.id))?;
        Ok(())
    }

    async fn insert_advertisement(&self, advertisement: &Advertisement) -> Result<()> {
        sqlx::query(
            "INSERT INTO advertisements (id, image, rank, display_flag) VALUES (?, ?, ?, ?)",
        )
        .bind(advertisement.id)
        .bind(&advertisement.image)
        .bind(advertisement.rank)
        .bind(advertisement.display_flag)
        .execute(&self.pool)
        .await
        .map_err(write_error("advertisements", advertisement.id))?;
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to acquire connection: {e}")))?;
        insert_product_row(&mut conn, product).await
    }

    async fn insert_product_color(&self, color: &ProductColor) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to acquire connection: {e}")))?;
        insert_color_row(&mut conn, color).await
    }

    async fn insert_product_size(&self, size: &ProductSize) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to acquire connection: {e}")))?;
        insert_size_row(&mut conn, size).await
    }

    #[tracing::instrument(
        skip_all,
        fields(product_id = product.id, colors = colors.len(), sizes = sizes.len())
    )]
    async fn insert_product_with_variants(
        &self,
        product: &Product,
        colors: &[ProductColor],
        sizes: &[ProductSize],
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to begin transaction: {e}")))?;

        insert_product_row(&mut tx, product).await?;
        for color in colors {
            insert_color_row(&mut tx, color).await?;
        }
        for size in sizes {
            insert_size_row(&mut tx, size).await?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to commit product: {e}")))?;
        tracing::debug!("Product committed with variants");
        Ok(())
    }

    async fn save_payment_provider(&self, provider: &PaymentProvider) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO payment_providers (id, title, icon) VALUES (?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET title = excluded.title, icon = excluded.icon
            ",
        )
        .bind(&provider.id)
        .bind(&provider.title)
        .bind(&provider.icon)
        .execute(&self.pool)
        .await
        .map_err(write_error("payment_providers", &provider.id))?;
        Ok(())
    }

    async fn save_user_payment_provider(&self, link: &UserPaymentProvider) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO user_payment_providers (provider_id, card_number) VALUES (?, ?)
            ON CONFLICT (provider_id, card_number) DO NOTHING
            ",
        )
        .bind(&link.provider_id)
        .bind(&link.card_number)
        .execute(&self.pool)
        .await
        .map_err(write_error("user_payment_providers", &link.provider_id))?;
        Ok(())
    }

    async fn save_location(&self, location: &Location) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO locations (id, address, city, country) VALUES (?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                address = excluded.address,
                city = excluded.city,
                country = excluded.country
            ",
        )
        .bind(location.id)
        .bind(&location.address)
        .bind(&location.city)
        .bind(&location.country)
        .execute(&self.pool)
        .await
        .map_err(write_error("locations", location.id))?;
        Ok(())
    }

    async fn insert_review(&self, review: &Review) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO reviews (id, product_id, user_id, rating, comment, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(review.id)
        .bind(review.product_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_error("reviews", review.id))?;
        Ok(())
    }

    async fn add_cart_item(&self, item: &CartItem) -> Result<()> {
        sqlx::query(
            "INSERT INTO cart_items (id, product_id, user_id, quantity) VALUES (?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(item.product_id)
        .bind(item.user_id)
        .bind(item.quantity)
        .execute(&self.pool)
        .await
        .map_err(write_error("cart_items", item.id))?;
        Ok(())
    }

    async fn remove_cart_item(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error("cart_items", id))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "cart_items",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    async fn add_bookmark(&self, item: &BookmarkItem) -> Result<()> {
        sqlx::query("INSERT INTO bookmark_items (id, product_id, user_id) VALUES (?, ?, ?)")
            .bind(item.id)
            .bind(item.product_id)
            .bind(item.user_id)
            .execute(&self.pool)
            .await
            .map_err(write_error("bookmark_items", item.id))?;
        Ok(())
    }

    async fn remove_bookmark(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM bookmark_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error("bookmark_items", id))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "bookmark_items",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(order_id = %order.id, items = items.len()))]
    async fn place_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&OrderPayment>,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            "INSERT INTO orders (id, user_id, total, status, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(order.user_id)
        .bind(order.total)
        .bind(&order.status)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(write_error("orders", &order.id))?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity) VALUES (?, ?, ?, ?)",
            )
            .bind(item.id)
            .bind(&item.order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(write_error("order_items", item.id))?;
        }

        if let Some(payment) = payment {
            sqlx::query(
                "INSERT INTO order_payments (order_id, provider_id, amount) VALUES (?, ?, ?)",
            )
            .bind(&payment.order_id)
            .bind(&payment.provider_id)
            .bind(payment.amount)
            .execute(&mut *tx)
            .await
            .map_err(write_error("order_payments", &payment.order_id))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to commit order: {e}")))?;
        tracing::info!("Order placed");
        Ok(())
    }

    async fn save_notification(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO notifications (id, user_id, title, body, read, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                user_id = excluded.user_id,
                title = excluded.title,
                body = excluded.body,
                read = excluded.read,
                created_at = excluded.created_at
            ",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_error("notifications", notification.id))?;
        Ok(())
    }

    async fn user(&self, user_id: i64) -> Result<Option<User>> {
        sqlx::query_as(
            r"
            SELECT user_id, name, profile, phone, email, password_hash, token
            FROM users
            WHERE user_id = ?
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("user"))
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<User>> {
        sqlx::query_as(
            r"
            SELECT user_id, name, profile, phone, email, password_hash, token
            FROM users
            WHERE email = ?1 OR phone = ?1
            ORDER BY user_id
            LIMIT 1
            ",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("user"))
    }

    async fn location(&self) -> Result<Option<Location>> {
        sqlx::query_as("SELECT id, address, city, country FROM locations ORDER BY id LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("location"))
    }

    async fn advertisements(&self) -> Result<Vec<Advertisement>> {
        sqlx::query_as(
            "SELECT id, image, rank, display_flag FROM advertisements ORDER BY rank, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("advertisements"))
    }

    async fn payment_providers(&self) -> Result<Vec<PaymentProvider>> {
        sqlx::query_as("SELECT id, title, icon FROM payment_providers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("payment providers"))
    }

    async fn user_payment_providers(&self) -> Result<Vec<UserPaymentProvider>> {
        sqlx::query_as(
            r"
            SELECT provider_id, card_number
            FROM user_payment_providers
            ORDER BY provider_id, card_number
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("user payment providers"))
    }

    async fn manufacturers_with_products(&self) -> Result<Vec<ManufacturerBundle>> {
        let mut tx = self.begin_read().await?;

        let manufacturers: Vec<Manufacturer> =
            sqlx::query_as("SELECT id, name, icon FROM manufacturers ORDER BY id")
                .fetch_all(&mut *tx)
                .await
                .map_err(read_error("manufacturers"))?;
        let bundles = fetch_bundles(&mut tx, ProductScope::All).await?;
        tx.commit().await.map_err(read_error("manufacturers"))?;

        let mut products = group_by(bundles, |b| b.product.manufacturer_id);
        Ok(manufacturers
            .into_iter()
            .map(|manufacturer| ManufacturerBundle {
                products: products.remove(&manufacturer.id).unwrap_or_default(),
                manufacturer,
            })
            .collect())
    }

    async fn product_bundles(&self) -> Result<Vec<ProductBundle>> {
        let mut tx = self.begin_read().await?;
        let bundles = fetch_bundles(&mut tx, ProductScope::All).await?;
        tx.commit().await.map_err(read_error("products"))?;
        Ok(bundles)
    }

    async fn product_bundle(&self, product_id: i64) -> Result<Option<ProductBundle>> {
        let mut tx = self.begin_read().await?;
        let bundles = fetch_bundles(&mut tx, ProductScope::Product(product_id)).await?;
        tx.commit().await.map_err(read_error("product"))?;
        Ok(bundles.into_iter().next())
    }

    async fn cart_items(&self, user_id: i64) -> Result<Vec<CartItemBundle>> {
        let mut tx = self.begin_read().await?;

        let items: Vec<CartItem> = sqlx::query_as(
            "SELECT id, product_id, user_id, quantity FROM cart_items WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(read_error("cart items"))?;
        let products = fetch_bundle_index(&mut tx, ProductScope::Cart(user_id)).await?;
        tx.commit().await.map_err(read_error("cart items"))?;

        Ok(items
            .into_iter()
            .map(|item| CartItemBundle {
                product: products.get(&item.product_id).cloned(),
                item,
            })
            .collect())
    }

    async fn bookmark_items(&self, user_id: i64) -> Result<Vec<BookmarkItemBundle>> {
        let mut tx = self.begin_read().await?;

        let items: Vec<BookmarkItem> = sqlx::query_as(
            "SELECT id, product_id, user_id FROM bookmark_items WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(read_error("bookmarks"))?;
        let products = fetch_bundle_index(&mut tx, ProductScope::Bookmarks(user_id)).await?;
        tx.commit().await.map_err(read_error("bookmarks"))?;

        Ok(items
            .into_iter()
            .map(|item| BookmarkItemBundle {
                product: products.get(&item.product_id).cloned(),
                item,
            })
            .collect())
    }

    async fn orders(&self, user_id: i64) -> Result<Vec<OrderBundle>> {
        let mut tx = self.begin_read().await?;

        let orders: Vec<Order> = sqlx::query_as(
            r"
            SELECT id, user_id, total, status, created_at
            FROM orders
            WHERE user_id = ?
            ORDER BY created_at DESC, id
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(read_error("orders"))?;

        let items: Vec<OrderItem> = sqlx::query_as(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.user_id = ?
            ORDER BY oi.id
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(read_error("order items"))?;

        let payments: Vec<OrderPayment> = sqlx::query_as(
            r"
            SELECT op.order_id, op.provider_id, op.amount
            FROM order_payments op
            JOIN orders o ON o.id = op.order_id
            WHERE o.user_id = ?
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(read_error("order payments"))?;
        tx.commit().await.map_err(read_error("orders"))?;

        let mut items = group_by(items, |i| i.order_id.clone());
        let mut payments: HashMap<String, OrderPayment> = payments
            .into_iter()
            .map(|p| (p.order_id.clone(), p))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| OrderBundle {
                items: items.remove(&order.id).unwrap_or_default(),
                payment: payments.remove(&order.id),
                order,
            })
            .collect())
    }

    async fn notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        sqlx::query_as(
            r"
            SELECT id, user_id, title, body, read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("notifications"))
    }
}

async fn insert_product_row(conn: &mut SqliteConnection, product: &Product) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO products
            (id, name, image, price, description, manufacturer_id, basic_color_name)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.image)
    .bind(product.price)
    .bind(&product.description)
    .bind(product.manufacturer_id)
    .bind(&product.basic_color_name)
    .execute(&mut *conn)
    .await
    .map_err(write_error("products", product.id))?;
    Ok(())
}

async fn insert_color_row(conn: &mut SqliteConnection, color: &ProductColor) -> Result<()> {
    sqlx::query("INSERT INTO product_colors (product_id, color_name, image) VALUES (?, ?, ?)")
        .bind(color.product_id)
        .bind(&color.color_name)
        .bind(&color.image)
        .execute(&mut *conn)
        .await
        .map_err(write_error(
            "product_colors",
            format!("{}/{}", color.product_id, color.color_name),
        ))?;
    Ok(())
}

async fn insert_size_row(conn: &mut SqliteConnection, size: &ProductSize) -> Result<()> {
    sqlx::query("INSERT INTO product_sizes (product_id, size) VALUES (?, ?)")
        .bind(size.product_id)
        .bind(size.size)
        .execute(&mut *conn)
        .await
        .map_err(write_error(
            "product_sizes",
            format!("{}/{}", size.product_id, size.size),
        ))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_keeps_row_order() {
        let groups = group_by(vec![(1, "a"), (2, "b"), (1, "c")], |r| r.0);
        assert_eq!(groups[&1], vec![(1, "a"), (1, "c")]);
        assert_eq!(groups[&2], vec![(2, "b")]);
    }

    #[test]
    fn test_product_scope_conditions() {
        assert_eq!(ProductScope::All.condition("id"), "?1 IS NULL");
        assert_eq!(ProductScope::All.param(), None);
        assert_eq!(ProductScope::Product(3).condition("product_id"), "product_id = ?1");
        assert!(
            ProductScope::Cart(2)
                .condition("id")
                .starts_with("id IN (SELECT product_id FROM cart_items")
        );
        assert_eq!(ProductScope::Bookmarks(2).param(), Some(2));
    }

    #[test]
    fn test_non_database_errors_map_to_database() {
        let err = write_error("products", 7)(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(msg) if msg.contains("products 7")));
    }
}
