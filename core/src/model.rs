//! Catalog, account and shopping records.
//!
//! Every persisted record derives [`sqlx::FromRow`] so store implementations
//! can map rows directly. Fields marked `#[sqlx(skip)]` are transient: they are
//! never read from or written to storage and are only filled in by projection
//! (see the `storefront-projections` crate).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque reference into the application's resource bundle.
///
/// Images, icons and translated labels are not owned by the catalog; the
/// catalog only stores the key the display layer resolves, such as
/// `drawable/image05` or `string/apple_pay`.
///
/// # Example
///
/// ```
/// use storefront_core::ResourceRef;
///
/// let icon = ResourceRef::drawable("ic_visa");
/// assert_eq!(icon.as_str(), "drawable/ic_visa");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    /// Create a reference from a raw resource key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Reference to a drawable resource.
    #[must_use]
    pub fn drawable(name: &str) -> Self {
        Self(format!("drawable/{name}"))
    }

    /// Reference to a string resource.
    #[must_use]
    pub fn string(name: &str) -> Self {
        Self(format!("string/{name}"))
    }

    /// The raw resource key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product grouping shown as a category in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Manufacturer {
    /// Manufacturer identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Icon shown next to the name
    pub icon: ResourceRef,
    /// Products of this manufacturer (transient, filled by projection)
    #[sqlx(skip)]
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Manufacturer {
    /// Create a manufacturer with no projected products.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, icon: ResourceRef) -> Self {
        Self {
            id,
            name: name.into(),
            icon,
            products: Vec::new(),
        }
    }
}

/// A sellable catalog item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Product identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Main image
    pub image: ResourceRef,
    /// Unit price
    pub price: f64,
    /// Long description
    pub description: String,
    /// Owning manufacturer
    pub manufacturer_id: i64,
    /// Name of the colour the main image shows
    pub basic_color_name: String,

    /// Resolved manufacturer (transient)
    #[sqlx(skip)]
    #[serde(default)]
    pub manufacturer: Option<Manufacturer>,
    /// Colour variants, the "copies" of this product (transient)
    #[sqlx(skip)]
    #[serde(default)]
    pub colors: Vec<ProductColor>,
    /// Available sizes (transient)
    #[sqlx(skip)]
    #[serde(default)]
    pub sizes: Vec<ProductSize>,
    /// Customer reviews (transient)
    #[sqlx(skip)]
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Create a product with no projected relations.
    #[must_use]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        image: ResourceRef,
        price: f64,
        description: impl Into<String>,
        manufacturer_id: i64,
        basic_color_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image,
            price,
            description: description.into(),
            manufacturer_id,
            basic_color_name: basic_color_name.into(),
            manufacturer: None,
            colors: Vec::new(),
            sizes: Vec::new(),
            reviews: Vec::new(),
        }
    }

    /// Price after taking `percent` off.
    ///
    /// The percentage is clamped to `0..=100`, so the result is never
    /// negative and never above the list price.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_core::{Product, ResourceRef};
    ///
    /// let product = Product::new(1, "Flat", ResourceRef::drawable("image05"), 200.0, "", 1, "gold");
    /// assert!((product.discounted_price(25) - 150.0).abs() < f64::EPSILON);
    /// assert!((product.discounted_price(150)).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn discounted_price(&self, percent: u8) -> f64 {
        let percent = f64::from(percent.min(100));
        self.price - self.price * (percent / 100.0)
    }

    /// Image for the given colour variant, falling back to the main image.
    #[must_use]
    pub fn image_for_color(&self, color_name: &str) -> &ResourceRef {
        self.colors
            .iter()
            .find(|c| c.color_name == color_name)
            .map_or(&self.image, |c| &c.image)
    }
}

/// A colour variant of a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductColor {
    /// Parent product
    pub product_id: i64,
    /// Colour name, unique per product
    pub color_name: String,
    /// Image showing the product in this colour
    pub image: ResourceRef,
}

impl ProductColor {
    /// Create a colour variant.
    #[must_use]
    pub fn new(product_id: i64, color_name: impl Into<String>, image: ResourceRef) -> Self {
        Self {
            product_id,
            color_name: color_name.into(),
            image,
        }
    }
}

/// An available size of a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSize {
    /// Parent product
    pub product_id: i64,
    /// Numeric size
    pub size: i64,
}

impl ProductSize {
    /// Create a size row.
    #[must_use]
    pub const fn new(product_id: i64, size: i64) -> Self {
        Self { product_id, size }
    }
}

/// A payment method the application supports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentProvider {
    /// Provider key such as `visa`
    pub id: String,
    /// Display title
    pub title: ResourceRef,
    /// Provider logo
    pub icon: ResourceRef,
}

/// A card the local user registered with a payment provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPaymentProvider {
    /// Provider this card belongs to
    pub provider_id: String,
    /// Card number as entered
    pub card_number: String,
}

/// The local user account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// User identifier
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Profile picture
    pub profile: ResourceRef,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Salted password digest, as produced by [`hash_password`]
    pub password_hash: String,
    /// Session token
    pub token: String,
}

impl User {
    /// Check a plaintext password against the stored hash.
    ///
    /// The digests are compared in constant time. A malformed stored hash
    /// never verifies.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        let Some((salt, digest)) = self.password_hash.split_once(HASH_SEPARATOR) else {
            return false;
        };
        let expected = salted_digest(salt, candidate);
        constant_time_eq::constant_time_eq(expected.as_bytes(), digest.as_bytes())
    }
}

const HASH_SEPARATOR: char = '$';
const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
///
/// The result has the form `<salt>$<digest>`, both hex-encoded, where the
/// digest is SHA-256 over the salt followed by the password. Credentials are
/// never persisted in plaintext, including the demo user.
#[must_use]
pub fn hash_password(plain: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    hash_password_with_salt(plain, &salt)
}

/// Hash a password with a caller-supplied salt.
///
/// Deterministic, for fixtures and tests; use [`hash_password`] otherwise.
#[must_use]
pub fn hash_password_with_salt(plain: &str, salt: &[u8]) -> String {
    let salt: String = salt.iter().map(|b| format!("{b:02x}")).collect();
    let digest = salted_digest(&salt, plain);
    format!("{salt}{HASH_SEPARATOR}{digest}")
}

fn salted_digest(salt: &str, plain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(plain.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Delivery address of the local user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    /// Location identifier
    pub id: i64,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Country
    pub country: String,
}

/// A promotional banner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Advertisement {
    /// Advertisement identifier
    pub id: i64,
    /// Banner image
    pub image: ResourceRef,
    /// Ordering rank, lower first
    pub rank: i64,
    /// Display flag
    pub display_flag: bool,
}

/// A customer review of a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    /// Review identifier
    pub id: i64,
    /// Reviewed product
    pub product_id: i64,
    /// Author
    pub user_id: i64,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Free text
    pub comment: String,
    /// When the review was written
    pub created_at: DateTime<Utc>,
}

/// A product placed in the user's cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    /// Cart row identifier
    pub id: i64,
    /// Product in the cart
    pub product_id: i64,
    /// Owner of the cart
    pub user_id: i64,
    /// Number of units
    pub quantity: i64,
    /// Resolved product (transient)
    #[sqlx(skip)]
    #[serde(default)]
    pub product: Option<Product>,
}

impl CartItem {
    /// Create a cart row with no projected product.
    #[must_use]
    pub const fn new(id: i64, product_id: i64, user_id: i64, quantity: i64) -> Self {
        Self {
            id,
            product_id,
            user_id,
            quantity,
            product: None,
        }
    }
}

/// A product the user bookmarked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookmarkItem {
    /// Bookmark row identifier
    pub id: i64,
    /// Bookmarked product
    pub product_id: i64,
    /// Owner of the bookmark
    pub user_id: i64,
}

/// A placed order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    /// Order identifier
    pub id: String,
    /// Customer
    pub user_id: i64,
    /// Order total
    pub total: f64,
    /// Lifecycle status such as `placed` or `delivered`
    pub status: String,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
    /// Order lines (transient)
    #[sqlx(skip)]
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Payment (transient)
    #[sqlx(skip)]
    #[serde(default)]
    pub payment: Option<OrderPayment>,
}

/// A line of an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Line identifier
    pub id: i64,
    /// Parent order
    pub order_id: String,
    /// Ordered product
    pub product_id: i64,
    /// Number of units
    pub quantity: i64,
}

/// How an order was paid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderPayment {
    /// Paid order
    pub order_id: String,
    /// Payment provider used
    pub provider_id: String,
    /// Amount charged
    pub amount: f64,
}

/// A message shown in the user's notification list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Notification identifier
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    /// Headline
    pub title: String,
    /// Body text
    pub body: String,
    /// Whether the user has opened it
    pub read: bool,
    /// When it was created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product::new(
            3,
            "Furnished 1-bedroom apartment",
            ResourceRef::drawable("image06"),
            15000.0,
            "desc",
            1,
            "gold",
        )
    }

    #[test]
    fn test_discounted_price() {
        let p = product();
        assert!((p.discounted_price(0) - 15000.0).abs() < f64::EPSILON);
        assert!((p.discounted_price(10) - 13500.0).abs() < 1e-9);
        assert!(p.discounted_price(100).abs() < f64::EPSILON);
        assert!(p.discounted_price(255).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_for_color_falls_back_to_main_image() {
        let mut p = product();
        p.colors.push(ProductColor::new(3, "red", ResourceRef::drawable("image06_red")));

        assert_eq!(p.image_for_color("red").as_str(), "drawable/image06_red");
        assert_eq!(p.image_for_color("blue").as_str(), "drawable/image06");
    }

    fn user_with_hash(password_hash: String) -> User {
        User {
            user_id: 1,
            name: "Merwan".to_string(),
            profile: ResourceRef::drawable("ic_profile_empty"),
            phone: String::new(),
            email: String::new(),
            password_hash,
            token: String::new(),
        }
    }

    #[test]
    fn test_password_hash_round_trip() {
        let user = user_with_hash(hash_password("12344321"));

        // 16 salt bytes, separator, SHA-256 digest
        assert_eq!(user.password_hash.len(), 32 + 1 + 64);
        assert!(!user.password_hash.contains("12344321"));
        assert!(user.verify_password("12344321"));
        assert!(!user.verify_password("wrong"));
        assert!(!user.verify_password(""));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let first = hash_password("12344321");
        let second = hash_password("12344321");
        assert_ne!(first, second);

        let salted = hash_password_with_salt("12344321", &[7; 16]);
        assert_eq!(salted, hash_password_with_salt("12344321", &[7; 16]));
        assert_ne!(salted, hash_password_with_salt("12344321", &[8; 16]));
        assert!(salted.starts_with("07070707"));
    }

    #[test]
    fn test_verify_rejects_tampered_or_malformed_hashes() {
        let hash = hash_password_with_salt("secret", &[1; 16]);
        let (salt, digest) = hash.split_once('$').unwrap();

        // Same digest under another salt
        let moved = format!("{}${digest}", "02".repeat(16));
        assert!(!user_with_hash(moved).verify_password("secret"));

        // Truncated digest
        let truncated = format!("{salt}${}", &digest[..63]);
        assert!(!user_with_hash(truncated).verify_password("secret"));

        // Unsalted legacy digest and empty hash
        assert!(!user_with_hash(digest.to_string()).verify_password("secret"));
        assert!(!user_with_hash(String::new()).verify_password(""));

        assert!(user_with_hash(hash).verify_password("secret"));
    }

    #[test]
    fn test_resource_ref_serializes_as_plain_string() {
        let json = serde_json::to_string(&ResourceRef::string("visa")).unwrap();
        assert_eq!(json, "\"string/visa\"");
    }

    #[test]
    fn test_transient_fields_default_when_missing() {
        let json = r#"{"id":1,"name":"Single","icon":"drawable/ic_run"}"#;
        let m: Manufacturer = serde_json::from_str(json).unwrap();
        assert_eq!(m.id, 1);
        assert!(m.products.is_empty());
    }
}
