//! Immutable demo dataset for fresh databases.
//!
//! [`SeedCatalog`] is built once, usually with [`SeedCatalog::demo`], and
//! handed to the seed loader explicitly. Nothing in here is global or
//! mutable: the loader only reads from it.

use crate::model::{
    Advertisement, Location, Manufacturer, PaymentProvider, Product, ProductColor, ProductSize,
    ResourceRef, User, UserPaymentProvider, hash_password,
};

const DEMO_DESCRIPTION: &str = "This is the description text that is supposed to be long enough to show how the UI looks, so it's not a real text.\n";

/// Size every demo product is offered in.
const DEMO_SIZE: i64 = 38;

/// A product together with the variant rows inserted alongside it.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductSeed {
    /// The product row
    pub product: Product,
    /// Colour variants; the first one is the product's basic colour
    pub colors: Vec<ProductColor>,
    /// Available sizes
    pub sizes: Vec<ProductSize>,
}

impl ProductSeed {
    /// Build a seed whose first colour is the product's basic colour and main
    /// image, followed by `extra_colors` sharing `variant_image`.
    #[must_use]
    pub fn with_colors(product: Product, variant_image: &ResourceRef, extra_colors: &[&str]) -> Self {
        let mut colors = Vec::with_capacity(extra_colors.len() + 1);
        colors.push(ProductColor::new(
            product.id,
            product.basic_color_name.clone(),
            product.image.clone(),
        ));
        colors.extend(
            extra_colors
                .iter()
                .map(|name| ProductColor::new(product.id, *name, variant_image.clone())),
        );
        let sizes = vec![ProductSize::new(product.id, DEMO_SIZE)];
        Self {
            product,
            colors,
            sizes,
        }
    }
}

/// The fixed dataset loaded into a freshly created database.
#[derive(Clone, Debug, PartialEq)]
pub struct SeedCatalog {
    user: User,
    manufacturers: Vec<Manufacturer>,
    advertisements: Vec<Advertisement>,
    products: Vec<ProductSeed>,
    payment_providers: Vec<PaymentProvider>,
    user_payment_providers: Vec<UserPaymentProvider>,
    location: Location,
}

impl SeedCatalog {
    /// Assemble a catalog from explicit parts.
    #[must_use]
    pub const fn new(
        user: User,
        manufacturers: Vec<Manufacturer>,
        advertisements: Vec<Advertisement>,
        products: Vec<ProductSeed>,
        payment_providers: Vec<PaymentProvider>,
        user_payment_providers: Vec<UserPaymentProvider>,
        location: Location,
    ) -> Self {
        Self {
            user,
            manufacturers,
            advertisements,
            products,
            payment_providers,
            user_payment_providers,
            location,
        }
    }

    /// The demo dataset: 4 manufacturers, 4 advertisements, 5 products with
    /// their colour and size variants, 3 payment providers with one card
    /// each, the local user and their location.
    #[must_use]
    pub fn demo() -> Self {
        let manufacturers = vec![
            Manufacturer::new(1, "For Family", ResourceRef::drawable("ic_round_family_restroom_24")),
            Manufacturer::new(2, "Single", ResourceRef::drawable("ic_baseline_directions_run_24")),
            Manufacturer::new(3, "Student", ResourceRef::drawable("ic_round_school_24")),
            Manufacturer::new(4, "Vacation", ResourceRef::drawable("ic_round_wb_sunny_24")),
        ];

        let advertisements = (1..=4)
            .map(|id| Advertisement {
                id,
                image: ResourceRef::drawable(&format!("image{id}")),
                rank: id,
                display_flag: false,
            })
            .collect();

        let products = vec![
            demo_product(1, "Whole 2 bedrooms apartment", "image05", 20000.0, 1, "dark-green", &["lemon"]),
            demo_product(3, "Furnished 1-bedroom apartment", "image06", 15000.0, 1, "gold", &["gray", "pink", "red"]),
            demo_product(7, "Practical and modern 1 bedroom apartment", "image07", 32000.0, 1, "black", &["pink", "lemon"]),
            demo_product(10, "Cozy 1-bedroom apartment with patio", "image08", 14900.0, 2, "green", &["red"]),
            demo_product(12, "Furnished 1-bedroom apartment", "image1", 15900.0, 2, "gray", &["black", "red"]),
        ];

        let payment_providers = vec![
            PaymentProvider {
                id: "apple".to_string(),
                title: ResourceRef::string("apple_pay"),
                icon: ResourceRef::drawable("ic_apple"),
            },
            PaymentProvider {
                id: "master".to_string(),
                title: ResourceRef::string("master_card"),
                icon: ResourceRef::drawable("ic_master_card"),
            },
            PaymentProvider {
                id: "visa".to_string(),
                title: ResourceRef::string("visa"),
                icon: ResourceRef::drawable("ic_visa"),
            },
        ];

        let user_payment_providers = [
            ("apple", "8402-5739-2039-5784"),
            ("master", "3323-8202-4748-2009"),
            ("visa", "7483-02836-4839-2833"),
        ]
        .into_iter()
        .map(|(provider_id, card_number)| UserPaymentProvider {
            provider_id: provider_id.to_string(),
            card_number: card_number.to_string(),
        })
        .collect();

        let user = User {
            user_id: 1,
            name: "Merwan".to_string(),
            profile: ResourceRef::drawable("ic_profile_empty"),
            phone: "+249922943879".to_string(),
            email: "merwan@example.com".to_string(),
            password_hash: hash_password("12344321"),
            token: "ds2f434ls2ks2lsj2ls".to_string(),
        };

        let location = Location {
            id: 1,
            address: "AlTaif 51, st 5".to_string(),
            city: "Khartoum".to_string(),
            country: "Sudan".to_string(),
        };

        Self::new(
            user,
            manufacturers,
            advertisements,
            products,
            payment_providers,
            user_payment_providers,
            location,
        )
    }

    /// The local user.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Manufacturers in insertion order.
    #[must_use]
    pub fn manufacturers(&self) -> &[Manufacturer] {
        &self.manufacturers
    }

    /// Advertisements in insertion order.
    #[must_use]
    pub fn advertisements(&self) -> &[Advertisement] {
        &self.advertisements
    }

    /// Products with their variants, in insertion order.
    #[must_use]
    pub fn products(&self) -> &[ProductSeed] {
        &self.products
    }

    /// Payment providers in insertion order.
    #[must_use]
    pub fn payment_providers(&self) -> &[PaymentProvider] {
        &self.payment_providers
    }

    /// Cards of the local user, in insertion order.
    #[must_use]
    pub fn user_payment_providers(&self) -> &[UserPaymentProvider] {
        &self.user_payment_providers
    }

    /// The local user's location.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }
}

fn demo_product(
    id: i64,
    name: &str,
    image: &str,
    price: f64,
    manufacturer_id: i64,
    basic_color: &str,
    extra_colors: &[&str],
) -> ProductSeed {
    let image = ResourceRef::drawable(image);
    let product = Product::new(
        id,
        name,
        image.clone(),
        price,
        DEMO_DESCRIPTION,
        manufacturer_id,
        basic_color,
    );
    ProductSeed::with_colors(product, &image, extra_colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_manufacturers() {
        let catalog = SeedCatalog::demo();
        let names: Vec<_> = catalog.manufacturers().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["For Family", "Single", "Student", "Vacation"]);
    }

    #[test]
    fn test_demo_product_colors() {
        let catalog = SeedCatalog::demo();
        let product_3 = catalog
            .products()
            .iter()
            .find(|p| p.product.id == 3);
        let colors: Vec<_> = product_3
            .map(|p| p.colors.iter().map(|c| c.color_name.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(colors, ["gold", "gray", "pink", "red"]);

        let counts: Vec<_> = catalog
            .products()
            .iter()
            .map(|p| (p.product.id, p.colors.len()))
            .collect();
        assert_eq!(counts, [(1, 2), (3, 4), (7, 3), (10, 2), (12, 3)]);
    }

    #[test]
    fn test_first_color_is_basic_color_with_main_image() {
        for seed in SeedCatalog::demo().products() {
            let first = &seed.colors[0];
            assert_eq!(first.color_name, seed.product.basic_color_name);
            assert_eq!(first.image, seed.product.image);
            assert!(seed.colors.iter().all(|c| c.product_id == seed.product.id));
        }
    }

    #[test]
    fn test_every_product_has_single_size() {
        for seed in SeedCatalog::demo().products() {
            assert_eq!(seed.sizes, vec![ProductSize::new(seed.product.id, 38)]);
        }
    }

    #[test]
    fn test_products_reference_seeded_manufacturers() {
        let catalog = SeedCatalog::demo();
        for seed in catalog.products() {
            assert!(
                catalog
                    .manufacturers()
                    .iter()
                    .any(|m| m.id == seed.product.manufacturer_id)
            );
        }
        for link in catalog.user_payment_providers() {
            assert!(
                catalog
                    .payment_providers()
                    .iter()
                    .any(|p| p.id == link.provider_id)
            );
        }
    }

    #[test]
    fn test_demo_user_password_is_hashed() {
        let user = SeedCatalog::demo().user().clone();
        assert_ne!(user.password_hash, "12344321");
        assert!(user.verify_password("12344321"));
    }

    #[test]
    fn test_advertisements_ranked_by_id() {
        let catalog = SeedCatalog::demo();
        assert_eq!(catalog.advertisements().len(), 4);
        for ad in catalog.advertisements() {
            assert_eq!(ad.rank, ad.id);
            assert!(!ad.display_flag);
        }
    }
}
