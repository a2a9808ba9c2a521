pub mod brand;
pub mod category;
pub mod product;
pub mod user;

pub use brand::Brand;
pub use category::Category;
pub use product::Product;
pub use user::User;

/// `(collection, unique field)` pairs registered with whichever store is
/// built at startup; the store-level constraint backs the gateway's
/// duplicate pre-check.
pub const UNIQUE_KEYS: &[(&str, &str)] = &[
    ("users", "email"),
    ("products", "name"),
    ("categories", "categoryName"),
    ("brands", "brandName"),
];
