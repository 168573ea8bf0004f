use serde::{Deserialize, Serialize};
use std::fmt;
use surrealdb::sql::Datetime;

use crate::types::{ProductId, UserId};

/// Role attached to every user account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account; sees only its own products
    #[default]
    User,
    /// Administrator; sees and manages everything
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Food,
    Books,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Clothing,
        Category::Food,
        Category::Books,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Clothing => "clothing",
            Self::Food => "food",
            Self::Books => "books",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted user record (table: `user`, record key = `uid`).
///
/// Carries the password hash, so it must never be serialized into a
/// response. Use [`UserProfile`] for anything that leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable identifier, also the record key
    pub uid: UserId,
    /// Trimmed, lower-cased email; unique across the table
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Optional display name
    pub name: Option<String>,
    pub role: Role,
    /// When the user registered
    pub created_at: Option<Datetime>,
    /// Last update time
    pub updated_at: Option<Datetime>,
}

/// Payload for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub uid: UserId,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Role,
}

/// Partial update merged into a user record. Absent fields are left alone.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Outbound view of a user: everything except the credential secret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.uid,
            email: record.email,
            name: record.name,
            role: record.role,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Persisted product record (table: `product`, record key = `uid`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub uid: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
    pub stock: u64,
    /// Owning user; a weak reference kept consistent by cascade delete
    pub owner: UserId,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

/// Payload for creating a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub uid: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
    pub stock: u64,
    pub owner: UserId,
}

/// Partial update merged into a product record.
///
/// There is deliberately no `owner` field: ownership never changes after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
}

/// Owner details populated into admin product listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerSummary {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}

impl From<&UserRecord> for OwnerSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.uid.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Outbound view of a product.
///
/// `O` is the owner representation: a bare [`UserId`] for owner-facing
/// routes, or an [`OwnerSummary`] when an admin lists everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView<O = UserId> {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
    pub stock: u64,
    pub owner: O,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

impl ProductView {
    pub fn with_owner<O>(self, owner: O) -> ProductView<O> {
        ProductView {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            stock: self.stock,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<ProductRecord> for ProductView {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: record.uid,
            name: record.name,
            description: record.description,
            price: record.price,
            category: record.category,
            stock: record.stock,
            owner: record.owner,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserRecord {
        UserRecord {
            uid: UserId::new("u1"),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            name: Some("Alice".to_string()),
            role: Role::User,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("books"), Some(Category::Books));
        assert_eq!(Category::parse("Books"), None);
        assert_eq!(Category::parse("toys"), None);
    }

    #[test]
    fn test_profile_drops_password_hash() {
        let profile = UserProfile::from(sample_user());
        let json = serde_json::to_string(&profile).unwrap();

        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert_eq!(profile.id.as_str(), "u1");
    }

    #[test]
    fn test_product_patch_skips_absent_fields() {
        let patch = ProductPatch {
            price: Some(4.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json, serde_json::json!({ "price": 4.5 }));
        assert_eq!(
            serde_json::to_value(ProductPatch::default()).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn test_product_view_with_owner_summary() {
        let user = sample_user();
        let view = ProductView::from(ProductRecord {
            uid: ProductId::new("p1"),
            name: "Widget".to_string(),
            description: None,
            price: 9.99,
            category: Category::Other,
            stock: 0,
            owner: user.uid.clone(),
            created_at: None,
            updated_at: None,
        })
        .with_owner(OwnerSummary::from(&user));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["owner"]["email"], "a@x.com");
        assert_eq!(json["category"], "other");
    }
}
