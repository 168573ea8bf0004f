//! Request body validation.
//!
//! Each schema takes the raw JSON body and returns either a typed input or a
//! [`ValidationError`] carrying every field violation. Only the fields a
//! schema names are read; anything else in the body is dropped.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::auth::UserChanges;
use crate::db::schema::{Category, ProductPatch, Role};
use crate::products::NewProduct;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PRODUCT_NAME_LEN: usize = 100;
/// Largest stock count the database can hold as an integer.
pub const MAX_STOCK: u64 = i64::MAX as u64;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Whether `email` (already trimmed and lower-cased) looks like an address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// All violations found in one request body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.join(", "))]
pub struct ValidationError(Vec<String>);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }
}

/// Validated `POST /auth/register` body.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Validated `POST /auth/login` body.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub fn validate_register(body: &Value) -> Result<RegisterInput, ValidationError> {
    let mut fields = Fields::of(body)?;
    let email = fields.email("email", true);
    let password = fields.password("password", true);
    let name = fields.text("name", "Name", false);

    match (email, password) {
        (Some(email), Some(password)) if fields.is_clean() => Ok(RegisterInput {
            email,
            password,
            name,
        }),
        _ => Err(fields.into_error()),
    }
}

/// Login only checks shape. Length rules belong to registration, so a short
/// wrong password gets the same 401 as any other wrong password.
pub fn validate_login(body: &Value) -> Result<LoginInput, ValidationError> {
    let mut fields = Fields::of(body)?;
    let email = fields.email("email", true);
    let password = fields.secret("password");

    match (email, password) {
        (Some(email), Some(password)) if fields.is_clean() => Ok(LoginInput { email, password }),
        _ => Err(fields.into_error()),
    }
}

pub fn validate_create_product(body: &Value) -> Result<NewProduct, ValidationError> {
    let mut fields = Fields::of(body)?;
    let name = fields.product_name(true);
    let description = fields.text("description", "Description", false);
    let price = fields.price(true);
    let category = fields.category(true);
    let stock = fields.stock();

    match (name, price, category) {
        (Some(name), Some(price), Some(category)) if fields.is_clean() => Ok(NewProduct {
            name,
            description,
            price,
            category,
            stock: stock.unwrap_or(0),
        }),
        _ => Err(fields.into_error()),
    }
}

pub fn validate_update_product(body: &Value) -> Result<ProductPatch, ValidationError> {
    let mut fields = Fields::of(body)?;
    let patch = ProductPatch {
        name: fields.product_name(false),
        description: fields.text("description", "Description", false),
        price: fields.price(false),
        category: fields.category(false),
        stock: fields.stock(),
    };

    fields.finish(patch)
}

/// Admin edit of any user: name, email and role.
pub fn validate_admin_update_user(body: &Value) -> Result<UserChanges, ValidationError> {
    let mut fields = Fields::of(body)?;
    let changes = UserChanges {
        name: fields.text("name", "Name", false),
        email: fields.email("email", false),
        password: None,
        role: fields.role(),
    };

    fields.finish(changes)
}

/// A user editing their own account: name, email and password. Role is not
/// read, so a user cannot promote themselves.
pub fn validate_self_update(body: &Value) -> Result<UserChanges, ValidationError> {
    let mut fields = Fields::of(body)?;
    let changes = UserChanges {
        name: fields.text("name", "Name", false),
        email: fields.email("email", false),
        password: fields.password("password", false),
        role: None,
    };

    fields.finish(changes)
}

/// Reader over a JSON object that records violations as it goes.
struct Fields<'a> {
    body: &'a Map<String, Value>,
    violations: Vec<String>,
}

impl<'a> Fields<'a> {
    fn of(body: &'a Value) -> Result<Self, ValidationError> {
        match body {
            Value::Object(body) => Ok(Self {
                body,
                violations: Vec::new(),
            }),
            _ => Err(ValidationError::new("Request body must be a JSON object")),
        }
    }

    fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    fn into_error(self) -> ValidationError {
        ValidationError(self.violations)
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.is_clean() {
            Ok(value)
        } else {
            Err(self.into_error())
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.violations.push(message.into());
    }

    /// A present, non-null value. `null` counts as absent.
    fn get(&mut self, key: &str, label: &str, required: bool) -> Option<&'a Value> {
        match self.body.get(key) {
            Some(Value::Null) | None => {
                if required {
                    self.fail(format!("{} is required", label));
                }
                None
            }
            Some(value) => Some(value),
        }
    }

    fn string(&mut self, key: &str, label: &str, required: bool) -> Option<&'a str> {
        let value = self.get(key, label, required)?;
        match value.as_str() {
            Some(s) => Some(s),
            None => {
                self.fail(format!("{} must be a string", label));
                None
            }
        }
    }

    /// Trimmed free text; blank strings count as absent.
    fn text(&mut self, key: &str, label: &str, required: bool) -> Option<String> {
        let trimmed = self.string(key, label, required)?.trim();
        if trimmed.is_empty() {
            if required {
                self.fail(format!("{} is required", label));
            }
            return None;
        }
        Some(trimmed.to_string())
    }

    fn email(&mut self, key: &str, required: bool) -> Option<String> {
        let raw = self.string(key, "Email", required)?;
        let email = raw.trim().to_lowercase();
        if is_valid_email(&email) {
            Some(email)
        } else {
            self.fail("Invalid email");
            None
        }
    }

    fn password(&mut self, key: &str, required: bool) -> Option<String> {
        let password = self.string(key, "Password", required)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            self.fail(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
            return None;
        }
        Some(password.to_string())
    }

    /// A required non-empty string, not trimmed or length-checked.
    fn secret(&mut self, key: &str) -> Option<String> {
        let value = self.string(key, "Password", true)?;
        if value.is_empty() {
            self.fail("Password is required");
            return None;
        }
        Some(value.to_string())
    }

    fn product_name(&mut self, required: bool) -> Option<String> {
        let raw = self.string("name", "Name", required)?;
        let name = raw.trim();
        if name.is_empty() {
            self.fail("Name is required");
            return None;
        }
        if name.chars().count() > MAX_PRODUCT_NAME_LEN {
            self.fail(format!(
                "Name cannot exceed {} characters",
                MAX_PRODUCT_NAME_LEN
            ));
            return None;
        }
        Some(name.to_string())
    }

    fn price(&mut self, required: bool) -> Option<f64> {
        let value = self.get("price", "Price", required)?;
        match value.as_f64() {
            Some(price) if !price.is_finite() => {
                self.fail("Price must be a number");
                None
            }
            Some(price) if price < 0.0 => {
                self.fail("Price cannot be negative");
                None
            }
            Some(price) => Some(price),
            None => {
                self.fail("Price must be a number");
                None
            }
        }
    }

    fn stock(&mut self) -> Option<u64> {
        let value = self.get("stock", "Stock", false)?;
        match value.as_u64() {
            Some(stock) if stock <= MAX_STOCK => return Some(stock),
            Some(_) => {
                self.fail(format!("Stock cannot exceed {}", MAX_STOCK));
                return None;
            }
            None => {}
        }
        match value.as_f64() {
            Some(stock) if stock < 0.0 => self.fail("Stock cannot be negative"),
            Some(_) => self.fail("Stock must be a whole number"),
            None => self.fail("Stock must be a number"),
        }
        None
    }

    fn category(&mut self, required: bool) -> Option<Category> {
        let raw = self.string("category", "Category", required)?;
        let category = Category::parse(raw);
        if category.is_none() {
            let allowed: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
            self.fail(format!("Category must be one of: {}", allowed.join(", ")));
        }
        category
    }

    fn role(&mut self) -> Option<Role> {
        let raw = self.string("role", "Role", false)?;
        let role = Role::parse(raw);
        if role.is_none() {
            self.fail("Role must be one of: user, admin");
        }
        role
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_valid() {
        let input = validate_register(&json!({
            "email": " A@X.com ",
            "password": "secret1",
            "name": "  Alice ",
            "role": "admin"
        }))
        .unwrap();

        assert_eq!(input.email, "a@x.com");
        assert_eq!(input.password, "secret1");
        assert_eq!(input.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_register_aggregates_violations() {
        let err = validate_register(&json!({ "email": "nope", "password": "123" })).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid email, Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_register_missing_fields() {
        let err = validate_register(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Email is required, Password is required");
    }

    #[test]
    fn test_non_object_body() {
        let err = validate_login(&json!(["a@x.com", "secret1"])).unwrap_err();
        assert_eq!(err.to_string(), "Request body must be a JSON object");
    }

    #[test]
    fn test_login_type_errors() {
        let err = validate_login(&json!({ "email": 5, "password": true })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Email must be a string, Password must be a string"
        );
    }

    #[test]
    fn test_login_accepts_short_password() {
        let input = validate_login(&json!({ "email": "a@x.com", "password": "wrong" })).unwrap();
        assert_eq!(input.password, "wrong");

        let err = validate_login(&json!({ "email": "a@x.com", "password": "" })).unwrap_err();
        assert_eq!(err.to_string(), "Password is required");
    }

    #[test]
    fn test_stock_upper_bound() {
        let at_limit = validate_create_product(&json!({
            "name": "Widget",
            "price": 1,
            "category": "other",
            "stock": i64::MAX
        }))
        .unwrap();
        assert_eq!(at_limit.stock, MAX_STOCK);

        let err = validate_create_product(&json!({
            "name": "Widget",
            "price": 1,
            "category": "other",
            "stock": u64::MAX
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), format!("Stock cannot exceed {}", MAX_STOCK));

        let err = validate_update_product(&json!({ "stock": MAX_STOCK + 1 })).unwrap_err();
        assert_eq!(err.to_string(), format!("Stock cannot exceed {}", MAX_STOCK));
    }

    #[test]
    fn test_email_check() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[test]
    fn test_create_product_defaults_and_drops_unknown() {
        let product = validate_create_product(&json!({
            "name": " Widget ",
            "price": 9.99,
            "category": "other",
            "owner": "someone-else",
            "user": "someone-else"
        }))
        .unwrap();

        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, 9.99);
        assert_eq!(product.category, Category::Other);
        assert_eq!(product.stock, 0);
        assert!(product.description.is_none());
    }

    #[test]
    fn test_create_product_violations() {
        let err = validate_create_product(&json!({
            "name": "x".repeat(101),
            "price": -1,
            "category": "toys",
            "stock": 1.5
        }))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Name cannot exceed 100 characters, \
             Price cannot be negative, \
             Category must be one of: electronics, clothing, food, books, other, \
             Stock must be a whole number"
        );
    }

    #[test]
    fn test_create_product_required_fields() {
        let err = validate_create_product(&json!({ "name": "   " })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Name is required, Price is required, Category is required"
        );
    }

    #[test]
    fn test_name_length_boundary() {
        let ok = validate_create_product(&json!({
            "name": "x".repeat(100),
            "price": 0,
            "category": "books"
        }));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_update_product_partial() {
        let patch = validate_update_product(&json!({ "stock": 3 })).unwrap();
        assert_eq!(
            patch,
            ProductPatch {
                stock: Some(3),
                ..Default::default()
            }
        );

        assert_eq!(
            validate_update_product(&json!({})).unwrap(),
            ProductPatch::default()
        );
    }

    #[test]
    fn test_update_product_still_checks_present_fields() {
        let err = validate_update_product(&json!({
            "price": "cheap",
            "stock": -4,
            "category": "Food"
        }))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Price must be a number, Category must be one of: electronics, clothing, food, books, other, Stock cannot be negative"
        );
    }

    #[test]
    fn test_admin_update_user() {
        let changes = validate_admin_update_user(&json!({
            "role": "admin",
            "email": "New@X.com",
            "password": "ignored-here"
        }))
        .unwrap();

        assert_eq!(changes.role, Some(Role::Admin));
        assert_eq!(changes.email.as_deref(), Some("new@x.com"));
        assert!(changes.password.is_none());

        let err = validate_admin_update_user(&json!({ "role": "root" })).unwrap_err();
        assert_eq!(err.to_string(), "Role must be one of: user, admin");
    }

    #[test]
    fn test_self_update_ignores_role() {
        let changes = validate_self_update(&json!({
            "role": "admin",
            "password": "newsecret"
        }))
        .unwrap();

        assert!(changes.role.is_none());
        assert_eq!(changes.password.as_deref(), Some("newsecret"));

        let err = validate_self_update(&json!({ "password": "short" })).unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }
}
