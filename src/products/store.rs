use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info};

use crate::db::Db;
use crate::db::schema::{
    Category, OwnerSummary, ProductCreate, ProductPatch, ProductRecord, ProductView, UserRecord,
};
use crate::products::scope::OwnerScope;
use crate::types::{ProductId, UserId};

/// A validated product ready to be stored. The owner is not part of it; the
/// store stamps the creator.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
    pub stock: u64,
}

/// Product store for database operations.
pub struct ProductStore {
    db: Db,
}

impl ProductStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a product owned by `owner`.
    pub async fn create(&self, owner: &UserId, product: NewProduct) -> Result<ProductRecord> {
        let create = ProductCreate {
            uid: ProductId::generate(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            stock: product.stock,
            owner: owner.clone(),
        };

        let query = "CREATE type::thing('product', $uid) CONTENT $data";

        let mut res = self
            .db
            .query(query)
            .bind(("uid", create.uid.clone()))
            .bind(("data", create))
            .await?;

        let products: Vec<ProductRecord> = res.take(0)?;
        let product = products
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create product"))?;

        info!(product_id = %product.uid, owner = %product.owner, "product created");
        Ok(product)
    }

    /// Products owned by one user, newest first.
    pub async fn list_owned(&self, owner: &UserId) -> Result<Vec<ProductRecord>> {
        let query = "SELECT * FROM product WHERE owner = $owner ORDER BY created_at DESC";

        let mut res = self.db.query(query).bind(("owner", owner.clone())).await?;

        let products: Vec<ProductRecord> = res.take(0)?;
        Ok(products)
    }

    /// Every product, newest first, with owner details filled in.
    ///
    /// The owner is `None` if the user record is gone, which only happens if
    /// something bypassed the cascade delete.
    pub async fn list_all_with_owners(&self) -> Result<Vec<ProductView<Option<OwnerSummary>>>> {
        let mut res = self
            .db
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .query("SELECT * FROM user")
            .await?;

        let products: Vec<ProductRecord> = res.take(0)?;
        let users: Vec<UserRecord> = res.take(1)?;

        let owners: HashMap<UserId, OwnerSummary> = users
            .iter()
            .map(|u| (u.uid.clone(), OwnerSummary::from(u)))
            .collect();

        Ok(products
            .into_iter()
            .map(|p| {
                let owner = owners.get(&p.owner).cloned();
                ProductView::from(p).with_owner(owner)
            })
            .collect())
    }

    /// Load one product if it exists inside `scope`.
    pub async fn find(&self, scope: &OwnerScope, id: &ProductId) -> Result<Option<ProductRecord>> {
        let query = format!(
            "SELECT * FROM type::thing('product', $id) {}",
            scope.filter()
        );

        let mut statement = self.db.query(query).bind(("id", id.clone()));
        if let Some(owner) = scope.owner() {
            statement = statement.bind(("owner", owner.clone()));
        }

        let products: Vec<ProductRecord> = statement.await?.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Merge `patch` into a product inside `scope`. `None` means no such
    /// product in scope, and nothing was written.
    pub async fn update(
        &self,
        scope: &OwnerScope,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<ProductRecord>> {
        let query = format!(
            "UPDATE type::thing('product', $id) MERGE $patch {} RETURN AFTER",
            scope.filter()
        );

        let mut statement = self
            .db
            .query(query)
            .bind(("id", id.clone()))
            .bind(("patch", patch));
        if let Some(owner) = scope.owner() {
            statement = statement.bind(("owner", owner.clone()));
        }

        let products: Vec<ProductRecord> = statement.await?.take(0)?;
        let updated = products.into_iter().next();

        if updated.is_some() {
            debug!(product_id = %id, "product updated");
        }
        Ok(updated)
    }

    /// Delete a product inside `scope`. Returns `false` if nothing matched.
    pub async fn delete(&self, scope: &OwnerScope, id: &ProductId) -> Result<bool> {
        let query = format!(
            "DELETE type::thing('product', $id) {} RETURN BEFORE",
            scope.filter()
        );

        let mut statement = self.db.query(query).bind(("id", id.clone()));
        if let Some(owner) = scope.owner() {
            statement = statement.bind(("owner", owner.clone()));
        }

        let deleted: Vec<ProductRecord> = statement.await?.take(0)?;
        if deleted.is_empty() {
            return Ok(false);
        }

        info!(product_id = %id, "product deleted");
        Ok(true)
    }
}
