use super::model::{Product, ProductChanges};
use crate::persistence::{DbContext, DocumentCollection, field_set};
use crate::prelude::*;

/// Data access for products. `Ok(None)` is the not-found signal.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Product>>;
    async fn create(&self, product: Product) -> Result<Product>;
    async fn update(&self, id: &str, changes: ProductChanges) -> Result<Option<Product>>;
    async fn delete_by_id(&self, id: &str) -> Result<Option<Product>>;
    async fn delete_all(&self) -> Result<u64>;
}

pub struct ProductRepositoryImpl {
    products: Arc<dyn DocumentCollection<Product>>,
}

impl ProductRepositoryImpl {
    pub fn new(products: Arc<dyn DocumentCollection<Product>>) -> Self {
        Self { products }
    }
}

// The collection name is configuration, so the handle is opened here
// rather than injected as a field.
impl Injectable for ProductRepositoryImpl {
    fn inject(container: &Container) -> Result<Self> {
        let db = container.resolve::<DbContext>()?;
        let products = db.collection::<Product>(&db.settings().products_collection_name);
        Ok(Self::new(products))
    }
}

#[async_trait]
impl ProductRepository for ProductRepositoryImpl {
    async fn list(&self) -> Result<Vec<Product>> {
        let products = self.products.find_all().await?;
        tracing::debug!(
            collection = self.products.name(),
            count = products.len(),
            "listed products"
        );
        Ok(products)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.products.find_by_id(id).await?)
    }

    async fn create(&self, product: Product) -> Result<Product> {
        self.products.insert_one(&product).await?;
        tracing::debug!(id = %product.id, "inserted product");
        Ok(product)
    }

    async fn update(&self, id: &str, changes: ProductChanges) -> Result<Option<Product>> {
        let fields = field_set(&changes)?;
        let updated = self.products.update_fields(id, fields).await?;
        tracing::debug!(id, found = updated.is_some(), "updated product");
        Ok(updated)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Product>> {
        let deleted = self.products.delete_by_id(id).await?;
        tracing::debug!(id, found = deleted.is_some(), "deleted product");
        Ok(deleted)
    }

    async fn delete_all(&self) -> Result<u64> {
        let removed = self.products.delete_all().await?;
        tracing::debug!(removed, "deleted all products");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::StoreError;

    fn repository() -> ProductRepositoryImpl {
        let db = DbContext::in_memory("ProductDb");
        ProductRepositoryImpl::new(db.collection::<Product>("Products"))
    }

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
        }
    }

    #[tokio::test]
    async fn inject_opens_the_configured_collection() {
        let db = DbContext::in_memory("ProductDb");
        let container = ContainerBuilder::new().register(db.clone()).build();

        let repo = ProductRepositoryImpl::inject(&container).unwrap();
        repo.create(product("p-1", "Product1", 10.0)).await.unwrap();

        let products = db.collection::<Product>(&db.settings().products_collection_name);
        assert_eq!(products.name(), "Products");
        assert_eq!(products.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_of_empty_collection_is_empty() {
        assert!(repository().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_returns_product_unchanged() {
        let repo = repository();
        let created = repo.create(product("p-1", "Product1", 10.0)).await.unwrap();
        assert_eq!(created, product("p-1", "Product1", 10.0));
        assert_eq!(
            repo.get_by_id("p-1").await.unwrap(),
            Some(product("p-1", "Product1", 10.0))
        );
    }

    #[tokio::test]
    async fn create_with_existing_id_fails() {
        let repo = repository();
        repo.create(product("p-1", "Product1", 10.0)).await.unwrap();
        let err = repo
            .create(product("p-1", "Other", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProductPocError::Store(StoreError::DuplicateKey { .. })
        ));
    }

    #[tokio::test]
    async fn update_overwrites_fields_and_keeps_id() {
        let repo = repository();
        repo.create(product("p-1", "Product1", 10.0)).await.unwrap();

        let changes = product("ignored", "Product2", 20.0).changes();
        let updated = repo.update("p-1", changes).await.unwrap().unwrap();

        assert_eq!(updated.id, "p-1");
        assert_eq!(updated.name, "Product2");
        assert_eq!(updated.description, "Product2 description");
        assert_eq!(updated.price, 20.0);
        assert_eq!(repo.get_by_id("p-1").await.unwrap(), Some(updated));
        assert_eq!(repo.get_by_id("ignored").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_everywhere() {
        let repo = repository();
        repo.create(product("p-1", "Product1", 10.0)).await.unwrap();

        assert_eq!(repo.get_by_id("nope").await.unwrap(), None);
        assert_eq!(repo.delete_by_id("nope").await.unwrap(), None);
        assert_eq!(
            repo.update("nope", product("nope", "X", 1.0).changes())
                .await
                .unwrap(),
            None
        );
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_by_id_returns_previous_state() {
        let repo = repository();
        repo.create(product("p-1", "Product1", 10.0)).await.unwrap();

        let deleted = repo.delete_by_id("p-1").await.unwrap();
        assert_eq!(deleted, Some(product("p-1", "Product1", 10.0)));
        assert_eq!(repo.get_by_id("p-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_all_empties_the_collection() {
        let repo = repository();
        repo.create(product("p-1", "Product1", 10.0)).await.unwrap();
        repo.create(product("p-2", "Product2", 20.0)).await.unwrap();

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert!(repo.list().await.unwrap().is_empty());
    }
}
