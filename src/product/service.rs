use super::model::{Product, ProductChanges};
use super::repository::ProductRepository;
use crate::prelude::*;
use tracing::instrument;
use uuid::Uuid;

#[derive(Injectable)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Product>> {
        self.repository.get_by_id(id).await
    }

    /// Persist a new product, assigning a UUID when `id` is empty
    #[instrument(skip_all, fields(name = %product.name))]
    pub async fn create(&self, mut product: Product) -> Result<Product> {
        if !product.has_id() {
            product.id = Uuid::new_v4().to_string();
        }
        let product = self.repository.create(product).await?;
        tracing::info!(id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: &str, changes: ProductChanges) -> Result<Option<Product>> {
        self.repository.update(id, changes).await
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<Option<Product>> {
        self.repository.delete_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<()> {
        let removed = self.repository.delete_all().await?;
        tracing::info!(removed, "All products deleted");
        Ok(())
    }
}
