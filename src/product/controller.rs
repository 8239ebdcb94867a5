use super::dto::{CreateProductDto, ProductDto, UpdateProductDto};
use super::model::{Product, ProductChanges};
use super::service::ProductService;
use crate::prelude::*;
use axum::http::header;

/// HTTP surface of the product resource
///
/// | Method | Path    | Success              | Missing id |
/// |--------|---------|----------------------|------------|
/// | GET    | `/`     | 200 `[ProductDto]`   |            |
/// | GET    | `/{id}` | 200 `ProductDto`     | 404        |
/// | POST   | `/`     | 201 `ProductDto`     |            |
/// | PUT    | `/{id}` | 200 `ProductDto`     | 404        |
/// | DELETE | `/{id}` | 200 `ProductDto`     | 404        |
/// | DELETE | `/`     | 204                  |            |
#[controller(path = "/api/product")]
pub struct ProductController {
    service: Arc<ProductService>,
}

fn found_or_404(product: Option<Product>) -> Response {
    match product {
        Some(product) => Json(ProductDto::from(product)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

impl ProductController {
    pub fn new(service: Arc<ProductService>) -> Self {
        Self { service }
    }
}

#[routes]
impl ProductController {
    #[get("/")]
    pub async fn list(&self) -> Result<Json<Vec<ProductDto>>> {
        let products = self.service.list().await?;
        Ok(Json(products.into_iter().map(ProductDto::from).collect()))
    }

    #[get("/{id}")]
    pub async fn get_by_id(&self, #[param] id: String) -> Result<Response> {
        Ok(found_or_404(self.service.get_by_id(&id).await?))
    }

    #[post("/")]
    pub async fn create(&self, #[body] dto: CreateProductDto) -> Result<Response> {
        let product = self.service.create(Product::from(dto)).await?;
        let location = format!("{}/{}", Self::BASE_PATH, product.id);
        Ok((
            StatusCode::CREATED,
            [(header::LOCATION, location)],
            Json(ProductDto::from(product)),
        )
            .into_response())
    }

    #[put("/{id}")]
    pub async fn update(
        &self,
        #[param] id: String,
        #[body] dto: UpdateProductDto,
    ) -> Result<Response> {
        let changes = ProductChanges::from(dto);
        Ok(found_or_404(self.service.update(&id, changes).await?))
    }

    #[delete("/{id}")]
    pub async fn delete_by_id(&self, #[param] id: String) -> Result<Response> {
        Ok(found_or_404(self.service.delete_by_id(&id).await?))
    }

    #[delete("/")]
    pub async fn delete_all(&self) -> Result<StatusCode> {
        self.service.delete_all().await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
