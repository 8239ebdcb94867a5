use super::model::{Product, ProductChanges};
use serde::{Deserialize, Serialize};

/// Response body for a single product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Request body of `POST /api/product`; the id is assigned by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateProductDto {
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Request body of `PUT /api/product/{id}`; the id comes from the path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProductDto {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
        }
    }
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self::from(product.clone())
    }
}

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            price: dto.price,
        }
    }
}

impl From<CreateProductDto> for Product {
    fn from(dto: CreateProductDto) -> Self {
        Self {
            id: String::new(),
            name: dto.name,
            description: dto.description,
            price: dto.price,
        }
    }
}

impl From<UpdateProductDto> for ProductChanges {
    fn from(dto: UpdateProductDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            price: dto.price,
        }
    }
}
