//! Wire types for the HashiCups REST API

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coffee {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub teaser: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(rename = "ingredient_id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub coffee: Coffee,
    pub quantity: i64,
}

/// Order line as sent on create and update; only the coffee id travels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemRequest {
    pub coffee: CoffeeRef,
    pub quantity: i64,
}

impl OrderItemRequest {
    pub fn new(coffee_id: i64, quantity: i64) -> Self {
        Self {
            coffee: CoffeeRef { id: coffee_id },
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoffeeRef {
    pub id: i64,
}

#[derive(Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}
