pub mod client;
pub mod error;
pub mod models;

pub use client::Client;
pub use error::ApiError;
pub use models::{Coffee, Ingredient, Order, OrderItem, OrderItemRequest, SignInResponse};
