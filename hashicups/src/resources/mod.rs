pub mod order;

pub use order::OrderResource;
