//! Terraform provider for HashiCups, the demo coffee shop API

pub mod api;
pub mod config;
pub mod data_sources;
pub mod provider;
pub mod provider_data;
pub mod resources;

pub use provider::HashiCupsProvider;
pub use provider_data::HashiCupsProviderData;
