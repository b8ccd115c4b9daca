//! Provider trait and related types
//!
//! A provider declares its schema, turns its configuration into typed
//! provider data, and hands out factories for its resources and data sources.

use crate::context::Context;
use crate::data_source::DataSourceWithConfigure;
use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{ClientCapabilities, Diagnostic, DynamicValue, ServerCapabilities};
use async_trait::async_trait;
use std::collections::HashMap;

/// Builds a fresh, unconfigured resource instance
pub type ResourceFactory<D> = Box<dyn Fn() -> Box<dyn ResourceWithConfigure<D>> + Send + Sync>;

/// Builds a fresh, unconfigured data source instance
pub type DataSourceFactory<D> =
    Box<dyn Fn() -> Box<dyn DataSourceWithConfigure<D>> + Send + Sync>;

/// Root trait for providers
/// Keys of resources() and data_sources() are full type names
/// (e.g. "hashicups_order") and MUST match each instance's type_name()
#[async_trait]
pub trait Provider: Send + Sync {
    /// Data produced by configure and handed to every resource/data source
    type ProviderData: Clone + Send + Sync + 'static;

    /// Provider type name, the prefix of every resource type name
    fn type_name(&self) -> &str;

    async fn metadata(&self, ctx: Context, request: ProviderMetadataRequest)
        -> ProviderMetadataResponse;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once per session, before any resource or data source operation
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse<Self::ProviderData>;

    async fn validate(
        &self,
        ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse;

    /// Called when Terraform asks the plugin to shut down
    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory<Self::ProviderData>>;

    fn data_sources(&self) -> HashMap<String, DataSourceFactory<Self::ProviderData>>;
}

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
    pub server_capabilities: ServerCapabilities,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
    pub client_capabilities: ClientCapabilities,
}

pub struct ConfigureProviderResponse<D> {
    pub diagnostics: Vec<Diagnostic>,
    /// Stored by the framework and passed to every configure hook
    pub provider_data: Option<D>,
}

pub struct ValidateProviderConfigRequest {
    pub config: DynamicValue,
}

pub struct ValidateProviderConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct StopProviderRequest;

pub struct StopProviderResponse {
    pub error: Option<String>,
}
