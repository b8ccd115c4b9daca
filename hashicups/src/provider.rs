//! HashiCups provider: schema, configuration and the type registry

use crate::api::Client;
use crate::config::ProviderConfig;
use crate::data_sources::CoffeesDataSource;
use crate::resources::OrderResource;
use crate::HashiCupsProviderData;
use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, ServerCapabilities};

pub struct HashiCupsProvider {
    version: String,
}

impl Default for HashiCupsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HashiCupsProvider {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Interact with HashiCups.")
            .attribute(
                AttributeBuilder::new("host", AttributeType::String)
                    .description("URI for HashiCups API. May also be provided via HASHICUPS_HOST environment variable.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("Username for HashiCups API. May also be provided via HASHICUPS_USERNAME environment variable.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("Password for HashiCups API. May also be provided via HASHICUPS_PASSWORD environment variable.")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl Provider for HashiCupsProvider {
    type ProviderData = HashiCupsProviderData;

    fn type_name(&self) -> &str {
        "hashicups"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities {
                plan_destroy: true,
                get_provider_schema_optional: true,
                move_resource_state: false,
            },
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse<HashiCupsProviderData> {
        tracing::info!(
            version = %self.version,
            terraform_version = %request.terraform_version,
            "Configuring HashiCups client"
        );

        let config = match ProviderConfig::from_env(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        tracing::debug!(
            hashicups_host = %config.host,
            hashicups_username = %config.username,
            hashicups_password = %config.password,
            "Creating HashiCups client"
        );

        match Client::connect(&config.host, &config.username, config.password.expose()).await {
            Ok(client) => {
                tracing::info!(success = true, "Configured HashiCups client");
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(HashiCupsProviderData::new(client)),
                }
            }
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Unable to Create HashiCups API Client",
                    format!(
                        "An unexpected error occurred while creating the HashiCups API client. \
                         If the error is not clear, please contact the provider developers.\n\n\
                         HashiCups Client Error: {}",
                        e
                    ),
                )],
                provider_data: None,
            },
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        // Values may still be unknown here; configure does the checking
        ValidateProviderConfigResponse {
            diagnostics: vec![],
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory<HashiCupsProviderData>> {
        let mut resources: HashMap<String, ResourceFactory<HashiCupsProviderData>> =
            HashMap::new();
        resources.insert(
            "hashicups_order".to_string(),
            Box::new(|| {
                Box::new(OrderResource::new())
                    as Box<dyn ResourceWithConfigure<HashiCupsProviderData>>
            }),
        );
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory<HashiCupsProviderData>> {
        let mut data_sources: HashMap<String, DataSourceFactory<HashiCupsProviderData>> =
            HashMap::new();
        data_sources.insert(
            "hashicups_coffees".to_string(),
            Box::new(|| {
                Box::new(CoffeesDataSource::new())
                    as Box<dyn DataSourceWithConfigure<HashiCupsProviderData>>
            }),
        );
        data_sources
    }
}
