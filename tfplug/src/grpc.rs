//! gRPC service implementation of the Terraform Plugin Protocol v6
//!
//! Resources and data sources are created on demand from the provider's
//! factories, configured with the typed provider data stored at
//! ConfigureProvider time, and dropped at the end of each call.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::TfplugError;
use crate::plan_modifier::plan_resource_change;
use crate::proto;
use crate::provider::{
    ConfigureProviderRequest, Provider, ProviderMetadataRequest, ProviderSchemaRequest,
    StopProviderRequest, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, ResourceSchemaRequest, ResourceWithConfigure,
    UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{Attribute, ObjectNestingMode, Schema, StringKind};
use crate::types::{
    has_errors, AttributePath, AttributePathStep, ClientCapabilities, Diagnostic,
    DiagnosticSeverity, DynamicValue, ServerCapabilities,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tonic::{Request, Response, Status};

type RpcResult<T> = std::result::Result<Response<T>, Status>;

pub struct GrpcProviderServer<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: Arc<RwLock<Option<P::ProviderData>>>,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
}

impl<P: Provider + 'static> GrpcProviderServer<P> {
    pub fn new(provider: P) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);

        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: Arc::new(RwLock::new(None)),
            stop_tx: Arc::new(stop_tx),
            stop_rx,
        }
    }

    /// Flips to true once Terraform has called StopProvider
    pub fn stop_signal(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    fn context(&self) -> Context {
        Context::with_stop_signal(self.stop_rx.clone())
    }

    /// Create and configure a resource instance for one call
    async fn resource(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> std::result::Result<(Box<dyn ResourceWithConfigure<P::ProviderData>>, Vec<Diagnostic>), Status>
    {
        let mut resource = {
            let provider = self.provider.read().await;
            let factories = provider.resources();
            let factory = factories
                .get(type_name)
                .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()))?;
            factory()
        };

        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;

        Ok((resource, response.diagnostics))
    }

    /// Create and configure a data source instance for one call
    async fn data_source(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> std::result::Result<
        (Box<dyn DataSourceWithConfigure<P::ProviderData>>, Vec<Diagnostic>),
        Status,
    > {
        let mut data_source = {
            let provider = self.provider.read().await;
            let factories = provider.data_sources();
            let factory = factories
                .get(type_name)
                .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()))?;
            factory()
        };

        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;

        Ok((data_source, response.diagnostics))
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> proto::ProviderService for GrpcProviderServer<P> {
    #[tracing::instrument(name = "GetMetadata", level = "debug", skip_all)]
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> RpcResult<proto::get_metadata::Response> {
        tracing::debug!("Received request");
        let ctx = self.context();
        let provider = self.provider.read().await;
        let metadata = provider.metadata(ctx, ProviderMetadataRequest).await;

        let mut resources: Vec<String> = provider.resources().into_keys().collect();
        resources.sort();
        let mut data_sources: Vec<String> = provider.data_sources().into_keys().collect();
        data_sources.sort();

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities_to_proto(&metadata.server_capabilities)),
            diagnostics: vec![],
            data_sources: data_sources
                .into_iter()
                .map(|type_name| proto::get_metadata::DataSourceMetadata { type_name })
                .collect(),
            resources: resources
                .into_iter()
                .map(|type_name| proto::get_metadata::ResourceMetadata { type_name })
                .collect(),
        }))
    }

    #[tracing::instrument(name = "GetProviderSchema", level = "debug", skip_all)]
    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> RpcResult<proto::get_provider_schema::Response> {
        tracing::debug!("Received request");
        let ctx = self.context();
        let provider = self.provider.read().await;

        let metadata = provider.metadata(ctx.clone(), ProviderMetadataRequest).await;
        let provider_schema = provider.schema(ctx.clone(), ProviderSchemaRequest).await;
        let mut diagnostics = provider_schema.diagnostics;

        let mut resource_schemas = HashMap::new();
        for (type_name, factory) in provider.resources() {
            let response = factory().schema(ctx.clone(), ResourceSchemaRequest).await;
            diagnostics.extend(response.diagnostics);
            resource_schemas.insert(type_name, schema_to_proto(&response.schema));
        }

        let mut data_source_schemas = HashMap::new();
        for (type_name, factory) in provider.data_sources() {
            let response = factory().schema(ctx.clone(), DataSourceSchemaRequest).await;
            diagnostics.extend(response.diagnostics);
            data_source_schemas.insert(type_name, schema_to_proto(&response.schema));
        }

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&provider_schema.schema)),
            resource_schemas,
            data_source_schemas,
            diagnostics: diagnostics_to_proto(diagnostics),
            provider_meta: None,
            server_capabilities: Some(server_capabilities_to_proto(&metadata.server_capabilities)),
        }))
    }

    #[tracing::instrument(name = "ValidateProviderConfig", level = "debug", skip_all)]
    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> RpcResult<proto::validate_provider_config::Response> {
        tracing::debug!("Received request");
        let req = request.into_inner();
        let config = decode_value(&req.config)?;

        let provider = self.provider.read().await;
        let response = provider
            .validate(
                self.context(),
                ValidateProviderConfigRequest { config },
            )
            .await;

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    #[tracing::instrument(name = "ValidateResourceConfig", level = "debug", skip_all, fields(tf_resource_type))]
    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> RpcResult<proto::validate_resource_config::Response> {
        let req = request.into_inner();
        tracing::Span::current().record("tf_resource_type", req.type_name.as_str());
        tracing::debug!("Received request");
        let ctx = self.context();
        let config = decode_value(&req.config)?;

        let (resource, _) = self.resource(&ctx, &req.type_name).await?;
        let response = resource
            .validate(
                ctx,
                ValidateResourceConfigRequest {
                    type_name: req.type_name,
                    config,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            )
            .await;

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    #[tracing::instrument(name = "ValidateDataResourceConfig", level = "debug", skip_all, fields(tf_data_source_type))]
    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> RpcResult<proto::validate_data_resource_config::Response> {
        let req = request.into_inner();
        tracing::Span::current().record("tf_data_source_type", req.type_name.as_str());
        tracing::debug!("Received request");
        let ctx = self.context();
        let config = decode_value(&req.config)?;

        let (data_source, _) = self.data_source(&ctx, &req.type_name).await?;
        let response = data_source
            .validate(
                ctx,
                ValidateDataSourceConfigRequest {
                    type_name: req.type_name,
                    config,
                },
            )
            .await;

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    #[tracing::instrument(name = "UpgradeResourceState", level = "debug", skip_all, fields(tf_resource_type))]
    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> RpcResult<proto::upgrade_resource_state::Response> {
        let req = request.into_inner();
        tracing::Span::current().record("tf_resource_type", req.type_name.as_str());
        tracing::debug!(version = req.version, "Received request");

        // Stored JSON state is re-encoded as msgpack; schema version 0 has
        // nothing to migrate
        let json = req.raw_state.map(|raw| raw.json).unwrap_or_default();
        let state = DynamicValue::decode_json(&json)?;

        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_value(&state)?),
            diagnostics: vec![],
        }))
    }

    #[tracing::instrument(name = "ConfigureProvider", level = "debug", skip_all)]
    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> RpcResult<proto::configure_provider::Response> {
        let req = request.into_inner();
        tracing::debug!(terraform_version = %req.terraform_version, "Received request");
        let config = decode_value(&req.config)?;

        let response = {
            let mut provider = self.provider.write().await;
            provider
                .configure(
                    self.context(),
                    ConfigureProviderRequest {
                        terraform_version: req.terraform_version,
                        config,
                        client_capabilities: client_capabilities_from_proto(
                            req.client_capabilities,
                        ),
                    },
                )
                .await
        };

        if let Some(data) = response.provider_data {
            *self.provider_data.write().await = Some(data);
        }

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    #[tracing::instrument(name = "ReadResource", level = "debug", skip_all, fields(tf_resource_type))]
    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> RpcResult<proto::read_resource::Response> {
        let req = request.into_inner();
        tracing::Span::current().record("tf_resource_type", req.type_name.as_str());
        tracing::debug!("Received request");
        let ctx = self.context();
        let current_state = decode_value(&req.current_state)?;

        let (resource, configure_diags) = self.resource(&ctx, &req.type_name).await?;
        if has_errors(&configure_diags) {
            return Ok(Response::new(proto::read_resource::Response {
                new_state: req.current_state,
                diagnostics: diagnostics_to_proto(configure_diags),
                private: req.private,
            }));
        }

        let response = resource
            .read(
                ctx,
                ReadResourceRequest {
                    type_name: req.type_name,
                    current_state,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            )
            .await;

        // A missing resource is reported as a null state
        let new_state = response.new_state.unwrap_or_else(DynamicValue::null);

        Ok(Response::new(proto::read_resource::Response {
            new_state: Some(encode_value(&new_state)?),
            diagnostics: diagnostics_to_proto(response.diagnostics),
            private: req.private,
        }))
    }

    #[tracing::instrument(name = "PlanResourceChange", level = "debug", skip_all, fields(tf_resource_type))]
    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> RpcResult<proto::plan_resource_change::Response> {
        let req = request.into_inner();
        tracing::Span::current().record("tf_resource_type", req.type_name.as_str());
        tracing::debug!("Received request");
        let ctx = self.context();

        let prior_state = decode_value(&req.prior_state)?;
        let proposed_new_state = decode_value(&req.proposed_new_state)?;
        let config = decode_value(&req.config)?;

        let (resource, _) = self.resource(&ctx, &req.type_name).await?;
        let schema = resource.schema(ctx, ResourceSchemaRequest).await;

        let planned = plan_resource_change(
            &schema.schema,
            &prior_state.value,
            &proposed_new_state.value,
            &config.value,
        );

        let mut diagnostics = schema.diagnostics;
        diagnostics.extend(planned.diagnostics);

        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_value(&DynamicValue::new(planned.planned_state))?),
            requires_replace: planned.requires_replace.iter().map(path_to_proto).collect(),
            planned_private: req.prior_private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
        }))
    }

    #[tracing::instrument(name = "ApplyResourceChange", level = "debug", skip_all, fields(tf_resource_type))]
    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> RpcResult<proto::apply_resource_change::Response> {
        let req = request.into_inner();
        tracing::Span::current().record("tf_resource_type", req.type_name.as_str());
        tracing::debug!("Received request");
        let ctx = self.context();

        let prior_state = decode_value(&req.prior_state)?;
        let planned_state = decode_value(&req.planned_state)?;
        let config = decode_value(&req.config)?;

        let (resource, configure_diags) = self.resource(&ctx, &req.type_name).await?;
        if has_errors(&configure_diags) {
            return Ok(Response::new(proto::apply_resource_change::Response {
                new_state: Some(encode_value(&prior_state)?),
                private: vec![],
                diagnostics: diagnostics_to_proto(configure_diags),
                legacy_type_system: false,
            }));
        }

        // No new remote changes once Terraform has asked the provider to stop
        if ctx.is_stopped() {
            tracing::warn!("Provider stopped, change not applied");
            return Ok(Response::new(proto::apply_resource_change::Response {
                new_state: Some(encode_value(&prior_state)?),
                private: vec![],
                diagnostics: diagnostics_to_proto(vec![Diagnostic::error(
                    "Provider stopped",
                    "The provider was stopped before this change could be applied.",
                )]),
                legacy_type_system: false,
            }));
        }

        let (new_state, diagnostics) = if planned_state.is_null() {
            let response = resource
                .delete(
                    ctx,
                    DeleteResourceRequest {
                        type_name: req.type_name,
                        prior_state: prior_state.clone(),
                    },
                )
                .await;
            // A failed delete keeps the resource in state
            let new_state = if has_errors(&response.diagnostics) {
                prior_state
            } else {
                DynamicValue::null()
            };
            (new_state, response.diagnostics)
        } else if prior_state.is_null() {
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name: req.type_name,
                        planned_state,
                        config,
                    },
                )
                .await;
            (response.new_state, response.diagnostics)
        } else {
            let response = resource
                .update(
                    ctx,
                    UpdateResourceRequest {
                        type_name: req.type_name,
                        prior_state,
                        planned_state,
                        config,
                    },
                )
                .await;
            (response.new_state, response.diagnostics)
        };

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_value(&new_state)?),
            private: req.planned_private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
        }))
    }

    #[tracing::instrument(name = "ImportResourceState", level = "debug", skip_all, fields(tf_resource_type))]
    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> RpcResult<proto::import_resource_state::Response> {
        let req = request.into_inner();
        tracing::Span::current().record("tf_resource_type", req.type_name.as_str());
        tracing::debug!(id = %req.id, "Received request");
        let ctx = self.context();

        let (resource, configure_diags) = self.resource(&ctx, &req.type_name).await?;
        if has_errors(&configure_diags) {
            return Ok(Response::new(proto::import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: diagnostics_to_proto(configure_diags),
            }));
        }

        let response = resource
            .import_state(
                ctx,
                ImportResourceStateRequest {
                    type_name: req.type_name,
                    id: req.id,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            )
            .await;

        let imported_resources = response
            .imported_resources
            .iter()
            .map(|imported| {
                Ok(proto::import_resource_state::ImportedResource {
                    type_name: imported.type_name.clone(),
                    state: Some(encode_value(&imported.state)?),
                    private: vec![],
                })
            })
            .collect::<std::result::Result<Vec<_>, Status>>()?;

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    #[tracing::instrument(name = "ReadDataSource", level = "debug", skip_all, fields(tf_data_source_type))]
    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> RpcResult<proto::read_data_source::Response> {
        let req = request.into_inner();
        tracing::Span::current().record("tf_data_source_type", req.type_name.as_str());
        tracing::debug!("Received request");
        let ctx = self.context();
        let config = decode_value(&req.config)?;

        let (data_source, configure_diags) = self.data_source(&ctx, &req.type_name).await?;
        if has_errors(&configure_diags) {
            return Ok(Response::new(proto::read_data_source::Response {
                state: Some(encode_value(&DynamicValue::null())?),
                diagnostics: diagnostics_to_proto(configure_diags),
            }));
        }

        let response = data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: req.type_name,
                    config,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            )
            .await;

        Ok(Response::new(proto::read_data_source::Response {
            state: Some(encode_value(&response.state)?),
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    #[tracing::instrument(name = "StopProvider", level = "debug", skip_all)]
    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> RpcResult<proto::stop_provider::Response> {
        tracing::debug!("Received request");
        let response = {
            let provider = self.provider.read().await;
            provider
                .stop(self.context(), StopProviderRequest)
                .await
        };

        let _ = self.stop_tx.send(true);

        Ok(Response::new(proto::stop_provider::Response {
            error: response.error.unwrap_or_default(),
        }))
    }
}

// Helper functions

#[allow(clippy::result_large_err)]
fn decode_value(value: &Option<proto::DynamicValue>) -> std::result::Result<DynamicValue, Status> {
    let Some(value) = value else {
        return Ok(DynamicValue::null());
    };

    let decoded = if !value.msgpack.is_empty() {
        DynamicValue::decode_msgpack(&value.msgpack)?
    } else {
        DynamicValue::decode_json(&value.json)?
    };
    Ok(decoded)
}

#[allow(clippy::result_large_err)]
fn encode_value(value: &DynamicValue) -> std::result::Result<proto::DynamicValue, Status> {
    Ok(proto::DynamicValue {
        msgpack: value.encode_msgpack()?,
        json: vec![],
    })
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: schema.block.version,
            attributes: schema.block.attributes.iter().map(attribute_to_proto).collect(),
            block_types: vec![],
            description: schema.block.description.clone(),
            description_kind: string_kind_to_proto(schema.block.description_kind) as i32,
            deprecated: schema.block.deprecated,
        }),
    }
}

fn attribute_to_proto(attr: &Attribute) -> proto::schema::Attribute {
    // Nested attributes carry their type in nested_type instead
    let (r#type, nested_type) = match &attr.nested_type {
        Some(nested) => (
            vec![],
            Some(proto::schema::Object {
                attributes: nested.attributes.iter().map(attribute_to_proto).collect(),
                nesting: nesting_to_proto(nested.nesting) as i32,
            }),
        ),
        None => (attr.r#type.to_type_json().to_string().into_bytes(), None),
    };

    proto::schema::Attribute {
        name: attr.name.clone(),
        r#type,
        nested_type,
        description: attr.description.clone(),
        required: attr.required,
        optional: attr.optional,
        computed: attr.computed,
        sensitive: attr.sensitive,
        description_kind: proto::StringKind::Plain as i32,
        deprecated: attr.deprecated,
        write_only: false,
    }
}

fn nesting_to_proto(nesting: ObjectNestingMode) -> proto::schema::object::NestingMode {
    match nesting {
        ObjectNestingMode::Single => proto::schema::object::NestingMode::Single,
        ObjectNestingMode::List => proto::schema::object::NestingMode::List,
        ObjectNestingMode::Set => proto::schema::object::NestingMode::Set,
        ObjectNestingMode::Map => proto::schema::object::NestingMode::Map,
    }
}

fn string_kind_to_proto(kind: StringKind) -> proto::StringKind {
    match kind {
        StringKind::Plain => proto::StringKind::Plain,
        StringKind::Markdown => proto::StringKind::Markdown,
    }
}

fn server_capabilities_to_proto(caps: &ServerCapabilities) -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: caps.plan_destroy,
        get_provider_schema_optional: caps.get_provider_schema_optional,
        move_resource_state: caps.move_resource_state,
    }
}

fn client_capabilities_from_proto(caps: Option<proto::ClientCapabilities>) -> ClientCapabilities {
    caps.map(|c| ClientCapabilities {
        deferral_allowed: c.deferral_allowed,
        write_only_attributes_allowed: c.write_only_attributes_allowed,
    })
    .unwrap_or_default()
}

fn path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;

    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|diag| proto::Diagnostic {
            severity: match diag.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning,
            } as i32,
            summary: diag.summary,
            detail: diag.detail,
            attribute: diag.attribute.as_ref().map(path_to_proto),
        })
        .collect()
}
