//! Coffees data source: the full HashiCups catalogue

use crate::api::Coffee;
use crate::HashiCupsProviderData;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, ObjectNestingMode, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};

/// HashiCups has no identifier for the catalogue as a whole
pub const PLACEHOLDER_ID: &str = "placeholder";

#[derive(Default)]
pub struct CoffeesDataSource {
    provider_data: Option<HashiCupsProviderData>,
}

impl CoffeesDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider_data(provider_data: HashiCupsProviderData) -> Self {
        Self {
            provider_data: Some(provider_data),
        }
    }

    pub fn schema_static() -> Schema {
        let ingredient = vec![AttributeBuilder::new("id", AttributeType::Number)
            .description("Numeric identifier of the coffee ingredient.")
            .computed()
            .build()];

        let coffee = vec![
            AttributeBuilder::new("id", AttributeType::Number)
                .description("Numeric identifier of the coffee.")
                .computed()
                .build(),
            AttributeBuilder::new("name", AttributeType::String)
                .description("Product name of the coffee.")
                .computed()
                .build(),
            AttributeBuilder::new("teaser", AttributeType::String)
                .description("Fun tagline for the coffee.")
                .computed()
                .build(),
            AttributeBuilder::new("description", AttributeType::String)
                .description("Product description of the coffee.")
                .computed()
                .build(),
            AttributeBuilder::new("price", AttributeType::Number)
                .description("Suggested cost of the coffee.")
                .computed()
                .build(),
            AttributeBuilder::new("image", AttributeType::String)
                .description("URI for an image of the coffee.")
                .computed()
                .build(),
            AttributeBuilder::nested("ingredients", ObjectNestingMode::List, ingredient)
                .description("List of ingredients in the coffee.")
                .computed()
                .build(),
        ];

        SchemaBuilder::new()
            .version(0)
            .description("Fetches the list of coffees.")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Placeholder identifier attribute.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::nested("coffees", ObjectNestingMode::List, coffee)
                    .description("List of coffees.")
                    .computed()
                    .build(),
            )
            .build()
    }
}

/// State object for one catalogue entry
pub fn coffee_to_dynamic(coffee: &Coffee) -> Dynamic {
    let ingredients = coffee
        .ingredients
        .iter()
        .map(|i| Dynamic::object([("id", Dynamic::Number(i.id as f64))]))
        .collect();

    Dynamic::object([
        ("id", Dynamic::Number(coffee.id as f64)),
        ("name", Dynamic::String(coffee.name.clone())),
        ("teaser", Dynamic::String(coffee.teaser.clone())),
        ("description", Dynamic::String(coffee.description.clone())),
        ("price", Dynamic::Number(coffee.price)),
        ("image", Dynamic::String(coffee.image.clone())),
        ("ingredients", Dynamic::List(ingredients)),
    ])
}

/// Full data source state, keeping the API's ordering
pub fn coffees_state(coffees: &[Coffee]) -> DynamicValue {
    DynamicValue::new(Dynamic::object([
        ("id", Dynamic::String(PLACEHOLDER_ID.to_string())),
        (
            "coffees",
            Dynamic::List(coffees.iter().map(coffee_to_dynamic).collect()),
        ),
    ]))
}

#[async_trait]
impl DataSource for CoffeesDataSource {
    fn type_name(&self) -> &str {
        "hashicups_coffees"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        "Provider not configured",
                        "Provider data was not properly configured",
                    )],
                };
            }
        };

        match provider_data.client.get_coffees().await {
            Ok(coffees) => {
                tracing::debug!(count = coffees.len(), "Read HashiCups coffees");
                ReadDataSourceResponse {
                    state: coffees_state(&coffees),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Unable to read HashiCups Coffees",
                    e.to_string(),
                )],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure<HashiCupsProviderData> for CoffeesDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest<HashiCupsProviderData>,
    ) -> ConfigureDataSourceResponse {
        // Terraform may ask for a read before the provider is configured
        match request.provider_data {
            Some(data) => self.provider_data = Some(data),
            None => tracing::debug!("Coffees data source configured without provider data"),
        }

        ConfigureDataSourceResponse {
            diagnostics: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Client;
    use mockito::Server;
    use tfplug::types::{AttributePath, ClientCapabilities};

    fn read_request() -> ReadDataSourceRequest {
        ReadDataSourceRequest {
            type_name: "hashicups_coffees".to_string(),
            config: DynamicValue::null(),
            client_capabilities: ClientCapabilities::default(),
        }
    }

    #[tokio::test]
    async fn read_preserves_api_order_and_sets_placeholder_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/coffees")
            .with_body(
                r#"[
                    {"id":1,"name":"Packer Spiced Latte","teaser":"Packed with goodness","description":"","price":350,"image":"/packer.png","ingredients":[{"ingredient_id":1},{"ingredient_id":2}]},
                    {"id":2,"name":"Vaulatte","teaser":"Nothing gives you a safe feeling","description":"","price":200,"image":"/vault.png","ingredients":[]}
                ]"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url()).unwrap();
        let data_source = CoffeesDataSource::with_provider_data(HashiCupsProviderData::new(client));
        let response = data_source.read(Context::new(), read_request()).await;

        assert!(response.diagnostics.is_empty());
        let state = response.state;
        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            "placeholder"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("coffees").index(0).attribute("name"))
                .unwrap(),
            "Packer Spiced Latte"
        );
        assert_eq!(
            state
                .get_int(&AttributePath::new("coffees").index(1).attribute("id"))
                .unwrap(),
            2
        );
        assert_eq!(
            state
                .get_int(
                    &AttributePath::new("coffees")
                        .index(0)
                        .attribute("ingredients")
                        .index(1)
                        .attribute("id")
                )
                .unwrap(),
            2
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_reports_api_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/coffees")
            .with_status(500)
            .with_body("database unavailable")
            .create_async()
            .await;

        let client = Client::new(&server.url()).unwrap();
        let data_source = CoffeesDataSource::with_provider_data(HashiCupsProviderData::new(client));
        let response = data_source.read(Context::new(), read_request()).await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "Unable to read HashiCups Coffees"
        );
        assert_eq!(
            response.diagnostics[0].detail,
            "status: 500, body: database unavailable"
        );
        assert!(response.state.is_null());
    }

    #[tokio::test]
    async fn read_without_provider_data_fails() {
        let data_source = CoffeesDataSource::new();
        let response = data_source.read(Context::new(), read_request()).await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[test]
    fn schema_marks_everything_computed() {
        let schema = CoffeesDataSource::schema_static();
        let coffees = schema.attribute("coffees").unwrap();
        assert!(coffees.computed);
        let nested = coffees.nested_type.as_ref().unwrap();
        assert!(nested.attributes.iter().all(|a| a.computed));
        assert!(matches!(nested.nesting, ObjectNestingMode::List));
    }
}
