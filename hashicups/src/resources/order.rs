//! Order resource implementation

use crate::api::{OrderItem, OrderItemRequest};
use crate::HashiCupsProviderData;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, ObjectNestingMode, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Go's time.RFC850 layout
const RFC850: &str = "%A, %d-%b-%y %H:%M:%S %Z";

#[derive(Default)]
pub struct OrderResource {
    provider_data: Option<HashiCupsProviderData>,
}

impl OrderResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider_data(provider_data: HashiCupsProviderData) -> Self {
        Self {
            provider_data: Some(provider_data),
        }
    }

    pub fn schema_static() -> Schema {
        let coffee = vec![
            AttributeBuilder::new("id", AttributeType::Number)
                .description("Numeric identifier of the coffee.")
                .required()
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
        ];

        let item = vec![
            AttributeBuilder::new("quantity", AttributeType::Number)
                .description("Count of this item in the order.")
                .required()
                .build(),
            AttributeBuilder::nested("coffee", ObjectNestingMode::Single, coffee)
                .description("Coffee item in the order.")
                .required()
                .build(),
        ];

        SchemaBuilder::new()
            .version(0)
            .description("Manages an order.")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Numeric identifier of the order.")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("last_updated", AttributeType::String)
                    .description("Timestamp of the last Terraform update of the order.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::nested("items", ObjectNestingMode::List, item)
                    .description("List of items in the order.")
                    .required()
                    .build(),
            )
            .build()
    }

    fn not_configured() -> Diagnostic {
        Diagnostic::error(
            "Provider not configured",
            "Provider data was not properly configured",
        )
    }
}

/// Order lines to send to the API, taken from a plan or config
pub fn items_from_value(value: &DynamicValue) -> tfplug::Result<Vec<OrderItemRequest>> {
    let items = AttributePath::new("items");
    let count = value.get_list(&items)?.len();

    (0..count)
        .map(|i| {
            let item = items.clone().index(i as i64);
            let coffee_id = value.get_int(&item.clone().attribute("coffee").attribute("id"))?;
            let quantity = value.get_int(&item.attribute("quantity"))?;
            Ok(OrderItemRequest::new(coffee_id, quantity))
        })
        .collect()
}

/// State representation of the items the API returned
pub fn items_to_dynamic(items: &[OrderItem]) -> Dynamic {
    Dynamic::List(
        items
            .iter()
            .map(|item| {
                let coffee = &item.coffee;
                Dynamic::object([
                    ("quantity", Dynamic::Number(item.quantity as f64)),
                    (
                        "coffee",
                        Dynamic::object([
                            ("id", Dynamic::Number(coffee.id as f64)),
                            ("name", Dynamic::String(coffee.name.clone())),
                            ("teaser", Dynamic::String(coffee.teaser.clone())),
                            ("description", Dynamic::String(coffee.description.clone())),
                            ("price", Dynamic::Number(coffee.price)),
                            ("image", Dynamic::String(coffee.image.clone())),
                        ]),
                    ),
                ])
            })
            .collect(),
    )
}

pub fn order_state(id: &str, items: &[OrderItem], last_updated: &str) -> DynamicValue {
    DynamicValue::new(Dynamic::object([
        ("id", Dynamic::String(id.to_string())),
        ("last_updated", Dynamic::String(last_updated.to_string())),
        ("items", items_to_dynamic(items)),
    ]))
}

pub fn last_updated_now() -> String {
    chrono::Utc::now().format(RFC850).to_string()
}

/// Validate known item values; unknowns wait for apply
fn validate_items(config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    let items = match config.get(&AttributePath::new("items")) {
        Ok(Dynamic::List(items)) => items,
        _ => return diagnostics,
    };

    for (i, item) in items.iter().enumerate() {
        let path = AttributePath::new("items").index(i as i64);
        let item = DynamicValue::new(item.clone());

        if let Ok(Dynamic::Number(quantity)) = item.get(&AttributePath::new("quantity")) {
            if quantity.fract() != 0.0 {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Order Item Quantity",
                        format!("quantity must be a whole number, got {}", quantity),
                    )
                    .with_attribute(path.clone().attribute("quantity")),
                );
            }
        }

        let coffee_id = AttributePath::new("coffee").attribute("id");
        if let Ok(Dynamic::Number(id)) = item.get(&coffee_id) {
            if id.fract() != 0.0 {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Coffee ID",
                        format!("coffee id must be a whole number, got {}", id),
                    )
                    .with_attribute(path.attribute("coffee").attribute("id")),
                );
            }
        }
    }

    diagnostics
}

#[async_trait]
impl Resource for OrderResource {
    fn type_name(&self) -> &str {
        "hashicups_order"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: validate_items(&request.config),
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics: vec![Self::not_configured()],
                };
            }
        };

        let items = match items_from_value(&request.planned_state) {
            Ok(items) => items,
            Err(e) => {
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        "Error creating order",
                        format!("Could not read planned order items: {}", e),
                    )],
                };
            }
        };

        match provider_data.client.create_order(&items).await {
            Ok(order) => {
                let id = order.id.to_string();
                tracing::debug!(order_id = %id, "Created HashiCups order");
                CreateResourceResponse {
                    new_state: order_state(&id, &order.items, &last_updated_now()),
                    diagnostics: vec![],
                }
            }
            Err(e) => CreateResourceResponse {
                new_state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Error creating order",
                    format!("Could not create order, unexpected error: {}", e),
                )],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![Self::not_configured()],
                };
            }
        };

        let id = match request.current_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![Diagnostic::error(
                        "Error Reading HashiCups Order",
                        format!("Could not read order id from state: {}", e),
                    )],
                };
            }
        };

        match provider_data.client.get_order(&id).await {
            Ok(order) => {
                let mut new_state = request.current_state;
                let diagnostics = match new_state.set_value(
                    &AttributePath::new("items"),
                    items_to_dynamic(&order.items),
                ) {
                    Ok(()) => vec![],
                    Err(e) => vec![Diagnostic::error(
                        "Error Reading HashiCups Order",
                        format!("Could not store order items: {}", e),
                    )],
                };
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(order_id = %id, "HashiCups order not found, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![Diagnostic::error(
                    "Error Reading HashiCups Order",
                    format!("Could not read HashiCups Order ID {}: {}", id, e),
                )],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![Self::not_configured()],
                };
            }
        };

        let id_path = AttributePath::new("id");
        let id = match request
            .planned_state
            .get_string(&id_path)
            .or_else(|_| request.prior_state.get_string(&id_path))
        {
            Ok(id) => id,
            Err(e) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![Diagnostic::error(
                        "Error Updating HashiCups Order",
                        format!("Could not read order id from state: {}", e),
                    )],
                };
            }
        };

        let items = match items_from_value(&request.planned_state) {
            Ok(items) => items,
            Err(e) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![Diagnostic::error(
                        "Error Updating HashiCups Order",
                        format!("Could not read planned order items: {}", e),
                    )],
                };
            }
        };

        if let Err(e) = provider_data.client.update_order(&id, &items).await {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![Diagnostic::error(
                    "Error Updating HashiCups Order",
                    format!("Could not update order, unexpected error: {}", e),
                )],
            };
        }

        // The update response is not authoritative; read the order back
        match provider_data.client.get_order(&id).await {
            Ok(order) => {
                tracing::debug!(order_id = %id, "Updated HashiCups order");
                UpdateResourceResponse {
                    new_state: order_state(&id, &order.items, &last_updated_now()),
                    diagnostics: vec![],
                }
            }
            Err(e) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![Diagnostic::error(
                    "Error Reading HashiCups Order",
                    format!("Could not read order, unexpected error: {}", e),
                )],
            },
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        // HashiCups orders cannot be deleted; dropping the state is enough
        let id = request
            .prior_state
            .get_string(&AttributePath::new("id"))
            .unwrap_or_default();
        tracing::debug!(order_id = %id, "Removing HashiCups order from state");

        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure<HashiCupsProviderData> for OrderResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest<HashiCupsProviderData>,
    ) -> ConfigureResourceResponse {
        match request.provider_data {
            Some(data) => self.provider_data = Some(data),
            None => tracing::debug!("Order resource configured without provider data"),
        }

        ConfigureResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Client;
    use mockito::{Matcher, Server, ServerGuard};
    use tfplug::types::ClientCapabilities;

    const ORDER_BODY: &str = r#"{"id":42,"items":[{"coffee":{"id":3,"name":"Nomadic","teaser":"Drink one today","description":"","price":200,"image":"/nomad.png"},"quantity":2}]}"#;

    fn configured(server: &ServerGuard) -> OrderResource {
        let client = Client::new(&server.url()).unwrap();
        OrderResource::with_provider_data(HashiCupsProviderData::new(client))
    }

    fn planned(id: Dynamic, coffee_id: f64, quantity: f64) -> DynamicValue {
        DynamicValue::new(Dynamic::object([
            ("id", id),
            ("last_updated", Dynamic::Unknown),
            (
                "items",
                Dynamic::List(vec![Dynamic::object([
                    ("quantity", Dynamic::Number(quantity)),
                    (
                        "coffee",
                        Dynamic::object([
                            ("id", Dynamic::Number(coffee_id)),
                            ("name", Dynamic::Unknown),
                            ("teaser", Dynamic::Unknown),
                            ("description", Dynamic::Unknown),
                            ("price", Dynamic::Unknown),
                            ("image", Dynamic::Unknown),
                        ]),
                    ),
                ])]),
            ),
        ]))
    }

    fn prior_state() -> DynamicValue {
        let order: crate::api::Order = serde_json::from_str(ORDER_BODY).unwrap();
        order_state("42", &order.items, "Monday, 02-Jan-06 15:04:05 UTC")
    }

    #[tokio::test]
    async fn create_populates_id_items_and_timestamp() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/orders")
            .match_body(Matcher::Json(
                serde_json::json!([{"coffee": {"id": 3}, "quantity": 2}]),
            ))
            .with_body(ORDER_BODY)
            .create_async()
            .await;

        let resource = configured(&server);
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "hashicups_order".to_string(),
                    planned_state: planned(Dynamic::Unknown, 3.0, 2.0),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "42");
        assert!(!state
            .get_string(&AttributePath::new("last_updated"))
            .unwrap()
            .is_empty());
        let coffee = AttributePath::new("items").index(0).attribute("coffee");
        assert_eq!(
            state
                .get_string(&coffee.clone().attribute("name"))
                .unwrap(),
            "Nomadic"
        );
        assert_eq!(
            state.get_number(&coffee.attribute("price")).unwrap(),
            200.0
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_failure_leaves_nothing_behind() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/orders")
            .with_status(500)
            .with_body("out of beans")
            .create_async()
            .await;

        let resource = configured(&server);
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "hashicups_order".to_string(),
                    planned_state: planned(Dynamic::Unknown, 3.0, 2.0),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert!(response.new_state.is_null());
        assert_eq!(response.diagnostics[0].summary, "Error creating order");
        assert_eq!(
            response.diagnostics[0].detail,
            "Could not create order, unexpected error: status: 500, body: out of beans"
        );
    }

    #[tokio::test]
    async fn read_replaces_items_and_keeps_timestamp() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/orders/42")
            .with_body(
                r#"{"id":42,"items":[{"coffee":{"id":1,"name":"Packer Spiced Latte","price":350},"quantity":5}]}"#,
            )
            .create_async()
            .await;

        let resource = configured(&server);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "hashicups_order".to_string(),
                    current_state: prior_state(),
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state.unwrap();
        assert_eq!(
            state
                .get_int(&AttributePath::new("items").index(0).attribute("quantity"))
                .unwrap(),
            5
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("last_updated"))
                .unwrap(),
            "Monday, 02-Jan-06 15:04:05 UTC"
        );
    }

    #[tokio::test]
    async fn read_of_missing_order_removes_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/orders/42")
            .with_status(404)
            .create_async()
            .await;

        let resource = configured(&server);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "hashicups_order".to_string(),
                    current_state: prior_state(),
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.new_state.is_none());
    }

    #[tokio::test]
    async fn read_failure_keeps_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/orders/42")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let resource = configured(&server);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "hashicups_order".to_string(),
                    current_state: prior_state(),
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;

        assert_eq!(
            response.diagnostics[0].summary,
            "Error Reading HashiCups Order"
        );
        assert_eq!(
            response.diagnostics[0].detail,
            "Could not read HashiCups Order ID 42: status: 500, body: boom"
        );
        assert!(response.new_state.is_some());
    }

    #[tokio::test]
    async fn update_failure_and_read_back_failure_are_distinct() {
        let mut server = Server::new_async().await;
        let _put = server
            .mock("PUT", "/orders/42")
            .with_status(500)
            .with_body("nope")
            .create_async()
            .await;

        let resource = configured(&server);
        let request = || UpdateResourceRequest {
            type_name: "hashicups_order".to_string(),
            prior_state: prior_state(),
            planned_state: planned(Dynamic::String("42".to_string()), 1.0, 3.0),
            config: DynamicValue::null(),
        };

        let response = resource.update(Context::new(), request()).await;
        assert_eq!(
            response.diagnostics[0].summary,
            "Error Updating HashiCups Order"
        );
        assert_eq!(
            response.new_state.get_string(&AttributePath::new("id")).unwrap(),
            "42"
        );

        server.reset();
        let _put = server
            .mock("PUT", "/orders/42")
            .with_body(ORDER_BODY)
            .create_async()
            .await;
        let _get = server
            .mock("GET", "/orders/42")
            .with_status(500)
            .with_body("nope")
            .create_async()
            .await;

        let response = resource.update(Context::new(), request()).await;
        assert_eq!(
            response.diagnostics[0].summary,
            "Error Reading HashiCups Order"
        );
    }

    #[tokio::test]
    async fn update_reads_back_and_restamps() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", "/orders/42")
            .match_body(Matcher::Json(
                serde_json::json!([{"coffee": {"id": 1}, "quantity": 3}]),
            ))
            .with_body(ORDER_BODY)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/orders/42")
            .with_body(
                r#"{"id":42,"items":[{"coffee":{"id":1,"name":"Packer Spiced Latte","price":350},"quantity":3}]}"#,
            )
            .create_async()
            .await;

        let resource = configured(&server);
        let response = resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "hashicups_order".to_string(),
                    prior_state: prior_state(),
                    planned_state: planned(Dynamic::String("42".to_string()), 1.0, 3.0),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(
            state
                .get_string(&AttributePath::new("items").index(0).attribute("coffee").attribute("name"))
                .unwrap(),
            "Packer Spiced Latte"
        );
        assert_ne!(
            state
                .get_string(&AttributePath::new("last_updated"))
                .unwrap(),
            "Monday, 02-Jan-06 15:04:05 UTC"
        );
        put.assert_async().await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn delete_never_calls_the_api() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let resource = configured(&server);
        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "hashicups_order".to_string(),
                    prior_state: prior_state(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        mock.assert_async().await;
    }

    #[test]
    fn validate_flags_bad_quantities_and_ids() {
        let config = DynamicValue::new(Dynamic::object([(
            "items",
            Dynamic::List(vec![
                Dynamic::object([
                    ("quantity", Dynamic::Number(2.5)),
                    ("coffee", Dynamic::object([("id", Dynamic::Number(1.5))])),
                ]),
                Dynamic::object([
                    ("quantity", Dynamic::Unknown),
                    ("coffee", Dynamic::object([("id", Dynamic::Number(2.0))])),
                ]),
            ]),
        )]));

        let diagnostics = validate_items(&config);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].summary, "Invalid Order Item Quantity");
        assert_eq!(
            diagnostics[0].attribute.as_ref().unwrap().to_string(),
            "items[0].quantity"
        );
        assert_eq!(
            diagnostics[1].attribute.as_ref().unwrap().to_string(),
            "items[0].coffee.id"
        );
    }

    #[test]
    fn validate_passes_zero_and_negative_quantities_through() {
        let config = DynamicValue::new(Dynamic::object([(
            "items",
            Dynamic::List(vec![
                Dynamic::object([
                    ("quantity", Dynamic::Number(0.0)),
                    ("coffee", Dynamic::object([("id", Dynamic::Number(1.0))])),
                ]),
                Dynamic::object([
                    ("quantity", Dynamic::Number(-2.0)),
                    ("coffee", Dynamic::object([("id", Dynamic::Number(2.0))])),
                ]),
            ]),
        )]));

        assert!(validate_items(&config).is_empty());
    }

    #[test]
    fn unknown_items_are_not_validated() {
        let config = DynamicValue::new(Dynamic::object([("items", Dynamic::Unknown)]));
        assert!(validate_items(&config).is_empty());
    }

    #[test]
    fn timestamp_uses_rfc850_layout() {
        let stamp = last_updated_now();
        let parts: Vec<&str> = stamp.split(' ').collect();
        assert_eq!(parts.len(), 4);
        assert!(parts[0].ends_with(','));
        assert_eq!(parts[3], "UTC");
    }

    #[test]
    fn items_from_value_reads_ids_and_quantities() {
        let items = items_from_value(&planned(Dynamic::Unknown, 3.0, 2.0)).unwrap();
        assert_eq!(items, vec![OrderItemRequest::new(3, 2)]);
    }

    #[test]
    fn schema_keeps_id_across_plans() {
        let schema = OrderResource::schema_static();
        let id = schema.attribute("id").unwrap();
        assert!(id.computed);
        assert_eq!(id.plan_modifiers.len(), 1);
        assert!(schema.attribute("items").unwrap().required);
    }
}
