#![allow(clippy::disallowed_methods)]

//! Drives the provider through the gRPC service the way Terraform does,
//! against a mocked HashiCups API.

use hashicups::HashiCupsProvider;
use mockito::{Matcher, Server, ServerGuard};
use serial_test::serial;
use tfplug::grpc::GrpcProviderServer;
use tfplug::proto::{self, ProviderService};
use tfplug::types::{AttributePath, Dynamic, DynamicValue};
use tonic::Request;

const ORDER_CREATED: &str = r#"{"id":42,"items":[{"coffee":{"id":3,"name":"Nomadic","teaser":"Drink one today","description":"","price":200,"image":"/nomad.png"},"quantity":2}]}"#;
const ORDER_UPDATED: &str = r#"{"id":42,"items":[{"coffee":{"id":3,"name":"Nomadic","teaser":"Drink one today","description":"","price":200,"image":"/nomad.png"},"quantity":3}]}"#;

fn encode(value: Dynamic) -> Option<proto::DynamicValue> {
    Some(proto::DynamicValue {
        msgpack: DynamicValue::new(value).encode_msgpack().unwrap(),
        json: vec![],
    })
}

fn decode(value: Option<proto::DynamicValue>) -> DynamicValue {
    DynamicValue::decode_msgpack(&value.unwrap().msgpack).unwrap()
}

fn s(value: &str) -> Dynamic {
    Dynamic::String(value.to_string())
}

fn provider_config(host: Dynamic) -> Dynamic {
    Dynamic::object([
        ("host", host),
        ("username", s("education")),
        ("password", s("test123")),
    ])
}

/// Order configuration as Terraform sends it: computed values are null
fn order_config(quantity: f64) -> Dynamic {
    Dynamic::object([
        ("id", Dynamic::Null),
        ("last_updated", Dynamic::Null),
        (
            "items",
            Dynamic::List(vec![Dynamic::object([
                ("quantity", Dynamic::Number(quantity)),
                (
                    "coffee",
                    Dynamic::object([
                        ("id", Dynamic::Number(3.0)),
                        ("name", Dynamic::Null),
                        ("teaser", Dynamic::Null),
                        ("description", Dynamic::Null),
                        ("price", Dynamic::Null),
                        ("image", Dynamic::Null),
                    ]),
                ),
            ])]),
        ),
    ])
}

async fn signin_mock(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/signin")
        .with_body(r#"{"user_id":1,"username":"education","token":"tok-123"}"#)
        .create_async()
        .await
}

async fn configured_service(server: &mut ServerGuard) -> GrpcProviderServer<HashiCupsProvider> {
    let _signin = signin_mock(server).await;
    let service = GrpcProviderServer::new(HashiCupsProvider::new());

    let response = service
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: encode(provider_config(s(&server.url()))),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

    service
}

#[tokio::test]
#[serial]
async fn schema_lists_order_and_coffees() {
    let service = GrpcProviderServer::new(HashiCupsProvider::new());
    let response = service
        .get_provider_schema(Request::new(proto::get_provider_schema::Request {}))
        .await
        .unwrap()
        .into_inner();

    assert!(response.resource_schemas.contains_key("hashicups_order"));
    assert!(response.data_source_schemas.contains_key("hashicups_coffees"));

    let provider = response.provider.unwrap().block.unwrap();
    let password = provider
        .attributes
        .iter()
        .find(|a| a.name == "password")
        .unwrap();
    assert!(password.sensitive);
}

#[tokio::test]
#[serial]
async fn unknown_provider_values_are_reported_per_attribute() {
    let service = GrpcProviderServer::new(HashiCupsProvider::new());
    let response = service
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: encode(provider_config(Dynamic::Unknown)),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.diagnostics.len(), 1);
    let diagnostic = &response.diagnostics[0];
    assert_eq!(diagnostic.summary, "Unknown HashiCups API Host");
    assert_eq!(diagnostic.severity, proto::diagnostic::Severity::Error as i32);
    assert!(diagnostic.attribute.is_some());
}

#[tokio::test]
#[serial]
async fn coffees_read_through_the_service() {
    let mut server = Server::new_async().await;
    let service = configured_service(&mut server).await;
    let coffees = server
        .mock("GET", "/coffees")
        .match_header("authorization", "tok-123")
        .with_body(
            r#"[{"id":1,"name":"Packer Spiced Latte","price":350,"ingredients":[{"ingredient_id":1}]},
                {"id":2,"name":"Vaulatte","price":200,"ingredients":[]}]"#,
        )
        .create_async()
        .await;

    let response = service
        .read_data_source(Request::new(proto::read_data_source::Request {
            type_name: "hashicups_coffees".to_string(),
            config: encode(Dynamic::object([
                ("id", Dynamic::Null),
                ("coffees", Dynamic::Null),
            ])),
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    let state = decode(response.state);
    assert_eq!(
        state.get_string(&AttributePath::new("id")).unwrap(),
        "placeholder"
    );
    let names: Vec<String> = state
        .get_list(&AttributePath::new("coffees"))
        .unwrap()
        .into_iter()
        .map(|c| {
            DynamicValue::new(c)
                .get_string(&AttributePath::new("name"))
                .unwrap()
        })
        .collect();
    assert_eq!(names, vec!["Packer Spiced Latte", "Vaulatte"]);
    coffees.assert_async().await;
}

#[tokio::test]
#[serial]
async fn order_lifecycle_through_the_service() {
    let mut server = Server::new_async().await;
    let service = configured_service(&mut server).await;

    // Plan a create: every computed value is unknown
    let plan = service
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "hashicups_order".to_string(),
            prior_state: encode(Dynamic::Null),
            proposed_new_state: encode(order_config(2.0)),
            config: encode(order_config(2.0)),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    let planned = decode(plan.planned_state);
    assert!(planned.get(&AttributePath::new("id")).unwrap().is_unknown());
    assert!(planned
        .get(&AttributePath::new("items").index(0).attribute("coffee").attribute("name"))
        .unwrap()
        .is_unknown());

    // Apply the create
    let create = server
        .mock("POST", "/orders")
        .match_header("authorization", "tok-123")
        .match_body(Matcher::Json(
            serde_json::json!([{"coffee": {"id": 3}, "quantity": 2}]),
        ))
        .with_body(ORDER_CREATED)
        .create_async()
        .await;
    let applied = service
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "hashicups_order".to_string(),
            prior_state: encode(Dynamic::Null),
            planned_state: encode(planned.value.clone()),
            config: encode(order_config(2.0)),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(applied.diagnostics.is_empty(), "{:?}", applied.diagnostics);
    let state = decode(applied.new_state);
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "42");
    assert!(!state
        .get_string(&AttributePath::new("last_updated"))
        .unwrap()
        .is_empty());
    create.assert_async().await;

    // Plan an update: the id survives, the timestamp does not
    let mut proposed = state.clone();
    proposed
        .set_value(
            &AttributePath::new("items").index(0).attribute("quantity"),
            Dynamic::Number(3.0),
        )
        .unwrap();
    let plan = service
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "hashicups_order".to_string(),
            prior_state: encode(state.value.clone()),
            proposed_new_state: encode(proposed.value),
            config: encode(order_config(3.0)),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(plan.requires_replace.is_empty());
    let planned = decode(plan.planned_state);
    assert_eq!(planned.get_string(&AttributePath::new("id")).unwrap(), "42");
    assert!(planned
        .get(&AttributePath::new("last_updated"))
        .unwrap()
        .is_unknown());

    // Apply the update
    let put = server
        .mock("PUT", "/orders/42")
        .match_body(Matcher::Json(
            serde_json::json!([{"coffee": {"id": 3}, "quantity": 3}]),
        ))
        .with_body(ORDER_UPDATED)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/orders/42")
        .with_body(ORDER_UPDATED)
        .create_async()
        .await;
    let applied = service
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "hashicups_order".to_string(),
            prior_state: encode(state.value.clone()),
            planned_state: encode(planned.value),
            config: encode(order_config(3.0)),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(applied.diagnostics.is_empty(), "{:?}", applied.diagnostics);
    let state = decode(applied.new_state);
    assert_eq!(
        state
            .get_int(&AttributePath::new("items").index(0).attribute("quantity"))
            .unwrap(),
        3
    );
    put.assert_async().await;
    get.assert_async().await;

    // Destroy only drops the state
    let delete = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let destroyed = service
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "hashicups_order".to_string(),
            prior_state: encode(state.value),
            planned_state: encode(Dynamic::Null),
            config: encode(Dynamic::Null),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(destroyed.diagnostics.is_empty());
    assert!(decode(destroyed.new_state).is_null());
    delete.assert_async().await;
}

#[tokio::test]
#[serial]
async fn refresh_of_deleted_order_drops_it_from_state() {
    let mut server = Server::new_async().await;
    let service = configured_service(&mut server).await;
    let _get = server
        .mock("GET", "/orders/42")
        .with_status(404)
        .with_body("order not found")
        .create_async()
        .await;

    let current = Dynamic::object([
        ("id", s("42")),
        ("last_updated", s("Monday, 02-Jan-06 15:04:05 UTC")),
        ("items", Dynamic::List(vec![])),
    ]);
    let response = service
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "hashicups_order".to_string(),
            current_state: encode(current),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    assert!(decode(response.new_state).is_null());
}

#[tokio::test]
#[serial]
async fn import_is_not_supported() {
    let mut server = Server::new_async().await;
    let service = configured_service(&mut server).await;

    let response = service
        .import_resource_state(Request::new(proto::import_resource_state::Request {
            type_name: "hashicups_order".to_string(),
            id: "42".to_string(),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.imported_resources.is_empty());
    assert_eq!(
        response.diagnostics[0].summary,
        "Resource Import Not Implemented"
    );
}

#[tokio::test]
#[serial]
async fn unknown_resource_type_is_not_found() {
    let service = GrpcProviderServer::new(HashiCupsProvider::new());
    let status = service
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "hashicups_latte".to_string(),
            current_state: encode(Dynamic::Null),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::NotFound);
}
