//! Protocol buffer types for Terraform Plugin Protocol v6
//!
//! Generated at build time by tonic-build from `proto/tfplugin6.proto`.
//!
//! # Type Naming
//!
//! - Top-level messages become structs (e.g., `DynamicValue`, `Schema`)
//! - RPC methods have nested `Request` and `Response` types in snake_case modules
//!   (e.g., `get_provider_schema::Request`, `read_resource::Response`)
//! - Nested messages are in sub-modules (e.g., `diagnostic::Severity`)
//! - The gRPC service trait is available as `provider_server::Provider`
//!
//! Some protobuf types have the same names as tfplug framework types
//! (`DynamicValue`, `Diagnostic`, `AttributePath`, `Schema`). Always use the
//! `proto::` prefix when referring to the wire types.

#![allow(clippy::all)]

tonic::include_proto!("tfplugin6");

pub use provider_server::{Provider as ProviderService, ProviderServer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_types_are_accessible() {
        let _ = diagnostic::Severity::Error;
        let _ = attribute_path::step::Selector::AttributeName("items".to_string());
        let _ = schema::object::NestingMode::List;
    }

    #[test]
    fn request_response_types_default() {
        let request = read_resource::Request::default();
        assert!(request.current_state.is_none());

        let response = apply_resource_change::Response::default();
        assert!(response.new_state.is_none());
        assert!(response.diagnostics.is_empty());
    }
}
