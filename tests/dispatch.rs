//! Verb resolution and name-based parameter binding, driven through a
//! resource's endpoint groups.

mod common;

use common::person_resource;
use proptest::prelude::*;
use rest_binder::{EndpointKind, RestRequest};
use serde_json::json;

#[tokio::test]
async fn test_unknown_verb_enumerates_allowed_methods() {
    let (resource, _) = person_resource();

    let request = RestRequest::new("PATCH");
    let response = resource
        .handle(EndpointKind::Collection, &request)
        .await
        .unwrap();

    assert_eq!(response.status(), 405);
    assert_eq!(response.header("Allow"), Some("GET, POST"));

    let request = RestRequest::new("POST").with_path_param("instance_id", "42");
    let response = resource
        .handle(EndpointKind::Instance, &request)
        .await
        .unwrap();
    assert_eq!(response.status(), 405);
    assert_eq!(response.header("Allow"), Some("GET, PUT, DELETE"));
}

#[tokio::test]
async fn test_method_lookup_is_case_insensitive() {
    let (resource, _) = person_resource();

    let request = RestRequest::new("get");
    let response = resource
        .handle(EndpointKind::Collection, &request)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_missing_path_parameter_is_a_client_error() {
    let (resource, _) = person_resource();

    // instance GET declares instance_id, which was never bound
    let request = RestRequest::new("GET");
    let response = resource
        .handle(EndpointKind::Instance, &request)
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body = response.body_json().unwrap();
    assert!(body["error"].as_str().unwrap().contains("instance_id"));
}

#[tokio::test]
async fn test_binding_is_by_name_not_position() {
    let (resource, store) = person_resource();
    common::seed_person(&store, "42", "henry", 469).await;

    // property handlers bind (instance_id, property_name); supplying the
    // variables in the opposite order must not matter
    let request = RestRequest::new("GET")
        .with_path_param("property_name", "name")
        .with_path_param("instance_id", "42");
    let response = resource
        .handle(EndpointKind::Property, &request)
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.body_json().unwrap(), json!({"name": "henry"}));
}

#[tokio::test]
async fn test_extra_path_parameters_are_ignored() {
    let (resource, store) = person_resource();
    common::seed_person(&store, "42", "henry", 469).await;

    let request = RestRequest::new("GET")
        .with_path_param("instance_id", "42")
        .with_path_param("tenant", "acme");
    let response = resource
        .handle(EndpointKind::Instance, &request)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

proptest! {
    #[test]
    fn test_unregistered_verbs_always_enumerate_the_same_set(
        verb in "[A-Z]{3,10}".prop_filter("must not be registered", |v| {
            v.as_str() != "GET" && v.as_str() != "POST"
        })
    ) {
        tokio_test::block_on(async {
            let (resource, _) = person_resource();
            let response = resource
                .handle(EndpointKind::Collection, &RestRequest::new(verb))
                .await
                .unwrap();
            prop_assert_eq!(response.status(), 405);
            prop_assert_eq!(response.header("Allow"), Some("GET, POST"));
            Ok(())
        })?;
    }
}
