//! Full resource flow over the document-collection backend.

mod common;

use common::{FakeCollection, Person};
use rest_binder::{
    DocumentBackend, EndpointKind, RestRequest, RestResource, SerdeFactory,
};
use serde_json::json;

fn people_over_documents() -> (RestResource<DocumentBackend<FakeCollection>>, FakeCollection) {
    common::init_logging();
    let collection = FakeCollection::default();
    let resource = RestResource::builder("people")
        .fields(["id", "name", "age"])
        .factory(SerdeFactory::<Person>::new())
        .store(DocumentBackend::new(collection.clone(), "id"))
        .build()
        .unwrap();
    (resource, collection)
}

#[tokio::test]
async fn test_create_then_fetch_round_trips_without_storage_id() {
    let (resource, _) = people_over_documents();

    let request = RestRequest::new("POST").with_json(&json!({"name": "henry", "age": 469}));
    let created = resource
        .handle(EndpointKind::Collection, &request)
        .await
        .unwrap();
    assert_eq!(created.status(), 201);
    let id = created.body_json().unwrap()["id"].as_str().unwrap().to_string();

    let request = RestRequest::new("GET").with_path_param("instance_id", &id);
    let fetched = resource
        .handle(EndpointKind::Instance, &request)
        .await
        .unwrap();
    assert_eq!(fetched.status(), 200);

    // the collection's internal storage id never leaks
    let body = fetched.body_json().unwrap();
    assert!(body.get("_id").is_none());
    assert_eq!(body["name"], "henry");
}

#[tokio::test]
async fn test_listing_reads_every_document() {
    use rest_binder::DocumentStore;
    let (resource, collection) = people_over_documents();
    collection
        .insert(json!({"id": "1", "name": "henry", "age": 469}))
        .await
        .unwrap();
    collection
        .insert(json!({"id": "2", "name": "george", "age": 35}))
        .await
        .unwrap();

    let response = resource
        .handle(EndpointKind::Collection, &RestRequest::new("GET"))
        .await
        .unwrap();
    let listing = response.body_json().unwrap();
    assert_eq!(listing.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_put_conflict_detection_uses_the_id_filter() {
    let (resource, _) = people_over_documents();

    let request = RestRequest::new("PUT")
        .with_path_param("instance_id", "42")
        .with_json(&json!({"name": "henry", "age": 469}));
    let first = resource
        .handle(EndpointKind::Instance, &request)
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    let request = RestRequest::new("PUT")
        .with_path_param("instance_id", "42")
        .with_json(&json!({"name": "george", "age": 35}));
    let second = resource
        .handle(EndpointKind::Instance, &request)
        .await
        .unwrap();
    assert_eq!(second.status(), 400);
}

#[tokio::test]
async fn test_property_update_writes_through_the_collection() {
    use rest_binder::DocumentStore;
    let (resource, collection) = people_over_documents();
    collection
        .insert(json!({"id": "42", "name": "henry", "age": 469}))
        .await
        .unwrap();

    let request = RestRequest::new("PUT")
        .with_path_param("instance_id", "42")
        .with_path_param("property_name", "name")
        .with_json(&json!({"name": "vertical"}));
    let response = resource
        .handle(EndpointKind::Property, &request)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let stored = collection.find(&json!({"id": "42"})).await.unwrap();
    assert_eq!(stored[0]["name"], "vertical");
}
