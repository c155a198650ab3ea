//! End-to-end walkthrough of a `people` resource: create, list, update
//! a property, and delete, with a hook watching the mutations.
//!
//! Run with `cargo run --example people`.

use rest_binder::{
    EndpointKind, InMemoryStore, RestRequest, RestResource, RestResponse, SerdeFactory,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Person {
    #[serde(default = "fresh_id")]
    id: String,
    name: String,
    age: u32,
    // never served, always stored as null
    password: Option<String>,
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn show(label: &str, response: &RestResponse) {
    println!("== {label}: {}", response.status());
    if let Some(location) = response.header("Location") {
        println!("   Location: {location}");
    }
    if let Some(body) = response.body() {
        println!("{}", String::from_utf8_lossy(body));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let people = RestResource::builder("people")
        .fields(["id", "name", "age", "password"])
        .protect("password")
        .factory(SerdeFactory::<Person>::new())
        .store(InMemoryStore::new())
        .hook(EndpointKind::Collection, "POST", |ctx| async move {
            println!(
                "   (hook) created '{}'",
                ctx.instance_id.as_deref().unwrap_or("?")
            );
            Ok(())
        })
        .build()?;

    for route in people.routes() {
        println!("registered {} ({})", route.pattern, route.endpoint);
    }

    // create with a server-assigned id
    let request = RestRequest::new("POST")
        .with_json(&json!({"name": "henry", "age": 469, "password": "hunter2"}));
    let created = people.handle(EndpointKind::Collection, &request).await?;
    show("POST /people", &created);
    let id = created.body_json().and_then(|b| {
        b["id"].as_str().map(str::to_string)
    });
    let id = id.ok_or("create response carried no id")?;

    // create under a chosen id
    let request = RestRequest::new("PUT")
        .with_path_param("instance_id", "george")
        .with_json(&json!({"name": "george", "age": 35}));
    show(
        "PUT /people/george",
        &people.handle(EndpointKind::Instance, &request).await?,
    );

    // list everything
    let listing = people
        .handle(EndpointKind::Collection, &RestRequest::new("GET"))
        .await?;
    show("GET /people", &listing);

    // rename henry
    let request = RestRequest::new("PUT")
        .with_path_param("instance_id", &id)
        .with_path_param("property_name", "name")
        .with_json(&json!({"name": "vertical"}));
    show(
        "PUT /people/{id}/name",
        &people.handle(EndpointKind::Property, &request).await?,
    );

    // an unsupported verb gets a 405 with the allowed set
    let rejected = people
        .handle(EndpointKind::Collection, &RestRequest::new("PATCH"))
        .await?;
    show("PATCH /people", &rejected);

    // remove george
    let request = RestRequest::new("DELETE").with_path_param("instance_id", "george");
    show(
        "DELETE /people/george",
        &people.handle(EndpointKind::Instance, &request).await?,
    );

    Ok(())
}
