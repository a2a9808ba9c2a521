mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_stores_the_full_catalog_entry() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_and_login(server).await?;
    let name = common::unique("Keyboard");

    let res = client
        .post(server.url("/api/products/Add"))
        .bearer_auth(&token)
        .json(&json!({
            "name": name,
            "price": "1499",
            "category": "Electronics",
            "userId": "some-admin",
            "company": "Acme",
            "description": "Mechanical, clicky",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Product inserted successfully");
    let inserted = &body["insertedData"];
    assert_eq!(inserted["name"], name.as_str());
    assert_eq!(inserted["price"], "1499");
    assert_eq!(inserted["userId"], "some-admin");
    assert_eq!(inserted["isDeleted"], false);
    // No upload means an explicit null reference
    assert_eq!(inserted["image"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn optional_fields_left_out_stay_absent() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_and_login(server).await?;
    let name = common::unique("Mouse");

    let res = client
        .post(server.url("/api/products/Add"))
        .bearer_auth(&token)
        .json(&json!({ "name": name }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    let inserted = &body["insertedData"];
    assert!(inserted.get("price").is_none());
    assert!(inserted.get("company").is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_fields_in_the_body_are_never_stored() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_and_login(server).await?;
    let name = common::unique("Monitor");

    let res = client
        .post(server.url("/api/products/Add"))
        .bearer_auth(&token)
        .json(&json!({
            "name": name,
            "isDeleted": true,
            "id": "client-picked",
            "admin": true,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    let inserted = &body["insertedData"];
    // Store-managed fields win; the stray key is dropped
    assert_eq!(inserted["isDeleted"], false);
    assert!(inserted.get("admin").is_none());
    assert_ne!(inserted["id"], "client-picked");
    Ok(())
}

#[tokio::test]
async fn update_is_a_shallow_merge() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_and_login(server).await?;
    let name = common::unique("Webcam");

    let res = client
        .post(server.url("/api/products/Add"))
        .bearer_auth(&token)
        .json(&json!({ "name": name, "price": "899", "company": "Acme" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<Value>().await?["insertedData"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .put(server.url(&format!("/api/products/Update/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "price": "799" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Product updated successfully");
    let updated = &body["updatedData"];
    assert_eq!(updated["price"], "799");
    // Fields the patch did not mention are untouched
    assert_eq!(updated["name"], name.as_str());
    assert_eq!(updated["company"], "Acme");
    Ok(())
}

#[tokio::test]
async fn soft_deleted_products_leave_the_list() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_and_login(server).await?;
    let name = common::unique("Headset");

    let res = client
        .post(server.url("/api/products/Add"))
        .bearer_auth(&token)
        .json(&json!({ "name": name }))
        .send()
        .await?;
    let id = res.json::<Value>().await?["insertedData"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .delete(server.url(&format!("/api/products/Delete/{id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?["message"],
        "Product soft-deleted successfully"
    );

    let res = client
        .get(server.url("/api/products/list"))
        .bearer_auth(&token)
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    let listed: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|doc| doc["id"].as_str())
        .collect();
    assert!(!listed.contains(&id.as_str()));
    Ok(())
}

#[tokio::test]
async fn missing_products_use_the_per_operation_wording() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_and_login(server).await?;
    let absent = uuid::Uuid::new_v4();

    let res = client
        .get(server.url(&format!("/api/products/GetById/{absent}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["message"], "Product Not Found");

    let res = client
        .put(server.url(&format!("/api/products/Update/{absent}")))
        .bearer_auth(&token)
        .json(&json!({ "price": "1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["message"], "Product Not Found");

    let res = client
        .delete(server.url(&format!("/api/products/Delete/{absent}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["message"], "Product not found");
    Ok(())
}
