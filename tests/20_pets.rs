mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_pet_keeps_only_given_fields() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let admin = common::admin();

    let res = server
        .post("/api/pets", &admin)
        .json(&json!({ "name": "Rex", "species": "dog" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let pet = res.json::<Value>().await?;
    let obj = pet.as_object().expect("pet object");
    assert_eq!(obj["name"], "Rex");
    assert_eq!(obj["species"], "dog");
    for key in ["birthdate", "breed", "genre", "alive", "description", "allergies"] {
        assert!(!obj.contains_key(key), "{} should be absent: {}", key, pet);
    }
    assert_eq!(obj["notes"], json!([]));
    assert_eq!(obj["record"], json!([]));
    Ok(())
}

#[tokio::test]
async fn list_and_show_pets() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let caller = common::stranger();
    let rex = server.seed_pet("Rex").await?;
    server.seed_pet("Tom").await?;

    let res = server.get("/api/pets", &caller).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let pets = res.json::<Value>().await?;
    assert_eq!(pets.as_array().map(Vec::len), Some(2));

    let res = server.get(&format!("/api/pets/{}", rex), &caller).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "Rex");
    Ok(())
}

#[tokio::test]
async fn unknown_or_malformed_pet_id_is_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let caller = common::admin();

    for id in [uuid::Uuid::new_v4().to_string(), "not-an-id".to_string()] {
        let res = server.get(&format!("/api/pets/{}", id), &caller).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.json::<Value>().await?, json!({ "msg": "Resource not found" }));
    }
    Ok(())
}

#[tokio::test]
async fn update_is_partial_and_null_clears() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let caller = common::admin();
    let id = server.seed_pet("Rex").await?;
    let path = format!("/api/pets/{}", id);

    let res = server
        .put(&path, &caller)
        .json(&json!({ "breed": "beagle", "alive": false, "description": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let pet = res.json::<Value>().await?;
    assert_eq!(pet["name"], "Rex");
    assert_eq!(pet["breed"], "beagle");
    assert_eq!(pet["alive"], false);
    assert_eq!(pet["description"], "");

    let res = server.put(&path, &caller).json(&json!({ "breed": null })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let pet = res.json::<Value>().await?;
    assert!(pet.get("breed").is_none(), "breed should be cleared: {}", pet);
    assert_eq!(pet["name"], "Rex");
    Ok(())
}

#[tokio::test]
async fn update_with_relations_conflicts_and_writes_nothing() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let caller = common::admin();
    let id = server.seed_pet("Rex").await?;
    let path = format!("/api/pets/{}", id);

    for body in [json!({ "name": "Max", "notes": [] }), json!({ "record": ["x"] })] {
        let res = server.put(&path, &caller).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(
            res.json::<Value>().await?,
            json!({ "msg": "Something in the request is not correct" })
        );
    }

    let pet = server.get(&path, &caller).send().await?.json::<Value>().await?;
    assert_eq!(pet["name"], "Rex");
    Ok(())
}

#[tokio::test]
async fn malformed_body_conflicts() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let res = server
        .post("/api/pets", &common::admin())
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn delete_pet_returns_accepted_then_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let caller = common::admin();
    let id = server.seed_pet("Rex").await?;
    let path = format!("/api/pets/{}", id);

    let res = server.delete(&path, &caller).send().await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(res.json::<Value>().await?["name"], "Rex");

    let res = server.delete(&path, &caller).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn birthdate_as_datetime_is_stored_as_date() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let res = server
        .post("/api/pets", &common::admin())
        .json(&json!({ "name": "Rex", "birthdate": "2020-01-01T00:00:00.000Z" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?["birthdate"], "2020-01-01");
    Ok(())
}
