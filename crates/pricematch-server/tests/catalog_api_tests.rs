mod common;

use common::harness::{TEST_COLLECTION_NAME, spawn_test_server};
use pricematch::extraction::ExtractedProduct;

fn extracted_product(name: &str, brand: &str, unit: &str) -> ExtractedProduct {
    ExtractedProduct {
        normalized_name: name.to_string(),
        product_subtype: None,
        catalog_price: 1499.0,
        discount_percent: None,
        brand: Some(brand.to_string()),
        pack_count: 1,
        unit_of_measure: unit.to_string(),
        quantity_description: String::new(),
        inferred_category: None,
        confidence: 0.95,
        provenance: "test".to_string(),
        wholesaler: None,
    }
}

#[tokio::test]
async fn test_health_and_ready_endpoints() {
    let server = spawn_test_server(vec![], &[]).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/healthz", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("x-pricematch-status").unwrap(),
        "healthy"
    );

    let response = client
        .get(format!("{}/ready", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["vectordb"], "ready");
}

#[tokio::test]
async fn test_process_image_end_to_end() {
    let product = extracted_product("ACEITE GIRASOL COCINERO", "COCINERO", "1,5 LT");
    let server = spawn_test_server(vec![product.clone()], &[(42, &product)])
        .await
        .unwrap();

    let form = reqwest::multipart::Form::new()
        .part(
            "image",
            reqwest::multipart::Part::bytes(b"fake-image".to_vec())
                .file_name("maxiconsumo_ofertas.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        )
        .text("company", "MAXICONSUMO");

    let response = reqwest::Client::new()
        .post(format!("{}/catalog/process-image", server.url()))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["productsProcessed"], 1);
    assert_eq!(body["metadata"]["wholesalerTag"], "MAXICONSUMO");
    assert!(body["metadata"]["processingTimeMs"].is_u64());

    let item = &body["data"]["preview"][0];
    assert_eq!(item["producto_extraido"]["producto_normalizado"], "ACEITE GIRASOL COCINERO");
    assert_eq!(item["producto_extraido"]["mayorista"], "MAXICONSUMO");
    assert_eq!(item["total_coincidencias"], 1);
    assert_eq!(item["coincidencias"][0]["id"], 42);
}

#[tokio::test]
async fn test_process_image_without_file_is_rejected() {
    let server = spawn_test_server(vec![], &[]).await.unwrap();

    let form = reqwest::multipart::Form::new().text("company", "DIARCO");
    let response = reqwest::Client::new()
        .post(format!("{}/catalog/process-image", server.url()))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn test_ingest_search_and_collection_admin() {
    let server = spawn_test_server(vec![], &[]).await.unwrap();
    let client = reqwest::Client::new();

    let rows = serde_json::json!({
        "rows": [
            {
                "codigo": "5001",
                "rubro": "BEBIDAS",
                "marca": "COCA COLA",
                "descripcion": "GASEOSA COCA COLA 2.25L",
                "peso": "2,25 LT",
                "precio": 2800.0
            },
            {
                "codigo": "5002",
                "rubro": "BEBIDAS",
                "marca": "PEPSI",
                "descripcion": "GASEOSA PEPSI 2.25L",
                "peso": "2,25 LT",
                "precio": 2500.0
            }
        ]
    });

    let response = client
        .post(format!("{}/catalog/ingest", server.url()))
        .json(&rows)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["points"], 2);

    let response = client
        .get(format!("{}/catalog/collection", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["name"], TEST_COLLECTION_NAME);
    assert_eq!(body["points_count"], 2);

    // Search with an exact peso filter: both rows share the normalized
    // weight, so both are eligible; the query text pins the Coca point.
    let search = serde_json::json!({
        "texto": "Código: 5001; Rubro: BEBIDAS; Marca: COCA COLA; Descripción: GASEOSA COCA COLA 2.25L; Peso: 2,25 LT; Precio: $2800;",
        "filtros": { "peso": "2.25L" },
        "score_threshold": 0.9
    });
    let response = client
        .post(format!("{}/catalog/search", server.url()))
        .json(&search)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["resultados"][0]["id"], 5001);

    let response = client
        .post(format!("{}/catalog/recreate-collection", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/catalog/collection", server.url()))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["points_count"], 0);
}
