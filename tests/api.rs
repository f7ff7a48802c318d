mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::{CNPJ_A, CPF_A, CPF_B, TestApp, error_code, id_of};

// ============ Producers ============

#[tokio::test]
async fn producers_are_created_normalised_and_shown_formatted() {
    let app = TestApp::new();

    let (status, created) = app
        .post(
            "/api/producers",
            json!({ "cpfCnpj": CPF_A, "producerName": "  João Silva  " }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["cpfCnpj"], "52998224725");
    assert_eq!(created["producerName"], "João Silva");

    let (status, shown) = app
        .get(&format!("/api/producers/{}", id_of(&created)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["cpfCnpj"], CPF_A);
    assert_eq!(shown["farms"], json!([]));
}

#[tokio::test]
async fn producer_documents_are_validated_and_unique() {
    let app = TestApp::new();
    app.producer(CNPJ_A, "Agropecuária Brasil").await;

    let (status, body) = app
        .post(
            "/api/producers",
            json!({ "cpfCnpj": "11222333000181", "producerName": "Outra" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "duplicate");
    assert_eq!(body["error"]["message"], "Já existe um produtor com este CPF/CNPJ");

    let (status, body) = app
        .post(
            "/api/producers",
            json!({ "cpfCnpj": "123", "producerName": "Curto" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
    assert_eq!(body["error"]["message"], "Invalid CPF or CNPJ format");
}

#[tokio::test]
async fn producer_update_rejects_a_document_taken_by_another_producer() {
    let app = TestApp::new();
    let first = app.producer(CPF_A, "Primeiro").await;
    app.producer(CPF_B, "Segundo").await;

    let (status, body) = app
        .patch(
            &format!("/api/producers/{first}"),
            json!({ "cpfCnpj": CPF_B }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "duplicate");

    let (status, body) = app
        .patch(
            &format!("/api/producers/{first}"),
            json!({ "producerName": "Renomeado" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["producerName"], "Renomeado");
    assert_eq!(body["cpfCnpj"], "52998224725");
}

#[tokio::test]
async fn producers_filter_by_the_state_of_their_farms() {
    let app = TestApp::new();
    let north = app.producer(CPF_A, "Norte").await;
    let south = app.producer(CPF_B, "Sul").await;
    app.farm(&north, "Fazenda Norte", "MT", 100.0).await;
    app.farm(&south, "Fazenda Sul", "PR", 100.0).await;

    let (status, page) = app.get("/api/producers?state=PR").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["data"][0]["producerName"], "Sul");
    assert_eq!(page["data"][0]["farms"][0]["farmName"], "Fazenda Sul");
}

#[tokio::test]
async fn deleted_producers_disappear() {
    let app = TestApp::new();
    let id = app.producer(CPF_A, "Temporário").await;

    let (status, body) = app.delete(&format!("/api/producers/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.get(&format!("/api/producers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Produtor não encontrado");

    let (status, _) = app.delete(&format!("/api/producers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============ Request decoding ============

#[tokio::test]
async fn malformed_identifiers_bodies_and_queries_are_bad_requests() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/farms/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "bad_request");

    let (status, body) = app
        .post("/api/crops", json!({ "description": "sem nome" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "bad_request");

    let (status, body) = app.get("/api/farms?take=many").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_query");

    let (status, body) = app.get("/api/farms?sort=password:asc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": {
        "code": "invalid_query",
        "hint": "unknown field `password`",
        "message": "Invalid list query"
      }
    }
    "#);

    let (status, body) = app.get("/api/crops?from=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_query");
}

// ============ Farms ============

#[tokio::test]
async fn farm_areas_must_fit_the_total() {
    let app = TestApp::new();
    let producer = app.producer(CPF_A, "Dono").await;

    let (status, body) = app
        .post(
            "/api/farms",
            json!({
                "farmName": "Fazenda Apertada",
                "city": "Sorriso",
                "state": "MT",
                "totalArea": 100.0,
                "agriculturableArea": 80.0,
                "vegetationArea": 40.0,
                "producerId": producer,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
    assert_eq!(
        body["error"]["message"],
        "A soma das áreas (120ha) não pode exceder a área total (100ha)"
    );
}

#[tokio::test]
async fn farms_need_an_existing_producer() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/farms",
            json!({
                "farmName": "Fazenda Órfã",
                "city": "Sorriso",
                "state": "MT",
                "totalArea": 100.0,
                "agriculturableArea": 50.0,
                "vegetationArea": 50.0,
                "producerId": uuid::Uuid::new_v4(),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Produtor não encontrado");
}

#[tokio::test]
async fn farm_update_revalidates_the_merged_areas() {
    let app = TestApp::new();
    let producer = app.producer(CPF_A, "Dono").await;
    let farm = app.farm(&producer, "Fazenda", "MT", 100.0).await;

    let (status, _) = app
        .patch(&format!("/api/farms/{farm}"), json!({ "totalArea": 50.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .patch(
            &format!("/api/farms/{farm}"),
            json!({ "totalArea": 150.0, "city": "Sinop" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Sinop");
    assert_eq!(body["totalArea"].as_f64(), Some(150.0));
    assert_eq!(body["agriculturableArea"].as_f64(), Some(80.0));
}

#[tokio::test]
async fn farm_lists_search_filter_sort_and_paginate() {
    let app = TestApp::new();
    let producer = app.producer(CPF_A, "Dono").await;
    app.farm(&producer, "Fazenda Alfa", "MT", 100.0).await;
    app.farm(&producer, "Fazenda Beta", "MT", 200.0).await;
    app.farm(&producer, "Sítio Gama", "GO", 300.0).await;
    app.farm(&producer, "Fazenda Delta", "GO", 400.0).await;

    let (status, page) = app
        .get("/api/farms?search=fazenda&state=GO&sort=farmName:asc")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["data"][0]["farmName"], "Fazenda Delta");
    assert_eq!(page["data"][0]["producerName"], "Dono");

    let (_, page) = app.get("/api/farms?sort=totalArea:asc&skip=1&take=2").await;
    assert_eq!(page["count"], 4);
    let names: Vec<_> = page["data"]
        .as_array()
        .expect("data")
        .iter()
        .map(|farm| farm["farmName"].as_str().expect("name").to_string())
        .collect();
    assert_eq!(names, ["Fazenda Beta", "Sítio Gama"]);

    // Default order is newest first.
    let (_, page) = app.get("/api/farms?take=1").await;
    assert_eq!(page["data"][0]["farmName"], "Fazenda Delta");
}

#[tokio::test]
async fn interval_filters_only_accept_timestamp_fields() {
    let app = TestApp::new();
    let producer = app.producer(CPF_A, "Dono").await;
    app.farm(&producer, "Fazenda", "MT", 100.0).await;

    let (status, page) = app
        .get("/api/farms?intervalName=createdAt&from=2000-01-01&to=2100-01-01")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);

    for field in ["farmName", "totalArea"] {
        let (status, body) = app
            .get(&format!(
                "/api/farms?intervalName={field}&from=2000-01-01&to=2100-01-01"
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
        assert_eq!(error_code(&body), "invalid_query");
        assert_eq!(body["error"]["hint"], format!("unknown field `{field}`"));
    }

    let (status, _) = app
        .get("/api/harvests?intervalName=harvestYear&from=2000-01-01&to=2100-01-01")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/harvests",
            json!({
                "harvestName": "Safra 2024/2025",
                "harvestYear": 2024,
                "startDate": "2024-09-01",
                "endDate": "2025-03-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let (status, page) = app
        .get("/api/harvests?intervalName=startDate&from=2024-08-01&to=2024-10-01")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
}

#[tokio::test]
async fn farm_statistics_aggregate_live_farms() {
    let app = TestApp::new();
    let producer = app.producer(CPF_A, "Dono").await;
    app.farm(&producer, "Um", "MT", 100.0).await;
    app.farm(&producer, "Dois", "MT", 200.0).await;
    let gone = app.farm(&producer, "Três", "GO", 300.0).await;
    app.delete(&format!("/api/farms/{gone}")).await;

    let (status, by_state) = app.get("/api/farms/stats/by-state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_state, json!([{ "state": "MT", "count": 2 }]));

    let (_, total) = app.get("/api/farms/stats/total-hectares").await;
    assert_eq!(total["totalHectares"].as_f64(), Some(300.0));

    let (_, land_use) = app.get("/api/farms/stats/land-use").await;
    assert_eq!(land_use[0]["type"], "Agriculturable");
    assert_eq!(land_use[0]["area"].as_f64(), Some(240.0));
    assert_eq!(land_use[1]["type"], "Vegetation");
    assert_eq!(land_use[1]["area"].as_f64(), Some(60.0));
}

// ============ Crops and harvests ============

#[tokio::test]
async fn crop_names_are_required_and_unique() {
    let app = TestApp::new();
    let soja = app.crop("Soja").await;

    let (status, body) = app.post("/api/crops", json!({ "cropName": "Soja" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "duplicate");

    let (status, body) = app.post("/api/crops", json!({ "cropName": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Nome é obrigatório");

    let (status, body) = app
        .patch(
            &format!("/api/crops/{soja}"),
            json!({ "description": "Soja transgênica" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cropName"], "Soja");
    assert_eq!(body["description"], "Soja transgênica");
}

#[tokio::test]
async fn harvests_validate_year_and_season() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/harvests",
            json!({ "harvestName": "Antiga", "harvestYear": 1999 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "O ano da safra deve ser pelo menos 2000");

    let (status, body) = app
        .post(
            "/api/harvests",
            json!({
                "harvestName": "Invertida",
                "harvestYear": 2024,
                "startDate": "2025-03-01",
                "endDate": "2024-09-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Start date must be before end date");

    let (status, body) = app
        .post(
            "/api/harvests",
            json!({
                "harvestName": "Ilegível",
                "harvestYear": 2024,
                "startDate": "first of march",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_input");

    let (status, body) = app
        .post(
            "/api/harvests",
            json!({
                "harvestName": "Safra 2024/2025",
                "harvestYear": 2024,
                "startDate": "2024-09-01",
                "endDate": "2025-08-31",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["startDate"], "2024-09-01T00:00:00Z");

    let (_, page) = app.get("/api/harvests?harvestYear=2024").await;
    assert_eq!(page["count"], 1);
    let (_, page) = app.get("/api/harvests?harvestYear=2023").await;
    assert_eq!(page["count"], 0);
}

// ============ Plantings ============

#[tokio::test]
async fn plantings_check_references_duplicates_and_remaining_area() {
    let app = TestApp::new();
    let producer = app.producer(CPF_A, "Dono").await;
    let farm = app.farm(&producer, "Fazenda", "MT", 100.0).await;
    let soja = app.crop("Soja").await;
    let milho = app.crop("Milho").await;
    let harvest = app.harvest("Safra 2024/2025", 2024).await;

    let (status, body) = app
        .post(
            "/api/farm-crops",
            json!({
                "farmId": farm,
                "cropId": uuid::Uuid::new_v4(),
                "harvestId": harvest,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Crop not found");

    let (status, planting) = app
        .post(
            "/api/farm-crops",
            json!({
                "farmId": farm,
                "cropId": soja,
                "harvestId": harvest,
                "plantedArea": 50.0,
                "expectedYield": 3.5,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(planting["cropName"], "Soja");

    let (status, body) = app
        .post(
            "/api/farm-crops",
            json!({ "farmId": farm, "cropId": soja, "harvestId": harvest }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "duplicate");

    // 80 ha agriculturable, 50 already planted.
    let (status, body) = app
        .post(
            "/api/farm-crops",
            json!({
                "farmId": farm,
                "cropId": milho,
                "harvestId": harvest,
                "plantedArea": 31.0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Planted area exceeds farm agriculturable area for this harvest"
    );

    // The planting's own area does not count against its update.
    let (status, _) = app
        .patch(
            &format!("/api/farm-crops/{}", id_of(&planting)),
            json!({ "plantedArea": 80.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, by_farm) = app.get(&format!("/api/farm-crops/by-farm/{farm}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_farm.as_array().map(Vec::len), Some(1));
    assert_eq!(by_farm[0]["plantedArea"].as_f64(), Some(80.0));

    let (_, by_harvest) = app
        .get(&format!("/api/farm-crops/by-harvest/{harvest}"))
        .await;
    assert_eq!(by_harvest.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn crop_statistics_count_live_plantings() {
    let app = TestApp::new();
    let producer = app.producer(CPF_A, "Dono").await;
    let first = app.farm(&producer, "Primeira", "MT", 100.0).await;
    let second = app.farm(&producer, "Segunda", "GO", 100.0).await;
    let soja = app.crop("Soja").await;
    app.crop("Milho").await;
    let harvest = app.harvest("Safra 2024/2025", 2024).await;

    for farm in [&first, &second] {
        let (status, _) = app
            .post(
                "/api/farm-crops",
                json!({
                    "farmId": farm,
                    "cropId": soja,
                    "harvestId": harvest,
                    "plantedArea": 10.5,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, stats) = app.get("/api/crops/stats/crop-statistics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!([
            { "cropName": "Soja", "count": 2, "totalArea": 21.0 },
            { "cropName": "Milho", "count": 0, "totalArea": 0.0 },
        ])
    );
}

// ============ Dashboard and health ============

#[tokio::test]
async fn dashboard_combines_every_statistic() {
    let app = TestApp::new();
    let producer = app.producer(CPF_A, "Dono").await;
    app.farm(&producer, "Fazenda", "MT", 250.0).await;
    app.crop("Soja").await;

    let (status, stats) = app.get("/api/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalFarms"], 1);
    assert_eq!(stats["totalProducers"], 1);
    assert_eq!(stats["totalHectares"].as_f64(), Some(250.0));
    assert_eq!(stats["farmsByState"], json!([{ "state": "MT", "count": 1 }]));
    assert_eq!(stats["cropStats"][0]["cropName"], "Soja");
    assert_eq!(stats["landUse"][0]["area"].as_f64(), Some(200.0));
}

#[tokio::test]
async fn health_probe_reflects_the_store() {
    let app = TestApp::new();

    let (status, _) = app.get("/_health/db").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    app.repos.set_unhealthy(true);
    let (status, _) = app.get("/_health/db").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
