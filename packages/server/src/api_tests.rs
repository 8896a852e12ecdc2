use std::sync::Arc;

use actix_multipart::form::tempfile::TempFileConfig;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::Duration;
use rth_map_auth::AuthConfig;
use rth_map_database::DbPool;
use rth_map_database_models::AdminRole;
use serde_json::{Value, json};

use crate::interactive::{self, AdminInput};
use crate::{AppState, configure, multipart_config, not_found_service};

const BOUNDARY: &str = "----rthmapboundary";

fn state() -> web::Data<AppState> {
    let pool = DbPool::open_in_memory(2).unwrap();
    web::Data::new(AppState::new(
        Arc::new(pool),
        AuthConfig::new("test-secret", Duration::hours(1), 4),
        false,
    ))
}

fn seed_admin(state: &AppState, username: &str, role: AdminRole) {
    interactive::create_admin(
        &state.pool,
        &state.auth,
        AdminInput {
            username: username.to_string(),
            password: "rahasia123".to_string(),
            email: None,
            role,
        },
    )
    .unwrap();
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn multipart_upload(file_name: &str, content: &str) -> (String, String) {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"geojsonFile\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/geo+json\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    );
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

fn bandung_geojson() -> String {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "NAMOBJ": "Coblong", "Shape_Area": 0.00025 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[107.6, -6.9, 700.0], [107.7, -6.9, 710.0], [107.6, -6.9, 700.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "WADMKC": "Andir", "luasRTH": "0.00005" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[107.5, -6.9], [107.55, -6.9], [107.5, -6.9]]]]
                }
            }
        ]
    })
    .to_string()
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(crate::error::error_handlers())
                .configure(configure)
                .default_service(not_found_service()),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": $username, "password": "rahasia123" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn health_reports_database() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["healthy"], true);
    assert_eq!(body["database"], true);
}

#[actix_web::test]
async fn unknown_routes_get_json_404() {
    let state = state();
    let app = app!(state);

    for uri in ["/api/nope", "/nope", "/api/kecamatan/extra/segments"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Route not found");
    }
}

#[actix_web::test]
async fn empty_database_serves_empty_collections() {
    let state = state();
    let app = app!(state);

    for uri in ["/api/kecamatan", "/api/kecamatan/public", "/api/kecamatan/map-data"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "type": "FeatureCollection", "features": [] }), "{uri}");
    }

    let req = test::TestRequest::get().uri("/api/rth-kecamatan/public").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn write_routes_require_a_token() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/rth-kecamatan")
        .set_json(json!({ "kecamatan": "Coblong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Access denied. No token provided.");

    let req = test::TestRequest::patch()
        .uri("/api/kecamatan/analyze-rth")
        .insert_header(bearer("garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid token.");
}

#[actix_web::test]
async fn login_failures() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "editor" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "editor", "password": "wrong-password" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "nobody", "password": "rahasia123" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn inactive_account_cannot_log_in() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    {
        let conn = state.pool.acquire().unwrap();
        let admin = rth_map_database::admins::find_by_username(&conn, "editor")
            .unwrap()
            .unwrap();
        rth_map_database::admins::set_active(&conn, &admin.id, false).unwrap();
    }
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "editor", "password": "rahasia123" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_revokes_the_token() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);

    let token = login!(app, "Editor");

    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["admin"]["username"], "editor");
    assert!(body["data"]["admin"]["lastLogin"].is_string());
    assert!(body["data"]["admin"].get("passwordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Token has been invalidated.");
}

#[actix_web::test]
async fn change_password_flow() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);
    let token = login!(app, "editor");

    let req = test::TestRequest::post()
        .uri("/api/auth/change-password")
        .insert_header(bearer(&token))
        .set_json(json!({ "currentPassword": "wrong-one", "newPassword": "baru12345" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/auth/change-password")
        .insert_header(bearer(&token))
        .set_json(json!({ "currentPassword": "rahasia123", "newPassword": "123" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/auth/change-password")
        .insert_header(bearer(&token))
        .set_json(json!({ "currentPassword": "rahasia123", "newPassword": "baru12345" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "editor", "password": "baru12345" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn only_super_admins_create_admins() {
    let state = state();
    seed_admin(&state, "root", AdminRole::SuperAdmin);
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);

    let editor = login!(app, "editor");
    let req = test::TestRequest::post()
        .uri("/api/auth/create-admin")
        .insert_header(bearer(&editor))
        .set_json(json!({ "username": "another", "password": "rahasia123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Access denied. Super admin role required.");

    let root = login!(app, "root");
    let req = test::TestRequest::post()
        .uri("/api/auth/create-admin")
        .insert_header(bearer(&root))
        .set_json(json!({ "username": "Another", "password": "rahasia123", "email": "a@b.id" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["admin"]["username"], "another");
    assert_eq!(body["data"]["admin"]["role"], "admin");
    assert_eq!(body["data"]["admin"]["isActive"], true);

    let too_long = "u".repeat(80);
    for (username, password) in [
        ("another", "rahasia123"),
        ("ab", "rahasia123"),
        (too_long.as_str(), "rahasia123"),
        ("third", "123"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/create-admin")
            .insert_header(bearer(&root))
            .set_json(json!({ "username": username, "password": password }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST,
            "{username}"
        );
    }

    let longest = "u".repeat(50);
    let req = test::TestRequest::post()
        .uri("/api/auth/create-admin")
        .insert_header(bearer(&root))
        .set_json(json!({ "username": longest, "password": "rahasia123" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn import_then_map_data_joins_statistics() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);
    let token = login!(app, "editor");

    let (content_type, body) = multipart_upload("bandung.geojson", &bandung_geojson());
    let req = test::TestRequest::post()
        .uri("/api/kecamatan/import")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["count"], 2);

    let req = test::TestRequest::post()
        .uri("/api/rth-kecamatan/bulk")
        .insert_header(bearer(&token))
        .set_json(json!({ "data": [
            { "KECAMATAN": " coblong ", "LUAS TAMAN": "12,5", "CLUSTER": 2 }
        ] }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/kecamatan/map-data").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);

    let coblong = &features[0]["properties"];
    assert_eq!(coblong["name"], "Coblong");
    assert_eq!(coblong["hasData"], true);
    assert_eq!(coblong["cluster"], "cluster_2");
    assert_eq!(coblong["clusterName"], "Cluster 2 (RTH Tinggi)");
    assert_eq!(coblong["fillColor"], "#38A169");
    assert_eq!(coblong["luas_taman"], 12.5);

    let andir = &features[1]["properties"];
    assert_eq!(andir["name"], "Andir");
    assert_eq!(andir["hasData"], false);
    assert_eq!(andir["fillColor"], "#CCCCCC");

    let ring = &features[0]["geometry"]["coordinates"][0];
    assert!(ring.as_array().unwrap().iter().all(|p| p.as_array().unwrap().len() == 2));
    assert_eq!(features[1]["geometry"]["type"], "MultiPolygon");
}

#[actix_web::test]
async fn import_rejects_bad_uploads_and_keeps_data() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);
    let token = login!(app, "editor");

    let (content_type, body) = multipart_upload("bandung.geojson", &bandung_geojson());
    let req = test::TestRequest::post()
        .uri("/api/kecamatan/import")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let broken = json!({
        "type": "FeatureCollection",
        "features": [{ "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [1, 2] } }]
    })
    .to_string();
    let (content_type, body) = multipart_upload("broken.geojson", &broken);
    let req = test::TestRequest::post()
        .uri("/api/kecamatan/import")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart_upload("notes.txt", "hello");
    let req = test::TestRequest::post()
        .uri("/api/kecamatan/import")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body.replace("application/geo+json", "text/plain"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/kecamatan").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["features"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn uploads_are_size_limited_and_leave_no_temp_files() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);

    let upload_dir = std::env::temp_dir().join(format!("rth_map_uploads_{}", std::process::id()));
    std::fs::create_dir_all(&upload_dir).unwrap();
    let leftover = || std::fs::read_dir(&upload_dir).unwrap().count();

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(crate::error::error_handlers())
            .configure(configure)
            .app_data(multipart_config(4 * 1024))
            .app_data(TempFileConfig::default().directory(&upload_dir))
            .default_service(not_found_service()),
    )
    .await;
    let token = login!(app, "editor");

    let (content_type, body) = multipart_upload("bandung.geojson", &bandung_geojson());
    let req = test::TestRequest::post()
        .uri("/api/kecamatan/import")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    assert_eq!(leftover(), 0);

    let (content_type, body) = multipart_upload("broken.geojson", r#"{"type":"Feature"}"#);
    let req = test::TestRequest::post()
        .uri("/api/kecamatan/import")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(leftover(), 0);

    let oversized = json!({
        "type": "FeatureCollection",
        "features": [],
        "padding": "x".repeat(8 * 1024)
    })
    .to_string();
    let (content_type, body) = multipart_upload("big.geojson", &oversized);
    let req = test::TestRequest::post()
        .uri("/api/kecamatan/import")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(leftover(), 0);

    let req = test::TestRequest::get().uri("/api/kecamatan").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["features"].as_array().unwrap().len(), 2);

    std::fs::remove_dir_all(&upload_dir).unwrap();
}

#[actix_web::test]
async fn analyze_recolors_by_area() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);
    let token = login!(app, "editor");

    let (content_type, body) = multipart_upload("bandung.geojson", &bandung_geojson());
    let req = test::TestRequest::post()
        .uri("/api/kecamatan/import")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::patch()
        .uri("/api/kecamatan/analyze-rth")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], json!({ "high": 1, "medium": 0, "low": 1 }));

    let req = test::TestRequest::get().uri("/api/kecamatan").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["features"][0]["properties"]["color"], "#4CAF50");
    assert_eq!(body["features"][1]["properties"]["color"], "#F44336");
}

#[actix_web::test]
async fn statistic_crud() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);
    let token = login!(app, "editor");

    let req = test::TestRequest::post()
        .uri("/api/rth-kecamatan")
        .insert_header(bearer(&token))
        .set_json(json!({ "kecamatan": "Coblong", "luas_taman": 10, "luas_kecamatan": "40" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let id = body["data"]["_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["cluster"], "cluster_0");

    let req = test::TestRequest::post()
        .uri("/api/rth-kecamatan")
        .insert_header(bearer(&token))
        .set_json(json!({ "kecamatan": "COBLONG" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/rth-kecamatan")
        .insert_header(bearer(&token))
        .set_json(json!({ "luas_taman": 1 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/rth-kecamatan/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "cluster": "cluster_1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["cluster"], "cluster_1");
    assert_eq!(body["data"]["luas_taman"], 10.0);
    assert_eq!(body["data"]["luas_kecamatan"], 40.0);

    let req = test::TestRequest::put()
        .uri("/api/rth-kecamatan/does-not-exist")
        .insert_header(bearer(&token))
        .set_json(json!({ "cluster": "cluster_1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/rth-kecamatan/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/rth-kecamatan/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn bulk_replaces_and_validates() {
    let state = state();
    seed_admin(&state, "editor", AdminRole::Admin);
    let app = app!(state);
    let token = login!(app, "editor");

    let req = test::TestRequest::post()
        .uri("/api/rth-kecamatan/bulk")
        .insert_header(bearer(&token))
        .set_json(json!({ "data": [
            { "KECAMATAN": "Coblong", "LUAS TAMAN": "12,5" },
            { "kecamatan": "Andir", "luas_pemakaman": 3, "cluster": "cluster_1" }
        ] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["count"], 2);

    let req = test::TestRequest::get().uri("/api/rth-kecamatan").to_request();
    let rows: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(rows[0]["kecamatan"], "Andir");
    assert_eq!(rows[1]["kecamatan"], "Coblong");
    assert_eq!(rows[1]["luas_taman"], 12.5);
    assert_eq!(rows[1]["luas_pemakaman"], 0.0);
    assert_eq!(rows[1]["cluster"], "cluster_0");

    for bad in [
        json!({ "data": [] }),
        json!({}),
        json!({ "data": [{ "LUAS TAMAN": 1 }] }),
        json!({ "data": [{ "kecamatan": "Lengkong" }, { "kecamatan": "lengkong" }] }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/rth-kecamatan/bulk")
            .insert_header(bearer(&token))
            .set_json(&bad)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST,
            "{bad}"
        );
    }

    let req = test::TestRequest::get().uri("/api/rth-kecamatan").to_request();
    let rows: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(rows.as_array().unwrap().len(), 2);
}
