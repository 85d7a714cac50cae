// Integration tests for the VTON gateway HTTP surface

use actix_web::http::header::{self, HeaderMap};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use vton_gateway::config::{
    EndpointSettings, FallbackSettings, LimitSettings, LoggingSettings, ServerSettings, Settings,
    UpstreamSettings,
};
use vton_gateway::routes::{self, vton::AppState};

const BOUNDARY: &str = "----vtonboundary7MA4YWxkTrZu0gW";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}.jpg\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn try_on_request(parts: &[Part]) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/v1/vton/idm")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(parts))
}

fn settings_for(server_url: &str) -> Settings {
    Settings {
        server: ServerSettings::default(),
        upstream: UpstreamSettings {
            connect_timeout_secs: 2,
            fetch_timeout_secs: 5,
            invoke_timeout_secs: 5,
            probe_timeout_secs: 2,
            ..UpstreamSettings::default()
        },
        limits: LimitSettings::default(),
        fallback: FallbackSettings::default(),
        catalog: vec![
            EndpointSettings {
                label: "space-a".to_string(),
                base_url: format!("{}/space-a", server_url),
                paths: vec!["/api/predict".to_string(), "/run/predict".to_string()],
            },
            EndpointSettings {
                label: "space-b".to_string(),
                base_url: format!("{}/space-b", server_url),
                paths: vec!["/api/predict".to_string()],
            },
        ],
        logging: LoggingSettings::default(),
    }
}

async fn send(settings: &Settings, req: test::TestRequest) -> (StatusCode, HeaderMap, web::Bytes) {
    let state = AppState::from_settings(settings).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(routes::cors_headers())
            .configure(routes::configure_routes),
    )
    .await;

    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;
    (status, headers, body)
}

fn header_value<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[actix_web::test]
async fn test_preflight_on_any_path() {
    let settings = settings_for("http://127.0.0.1:9");

    for path in ["/v1/vton/idm", "/anything/else"] {
        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri(path);
        let (status, headers, body) = send(&settings, req).await;

        assert!(status.is_success(), "{} -> {}", path, status);
        assert!(body.is_empty());
        assert_eq!(header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));
        assert_eq!(
            header_value(&headers, header::ACCESS_CONTROL_ALLOW_METHODS),
            Some("POST, OPTIONS")
        );
        assert_eq!(
            header_value(&headers, header::ACCESS_CONTROL_ALLOW_HEADERS),
            Some("Content-Type")
        );
    }
}

#[actix_web::test]
async fn test_wrong_method_is_not_found() {
    let settings = settings_for("http://127.0.0.1:9");

    let (status, headers, body) =
        send(&settings, test::TestRequest::get().uri("/v1/vton/idm")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"Not Found");
    assert_eq!(header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));

    let (status, _, body) = send(&settings, test::TestRequest::post().uri("/v1/vton/other")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"Not Found");
}

#[actix_web::test]
async fn test_first_recognized_candidate_wins() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", "/space-a/api/predict")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": ["https://x/y.png"] }).to_string())
        .expect(1)
        .create_async()
        .await;
    let rest = server
        .mock("POST", Matcher::Regex("^/space-(a/run|b/api)/predict$".to_string()))
        .expect(0)
        .create_async()
        .await;

    let req = try_on_request(&[
        Part::File("person", "image/jpeg", b"person-bytes"),
        Part::File("garment", "image/png", b"garment-bytes"),
    ]);
    let (status, headers, body) = send(&settings_for(&server.url()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "image_url": "https://x/y.png" }));

    first.assert_async().await;
    rest.assert_async().await;
}

#[actix_web::test]
async fn test_failed_candidates_are_skipped() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/space-a/api/predict")
        .with_status(502)
        .create_async()
        .await;
    server
        .mock("POST", "/space-a/run/predict")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"queued"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/space-b/api/predict")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(vec![0x89u8, b'P', b'N', b'G'])
        .expect(1)
        .create_async()
        .await;

    let req = try_on_request(&[
        Part::File("person", "image/jpeg", b"person-bytes"),
        Part::File("garment", "image/png", b"garment-bytes"),
    ]);
    let (status, _, body) = send(&settings_for(&server.url()), req).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "image_base64": "iVBORw==" }));
}

#[actix_web::test]
async fn test_all_candidates_failing_degrades() {
    let mut server = Server::new_async().await;
    let invocations = server
        .mock("POST", Matcher::Regex("^/space-[ab]/".to_string()))
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(3)
        .create_async()
        .await;
    server.mock("HEAD", "/space-a").with_status(404).create_async().await;
    server.mock("HEAD", "/space-b").with_status(200).create_async().await;

    let req = try_on_request(&[
        Part::File("person", "image/jpeg", b"person-bytes"),
        Part::File("garment", "image/png", b"garment-bytes"),
    ]);
    let (status, headers, body) = send(&settings_for(&server.url()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body["image_url"],
        "https://via.placeholder.com/512x768/FF69B4/FFFFFF?text=VTON+Result"
    );
    assert_eq!(body["warning"], "Using dummy result - HF Spaces unavailable");
    assert_eq!(body["debug"]["spaces_checked"], 2);

    let space_status = &body["debug"]["space_status"];
    assert_eq!(space_status[format!("{}/space-a", server.url())]["status"], 404);
    assert_eq!(space_status[format!("{}/space-b", server.url())]["status"], 200);
    assert!(body["debug"]["timestamp"].as_str().is_some());

    invocations.assert_async().await;
}

#[actix_web::test]
async fn test_url_inputs_are_fetched() {
    let mut server = Server::new_async().await;
    let person = server
        .mock("GET", "/assets/person.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body("remote-person")
        .expect(1)
        .create_async()
        .await;
    let garment = server
        .mock("GET", "/assets/garment.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body("remote-garment")
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/space-a/api/predict")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("remote-person".to_string()),
            Matcher::Regex("remote-garment".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "output": "https://x/out.png" }).to_string())
        .create_async()
        .await;

    let person_url = format!("{}/assets/person.jpg", server.url());
    let garment_url = format!("{}/assets/garment.png", server.url());
    let req = try_on_request(&[
        Part::Text("person_url", &person_url),
        Part::Text("garment_url", &garment_url),
    ]);
    let (status, _, body) = send(&settings_for(&server.url()), req).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "image_url": "https://x/out.png" }));

    person.assert_async().await;
    garment.assert_async().await;
}

#[actix_web::test]
async fn test_missing_person_is_an_error_without_outbound_calls() {
    let mut server = Server::new_async().await;
    let fetches = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let invocations = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let garment_url = format!("{}/assets/garment.png", server.url());
    let req = try_on_request(&[Part::Text("garment_url", &garment_url)]);
    let (status, headers, body) = send(&settings_for(&server.url()), req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header_value(&headers, header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "person or person_url required");
    assert_eq!(body["debug"]["error_type"], "MissingInputError");
    assert!(body["debug"]["stack"].as_str().unwrap().len() <= 500);

    fetches.assert_async().await;
    invocations.assert_async().await;
}

#[actix_web::test]
async fn test_unfetchable_url_aborts_request() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/assets/person.jpg")
        .with_status(404)
        .create_async()
        .await;
    let invocations = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let person_url = format!("{}/assets/person.jpg", server.url());
    let req = try_on_request(&[
        Part::Text("person_url", &person_url),
        Part::File("garment", "image/png", b"garment-bytes"),
    ]);
    let (status, _, body) = send(&settings_for(&server.url()), req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["debug"]["error_type"], "UpstreamFetchError");
    assert!(body["error"].as_str().unwrap().contains("HTTP 404"));

    invocations.assert_async().await;
}

#[actix_web::test]
async fn test_oversized_field_is_rejected() {
    let mut settings = settings_for("http://127.0.0.1:9");
    settings.limits.max_field_bytes = 8;

    let req = try_on_request(&[
        Part::File("person", "image/jpeg", &[7u8; 64]),
        Part::File("garment", "image/png", b"g"),
    ]);
    let (status, _, body) = send(&settings, req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["debug"]["error_type"], "PayloadTooLargeError");
}
