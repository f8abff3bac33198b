//! Permission gating on API routes and the multipart upload endpoint.

mod common;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
};
use common::{response_json, TestApp};

const BOUNDARY: &str = "printshop-test-boundary";

fn multipart_request(token: &str, field: &str, file_name: &str, mime: &str, bytes: &[u8]) -> Request<Body> {
    let mut payload = Vec::new();
    payload.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n",
            b = BOUNDARY,
        )
        .as_bytes(),
    );
    payload.extend_from_slice(bytes);
    payload.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/uploads")
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(payload))
        .expect("multipart request")
}

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api/v1/companies", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permissions_gate_each_route() {
    let app = TestApp::new().await;

    let no_perms = app.token_with_permissions(&[]);
    let response = app
        .request(Method::GET, "/api/v1/companies", None, Some(&no_perms))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let reader = app.token_with_permissions(&["companies:read"]);
    let response = app
        .request(Method::GET, "/api/v1/companies", None, Some(&reader))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Read access does not extend to writes.
    let response = app
        .request(
            Method::POST,
            "/api/v1/companies",
            Some(serde_json::json!({ "name": "Nope Inc" })),
            Some(&reader),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn uploaded_artwork_is_stored_and_served() {
    let app = TestApp::new().await;
    let uploader = app.token_with_permissions(&["uploads:create"]);

    let response = app
        .request_raw(multipart_request(&uploader, "file", "logo final.png", "image/png", PNG_BYTES))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let stored = &body["data"];
    assert_eq!(stored["content_type"], "image/png");
    assert_eq!(stored["size"], PNG_BYTES.len());
    let url = stored["url"].as_str().expect("url").to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with("logo_final.png"));

    let served = app
        .request_raw(
            Request::builder()
                .uri(&url)
                .body(Body::empty())
                .expect("get upload"),
        )
        .await;
    assert_eq!(served.status(), StatusCode::OK);
    let bytes = body::to_bytes(served.into_body(), usize::MAX)
        .await
        .expect("bytes");
    assert_eq!(&bytes[..], PNG_BYTES);
}

#[tokio::test]
async fn disallowed_file_type_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request_raw(multipart_request(
            app.token(),
            "file",
            "setup.exe",
            "application/x-msdownload",
            b"MZ\x90\x00",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request_raw(multipart_request(app.token(), "attachment", "logo.png", "image/png", PNG_BYTES))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap_or_default().contains("file"));
}
