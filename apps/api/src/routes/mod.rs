pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};

use crate::files::{handlers as files, MAX_UPLOAD_BYTES};
use crate::handlers::{crud, policies, stats};
use crate::models::{Agent, Beneficiary, InsuredPerson, Policy, PremiumPayment, User};
use crate::resource::Resource;
use crate::state::AppState;

/// Room for multipart framing around a maximum-size file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// `/` and `/:id` for one resource. `/stats` is added by the caller and
/// wins over `/:id` because static segments take precedence.
fn crud_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<R>).post(crud::create::<R>))
        .route(
            "/:id",
            get(crud::get_one::<R>)
                .put(crud::update::<R>)
                .delete(crud::delete::<R>),
        )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .nest(
            "/api/policies",
            crud_routes::<Policy>()
                .route("/stats", get(stats::handle_policy_stats))
                .route("/:id/details", get(policies::handle_policy_details)),
        )
        .nest(
            "/api/insured-persons",
            crud_routes::<InsuredPerson>()
                .route("/stats", get(stats::handle_insured_person_stats)),
        )
        .nest(
            "/api/premium-payments",
            crud_routes::<PremiumPayment>().route("/stats", get(stats::handle_payment_stats)),
        )
        .nest(
            "/api/agents",
            crud_routes::<Agent>().route("/stats", get(stats::handle_agent_stats)),
        )
        .nest(
            "/api/beneficiaries",
            crud_routes::<Beneficiary>().route("/stats", get(stats::handle_beneficiary_stats)),
        )
        .nest(
            "/api/users",
            crud_routes::<User>().route("/stats", get(stats::handle_user_stats)),
        )
        .nest(
            "/api/files",
            Router::new()
                .route(
                    "/",
                    get(files::handle_list_files).post(files::handle_upload),
                )
                .route(
                    "/:id",
                    get(files::handle_download).delete(files::handle_delete_file),
                )
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::seeded_state;
    use crate::store::seed;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(seeded_state(dir.path()));
        (router, dir)
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn multipart(file_name: &str, content_type: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        let head = format!(
            "--XBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        );
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n--XBOUNDARY--\r\n");
        Request::builder()
            .method(Method::POST)
            .uri("/api/files")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    fn new_person(identity: &str) -> Value {
        json!({
            "fullName": "Vu Thi Lan",
            "identityNumber": identity,
            "dateOfBirth": "1992-05-01",
            "gender": "FEMALE",
            "email": "lan.vu@gmail.com",
            "phone": "0911222333",
            "address": "7 Ly Thuong Kiet, Hue"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = app();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "backoffice-api");
    }

    #[tokio::test]
    async fn test_list_is_paginated() {
        let (app, _dir) = app();
        let (status, body) = call(&app, Method::GET, "/api/policies?page=2&limit=3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(
            body["pagination"],
            json!({ "page": 2, "limit": 3, "total": 8, "totalPages": 3 })
        );
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_clamped() {
        let (app, _dir) = app();
        let (_, body) = call(&app, Method::GET, "/api/policies?page=99&limit=3", None).await;
        assert_eq!(body["pagination"]["page"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let (app, _dir) = app();
        let (_, body) = call(&app, Method::GET, "/api/policies?status=ACTIVE", None).await;
        assert_eq!(body["pagination"]["total"], 4);

        let (_, body) = call(&app, Method::GET, "/api/policies?status=all", None).await;
        assert_eq!(body["pagination"]["total"], 8);

        let (_, body) = call(
            &app,
            Method::GET,
            "/api/policies?sortBy=premiumAmount&sortOrder=desc&limit=1",
            None,
        )
        .await;
        assert_eq!(body["data"][0]["policyNumber"], "POL-2023-0003");

        let (_, body) = call(&app, Method::GET, "/api/insured-persons?search=NGUYEN", None).await;
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["fullName"], "Nguyen Van An");
    }

    #[tokio::test]
    async fn test_malformed_filter_is_rejected() {
        let (app, _dir) = app();
        let uri = "/api/premium-payments?policyId=abc";
        let (status, body) = call(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let (app, _dir) = app();
        let uri = format!("/api/agents/{}", uuid::Uuid::new_v4());
        let (status, body) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = call(&app, Method::GET, "/api/agents/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (app, _dir) = app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/insured-persons",
            Some(new_person("079192000111")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "ACTIVE");
        assert_eq!(body["message"], "Insured person created");

        let (_, body) = call(&app, Method::GET, "/api/insured-persons", None).await;
        assert_eq!(body["pagination"]["total"], 7);
    }

    #[tokio::test]
    async fn test_duplicate_identity_conflicts() {
        let (app, _dir) = app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/insured-persons",
            Some(new_person("079085001234")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicates_create_once() {
        let (app, _dir) = app();
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let app = app.clone();
                tokio::spawn(async move {
                    let body = Some(new_person("079192000333"));
                    call(&app, Method::POST, "/api/insured-persons", body).await.0
                })
            })
            .collect();

        let mut statuses = Vec::new();
        for task in tasks {
            statuses.push(task.await.unwrap());
        }
        let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
        assert_eq!(created, 1);
        assert!(statuses
            .iter()
            .all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT));

        let uri = "/api/insured-persons?search=079192000333";
        let (_, body) = call(&app, Method::GET, uri, None).await;
        assert_eq!(body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_invalid_payload_lists_fields() {
        let (app, _dir) = app();
        let mut person = new_person("079192000222");
        person["email"] = json!("not-an-email");
        let (status, body) = call(&app, Method::POST, "/api/insured-persons", Some(person)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["field"] == "email"));

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/insured-persons",
            Some(json!({ "fullName": "Missing everything" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (app, _dir) = app();
        let uri = format!("/api/policies/{}", seed::policy_id(0));
        let patch = json!({ "notes": "Renewed" });
        let (status, body) = call(&app, Method::PUT, &uri, Some(patch)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["notes"], "Renewed");
        assert_eq!(body["data"]["policyNumber"], "POL-2023-0001");

        let (_, body) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(body["data"]["notes"], "Renewed");
    }

    #[tokio::test]
    async fn test_update_rejects_dangling_reference() {
        let (app, _dir) = app();
        let uri = format!("/api/policies/{}", seed::policy_id(0));
        let patch = json!({ "agentId": uuid::Uuid::new_v4() });
        let (status, _) = call(&app, Method::PUT, &uri, Some(patch)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_removes() {
        let (app, _dir) = app();
        let uri = format!("/api/users/{}", seed::user_id(0));
        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_routes() {
        let (app, _dir) = app();
        let (status, body) = call(&app, Method::GET, "/api/policies/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 8);

        let (_, body) = call(&app, Method::GET, "/api/beneficiaries/stats", None).await;
        let unbalanced = body["data"]["unbalancedPolicies"].as_array().unwrap();
        assert_eq!(unbalanced.len(), 3);
        let empty_policy = seed::policy_id(4).to_string();
        assert!(unbalanced
            .iter()
            .any(|s| s["policyId"] == empty_policy.as_str() && s["beneficiaryCount"] == 0));
    }

    #[tokio::test]
    async fn test_policy_details() {
        let (app, _dir) = app();
        let uri = format!("/api/policies/{}/details", seed::policy_id(0));
        let (status, body) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["insuredPerson"]["fullName"], "Nguyen Van An");
        assert_eq!(body["data"]["beneficiaries"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["beneficiaryAllocation"]["balanced"], true);

        let uri = format!("/api/policies/{}/details", seed::policy_id(2));
        let (_, body) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(body["data"]["beneficiaryAllocation"]["balanced"], false);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let (app, _dir) = app();
        let response = app
            .clone()
            .oneshot(multipart("notes.txt", "text/plain", b"hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_over_size_limit() {
        let (app, _dir) = app();
        let just_over = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let response = app
            .clone()
            .oneshot(multipart("scan.png", "image/png", &just_over))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // Past the body limit the multipart stream itself is cut off
        let far_over = vec![0u8; MAX_UPLOAD_BYTES + 2 * MULTIPART_OVERHEAD];
        let response = app
            .clone()
            .oneshot(multipart("scan.png", "image/png", &far_over))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let (_, body) = call(&app, Method::GET, "/api/files", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_download_delete() {
        let (app, _dir) = app();
        let response = app
            .clone()
            .oneshot(multipart("card.png", "image/png", b"fake-png-bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let url = body["data"]["url"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["size"], 14);

        let response = app
            .clone()
            .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"fake-png-bytes");

        let (status, _) = call(&app, Method::DELETE, &url, None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, Method::GET, "/api/files", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
