//! 规则引擎 HTTP API 测试

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use rule_grid_service::{
    AppState, InMemoryRuleSetRepository, JsonWorkbookReader, RuleEngineService, dto::ApiResponse,
    dto::UploadedRuleSet, routes,
};
use rulegrid_shared::observability::middleware::REQUEST_ID_HEADER;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "rulegrid-test-boundary";

const FLIGHT_WORKBOOK: &str = r##"{
    "Metadata": {
        "Id": "FLIGHT-PRICE",
        "Name": "Tehran caps",
        "ClassName": "AvailableFlight",
        "GeneralAction": "SetAppliedRules",
        "ConditionsOperator": "AND",
        "Priority": 1
    },
    "Rules": [
        {"Index": "#FieldName", "Condition_1": "Origin", "Action_1": "MaxPrice"},
        {"Index": "#Operator", "Condition_1": "Equals", "Action_1": "Set"},
        {"Index": 1, "Condition_1": "THR", "Action_1": "100"}
    ]
}"##;

fn create_test_app() -> Router {
    create_test_app_with_limit(1024 * 1024)
}

fn create_test_app_with_limit(max_upload_bytes: usize) -> Router {
    let service = RuleEngineService::new(
        Arc::new(InMemoryRuleSetRepository::new()),
        Arc::new(JsonWorkbookReader::new()),
    );
    routes::app(AppState::new(Arc::new(service)), max_upload_bytes)
}

fn multipart_request(files: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/json\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/api/v1/rule-engine/upload-ruleset")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn apply_request(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/rule-engine/{path}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(REQUEST_ID_HEADER, "req-apply")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = create_test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = read_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_upload_then_apply_both_paths() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(multipart_request(&[("flight.json", FLIGHT_WORKBOOK)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded: ApiResponse<Vec<UploadedRuleSet>> = read_body(response).await;
    assert!(uploaded.success);
    let data = uploaded.data.unwrap();
    assert_eq!(data[0].id, "FLIGHT-PRICE");
    assert_eq!(data[0].rule_count, 1);

    let objects = json!([
        {"Origin": "THR", "MaxPrice": null},
        {"Origin": "ISF", "MaxPrice": null}
    ]);
    for path in ["apply-rules", "apply-rules-rete"] {
        let response = app
            .clone()
            .oneshot(apply_request(
                path,
                json!({"className": "flight", "objects": objects}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ApiResponse<Vec<Value>> = read_body(response).await;
        assert_eq!(body.trace_id.as_deref(), Some("req-apply"));
        assert_eq!(
            body.data.unwrap(),
            vec![
                json!({
                    "Origin": "THR",
                    "MaxPrice": "100",
                    "AppliedRules": ["RuleId:FLIGHT-PRICE RuleIndex:1"]
                }),
                json!({"Origin": "ISF", "MaxPrice": null}),
            ],
            "path {path}"
        );
    }
}

#[tokio::test]
async fn test_upload_without_files_succeeds() {
    let response = create_test_app()
        .oneshot(multipart_request(&[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<Vec<UploadedRuleSet>> = read_body(response).await;
    assert!(body.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_empty_file_is_invalid() {
    let response = create_test_app()
        .oneshot(multipart_request(&[("empty.json", "")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: ApiResponse<Value> = read_body(response).await;
    assert!(!body.success);
    assert_eq!(body.code, "INVALID_FILE");
    assert_eq!(body.message, "Invalid file.");
    assert!(body.trace_id.is_some());
}

#[tokio::test]
async fn test_upload_validation_error_names_field() {
    let workbook = r#"{"Metadata": {"Id": "X", "ClassName": "", "ConditionsOperator": "AND"}}"#;
    let response = create_test_app()
        .oneshot(multipart_request(&[("bad.json", workbook)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ApiResponse<Value> = read_body(response).await;
    assert_eq!(body.code, "VALIDATION_ERROR");
    assert_eq!(body.validation_errors[0].field, "ClassName");
}

#[tokio::test]
async fn test_apply_without_rule_sets_returns_input() {
    let objects = json!([{"Origin": "THR"}]);
    let response = create_test_app()
        .oneshot(apply_request(
            "apply-rules",
            json!({"className": "Hotel", "objects": objects}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<Vec<Value>> = read_body(response).await;
    assert_eq!(Value::Array(body.data.unwrap()), objects);
}

#[tokio::test]
async fn test_apply_rejects_non_object_entries() {
    let response = create_test_app()
        .oneshot(apply_request(
            "apply-rules-rete",
            json!({"className": "Flight", "objects": ["THR"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ApiResponse<Value> = read_body(response).await;
    assert_eq!(body.validation_errors[0].field, "objects[0]");
}

#[tokio::test]
async fn test_apply_malformed_body() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/rule-engine/apply-rules")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"objects\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ApiResponse<Value> = read_body(response).await;
    assert_eq!(body.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_rule_data_is_unprocessable() {
    let workbook = r##"{
        "Metadata": {"Id": "AGE", "ClassName": "Passenger", "ConditionsOperator": "AND"},
        "Rules": [
            {"Index": "#FieldName", "Condition_1": "Age", "Action_1": "Fare"},
            {"Index": "#Operator", "Condition_1": "GreaterThan", "Action_1": "Set"},
            {"Index": 1, "Condition_1": "twelve", "Action_1": "Adult"}
        ]
    }"##;
    let app = create_test_app();
    let response = app
        .clone()
        .oneshot(multipart_request(&[("age.json", workbook)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(apply_request(
            "apply-rules",
            json!({"className": "passenger", "objects": [{"Age": 30, "Fare": "Child"}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: ApiResponse<Value> = read_body(response).await;
    assert_eq!(body.code, "MALFORMED_RULE_DATA");
}

#[tokio::test]
async fn test_oversized_upload_returns_payload_too_large() {
    let response = create_test_app_with_limit(256)
        .oneshot(multipart_request(&[("flight.json", FLIGHT_WORKBOOK)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: ApiResponse<()> = read_body(response).await;
    assert!(!body.success);
    assert_eq!(body.code, "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_truncated_multipart_is_bad_request() {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"flight.json\"\r\n\r\n{FLIGHT_WORKBOOK}"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/rule-engine/upload-ruleset")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ApiResponse<()> = read_body(response).await;
    assert_eq!(body.code, "INVALID_UPLOAD");
}
