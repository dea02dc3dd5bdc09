mod common;

use chrono::{TimeZone, Utc};
use serde_json::json;
use strava_cli::api::{ActivityUpdate, ApiError};
use strava_cli::app::App;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{activity_json, config_for, fresh_storage};

#[tokio::test]
async fn list_returns_newest_first() {
    let server = MockServer::start().await;

    let body = json!([
        activity_json(1, "Oldest", "2024-03-01T08:00:00Z"),
        activity_json(3, "Newest", "2024-03-20T08:00:00Z"),
        activity_json(2, "Middle", "2024-03-10T08:00:00Z"),
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "5"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    let activities = app.list(5, None, None).await.expect("activities");
    let ids: Vec<u64> = activities.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn list_never_exceeds_limit_across_pages() {
    let server = MockServer::start().await;

    let page = |offset: u64, count: u64| {
        (0..count)
            .map(|i| {
                let id = offset + i + 1;
                let start = Utc.timestamp_opt(1_700_000_000 - id as i64 * 3600, 0).unwrap();
                activity_json(id, &format!("Run {}", id), &start.to_rfc3339())
            })
            .collect::<Vec<_>>()
    };

    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 200)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(200, 200)))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    let activities = app.list(250, None, None).await.expect("activities");
    assert_eq!(activities.len(), 250);
    assert_eq!(activities[0].id, 1);
    assert!(activities
        .windows(2)
        .all(|w| w[0].start_date >= w[1].start_date));
}

#[tokio::test]
async fn list_sends_date_filters_as_unix_seconds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("after", "1704067200"))
        .and(query_param("before", "1706745600"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let before = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let activities = app.list(10, Some(after), Some(before)).await.expect("activities");
    assert!(activities.is_empty());
}

#[tokio::test]
async fn list_rejects_inverted_range_and_zero_limit_without_requests() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    let day = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert!(app.list(10, Some(day), Some(day)).await.is_err());
    assert!(app.list(0, None, None).await.expect("empty").is_empty());
}

#[tokio::test]
async fn get_missing_activity_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/activities/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Resource Not Found",
            "errors": [{"resource": "Activity", "field": "id", "code": "invalid"}]
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    let err = app.get(99).await.expect_err("not found");
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::NotFound(99))
    ));
    assert!(format!("{:#}", err).contains("failed to fetch activity 99"));
}

#[tokio::test]
async fn update_round_trip_changes_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/activities/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(activity_json(7, "Morning Run", "2024-04-02T07:00:00Z")),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v3/activities/7"))
        .and(header("authorization", "Bearer fresh-access"))
        .and(body_json(json!({"name": "Hill Repeats"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(activity_json(7, "Hill Repeats", "2024-04-02T07:00:00Z")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/activities/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(activity_json(7, "Hill Repeats", "2024-04-02T07:00:00Z")),
        )
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    assert_eq!(app.get(7).await.expect("before").name, "Morning Run");

    let update = ActivityUpdate {
        name: Some("Hill Repeats".to_string()),
        ..Default::default()
    };
    let updated = app.update(7, update).await.expect("update");
    assert_eq!(updated.name, "Hill Repeats");

    assert_eq!(app.get(7).await.expect("after").name, "Hill Repeats");
}

#[tokio::test]
async fn update_sends_flags_and_cleared_description() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v3/activities/7"))
        .and(body_json(json!({"description": "", "commute": true, "trainer": false})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(activity_json(7, "Run", "2024-04-02T07:00:00Z")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    let update = ActivityUpdate {
        description: Some(String::new()),
        commute: Some(true),
        trainer: Some(false),
        ..Default::default()
    };
    app.update(7, update).await.expect("update");
}

#[tokio::test]
async fn update_missing_activity_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v3/activities/5"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    let update = ActivityUpdate {
        name: Some("x".to_string()),
        ..Default::default()
    };
    let err = app.update(5, update).await.expect_err("not found");
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::NotFound(5))
    ));
}

#[tokio::test]
async fn update_server_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v3/activities/5"))
        .respond_with(ResponseTemplate::new(403).set_body_string("activity:write_permission missing"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_dir, storage) = fresh_storage();
    let app = App::new(&config, &storage).expect("app");

    let update = ActivityUpdate {
        name: Some("x".to_string()),
        ..Default::default()
    };
    let err = app.update(5, update).await.expect_err("forbidden");
    let api_err = err.downcast_ref::<ApiError>().expect("api error");
    assert_eq!(api_err.status(), Some(403));
    match api_err {
        ApiError::Status { message, .. } => {
            assert!(message.contains("write_permission"))
        }
        other => panic!("unexpected error {:?}", other),
    }
}
