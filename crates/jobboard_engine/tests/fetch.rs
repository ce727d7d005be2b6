use std::time::Duration;

use chrono::{TimeZone, Utc};
use jobboard_engine::{Endpoints, FailureKind, FetchSettings, JobsApi, ReqwestJobsApi};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoints(server: &MockServer) -> Endpoints {
    Endpoints {
        jobs_url: format!("{}/jobs/", server.uri()),
        statuses_url: format!("{}/jobs/statuses/", server.uri()),
        logs_url: format!("{}/jobs/logs/", server.uri()),
    }
}

fn api(server: &MockServer, settings: FetchSettings) -> ReqwestJobsApi {
    ReqwestJobsApi::new(endpoints(server), settings).expect("client builds")
}

#[tokio::test]
async fn list_jobs_decodes_records_and_ignores_extra_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[
                {"job_id": "a1", "status": "COM", "name": "Assignment 1",
                 "start_date": "2024-05-01T10:00:00Z", "completion_date": "2024-05-01T10:02:00Z",
                 "language": "Python"},
                {"job_id": "b2", "status": "INQ", "created_at": "2024-05-01T11:00:00Z"}
            ]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let jobs = api(&server, FetchSettings::default())
        .list_jobs()
        .await
        .expect("list ok");

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].job_id, "a1");
    assert_eq!(jobs[0].name.as_deref(), Some("Assignment 1"));
    assert_eq!(
        jobs[0].created_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
    );
    assert_eq!(
        jobs[0].completed_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 2, 0).unwrap())
    );
    assert_eq!(jobs[1].status, "INQ");
    assert_eq!(jobs[1].completed_at, None);
}

#[tokio::test]
async fn naive_and_unreadable_timestamps_do_not_reject_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[
                {"job_id": "a", "status": "COM",
                 "start_date": "2021-09-08T12:34:56.123", "completion_date": "2021-09-08T12:40:00"},
                {"job_id": "b", "status": "INQ", "start_date": "2021-09-08T12:40:00"},
                {"job_id": "c", "status": "INQ", "start_date": "soon", "completion_date": null},
                {"job_id": "d", "status": "INQ", "start_date": 1631104800}
            ]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let jobs = api(&server, FetchSettings::default())
        .list_jobs()
        .await
        .expect("list ok");

    assert_eq!(jobs.len(), 4);
    assert_eq!(
        jobs[0].created_at,
        Some(Utc.with_ymd_and_hms(2021, 9, 8, 12, 34, 56).unwrap() + chrono::Duration::milliseconds(123))
    );
    assert_eq!(
        jobs[0].completed_at,
        Some(Utc.with_ymd_and_hms(2021, 9, 8, 12, 40, 0).unwrap())
    );
    assert_eq!(
        jobs[1].created_at,
        Some(Utc.with_ymd_and_hms(2021, 9, 8, 12, 40, 0).unwrap())
    );
    assert_eq!(jobs[2].created_at, None);
    assert_eq!(jobs[2].completed_at, None);
    assert_eq!(jobs[3].created_at, None);
}

#[tokio::test]
async fn statuses_are_queried_with_comma_joined_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/statuses/"))
        .and(query_param("job_ids", "a1,b2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"a1": "PRO", "b2": "FAI"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let statuses = api(&server, FetchSettings::default())
        .fetch_statuses(&["a1".to_string(), "b2".to_string()])
        .await
        .expect("statuses ok");

    assert_eq!(statuses.get("a1").map(String::as_str), Some("PRO"));
    assert_eq!(statuses.get("b2").map(String::as_str), Some("FAI"));
}

#[tokio::test]
async fn logs_decode_to_line_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/logs/"))
        .and(query_param("job_ids", "a1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"a1": ["Uploading files", "Generated url"]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let logs = api(&server, FetchSettings::default())
        .fetch_logs(&["a1".to_string()])
        .await
        .expect("logs ok");

    assert_eq!(
        logs.get("a1"),
        Some(&vec!["Uploading files".to_string(), "Generated url".to_string()])
    );
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/statuses/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = api(&server, FetchSettings::default())
        .fetch_statuses(&["a1".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/logs/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = api(&server, FetchSettings::default())
        .fetch_logs(&["a1".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("[]"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let err = api(&server, settings).list_jobs().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[          ]"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 4,
        ..FetchSettings::default()
    };
    let err = api(&server, settings).list_jobs().await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 4,
            actual: Some(12)
        }
    );
}

#[tokio::test]
async fn invalid_endpoint_url_is_reported() {
    let api = ReqwestJobsApi::new(
        Endpoints {
            jobs_url: "not a url".to_string(),
            statuses_url: "not a url".to_string(),
            logs_url: "not a url".to_string(),
        },
        FetchSettings::default(),
    )
    .expect("client builds");

    let err = api.list_jobs().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
