use std::fs;

use helmwatch_engine::{
    ApiSettings, Endpoints, FailureKind, JobApi, JobState, ReqwestJobApi, UPLOAD_FIELD,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestJobApi {
    let endpoints = Endpoints::new(&server.uri(), "/api").unwrap();
    ReqwestJobApi::new(endpoints, ApiSettings::default()).unwrap()
}

#[tokio::test]
async fn upload_sends_multipart_video_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains(format!("name=\"{UPLOAD_FIELD}\"")))
        .and(body_string_contains("fake video bytes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"success":true,"filename":"vid_1.mp4"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let video = temp.path().join("site.mp4");
    fs::write(&video, "fake video bytes").unwrap();

    let reply = api_for(&server).upload(&video).await.expect("upload ok");
    assert!(reply.success);
    assert_eq!(reply.filename.as_deref(), Some("vid_1.mp4"));
}

#[tokio::test]
async fn upload_rejection_body_is_decoded_despite_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(
            r#"{"success":false,"error":"bad format"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let video = temp.path().join("site.mp4");
    fs::write(&video, "x").unwrap();

    let reply = api_for(&server).upload(&video).await.expect("decoded reply");
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("bad format"));
}

#[tokio::test]
async fn upload_with_unreadable_body_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let video = temp.path().join("site.mp4");
    fs::write(&video, "x").unwrap();

    let err = api_for(&server).upload(&video).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}

#[tokio::test]
async fn upload_of_missing_file_never_hits_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let err = api_for(&server)
        .upload(&temp.path().join("missing.mp4"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn status_decodes_processing_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/vid_1.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"status":"processing","progress":40,"violator_images":["a.jpg"]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let reply = api_for(&server).status("vid_1.mp4").await.expect("status ok");
    assert_eq!(reply.status, JobState::Processing);
    assert_eq!(reply.progress, Some(40.0));
    assert_eq!(reply.violator_images, Some(vec!["a.jpg".to_string()]));
}

#[tokio::test]
async fn status_not_found_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/gone.mp4"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw(r#"{"status":"not_found"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = api_for(&server).status("gone.mp4").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn history_preserves_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"name":"vid_2.mp4","violators":1,"helmets":4,"timestamp":1700000100},
                {"name":"vid_1.mp4","violators":0,"helmets":2}]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let items = api_for(&server).history().await.expect("history ok");
    let names: Vec<_> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["vid_2.mp4", "vid_1.mp4"]);
    assert_eq!(items[0].timestamp, Some(1_700_000_100.0));
    assert_eq!(items[1].timestamp, None);
}

#[tokio::test]
async fn history_that_is_not_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oops"))
        .mount(&server)
        .await;

    let err = api_for(&server).history().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn delete_encodes_name_and_reads_refusal() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/history/my%20clip.mp4"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            r#"{"success":false,"error":"Item not found"}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let reply = api_for(&server)
        .delete_history("my clip.mp4")
        .await
        .expect("decoded reply");
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("Item not found"));
}

#[tokio::test]
async fn download_streams_into_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download/vid_1.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("downloads");
    let saved = api_for(&server)
        .download("vid_1.mp4", &dir)
        .await
        .expect("download ok");

    assert_eq!(saved, dir.join("vid_1.mp4"));
    assert_eq!(fs::read(saved).unwrap(), vec![7u8; 4096]);
}

#[tokio::test]
async fn failed_download_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download/vid_1.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let err = api_for(&server)
        .download("vid_1.mp4", temp.path())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(!temp.path().join("vid_1.mp4").exists());
}

#[tokio::test]
async fn dot_names_are_refused_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"success":true}"#, "application/json"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api.delete_history("..").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);
    let err = api.status(".").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);

    let temp = TempDir::new().unwrap();
    let err = api.download("..", temp.path()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);
}

#[tokio::test]
async fn download_with_path_like_name_discards_staged_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 2048]))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("downloads");
    let err = api_for(&server)
        .download("../escape.mp4", &dir)
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidInput);
    assert!(!temp.path().join("escape.mp4").exists());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}
