use daily_card::core::catalog::Catalog;
use daily_card::{
    BroadcastEngine, BroadcastError, BroadcastTemplate, HttpImageVerifier, LocalStorage,
    PostedStore, ResendBroadcaster, ResendClient, RetryPolicy, SendConfirmation,
};
use httpmock::prelude::*;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const METADATA: &str = "metadata.json";
const POSTED: &str = "posted_cards.json";

struct Workspace {
    dir: TempDir,
    artifacts: TempDir,
}

impl Workspace {
    fn new(posted: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let metadata = json!({
            "nyplAPI": {
                "response": {
                    "capture": [
                        {"uuid": "card-a", "imageID": "1001", "title": "Polo"},
                        {"uuid": "card-b", "imageID": "1002", "title": "Croquet"},
                        {"uuid": "card-c", "imageID": "1003", "title": "Old-Timey Card!! #1"},
                        {"uuid": "card-d", "title": "Missing image"}
                    ]
                }
            }
        });
        std::fs::write(dir.path().join(METADATA), metadata.to_string()).unwrap();
        std::fs::write(
            dir.path().join(POSTED),
            serde_json::to_string_pretty(posted).unwrap(),
        )
        .unwrap();

        Self {
            dir,
            artifacts: TempDir::new().unwrap(),
        }
    }

    fn storage(&self) -> LocalStorage {
        LocalStorage::new(self.dir.path().to_string_lossy().to_string())
    }

    fn posted_bytes(&self) -> Vec<u8> {
        std::fs::read(self.dir.path().join(POSTED)).unwrap()
    }

    fn posted_ids(&self) -> Vec<String> {
        serde_json::from_slice(&self.posted_bytes()).unwrap()
    }

    fn artifact_count(&self) -> usize {
        count_files(self.artifacts.path())
    }

    fn engine(
        &self,
        server: &MockServer,
    ) -> BroadcastEngine<HttpImageVerifier, ResendBroadcaster, LocalStorage> {
        let verifier = HttpImageVerifier::new(server.url("/index.php"), self.artifacts.path())
            .with_timeout(Duration::from_secs(5));
        let client = ResendClient::new("re_test").with_base_url(server.base_url());
        let broadcaster = ResendBroadcaster::new(
            client,
            BroadcastTemplate {
                audience_id: "aud_1".to_string(),
                from: "cards@example.com".to_string(),
                subject: "today's cigarette card".to_string(),
            },
        );

        BroadcastEngine::new(verifier, broadcaster, PostedStore::new(self.storage(), POSTED))
            .with_retry_policy(RetryPolicy {
                max_attempts: 5,
                backoff: Duration::ZERO,
            })
    }

    async fn catalog(&self) -> Catalog {
        Catalog::load(&self.storage(), METADATA).await.unwrap()
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_end_to_end_broadcast_commits_remaining_card() {
    let workspace = Workspace::new(&["card-a", "card-b"]);
    let server = MockServer::start();

    let image_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/index.php")
            .query_param("id", "1003")
            .query_param("t", "w");
        then.status(200)
            .header("Content-Type", "image/jpeg")
            .body(vec![0xFF, 0xD8, 0xFF]);
    });
    let define_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/broadcasts")
            .header("Authorization", "Bearer re_test")
            .json_body_partial(r#"{"audience_id": "aud_1", "from": "cards@example.com"}"#)
            .body_contains("Old-Timey_Card_1");
        then.status(200).json_body(json!({"id": "bc_42"}));
    });
    let send_mock = server.mock(|when, then| {
        when.method(POST).path("/broadcasts/bc_42/send");
        then.status(200).json_body(json!({"id": "bc_42"}));
    });

    let catalog = workspace.catalog().await;
    assert_eq!(catalog.len(), 4);

    let report = workspace.engine(&server).run(&catalog).await.unwrap();

    image_mock.assert();
    define_mock.assert();
    send_mock.assert();
    assert_eq!(report.card_id, "card-c");
    assert_eq!(report.broadcast_id, "bc_42");
    assert_eq!(report.confirmation, SendConfirmation::Confirmed);
    assert!(report.committed);
    assert_eq!(workspace.posted_ids(), vec!["card-a", "card-b", "card-c"]);
    assert_eq!(workspace.artifact_count(), 0);
}

#[tokio::test]
async fn test_network_errors_exhaust_retries_without_touching_posted_file() {
    let workspace = Workspace::new(&["card-a"]);
    let before = workspace.posted_bytes();
    let server = MockServer::start();

    let image_mock = server.mock(|when, then| {
        when.method(GET).path("/index.php");
        then.status(503);
    });
    let define_mock = server.mock(|when, then| {
        when.method(POST).path("/broadcasts");
        then.status(200).json_body(json!({"id": "never"}));
    });

    let catalog = workspace.catalog().await;
    let err = workspace.engine(&server).run(&catalog).await.unwrap_err();

    match err {
        BroadcastError::RetriesExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 5);
            assert!(matches!(*last_error, BroadcastError::NetworkError { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    image_mock.assert_hits(5);
    define_mock.assert_hits(0);
    assert_eq!(workspace.posted_bytes(), before);
}

#[tokio::test]
async fn test_non_image_response_is_retried_and_leaves_no_artifact() {
    let workspace = Workspace::new(&[]);
    let server = MockServer::start();

    let image_mock = server.mock(|when, then| {
        when.method(GET).path("/index.php");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html>Image not available</html>");
    });

    let catalog = workspace.catalog().await;
    let err = workspace.engine(&server).run(&catalog).await.unwrap_err();

    match err {
        BroadcastError::RetriesExhausted { last_error, .. } => {
            assert!(matches!(*last_error, BroadcastError::NotAnImage { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    image_mock.assert_hits(5);
    assert_eq!(workspace.artifact_count(), 0);
    assert!(workspace.posted_ids().is_empty());
}

#[tokio::test]
async fn test_define_without_id_never_sends() {
    let workspace = Workspace::new(&[]);
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/index.php");
        then.status(200).header("Content-Type", "image/png").body("png");
    });
    let define_mock = server.mock(|when, then| {
        when.method(POST).path("/broadcasts");
        then.status(200).json_body(json!({}));
    });
    let send_mock = server.mock(|when, then| {
        when.method(POST).path_contains("/send");
        then.status(200).json_body(json!({"id": "x"}));
    });

    let catalog = workspace.catalog().await;
    let err = workspace.engine(&server).run(&catalog).await.unwrap_err();

    match err {
        BroadcastError::RetriesExhausted { last_error, .. } => match *last_error {
            BroadcastError::DefineFailed { message } => {
                assert_eq!(message, "No ID or error received");
            }
            other => panic!("unexpected error: {other}"),
        },
        other => panic!("unexpected error: {other}"),
    }
    define_mock.assert_hits(5);
    send_mock.assert_hits(0);
    assert_eq!(workspace.artifact_count(), 0);
}

#[tokio::test]
async fn test_dry_run_sends_but_does_not_commit() {
    let workspace = Workspace::new(&["card-a", "card-b"]);
    let before = workspace.posted_bytes();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/index.php");
        then.status(200).header("Content-Type", "image/jpeg").body("jpg");
    });
    server.mock(|when, then| {
        when.method(POST).path("/broadcasts");
        then.status(200).json_body(json!({"id": "bc_dry"}));
    });
    let send_mock = server.mock(|when, then| {
        when.method(POST).path("/broadcasts/bc_dry/send");
        then.status(200).json_body(json!({}));
    });

    let catalog = workspace.catalog().await;
    let report = workspace
        .engine(&server)
        .with_dry_run(true)
        .run(&catalog)
        .await
        .unwrap();

    send_mock.assert();
    assert!(!report.committed);
    assert_eq!(
        report.confirmation,
        SendConfirmation::Unconfirmed { response_id: None }
    );
    assert_eq!(workspace.posted_bytes(), before);
}

#[tokio::test]
async fn test_everything_posted_is_fatal_on_first_attempt() {
    let workspace = Workspace::new(&["card-a", "card-b", "card-c"]);
    let server = MockServer::start();
    let image_mock = server.mock(|when, then| {
        when.method(GET).path("/index.php");
        then.status(200).header("Content-Type", "image/jpeg").body("jpg");
    });

    let catalog = workspace.catalog().await;
    let err = workspace.engine(&server).run(&catalog).await.unwrap_err();

    assert!(matches!(err, BroadcastError::NoEligibleRecords));
    image_mock.assert_hits(0);
}
