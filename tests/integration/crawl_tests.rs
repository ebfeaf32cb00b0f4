//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the upstream API and run full
//! crawls against temporary ledger and workbook files. Pacing goes through a
//! recording sleeper, so no test actually waits.

use graph_trawl::config::{parse_config, Config, Credential, PacingConfig, SeedEntry};
use graph_trawl::crawler::{
    build_http_client, Coordinator, CredentialRotator, ManualClock, Pacer, RecordingSleeper,
    RequestExecutor, RequestFailure, RetryPolicy, RetryableFailure, SeedOutcome, StopReason,
};
use graph_trawl::ledger::{Ledger, SqliteLedger};
use graph_trawl::output::{OutputSink, SqliteWorkbook};
use graph_trawl::{TargetEntry, TrawlError};
use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a configuration pointing at the mock server
fn create_test_config(base_url: &str, max_attempts: u32, seeds: &[(&str, &str)]) -> Config {
    let mut toml = format!(
        r#"
[crawler]
max-attempts = {max_attempts}

[api]
base-url = "{base_url}"
resolve-path = "/users/lookup?username={{handle}}"
listing-path = "/users/{{id}}/following"
profile-path = "/users/{{id}}/info"
profile-url-base = "https://example.com/"

[credentials]
path = "unused.json"

[output]
ledger-path = "unused.db"
workbook-path = "unused-workbook.db"
summary-path = "unused.md"
"#
    );
    for (name, target) in seeds {
        toml.push_str(&format!(
            "\n[[seed]]\nname = \"{}\"\ntarget = \"{}\"\n",
            name, target
        ));
    }
    parse_config(&toml).expect("test config should be valid")
}

/// Temporary ledger and workbook files for one test
struct Workspace {
    _dir: TempDir,
    ledger_path: PathBuf,
    workbook_path: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        Self {
            ledger_path: dir.path().join("progress.db"),
            workbook_path: dir.path().join("workbook.db"),
            _dir: dir,
        }
    }

    fn ledger(&self) -> SqliteLedger {
        SqliteLedger::open(&self.ledger_path).unwrap()
    }

    fn workbook(&self) -> SqliteWorkbook {
        SqliteWorkbook::open(&self.workbook_path).unwrap()
    }
}

fn credentials() -> Vec<Credential> {
    vec![Credential::new("s1", "1", "c1")]
}

fn test_pacer() -> (Pacer, Arc<RecordingSleeper>) {
    pacer_with(PacingConfig::immediate())
}

fn pacer_with(pacing: PacingConfig) -> (Pacer, Arc<RecordingSleeper>) {
    let clock = Arc::new(ManualClock::new());
    let sleeper = Arc::new(RecordingSleeper::with_clock(clock.clone()));
    let pacer = Pacer::new(pacing, sleeper.clone(), clock);
    (pacer, sleeper)
}

fn executor(config: &Config) -> RequestExecutor {
    RequestExecutor::new(
        build_http_client(config).unwrap(),
        CredentialRotator::new(credentials()).unwrap(),
        RetryPolicy::from_config(&config.crawler, &config.backoff),
        config.credentials.clone(),
        &config.api,
    )
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn coordinator(config: &Config, workspace: &Workspace) -> (Coordinator, Arc<RecordingSleeper>) {
    let (pacer, sleeper) = test_pacer();
    let coordinator = Coordinator::from_parts(
        config,
        credentials(),
        Box::new(workspace.ledger()),
        Box::new(workspace.workbook()),
        pacer,
    )
    .unwrap();
    (coordinator, sleeper)
}

fn seed(name: &str, target: &str) -> SeedEntry {
    SeedEntry {
        name: name.to_string(),
        target: target.to_string(),
    }
}

fn entry(username: &str) -> TargetEntry {
    TargetEntry {
        username: username.to_string(),
        profile_url: format!("https://example.com/{}", username),
        ..TargetEntry::default()
    }
}

async fn mock_resolve(server: &MockServer, handle: &str, id: &str) {
    Mock::given(method("GET"))
        .and(path("/users/lookup"))
        .and(query_param("username", handle))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"user": {"id": id}}
        })))
        .mount(server)
        .await;
}

async fn mock_profile(server: &MockServer, id: &str, full_name: &str, bio: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{}/info", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "full_name": full_name,
                "biography": bio,
                "public_email": "",
                "follower_count": 10
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_skips_recorded_entries() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    {
        let mut ledger = workspace.ledger();
        ledger.append("Earlier", &entry("alice")).unwrap();
    }

    mock_resolve(&server, "acmecorp", "42").await;

    // Second page first: the more specific mock must win.
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .and(query_param("max_id", "cursor1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"username": "alice", "pk": 1}],
            "next_max_id": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                {"username": "alice", "pk": 1},
                {"username": "bob", "pk": 2}
            ],
            "next_max_id": "cursor1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/1/info"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    mock_profile(&server, "2", "Bob Example", "write to bob@example.org").await;

    let config = create_test_config(
        &server.uri(),
        5,
        &[("AcmeCorp", "https://example.com/acmecorp/")],
    );
    let (mut coordinator, _sleeper) = coordinator(&config, &workspace);

    let summary = coordinator.run().await.unwrap();
    assert_eq!(summary.seeds_completed, 1);
    assert_eq!(summary.entries_recorded, 1);
    assert_eq!(summary.pages_fetched, 2);
    // resolve, two pages, one detail lookup
    assert_eq!(coordinator.attempts_made(), 4);
    drop(coordinator);

    let ledger = workspace.ledger();
    assert_eq!(ledger.count_entries().unwrap(), 2);
    let acme = ledger.entries_for_seed("AcmeCorp").unwrap();
    assert_eq!(acme.len(), 1);
    assert_eq!(acme[0].username, "bob");
    assert_eq!(acme[0].email_from_bio, "bob@example.org");

    let workbook = workspace.workbook();
    let rows = workbook.read_sheet("AcmeCorp").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "bob");
    assert_eq!(rows[0].full_name, "Bob Example");
    assert_eq!(rows[0].profile_url, "https://example.com/bob");
    assert_eq!(rows[0].follower_count, 10);
}

#[tokio::test]
async fn test_existing_sheet_skips_seed_without_requests() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    {
        let mut workbook = workspace.workbook();
        workbook
            .write_sheet("AcmeCorp", "AcmeCorp", &[entry("alice")])
            .unwrap();
    }

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 5, &[("AcmeCorp", "@acmecorp")]);
    let (mut coordinator, sleeper) = coordinator(&config, &workspace);

    let summary = coordinator.run().await.unwrap();
    assert_eq!(summary.seeds_skipped, 1);
    assert_eq!(summary.seeds_completed, 0);
    assert_eq!(coordinator.attempts_made(), 0);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_permanent_http_error_is_not_retried() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    mock_resolve(&server, "acmecorp", "42").await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 5, &[]);
    let (mut coordinator, sleeper) = coordinator(&config, &workspace);

    let outcome = coordinator
        .crawl_seed(&seed("AcmeCorp", "acmecorp"), &mut HashSet::new())
        .await
        .unwrap();

    match outcome {
        SeedOutcome::Completed { report, .. } => {
            assert_eq!(
                report.stop,
                StopReason::RequestFailed(RequestFailure::PermanentHttp { status: 404 })
            );
            assert!(report.entries.is_empty());
            assert_eq!(report.pages_fetched, 0);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(coordinator.attempts_made(), 2);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_rate_limit_is_retried_with_growing_backoff() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    Mock::given(method("GET"))
        .and(path("/users/lookup"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    mock_resolve(&server, "acmecorp", "42").await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 5, &[]);
    let (mut coordinator, sleeper) = coordinator(&config, &workspace);

    let outcome = coordinator
        .crawl_seed(&seed("AcmeCorp", "acmecorp"), &mut HashSet::new())
        .await
        .unwrap();
    assert!(matches!(outcome, SeedOutcome::Completed { .. }));

    let sleeps = sleeper.sleeps();
    assert_eq!(sleeps.len(), 3);
    assert!(sleeps.windows(2).all(|pair| pair[0] <= pair[1]));
    // base 5s doubling, plus at most 2s jitter each
    assert!(sleeps[0] >= Duration::from_secs(5) && sleeps[0] <= Duration::from_secs(7));
    assert!(sleeps[2] >= Duration::from_secs(20) && sleeps[2] <= Duration::from_secs(22));
}

#[tokio::test]
async fn test_feedback_response_is_treated_as_rate_limit() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    Mock::given(method("GET"))
        .and(path("/users/lookup"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "feedback_required",
            "status": "fail"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mock_resolve(&server, "acmecorp", "42").await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 5, &[]);
    let (mut coordinator, sleeper) = coordinator(&config, &workspace);

    let outcome = coordinator
        .crawl_seed(&seed("AcmeCorp", "acmecorp"), &mut HashSet::new())
        .await
        .unwrap();

    assert!(matches!(outcome, SeedOutcome::Completed { .. }));
    assert_eq!(sleeper.sleeps().len(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_end_pagination() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    mock_resolve(&server, "acmecorp", "42").await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 3, &[]);
    let (mut coordinator, sleeper) = coordinator(&config, &workspace);

    let outcome = coordinator
        .crawl_seed(&seed("AcmeCorp", "acmecorp"), &mut HashSet::new())
        .await
        .unwrap();

    match outcome {
        SeedOutcome::Completed { report, .. } => assert_eq!(
            report.stop,
            StopReason::RequestFailed(RequestFailure::Exhausted {
                attempts: 3,
                last: RetryableFailure::RateLimited { status: 503 },
            })
        ),
        other => panic!("unexpected outcome: {:?}", other),
    }
    // no sleep after the final attempt
    assert_eq!(sleeper.sleeps().len(), 2);
}

#[tokio::test]
async fn test_failed_detail_lookup_keeps_entry_with_empty_fields() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    mock_resolve(&server, "acmecorp", "42").await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"username": "ghost", "pk": 9}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/9/info"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 5, &[]);
    let (mut coordinator, _sleeper) = coordinator(&config, &workspace);

    let outcome = coordinator
        .crawl_seed(&seed("AcmeCorp", "acmecorp"), &mut HashSet::new())
        .await
        .unwrap();

    let SeedOutcome::Completed { report, .. } = outcome else {
        panic!("seed should complete");
    };
    assert_eq!(report.missing_details, 1);
    assert_eq!(report.entries, vec![entry("ghost")]);
    assert_eq!(report.stop, StopReason::EndOfList);
}

#[tokio::test]
async fn test_dedup_holds_across_restart_and_seeds() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    mock_resolve(&server, "acmecorp", "42").await;
    mock_resolve(&server, "globex", "43").await;
    for id in ["42", "43"] {
        Mock::given(method("GET"))
            .and(path(format!("/users/{}/following", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{"username": "alice", "pk": 1}, {"username": "bob", "pk": 2}]
            })))
            .mount(&server)
            .await;
    }
    // Each profile is looked up exactly once over both runs.
    Mock::given(method("GET"))
        .and(path("/users/1/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/2/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let first = create_test_config(&server.uri(), 5, &[("AcmeCorp", "acmecorp")]);
    {
        let (mut coordinator, _) = coordinator(&first, &workspace);
        let summary = coordinator.run().await.unwrap();
        assert_eq!(summary.entries_recorded, 2);
    }

    let second = create_test_config(
        &server.uri(),
        5,
        &[("AcmeCorp", "acmecorp"), ("Globex", "globex")],
    );
    let (mut coordinator, _) = coordinator(&second, &workspace);
    assert!(coordinator.seen().contains("alice"));

    let summary = coordinator.run().await.unwrap();
    assert_eq!(summary.seeds_skipped, 1);
    assert_eq!(summary.seeds_completed, 1);
    assert_eq!(summary.entries_recorded, 0);
    drop(coordinator);

    // Nothing new for Globex, so no sheet was written for it.
    let sheets = workspace.workbook().existing_sheets().unwrap();
    assert_eq!(sheets, HashSet::from(["AcmeCorp".to_string()]));
    assert_eq!(workspace.ledger().count_entries().unwrap(), 2);
}

#[tokio::test]
async fn test_unresolvable_seed_is_skipped() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    Mock::given(method("GET"))
        .and(path("/users/lookup"))
        .and(query_param("username", "nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"user": null}})))
        .mount(&server)
        .await;
    mock_resolve(&server, "globex", "43").await;
    Mock::given(method("GET"))
        .and(path("/users/43/following"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"username": "carol", "pk": 3}]
        })))
        .mount(&server)
        .await;
    mock_profile(&server, "3", "Carol", "").await;

    let config = create_test_config(
        &server.uri(),
        5,
        &[("Nobody", "nobody"), ("Bad", "https://example.com/"), ("Globex", "globex")],
    );
    let (mut coordinator, _) = coordinator(&config, &workspace);

    let summary = coordinator.run().await.unwrap();
    assert_eq!(summary.seeds_unresolved, 2);
    assert_eq!(summary.seeds_completed, 1);
    assert_eq!(summary.entries_recorded, 1);
}

#[tokio::test]
async fn test_credentials_rotate_per_attempt() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    let first = "sessionid=s1; user_id=1; csrftoken=c1";
    let second = "sessionid=s2; user_id=2; csrftoken=c2";

    Mock::given(method("GET"))
        .and(path("/users/lookup"))
        .and(header("cookie", first))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"pk": 42}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .and(header("cookie", second))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 5, &[]);
    let (pacer, _) = test_pacer();
    let mut coordinator = Coordinator::from_parts(
        &config,
        vec![
            Credential::new("s1", "1", "c1"),
            Credential::new("s2", "2", "c2"),
        ],
        Box::new(workspace.ledger()),
        Box::new(workspace.workbook()),
        pacer,
    )
    .unwrap();

    let outcome = coordinator
        .crawl_seed(&seed("AcmeCorp", "acmecorp"), &mut HashSet::new())
        .await
        .unwrap();
    assert!(matches!(outcome, SeedOutcome::Completed { .. }));
}

#[tokio::test]
async fn test_empty_credential_pool_is_fatal() {
    let workspace = Workspace::new();
    let config = create_test_config("https://api.example.com", 5, &[]);
    let (pacer, _) = test_pacer();

    let result = Coordinator::from_parts(
        &config,
        Vec::new(),
        Box::new(workspace.ledger()),
        Box::new(workspace.workbook()),
        pacer,
    );

    assert!(matches!(result, Err(TrawlError::EmptyCredentialPool)));
}

#[tokio::test]
async fn test_second_process_cannot_open_ledger() {
    let workspace = Workspace::new();
    let _held = workspace.ledger();

    let result = SqliteLedger::open(&workspace.ledger_path);
    assert!(matches!(
        result,
        Err(graph_trawl::ledger::LedgerError::Locked { .. })
    ));
}

#[tokio::test]
async fn test_sheet_includes_rows_from_interrupted_run() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    // An earlier run recorded alice for this seed but stopped before the sheet.
    {
        let mut ledger = workspace.ledger();
        ledger.append("AcmeCorp", &entry("alice")).unwrap();
    }

    mock_resolve(&server, "acmecorp", "42").await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"username": "alice", "pk": 1}, {"username": "bob", "pk": 2}]
        })))
        .mount(&server)
        .await;
    mock_profile(&server, "2", "Bob Example", "").await;

    let config = create_test_config(&server.uri(), 5, &[("AcmeCorp", "acmecorp")]);
    let (mut coordinator, _) = coordinator(&config, &workspace);

    let outcome = coordinator
        .crawl_seed(&seed("AcmeCorp", "acmecorp"), &mut HashSet::new())
        .await
        .unwrap();
    let SeedOutcome::Completed { report, .. } = outcome else {
        panic!("seed should complete");
    };
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].username, "bob");
    drop(coordinator);

    let usernames: Vec<String> = workspace
        .workbook()
        .read_sheet("AcmeCorp")
        .unwrap()
        .into_iter()
        .map(|row| row.username)
        .collect();
    assert_eq!(usernames, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_seed_fully_recorded_before_restart_gets_its_sheet_once() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    {
        let mut ledger = workspace.ledger();
        ledger.append("Globex", &entry("alice")).unwrap();
        ledger.append("Globex", &entry("bob")).unwrap();
    }

    mock_resolve(&server, "globex", "43").await;
    Mock::given(method("GET"))
        .and(path("/users/43/following"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"username": "alice", "pk": 1}, {"username": "bob", "pk": 2}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 5, &[("Globex", "globex")]);
    {
        let (mut coordinator, _) = coordinator(&config, &workspace);
        let summary = coordinator.run().await.unwrap();
        assert_eq!(summary.seeds_completed, 1);
        assert_eq!(summary.entries_recorded, 0);
    }

    assert_eq!(workspace.workbook().read_sheet("Globex").unwrap().len(), 2);

    // The next run finds the sheet and makes no requests for the seed.
    let (mut coordinator, _) = coordinator(&config, &workspace);
    let summary = coordinator.run().await.unwrap();
    assert_eq!(summary.seeds_skipped, 1);
    assert_eq!(coordinator.attempts_made(), 0);
}

#[tokio::test]
async fn test_transport_errors_are_retried_then_exhausted() {
    // Bind and release a port so nothing is listening on it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base_url = format!("http://127.0.0.1:{}", port);

    let config = create_test_config(&base_url, 3, &[]);
    let mut executor = executor(&config);
    let (mut pacer, sleeper) = test_pacer();

    let url = Url::parse(&format!("{}/users/lookup?username=acmecorp", base_url)).unwrap();
    let result = executor.execute(&mut pacer, &url, &[]).await;

    assert!(matches!(
        result,
        Err(RequestFailure::Exhausted {
            attempts: 3,
            last: RetryableFailure::TransientNetwork(_),
        })
    ));
    assert_eq!(executor.attempts_made(), 3);

    let sleeps = sleeper.sleeps();
    assert_eq!(sleeps.len(), 2);
    assert!(sleeps[0] >= secs(5) && sleeps[0] <= secs(7));
    assert!(sleeps[1] >= secs(10) && sleeps[1] <= secs(12));
}

#[tokio::test]
async fn test_failure_classes_back_off_independently() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/lookup"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    // Slower than the client timeout, so the attempt fails at the transport level.
    Mock::given(method("GET"))
        .and(path("/users/lookup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": {"pk": 42}}))
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mock_resolve(&server, "acmecorp", "42").await;

    let mut config = create_test_config(&server.uri(), 5, &[]);
    config.crawler.request_timeout = 1;
    let mut executor = executor(&config);
    let (mut pacer, sleeper) = test_pacer();

    let url = Url::parse(&format!("{}/users/lookup?username=acmecorp", server.uri())).unwrap();
    let body = executor.execute(&mut pacer, &url, &[]).await.unwrap();

    assert_eq!(body, json!({"data": {"user": {"id": "42"}}}));
    assert_eq!(executor.attempts_made(), 3);

    // Each class starts from the base delay.
    let sleeps = sleeper.sleeps();
    assert_eq!(sleeps.len(), 2);
    for sleep in sleeps {
        assert!(sleep >= secs(5) && sleep <= secs(7), "slept {:?}", sleep);
    }
}

#[tokio::test]
async fn test_walk_pauses_at_exact_points() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    mock_resolve(&server, "acmecorp", "42").await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .and(query_param("max_id", "cursor1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"username": "dave", "pk": 4}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/42/following"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                {"username": "alice", "pk": 1},
                {"username": "bob", "pk": 2},
                {"username": "carol", "pk": 3}
            ],
            "next_max_id": "cursor1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/users/\d+/info$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {}})))
        .expect(4)
        .mount(&server)
        .await;

    let pacing = PacingConfig {
        entry_delay: [1.0, 1.0],
        page_delay: [2.0, 2.0],
        seed_delay: [0.0, 0.0],
        long_pause: [30.0, 30.0],
        long_pause_every: [2, 2],
        cooldown_after: 10,
        cooldown: [300.0, 300.0],
        random_seed: Some(11),
    };
    let (pacer, sleeper) = pacer_with(pacing);

    let config = create_test_config(&server.uri(), 5, &[]);
    let mut coordinator = Coordinator::from_parts(
        &config,
        credentials(),
        Box::new(workspace.ledger()),
        Box::new(workspace.workbook()),
        pacer,
    )
    .unwrap();

    let outcome = coordinator
        .crawl_seed(&seed("AcmeCorp", "acmecorp"), &mut HashSet::new())
        .await
        .unwrap();
    let SeedOutcome::Completed { report, .. } = outcome else {
        panic!("seed should complete");
    };
    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.pages_fetched, 2);

    // alice, bob + long pause, carol, page delay, cooldown (35s > 10s), dave + long pause
    assert_eq!(
        sleeper.sleeps(),
        vec![
            secs(1),
            secs(1),
            secs(30),
            secs(1),
            secs(2),
            secs(300),
            secs(1),
            secs(30),
        ]
    );
}
