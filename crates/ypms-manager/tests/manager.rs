//! End-to-end `Manager` behavior against a fake source server
//! (`spec.md` §4.5, §8).

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ypms_manager::{Layout, Manager};

fn repo_descriptor() -> String {
    sonic_rs::json!({
        "ypms.repo.id": "yopr",
        "ypms.repo.name": "yopr",
        "ypms.repo.url": "/",
        "ypms.repo.path.index": "/index.json",
        "ypms.repo.path.package": "/pkg/{USER_ID}/{PACKAGE_ID}.json",
    })
    .to_string()
}

fn package_info(release_url: &str, default: &str) -> String {
    sonic_rs::json!({
        "package.release.url": release_url,
        "package.release.default": default,
    })
    .to_string()
}

/// Builds a `Manager` over an isolated `Layout` rooted at `dir`, with a
/// single `yopr` source pointing at the mock server (replacing the default).
async fn manager_against(server: &MockServer, dir: &std::path::Path) -> Manager {
    let layout = Layout::under(dir.join("ypms"));
    let mut manager = Manager::with_layout(layout).await.unwrap();
    manager.remove_source("yopr").await.unwrap();
    manager
        .add_source("yopr", &format!("{}/repo.json", server.uri()))
        .await
        .unwrap();
    manager
}

#[tokio::test]
async fn fresh_install_writes_ledger_record_and_env_dir() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_descriptor()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sonic_rs::json!({}).to_string()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pkg/ypsh/hello-world.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(package_info(
            &format!("{base}/release/hello-world/{{RELEASE_ID}}.json"),
            "v1",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/hello-world/v1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            sonic_rs::json!({
                "release.depends": [],
                "release.guides": { "install": { "type": "none" } },
            })
            .to_string(),
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager_against(&server, dir.path()).await;

    let env_dir = manager
        .install("ypsh/hello-world", "default", None, None, true, false)
        .await
        .unwrap();
    assert!(env_dir.ends_with("default"));

    // Re-running install against the same resolved version is a no-op: no
    // new HTTP calls beyond what wiremock already expects, and installing
    // again doesn't error.
    manager
        .install("ypsh/hello-world", "default", None, None, true, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn dependency_install_is_recorded_non_explicit() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_descriptor()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sonic_rs::json!({}).to_string()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pkg/ypsh/hello-world.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(package_info(
            &format!("{base}/release/hello-world/{{RELEASE_ID}}.json"),
            "v1",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/hello-world/v1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            sonic_rs::json!({
                "release.depends": ["ypsh/libfoo@v2"],
                "release.guides": { "install": { "type": "none" } },
            })
            .to_string(),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pkg/ypsh/libfoo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(package_info(
            &format!("{base}/release/libfoo/{{RELEASE_ID}}.json"),
            "v2",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/libfoo/v2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            sonic_rs::json!({
                "release.depends": [],
                "release.guides": { "install": { "type": "none" } },
            })
            .to_string(),
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager_against(&server, dir.path()).await;

    manager
        .install("ypsh/hello-world", "default", None, None, true, false)
        .await
        .unwrap();

    assert!(manager.ledger_record("default", "yopr", "ypsh/hello-world").unwrap().explicit);
    assert!(!manager.ledger_record("default", "yopr", "ypsh/libfoo").unwrap().explicit);

    // Calling `run("install", ...)` directly must NOT touch the ledger (only
    // the planner-driven `install()` path does install-side bookkeeping).
    let before = manager.ledger_record("default", "yopr", "ypsh/libfoo").cloned();
    manager
        .run("ypsh/libfoo", "install", "default", None, None, false, true)
        .await
        .unwrap();
    assert_eq!(manager.ledger_record("default", "yopr", "ypsh/libfoo").cloned(), before);
}

#[tokio::test]
async fn uninstall_of_absent_package_is_a_no_op() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_descriptor()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager_against(&server, dir.path()).await;

    let msg = manager
        .run("ypsh/nobody", "uninstall", "default", None, None, false, true)
        .await
        .unwrap();
    assert!(msg.contains("not installed"));
}

#[tokio::test]
async fn uninstall_blocked_by_dependent_unless_forced() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_descriptor()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sonic_rs::json!({}).to_string()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pkg/ypsh/libfoo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(package_info(
            &format!("{base}/release/libfoo/{{RELEASE_ID}}.json"),
            "v2",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/libfoo/v2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            sonic_rs::json!({
                "release.depends": [],
                "release.guides": {
                    "install": { "type": "none" },
                    "uninstall": { "type": "none" },
                },
            })
            .to_string(),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pkg/ypsh/hello-world.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(package_info(
            &format!("{base}/release/hello-world/{{RELEASE_ID}}.json"),
            "v1",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/hello-world/v1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            sonic_rs::json!({
                "release.depends": ["ypsh/libfoo@v2"],
                "release.guides": { "install": { "type": "none" } },
            })
            .to_string(),
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager_against(&server, dir.path()).await;

    // Installing hello-world pulls in libfoo as a non-explicit dependency,
    // so both end up in the ledger with a live depends edge between them.
    manager
        .install("ypsh/hello-world", "default", None, None, true, false)
        .await
        .unwrap();

    let blocked = manager
        .run("ypsh/libfoo", "uninstall", "default", Some("v2"), None, false, true)
        .await;
    assert!(matches!(blocked, Err(ypms_core::Error::Dependency(_))));

    manager
        .run("ypsh/libfoo", "uninstall", "default", Some("v2"), None, true, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn sources_add_remove_round_trips_through_manager() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_descriptor()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager_against(&server, dir.path()).await;

    manager.add_source("extra", "http://example/repo.json").await.unwrap();
    assert!(manager.sources().get("extra").is_some());
    manager.remove_source("extra").await.unwrap();
    assert!(manager.sources().get("extra").is_none());
}

#[tokio::test]
async fn refresh_sources_purges_cache_and_resets_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_descriptor()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sonic_rs::json!({}).to_string()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager_against(&server, dir.path()).await;

    let failures = manager.refresh_sources().await.unwrap();
    assert!(failures.is_empty());
}

#[tokio::test]
async fn upgrade_with_no_installed_packages_is_a_no_op() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_descriptor()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sonic_rs::json!({}).to_string()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager_against(&server, dir.path()).await;

    let errors = manager.upgrade(None, false).await.unwrap();
    assert!(errors.is_empty());
}

#[tokio::test]
async fn autoremove_with_no_installed_packages_is_a_no_op() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_descriptor()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager_against(&server, dir.path()).await;

    let errors = manager.autoremove(None, false).await.unwrap();
    assert!(errors.is_empty());
}
