//! End-to-end CLI scenarios against a fake source server
//! (`spec.md` §8 "End-to-end scenarios (literal)").

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ypms(ypms_dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("ypms"));
    cmd.env("YPMS_DIR", ypms_dir);
    cmd
}

fn repo_descriptor() -> String {
    sonic_rs::json!({
        "ypms.repo.id": "test",
        "ypms.repo.name": "test",
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

#[test]
fn help_lists_top_level_commands() {
    let dir = tempfile::tempdir().unwrap();
    ypms(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("sources"))
        .stdout(predicate::str::contains("autoremove"));
}

#[test]
fn version_flag_reports_binary_version() {
    let dir = tempfile::tempdir().unwrap();
    ypms(dir.path()).arg("--version").assert().success();
}

/// Scenario 1 (`spec.md` §8): fresh install with no deps, one
/// `download-file` step, writes the file and an explicit ledger record.
#[tokio::test]
async fn fresh_install_writes_file_and_ledger_record() {
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
            "v1.0",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/hello-world/v1.0.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            sonic_rs::json!({
                "release.depends": [],
                "release.guides": {
                    "install": {
                        "steps": [{
                            "type": "download-file",
                            "content": { "url": format!("{base}/hw.bin"), "dest": "hw.bin" },
                        }],
                    },
                },
            })
            .to_string(),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hw.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("binary contents"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();

    ypms(dir.path())
        .args(["sources", "add", "test", &format!("{base}/repo.json")])
        .assert()
        .success();

    ypms(dir.path())
        .args(["install", "ypsh/hello-world", "--env", "default", "--source", "test", "--yes"])
        .assert()
        .success();

    assert!(dir.path().join("envs/default/hw.bin").exists());

    let installed = std::fs::read_to_string(dir.path().join("installed.json")).unwrap();
    assert!(installed.contains("test:ypsh/hello-world"));
    assert!(installed.contains("\"explicit\":true"));
    assert!(installed.contains("\"version\":\"v1.0\""));
}

/// Scenario 6 (`spec.md` §8): two successive `info` calls hit the cache;
/// `refresh` forces the next call to re-fetch.
#[tokio::test]
async fn info_is_cached_until_refresh() {
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
    Mock::given(method("GET"))
        .and(path("/pkg/ypsh/hello-world.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(package_info(
            "http://unused/{RELEASE_ID}.json",
            "v1.0",
        )))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let base = server.uri();

    // `refresh` iterates every configured source, so drop the seeded `yopr`
    // default (it points at a real external URL) before adding the fake one.
    ypms(dir.path()).args(["sources", "remove", "yopr"]).assert().success();
    ypms(dir.path())
        .args(["sources", "add", "test", &format!("{base}/repo.json")])
        .assert()
        .success();

    ypms(dir.path())
        .args(["info", "ypsh/hello-world", "--source", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_package_ref"));

    ypms(dir.path())
        .args(["info", "ypsh/hello-world", "--source", "test"])
        .assert()
        .success();

    // First call: one GET for the repo descriptor, one for the package info.
    // Second call is served entirely from the on-disk metadata cache.
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    ypms(dir.path()).args(["refresh"]).assert().success();

    ypms(dir.path())
        .args(["info", "ypsh/hello-world", "--source", "test"])
        .assert()
        .success();

    // `refresh` purges the cache and force-fetches repo.json+index.json (2),
    // then the final `info` call starts from an empty cache too and
    // re-fetches both repo.json and the package info (2 more): 2 + 2 + 2.
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[test]
fn sources_add_then_list_shows_new_source() {
    let dir = tempfile::tempdir().unwrap();

    ypms(dir.path())
        .args(["sources", "add", "extra", "http://example/repo.json"])
        .assert()
        .success();

    ypms(dir.path())
        .args(["sources", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extra -> http://example/repo.json"));
}

#[test]
fn envs_on_fresh_dir_reports_none() {
    let dir = tempfile::tempdir().unwrap();
    ypms(dir.path())
        .arg("envs")
        .assert()
        .success()
        .stdout(predicate::str::contains("no environments"));
}

/// An unrecognized first token is dispatched as a guide name against `run`;
/// uninstalling a package that was never installed is a no-op.
#[test]
fn unknown_subcommand_falls_back_to_guide_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    ypms(dir.path())
        .args(["uninstall", "ypsh/nobody", "--env", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not installed"));
}
