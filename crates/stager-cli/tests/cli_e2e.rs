use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::Command;
use insta::assert_snapshot;
use predicates::str::contains;
use tempfile::tempdir;
use tiny_http::{Header, Response, Server, StatusCode};

const METADATA_PATH: &str = "/releases/org/example/demo/maven-metadata.xml";

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write");
}

fn write_config(root: &Path, base_url: &str, version: Option<&str>) {
    let version_line = version
        .map(|v| format!("version = \"{v}\"\n"))
        .unwrap_or_default();
    write_file(
        &root.join(".stager.toml"),
        &format!(
            r#"
[project]
group = "org.example"
artifact = "demo"
title = "Demo"
{version_line}
[repositories]
releases = "{base_url}/releases/"
staging = "{base_url}/staging/"
snapshots = "{base_url}/snapshots/"

[probe]
connect_timeout = "2s"
read_timeout = "2s"
"#
        ),
    );
}

fn metadata(versions: &[&str]) -> String {
    let entries: String = versions
        .iter()
        .map(|v| format!("<version>{v}</version>"))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<metadata>\n  <groupId>org.example</groupId>\n  <artifactId>demo</artifactId>\n  <versioning>\n    <versions>{entries}</versions>\n  </versioning>\n</metadata>\n"
    )
}

struct TestRegistry {
    base_url: String,
    seen: Arc<Mutex<Vec<String>>>,
    handle: thread::JoinHandle<()>,
}

impl TestRegistry {
    fn join(self) -> Vec<String> {
        self.handle.join().expect("join server");
        let seen = self.seen.lock().expect("lock");
        seen.clone()
    }
}

/// Serve `routes` (path -> status, body); everything else answers 404.
fn spawn_registry(routes: BTreeMap<String, (u16, String)>, expected_requests: usize) -> TestRegistry {
    let server = Server::http("127.0.0.1:0").expect("server");
    let base_url = format!("http://{}", server.server_addr());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_thread = Arc::clone(&seen);
    let handle = thread::spawn(move || {
        for _ in 0..expected_requests {
            let req = server.recv().expect("request");
            let line = format!("{} {}", req.method(), req.url());
            seen_thread.lock().expect("lock").push(line);
            let (status, body) = routes
                .get(req.url())
                .cloned()
                .unwrap_or((404, String::new()));
            let resp = Response::from_string(body)
                .with_status_code(StatusCode(status))
                .with_header(
                    Header::from_bytes("Content-Type", "application/xml").expect("header"),
                );
            req.respond(resp).expect("respond");
        }
    });
    TestRegistry {
        base_url,
        seen,
        handle,
    }
}

fn stager_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stager"));
    cmd.env_remove("STAGER_REPOSITORY_USERNAME")
        .env_remove("STAGER_REPOSITORY_PASSWORD")
        .env_remove("STAGER_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8")
}

#[test]
fn version_snapshot_and_release_need_no_network() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", Some("1.4.0"));

    let snapshot = stdout_of(
        stager_cmd()
            .arg("--project-dir")
            .arg(td.path())
            .args(["version", "snapshot"]),
    );
    assert_eq!(snapshot, "1.4.0-SNAPSHOT\n");

    let release = stdout_of(
        stager_cmd()
            .arg("--project-dir")
            .arg(td.path())
            .args(["--version", "1.4.0-SNAPSHOT", "version", "release"]),
    );
    assert_eq!(release, "1.4.0\n");
}

#[test]
fn version_next_alpha_reads_remote_metadata() {
    let mut routes = BTreeMap::new();
    routes.insert(
        METADATA_PATH.to_string(),
        (200, metadata(&["0.9.0-alpha-1", "0.9.0-alpha-2", "0.8.0"])),
    );
    let registry = spawn_registry(routes, 1);
    let td = tempdir().expect("tempdir");
    write_config(td.path(), &registry.base_url, Some("0.9.0-SNAPSHOT"));

    let out = stdout_of(
        stager_cmd()
            .arg("--project-dir")
            .arg(td.path())
            .args(["version", "next-alpha"]),
    );
    assert_eq!(out, "0.9.0-alpha-3\n");
    assert_eq!(registry.join(), vec![format!("GET {METADATA_PATH}")]);
}

#[test]
fn version_last_alpha_without_history_prints_nothing() {
    let registry = spawn_registry(BTreeMap::new(), 1);
    let td = tempdir().expect("tempdir");
    write_config(td.path(), &registry.base_url, Some("2.0.0"));

    stager_cmd()
        .arg("--project-dir")
        .arg(td.path())
        .args(["version", "last-alpha"])
        .assert()
        .success()
        .stdout("")
        .stderr(contains("[info] no alpha published yet for 2.0.0"));
    registry.join();
}

#[test]
fn next_alpha_fails_when_metadata_unreachable() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", Some("1.0.0"));

    stager_cmd()
        .arg("--project-dir")
        .arg(td.path())
        .args(["version", "next-alpha"])
        .assert()
        .failure()
        .stderr(contains("metadata unavailable"));
}

#[test]
fn next_alpha_can_assume_nothing_published() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", Some("1.0.0"));

    let out = stdout_of(
        stager_cmd()
            .arg("--project-dir")
            .arg(td.path())
            .arg("--assume-no-alpha-on-error")
            .args(["version", "next-alpha"]),
    );
    assert_eq!(out, "1.0.0-alpha-1\n");
}

#[test]
fn check_reports_published_release() {
    let mut routes = BTreeMap::new();
    routes.insert(
        "/releases/org/example/demo/1.0.0/demo-1.0.0.pom".to_string(),
        (200, String::new()),
    );
    let registry = spawn_registry(routes, 1);
    let td = tempdir().expect("tempdir");
    write_config(td.path(), &registry.base_url, Some("1.0.0-SNAPSHOT"));

    stager_cmd()
        .arg("--project-dir")
        .arg(td.path())
        .arg("check")
        .assert()
        .success()
        .stdout("org.example:demo:1.0.0: published\n")
        .stderr(contains("already published"));
    assert_eq!(
        registry.join(),
        vec!["HEAD /releases/org/example/demo/1.0.0/demo-1.0.0.pom".to_string()]
    );
}

#[test]
fn check_reports_unpublished_release() {
    let registry = spawn_registry(BTreeMap::new(), 2);
    let td = tempdir().expect("tempdir");
    write_config(td.path(), &registry.base_url, Some("1.1.0"));

    let out = stdout_of(stager_cmd().arg("--project-dir").arg(td.path()).arg("check"));
    assert_eq!(out, "org.example:demo:1.1.0: not published\n");
    assert_eq!(
        registry.join(),
        vec![
            "HEAD /releases/org/example/demo/1.1.0/demo-1.1.0.pom".to_string(),
            "HEAD /staging/org/example/demo/1.1.0/demo-1.1.0.pom".to_string(),
        ]
    );
}

#[test]
fn check_treats_unreachable_repositories_as_unpublished() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", Some("1.0.0"));

    let out = stdout_of(stager_cmd().arg("--project-dir").arg(td.path()).arg("check"));
    assert_eq!(out, "org.example:demo:1.0.0: not published\n");
}

#[test]
fn pom_renders_description_file() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", Some("1.0.0"));
    write_file(
        &td.path().join("meta/POM.yml"),
        "description: A demo\nscm:\n  url: https://example.org/demo\nproperties:\n  key1: value1\n",
    );

    let out = stdout_of(
        stager_cmd()
            .arg("--project-dir")
            .arg(td.path())
            .args(["pom", "--description", "meta/POM.yml"]),
    );
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(out.contains("<artifactId>demo</artifactId>"));
    assert!(out.contains("<name>Demo</name>"));
    assert!(out.contains("<description>A demo</description>"));
    assert!(out.contains("<url>https://example.org/demo</url>"));
    assert!(out.contains("<key1>value1</key1>"));
    assert!(!out.contains("<licenses>"));
}

#[test]
fn pom_rejects_malformed_description() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", Some("1.0.0"));
    write_file(&td.path().join("PUBLISHERS.yml"), "developers: nobody\n");

    stager_cmd()
        .arg("--project-dir")
        .arg(td.path())
        .arg("pom")
        .assert()
        .failure()
        .stderr(contains("malformed project description"));
}

#[test]
fn plan_release_snapshot() {
    let registry = spawn_registry(BTreeMap::new(), 2);
    let td = tempdir().expect("tempdir");
    write_config(td.path(), &registry.base_url, Some("1.2.0-SNAPSHOT"));

    let out = stdout_of(
        stager_cmd()
            .arg("--project-dir")
            .arg(td.path())
            .args(["plan", "--mode", "release"]),
    );
    let normalized = out.replace(&registry.base_url, "<REGISTRY>");
    assert_snapshot!(
        normalized,
        @r#"
mode: release
coordinate: org.example:demo:1.2.0
target: release (<REGISTRY>/releases/)
publish_url: <REGISTRY>/releases/org/example/demo/1.2.0/demo-1.2.0.pom
already_published: false
pom: no
"#
    );
    registry.join();
}

#[test]
fn plan_snapshot_skips_the_guard() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", Some("1.2.0"));
    write_file(&td.path().join("PUBLISHERS.yml"), "url: https://example.org\n");

    let out = stdout_of(
        stager_cmd()
            .arg("--project-dir")
            .arg(td.path())
            .args(["plan", "--mode", "snapshot"]),
    );
    assert!(out.contains("coordinate: org.example:demo:1.2.0-SNAPSHOT"));
    assert!(out.contains("target: snapshot (http://127.0.0.1:9/snapshots/)"));
    assert!(out.contains("pom: yes"));
}

#[test]
fn set_version_writes_release_form() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", None);
    write_file(
        &td.path().join("gradle.properties"),
        "group = org.example\nversion = 3.1.0-SNAPSHOT\n",
    );

    stager_cmd()
        .arg("--project-dir")
        .arg(td.path())
        .arg("set-version")
        .assert()
        .success()
        .stdout("3.1.0\n")
        .stderr(contains("wrote version = 3.1.0 to gradle.properties"));

    assert_eq!(
        fs::read_to_string(td.path().join("gradle.properties")).expect("read"),
        "group = org.example\nversion = 3.1.0\n"
    );
    assert_eq!(
        fs::read_to_string(td.path().join("gradle.properties.bak")).expect("read bak"),
        "group = org.example\nversion = 3.1.0-SNAPSHOT\n"
    );
}

#[test]
fn missing_version_is_an_error() {
    let td = tempdir().expect("tempdir");
    write_config(td.path(), "http://127.0.0.1:9", None);

    stager_cmd()
        .arg("--project-dir")
        .arg(td.path())
        .args(["version", "release"])
        .assert()
        .failure()
        .stderr(contains("no version configured"));
}

#[test]
fn explicit_config_path_is_honoured() {
    let td = tempdir().expect("tempdir");
    write_config(&td.path().join("ci"), "http://127.0.0.1:9", Some("5.0.0"));

    let out = stdout_of(
        stager_cmd()
            .arg("--project-dir")
            .arg(td.path())
            .arg("--config")
            .arg(td.path().join("ci/.stager.toml"))
            .args(["version", "snapshot"]),
    );
    assert_eq!(out, "5.0.0-SNAPSHOT\n");
}

#[test]
fn invalid_config_is_rejected() {
    let td = tempdir().expect("tempdir");
    write_file(
        &td.path().join(".stager.toml"),
        "[repositories]\nreleases = \"not-a-url\"\n",
    );

    stager_cmd()
        .arg("--project-dir")
        .arg(td.path())
        .args(["--group", "g", "--artifact", "a", "--version", "1.0.0"])
        .args(["version", "release"])
        .assert()
        .failure()
        .stderr(contains("invalid stager configuration"));
}
