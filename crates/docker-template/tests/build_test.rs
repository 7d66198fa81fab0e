mod common;

use common::TestProject;
use predicates::prelude::*;

/// ドライランではビルドコマンドを表示するだけでDockerfileは生成しないことを確認
#[test]
fn test_dry_run_with_registry() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args(["build", "myapp:3.9.1", "-r", "registry.example.com", "--dry"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "DRY RUN - resulting command line call would be:",
        ))
        .stdout(predicate::str::contains(
            "docker build --pull -t registry.example.com/myapp:3.9.1 .",
        ))
        .stdout(predicate::str::contains("--push").not());

    assert!(project.read_file("Dockerfile").is_none());
}

/// --latest で短縮タグと latest が付くことを確認
#[test]
fn test_dry_run_latest_tags() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args([
            "build",
            "myapp:3.9.1",
            "--registry",
            "registry.example.com",
            "--latest",
            "--dry",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "-t registry.example.com/myapp:3.9.1 -t registry.example.com/myapp:3.9 -t registry.example.com/myapp:latest .",
        ));
}

/// レジストリは環境変数でも指定できることを確認
#[test]
fn test_dry_run_registry_from_env() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .env("DOCKER_TEMPLATE_REGISTRY", "ghcr.io/org")
        .args(["build", "myapp:3.8.6", "--dry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-t ghcr.io/org/myapp:3.8.6 ."));
}

/// --platform 指定時は buildx でプッシュすることを確認
#[test]
fn test_dry_run_platform_pushes() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args([
            "build",
            "myapp:3.9.1",
            "-p",
            "linux/amd64,linux/arm64",
            "--dry",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "docker buildx build --platform=linux/amd64,linux/arm64 --pull --push -t myapp:3.9.1 .",
        ));
}

/// buildx サブコマンドはプラットフォーム指定が必須であることを確認
#[test]
fn test_buildx_requires_platform() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args(["buildx", "myapp:3.9.1", "--dry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--platform"));

    project
        .cmd("docker-template")
        .args(["buildx", "myapp:3.9.1", "--platform", "linux/arm64", "--dry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--push"));
}

/// 明示的なタグと追加引数がそのまま渡されることを確認
#[test]
fn test_dry_run_explicit_tags_and_additional_args() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args([
            "build",
            "myapp:3.9.1",
            "-t",
            "custom/python:3.9",
            "-t",
            "custom/python:stable",
            "-a",
            "--no-cache --network host",
            "--dry",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "docker build --pull --no-cache --network host -t custom/python:3.9 -t custom/python:stable .",
        ));
}

/// ローカルビルドに --push を渡すとエラーになることを確認
#[test]
fn test_push_without_platform_is_rejected() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args(["build", "myapp:3.9.1", "-a", "--pull --push"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--platform"));

    assert!(project.read_file("Dockerfile").is_none());
}

/// ビルド前にDockerfileが生成され、ビルドツールが実行されることを確認
#[cfg(unix)]
#[test]
fn test_build_runs_builder() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args(["build", "myapp:3.9.1", "--builder", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true build --pull -t myapp:3.9.1 ."));

    assert_eq!(project.read_file("Dockerfile").unwrap(), "FROM python:3.9.1\n");
}

/// ビルドツールの終了コードが伝搬し、Dockerfileは残ることを確認
#[cfg(unix)]
#[test]
fn test_build_failure_propagates_exit_code() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .env("DOCKER_TEMPLATE_BUILDER", "false")
        .args(["build", "myapp:3.8.6"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exited with status 1"));

    assert_eq!(project.read_file("Dockerfile").unwrap(), "FROM python:3.8.6\n");
}

/// ビルドツールが存在しない場合はエラーになることを確認
#[test]
fn test_build_tool_not_found() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args(["build", "myapp:3.9.1", "--builder", "docker-template-no-such-tool"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Build tool not found"));
}

/// 未知のタグではビルドもドライランも行わないことを確認
#[test]
fn test_build_unknown_tag() {
    let project = TestProject::with_defaults();

    project
        .cmd("docker-template")
        .args(["build", "myapp:1.0.0", "--dry"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("DRY RUN").not())
        .stderr(predicate::str::contains("Unknown tag"));
}
