use std::net::TcpListener;

use assert_cmd::Command;

fn simplessh() -> Command {
    Command::cargo_bin("simplessh").unwrap()
}

/// A port on localhost with nothing listening.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn help_lists_subcommands() {
    let output = simplessh().arg("--help").output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("exec"));
    assert!(text.contains("send"));
}

#[test]
fn exec_requires_a_command() {
    let output = simplessh().args(["exec", "localhost"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn exec_against_closed_port_reports_connect_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = simplessh()
        .args(["--config"])
        .arg(dir.path().join("config.toml"))
        .args(["-p", &closed_port().to_string(), "-t", "2"])
        .args(["exec", "tester@127.0.0.1", "true"])
        .env("SIMPLESSH_PASSWORD", "unused")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not connect"), "stderr: {stderr}");
    assert!(stderr.contains("simplessh: connect error:"), "stderr: {stderr}");
}

#[test]
fn send_rejects_local_destination() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("payload.txt");
    std::fs::write(&local, "payload").unwrap();

    let output = simplessh()
        .args(["--config"])
        .arg(dir.path().join("config.toml"))
        .arg("send")
        .arg(&local)
        .arg("no-colon-here")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[user@]host:path"), "stderr: {stderr}");
}

#[test]
fn send_rejects_invalid_mode() {
    let output = simplessh()
        .args(["send", "file.txt", "host:/tmp/file.txt", "--mode", "999"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
