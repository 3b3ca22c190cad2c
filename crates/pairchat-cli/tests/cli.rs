use assert_cmd::Command;

fn pairchat() -> Command {
    Command::cargo_bin("pairchat").unwrap()
}

#[test]
fn help_lists_subcommands() {
    let out = pairchat().arg("--help").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("chat"));
    assert!(stdout.contains("code"));
}

#[test]
fn code_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("secret_code.toml");

    let first = pairchat().arg("code").arg("--store").arg(&store).output().unwrap();
    assert!(first.status.success());
    let code = String::from_utf8(first.stdout).unwrap();
    assert_eq!(code.trim().len(), 15);
    assert!(code.trim().chars().all(|c| c.is_ascii_alphanumeric()));

    let second = pairchat().arg("code").arg("--store").arg(&store).output().unwrap();
    assert_eq!(String::from_utf8(second.stdout).unwrap(), code);

    let fresh = pairchat()
        .args(["code", "--new", "--store"])
        .arg(&store)
        .output()
        .unwrap();
    assert_ne!(String::from_utf8(fresh.stdout).unwrap(), code);
}

#[test]
fn chat_without_name_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = pairchat()
        .arg("--config")
        .arg(dir.path().join("none.toml"))
        .args(["chat", "--code", "ABC123DEF456XYZ", "--gender", "Male"])
        .write_stdin("")
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("display name is empty"), "stderr: {stderr}");
}

#[test]
fn chat_rejects_non_websocket_url() {
    let dir = tempfile::tempdir().unwrap();
    let out = pairchat()
        .arg("--config")
        .arg(dir.path().join("none.toml"))
        .args([
            "chat", "--code", "ABC", "--name", "Sam", "--gender", "Male", "--url",
            "http://example.com",
        ])
        .write_stdin("")
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("invalid server url"), "stderr: {stderr}");
}
