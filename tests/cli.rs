use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_smile-tool");

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .unwrap()
}

fn run_with_stdin(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(BIN)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn no_mode_is_a_usage_error() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn conflicting_modes() {
    let output = run(&["-e", "-d"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.bin");
    let output = run(&["-d", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        format!("File '{}' does not exist.\n", path.display())
    );
}

#[test]
fn encode_stdin() {
    let output = run_with_stdin(&["-e"], br#"{"a":1}"#);
    assert!(output.status.success());
    assert_eq!(
        output.stdout,
        [b':', b')', b'\n', 0x03, 0xfa, 0x80, b'a', 0xc2, 0xfb]
    );
}

#[test]
fn encode_decode_files() {
    let json = br#"{"a":1,"b":[true,null],"c":"hello"}"#;
    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("input.json");
    fs::write(&json_path, json).unwrap();
    let output = run(&["-e", json_path.to_str().unwrap()]);
    assert!(output.status.success());

    let smile_path = dir.path().join("input.smile");
    fs::write(&smile_path, &output.stdout).unwrap();
    let output = run(&["-d", smile_path.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(output.stdout, json);
}

#[test]
fn decode_stdin() {
    let output = run_with_stdin(&["-d"], &[b':', b')', b'\n', 0x03, 0x23]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"true");
}

#[test]
fn verify_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.json");
    fs::write(&path, br#"{"x":"hello"}"#).unwrap();
    let output = run(&["-v", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(output.stderr.is_empty());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("OK: verified 4 tokens"), "{}", stdout);
}

#[test]
fn verify_stdin() {
    let output = run_with_stdin(&["-v"], br#"[1,2,3]"#);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("OK: verified 5 tokens"));
}

#[test]
fn invalid_json_fails() {
    let output = run_with_stdin(&["-e"], b"{");
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}
