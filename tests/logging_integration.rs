use serde_json::Value;
use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    drop(listener);
    format!("http://{addr}")
}

/// Runs a one-shot prompt against a closed port so the command fails after
/// startup logging has happened.
fn run_with_logging_env(
    workdir: &Path,
    log_output: &str,
    log_format: &str,
    log_file_path: Option<&Path>,
) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_arona"));
    cmd.arg("hi")
        .current_dir(workdir)
        .stdin(Stdio::null())
        .env("GOOGLE_API_KEY", "test-key")
        .env("MODEL_BASE_URL", unreachable_base_url())
        .env("MODEL_TIMEOUT_SECS", "5")
        .env("RUST_LOG", "arona=info")
        .env("LOG_OUTPUT", log_output)
        .env("LOG_FORMAT", log_format);

    if let Some(path) = log_file_path {
        cmd.env("LOG_FILE_PATH", path);
    } else {
        cmd.env_remove("LOG_FILE_PATH");
    }

    cmd.output().expect("failed to run arona binary")
}

fn find_rotated_log_file(dir: &Path, base_file_name: &str) -> PathBuf {
    let expected_prefix = format!("{base_file_name}.");
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .expect("failed to read log directory")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&expected_prefix))
                .unwrap_or(false)
        })
        .collect();

    matches.sort();
    matches
        .pop()
        .expect("expected a rotated log file to be created")
}

#[test]
fn json_format_emits_json_log_lines_on_stderr() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = run_with_logging_env(dir.path(), "stderr", "json", None);
    assert!(
        !output.status.success(),
        "unreachable model should fail the one-shot command"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    let parsed: Vec<Value> = stderr
        .lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .map(|line| serde_json::from_str::<Value>(line).expect("line should be valid JSON"))
        .collect();
    assert!(
        parsed.iter().any(|entry| {
            entry
                .get("fields")
                .and_then(|fields| fields.get("message"))
                .and_then(Value::as_str)
                == Some("loaded runtime configuration")
        }),
        "expected startup log message in JSON output, got stderr:\n{stderr}"
    );
    assert!(
        !stderr.contains("test-key"),
        "credential leaked into logs:\n{stderr}"
    );
}

#[test]
fn file_output_writes_logs_to_rotated_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let log_path = dir.path().join("logs").join("arona.log");
    let output = run_with_logging_env(dir.path(), "file", "pretty", Some(&log_path));
    assert!(!output.status.success());

    let rotated = find_rotated_log_file(&dir.path().join("logs"), "arona.log");
    let file_contents = fs::read_to_string(&rotated).expect("failed to read rotated log file");
    assert!(
        file_contents.contains("loaded runtime configuration"),
        "expected startup log message in file, got:\n{file_contents}"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("loaded runtime configuration"),
        "did not expect normal logs on stderr for file-only mode:\n{stderr}"
    );
    assert!(
        stderr.contains("MODEL_BASE_URL"),
        "expected command error output on stderr:\n{stderr}"
    );
}

#[test]
fn both_output_writes_logs_to_stderr_and_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let log_path = dir.path().join("arona.log");
    let output = run_with_logging_env(dir.path(), "both", "pretty", Some(&log_path));
    assert!(!output.status.success());

    let rotated = find_rotated_log_file(dir.path(), "arona.log");
    let file_contents = fs::read_to_string(&rotated).expect("failed to read rotated log file");
    assert!(
        file_contents.contains("loaded runtime configuration"),
        "expected startup log message in file, got:\n{file_contents}"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("loaded runtime configuration"),
        "expected startup log message on stderr, got:\n{stderr}"
    );
}

#[test]
fn invalid_file_path_falls_back_to_stderr_logging() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let blocking_file = dir.path().join("not-a-directory");
    fs::write(&blocking_file, "block").expect("failed to create blocking file");
    let log_path = blocking_file.join("arona.log");

    let output = run_with_logging_env(dir.path(), "file", "pretty", Some(&log_path));
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to initialize LOG_OUTPUT=file"),
        "expected fallback warning, got:\n{stderr}"
    );
    assert!(
        stderr.contains("using stderr instead"),
        "expected stderr fallback message, got:\n{stderr}"
    );
    assert!(
        stderr.contains("loaded runtime configuration"),
        "expected logs to continue on stderr after fallback, got:\n{stderr}"
    );
}
