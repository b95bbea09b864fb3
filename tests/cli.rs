use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_conjecturing"))
}

/// C3, C5 and K5 with named invariants; main invariant is the edge count.
const GRAPHS: &str = "3 4 2\n\
vertices\n\
edges\n\
maxdeg\n\
mindeg\n\
3 3 2 2\n\
5 5 2 2\n\
5 10 4 4\n";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test input");
    path
}

fn run(args: &[&str], dataset: Option<&Path>) -> Output {
    let mut command = Command::new(get_binary_path());
    command.args(args);
    if let Some(dataset) = dataset {
        command.arg(dataset);
    }
    command.output().expect("Failed to execute conjecturing")
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(get_binary_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute conjecturing");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for conjecturing")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "Command failed with status: {:?}\nstderr: {}\nstdout: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr),
            String::from_utf8_lossy(&output.stdout)
        );
    }
}

#[test]
fn test_conjecture_readable() {
    let dir = TempDir::new().unwrap();
    let dataset = write_file(&dir, "graphs.txt", GRAPHS);

    let output = run(
        &[
            "conjecture",
            "--invariant-names",
            "-u",
            "2",
            "-b",
            "1",
            "--time",
            "30",
        ],
        Some(&dataset),
    );
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(!lines.is_empty(), "Should print at least one conjecture");
    for line in &lines {
        assert!(line.ends_with(" <= edges"), "unexpected line: {}", line);
    }
    assert!(
        stdout.contains("/ 2)") && stdout.contains("vertices"),
        "Should find the handshake bound:\n{}",
        stdout
    );
}

#[test]
fn test_conjecture_stack_output() {
    let dir = TempDir::new().unwrap();
    let dataset = write_file(&dir, "graphs.txt", GRAPHS);

    let output = run(
        &[
            "conjecture",
            "--invariant-names",
            "--output",
            "stack",
            "--heuristic",
            "grinvin",
            "-u",
            "1",
            "-b",
            "1",
        ],
        Some(&dataset),
    );
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.ends_with("edges\n<=\n\n"), "stack output:\n{}", stdout);
}

#[test]
fn test_conjecture_operator_file() {
    let dir = TempDir::new().unwrap();
    let dataset = write_file(&dir, "graphs.txt", GRAPHS);
    let operators = write_file(&dir, "operators.txt", "1\nU 3\n");

    let output = run(
        &[
            "conjecture",
            "--invariant-names",
            "--heuristic",
            "none",
            "-u",
            "1",
            "-b",
            "1",
            "--operators",
            operators.to_str().unwrap(),
        ],
        Some(&dataset),
    );
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line == "(maxdeg / 2) <= edges"));
    assert!(
        !stdout.contains(" + ") && !stdout.contains(" * "),
        "Only halving was allowed:\n{}",
        stdout
    );
}

#[test]
fn test_conjecture_property_mode() {
    let dir = TempDir::new().unwrap();
    // regular, cycle, complete
    let dataset = write_file(&dir, "props.txt", "3 3 1\n1 1 1\n1 1 0\n1 0 1\n");

    let output = run(
        &["conjecture", "--comparator", "sufficient", "-u", "1", "-b", "1"],
        Some(&dataset),
    );
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.is_empty());
    assert!(stdout.lines().all(|line| line.ends_with(" -> I1")));
}

#[test]
fn test_conjecture_parse_error() {
    let dir = TempDir::new().unwrap();
    let dataset = write_file(&dir, "bad.txt", "2 2 1\n1 2\n3 x\n");

    let output = run(&["conjecture"], Some(&dataset));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 3"), "stderr: {}", stderr);
}

#[test]
fn test_conjecture_missing_file() {
    let output = run(&["conjecture", "/nonexistent/graphs.txt"], None);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read"), "stderr: {}", stderr);
}

#[test]
fn test_grinvin_rejected_for_properties() {
    let dir = TempDir::new().unwrap();
    let dataset = write_file(&dir, "props.txt", "1 2 1\n1 1\n");

    let output = run(
        &["conjecture", "--comparator", "necessary", "--heuristic", "grinvin"],
        Some(&dataset),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not supported in property mode"));
}

#[test]
fn test_shapes_count() {
    let output = run(&["shapes", "-u", "2", "-b", "1"], None);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("6 shapes for (2 unary, 1 binary)"));
}

#[test]
fn test_shapes_list() {
    let output = run(&["shapes", "-u", "1", "-b", "1", "--list"], None);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let shapes: Vec<&str> = stdout.lines().filter(|l| !l.contains("shapes")).collect();
    assert_eq!(shapes.len(), 3);
    for shape in shapes {
        assert_eq!(shape.len(), 4);
        assert!(shape.ends_with('B') || shape.ends_with('U'));
    }
}

#[test]
fn test_shapes_list_count_matches() {
    let output = run(&["shapes", "-u", "2", "-b", "1", "--list"], None);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 7);
    assert!(stdout.ends_with("6 shapes for (2 unary, 1 binary)\n"));
}

#[test]
fn test_limits_all() {
    let output = run(&["limits"], None);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let keys: Vec<&str> = stdout
        .lines()
        .map(|line| {
            let (key, value) = line.split_once(':').expect("KEY:value line");
            assert!(value.parse::<usize>().is_ok(), "bad value in {}", line);
            key
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            "MAX_UNARY_COUNT",
            "MAX_BINARY_COUNT",
            "MAX_OBJECT_COUNT",
            "MAX_INVARIANT_COUNT"
        ]
    );
}

#[test]
fn test_limits_single() {
    let output = run(&["limits", "binary"], None);
    assert_success(&output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "MAX_BINARY_COUNT:20\n");
}

#[test]
fn test_inline_operators_from_stdin() {
    let input = format!("1\nU 3\n{}", GRAPHS);
    let output = run_with_stdin(
        &[
            "conjecture",
            "--inline-operators",
            "--invariant-names",
            "--heuristic",
            "none",
            "-u",
            "1",
            "-b",
            "1",
            "--output",
            "stack",
            "-",
        ],
        &input,
    );
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("maxdeg\n/2\nedges\n<=\n\n"), "stack output:\n{}", stdout);
    assert!(!stdout.contains("\n+\n") && !stdout.contains("\nmax\n"));
}

#[test]
fn test_all_operators_conflicts_with_file() {
    let dir = TempDir::new().unwrap();
    let dataset = write_file(&dir, "graphs.txt", GRAPHS);
    let operators = write_file(&dir, "operators.txt", "1\nU 3\n");

    let output = run(
        &[
            "conjecture",
            "--all-operators",
            "--operators",
            operators.to_str().unwrap(),
        ],
        Some(&dataset),
    );
    assert!(!output.status.success());

    let output = run(
        &["conjecture", "--all-operators", "--invariant-names", "-u", "1", "-b", "1"],
        Some(&dataset),
    );
    assert_success(&output);
}
