//! End-to-end tests of the command-line contract, driving the built
//! binary as a subprocess.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn callscan(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_callscan"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("binary should run")
}

/// Report body after the ExecutionDateTime/[parameters] preamble.
fn strip_preamble(stdout: &str) -> String {
    match stdout.find("\n\n") {
        Some(pos) => stdout[pos + 2..].to_string(),
        None => stdout.to_string(),
    }
}

const SOURCE: &str = r#"namespace N
{
    class A
    {
        void Foo()
        {
            Helper(1);
        }

        void Helper(int x)
        {
        }
    }
}
"#;

#[test]
fn fewer_than_two_arguments_prints_two_usage_lines() {
    let dir = tempfile::TempDir::new().unwrap();
    let output = callscan(&[], dir.path());

    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    let usage_lines: Vec<&str> = stderr
        .lines()
        .filter(|l| l.starts_with("usage:"))
        .collect();
    assert_eq!(usage_lines.len(), 2);
    assert!(usage_lines[1].contains("/singlesource"));

    // No analysis happened.
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("[Source:"));
}

#[test]
fn missing_source_directory_fails_without_analysis() {
    let dir = tempfile::TempDir::new().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir(&bin).unwrap();

    let output = callscan(&["no-such-dir", bin.to_str().unwrap()], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("source directory not found"));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("[Source:"));
}

#[test]
fn missing_bin_directory_fails_without_analysis() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();

    let output = callscan(&[src.to_str().unwrap(), "no-such-bin"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("bin directory not found"));
}

#[test]
fn single_file_and_batch_over_one_file_report_identically() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("src");
    let bin = dir.path().join("bin");
    fs::create_dir(&src).unwrap();
    fs::create_dir(&bin).unwrap();
    let file = src.join("A.cs");
    fs::write(&file, SOURCE).unwrap();

    let batch = callscan(&[src.to_str().unwrap(), bin.to_str().unwrap()], dir.path());
    let single = callscan(
        &[file.to_str().unwrap(), bin.to_str().unwrap(), "/singlesource"],
        dir.path(),
    );

    assert!(batch.status.success());
    assert!(single.status.success());

    let batch_report = strip_preamble(&String::from_utf8(batch.stdout).unwrap());
    let single_report = strip_preamble(&String::from_utf8(single.stdout).unwrap());
    assert_eq!(batch_report, single_report);
    assert!(batch_report.contains("Class Declaration: N.A\n"));
    assert!(batch_report.contains("Specified Syntax MethodCall: N.A.Helper(int)\n"));
    assert!(batch_report.ends_with("\n\n"));
}

#[test]
fn flag_position_does_not_matter() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("src");
    let bin = dir.path().join("bin");
    fs::create_dir(&src).unwrap();
    fs::create_dir(&bin).unwrap();
    let file = src.join("A.cs");
    fs::write(&file, SOURCE).unwrap();

    let leading = callscan(
        &["/SingleSource", file.to_str().unwrap(), bin.to_str().unwrap()],
        dir.path(),
    );
    let trailing = callscan(
        &[file.to_str().unwrap(), bin.to_str().unwrap(), "/singlesource"],
        dir.path(),
    );

    assert!(leading.status.success());
    let leading_report = strip_preamble(&String::from_utf8(leading.stdout).unwrap());
    let trailing_report = strip_preamble(&String::from_utf8(trailing.stdout).unwrap());
    assert_eq!(leading_report, trailing_report);
}

#[test]
fn build_output_directories_are_excluded_from_batches() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("src");
    let bin = dir.path().join("bin");
    fs::create_dir_all(src.join("obj/Debug")).unwrap();
    fs::create_dir(&bin).unwrap();
    fs::write(src.join("A.cs"), SOURCE).unwrap();
    fs::write(
        src.join("obj/Debug/Generated.cs"),
        "namespace Gen { class G { } }",
    )
    .unwrap();

    let output = callscan(&[src.to_str().unwrap(), bin.to_str().unwrap()], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Class Declaration: N.A"));
    assert!(!stdout.contains("Generated.cs"));
}
