//! Tests for command line argument handling

use std::process::Command;

/// Test that the help output describes the application
#[test]
fn test_help_output() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Offline video activity and emotion analysis"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("--summary"));
}

/// Test that the input video argument is required
#[test]
fn test_missing_video_argument() {
    let output = Command::new("cargo")
        .args(["run", "--"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Expected failure without a video argument");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required") || stderr.contains("Usage"),
        "Expected a missing-argument error, got stderr: {}",
        stderr
    );
}

/// Test that a nonexistent input video is a fatal, user-reported error
#[test]
fn test_nonexistent_video_file() {
    let output = Command::new("cargo")
        .args(["run", "--", "nonexistent.mp4"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Expected failure for nonexistent video file");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to open video file"),
        "Expected video file error message, got stderr: {}",
        stderr
    );
}
