use assert_cmd::Command;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_missing_name_fails_before_connecting() {
    let mut settings = NamedTempFile::new().unwrap();
    writeln!(settings, "[DATABASES.default]\nHOST = \"localhost\"").unwrap();

    let output = Command::cargo_bin("pgbackend")
        .unwrap()
        .arg(settings.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration error"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_alias_reported() {
    let mut settings = NamedTempFile::new().unwrap();
    writeln!(settings, "[DATABASES.default]\nNAME = \"app\"").unwrap();

    let output = Command::cargo_bin("pgbackend")
        .unwrap()
        .arg(settings.path())
        .arg("reporting")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("reporting"));
}
