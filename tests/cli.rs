#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    #[test]
    fn test_help_lists_options() {
        Command::cargo_bin("materials-server")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--data-dir"))
            .stdout(predicate::str::contains("--users-file"))
            .stdout(predicate::str::contains("--mount-path"));
    }

    #[test]
    fn test_rejects_invalid_port() {
        Command::cargo_bin("materials-server")
            .unwrap()
            .args(["--port", "not-a-port"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }
}
