//! Integration tests for taco-build

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn taco_build() -> Command {
        let mut cmd = cargo_bin_cmd!("taco-build");
        cmd.env_remove("TACO_BUILD_CONFIG");
        cmd
    }

    #[test]
    fn help_displays() {
        taco_build()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cordova toolkit cache and build driver"));
    }

    #[test]
    fn version_displays() {
        taco_build()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("taco-build"));
    }

    #[test]
    fn build_help_lists_pipeline_flags() {
        taco_build()
            .args(["build", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--platform"))
            .stdout(predicate::str::contains("--module-version"))
            .stdout(predicate::str::contains("--no-support-plugin"));
    }

    #[test]
    fn build_requires_platform() {
        taco_build()
            .arg("build")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--platform"));
    }

    #[test]
    fn missing_project_is_reported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-project");

        taco_build()
            .args(["build", "-p", "android", "--cache-root"])
            .arg(dir.path().join("cache"))
            .arg("--project")
            .arg(&missing)
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn cache_with_missing_project_fails() {
        let dir = TempDir::new().unwrap();

        taco_build()
            .args(["cache", "--project"])
            .arg(dir.path().join("missing"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn explicit_missing_config_file_fails() {
        let dir = TempDir::new().unwrap();

        taco_build()
            .args(["cache", "--config"])
            .arg(dir.path().join("absent.toml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"));
    }

    #[test]
    fn invalid_config_file_fails() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "[build\nmodule_version = ").unwrap();

        taco_build()
            .args(["cache", "--config"])
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
