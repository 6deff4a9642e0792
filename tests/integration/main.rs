//! Integration tests for Stager

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn stager() -> Command {
        let mut cmd = cargo_bin_cmd!("stager");
        cmd.env_remove("AWS_REGION").env_remove("STAGER_CONFIG");
        cmd
    }

    /// Command bound to a config file inside `dir`, local overlays ignored
    fn stager_with_config(dir: &Path) -> Command {
        let mut cmd = stager();
        cmd.arg("--no-local")
            .arg("--config")
            .arg(dir.join("config.toml"));
        cmd
    }

    fn write_definition(dir: &Path) -> PathBuf {
        let path = dir.join("swagger.yaml");
        std::fs::write(&path, "swagger: \"2.0\"\ninfo:\n  title: orders\n").unwrap();
        path
    }

    #[test]
    fn help_displays() {
        stager()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("deploy swagger-defined APIs"));
    }

    #[test]
    fn version_displays() {
        stager()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stager"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        stager_with_config(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        stager_with_config(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("[artifact]"));
    }

    #[test]
    fn config_init_writes_file_once() {
        let dir = TempDir::new().unwrap();
        stager_with_config(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(dir.path().join("config.toml").is_file());

        stager_with_config(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[apply]\nmode = \"ftp\"\n").unwrap();

        stager_with_config(dir.path())
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn setup_help() {
        stager()
            .args(["setup", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--definition"))
            .stdout(predicate::str::contains("--var"));
    }

    #[test]
    fn setup_missing_definition() {
        let dir = TempDir::new().unwrap();
        stager_with_config(dir.path())
            .args(["setup", "orders", "dev", "--region", "eu-west-1"])
            .arg("--definition")
            .arg(dir.path().join("missing.yaml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Definition file not found"));
    }

    #[test]
    fn setup_without_region() {
        let dir = TempDir::new().unwrap();
        let definition = write_definition(dir.path());

        stager_with_config(dir.path())
            .args(["setup", "orders", "dev", "--definition"])
            .arg(&definition)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No AWS region"));
    }

    #[test]
    fn setup_without_artifact_config() {
        let dir = TempDir::new().unwrap();
        let definition = write_definition(dir.path());

        stager_with_config(dir.path())
            .args(["setup", "orders", "dev", "--region", "eu-west-1", "--definition"])
            .arg(&definition)
            .assert()
            .failure()
            .stderr(predicate::str::contains("not configured"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn setup_rejects_bad_stage_name() {
        let dir = TempDir::new().unwrap();
        let definition = write_definition(dir.path());
        std::fs::write(dir.path().join("config.toml"), "[apply]\nmode = \"direct\"\n").unwrap();

        stager_with_config(dir.path())
            .args(["setup", "orders", "dev stage", "--region", "eu-west-1", "--definition"])
            .arg(&definition)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid"));
    }

    #[test]
    fn setup_rejects_malformed_variable() {
        stager()
            .args(["setup", "orders", "dev", "-d", "swagger.yaml", "-S", "novalue"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("KEY=VALUE"));
    }

    #[test]
    fn artifact_info_without_config() {
        let dir = TempDir::new().unwrap();
        stager_with_config(dir.path())
            .args(["artifact", "info"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not configured"));
    }

    #[test]
    fn artifact_info_never_synced() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("artifacts");
        std::fs::write(
            dir.path().join("config.toml"),
            format!(
                "[artifact]\nbucket = \"tools\"\nkey = \"importer/importer.jar\"\ncache_dir = {:?}\n",
                cache_dir.display().to_string()
            ),
        )
        .unwrap();

        stager_with_config(dir.path())
            .args(["artifact", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("s3://tools/importer/importer.jar"))
            .stdout(predicate::str::contains("never synced"));
    }

    #[test]
    fn completions_generate() {
        stager()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("stager"));
    }
}
