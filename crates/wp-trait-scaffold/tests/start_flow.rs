//! Tests for `start` with WP-CLI and Composer replaced by recorders.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use wp_trait_core::{Error, Result};
use wp_trait_scaffold::{
    InstallOutcome, ManifestResolver, PluginSkeleton, ProcessRunner, SkipInstall, StartOptions,
};

#[derive(Debug, Default)]
struct RecordingRunner {
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, working_dir: &Path, command: &[String]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((working_dir.to_path_buf(), command.to_vec()));
        Ok(())
    }
}

/// Runner that fakes `wp scaffold plugin` by creating the main file.
#[derive(Debug)]
struct FakeWpCli;

impl ProcessRunner for FakeWpCli {
    fn run(&self, working_dir: &Path, command: &[String]) -> Result<()> {
        let slug = &command[3];
        let dir = working_dir.join(slug);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{slug}.php")), "<?php\n").unwrap();
        Ok(())
    }
}

fn options() -> StartOptions {
    StartOptions {
        plugin_name: Some("My Plugin".to_string()),
        plugin_author: Some("Acme Inc".to_string()),
        ..StartOptions::default()
    }
}

#[test]
fn test_start_runs_wp_cli_and_writes_manifest() {
    let temp = TempDir::new().unwrap();
    let runner = RecordingRunner::default();
    let skeleton = PluginSkeleton::new(&runner, &SkipInstall)
        .unwrap()
        .with_wp_binary("/usr/bin/wp");

    let report = skeleton.generate(temp.path(), &options()).unwrap();

    assert_eq!(report.slug, "my-plugin");
    assert_eq!(report.namespace, "MyPlugin");
    assert_eq!(report.install, InstallOutcome::Skipped);

    let calls = runner.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1[..4], ["/usr/bin/wp", "scaffold", "plugin", "my-plugin"]);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report.manifest).unwrap()).unwrap();
    assert_eq!(manifest["name"], "acme-inc/my-plugin");
    assert_eq!(manifest["description"], "My Plugin");
    assert_eq!(manifest["autoload"]["psr-4"]["MyPlugin\\"], "src/");
    assert!(report.directory.join("src").is_dir());
}

#[test]
fn test_started_plugin_resolves_as_project() {
    let temp = TempDir::new().unwrap();
    let skeleton = PluginSkeleton::new(&FakeWpCli, &SkipInstall).unwrap();

    let report = skeleton.generate(temp.path(), &options()).unwrap();
    let project = ManifestResolver::resolve(&report.directory).unwrap();

    assert_eq!(project.slug, "my-plugin");
    assert_eq!(project.mapping.root_namespace, "MyPlugin");
}

#[test]
fn test_existing_manifest_requires_force() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("my-plugin");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("composer.json"), "{}").unwrap();
    let runner = RecordingRunner::default();
    let skeleton = PluginSkeleton::new(&runner, &SkipInstall).unwrap();

    let err = skeleton.generate(temp.path(), &options()).unwrap_err();
    assert!(matches!(err, Error::TargetExists { .. }));
    assert!(runner.calls.lock().unwrap().is_empty());
    assert_eq!(fs::read_to_string(dir.join("composer.json")).unwrap(), "{}");

    let forced = StartOptions {
        force: true,
        ..options()
    };
    skeleton.generate(temp.path(), &forced).unwrap();
    assert_ne!(fs::read_to_string(dir.join("composer.json")).unwrap(), "{}");
    assert!(runner.calls.lock().unwrap()[0].1.contains(&"--force".to_string()));
}
