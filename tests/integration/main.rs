//! Integration tests for actfetch

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from the user's config, cache and token
fn actfetch(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("actfetch");
    cmd.env("ACTFETCH_CONFIG", home.join("config.toml"))
        .env("ACTFETCH_CACHE_DIR", home.join("cache"))
        .env_remove("GITHUB_TOKEN");
    cmd
}

mod cli_tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("fetch and cache third-party workflow actions"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("actfetch"));
    }

    #[test]
    fn resolve_plain() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["resolve", "actions/checkout@v4", "--format", "plain"])
            .assert()
            .success()
            .stdout("https://github.com/actions/checkout refs/tags/v4 -\n");
    }

    #[test]
    fn resolve_json_with_subpath() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["resolve", "actions/cache/restore@main", "--format", "json"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("\"qualified\": \"refs/heads/main\"")
                    .and(predicate::str::contains("\"path\": \"restore\"")),
            );
    }

    #[test]
    fn resolve_url_reference_is_quiet() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["resolve", "https://example.com/org/repo@v1", "--format", "plain"])
            .assert()
            .success()
            .stdout("https://example.com/org/repo refs/tags/v1 -\n")
            .stderr(predicate::str::is_empty());
    }

    #[test]
    fn resolve_rejects_empty_reference() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["resolve", "  "])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn cache_list_empty() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["cache", "list"])
            .assert()
            .success()
            .stderr(predicate::str::contains("No cache entries"));
    }

    #[test]
    fn cache_info_reports_miss() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["cache", "info", "actions/checkout@v4"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("https://github.com/actions/checkoutv4")
                    .and(predicate::str::contains("miss")),
            );
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[fetch]"));
    }

    #[test]
    fn config_set_then_show() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["config", "set", "fetch.depth", "3"])
            .assert()
            .success();

        actfetch(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("depth = 3"));
    }

    #[test]
    fn config_set_unknown_key() {
        let home = TempDir::new().unwrap();
        actfetch(home.path())
            .args(["config", "set", "fetch.nope", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }
}

mod fetch_tests {
    use super::*;
    use predicates::prelude::*;
    use std::path::PathBuf;
    use std::process::Command as StdCommand;

    fn git_available() -> bool {
        StdCommand::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .arg("-C")
            .arg(dir)
            .args([
                "-c",
                "user.name=actfetch",
                "-c",
                "user.email=actfetch@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
            ])
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Remote with two commits on `main`; `release-x` tags only the first.
    /// `side` branches off the first commit with a commit of its own.
    struct Remote {
        _dir: TempDir,
        path: PathBuf,
        first: String,
        side: String,
    }

    impl Remote {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("remote");
            std::fs::create_dir(&path).unwrap();

            git(&path, &["init", "-q"]);
            git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]);

            std::fs::create_dir(path.join("sub")).unwrap();
            std::fs::write(path.join("sub/action.yml"), "name: sub\n").unwrap();
            std::fs::write(path.join("version.txt"), "one\n").unwrap();
            git(&path, &["add", "."]);
            git(&path, &["commit", "-q", "-m", "first"]);
            let first = git(&path, &["rev-parse", "HEAD"]);
            git(&path, &["tag", "release-x"]);

            git(&path, &["checkout", "-q", "-b", "side"]);
            std::fs::write(path.join("version.txt"), "side\n").unwrap();
            git(&path, &["commit", "-q", "-am", "side"]);
            let side = git(&path, &["rev-parse", "HEAD"]);
            git(&path, &["checkout", "-q", "main"]);

            std::fs::write(path.join("version.txt"), "two\n").unwrap();
            git(&path, &["commit", "-q", "-am", "second"]);

            Self {
                _dir: dir,
                path,
                first,
                side,
            }
        }

        fn reference(&self, selector: &str) -> String {
            format!("file://{}@{}", self.path.display(), selector)
        }
    }

    fn fetched_dir(output: &[u8]) -> PathBuf {
        PathBuf::from(String::from_utf8_lossy(output).trim())
    }

    #[test]
    fn tag_only_selector_falls_back_to_tag() {
        if !git_available() {
            eprintln!("skipping: git not found");
            return;
        }
        let remote = Remote::new();
        let home = TempDir::new().unwrap();

        let output = actfetch(home.path())
            .args(["fetch", &remote.reference("release-x")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let dir = fetched_dir(&output);
        assert_eq!(
            std::fs::read_to_string(dir.join("version.txt")).unwrap(),
            "one\n"
        );
        assert!(dir.starts_with(home.path().join("cache")));
    }

    #[test]
    fn branch_fetch_gets_tip() {
        if !git_available() {
            eprintln!("skipping: git not found");
            return;
        }
        let remote = Remote::new();
        let home = TempDir::new().unwrap();

        let output = actfetch(home.path())
            .args(["fetch", &remote.reference("main")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let dir = fetched_dir(&output);
        assert_eq!(
            std::fs::read_to_string(dir.join("version.txt")).unwrap(),
            "two\n"
        );
    }

    #[test]
    fn pinned_commit_is_checked_out() {
        if !git_available() {
            eprintln!("skipping: git not found");
            return;
        }
        let remote = Remote::new();
        let home = TempDir::new().unwrap();

        let output = actfetch(home.path())
            .args(["fetch", &remote.reference("main"), "--sha", &remote.first])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let dir = fetched_dir(&output);
        assert_eq!(
            std::fs::read_to_string(dir.join("version.txt")).unwrap(),
            "one\n"
        );
    }

    #[test]
    fn commit_on_other_branch_is_checked_out() {
        if !git_available() {
            eprintln!("skipping: git not found");
            return;
        }
        let remote = Remote::new();
        let home = TempDir::new().unwrap();

        let output = actfetch(home.path())
            .args(["fetch", &remote.reference(&remote.side)])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let dir = fetched_dir(&output);
        assert_eq!(
            std::fs::read_to_string(dir.join("version.txt")).unwrap(),
            "side\n"
        );
    }

    #[test]
    fn pin_outside_selected_branch_is_checked_out() {
        if !git_available() {
            eprintln!("skipping: git not found");
            return;
        }
        let remote = Remote::new();
        let home = TempDir::new().unwrap();

        let output = actfetch(home.path())
            .args(["fetch", &remote.reference("main"), "--sha", &remote.side])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let dir = fetched_dir(&output);
        assert_eq!(
            std::fs::read_to_string(dir.join("version.txt")).unwrap(),
            "side\n"
        );
    }

    /// Directory holding a `git` wrapper that logs each call and slows fetches
    #[cfg(unix)]
    fn logging_git(dir: &Path, log: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let real = StdCommand::new("sh")
            .args(["-c", "command -v git"])
            .output()
            .unwrap();
        let real = String::from_utf8_lossy(&real.stdout).trim().to_string();

        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let script = bin.join("git");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$*\" >> '{}'\ncase \"$*\" in *fetch*) sleep 1 ;; esac\nexec '{}' \"$@\"\n",
                log.display(),
                real
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        bin
    }

    #[cfg(unix)]
    #[test]
    fn concurrent_processes_populate_once() {
        if !git_available() {
            eprintln!("skipping: git not found");
            return;
        }
        let remote = Remote::new();
        let home = TempDir::new().unwrap();
        let log = home.path().join("git.log");
        let bin = logging_git(home.path(), &log);
        let path = format!(
            "{}:{}",
            bin.display(),
            std::env::var("PATH").unwrap_or_default()
        );
        let reference = remote.reference("main");

        let outputs: Vec<Vec<u8>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    scope.spawn(|| {
                        actfetch(home.path())
                            .env("PATH", &path)
                            .args(["fetch", &reference])
                            .assert()
                            .success()
                            .get_output()
                            .stdout
                            .clone()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(outputs[0], outputs[1]);
        let dir = fetched_dir(&outputs[0]);
        assert!(dir.parent().unwrap().join(".done").is_file());

        let calls = std::fs::read_to_string(&log).unwrap();
        assert_eq!(calls.lines().filter(|l| l.contains("init --quiet")).count(), 1);
    }

    #[test]
    fn second_fetch_is_served_from_cache() {
        if !git_available() {
            eprintln!("skipping: git not found");
            return;
        }
        let remote = Remote::new();
        let home = TempDir::new().unwrap();
        let reference = remote.reference("main");

        let first = actfetch(home.path())
            .args(["fetch", &reference])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        // The remote is gone; only the cache can answer now
        std::fs::remove_dir_all(&remote.path).unwrap();

        actfetch(home.path())
            .args(["fetch", &reference])
            .assert()
            .success()
            .stdout(first);

        actfetch(home.path())
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"complete\""));
    }

    #[test]
    fn missing_ref_reports_original_guess() {
        if !git_available() {
            eprintln!("skipping: git not found");
            return;
        }
        let remote = Remote::new();
        let home = TempDir::new().unwrap();

        actfetch(home.path())
            .args(["fetch", &remote.reference("nope")])
            .assert()
            .failure()
            .stderr(
                predicate::str::contains("refs/heads/nope")
                    .and(predicate::str::contains("not found"))
                    .and(predicate::str::contains("Hint:")),
            );

        actfetch(home.path())
            .args(["cache", "info", &remote.reference("nope")])
            .assert()
            .success()
            .stdout(predicate::str::contains("building"));
    }
}
