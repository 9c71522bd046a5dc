//! Integration tests for decent-git
//!
//! These tests build throwaway repositories with the git binary, using fixed
//! author and committer dates, then read and rewrite their history.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, FixedOffset};
use decent_git::prelude::*;
use decent_git::{AMEND_OPERATION_ENV, RepoState};
use similar_asserts::assert_eq;
use tempfile::TempDir;

/// A repository in a temporary directory with an isolated global config
struct TestRepo {
    dir: TempDir,
    global_config: PathBuf,
}

impl TestRepo {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let global_config = dir.path().join(".globalconfig");
        fs::write(&global_config, "").expect("Failed to write global config");

        let repo = Self { dir, global_config };
        repo.git(&["init", "--initial-branch=main", "."]);
        repo.git(&["config", "user.name", "Night Owl"]);
        repo.git(&["config", "user.email", "owl@example.com"]);
        repo
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn git_in(&self, dir: &Path, args: &[&str], date: Option<&str>) -> String {
        let mut cmd = Command::new("git");
        cmd.current_dir(dir)
            .args(args)
            .env("GIT_CONFIG_GLOBAL", &self.global_config)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env_remove(AMEND_OPERATION_ENV);
        if let Some(date) = date {
            cmd.env("GIT_AUTHOR_DATE", date).env("GIT_COMMITTER_DATE", date);
        }
        let output = cmd.output().expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn git(&self, args: &[&str]) -> String {
        self.git_in(self.path(), args, None)
    }

    /// Commit a new file at an RFC 3339 date
    fn commit(&self, name: &str, date: &str) {
        fs::write(self.path().join(name), format!("{name}\n")).expect("Failed to write file");
        self.git(&["add", name]);
        self.git_in(self.path(), &["commit", "-m", &format!("Add {name}")], Some(date));
    }

    fn open(&self) -> GitRepo {
        GitRepo::open(self.path())
            .expect("Failed to open repository")
            .with_global_config(&self.global_config)
    }

    /// Committer date of HEAD as git reports it
    fn head_committer_date(&self) -> DateTime<FixedOffset> {
        let out = self.git(&["log", "-1", "--format=%cI"]);
        DateTime::parse_from_rfc3339(out.trim()).expect("Failed to parse committer date")
    }
}

fn date(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("valid RFC 3339 date")
}

#[test]
fn test_log_reads_dates_and_files() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-28T18:30:00+01:00");
    repo.commit("b.txt", "2024-01-28T18:35:00+01:00");

    let log = repo.open().log(&RevisionRange::All).expect("Failed to read log");

    assert_eq!(log.len(), 2);
    assert_eq!(
        log.dates(),
        vec![
            date("2024-01-28T18:30:00+01:00"),
            date("2024-01-28T18:35:00+01:00")
        ]
    );
    assert_eq!(log.get(1).map(|c| c.files.clone()), Some(vec!["b.txt".to_string()]));
    assert_eq!(log.oldest().map(Commit::subject), Some("Add a.txt"));
}

#[test]
fn test_amend_head_date_sets_author_and_committer_date() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-28T18:30:00+01:00");
    repo.commit("b.txt", "2024-01-28T23:59:00+01:00");

    let git = repo.open();
    let head = git.find_commit("HEAD").expect("Failed to read HEAD");
    let amended = head.with_date(date("2024-01-29T09:09:00+01:00"));
    git.amend_head_date(&amended).expect("Failed to amend HEAD");

    let new_head = git.find_commit("HEAD").expect("Failed to read HEAD");
    assert_eq!(new_head.date, date("2024-01-29T09:09:00+01:00"));
    assert_eq!(repo.head_committer_date(), date("2024-01-29T09:09:00+01:00"));
    assert_eq!(new_head.message, head.message);
    assert_eq!(new_head.parents, head.parents);
    assert!(new_head.sha != head.sha);
}

#[test]
fn test_amend_head_date_rejects_other_commit() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-28T18:30:00+01:00");
    repo.commit("b.txt", "2024-01-28T18:35:00+01:00");

    let git = repo.open();
    let log = git.log(&RevisionRange::All).expect("Failed to read log");
    let first = log.oldest().expect("first commit");

    let err = git
        .amend_head_date(&first.with_date(date("2024-01-29T09:00:00+01:00")))
        .expect_err("not HEAD");
    match err {
        GitError::NotHead { expected, head } => {
            assert_eq!(expected, first.sha);
            assert_eq!(head, git.head_sha().expect("HEAD"));
        }
        other => panic!("Expected NotHead, got {other:?}"),
    }
}

#[test]
fn test_amend_dates_from_root() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-28T18:30:00+01:00");
    repo.commit("b.txt", "2024-01-28T18:35:00+01:00");
    repo.commit("c.txt", "2024-01-28T23:59:00+01:00");

    let git = repo.open();
    let log = git.log(&RevisionRange::All).expect("Failed to read log");
    let new_dates = vec![
        date("2024-01-29T09:00:00+01:00"),
        date("2024-01-29T09:05:00+01:00"),
        date("2024-01-29T09:14:00+01:00"),
    ];
    git.amend_dates(&log.with_dates(&new_dates))
        .expect("Failed to amend dates");

    let rewritten = git.log(&RevisionRange::All).expect("Failed to read log");
    assert_eq!(rewritten.dates(), new_dates);
    assert_eq!(
        rewritten.iter().map(Commit::subject).collect::<Vec<_>>(),
        vec!["Add a.txt", "Add b.txt", "Add c.txt"]
    );
    assert_eq!(repo.head_committer_date(), date("2024-01-29T09:14:00+01:00"));
    assert_eq!(git.state(), RepoState::Clean);
}

#[test]
fn test_amend_dates_keeps_older_history() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-26T10:00:00+01:00");
    repo.commit("b.txt", "2024-01-27T22:00:00+01:00");
    repo.commit("c.txt", "2024-01-27T22:30:00+01:00");

    let git = repo.open();
    let all = git.log(&RevisionRange::All).expect("Failed to read log");
    let latest = git.log(&RevisionRange::Latest(2)).expect("Failed to read log");

    git.amend_dates(&latest.with_dates(&[
        date("2024-01-29T09:00:00+01:00"),
        date("2024-01-29T09:03:00+01:00"),
    ]))
    .expect("Failed to amend dates");

    let rewritten = git.log(&RevisionRange::All).expect("Failed to read log");
    assert_eq!(rewritten.oldest(), all.oldest());
    assert_eq!(
        rewritten.dates(),
        vec![
            date("2024-01-26T10:00:00+01:00"),
            date("2024-01-29T09:00:00+01:00"),
            date("2024-01-29T09:03:00+01:00"),
        ]
    );
}

#[test]
fn test_amend_dates_keeps_uncommitted_changes() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-28T18:30:00+01:00");
    repo.commit("b.txt", "2024-01-28T18:35:00+01:00");
    fs::write(repo.path().join("a.txt"), "work in progress\n").expect("Failed to write file");

    let git = repo.open();
    let log = git.log(&RevisionRange::Latest(1)).expect("Failed to read log");
    git.amend_dates(&log.with_dates(&[date("2024-01-29T09:05:00+01:00")]))
        .expect("Failed to amend dates");

    let content = fs::read_to_string(repo.path().join("a.txt")).expect("Failed to read file");
    assert_eq!(content, "work in progress\n");
}

#[test]
fn test_amend_dates_requires_log_ending_at_head() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-28T18:30:00+01:00");
    repo.commit("b.txt", "2024-01-28T18:35:00+01:00");

    let git = repo.open();
    let log = git
        .log(&RevisionRange::Spec("HEAD~1".to_string()))
        .expect("Failed to read log");

    let err = git.amend_dates(&log).expect_err("log doesn't end at HEAD");
    assert!(matches!(err, GitError::NotHead { .. }));
}

#[test]
fn test_unpushed_commits_against_upstream() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-28T10:00:00+01:00");

    let remote = tempfile::tempdir().expect("Failed to create remote dir");
    repo.git_in(remote.path(), &["init", "--bare", "."], None);
    let remote_path = remote.path().display().to_string();
    repo.git(&["remote", "add", "origin", &remote_path]);
    repo.git(&["push", "-u", "origin", "main"]);

    repo.commit("b.txt", "2024-01-28T22:00:00+01:00");
    repo.commit("c.txt", "2024-01-28T22:10:00+01:00");

    let git = repo.open();
    let branch = git.current_branch().expect("branch");
    assert_eq!(branch.as_deref(), Some("main"));
    let upstream = git.upstream("main").expect("upstream");
    assert_eq!(upstream.as_deref(), Some("origin/main"));

    let log = git
        .log(&RevisionRange::Unpushed {
            upstream: "origin/main".to_string(),
        })
        .expect("Failed to read log");
    assert_eq!(
        log.iter().map(Commit::subject).collect::<Vec<_>>(),
        vec!["Add b.txt", "Add c.txt"]
    );
    assert!(log.oldest().is_some_and(|c| !c.is_root()));

    let tip = git.find_commit("origin/main").expect("upstream tip");
    assert_eq!(tip.subject(), "Add a.txt");
    assert_eq!(tip.date, date("2024-01-28T10:00:00+01:00"));
    assert!(git.find_commit("origin/nowhere").is_err());
}

#[test]
fn test_rewrite_marks_hook_environment() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "2024-01-28T18:30:00+01:00");

    let git = repo.open();
    let hooks = git.hooks_dir().expect("hooks dir");
    fs::create_dir_all(&hooks).expect("Failed to create hooks dir");
    let marker = repo.path().join("hook-env");
    let hook = hooks.join("post-commit");
    fs::write(
        &hook,
        format!(
            "#!/bin/sh\necho \"${AMEND_OPERATION_ENV}\" >> \"{}\"\n",
            marker.display()
        ),
    )
    .expect("Failed to write hook");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    let head = git.find_commit("HEAD").expect("HEAD");
    git.amend_head_date(&head.with_date(date("2024-01-29T09:00:00+01:00")))
        .expect("Failed to amend HEAD");

    let seen = fs::read_to_string(&marker).expect("hook did not run");
    assert_eq!(seen.trim(), "1");
}
