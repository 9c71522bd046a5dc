//! Configuration for the git-decent command line
//!
//! The schedule itself lives in git config (`decent.<weekday>`); this module
//! only covers the flags and environment variables of a single invocation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Git Decent - amends your commits so it looks like you are behaving
///
/// Without a subcommand, lists the unpushed commits of the current branch
/// with the dates they would get, and offers to rewrite them.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "git-decent")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (defaults to scanning unpushed commits)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path inside the repository to operate on
    ///
    /// Defaults to the current working directory.
    #[arg(short = 'C', long, env = "GIT_DECENT_REPO", global = true)]
    pub repo: Option<PathBuf>,

    /// Keep real intervals between commits up to this many minutes
    ///
    /// Commits further apart, and every commit when 0, are spaced by a few
    /// minutes of noise instead.
    #[arg(
        short,
        long,
        env = "GIT_DECENT_THRESHOLD",
        default_value_t = 0,
        global = true
    )]
    pub threshold: u32,

    /// Answer yes to every question
    #[arg(short, long, default_value = "false", global = true)]
    pub yes: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs every amendment step and git invocation to stderr.
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Amend the last commit, to be run by the post-commit hook
    ///
    /// Amending from a post-commit hook fires the hook again, so nested runs
    /// exit straight away.
    #[command(hide = true)]
    PostCommit,

    /// Amend the last commit to a decent time
    Amend,

    /// Refuse to push outside decent hours, to be run by the pre-push hook
    #[command(hide = true)]
    PrePush {
        /// Ask whether to push anyway instead of refusing
        #[arg(long)]
        confirm: bool,

        /// Terminal to ask on
        ///
        /// git feeds the refs being pushed to the hook's stdin, so answers
        /// can't come from there.
        #[arg(long, hide = true, default_value = "/dev/tty")]
        terminal: PathBuf,
    },

    /// Install the git hooks that make it automatic
    ///
    /// Existing hooks are never overwritten. Without flags both hooks are
    /// installed.
    Install {
        /// Install the post-commit hook
        #[arg(long)]
        post_commit: bool,

        /// Install the pre-push hook
        #[arg(long)]
        pre_push: bool,
    },

    /// Print the configured schedule
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configure the schedule in your editor
    Setup,
}

impl Config {
    /// Get the repository path, using current directory as default
    ///
    /// Returns `None` if no path is given and the current directory cannot
    /// be determined.
    #[must_use]
    pub fn repo_path(&self) -> Option<PathBuf> {
        self.repo.clone().or_else(|| std::env::current_dir().ok())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("git-decent").chain(args.iter().copied()))
            .expect("parse should succeed")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.command.is_none());
        assert!(config.repo.is_none());
        assert_eq!(config.threshold, 0);
        assert!(!config.yes);
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_repo_path_custom() {
        let custom = PathBuf::from("/custom/repo");
        let config = Config {
            repo: Some(custom.clone()),
            ..Default::default()
        };
        assert_eq!(config.repo_path(), Some(custom));
    }

    #[test]
    fn test_repo_path_default() {
        assert!(Config::default().repo_path().is_some());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(Config::default().log_level(), tracing::Level::INFO);
        let verbose = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(verbose.log_level(), tracing::Level::DEBUG);
        let quiet = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(quiet.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["post-commit"]).command, Some(Command::PostCommit));
        assert_eq!(parse(&["amend"]).command, Some(Command::Amend));
        assert_eq!(
            parse(&["pre-push", "--confirm"]).command,
            Some(Command::PrePush {
                confirm: true,
                terminal: PathBuf::from("/dev/tty")
            })
        );
        assert_eq!(
            parse(&["install", "--pre-push"]).command,
            Some(Command::Install {
                post_commit: false,
                pre_push: true
            })
        );
        assert_eq!(
            parse(&["config", "--json"]).command,
            Some(Command::Config { json: true })
        );
        assert_eq!(parse(&["setup"]).command, Some(Command::Setup));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let config = parse(&["amend", "-y", "-t", "45", "-C", "/tmp"]);
        assert!(config.yes);
        assert_eq!(config.threshold, 45);
        assert_eq!(config.repo, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_pre_push_hook_arguments_are_rejected() {
        // git passes remote name and url, the hook script drops them
        let result = Config::try_parse_from(["git-decent", "pre-push", "origin", "url"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_threshold_must_be_a_number() {
        assert!(Config::try_parse_from(["git-decent", "--threshold", "soon"]).is_err());
        assert!(Config::try_parse_from(["git-decent", "--threshold", "-5"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
