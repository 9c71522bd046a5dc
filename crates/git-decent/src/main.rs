//! git-decent: amends commit dates so your history only shows decent hours
//!
//! Run as `git decent` once the binary is on the `PATH`.

use std::process::ExitCode;

use clap::Parser;
use git_decent::config::Config;
use tracing::debug;

fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    debug!(?config, "Starting git-decent");
    git_decent::report(git_decent::run(&config), &mut std::io::stderr())
}
