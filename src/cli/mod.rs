// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

mod subcommands;

use std::ffi::OsString;

use clap::Parser as _;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::utils::CancelToken;
use subcommands::{Cli, Subcommand};

/// Logs go to stderr so that command output on stdout stays clean.
fn setup_minimal_logger() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_filter(get_env_filter()),
        )
        .try_init();
}

/// Returns an [`EnvFilter`] according to the `RUST_LOG` environment
/// variable, defaulting to `info`.
fn get_env_filter() -> EnvFilter {
    use std::env::{
        self,
        VarError::{NotPresent, NotUnicode},
    };
    match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(s) => EnvFilter::new(s),
        Err(NotPresent) => EnvFilter::new("info"),
        Err(NotUnicode(_)) => EnvFilter::default(),
    }
}

pub fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    let Cli { cmd } = Cli::parse_from(args);
    setup_minimal_logger();

    // Passed into every command and checked between block operations. The
    // binary keeps the default signal disposition, so an OS interrupt still
    // terminates the process abruptly; library callers can wire the token to
    // whatever lifecycle they have.
    let cancel = CancelToken::default();

    match cmd {
        Subcommand::Cat(cmd) => cmd.run(&cancel),
        Subcommand::Ls(cmd) => cmd.run(&cancel),
        Subcommand::Roots(cmd) => cmd.run(&cancel),
        Subcommand::Stat(cmd) => cmd.run(&cancel),
        Subcommand::Overlay(cmd) => cmd.run(&cancel),
    }
}
