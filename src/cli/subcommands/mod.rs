// Copyright 2024-2026 Carcara Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

mod cat_cmd;
mod ls_cmd;
mod overlay_cmd;
mod roots_cmd;
mod stat_cmd;

pub(super) use self::{
    cat_cmd::CatCommand, ls_cmd::LsCommand, overlay_cmd::OverlayCommand,
    roots_cmd::RootsCommand, stat_cmd::StatCommand,
};
use clap::Parser;

/// CLI structure generated when interacting with the carcara binary
#[derive(Parser)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION")
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Subcommand,
}

/// carcara sub-commands available
#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Concatenate CAR files
    Cat(CatCommand),

    /// List block cids in CAR files
    Ls(LsCommand),

    /// List roots in CAR files
    Roots(RootsCommand),

    /// Print block statistics for CAR files
    Stat(StatCommand),

    /// Create an overlay CAR reaching every input block from a single root
    Overlay(OverlayCommand),
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn input_files_are_required() {
        // Checked by the parser, before any I/O happens.
        for cmd in ["cat", "ls", "roots", "stat", "overlay"] {
            assert!(Cli::try_parse_from(["carcara", cmd]).is_err());
            assert!(Cli::try_parse_from(["carcara", cmd, "a.car", "b.car"]).is_ok());
        }
    }

    #[test]
    fn overlay_flags_parse() {
        let cli =
            Cli::try_parse_from(["carcara", "overlay", "--shallow", "-o", "out.car", "in.car"])
                .unwrap();
        assert!(matches!(cli.cmd, Subcommand::Overlay(_)));
    }
}
