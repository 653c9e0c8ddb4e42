//! # mfac CLI entry point
//!
//! Parses command-line arguments, builds the factory from the config file
//! and flags, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mfac_cli::add::{run_add, AddArgs};
use mfac_cli::inspect::{run_describe, run_list, run_show, DescribeArgs, ShowArgs};
use mfac_cli::GlobalOptions;

/// Message factory: compile schema files at run time and inspect the
/// message types they define.
#[derive(Parser, Debug)]
#[command(name = "mfac", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stage, compile, and load schema files or directories.
    Add(AddArgs),

    /// List registered message type keys.
    List,

    /// Print the default prototype of a message type as JSON.
    Show(ShowArgs),

    /// Print a message type descriptor as YAML.
    Describe(DescribeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut factory = mfac_cli::build_factory(&cli.global)?;
    tracing::debug!(
        root = %factory.workspace().root().display(),
        naming = %factory.naming(),
        "factory built"
    );

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Add(args) => run_add(&args, &mut factory, &mut out),
        Commands::List => run_list(&mut factory, &mut out),
        Commands::Show(args) => run_show(&args, &mut factory, &mut out),
        Commands::Describe(args) => run_describe(&args, &mut factory, &mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use mfac_core::NamingPolicy;

    #[test]
    fn cli_parse_add_paths() {
        let cli = Cli::try_parse_from(["mfac", "add", "a.idl", "schemas/"]).unwrap();
        if let Commands::Add(args) = cli.command {
            assert_eq!(args.paths, vec![PathBuf::from("a.idl"), PathBuf::from("schemas/")]);
            assert!(!args.strict);
        } else {
            panic!("expected add");
        }
    }

    #[test]
    fn cli_parse_add_requires_a_path() {
        assert!(Cli::try_parse_from(["mfac", "add"]).is_err());
    }

    #[test]
    fn cli_parse_add_strict() {
        let cli = Cli::try_parse_from(["mfac", "add", "--strict", "a.idl"]).unwrap();
        if let Commands::Add(args) = cli.command {
            assert!(args.strict);
        }
    }

    #[test]
    fn cli_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mfac",
            "list",
            "--workspace",
            "/tmp/ws",
            "--naming",
            "file",
            "--compiler",
            "/opt/idlc",
            "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.global.workspace, Some(PathBuf::from("/tmp/ws")));
        assert_eq!(cli.global.naming, Some(NamingPolicy::FileName));
        assert_eq!(cli.global.compiler, Some(PathBuf::from("/opt/idlc")));
        assert!(cli.global.config.is_none());
    }

    #[test]
    fn cli_parse_rejects_unknown_naming() {
        assert!(Cli::try_parse_from(["mfac", "--naming", "stem", "list"]).is_err());
    }

    #[test]
    fn cli_parse_show_indent() {
        let cli = Cli::try_parse_from(["mfac", "show", "Person"]).unwrap();
        if let Commands::Show(args) = cli.command {
            assert_eq!(args.key, "Person");
            assert_eq!(args.indent, mfac_core::DEFAULT_INDENT);
        }

        let cli = Cli::try_parse_from(["mfac", "show", "Person", "--indent", "2"]).unwrap();
        if let Commands::Show(args) = cli.command {
            assert_eq!(args.indent, 2);
        }
    }

    #[test]
    fn cli_parse_describe() {
        let cli = Cli::try_parse_from(["mfac", "--config", "mfac.yaml", "describe", "Person"]).unwrap();
        assert_eq!(cli.global.config, Some(PathBuf::from("mfac.yaml")));
        if let Commands::Describe(args) = cli.command {
            assert_eq!(args.key, "Person");
        } else {
            panic!("expected describe");
        }
    }
}
