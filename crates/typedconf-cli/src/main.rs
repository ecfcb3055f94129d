//! typedconf CLI - resolve configuration keys from layered sources.
//!
//! Stacks environment variables and INI files the same way an application
//! built on `typedconf` would, then resolves single keys or lists the stack.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{get, sources};

/// typedconf - inspect layered configuration
#[derive(Parser)]
#[command(name = "typedconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    stack: StackArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Which sources to stack, highest precedence first.
#[derive(Args, Debug, Default)]
pub(crate) struct StackArgs {
    /// Read environment variables named `PREFIX_SECTION_KEY`
    #[arg(long, global = true, env = "TYPEDCONF_ENV_PREFIX")]
    pub(crate) env_prefix: Option<String>,

    /// INI file that must exist (repeatable, earlier files win)
    #[arg(long = "ini", global = true)]
    pub(crate) ini: Vec<PathBuf>,

    /// INI file that is skipped when absent (repeatable)
    #[arg(long = "ini-optional", global = true)]
    pub(crate) ini_optional: Vec<PathBuf>,

    /// Text encoding of the INI files
    #[arg(long, global = true, default_value = "utf-8")]
    pub(crate) encoding: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one key and print its value
    Get(get::GetArgs),

    /// List the stacked sources in precedence order
    Sources,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let provider = sources::build_provider(&cli.stack)?;

    match cli.command {
        Commands::Get(args) => {
            println!("{}", get::run(provider, &args)?);
        },
        Commands::Sources => {
            for line in sources::describe(&provider) {
                println!("{line}");
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_with_stack() {
        let cli = Cli::try_parse_from([
            "typedconf",
            "--env-prefix",
            "APP",
            "--ini",
            "a.cfg",
            "--ini",
            "b.cfg",
            "get",
            "server.tls",
            "cert",
            "--cast",
            "optional-bool",
            "--ini-optional",
            "c.cfg",
        ])
        .unwrap();

        assert_eq!(cli.stack.env_prefix.as_deref(), Some("APP"));
        assert_eq!(cli.stack.ini, [PathBuf::from("a.cfg"), PathBuf::from("b.cfg")]);
        assert_eq!(cli.stack.ini_optional, [PathBuf::from("c.cfg")]);
        assert_eq!(cli.stack.encoding, "utf-8");
        let Commands::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(args.section, "server.tls");
        assert_eq!(args.key, "cert");
        assert_eq!(args.cast, get::CastKind::OptionalBool);
    }

    #[test]
    fn test_parse_rejects_unknown_cast() {
        let result = Cli::try_parse_from(["typedconf", "get", "s", "a", "--cast", "date"]);
        assert!(result.is_err());
    }
}
