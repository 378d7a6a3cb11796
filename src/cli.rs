use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::samples::SampleKind;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct RawArgs {
    /// Subcommand to run
    #[clap(subcommand)]
    command: Option<Command>,
    /// Enable debug logging
    #[clap(short, long, default_value = "false", global = true)]
    debug: bool,
    /// JSON configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug)]
pub(crate) struct ParsedArgs {
    pub command: Command,
    pub log_level: tracing::Level,
    pub config_path: Option<PathBuf>,
}

impl ParsedArgs {
    pub fn parse_args() -> Self {
        let args: RawArgs = clap::Parser::parse();
        Self::from_raw(args)
    }

    fn from_raw(args: RawArgs) -> Self {
        let log_level = if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        ParsedArgs {
            command: args.command.unwrap_or_default(),
            log_level,
            config_path: args.config,
        }
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run a sample
    Run {
        #[arg(value_enum)]
        sample: SampleKind,
    },
    /// Run a sample without vsync for a fixed time and report the frame rate
    Benchmark {
        #[arg(value_enum)]
        sample: SampleKind,
        /// Seconds to run before exiting
        #[arg(long, default_value_t = 10)]
        secs: u32,
    },
    /// List the available samples
    List,
}

impl Default for Command {
    fn default() -> Self {
        Command::Run {
            sample: SampleKind::Triangle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ParsedArgs {
        let raw = RawArgs::try_parse_from(std::iter::once("ming").chain(args.iter().copied()))
            .expect("arguments should parse");
        ParsedArgs::from_raw(raw)
    }

    #[test]
    fn no_arguments_runs_the_triangle() {
        let args = parse(&[]);
        assert_eq!(
            args.command,
            Command::Run {
                sample: SampleKind::Triangle
            }
        );
        assert_eq!(args.log_level, tracing::Level::INFO);
        assert!(args.config_path.is_none());
    }

    #[test]
    fn run_accepts_kebab_case_sample_names() {
        let args = parse(&["run", "text-editor", "--debug"]);
        assert_eq!(
            args.command,
            Command::Run {
                sample: SampleKind::TextEditor
            }
        );
        assert_eq!(args.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn benchmark_defaults_to_ten_seconds() {
        let args = parse(&["benchmark", "texture"]);
        assert_eq!(
            args.command,
            Command::Benchmark {
                sample: SampleKind::Texture,
                secs: 10
            }
        );

        let args = parse(&["-c", "ming.json", "benchmark", "triangle", "--secs", "3"]);
        assert_eq!(
            args.command,
            Command::Benchmark {
                sample: SampleKind::Triangle,
                secs: 3
            }
        );
        assert_eq!(args.config_path, Some(PathBuf::from("ming.json")));
    }

    #[test]
    fn unknown_sample_is_rejected() {
        assert!(RawArgs::try_parse_from(["ming", "run", "teapot"]).is_err());
    }
}
