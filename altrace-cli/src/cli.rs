//! Command-line surface (SPEC_FULL.md §12), structured the way
//! `samply::cli::Opt` lays out a top-level [`Parser`] over a
//! [`Subcommand`] enum with `#[command(flatten)]`-shared argument groups.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "altrace",
    version,
    about = r#"
altrace traces calls into an OpenAL-like 3D audio API.

EXAMPLES:
    # Record a trace of a program's OpenAL calls:
    altrace record -o session.altrace -- ./yourgame

    # Print every event in a trace, one line each:
    altrace dump session.altrace

    # Summarize a trace: counts per event, symbol economy, total span:
    altrace stats session.altrace
"#
)]
pub struct Opt {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Decode a trace and print one line per event.
    Dump(DumpArgs),

    /// Aggregate counts and summary statistics over a trace.
    Stats(StatsArgs),

    /// Record a trace of a freshly launched program.
    Record(RecordArgs),
}

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Path to the trace file to decode.
    pub file: PathBuf,

    /// Only print events from this dense thread id (see `stats` for the
    /// id each raw thread was assigned).
    #[arg(long)]
    pub thread: Option<u32>,

    /// Skip ahead to the event starting at this byte offset.
    #[arg(long, default_value = "0")]
    pub from_offset: u64,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Path to the trace file to summarize.
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Output trace file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to the built `altrace-record-preload` shared library. Defaults
    /// to `ALTRACE_PRELOAD_LIB` if set, or a path relative to this binary
    /// otherwise.
    #[arg(long)]
    pub preload_lib: Option<PathBuf>,

    /// Program to run, and its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<OsString>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Opt::command().debug_assert();
    }

    #[test]
    fn dump_parses_thread_and_offset() {
        let opt = Opt::parse_from(["altrace", "dump", "session.altrace", "--thread", "2", "--from-offset", "64"]);
        let Action::Dump(args) = opt.action else { panic!("expected Dump") };
        assert_eq!(args.file, PathBuf::from("session.altrace"));
        assert_eq!(args.thread, Some(2));
        assert_eq!(args.from_offset, 64);
    }

    #[test]
    fn record_collects_trailing_command() {
        let opt = Opt::parse_from(["altrace", "record", "-o", "out.altrace", "--", "./game", "--fullscreen"]);
        let Action::Record(args) = opt.action else { panic!("expected Record") };
        assert_eq!(args.output, PathBuf::from("out.altrace"));
        assert_eq!(args.command, vec![OsString::from("./game"), OsString::from("--fullscreen")]);
    }
}
