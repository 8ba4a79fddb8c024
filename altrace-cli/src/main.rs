#[cfg(target_os = "macos")]
mod mac;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;

mod cli;
mod dump;
mod record;
mod stats;

use std::fs::File;
use std::io::BufReader;

use clap::Parser;

use altrace_play::PlayResult;
use cli::{Action, DumpArgs, Opt, StatsArgs};
use dump::DumpVisitor;
use stats::StatsVisitor;

fn main() {
    env_logger::init();

    let opt = Opt::parse();
    let exit_code = match opt.action {
        Action::Dump(args) => do_dump(args),
        Action::Stats(args) => do_stats(args),
        Action::Record(args) => record::run(args),
    };
    std::process::exit(exit_code);
}

fn open_trace(path: &std::path::Path) -> Option<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Some(BufReader::new(file)),
        Err(err) => {
            eprintln!("altrace: could not open {}: {err}", path.display());
            None
        }
    }
}

fn do_dump(args: DumpArgs) -> i32 {
    let Some(file) = open_trace(&args.file) else {
        return 1;
    };
    let mut visitor = DumpVisitor::new(args.thread, args.from_offset);
    match altrace_play::play(file, &mut visitor) {
        Ok(PlayResult::Clean) => 0,
        Ok(PlayResult::Cancelled) => 0,
        Ok(PlayResult::Fatal(e)) => {
            eprintln!("altrace dump: trace ended early: {e}");
            1
        }
        Err(e) => {
            eprintln!("altrace dump: {e}");
            1
        }
    }
}

fn do_stats(args: StatsArgs) -> i32 {
    let Some(file) = open_trace(&args.file) else {
        return 1;
    };
    let mut visitor = StatsVisitor::new();
    let outcome = altrace_play::play(file, &mut visitor);

    println!("events by tag:");
    let mut tags: Vec<_> = visitor.events_by_tag.iter().collect();
    tags.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (tag, count) in tags {
        println!("  {tag:<28} {count}");
    }
    println!("threads seen: {}", visitor.max_thread_id);
    println!("wall-clock span: {}ms", visitor.max_timestamp_ms);
    println!(
        "symbol economy: {} frames, {} distinct symbols, {} unresolved",
        visitor.total_frames,
        visitor.distinct_symbols.len(),
        visitor.unresolved_frames
    );
    println!("clean eos: {}", visitor.clean_eos);

    match outcome {
        Ok(PlayResult::Fatal(e)) => {
            eprintln!("altrace stats: trace ended early: {e}");
            1
        }
        Err(e) => {
            eprintln!("altrace stats: {e}");
            1
        }
        Ok(_) => 0,
    }
}
