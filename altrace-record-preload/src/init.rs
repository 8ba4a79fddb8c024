//! Process constructor/destructor and trace-file naming (§5, §6).
//!
//! Runs as early and as late as possible in the traced process's
//! lifetime, the same way `init_altrace_record`/`quit_altrace_record` did
//! as GCC `__attribute__((constructor))`/`(destructor))` functions: this
//! crate gets there with the constructor-section trick
//! `samply-mac-preload` uses (there taken from the `neon` bindings crate),
//! extended to the ELF `.init_array` section so the same shim works under
//! both `LD_PRELOAD` and `DYLD_INSERT_LIBRARIES`.

use std::env;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;

/// If set, names the trace file directly — the `altrace record` CLI sets
/// this so the file ends up exactly where `-o` asked for, bypassing the
/// numbered-suffix collision search below.
const FILENAME_ENV: &str = "ALTRACE_FILENAME";

pub fn init_logging() {
    let mut builder = env_logger::Builder::new();
    if let Ok(level) = env::var("ALTRACE_LOG_LEVEL") {
        builder.parse_filters(&level);
    } else {
        builder.filter_level(log::LevelFilter::Warn);
    }
    let _ = builder.try_init();
}

fn process_name() -> String {
    env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "MyOpenALProgram".to_string())
}

/// Picks a trace file name: `<procname>.altrace`, or `<procname>.N.altrace`
/// for the first `N` that doesn't collide with an existing file (§6).
fn choose_tracefile_name() -> PathBuf {
    let procname = process_name();
    let first = PathBuf::from(format!("{procname}.altrace"));
    if !first.exists() {
        return first;
    }
    let mut n = 1u32;
    loop {
        let candidate = PathBuf::from(format!("{procname}.{n}.altrace"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Opens the trace file the recorder will write to: truncating if it
/// already exists, matching the original's `O_WRONLY | O_TRUNC | O_CREAT`
/// open, since `ALTRACE_FILENAME` (set by the `altrace record` CLI) is
/// expected to point at a path the caller already owns.
pub fn open_trace_file() -> std::io::Result<File> {
    let path = match env::var(FILENAME_ENV) {
        Ok(path) => PathBuf::from(path),
        Err(_) => choose_tracefile_name(),
    };
    log::info!("altrace: recording to {}", path.display());
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

/// Runs as early as possible, before any AL/ALC call the host process
/// makes can reach this shim's wrappers uninitialized (§5: "the recorder's
/// constructor must run before `main`").
#[used]
#[allow(non_upper_case_globals)]
#[cfg_attr(target_os = "macos", link_section = "__DATA,__mod_init_func")]
#[cfg_attr(target_os = "linux", link_section = ".init_array")]
static ALTRACE_INIT_CTOR: unsafe extern "C" fn() = {
    unsafe extern "C" fn ctor() {
        crate::startup();
    }
    ctor
};

/// Runs at normal process exit (`atexit`-style, via the destructor
/// section), writing the EOS marker the way `quit_altrace_record` did
/// before closing the log. `_exit` is overridden separately (`lib.rs`)
/// since it bypasses this path entirely (§5 "Exit-path interception").
#[used]
#[allow(non_upper_case_globals)]
#[cfg_attr(target_os = "macos", link_section = "__DATA,__mod_term_func")]
#[cfg_attr(target_os = "linux", link_section = ".fini_array")]
static ALTRACE_INIT_DTOR: unsafe extern "C" fn() = {
    unsafe extern "C" fn dtor() {
        crate::shutdown(true);
    }
    dtor
};
