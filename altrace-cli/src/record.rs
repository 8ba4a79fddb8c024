//! `altrace record`: the CLI's thin interface to the
//! `altrace-record-preload` shim (SPEC_FULL.md §12). This sets the
//! preload environment variable and execs the target program; everything
//! about *what* gets recorded lives in `altrace-record`/
//! `altrace-record-preload`, not here.

use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(target_os = "macos")]
use crate::mac as platform;
#[cfg(any(target_os = "linux", target_os = "android"))]
use crate::linux as platform;

use crate::cli::RecordArgs;

const PRELOAD_LIB_ENV_VAR: &str = "ALTRACE_PRELOAD_LIB";
const FILENAME_ENV_VAR: &str = "ALTRACE_FILENAME";

#[cfg(any(target_os = "macos", target_os = "linux", target_os = "android"))]
fn resolve_preload_lib(explicit: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(PRELOAD_LIB_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .ok_or("could not determine the directory this binary runs from")?;
    let candidate = exe_dir.join(platform::default_lib_filename());
    if candidate.exists() {
        return Ok(candidate);
    }
    Err(format!(
        "could not find {} next to this binary; pass --preload-lib or set {PRELOAD_LIB_ENV_VAR}",
        platform::default_lib_filename()
    ))
}

#[cfg(any(target_os = "macos", target_os = "linux", target_os = "android"))]
pub fn run(args: RecordArgs) -> i32 {
    let preload_lib = match resolve_preload_lib(args.preload_lib) {
        Ok(path) => path,
        Err(msg) => {
            eprintln!("altrace record: {msg}");
            return 1;
        }
    };

    let program = &args.command[0];
    let rest = &args.command[1..];

    log::debug!("altrace record: preloading {}", preload_lib.display());
    let status = Command::new(program)
        .args(rest)
        .env(platform::PRELOAD_ENV_VAR, &preload_lib)
        .env(FILENAME_ENV_VAR, &args.output)
        .status();

    match status {
        Ok(status) => status.code().unwrap_or(0),
        Err(err) => {
            eprintln!("altrace record: could not launch {:?}: {err}", program);
            1
        }
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "android")))]
pub fn run(_args: RecordArgs) -> i32 {
    eprintln!("altrace record: preloading is only supported on macOS and Linux");
    1
}
