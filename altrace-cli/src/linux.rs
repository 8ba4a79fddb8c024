//! Linux specifics for the `record` subcommand (mirrors `samply`'s
//! `mac`/`linux` module split).

pub const PRELOAD_ENV_VAR: &str = "LD_PRELOAD";

pub fn default_lib_filename() -> &'static str {
    "libaltrace_record_preload.so"
}
