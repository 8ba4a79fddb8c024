use thiserror::Error;

/// The error type returned by fallible, non-fatal `Recorder` operations.
///
/// Most failure modes in the recorder are *not* represented here: a failed
/// trace-file write is recorder-fatal and exits the process directly
/// (`recorder_fatal`), matching the original's `IO_WRITE_FAIL`/`out_of_memory`
/// behavior. This enum covers the smaller set of errors that a caller can
/// meaningfully react to, such as opening the trace file in the first place.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("failed to open trace file {path:?}: {source}")]
    OpenTraceFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("wire encode error: {0}")]
    Wire(#[from] altrace_wire::WireError),
}

pub type RecorderResult<T> = Result<T, RecorderError>;

/// Unconditionally terminates the process with the same exit code the
/// original recorder used for an unrecoverable I/O failure or allocation
/// failure: 42. Called only from contexts where returning an error would
/// leave the trace file in a state no reader could make sense of.
pub fn recorder_fatal(msg: &str) -> ! {
    log::error!("altrace recorder: fatal: {msg}");
    std::process::exit(42);
}
