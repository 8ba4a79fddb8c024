//! Interception-time recorder (§4.1-§4.7, §5, §9).
//!
//! This crate owns everything that happens while a process is being
//! traced: the shadow object registry, the lazily-symbolicating call-stack
//! collector, the state-change detector, and the `Recorder` itself, which
//! turns a wrapped call into the event stream `altrace-wire` defines. It
//! has no global state and no process-wide mutex — those live in
//! `altrace-record-preload`, the thing that actually sits between a
//! process and `libopenal`.

mod callstack;
mod detector;
mod error;
mod recorder;
mod registry;

pub use callstack::{CallstackCollector, CapturedCallstack};
pub use error::{recorder_fatal, RecorderError, RecorderResult};
pub use recorder::{Recorder, StateSource};
pub use registry::{BufferRecord, ContextRecord, DeviceRecord, ListenerState, Registry, SourceRecord};
