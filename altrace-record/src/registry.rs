//! Shadow object registry (§4.1, §4.6, §9 "per-context source arena").
//!
//! `altrace_record.c` keyed its device/context/source/buffer hash tables by
//! `name & 0xFF` into 256 intrusive, doubly-linked buckets, because C has no
//! built-in associative container. Rust does, so this module keeps the
//! registry's *behavior* — O(1) lookup by handle/name, insertion and
//! removal order that doesn't matter, a per-context playlist of sources
//! currently `PLAYING` for the detector to poll (§4.5, §9) — and drops the
//! bucket-hashing mechanism itself in favor of `FxHashMap`, the same map
//! `fxprof-processed-profile`'s `StringTable` reaches for.

use altrace_wire::SourceState;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct DeviceRecord {
    pub label: Option<String>,
    pub is_capture: bool,
    /// Whether the real driver exposes `ALC_EXT_disconnect` for this
    /// device, learned once at open time (§3 "whether the real driver
    /// exposes a disconnect extension"). Gates which half of the
    /// detector's per-device poll (§4.5) applies.
    pub supports_disconnect: bool,
    /// Shadow of `ALC_CONNECTED`, the one ALC device query the original
    /// treats as boolean rather than integer (§4.5).
    pub connected: Option<bool>,
    pub int_state: FxHashMap<i32, Vec<i32>>,
}

#[derive(Debug, Clone, Default)]
pub struct ContextRecord {
    pub device: u64,
    pub label: Option<String>,
    /// Sources in this context currently believed to be `PLAYING`, polled
    /// by the detector every wrapped call (§4.5, §9).
    pub playlist: FxHashSet<u32>,
    pub enum_state: FxHashMap<i32, i32>,
    pub float_state: FxHashMap<i32, u32>,
    pub string_state: FxHashMap<i32, Option<String>>,
    /// Whether the vendor/renderer/version/extensions static-state query
    /// (§3 "static-state-queried flag", §4.5) has already run for this
    /// context. Set the first time the context becomes current; never
    /// cleared, since the query never repeats for a given context.
    pub static_state_queried: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SourceRecord {
    pub context: u64,
    pub label: Option<String>,
    pub state: Option<SourceState>,
    pub bool_state: FxHashMap<i32, bool>,
    pub enum_state: FxHashMap<i32, i32>,
    pub float_state: FxHashMap<i32, u32>,
    pub float3_state: FxHashMap<i32, [u32; 3]>,
    pub int_state: FxHashMap<i32, i32>,
    pub uint_state: FxHashMap<i32, u32>,
}

#[derive(Debug, Clone, Default)]
pub struct BufferRecord {
    pub label: Option<String>,
    pub int_state: FxHashMap<i32, i32>,
}

/// Listener state lives outside any per-object record: there is exactly one
/// listener per context in OpenAL, and it has no handle of its own (§4.1).
#[derive(Debug, Clone, Default)]
pub struct ListenerState {
    pub float_vectors: FxHashMap<i32, Vec<u32>>,
}

#[derive(Default)]
pub struct Registry {
    pub devices: FxHashMap<u64, DeviceRecord>,
    pub contexts: FxHashMap<u64, ContextRecord>,
    pub sources: FxHashMap<u32, SourceRecord>,
    pub buffers: FxHashMap<u32, BufferRecord>,
    pub listener: FxHashMap<u64, ListenerState>,
    pub current_context: Option<u64>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_device(&mut self, handle: u64, is_capture: bool) {
        self.devices.insert(
            handle,
            DeviceRecord {
                is_capture,
                ..Default::default()
            },
        );
    }

    pub fn remove_device(&mut self, handle: u64) {
        self.devices.remove(&handle);
    }

    /// Records whether `handle` supports `ALC_EXT_disconnect`, learned by
    /// the caller once at device-open time (§3, §4.5).
    pub fn set_supports_disconnect(&mut self, handle: u64, supported: bool) {
        if let Some(rec) = self.devices.get_mut(&handle) {
            rec.supports_disconnect = supported;
        }
    }

    /// Handles of contexts belonging to `device`, in a stable order.
    pub fn contexts_for_device(&self, device: u64) -> Vec<u64> {
        let mut v: Vec<u64> = self
            .contexts
            .iter()
            .filter(|(_, rec)| rec.device == device)
            .map(|(&handle, _)| handle)
            .collect();
        v.sort_unstable();
        v
    }

    pub fn insert_context(&mut self, handle: u64, device: u64) {
        self.contexts.insert(
            handle,
            ContextRecord {
                device,
                ..Default::default()
            },
        );
        self.listener.insert(handle, ListenerState::default());
    }

    pub fn remove_context(&mut self, handle: u64) {
        self.contexts.remove(&handle);
        self.listener.remove(&handle);
        if self.current_context == Some(handle) {
            self.current_context = None;
        }
    }

    pub fn insert_source(&mut self, name: u32, context: u64) {
        self.sources.insert(
            name,
            SourceRecord {
                context,
                state: Some(SourceState::Initial),
                ..Default::default()
            },
        );
    }

    pub fn remove_source(&mut self, name: u32) {
        if let Some(rec) = self.sources.remove(&name) {
            if let Some(ctx) = self.contexts.get_mut(&rec.context) {
                ctx.playlist.remove(&name);
            }
        }
    }

    pub fn insert_buffer(&mut self, name: u32) {
        self.buffers.insert(name, BufferRecord::default());
    }

    pub fn remove_buffer(&mut self, name: u32) {
        self.buffers.remove(&name);
    }

    /// Adds `source` to its context's playlist if it is now `PLAYING`,
    /// removes it otherwise. Called by the detector every time a source's
    /// cached state transitions (§4.5).
    pub fn sync_playlist(&mut self, source: u32) {
        let Some(rec) = self.sources.get(&source) else {
            return;
        };
        let context = rec.context;
        let playing = rec.state == Some(SourceState::Playing);
        if let Some(ctx) = self.contexts.get_mut(&context) {
            if playing {
                ctx.playlist.insert(source);
            } else {
                ctx.playlist.remove(&source);
            }
        }
    }

    /// The sources the detector should poll for this context, in a stable
    /// order (§4.5, §9).
    pub fn playlist_for(&self, context: u64) -> Vec<u32> {
        match self.contexts.get(&context) {
            Some(ctx) => {
                let mut v: Vec<u32> = ctx.playlist.iter().copied().collect();
                v.sort_unstable();
                v
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_tracks_playing_sources_only() {
        let mut reg = Registry::new();
        reg.insert_context(1, 0xd);
        reg.insert_source(10, 1);
        reg.insert_source(11, 1);

        reg.sources.get_mut(&10).unwrap().state = Some(SourceState::Playing);
        reg.sync_playlist(10);
        assert_eq!(reg.playlist_for(1), vec![10]);

        reg.sources.get_mut(&11).unwrap().state = Some(SourceState::Playing);
        reg.sync_playlist(11);
        assert_eq!(reg.playlist_for(1), vec![10, 11]);

        reg.sources.get_mut(&10).unwrap().state = Some(SourceState::Stopped);
        reg.sync_playlist(10);
        assert_eq!(reg.playlist_for(1), vec![11]);
    }

    #[test]
    fn removing_a_source_drops_it_from_the_playlist() {
        let mut reg = Registry::new();
        reg.insert_context(1, 0xd);
        reg.insert_source(10, 1);
        reg.sources.get_mut(&10).unwrap().state = Some(SourceState::Playing);
        reg.sync_playlist(10);
        assert_eq!(reg.playlist_for(1), vec![10]);

        reg.remove_source(10);
        assert!(reg.playlist_for(1).is_empty());
    }
}
