//! The event emitter (§4.4): turns a wrapped OpenAL/ALC call into trace
//! events, following the nine-step template `altrace_record.c`'s
//! `IO_START`/`IO_END` macros implemented:
//!
//! 1. capture a timestamp
//! 2. capture the calling thread's raw id
//! 3. capture (and lazily symbolicate) the call stack
//! 4. emit `new-callstack-symbols` for any address not seen before
//! 5. emit the call's own tag and caller-info header
//! 6. the call site writes the call's argument payload
//! 7. the call site makes the real API call and writes its result payload
//! 8. check and latch the real implementation's error state
//! 9. poll for and emit any state changes the call may have caused
//!
//! `Recorder` carries no mutex of its own. The caller — the preload shim's
//! process-wide lock, or a test holding `&mut` — is responsible for
//! serializing calls (§5 "process-wide API mutex"): step 9 assumes nothing
//! else mutates the registry between steps.

use std::io::Write;
use std::time::Instant;

use altrace_openal_sys::{AL_NO_ERROR, ALC_NO_ERROR};
use altrace_wire::{write_caller_info, write_header, CallerInfo, EventTag, SourceState, Writer};
use rustc_hash::FxHashMap;

use crate::callstack::CallstackCollector;
use crate::detector;
use crate::error::RecorderResult;
use crate::registry::Registry;

/// `alDistanceModel`/`alDopplerFactor`/`alDopplerVelocity`/`alSpeedOfSound`
/// take no param enum of their own (unlike the `alGet*` family), so the
/// shadow keys used to diff them are synthetic, chosen outside the real
/// ALenum value space to avoid ever colliding with one.
const ALC_DISTANCE_MODEL_KEY: i32 = -1;
const DOPPLER_FACTOR_KEY: i32 = -2;
const DOPPLER_VELOCITY_KEY: i32 = -3;
const SPEED_OF_SOUND_KEY: i32 = -4;
const ALC_CAPTURE_SAMPLES_KEY: i32 = -5;

/// The real-API queries the detector's tail-of-call poll (§4.5) needs,
/// independent of whatever the triggering call's own arguments happened
/// to touch. A caller (the preload shim) implements this over its
/// resolved `Real` function table; tests implement it over a fake.
pub trait StateSource {
    fn device_connected(&self, device: u64) -> bool;
    fn device_capture_samples(&self, device: u64) -> i32;
    fn source_state(&self, source: u32) -> SourceState;
}

#[cfg(unix)]
fn raw_thread_id() -> u64 {
    unsafe { libc::pthread_self() as u64 }
}

#[cfg(not(unix))]
fn raw_thread_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}

pub struct Recorder<W: Write> {
    writer: Writer<W>,
    callstacks: CallstackCollector,
    pub registry: Registry,
    start: Instant,
    trace_scope: u32,
}

impl<W: Write> Recorder<W> {
    pub fn new(inner: W) -> RecorderResult<Self> {
        let mut writer = Writer::new(inner);
        write_header(&mut writer)?;
        Ok(Self {
            writer,
            callstacks: CallstackCollector::new(),
            registry: Registry::new(),
            start: Instant::now(),
            trace_scope: 0,
        })
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    pub fn flush(&mut self) -> RecorderResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn elapsed_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn write_tag(&mut self, tag: EventTag) -> RecorderResult<()> {
        self.writer.write_u32(tag.to_u32())?;
        Ok(())
    }

    /// Steps 1-5: timestamp, thread id, call-stack capture and lazy
    /// symbolication, then the event's own tag and caller-info header.
    fn begin_call(&mut self, tag: EventTag) -> RecorderResult<()> {
        let captured = self.callstacks.capture();
        if !captured.new_symbols.is_empty() {
            self.write_tag(EventTag::NewCallstackSyms)?;
            self.writer.write_u32(captured.new_symbols.len() as u32)?;
            for (addr, name) in &captured.new_symbols {
                self.writer.write_ptr(*addr)?;
                self.writer.write_string(name.as_deref())?;
            }
        }
        self.write_tag(tag)?;
        let info = CallerInfo {
            timestamp_ms: self.elapsed_ms(),
            raw_thread_id: raw_thread_id(),
            stack: captured.addrs,
            trace_scope: self.trace_scope,
        };
        write_caller_info(&mut self.writer, &info)?;
        Ok(())
    }

    /// Step 8 for AL-scoped errors (`alGetError`).
    fn check_al_error(&mut self, err: i32) -> RecorderResult<()> {
        if err != AL_NO_ERROR {
            self.write_tag(EventTag::AlErrorTriggered)?;
            self.writer.write_i32(err)?;
        }
        Ok(())
    }

    /// Step 8 for ALC-scoped errors (`alcGetError`).
    fn check_alc_error(&mut self, device: u64, err: i32) -> RecorderResult<()> {
        if err != ALC_NO_ERROR {
            self.write_tag(EventTag::AlcErrorTriggered)?;
            self.writer.write_ptr(device)?;
            self.writer.write_i32(err)?;
        }
        Ok(())
    }

    // ---- labels & diagnostics (§4.3, §6 extensions) ----

    pub fn label_device(&mut self, device: u64, label: Option<&str>) -> RecorderResult<()> {
        self.begin_call(EventTag::TraceDeviceLabel)?;
        self.writer.write_ptr(device)?;
        self.writer.write_string(label)?;
        if let Some(rec) = self.registry.devices.get_mut(&device) {
            rec.label = label.map(str::to_string);
        }
        self.flush()
    }

    pub fn label_context(&mut self, context: u64, label: Option<&str>) -> RecorderResult<()> {
        self.begin_call(EventTag::TraceContextLabel)?;
        self.writer.write_ptr(context)?;
        self.writer.write_string(label)?;
        if let Some(rec) = self.registry.contexts.get_mut(&context) {
            rec.label = label.map(str::to_string);
        }
        self.flush()
    }

    pub fn label_source(&mut self, source: u32, label: Option<&str>) -> RecorderResult<()> {
        self.begin_call(EventTag::TraceSourceLabel)?;
        self.writer.write_u32(source)?;
        self.writer.write_string(label)?;
        if let Some(rec) = self.registry.sources.get_mut(&source) {
            rec.label = label.map(str::to_string);
        }
        self.flush()
    }

    pub fn label_buffer(&mut self, buffer: u32, label: Option<&str>) -> RecorderResult<()> {
        self.begin_call(EventTag::TraceBufferLabel)?;
        self.writer.write_u32(buffer)?;
        self.writer.write_string(label)?;
        if let Some(rec) = self.registry.buffers.get_mut(&buffer) {
            rec.label = label.map(str::to_string);
        }
        self.flush()
    }

    pub fn trace_message(&mut self, msg: &str) -> RecorderResult<()> {
        self.begin_call(EventTag::TraceMessage)?;
        self.writer.write_string(Some(msg))?;
        self.flush()
    }

    /// Pushes a named scope. `trace_scope` itself is a plain counter (§14
    /// design note: the scope stack has no event of its own, just a depth
    /// carried in every subsequent caller-info header).
    pub fn push_scope(&mut self, name: &str) -> RecorderResult<()> {
        self.begin_call(EventTag::TracePushScope)?;
        self.writer.write_string(Some(name))?;
        self.trace_scope += 1;
        self.flush()
    }

    pub fn pop_scope(&mut self) -> RecorderResult<()> {
        self.begin_call(EventTag::TracePopScope)?;
        self.trace_scope = self.trace_scope.saturating_sub(1);
        self.flush()
    }

    // ---- ALC device/context lifecycle and queries ----

    pub fn alc_open_device(&mut self, name: Option<&str>, device: u64) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcOpenDevice)?;
        self.writer.write_string(name)?;
        self.writer.write_ptr(device)?;
        if device != 0 {
            self.registry.insert_device(device, false);
        }
        self.flush()
    }

    pub fn alc_close_device(&mut self, device: u64, success: bool, alc_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcCloseDevice)?;
        self.writer.write_ptr(device)?;
        self.writer.write_bool(success)?;
        self.check_alc_error(device, alc_err)?;
        if success {
            self.registry.remove_device(device);
        }
        self.flush()
    }

    pub fn alc_capture_open_device(
        &mut self,
        name: Option<&str>,
        frequency: u32,
        format: i32,
        buffersize: i32,
        device: u64,
    ) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcCaptureOpenDevice)?;
        self.writer.write_string(name)?;
        self.writer.write_u32(frequency)?;
        self.writer.write_i32(format)?;
        self.writer.write_i32(buffersize)?;
        self.writer.write_ptr(device)?;
        if device != 0 {
            self.registry.insert_device(device, true);
        }
        self.flush()
    }

    pub fn alc_capture_close_device(
        &mut self,
        device: u64,
        success: bool,
        alc_err: i32,
    ) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcCaptureCloseDevice)?;
        self.writer.write_ptr(device)?;
        self.writer.write_bool(success)?;
        self.check_alc_error(device, alc_err)?;
        if success {
            self.registry.remove_device(device);
        }
        self.flush()
    }

    pub fn alc_capture_start(&mut self, device: u64, alc_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcCaptureStart)?;
        self.writer.write_ptr(device)?;
        self.check_alc_error(device, alc_err)?;
        self.flush()
    }

    pub fn alc_capture_stop(&mut self, device: u64, alc_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcCaptureStop)?;
        self.writer.write_ptr(device)?;
        self.check_alc_error(device, alc_err)?;
        self.flush()
    }

    pub fn alc_capture_samples(&mut self, device: u64, samples: i32, alc_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcCaptureSamples)?;
        self.writer.write_ptr(device)?;
        self.writer.write_i32(samples)?;
        self.check_alc_error(device, alc_err)?;
        self.flush()
    }

    pub fn alc_create_context(
        &mut self,
        device: u64,
        attrs: &[i32],
        context: u64,
        alc_err: i32,
    ) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcCreateContext)?;
        self.writer.write_ptr(device)?;
        self.writer.write_i32_array(attrs)?;
        self.writer.write_ptr(context)?;
        self.check_alc_error(device, alc_err)?;
        if context != 0 {
            self.registry.insert_context(context, device);
        }
        self.flush()
    }

    pub fn alc_destroy_context(&mut self, context: u64) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcDestroyContext)?;
        self.writer.write_ptr(context)?;
        self.registry.remove_context(context);
        self.flush()
    }

    pub fn alc_make_context_current(&mut self, context: u64, success: bool) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcMakeContextCurrent)?;
        self.writer.write_ptr(context)?;
        self.writer.write_bool(success)?;
        if success {
            self.registry.current_context = if context == 0 { None } else { Some(context) };
        }
        self.flush()
    }

    /// Fetches and emits the four vendor/renderer/version/extensions
    /// static-state strings for `context`, but only the first time this
    /// context becomes current (§3 "static-state-queried flag", §4.5
    /// "Context static state ... fetched once per context, the first time
    /// that context becomes current, and emitted as four
    /// *context-state-changed-string* events; it is never re-polled").
    /// A no-op if `context` already ran this query or isn't known (e.g.
    /// `alcMakeContextCurrent(NULL, ...)`). The caller queries the real
    /// `alGetString` for each param only after the real
    /// `alcMakeContextCurrent` succeeded, since these are AL-scoped queries
    /// of the now-current context.
    pub fn context_static_state(
        &mut self,
        context: u64,
        vendor: Option<&str>,
        version: Option<&str>,
        renderer: Option<&str>,
        extensions: Option<&str>,
    ) -> RecorderResult<()> {
        match self.registry.contexts.get_mut(&context) {
            Some(rec) if !rec.static_state_queried => rec.static_state_queried = true,
            _ => return Ok(()),
        }
        for (param, value) in [
            (altrace_openal_sys::AL_VENDOR, vendor),
            (altrace_openal_sys::AL_RENDERER, renderer),
            (altrace_openal_sys::AL_VERSION, version),
            (altrace_openal_sys::AL_EXTENSIONS, extensions),
        ] {
            if let Some(rec) = self.registry.contexts.get_mut(&context) {
                rec.string_state.insert(param, value.map(str::to_string));
            }
            self.write_tag(EventTag::ContextStateChangedString)?;
            self.writer.write_ptr(context)?;
            self.writer.write_i32(param)?;
            self.writer.write_string(value)?;
        }
        self.flush()
    }

    pub fn alc_get_current_context(&mut self, context: u64) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcGetCurrentContext)?;
        self.writer.write_ptr(context)?;
        self.flush()
    }

    pub fn alc_get_contexts_device(&mut self, context: u64, device: u64) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcGetContextsDevice)?;
        self.writer.write_ptr(context)?;
        self.writer.write_ptr(device)?;
        self.flush()
    }

    pub fn alc_get_error(&mut self, device: u64, err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcGetError)?;
        self.writer.write_ptr(device)?;
        self.writer.write_i32(err)?;
        self.flush()
    }

    /// Also performs step 9 for this device's integer state (e.g.
    /// `ALC_CAPTURE_SAMPLES` polled opportunistically whenever it's
    /// queried), emitting `device-state-changed-int` on a diff.
    pub fn alc_get_integerv(
        &mut self,
        device: u64,
        param: i32,
        values: &[i32],
        alc_err: i32,
    ) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcGetIntegerv)?;
        self.writer.write_ptr(device)?;
        self.writer.write_i32(param)?;
        self.writer.write_i32_array(values)?;
        self.check_alc_error(device, alc_err)?;

        if param == altrace_openal_sys::ALC_CONNECTED && values.len() == 1 {
            let new_connected = values[0] != 0;
            if let Some(rec) = self.registry.devices.get_mut(&device) {
                if rec.connected != Some(new_connected) {
                    rec.connected = Some(new_connected);
                    self.write_tag(EventTag::DeviceStateChangedBool)?;
                    self.writer.write_ptr(device)?;
                    self.writer.write_i32(param)?;
                    self.writer.write_bool(new_connected)?;
                }
            }
        } else {
            let changed = self
                .registry
                .devices
                .get_mut(&device)
                .and_then(|rec| detector::diff_vec(&mut rec.int_state, param, values));
            if let Some(new_values) = changed {
                self.write_tag(EventTag::DeviceStateChangedInt)?;
                self.writer.write_ptr(device)?;
                self.writer.write_i32(param)?;
                self.writer.write_i32_array(&new_values)?;
            }
        }
        self.flush()
    }

    pub fn alc_get_string(&mut self, device: u64, param: i32, value: Option<&str>) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcGetString)?;
        self.writer.write_ptr(device)?;
        self.writer.write_i32(param)?;
        self.writer.write_string(value)?;
        self.flush()
    }

    pub fn alc_is_extension_present(
        &mut self,
        device: u64,
        extname: &str,
        present: bool,
    ) -> RecorderResult<()> {
        self.begin_call(EventTag::AlcIsExtensionPresent)?;
        self.writer.write_ptr(device)?;
        self.writer.write_string(Some(extname))?;
        self.writer.write_bool(present)?;
        self.flush()
    }

    // ---- AL buffers ----

    pub fn al_gen_buffers(&mut self, buffers: &[u32]) -> RecorderResult<()> {
        self.begin_call(EventTag::AlGenBuffers)?;
        self.writer.write_u32_array(buffers)?;
        for &name in buffers {
            self.registry.insert_buffer(name);
        }
        self.check_al_error(0)?;
        self.flush()
    }

    pub fn al_delete_buffers(&mut self, buffers: &[u32], al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlDeleteBuffers)?;
        self.writer.write_u32_array(buffers)?;
        self.check_al_error(al_err)?;
        if al_err == AL_NO_ERROR {
            for &name in buffers {
                self.registry.remove_buffer(name);
            }
        }
        self.flush()
    }

    pub fn al_buffer_data(
        &mut self,
        buffer: u32,
        format: i32,
        data: Option<&[u8]>,
        size: i32,
        freq: i32,
        al_err: i32,
    ) -> RecorderResult<()> {
        self.begin_call(EventTag::AlBufferData)?;
        self.writer.write_u32(buffer)?;
        self.writer.write_i32(format)?;
        self.writer.write_blob(data)?;
        self.writer.write_i32(size)?;
        self.writer.write_i32(freq)?;
        self.check_al_error(al_err)?;
        self.flush()
    }

    pub fn al_get_bufferi(&mut self, buffer: u32, param: i32, value: i32, al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlGetBufferi)?;
        self.writer.write_u32(buffer)?;
        self.writer.write_i32(param)?;
        self.writer.write_i32(value)?;
        self.check_al_error(al_err)?;

        let changed = self
            .registry
            .buffers
            .get_mut(&buffer)
            .and_then(|rec| detector::diff_scalar(&mut rec.int_state, param, value));
        if let Some(new_value) = changed {
            self.write_tag(EventTag::BufferStateChangedInt)?;
            self.writer.write_u32(buffer)?;
            self.writer.write_i32(param)?;
            self.writer.write_i32(new_value)?;
        }
        self.flush()
    }

    // ---- AL sources ----

    pub fn al_gen_sources(&mut self, sources: &[u32]) -> RecorderResult<()> {
        self.begin_call(EventTag::AlGenSources)?;
        self.writer.write_u32_array(sources)?;
        let context = self.registry.current_context.unwrap_or(0);
        for &name in sources {
            self.registry.insert_source(name, context);
        }
        self.check_al_error(0)?;
        self.flush()
    }

    pub fn al_delete_sources(&mut self, sources: &[u32], al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlDeleteSources)?;
        self.writer.write_u32_array(sources)?;
        self.check_al_error(al_err)?;
        if al_err == AL_NO_ERROR {
            for &name in sources {
                self.registry.remove_source(name);
            }
        }
        self.flush()
    }

    pub fn al_sourcei(&mut self, source: u32, param: i32, value: i32, al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlSourcei)?;
        self.writer.write_u32(source)?;
        self.writer.write_i32(param)?;
        self.writer.write_i32(value)?;
        self.check_al_error(al_err)?;
        self.flush()
    }

    pub fn al_sourcefv(&mut self, source: u32, param: i32, values: &[f32], al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlSourcefv)?;
        self.writer.write_u32(source)?;
        self.writer.write_i32(param)?;
        self.writer.write_f32_array(values)?;
        self.check_al_error(al_err)?;

        if values.len() == 3 {
            let triple = [values[0], values[1], values[2]];
            let changed = self
                .registry
                .sources
                .get_mut(&source)
                .and_then(|rec| detector::diff_f32x3(&mut rec.float3_state, param, triple));
            if let Some(new_values) = changed {
                self.write_tag(EventTag::SourceStateChangedFloat3)?;
                self.writer.write_u32(source)?;
                self.writer.write_i32(param)?;
                self.writer.write_f32_array(&new_values)?;
            }
        }
        self.flush()
    }

    /// Also performs step 9: `alGetSourcei` is the single entry point the
    /// real API uses to return several logically distinct param types
    /// (state enum, boolean flags, buffer-name uints, plain ints), all as
    /// `ALint`. The recorder classifies the param the same way
    /// `check_source_state` in the original did, so each gets the
    /// `*-state-changed` event that matches its real type rather than a
    /// blanket `source-state-changed-int` (§4.5, §4.7, §9).
    pub fn al_get_sourcei(&mut self, source: u32, param: i32, value: i32, al_err: i32) -> RecorderResult<()> {
        use altrace_openal_sys::{AL_BUFFER, AL_LOOPING, AL_SOURCE_RELATIVE, AL_SOURCE_STATE};

        self.begin_call(EventTag::AlGetSourcei)?;
        self.writer.write_u32(source)?;
        self.writer.write_i32(param)?;
        self.writer.write_i32(value)?;
        self.check_al_error(al_err)?;

        match param {
            AL_SOURCE_STATE => {
                if let Some(new_state) = SourceState::from_al(value) {
                    if let Some(rec) = self.registry.sources.get_mut(&source) {
                        if rec.state != Some(new_state) {
                            rec.state = Some(new_state);
                            self.registry.sync_playlist(source);
                            self.write_tag(EventTag::SourceStateChangedEnum)?;
                            self.writer.write_u32(source)?;
                            self.writer.write_i32(param)?;
                            self.writer.write_i32(new_state.to_al())?;
                        }
                    }
                }
            }
            AL_LOOPING | AL_SOURCE_RELATIVE => {
                let new_bool = value != 0;
                let changed = self
                    .registry
                    .sources
                    .get_mut(&source)
                    .and_then(|rec| detector::diff_scalar(&mut rec.bool_state, param, new_bool));
                if let Some(new_value) = changed {
                    self.write_tag(EventTag::SourceStateChangedBool)?;
                    self.writer.write_u32(source)?;
                    self.writer.write_i32(param)?;
                    self.writer.write_bool(new_value)?;
                }
            }
            AL_BUFFER => {
                let new_uint = value as u32;
                let changed = self
                    .registry
                    .sources
                    .get_mut(&source)
                    .and_then(|rec| detector::diff_scalar(&mut rec.uint_state, param, new_uint));
                if let Some(new_value) = changed {
                    self.write_tag(EventTag::SourceStateChangedUint)?;
                    self.writer.write_u32(source)?;
                    self.writer.write_i32(param)?;
                    self.writer.write_u32(new_value)?;
                }
            }
            _ => {
                let changed = self
                    .registry
                    .sources
                    .get_mut(&source)
                    .and_then(|rec| detector::diff_scalar(&mut rec.int_state, param, value));
                if let Some(new_value) = changed {
                    self.write_tag(EventTag::SourceStateChangedInt)?;
                    self.writer.write_u32(source)?;
                    self.writer.write_i32(param)?;
                    self.writer.write_i32(new_value)?;
                }
            }
        }
        self.flush()
    }

    pub fn al_get_sourcefv(&mut self, source: u32, param: i32, values: &[f32], al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlGetSourcefv)?;
        self.writer.write_u32(source)?;
        self.writer.write_i32(param)?;
        self.writer.write_f32_array(values)?;
        self.check_al_error(al_err)?;

        match values.len() {
            1 => {
                let changed = self
                    .registry
                    .sources
                    .get_mut(&source)
                    .and_then(|rec| detector::diff_f32(&mut rec.float_state, param, values[0]));
                if let Some(new_value) = changed {
                    self.write_tag(EventTag::SourceStateChangedFloat)?;
                    self.writer.write_u32(source)?;
                    self.writer.write_i32(param)?;
                    self.writer.write_f32(new_value)?;
                }
            }
            3 => {
                let triple = [values[0], values[1], values[2]];
                let changed = self
                    .registry
                    .sources
                    .get_mut(&source)
                    .and_then(|rec| detector::diff_f32x3(&mut rec.float3_state, param, triple));
                if let Some(new_values) = changed {
                    self.write_tag(EventTag::SourceStateChangedFloat3)?;
                    self.writer.write_u32(source)?;
                    self.writer.write_i32(param)?;
                    self.writer.write_f32_array(&new_values)?;
                }
            }
            _ => {}
        }
        self.flush()
    }

    /// `alSourcePlay`/`Pause`/`Stop`/`Rewind` each trigger a post-call
    /// re-query of `AL_SOURCE_STATE` in the original recorder; this takes
    /// the authoritative new state directly from the caller (which read it
    /// back from the real implementation) rather than computing it from
    /// `expected_transition`, which is reserved for tests asserting the
    /// real implementation's behavior against the documented oracle table.
    fn al_source_transition(
        &mut self,
        tag: EventTag,
        source: u32,
        new_state: SourceState,
        al_err: i32,
    ) -> RecorderResult<()> {
        self.begin_call(tag)?;
        self.writer.write_u32(source)?;
        self.check_al_error(al_err)?;

        if let Some(rec) = self.registry.sources.get_mut(&source) {
            if rec.state != Some(new_state) {
                rec.state = Some(new_state);
                self.registry.sync_playlist(source);
                self.write_tag(EventTag::SourceStateChangedEnum)?;
                self.writer.write_u32(source)?;
                self.writer
                    .write_i32(altrace_openal_sys::AL_SOURCE_STATE)?;
                self.writer.write_i32(new_state.to_al())?;
            }
        }
        self.flush()
    }

    pub fn al_source_play(&mut self, source: u32, new_state: SourceState, al_err: i32) -> RecorderResult<()> {
        self.al_source_transition(EventTag::AlSourcePlay, source, new_state, al_err)
    }

    pub fn al_source_pause(&mut self, source: u32, new_state: SourceState, al_err: i32) -> RecorderResult<()> {
        self.al_source_transition(EventTag::AlSourcePause, source, new_state, al_err)
    }

    pub fn al_source_stop(&mut self, source: u32, new_state: SourceState, al_err: i32) -> RecorderResult<()> {
        self.al_source_transition(EventTag::AlSourceStop, source, new_state, al_err)
    }

    pub fn al_source_rewind(&mut self, source: u32, new_state: SourceState, al_err: i32) -> RecorderResult<()> {
        self.al_source_transition(EventTag::AlSourceRewind, source, new_state, al_err)
    }

    pub fn al_source_queue_buffers(&mut self, source: u32, buffers: &[u32], al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlSourceQueueBuffers)?;
        self.writer.write_u32(source)?;
        self.writer.write_u32_array(buffers)?;
        self.check_al_error(al_err)?;
        self.flush()
    }

    pub fn al_source_unqueue_buffers(&mut self, source: u32, buffers: &[u32], al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlSourceUnqueueBuffers)?;
        self.writer.write_u32(source)?;
        self.writer.write_u32_array(buffers)?;
        self.check_al_error(al_err)?;
        self.flush()
    }

    // ---- AL listener ----

    pub fn al_listenerfv(&mut self, context: u64, param: i32, values: &[f32], al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlListenerfv)?;
        self.writer.write_i32(param)?;
        self.writer.write_f32_array(values)?;
        self.check_al_error(al_err)?;

        let changed = self
            .registry
            .listener
            .get_mut(&context)
            .and_then(|rec| detector::diff_f32_vec(&mut rec.float_vectors, param, values));
        if let Some(new_values) = changed {
            self.write_tag(EventTag::ListenerStateChangedFloatv)?;
            self.writer.write_i32(param)?;
            self.writer.write_f32_array(&new_values)?;
        }
        self.flush()
    }

    pub fn al_get_listenerfv(&mut self, param: i32, values: &[f32], al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlGetListenerfv)?;
        self.writer.write_i32(param)?;
        self.writer.write_f32_array(values)?;
        self.check_al_error(al_err)?;
        self.flush()
    }

    // ---- AL context-global state ----

    /// The context-global setters below (§4.1: "context state has no
    /// handle of its own, it belongs to whichever context is current at
    /// call time") shadow their value against the currently-current
    /// context, same as the original's `check_context_state_enum`/`_float`
    /// did against the context active when the call was made.
    fn current_context_enum_state(&mut self) -> Option<&mut FxHashMap<i32, i32>> {
        let ctx = self.registry.current_context?;
        self.registry.contexts.get_mut(&ctx).map(|rec| &mut rec.enum_state)
    }

    fn current_context_float_state(&mut self) -> Option<&mut FxHashMap<i32, u32>> {
        let ctx = self.registry.current_context?;
        self.registry.contexts.get_mut(&ctx).map(|rec| &mut rec.float_state)
    }

    pub fn al_distance_model(&mut self, model: i32, al_err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlDistanceModel)?;
        self.writer.write_i32(model)?;
        self.check_al_error(al_err)?;

        let context = self.registry.current_context;
        let changed = self
            .current_context_enum_state()
            .and_then(|state| detector::diff_scalar(state, ALC_DISTANCE_MODEL_KEY, model));
        if let (Some(new_value), Some(context)) = (changed, context) {
            self.write_tag(EventTag::ContextStateChangedEnum)?;
            self.writer.write_ptr(context)?;
            self.writer.write_i32(ALC_DISTANCE_MODEL_KEY)?;
            self.writer.write_i32(new_value)?;
        }
        self.flush()
    }

    fn al_context_float_setter(&mut self, tag: EventTag, key: i32, value: f32, al_err: i32) -> RecorderResult<()> {
        self.begin_call(tag)?;
        self.writer.write_f32(value)?;
        self.check_al_error(al_err)?;

        let context = self.registry.current_context;
        let changed = self
            .current_context_float_state()
            .and_then(|state| detector::diff_f32(state, key, value));
        if let (Some(new_value), Some(context)) = (changed, context) {
            self.write_tag(EventTag::ContextStateChangedFloat)?;
            self.writer.write_ptr(context)?;
            self.writer.write_i32(key)?;
            self.writer.write_f32(new_value)?;
        }
        self.flush()
    }

    pub fn al_doppler_factor(&mut self, value: f32, al_err: i32) -> RecorderResult<()> {
        self.al_context_float_setter(EventTag::AlDopplerFactor, DOPPLER_FACTOR_KEY, value, al_err)
    }

    pub fn al_doppler_velocity(&mut self, value: f32, al_err: i32) -> RecorderResult<()> {
        self.al_context_float_setter(EventTag::AlDopplerVelocity, DOPPLER_VELOCITY_KEY, value, al_err)
    }

    pub fn al_speed_of_sound(&mut self, value: f32, al_err: i32) -> RecorderResult<()> {
        self.al_context_float_setter(EventTag::AlSpeedOfSound, SPEED_OF_SOUND_KEY, value, al_err)
    }

    pub fn al_get_error(&mut self, err: i32) -> RecorderResult<()> {
        self.begin_call(EventTag::AlGetError)?;
        self.writer.write_i32(err)?;
        self.flush()
    }

    pub fn al_is_extension_present(&mut self, extname: &str, present: bool) -> RecorderResult<()> {
        self.begin_call(EventTag::AlIsExtensionPresent)?;
        self.writer.write_string(Some(extname))?;
        self.writer.write_bool(present)?;
        self.flush()
    }

    pub fn al_get_string(&mut self, param: i32, value: Option<&str>) -> RecorderResult<()> {
        self.begin_call(EventTag::AlGetString)?;
        self.writer.write_i32(param)?;
        self.writer.write_string(value)?;

        let context = self.registry.current_context;
        let changed = context.and_then(|ctx| {
            self.registry
                .contexts
                .get_mut(&ctx)
                .and_then(|rec| detector::diff_string(&mut rec.string_state, param, value))
        });
        if let (Some(new_value), Some(context)) = (changed, context) {
            self.write_tag(EventTag::ContextStateChangedString)?;
            self.writer.write_ptr(context)?;
            self.writer.write_i32(param)?;
            self.writer.write_string(new_value.as_deref())?;
        }
        self.flush()
    }

    /// The detector's full per-call poll pass (§4.5): re-queries state
    /// nothing about the triggering call's own arguments or return value
    /// exposed, so it is the only thing that surfaces a purely
    /// asynchronous transition (a source the mixer stopped on its own, a
    /// driver that disconnected a device between calls). Cheap to call
    /// from every wrapped entry point, since idle sources outside a
    /// playlist are never polled (§4.5 "only sources whose play-family
    /// call has added them to the playlist are polled").
    pub fn poll_state_changes<Q: StateSource>(&mut self, query: &Q) -> RecorderResult<()> {
        let devices: Vec<u64> = self.registry.devices.keys().copied().collect();
        for device in devices {
            let (supports_disconnect, is_capture) = match self.registry.devices.get(&device) {
                Some(rec) => (rec.supports_disconnect, rec.is_capture),
                None => continue,
            };
            if supports_disconnect {
                self.poll_device_connected(device, query)?;
            } else if is_capture {
                self.poll_device_capture_samples(device, query)?;
            } else {
                self.poll_playlists(device, query)?;
            }
        }
        self.flush()
    }

    fn poll_device_connected<Q: StateSource>(&mut self, device: u64, query: &Q) -> RecorderResult<()> {
        let connected = query.device_connected(device);
        if let Some(rec) = self.registry.devices.get_mut(&device) {
            if rec.connected != Some(connected) {
                rec.connected = Some(connected);
                self.write_tag(EventTag::DeviceStateChangedBool)?;
                self.writer.write_ptr(device)?;
                self.writer.write_i32(altrace_openal_sys::ALC_CONNECTED)?;
                self.writer.write_bool(connected)?;
            }
        }
        Ok(())
    }

    fn poll_device_capture_samples<Q: StateSource>(&mut self, device: u64, query: &Q) -> RecorderResult<()> {
        let samples = query.device_capture_samples(device);
        let changed = self
            .registry
            .devices
            .get_mut(&device)
            .and_then(|rec| detector::diff_vec(&mut rec.int_state, ALC_CAPTURE_SAMPLES_KEY, &[samples]));
        if let Some(values) = changed {
            self.write_tag(EventTag::DeviceStateChangedInt)?;
            self.writer.write_ptr(device)?;
            self.writer
                .write_i32(altrace_openal_sys::ALC_CAPTURE_SAMPLES)?;
            self.writer.write_i32_array(&values)?;
        }
        Ok(())
    }

    fn poll_playlists<Q: StateSource>(&mut self, device: u64, query: &Q) -> RecorderResult<()> {
        for context in self.registry.contexts_for_device(device) {
            for source in self.registry.playlist_for(context) {
                let new_state = query.source_state(source);
                let changed = match self.registry.sources.get_mut(&source) {
                    Some(rec) if rec.state != Some(new_state) => {
                        rec.state = Some(new_state);
                        true
                    }
                    _ => false,
                };
                if !changed {
                    continue;
                }
                self.registry.sync_playlist(source);
                self.write_tag(EventTag::SourceStateChangedEnum)?;
                self.writer.write_u32(source)?;
                self.writer.write_i32(altrace_openal_sys::AL_SOURCE_STATE)?;
                self.writer.write_i32(new_state.to_al())?;
            }
        }
        Ok(())
    }

    /// Writes the end-of-stream marker (§5 destructor path, §7): a clean
    /// timestamp and flag, written once at process shutdown.
    pub fn write_eos(&mut self, clean: bool) -> RecorderResult<()> {
        self.write_tag(EventTag::Eos)?;
        self.writer.write_bool(clean)?;
        self.writer.write_u32(self.elapsed_ms())?;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use altrace_wire::{read_caller_info, read_header, Reader};
    use std::io::Cursor;

    fn new_recorder() -> Recorder<Vec<u8>> {
        Recorder::new(Vec::new()).unwrap()
    }

    #[test]
    fn open_device_writes_a_readable_event_and_registers_it() {
        let mut rec = new_recorder();
        rec.alc_open_device(Some("default"), 0x1000).unwrap();
        assert!(rec.registry.devices.contains_key(&0x1000));

        let buf = rec.into_inner();
        let mut r = Reader::new(Cursor::new(buf));
        read_header(&mut r).unwrap();
        // skip past any new-callstack-symbols event this call emitted
        loop {
            let tag = EventTag::from_u32(r.read_u32().unwrap()).unwrap();
            if tag == EventTag::NewCallstackSyms {
                let n = r.read_u32().unwrap();
                for _ in 0..n {
                    r.read_ptr().unwrap();
                    r.read_string().unwrap();
                }
                continue;
            }
            assert_eq!(tag, EventTag::AlcOpenDevice);
            let info = read_caller_info(&mut r).unwrap();
            assert!(!info.stack.is_empty());
            let name = r.read_string().unwrap();
            assert_eq!(name.as_deref(), Some("default"));
            let device = r.read_ptr().unwrap();
            assert_eq!(device, 0x1000);
            break;
        }
    }

    #[test]
    fn source_play_updates_playlist_once_state_actually_changes() {
        let mut rec = new_recorder();
        let context = 0x2000u64;
        rec.registry.insert_context(context, 0x1000);
        rec.registry.current_context = Some(context);
        rec.al_gen_sources(&[1]).unwrap();

        rec.al_source_play(1, SourceState::Playing, AL_NO_ERROR).unwrap();
        assert_eq!(rec.registry.playlist_for(context), vec![1]);

        // A second `alSourcePlay` while already playing is a no-op state
        // transition and must not emit a second state-changed event or
        // disturb the playlist.
        rec.al_source_play(1, SourceState::Playing, AL_NO_ERROR).unwrap();
        assert_eq!(rec.registry.playlist_for(context), vec![1]);

        rec.al_source_stop(1, SourceState::Stopped, AL_NO_ERROR).unwrap();
        assert!(rec.registry.playlist_for(context).is_empty());
    }

    #[test]
    fn buffer_state_change_only_fires_on_real_diff() {
        let mut rec = new_recorder();
        rec.al_gen_buffers(&[7]).unwrap();
        rec.al_get_bufferi(7, altrace_openal_sys::AL_BUFFER, 99, AL_NO_ERROR)
            .unwrap();
        assert_eq!(
            rec.registry.buffers.get(&7).unwrap().int_state[&altrace_openal_sys::AL_BUFFER],
            99
        );
    }

    #[test]
    fn al_error_is_reported_when_non_zero() {
        let mut rec = new_recorder();
        rec.al_sourcei(1, 0, 0, 0xA001).unwrap();
        let buf = rec.into_inner();
        let mut r = Reader::new(Cursor::new(buf));
        read_header(&mut r).unwrap();
        let mut saw_error = false;
        loop {
            let Some(tag) = EventTag::from_u32(r.read_u32().unwrap_or(u32::MAX)) else {
                break;
            };
            match tag {
                EventTag::NewCallstackSyms => {
                    let n = r.read_u32().unwrap();
                    for _ in 0..n {
                        r.read_ptr().unwrap();
                        r.read_string().unwrap();
                    }
                }
                EventTag::AlSourcei => {
                    read_caller_info(&mut r).unwrap();
                    r.read_u32().unwrap();
                    r.read_i32().unwrap();
                    r.read_i32().unwrap();
                }
                EventTag::AlErrorTriggered => {
                    saw_error = true;
                    let err = r.read_i32().unwrap();
                    assert_eq!(err, 0xA001);
                    break;
                }
                _ => break,
            }
        }
        assert!(saw_error);
    }

    /// A fake `StateSource` for exercising the poll pass without a real
    /// driver: every field is a `Cell` so a test can flip what the "real
    /// API" reports between polls.
    struct FakeStateSource {
        connected: std::cell::Cell<bool>,
        capture_samples: std::cell::Cell<i32>,
        source_state: std::cell::Cell<SourceState>,
    }

    impl Default for FakeStateSource {
        fn default() -> Self {
            Self {
                connected: std::cell::Cell::new(true),
                capture_samples: std::cell::Cell::new(0),
                source_state: std::cell::Cell::new(SourceState::Initial),
            }
        }
    }

    impl StateSource for FakeStateSource {
        fn device_connected(&self, _device: u64) -> bool {
            self.connected.get()
        }
        fn device_capture_samples(&self, _device: u64) -> i32 {
            self.capture_samples.get()
        }
        fn source_state(&self, _source: u32) -> SourceState {
            self.source_state.get()
        }
    }

    #[test]
    fn poll_detects_a_disconnect_the_triggering_call_never_queried() {
        let mut rec = new_recorder();
        rec.alc_open_device(Some("default"), 0x1000).unwrap();
        rec.registry.set_supports_disconnect(0x1000, true);

        let fake = FakeStateSource::default();
        rec.poll_state_changes(&fake).unwrap();
        assert_eq!(rec.registry.devices[&0x1000].connected, Some(true));

        fake.connected.set(false);
        rec.poll_state_changes(&fake).unwrap();
        assert_eq!(rec.registry.devices[&0x1000].connected, Some(false));

        let buf = rec.into_inner();
        let mut r = Reader::new(Cursor::new(buf));
        read_header(&mut r).unwrap();
        let mut saw_disconnect = false;
        loop {
            let Some(tag) = EventTag::from_u32(r.read_u32().unwrap_or(u32::MAX)) else {
                break;
            };
            match tag {
                EventTag::NewCallstackSyms => {
                    let n = r.read_u32().unwrap();
                    for _ in 0..n {
                        r.read_ptr().unwrap();
                        r.read_string().unwrap();
                    }
                }
                EventTag::AlcOpenDevice => {
                    read_caller_info(&mut r).unwrap();
                    r.read_string().unwrap();
                    r.read_ptr().unwrap();
                }
                EventTag::DeviceStateChangedBool => {
                    let device = r.read_ptr().unwrap();
                    let param = r.read_i32().unwrap();
                    let connected = r.read_bool().unwrap();
                    assert_eq!(device, 0x1000);
                    assert_eq!(param, altrace_openal_sys::ALC_CONNECTED);
                    assert!(!connected);
                    saw_disconnect = true;
                    break;
                }
                _ => break,
            }
        }
        assert!(saw_disconnect);
    }

    #[test]
    fn poll_only_reports_capture_samples_once_the_count_changes() {
        let mut rec = new_recorder();
        rec.alc_capture_open_device(Some("mic"), 44100, 0x1101, 4096, 0x3000)
            .unwrap();

        let fake = FakeStateSource::default();
        rec.poll_state_changes(&fake).unwrap();
        rec.poll_state_changes(&fake).unwrap();
        assert_eq!(
            rec.registry.devices[&0x3000].int_state.get(&ALC_CAPTURE_SAMPLES_KEY),
            Some(&vec![0])
        );

        fake.capture_samples.set(512);
        rec.poll_state_changes(&fake).unwrap();
        assert_eq!(
            rec.registry.devices[&0x3000].int_state.get(&ALC_CAPTURE_SAMPLES_KEY),
            Some(&vec![512])
        );
    }

    #[test]
    fn poll_catches_an_asynchronous_source_stop_and_drains_the_playlist() {
        let mut rec = new_recorder();
        let context = 0x2000u64;
        rec.registry.insert_context(context, 0x1000);
        rec.registry.current_context = Some(context);
        rec.al_gen_sources(&[1]).unwrap();
        rec.al_source_play(1, SourceState::Playing, AL_NO_ERROR).unwrap();
        assert_eq!(rec.registry.playlist_for(context), vec![1]);

        // Nothing in this call's own arguments touched source 1; only the
        // poll pass discovers the mixer stopped it on its own.
        let fake = FakeStateSource::default();
        fake.source_state.set(SourceState::Stopped);
        rec.poll_state_changes(&fake).unwrap();

        assert!(rec.registry.playlist_for(context).is_empty());
        assert_eq!(rec.registry.sources[&1].state, Some(SourceState::Stopped));
    }

    #[test]
    fn context_static_state_is_queried_once_per_context() {
        let mut rec = new_recorder();
        let context = 0x2000u64;
        rec.registry.insert_context(context, 0x1000);

        rec.context_static_state(context, Some("Vendor"), Some("1.1"), Some("Renderer"), Some("AL_EXT_foo"))
            .unwrap();
        assert_eq!(
            rec.registry.contexts[&context].string_state[&altrace_openal_sys::AL_VENDOR],
            Some("Vendor".to_string())
        );
        assert!(rec.registry.contexts[&context].static_state_queried);

        // A second call for the same context (as would happen if the
        // application makes it current again later) must not re-emit: a
        // fresh recorder with the flag already set should write nothing
        // but its header.
        let mut rec = new_recorder();
        rec.registry.insert_context(context, 0x1000);
        rec.registry.contexts.get_mut(&context).unwrap().static_state_queried = true;
        rec.context_static_state(context, Some("Vendor"), Some("1.1"), Some("Renderer"), Some("AL_EXT_foo"))
            .unwrap();
        assert_eq!(rec.into_inner().len(), 8);
    }
}
