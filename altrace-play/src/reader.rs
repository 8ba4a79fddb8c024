//! The event reader (§4.6): the mirror image of `altrace-record`'s
//! emitter. Validates the header, then loops: compute progress, read a
//! tag, dispatch to that tag's decoder, invoke the matching `Visitor`
//! callback.
//!
//! Three tags have no visitor callback of their own: `NewCallstackSyms`
//! only mutates the symbol map, `Eos` terminates the loop after invoking
//! `Visitor::eos`, and an unrecognized tag is player-fatal (§7) rather
//! than dispatched anywhere.

use std::io::{Read, Seek, SeekFrom};

use altrace_wire::{read_caller_info, read_header, EventTag, Reader as WireReader, WireError, WireResult};

use crate::caller_info::CallerInfo;
use crate::labels::LabelMaps;
use crate::symbols::SymbolMap;
use crate::threads::ThreadIdMap;
use crate::visitor::Visitor;

/// How trace playback ended. Distinguishes the three terminal states
/// `spec.md` §7/§8 require a front-end be able to tell apart: a trace
/// that ran to its real `Eos` marker, one the visitor's `progress` hook
/// cancelled, and one a player-fatal or player-soft condition cut short.
///
/// A `Fatal` outcome is still returned as `Ok`, not `Err`: the header and
/// every decoded tag were syntactically well-formed up to the failure
/// point, and `Visitor::eos(false, ..)` has already been invoked by the
/// time this is returned, matching the original's `process_tracelog`
/// (which always returns a result code, never aborts the caller). The
/// outer `WireResult` is reserved for failures that happen before the
/// visitor contract can be honored at all (e.g. `Seek` failing on the
/// input itself).
#[derive(Debug)]
pub enum PlayResult {
    /// Reached a genuine `Eos` event.
    Clean,
    /// `Visitor::progress` returned `false`.
    Cancelled,
    /// Bad magic/version, an unrecognized tag, or a short read.
    Fatal(WireError),
}

/// Plays a complete trace from `input` against `visitor`, per §4.6.
pub fn play<R: Read + Seek, V: Visitor>(input: R, visitor: &mut V) -> WireResult<PlayResult> {
    let mut input = input;
    let size = input.seek(SeekFrom::End(0))?;
    input.seek(SeekFrom::Start(0))?;

    let mut r = WireReader::new(input);
    if let Err(e) = read_header(&mut r) {
        log::warn!("altrace player: bad header: {e}");
        visitor.eos(false, 0);
        return Ok(PlayResult::Fatal(e));
    }

    let mut symbols = SymbolMap::new();
    let mut threads = ThreadIdMap::new();
    let mut labels = LabelMaps::new();
    let mut last_timestamp_ms = 0u32;

    macro_rules! bail {
        ($e:expr) => {{
            let e = $e;
            log::warn!("altrace player: {e}");
            visitor.eos(false, last_timestamp_ms);
            return Ok(PlayResult::Fatal(e));
        }};
    }

    loop {
        let offset = match current_offset(&mut r) {
            Ok(o) => o,
            Err(e) => bail!(e),
        };
        if !visitor.progress(offset, size) {
            visitor.eos(false, last_timestamp_ms);
            return Ok(PlayResult::Cancelled);
        }

        let raw_tag = match r.read_u32() {
            Ok(v) => v,
            Err(e) => bail!(e),
        };
        let Some(tag) = EventTag::from_u32(raw_tag) else {
            bail!(WireError::UnknownTag(raw_tag));
        };

        if tag == EventTag::NewCallstackSyms {
            if let Err(e) = decode_new_callstack_syms(&mut r, &mut symbols) {
                bail!(e);
            }
            continue;
        }

        if tag == EventTag::Eos {
            let (clean, ticks) = match decode_eos(&mut r) {
                Ok(v) => v,
                Err(e) => bail!(e),
            };
            last_timestamp_ms = ticks;
            visitor.eos(clean, ticks);
            return Ok(PlayResult::Clean);
        }

        // Every remaining tag either carries caller-info (an API-call
        // event) or doesn't (a synthetic error/state-change event); the
        // dispatch table below knows which.
        let stack_symbols: Vec<Option<String>>;
        let info: Option<CallerInfo> = if tag_has_caller_info(tag) {
            let raw_info = match read_caller_info(&mut r) {
                Ok(v) => v,
                Err(e) => bail!(e),
            };
            last_timestamp_ms = raw_info.timestamp_ms;
            stack_symbols = raw_info
                .stack
                .iter()
                .map(|&addr| symbols.resolve(addr).map(str::to_string))
                .collect();
            Some(CallerInfo {
                timestamp_ms: raw_info.timestamp_ms,
                thread_id: threads.dense_id(raw_info.raw_thread_id),
                raw_thread_id: raw_info.raw_thread_id,
                stack_symbols: &stack_symbols,
                trace_scope: raw_info.trace_scope,
                file_offset: offset,
            })
        } else {
            None
        };

        if let Err(e) = dispatch(tag, &mut r, info, &mut labels, visitor) {
            bail!(e);
        }
    }
}

fn current_offset<R: Read + Seek>(r: &mut WireReader<R>) -> std::io::Result<u64> {
    r.get_mut().stream_position()
}

fn tag_has_caller_info(tag: EventTag) -> bool {
    use EventTag::*;
    !matches!(
        tag,
        NewCallstackSyms
            | Eos
            | AlErrorTriggered
            | AlcErrorTriggered
            | DeviceStateChangedBool
            | DeviceStateChangedInt
            | ContextStateChangedEnum
            | ContextStateChangedFloat
            | ContextStateChangedString
            | ListenerStateChangedFloatv
            | SourceStateChangedBool
            | SourceStateChangedEnum
            | SourceStateChangedFloat
            | SourceStateChangedFloat3
            | SourceStateChangedInt
            | SourceStateChangedUint
            | BufferStateChangedInt
    )
}

fn decode_new_callstack_syms<R: Read>(r: &mut WireReader<R>, symbols: &mut SymbolMap) -> WireResult<()> {
    let n = r.read_u32()?;
    for _ in 0..n {
        let addr = r.read_ptr()?;
        let name = r.read_string()?;
        symbols.intern(addr, name);
    }
    Ok(())
}

fn decode_eos<R: Read>(r: &mut WireReader<R>) -> WireResult<(bool, u32)> {
    let clean = r.read_bool()?;
    let ticks = r.read_u32()?;
    Ok((clean, ticks))
}

/// One decoder per remaining tag, mirroring the field order
/// `altrace-record::Recorder`'s matching method wrote it in (§4.4 step
/// 4/6, §4.6). `info` is `Some` for every API-call event and `None` for
/// the handful of synthetic error/state-change events the recorder emits
/// outside the wrapped-entry-point envelope (§3).
fn dispatch<R: Read, V: Visitor>(
    tag: EventTag,
    r: &mut WireReader<R>,
    info: Option<CallerInfo>,
    labels: &mut LabelMaps,
    visitor: &mut V,
) -> WireResult<()> {
    use EventTag::*;

    match tag {
        // ---- label / diagnostic events ----
        TraceDeviceLabel => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let label = r.read_string()?;
            labels.set_device(device, label.clone());
            visitor.device_label(&info, device, label.as_deref());
        }
        TraceContextLabel => {
            let info = info.unwrap();
            let context = r.read_ptr()?;
            let label = r.read_string()?;
            labels.set_context(context, label.clone());
            visitor.context_label(&info, context, label.as_deref());
        }
        TraceSourceLabel => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            let label = r.read_string()?;
            labels.set_source(source, label.clone());
            visitor.source_label(&info, source, label.as_deref());
        }
        TraceBufferLabel => {
            let info = info.unwrap();
            let buffer = r.read_u32()?;
            let label = r.read_string()?;
            labels.set_buffer(buffer, label.clone());
            visitor.buffer_label(&info, buffer, label.as_deref());
        }
        TraceMessage => {
            let info = info.unwrap();
            let message = r.read_string()?.unwrap_or_default();
            visitor.trace_message(&info, &message);
        }
        TracePushScope => {
            let info = info.unwrap();
            let name = r.read_string()?.unwrap_or_default();
            visitor.push_scope(&info, &name);
        }
        TracePopScope => {
            let info = info.unwrap();
            visitor.pop_scope(&info);
        }

        // ---- synthetic state-change / error events (no caller-info) ----
        AlErrorTriggered => {
            let error = r.read_i32()?;
            visitor.al_error_triggered(error);
        }
        AlcErrorTriggered => {
            let device = r.read_ptr()?;
            let error = r.read_i32()?;
            visitor.alc_error_triggered(device, error);
        }
        DeviceStateChangedBool => {
            let device = r.read_ptr()?;
            let param = r.read_i32()?;
            let value = r.read_bool()?;
            visitor.device_state_changed_bool(device, param, value);
        }
        DeviceStateChangedInt => {
            let device = r.read_ptr()?;
            let param = r.read_i32()?;
            let values = r.read_i32_array()?;
            visitor.device_state_changed_int(device, param, &values);
        }
        ContextStateChangedEnum => {
            let context = r.read_ptr()?;
            let param = r.read_i32()?;
            let value = r.read_i32()?;
            visitor.context_state_changed_enum(context, param, value);
        }
        ContextStateChangedFloat => {
            let context = r.read_ptr()?;
            let param = r.read_i32()?;
            let value = r.read_f32()?;
            visitor.context_state_changed_float(context, param, value);
        }
        ContextStateChangedString => {
            let context = r.read_ptr()?;
            let param = r.read_i32()?;
            let value = r.read_string()?;
            visitor.context_state_changed_string(context, param, value.as_deref());
        }
        ListenerStateChangedFloatv => {
            let param = r.read_i32()?;
            let values = r.read_f32_array()?;
            visitor.listener_state_changed_floatv(param, &values);
        }
        SourceStateChangedBool => {
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_bool()?;
            visitor.source_state_changed_bool(source, param, value);
        }
        SourceStateChangedEnum => {
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_i32()?;
            visitor.source_state_changed_enum(source, param, value);
        }
        SourceStateChangedFloat => {
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_f32()?;
            visitor.source_state_changed_float(source, param, value);
        }
        SourceStateChangedFloat3 => {
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let values = r.read_f32_array()?;
            let triple = [
                values.first().copied().unwrap_or(0.0),
                values.get(1).copied().unwrap_or(0.0),
                values.get(2).copied().unwrap_or(0.0),
            ];
            visitor.source_state_changed_float3(source, param, triple);
        }
        SourceStateChangedInt => {
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_i32()?;
            visitor.source_state_changed_int(source, param, value);
        }
        SourceStateChangedUint => {
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_u32()?;
            visitor.source_state_changed_uint(source, param, value);
        }
        BufferStateChangedInt => {
            let buffer = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_i32()?;
            visitor.buffer_state_changed_int(buffer, param, value);
        }

        // ---- ALC device/context lifecycle and queries ----
        AlcOpenDevice => {
            let info = info.unwrap();
            let devicename = r.read_string()?;
            let device = r.read_ptr()?;
            visitor.alc_open_device(&info, devicename.as_deref(), device);
        }
        AlcCloseDevice => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let success = r.read_bool()?;
            if success {
                labels.clear_device(device);
            }
            visitor.alc_close_device(&info, device, success);
        }
        AlcCaptureOpenDevice => {
            let info = info.unwrap();
            let devicename = r.read_string()?;
            let frequency = r.read_u32()?;
            let format = r.read_i32()?;
            let buffersize = r.read_i32()?;
            let device = r.read_ptr()?;
            visitor.alc_capture_open_device(&info, devicename.as_deref(), frequency, format, buffersize, device);
        }
        AlcCaptureCloseDevice => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let success = r.read_bool()?;
            if success {
                labels.clear_device(device);
            }
            visitor.alc_capture_close_device(&info, device, success);
        }
        AlcCaptureStart => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            visitor.alc_capture_start(&info, device);
        }
        AlcCaptureStop => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            visitor.alc_capture_stop(&info, device);
        }
        AlcCaptureSamples => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let samples = r.read_i32()?;
            visitor.alc_capture_samples(&info, device, samples);
        }
        AlcCreateContext => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let attrs = r.read_i32_array()?;
            let context = r.read_ptr()?;
            visitor.alc_create_context(&info, device, &attrs, context);
        }
        AlcDestroyContext => {
            let info = info.unwrap();
            let context = r.read_ptr()?;
            labels.clear_context(context);
            visitor.alc_destroy_context(&info, context);
        }
        AlcMakeContextCurrent => {
            let info = info.unwrap();
            let context = r.read_ptr()?;
            let success = r.read_bool()?;
            visitor.alc_make_context_current(&info, context, success);
        }
        AlcGetCurrentContext => {
            let info = info.unwrap();
            let context = r.read_ptr()?;
            visitor.alc_get_current_context(&info, context);
        }
        AlcGetContextsDevice => {
            let info = info.unwrap();
            let context = r.read_ptr()?;
            let device = r.read_ptr()?;
            visitor.alc_get_contexts_device(&info, context, device);
        }
        AlcGetError => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let error = r.read_i32()?;
            visitor.alc_get_error(&info, device, error);
        }
        AlcGetIntegerv => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let param = r.read_i32()?;
            let values = r.read_i32_array()?;
            visitor.alc_get_integerv(&info, device, param, &values);
        }
        AlcGetString => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let param = r.read_i32()?;
            let value = r.read_string()?;
            visitor.alc_get_string(&info, device, param, value.as_deref());
        }
        AlcIsExtensionPresent => {
            let info = info.unwrap();
            let device = r.read_ptr()?;
            let extname = r.read_string()?.unwrap_or_default();
            let present = r.read_bool()?;
            visitor.alc_is_extension_present(&info, device, &extname, present);
        }

        // ---- AL buffers ----
        AlGenBuffers => {
            let info = info.unwrap();
            let buffers = r.read_u32_array()?;
            visitor.al_gen_buffers(&info, &buffers);
        }
        AlDeleteBuffers => {
            let info = info.unwrap();
            let buffers = r.read_u32_array()?;
            for &b in &buffers {
                labels.clear_buffer(b);
            }
            visitor.al_delete_buffers(&info, &buffers);
        }
        AlBufferData => {
            let info = info.unwrap();
            let buffer = r.read_u32()?;
            let format = r.read_i32()?;
            let data = r.read_blob()?;
            let size = r.read_i32()?;
            let freq = r.read_i32()?;
            visitor.al_buffer_data(&info, buffer, format, data.as_deref(), size, freq);
        }
        AlGetBufferi => {
            let info = info.unwrap();
            let buffer = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_i32()?;
            visitor.al_get_bufferi(&info, buffer, param, value);
        }

        // ---- AL sources ----
        AlGenSources => {
            let info = info.unwrap();
            let sources = r.read_u32_array()?;
            visitor.al_gen_sources(&info, &sources);
        }
        AlDeleteSources => {
            let info = info.unwrap();
            let sources = r.read_u32_array()?;
            for &s in &sources {
                labels.clear_source(s);
            }
            visitor.al_delete_sources(&info, &sources);
        }
        AlSourcei => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_i32()?;
            visitor.al_sourcei(&info, source, param, value);
        }
        AlSourcefv => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let values = r.read_f32_array()?;
            visitor.al_sourcefv(&info, source, param, &values);
        }
        AlGetSourcei => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let value = r.read_i32()?;
            visitor.al_get_sourcei(&info, source, param, value);
        }
        AlGetSourcefv => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            let param = r.read_i32()?;
            let values = r.read_f32_array()?;
            visitor.al_get_sourcefv(&info, source, param, &values);
        }
        AlSourcePlay => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            visitor.al_source_play(&info, source);
        }
        AlSourcePause => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            visitor.al_source_pause(&info, source);
        }
        AlSourceStop => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            visitor.al_source_stop(&info, source);
        }
        AlSourceRewind => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            visitor.al_source_rewind(&info, source);
        }
        AlSourceQueueBuffers => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            let buffers = r.read_u32_array()?;
            visitor.al_source_queue_buffers(&info, source, &buffers);
        }
        AlSourceUnqueueBuffers => {
            let info = info.unwrap();
            let source = r.read_u32()?;
            let buffers = r.read_u32_array()?;
            visitor.al_source_unqueue_buffers(&info, source, &buffers);
        }

        // ---- AL listener ----
        AlListenerfv => {
            let info = info.unwrap();
            let param = r.read_i32()?;
            let values = r.read_f32_array()?;
            visitor.al_listenerfv(&info, param, &values);
        }
        AlGetListenerfv => {
            let info = info.unwrap();
            let param = r.read_i32()?;
            let values = r.read_f32_array()?;
            visitor.al_get_listenerfv(&info, param, &values);
        }

        // ---- AL context-global state ----
        AlDistanceModel => {
            let info = info.unwrap();
            let model = r.read_i32()?;
            visitor.al_distance_model(&info, model);
        }
        AlDopplerFactor => {
            let info = info.unwrap();
            let value = r.read_f32()?;
            visitor.al_doppler_factor(&info, value);
        }
        AlDopplerVelocity => {
            let info = info.unwrap();
            let value = r.read_f32()?;
            visitor.al_doppler_velocity(&info, value);
        }
        AlSpeedOfSound => {
            let info = info.unwrap();
            let value = r.read_f32()?;
            visitor.al_speed_of_sound(&info, value);
        }
        AlGetError => {
            let info = info.unwrap();
            let error = r.read_i32()?;
            visitor.al_get_error(&info, error);
        }
        AlGetString => {
            let info = info.unwrap();
            let param = r.read_i32()?;
            let value = r.read_string()?;
            visitor.al_get_string(&info, param, value.as_deref());
        }
        AlIsExtensionPresent => {
            let info = info.unwrap();
            let extname = r.read_string()?.unwrap_or_default();
            let present = r.read_bool()?;
            visitor.al_is_extension_present(&info, &extname, present);
        }

        NewCallstackSyms | Eos => unreachable!("handled by the caller before dispatch"),
    }
    Ok(())
}
