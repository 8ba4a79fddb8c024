//! The player's contract with its front-end (§6 "Visitor interface"):
//! one callback per event tag, plus `progress` and `eos`.
//!
//! Every method has a no-op default so a front-end only implements the
//! events it cares about — `altrace-cli`'s `stats` subcommand overrides a
//! handful to tally counts, `dump` overrides nearly all of them to print a
//! line per event, matching the "visitor that just tallies instead of
//! printing" split called out in the CLI design.

use crate::caller_info::CallerInfo;

#[allow(unused_variables)]
pub trait Visitor {
    // ---- progress & termination ----

    /// Called before decoding each event. Returning `false` cancels
    /// playback cleanly (§7 "player-cancel", §8 seed scenario 6).
    fn progress(&mut self, offset: u64, size: u64) -> bool {
        true
    }

    /// Called exactly once, whether the trace ended with a real `Eos`
    /// event (`clean = true`) or playback was cut short by an IO failure,
    /// an unrecognized tag, or cancellation (`clean = false`).
    fn eos(&mut self, clean: bool, final_timestamp_ms: u32) {}

    // ---- label / diagnostic events ----

    fn device_label(&mut self, info: &CallerInfo, device: u64, label: Option<&str>) {}
    fn context_label(&mut self, info: &CallerInfo, context: u64, label: Option<&str>) {}
    fn source_label(&mut self, info: &CallerInfo, source: u32, label: Option<&str>) {}
    fn buffer_label(&mut self, info: &CallerInfo, buffer: u32, label: Option<&str>) {}
    fn trace_message(&mut self, info: &CallerInfo, message: &str) {}
    fn push_scope(&mut self, info: &CallerInfo, name: &str) {}
    fn pop_scope(&mut self, info: &CallerInfo) {}

    // ---- synthetic state-change / error events ----

    fn al_error_triggered(&mut self, error: i32) {}
    fn alc_error_triggered(&mut self, device: u64, error: i32) {}
    fn device_state_changed_bool(&mut self, device: u64, param: i32, value: bool) {}
    fn device_state_changed_int(&mut self, device: u64, param: i32, values: &[i32]) {}
    fn context_state_changed_enum(&mut self, context: u64, param: i32, value: i32) {}
    fn context_state_changed_float(&mut self, context: u64, param: i32, value: f32) {}
    fn context_state_changed_string(&mut self, context: u64, param: i32, value: Option<&str>) {}
    fn listener_state_changed_floatv(&mut self, param: i32, values: &[f32]) {}
    fn source_state_changed_bool(&mut self, source: u32, param: i32, value: bool) {}
    fn source_state_changed_enum(&mut self, source: u32, param: i32, value: i32) {}
    fn source_state_changed_float(&mut self, source: u32, param: i32, value: f32) {}
    fn source_state_changed_float3(&mut self, source: u32, param: i32, values: [f32; 3]) {}
    fn source_state_changed_int(&mut self, source: u32, param: i32, value: i32) {}
    fn source_state_changed_uint(&mut self, source: u32, param: i32, value: u32) {}
    fn buffer_state_changed_int(&mut self, buffer: u32, param: i32, value: i32) {}

    // ---- ALC device/context lifecycle and queries ----

    fn alc_open_device(&mut self, info: &CallerInfo, devicename: Option<&str>, device: u64) {}
    fn alc_close_device(&mut self, info: &CallerInfo, device: u64, success: bool) {}
    fn alc_capture_open_device(
        &mut self,
        info: &CallerInfo,
        devicename: Option<&str>,
        frequency: u32,
        format: i32,
        buffersize: i32,
        device: u64,
    ) {
    }
    fn alc_capture_close_device(&mut self, info: &CallerInfo, device: u64, success: bool) {}
    fn alc_capture_start(&mut self, info: &CallerInfo, device: u64) {}
    fn alc_capture_stop(&mut self, info: &CallerInfo, device: u64) {}
    fn alc_capture_samples(&mut self, info: &CallerInfo, device: u64, samples: i32) {}
    fn alc_create_context(&mut self, info: &CallerInfo, device: u64, attrs: &[i32], context: u64) {}
    fn alc_destroy_context(&mut self, info: &CallerInfo, context: u64) {}
    fn alc_make_context_current(&mut self, info: &CallerInfo, context: u64, success: bool) {}
    fn alc_get_current_context(&mut self, info: &CallerInfo, context: u64) {}
    fn alc_get_contexts_device(&mut self, info: &CallerInfo, context: u64, device: u64) {}
    fn alc_get_error(&mut self, info: &CallerInfo, device: u64, error: i32) {}
    fn alc_get_integerv(&mut self, info: &CallerInfo, device: u64, param: i32, values: &[i32]) {}
    fn alc_get_string(&mut self, info: &CallerInfo, device: u64, param: i32, value: Option<&str>) {}
    fn alc_is_extension_present(&mut self, info: &CallerInfo, device: u64, extname: &str, present: bool) {}

    // ---- AL buffers ----

    fn al_gen_buffers(&mut self, info: &CallerInfo, buffers: &[u32]) {}
    fn al_delete_buffers(&mut self, info: &CallerInfo, buffers: &[u32]) {}
    fn al_buffer_data(
        &mut self,
        info: &CallerInfo,
        buffer: u32,
        format: i32,
        data: Option<&[u8]>,
        size: i32,
        freq: i32,
    ) {
    }
    fn al_get_bufferi(&mut self, info: &CallerInfo, buffer: u32, param: i32, value: i32) {}

    // ---- AL sources ----

    fn al_gen_sources(&mut self, info: &CallerInfo, sources: &[u32]) {}
    fn al_delete_sources(&mut self, info: &CallerInfo, sources: &[u32]) {}
    fn al_sourcei(&mut self, info: &CallerInfo, source: u32, param: i32, value: i32) {}
    fn al_sourcefv(&mut self, info: &CallerInfo, source: u32, param: i32, values: &[f32]) {}
    fn al_get_sourcei(&mut self, info: &CallerInfo, source: u32, param: i32, value: i32) {}
    fn al_get_sourcefv(&mut self, info: &CallerInfo, source: u32, param: i32, values: &[f32]) {}
    fn al_source_play(&mut self, info: &CallerInfo, source: u32) {}
    fn al_source_pause(&mut self, info: &CallerInfo, source: u32) {}
    fn al_source_stop(&mut self, info: &CallerInfo, source: u32) {}
    fn al_source_rewind(&mut self, info: &CallerInfo, source: u32) {}
    fn al_source_queue_buffers(&mut self, info: &CallerInfo, source: u32, buffers: &[u32]) {}
    fn al_source_unqueue_buffers(&mut self, info: &CallerInfo, source: u32, buffers: &[u32]) {}

    // ---- AL listener ----

    fn al_listenerfv(&mut self, info: &CallerInfo, param: i32, values: &[f32]) {}
    fn al_get_listenerfv(&mut self, info: &CallerInfo, param: i32, values: &[f32]) {}

    // ---- AL context-global state ----

    fn al_distance_model(&mut self, info: &CallerInfo, model: i32) {}
    fn al_doppler_factor(&mut self, info: &CallerInfo, value: f32) {}
    fn al_doppler_velocity(&mut self, info: &CallerInfo, value: f32) {}
    fn al_speed_of_sound(&mut self, info: &CallerInfo, value: f32) {}
    fn al_get_error(&mut self, info: &CallerInfo, error: i32) {}
    fn al_get_string(&mut self, info: &CallerInfo, param: i32, value: Option<&str>) {}
    fn al_is_extension_present(&mut self, info: &CallerInfo, extname: &str, present: bool) {}
}
