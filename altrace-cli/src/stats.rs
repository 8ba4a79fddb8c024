//! `altrace stats`: a [`Visitor`] that tallies counts instead of printing
//! them, for the "aggregate counts per event tag, symbol economy metrics,
//! total wall-clock span" summary (SPEC_FULL.md §12).

use std::collections::HashSet;

use rustc_hash::FxHashMap;

use altrace_play::{CallerInfo, Visitor};

#[derive(Default)]
pub struct StatsVisitor {
    pub events_by_tag: FxHashMap<&'static str, u64>,
    pub total_frames: u64,
    pub unresolved_frames: u64,
    pub distinct_symbols: HashSet<String>,
    pub max_thread_id: u32,
    pub max_timestamp_ms: u32,
    pub clean_eos: bool,
}

impl StatsVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self, tag: &'static str) {
        *self.events_by_tag.entry(tag).or_insert(0) += 1;
    }

    fn note(&mut self, info: &CallerInfo, tag: &'static str) {
        self.bump(tag);
        self.max_thread_id = self.max_thread_id.max(info.thread_id);
        self.max_timestamp_ms = self.max_timestamp_ms.max(info.timestamp_ms);
        for sym in info.stack_symbols {
            self.total_frames += 1;
            match sym {
                Some(name) => {
                    self.distinct_symbols.insert(name.clone());
                }
                None => self.unresolved_frames += 1,
            }
        }
    }
}

impl Visitor for StatsVisitor {
    fn progress(&mut self, _offset: u64, _size: u64) -> bool {
        true
    }

    fn eos(&mut self, clean: bool, final_timestamp_ms: u32) {
        self.clean_eos = clean;
        self.max_timestamp_ms = self.max_timestamp_ms.max(final_timestamp_ms);
    }

    fn device_label(&mut self, info: &CallerInfo, _device: u64, _label: Option<&str>) {
        self.note(info, "device-label");
    }
    fn context_label(&mut self, info: &CallerInfo, _context: u64, _label: Option<&str>) {
        self.note(info, "context-label");
    }
    fn source_label(&mut self, info: &CallerInfo, _source: u32, _label: Option<&str>) {
        self.note(info, "source-label");
    }
    fn buffer_label(&mut self, info: &CallerInfo, _buffer: u32, _label: Option<&str>) {
        self.note(info, "buffer-label");
    }
    fn trace_message(&mut self, info: &CallerInfo, _message: &str) {
        self.note(info, "message");
    }
    fn push_scope(&mut self, info: &CallerInfo, _name: &str) {
        self.note(info, "push-scope");
    }
    fn pop_scope(&mut self, info: &CallerInfo) {
        self.note(info, "pop-scope");
    }

    fn al_error_triggered(&mut self, _error: i32) {
        self.bump("al-error");
    }
    fn alc_error_triggered(&mut self, _device: u64, _error: i32) {
        self.bump("alc-error");
    }
    fn device_state_changed_bool(&mut self, _device: u64, _param: i32, _value: bool) {
        self.bump("device-state-bool");
    }
    fn device_state_changed_int(&mut self, _device: u64, _param: i32, _values: &[i32]) {
        self.bump("device-state-int");
    }
    fn context_state_changed_enum(&mut self, _context: u64, _param: i32, _value: i32) {
        self.bump("context-state-enum");
    }
    fn context_state_changed_float(&mut self, _context: u64, _param: i32, _value: f32) {
        self.bump("context-state-float");
    }
    fn context_state_changed_string(&mut self, _context: u64, _param: i32, _value: Option<&str>) {
        self.bump("context-state-string");
    }
    fn listener_state_changed_floatv(&mut self, _param: i32, _values: &[f32]) {
        self.bump("listener-state-floatv");
    }
    fn source_state_changed_bool(&mut self, _source: u32, _param: i32, _value: bool) {
        self.bump("source-state-bool");
    }
    fn source_state_changed_enum(&mut self, _source: u32, _param: i32, _value: i32) {
        self.bump("source-state-enum");
    }
    fn source_state_changed_float(&mut self, _source: u32, _param: i32, _value: f32) {
        self.bump("source-state-float");
    }
    fn source_state_changed_float3(&mut self, _source: u32, _param: i32, _values: [f32; 3]) {
        self.bump("source-state-float3");
    }
    fn source_state_changed_int(&mut self, _source: u32, _param: i32, _value: i32) {
        self.bump("source-state-int");
    }
    fn source_state_changed_uint(&mut self, _source: u32, _param: i32, _value: u32) {
        self.bump("source-state-uint");
    }
    fn buffer_state_changed_int(&mut self, _buffer: u32, _param: i32, _value: i32) {
        self.bump("buffer-state-int");
    }

    fn alc_open_device(&mut self, info: &CallerInfo, _devicename: Option<&str>, _device: u64) {
        self.note(info, "alcOpenDevice");
    }
    fn alc_close_device(&mut self, info: &CallerInfo, _device: u64, _success: bool) {
        self.note(info, "alcCloseDevice");
    }
    fn alc_capture_open_device(
        &mut self,
        info: &CallerInfo,
        _devicename: Option<&str>,
        _frequency: u32,
        _format: i32,
        _buffersize: i32,
        _device: u64,
    ) {
        self.note(info, "alcCaptureOpenDevice");
    }
    fn alc_capture_close_device(&mut self, info: &CallerInfo, _device: u64, _success: bool) {
        self.note(info, "alcCaptureCloseDevice");
    }
    fn alc_capture_start(&mut self, info: &CallerInfo, _device: u64) {
        self.note(info, "alcCaptureStart");
    }
    fn alc_capture_stop(&mut self, info: &CallerInfo, _device: u64) {
        self.note(info, "alcCaptureStop");
    }
    fn alc_capture_samples(&mut self, info: &CallerInfo, _device: u64, _samples: i32) {
        self.note(info, "alcCaptureSamples");
    }
    fn alc_create_context(&mut self, info: &CallerInfo, _device: u64, _attrs: &[i32], _context: u64) {
        self.note(info, "alcCreateContext");
    }
    fn alc_destroy_context(&mut self, info: &CallerInfo, _context: u64) {
        self.note(info, "alcDestroyContext");
    }
    fn alc_make_context_current(&mut self, info: &CallerInfo, _context: u64, _success: bool) {
        self.note(info, "alcMakeContextCurrent");
    }
    fn alc_get_current_context(&mut self, info: &CallerInfo, _context: u64) {
        self.note(info, "alcGetCurrentContext");
    }
    fn alc_get_contexts_device(&mut self, info: &CallerInfo, _context: u64, _device: u64) {
        self.note(info, "alcGetContextsDevice");
    }
    fn alc_get_error(&mut self, info: &CallerInfo, _device: u64, _error: i32) {
        self.note(info, "alcGetError");
    }
    fn alc_get_integerv(&mut self, info: &CallerInfo, _device: u64, _param: i32, _values: &[i32]) {
        self.note(info, "alcGetIntegerv");
    }
    fn alc_get_string(&mut self, info: &CallerInfo, _device: u64, _param: i32, _value: Option<&str>) {
        self.note(info, "alcGetString");
    }
    fn alc_is_extension_present(&mut self, info: &CallerInfo, _device: u64, _extname: &str, _present: bool) {
        self.note(info, "alcIsExtensionPresent");
    }

    fn al_gen_buffers(&mut self, info: &CallerInfo, _buffers: &[u32]) {
        self.note(info, "alGenBuffers");
    }
    fn al_delete_buffers(&mut self, info: &CallerInfo, _buffers: &[u32]) {
        self.note(info, "alDeleteBuffers");
    }
    fn al_buffer_data(&mut self, info: &CallerInfo, _buffer: u32, _format: i32, _data: Option<&[u8]>, _size: i32, _freq: i32) {
        self.note(info, "alBufferData");
    }
    fn al_get_bufferi(&mut self, info: &CallerInfo, _buffer: u32, _param: i32, _value: i32) {
        self.note(info, "alGetBufferi");
    }

    fn al_gen_sources(&mut self, info: &CallerInfo, _sources: &[u32]) {
        self.note(info, "alGenSources");
    }
    fn al_delete_sources(&mut self, info: &CallerInfo, _sources: &[u32]) {
        self.note(info, "alDeleteSources");
    }
    fn al_sourcei(&mut self, info: &CallerInfo, _source: u32, _param: i32, _value: i32) {
        self.note(info, "alSourcei");
    }
    fn al_sourcefv(&mut self, info: &CallerInfo, _source: u32, _param: i32, _values: &[f32]) {
        self.note(info, "alSourcefv");
    }
    fn al_get_sourcei(&mut self, info: &CallerInfo, _source: u32, _param: i32, _value: i32) {
        self.note(info, "alGetSourcei");
    }
    fn al_get_sourcefv(&mut self, info: &CallerInfo, _source: u32, _param: i32, _values: &[f32]) {
        self.note(info, "alGetSourcefv");
    }
    fn al_source_play(&mut self, info: &CallerInfo, _source: u32) {
        self.note(info, "alSourcePlay");
    }
    fn al_source_pause(&mut self, info: &CallerInfo, _source: u32) {
        self.note(info, "alSourcePause");
    }
    fn al_source_stop(&mut self, info: &CallerInfo, _source: u32) {
        self.note(info, "alSourceStop");
    }
    fn al_source_rewind(&mut self, info: &CallerInfo, _source: u32) {
        self.note(info, "alSourceRewind");
    }
    fn al_source_queue_buffers(&mut self, info: &CallerInfo, _source: u32, _buffers: &[u32]) {
        self.note(info, "alSourceQueueBuffers");
    }
    fn al_source_unqueue_buffers(&mut self, info: &CallerInfo, _source: u32, _buffers: &[u32]) {
        self.note(info, "alSourceUnqueueBuffers");
    }

    fn al_listenerfv(&mut self, info: &CallerInfo, _param: i32, _values: &[f32]) {
        self.note(info, "alListenerfv");
    }
    fn al_get_listenerfv(&mut self, info: &CallerInfo, _param: i32, _values: &[f32]) {
        self.note(info, "alGetListenerfv");
    }

    fn al_distance_model(&mut self, info: &CallerInfo, _model: i32) {
        self.note(info, "alDistanceModel");
    }
    fn al_doppler_factor(&mut self, info: &CallerInfo, _value: f32) {
        self.note(info, "alDopplerFactor");
    }
    fn al_doppler_velocity(&mut self, info: &CallerInfo, _value: f32) {
        self.note(info, "alDopplerVelocity");
    }
    fn al_speed_of_sound(&mut self, info: &CallerInfo, _value: f32) {
        self.note(info, "alSpeedOfSound");
    }
    fn al_get_error(&mut self, info: &CallerInfo, _error: i32) {
        self.note(info, "alGetError");
    }
    fn al_get_string(&mut self, info: &CallerInfo, _param: i32, _value: Option<&str>) {
        self.note(info, "alGetString");
    }
    fn al_is_extension_present(&mut self, info: &CallerInfo, _extname: &str, _present: bool) {
        self.note(info, "alIsExtensionPresent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_one_event_per_call() {
        let mut stats = StatsVisitor::new();
        let info = CallerInfo {
            timestamp_ms: 10,
            thread_id: 1,
            raw_thread_id: 0xabc,
            stack_symbols: &[Some("main".to_string()), None],
            trace_scope: 0,
            file_offset: 8,
        };
        stats.alc_open_device(&info, Some("default"), 0x1000);
        stats.alc_open_device(&info, Some("default"), 0x1000);
        assert_eq!(stats.events_by_tag.get("alcOpenDevice"), Some(&2));
        assert_eq!(stats.total_frames, 4);
        assert_eq!(stats.unresolved_frames, 2);
        assert_eq!(stats.distinct_symbols.len(), 1);
        assert_eq!(stats.max_thread_id, 1);
    }
}
