//! `altrace dump`: a [`Visitor`] that prints one line per event, in the
//! "read records, print them" shape of `etw-reader/examples/dump.rs`.

use altrace_play::{CallerInfo, Visitor};

pub struct DumpVisitor {
    thread_filter: Option<u32>,
    from_offset: u64,
}

impl DumpVisitor {
    pub fn new(thread_filter: Option<u32>, from_offset: u64) -> Self {
        Self {
            thread_filter,
            from_offset,
        }
    }

    fn visible(&self, info: &CallerInfo) -> bool {
        if info.file_offset < self.from_offset {
            return false;
        }
        match self.thread_filter {
            Some(t) => info.thread_id == t,
            None => true,
        }
    }

    fn head(&self, info: &CallerInfo, name: &str) -> Option<String> {
        if !self.visible(info) {
            return None;
        }
        Some(format!(
            "{:#010x} t{} @{}ms scope={} {name}",
            info.file_offset, info.thread_id, info.timestamp_ms, info.trace_scope
        ))
    }
}

fn fmt_label(label: Option<&str>) -> String {
    match label {
        Some(s) => format!("{s:?}"),
        None => "<none>".to_string(),
    }
}

fn fmt_str(s: Option<&str>) -> String {
    match s {
        Some(s) => format!("{s:?}"),
        None => "<null>".to_string(),
    }
}

impl Visitor for DumpVisitor {
    fn progress(&mut self, offset: u64, size: u64) -> bool {
        log::debug!("altrace dump: {offset}/{size} bytes");
        true
    }

    fn eos(&mut self, clean: bool, final_timestamp_ms: u32) {
        println!("-- eos (clean={clean}, t={final_timestamp_ms}ms) --");
    }

    fn device_label(&mut self, info: &CallerInfo, device: u64, label: Option<&str>) {
        if let Some(head) = self.head(info, "device-label") {
            println!("{head} device={device:#x} label={}", fmt_label(label));
        }
    }

    fn context_label(&mut self, info: &CallerInfo, context: u64, label: Option<&str>) {
        if let Some(head) = self.head(info, "context-label") {
            println!("{head} context={context:#x} label={}", fmt_label(label));
        }
    }

    fn source_label(&mut self, info: &CallerInfo, source: u32, label: Option<&str>) {
        if let Some(head) = self.head(info, "source-label") {
            println!("{head} source={source} label={}", fmt_label(label));
        }
    }

    fn buffer_label(&mut self, info: &CallerInfo, buffer: u32, label: Option<&str>) {
        if let Some(head) = self.head(info, "buffer-label") {
            println!("{head} buffer={buffer} label={}", fmt_label(label));
        }
    }

    fn trace_message(&mut self, info: &CallerInfo, message: &str) {
        if let Some(head) = self.head(info, "message") {
            println!("{head} {message:?}");
        }
    }

    fn push_scope(&mut self, info: &CallerInfo, name: &str) {
        if let Some(head) = self.head(info, "push-scope") {
            println!("{head} {name:?}");
        }
    }

    fn pop_scope(&mut self, info: &CallerInfo) {
        if let Some(head) = self.head(info, "pop-scope") {
            println!("{head}");
        }
    }

    fn al_error_triggered(&mut self, error: i32) {
        println!("            al-error error={error:#x}");
    }

    fn alc_error_triggered(&mut self, device: u64, error: i32) {
        println!("            alc-error device={device:#x} error={error:#x}");
    }

    fn device_state_changed_bool(&mut self, device: u64, param: i32, value: bool) {
        println!("            device-state-bool device={device:#x} param={param:#x} value={value}");
    }

    fn device_state_changed_int(&mut self, device: u64, param: i32, values: &[i32]) {
        println!("            device-state-int device={device:#x} param={param:#x} values={values:?}");
    }

    fn context_state_changed_enum(&mut self, context: u64, param: i32, value: i32) {
        println!("            context-state-enum context={context:#x} param={param:#x} value={value:#x}");
    }

    fn context_state_changed_float(&mut self, context: u64, param: i32, value: f32) {
        println!("            context-state-float context={context:#x} param={param:#x} value={value}");
    }

    fn context_state_changed_string(&mut self, context: u64, param: i32, value: Option<&str>) {
        println!(
            "            context-state-string context={context:#x} param={param:#x} value={}",
            fmt_str(value)
        );
    }

    fn listener_state_changed_floatv(&mut self, param: i32, values: &[f32]) {
        println!("            listener-state-floatv param={param:#x} values={values:?}");
    }

    fn source_state_changed_bool(&mut self, source: u32, param: i32, value: bool) {
        println!("            source-state-bool source={source} param={param:#x} value={value}");
    }

    fn source_state_changed_enum(&mut self, source: u32, param: i32, value: i32) {
        println!("            source-state-enum source={source} param={param:#x} value={value:#x}");
    }

    fn source_state_changed_float(&mut self, source: u32, param: i32, value: f32) {
        println!("            source-state-float source={source} param={param:#x} value={value}");
    }

    fn source_state_changed_float3(&mut self, source: u32, param: i32, values: [f32; 3]) {
        println!("            source-state-float3 source={source} param={param:#x} values={values:?}");
    }

    fn source_state_changed_int(&mut self, source: u32, param: i32, value: i32) {
        println!("            source-state-int source={source} param={param:#x} value={value}");
    }

    fn source_state_changed_uint(&mut self, source: u32, param: i32, value: u32) {
        println!("            source-state-uint source={source} param={param:#x} value={value}");
    }

    fn buffer_state_changed_int(&mut self, buffer: u32, param: i32, value: i32) {
        println!("            buffer-state-int buffer={buffer} param={param:#x} value={value}");
    }

    fn alc_open_device(&mut self, info: &CallerInfo, devicename: Option<&str>, device: u64) {
        if let Some(head) = self.head(info, "alcOpenDevice") {
            println!("{head} name={} -> device={device:#x}", fmt_str(devicename));
        }
    }

    fn alc_close_device(&mut self, info: &CallerInfo, device: u64, success: bool) {
        if let Some(head) = self.head(info, "alcCloseDevice") {
            println!("{head} device={device:#x} -> {success}");
        }
    }

    fn alc_capture_open_device(
        &mut self,
        info: &CallerInfo,
        devicename: Option<&str>,
        frequency: u32,
        format: i32,
        buffersize: i32,
        device: u64,
    ) {
        if let Some(head) = self.head(info, "alcCaptureOpenDevice") {
            println!(
                "{head} name={} freq={frequency} format={format:#x} buffersize={buffersize} -> device={device:#x}",
                fmt_str(devicename)
            );
        }
    }

    fn alc_capture_close_device(&mut self, info: &CallerInfo, device: u64, success: bool) {
        if let Some(head) = self.head(info, "alcCaptureCloseDevice") {
            println!("{head} device={device:#x} -> {success}");
        }
    }

    fn alc_capture_start(&mut self, info: &CallerInfo, device: u64) {
        if let Some(head) = self.head(info, "alcCaptureStart") {
            println!("{head} device={device:#x}");
        }
    }

    fn alc_capture_stop(&mut self, info: &CallerInfo, device: u64) {
        if let Some(head) = self.head(info, "alcCaptureStop") {
            println!("{head} device={device:#x}");
        }
    }

    fn alc_capture_samples(&mut self, info: &CallerInfo, device: u64, samples: i32) {
        if let Some(head) = self.head(info, "alcCaptureSamples") {
            println!("{head} device={device:#x} samples={samples}");
        }
    }

    fn alc_create_context(&mut self, info: &CallerInfo, device: u64, attrs: &[i32], context: u64) {
        if let Some(head) = self.head(info, "alcCreateContext") {
            println!("{head} device={device:#x} attrs={attrs:?} -> context={context:#x}");
        }
    }

    fn alc_destroy_context(&mut self, info: &CallerInfo, context: u64) {
        if let Some(head) = self.head(info, "alcDestroyContext") {
            println!("{head} context={context:#x}");
        }
    }

    fn alc_make_context_current(&mut self, info: &CallerInfo, context: u64, success: bool) {
        if let Some(head) = self.head(info, "alcMakeContextCurrent") {
            println!("{head} context={context:#x} -> {success}");
        }
    }

    fn alc_get_current_context(&mut self, info: &CallerInfo, context: u64) {
        if let Some(head) = self.head(info, "alcGetCurrentContext") {
            println!("{head} -> context={context:#x}");
        }
    }

    fn alc_get_contexts_device(&mut self, info: &CallerInfo, context: u64, device: u64) {
        if let Some(head) = self.head(info, "alcGetContextsDevice") {
            println!("{head} context={context:#x} -> device={device:#x}");
        }
    }

    fn alc_get_error(&mut self, info: &CallerInfo, device: u64, error: i32) {
        if let Some(head) = self.head(info, "alcGetError") {
            println!("{head} device={device:#x} -> {error:#x}");
        }
    }

    fn alc_get_integerv(&mut self, info: &CallerInfo, device: u64, param: i32, values: &[i32]) {
        if let Some(head) = self.head(info, "alcGetIntegerv") {
            println!("{head} device={device:#x} param={param:#x} -> {values:?}");
        }
    }

    fn alc_get_string(&mut self, info: &CallerInfo, device: u64, param: i32, value: Option<&str>) {
        if let Some(head) = self.head(info, "alcGetString") {
            println!("{head} device={device:#x} param={param:#x} -> {}", fmt_str(value));
        }
    }

    fn alc_is_extension_present(&mut self, info: &CallerInfo, device: u64, extname: &str, present: bool) {
        if let Some(head) = self.head(info, "alcIsExtensionPresent") {
            println!("{head} device={device:#x} extname={extname:?} -> {present}");
        }
    }

    fn al_gen_buffers(&mut self, info: &CallerInfo, buffers: &[u32]) {
        if let Some(head) = self.head(info, "alGenBuffers") {
            println!("{head} -> {buffers:?}");
        }
    }

    fn al_delete_buffers(&mut self, info: &CallerInfo, buffers: &[u32]) {
        if let Some(head) = self.head(info, "alDeleteBuffers") {
            println!("{head} {buffers:?}");
        }
    }

    fn al_buffer_data(&mut self, info: &CallerInfo, buffer: u32, format: i32, data: Option<&[u8]>, size: i32, freq: i32) {
        if let Some(head) = self.head(info, "alBufferData") {
            println!(
                "{head} buffer={buffer} format={format:#x} data_len={} size={size} freq={freq}",
                data.map(<[u8]>::len).unwrap_or(0)
            );
        }
    }

    fn al_get_bufferi(&mut self, info: &CallerInfo, buffer: u32, param: i32, value: i32) {
        if let Some(head) = self.head(info, "alGetBufferi") {
            println!("{head} buffer={buffer} param={param:#x} -> {value}");
        }
    }

    fn al_gen_sources(&mut self, info: &CallerInfo, sources: &[u32]) {
        if let Some(head) = self.head(info, "alGenSources") {
            println!("{head} -> {sources:?}");
        }
    }

    fn al_delete_sources(&mut self, info: &CallerInfo, sources: &[u32]) {
        if let Some(head) = self.head(info, "alDeleteSources") {
            println!("{head} {sources:?}");
        }
    }

    fn al_sourcei(&mut self, info: &CallerInfo, source: u32, param: i32, value: i32) {
        if let Some(head) = self.head(info, "alSourcei") {
            println!("{head} source={source} param={param:#x} value={value}");
        }
    }

    fn al_sourcefv(&mut self, info: &CallerInfo, source: u32, param: i32, values: &[f32]) {
        if let Some(head) = self.head(info, "alSourcefv") {
            println!("{head} source={source} param={param:#x} values={values:?}");
        }
    }

    fn al_get_sourcei(&mut self, info: &CallerInfo, source: u32, param: i32, value: i32) {
        if let Some(head) = self.head(info, "alGetSourcei") {
            println!("{head} source={source} param={param:#x} -> {value}");
        }
    }

    fn al_get_sourcefv(&mut self, info: &CallerInfo, source: u32, param: i32, values: &[f32]) {
        if let Some(head) = self.head(info, "alGetSourcefv") {
            println!("{head} source={source} param={param:#x} -> {values:?}");
        }
    }

    fn al_source_play(&mut self, info: &CallerInfo, source: u32) {
        if let Some(head) = self.head(info, "alSourcePlay") {
            println!("{head} source={source}");
        }
    }

    fn al_source_pause(&mut self, info: &CallerInfo, source: u32) {
        if let Some(head) = self.head(info, "alSourcePause") {
            println!("{head} source={source}");
        }
    }

    fn al_source_stop(&mut self, info: &CallerInfo, source: u32) {
        if let Some(head) = self.head(info, "alSourceStop") {
            println!("{head} source={source}");
        }
    }

    fn al_source_rewind(&mut self, info: &CallerInfo, source: u32) {
        if let Some(head) = self.head(info, "alSourceRewind") {
            println!("{head} source={source}");
        }
    }

    fn al_source_queue_buffers(&mut self, info: &CallerInfo, source: u32, buffers: &[u32]) {
        if let Some(head) = self.head(info, "alSourceQueueBuffers") {
            println!("{head} source={source} buffers={buffers:?}");
        }
    }

    fn al_source_unqueue_buffers(&mut self, info: &CallerInfo, source: u32, buffers: &[u32]) {
        if let Some(head) = self.head(info, "alSourceUnqueueBuffers") {
            println!("{head} source={source} buffers={buffers:?}");
        }
    }

    fn al_listenerfv(&mut self, info: &CallerInfo, param: i32, values: &[f32]) {
        if let Some(head) = self.head(info, "alListenerfv") {
            println!("{head} param={param:#x} values={values:?}");
        }
    }

    fn al_get_listenerfv(&mut self, info: &CallerInfo, param: i32, values: &[f32]) {
        if let Some(head) = self.head(info, "alGetListenerfv") {
            println!("{head} param={param:#x} -> {values:?}");
        }
    }

    fn al_distance_model(&mut self, info: &CallerInfo, model: i32) {
        if let Some(head) = self.head(info, "alDistanceModel") {
            println!("{head} model={model:#x}");
        }
    }

    fn al_doppler_factor(&mut self, info: &CallerInfo, value: f32) {
        if let Some(head) = self.head(info, "alDopplerFactor") {
            println!("{head} value={value}");
        }
    }

    fn al_doppler_velocity(&mut self, info: &CallerInfo, value: f32) {
        if let Some(head) = self.head(info, "alDopplerVelocity") {
            println!("{head} value={value}");
        }
    }

    fn al_speed_of_sound(&mut self, info: &CallerInfo, value: f32) {
        if let Some(head) = self.head(info, "alSpeedOfSound") {
            println!("{head} value={value}");
        }
    }

    fn al_get_error(&mut self, info: &CallerInfo, error: i32) {
        if let Some(head) = self.head(info, "alGetError") {
            println!("{head} -> {error:#x}");
        }
    }

    fn al_get_string(&mut self, info: &CallerInfo, param: i32, value: Option<&str>) {
        if let Some(head) = self.head(info, "alGetString") {
            println!("{head} param={param:#x} -> {}", fmt_str(value));
        }
    }

    fn al_is_extension_present(&mut self, info: &CallerInfo, extname: &str, present: bool) {
        if let Some(head) = self.head(info, "alIsExtensionPresent") {
            println!("{head} extname={extname:?} -> {present}");
        }
    }
}
