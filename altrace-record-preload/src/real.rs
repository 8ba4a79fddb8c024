//! Resolves the real `libopenal` entry points this shim wraps.
//!
//! `altrace_record.c`'s `load_real_openal` populated a `REAL_*` function
//! pointer table via `dlsym` against an explicitly `dlopen`ed copy of the
//! real library, to sidestep recursing back into this same shim. Since
//! `LD_PRELOAD`/`DYLD_INSERT_LIBRARIES` guarantee this shim's symbols are
//! resolved first for every other module, `dlsym(RTLD_NEXT, ...)` finds the
//! *next* definition in the search order directly, without needing to know
//! the real library's path at all.

use std::ffi::CString;
use std::os::raw::c_void;

use altrace_openal_sys::*;

macro_rules! real_table {
    ($($field:ident : $ty:ty = $name:literal),* $(,)?) => {
        pub struct Real {
            $(pub $field: $ty,)*
        }

        impl Real {
            /// # Safety
            /// Must only be called after the dynamic linker has finished
            /// resolving this shim's own symbols (i.e. not before or during
            /// the constructor that calls it runs on some other thread).
            pub unsafe fn resolve() -> Self {
                Self {
                    $($field: {
                        let name = CString::new($name).expect("entry point name has no interior NUL");
                        let sym = libc::dlsym(libc::RTLD_NEXT, name.as_ptr());
                        if sym.is_null() {
                            altrace_record::recorder_fatal(concat!(
                                "could not resolve real entry point ",
                                $name
                            ));
                        }
                        std::mem::transmute::<*mut c_void, $ty>(sym)
                    },)*
                }
            }
        }
    };
}

real_table! {
    alc_open_device: unsafe extern "C" fn(*const ALCchar) -> *mut ALCdevice = "alcOpenDevice",
    alc_close_device: unsafe extern "C" fn(*mut ALCdevice) -> ALCboolean = "alcCloseDevice",
    alc_capture_open_device:
        unsafe extern "C" fn(*const ALCchar, ALCuint, ALCenum, ALCsizei) -> *mut ALCdevice
        = "alcCaptureOpenDevice",
    alc_capture_close_device: unsafe extern "C" fn(*mut ALCdevice) -> ALCboolean = "alcCaptureCloseDevice",
    alc_capture_start: unsafe extern "C" fn(*mut ALCdevice) = "alcCaptureStart",
    alc_capture_stop: unsafe extern "C" fn(*mut ALCdevice) = "alcCaptureStop",
    alc_capture_samples: unsafe extern "C" fn(*mut ALCdevice, *mut c_void, ALCsizei) = "alcCaptureSamples",
    alc_create_context:
        unsafe extern "C" fn(*mut ALCdevice, *const ALCint) -> *mut ALCcontext = "alcCreateContext",
    alc_destroy_context: unsafe extern "C" fn(*mut ALCcontext) = "alcDestroyContext",
    alc_make_context_current: unsafe extern "C" fn(*mut ALCcontext) -> ALCboolean = "alcMakeContextCurrent",
    alc_get_current_context: unsafe extern "C" fn() -> *mut ALCcontext = "alcGetCurrentContext",
    alc_get_contexts_device: unsafe extern "C" fn(*mut ALCcontext) -> *mut ALCdevice = "alcGetContextsDevice",
    alc_get_error: unsafe extern "C" fn(*mut ALCdevice) -> ALCenum = "alcGetError",
    alc_get_integerv: unsafe extern "C" fn(*mut ALCdevice, ALCenum, ALCsizei, *mut ALCint) = "alcGetIntegerv",
    alc_get_string: unsafe extern "C" fn(*mut ALCdevice, ALCenum) -> *const ALCchar = "alcGetString",
    alc_is_extension_present:
        unsafe extern "C" fn(*mut ALCdevice, *const ALCchar) -> ALCboolean = "alcIsExtensionPresent",

    al_gen_buffers: unsafe extern "C" fn(ALsizei, *mut ALuint) = "alGenBuffers",
    al_delete_buffers: unsafe extern "C" fn(ALsizei, *const ALuint) = "alDeleteBuffers",
    al_buffer_data: unsafe extern "C" fn(ALuint, ALenum, *const c_void, ALsizei, ALsizei) = "alBufferData",
    al_get_bufferi: unsafe extern "C" fn(ALuint, ALenum, *mut ALint) = "alGetBufferi",

    al_gen_sources: unsafe extern "C" fn(ALsizei, *mut ALuint) = "alGenSources",
    al_delete_sources: unsafe extern "C" fn(ALsizei, *const ALuint) = "alDeleteSources",
    al_sourcei: unsafe extern "C" fn(ALuint, ALenum, ALint) = "alSourcei",
    al_sourcefv: unsafe extern "C" fn(ALuint, ALenum, *const ALfloat) = "alSourcefv",
    al_get_sourcei: unsafe extern "C" fn(ALuint, ALenum, *mut ALint) = "alGetSourcei",
    al_get_sourcefv: unsafe extern "C" fn(ALuint, ALenum, *mut ALfloat) = "alGetSourcefv",
    al_source_play: unsafe extern "C" fn(ALuint) = "alSourcePlay",
    al_source_pause: unsafe extern "C" fn(ALuint) = "alSourcePause",
    al_source_stop: unsafe extern "C" fn(ALuint) = "alSourceStop",
    al_source_rewind: unsafe extern "C" fn(ALuint) = "alSourceRewind",
    al_source_queue_buffers: unsafe extern "C" fn(ALuint, ALsizei, *const ALuint) = "alSourceQueueBuffers",
    al_source_unqueue_buffers: unsafe extern "C" fn(ALuint, ALsizei, *mut ALuint) = "alSourceUnqueueBuffers",

    al_listenerfv: unsafe extern "C" fn(ALenum, *const ALfloat) = "alListenerfv",
    al_get_listenerfv: unsafe extern "C" fn(ALenum, *mut ALfloat) = "alGetListenerfv",

    al_distance_model: unsafe extern "C" fn(ALenum) = "alDistanceModel",
    al_doppler_factor: unsafe extern "C" fn(ALfloat) = "alDopplerFactor",
    al_doppler_velocity: unsafe extern "C" fn(ALfloat) = "alDopplerVelocity",
    al_speed_of_sound: unsafe extern "C" fn(ALfloat) = "alSpeedOfSound",
    al_get_error: unsafe extern "C" fn() -> ALenum = "alGetError",
    al_get_string: unsafe extern "C" fn(ALenum) -> *const ALchar = "alGetString",
    al_is_extension_present: unsafe extern "C" fn(*const ALchar) -> ALboolean = "alIsExtensionPresent",
}
