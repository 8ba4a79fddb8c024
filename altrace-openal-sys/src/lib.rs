//! Raw FFI surface for the handful of OpenAL/ALC entry points the recorder
//! needs to call through to (§1: "the loader that finds the real audio
//! library ... is an external collaborator and is NOT specified here
//! beyond its interface to the core"). This crate is that interface: it
//! declares the C ABI, nothing else. Resolving the symbols against a real
//! `libopenal` at runtime (via `dlopen`/`dlsym` or a static link) is the
//! loader's job, not this crate's.
#![allow(non_camel_case_types, non_snake_case)]

use std::os::raw::{c_char, c_double, c_float, c_int, c_void};

pub type ALCdevice = c_void;
pub type ALCcontext = c_void;
pub type ALenum = c_int;
pub type ALCenum = c_int;
pub type ALboolean = c_char;
pub type ALCboolean = c_char;
pub type ALuint = u32;
pub type ALint = c_int;
pub type ALCint = c_int;
pub type ALCuint = u32;
pub type ALsizei = c_int;
pub type ALCsizei = c_int;
pub type ALfloat = c_float;
pub type ALdouble = c_double;
pub type ALchar = c_char;
pub type ALCchar = c_char;

pub const AL_FALSE: ALboolean = 0;
pub const AL_TRUE: ALboolean = 1;
pub const AL_NO_ERROR: ALenum = 0;
pub const ALC_NO_ERROR: ALCenum = 0;

pub const AL_FORMAT_MONO8: ALenum = 0x1100;
pub const AL_FORMAT_MONO16: ALenum = 0x1101;
pub const AL_FORMAT_STEREO8: ALenum = 0x1102;
pub const AL_FORMAT_STEREO16: ALenum = 0x1103;

pub const AL_SOURCE_RELATIVE: ALenum = 0x202;
pub const AL_LOOPING: ALenum = 0x1007;
pub const AL_SOURCE_STATE: ALenum = 0x1010;
pub const AL_INITIAL: ALenum = 0x1011;
pub const AL_PLAYING: ALenum = 0x1012;
pub const AL_PAUSED: ALenum = 0x1013;
pub const AL_STOPPED: ALenum = 0x1014;

pub const AL_BUFFER: ALenum = 0x1009;
pub const AL_BUFFERS_QUEUED: ALenum = 0x1015;
pub const AL_BUFFERS_PROCESSED: ALenum = 0x1016;

/// Context static-state query params (§4.5 "Context static state ... fetched
/// once per context, the first time that context becomes current"). These
/// name `alGetString` parameters, not `alcGetString` ones: vendor/renderer/
/// version/extensions are AL-scoped strings of the *current* context, unlike
/// `ALC_EXTENSIONS` which names a specific device.
pub const AL_VENDOR: ALenum = 0xB001;
pub const AL_VERSION: ALenum = 0xB002;
pub const AL_RENDERER: ALenum = 0xB003;
pub const AL_EXTENSIONS: ALenum = 0xB004;

pub const ALC_CONNECTED: ALCenum = 0x313;
pub const ALC_CAPTURE_SAMPLES: ALCenum = 0x312;
pub const ALC_MAJOR_VERSION: ALCenum = 0x1000;
pub const ALC_MINOR_VERSION: ALCenum = 0x1001;
pub const ALC_EXTENSIONS: ALCenum = 0x1006;
pub const ALC_DEVICE_SPECIFIER: ALCenum = 0x1005;
pub const ALC_CAPTURE_DEVICE_SPECIFIER: ALCenum = 0x310;

// The real shared library exposes these under a C ABI with no name
// mangling; the loader resolves them (by dlsym or static link) and the
// recorder calls through this `extern "C"` block. No body is provided
// here: this crate only describes the interface.
extern "C" {
    pub fn alcOpenDevice(devicename: *const ALCchar) -> *mut ALCdevice;
    pub fn alcCloseDevice(device: *mut ALCdevice) -> ALCboolean;
    pub fn alcCaptureOpenDevice(
        devicename: *const ALCchar,
        frequency: ALCuint,
        format: ALCenum,
        buffersize: ALCsizei,
    ) -> *mut ALCdevice;
    pub fn alcCaptureCloseDevice(device: *mut ALCdevice) -> ALCboolean;
    pub fn alcCaptureStart(device: *mut ALCdevice);
    pub fn alcCaptureStop(device: *mut ALCdevice);
    pub fn alcCaptureSamples(device: *mut ALCdevice, buffer: *mut c_void, samples: ALCsizei);
    pub fn alcCreateContext(device: *mut ALCdevice, attrlist: *const ALCint) -> *mut ALCcontext;
    pub fn alcDestroyContext(ctx: *mut ALCcontext);
    pub fn alcMakeContextCurrent(ctx: *mut ALCcontext) -> ALCboolean;
    pub fn alcGetCurrentContext() -> *mut ALCcontext;
    pub fn alcGetContextsDevice(ctx: *mut ALCcontext) -> *mut ALCdevice;
    pub fn alcGetError(device: *mut ALCdevice) -> ALCenum;
    pub fn alcGetIntegerv(device: *mut ALCdevice, param: ALCenum, size: ALCsizei, values: *mut ALCint);
    pub fn alcGetString(device: *mut ALCdevice, param: ALCenum) -> *const ALCchar;
    pub fn alcIsExtensionPresent(device: *mut ALCdevice, extname: *const ALCchar) -> ALCboolean;

    pub fn alGenBuffers(n: ALsizei, buffers: *mut ALuint);
    pub fn alDeleteBuffers(n: ALsizei, buffers: *const ALuint);
    pub fn alBufferData(
        buffer: ALuint,
        format: ALenum,
        data: *const c_void,
        size: ALsizei,
        freq: ALsizei,
    );
    pub fn alGetBufferi(buffer: ALuint, param: ALenum, value: *mut ALint);

    pub fn alGenSources(n: ALsizei, sources: *mut ALuint);
    pub fn alDeleteSources(n: ALsizei, sources: *const ALuint);
    pub fn alSourcei(source: ALuint, param: ALenum, value: ALint);
    pub fn alSourcefv(source: ALuint, param: ALenum, values: *const ALfloat);
    pub fn alGetSourcei(source: ALuint, param: ALenum, value: *mut ALint);
    pub fn alGetSourcefv(source: ALuint, param: ALenum, values: *mut ALfloat);
    pub fn alSourcePlay(source: ALuint);
    pub fn alSourcePause(source: ALuint);
    pub fn alSourceStop(source: ALuint);
    pub fn alSourceRewind(source: ALuint);
    pub fn alSourceQueueBuffers(source: ALuint, n: ALsizei, buffers: *const ALuint);
    pub fn alSourceUnqueueBuffers(source: ALuint, n: ALsizei, buffers: *mut ALuint);

    pub fn alListenerfv(param: ALenum, values: *const ALfloat);
    pub fn alGetListenerfv(param: ALenum, values: *mut ALfloat);

    pub fn alDistanceModel(distance_model: ALenum);
    pub fn alDopplerFactor(value: ALfloat);
    pub fn alDopplerVelocity(value: ALfloat);
    pub fn alSpeedOfSound(value: ALfloat);
    pub fn alGetError() -> ALenum;
    pub fn alGetString(param: ALenum) -> *const ALchar;
    pub fn alIsExtensionPresent(extname: *const ALchar) -> ALboolean;
    pub fn alGetEnumValue(ename: *const ALchar) -> ALenum;
}
