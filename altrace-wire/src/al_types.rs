//! The handful of OpenAL enum values the wire format and the shadow state
//! machine (spec §4.7) need to know the meaning of. Everything else is
//! carried as an opaque `i32`/`u32` (spec Open Question 2: treat
//! `isenum`-ambiguous values as integers until the audio-API spec is
//! consulted).

/// Cached source playback state, mirrors `AL_SOURCE_STATE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SourceState {
    Initial = 0x1011,
    Playing = 0x1012,
    Paused = 0x1013,
    Stopped = 0x1014,
}

impl SourceState {
    pub fn from_al(v: i32) -> Option<Self> {
        match v {
            0x1011 => Some(Self::Initial),
            0x1012 => Some(Self::Playing),
            0x1013 => Some(Self::Paused),
            0x1014 => Some(Self::Stopped),
            _ => None,
        }
    }

    pub fn to_al(self) -> i32 {
        self as i32
    }
}

/// The four calls that move a source through the state machine in §4.7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTransitionCall {
    Play,
    Pause,
    Stop,
    Rewind,
}

/// The oracle table from spec §4.7. The recorder never applies this table
/// itself — it re-queries the real implementation's post-call state and
/// diffs against the shadow. Tests use this table to assert the real
/// implementation (or a fake standing in for it) behaves as documented.
pub fn expected_transition(from: SourceState, call: SourceTransitionCall) -> SourceState {
    use SourceState::*;
    use SourceTransitionCall::*;
    match (from, call) {
        (_, Play) => Playing,
        (Initial, Pause) => Initial,
        (Initial, Stop) => Initial,
        (Initial, Rewind) => Initial,
        (Playing, Pause) => Paused,
        (Playing, Stop) => Stopped,
        (Playing, Rewind) => Initial,
        (Paused, Pause) => Paused,
        (Paused, Stop) => Stopped,
        (Paused, Rewind) => Initial,
        (Stopped, Pause) => Stopped,
        (Stopped, Stop) => Stopped,
        (Stopped, Rewind) => Initial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SourceState::*;
    use SourceTransitionCall::*;

    #[test]
    fn transition_table_matches_spec() {
        assert_eq!(expected_transition(Initial, Play), Playing);
        assert_eq!(expected_transition(Playing, Stop), Stopped);
        assert_eq!(expected_transition(Paused, Rewind), Initial);
        assert_eq!(expected_transition(Stopped, Pause), Stopped);
    }
}
