//! Asynchronous tuner event types.
//!
//! Events are emitted through a [`tokio::sync::broadcast`] channel whenever
//! an observable field of the radio changes. UI layers subscribe to these
//! for live updates without polling the driver.

/// An event emitted when an observable field of the radio changes.
///
/// Events are change notifications: a field that is written with its
/// current value emits nothing. Delivery is best-effort through a bounded
/// broadcast channel; slow consumers may miss events under load (e.g. a
/// strong RDS station updating radio text every few groups).
#[derive(Debug, Clone)]
pub enum TunerEvent {
    /// The chip was powered up or shut down.
    PowerChanged {
        /// `true` if the chip is now powered and tuned.
        on: bool,
    },

    /// The tuned frequency changed.
    FrequencyChanged {
        /// New frequency in tenths of a MHz (e.g. 1013 for 101.3 MHz).
        tenths: u16,
    },

    /// The audio volume changed.
    VolumeChanged {
        /// New volume level, 0 (mute) through 15.
        level: u16,
    },

    /// A new signal strength sample.
    SignalStrength {
        /// Received signal strength indicator.
        rssi: u16,
    },

    /// Stereo pilot detection changed.
    StereoChanged {
        /// `true` if a stereo broadcast is being received.
        stereo: bool,
    },

    /// The RDS program identifier changed (usually means a new station).
    ProgramIdentifierChanged {
        /// 16-bit program identifier from RDS block A.
        pi: u16,
    },

    /// The RDS program type code changed.
    ProgramTypeChanged {
        /// 5-bit program type code; see `tunerlib-rds` for name lookup.
        pty: u8,
    },

    /// A confirmed RDS station name became available or changed.
    ProgramNameChanged {
        /// Up to 8 characters of station name.
        name: String,
    },

    /// A complete RDS radio text message was assembled.
    RadioTextChanged {
        /// Up to 64 characters of free-form text.
        text: String,
    },

    /// An RDS clock-time group was decoded.
    ClockTime {
        /// Local time as minutes after midnight. Not latched in the state
        /// snapshot; emitted on every clock-time group.
        minutes_after_midnight: i32,
    },
}
