//! Input Capture and Edge Detection
//!
//! The host polls key-down state once per frame and hands it to the
//! simulation as an [`InputFrame`]. Discrete actions (flap, confirm) are
//! derived inside the simulation with [`KeyLatch`], so a held key acts
//! exactly once per press-and-release cycle.

use serde::{Serialize, Deserialize};

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Raw key-down state for a single frame.
///
/// NO tick field - the frame index is its position in a recording.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputFrame {
    /// Key-down flags (packed bits):
    /// - Bit 0: flap key is down
    /// - Bit 1: confirm key is down
    /// - Bit 2-7: Reserved
    pub flags: u8,
}

impl InputFrame {
    /// Flap key bit
    pub const FLAG_FLAP: u8 = 0x01;

    /// Confirm key bit
    pub const FLAG_CONFIRM: u8 = 0x02;

    /// Create a new empty input frame (no key down).
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Frame with only the flap key down.
    pub const fn flap() -> Self {
        Self { flags: Self::FLAG_FLAP }
    }

    /// Frame with only the confirm key down.
    pub const fn confirm() -> Self {
        Self { flags: Self::FLAG_CONFIRM }
    }

    /// Build a frame from polled key state.
    pub const fn from_keys(flap_down: bool, confirm_down: bool) -> Self {
        let mut flags = 0;
        if flap_down {
            flags |= Self::FLAG_FLAP;
        }
        if confirm_down {
            flags |= Self::FLAG_CONFIRM;
        }
        Self { flags }
    }

    /// Is the flap key down this frame?
    #[inline]
    pub fn flap_down(&self) -> bool {
        self.flags & Self::FLAG_FLAP != 0
    }

    /// Is the confirm key down this frame?
    #[inline]
    pub fn confirm_down(&self) -> bool {
        self.flags & Self::FLAG_CONFIRM != 0
    }
}

// =============================================================================
// EDGE DETECTION
// =============================================================================

/// Rising-edge detector for one key.
///
/// Remembers whether the key was down on the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLatch {
    held: bool,
}

impl KeyLatch {
    /// Feed this frame's key-down state.
    ///
    /// Returns true only on the frame the key goes from up to down.
    #[inline]
    pub fn rising_edge(&mut self, down: bool) -> bool {
        let edge = down && !self.held;
        self.held = down;
        edge
    }

    /// Was the key down on the last frame fed in?
    #[inline]
    pub fn is_held(&self) -> bool {
        self.held
    }
}
