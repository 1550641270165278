//! Driver intent sampled once per frame.
//!
//! The physics step only ever sees a [`DriveIntent`]; how it was produced (keyboard,
//! gamepad, replay, test script) is the caller's business.

use crate::{
    bitmask_flags::{BitmaskFlags, FlagBitmask},
    define_bitmask_flags,
};

define_bitmask_flags!(DriveFlag, u8, {
    Forward,
    Backward,
    Left,
    Right,
    Brake,
});

/// Which controls are held this frame.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DriveIntent {
    flags: BitmaskFlags<u8>,
}

impl DriveIntent {
    pub const NONE: Self = Self {
        flags: BitmaskFlags { bits: 0 },
    };

    pub fn new(forward: bool, backward: bool, left: bool, right: bool, brake: bool) -> Self {
        let mut intent = Self::default();
        intent.flags.set(DriveFlag::Forward, forward);
        intent.flags.set(DriveFlag::Backward, backward);
        intent.flags.set(DriveFlag::Left, left);
        intent.flags.set(DriveFlag::Right, right);
        intent.flags.set(DriveFlag::Brake, brake);
        intent
    }

    /// Builder-style helper used by tests and scripted input.
    pub fn with(mut self, flag: DriveFlag) -> Self {
        self.flags.add(flag);
        self
    }

    pub fn set(&mut self, flag: DriveFlag, held: bool) {
        self.flags.set(flag, held);
    }

    #[inline]
    pub fn forward(&self) -> bool {
        self.flags.has(DriveFlag::Forward)
    }

    #[inline]
    pub fn backward(&self) -> bool {
        self.flags.has(DriveFlag::Backward)
    }

    #[inline]
    pub fn left(&self) -> bool {
        self.flags.has(DriveFlag::Left)
    }

    #[inline]
    pub fn right(&self) -> bool {
        self.flags.has(DriveFlag::Right)
    }

    #[inline]
    pub fn brake(&self) -> bool {
        self.flags.has(DriveFlag::Brake)
    }

    pub fn is_idle(&self) -> bool {
        self.flags.is_empty()
    }

    /// Raw packed bits; handy for logging and replay capture.
    pub fn bits(&self) -> u8 {
        self.flags.bits
    }

    pub fn from_bits(bits: u8) -> Self {
        let mask = [
            DriveFlag::Forward,
            DriveFlag::Backward,
            DriveFlag::Left,
            DriveFlag::Right,
            DriveFlag::Brake,
        ]
        .iter()
        .fold(0u8, |acc, f| acc | f.mask());
        Self {
            flags: BitmaskFlags::new(bits & mask),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_maps_each_flag() {
        let intent = DriveIntent::new(true, false, true, false, true);
        assert!(intent.forward());
        assert!(!intent.backward());
        assert!(intent.left());
        assert!(!intent.right());
        assert!(intent.brake());
        assert!(!intent.is_idle());
        assert!(DriveIntent::NONE.is_idle());
    }

    #[test]
    fn from_bits_drops_unknown_bits() {
        let intent = DriveIntent::from_bits(0xFF);
        assert_eq!(intent.bits(), 0b1_1111);
        assert_eq!(
            DriveIntent::from_bits(intent.bits()),
            DriveIntent::new(true, true, true, true, true)
        );
    }
}
