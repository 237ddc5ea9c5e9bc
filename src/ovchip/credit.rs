//! The stored balance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tartan_bitfield::bitfield;

use crate::{
    card::bits::{get_bits, get_flag},
    transit::Error,
};

/// One block at 0xF90 or 0xFA0, selected by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Credit {
    pub banbits: u8,
    /// Slot identifier of this credit record.
    pub id: u16,
    /// Identifier of the last credit event applied.
    pub credit_id: u16,
    /// Balance in cents; negative when the card is overdrawn.
    pub credit: i32,
}

impl Credit {
    pub const SIZE: usize = 16;

    pub fn parse(r: &[u8; Self::SIZE]) -> Result<Self, Error> {
        let magnitude = get_bits(r, 78, 15)? as i32;

        // A clear sign bit stores the balance complemented.
        let credit = if get_flag(r, 77)? {
            magnitude
        } else {
            -(magnitude ^ 0x7FFF)
        };

        Ok(Self {
            banbits: r[0],
            id: get_bits(r, 8, 12)? as u16,
            credit_id: get_bits(r, 56, 12)? as u16,
            credit,
        })
    }

    pub fn is_banned(&self) -> bool {
        bitfield! {
            struct BanBits(u8) {
                [6..8] ban: u8,
            }
        }

        BanBits(self.banbits).ban() == 0b11
    }
}
