//! The index: where the freshest record of each circular buffer lives.

use alloc::vec::Vec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tartan_bitfield::bitfield;

use crate::{card::bits::get_bits, transit::Error};

/// Number of subscription pointers in an index.
pub const SUBSCRIPTION_POINTERS: usize = 12;

/// Sector 39, blocks 11 to 14: two copies of the index, the fresher of which
/// is current.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Index {
    /// Generation counter of the selected copy.
    pub generation: u16,
    pub recent_transaction_slot: u8,
    pub recent_info_slot: u8,
    pub recent_subscription_slot: u8,
    pub recent_travelhistory_slot: u8,
    pub recent_credit_slot: u8,
    /// Subscription slot numbers, 1-based; 0 marks an empty pointer.
    pub subscription_index: [u8; SUBSCRIPTION_POINTERS],
}

impl Index {
    pub const SIZE: usize = 64;

    pub fn parse(r: &[u8; Self::SIZE]) -> Result<Self, Error> {
        let (first, second) = r.split_at(Self::SIZE / 2);

        // Ties go to the first copy.
        let copy = if get_bits(second, 8, 16)? > get_bits(first, 8, 16)? {
            second
        } else {
            first
        };

        bitfield! {
            struct SlotFlags(u8) {
                [7] info,
                [6] credit,
            }
        }

        let flags = SlotFlags(copy[3]);

        let subscription_index = (0..SUBSCRIPTION_POINTERS)
            .map(|i| get_bits(copy, 48 + i * 4, 4).map(|n| n as u8))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pointers = [0; SUBSCRIPTION_POINTERS];
        pointers.copy_from_slice(&subscription_index);

        Ok(Self {
            generation: get_bits(copy, 8, 16)? as u16,
            recent_transaction_slot: get_bits(copy, 32, 5)? as u8,
            recent_info_slot: u8::from(flags.info()),
            recent_subscription_slot: get_bits(copy, 42, 4)? as u8,
            recent_travelhistory_slot: get_bits(copy, 37, 5)? as u8,
            recent_credit_slot: u8::from(flags.credit()),
            subscription_index: pointers,
        })
    }

    /// Subscription slots in use, in index order.
    pub fn subscription_slots(&self) -> impl Iterator<Item = u8> + '_ {
        self.subscription_index.iter().copied().filter(|&n| n != 0)
    }
}
