//! The card preamble: identifiers, expiry and card type.

use alloc::string::String;
use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zerocopy::FromBytes;

use crate::{
    card::bits::get_bits,
    codec::{OVCHIP_EPOCH, decode_date, hex},
    transit::Error,
};

/// Card type tag of a personal card; every other value is anonymous.
pub const TYPE_PERSONAL: u8 = 2;

/// The first block of the card, holding the card identifiers.
#[repr(C, packed)]
#[derive(FromBytes)]
pub(super) struct IdBlock {
    pub(super) id: [u8; 4],
    pub(super) checkbit: u8,
    pub(super) manufacturer: [u8; 5],
    pub(super) publisher: [u8; 6],
}

/// Sector 0, blocks 0 to 2.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Preamble {
    pub id: String,
    pub checkbit: u8,
    pub manufacturer: String,
    pub publisher: String,
    /// Day offset of the expiry date.
    pub expdate: u32,
    pub card_type: u8,
}

impl Preamble {
    pub const SIZE: usize = 48;

    pub fn parse(r: &[u8; Self::SIZE]) -> Result<Self, Error> {
        let mut block = [0; 16];
        block.copy_from_slice(&r[..16]);

        let IdBlock {
            id,
            checkbit,
            manufacturer,
            publisher,
        } = zerocopy::transmute!(block);

        Ok(Self {
            id: hex(&id),
            checkbit,
            manufacturer: hex(&manufacturer),
            publisher: hex(&publisher),
            expdate: get_bits(r, 216, 20)?,
            card_type: get_bits(r, 276, 4)? as u8,
        })
    }

    pub fn is_personal(&self) -> bool {
        self.card_type == TYPE_PERSONAL
    }

    pub fn expiry_date(&self) -> NaiveDate {
        decode_date(OVCHIP_EPOCH, self.expdate)
    }
}
