//! Personal information: birthdate and autocharge settings.

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    card::bits::get_bits,
    codec::{OVCHIP_EPOCH, decode_date},
    transit::Error,
};

/// Autocharge state byte of an enabled autocharge.
const AUTOCHARGE_ACTIVE: u8 = 0x05;

/// One block at 0x580 or 0x5A0, selected by the index. Only meaningful on
/// personal cards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Info {
    pub birthdate: Option<NaiveDate>,
    pub autocharge: bool,
    /// Balance below which autocharge tops up, in cents.
    pub autocharge_limit: u16,
    /// Amount autocharge adds, in cents.
    pub autocharge_charge: u16,
}

impl Info {
    pub const SIZE: usize = 16;

    pub fn parse(r: &[u8; Self::SIZE]) -> Result<Self, Error> {
        let birthdate = match get_bits(r, 0, 20)? {
            0 => None,
            days => Some(decode_date(OVCHIP_EPOCH, days)),
        };

        Ok(Self {
            birthdate,
            autocharge: r[3] == AUTOCHARGE_ACTIVE,
            autocharge_limit: get_bits(r, 32, 16)? as u16,
            autocharge_charge: get_bits(r, 48, 16)? as u16,
        })
    }
}
