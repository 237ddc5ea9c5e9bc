//! Entries of the transaction log.

use chrono::NaiveDateTime;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tartan_bitfield::bitfield;

use crate::{
    card::bits::get_bits,
    codec::{OVCHIP_EPOCH, decode_datetime},
    transit::Error,
    trip::Tap,
};

use super::AGENCY_NS;

/// Minute of the day at which NS closes trips left open overnight.
const NS_DAY_CHANGE: u16 = 4 * 60;

/// What a terminal did when it logged a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Process {
    Purchase,
    CheckIn,
    CheckOut,
    Transfer,
    Banned,
    Credit,
    /// The slot has never been written.
    NoData,
    Unknown(u8),
}

impl Process {
    fn from_code(code: u8) -> Self {
        match code {
            0x0 => Process::Purchase,
            0x1 => Process::CheckIn,
            0x2 => Process::CheckOut,
            0x6 => Process::Transfer,
            0x7 => Process::Banned,
            0xE => Process::Credit,
            code => Process::Unknown(code),
        }
    }
}

/// A 32-byte slot of the circular transaction log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transaction {
    /// Position in the log, which is not its chronological order.
    pub slot: u8,
    /// Sequence id, increasing in write order.
    pub id: u16,
    pub process: Process,
    pub valid: bool,
    /// Day offset.
    pub date: u16,
    /// Minute of the day.
    pub time: u16,
    pub agency: u8,
    pub station: u16,
    pub machine_id: u32,
    pub vehicle_id: u16,
    pub product_id: u16,
    /// Amount charged or credited, in cents.
    pub amount: u16,
    pub subscription_id: u16,
}

impl Transaction {
    pub const SIZE: usize = 32;

    pub fn parse(slot: u8, r: &[u8; Self::SIZE]) -> Result<Self, Error> {
        if r.iter().all(|&b| b == 0) {
            return Ok(Self::empty(slot));
        }

        bitfield! {
            struct Header(u8) {
                [4..8] process: u8,
                [3] valid,
            }
        }

        let header = Header(r[0]);

        Ok(Self {
            slot,
            id: get_bits(r, 8, 16)? as u16,
            process: Process::from_code(header.process()),
            valid: header.valid(),
            date: get_bits(r, 24, 14)? as u16,
            time: get_bits(r, 38, 11)? as u16,
            agency: get_bits(r, 49, 8)? as u8,
            station: get_bits(r, 57, 16)? as u16,
            machine_id: get_bits(r, 73, 24)?,
            vehicle_id: get_bits(r, 97, 16)? as u16,
            product_id: get_bits(r, 128, 16)? as u16,
            amount: get_bits(r, 144, 16)? as u16,
            subscription_id: get_bits(r, 160, 12)? as u16,
        })
    }

    fn empty(slot: u8) -> Self {
        Self {
            slot,
            id: 0,
            process: Process::NoData,
            valid: false,
            date: 0,
            time: 0,
            agency: 0,
            station: 0,
            machine_id: 0,
            vehicle_id: 0,
            product_id: 0,
            amount: 0,
            subscription_id: 0,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        decode_datetime(OVCHIP_EPOCH, self.date.into(), self.time)
    }
}

impl Tap for Transaction {
    type Key = u16;

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn is_same_trip(&self, next: &Self) -> bool {
        if self.agency != next.agency
            || self.process != Process::CheckIn
            || next.process != Process::CheckOut
            || next.timestamp() < self.timestamp()
        {
            return false;
        }

        if self.date == next.date {
            true
        } else if u32::from(self.date) + 1 == u32::from(next.date) {
            // Checking out after midnight still closes the trip, except on NS,
            // where trips end at the day change.
            self.agency != AGENCY_NS || next.time < NS_DAY_CHANGE
        } else {
            false
        }
    }

    fn trip_key(&self) -> u16 {
        self.id
    }
}
