//! Bilhete Único, the São Paulo transit card.
//!
//! The card is a MIFARE Classic 1K. Only the balance, held in a MIFARE value
//! block, and the serial number are decoded; the card keeps no trip history
//! this decoder understands.

use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zerocopy::FromBytes;

use crate::{
    card::RawCard,
    codec::Currency,
    transit::{CardFamily, Error, ListItem, Transit, TransitData, TransitIdentity},
};

pub const NAME: &str = "Bilhete Único";

/// Manufacturer data closing sector 0 block 0 on every Bilhete Único.
const MANUFACTURER: [u8; 8] = [0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69];

/// A MIFARE value block: the value three times (once inverted), then its
/// address four times (twice inverted).
#[repr(C, packed)]
#[derive(FromBytes)]
struct ValueBlock {
    value: [u8; 4],
    inverted: [u8; 4],
    copy: [u8; 4],
    address: u8,
    address_inverted: u8,
    address_copy: u8,
    address_copy_inverted: u8,
}

/// The Bilhete Único family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BilheteUnico;

impl BilheteUnico {
    fn serial(card: &RawCard) -> Option<u32> {
        card.take(2, 0).ok().map(u32::from_le_bytes)
    }
}

impl CardFamily for BilheteUnico {
    fn check(card: &RawCard) -> bool {
        card.sector_count() == 16
            && card
                .block(0, 0)
                .is_ok_and(|block| block.get(8..16) == Some(&MANUFACTURER[..]))
    }

    fn parse_identity(card: &RawCard) -> TransitIdentity {
        TransitIdentity::new(NAME, Self::serial(card).map(|s| s.to_string()))
    }

    fn parse(card: &RawCard) -> Result<TransitData, Error> {
        let serial = Self::serial(card).ok_or(Error::MalformedData("missing serial block"))?;

        let ValueBlock {
            value,
            inverted,
            copy,
            address,
            address_inverted,
            address_copy,
            address_copy_inverted,
        } = zerocopy::transmute!(card.take::<16>(8, 1)?);

        let balance = i32::from_le_bytes(value);

        if value != copy || i32::from_le_bytes(inverted) != !balance {
            Err(Error::MalformedData("value block copies disagree"))?;
        }
        if address != address_copy
            || address_inverted != !address
            || address_copy_inverted != !address
        {
            Err(Error::MalformedData("value block address copies disagree"))?;
        }

        debug!("Decoded {NAME} {serial}.");

        Ok(TransitData::BilheteUnico(BilheteUnicoTransitData {
            serial: serial.to_string(),
            balance,
            address,
        }))
    }
}

/// A decoded Bilhete Único.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BilheteUnicoTransitData {
    pub serial: String,
    /// Balance in centavos.
    pub balance: i32,
    /// Address byte of the balance value block.
    pub address: u8,
}

impl Transit for BilheteUnicoTransitData {
    fn card_name(&self) -> &str {
        NAME
    }

    fn serial_number(&self) -> Option<&str> {
        Some(&self.serial)
    }

    fn balance_string(&self) -> String {
        Currency::Brl.format(self.balance.into())
    }

    fn info(&self) -> Vec<ListItem> {
        vec![
            ListItem::header("General Information"),
            ListItem::item("Serial Number", self.serial.as_str()),
            ListItem::item("Value Block Address", format!("{:#04x}", self.address)),
        ]
    }
}
