//! Subscriptions (season tickets and travel products) loaded on the card.

use alloc::string::{String, ToString};

use crate::{
    card::bits::get_bits,
    codec::{OVCHIP_EPOCH, decode_date, hex_fallback},
    transit::{Error, Subscription},
};

use super::agency_name;

/// Names of subscription product codes.
const SUBSCRIPTIONS: &[(u16, &str)] = &[
    (0x0005, "OV-jaarkaart"),
    (0x0007, "OV-Bijkaart 1e klas"),
    (0x0011, "NS Businesscard"),
    (0x0019, "Voordeelurenabonnement (twee jaar)"),
    (0x00AF, "Studenten OV-chipkaart week (2009)"),
    (0x00B0, "Studenten OV-chipkaart weekend (2009)"),
    (0x00B1, "Studentenkaart korting week (2009)"),
    (0x00B2, "Studentenkaart korting weekend (2009)"),
    (0x00C9, "Reizen op saldo bij NS, 1e klasse"),
    (0x00CA, "Reizen op saldo bij NS, 2de klasse"),
    (0x00CE, "Voordeelurenabonnement reizen op saldo"),
    (0x00E5, "Reizen op saldo (tijdelijk eerste klas)"),
    (0x00E6, "Reizen op saldo (tijdelijk tweede klas)"),
    (0x00E7, "Reizen op saldo (tijdelijk eerste klas korting)"),
    (0x011D, "DUO Studenten OV-chipkaart week (2011)"),
    (0x011E, "DUO Studenten OV-chipkaart weekend (2011)"),
];

/// Size in bytes of a subscription slot.
pub const SIZE: usize = 48;

/// Number of subscription slots on the card.
pub const SLOTS: u8 = 15;

/// Location of a 1-based subscription slot: five 3-block slots per sector,
/// in sectors 32 to 34.
pub fn slot_location(slot: u8) -> Option<(usize, usize)> {
    if slot == 0 || slot > SLOTS {
        return None;
    }

    let n = usize::from(slot - 1);
    Some((32 + n / 5, (n % 5) * 3))
}

pub fn subscription_name(code: u16) -> String {
    SUBSCRIPTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| hex_fallback(code, 4))
}

pub fn parse(r: &[u8; SIZE]) -> Result<Subscription, Error> {
    let date = |offset| -> Result<_, Error> {
        Ok(match get_bits(r, offset, 14)? {
            0 => None,
            days => Some(decode_date(OVCHIP_EPOCH, days)),
        })
    };

    Ok(Subscription {
        id: get_bits(r, 0, 12)?,
        name: subscription_name(get_bits(r, 12, 16)? as u16),
        agency: agency_name(get_bits(r, 28, 8)? as u8),
        valid_from: date(36)?,
        valid_to: date(50)?,
        machine_id: get_bits(r, 64, 24)?,
    })
}
