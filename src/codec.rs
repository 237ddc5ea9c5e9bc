//! Date and money decoders shared by the card families.
//!
//! Cards store dates as a day offset from a family-specific epoch, optionally
//! followed by a minute of the day, and money as an integer count of minor
//! currency units. Decoding is total: every input yields a value.

use alloc::{
    format,
    string::{String, ToString},
};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Day zero of OV-chipkaart dates.
pub const OVCHIP_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1997, 1, 1) {
    Some(date) => date,
    None => panic!("invalid epoch"),
};

/// Decode a day offset from an epoch.
///
/// Offsets beyond the range of [`NaiveDate`] saturate to [`NaiveDate::MAX`].
pub fn decode_date(epoch: NaiveDate, day_offset: u32) -> NaiveDate {
    epoch
        .checked_add_days(Days::new(day_offset.into()))
        .unwrap_or(NaiveDate::MAX)
}

/// Decode a day offset and a minute of that day.
///
/// Minutes past the end of the day roll over into the following days.
pub fn decode_datetime(epoch: NaiveDate, day_offset: u32, minute_of_day: u16) -> NaiveDateTime {
    decode_date(epoch, day_offset)
        .and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::minutes(minute_of_day.into()))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Render a date in long form, as in `January 1, 1997`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Render a code with no known name as `0x`-prefixed hexadecimal, padded to
/// `width` digits.
pub fn hex_fallback(code: impl Into<u64>, width: usize) -> String {
    format!("0x{:0width$x}", code.into())
}

/// Render bytes as lowercase hexadecimal.
pub fn hex(r: &[u8]) -> String {
    r.iter().map(|b| format!("{b:02x}")).collect()
}

/// The fixed currency of a card family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Currency {
    /// Euro, in cents.
    Eur,
    /// Brazilian real, in centavos.
    Brl,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Brl => "BRL",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Brl => "R$",
        }
    }

    /// Render an amount of minor units, as in `€1,234.50` or `-€0.05`.
    pub fn format(self, minor: i64) -> String {
        let sign = if minor < 0 { "-" } else { "" };

        let minor = minor.unsigned_abs();
        let (major, minor) = (minor / 100, minor % 100);

        format!("{sign}{}{}.{minor:02}", self.symbol(), group_thousands(major))
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}
