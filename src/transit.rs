//! Format-agnostic decode results, and the contract every card family
//! implements to produce them.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use chrono::{NaiveDate, NaiveDateTime};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    bilhete::BilheteUnicoTransitData,
    card::{OutOfRange, RawCard, bits::FieldError},
    ovchip::OvChipTransitData,
};

/// Errors occurring while decoding a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A decoder addressed blocks outside the card's physical layout.
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
    /// The card matched a family but its bytes cannot be interpreted.
    #[error("Malformed card data: {0}.")]
    MalformedData(&'static str),
}

impl From<FieldError> for Error {
    fn from(_: FieldError) -> Self {
        Self::MalformedData("bit field past the end of a record")
    }
}

/// Recognize and decode one family of cards.
///
/// Implementations are unit types listed in [`crate::registry`].
pub trait CardFamily {
    /// Guess cheaply whether a card belongs to this family.
    ///
    /// The test is advisory: it must never fail, but may accept cards of
    /// other families.
    fn check(card: &RawCard) -> bool;

    /// Read the card name and, if trivially available, its serial number,
    /// without decoding records.
    fn parse_identity(card: &RawCard) -> TransitIdentity;

    /// Decode every record of the card.
    ///
    /// Unrecognized but well-formed values never fail; they fall back to a
    /// textual rendering of the raw code.
    fn parse(card: &RawCard) -> Result<TransitData, Error>;
}

/// The name and serial number of a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitIdentity {
    pub name: String,
    pub serial: Option<String>,
}

impl TransitIdentity {
    pub const UNKNOWN_NAME: &'static str = "Unknown card";

    pub fn new(name: &str, serial: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            serial,
        }
    }

    /// Identity of a card no family recognized.
    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN_NAME, None)
    }

    pub fn is_unknown(&self) -> bool {
        self.name == Self::UNKNOWN_NAME && self.serial.is_none()
    }
}

/// Uniform view of a decoded card, for presentation.
pub trait Transit {
    fn card_name(&self) -> &str;

    /// Serial number printed on, or stored in, the card.
    fn serial_number(&self) -> Option<&str>;

    /// Remaining balance, formatted in the family's currency.
    fn balance_string(&self) -> String;

    /// Trips in order, if the family records travel.
    fn trips(&self) -> Option<&[Trip]> {
        None
    }

    /// Top-ups in order, if the family records them.
    fn refills(&self) -> Option<&[Refill]> {
        None
    }

    /// Subscriptions in ascending id order, if the family holds them.
    fn subscriptions(&self) -> Option<&[Subscription]> {
        None
    }

    /// Diagnostic items, grouped under headers.
    fn info(&self) -> Vec<ListItem>;
}

/// A decoded card of any supported family.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "family", rename_all = "snake_case")
)]
pub enum TransitData {
    OvChip(OvChipTransitData),
    BilheteUnico(BilheteUnicoTransitData),
}

impl TransitData {
    fn inner(&self) -> &dyn Transit {
        match self {
            TransitData::OvChip(data) => data,
            TransitData::BilheteUnico(data) => data,
        }
    }
}

impl Transit for TransitData {
    fn card_name(&self) -> &str {
        self.inner().card_name()
    }

    fn serial_number(&self) -> Option<&str> {
        self.inner().serial_number()
    }

    fn balance_string(&self) -> String {
        self.inner().balance_string()
    }

    fn trips(&self) -> Option<&[Trip]> {
        self.inner().trips()
    }

    fn refills(&self) -> Option<&[Refill]> {
        self.inner().refills()
    }

    fn subscriptions(&self) -> Option<&[Subscription]> {
        self.inner().subscriptions()
    }

    fn info(&self) -> Vec<ListItem> {
        self.inner().info()
    }
}

/// How a trip was travelled, or what kind of terminal recorded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    Bus,
    Train,
    Tram,
    TicketMachine,
    Pos,
    Banned,
    Other,
}

/// One end of a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stop {
    pub agency: String,
    pub short_agency: String,
    pub station: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// A journey, built from one or two transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trip {
    /// Ordering key, derived from the starting transaction.
    pub key: u32,
    pub mode: Mode,
    pub start: Stop,
    /// The matching checkout, if one was paired.
    pub end: Option<Stop>,
    pub fare: Option<String>,
}

impl Trip {
    pub fn start_timestamp(&self) -> NaiveDateTime {
        self.start.timestamp
    }

    pub fn end_timestamp(&self) -> Option<NaiveDateTime> {
        self.end.as_ref().map(|stop| stop.timestamp)
    }
}

/// A top-up of the card balance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Refill {
    pub timestamp: NaiveDateTime,
    pub agency: String,
    pub amount: String,
}

/// A season ticket or other product loaded on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subscription {
    pub id: u32,
    pub name: String,
    pub agency: String,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub machine_id: u32,
}

/// A diagnostic line, or a header grouping the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ListItem {
    Header(String),
    Item { label: String, value: String },
}

impl ListItem {
    pub fn header(title: &str) -> Self {
        Self::Header(title.to_string())
    }

    pub fn item(label: &str, value: impl Into<String>) -> Self {
        Self::Item {
            label: label.to_string(),
            value: value.into(),
        }
    }
}
