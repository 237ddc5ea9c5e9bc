//! OV-chipkaart, the national transit card of the Netherlands.
//!
//! The card is a MIFARE Classic 4K. An index in sector 39 says which copy of
//! each double-buffered record is current; the transaction log is a circular
//! buffer of 28 slots in sectors 35 to 38, and subscriptions live in sectors
//! 32 to 34.
//!
//! # Decoding
//!
//! [`OvChip::parse`] reads the index once, then the preamble, the current
//! info and credit blocks, every transaction slot, and every subscription the
//! index points at. Transactions are sorted by sequence id and paired into
//! trips (see [`crate::trip`]); subscriptions are sorted by id.

pub mod credit;
pub mod index;
pub mod info;
pub mod preamble;
pub mod subscription;
pub mod transaction;

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use either::Either::{Left, Right};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    card::{RawCard, classic_address},
    codec::{Currency, format_long_date, hex, hex_fallback},
    transit::{
        CardFamily, Error, ListItem, Mode, Stop, Subscription, Transit, TransitData,
        TransitIdentity, Trip,
    },
    trip::{Pairing, reconstruct},
};

use self::{
    credit::Credit,
    index::Index,
    info::Info,
    preamble::{IdBlock, Preamble},
    transaction::{Process, Transaction},
};

pub const NAME: &str = "OV-chipkaart";

/// Bytes opening sector 0 block 1 on every OV-chipkaart.
const OVC_HEADER: [u8; 11] = [
    0x84, 0x00, 0x00, 0x00, 0x06, 0x03, 0xA0, 0x00, 0x13, 0xAE, 0xE4,
];

const INFO_ADDRESS: u16 = 0x580;
const CREDIT_ADDRESS: u16 = 0xF90;

/// Number of slots in the transaction log.
pub const TRANSACTION_SLOTS: u8 = 28;

pub const AGENCY_TLS: u8 = 0x00;
pub const AGENCY_CONNEXXION: u8 = 0x01;
pub const AGENCY_GVB: u8 = 0x02;
pub const AGENCY_HTM: u8 = 0x03;
pub const AGENCY_NS: u8 = 0x04;
pub const AGENCY_RET: u8 = 0x05;
pub const AGENCY_VEOLIA: u8 = 0x07;
pub const AGENCY_ARRIVA: u8 = 0x08;
pub const AGENCY_SYNTUS: u8 = 0x09;
pub const AGENCY_QBUZZ: u8 = 0x0A;
pub const AGENCY_DUO: u8 = 0x0C;
pub const AGENCY_STORE: u8 = 0x19;

const AGENCIES: &[(u8, &str)] = &[
    (AGENCY_TLS, "Trans Link Systems"),
    (AGENCY_CONNEXXION, "Connexxion"),
    (AGENCY_GVB, "Gemeentelijk Vervoersbedrijf"),
    (AGENCY_HTM, "Haagsche Tramweg-Maatschappij"),
    (AGENCY_NS, "Nederlandse Spoorwegen"),
    (AGENCY_RET, "Rotterdamse Elektrische Tram"),
    (AGENCY_VEOLIA, "Veolia"),
    (AGENCY_ARRIVA, "Arriva"),
    (AGENCY_SYNTUS, "Syntus"),
    (AGENCY_QBUZZ, "Qbuzz"),
    (AGENCY_DUO, "Dienst Uitvoering Onderwijs"),
    (AGENCY_STORE, "Reseller"),
];

const SHORT_AGENCIES: &[(u8, &str)] = &[
    (AGENCY_TLS, "TLS"),
    (AGENCY_CONNEXXION, "Connexxion"),
    (AGENCY_GVB, "GVB"),
    (AGENCY_HTM, "HTM"),
    (AGENCY_NS, "NS"),
    (AGENCY_RET, "RET"),
    (AGENCY_VEOLIA, "Veolia"),
    (AGENCY_ARRIVA, "Arriva"),
    (AGENCY_SYNTUS, "Syntus"),
    (AGENCY_QBUZZ, "Qbuzz"),
    (AGENCY_DUO, "DUO"),
    (AGENCY_STORE, "Reseller"),
];

fn lookup(table: &[(u8, &str)], code: u8) -> String {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| hex_fallback(code, 2))
}

/// Full name of a transport agency.
pub fn agency_name(code: u8) -> String {
    lookup(AGENCIES, code)
}

/// Abbreviated name of a transport agency.
pub fn short_agency_name(code: u8) -> String {
    lookup(SHORT_AGENCIES, code)
}

/// Location of a transaction slot: seven 2-block slots per sector, in sectors
/// 35 to 38.
pub fn transaction_location(slot: u8) -> (usize, usize) {
    let slot = usize::from(slot);
    (35 + slot / 7, (slot % 7) * 2)
}

/// The OV-chipkaart family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvChip;

impl CardFamily for OvChip {
    fn check(card: &RawCard) -> bool {
        if card.sector_count() != 40 || card.block_count(39).is_none_or(|n| n < 15) {
            return false;
        }

        card.block(0, 1)
            .is_ok_and(|block| block.starts_with(&OVC_HEADER))
    }

    fn parse_identity(card: &RawCard) -> TransitIdentity {
        let serial = card.take(0, 0).ok().map(|block: [u8; 16]| {
            let IdBlock { id, .. } = zerocopy::transmute!(block);
            hex(&id)
        });

        TransitIdentity::new(NAME, serial)
    }

    fn parse(card: &RawCard) -> Result<TransitData, Error> {
        let index = Index::parse(&card.take(39, 11)?)?;
        let preamble = Preamble::parse(&card.take(0, 0)?)?;

        let (sector, block) =
            classic_address(INFO_ADDRESS + u16::from(index.recent_info_slot) * 0x20);
        let info = Info::parse(&card.take(sector, block)?)?;

        let (sector, block) =
            classic_address(CREDIT_ADDRESS + u16::from(index.recent_credit_slot) * 0x10);
        let credit = Credit::parse(&card.take(sector, block)?)?;

        let mut transactions = (0..TRANSACTION_SLOTS)
            .map(|slot| {
                let (sector, block) = transaction_location(slot);
                Transaction::parse(slot, &card.take(sector, block)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Sequence ids wrap around; the log is taken to be in order once sorted.
        transactions.sort_by_key(|t| t.id);

        for t in &transactions {
            trace!("Slot {}: {:?} #{} at {}.", t.slot, t.process, t.id, t.timestamp());
        }

        let trips: Vec<_> = reconstruct(&transactions).into_iter().map(trip).collect();

        let mut subscriptions = index
            .subscription_slots()
            .map(|slot| {
                let (sector, block) = subscription::slot_location(slot)
                    .ok_or(Error::MalformedData("subscription pointer out of range"))?;
                subscription::parse(&card.take(sector, block)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        subscriptions.sort_by_key(|s| s.id);

        debug!(
            "Decoded {NAME} with {} trips and {} subscriptions.",
            trips.len(),
            subscriptions.len()
        );

        Ok(TransitData::OvChip(OvChipTransitData {
            info: preamble.is_personal().then_some(info),
            index,
            preamble,
            credit,
            trips,
            subscriptions,
        }))
    }
}

fn trip(pairing: Pairing<'_, Transaction>) -> Trip {
    let (start, end) = match pairing {
        Left(start) => (start, None),
        Right((start, end)) => (start, Some(end)),
    };

    let amount = i64::from(end.unwrap_or(start).amount);
    let amount = if start.process == Process::Credit {
        -amount
    } else {
        amount
    };

    Trip {
        key: start.id.into(),
        mode: mode(start),
        start: stop(start),
        end: end.map(stop),
        fare: (amount != 0).then(|| Currency::Eur.format(amount)),
    }
}

fn stop(t: &Transaction) -> Stop {
    Stop {
        agency: agency_name(t.agency),
        short_agency: short_agency_name(t.agency),
        station: (t.station != 0).then(|| hex_fallback(t.station, 4)),
        timestamp: t.timestamp(),
    }
}

fn mode(t: &Transaction) -> Mode {
    match (t.process, t.agency) {
        (Process::Banned, _) => Mode::Banned,
        (Process::Purchase, _) => Mode::TicketMachine,
        (Process::Credit, _) => Mode::Pos,
        (_, AGENCY_NS) => Mode::Train,
        (_, AGENCY_GVB | AGENCY_HTM | AGENCY_RET) => Mode::Tram,
        (_, AGENCY_CONNEXXION | AGENCY_VEOLIA | AGENCY_ARRIVA | AGENCY_SYNTUS | AGENCY_QBUZZ) => {
            Mode::Bus
        }
        _ => Mode::Other,
    }
}

/// A decoded OV-chipkaart.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OvChipTransitData {
    pub index: Index,
    pub preamble: Preamble,
    /// Present on personal cards only.
    pub info: Option<Info>,
    pub credit: Credit,
    pub trips: Vec<Trip>,
    pub subscriptions: Vec<Subscription>,
}

impl Transit for OvChipTransitData {
    fn card_name(&self) -> &str {
        NAME
    }

    fn serial_number(&self) -> Option<&str> {
        None
    }

    fn balance_string(&self) -> String {
        Currency::Eur.format(self.credit.credit.into())
    }

    fn trips(&self) -> Option<&[Trip]> {
        Some(&self.trips)
    }

    fn subscriptions(&self) -> Option<&[Subscription]> {
        Some(&self.subscriptions)
    }

    fn info(&self) -> Vec<ListItem> {
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        let slot = |s: u8| format!("{s:#x}");

        let mut items = Vec::new();

        items.push(ListItem::header("Hardware Information"));
        items.push(ListItem::item("Manufacturer ID", self.preamble.manufacturer.as_str()));
        items.push(ListItem::item("Publisher ID", self.preamble.publisher.as_str()));

        items.push(ListItem::header("General Information"));
        items.push(ListItem::item("Serial Number", self.preamble.id.as_str()));
        items.push(ListItem::item(
            "Expiration Date",
            format_long_date(self.preamble.expiry_date()),
        ));
        let card_type = if self.preamble.is_personal() {
            "Personal"
        } else {
            "Anonymous"
        };
        items.push(ListItem::item("Card Type", card_type));
        items.push(ListItem::item("Banned", yes_no(self.credit.is_banned())));

        items.push(ListItem::header("Recent Slots"));
        items.push(ListItem::item("Transaction Slot", slot(self.index.recent_transaction_slot)));
        items.push(ListItem::item("Info Slot", slot(self.index.recent_info_slot)));
        items.push(ListItem::item("Subscription Slot", slot(self.index.recent_subscription_slot)));
        items.push(ListItem::item("Travelhistory Slot", slot(self.index.recent_travelhistory_slot)));
        items.push(ListItem::item("Credit Slot", slot(self.index.recent_credit_slot)));

        let birthdate = self.info.as_ref().and_then(|info| info.birthdate);
        if let Some(birthdate) = birthdate {
            items.push(ListItem::header("Personal Information"));
            items.push(ListItem::item("Birthdate", format_long_date(birthdate)));
        }

        items.push(ListItem::header("Credit Information"));
        items.push(ListItem::item("Credit Slot ID", self.credit.id.to_string()));
        items.push(ListItem::item("Last Credit ID", self.credit.credit_id.to_string()));
        items.push(ListItem::item("Credit", self.balance_string()));

        if let Some(info) = &self.info {
            let limit = Currency::Eur.format(info.autocharge_limit.into());
            let charge = Currency::Eur.format(info.autocharge_charge.into());

            items.push(ListItem::item("Autocharge", yes_no(info.autocharge)));
            items.push(ListItem::item("Autocharge Limit", limit));
            items.push(ListItem::item("Autocharge Charge", charge));
        }

        items
    }
}
