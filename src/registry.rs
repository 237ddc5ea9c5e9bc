//! Selection of a decoder for a card.
//!
//! Families are tried in a fixed priority order and the first whose signature
//! test accepts the card wins. Signature tests are advisory, so the order
//! matters when more than one could accept a dump. A card no family accepts
//! is an expected outcome, not an error.

use log::{debug, warn};

use crate::{
    bilhete::BilheteUnico,
    card::RawCard,
    ovchip::OvChip,
    transit::{CardFamily, Error, TransitData, TransitIdentity},
};

/// A supported card family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    OvChip,
    BilheteUnico,
}

/// Supported families, in dispatch priority order.
pub const FAMILIES: [Family; 2] = [Family::OvChip, Family::BilheteUnico];

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::OvChip => crate::ovchip::NAME,
            Family::BilheteUnico => crate::bilhete::NAME,
        }
    }

    /// Run this family's signature test.
    pub fn check(self, card: &RawCard) -> bool {
        match self {
            Family::OvChip => OvChip::check(card),
            Family::BilheteUnico => BilheteUnico::check(card),
        }
    }

    pub fn parse_identity(self, card: &RawCard) -> TransitIdentity {
        match self {
            Family::OvChip => OvChip::parse_identity(card),
            Family::BilheteUnico => BilheteUnico::parse_identity(card),
        }
    }

    pub fn parse(self, card: &RawCard) -> Result<TransitData, Error> {
        match self {
            Family::OvChip => OvChip::parse(card),
            Family::BilheteUnico => BilheteUnico::parse(card),
        }
    }
}

/// Find the first family whose signature test accepts the card.
pub fn detect(card: &RawCard) -> Option<Family> {
    let family = FAMILIES.into_iter().find(|family| family.check(card));

    match family {
        Some(family) => debug!("Card matched {}.", family.name()),
        None => debug!("No family matched a card of {} sectors.", card.sector_count()),
    }

    family
}

/// Cheaply identify a card, without decoding its records.
///
/// Returns [`TransitIdentity::unknown`] when no family matches.
pub fn identify(card: &RawCard) -> TransitIdentity {
    detect(card)
        .map(|family| family.parse_identity(card))
        .unwrap_or_else(TransitIdentity::unknown)
}

/// Fully decode a card.
///
/// Returns `Ok(None)` when no family matches. A family that matches but fails
/// to decode returns its error; later families are not tried.
pub fn decode(card: &RawCard) -> Result<Option<TransitData>, Error> {
    let Some(family) = detect(card) else {
        return Ok(None);
    };

    family
        .parse(card)
        .inspect_err(|err| warn!("Failed to decode {}: {err}", family.name()))
        .map(Some)
}
