#![no_std]

//! A decoder for memory dumps of contactless transit fare cards.
//!
//! Farecard reads the raw sectors and blocks captured from a card, works out
//! which card family they belong to, and decodes them into trips, balances,
//! subscriptions and diagnostic items. No card is ever written to, and no
//! cryptographic authentication of the card memory is attempted.
//!
//! Most users should begin with the functions in the [`registry`] module,
//! which pick a decoder from a fixed priority list of supported families. The
//! decoders themselves are exposed (see [`ovchip`] and [`bilhete`]) for
//! applications that already know which family they hold.
//!
//! # Supported families
//!
//! - OV-chipkaart (the Netherlands), MIFARE Classic 4K.
//! - Bilhete Único (São Paulo), MIFARE Classic 1K.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `serde`: derive `Serialize` and `Deserialize` for decoded output
//!   (default).
//! - `std`: enable loading dumps from a reader (default).

extern crate alloc;

pub mod bilhete;
pub mod card;
pub mod codec;
pub mod ovchip;
pub mod registry;
pub mod transit;
pub mod trip;

pub use card::{RawCard, Topology};
pub use registry::{decode, identify};
pub use transit::{Error, Transit, TransitData, TransitIdentity};
