//! Reconstruction of trips from a transaction log.
//!
//! The log must already be sorted by its write order (the transactions'
//! sequence ids). A single left-to-right pass pairs each valid transaction
//! with the one directly after it when the family says they belong to the same
//! journey, and otherwise leaves it on its own. Pairing is greedy and looks
//! only at neighbours: a check-in and check-out separated by an unrelated
//! transaction stay apart.

use alloc::vec::Vec;
use either::Either::{self, Left, Right};

/// A logged transaction that may start or finish a trip.
pub trait Tap {
    /// Key ordering the trips built from these transactions.
    type Key: Ord;

    /// Invalid transactions are left out of every trip.
    fn is_valid(&self) -> bool;

    /// Whether `next`, logged directly after `self`, finishes the trip that
    /// `self` starts.
    fn is_same_trip(&self, next: &Self) -> bool;

    /// Key of a trip starting with this transaction.
    fn trip_key(&self) -> Self::Key;
}

/// A trip of a single transaction, or of a start and an end transaction.
pub type Pairing<'a, T> = Either<&'a T, (&'a T, &'a T)>;

/// The transaction a trip starts with.
pub fn start<'a, T>(pairing: &Pairing<'a, T>) -> &'a T {
    match *pairing {
        Left(tap) => tap,
        Right((tap, _)) => tap,
    }
}

/// Pair up a log, sorted by sequence id, into trips ordered by trip key.
pub fn reconstruct<T: Tap>(log: &[T]) -> Vec<Pairing<'_, T>> {
    let mut trips = Vec::new();
    let mut i = 0; // Index of the next unconsumed transaction.

    while let Some(tap) = log.get(i) {
        i += 1;

        if !tap.is_valid() {
            continue;
        }

        match log.get(i) {
            Some(next) if next.is_valid() && tap.is_same_trip(next) => {
                trips.push(Right((tap, next)));
                i += 1;
            }
            _ => trips.push(Left(tap)),
        }
    }

    // Stable, so trips sharing a key keep their log order.
    trips.sort_by_key(|trip| start(trip).trip_key());

    trips
}
