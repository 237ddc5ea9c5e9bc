//! Reader-based card construction.
//!
//! _Requires Cargo feature `std`._

use std::{io::Read, vec::Vec};

use alloc::vec;
use thiserror::Error;

use super::{LayoutError, RawCard, Topology};

extern crate std;

/// Errors occurring while loading a dump from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader, including a dump cut short.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The dump does not fit the declared topology.
    #[error("Incorrect dump layout: {0}")]
    Layout(#[from] LayoutError),
}

impl RawCard {
    /// Load a flat dump from a reader, sector by sector.
    ///
    /// The reader must hold exactly one dump of the given topology.
    ///
    /// _Requires Cargo feature `std`._
    pub fn from_reader(topology: Topology, r: &mut impl Read) -> Result<Self, Error> {
        let mut sectors = Vec::with_capacity(topology.sectors.len());

        for &blocks in topology.sectors {
            let mut data = vec![0; usize::from(blocks) * topology.block_size];
            r.read_exact(&mut data)?;
            sectors.push(data);
        }

        if r.read(&mut [0; 1])? != 0 {
            Err(LayoutError::TrailingBytes)?;
        }

        Ok(Self::new(topology.block_size, sectors)?)
    }
}
