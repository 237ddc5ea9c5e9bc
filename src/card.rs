//! Read-only model of a card's physical memory.
//!
//! A [`RawCard`] is an ordered collection of sectors, each holding a whole
//! number of fixed-size blocks. It is built once from a dump and never
//! mutated, so any number of decoders may borrow it at the same time.
//! Decoders copy out every value they keep.

pub mod bits;
#[cfg(feature = "std")]
pub mod reader;

use alloc::vec::Vec;
use thiserror::Error;

/// Size in bytes of a MIFARE Classic block.
pub const CLASSIC_BLOCK_SIZE: usize = 16;

const CLASSIC_4K_SECTORS: [u8; 40] = {
    let mut sectors = [4; 40];
    let mut i = 32;
    while i < 40 {
        sectors[i] = 16;
        i += 1;
    }
    sectors
};

/// An attempt to read blocks outside a card's physical layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Blocks {block}+{count} of sector {sector} are out of range.")]
pub struct OutOfRange {
    pub sector: usize,
    pub block: usize,
    pub count: usize,
}

/// A dump that does not fit the physical layout it was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The dump is shorter or longer than the topology requires.
    #[error("Dump holds {actual} bytes, expected {expected}.")]
    Length { expected: usize, actual: usize },
    /// More bytes followed a complete dump.
    #[error("Found bytes past the end of the dump.")]
    TrailingBytes,
    /// A sector is not a whole, non-zero number of blocks.
    #[error("Sector {sector} holds {len} bytes, not a multiple of {block_size}.")]
    Sector {
        sector: usize,
        len: usize,
        block_size: usize,
    },
    /// Blocks must hold at least one byte.
    #[error("Block size must not be zero.")]
    BlockSize,
}

/// Physical layout of a card family: a block size and the number of blocks in
/// each sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub block_size: usize,
    pub sectors: &'static [u8],
}

impl Topology {
    /// MIFARE Classic 1K: 16 sectors of 4 blocks.
    pub const CLASSIC_1K: Self = Self {
        block_size: CLASSIC_BLOCK_SIZE,
        sectors: &[4; 16],
    };

    /// MIFARE Classic 4K: 32 sectors of 4 blocks, then 8 sectors of 16 blocks.
    pub const CLASSIC_4K: Self = Self {
        block_size: CLASSIC_BLOCK_SIZE,
        sectors: &CLASSIC_4K_SECTORS,
    };

    /// Total number of bytes in a dump of this layout.
    pub fn len(&self) -> usize {
        self.sectors
            .iter()
            .map(|&blocks| usize::from(blocks) * self.block_size)
            .sum()
    }
}

/// One sector of card memory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Sector(Vec<u8>);

/// Immutable, sector and block addressed view of a card's memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCard {
    block_size: usize,
    sectors: Vec<Sector>,
}

impl RawCard {
    /// Build a card from the bytes of each sector, in order.
    pub fn new(block_size: usize, sectors: Vec<Vec<u8>>) -> Result<Self, LayoutError> {
        if block_size == 0 {
            Err(LayoutError::BlockSize)?;
        }

        let sectors = sectors
            .into_iter()
            .enumerate()
            .map(|(sector, data)| {
                if data.is_empty() || data.len() % block_size != 0 {
                    Err(LayoutError::Sector {
                        sector,
                        len: data.len(),
                        block_size,
                    })
                } else {
                    Ok(Sector(data))
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            block_size,
            sectors,
        })
    }

    /// Build a card from a flat dump, starting with sector 0 block 0.
    pub fn from_slice(topology: Topology, r: &[u8]) -> Result<Self, LayoutError> {
        let expected = topology.len();
        if r.len() != expected {
            Err(LayoutError::Length {
                expected,
                actual: r.len(),
            })?;
        }

        let mut i = 0; // Offset of the next sector in the dump.
        let sectors = topology
            .sectors
            .iter()
            .map(|&blocks| {
                let s = i;
                i += usize::from(blocks) * topology.block_size;
                r[s..i].to_vec()
            })
            .collect();

        Self::new(topology.block_size, sectors)
    }

    /// Size of every block on this card.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Number of blocks in a sector, if the sector exists.
    pub fn block_count(&self, sector: usize) -> Option<usize> {
        self.sectors.get(sector).map(|s| s.0.len() / self.block_size)
    }

    /// Read `count` consecutive blocks of a sector, starting at `block`.
    pub fn read_blocks(&self, sector: usize, block: usize, count: usize) -> Result<&[u8], OutOfRange> {
        let out_of_range = OutOfRange {
            sector,
            block,
            count,
        };

        let data = &self.sectors.get(sector).ok_or(out_of_range)?.0;

        let s = block.checked_mul(self.block_size).ok_or(out_of_range)?;
        let e = count
            .checked_mul(self.block_size)
            .and_then(|len| s.checked_add(len))
            .ok_or(out_of_range)?;

        data.get(s..e).ok_or(out_of_range)
    }

    /// Read a single block.
    pub fn block(&self, sector: usize, block: usize) -> Result<&[u8], OutOfRange> {
        self.read_blocks(sector, block, 1)
    }

    /// Read exactly `N` bytes starting at a block, spanning as many blocks as
    /// needed.
    pub fn take<const N: usize>(&self, sector: usize, block: usize) -> Result<[u8; N], OutOfRange> {
        let count = N.div_ceil(self.block_size);
        let data = self.read_blocks(sector, block, count)?;

        let mut buf = [0; N];
        buf.copy_from_slice(&data[..N]);

        Ok(buf)
    }

    /// The tag identifier stored in the first four bytes of the card.
    pub fn tag_id(&self) -> Option<[u8; 4]> {
        self.take(0, 0).ok()
    }
}

/// Convert a MIFARE Classic 4K byte address to a sector and block.
///
/// The first 2 KiB are 64-byte sectors; the rest are 256-byte sectors.
pub fn classic_address(addr: u16) -> (usize, usize) {
    let addr = usize::from(addr);

    if addr < 0x800 {
        (addr / 0x40, (addr % 0x40) / CLASSIC_BLOCK_SIZE)
    } else {
        let addr = addr - 0x800;
        (32 + addr / 0x100, (addr % 0x100) / CLASSIC_BLOCK_SIZE)
    }
}
