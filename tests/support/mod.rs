#![allow(dead_code)]

use farecard::{RawCard, Topology};

pub const OVC_HEADER: [u8; 11] = [
    0x84, 0x00, 0x00, 0x00, 0x06, 0x03, 0xA0, 0x00, 0x13, 0xAE, 0xE4,
];

pub const PROCESS_PURCHASE: u8 = 0x0;
pub const PROCESS_CHECKIN: u8 = 0x1;
pub const PROCESS_CHECKOUT: u8 = 0x2;
pub const PROCESS_TRANSFER: u8 = 0x6;
pub const PROCESS_BANNED: u8 = 0x7;
pub const PROCESS_CREDIT: u8 = 0xE;

pub const AGENCY_GVB: u8 = 0x02;
pub const AGENCY_NS: u8 = 0x04;
pub const AGENCY_ARRIVA: u8 = 0x08;

/// Write `len` bits of `value` at bit `offset`, most significant bit first.
pub fn set_bits(r: &mut [u8], offset: usize, len: usize, value: u32) {
    for i in 0..len {
        let bit = (value >> (len - 1 - i)) & 1;
        let pos = offset + i;
        let mask = 0x80 >> (pos % 8);
        if bit == 1 {
            r[pos / 8] |= mask;
        } else {
            r[pos / 8] &= !mask;
        }
    }
}

/// Offset of a block in a flat MIFARE Classic 4K dump.
pub fn offset_4k(sector: usize, block: usize) -> usize {
    if sector < 32 {
        sector * 64 + block * 16
    } else {
        2048 + (sector - 32) * 256 + block * 16
    }
}

/// A transaction log entry, before encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tx {
    pub id: u16,
    pub process: u8,
    pub valid: bool,
    pub date: u16,
    pub time: u16,
    pub agency: u8,
    pub station: u16,
    pub amount: u16,
}

impl Tx {
    pub fn new(id: u16, process: u8, agency: u8, date: u16, time: u16) -> Self {
        Self {
            id,
            process,
            valid: true,
            date,
            time,
            agency,
            ..Default::default()
        }
    }

    pub fn checkin(id: u16, agency: u8, date: u16, time: u16) -> Self {
        Self::new(id, PROCESS_CHECKIN, agency, date, time)
    }

    pub fn checkout(id: u16, agency: u8, date: u16, time: u16) -> Self {
        Self::new(id, PROCESS_CHECKOUT, agency, date, time)
    }

    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    pub fn station(mut self, station: u16) -> Self {
        self.station = station;
        self
    }

    pub fn amount(mut self, amount: u16) -> Self {
        self.amount = amount;
        self
    }

    pub fn encode(&self) -> [u8; 32] {
        let mut r = [0; 32];
        set_bits(&mut r, 0, 4, self.process.into());
        set_bits(&mut r, 4, 1, self.valid.into());
        set_bits(&mut r, 8, 16, self.id.into());
        set_bits(&mut r, 24, 14, self.date.into());
        set_bits(&mut r, 38, 11, self.time.into());
        set_bits(&mut r, 49, 8, self.agency.into());
        set_bits(&mut r, 57, 16, self.station.into());
        set_bits(&mut r, 73, 24, 0x00AB_CDEF);
        set_bits(&mut r, 144, 16, self.amount.into());
        r
    }
}

/// Builder of synthetic OV-chipkaart dumps.
pub struct OvChipCard {
    image: Vec<u8>,
}

impl OvChipCard {
    /// A blank anonymous card: header, preamble, a zero balance, and an index
    /// with no subscriptions, info slot 0 and credit slot 0.
    pub fn new() -> Self {
        let mut card = Self {
            image: vec![0; Topology::CLASSIC_4K.len()],
        };

        card.block_mut(0, 0).copy_from_slice(&[
            0x12, 0x34, 0x56, 0x78, 0x4A, 0x88, 0x04, 0x00, 0xC1, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
            0x02,
        ]);
        card.block_mut(0, 1)[..11].copy_from_slice(&OVC_HEADER);
        card.preamble(1, 6000);
        card.index(0, 1, 0, 0, &[]);
        card.credit(0, 0);
        card
    }

    pub fn block_mut(&mut self, sector: usize, block: usize) -> &mut [u8] {
        let s = offset_4k(sector, block);
        &mut self.image[s..s + 16]
    }

    fn record_mut(&mut self, sector: usize, block: usize, len: usize) -> &mut [u8] {
        let s = offset_4k(sector, block);
        &mut self.image[s..s + len]
    }

    pub fn preamble(&mut self, card_type: u8, expdate: u32) -> &mut Self {
        let r = self.record_mut(0, 0, 48);
        set_bits(r, 216, 20, expdate);
        set_bits(r, 276, 4, card_type.into());
        self
    }

    /// Write one of the two index copies.
    pub fn index(
        &mut self,
        copy: usize,
        generation: u16,
        info_slot: u8,
        credit_slot: u8,
        subscriptions: &[u8],
    ) -> &mut Self {
        let s = offset_4k(39, 11) + copy * 32;
        let r = &mut self.image[s..s + 32];
        r.fill(0);
        set_bits(r, 8, 16, generation.into());
        set_bits(r, 24, 1, info_slot.into());
        set_bits(r, 25, 1, credit_slot.into());
        set_bits(r, 32, 5, 3);
        set_bits(r, 37, 5, 7);
        set_bits(r, 42, 4, 1);
        for (i, &slot) in subscriptions.iter().enumerate() {
            set_bits(r, 48 + i * 4, 4, slot.into());
        }
        self
    }

    pub fn credit(&mut self, slot: u8, credit: i32) -> &mut Self {
        let r = self.block_mut(39, 9 + usize::from(slot));
        r.fill(0);
        set_bits(r, 8, 12, 0x123);
        set_bits(r, 56, 12, 0x045);
        if credit >= 0 {
            set_bits(r, 77, 1, 1);
            set_bits(r, 78, 15, credit as u32);
        } else {
            set_bits(r, 78, 15, (-credit) as u32 ^ 0x7FFF);
        }
        self
    }

    pub fn banned(&mut self, slot: u8) -> &mut Self {
        self.block_mut(39, 9 + usize::from(slot))[0] |= 0xC0;
        self
    }

    pub fn info(&mut self, slot: u8, birthdate: u32, autocharge: bool, limit: u16, charge: u16) -> &mut Self {
        let r = self.block_mut(22, usize::from(slot) * 2);
        r.fill(0);
        set_bits(r, 0, 20, birthdate);
        r[3] = if autocharge { 0x05 } else { 0x00 };
        set_bits(r, 32, 16, limit.into());
        set_bits(r, 48, 16, charge.into());
        self
    }

    pub fn transaction(&mut self, slot: u8, tx: Tx) -> &mut Self {
        let slot = usize::from(slot);
        let r = self.record_mut(35 + slot / 7, (slot % 7) * 2, 32);
        r.copy_from_slice(&tx.encode());
        self
    }

    /// Write transactions into consecutive slots, starting at slot 0.
    pub fn transactions(&mut self, txs: &[Tx]) -> &mut Self {
        for (slot, tx) in txs.iter().enumerate() {
            self.transaction(slot as u8, *tx);
        }
        self
    }

    pub fn subscription(&mut self, slot: u8, id: u32, code: u16, agency: u8, from: u32, to: u32) -> &mut Self {
        let n = usize::from(slot - 1);
        let r = self.record_mut(32 + n / 5, (n % 5) * 3, 48);
        r.fill(0);
        set_bits(r, 0, 12, id);
        set_bits(r, 12, 16, code.into());
        set_bits(r, 28, 8, agency.into());
        set_bits(r, 36, 14, from);
        set_bits(r, 50, 14, to);
        set_bits(r, 64, 24, 0x000777);
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.image
    }

    pub fn build(&self) -> RawCard {
        RawCard::from_slice(Topology::CLASSIC_4K, &self.image).unwrap()
    }
}

/// Builder of synthetic Bilhete Único dumps.
pub struct BilheteCard {
    image: Vec<u8>,
}

impl BilheteCard {
    pub fn new(serial: u32, balance: i32) -> Self {
        let mut image = vec![0; Topology::CLASSIC_1K.len()];
        image[8..16].copy_from_slice(&[0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69]);
        image[128..132].copy_from_slice(&serial.to_le_bytes());

        let mut card = Self { image };
        card.value_block(balance, !balance, balance, 0x21);
        card
    }

    /// Write the balance value block with explicit copies.
    pub fn value_block(&mut self, value: i32, inverted: i32, copy: i32, address: u8) -> &mut Self {
        let s = 8 * 64 + 16;
        let r = &mut self.image[s..s + 16];
        r[0..4].copy_from_slice(&value.to_le_bytes());
        r[4..8].copy_from_slice(&inverted.to_le_bytes());
        r[8..12].copy_from_slice(&copy.to_le_bytes());
        r[12..16].copy_from_slice(&[address, !address, address, !address]);
        self
    }

    pub fn build(&self) -> RawCard {
        RawCard::from_slice(Topology::CLASSIC_1K, &self.image).unwrap()
    }
}
