use farecard::{
    RawCard, Topology,
    card::{LayoutError, OutOfRange, bits::get_bits, classic_address},
};

fn sequential_4k() -> RawCard {
    let image: Vec<u8> = (0..Topology::CLASSIC_4K.len()).map(|i| (i / 16) as u8).collect();
    RawCard::from_slice(Topology::CLASSIC_4K, &image).unwrap()
}

#[test]
fn topologies() {
    assert_eq!(Topology::CLASSIC_1K.len(), 1024);
    assert_eq!(Topology::CLASSIC_4K.len(), 4096);
    assert_eq!(Topology::CLASSIC_4K.sectors.len(), 40);
}

#[test]
fn reads_blocks_by_sector() {
    let card = sequential_4k();

    assert_eq!(card.sector_count(), 40);
    assert_eq!(card.block_count(0), Some(4));
    assert_eq!(card.block_count(39), Some(16));
    assert_eq!(card.block_count(40), None);

    // Block numbers in the flat image: sector 32 starts at block 128.
    assert_eq!(card.read_blocks(1, 2, 1).unwrap(), &[6; 16]);
    assert_eq!(card.read_blocks(32, 0, 1).unwrap(), &[128; 16]);
    assert_eq!(card.read_blocks(39, 14, 2).unwrap().len(), 32);
    assert_eq!(card.block(39, 15).unwrap(), &[255; 16]);
    assert!(card.block(39, 16).is_err());
}

#[test]
fn rejects_reads_outside_layout() {
    let card = sequential_4k();

    let err = card.read_blocks(0, 3, 2).unwrap_err();
    assert_eq!(
        err,
        OutOfRange {
            sector: 0,
            block: 3,
            count: 2
        }
    );
    assert!(card.read_blocks(40, 0, 1).is_err());
    assert!(card.read_blocks(39, 16, 1).is_err());
    assert!(card.read_blocks(0, usize::MAX, 2).is_err());
}

#[test]
fn takes_across_blocks() {
    let card = sequential_4k();

    let r: [u8; 20] = card.take(2, 1).unwrap();
    assert_eq!(&r[..16], &[9; 16]);
    assert_eq!(&r[16..], &[10; 4]);

    assert!(card.take::<32>(0, 3).is_err());
}

#[test]
fn tag_id_is_first_four_bytes() {
    let mut image = vec![0; Topology::CLASSIC_1K.len()];
    image[..4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    let card = RawCard::from_slice(Topology::CLASSIC_1K, &image).unwrap();

    assert_eq!(card.tag_id(), Some([0xDE, 0xAD, 0xBE, 0xEF]));
}

#[test]
fn rejects_truncated_dump() {
    let image = vec![0; Topology::CLASSIC_4K.len() - 1];
    let err = RawCard::from_slice(Topology::CLASSIC_4K, &image).unwrap_err();

    assert_eq!(
        err,
        LayoutError::Length {
            expected: 4096,
            actual: 4095
        }
    );
}

#[test]
fn rejects_ragged_sectors() {
    assert_eq!(
        RawCard::new(16, vec![vec![0; 32], vec![0; 20]]).unwrap_err(),
        LayoutError::Sector {
            sector: 1,
            len: 20,
            block_size: 16
        }
    );
    assert_eq!(RawCard::new(0, vec![]).unwrap_err(), LayoutError::BlockSize);
}

#[test]
fn classic_addresses() {
    assert_eq!(classic_address(0x000), (0, 0));
    assert_eq!(classic_address(0x580), (22, 0));
    assert_eq!(classic_address(0x5A0), (22, 2));
    assert_eq!(classic_address(0x800), (32, 0));
    assert_eq!(classic_address(0xF90), (39, 9));
    assert_eq!(classic_address(0xFB0), (39, 11));
}

#[test]
fn bit_fields() {
    let r = [0b1010_0000, 0xFF, 0x01];

    assert_eq!(get_bits(&r, 0, 3).unwrap(), 0b101);
    assert_eq!(get_bits(&r, 4, 8).unwrap(), 0x0F);
    assert_eq!(get_bits(&r, 8, 16).unwrap(), 0xFF01);
    assert_eq!(get_bits(&r, 23, 1).unwrap(), 1);
    assert!(get_bits(&r, 20, 5).is_err());
    assert!(get_bits(&[0; 8], 0, 33).is_err());
}

#[cfg(feature = "std")]
mod reader {
    use std::io::{Cursor, ErrorKind};

    use farecard::{RawCard, Topology, card::reader::Error};

    #[test]
    fn loads_from_reader() {
        let image = vec![7; Topology::CLASSIC_1K.len()];
        let card = RawCard::from_reader(Topology::CLASSIC_1K, &mut Cursor::new(&image)).unwrap();

        assert_eq!(card, RawCard::from_slice(Topology::CLASSIC_1K, &image).unwrap());
    }

    #[test]
    fn reports_short_reader() {
        let image = vec![0; 1000];
        let err = RawCard::from_reader(Topology::CLASSIC_1K, &mut Cursor::new(&image)).unwrap_err();

        assert!(matches!(err, Error::Io(e) if e.kind() == ErrorKind::UnexpectedEof));
    }

    #[test]
    fn reports_trailing_bytes() {
        let image = vec![0; 1025];
        let err = RawCard::from_reader(Topology::CLASSIC_1K, &mut Cursor::new(&image)).unwrap_err();

        assert!(matches!(err, Error::Layout(_)));
    }
}
