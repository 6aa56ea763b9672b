//! Laz compression round trips.
//!
//! The in-process back-end tests run whenever the `laz` feature is on. The
//! external-process tests need a `laszip` executable on PATH and skip
//! themselves when there is none.

use laspack::{Error, LasData, LazBackend, PointFormat, VlrList, Writer};
use std::io::Cursor;

fn sample(id: u8) -> LasData {
    let mut las = LasData::new(PointFormat::from_id(id).unwrap()).unwrap();
    las.points.resize(100);
    for i in 0..100 {
        las.x_mut().set(i, i as f64).unwrap();
        las.y_mut().set(i, -(i as f64)).unwrap();
        las.z_mut().set(i, 42.).unwrap();
    }
    las.points
        .column_mut::<u16>("intensity")
        .unwrap()
        .copy_from_slice(&(0..100).collect::<Vec<u16>>());
    las
}

#[test]
fn no_backend_is_fatal() {
    let las = sample(0);
    let mut header = las.header.clone();
    header.set_compressed(true);
    assert!(matches!(
        Writer::with_backends(Cursor::new(Vec::new()), header, VlrList::new(), &[]),
        Err(Error::NoLazBackend { .. })
    ));
}

#[test]
fn compressed_flag_without_laszip_vlr() {
    let las = sample(0);
    let mut bytes = las
        .write_to(Cursor::new(Vec::new()), false)
        .unwrap()
        .into_inner();
    // flip the compressed bit in the stored point format id
    bytes[104] |= 0x80;
    assert!(matches!(
        laspack::read_from(Cursor::new(bytes)),
        Err(Error::MissingLaszipVlr)
    ));
}

#[cfg(feature = "laz")]
mod lazrs {
    use super::*;

    fn write_compressed_then_read_again(las: &LasData) -> LasData {
        let mut cursor = las.write_to(Cursor::new(Vec::new()), true).unwrap();
        cursor.set_position(0);
        laspack::read_from(cursor).unwrap()
    }

    #[test]
    fn roundtrip() {
        for id in [0, 1, 2, 3, 6, 7, 8] {
            let las = sample(id);
            let roundtripped = write_compressed_then_read_again(&las);
            assert_eq!(
                las.points.as_bytes(),
                roundtripped.points.as_bytes(),
                "format {}",
                id
            );
            assert_eq!(100, roundtripped.header.point_count);
            assert!(!roundtripped.header.is_compressed());
            // the laszip vlr is consumed during reading
            assert!(roundtripped.vlrs.get("laszip encoded", 22204).is_none());
        }
    }

    #[test]
    fn compressed_files_carry_the_laszip_vlr() {
        let las = sample(0);
        let mut cursor = las.write_to(Cursor::new(Vec::new()), true).unwrap();
        cursor.set_position(0);
        let bytes = cursor.into_inner();
        // stored point format id has the high bit set
        assert_eq!(0x80, bytes[104] & 0x80);
        let header = laspack::raw::Header::read_from(Cursor::new(&bytes)).unwrap();
        assert_eq!(1, header.number_of_variable_length_records);
    }

    #[test]
    fn extra_bytes_survive_compression() {
        let mut las = sample(1);
        las.add_extra_dim(laspack::ExtraBytesParams::new("range", "int32"))
            .unwrap();
        las.points.column_mut::<i32>("range").unwrap().fill(-5);
        let roundtripped = write_compressed_then_read_again(&las);
        assert_eq!(
            vec![-5; 100],
            roundtripped.points.column::<i32>("range").unwrap().to_vec()
        );
    }

    #[test]
    fn header_reports_compression_to_the_writer() {
        let las = sample(0);
        let mut header = las.header.clone();
        header.set_compressed(true);
        let mut writer = Writer::with_backends(
            Cursor::new(Vec::new()),
            header,
            VlrList::new(),
            &[LazBackend::LazRs],
        )
        .unwrap();
        writer.write(&las.points).unwrap();
        writer.close().unwrap();
        assert_eq!(100, writer.header().point_count);
    }
}

mod laszip_process {
    use super::*;

    #[test]
    fn roundtrip() {
        if !LazBackend::Laszip.is_available() {
            eprintln!("no laszip executable on PATH, skipping");
            return;
        }
        let las = sample(1);
        let mut header = las.header.clone();
        header.set_compressed(true);
        let mut writer = Writer::with_backends(
            Cursor::new(Vec::new()),
            header,
            VlrList::new(),
            &[LazBackend::Laszip],
        )
        .unwrap();
        writer.write(&las.points).unwrap();
        writer.close().unwrap();
        let mut cursor = writer.into_inner().unwrap();
        cursor.set_position(0);

        let roundtripped = laspack::Reader::new()
            .backends(vec![LazBackend::Laszip])
            .read_from(cursor)
            .unwrap();
        assert_eq!(las.points.as_bytes(), roundtripped.points.as_bytes());
        assert_eq!(100, roundtripped.header.point_count);
    }

    // The child writes its own header; the writer patches the statistics in.
    #[test]
    fn header_statistics_survive_the_process() {
        if !LazBackend::Laszip.is_available() {
            eprintln!("no laszip executable on PATH, skipping");
            return;
        }
        let las = sample(0);
        let mut header = las.header.clone();
        header.set_compressed(true);
        let mut writer = Writer::with_backends(
            Cursor::new(Vec::new()),
            header,
            VlrList::new(),
            &[LazBackend::Laszip],
        )
        .unwrap();
        writer.write(&las.points).unwrap();
        writer.close().unwrap();
        let mut cursor = writer.into_inner().unwrap();
        cursor.set_position(0);
        let raw = laspack::raw::Header::read_from(&mut cursor).unwrap();
        assert_eq!(100, raw.number_of_point_records);
        assert_eq!(99., raw.max_x);
        assert_eq!(-99., raw.min_y);
    }
}
