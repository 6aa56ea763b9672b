//! Write data out, read it back, and check that nothing changed.

use laspack::{LasData, PointFormat, Vlr};
use std::io::Cursor;

fn write_then_read_again(las: &LasData) -> LasData {
    let mut cursor = las.write_to(Cursor::new(Vec::new()), false).unwrap();
    cursor.set_position(0);
    laspack::read_from(cursor).unwrap()
}

#[test]
fn zeros_roundtrip_bit_identically() {
    for id in 0..=10 {
        for count in [0, 1, 1024] {
            let mut las = LasData::new(PointFormat::from_id(id).unwrap()).unwrap();
            las.points.resize(count);
            let roundtripped = write_then_read_again(&las);
            assert_eq!(
                las.points.as_bytes(),
                roundtripped.points.as_bytes(),
                "format {} with {} points",
                id,
                count
            );
            assert_eq!(count as u64, roundtripped.header.point_count);
        }
    }
}

#[test]
fn coordinates_roundtrip() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    las.points.resize(150);
    las.x_mut().fill(0.).unwrap();
    las.y_mut().fill(1.).unwrap();
    las.z_mut().fill(-152.).unwrap();

    let las = write_then_read_again(&las);
    assert_eq!(150, las.points.len());
    assert!(las.x().iter().all(|x| x == 0.));
    assert!(las.y().iter().all(|y| y == 1.));
    assert!(las.z().iter().all(|z| z == -152.));
}

#[test]
fn scaled_coordinates_roundtrip() {
    let mut las = LasData::new(PointFormat::from_id(1).unwrap()).unwrap();
    las.header.transforms.x.scale = 0.5;
    las.header.transforms.x.offset = 500.;
    las.points.resize(3);
    las.x_mut().copy_from_slice(&[500.5, 499.5, 500.]).unwrap();

    let las = write_then_read_again(&las);
    assert_eq!(
        vec![1, -1, 0],
        las.points.column::<i32>("X").unwrap().to_vec()
    );
    assert_eq!(
        vec![500.5, 499.5, 500.],
        las.x().iter().collect::<Vec<_>>()
    );
    assert_eq!(0.5, las.header.transforms.x.scale);
    assert_eq!(500., las.header.transforms.x.offset);
}

#[test]
fn header_statistics_are_recomputed() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    las.points.resize(4);
    las.x_mut().copy_from_slice(&[1., -2., 3., 0.]).unwrap();
    las.y_mut().fill(7.).unwrap();
    las.z_mut().fill(-1.).unwrap();
    las.points.pack("return_number", &[1, 1, 2, 7]).unwrap();
    // poison the statistics; the writer must not trust them
    las.header.point_count = 999;
    las.header.bounds.max.x = 999.;

    let las = write_then_read_again(&las);
    assert_eq!(4, las.header.point_count);
    assert_eq!(-2., las.header.bounds.min.x);
    assert_eq!(3., las.header.bounds.max.x);
    assert_eq!(7., las.header.bounds.min.y);
    assert_eq!(-1., las.header.bounds.max.z);
    assert_eq!(2, las.header.number_of_points_by_return[0]);
    assert_eq!(1, las.header.number_of_points_by_return[1]);
    let total: u64 = las.header.number_of_points_by_return.iter().sum();
    assert!(total <= las.header.point_count);
}

#[test]
fn unknown_vlrs_pass_through() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    las.vlrs.push(Vlr {
        user_id: "some software".to_string(),
        record_id: 1234,
        description: "opaque".to_string(),
        data: vec![1, 2, 3, 4, 5],
    });

    let las = write_then_read_again(&las);
    assert_eq!(1, las.vlrs.len());
    let vlr = las.vlrs.get("some software", 1234).unwrap();
    assert_eq!(vec![1, 2, 3, 4, 5], vlr.data);
}

#[test]
fn evlrs_roundtrip() {
    let mut las = LasData::new(PointFormat::from_id(6).unwrap()).unwrap();
    las.points.resize(2);
    las.evlrs.push(Vlr {
        user_id: "some software".to_string(),
        record_id: 7,
        description: "trailing".to_string(),
        data: vec![42; 100],
    });

    let las = write_then_read_again(&las);
    assert_eq!(2, las.points.len());
    assert_eq!(1, las.evlrs.len());
    assert_eq!(vec![42; 100], las.evlrs.get("some software", 7).unwrap().data);
    assert_eq!(1, las.header.number_of_evlrs);
    assert!(las.header.start_of_first_evlr > 0);
}

#[test]
fn evlrs_rejected_before_1_4() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    las.evlrs.push(Vlr::default());
    assert!(matches!(
        las.write_to(Cursor::new(Vec::new()), false),
        Err(laspack::Error::EvlrNotSupported(_))
    ));
}

#[test]
fn truncated_point_data() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    las.points.resize(10);
    let cursor = las.write_to(Cursor::new(Vec::new()), false).unwrap();
    let mut bytes = cursor.into_inner();
    // chop off a record and a half
    bytes.truncate(bytes.len() - 30);

    assert!(matches!(
        laspack::read_from(Cursor::new(bytes.clone())),
        Err(laspack::Error::TruncatedPointData { .. })
    ));

    let las = laspack::Reader::new()
        .permissive(true)
        .read_from(Cursor::new(bytes))
        .unwrap();
    assert_eq!(8, las.points.len());
    assert_eq!(8, las.header.point_count);
}

#[test]
fn all_fields_roundtrip_per_version() {
    for (minor, id) in [(0u8, 1u8), (1, 0), (2, 3), (3, 5), (4, 10)] {
        let mut las = LasData::with_version(
            PointFormat::from_id(id).unwrap(),
            laspack::Version::new(1, minor),
        )
        .unwrap();
        las.header.file_source_id = 42;
        las.header.system_identifier = "unit test".to_string();
        las.points.resize(7);
        las.points.column_mut::<u16>("intensity").unwrap().fill(99);

        let roundtripped = write_then_read_again(&las);
        assert_eq!(las.header.version, roundtripped.header.version, "1.{}", minor);
        assert_eq!(42, roundtripped.header.file_source_id);
        assert_eq!("unit test", roundtripped.header.system_identifier);
        assert_eq!(las.points, roundtripped.points, "1.{}", minor);
    }
}
