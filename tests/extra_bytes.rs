//! Extra bytes dimensions, declared and round-tripped.

use laspack::{Error, ExtraBytesParams, LasData, PointFormat};
use std::io::Cursor;

fn write_then_read_again(las: &LasData) -> LasData {
    let mut cursor = las.write_to(Cursor::new(Vec::new()), false).unwrap();
    cursor.set_position(0);
    laspack::read_from(cursor).unwrap()
}

#[test]
fn named_with_spaces() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    las.points.resize(5);
    las.add_extra_dim(ExtraBytesParams::new("Name With Spaces", "int32"))
        .unwrap();
    las.points
        .column_mut::<i32>("Name With Spaces")
        .unwrap()
        .fill(789464);

    let las = write_then_read_again(&las);
    assert_eq!(
        vec![789464; 5],
        las.points
            .column::<i32>("Name With Spaces")
            .unwrap()
            .to_vec()
    );
}

#[test]
fn name_too_long() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    match las.add_extra_dim(ExtraBytesParams::new(&"x".repeat(70), "int32")) {
        Err(Error::NameTooLong(message)) => {
            assert_eq!("bytes too long (70, maximum length 32)", message);
        }
        other => panic!("expected NameTooLong, got {:?}", other),
    }
    // nothing was added
    assert_eq!(20, las.point_format().size());
}

#[test]
fn scaled_three_vector() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    las.points.resize(4);
    las.add_extra_dim(
        ExtraBytesParams::new("x", "3int32")
            .with_scales(vec![1., 2., 3.])
            .with_offsets(vec![10., 20., 30.]),
    )
    .unwrap();

    // zero-filled raw values surface as the offsets
    let scaled = las.points.scaled("x").unwrap();
    assert_eq!(10., scaled.component(0, 0));
    assert_eq!(20., scaled.component(0, 1));
    assert_eq!(30., scaled.component(0, 2));
    drop(scaled);

    let mut scaled = las.points.scaled_mut("x").unwrap();
    for i in 0..4 {
        scaled.set_component(i, 0, 42.).unwrap();
        scaled.set_component(i, 1, 82.).unwrap();
        scaled.set_component(i, 2, 123.).unwrap();
    }
    drop(scaled);

    let las = write_then_read_again(&las);
    let scaled = las.points.scaled("x").unwrap();
    for i in 0..4 {
        assert_eq!(42., scaled.component(i, 0));
        assert_eq!(82., scaled.component(i, 1));
        assert_eq!(123., scaled.component(i, 2));
    }
    // the raw integers hold the unscaled values
    let raw = las.points.column::<i32>("x").unwrap();
    assert_eq!(32, raw.component(0, 0));
    assert_eq!(31, raw.component(0, 1));
    assert_eq!(31, raw.component(0, 2));
}

#[test]
fn adding_extra_bytes_keeps_existing_values() {
    let mut las = LasData::new(PointFormat::from_id(1).unwrap()).unwrap();
    las.points.resize(3);
    las.points
        .column_mut::<u16>("intensity")
        .unwrap()
        .copy_from_slice(&[5, 6, 7]);
    las.points.column_mut::<f64>("gps_time").unwrap().fill(1.25);

    las.add_extra_dim(ExtraBytesParams::new("first", "uint8")).unwrap();
    las.add_extra_dim(ExtraBytesParams::new("second", "float64")).unwrap();
    las.points.column_mut::<u8>("first").unwrap().fill(200);

    assert_eq!(
        vec![5, 6, 7],
        las.points.column::<u16>("intensity").unwrap().to_vec()
    );
    assert_eq!(
        vec![1.25, 1.25, 1.25],
        las.points.column::<f64>("gps_time").unwrap().to_vec()
    );

    let las = write_then_read_again(&las);
    assert_eq!(28 + 9, usize::from(las.point_format().size()));
    assert_eq!(vec![200; 3], las.points.column::<u8>("first").unwrap().to_vec());
    assert_eq!(
        vec![0., 0., 0.],
        las.points.column::<f64>("second").unwrap().to_vec()
    );
    assert_eq!(
        vec![5, 6, 7],
        las.points.column::<u16>("intensity").unwrap().to_vec()
    );
}

#[test]
fn descriptors_roundtrip_through_the_vlr() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    las.add_extra_dim(
        ExtraBytesParams::new("range", "uint16").with_description("slant range"),
    )
    .unwrap();

    let las = write_then_read_again(&las);
    let dimension = las.point_format().extra_dimension("range").unwrap();
    assert_eq!("slant range", dimension.description());
    assert!(!dimension.is_scaled());
    assert_eq!(1, las.vlrs.len());
    assert!(las.vlrs.iter().next().unwrap().is_extra_bytes());
}

#[test]
fn unknown_type_string() {
    let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    assert!(matches!(
        las.add_extra_dim(ExtraBytesParams::new("x", "complex128")),
        Err(Error::UnknownExtraByteType(_))
    ));
}
