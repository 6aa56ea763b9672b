use criterion::{criterion_group, criterion_main, Criterion};
use laspack::{LasData, PointFormat};
use std::io::Cursor;

fn roundtrip(c: &mut Criterion) {
    let mut las = LasData::new(PointFormat::from_id(1).unwrap()).unwrap();
    las.points.resize(1024);
    for i in 0..1024 {
        las.x_mut().set(i, i as f64).unwrap();
    }

    c.bench_function("write 1024 points", |b| {
        b.iter(|| las.write_to(Cursor::new(Vec::new()), false).unwrap())
    });

    let bytes = las
        .write_to(Cursor::new(Vec::new()), false)
        .unwrap()
        .into_inner();
    c.bench_function("read 1024 points", |b| {
        b.iter(|| laspack::read_from(Cursor::new(bytes.clone())).unwrap())
    });

    c.bench_function("unpack return numbers", |b| {
        b.iter(|| las.points.unpack("return_number").unwrap())
    });
}

criterion_group!(benches, roundtrip);
criterion_main!(benches);
