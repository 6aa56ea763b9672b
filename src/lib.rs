//! Columnar library for reading and writing the [ASPRS
//! LAS](https://www.asprs.org/committee-general/laser-las-file-format-exchange-activities.html)
//! data exchange format.
//!
//! LAS stores [LiDAR](https://en.wikipedia.org/wiki/Lidar) returns as tightly
//! packed point records behind a fixed-layout header and a list of variable
//! length records (vlrs). This crate keeps the point records packed in a
//! single contiguous buffer and exposes them column-by-column, which is the
//! natural shape for bulk processing: a million intensities are one strided
//! view, not a million structs.
//!
//! # Reading
//!
//! [read] pulls a whole file into a [LasData]:
//!
//! ```no_run
//! let las = laspack::read("points.las").unwrap();
//! println!("{} points", las.points.len());
//! for x in las.x().iter() {
//!     // scaled, f64 coordinates
//! }
//! ```
//!
//! # Writing
//!
//! A [LasData] writes itself back out, optionally laz-compressed:
//!
//! ```
//! use laspack::{LasData, PointFormat};
//! use std::io::Cursor;
//!
//! let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
//! las.points.resize(10);
//! las.x_mut().fill(1.5).unwrap();
//! las.write_to(Cursor::new(Vec::new()), false).unwrap();
//! ```
//!
//! For streaming output, use a [Writer] directly. It reserves space for the
//! header, streams point chunks (through a laz back-end when compressing),
//! and rewrites the header with final statistics on [close](Writer::close).
//!
//! # Dimensions
//!
//! Whole-byte dimensions are accessed as typed columns that alias the record
//! buffer. Bit-packed dimensions (return number, classification flags, ...)
//! are unpacked into a fresh array; assigning the array back with
//! [pack](PackedPointRecord::pack) is the only way mutations reach the
//! buffer:
//!
//! ```
//! use laspack::{PackedPointRecord, PointFormat};
//!
//! let mut points = PackedPointRecord::zeros(PointFormat::from_id(0).unwrap(), 4);
//! let mut intensity = points.column_mut::<u16>("intensity").unwrap();
//! intensity.set(0, 42); // immediate
//!
//! let mut return_number = points.unpack("return_number").unwrap();
//! return_number[0] = 2;
//! points.pack("return_number", &return_number).unwrap(); // write-back
//! ```

#![deny(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    unsafe_code,
    unused_qualifications
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod compression;
pub mod dimension;
pub mod feature;
pub mod point;
pub mod raw;
pub mod utils;

mod bounds;
mod error;
mod header;
mod lasdata;
mod reader;
mod transform;
mod vector;
mod version;
mod vlr;
mod writer;

pub use crate::{
    bounds::Bounds,
    compression::LazBackend,
    error::Error,
    header::Header,
    lasdata::LasData,
    point::{ExtraBytesParams, PackedPointRecord, PointFormat},
    reader::{read, read_from, Reader},
    transform::Transform,
    vector::Vector,
    version::Version,
    vlr::{Vlr, VlrList},
    writer::{Truncate, Writer},
};

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
