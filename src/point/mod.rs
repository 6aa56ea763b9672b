//! Point record schemas, packed records, and their column views.
//!
//! The pieces, bottom up:
//!
//! - [PointFormat] composes the fixed dimensions of a point format id with
//!   extra bytes dimensions into a record schema.
//! - [PackedPointRecord] owns the packed buffer and hands out column views.
//! - [ScaledColumn]/[ScaledColumnMut] put a scale and offset in front of an
//!   integer column.

mod extra_bytes;
mod format;
mod packing;
mod record;
mod scaled;

pub use self::{
    extra_bytes::{ExtraByteKind, ExtraBytesParams, ExtraBytesVlr, ExtraDimension},
    format::{DimensionLayout, PointFormat},
    record::{Column, ColumnMut, PackedPointRecord, Primitive},
    scaled::{ScaledColumn, ScaledColumnMut},
};
