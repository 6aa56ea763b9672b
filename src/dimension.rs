//! The per-format dimension registry.
//!
//! Every point format id fixes an ordered set of dimensions that tile the
//! record contiguously. Most dimensions occupy whole bytes; a few are bit
//! ranges packed into a composed byte (`bit_fields`, `raw_classification`,
//! and the format >= 6 flag bytes). The registry is the single source of
//! truth for names, storage types, and placements.

use crate::{Error, Result};

/// Storage type of a dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned 8 bit integer.
    U8,
    /// Signed 8 bit integer.
    I8,
    /// Unsigned 16 bit integer.
    U16,
    /// Signed 16 bit integer.
    I16,
    /// Unsigned 32 bit integer.
    U32,
    /// Signed 32 bit integer.
    I32,
    /// Unsigned 64 bit integer.
    U64,
    /// Signed 64 bit integer.
    I64,
    /// IEEE-754 single precision float.
    F32,
    /// IEEE-754 double precision float.
    F64,
}

impl DataType {
    /// The size in bytes of one element.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::dimension::DataType;
    /// assert_eq!(4, DataType::I32.size());
    /// ```
    pub fn size(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::U64 | DataType::I64 | DataType::F64 => 8,
        }
    }

    /// Is this an integer type?
    pub fn is_integer(&self) -> bool {
        !matches!(self, DataType::F32 | DataType::F64)
    }
}

/// Where a dimension lives inside a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Whole bytes starting at this offset from the start of the record.
    Whole {
        /// The byte offset inside one record.
        offset: usize,
    },
    /// A bit range `[low, high)` inside a composed single-byte field.
    Sub {
        /// The name of the composed byte that stores the bits.
        parent: &'static str,
        /// The first bit, inclusive.
        low: u8,
        /// The last bit, exclusive.
        high: u8,
    },
}

/// One fixed dimension of a point format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimension {
    /// The dimension name.
    pub name: &'static str,
    /// The storage type. Bit-packed sub-fields report `U8`, their logical
    /// type.
    pub data_type: DataType,
    /// The byte or bit placement.
    pub placement: Placement,
}

/// Does this point format carry a gps time?
pub fn has_gps_time(point_format_id: u8) -> bool {
    matches!(point_format_id, 1 | 3 | 4 | 5) || point_format_id >= 6
}

/// Does this point format carry rgb color?
pub fn has_color(point_format_id: u8) -> bool {
    matches!(point_format_id, 2 | 3 | 5 | 7 | 8 | 10)
}

/// Does this point format carry near infrared?
pub fn has_nir(point_format_id: u8) -> bool {
    matches!(point_format_id, 8 | 10)
}

/// Does this point format carry a waveform packet?
pub fn has_waveform(point_format_id: u8) -> bool {
    matches!(point_format_id, 4 | 5 | 9 | 10)
}

/// Returns the fixed dimensions of the point format, in record order.
///
/// Fails with [Error::UnsupportedFormat] for ids outside 0-10.
///
/// # Examples
///
/// ```
/// let dimensions = laspack::dimension::fixed_dimensions(0).unwrap();
/// assert_eq!("X", dimensions[0].name);
/// assert!(laspack::dimension::fixed_dimensions(11).is_err());
/// ```
pub fn fixed_dimensions(point_format_id: u8) -> Result<Vec<Dimension>> {
    if point_format_id > 10 {
        return Err(Error::UnsupportedFormat(point_format_id));
    }
    let mut layout = Layout::new();
    layout.whole("X", DataType::I32);
    layout.whole("Y", DataType::I32);
    layout.whole("Z", DataType::I32);
    layout.whole("intensity", DataType::U16);
    if point_format_id < 6 {
        layout.whole("bit_fields", DataType::U8);
        layout.sub("return_number", "bit_fields", 0, 3);
        layout.sub("number_of_returns", "bit_fields", 3, 6);
        layout.sub("scan_direction_flag", "bit_fields", 6, 7);
        layout.sub("edge_of_flight_line", "bit_fields", 7, 8);
        layout.whole("raw_classification", DataType::U8);
        layout.sub("classification", "raw_classification", 0, 5);
        layout.sub("synthetic", "raw_classification", 5, 6);
        layout.sub("key_point", "raw_classification", 6, 7);
        layout.sub("withheld", "raw_classification", 7, 8);
        layout.whole("scan_angle_rank", DataType::I8);
        layout.whole("user_data", DataType::U8);
        layout.whole("point_source_id", DataType::U16);
        if has_gps_time(point_format_id) {
            layout.whole("gps_time", DataType::F64);
        }
        if has_color(point_format_id) {
            layout.whole("red", DataType::U16);
            layout.whole("green", DataType::U16);
            layout.whole("blue", DataType::U16);
        }
    } else {
        layout.whole("bit_fields", DataType::U8);
        layout.sub("return_number", "bit_fields", 0, 4);
        layout.sub("number_of_returns", "bit_fields", 4, 8);
        layout.whole("classification_flags", DataType::U8);
        layout.sub("synthetic", "classification_flags", 0, 1);
        layout.sub("key_point", "classification_flags", 1, 2);
        layout.sub("withheld", "classification_flags", 2, 3);
        layout.sub("overlap", "classification_flags", 3, 4);
        layout.sub("scanner_channel", "classification_flags", 4, 6);
        layout.sub("scan_direction_flag", "classification_flags", 6, 7);
        layout.sub("edge_of_flight_line", "classification_flags", 7, 8);
        layout.whole("classification", DataType::U8);
        layout.whole("user_data", DataType::U8);
        layout.whole("scan_angle", DataType::I16);
        layout.whole("point_source_id", DataType::U16);
        layout.whole("gps_time", DataType::F64);
        if has_color(point_format_id) {
            layout.whole("red", DataType::U16);
            layout.whole("green", DataType::U16);
            layout.whole("blue", DataType::U16);
        }
        if has_nir(point_format_id) {
            layout.whole("nir", DataType::U16);
        }
    }
    if has_waveform(point_format_id) {
        layout.whole("wavepacket_index", DataType::U8);
        layout.whole("wavepacket_offset", DataType::U64);
        layout.whole("wavepacket_size", DataType::U32);
        layout.whole("return_point_wave_location", DataType::F32);
        layout.whole("x_t", DataType::F32);
        layout.whole("y_t", DataType::F32);
        layout.whole("z_t", DataType::F32);
    }
    Ok(layout.dimensions)
}

/// Returns the base record size of the point format, without extra bytes.
///
/// # Examples
///
/// ```
/// assert_eq!(20, laspack::dimension::base_size(0).unwrap());
/// assert_eq!(30, laspack::dimension::base_size(6).unwrap());
/// ```
pub fn base_size(point_format_id: u8) -> Result<u16> {
    let dimensions = fixed_dimensions(point_format_id)?;
    Ok(dimensions
        .iter()
        .filter_map(|dimension| match dimension.placement {
            Placement::Whole { .. } => Some(dimension.data_type.size() as u16),
            Placement::Sub { .. } => None,
        })
        .sum())
}

struct Layout {
    dimensions: Vec<Dimension>,
    offset: usize,
}

impl Layout {
    fn new() -> Layout {
        Layout {
            dimensions: Vec::new(),
            offset: 0,
        }
    }

    fn whole(&mut self, name: &'static str, data_type: DataType) {
        self.dimensions.push(Dimension {
            name,
            data_type,
            placement: Placement::Whole {
                offset: self.offset,
            },
        });
        self.offset += data_type.size();
    }

    fn sub(&mut self, name: &'static str, parent: &'static str, low: u8, high: u8) {
        debug_assert!(low < high && high <= 8);
        self.dimensions.push(Dimension {
            name,
            data_type: DataType::U8,
            placement: Placement::Sub { parent, low, high },
        });
    }
}
