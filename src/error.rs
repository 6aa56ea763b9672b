//! Crate-specific errors.

use crate::{dimension::DataType, Version};
use thiserror::Error;

/// Crate-specific errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The dimension is bit-packed and has no byte-addressed column.
    ///
    /// Use [unpack](crate::PackedPointRecord::unpack) and
    /// [pack](crate::PackedPointRecord::pack) instead.
    #[error("dimension {0} is bit-packed and has no column view")]
    BitPackedDimension(String),

    /// Evlrs are only supported by las 1.4.
    #[error("version {0} does not support evlrs")]
    EvlrNotSupported(Version),

    /// The point format is not supported by the las version.
    #[error("point format {point_format_id} is not supported by version {version}")]
    IncompatibleVersion {
        /// The las version.
        version: Version,
        /// The offending point format id.
        point_format_id: u8,
    },

    /// The writer received points whose format differs from the one it was
    /// opened with.
    #[error("the point format of the chunk does not match the writer's point format")]
    IncompatibleFormat,

    /// The name does not match any dimension of the point format.
    #[error("{0} is not a dimension of this point format")]
    InvalidDimension(String),

    /// The header's point size is too small for its point format.
    #[error("point size {point_size} is too small for point format {point_format_id}")]
    InvalidPointSize {
        /// The point format id.
        point_format_id: u8,
        /// The point size from the header.
        point_size: u16,
    },

    /// The number of scale or offset values does not match the extra bytes
    /// type's element count.
    #[error("expected {expected} scale/offset values, got {got}")]
    InvalidScaleArity {
        /// The element count of the extra bytes type.
        expected: usize,
        /// The number of values provided.
        got: usize,
    },

    /// The first four bytes of the file are not `LASF`.
    #[error("invalid file signature: {0:?}")]
    InvalidSignature([u8; 4]),

    /// Wrapper around `std::io::Error`.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The laz back-end reported an error.
    #[error("laz: {0}")]
    Laz(String),

    /// A typed column view was requested with the wrong primitive type.
    #[error("dimension {name} is stored as {data_type:?}")]
    MismatchedDimensionType {
        /// The dimension name.
        name: String,
        /// The data type the dimension is actually stored as.
        data_type: DataType,
    },

    /// The file is compressed but carries no laszip vlr.
    #[error("the file is compressed but has no laszip vlr")]
    MissingLaszipVlr,

    /// An extra bytes name or description exceeds its 32 byte slot.
    #[error("{0}")]
    NameTooLong(String),

    /// Every laz back-end was unavailable or failed to initialize.
    #[error("no laz back-end could be initialized: {last_error}")]
    NoLazBackend {
        /// The error reported by the last back-end tried.
        last_error: String,
    },

    /// The destination does not support seeking back to the header.
    #[error("the destination is not seekable")]
    NonSeekableDestination,

    /// A value does not fit the bit width of a packed sub-field.
    #[error("value {value} overflows the {bits} bit dimension {name}")]
    Overflow {
        /// The dimension name.
        name: String,
        /// The offending value.
        value: u8,
        /// The bit width of the dimension.
        bits: u8,
    },

    /// After unscaling, the value does not fit the underlying integer type.
    #[error("scaled value {0} does not fit in the underlying integer type")]
    ScaledValueOverflow(f64),

    /// A string does not fit its fixed-size field.
    #[error("string is too long for its {len} byte field: {string}")]
    StringTooLong {
        /// The string.
        string: String,
        /// The length of the field.
        len: usize,
    },

    /// The point data ended early.
    #[error("point data is truncated: expected {expected} bytes, got {got}")]
    TruncatedPointData {
        /// The number of bytes the header promised.
        expected: u64,
        /// The number of bytes actually present.
        got: u64,
    },

    /// The extra bytes type code or type name is not recognized.
    #[error("unknown extra bytes type: {0}")]
    UnknownExtraByteType(String),

    /// The point format id is not in the supported set.
    #[error("point format {0} is not supported")]
    UnsupportedFormat(u8),

    /// The las version is not supported by this crate.
    #[error("version {major}.{minor} is not supported")]
    UnsupportedVersion {
        /// The major version.
        major: u8,
        /// The minor version.
        minor: u8,
    },

    /// Wrapper around `std::str::Utf8Error`.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// The vlr payload is too long for a non-extended vlr.
    #[error("the vlr payload is too long: {0}")]
    VlrDataTooLong(usize),

    /// Points or evlrs were supplied after the writer was finalized.
    #[error("the writer is done, nothing more can be written")]
    WriteAfterDone,
}

#[cfg(feature = "laz")]
impl From<laz::LasZipError> for Error {
    fn from(error: laz::LasZipError) -> Error {
        Error::Laz(error.to_string())
    }
}
