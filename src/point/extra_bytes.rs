//! User-defined dimensions appended to every point record.
//!
//! Extra bytes are declared in a `LASF_Spec`/4 vlr as a list of fixed
//! 192-byte descriptors. Each descriptor names one trailing dimension,
//! scalar or a two/three element vector, optionally with per-component
//! scale and offset.

use crate::{dimension::DataType, utils::AsLasStr, utils::FromLasStr, Error, Result, Transform, Vlr};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};
use std::str::FromStr;

const DESCRIPTOR_SIZE: usize = 192;
const NAME_SIZE: usize = 32;

const NO_DATA_BIT: u8 = 0x01;
const MIN_BIT: u8 = 0x02;
const MAX_BIT: u8 = 0x04;
const SCALE_BIT: u8 = 0x08;
const OFFSET_BIT: u8 = 0x10;

/// The storage type of one extra bytes dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtraByteKind {
    /// A single value.
    Scalar(DataType),
    /// A two or three element vector.
    Array(DataType, usize),
    /// Raw bytes with no declared interpretation (type code zero). The
    /// payload is the byte count.
    Undocumented(usize),
}

impl ExtraByteKind {
    /// The number of components.
    ///
    /// Undocumented runs count as one `u8` component per byte.
    pub fn count(&self) -> usize {
        match *self {
            ExtraByteKind::Scalar(_) => 1,
            ExtraByteKind::Array(_, count) => count,
            ExtraByteKind::Undocumented(count) => count,
        }
    }

    /// The data type of one component.
    pub fn data_type(&self) -> DataType {
        match *self {
            ExtraByteKind::Scalar(data_type) | ExtraByteKind::Array(data_type, _) => data_type,
            ExtraByteKind::Undocumented(_) => DataType::U8,
        }
    }

    /// The total size in bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::point::ExtraByteKind;
    /// let kind: ExtraByteKind = "3int32".parse().unwrap();
    /// assert_eq!(12, kind.size());
    /// ```
    pub fn size(&self) -> usize {
        self.count() * self.data_type().size()
    }

    fn to_code(self) -> u8 {
        let base = match self.data_type() {
            DataType::U8 => 1,
            DataType::I8 => 2,
            DataType::U16 => 3,
            DataType::I16 => 4,
            DataType::U32 => 5,
            DataType::I32 => 6,
            DataType::U64 => 7,
            DataType::I64 => 8,
            DataType::F32 => 9,
            DataType::F64 => 10,
        };
        match self {
            ExtraByteKind::Scalar(_) => base,
            ExtraByteKind::Array(_, count) => base + 10 * (count as u8 - 1),
            ExtraByteKind::Undocumented(_) => 0,
        }
    }

    fn from_code(code: u8, options: u8) -> Result<ExtraByteKind> {
        if code == 0 {
            return Ok(ExtraByteKind::Undocumented(usize::from(options)));
        }
        if code > 30 {
            return Err(Error::UnknownExtraByteType(code.to_string()));
        }
        let data_type = match (code - 1) % 10 + 1 {
            1 => DataType::U8,
            2 => DataType::I8,
            3 => DataType::U16,
            4 => DataType::I16,
            5 => DataType::U32,
            6 => DataType::I32,
            7 => DataType::U64,
            8 => DataType::I64,
            9 => DataType::F32,
            _ => DataType::F64,
        };
        let count = usize::from((code - 1) / 10) + 1;
        if count == 1 {
            Ok(ExtraByteKind::Scalar(data_type))
        } else {
            Ok(ExtraByteKind::Array(data_type, count))
        }
    }
}

impl FromStr for ExtraByteKind {
    type Err = Error;

    /// Parses a type string.
    ///
    /// Both the spelled-out names (`"int32"`, `"3float64"`) and the
    /// byte-count shorthand (`"i4"`, `"3f8"`, where the digit counts bytes,
    /// so `"u8"` is an unsigned *64 bit* integer) are accepted.
    fn from_str(s: &str) -> Result<ExtraByteKind> {
        let (count, rest) = if let Some(rest) = s.strip_prefix('2') {
            (2, rest)
        } else if let Some(rest) = s.strip_prefix('3') {
            (3, rest)
        } else {
            (1, s)
        };
        let data_type = match rest {
            "u1" | "uint8" => DataType::U8,
            "i1" | "int8" => DataType::I8,
            "u2" | "uint16" => DataType::U16,
            "i2" | "int16" => DataType::I16,
            "u4" | "uint32" => DataType::U32,
            "i4" | "int32" => DataType::I32,
            "u8" | "uint64" => DataType::U64,
            "i8" | "int64" => DataType::I64,
            "f4" | "float32" => DataType::F32,
            "f8" | "float64" => DataType::F64,
            _ => return Err(Error::UnknownExtraByteType(s.to_string())),
        };
        if count == 1 {
            Ok(ExtraByteKind::Scalar(data_type))
        } else {
            Ok(ExtraByteKind::Array(data_type, count))
        }
    }
}

/// Parameters for declaring a new extra bytes dimension.
///
/// # Examples
///
/// ```
/// use laspack::ExtraBytesParams;
/// let params = ExtraBytesParams::new("range", "float64").with_description("slant range");
/// ```
#[derive(Clone, Debug)]
pub struct ExtraBytesParams {
    /// The dimension name, at most 32 bytes.
    pub name: String,
    /// The type string, e.g. `"int32"` or `"3float64"`.
    pub data_type: String,
    /// Optional per-component scales.
    pub scales: Option<Vec<f64>>,
    /// Optional per-component offsets.
    pub offsets: Option<Vec<f64>>,
    /// A description, at most 32 bytes.
    pub description: String,
}

impl ExtraBytesParams {
    /// Creates new parameters for the given name and type string.
    pub fn new(name: &str, data_type: &str) -> ExtraBytesParams {
        ExtraBytesParams {
            name: name.to_string(),
            data_type: data_type.to_string(),
            scales: None,
            offsets: None,
            description: String::new(),
        }
    }

    /// Sets the per-component scales.
    pub fn with_scales(mut self, scales: Vec<f64>) -> ExtraBytesParams {
        self.scales = Some(scales);
        self
    }

    /// Sets the per-component offsets.
    pub fn with_offsets(mut self, offsets: Vec<f64>) -> ExtraBytesParams {
        self.offsets = Some(offsets);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> ExtraBytesParams {
        self.description = description.to_string();
        self
    }
}

/// One declared extra bytes dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraDimension {
    name: String,
    kind: ExtraByteKind,
    scales: Option<Vec<f64>>,
    offsets: Option<Vec<f64>>,
    description: String,
    // Raw 24-byte descriptor blocks, kept opaque so foreign files round-trip.
    no_data: Option<[u8; 24]>,
    min: Option<[u8; 24]>,
    max: Option<[u8; 24]>,
}

impl ExtraDimension {
    /// Validates the parameters and builds a dimension.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::point::ExtraDimension;
    /// use laspack::ExtraBytesParams;
    ///
    /// let dimension = ExtraDimension::from_params(ExtraBytesParams::new("range", "uint16")).unwrap();
    /// assert_eq!(2, dimension.size());
    /// ```
    pub fn from_params(params: ExtraBytesParams) -> Result<ExtraDimension> {
        check_name(&params.name)?;
        check_name(&params.description)?;
        let kind = params.data_type.parse::<ExtraByteKind>()?;
        for values in [&params.scales, &params.offsets].into_iter().flatten() {
            if values.len() != kind.count() {
                return Err(Error::InvalidScaleArity {
                    expected: kind.count(),
                    got: values.len(),
                });
            }
        }
        Ok(ExtraDimension {
            name: params.name,
            kind,
            scales: params.scales,
            offsets: params.offsets,
            description: params.description,
            no_data: None,
            min: None,
            max: None,
        })
    }

    /// The dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The storage kind.
    pub fn kind(&self) -> ExtraByteKind {
        self.kind
    }

    /// The total size in bytes.
    pub fn size(&self) -> usize {
        self.kind.size()
    }

    /// The description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Does this dimension declare a scale or an offset?
    pub fn is_scaled(&self) -> bool {
        self.scales.is_some() || self.offsets.is_some()
    }

    /// Per-component transforms, identity where no scale or offset was
    /// declared.
    pub fn transforms(&self) -> Vec<Transform> {
        (0..self.kind.count())
            .map(|i| Transform {
                scale: self.scales.as_ref().map_or(1., |scales| scales[i]),
                offset: self.offsets.as_ref().map_or(0., |offsets| offsets[i]),
            })
            .collect()
    }

    fn read_from<R: Read>(mut read: R) -> Result<ExtraDimension> {
        let mut reserved = [0; 2];
        read.read_exact(&mut reserved)?;
        let code = read.read_u8()?;
        let options = read.read_u8()?;
        let mut name = [0; NAME_SIZE];
        read.read_exact(&mut name)?;
        let mut unused = [0; 4];
        read.read_exact(&mut unused)?;
        let mut no_data = [0; 24];
        read.read_exact(&mut no_data)?;
        let mut min = [0; 24];
        read.read_exact(&mut min)?;
        let mut max = [0; 24];
        read.read_exact(&mut max)?;
        let mut scales = [0f64; 3];
        read.read_f64_into::<LittleEndian>(&mut scales)?;
        let mut offsets = [0f64; 3];
        read.read_f64_into::<LittleEndian>(&mut offsets)?;
        let mut description = [0; NAME_SIZE];
        read.read_exact(&mut description)?;

        let kind = ExtraByteKind::from_code(code, options)?;
        // For undocumented bytes the options field is a byte count, not a
        // bit field.
        let options = if code == 0 { 0 } else { options };
        let count = kind.count().min(3);
        Ok(ExtraDimension {
            name: name.as_ref().as_las_str()?.to_string(),
            kind,
            scales: (options & SCALE_BIT != 0).then(|| scales[..count].to_vec()),
            offsets: (options & OFFSET_BIT != 0).then(|| offsets[..count].to_vec()),
            description: description.as_ref().as_las_str()?.to_string(),
            no_data: (options & NO_DATA_BIT != 0).then_some(no_data),
            min: (options & MIN_BIT != 0).then_some(min),
            max: (options & MAX_BIT != 0).then_some(max),
        })
    }

    fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&[0; 2])?;
        write.write_u8(self.kind.to_code())?;
        let mut options = 0;
        if let ExtraByteKind::Undocumented(count) = self.kind {
            options = count as u8;
        } else {
            if self.no_data.is_some() {
                options |= NO_DATA_BIT;
            }
            if self.min.is_some() {
                options |= MIN_BIT;
            }
            if self.max.is_some() {
                options |= MAX_BIT;
            }
            if self.scales.is_some() {
                options |= SCALE_BIT;
            }
            if self.offsets.is_some() {
                options |= OFFSET_BIT;
            }
        }
        write.write_u8(options)?;
        let mut name = [0; NAME_SIZE];
        name.as_mut().from_las_str(&self.name)?;
        write.write_all(&name)?;
        write.write_all(&[0; 4])?;
        write.write_all(&self.no_data.unwrap_or([0; 24]))?;
        write.write_all(&self.min.unwrap_or([0; 24]))?;
        write.write_all(&self.max.unwrap_or([0; 24]))?;
        let mut scales = [0f64; 3];
        if let Some(declared) = &self.scales {
            scales[..declared.len()].copy_from_slice(declared);
        }
        for scale in scales {
            write.write_f64::<LittleEndian>(scale)?;
        }
        let mut offsets = [0f64; 3];
        if let Some(declared) = &self.offsets {
            offsets[..declared.len()].copy_from_slice(declared);
        }
        for offset in offsets {
            write.write_f64::<LittleEndian>(offset)?;
        }
        let mut description = [0; NAME_SIZE];
        description.as_mut().from_las_str(&self.description)?;
        write.write_all(&description)?;
        Ok(())
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.len() > NAME_SIZE {
        Err(Error::NameTooLong(format!(
            "bytes too long ({}, maximum length {})",
            name.len(),
            NAME_SIZE
        )))
    } else {
        Ok(())
    }
}

/// The typed view of a `LASF_Spec`/4 vlr.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtraBytesVlr {
    /// The declared dimensions, in record order.
    pub dimensions: Vec<ExtraDimension>,
}

impl ExtraBytesVlr {
    /// The user id of the extra bytes vlr.
    pub const USER_ID: &'static str = "LASF_Spec";

    /// The record id of the extra bytes vlr.
    pub const RECORD_ID: u16 = 4;

    /// Parses the descriptors out of a vlr payload.
    ///
    /// A payload that is not a whole number of 192-byte descriptors is
    /// parsed up to the last whole descriptor, with a warning.
    pub fn try_from_vlr(vlr: &Vlr) -> Result<ExtraBytesVlr> {
        let count = vlr.data.len() / DESCRIPTOR_SIZE;
        if vlr.data.len() % DESCRIPTOR_SIZE != 0 {
            log::warn!(
                "extra bytes vlr payload is {} bytes, not a whole number of {} byte descriptors",
                vlr.data.len(),
                DESCRIPTOR_SIZE
            );
        }
        let mut cursor = Cursor::new(&vlr.data);
        let mut dimensions = Vec::with_capacity(count);
        for _ in 0..count {
            dimensions.push(ExtraDimension::read_from(&mut cursor)?);
        }
        Ok(ExtraBytesVlr { dimensions })
    }

    /// Serializes the descriptors into a vlr.
    pub fn to_vlr(&self) -> Result<Vlr> {
        let mut data = Vec::with_capacity(self.dimensions.len() * DESCRIPTOR_SIZE);
        for dimension in &self.dimensions {
            dimension.write_to(&mut data)?;
        }
        Ok(Vlr {
            user_id: ExtraBytesVlr::USER_ID.to_string(),
            record_id: ExtraBytesVlr::RECORD_ID,
            description: "extra bytes".to_string(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_strings() {
        assert_eq!(
            ExtraByteKind::Scalar(DataType::I32),
            "int32".parse().unwrap()
        );
        assert_eq!(
            ExtraByteKind::Array(DataType::I32, 3),
            "3int32".parse().unwrap()
        );
        assert_eq!(ExtraByteKind::Scalar(DataType::U64), "u8".parse().unwrap());
        assert_eq!(
            ExtraByteKind::Array(DataType::F64, 2),
            "2f8".parse().unwrap()
        );
        assert!("float16".parse::<ExtraByteKind>().is_err());
    }

    #[test]
    fn codes_roundtrip() {
        for code in 1..=30 {
            let kind = ExtraByteKind::from_code(code, 0).unwrap();
            assert_eq!(code, kind.to_code());
        }
        assert_eq!(
            ExtraByteKind::Undocumented(7),
            ExtraByteKind::from_code(0, 7).unwrap()
        );
    }

    #[test]
    fn name_too_long() {
        let params = ExtraBytesParams::new(&"x".repeat(70), "int32");
        match ExtraDimension::from_params(params) {
            Err(Error::NameTooLong(message)) => {
                assert_eq!("bytes too long (70, maximum length 32)", message)
            }
            other => panic!("expected NameTooLong, got {:?}", other),
        }
    }

    #[test]
    fn scale_arity() {
        let params = ExtraBytesParams::new("x", "3int32").with_scales(vec![1.]);
        assert!(matches!(
            ExtraDimension::from_params(params),
            Err(Error::InvalidScaleArity {
                expected: 3,
                got: 1
            })
        ));
    }

    #[test]
    fn descriptor_roundtrip() {
        let params = ExtraBytesParams::new("range", "3int32")
            .with_scales(vec![1., 2., 3.])
            .with_offsets(vec![10., 20., 30.])
            .with_description("three ranges");
        let dimension = ExtraDimension::from_params(params).unwrap();
        let vlr = ExtraBytesVlr {
            dimensions: vec![dimension.clone()],
        }
        .to_vlr()
        .unwrap();
        assert_eq!(DESCRIPTOR_SIZE, vlr.data.len());
        let parsed = ExtraBytesVlr::try_from_vlr(&vlr).unwrap();
        assert_eq!(vec![dimension], parsed.dimensions);
    }

    #[test]
    fn identity_transforms_when_unscaled() {
        let dimension =
            ExtraDimension::from_params(ExtraBytesParams::new("plain", "uint8")).unwrap();
        assert!(!dimension.is_scaled());
        assert_eq!(
            vec![Transform {
                scale: 1.,
                offset: 0.
            }],
            dimension.transforms()
        );
    }
}
