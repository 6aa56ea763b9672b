//! Point record schemas.

use crate::dimension::{self, DataType, Placement};
use crate::point::ExtraDimension;
use crate::{Error, Result, Version};
use std::collections::HashMap;

/// A point record schema: the fixed dimensions of a point format id plus any
/// extra bytes dimensions, resolved to byte offsets.
///
/// # Examples
///
/// ```
/// use laspack::PointFormat;
/// let format = PointFormat::from_id(1).unwrap();
/// assert_eq!(28, format.size());
/// assert!(format.dimension("gps_time").is_some());
/// assert!(format.dimension("red").is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PointFormat {
    id: u8,
    dimensions: Vec<DimensionLayout>,
    extra_dims: Vec<ExtraDimension>,
    base_size: u16,
    stride: u16,
}

/// A dimension resolved against a concrete record layout.
#[derive(Clone, Debug, PartialEq)]
pub struct DimensionLayout {
    name: String,
    data_type: DataType,
    count: usize,
    pub(crate) placement: ResolvedPlacement,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ResolvedPlacement {
    Whole { offset: usize },
    Sub { parent_offset: usize, low: u8, high: u8 },
}

impl DimensionLayout {
    /// The dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The storage type of one component.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// The number of components (one except for vector extra bytes).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Is this dimension a bit range inside a composed byte?
    pub fn is_bit_packed(&self) -> bool {
        matches!(self.placement, ResolvedPlacement::Sub { .. })
    }
}

impl PointFormat {
    /// Builds the schema for a point format id with no extra bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::PointFormat;
    /// assert_eq!(20, PointFormat::from_id(0).unwrap().size());
    /// assert!(PointFormat::from_id(11).is_err());
    /// ```
    pub fn from_id(id: u8) -> Result<PointFormat> {
        PointFormat::new(id, Vec::new())
    }

    /// Builds the schema for a point format id with the given extra bytes
    /// dimensions appended, in order.
    pub fn new(id: u8, extra_dims: Vec<ExtraDimension>) -> Result<PointFormat> {
        let fixed = dimension::fixed_dimensions(id)?;
        let mut offsets = HashMap::new();
        let mut offset = 0;
        for dimension in &fixed {
            if let Placement::Whole { offset: o } = dimension.placement {
                offsets.insert(dimension.name, o);
                offset = o + dimension.data_type.size();
            }
        }
        let base_size = offset as u16;
        let mut dimensions = fixed
            .iter()
            .map(|dimension| DimensionLayout {
                name: dimension.name.to_string(),
                data_type: dimension.data_type,
                count: 1,
                placement: match dimension.placement {
                    Placement::Whole { offset } => ResolvedPlacement::Whole { offset },
                    Placement::Sub { parent, low, high } => ResolvedPlacement::Sub {
                        parent_offset: offsets[parent],
                        low,
                        high,
                    },
                },
            })
            .collect::<Vec<_>>();
        for extra in &extra_dims {
            dimensions.push(DimensionLayout {
                name: extra.name().to_string(),
                data_type: extra.kind().data_type(),
                count: extra.kind().count(),
                placement: ResolvedPlacement::Whole { offset },
            });
            offset += extra.size();
        }
        Ok(PointFormat {
            id,
            dimensions,
            extra_dims,
            base_size,
            stride: offset as u16,
        })
    }

    /// Builds the schema against an explicit record size from a header.
    ///
    /// A record size larger than the computed one is allowed; the surplus
    /// trailing bytes have no dimension and pass through opaquely. A smaller
    /// one fails with [Error::InvalidPointSize].
    pub fn with_point_size(
        id: u8,
        extra_dims: Vec<ExtraDimension>,
        point_size: u16,
    ) -> Result<PointFormat> {
        let mut format = PointFormat::new(id, extra_dims)?;
        if point_size < format.stride {
            return Err(Error::InvalidPointSize {
                point_format_id: id,
                point_size,
            });
        }
        format.stride = point_size;
        Ok(format)
    }

    /// The point format id.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The full record size in bytes, extra bytes included.
    pub fn size(&self) -> u16 {
        self.stride
    }

    /// The record size of the fixed dimensions alone.
    pub fn base_size(&self) -> u16 {
        self.base_size
    }

    /// The number of bytes past the fixed dimensions, as handed to the laz
    /// back-end.
    pub fn num_extra_bytes(&self) -> u16 {
        self.stride - self.base_size
    }

    /// Looks up a dimension by name.
    pub fn dimension(&self, name: &str) -> Option<&DimensionLayout> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// All dimensions, in record order. Bit-packed sub-fields follow their
    /// composed parent.
    pub fn dimensions(&self) -> &[DimensionLayout] {
        &self.dimensions
    }

    /// The extra bytes dimensions.
    pub fn extra_dims(&self) -> &[ExtraDimension] {
        &self.extra_dims
    }

    /// Looks up an extra bytes dimension by name.
    pub fn extra_dimension(&self, name: &str) -> Option<&ExtraDimension> {
        self.extra_dims.iter().find(|d| d.name() == name)
    }

    /// The earliest las version that supports this point format.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{PointFormat, Version};
    /// assert_eq!(Version::new(1, 4), PointFormat::from_id(6).unwrap().minimum_version());
    /// ```
    pub fn minimum_version(&self) -> Version {
        match self.id {
            0 | 1 => Version::new(1, 0),
            2 | 3 => Version::new(1, 2),
            4 | 5 => Version::new(1, 3),
            _ => Version::new(1, 4),
        }
    }

    /// Checks that the version supports this point format.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{PointFormat, Version};
    /// let format = PointFormat::from_id(6).unwrap();
    /// assert!(format.verify_compatible_with(Version::new(1, 4)).is_ok());
    /// assert!(format.verify_compatible_with(Version::new(1, 2)).is_err());
    /// ```
    pub fn verify_compatible_with(&self, version: Version) -> Result<()> {
        if version.supports_point_format(self.id) {
            Ok(())
        } else {
            Err(Error::IncompatibleVersion {
                version,
                point_format_id: self.id,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtraBytesParams;

    fn extra(name: &str, data_type: &str) -> ExtraDimension {
        ExtraDimension::from_params(ExtraBytesParams::new(name, data_type)).unwrap()
    }

    #[test]
    fn extra_dims_extend_the_stride() {
        let format = PointFormat::new(0, vec![extra("a", "uint16"), extra("b", "3int32")]).unwrap();
        assert_eq!(20, format.base_size());
        assert_eq!(34, format.size());
        assert_eq!(14, format.num_extra_bytes());
        let b = format.dimension("b").unwrap();
        assert_eq!(DataType::I32, b.data_type());
        assert_eq!(3, b.count());
        assert_eq!(
            ResolvedPlacement::Whole { offset: 22 },
            b.placement
        );
    }

    #[test]
    fn sub_fields_resolve_to_their_parent() {
        let format = PointFormat::from_id(0).unwrap();
        let classification = format.dimension("classification").unwrap();
        assert!(classification.is_bit_packed());
        assert_eq!(
            ResolvedPlacement::Sub {
                parent_offset: 15,
                low: 0,
                high: 5
            },
            classification.placement
        );
    }

    #[test]
    fn oversized_point_size_is_opaque_padding() {
        let format = PointFormat::with_point_size(0, Vec::new(), 23).unwrap();
        assert_eq!(23, format.size());
        assert_eq!(3, format.num_extra_bytes());
    }

    #[test]
    fn undersized_point_size_is_rejected() {
        assert!(matches!(
            PointFormat::with_point_size(1, Vec::new(), 20),
            Err(Error::InvalidPointSize { .. })
        ));
    }
}
