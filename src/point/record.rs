//! Packed point records.
//!
//! A [PackedPointRecord] owns one contiguous buffer of `len * stride` bytes.
//! Whole-byte dimensions are exposed as strided column views that alias the
//! buffer. Bit-packed sub-fields stay packed in their composed byte and are
//! unpacked into a fresh array on access; the array must be assigned back
//! with [pack](PackedPointRecord::pack) for mutations to take effect.

use crate::dimension::DataType;
use crate::point::format::{DimensionLayout, PointFormat, ResolvedPlacement};
use crate::point::scaled::{ScaledColumn, ScaledColumnMut};
use crate::point::{packing, ExtraDimension};
use crate::{Error, Result, Transform};
use std::io::{Read, Write};
use std::marker::PhantomData;

/// A primitive type that can back a point record dimension.
///
/// This trait is sealed; it is implemented exactly for the ten storage types
/// of the las specification.
pub trait Primitive: private::Sealed + Copy + Default + PartialEq + 'static {
    /// The registry data type matching this primitive.
    const DATA_TYPE: DataType;

    /// Reads one value from little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Writes one value as little-endian bytes.
    fn write_le(self, bytes: &mut [u8]);
}

mod private {
    pub trait Sealed {}
}

macro_rules! primitive {
    ($($ty:ty => $data_type:expr),+ $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl Primitive for $ty {
                const DATA_TYPE: DataType = $data_type;

                fn read_le(bytes: &[u8]) -> Self {
                    Self::from_le_bytes(bytes.try_into().unwrap())
                }

                fn write_le(self, bytes: &mut [u8]) {
                    bytes.copy_from_slice(&self.to_le_bytes());
                }
            }
        )+
    }
}

primitive!(
    u8 => DataType::U8,
    i8 => DataType::I8,
    u16 => DataType::U16,
    i16 => DataType::I16,
    u32 => DataType::U32,
    i32 => DataType::I32,
    u64 => DataType::U64,
    i64 => DataType::I64,
    f32 => DataType::F32,
    f64 => DataType::F64,
);

pub(crate) fn read_untyped(bytes: &[u8], data_type: DataType) -> f64 {
    match data_type {
        DataType::U8 => f64::from(u8::read_le(&bytes[..1])),
        DataType::I8 => f64::from(i8::read_le(&bytes[..1])),
        DataType::U16 => f64::from(u16::read_le(&bytes[..2])),
        DataType::I16 => f64::from(i16::read_le(&bytes[..2])),
        DataType::U32 => f64::from(u32::read_le(&bytes[..4])),
        DataType::I32 => f64::from(i32::read_le(&bytes[..4])),
        DataType::U64 => u64::read_le(&bytes[..8]) as f64,
        DataType::I64 => i64::read_le(&bytes[..8]) as f64,
        DataType::F32 => f64::from(f32::read_le(&bytes[..4])),
        DataType::F64 => f64::read_le(&bytes[..8]),
    }
}

pub(crate) fn write_untyped(bytes: &mut [u8], data_type: DataType, value: f64) -> Result<()> {
    macro_rules! checked {
        ($ty:ty, $size:expr) => {{
            let cast: $ty =
                num_traits::cast(value).ok_or(Error::ScaledValueOverflow(value))?;
            cast.write_le(&mut bytes[..$size]);
        }};
    }
    match data_type {
        DataType::U8 => checked!(u8, 1),
        DataType::I8 => checked!(i8, 1),
        DataType::U16 => checked!(u16, 2),
        DataType::I16 => checked!(i16, 2),
        DataType::U32 => checked!(u32, 4),
        DataType::I32 => checked!(i32, 4),
        DataType::U64 => checked!(u64, 8),
        DataType::I64 => checked!(i64, 8),
        DataType::F32 => (value as f32).write_le(&mut bytes[..4]),
        DataType::F64 => value.write_le(&mut bytes[..8]),
    }
    Ok(())
}

/// A read-only strided view over one whole-byte dimension.
///
/// Obtained from [PackedPointRecord::column]. Vector extra bytes dimensions
/// are addressed per component via [component](Column::component).
#[derive(Clone, Copy, Debug)]
pub struct Column<'a, T: Primitive> {
    data: &'a [u8],
    offset: usize,
    stride: usize,
    components: usize,
    len: usize,
    _primitive: PhantomData<fn() -> T>,
}

impl<'a, T: Primitive> Column<'a, T> {
    /// The number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the column empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of components per record.
    pub fn components(&self) -> usize {
        self.components
    }

    /// The value at `index` (component zero).
    ///
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> T {
        self.component(index, 0)
    }

    /// The value of one component at `index`.
    ///
    /// Panics if `index` or `component` is out of range.
    pub fn component(&self, index: usize, component: usize) -> T {
        assert!(index < self.len && component < self.components);
        let size = T::DATA_TYPE.size();
        let start = index * self.stride + self.offset + component * size;
        T::read_le(&self.data[start..start + size])
    }

    /// Iterates over component zero of every record.
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let this = *self;
        (0..this.len).map(move |index| this.get(index))
    }

    /// Collects component zero of every record.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

/// A mutable strided view over one whole-byte dimension.
///
/// Writes through a `ColumnMut` land in the record buffer immediately.
#[derive(Debug)]
pub struct ColumnMut<'a, T: Primitive> {
    data: &'a mut [u8],
    offset: usize,
    stride: usize,
    components: usize,
    len: usize,
    _primitive: PhantomData<fn() -> T>,
}

impl<T: Primitive> ColumnMut<'_, T> {
    /// The number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the column empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of components per record.
    pub fn components(&self) -> usize {
        self.components
    }

    /// The value at `index` (component zero).
    pub fn get(&self, index: usize) -> T {
        self.component(index, 0)
    }

    /// The value of one component at `index`.
    pub fn component(&self, index: usize, component: usize) -> T {
        assert!(index < self.len && component < self.components);
        let size = T::DATA_TYPE.size();
        let start = index * self.stride + self.offset + component * size;
        T::read_le(&self.data[start..start + size])
    }

    /// Sets the value at `index` (component zero).
    ///
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, value: T) {
        self.set_component(index, 0, value);
    }

    /// Sets one component at `index`.
    pub fn set_component(&mut self, index: usize, component: usize, value: T) {
        assert!(index < self.len && component < self.components);
        let size = T::DATA_TYPE.size();
        let start = index * self.stride + self.offset + component * size;
        value.write_le(&mut self.data[start..start + size]);
    }

    /// Sets every record's component zero to `value`.
    pub fn fill(&mut self, value: T) {
        for index in 0..self.len {
            self.set(index, value);
        }
    }

    /// Copies the values into component zero of every record.
    ///
    /// Panics if `values.len()` differs from the column length.
    pub fn copy_from_slice(&mut self, values: &[T]) {
        assert_eq!(values.len(), self.len);
        for (index, &value) in values.iter().enumerate() {
            self.set(index, value);
        }
    }
}

/// A contiguous buffer of packed point records.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedPointRecord {
    format: PointFormat,
    data: Vec<u8>,
}

impl PackedPointRecord {
    /// Creates an empty record.
    pub fn empty(format: PointFormat) -> PackedPointRecord {
        PackedPointRecord {
            format,
            data: Vec::new(),
        }
    }

    /// Creates a record of `len` zeroed points.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{PackedPointRecord, PointFormat};
    /// let points = PackedPointRecord::zeros(PointFormat::from_id(0).unwrap(), 10);
    /// assert_eq!(10, points.len());
    /// ```
    pub fn zeros(format: PointFormat, len: usize) -> PackedPointRecord {
        let data = vec![0; len * usize::from(format.size())];
        PackedPointRecord { format, data }
    }

    /// Wraps an existing buffer.
    ///
    /// The buffer must be a whole number of records.
    pub fn from_bytes(format: PointFormat, data: Vec<u8>) -> Result<PackedPointRecord> {
        let stride = usize::from(format.size());
        if data.len() % stride != 0 {
            let records = data.len() / stride + 1;
            return Err(Error::TruncatedPointData {
                expected: (records * stride) as u64,
                got: data.len() as u64,
            });
        }
        Ok(PackedPointRecord { format, data })
    }

    /// Reads exactly `count` records from the stream.
    ///
    /// A short read fails with [Error::TruncatedPointData]. Use
    /// [from_stream_permissive](PackedPointRecord::from_stream_permissive)
    /// to recover what is there instead.
    pub fn from_stream<R: Read>(
        format: PointFormat,
        mut read: R,
        count: u64,
    ) -> Result<PackedPointRecord> {
        let expected = count * u64::from(format.size());
        let mut data = vec![0; expected as usize];
        let got = read_fully(&mut read, &mut data)?;
        if (got as u64) < expected {
            return Err(Error::TruncatedPointData {
                expected,
                got: got as u64,
            });
        }
        Ok(PackedPointRecord { format, data })
    }

    /// Reads up to `count` records from the stream, clamping to the whole
    /// records actually present.
    ///
    /// A short read is logged as a warning instead of failing.
    pub fn from_stream_permissive<R: Read>(
        format: PointFormat,
        mut read: R,
        count: u64,
    ) -> Result<PackedPointRecord> {
        let stride = usize::from(format.size());
        let expected = count as usize * stride;
        let mut data = vec![0; expected];
        let got = read_fully(&mut read, &mut data)?;
        if got < expected {
            let records = got / stride;
            log::warn!(
                "point data is truncated: expected {} records, read {}",
                count,
                records
            );
            data.truncate(records * stride);
        }
        Ok(PackedPointRecord { format, data })
    }

    /// The point format of this record.
    pub fn point_format(&self) -> &PointFormat {
        &self.format
    }

    /// The number of points.
    pub fn len(&self) -> usize {
        self.data.len() / usize::from(self.format.size())
    }

    /// Is the record empty?
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The record buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the record, returning the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Writes the record buffer to the stream.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&self.data)?;
        Ok(())
    }

    /// Resizes the record to `len` points.
    ///
    /// Growing zero-fills the new records, shrinking truncates. Any column
    /// view taken before the resize is invalidated by the borrow checker.
    pub fn resize(&mut self, len: usize) {
        self.data.resize(len * usize::from(self.format.size()), 0);
    }

    fn layout(&self, name: &str) -> Result<&DimensionLayout> {
        self.format
            .dimension(name)
            .ok_or_else(|| Error::InvalidDimension(name.to_string()))
    }

    /// Returns a typed read-only view of a whole-byte dimension.
    ///
    /// Fails if the name is unknown ([Error::InvalidDimension]), the
    /// dimension is bit-packed ([Error::BitPackedDimension]), or `T` does
    /// not match the storage type ([Error::MismatchedDimensionType]).
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{PackedPointRecord, PointFormat};
    /// let points = PackedPointRecord::zeros(PointFormat::from_id(0).unwrap(), 5);
    /// let x = points.column::<i32>("X").unwrap();
    /// assert_eq!(0, x.get(4));
    /// assert!(points.column::<i32>("red").is_err());
    /// ```
    pub fn column<T: Primitive>(&self, name: &str) -> Result<Column<'_, T>> {
        let layout = self.layout(name)?;
        let offset = whole_offset(name, layout)?;
        if T::DATA_TYPE != layout.data_type() {
            return Err(Error::MismatchedDimensionType {
                name: name.to_string(),
                data_type: layout.data_type(),
            });
        }
        Ok(Column {
            data: &self.data,
            offset,
            stride: usize::from(self.format.size()),
            components: layout.count(),
            len: self.len(),
            _primitive: PhantomData,
        })
    }

    /// Returns a typed mutable view of a whole-byte dimension.
    ///
    /// Writes through the view are immediate.
    pub fn column_mut<T: Primitive>(&mut self, name: &str) -> Result<ColumnMut<'_, T>> {
        let layout = self.layout(name)?;
        let offset = whole_offset(name, layout)?;
        if T::DATA_TYPE != layout.data_type() {
            return Err(Error::MismatchedDimensionType {
                name: name.to_string(),
                data_type: layout.data_type(),
            });
        }
        let components = layout.count();
        let stride = usize::from(self.format.size());
        let len = self.len();
        Ok(ColumnMut {
            data: &mut self.data,
            offset,
            stride,
            components,
            len,
            _primitive: PhantomData,
        })
    }

    /// Unpacks a bit-packed dimension into a fresh array.
    ///
    /// Mutating the array does not touch the record; assign it back with
    /// [pack](PackedPointRecord::pack). Whole-byte `u8` dimensions unpack
    /// too, so classification can be copied across the format 5/6 boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{PackedPointRecord, PointFormat};
    /// let points = PackedPointRecord::zeros(PointFormat::from_id(0).unwrap(), 3);
    /// assert_eq!(vec![0, 0, 0], points.unpack("return_number").unwrap());
    /// ```
    pub fn unpack(&self, name: &str) -> Result<Vec<u8>> {
        let layout = self.layout(name)?;
        let stride = usize::from(self.format.size());
        match layout.placement {
            ResolvedPlacement::Sub {
                parent_offset,
                low,
                high,
            } => Ok((0..self.len())
                .map(|i| packing::unpack(self.data[i * stride + parent_offset], low, high))
                .collect()),
            ResolvedPlacement::Whole { offset }
                if layout.data_type() == DataType::U8 && layout.count() == 1 =>
            {
                Ok((0..self.len()).map(|i| self.data[i * stride + offset]).collect())
            }
            ResolvedPlacement::Whole { .. } => Err(Error::MismatchedDimensionType {
                name: name.to_string(),
                data_type: layout.data_type(),
            }),
        }
    }

    /// Packs values into a bit-packed dimension.
    ///
    /// This is the only write path for sub-byte dimensions; the composed
    /// byte's other sub-fields are preserved. Fails with [Error::Overflow]
    /// if any value exceeds the dimension's bit width.
    ///
    /// Panics if `values.len()` differs from the record length.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{PackedPointRecord, PointFormat};
    /// let mut points = PackedPointRecord::zeros(PointFormat::from_id(0).unwrap(), 2);
    /// points.pack("return_number", &[1, 2]).unwrap();
    /// assert_eq!(vec![1, 2], points.unpack("return_number").unwrap());
    /// assert!(points.pack("return_number", &[8, 0]).is_err());
    /// ```
    pub fn pack(&mut self, name: &str, values: &[u8]) -> Result<()> {
        assert_eq!(
            values.len(),
            self.len(),
            "pack expects one value per record"
        );
        let layout = self.layout(name)?;
        let stride = usize::from(self.format.size());
        match layout.placement {
            ResolvedPlacement::Sub {
                parent_offset,
                low,
                high,
            } => {
                for (i, &value) in values.iter().enumerate() {
                    packing::pack_into(&mut self.data[i * stride + parent_offset], value, low, high)
                        .ok_or_else(|| Error::Overflow {
                            name: name.to_string(),
                            value,
                            bits: high - low,
                        })?;
                }
                Ok(())
            }
            ResolvedPlacement::Whole { offset }
                if layout.data_type() == DataType::U8 && layout.count() == 1 =>
            {
                for (i, &value) in values.iter().enumerate() {
                    self.data[i * stride + offset] = value;
                }
                Ok(())
            }
            ResolvedPlacement::Whole { .. } => Err(Error::MismatchedDimensionType {
                name: name.to_string(),
                data_type: layout.data_type(),
            }),
        }
    }

    /// Returns a scaled view over an integer dimension.
    ///
    /// For extra bytes dimensions the declared per-component scale and
    /// offset apply; dimensions without a declaration get the identity
    /// transform.
    pub fn scaled(&self, name: &str) -> Result<ScaledColumn<'_>> {
        let transforms = self.declared_transforms(name)?;
        self.scaled_with(name, transforms)
    }

    /// Returns a mutable scaled view over an integer dimension.
    pub fn scaled_mut(&mut self, name: &str) -> Result<ScaledColumnMut<'_>> {
        let transforms = self.declared_transforms(name)?;
        self.scaled_mut_with(name, transforms)
    }

    fn declared_transforms(&self, name: &str) -> Result<Vec<Transform>> {
        Ok(match self.format.extra_dimension(name) {
            Some(extra) => extra.transforms(),
            None => vec![Transform::default(); self.layout(name)?.count()],
        })
    }

    pub(crate) fn scaled_with(
        &self,
        name: &str,
        transforms: Vec<Transform>,
    ) -> Result<ScaledColumn<'_>> {
        let layout = self.layout(name)?;
        let offset = whole_offset(name, layout)?;
        if !layout.data_type().is_integer() {
            return Err(Error::MismatchedDimensionType {
                name: name.to_string(),
                data_type: layout.data_type(),
            });
        }
        Ok(ScaledColumn::new(
            &self.data,
            offset,
            usize::from(self.format.size()),
            layout.data_type(),
            layout.count(),
            self.len(),
            transforms,
        ))
    }

    pub(crate) fn scaled_mut_with(
        &mut self,
        name: &str,
        transforms: Vec<Transform>,
    ) -> Result<ScaledColumnMut<'_>> {
        let layout = self.layout(name)?;
        let offset = whole_offset(name, layout)?;
        if !layout.data_type().is_integer() {
            return Err(Error::MismatchedDimensionType {
                name: name.to_string(),
                data_type: layout.data_type(),
            });
        }
        let data_type = layout.data_type();
        let components = layout.count();
        let stride = usize::from(self.format.size());
        let len = self.len();
        Ok(ScaledColumnMut::new(
            &mut self.data,
            offset,
            stride,
            data_type,
            components,
            len,
            transforms,
        ))
    }

    /// Appends an extra bytes dimension, reallocating the buffer.
    ///
    /// Existing values are preserved, the new dimension is zero-filled.
    pub fn add_extra_dim(&mut self, dim: ExtraDimension) -> Result<()> {
        let old_stride = usize::from(self.format.size());
        let declared_end = usize::from(self.format.base_size())
            + self
                .format
                .extra_dims()
                .iter()
                .map(ExtraDimension::size)
                .sum::<usize>();
        let dim_size = dim.size();
        let mut extras = self.format.extra_dims().to_vec();
        extras.push(dim);
        let new_stride = old_stride + dim_size;
        let format =
            PointFormat::with_point_size(self.format.id(), extras, new_stride as u16)?;
        let len = self.len();
        let mut data = vec![0; len * new_stride];
        for i in 0..len {
            let old = &self.data[i * old_stride..(i + 1) * old_stride];
            let new = &mut data[i * new_stride..(i + 1) * new_stride];
            new[..declared_end].copy_from_slice(&old[..declared_end]);
            new[declared_end + dim_size..].copy_from_slice(&old[declared_end..]);
        }
        self.format = format;
        self.data = data;
        Ok(())
    }

    /// Copies every dimension that exists, under the same name, in both
    /// records.
    ///
    /// Bit-packed dimensions copy through unpack/pack, so a value that does
    /// not fit the target's bit width fails with [Error::Overflow]. Whole
    /// dimensions of differing storage types copy numerically.
    pub fn copy_matching_dimensions_from(&mut self, other: &PackedPointRecord) -> Result<()> {
        debug_assert_eq!(self.len(), other.len());
        let names = self
            .format
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect::<Vec<_>>();
        for name in names {
            let Some(theirs) = other.point_format().dimension(&name) else {
                continue;
            };
            let ours = self.layout(&name)?;
            if ours.is_bit_packed() || theirs.is_bit_packed() {
                let values = other.unpack(&name)?;
                self.pack(&name, &values)?;
                continue;
            }
            let (ours, theirs) = (ours.clone(), theirs.clone());
            let (our_offset, their_offset) =
                (whole_offset(&name, &ours)?, whole_offset(&name, &theirs)?);
            let components = ours.count().min(theirs.count());
            let our_stride = usize::from(self.format.size());
            let their_stride = usize::from(other.format.size());
            if ours.data_type() == theirs.data_type() {
                let size = ours.data_type().size() * components;
                for i in 0..self.len() {
                    let src = i * their_stride + their_offset;
                    let dst = i * our_stride + our_offset;
                    self.data[dst..dst + size].copy_from_slice(&other.data[src..src + size]);
                }
            } else {
                let (our_size, their_size) = (ours.data_type().size(), theirs.data_type().size());
                for i in 0..self.len() {
                    for c in 0..components {
                        let src = i * their_stride + their_offset + c * their_size;
                        let value =
                            read_untyped(&other.data[src..src + their_size], theirs.data_type());
                        let dst = i * our_stride + our_offset + c * our_size;
                        write_untyped(
                            &mut self.data[dst..dst + our_size],
                            ours.data_type(),
                            value,
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn whole_offset(name: &str, layout: &DimensionLayout) -> Result<usize> {
    match layout.placement {
        ResolvedPlacement::Whole { offset } => Ok(offset),
        ResolvedPlacement::Sub { .. } => Err(Error::BitPackedDimension(name.to_string())),
    }
}

fn read_fully<R: Read>(read: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = read.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtraBytesParams;
    use std::io::Cursor;

    fn format(id: u8) -> PointFormat {
        PointFormat::from_id(id).unwrap()
    }

    #[test]
    fn zeros() {
        let points = PackedPointRecord::zeros(format(0), 3);
        assert_eq!(3, points.len());
        assert_eq!(60, points.as_bytes().len());
    }

    #[test]
    fn column_writes_are_immediate() {
        let mut points = PackedPointRecord::zeros(format(0), 2);
        let mut intensity = points.column_mut::<u16>("intensity").unwrap();
        intensity.set(1, 513);
        assert_eq!(vec![0, 513], points.column::<u16>("intensity").unwrap().to_vec());
        assert_eq!(&[1u8, 2u8], &points.as_bytes()[32..34]);
    }

    #[test]
    fn column_type_is_checked() {
        let points = PackedPointRecord::zeros(format(0), 1);
        assert!(matches!(
            points.column::<u32>("intensity"),
            Err(Error::MismatchedDimensionType { .. })
        ));
        assert!(matches!(
            points.column::<u8>("return_number"),
            Err(Error::BitPackedDimension(_))
        ));
        assert!(matches!(
            points.column::<u16>("red"),
            Err(Error::InvalidDimension(_))
        ));
    }

    #[test]
    fn pack_preserves_sibling_sub_fields() {
        let mut points = PackedPointRecord::zeros(format(0), 4);
        points.pack("return_number", &[1, 2, 3, 4]).unwrap();
        points.pack("number_of_returns", &[4, 4, 4, 4]).unwrap();
        points.pack("edge_of_flight_line", &[1, 0, 0, 1]).unwrap();
        assert_eq!(vec![1, 2, 3, 4], points.unpack("return_number").unwrap());
        assert_eq!(vec![4, 4, 4, 4], points.unpack("number_of_returns").unwrap());
        assert_eq!(vec![1, 0, 0, 1], points.unpack("edge_of_flight_line").unwrap());
    }

    #[test]
    fn pack_overflow() {
        let mut points = PackedPointRecord::zeros(format(6), 1);
        // 4 bit return number in the extended formats
        points.pack("return_number", &[15]).unwrap();
        assert!(matches!(
            points.pack("return_number", &[16]),
            Err(Error::Overflow { bits: 4, value: 16, .. })
        ));
    }

    #[test]
    fn unpacked_arrays_are_detached() {
        let mut points = PackedPointRecord::zeros(format(0), 1);
        let mut classification = points.unpack("classification").unwrap();
        classification[0] = 2;
        assert_eq!(vec![0], points.unpack("classification").unwrap());
        points.pack("classification", &classification).unwrap();
        assert_eq!(vec![2], points.unpack("classification").unwrap());
    }

    #[test]
    fn from_stream_short_read() {
        let bytes = vec![0; 30];
        match PackedPointRecord::from_stream(format(0), Cursor::new(&bytes), 2) {
            Err(Error::TruncatedPointData { expected: 40, got: 30 }) => {}
            other => panic!("expected TruncatedPointData, got {:?}", other),
        }
        let points =
            PackedPointRecord::from_stream_permissive(format(0), Cursor::new(&bytes), 2).unwrap();
        assert_eq!(1, points.len());
    }

    #[test]
    fn resize() {
        let mut points = PackedPointRecord::zeros(format(0), 1);
        points.column_mut::<u16>("intensity").unwrap().set(0, 7);
        points.resize(3);
        assert_eq!(3, points.len());
        assert_eq!(7, points.column::<u16>("intensity").unwrap().get(0));
        points.resize(1);
        assert_eq!(1, points.len());
    }

    #[test]
    fn add_extra_dim_preserves_values() {
        let mut points = PackedPointRecord::zeros(format(0), 2);
        points.column_mut::<i32>("X").unwrap().fill(-5);
        let dim =
            ExtraDimension::from_params(ExtraBytesParams::new("range", "uint32")).unwrap();
        points.add_extra_dim(dim).unwrap();
        assert_eq!(24, usize::from(points.point_format().size()));
        assert_eq!(vec![-5, -5], points.column::<i32>("X").unwrap().to_vec());
        assert_eq!(vec![0, 0], points.column::<u32>("range").unwrap().to_vec());
    }

    #[test]
    fn copy_matching_dimensions() {
        let mut source = PackedPointRecord::zeros(format(0), 2);
        source.column_mut::<i32>("X").unwrap().copy_from_slice(&[1, 2]);
        source.pack("classification", &[3, 4]).unwrap();
        source
            .column_mut::<u16>("intensity")
            .unwrap()
            .copy_from_slice(&[10, 20]);

        let mut target = PackedPointRecord::zeros(format(6), 2);
        target.copy_matching_dimensions_from(&source).unwrap();
        assert_eq!(vec![1, 2], target.column::<i32>("X").unwrap().to_vec());
        assert_eq!(vec![3, 4], target.unpack("classification").unwrap());
        assert_eq!(
            vec![10, 20],
            target.column::<u16>("intensity").unwrap().to_vec()
        );
    }
}
