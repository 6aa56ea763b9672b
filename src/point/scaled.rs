//! Scaled views over integer columns.
//!
//! A scaled view reads `raw * scale + offset` as f64 and writes
//! `round((value - offset) / scale)` back into the integer column, failing
//! with [Error::ScaledValueOverflow](crate::Error::ScaledValueOverflow) when
//! the unscaled value does not fit. Vector extra bytes dimensions carry one
//! transform per component.

use crate::dimension::DataType;
use crate::point::record::{read_untyped, write_untyped};
use crate::{Result, Transform};

/// A read-only scaled view over an integer column.
///
/// Obtained from [PackedPointRecord::scaled](crate::PackedPointRecord::scaled)
/// or, for coordinates, [LasData::x](crate::LasData::x) and friends.
#[derive(Clone, Debug)]
pub struct ScaledColumn<'a> {
    data: &'a [u8],
    offset: usize,
    stride: usize,
    data_type: DataType,
    components: usize,
    len: usize,
    transforms: Vec<Transform>,
}

impl<'a> ScaledColumn<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        data: &'a [u8],
        offset: usize,
        stride: usize,
        data_type: DataType,
        components: usize,
        len: usize,
        transforms: Vec<Transform>,
    ) -> ScaledColumn<'a> {
        debug_assert_eq!(components, transforms.len());
        ScaledColumn {
            data,
            offset,
            stride,
            data_type,
            components,
            len,
            transforms,
        }
    }

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

    /// The scaled value at `index` (component zero).
    ///
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> f64 {
        self.component(index, 0)
    }

    /// The scaled value of one component at `index`.
    pub fn component(&self, index: usize, component: usize) -> f64 {
        assert!(index < self.len && component < self.components);
        let size = self.data_type.size();
        let start = index * self.stride + self.offset + component * size;
        self.transforms[component].direct(read_untyped(&self.data[start..start + size], self.data_type))
    }

    /// Iterates over the scaled values of component zero.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(move |index| self.get(index))
    }

    /// The smallest scaled value of component zero, or `None` if empty.
    pub fn min(&self) -> Option<f64> {
        self.iter().reduce(f64::min)
    }

    /// The largest scaled value of component zero, or `None` if empty.
    pub fn max(&self) -> Option<f64> {
        self.iter().reduce(f64::max)
    }
}

/// A mutable scaled view over an integer column.
#[derive(Debug)]
pub struct ScaledColumnMut<'a> {
    data: &'a mut [u8],
    offset: usize,
    stride: usize,
    data_type: DataType,
    components: usize,
    len: usize,
    transforms: Vec<Transform>,
}

impl<'a> ScaledColumnMut<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        data: &'a mut [u8],
        offset: usize,
        stride: usize,
        data_type: DataType,
        components: usize,
        len: usize,
        transforms: Vec<Transform>,
    ) -> ScaledColumnMut<'a> {
        debug_assert_eq!(components, transforms.len());
        ScaledColumnMut {
            data,
            offset,
            stride,
            data_type,
            components,
            len,
            transforms,
        }
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the column empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The scaled value at `index` (component zero).
    pub fn get(&self, index: usize) -> f64 {
        self.component(index, 0)
    }

    /// The scaled value of one component at `index`.
    pub fn component(&self, index: usize, component: usize) -> f64 {
        assert!(index < self.len && component < self.components);
        let size = self.data_type.size();
        let start = index * self.stride + self.offset + component * size;
        self.transforms[component].direct(read_untyped(&self.data[start..start + size], self.data_type))
    }

    /// Unscales and stores a value at `index` (component zero).
    ///
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        self.set_component(index, 0, value)
    }

    /// Unscales and stores one component at `index`.
    pub fn set_component(&mut self, index: usize, component: usize, value: f64) -> Result<()> {
        assert!(index < self.len && component < self.components);
        let size = self.data_type.size();
        let start = index * self.stride + self.offset + component * size;
        let raw = self.transforms[component].inverse(value);
        write_untyped(&mut self.data[start..start + size], self.data_type, raw)
    }

    /// Sets every record's component zero to `value`.
    pub fn fill(&mut self, value: f64) -> Result<()> {
        for index in 0..self.len {
            self.set(index, value)?;
        }
        Ok(())
    }

    /// Copies scaled values into component zero of every record.
    ///
    /// Panics if `values.len()` differs from the column length.
    pub fn copy_from_slice(&mut self, values: &[f64]) -> Result<()> {
        assert_eq!(values.len(), self.len);
        for (index, &value) in values.iter().enumerate() {
            self.set(index, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, ExtraBytesParams, PackedPointRecord, PointFormat};

    #[test]
    fn identity_scale_on_fixed_dimensions() {
        let mut points = PackedPointRecord::zeros(PointFormat::from_id(0).unwrap(), 2);
        points.scaled_mut("X").unwrap().fill(-3.0).unwrap();
        assert_eq!(vec![-3, -3], points.column::<i32>("X").unwrap().to_vec());
        assert_eq!(-3.0, points.scaled("X").unwrap().get(0));
    }

    #[test]
    fn declared_scale_and_offset() {
        let dim = crate::point::ExtraDimension::from_params(
            ExtraBytesParams::new("height", "int32")
                .with_scales(vec![0.01])
                .with_offsets(vec![100.0]),
        )
        .unwrap();
        let mut points = PackedPointRecord::zeros(PointFormat::new(0, vec![dim]).unwrap(), 1);
        assert_eq!(100.0, points.scaled("height").unwrap().get(0));
        points.scaled_mut("height").unwrap().set(0, 101.5).unwrap();
        assert_eq!(150, points.column::<i32>("height").unwrap().get(0));
        assert_eq!(101.5, points.scaled("height").unwrap().get(0));
    }

    #[test]
    fn overflow() {
        let dim = crate::point::ExtraDimension::from_params(
            ExtraBytesParams::new("tiny", "int8").with_scales(vec![1.0]),
        )
        .unwrap();
        let mut points = PackedPointRecord::zeros(PointFormat::new(0, vec![dim]).unwrap(), 1);
        assert!(matches!(
            points.scaled_mut("tiny").unwrap().set(0, 1000.0),
            Err(Error::ScaledValueOverflow(_))
        ));
    }

    #[test]
    fn min_max_are_scaled() {
        let mut points = PackedPointRecord::zeros(PointFormat::from_id(0).unwrap(), 3);
        points
            .column_mut::<i32>("Z")
            .unwrap()
            .copy_from_slice(&[5, -10, 3]);
        let z = points.scaled("Z").unwrap();
        assert_eq!(Some(-10.0), z.min());
        assert_eq!(Some(5.0), z.max());
    }

    #[test]
    fn floats_have_no_scaled_view() {
        let points = PackedPointRecord::zeros(PointFormat::from_id(1).unwrap(), 1);
        assert!(points.scaled("gps_time").is_err());
    }
}
