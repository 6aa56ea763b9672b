//! The in-memory las aggregate.

use crate::point::{ExtraBytesVlr, ExtraDimension, ScaledColumn, ScaledColumnMut};
use crate::{
    compression, ExtraBytesParams, Header, PackedPointRecord, PointFormat, Result, Truncate,
    Version, VlrList, Writer,
};
use std::fs::OpenOptions;
use std::io::{Read, Seek, Write};
use std::path::Path;

/// One las file in memory: a header, the vlrs and evlrs, and the packed
/// point record.
///
/// All parts are mutated in place; [write_to](LasData::write_to) recomputes
/// the derived header fields (point format id, record size, counts, bounds,
/// offsets) from the points and vlrs, so the three stay coherent on disk.
///
/// ```
/// use laspack::{LasData, PointFormat};
///
/// let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
/// las.points.resize(100);
/// las.points.column_mut::<u16>("intensity").unwrap().fill(7);
/// las.x_mut().fill(1.0).unwrap();
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LasData {
    /// The file header.
    pub header: Header,

    /// The variable length records.
    pub vlrs: VlrList,

    /// The extended variable length records (las 1.4).
    pub evlrs: VlrList,

    /// The point records.
    pub points: PackedPointRecord,
}

impl LasData {
    /// Creates empty las data with a default version fitting the point
    /// format: 1.2 for the classic formats, 1.3 for the waveform formats 4
    /// and 5, and 1.4 for formats 6 and up.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{LasData, PointFormat, Version};
    /// let las = LasData::new(PointFormat::from_id(6).unwrap()).unwrap();
    /// assert_eq!(Version::new(1, 4), las.header.version);
    /// ```
    pub fn new(point_format: PointFormat) -> Result<LasData> {
        let version = default_version(point_format.id());
        LasData::with_version(point_format, version)
    }

    /// Creates empty las data with an explicit version.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{Error, LasData, PointFormat, Version};
    /// let result = LasData::with_version(PointFormat::from_id(6).unwrap(), Version::new(1, 2));
    /// assert!(matches!(result, Err(Error::IncompatibleVersion { .. })));
    /// ```
    pub fn with_version(point_format: PointFormat, version: Version) -> Result<LasData> {
        point_format.verify_compatible_with(version)?;
        let mut header = Header::new(version);
        header.point_format_id = point_format.id();
        header.point_size = point_format.size();
        Ok(LasData {
            header,
            vlrs: VlrList::new(),
            evlrs: VlrList::new(),
            points: PackedPointRecord::empty(point_format),
        })
    }

    /// Reads las or laz data from a path.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<LasData> {
        crate::read(path)
    }

    /// Reads las or laz data from a seekable source.
    pub fn read_from<R: Read + Seek + Send + Sync>(source: R) -> Result<LasData> {
        crate::read_from(source)
    }

    /// Writes this data to a path, compressed or not.
    ///
    /// The file is opened read-write; the external-process laz back-end
    /// reads back what the child wrote when patching the final header.
    pub fn write<P: AsRef<Path>>(&self, path: P, compress: bool) -> Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let _ = self.write_to(file, compress)?;
        Ok(())
    }

    /// Writes this data to a seekable destination, returning the
    /// destination.
    ///
    /// Header fields that are derived from the points and vlrs are
    /// recomputed; a stale laszip vlr from a previous read is dropped (the
    /// back-end contributes a fresh one when compressing) and the extra
    /// bytes vlr is regenerated from the point format.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{LasData, PointFormat};
    /// use std::io::Cursor;
    ///
    /// let las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    /// let cursor = las.write_to(Cursor::new(Vec::new()), false).unwrap();
    /// assert!(!cursor.into_inner().is_empty());
    /// ```
    pub fn write_to<W: 'static + Read + Write + Seek + Send + Truncate>(
        &self,
        dest: W,
        compress: bool,
    ) -> Result<W> {
        let mut header = self.header.clone();
        header.point_format_id = self.points.point_format().id();
        header.point_size = self.points.point_format().size();
        header.set_compressed(compress);
        let mut vlrs = self.vlrs.clone();
        let _ = compression::extract_laszip_vlr(&mut vlrs);
        let _ = vlrs.remove(ExtraBytesVlr::USER_ID, ExtraBytesVlr::RECORD_ID);
        if !self.points.point_format().extra_dims().is_empty() {
            vlrs.push(
                ExtraBytesVlr {
                    dimensions: self.points.point_format().extra_dims().to_vec(),
                }
                .to_vlr()?,
            );
        }
        let mut writer = Writer::new(dest, header, vlrs)?;
        writer.write(&self.points)?;
        if !self.evlrs.is_empty() {
            writer.write_evlrs(self.evlrs.clone())?;
        }
        writer.into_inner()
    }

    /// The point format of the points.
    pub fn point_format(&self) -> &PointFormat {
        self.points.point_format()
    }

    /// Declares a new extra bytes dimension on every point.
    ///
    /// The record buffer is widened (existing values kept, the new
    /// dimension zero-filled) and the extra bytes vlr is kept in sync.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{ExtraBytesParams, LasData, PointFormat};
    /// let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    /// las.points.resize(10);
    /// las.add_extra_dim(ExtraBytesParams::new("range", "int32")).unwrap();
    /// las.points.column_mut::<i32>("range").unwrap().fill(789464);
    /// ```
    pub fn add_extra_dim(&mut self, params: ExtraBytesParams) -> Result<()> {
        let dim = ExtraDimension::from_params(params)?;
        self.points.add_extra_dim(dim)?;
        self.header.point_size = self.points.point_format().size();
        let _ = self.vlrs.remove(ExtraBytesVlr::USER_ID, ExtraBytesVlr::RECORD_ID);
        self.vlrs.push(
            ExtraBytesVlr {
                dimensions: self.points.point_format().extra_dims().to_vec(),
            }
            .to_vlr()?,
        );
        Ok(())
    }

    /// Converts to another point format.
    ///
    /// Dimensions present in both formats keep their values, dimensions new
    /// to the target are zero-filled, dimensions the target lacks are
    /// dropped. Extra bytes dimensions ride along. The version is bumped if
    /// the current one does not support the target format.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{LasData, PointFormat};
    /// let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    /// las.points.resize(5);
    /// las.points.column_mut::<u16>("intensity").unwrap().fill(17);
    /// let converted = las.convert(7).unwrap();
    /// assert_eq!(17, converted.points.column::<u16>("intensity").unwrap().get(0));
    /// assert!(converted.points.column::<u16>("red").is_ok());
    /// ```
    pub fn convert(&self, target_format_id: u8) -> Result<LasData> {
        let target = PointFormat::new(
            target_format_id,
            self.points.point_format().extra_dims().to_vec(),
        )?;
        let mut points = PackedPointRecord::zeros(target, self.points.len());
        points.copy_matching_dimensions_from(&self.points)?;
        let mut header = self.header.clone();
        header.point_format_id = target_format_id;
        header.point_size = points.point_format().size();
        if !header.version.supports_point_format(target_format_id) {
            header.version = points.point_format().minimum_version();
        }
        Ok(LasData {
            header,
            vlrs: self.vlrs.clone(),
            evlrs: self.evlrs.clone(),
            points,
        })
    }

    /// The scaled x coordinates.
    pub fn x(&self) -> ScaledColumn<'_> {
        self.points
            .scaled_with("X", vec![self.header.transforms.x])
            .expect("every point format has X")
    }

    /// The scaled y coordinates.
    pub fn y(&self) -> ScaledColumn<'_> {
        self.points
            .scaled_with("Y", vec![self.header.transforms.y])
            .expect("every point format has Y")
    }

    /// The scaled z coordinates.
    pub fn z(&self) -> ScaledColumn<'_> {
        self.points
            .scaled_with("Z", vec![self.header.transforms.z])
            .expect("every point format has Z")
    }

    /// The scaled x coordinates, writable.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{LasData, PointFormat};
    /// let mut las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
    /// las.points.resize(1);
    /// las.x_mut().set(0, -152.0).unwrap();
    /// assert_eq!(-152.0, las.x().get(0));
    /// ```
    pub fn x_mut(&mut self) -> ScaledColumnMut<'_> {
        let transform = self.header.transforms.x;
        self.points
            .scaled_mut_with("X", vec![transform])
            .expect("every point format has X")
    }

    /// The scaled y coordinates, writable.
    pub fn y_mut(&mut self) -> ScaledColumnMut<'_> {
        let transform = self.header.transforms.y;
        self.points
            .scaled_mut_with("Y", vec![transform])
            .expect("every point format has Y")
    }

    /// The scaled z coordinates, writable.
    pub fn z_mut(&mut self) -> ScaledColumnMut<'_> {
        let transform = self.header.transforms.z;
        self.points
            .scaled_mut_with("Z", vec![transform])
            .expect("every point format has Z")
    }
}

fn default_version(point_format_id: u8) -> Version {
    match point_format_id {
        0..=3 => Version::new(1, 2),
        4 | 5 => Version::new(1, 3),
        _ => Version::new(1, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn default_versions() {
        assert_eq!(Version::new(1, 2), default_version(0));
        assert_eq!(Version::new(1, 3), default_version(5));
        assert_eq!(Version::new(1, 4), default_version(6));
    }

    #[test]
    fn version_checked_on_creation() {
        assert!(matches!(
            LasData::with_version(PointFormat::from_id(6).unwrap(), Version::new(1, 2)),
            Err(Error::IncompatibleVersion {
                point_format_id: 6,
                ..
            })
        ));
    }

    #[test]
    fn missing_dimension_is_an_error() {
        // format 0 has no color
        let las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
        assert!(matches!(
            las.points.column::<u16>("red"),
            Err(Error::InvalidDimension(_))
        ));
    }

    #[test]
    fn convert_drops_and_zero_fills() {
        let mut las = LasData::new(PointFormat::from_id(3).unwrap()).unwrap();
        las.points.resize(2);
        las.points
            .column_mut::<u16>("red")
            .unwrap()
            .copy_from_slice(&[100, 200]);
        las.points.column_mut::<f64>("gps_time").unwrap().fill(12.5);

        // format 1 has gps time but no color
        let converted = las.convert(1).unwrap();
        assert!(converted.points.column::<u16>("red").is_err());
        assert_eq!(
            vec![12.5, 12.5],
            converted.points.column::<f64>("gps_time").unwrap().to_vec()
        );

        // and back again: color reappears zeroed
        let back = converted.convert(3).unwrap();
        assert_eq!(vec![0, 0], back.points.column::<u16>("red").unwrap().to_vec());
    }

    #[test]
    fn convert_bumps_the_version() {
        let las = LasData::new(PointFormat::from_id(0).unwrap()).unwrap();
        let converted = las.convert(6).unwrap();
        assert_eq!(Version::new(1, 4), converted.header.version);
        assert_eq!(30, converted.header.point_size);
    }
}
