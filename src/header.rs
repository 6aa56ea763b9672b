//! The typed file header.

use crate::feature::{Evlrs, LargeFiles, Waveforms};
use crate::raw;
use crate::utils::{AsLasStr, FromLasStr};
use crate::{Bounds, PackedPointRecord, Result, Transform, Vector, Version};
use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

/// Metadata describing the layout, source, and interpretation of the points.
///
/// A `Header` is version-agnostic: point counts are 64 bit and the
/// per-return table has fifteen slots internally; [into_raw](Header::into_raw)
/// down-converts to the legacy fields where the version demands it.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// The las version.
    pub version: Version,

    /// The file source id, e.g. a flight line number.
    pub file_source_id: u16,

    /// The global encoding bit field.
    pub global_encoding: u16,

    /// The project GUID.
    pub guid: Uuid,

    /// The system that produced the points.
    pub system_identifier: String,

    /// The software that wrote the file.
    pub generating_software: String,

    /// The file creation date.
    pub date: Option<NaiveDate>,

    /// The logical point format id, high bit always clear.
    pub point_format_id: u8,

    /// The size of one point record, extra bytes included.
    pub point_size: u16,

    /// The number of points.
    pub point_count: u64,

    /// The number of points per return number, return numbers 1 through 15.
    pub number_of_points_by_return: [u64; 15],

    /// The per-axis scales and offsets.
    pub transforms: Vector<Transform>,

    /// The bounding box of the points, in scaled coordinates.
    pub bounds: Bounds,

    /// The number of bytes from the start of the file to the point data.
    pub offset_to_point_data: u32,

    /// The number of vlrs.
    pub number_of_vlrs: u32,

    /// The offset to the first evlr, 1.4 only.
    pub start_of_first_evlr: u64,

    /// The number of evlrs, 1.4 only.
    pub number_of_evlrs: u32,

    /// The offset to waveform data, 1.3 and above.
    pub start_of_waveform_data_packet_record: u64,

    compressed: bool,
}

impl Header {
    /// Creates a new header for the given version.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{Header, Version};
    /// let header = Header::new(Version::new(1, 4));
    /// assert_eq!(0, header.point_count);
    /// ```
    pub fn new(version: Version) -> Header {
        Header {
            version,
            file_source_id: 0,
            global_encoding: 0,
            guid: Uuid::nil(),
            system_identifier: "laspack".to_string(),
            generating_software: format!("laspack {}", env!("CARGO_PKG_VERSION")),
            date: Some(Utc::now().date_naive()),
            point_format_id: 0,
            point_size: 20,
            point_count: 0,
            number_of_points_by_return: [0; 15],
            transforms: Vector {
                x: Transform::default(),
                y: Transform::default(),
                z: Transform::default(),
            },
            bounds: Bounds::default(),
            offset_to_point_data: u32::from(version.header_size()),
            number_of_vlrs: 0,
            start_of_first_evlr: 0,
            number_of_evlrs: 0,
            start_of_waveform_data_packet_record: 0,
            compressed: false,
        }
    }

    /// Creates a header from a raw header.
    pub fn from_raw(raw: raw::Header) -> Result<Header> {
        let (point_count, number_of_points_by_return) = match raw.large_file {
            Some(large_file) => (
                large_file.number_of_point_records,
                large_file.number_of_points_by_return,
            ),
            None => {
                let mut by_return = [0; 15];
                for (slot, &count) in by_return
                    .iter_mut()
                    .zip(raw.number_of_points_by_return.iter())
                {
                    *slot = u64::from(count);
                }
                (u64::from(raw.number_of_point_records), by_return)
            }
        };
        let date = if raw.file_creation_day_of_year == 0 {
            None
        } else {
            NaiveDate::from_yo_opt(
                i32::from(raw.file_creation_year),
                u32::from(raw.file_creation_day_of_year),
            )
        };
        Ok(Header {
            version: raw.version,
            file_source_id: raw.file_source_id,
            global_encoding: raw.global_encoding,
            guid: Uuid::from_bytes(raw.guid),
            system_identifier: raw.system_identifier.as_ref().as_las_str()?.to_string(),
            generating_software: raw.generating_software.as_ref().as_las_str()?.to_string(),
            date,
            point_format_id: raw.point_data_record_format & 0x3f,
            point_size: raw.point_data_record_length,
            point_count,
            number_of_points_by_return,
            transforms: Vector {
                x: Transform {
                    scale: raw.x_scale_factor,
                    offset: raw.x_offset,
                },
                y: Transform {
                    scale: raw.y_scale_factor,
                    offset: raw.y_offset,
                },
                z: Transform {
                    scale: raw.z_scale_factor,
                    offset: raw.z_offset,
                },
            },
            bounds: Bounds {
                min: Vector::new(raw.min_x, raw.min_y, raw.min_z),
                max: Vector::new(raw.max_x, raw.max_y, raw.max_z),
            },
            offset_to_point_data: raw.offset_to_point_data,
            number_of_vlrs: raw.number_of_variable_length_records,
            start_of_first_evlr: raw.evlr.map_or(0, |evlr| evlr.start_of_first_evlr),
            number_of_evlrs: raw.evlr.map_or(0, |evlr| evlr.number_of_evlrs),
            start_of_waveform_data_packet_record: raw
                .start_of_waveform_data_packet_record
                .unwrap_or(0),
            compressed: raw.point_data_record_format & 0x80 != 0,
        })
    }

    /// Converts this header into a raw header for serialization.
    pub fn into_raw(&self) -> Result<raw::Header> {
        let mut system_identifier = [0; 32];
        system_identifier
            .as_mut()
            .from_las_str(&self.system_identifier)?;
        let mut generating_software = [0; 32];
        generating_software
            .as_mut()
            .from_las_str(&self.generating_software)?;
        let (number_of_point_records, number_of_points_by_return) = legacy_point_counts(
            self.version,
            self.point_format_id,
            self.point_count,
            &self.number_of_points_by_return,
        );
        let bounds = if self.bounds.is_empty() {
            Bounds {
                min: Vector::new(0., 0., 0.),
                max: Vector::new(0., 0., 0.),
            }
        } else {
            self.bounds
        };
        Ok(raw::Header {
            file_signature: raw::LASF,
            file_source_id: self.file_source_id,
            global_encoding: self.global_encoding,
            guid: *self.guid.as_bytes(),
            version: self.version,
            system_identifier,
            generating_software,
            file_creation_day_of_year: self.date.map_or(0, |date| date.ordinal() as u16),
            file_creation_year: self.date.map_or(0, |date| date.year() as u16),
            header_size: self.version.header_size(),
            offset_to_point_data: self.offset_to_point_data,
            number_of_variable_length_records: self.number_of_vlrs,
            point_data_record_format: if self.compressed {
                self.point_format_id | 0x80
            } else {
                self.point_format_id
            },
            point_data_record_length: self.point_size,
            number_of_point_records,
            number_of_points_by_return,
            x_scale_factor: self.transforms.x.scale,
            y_scale_factor: self.transforms.y.scale,
            z_scale_factor: self.transforms.z.scale,
            x_offset: self.transforms.x.offset,
            y_offset: self.transforms.y.offset,
            z_offset: self.transforms.z.offset,
            max_x: bounds.max.x,
            min_x: bounds.min.x,
            max_y: bounds.max.y,
            min_y: bounds.min.y,
            max_z: bounds.max.z,
            min_z: bounds.min.z,
            start_of_waveform_data_packet_record: self
                .version
                .supports::<Waveforms>()
                .then_some(self.start_of_waveform_data_packet_record),
            evlr: self.version.supports::<Evlrs>().then_some(raw::header::Evlr {
                start_of_first_evlr: self.start_of_first_evlr,
                number_of_evlrs: self.number_of_evlrs,
            }),
            large_file: self
                .version
                .supports::<LargeFiles>()
                .then_some(raw::header::LargeFile {
                    number_of_point_records: self.point_count,
                    number_of_points_by_return: self.number_of_points_by_return,
                }),
            padding: Vec::new(),
        })
    }

    /// Zeroes the statistics that a writer recomputes as points stream in:
    /// the point count, the per-return table, and the bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{Header, Version};
    /// let mut header = Header::new(Version::new(1, 2));
    /// header.point_count = 42;
    /// header.partial_reset();
    /// assert_eq!(0, header.point_count);
    /// ```
    pub fn partial_reset(&mut self) {
        self.point_count = 0;
        self.number_of_points_by_return = [0; 15];
        self.bounds = Bounds::default();
        self.number_of_evlrs = 0;
        self.start_of_first_evlr = 0;
    }

    /// Folds one chunk of points into the header statistics.
    ///
    /// Grows the bounds over the scaled coordinates, counts points per
    /// return number (return numbers beyond the version's table are
    /// silently dropped), and bumps the point count.
    pub fn update_from(&mut self, points: &PackedPointRecord) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let x = points.column::<i32>("X")?;
        let y = points.column::<i32>("Y")?;
        let z = points.column::<i32>("Z")?;
        for i in 0..points.len() {
            self.bounds.grow(Vector::new(
                self.transforms.x.direct(f64::from(x.get(i))),
                self.transforms.y.direct(f64::from(y.get(i))),
                self.transforms.z.direct(f64::from(z.get(i))),
            ));
        }
        let slots = if self.version.supports::<LargeFiles>() {
            15
        } else {
            5
        };
        for return_number in points.unpack("return_number")? {
            let return_number = usize::from(return_number);
            if (1..=slots).contains(&return_number) {
                self.number_of_points_by_return[return_number - 1] += 1;
            }
        }
        self.point_count += points.len() as u64;
        Ok(())
    }

    /// Marks the on-disk point format id as laszip compressed (or not).
    ///
    /// Only the high bit of the stored id changes; [point_format_id]
    /// (Header::point_format_id) keeps the logical value.
    pub fn set_compressed(&mut self, compressed: bool) {
        self.compressed = compressed;
    }

    /// Is the point data laszip compressed?
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }
}

impl Default for Header {
    fn default() -> Header {
        Header::new(Version::default())
    }
}

/// Down-converts the 64 bit counts to the legacy header fields.
///
/// For 1.4 the legacy fields are zeroed whenever they cannot faithfully
/// describe the data (format >= 6, counts too large, returns past slot
/// five). Earlier versions have nowhere else to put the counts, so
/// overlarge values are clamped with a warning.
pub(crate) fn legacy_point_counts(
    version: Version,
    point_format_id: u8,
    point_count: u64,
    number_of_points_by_return: &[u64; 15],
) -> (u32, [u32; 5]) {
    let fits = point_format_id < 6
        && point_count <= u64::from(u32::MAX)
        && number_of_points_by_return[..5]
            .iter()
            .all(|&count| count <= u64::from(u32::MAX))
        && number_of_points_by_return[5..].iter().all(|&count| count == 0);
    if fits {
        let mut legacy = [0; 5];
        for (slot, &count) in legacy.iter_mut().zip(number_of_points_by_return.iter()) {
            *slot = count as u32;
        }
        (point_count as u32, legacy)
    } else if version.supports::<LargeFiles>() {
        (0, [0; 5])
    } else {
        log::warn!("point counts do not fit the legacy header fields, clamping");
        let mut legacy = [0; 5];
        for (slot, &count) in legacy.iter_mut().zip(number_of_points_by_return.iter()) {
            *slot = count.min(u64::from(u32::MAX)) as u32;
        }
        (point_count.min(u64::from(u32::MAX)) as u32, legacy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PackedPointRecord, PointFormat};

    #[test]
    fn update_from_folds_statistics() {
        let mut header = Header::new(Version::new(1, 2));
        header.transforms.z = Transform {
            scale: 0.5,
            offset: 10.,
        };
        let mut points = PackedPointRecord::zeros(PointFormat::from_id(0).unwrap(), 3);
        points
            .column_mut::<i32>("Z")
            .unwrap()
            .copy_from_slice(&[-2, 0, 4]);
        points.pack("return_number", &[1, 2, 7]).unwrap();
        header.update_from(&points).unwrap();
        assert_eq!(3, header.point_count);
        assert_eq!(9., header.bounds.min.z);
        assert_eq!(12., header.bounds.max.z);
        assert_eq!(1, header.number_of_points_by_return[0]);
        assert_eq!(1, header.number_of_points_by_return[1]);
        // return number 7 has no slot in the legacy table
        assert_eq!(0, header.number_of_points_by_return[6]);
    }

    #[test]
    fn fifteen_slots_for_1_4() {
        let mut header = Header::new(Version::new(1, 4));
        header.point_format_id = 6;
        header.point_size = 30;
        let mut points = PackedPointRecord::zeros(PointFormat::from_id(6).unwrap(), 1);
        points.pack("return_number", &[7]).unwrap();
        header.update_from(&points).unwrap();
        assert_eq!(1, header.number_of_points_by_return[6]);
    }

    #[test]
    fn compressed_bit() {
        let mut header = Header::new(Version::new(1, 2));
        header.point_format_id = 1;
        header.point_size = 28;
        header.set_compressed(true);
        let raw = header.into_raw().unwrap();
        assert_eq!(0x81, raw.point_data_record_format);
        let header = Header::from_raw(raw).unwrap();
        assert!(header.is_compressed());
        assert_eq!(1, header.point_format_id);
    }

    #[test]
    fn raw_roundtrip() {
        let mut header = Header::new(Version::new(1, 4));
        header.point_format_id = 6;
        header.point_size = 30;
        header.point_count = 42;
        header.number_of_points_by_return[0] = 42;
        header.bounds.grow(Vector::new(1., 2., 3.));
        let raw = header.clone().into_raw().unwrap();
        assert_eq!(0, raw.number_of_point_records);
        assert_eq!(
            42,
            raw.large_file.unwrap().number_of_point_records
        );
        let roundtripped = Header::from_raw(raw).unwrap();
        assert_eq!(header, roundtripped);
    }

    #[test]
    fn legacy_counts() {
        let mut by_return = [0; 15];
        by_return[0] = 10;
        let (count, legacy) =
            legacy_point_counts(Version::new(1, 2), 0, 10, &by_return);
        assert_eq!(10, count);
        assert_eq!([10, 0, 0, 0, 0], legacy);

        by_return[6] = 1;
        let (count, legacy) =
            legacy_point_counts(Version::new(1, 4), 6, 11, &by_return);
        assert_eq!(0, count);
        assert_eq!([0; 5], legacy);
    }
}
