//! The raw, fixed-layout file header.

use crate::feature::{Evlrs, LargeFiles, Waveforms};
use crate::raw::LASF;
use crate::{Error, Result, Version};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// A raw las header, mapping 1:1 onto the bytes of the public header block.
///
/// The layout grew over the versions: 1.0 through 1.2 are 227 bytes, 1.3
/// appends the start of waveform data, and 1.4 appends evlr bookkeeping and
/// 64 bit point counts. The version-dependent tails are optional fields
/// here.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// The file signature. Must be `LASF`.
    pub file_signature: [u8; 4],

    /// A value between 0 and 65,535 identifying the source of this file,
    /// e.g. an original flight line.
    pub file_source_id: u16,

    /// A bit field of global properties, e.g. the meaning of gps time.
    pub global_encoding: u16,

    /// The project identifier, optional.
    pub guid: [u8; 16],

    /// The las version.
    pub version: Version,

    /// The hardware or the operation that generated the data.
    pub system_identifier: [u8; 32],

    /// The generating software package, e.g. "TerraScan V-10.8".
    pub generating_software: [u8; 32],

    /// Day of file creation, GMT, January 1 is day 1.
    pub file_creation_day_of_year: u16,

    /// Year of file creation, four digits.
    pub file_creation_year: u16,

    /// The size of the public header block itself.
    pub header_size: u16,

    /// The number of bytes from the beginning of the file to the first point
    /// record.
    pub offset_to_point_data: u32,

    /// The current number of vlrs.
    pub number_of_variable_length_records: u32,

    /// The point format id.
    ///
    /// The high bit is set when the point data is laszip compressed.
    pub point_data_record_format: u8,

    /// The size of one point record, extra bytes included.
    pub point_data_record_length: u16,

    /// The legacy 32 bit point count.
    ///
    /// Zero in 1.4 files whose count does not fit or whose point format is
    /// 6 or above; the real count then lives in [LargeFile].
    pub number_of_point_records: u32,

    /// The legacy per-return point counts.
    pub number_of_points_by_return: [u32; 5],

    /// The x scale factor.
    pub x_scale_factor: f64,
    /// The y scale factor.
    pub y_scale_factor: f64,
    /// The z scale factor.
    pub z_scale_factor: f64,
    /// The x offset.
    pub x_offset: f64,
    /// The y offset.
    pub y_offset: f64,
    /// The z offset.
    pub z_offset: f64,
    /// The maximum x value.
    pub max_x: f64,
    /// The minimum x value.
    pub min_x: f64,
    /// The maximum y value.
    pub max_y: f64,
    /// The minimum y value.
    pub min_y: f64,
    /// The maximum z value.
    pub max_z: f64,
    /// The minimum z value.
    pub min_z: f64,

    /// The offset to the waveform data package record, 1.3 and above.
    pub start_of_waveform_data_packet_record: Option<u64>,

    /// Evlr bookkeeping, 1.4 only.
    pub evlr: Option<Evlr>,

    /// 64 bit point counts, 1.4 only.
    pub large_file: Option<LargeFile>,

    /// Bytes between the end of the standard header layout and
    /// `header_size`.
    pub padding: Vec<u8>,
}

/// Evlr bookkeeping in a 1.4 header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Evlr {
    /// The offset to the first evlr.
    pub start_of_first_evlr: u64,

    /// The number of evlrs.
    pub number_of_evlrs: u32,
}

/// The 64 bit point counts of a 1.4 header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LargeFile {
    /// The number of point records.
    pub number_of_point_records: u64,

    /// The number of points by return, now with fifteen slots.
    pub number_of_points_by_return: [u64; 15],
}

impl Header {
    /// Reads a raw header.
    ///
    /// Fails with [Error::InvalidSignature] if the stream does not start
    /// with `LASF` and [Error::UnsupportedVersion] for versions outside 1.0
    /// through 1.4.
    pub fn read_from<R: Read>(mut read: R) -> Result<Header> {
        let mut header = Header::default();
        read.read_exact(&mut header.file_signature)?;
        if header.file_signature != LASF {
            return Err(Error::InvalidSignature(header.file_signature));
        }
        header.file_source_id = read.read_u16::<LittleEndian>()?;
        header.global_encoding = read.read_u16::<LittleEndian>()?;
        read.read_exact(&mut header.guid)?;
        let major = read.read_u8()?;
        let minor = read.read_u8()?;
        header.version = Version::new(major, minor);
        if !header.version.is_supported() {
            return Err(Error::UnsupportedVersion { major, minor });
        }
        read.read_exact(&mut header.system_identifier)?;
        read.read_exact(&mut header.generating_software)?;
        header.file_creation_day_of_year = read.read_u16::<LittleEndian>()?;
        header.file_creation_year = read.read_u16::<LittleEndian>()?;
        header.header_size = read.read_u16::<LittleEndian>()?;
        header.offset_to_point_data = read.read_u32::<LittleEndian>()?;
        header.number_of_variable_length_records = read.read_u32::<LittleEndian>()?;
        header.point_data_record_format = read.read_u8()?;
        header.point_data_record_length = read.read_u16::<LittleEndian>()?;
        header.number_of_point_records = read.read_u32::<LittleEndian>()?;
        read.read_u32_into::<LittleEndian>(&mut header.number_of_points_by_return)?;
        header.x_scale_factor = read.read_f64::<LittleEndian>()?;
        header.y_scale_factor = read.read_f64::<LittleEndian>()?;
        header.z_scale_factor = read.read_f64::<LittleEndian>()?;
        header.x_offset = read.read_f64::<LittleEndian>()?;
        header.y_offset = read.read_f64::<LittleEndian>()?;
        header.z_offset = read.read_f64::<LittleEndian>()?;
        header.max_x = read.read_f64::<LittleEndian>()?;
        header.min_x = read.read_f64::<LittleEndian>()?;
        header.max_y = read.read_f64::<LittleEndian>()?;
        header.min_y = read.read_f64::<LittleEndian>()?;
        header.max_z = read.read_f64::<LittleEndian>()?;
        header.min_z = read.read_f64::<LittleEndian>()?;
        if header.version.supports::<Waveforms>() {
            header.start_of_waveform_data_packet_record =
                Some(read.read_u64::<LittleEndian>()?);
        }
        if header.version.supports::<Evlrs>() {
            header.evlr = Some(Evlr {
                start_of_first_evlr: read.read_u64::<LittleEndian>()?,
                number_of_evlrs: read.read_u32::<LittleEndian>()?,
            });
        }
        if header.version.supports::<LargeFiles>() {
            let number_of_point_records = read.read_u64::<LittleEndian>()?;
            let mut number_of_points_by_return = [0; 15];
            read.read_u64_into::<LittleEndian>(&mut number_of_points_by_return)?;
            header.large_file = Some(LargeFile {
                number_of_point_records,
                number_of_points_by_return,
            });
        }
        let standard_size = header.version.header_size();
        if header.header_size > standard_size {
            header
                .padding
                .resize(usize::from(header.header_size - standard_size), 0);
            read.read_exact(&mut header.padding)?;
        } else if header.header_size < standard_size {
            log::warn!(
                "header size {} is smaller than the standard {} for version {}",
                header.header_size,
                standard_size,
                header.version
            );
        }
        Ok(header)
    }

    /// Writes a raw header, zero-padding the version-dependent tails that
    /// the struct does not carry.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&self.file_signature)?;
        write.write_u16::<LittleEndian>(self.file_source_id)?;
        write.write_u16::<LittleEndian>(self.global_encoding)?;
        write.write_all(&self.guid)?;
        write.write_u8(self.version.major)?;
        write.write_u8(self.version.minor)?;
        write.write_all(&self.system_identifier)?;
        write.write_all(&self.generating_software)?;
        write.write_u16::<LittleEndian>(self.file_creation_day_of_year)?;
        write.write_u16::<LittleEndian>(self.file_creation_year)?;
        write.write_u16::<LittleEndian>(self.header_size)?;
        write.write_u32::<LittleEndian>(self.offset_to_point_data)?;
        write.write_u32::<LittleEndian>(self.number_of_variable_length_records)?;
        write.write_u8(self.point_data_record_format)?;
        write.write_u16::<LittleEndian>(self.point_data_record_length)?;
        write.write_u32::<LittleEndian>(self.number_of_point_records)?;
        for &count in &self.number_of_points_by_return {
            write.write_u32::<LittleEndian>(count)?;
        }
        write.write_f64::<LittleEndian>(self.x_scale_factor)?;
        write.write_f64::<LittleEndian>(self.y_scale_factor)?;
        write.write_f64::<LittleEndian>(self.z_scale_factor)?;
        write.write_f64::<LittleEndian>(self.x_offset)?;
        write.write_f64::<LittleEndian>(self.y_offset)?;
        write.write_f64::<LittleEndian>(self.z_offset)?;
        write.write_f64::<LittleEndian>(self.max_x)?;
        write.write_f64::<LittleEndian>(self.min_x)?;
        write.write_f64::<LittleEndian>(self.max_y)?;
        write.write_f64::<LittleEndian>(self.min_y)?;
        write.write_f64::<LittleEndian>(self.max_z)?;
        write.write_f64::<LittleEndian>(self.min_z)?;
        if self.version.supports::<Waveforms>() {
            write.write_u64::<LittleEndian>(
                self.start_of_waveform_data_packet_record.unwrap_or(0),
            )?;
        }
        if self.version.supports::<Evlrs>() {
            let evlr = self.evlr.unwrap_or_default();
            write.write_u64::<LittleEndian>(evlr.start_of_first_evlr)?;
            write.write_u32::<LittleEndian>(evlr.number_of_evlrs)?;
        }
        if self.version.supports::<LargeFiles>() {
            let large_file = self.large_file.unwrap_or_default();
            write.write_u64::<LittleEndian>(large_file.number_of_point_records)?;
            for &count in &large_file.number_of_points_by_return {
                write.write_u64::<LittleEndian>(count)?;
            }
        }
        write.write_all(&self.padding)?;
        Ok(())
    }
}

impl Default for Header {
    fn default() -> Header {
        Header {
            file_signature: LASF,
            file_source_id: 0,
            global_encoding: 0,
            guid: [0; 16],
            version: Version::default(),
            system_identifier: [0; 32],
            generating_software: [0; 32],
            file_creation_day_of_year: 0,
            file_creation_year: 0,
            header_size: Version::default().header_size(),
            offset_to_point_data: u32::from(Version::default().header_size()),
            number_of_variable_length_records: 0,
            point_data_record_format: 0,
            point_data_record_length: 20,
            number_of_point_records: 0,
            number_of_points_by_return: [0; 5],
            x_scale_factor: 1.,
            y_scale_factor: 1.,
            z_scale_factor: 1.,
            x_offset: 0.,
            y_offset: 0.,
            z_offset: 0.,
            max_x: 0.,
            min_x: 0.,
            max_y: 0.,
            min_y: 0.,
            max_z: 0.,
            min_z: 0.,
            start_of_waveform_data_packet_record: None,
            evlr: None,
            large_file: None,
            padding: Vec::new(),
        }
    }
}

impl Default for LargeFile {
    fn default() -> LargeFile {
        LargeFile {
            number_of_point_records: 0,
            number_of_points_by_return: [0; 15],
        }
    }
}
