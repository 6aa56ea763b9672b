//! Read las and laz files.
//!
//! Reading materializes the whole file: header, vlrs, the packed point
//! buffer (decompressed if need be), and any evlrs. For most uses the free
//! function is enough:
//!
//! ```no_run
//! let las = laspack::read("points.laz").unwrap();
//! ```
//!
//! A [Reader] gives access to the options, e.g. permissive handling of
//! truncated point data:
//!
//! ```no_run
//! use laspack::Reader;
//! let las = Reader::new().permissive(true).read_path("truncated.las").unwrap();
//! ```

use crate::feature::Evlrs;
use crate::{
    compression, raw, Error, Header, LasData, LazBackend, PackedPointRecord, PointFormat, Result,
    VlrList,
};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Reads a las or laz file into a [LasData].
///
/// Compressed files are detected by the header, not the file extension.
pub fn read<P: AsRef<Path>>(path: P) -> Result<LasData> {
    Reader::new().read_path(path)
}

/// Reads las or laz data from a seekable source.
pub fn read_from<R: Read + Seek + Send + Sync>(source: R) -> Result<LasData> {
    Reader::new().read_from(source)
}

/// Reads las data, with options.
#[derive(Clone, Debug)]
pub struct Reader {
    permissive: bool,
    backends: Vec<LazBackend>,
}

impl Reader {
    /// Creates a reader with the default options.
    pub fn new() -> Reader {
        Reader {
            permissive: false,
            backends: LazBackend::detect_available(),
        }
    }

    /// Tolerate point data that ends early.
    ///
    /// A permissive reader clamps the point count to the records actually
    /// present and logs a warning, instead of failing with
    /// [Error::TruncatedPointData].
    pub fn permissive(mut self, permissive: bool) -> Reader {
        self.permissive = permissive;
        self
    }

    /// Sets the laz back-end preference list.
    pub fn backends(mut self, backends: Vec<LazBackend>) -> Reader {
        self.backends = backends;
        self
    }

    /// Reads from a path.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<LasData> {
        self.read_from(BufReader::new(File::open(path)?))
    }

    /// Reads from a seekable source.
    ///
    /// On return the source is positioned at the end of the point data
    /// (for compressed sources, wherever decompression left it).
    pub fn read_from<R: Read + Seek + Send + Sync>(&self, mut source: R) -> Result<LasData> {
        let mut header = Header::from_raw(raw::Header::read_from(&mut source)?)?;
        let mut vlrs = VlrList::read_from(&mut source, header.number_of_vlrs, false)?;
        let format = PointFormat::with_point_size(
            header.point_format_id,
            vlrs.extra_bytes_dimensions()?,
            header.point_size,
        )?;
        let _ = source.seek(SeekFrom::Start(u64::from(header.offset_to_point_data)))?;
        let was_compressed = header.is_compressed();
        let points = if was_compressed {
            let laszip_vlr =
                compression::extract_laszip_vlr(&mut vlrs).ok_or(Error::MissingLaszipVlr)?;
            let bytes = compression::decompress_points(
                &mut source,
                &header,
                &laszip_vlr,
                &format,
                &self.backends,
            )?;
            header.set_compressed(false);
            PackedPointRecord::from_bytes(format, bytes)?
        } else if self.permissive {
            PackedPointRecord::from_stream_permissive(format, &mut source, header.point_count)?
        } else {
            PackedPointRecord::from_stream(format, &mut source, header.point_count)?
        };
        header.point_count = points.len() as u64;
        header.number_of_vlrs = vlrs.len() as u32;
        let end_of_points = source.stream_position()?;
        let evlrs = if header.version.supports::<Evlrs>() && header.number_of_evlrs > 0 {
            let _ = source.seek(SeekFrom::Start(header.start_of_first_evlr))?;
            let evlrs = VlrList::read_from(&mut source, header.number_of_evlrs, true)?;
            if !was_compressed {
                let _ = source.seek(SeekFrom::Start(end_of_points))?;
            }
            evlrs
        } else {
            VlrList::new()
        };
        Ok(LasData {
            header,
            vlrs,
            evlrs,
            points,
        })
    }
}

impl Default for Reader {
    fn default() -> Reader {
        Reader::new()
    }
}
