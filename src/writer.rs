//! Write las and laz data.
//!
//! A [Writer] reserves space for the header, writes the vlrs, then streams
//! point chunks (through a laz back-end when the header is marked
//! compressed), and finally rewrites the header with the real statistics:
//!
//! ```
//! use laspack::{PackedPointRecord, PointFormat, Header, Version, VlrList, Writer};
//! use std::io::Cursor;
//!
//! let format = PointFormat::from_id(0).unwrap();
//! let header = Header::new(Version::new(1, 2));
//! let mut writer = Writer::new(Cursor::new(Vec::new()), header, VlrList::new()).unwrap();
//! writer.write(&PackedPointRecord::zeros(format, 10)).unwrap();
//! writer.close().unwrap();
//! assert_eq!(10, writer.header().point_count);
//! ```

use crate::{compression, Error, Header, LazBackend, PackedPointRecord, PointFormat, Result, VlrList};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};

/// Destinations that can drop bytes off their tail.
///
/// The external-process laz back-end appends the chunk table offset at the
/// end of the stream and must splice it back into its slot, truncating the
/// eight tail bytes. Regular las writing never truncates.
pub trait Truncate {
    /// Shortens the destination to `len` bytes.
    fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

impl Truncate for File {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
}

impl Truncate for Cursor<Vec<u8>> {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.get_mut().truncate(len as usize);
        Ok(())
    }
}

impl<W: Write + Truncate> Truncate for BufWriter<W> {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.flush()?;
        self.get_mut().truncate(len)
    }
}

impl<T: Truncate> Truncate for &mut T {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        (**self).truncate(len)
    }
}

/// The streaming life cycle shared by the plain writer and the laz
/// back-ends.
///
/// Calls must follow `write_initial_header_and_vlrs` →
/// `write_points`* → `done` → `write_updated_header`; anything else is a
/// programmer error and panics. `get_mut` is only valid where the
/// implementation actually holds the destination (for the external-process
/// back-end, after `done`).
pub(crate) trait PointWriter<W> {
    fn write_initial_header_and_vlrs(&mut self, header: &mut Header, vlrs: &mut VlrList)
        -> Result<()>;
    fn write_points(&mut self, bytes: &[u8]) -> Result<()>;
    fn done(&mut self) -> Result<()>;
    fn write_updated_header(&mut self, header: &Header) -> Result<()>;
    fn get_mut(&mut self) -> &mut W;
    fn into_inner(self: Box<Self>) -> W;
}

/// Computes the vlr bookkeeping fields and writes the header and vlrs.
pub(crate) fn write_header_and_vlrs_to<W: Write>(
    dest: &mut W,
    header: &mut Header,
    vlrs: &VlrList,
) -> Result<()> {
    header.number_of_vlrs = vlrs.len() as u32;
    header.offset_to_point_data =
        u32::from(header.version.header_size()) + vlrs.total_size_in_bytes(false) as u32;
    header.into_raw()?.write_to(&mut *dest)?;
    vlrs.write_to(dest, false)
}

pub(crate) struct UncompressedPointWriter<W> {
    pub(crate) dest: W,
}

impl<W: Write + Seek> PointWriter<W> for UncompressedPointWriter<W> {
    fn write_initial_header_and_vlrs(
        &mut self,
        header: &mut Header,
        vlrs: &mut VlrList,
    ) -> Result<()> {
        write_header_and_vlrs_to(&mut self.dest, header, vlrs)
    }

    fn write_points(&mut self, bytes: &[u8]) -> Result<()> {
        self.dest.write_all(bytes)?;
        Ok(())
    }

    fn done(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_updated_header(&mut self, header: &Header) -> Result<()> {
        let _ = self.dest.seek(SeekFrom::Start(0))?;
        header.into_raw()?.write_to(&mut self.dest)
    }

    fn get_mut(&mut self) -> &mut W {
        &mut self.dest
    }

    fn into_inner(self: Box<Self>) -> W {
        self.dest
    }
}

struct ClosedPointWriter;

impl<W> PointWriter<W> for ClosedPointWriter {
    fn write_initial_header_and_vlrs(&mut self, _: &mut Header, _: &mut VlrList) -> Result<()> {
        unreachable!()
    }

    fn write_points(&mut self, _: &[u8]) -> Result<()> {
        unreachable!()
    }

    fn done(&mut self) -> Result<()> {
        unreachable!()
    }

    fn write_updated_header(&mut self, _: &Header) -> Result<()> {
        unreachable!()
    }

    fn get_mut(&mut self) -> &mut W {
        unreachable!()
    }

    fn into_inner(self: Box<Self>) -> W {
        unreachable!()
    }
}

/// Writes las data to a destination.
///
/// The destination must be seekable: the header is written twice, once as a
/// placeholder and once, on [close](Writer::close), with the final point
/// count, bounds, and offsets. `Writer` closes itself on drop, logging any
/// failure; call `close` explicitly to handle errors.
#[allow(missing_debug_implementations)]
pub struct Writer<W: 'static + Read + Write + Seek + Send + Truncate> {
    point_writer: Box<dyn PointWriter<W> + Send>,
    header: Header,
    point_format: PointFormat,
    done: bool,
    closed: bool,
}

impl<W: 'static + Read + Write + Seek + Send + Truncate> Writer<W> {
    /// Creates a new writer.
    ///
    /// Whether the point data is compressed is decided by
    /// [Header::is_compressed]. Statistics fields of the header are zeroed;
    /// they are recomputed as points are written.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{Header, VlrList, Writer};
    /// use std::io::Cursor;
    /// let writer = Writer::new(Cursor::new(Vec::new()), Header::default(), VlrList::new()).unwrap();
    /// ```
    pub fn new(dest: W, header: Header, vlrs: VlrList) -> Result<Writer<W>> {
        Writer::with_backends(dest, header, vlrs, &LazBackend::detect_available())
    }

    /// Creates a new writer with an explicit laz back-end preference list.
    ///
    /// The first available back-end that constructs successfully wins;
    /// construction failures are logged and fall through to the next entry.
    pub fn with_backends(
        mut dest: W,
        mut header: Header,
        mut vlrs: VlrList,
        backends: &[LazBackend],
    ) -> Result<Writer<W>> {
        dest.stream_position()
            .map_err(|_| Error::NonSeekableDestination)?;
        let point_format = PointFormat::with_point_size(
            header.point_format_id,
            vlrs.extra_bytes_dimensions()?,
            header.point_size,
        )?;
        point_format.verify_compatible_with(header.version)?;
        header.partial_reset();
        let mut point_writer: Box<dyn PointWriter<W> + Send> = if header.is_compressed() {
            compression::compressed_point_writer(dest, &point_format, backends)?
        } else {
            Box::new(UncompressedPointWriter { dest })
        };
        point_writer.write_initial_header_and_vlrs(&mut header, &mut vlrs)?;
        Ok(Writer {
            point_writer,
            header,
            point_format,
            done: false,
            closed: false,
        })
    }

    /// Returns a reference to this writer's header.
    ///
    /// Statistics (point count, bounds, per-return counts) reflect the
    /// points written so far.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The point format this writer was opened with.
    pub fn point_format(&self) -> &PointFormat {
        &self.point_format
    }

    /// Writes a chunk of points.
    ///
    /// The chunk's point format must equal the format the writer was opened
    /// with ([Error::IncompatibleFormat]).
    pub fn write(&mut self, points: &PackedPointRecord) -> Result<()> {
        if self.done || self.closed {
            return Err(Error::WriteAfterDone);
        }
        if points.point_format() != &self.point_format {
            return Err(Error::IncompatibleFormat);
        }
        if points.is_empty() {
            return Ok(());
        }
        self.header.update_from(points)?;
        self.point_writer.write_points(points.as_bytes())
    }

    /// Writes the extended vlrs.
    ///
    /// Legal only for las 1.4 ([Error::EvlrNotSupported]), at most once, and
    /// only after the last point chunk: this finalizes the point stream, so
    /// later calls to [write](Writer::write) or a second `write_evlrs` fail
    /// with [Error::WriteAfterDone].
    pub fn write_evlrs(&mut self, evlrs: VlrList) -> Result<()> {
        if !self.header.version.supports::<crate::feature::Evlrs>() {
            return Err(Error::EvlrNotSupported(self.header.version));
        }
        if self.done || self.closed {
            return Err(Error::WriteAfterDone);
        }
        self.point_writer.done()?;
        self.done = true;
        let start_of_first_evlr = self.point_writer.get_mut().stream_position()?;
        self.header.start_of_first_evlr = start_of_first_evlr;
        self.header.number_of_evlrs = evlrs.len() as u32;
        evlrs.write_to(self.point_writer.get_mut(), true)
    }

    /// Finalizes the point stream if needed and rewrites the header with
    /// the final statistics.
    ///
    /// Called by `Drop` if you don't call it; a second explicit call fails
    /// with [Error::WriteAfterDone].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::WriteAfterDone);
        }
        if !self.done {
            self.point_writer.done()?;
            self.done = true;
        }
        self.point_writer.write_updated_header(&self.header)?;
        self.closed = true;
        Ok(())
    }

    /// Closes this writer and returns the destination.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::{Header, VlrList, Writer};
    /// use std::io::Cursor;
    /// let writer = Writer::new(Cursor::new(Vec::new()), Header::default(), VlrList::new()).unwrap();
    /// let cursor = writer.into_inner().unwrap();
    /// ```
    pub fn into_inner(mut self) -> Result<W> {
        if !self.closed {
            self.close()?;
        }
        let point_writer = std::mem::replace(&mut self.point_writer, Box::new(ClosedPointWriter));
        Ok(point_writer.into_inner())
    }
}

impl<W: 'static + Read + Write + Seek + Send + Truncate> Drop for Writer<W> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(error) = self.close() {
                log::error!("failed to close the writer: {}", error);
            }
        }
    }
}
