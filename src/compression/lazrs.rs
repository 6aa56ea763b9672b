//! The in-process laz back-end, built on the `laz` crate.

use crate::compression::{LASZIP_DESCRIPTION, LASZIP_RECORD_ID, LASZIP_USER_ID};
use crate::writer::{write_header_and_vlrs_to, PointWriter};
use crate::{Header, PointFormat, Result, Vlr, VlrList};
use laz::{LasZipCompressor, LasZipDecompressor, LazItemRecordBuilder, LazVlr};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

/// Builds the laz record description for a point format.
///
/// Fails for point formats the `laz` crate has no record codec for (the
/// waveform formats 4, 5, 9, and 10), which sends back-end selection on to
/// the external process.
pub(crate) fn laz_vlr_for_format(format: &PointFormat) -> Result<LazVlr> {
    let items = LazItemRecordBuilder::default_for_point_format_id(
        format.id(),
        format.num_extra_bytes(),
    )?;
    Ok(LazVlr::from_laz_items(items))
}

/// Decompresses `count` points from the source, which must be positioned at
/// the start of the point data.
pub(crate) fn decompress<R: Read + Seek + Send + Sync>(
    source: &mut R,
    laszip_vlr: &Vlr,
    count: u64,
    point_size: u16,
) -> Result<Vec<u8>> {
    let vlr = LazVlr::from_buffer(&laszip_vlr.data)?;
    let mut decompressor = LasZipDecompressor::new(&mut *source, vlr)?;
    let mut output = vec![0; (count * u64::from(point_size)) as usize];
    decompressor.decompress_many(&mut output)?;
    Ok(output)
}

/// A point writer that compresses through `laz::LasZipCompressor`.
pub(crate) struct LazrsPointWriter<W: 'static + Write + Seek + Send> {
    laz_vlr: Option<LazVlr>,
    dest: Option<W>,
    compressor: Option<LasZipCompressor<'static, W>>,
}

impl<W: 'static + Write + Seek + Send> LazrsPointWriter<W> {
    pub(crate) fn new(dest: W, laz_vlr: LazVlr) -> LazrsPointWriter<W> {
        LazrsPointWriter {
            laz_vlr: Some(laz_vlr),
            dest: Some(dest),
            compressor: None,
        }
    }
}

impl<W: 'static + Write + Seek + Send> PointWriter<W> for LazrsPointWriter<W> {
    fn write_initial_header_and_vlrs(
        &mut self,
        header: &mut Header,
        vlrs: &mut VlrList,
    ) -> Result<()> {
        let laz_vlr = self
            .laz_vlr
            .take()
            .expect("the initial header is written once");
        let mut data = Cursor::new(Vec::new());
        laz_vlr.write_to(&mut data)?;
        vlrs.push(Vlr {
            user_id: LASZIP_USER_ID.to_string(),
            record_id: LASZIP_RECORD_ID,
            description: LASZIP_DESCRIPTION.to_string(),
            data: data.into_inner(),
        });
        let mut dest = self.dest.take().expect("the initial header is written once");
        write_header_and_vlrs_to(&mut dest, header, vlrs)?;
        // The compressor takes the stream only now: its first output is the
        // chunk table offset, which must land after the header and vlrs.
        self.compressor = Some(LasZipCompressor::new(dest, laz_vlr)?);
        Ok(())
    }

    fn write_points(&mut self, bytes: &[u8]) -> Result<()> {
        let compressor = self
            .compressor
            .as_mut()
            .expect("write_points runs between the initial header and done");
        compressor.compress_many(bytes)?;
        Ok(())
    }

    fn done(&mut self) -> Result<()> {
        let mut compressor = self.compressor.take().expect("done follows the points");
        compressor.done()?;
        self.dest = Some(compressor.into_inner());
        Ok(())
    }

    fn write_updated_header(&mut self, header: &Header) -> Result<()> {
        let dest = self.dest.as_mut().expect("the header rewrite follows done");
        let _ = dest.seek(SeekFrom::Start(0))?;
        header.into_raw()?.write_to(dest)
    }

    fn get_mut(&mut self) -> &mut W {
        match self.compressor.as_mut() {
            Some(compressor) => compressor.get_mut(),
            None => self.dest.as_mut().expect("the destination was moved out"),
        }
    }

    fn into_inner(self: Box<Self>) -> W {
        match self.compressor {
            Some(compressor) => compressor.into_inner(),
            None => self.dest.expect("the destination was moved out"),
        }
    }
}
