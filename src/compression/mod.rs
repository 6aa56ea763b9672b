//! Laz back-ends.
//!
//! Compression and decompression go through one of an ordered preference
//! list of back-ends: the in-process [laz](https://crates.io/crates/laz)
//! codec (behind the `laz` feature) and an external `laszip` process that
//! data is piped through. Selection takes the first available back-end
//! whose constructor succeeds; failures are logged and fall through, and
//! only exhausting the list is fatal.

mod laszip;
#[cfg(feature = "laz")]
mod lazrs;

use crate::writer::PointWriter;
use crate::{Error, Header, PointFormat, Result, Truncate, Vlr, VlrList};
use std::fmt;
use std::io::{Read, Seek, Write};

/// The user id of the laszip vlr.
pub(crate) const LASZIP_USER_ID: &str = "laszip encoded";

/// The record id of the laszip vlr.
pub(crate) const LASZIP_RECORD_ID: u16 = 22204;

/// The description written into new laszip vlrs.
#[cfg(feature = "laz")]
pub(crate) const LASZIP_DESCRIPTION: &str = "https://laszip.org";

/// A laz codec implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LazBackend {
    /// The in-process codec from the `laz` crate. Requires the `laz`
    /// feature.
    LazRs,
    /// An external `laszip`-compatible executable, fed through pipes.
    Laszip,
}

impl LazBackend {
    /// Is this back-end usable in this build and environment?
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::LazBackend;
    /// assert_eq!(cfg!(feature = "laz"), LazBackend::LazRs.is_available());
    /// ```
    pub fn is_available(&self) -> bool {
        match self {
            LazBackend::LazRs => cfg!(feature = "laz"),
            LazBackend::Laszip => laszip::find_laszip_executable().is_some(),
        }
    }

    /// The available back-ends, in preference order (in-process first).
    pub fn detect_available() -> Vec<LazBackend> {
        [LazBackend::LazRs, LazBackend::Laszip]
            .into_iter()
            .filter(LazBackend::is_available)
            .collect()
    }
}

impl fmt::Display for LazBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LazBackend::LazRs => write!(f, "laz-rs"),
            LazBackend::Laszip => write!(f, "laszip process"),
        }
    }
}

/// Removes the laszip vlr from the list, if present.
pub(crate) fn extract_laszip_vlr(vlrs: &mut VlrList) -> Option<Vlr> {
    vlrs.remove(LASZIP_USER_ID, LASZIP_RECORD_ID)
}

/// Decompresses the point data of a compressed file into a raw buffer.
///
/// The source must be positioned at the start of the point data.
pub(crate) fn decompress_points<R: Read + Seek + Send + Sync>(
    source: &mut R,
    header: &Header,
    laszip_vlr: &Vlr,
    format: &PointFormat,
    backends: &[LazBackend],
) -> Result<Vec<u8>> {
    let mut last_error = "the back-end preference list is empty".to_string();
    for backend in backends {
        let result = match backend {
            #[cfg(feature = "laz")]
            LazBackend::LazRs => {
                lazrs::decompress(source, laszip_vlr, header.point_count, format.size())
            }
            #[cfg(not(feature = "laz"))]
            LazBackend::LazRs => Err(Error::Laz(
                "the in-process back-end is not compiled in (enable the `laz` feature)"
                    .to_string(),
            )),
            LazBackend::Laszip => {
                let _ = laszip_vlr;
                laszip::decompress(source, header.point_count, format.size())
            }
        };
        match result {
            Ok(bytes) => return Ok(bytes),
            Err(error) => {
                log::error!("laz back-end {} failed: {}", backend, error);
                last_error = error.to_string();
            }
        }
    }
    Err(Error::NoLazBackend { last_error })
}

/// Builds a compressing point writer around the destination.
///
/// Fallible probing (feature presence, executable discovery, process
/// spawning, laz item construction) happens before the destination is
/// committed, so a failed back-end falls through to the next one.
pub(crate) fn compressed_point_writer<W: 'static + Read + Write + Seek + Send + Truncate>(
    dest: W,
    format: &PointFormat,
    backends: &[LazBackend],
) -> Result<Box<dyn PointWriter<W> + Send>> {
    let mut last_error = "the back-end preference list is empty".to_string();
    for backend in backends {
        match backend {
            #[cfg(feature = "laz")]
            LazBackend::LazRs => match lazrs::laz_vlr_for_format(format) {
                Ok(laz_vlr) => {
                    return Ok(Box::new(lazrs::LazrsPointWriter::new(dest, laz_vlr)));
                }
                Err(error) => {
                    log::error!("laz back-end {} failed: {}", backend, error);
                    last_error = error.to_string();
                }
            },
            #[cfg(not(feature = "laz"))]
            LazBackend::LazRs => {
                let error = "the in-process back-end is not compiled in (enable the `laz` feature)";
                log::error!("laz back-end {} failed: {}", backend, error);
                last_error = error.to_string();
            }
            LazBackend::Laszip => match laszip::spawn_compressor() {
                Ok(child) => {
                    let _ = format;
                    return Ok(Box::new(laszip::LaszipProcessPointWriter::new(dest, child)));
                }
                Err(error) => {
                    log::error!("laz back-end {} failed: {}", backend, error);
                    last_error = error.to_string();
                }
            },
        }
    }
    Err(Error::NoLazBackend { last_error })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazrs_availability_follows_the_feature() {
        assert_eq!(cfg!(feature = "laz"), LazBackend::LazRs.is_available());
    }

    #[test]
    fn empty_preference_list_is_fatal() {
        let mut vlrs = VlrList::new();
        assert!(extract_laszip_vlr(&mut vlrs).is_none());
        let result = compressed_point_writer(
            std::io::Cursor::new(Vec::new()),
            &PointFormat::from_id(0).unwrap(),
            &[],
        );
        assert!(matches!(result, Err(Error::NoLazBackend { .. })));
    }
}
