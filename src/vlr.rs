//! Variable length records.
//!
//! Vlrs carry metadata that doesn't fit the fixed header: coordinate system
//! descriptions, extra bytes declarations, the laszip record, and anything
//! else a producer cares to attach. Unknown vlrs pass through this crate
//! untouched.
//!
//! ```
//! use laspack::Vlr;
//!
//! let mut vlr = Vlr::default();
//! vlr.user_id = "laspack".to_string();
//! vlr.record_id = 42;
//! vlr.data = vec![1, 2, 3];
//! ```

use crate::point::{ExtraBytesVlr, ExtraDimension};
use crate::raw::vlr::RecordLength;
use crate::utils::{AsLasStr, FromLasStr};
use crate::{compression, raw, Error, Result};
use std::io::{Read, Write};

/// A variable length record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vlr {
    /// ASCII data identifying the source of the record.
    pub user_id: String,

    /// The record id, scoped by the user id.
    pub record_id: u16,

    /// A textual description of the record.
    pub description: String,

    /// The payload.
    pub data: Vec<u8>,
}

impl Vlr {
    /// Creates a vlr from a raw vlr.
    pub fn from_raw(raw: raw::Vlr) -> Result<Vlr> {
        Ok(Vlr {
            user_id: raw.user_id.as_ref().as_las_str()?.to_string(),
            record_id: raw.record_id,
            description: raw.description.as_ref().as_las_str()?.to_string(),
            data: raw.data,
        })
    }

    /// Converts this vlr into a raw vlr, extended or regular.
    ///
    /// Fails with [Error::VlrDataTooLong] if the payload exceeds a regular
    /// vlr's 16 bit length field.
    pub fn into_raw(&self, extended: bool) -> Result<raw::Vlr> {
        let record_length_after_header = if extended {
            RecordLength::Evlr(self.data.len() as u64)
        } else {
            let length =
                u16::try_from(self.data.len()).map_err(|_| Error::VlrDataTooLong(self.data.len()))?;
            RecordLength::Vlr(length)
        };
        let mut user_id = [0; 16];
        user_id.as_mut().from_las_str(&self.user_id)?;
        let mut description = [0; 32];
        description.as_mut().from_las_str(&self.description)?;
        Ok(raw::Vlr {
            reserved: 0,
            user_id,
            record_id: self.record_id,
            record_length_after_header,
            description,
            data: self.data.clone(),
        })
    }

    /// The number of bytes this vlr occupies on disk, header included.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::Vlr;
    /// let mut vlr = Vlr::default();
    /// vlr.data = vec![0; 10];
    /// assert_eq!(64, vlr.len(false));
    /// assert_eq!(70, vlr.len(true));
    /// ```
    pub fn len(&self, extended: bool) -> u64 {
        let header = if extended {
            raw::Vlr::EXTENDED_HEADER_SIZE
        } else {
            raw::Vlr::HEADER_SIZE
        };
        header + self.data.len() as u64
    }

    /// Is this the laszip vlr?
    pub fn is_laszip(&self) -> bool {
        self.user_id == compression::LASZIP_USER_ID && self.record_id == compression::LASZIP_RECORD_ID
    }

    /// Is this the extra bytes vlr?
    pub fn is_extra_bytes(&self) -> bool {
        self.user_id == ExtraBytesVlr::USER_ID && self.record_id == ExtraBytesVlr::RECORD_ID
    }

    /// Is this the WKT coordinate system vlr?
    pub fn is_wkt_coordinate_system(&self) -> bool {
        self.user_id == "LASF_Projection" && self.record_id == 2112
    }

    /// Is this a classification lookup vlr?
    pub fn is_classification_lookup(&self) -> bool {
        self.user_id == "LASF_Spec" && self.record_id == 0
    }
}

/// An ordered list of vlrs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VlrList(Vec<Vlr>);

impl VlrList {
    /// Creates an empty list.
    pub fn new() -> VlrList {
        VlrList(Vec::new())
    }

    /// The number of vlrs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the list empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a vlr.
    pub fn push(&mut self, vlr: Vlr) {
        self.0.push(vlr);
    }

    /// Iterates over the vlrs.
    pub fn iter(&self) -> std::slice::Iter<'_, Vlr> {
        self.0.iter()
    }

    /// Returns the first vlr with this user id and record id.
    pub fn get(&self, user_id: &str, record_id: u16) -> Option<&Vlr> {
        self.0
            .iter()
            .find(|vlr| vlr.user_id == user_id && vlr.record_id == record_id)
    }

    /// Removes and returns the first vlr with this user id and record id.
    pub fn remove(&mut self, user_id: &str, record_id: u16) -> Option<Vlr> {
        let index = self
            .0
            .iter()
            .position(|vlr| vlr.user_id == user_id && vlr.record_id == record_id)?;
        Some(self.0.remove(index))
    }

    /// The total number of bytes the list occupies on disk.
    ///
    /// Vlr headers are 54 bytes, evlr headers 60.
    pub fn total_size_in_bytes(&self, extended: bool) -> u64 {
        self.0.iter().map(|vlr| vlr.len(extended)).sum()
    }

    /// Reads `count` vlrs from the stream.
    pub fn read_from<R: Read>(mut read: R, count: u32, extended: bool) -> Result<VlrList> {
        let mut vlrs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            vlrs.push(Vlr::from_raw(raw::Vlr::read_from(&mut read, extended)?)?);
        }
        Ok(VlrList(vlrs))
    }

    /// Writes every vlr to the stream, in list order.
    pub fn write_to<W: Write>(&self, mut write: W, extended: bool) -> Result<()> {
        for vlr in &self.0 {
            vlr.into_raw(extended)?.write_to(&mut write)?;
        }
        Ok(())
    }

    /// Parses the extra bytes vlr, if present, into its declared dimensions.
    pub fn extra_bytes_dimensions(&self) -> Result<Vec<ExtraDimension>> {
        match self.0.iter().find(|vlr| vlr.is_extra_bytes()) {
            Some(vlr) => Ok(ExtraBytesVlr::try_from_vlr(vlr)?.dimensions),
            None => Ok(Vec::new()),
        }
    }
}

impl From<Vec<Vlr>> for VlrList {
    fn from(vlrs: Vec<Vlr>) -> VlrList {
        VlrList(vlrs)
    }
}

impl IntoIterator for VlrList {
    type Item = Vlr;
    type IntoIter = std::vec::IntoIter<Vlr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn vlr(user_id: &str, record_id: u16) -> Vlr {
        Vlr {
            user_id: user_id.to_string(),
            record_id,
            description: String::new(),
            data: vec![record_id as u8],
        }
    }

    #[test]
    fn get_and_remove() {
        let mut vlrs = VlrList::from(vec![vlr("a", 1), vlr("b", 2)]);
        assert!(vlrs.get("a", 1).is_some());
        assert!(vlrs.get("a", 2).is_none());
        assert_eq!(vlr("b", 2), vlrs.remove("b", 2).unwrap());
        assert_eq!(1, vlrs.len());
    }

    #[test]
    fn total_size() {
        let vlrs = VlrList::from(vec![vlr("a", 1), vlr("b", 2)]);
        assert_eq!(2 * 55, vlrs.total_size_in_bytes(false));
        assert_eq!(2 * 61, vlrs.total_size_in_bytes(true));
    }

    #[test]
    fn list_roundtrip() {
        let vlrs = VlrList::from(vec![vlr("a", 1), vlr("b", 2)]);
        let mut cursor = Cursor::new(Vec::new());
        vlrs.write_to(&mut cursor, false).unwrap();
        cursor.set_position(0);
        assert_eq!(vlrs, VlrList::read_from(cursor, 2, false).unwrap());
    }

    #[test]
    fn too_long_for_regular_vlr() {
        let mut vlr = Vlr::default();
        vlr.data = vec![0; usize::from(u16::MAX) + 1];
        assert!(vlr.into_raw(false).is_err());
        assert!(vlr.into_raw(true).is_ok());
    }

    #[test]
    fn known_vlrs() {
        let mut vlr = Vlr::default();
        assert!(!vlr.is_laszip());
        vlr.user_id = "laszip encoded".to_string();
        vlr.record_id = 22204;
        assert!(vlr.is_laszip());
        vlr.user_id = "LASF_Spec".to_string();
        vlr.record_id = 4;
        assert!(vlr.is_extra_bytes());
    }
}
