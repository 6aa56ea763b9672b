//! Utility traits for the fixed-size string fields of headers and vlrs.

use crate::{Error, Result};

/// Interpret a fixed-size byte field as a las string.
///
/// Las strings are ascii, nul-terminated inside their slot. Bytes after the
/// first nul are ignored.
pub trait AsLasStr {
    /// Interprets the bytes as a nul-terminated string slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::utils::AsLasStr;
    /// let field = [b'h', b'i', 0, 0];
    /// assert_eq!("hi", field.as_ref().as_las_str().unwrap());
    /// ```
    fn as_las_str(&self) -> Result<&str>;
}

/// Write a string into a fixed-size byte field, zero-padding the rest.
pub trait FromLasStr {
    /// Copies the string into the field.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::utils::FromLasStr;
    /// let mut field = [0u8; 4];
    /// field.as_mut().from_las_str("hi").unwrap();
    /// assert_eq!([b'h', b'i', 0, 0], field);
    /// ```
    fn from_las_str(&mut self, s: &str) -> Result<()>;
}

impl AsLasStr for &'_ [u8] {
    fn as_las_str(&self) -> Result<&str> {
        let end = self.iter().position(|&b| b == 0).unwrap_or(self.len());
        Ok(std::str::from_utf8(&self[..end])?)
    }
}

impl FromLasStr for &'_ mut [u8] {
    fn from_las_str(&mut self, s: &str) -> Result<()> {
        if s.len() > self.len() {
            return Err(Error::StringTooLong {
                string: s.to_string(),
                len: self.len(),
            });
        }
        self[..s.len()].copy_from_slice(s.as_bytes());
        for byte in &mut self[s.len()..] {
            *byte = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_nuls() {
        let field = [b'o', b'k', 0, 0, 0];
        assert_eq!("ok", field.as_ref().as_las_str().unwrap());
    }

    #[test]
    fn full_slot_needs_no_nul() {
        let field = [b'f', b'u', b'l', b'l'];
        assert_eq!("full", field.as_ref().as_las_str().unwrap());
    }

    #[test]
    fn too_long() {
        let mut field = [0u8; 2];
        assert!(field.as_mut().from_las_str("nope").is_err());
    }

    #[test]
    fn overwrites_old_contents() {
        let mut field = [b'x'; 4];
        field.as_mut().from_las_str("ab").unwrap();
        assert_eq!([b'a', b'b', 0, 0], field);
    }
}
