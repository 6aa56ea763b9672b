use crate::feature::Feature;
use std::fmt;

/// Las version.
///
/// Defaults to 1.2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// The major version.
    ///
    /// Should always be 1.
    pub major: u8,

    /// The minor version.
    ///
    /// Should be between 0 and 4.
    pub minor: u8,
}

impl Version {
    /// Creates a new version.
    ///
    /// Doesn't do any checking that it's an actual las version.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::Version;
    /// let version = Version::new(1, 2);
    /// ```
    pub fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Is this version supported by this crate?
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::Version;
    /// assert!(Version::new(1, 2).is_supported());
    /// assert!(!Version::new(2, 0).is_supported());
    /// ```
    pub fn is_supported(&self) -> bool {
        self.major == 1 && self.minor <= 4
    }

    /// Returns this version's header size.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::Version;
    /// assert_eq!(227, Version::new(1, 2).header_size());
    /// assert_eq!(235, Version::new(1, 3).header_size());
    /// assert_eq!(375, Version::new(1, 4).header_size());
    /// ```
    pub fn header_size(&self) -> u16 {
        if self <= &Version::new(1, 2) {
            227
        } else if self == &Version::new(1, 3) {
            235
        } else {
            375
        }
    }

    /// Checks whether this version supports the feature.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::feature::Evlrs;
    /// use laspack::Version;
    /// assert!(Version::new(1, 4).supports::<Evlrs>());
    /// assert!(!Version::new(1, 2).supports::<Evlrs>());
    /// ```
    pub fn supports<F: Feature>(&self) -> bool {
        F::is_supported_by(*self)
    }

    /// Checks whether this version supports the given point format id.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::Version;
    /// assert!(Version::new(1, 2).supports_point_format(3));
    /// assert!(!Version::new(1, 2).supports_point_format(6));
    /// assert!(Version::new(1, 4).supports_point_format(6));
    /// ```
    pub fn supports_point_format(&self, point_format_id: u8) -> bool {
        if self.major != 1 {
            return false;
        }
        match self.minor {
            0 | 1 => point_format_id <= 1,
            2 => point_format_id <= 3,
            3 => point_format_id <= 5,
            4 => point_format_id <= 10,
            _ => false,
        }
    }
}

impl Default for Version {
    fn default() -> Version {
        Version { major: 1, minor: 2 }
    }
}

impl From<(u8, u8)> for Version {
    fn from((major, minor): (u8, u8)) -> Version {
        Version { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Version::new(1, 2) < Version::new(1, 4));
        assert!(Version::new(1, 4) <= Version::new(1, 4));
    }

    #[test]
    fn point_format_support() {
        assert!(Version::new(1, 0).supports_point_format(1));
        assert!(!Version::new(1, 0).supports_point_format(2));
        assert!(!Version::new(1, 2).supports_point_format(4));
        assert!(Version::new(1, 3).supports_point_format(5));
        assert!(Version::new(1, 4).supports_point_format(10));
        assert!(!Version::new(1, 4).supports_point_format(11));
    }
}
