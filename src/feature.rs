//! Programmatically determine whether a las version supports a feature.
//!
//! Features are structures that implement the [Feature] trait, checked via
//! [Version::supports]:
//!
//! ```
//! use laspack::feature::Evlrs;
//! use laspack::Version;
//!
//! assert!(!Version::new(1, 2).supports::<Evlrs>());
//! assert!(Version::new(1, 4).supports::<Evlrs>());
//! ```

use crate::Version;

const MAJOR: u8 = 1;

/// A trait implemented by each feature.
pub trait Feature {
    /// Is this feature supported by this version?
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::feature::{Feature, Waveforms};
    /// use laspack::Version;
    /// assert!(!Waveforms::is_supported_by(Version::new(1, 2)));
    /// assert!(Waveforms::is_supported_by(Version::new(1, 4)));
    /// ```
    fn is_supported_by(version: Version) -> bool;
}

macro_rules! features {
    (   $(
            $(#[$meta:meta])*
            $name:ident ($($versions:expr),+);
        )+
    ) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug)]
            pub struct $name {}

            impl Feature for $name {
                fn is_supported_by(version: Version) -> bool {
                    [$($versions),+]
                        .into_iter()
                        .map(|minor| Version::new(MAJOR, minor))
                        .any(|v| version == v)
                }
            }
        )+
    }
}

features! {
    /// Does this file have a header slot for the start of waveform data?
    Waveforms(3, 4);
    /// Does this file support 64-bit point counts?
    LargeFiles(4);
    /// Does this file support extended variable length records?
    Evlrs(4);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_files() {
        assert!(!LargeFiles::is_supported_by(Version::new(1, 3)));
        assert!(LargeFiles::is_supported_by(Version::new(1, 4)));
    }

    #[test]
    fn evlrs() {
        assert!(!Evlrs::is_supported_by(Version::new(1, 0)));
        assert!(Evlrs::is_supported_by(Version::new(1, 4)));
    }
}
