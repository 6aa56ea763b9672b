use crate::{Error, Result};

/// A scale and an offset that transforms stored integers into coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The scale.
    pub scale: f64,
    /// The offset.
    pub offset: f64,
}

impl Transform {
    /// Applies this transform to a stored value, returning the coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(3., transform.direct(1.));
    /// ```
    pub fn direct(&self, n: f64) -> f64 {
        self.scale * n + self.offset
    }

    /// Applies the inverse transform and rounds the result.
    ///
    /// Rounding is round-half-away-from-zero (`f64::round`). The result is
    /// *not* range-checked; use [inverse_as](Transform::inverse_as) to cast
    /// into an integer type with a check.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(1., transform.inverse(2.9));
    /// ```
    pub fn inverse(&self, n: f64) -> f64 {
        ((n - self.offset) / self.scale).round()
    }

    /// Applies the inverse transform and casts into the target type.
    ///
    /// Returns [Error::ScaledValueOverflow] if the unscaled value does not
    /// fit.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspack::Transform;
    /// let transform = Transform { scale: 0.1, offset: 0. };
    /// let n: i32 = transform.inverse_as(1.5).unwrap();
    /// assert_eq!(15, n);
    /// assert!(transform.inverse_as::<i8>(100.0).is_err());
    /// ```
    pub fn inverse_as<T: num_traits::NumCast>(&self, n: f64) -> Result<T> {
        num_traits::cast(self.inverse(n)).ok_or(Error::ScaledValueOverflow(n))
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            scale: 1.,
            offset: 0.,
        }
    }
}
