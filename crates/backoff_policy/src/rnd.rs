// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Where jitter draws its position within the band.
///
/// Jitter exists so that many callers failing at the same moment do not retry
/// in lockstep. Predictability across callers is harmless, so the
/// non-cryptographic `fastrand` generator is enough. Tests pin the position to
/// hit the band edges exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) enum Rnd {
    #[default]
    Fastrand,

    /// Always lands on the same position, `0.0` being the low edge and `1.0` the high edge.
    #[cfg(test)]
    Fixed(f64),
}

impl Rnd {
    #[cfg(test)]
    pub fn new_fixed(position: f64) -> Self {
        Self::Fixed(position)
    }

    /// Relative position within the band, in `[0.0, 1.0)` for real draws.
    fn position(self) -> f64 {
        match self {
            Self::Fastrand => fastrand::f64(),
            #[cfg(test)]
            Self::Fixed(position) => position,
        }
    }

    /// Picks a value in `[low, high]`; an empty band yields `low` without drawing.
    pub fn in_band(self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }

        (high - low).mul_add(self.position(), low)
    }
}
