//! Interpolation kernels
//!
//! Each kernel maps the distance between a continuous source coordinate and
//! a candidate input sample to a raw (unnormalised) tap weight.

use super::ResamplerMethod;
use std::f64::consts::PI;

/// Normalised sinc, `sin(πt) / (πt)` with `sinc(0) = 1`
pub fn sinc(t: f64) -> f64 {
    if t == 0.0 {
        1.0
    } else {
        let pt = PI * t;
        pt.sin() / pt
    }
}

/// Lanczos window: the sinc main lobe, zero outside `(-1, 1)`
pub fn envelope(t: f64) -> f64 {
    if t.abs() < 1.0 {
        sinc(t)
    } else {
        0.0
    }
}

/// Mitchell-Netravali cubic with free parameters `b` and `c`
///
/// `a` is the absolute, frequency-scaled distance.
pub fn cubic(a: f64, b: f64, c: f64) -> f64 {
    let a2 = a * a;
    let a3 = a2 * a;
    if a < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * a3 + (-18.0 + 12.0 * b + 6.0 * c) * a2 + (6.0 - 2.0 * b))
            / 6.0
    } else if a < 2.0 {
        ((-b - 6.0 * c) * a3 + (6.0 * b + 30.0 * c) * a2 + (-12.0 * b - 48.0 * c) * a
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

/// Resolved kernel parameters for one resampler configuration
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kernel {
    pub method: ResamplerMethod,
    /// Frequency scale applied to sample distances
    pub fx: f64,
    /// Envelope scale for Lanczos
    pub ex: f64,
    pub b: f64,
    pub c: f64,
    pub sharpen: f64,
}

impl Kernel {
    /// Raw weight of tap `l` for a row starting at input `xi`, centred on `x`
    pub fn tap(&self, l: usize, xi: i64, x: f64) -> f64 {
        let d = x - (xi + l as i64) as f64;
        match self.method {
            ResamplerMethod::Nearest => 1.0,
            ResamplerMethod::Linear => (1.0 - d.abs() * self.fx).max(0.0),
            ResamplerMethod::Cubic => cubic(d.abs() * self.fx, self.b, self.c),
            ResamplerMethod::Sinc => sinc(d * self.fx),
            ResamplerMethod::Lanczos => (sinc(d * self.fx) - self.sharpen) * envelope(d * self.ex),
        }
    }
}
