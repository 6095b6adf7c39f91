//! Resampling tap generation
//!
//! Computes, for each output sample of a 1-D scale from `in_size` to
//! `out_size` elements, the input window it reads (`offset`, `n_taps`) and
//! the weights applied to that window. The weighted-sum loop itself belongs
//! to the caller; this module only produces the table.
//!
//! ## Kernels
//!
//! - **Nearest**: single tap, no half-pixel correction
//! - **Linear**: triangle filter
//! - **Cubic**: Mitchell-Netravali family, tuned with `cubic-b`/`cubic-c`
//! - **Sinc**: plain sinc truncated to the tap window
//! - **Lanczos**: sinc windowed by the sinc main lobe
//!
//! When downscaling the kernel is widened by `in_size / out_size` so it acts
//! as an anti-aliasing filter.
//!
//! ## Edges
//!
//! Every row is normalised to sum to 1. Taps that would read before the first
//! or after the last input sample are folded into the nearest in-bounds tap,
//! so edge samples keep their full weight and no row reads out of bounds.
//!
//! ## Usage
//!
//! ```rust
//! use zvd_shape::resampler::{ResamplerFlags, ResamplerMethod, ResamplerOptions, VideoResampler};
//!
//! let mut resampler = VideoResampler::new();
//! resampler
//!     .init(
//!         ResamplerMethod::Linear,
//!         ResamplerFlags::empty(),
//!         2,
//!         0,
//!         0.0,
//!         4,
//!         2,
//!         &ResamplerOptions::default(),
//!     )
//!     .unwrap();
//!
//! let input = [10.0, 20.0, 30.0, 40.0];
//! let table = resampler.table().unwrap();
//! let out: Vec<f64> = table.rows().map(|row| row.apply(&input)).collect();
//! assert_eq!(out.len(), 2);
//! assert!(table.rows().all(|row| row.offset + row.taps.len() <= 4));
//! ```

pub mod kernel;
pub mod options;

pub use options::ResamplerOptions;

use crate::error::{Error, Result};
use bitflags::bitflags;
use kernel::Kernel;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Interpolation kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResamplerMethod {
    /// Nearest neighbour
    Nearest,
    /// Linear interpolation
    Linear,
    /// Cubic interpolation
    Cubic,
    /// Sinc interpolation
    Sinc,
    /// Lanczos windowed sinc
    #[default]
    Lanczos,
}

impl ResamplerMethod {
    /// All methods, in order of increasing cost
    pub const ALL: [ResamplerMethod; 5] = [
        ResamplerMethod::Nearest,
        ResamplerMethod::Linear,
        ResamplerMethod::Cubic,
        ResamplerMethod::Sinc,
        ResamplerMethod::Lanczos,
    ];

    /// Support radius of the kernel in input samples at unit frequency
    fn envelope(self, options: &ResamplerOptions) -> f64 {
        match self {
            ResamplerMethod::Nearest | ResamplerMethod::Linear => 1.0,
            ResamplerMethod::Cubic => 2.0,
            ResamplerMethod::Sinc | ResamplerMethod::Lanczos => options.envelope,
        }
    }
}

impl fmt::Display for ResamplerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResamplerMethod::Nearest => "nearest",
            ResamplerMethod::Linear => "linear",
            ResamplerMethod::Cubic => "cubic",
            ResamplerMethod::Sinc => "sinc",
            ResamplerMethod::Lanczos => "lanczos",
        };
        f.write_str(name)
    }
}

impl FromStr for ResamplerMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResamplerMethod::Nearest),
            "linear" => Ok(ResamplerMethod::Linear),
            "cubic" => Ok(ResamplerMethod::Cubic),
            "sinc" => Ok(ResamplerMethod::Sinc),
            "lanczos" => Ok(ResamplerMethod::Lanczos),
            other => Err(Error::invalid_input(format!("unknown resampler method: {}", other))),
        }
    }
}

bitflags! {
    /// Tap generation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResamplerFlags: u32 {
        /// Use half the tap count when it is larger than 3
        const HALF_TAPS = 1 << 0;
    }
}

/// One output sample's filter: weights for `taps.len()` consecutive inputs
/// starting at `offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapRow<'a> {
    /// First input index read
    pub offset: usize,
    /// Phase of this row; equal to the output index
    pub phase: usize,
    /// Normalised weights
    pub taps: &'a [f64],
}

impl TapRow<'_> {
    /// Weighted sum of the input window this row reads
    ///
    /// # Panics
    ///
    /// Panics if `input` is shorter than `offset + taps.len()`.
    pub fn apply(&self, input: &[f64]) -> f64 {
        self.taps
            .iter()
            .zip(&input[self.offset..self.offset + self.taps.len()])
            .map(|(w, v)| w * v)
            .sum()
    }
}

/// Per-output-sample filter taps for one scale configuration
///
/// Taps are stored row-major in a flat array of `max_taps * out_size`
/// weights; row `j` starts at `j * max_taps`.
#[derive(Debug, Clone, PartialEq)]
pub struct TapTable {
    in_size: usize,
    out_size: usize,
    n_phases: usize,
    max_taps: usize,
    offsets: Vec<usize>,
    n_taps: Vec<usize>,
    phases: Vec<usize>,
    taps: Vec<f64>,
}

impl TapTable {
    /// Compute the table for scaling `in_size` elements to `out_size`
    ///
    /// `n_phases` must equal `out_size`: every output sample gets its own
    /// independently computed taps. `n_taps` is a hint, 0 picks a count from
    /// the kernel support. `shift` moves the sampling grid by that many
    /// output samples.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        method: ResamplerMethod,
        flags: ResamplerFlags,
        n_phases: usize,
        n_taps: usize,
        shift: f64,
        in_size: usize,
        out_size: usize,
        options: &ResamplerOptions,
    ) -> Result<Self> {
        if in_size == 0 {
            return Err(Error::config("in_size must be nonzero"));
        }
        if out_size == 0 {
            return Err(Error::config("out_size must be nonzero"));
        }
        if n_phases != out_size {
            return Err(Error::config(format!(
                "n_phases ({}) must equal out_size ({})",
                n_phases, out_size
            )));
        }

        let options = options.clamped();
        let scale = in_size as f64 / out_size as f64;
        let mut fx = if scale > 1.0 {
            options.sharpness / scale
        } else {
            options.sharpness
        };
        let envelope = method.envelope(&options);
        let half = flags.contains(ResamplerFlags::HALF_TAPS);

        let mut max_taps;
        let ex;
        if n_taps == 0 {
            max_taps = match method {
                ResamplerMethod::Nearest => 1,
                _ => {
                    let dx = (2.0 * envelope / fx).ceil();
                    (dx as usize).clamp(1, options.max_taps)
                }
            };
            if half && max_taps > 3 {
                max_taps /= 2;
            }
            fx = 2.0 * envelope / max_taps as f64;
            ex = 2.0 / max_taps as f64;
        } else {
            max_taps = n_taps.min(options.max_taps);
            if half && max_taps > 3 {
                max_taps /= 2;
            }
            ex = 2.0 / max_taps as f64;
        }
        let max_taps = max_taps.min(in_size);

        debug!(
            %method,
            n_taps_hint = n_taps,
            max_taps,
            shift,
            in_size,
            out_size,
            fx,
            "computing resampler taps"
        );

        let kernel = Kernel {
            method,
            fx,
            ex,
            b: options.cubic_b,
            c: options.cubic_c,
            sharpen: options.sharpen,
        };

        let mut offsets = Vec::with_capacity(out_size);
        let mut taps = vec![0.0; max_taps * out_size];
        for (j, row) in taps.chunks_exact_mut(max_taps).enumerate() {
            offsets.push(fill_row(row, &kernel, j, shift, in_size, out_size));
        }

        Ok(TapTable {
            in_size,
            out_size,
            n_phases,
            max_taps,
            offsets,
            n_taps: vec![max_taps; out_size],
            phases: (0..out_size).collect(),
            taps,
        })
    }

    /// Number of input samples
    pub fn in_size(&self) -> usize {
        self.in_size
    }

    /// Number of output samples
    pub fn out_size(&self) -> usize {
        self.out_size
    }

    /// Number of phases, equal to [`out_size`](TapTable::out_size)
    pub fn n_phases(&self) -> usize {
        self.n_phases
    }

    /// Row stride of the weight array
    pub fn max_taps(&self) -> usize {
        self.max_taps
    }

    /// First input index read by output `j`
    pub fn offset(&self, j: usize) -> usize {
        self.offsets[j]
    }

    /// Number of taps of output `j`
    pub fn n_taps(&self, j: usize) -> usize {
        self.n_taps[j]
    }

    /// Phase of output `j`
    pub fn phase(&self, j: usize) -> usize {
        self.phases[j]
    }

    /// Weights of output `j`
    pub fn taps(&self, j: usize) -> &[f64] {
        let start = j * self.max_taps;
        &self.taps[start..start + self.n_taps[j]]
    }

    /// Filter of output `j`
    pub fn row(&self, j: usize) -> TapRow<'_> {
        TapRow {
            offset: self.offsets[j],
            phase: self.phases[j],
            taps: self.taps(j),
        }
    }

    /// Filters of all outputs, in output order
    pub fn rows(&self) -> impl ExactSizeIterator<Item = TapRow<'_>> + '_ {
        (0..self.out_size).map(move |j| self.row(j))
    }

    /// The whole weight array, `max_taps` weights per row
    pub fn all_taps(&self) -> &[f64] {
        &self.taps
    }
}

/// Compute one output row in place and return its corrected offset
fn fill_row(
    row: &mut [f64],
    kernel: &Kernel,
    j: usize,
    shift: f64,
    in_size: usize,
    out_size: usize,
) -> usize {
    let max_taps = row.len();
    let tap_offs = ((max_taps - 1) / 2) as f64;
    let corr = if max_taps == 1 { 0.0 } else { 0.5 };

    // Centre of output sample j, in input coordinates
    let ox = (0.5 + j as f64 - shift) / out_size as f64;
    let x = (ox * in_size as f64 - corr).clamp(0.0, (in_size - 1) as f64);
    let xi = (x - tap_offs).floor() as i64;

    let mut weight = 0.0_f64;
    for (l, tap) in row.iter_mut().enumerate() {
        *tap = kernel.tap(l, xi, x);
        weight += *tap;
    }
    if weight.abs() < f64::EPSILON {
        // Every tap fell on a kernel zero; keep the sample closest to x
        let nearest = (x.round() as i64 - xi).clamp(0, max_taps as i64 - 1) as usize;
        row.fill(0.0);
        row[nearest] = 1.0;
    } else {
        for tap in row.iter_mut() {
            *tap /= weight;
        }
    }

    let mut offset = xi;
    if xi < 0 {
        let sh = (-xi) as usize;
        row[sh] = row[..=sh].iter().sum();
        row.copy_within(sh.., 0);
        row[max_taps - sh..].fill(0.0);
        offset += sh as i64;
    }

    let last_start = (in_size - max_taps) as i64;
    if xi > last_start {
        let sh = (xi - last_start) as usize;
        let keep = max_taps - sh;
        row[keep - 1] = row[keep - 1..].iter().sum();
        row.copy_within(..keep, sh);
        row[..sh].fill(0.0);
        offset -= sh as i64;
    }

    offset as usize
}

/// Owner of a [`TapTable`] that is rebuilt whenever the scale changes
#[derive(Debug, Default)]
pub struct VideoResampler {
    table: Option<TapTable>,
}

impl VideoResampler {
    /// Create a resampler with no table
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)compute the tap table
    ///
    /// See [`TapTable::compute`]. On failure the previous table, if any, is
    /// kept unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        method: ResamplerMethod,
        flags: ResamplerFlags,
        n_phases: usize,
        n_taps: usize,
        shift: f64,
        in_size: usize,
        out_size: usize,
        options: &ResamplerOptions,
    ) -> Result<()> {
        let table = TapTable::compute(
            method, flags, n_phases, n_taps, shift, in_size, out_size, options,
        )?;
        self.table = Some(table);
        Ok(())
    }

    /// Release the table
    pub fn clear(&mut self) {
        self.table = None;
    }

    /// The current table, if initialised
    pub fn table(&self) -> Option<&TapTable> {
        self.table.as_ref()
    }

    /// Check if a table is present
    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }
}
