//! Fixed-band energy estimation over analyser byte spectra.
//!
//! The analyser delivers one byte (0..=255) per frequency bin for the mixed
//! signal and, optionally, for the left and right channels. Each frame is
//! reduced to one average per configured band plus a stereo pan; nothing
//! carries over between frames.

use std::ops::Range;

use crate::config::BandSpec;
use crate::constants::{BYTE_MAX, PAN_MIN_ENERGY};
use crate::error::FrameError;

pub const BAND_COUNT: usize = 5;

/// Named energy channels. Three-band layouts fold "bass" into `SubBass`,
/// "mid" into `LowMid` and keep `High`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Band {
    SubBass,
    LowBass,
    LowMid,
    HighMid,
    High,
}

impl Band {
    pub const ALL: [Band; BAND_COUNT] = [
        Band::SubBass,
        Band::LowBass,
        Band::LowMid,
        Band::HighMid,
        Band::High,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Band::SubBass => "sub",
            Band::LowBass => "low",
            Band::LowMid => "lmid",
            Band::HighMid => "hmid",
            Band::High => "high",
        }
    }
}

/// One frame of analyser output, borrowed from the caller's buffers.
#[derive(Clone, Copy, Debug)]
pub struct SpectrumSnapshot<'a> {
    pub combined: &'a [u8],
    pub left: Option<&'a [u8]>,
    pub right: Option<&'a [u8]>,
    pub sample_rate: f32,
}

impl<'a> SpectrumSnapshot<'a> {
    pub fn mono(combined: &'a [u8], sample_rate: f32) -> Self {
        Self {
            combined,
            left: None,
            right: None,
            sample_rate,
        }
    }

    pub fn stereo(combined: &'a [u8], left: &'a [u8], right: &'a [u8], sample_rate: f32) -> Self {
        Self {
            combined,
            left: Some(left),
            right: Some(right),
            sample_rate,
        }
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.combined.len()
    }

    /// Normalised magnitude of one combined bin, 0 outside the snapshot.
    #[inline]
    pub fn bin(&self, index: usize) -> f32 {
        self.combined
            .get(index)
            .map_or(0.0, |&v| v as f32 / BYTE_MAX)
    }
}

/// Per-band averages and pans for a single frame. Bands absent from the
/// layout read as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandEnergies {
    pub averages: [f32; BAND_COUNT],
    pub pans: [f32; BAND_COUNT],
    pub present: [bool; BAND_COUNT],
}

impl BandEnergies {
    #[inline]
    pub fn get(&self, band: Band) -> f32 {
        self.averages[band.index()]
    }

    #[inline]
    pub fn pan(&self, band: Band) -> f32 {
        self.pans[band.index()]
    }

    #[inline]
    pub fn is_present(&self, band: Band) -> bool {
        self.present[band.index()]
    }

    /// Mean of the configured bands.
    pub fn overall(&self) -> f32 {
        let (sum, n) = Band::ALL
            .iter()
            .filter(|b| self.is_present(**b))
            .fold((0.0, 0usize), |(s, n), b| (s + self.get(*b), n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f32
        }
    }

    /// Energy-weighted stereo position across all bands, in [-1, 1].
    pub fn weighted_pan(&self) -> f32 {
        let mut num = 0.0;
        let mut den = 0.0;
        for b in Band::ALL {
            num += self.pan(b) * self.get(b);
            den += self.get(b);
        }
        if den > PAN_MIN_ENERGY {
            (num / den).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Split `bin_count` bins into contiguous ranges by the bands' upper edges.
/// Hz per bin is `sample_rate / (2 * bin_count)`.
pub fn band_bin_ranges(bands: &[BandSpec], bin_count: usize, sample_rate: f32) -> Vec<Range<usize>> {
    let hz_per_bin = (sample_rate / (2.0 * bin_count.max(1) as f32)).max(f32::EPSILON);
    let mut start = 0usize;
    bands
        .iter()
        .map(|spec| {
            let end = if spec.upper_hz.is_finite() {
                ((spec.upper_hz / hz_per_bin).floor() as usize)
                    .saturating_add(1)
                    .min(bin_count)
            } else {
                bin_count
            };
            let end = end.max(start);
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

pub struct FrequencyBandAnalyzer {
    bands: Vec<BandSpec>,
    ranges: Vec<Range<usize>>,
    cached_bins: usize,
    cached_rate: f32,
}

impl FrequencyBandAnalyzer {
    pub fn new(bands: Vec<BandSpec>) -> Self {
        Self {
            bands,
            ranges: Vec::new(),
            cached_bins: 0,
            cached_rate: 0.0,
        }
    }

    pub fn bands(&self) -> &[BandSpec] {
        &self.bands
    }

    /// Bin range of `band` for the most recently analysed snapshot shape.
    pub fn bin_range(&self, band: Band) -> Option<Range<usize>> {
        self.bands
            .iter()
            .position(|s| s.band == band)
            .and_then(|i| self.ranges.get(i).cloned())
    }

    fn refresh_ranges(&mut self, bin_count: usize, sample_rate: f32) {
        if bin_count != self.cached_bins || sample_rate != self.cached_rate {
            self.ranges = band_bin_ranges(&self.bands, bin_count, sample_rate);
            self.cached_bins = bin_count;
            self.cached_rate = sample_rate;
        }
    }

    pub fn analyze(&mut self, snapshot: &SpectrumSnapshot<'_>) -> Result<BandEnergies, FrameError> {
        let bins = snapshot.bin_count();
        for (channel, data) in [("left", snapshot.left), ("right", snapshot.right)] {
            if let Some(d) = data {
                if d.len() != bins {
                    return Err(FrameError::ChannelLength {
                        channel,
                        got: d.len(),
                        expected: bins,
                    });
                }
            }
        }
        self.refresh_ranges(bins, snapshot.sample_rate);

        let mut out = BandEnergies::default();
        for (spec, range) in self.bands.iter().zip(self.ranges.iter()) {
            let idx = spec.band.index();
            out.present[idx] = true;
            let width = range.len().max(1) as f32;
            let norm = width * BYTE_MAX;
            out.averages[idx] = byte_sum(snapshot.combined, range) / norm * spec.intensity;

            if let (Some(l), Some(r)) = (snapshot.left, snapshot.right) {
                let left = byte_sum(l, range) / norm;
                let right = byte_sum(r, range) / norm;
                out.pans[idx] = stereo_pan(left, right);
            }
        }
        Ok(out)
    }
}

#[inline]
fn byte_sum(data: &[u8], range: &Range<usize>) -> f32 {
    data.get(range.clone())
        .map_or(0, |s| s.iter().map(|&v| v as u32).sum::<u32>()) as f32
}

/// `(right - left) / (left + right)`, or 0 when both sides are near silent.
#[inline]
pub fn stereo_pan(left: f32, right: f32) -> f32 {
    let total = left + right;
    if total > PAN_MIN_ENERGY {
        ((right - left) / total).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
