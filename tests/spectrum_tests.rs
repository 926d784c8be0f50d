// Host-side tests for spectrum banding and stereo pan.

use swarm_core::config::{BandSpec, SwarmConfig};
use swarm_core::spectrum::{band_bin_ranges, stereo_pan, FrequencyBandAnalyzer};
use swarm_core::{Band, FrameError, Preset, SpectrumSnapshot};

const RATE: f32 = 44_100.0;
const BINS: usize = 1024;

fn five_band_analyzer() -> FrequencyBandAnalyzer {
    FrequencyBandAnalyzer::new(SwarmConfig::from_preset(Preset::Swarm).bands)
}

#[test]
fn silent_spectrum_yields_exact_zeros() {
    let mut analyzer = five_band_analyzer();
    let zeros = vec![0u8; BINS];
    let e = analyzer
        .analyze(&SpectrumSnapshot::stereo(&zeros, &zeros, &zeros, RATE))
        .unwrap();
    for band in Band::ALL {
        assert_eq!(e.get(band), 0.0, "{:?} should be silent", band);
        assert_eq!(e.pan(band), 0.0, "{:?} pan should default to 0", band);
    }
}

#[test]
fn empty_snapshot_does_not_divide_by_zero() {
    let mut analyzer = five_band_analyzer();
    let e = analyzer.analyze(&SpectrumSnapshot::mono(&[], RATE)).unwrap();
    for band in Band::ALL {
        assert!(e.get(band).is_finite());
        assert_eq!(e.get(band), 0.0);
    }
}

#[test]
fn bin_ranges_follow_hz_edges() {
    let bands = SwarmConfig::from_preset(Preset::Swarm).bands;
    let ranges = band_bin_ranges(&bands, BINS, RATE);
    // 44100 / 2048 = 21.53 Hz per bin
    assert_eq!(ranges[0], 0..3, "sub-bass covers 0..=60 Hz");
    assert_eq!(ranges[1], 3..12, "low-bass up to 250 Hz");
    assert_eq!(ranges[2].end, 24);
    assert_eq!(ranges[3].end, 93);
    assert_eq!(ranges[4].end, BINS, "last band runs to the top bin");
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].end, pair[1].start, "ranges must be contiguous");
    }
}

#[test]
fn full_sub_bass_hits_intensity_ceiling() {
    let mut analyzer = five_band_analyzer();
    let mut bins = vec![0u8; BINS];
    bins[..3].fill(255);
    let e = analyzer.analyze(&SpectrumSnapshot::mono(&bins, RATE)).unwrap();
    assert!((e.get(Band::SubBass) - 1.0).abs() < 1e-6, "got {}", e.get(Band::SubBass));
    assert_eq!(e.get(Band::LowBass), 0.0);
    assert_eq!(e.get(Band::High), 0.0);
    assert_eq!(analyzer.bin_range(Band::SubBass), Some(0..3));
}

#[test]
fn intensity_weight_scales_average() {
    let mut analyzer = five_band_analyzer();
    let bins = vec![255u8; BINS];
    let e = analyzer.analyze(&SpectrumSnapshot::mono(&bins, RATE)).unwrap();
    // high band is weighted 1.6 in the five-band layout
    assert!((e.get(Band::High) - 1.6).abs() < 1e-5);
    assert!(e.get(Band::LowMid) >= 1.0);
}

#[test]
fn averages_are_never_negative() {
    let mut analyzer = five_band_analyzer();
    let bins: Vec<u8> = (0..BINS).map(|i| (i * 37 % 256) as u8).collect();
    let e = analyzer.analyze(&SpectrumSnapshot::mono(&bins, RATE)).unwrap();
    for band in Band::ALL {
        assert!(e.get(band) >= 0.0);
    }
}

#[test]
fn three_band_layout_leaves_missing_bands_absent() {
    let mut analyzer = FrequencyBandAnalyzer::new(SwarmConfig::from_preset(Preset::Ribbon).bands);
    let bins = vec![128u8; BINS];
    let e = analyzer.analyze(&SpectrumSnapshot::mono(&bins, RATE)).unwrap();
    assert!(e.is_present(Band::SubBass));
    assert!(!e.is_present(Band::LowBass));
    assert!(!e.is_present(Band::HighMid));
    assert_eq!(e.get(Band::HighMid), 0.0);
    assert!(e.overall() > 0.0);
}

#[test]
fn pan_follows_louder_channel() {
    let mut analyzer = five_band_analyzer();
    let combined = vec![100u8; BINS];
    let left = vec![0u8; BINS];
    let right = vec![200u8; BINS];
    let e = analyzer
        .analyze(&SpectrumSnapshot::stereo(&combined, &left, &right, RATE))
        .unwrap();
    assert!((e.pan(Band::SubBass) - 1.0).abs() < 1e-6, "fully right");
    assert!(e.weighted_pan() > 0.99);
}

#[test]
fn pan_formula_and_silence_floor() {
    assert!((stereo_pan(0.25, 0.75) - 0.5).abs() < 1e-6);
    assert!((stereo_pan(0.75, 0.25) + 0.5).abs() < 1e-6);
    assert_eq!(stereo_pan(0.004, 0.005), 0.0, "below 0.01 total is centred");
}

#[test]
fn mismatched_channel_length_is_a_frame_error() {
    let mut analyzer = five_band_analyzer();
    let combined = vec![0u8; BINS];
    let short = vec![0u8; BINS / 2];
    let err = analyzer
        .analyze(&SpectrumSnapshot::stereo(&combined, &short, &combined, RATE))
        .unwrap_err();
    assert_eq!(
        err,
        FrameError::ChannelLength {
            channel: "left",
            got: BINS / 2,
            expected: BINS
        }
    );
}

#[test]
fn huge_band_edges_saturate_to_the_last_bin() {
    let bands = [
        BandSpec::new(Band::SubBass, f32::MAX, 1.0, 0.5),
        BandSpec::new(Band::High, f32::INFINITY, 1.0, 0.5),
    ];
    let ranges = band_bin_ranges(&bands, BINS, RATE);
    assert_eq!(ranges, vec![0..BINS, BINS..BINS]);

    // near-zero sample rate pushes every finite edge past the end
    let ranges = band_bin_ranges(&SwarmConfig::from_preset(Preset::Swarm).bands, BINS, 1e-30);
    assert_eq!(ranges[0], 0..BINS);
    assert!(ranges[1..].iter().all(|r| r.is_empty()));
}
