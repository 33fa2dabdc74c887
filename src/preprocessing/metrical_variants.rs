//! Tempo-alias rewrites of an annotation sequence
//!
//! A beat tracker that taps on the off-beat, or at twice or half the annotated
//! tempo, is still following the music at a musically valid metrical level.
//! The allowed-metrical-level (AML) scores and downbeat evaluation compare the
//! estimates against each of these rewrites and keep the best result.
//!
//! All rewrites are built from linear interpolation at fractional annotation
//! indices. Beat-level rewrites drop positions past the last annotation;
//! bar-position rewrites of downbeats clamp them to the last downbeat. No
//! rewrite extrapolates.
//!
//! # Example
//!
//! ```
//! use stratum_eval::preprocessing::metrical_variants::MetricalVariants;
//!
//! let variants = MetricalVariants::from_annotations(&[5.0, 6.0, 7.0]);
//! assert_eq!(variants.double_tempo, vec![5.0, 5.5, 6.0, 6.5, 7.0]);
//! assert_eq!(variants.off_beat, vec![5.5, 6.5]);
//! assert_eq!(variants.half_tempo_odd, vec![5.0, 7.0]);
//! assert_eq!(variants.half_tempo_even, vec![6.0]);
//! ```

/// Allowed slack when comparing a fractional position with the last index
const POSITION_EPSILON: f64 = 1e-9;

/// Which half of the annotations a half-tempo rewrite keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfTempo {
    /// Annotations 0, 2, 4, ... (beats 1 and 3 of a 4/4 bar)
    Odd,
    /// Annotations 1, 3, 5, ... (beats 2 and 4 of a 4/4 bar)
    Even,
}

/// The five metrical interpretations of a beat annotation sequence
#[derive(Debug, Clone, PartialEq)]
pub struct MetricalVariants {
    /// The annotations unchanged
    pub original: Vec<f64>,
    /// Midpoints between consecutive annotations
    pub off_beat: Vec<f64>,
    /// Annotations and midpoints interleaved
    pub double_tempo: Vec<f64>,
    /// Every other annotation starting with the first
    pub half_tempo_odd: Vec<f64>,
    /// Every other annotation starting with the second
    pub half_tempo_even: Vec<f64>,
}

impl MetricalVariants {
    /// Labels matching the order of [`MetricalVariants::as_array`]
    pub const LABELS: [&'static str; 5] =
        ["original", "off_beat", "double_tempo", "half_tempo_odd", "half_tempo_even"];

    /// Build all five variants from an annotation sequence
    pub fn from_annotations(annotations: &[f64]) -> Self {
        Self {
            original: annotations.to_vec(),
            off_beat: off_beats(annotations),
            double_tempo: double_tempo(annotations),
            half_tempo_odd: half_tempo(annotations, HalfTempo::Odd),
            half_tempo_even: half_tempo(annotations, HalfTempo::Even),
        }
    }

    /// Variants in evaluation order; index 0 is the correct metrical level
    pub fn as_array(&self) -> [&[f64]; 5] {
        [
            &self.original,
            &self.off_beat,
            &self.double_tempo,
            &self.half_tempo_odd,
            &self.half_tempo_even,
        ]
    }
}

/// Linearly interpolate the sequence at fractional indices
///
/// Index `1.5` is halfway between the second and third events. Positions
/// outside `[0, len - 1]` are skipped.
pub fn interpolate_positions<I>(events: &[f64], positions: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    if events.is_empty() {
        return Vec::new();
    }
    let last = (events.len() - 1) as f64;

    positions
        .into_iter()
        .filter(|&x| x >= -POSITION_EPSILON && x <= last + POSITION_EPSILON)
        .map(|x| value_at(events, x))
        .collect()
}

/// Like [`interpolate_positions`], but positions outside `[0, len - 1]` take
/// the value of the nearest end event, so every position yields one value
pub fn interpolate_positions_clamped<I>(events: &[f64], positions: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    if events.is_empty() {
        return Vec::new();
    }
    positions.into_iter().map(|x| value_at(events, x)).collect()
}

/// Interpolated value at fractional index `x`; `events` must be non-empty
fn value_at(events: &[f64], x: f64) -> f64 {
    let x = x.clamp(0.0, (events.len() - 1) as f64);
    let lower = x.floor() as usize;
    let frac = x - lower as f64;
    if frac <= POSITION_EPSILON || lower + 1 >= events.len() {
        events[lower]
    } else {
        events[lower] + frac * (events[lower + 1] - events[lower])
    }
}

/// Subdivide every inter-event interval into `factor` equal parts
///
/// `factor = 2.0` doubles the tempo. A factor below one thins the sequence
/// out instead (`0.5` keeps every other event).
pub fn subdivide(events: &[f64], factor: f64) -> Vec<f64> {
    if events.is_empty() || !(factor > 0.0) {
        return Vec::new();
    }
    let last = (events.len() - 1) as f64;
    let count = (last * factor + POSITION_EPSILON).floor() as usize + 1;
    interpolate_positions(events, (0..count).map(|j| j as f64 / factor))
}

/// Annotations at double tempo: `2n - 1` events
pub fn double_tempo(annotations: &[f64]) -> Vec<f64> {
    subdivide(annotations, 2.0)
}

/// Off-beat positions: the interpolated midpoints only
pub fn off_beats(annotations: &[f64]) -> Vec<f64> {
    annotations
        .windows(2)
        .map(|pair| pair[0] + 0.5 * (pair[1] - pair[0]))
        .collect()
}

/// Every other annotation
pub fn half_tempo(annotations: &[f64], half: HalfTempo) -> Vec<f64> {
    let start = match half {
        HalfTempo::Odd => 0,
        HalfTempo::Even => 1,
    };
    annotations.iter().skip(start).step_by(2).copied().collect()
}

/// Bar-position interpretations of a downbeat sequence
///
/// Variant `k` places the downbeat `k` beats into each annotated bar, with
/// the bar split into `beats_per_bar` equal beats. Variant 0 is the
/// annotation sequence itself. Every variant has one event per downbeat: the
/// final bar has no following downbeat to split against, so for `k > 0` its
/// shifted position is clamped to the last downbeat.
pub fn bar_position_variants(downbeats: &[f64], beats_per_bar: usize) -> Vec<Vec<f64>> {
    let beats_per_bar = beats_per_bar.max(1);
    (0..beats_per_bar)
        .map(|k| {
            let offset = k as f64 / beats_per_bar as f64;
            interpolate_positions_clamped(
                downbeats,
                (0..downbeats.len()).map(|j| j as f64 + offset),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn test_double_tempo_interleaves_midpoints() {
        let doubled = double_tempo(&[5.0, 6.0, 8.0]);
        assert_close(&doubled, &[5.0, 5.5, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_off_beats_are_odd_entries_of_double_tempo() {
        let annotations = [5.0, 5.6, 6.1, 6.9, 7.4];
        let doubled = double_tempo(&annotations);
        let odd: Vec<f64> = doubled.iter().skip(1).step_by(2).copied().collect();
        assert_close(&off_beats(&annotations), &odd);
    }

    #[test]
    fn test_half_tempo_parities() {
        let annotations = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(half_tempo(&annotations, HalfTempo::Odd), vec![1.0, 3.0, 5.0]);
        assert_eq!(half_tempo(&annotations, HalfTempo::Even), vec![2.0, 4.0]);
    }

    #[test]
    fn test_degenerate_sequences() {
        let variants = MetricalVariants::from_annotations(&[]);
        assert!(variants.as_array().iter().all(|v| v.is_empty()));

        let variants = MetricalVariants::from_annotations(&[7.0]);
        assert_eq!(variants.double_tempo, vec![7.0]);
        assert!(variants.off_beat.is_empty());
        assert!(variants.half_tempo_even.is_empty());
    }

    #[test]
    fn test_bar_position_variants_clamp_to_last_downbeat() {
        let downbeats = [10.0, 12.0, 14.0];
        let variants = bar_position_variants(&downbeats, 4);
        assert_eq!(variants.len(), 4);
        assert_close(&variants[0], &downbeats);
        assert_close(&variants[1], &[10.5, 12.5, 14.0]);
        assert_close(&variants[3], &[11.5, 13.5, 14.0]);
        assert!(variants.iter().all(|v| v.len() == downbeats.len()));
    }

    #[test]
    fn test_subdivide_factors() {
        let events = [0.0, 1.0, 2.0];
        assert_close(&subdivide(&events, 1.0), &events);
        assert_close(&subdivide(&events, 0.5), &[0.0, 2.0]);
        assert_close(
            &subdivide(&events, 1.5),
            &[0.0, 2.0 / 3.0, 4.0 / 3.0, 2.0],
        );
        assert!(subdivide(&events, 0.0).is_empty());
    }

    #[test]
    fn test_interpolate_skips_out_of_range() {
        let values = interpolate_positions(&[1.0, 3.0], [-0.5, 0.0, 0.25, 1.0, 1.5]);
        assert_close(&values, &[1.0, 1.5, 3.0]);
    }

    #[test]
    fn test_interpolate_clamped_keeps_every_position() {
        let values = interpolate_positions_clamped(&[1.0, 3.0], [-0.5, 0.25, 1.5]);
        assert_close(&values, &[1.0, 1.5, 3.0]);
        assert!(interpolate_positions_clamped(&[], [0.0]).is_empty());
    }

    #[test]
    fn test_labels_follow_variant_order() {
        let variants = MetricalVariants::from_annotations(&[5.0, 6.0, 7.0]);
        let labelled: Vec<(&str, usize)> = MetricalVariants::LABELS
            .iter()
            .zip(variants.as_array())
            .map(|(label, v)| (*label, v.len()))
            .collect();
        assert_eq!(
            labelled,
            vec![
                ("original", 3),
                ("off_beat", 2),
                ("double_tempo", 5),
                ("half_tempo_odd", 2),
                ("half_tempo_even", 1),
            ]
        );
    }
}
