//! One-dimensional track solver.
//!
//! Resolves a sequence of `(min, max, resize override, fill weight)` tracks
//! and an available pixel extent into resolved pixel widths. Used once per
//! axis for every container.

/// Solver input for one track position, in cell units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackInput {
    pub min: f32,
    pub max: f32,
    /// User-adjusted absolute size. Pins the track to exactly this size.
    pub resize: Option<f32>,
    /// Overrides the default `(max - min)` distribution weight.
    pub fill: Option<f32>,
}

impl TrackInput {
    /// Missing positions resolve as a one-cell track.
    pub const DEFAULT: TrackInput = TrackInput::new(1.0, 1.0);

    pub const fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            resize: None,
            fill: None,
        }
    }

    /// Pixel bounds after sanitizing: negatives become zero, `max >= min`, and
    /// a resize override replaces both bounds.
    pub fn bounds_px(&self, cell: i32) -> (i32, i32) {
        if let Some(size) = self.resize {
            let px = cells_to_px(size, cell);
            return (px, px);
        }
        let min = cells_to_px(self.min, cell);
        let max = cells_to_px(self.max, cell).max(min);
        (min, max)
    }
}

impl Default for TrackInput {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Converts cells to pixels, rounding half away from zero.
///
/// A positive cell value never collapses to zero pixels; zero, negative and
/// NaN inputs resolve to zero.
pub fn cells_to_px(value: f32, cell: i32) -> i32 {
    if !(value > 0.0) {
        return 0;
    }
    let px = (value * cell.max(0) as f32).round();
    if px >= i32::MAX as f32 {
        i32::MAX / 4
    } else {
        (px as i32).max(1)
    }
}

/// Fills the gaps of a sparse `(position, track)` list with the default
/// one-cell track. The result has at least `min_len` entries.
pub fn densify<I>(sparse: I, min_len: usize) -> Vec<TrackInput>
where
    I: IntoIterator<Item = (usize, TrackInput)>,
{
    let mut out = vec![TrackInput::DEFAULT; min_len];
    for (pos, track) in sparse {
        if pos >= out.len() {
            out.resize(pos + 1, TrackInput::DEFAULT);
        }
        out[pos] = track;
    }
    out
}

/// Resolves `tracks` against an available `extent` in pixels.
///
/// Every track starts at its minimum. Surplus pixels are spread
/// proportionally to each track's weight over the tracks still below their
/// maximum, round after round, until either the surplus is gone or every
/// track is saturated. When the minima alone do not fit, they are returned
/// unchanged and the caller decides whether to scroll.
pub fn solve(extent: i32, cell: i32, tracks: &[TrackInput]) -> Vec<i32> {
    let bounds: Vec<(i32, i32)> = tracks.iter().map(|t| t.bounds_px(cell)).collect();
    let mut out: Vec<i32> = bounds.iter().map(|b| b.0).collect();

    let total_min: i64 = out.iter().map(|&v| v as i64).sum();
    let mut remaining = extent as i64 - total_min;
    if remaining <= 0 {
        return out;
    }

    let weight = |i: usize| -> f64 {
        match tracks[i].fill {
            Some(w) if w > 0.0 => w as f64,
            Some(_) => 0.0,
            None => (bounds[i].1 - bounds[i].0) as f64,
        }
    };

    loop {
        let active: Vec<usize> = (0..out.len())
            .filter(|&i| out[i] < bounds[i].1 && weight(i) > 0.0)
            .collect();
        if active.is_empty() || remaining <= 0 {
            break;
        }

        let total_weight: f64 = active.iter().map(|&i| weight(i)).sum();
        let mut given: i64 = 0;
        for &i in &active {
            let room = (bounds[i].1 - out[i]) as i64;
            let share = ((remaining as f64) * weight(i) / total_weight).floor() as i64;
            let add = share.min(room);
            out[i] += add as i32;
            given += add;
        }

        // Rounding can starve every share; hand out single pixels in order.
        if given == 0 {
            for &i in &active {
                if given >= remaining {
                    break;
                }
                if out[i] < bounds[i].1 {
                    out[i] += 1;
                    given += 1;
                }
            }
        }

        remaining -= given;
    }

    out
}

/// Sums pixel widths, saturating at `i32::MAX`.
pub fn sum_px<I: IntoIterator<Item = i32>>(widths: I) -> i32 {
    let sum: i64 = widths.into_iter().map(i64::from).sum();
    sum.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Sum of resolved widths.
pub fn total(resolved: &[i32]) -> i32 {
    sum_px(resolved.iter().copied())
}

/// Offset of track `pos` from the start of the axis.
pub fn offset_of(resolved: &[i32], pos: usize) -> i32 {
    sum_px(resolved.iter().take(pos).copied())
}

/// Extent covered by `span` tracks starting at `pos`.
pub fn span_of(resolved: &[i32], pos: usize, span: usize) -> i32 {
    sum_px(resolved.iter().skip(pos).take(span).copied())
}
