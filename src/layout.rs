//! Column and row constraints of a grid container.

use serde::{Deserialize, Serialize};

use crate::solver::TrackInput;

/// Grid axis. Columns run along `X`, rows along `Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Marks a track whose bounds come from the child occupying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FromChild {
    /// Pin the track to the child's minimum so it never grows.
    pub fix: bool,
}

/// One column or row constraint, in cell units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub pos: usize,
    pub min: f32,
    pub max: f32,
    /// Present on resizable tracks. Holds the size used until the user drags
    /// the resizer; the host substitutes the persisted value afterwards.
    pub resize_value: Option<f32>,
    pub from_child: Option<FromChild>,
    pub fill: Option<f32>,
}

impl Track {
    pub fn new(pos: usize, min: f32, max: f32) -> Self {
        Self {
            pos,
            min,
            max,
            resize_value: None,
            from_child: None,
            fill: None,
        }
    }

    pub fn is_resizable(&self) -> bool {
        self.resize_value.is_some()
    }

    /// Solver input without child sizing or persisted overrides applied.
    pub fn input(&self) -> TrackInput {
        TrackInput {
            min: self.min,
            max: self.max,
            resize: self.resize_value,
            fill: self.fill,
        }
    }
}

/// Ordered, position-unique list of tracks for one axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tracks {
    tracks: Vec<Track>,
}

impl Tracks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, pos: usize) -> &mut Track {
        let index = match self.tracks.binary_search_by_key(&pos, |t| t.pos) {
            Ok(i) => i,
            Err(i) => {
                self.tracks.insert(i, Track::new(pos, 1.0, 1.0));
                i
            }
        };
        &mut self.tracks[index]
    }

    /// Sets the bounds of track `pos`. Later calls replace earlier ones.
    pub fn set(&mut self, pos: usize, min: f32, max: f32) -> &mut Track {
        let track = self.slot(pos);
        *track = Track::new(pos, min, max);
        track
    }

    /// Sizes track `pos` from the child placed in it, clamped to `min..=max`.
    pub fn set_from_child(&mut self, pos: usize, min: f32, max: f32, fix: bool) -> &mut Track {
        let track = self.set(pos, min, max);
        track.from_child = Some(FromChild { fix });
        track
    }

    /// Makes track `pos` user-resizable, starting at `default` cells.
    pub fn set_resizable(&mut self, pos: usize, min: f32, max: f32, default: f32) -> &mut Track {
        let track = self.set(pos, min, max);
        track.resize_value = Some(default.clamp(min.min(max), max.max(min)));
        track
    }

    /// Sets an explicit surplus weight for track `pos`.
    pub fn set_fill(&mut self, pos: usize, weight: f32) {
        self.slot(pos).fill = Some(weight);
    }

    pub fn get(&self, pos: usize) -> Option<&Track> {
        self.tracks
            .binary_search_by_key(&pos, |t| t.pos)
            .ok()
            .map(|i| &self.tracks[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of positions declared, i.e. last position + 1.
    pub fn declared_len(&self) -> usize {
        self.tracks.last().map(|t| t.pos + 1).unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_positions_sorted_and_unique() {
        let mut t = Tracks::new();
        t.set(3, 1.0, 2.0);
        t.set(0, 1.0, 5.0);
        t.set(3, 2.0, 4.0);
        let positions: Vec<usize> = t.iter().map(|t| t.pos).collect();
        assert_eq!(positions, vec![0, 3]);
        assert_eq!(t.get(3).map(|t| t.min), Some(2.0));
        assert_eq!(t.declared_len(), 4);
    }

    #[test]
    fn resizable_default_is_clamped() {
        let mut t = Tracks::new();
        t.set_resizable(0, 1.0, 3.0, 10.0);
        assert_eq!(t.get(0).and_then(|t| t.resize_value), Some(3.0));
        assert!(t.get(0).map(|t| t.is_resizable()).unwrap_or(false));
    }

    #[test]
    fn from_child_flag_is_recorded() {
        let mut t = Tracks::new();
        t.set_from_child(1, 1.0, 10.0, true);
        assert_eq!(t.get(1).and_then(|t| t.from_child), Some(FromChild { fix: true }));
    }

    #[test]
    fn plain_set_clears_previous_flags() {
        let mut t = Tracks::new();
        t.set_resizable(0, 1.0, 3.0, 2.0);
        t.set(0, 1.0, 3.0);
        assert!(!t.get(0).map(|t| t.is_resizable()).unwrap_or(true));
    }

    #[test]
    fn axis_other() {
        assert_eq!(Axis::X.other(), Axis::Y);
        assert_eq!(Axis::Y.other(), Axis::X);
    }
}
