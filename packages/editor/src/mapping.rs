//! # Position Mapping
//!
//! Every applied mutation produces a [`StepMap`] describing which ranges
//! of the old document were replaced and by how much content. Positions
//! held outside the document (selections, overlays, positions captured
//! before an async operation) are carried forward through these maps.
//!
//! A position that sat inside replaced content is reported as
//! `deleted`; which side counts is chosen with [`Assoc`].

/// Which side of a position to stick to when content is inserted or
/// removed exactly there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before content inserted at this position
    Before,
    /// Move after content inserted at this position
    After,
}

/// One replaced range, in pre-step coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRange {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

/// Result of mapping a single position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    /// Mapped position
    pub pos: usize,

    /// Whether the token on the `assoc` side of the position was removed
    pub deleted: bool,
}

/// Position map of a single mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: Vec<MapRange>,
}

impl StepMap {
    /// Map that leaves every position untouched
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map replacing `old_size` tokens at `start` with `new_size` tokens
    pub fn single(start: usize, old_size: usize, new_size: usize) -> Self {
        if old_size == 0 && new_size == 0 {
            return Self::empty();
        }

        Self {
            ranges: vec![MapRange {
                start,
                old_size,
                new_size,
            }],
        }
    }

    /// Map of several replacements, given in pre-step coordinates and
    /// in document order
    pub fn from_ranges(ranges: impl IntoIterator<Item = MapRange>) -> Self {
        Self {
            ranges: ranges
                .into_iter()
                .filter(|range| range.old_size != 0 || range.new_size != 0)
                .collect(),
        }
    }

    pub fn ranges(&self) -> &[MapRange] {
        &self.ranges
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;

        for range in &self.ranges {
            let start = range.start;
            if start > pos {
                break;
            }

            let end = start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    assoc
                } else if pos == start {
                    Assoc::Before
                } else if pos == end {
                    Assoc::After
                } else {
                    assoc
                };

                let base = offset(start, diff);
                let mapped = match side {
                    Assoc::Before => base,
                    Assoc::After => base + range.new_size,
                };
                let deleted = match assoc {
                    Assoc::Before => pos != start,
                    Assoc::After => pos != end,
                };

                return MapResult {
                    pos: mapped,
                    deleted,
                };
            }

            diff += range.new_size as isize - range.old_size as isize;
        }

        MapResult {
            pos: offset(pos, diff),
            deleted: false,
        }
    }
}

/// Sequence of step maps, applied in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Append every map of another mapping
    pub fn append(&mut self, other: &Mapping) {
        self.maps.extend(other.maps.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        self.map_result_from(0, pos, assoc)
    }

    /// Map through the maps starting at index `from`
    pub fn map_result_from(&self, from: usize, pos: usize, assoc: Assoc) -> MapResult {
        let mut result = MapResult {
            pos,
            deleted: false,
        };

        for map in self.maps.iter().skip(from) {
            let step = map.map_result(result.pos, assoc);
            result.pos = step.pos;
            result.deleted |= step.deleted;
        }

        result
    }
}

fn offset(pos: usize, diff: isize) -> usize {
    (pos as isize + diff).max(0) as usize
}
