use std::collections::HashMap;

use super::BEDLike;

/// Intervals of one chromosome sorted by start, with the running maximum of
/// the end positions so that an overlap query is a single binary search.
#[derive(Debug, Clone, Default)]
struct SortedIntervals {
    intervals: Vec<(u64, u64)>,
    max_end: Vec<u64>,
}

impl SortedIntervals {
    fn new(mut intervals: Vec<(u64, u64)>) -> Self {
        intervals.sort_unstable();
        let mut max_end = Vec::with_capacity(intervals.len());
        let mut acc = 0;
        for (_, end) in intervals.iter() {
            acc = acc.max(*end);
            max_end.push(acc);
        }
        Self { intervals, max_end }
    }

    fn is_overlapped(&self, start: u64, end: u64) -> bool {
        let hi = self.intervals.partition_point(|(s, _)| *s < end);
        hi > 0 && self.max_end[hi - 1] > start
    }
}

/// A set of genomic intervals supporting overlap queries.
/// Duplicated records are kept.
#[derive(Debug, Clone, Default)]
pub struct GIntervalSet {
    data: HashMap<String, SortedIntervals>,
    len: usize,
}

impl GIntervalSet {
    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Determine if the query overlaps with any record.
    pub fn is_overlapped<B: BEDLike>(&self, bed: &B) -> bool {
        self.data
            .get(bed.chrom())
            .map_or(false, |x| x.is_overlapped(bed.start(), bed.end()))
    }
}

impl<B: BEDLike> FromIterator<B> for GIntervalSet {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        let mut hmap: HashMap<String, Vec<(u64, u64)>> = HashMap::new();
        let mut len = 0;
        for bed in iter {
            hmap.entry(bed.chrom().to_string())
                .or_default()
                .push((bed.start(), bed.end()));
            len += 1;
        }
        let data = hmap
            .into_iter()
            .map(|(chr, vec)| (chr, SortedIntervals::new(vec)))
            .collect();
        Self { data, len }
    }
}
