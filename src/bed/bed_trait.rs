use std::cmp::Ordering;

/// Common BED fields
pub trait BEDLike {
    /// Return the chromosome name of the record
    fn chrom(&self) -> &str;

    /// Return the 0-based start position of the record
    fn start(&self) -> u64;

    /// Return the end position (non-inclusive) of the record
    fn end(&self) -> u64;

    /// Return the name of the record
    fn name(&self) -> Option<&str> {
        None
    }

    /// Return the length of the record. Return 0 if the end position is smaller
    /// than the start position.
    fn len(&self) -> u64 {
        self.end().saturating_sub(self.start())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.chrom()
            .cmp(other.chrom())
            .then(self.start().cmp(&other.start()))
            .then(self.end().cmp(&other.end()))
    }
}

pub struct MergeBed<I, B, F> {
    sorted_bed_iter: I,
    merger: F,
    max_gap: u64,
    accum: Option<((String, u64, u64), Vec<B>)>,
}

impl<I, F, B, O> Iterator for MergeBed<I, B, F>
where
    I: Iterator<Item = B>,
    B: BEDLike,
    F: Fn(Vec<B>) -> O,
{
    type Item = O;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.sorted_bed_iter.next() {
                None => return self.accum.take().map(|(_, accum)| (self.merger)(accum)),
                Some(record) => match self.accum.as_mut() {
                    None => {
                        self.accum = Some((
                            (record.chrom().to_string(), record.start(), record.end()),
                            vec![record],
                        ))
                    }
                    Some(((chr, s, e), accum)) => {
                        let chr_ = record.chrom();
                        let s_ = record.start();
                        let e_ = record.end();
                        if chr != chr_ || s_ > e.saturating_add(self.max_gap) {
                            let group = ((chr_.to_string(), s_, e_), vec![record]);
                            let acc = std::mem::replace(accum, Vec::new());
                            self.accum = Some(group);
                            return Some((self.merger)(acc));
                        } else {
                            debug_assert!(s_ >= *s, "input is not sorted");
                            if e_ > *e {
                                *e = e_;
                            }
                            accum.push(record);
                        }
                    }
                },
            }
        }
    }
}

/// Merge sorted BED records. Overlapping and book-ended records are processed
/// according to the function provided.
///
/// The input must be sorted by chromosome and start (see
/// [`BEDLike::compare`]). Unsorted input yields wrong groups, and panics in
/// debug builds when a record starts before its group.
pub fn merge_sorted_bed_with<In, I, B, O, F>(sorted_bed_iter: In, merger: F) -> MergeBed<I, B, F>
where
    In: IntoIterator<IntoIter = I>,
    I: Iterator<Item = B>,
    B: BEDLike,
    F: Fn(Vec<B>) -> O,
{
    merge_sorted_bed_within(sorted_bed_iter, 0, merger)
}

/// Merge sorted BED records that are at most `max_gap` bases apart. Each
/// group of records is processed according to the function provided.
///
/// Same sortedness requirement as [`merge_sorted_bed_with`].
pub fn merge_sorted_bed_within<In, I, B, O, F>(
    sorted_bed_iter: In,
    max_gap: u64,
    merger: F,
) -> MergeBed<I, B, F>
where
    In: IntoIterator<IntoIter = I>,
    I: Iterator<Item = B>,
    B: BEDLike,
    F: Fn(Vec<B>) -> O,
{
    MergeBed {
        sorted_bed_iter: sorted_bed_iter.into_iter(),
        merger,
        max_gap,
        accum: None,
    }
}
