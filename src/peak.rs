mod caller;

pub use caller::{default_output_path, PeakCaller, PeakCallerBuilder};

use itertools::Itertools;
use log::debug;
use std::fmt;

use crate::bed::{
    map::GIntervalSet, merge_sorted_bed_with, merge_sorted_bed_within, BEDLike, BedGraph,
    DELIMITER,
};
use crate::error::{Error, Result};

/// A called peak. `score` is the sum of the bedGraph values that
/// contributed to the peak.
#[derive(Clone, Debug, PartialEq)]
pub struct Peak {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub score: f64,
    pub name: Option<String>,
}

impl Peak {
    pub fn new<C>(chrom: C, start: u64, end: u64, score: f64) -> Self
    where
        C: Into<String>,
    {
        Self { chrom: chrom.into(), start, end, score, name: None }
    }

    /// Collapse a group of sorted, mutually close records into one peak
    /// spanning all of them.
    fn from_group<B, F>(group: &[B], score: F) -> Self
    where
        B: BEDLike,
        F: Fn(&B) -> f64,
    {
        let end = group.iter().map(|x| x.end()).max().unwrap_or(group[0].end());
        Peak::new(group[0].chrom(), group[0].start(), end, group.iter().map(score).sum())
    }
}

impl BEDLike for Peak {
    fn chrom(&self) -> &str {
        &self.chrom
    }
    fn start(&self) -> u64 {
        self.start
    }
    fn end(&self) -> u64 {
        self.end
    }
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Four columns (`chrom start end score`), or five when the peak is named
/// (`chrom start end name score`).
impl fmt::Display for Peak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}{}", self.chrom(), DELIMITER, self.start(), DELIMITER, self.end())?;
        if let Some(name) = self.name() {
            write!(f, "{}{}", DELIMITER, name)?;
        }
        write!(f, "{}{}", DELIMITER, Score(self.score))
    }
}

/// Shortest round-trip decimal, switching to scientific notation for
/// magnitudes of at least 1e16 or below 1e-4.
struct Score(f64);

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.abs();
        if magnitude >= 1e16 || (magnitude > 0.0 && magnitude < 1e-4) {
            write!(f, "{:e}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// How peaks closer than the inter-peak distance are resolved.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CloseMode {
    /// Merge close peaks into one and sum their scores.
    #[default]
    Merge,
    /// Keep only the highest scoring peak among close peaks.
    KeepHighest,
}

impl CloseMode {
    /// Select the mode from a pair of mutually exclusive switches.
    pub fn from_flags(merge_close_peaks: bool, keep_highest_close_peak: bool) -> Result<Self> {
        match (merge_close_peaks, keep_highest_close_peak) {
            (true, false) => Ok(CloseMode::Merge),
            (false, true) => Ok(CloseMode::KeepHighest),
            (merge, keep_highest) => Err(Error::ConflictingCloseModes { merge, keep_highest }),
        }
    }

    /// Resolve close peaks in a sorted peak collection.
    pub fn resolve(self, peaks: Vec<Peak>, inter_peak_distance: u64) -> Vec<Peak> {
        match self {
            CloseMode::Merge => merge_close_peaks(peaks, inter_peak_distance),
            CloseMode::KeepHighest => keep_highest_close_peaks(peaks, inter_peak_distance),
        }
    }
}

impl fmt::Display for CloseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseMode::Merge => f.write_str("merge"),
            CloseMode::KeepHighest => f.write_str("keep-highest"),
        }
    }
}

/// Keep the records scoring at least `threshold` and merge the overlapping or
/// book-ended ones into peaks.
///
/// The score of a peak is the sum of the values of the retained records
/// only: records below the threshold never contribute, even when they lie
/// inside the span of a merged peak. This is intentional.
pub fn threshold_and_merge<I>(records: I, threshold: f64) -> Vec<Peak>
where
    I: IntoIterator<Item = BedGraph<f64>>,
{
    let retained = records
        .into_iter()
        .filter(|x| x.value >= threshold)
        .sorted_by(BEDLike::compare);
    merge_sorted_bed_with(retained, |group| Peak::from_group(&group, |x| x.value)).collect()
}

/// Keep peaks whose length lies in `[min_length, max_length]`.
pub fn filter_by_length(peaks: Vec<Peak>, min_length: u64, max_length: u64) -> Vec<Peak> {
    peaks
        .into_iter()
        .filter(|x| (min_length..=max_length).contains(&x.len()))
        .collect()
}

/// Merge consecutive peaks separated by at most `inter_peak_distance` bases,
/// summing their scores.
pub fn merge_close_peaks(peaks: Vec<Peak>, inter_peak_distance: u64) -> Vec<Peak> {
    let merged = merge_sorted_bed_within(sort_peaks(peaks), inter_peak_distance, |group| {
        if group.len() > 1 {
            let first = &group[0];
            debug!("merging {} peaks starting at {}:{}", group.len(), first.chrom, first.start);
        }
        Peak::from_group(&group, |x| x.score)
    });
    sort_peaks(merged.collect())
}

/// Among close peaks keep the highest one.
///
/// Single pass over the sorted peaks holding one candidate. A peak is far
/// from the candidate if `candidate.end + inter_peak_distance <= peak.start`
/// or if it lies on another chromosome; the candidate is then emitted and
/// replaced by the peak. Otherwise the peak replaces the candidate only if
/// its score is strictly higher. Only the candidate and the next peak are
/// ever compared.
pub fn keep_highest_close_peaks(peaks: Vec<Peak>, inter_peak_distance: u64) -> Vec<Peak> {
    let mut peaks = sort_peaks(peaks).into_iter();
    let mut candidate = match peaks.next() {
        Some(x) => x,
        None => return Vec::new(),
    };

    let mut result = Vec::new();
    for peak in peaks {
        let far_apart = candidate.chrom != peak.chrom
            || candidate.end.saturating_add(inter_peak_distance) <= peak.start;
        if far_apart {
            result.push(std::mem::replace(&mut candidate, peak));
        } else if peak.score > candidate.score {
            debug!(
                "{}:{}-{} replaces {}:{}-{} as the highest close peak",
                peak.chrom, peak.start, peak.end, candidate.chrom, candidate.start, candidate.end,
            );
            candidate = peak;
        }
    }
    result.push(candidate);
    result
}

/// Drop peaks overlapping any region of `blacklist` by at least one base.
pub fn remove_overlapping(peaks: Vec<Peak>, blacklist: &GIntervalSet) -> Vec<Peak> {
    peaks.into_iter().filter(|x| !blacklist.is_overlapped(x)).collect()
}

/// Sort the peaks and name them `{prefix}1 .. {prefix}N` in that order.
pub fn assign_ids(peaks: Vec<Peak>, prefix: &str) -> Vec<Peak> {
    sort_peaks(peaks)
        .into_iter()
        .enumerate()
        .map(|(i, mut x)| {
            x.name = Some(format!("{}{}", prefix, i + 1));
            x
        })
        .collect()
}

/// Sort by chromosome, start and end.
pub fn sort_peaks(mut peaks: Vec<Peak>) -> Vec<Peak> {
    peaks.sort_by(BEDLike::compare);
    peaks
}
