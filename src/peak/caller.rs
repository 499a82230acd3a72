use log::info;
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use super::{
    assign_ids, filter_by_length, remove_overlapping, sort_peaks, threshold_and_merge, CloseMode,
    Peak,
};
use crate::bed::{
    io::{read_records, Writer},
    map::GIntervalSet,
    BedGraph, GenomicRange,
};
use crate::error::{Error, Result};

/// Input suffixes replaced by `_peaks.bed` when naming the output.
const INPUT_SUFFIXES: [&str; 4] = [".bg.gz", ".bg", ".bedgraph.gz", ".bedgraph"];
const OUTPUT_SUFFIX: &str = "_peaks.bed";

enum Blacklist {
    File(PathBuf),
    Regions(Vec<GenomicRange>),
}

/// Configures and creates a [`PeakCaller`].
pub struct PeakCallerBuilder {
    threshold: f64,
    min_length: u64,
    max_length: u64,
    inter_peak_distance: u64,
    close_mode: CloseMode,
    generate_id: bool,
    id_prefix: String,
    blacklist: Option<Blacklist>,
}

impl PeakCallerBuilder {
    /// Starts from the signal threshold, the one parameter without a default.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            min_length: 0,
            max_length: u64::MAX,
            inter_peak_distance: 0,
            close_mode: CloseMode::default(),
            generate_id: true,
            id_prefix: String::new(),
            blacklist: None,
        }
    }

    /// Sets the minimum peak length (inclusive).
    pub fn with_min_length(mut self, min_length: u64) -> Self {
        self.min_length = min_length;
        self
    }

    /// Sets the maximum peak length (inclusive). Unbounded by default.
    pub fn with_max_length(mut self, max_length: u64) -> Self {
        self.max_length = max_length;
        self
    }

    /// Sets the distance under which two peaks are considered close.
    pub fn with_inter_peak_distance(mut self, distance: u64) -> Self {
        self.inter_peak_distance = distance;
        self
    }

    pub fn with_close_mode(mut self, mode: CloseMode) -> Self {
        self.close_mode = mode;
        self
    }

    /// Whether to name peaks `1 .. N`. Enabled by default.
    pub fn with_ids(mut self, generate_id: bool) -> Self {
        self.generate_id = generate_id;
        self
    }

    /// Prepends `prefix` to every peak ID, e.g. `id` gives `id1 .. idN`.
    pub fn with_id_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Discards peaks overlapping any region of this BED file.
    pub fn with_blacklist<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.blacklist = Some(Blacklist::File(path.as_ref().to_path_buf()));
        self
    }

    /// Discards peaks overlapping any of these regions.
    pub fn with_blacklist_regions<I>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = GenomicRange>,
    {
        self.blacklist = Some(Blacklist::Regions(regions.into_iter().collect()));
        self
    }

    pub fn build(self) -> Result<PeakCaller> {
        if !self.threshold.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.min_length > self.max_length {
            return Err(Error::InvalidConfig(format!(
                "min_length ({}) is larger than max_length ({})",
                self.min_length, self.max_length
            )));
        }
        let blacklist: Option<GIntervalSet> = match self.blacklist {
            None => None,
            Some(Blacklist::File(path)) => {
                info!("delete_overlap_bed provided: {}", path.display());
                Some(read_records::<GenomicRange, _>(path)?.into_iter().collect())
            }
            Some(Blacklist::Regions(regions)) => Some(regions.into_iter().collect()),
        };
        if let Some(set) = &blacklist {
            info!("number of blacklist regions: {}", set.len());
        }
        Ok(PeakCaller {
            threshold: self.threshold,
            min_length: self.min_length,
            max_length: self.max_length,
            inter_peak_distance: self.inter_peak_distance,
            close_mode: self.close_mode,
            id_prefix: if self.generate_id { Some(self.id_prefix) } else { None },
            blacklist,
        })
    }
}

/// Calls peaks from bedGraph records in a single sequential pass.
pub struct PeakCaller {
    threshold: f64,
    min_length: u64,
    max_length: u64,
    inter_peak_distance: u64,
    close_mode: CloseMode,
    id_prefix: Option<String>,
    blacklist: Option<GIntervalSet>,
}

impl PeakCaller {
    /// Runs every stage in memory and returns the sorted peaks.
    pub fn call<I>(&self, records: I) -> Vec<Peak>
    where
        I: IntoIterator<Item = BedGraph<f64>>,
    {
        let peaks = threshold_and_merge(records, self.threshold);
        info!("number of regions above threshold: {}", peaks.len());

        let peaks = filter_by_length(peaks, self.min_length, self.max_length);
        info!("number of regions satisfying length criteria: {}", peaks.len());

        let d = self.inter_peak_distance;
        match self.close_mode {
            CloseMode::Merge => info!("merging peaks that are closer than: {}", d),
            CloseMode::KeepHighest => info!("keeping the highest of peaks closer than: {}", d),
        }
        let mut peaks = self.close_mode.resolve(peaks, d);
        info!("number of peaks found: {}", peaks.len());

        if let Some(blacklist) = &self.blacklist {
            peaks = remove_overlapping(peaks, blacklist);
            info!("number of peaks retained: {}", peaks.len());
        }

        match &self.id_prefix {
            Some(prefix) => assign_ids(peaks, prefix),
            None => sort_peaks(peaks),
        }
    }

    /// Reads the bedGraph at `input`, calls peaks and writes them to
    /// `output`. The output file is only created once all peaks are called.
    /// Returns the number of peaks written.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<usize> {
        let (input, output) = (input.as_ref(), output.as_ref());
        info!("input bedgraph file: {}", input.display());
        info!("output filename: {}", output.display());

        let records = read_records::<BedGraph<f64>, _>(input)?;
        let peaks = self.call(records);

        let io_err = |source| Error::Io { path: output.to_path_buf(), source };
        let mut writer = Writer::new(BufWriter::new(File::create(output).map_err(io_err)?));
        for peak in peaks.iter() {
            writer.write_record(peak).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        match self.id_prefix {
            Some(_) => info!("saved sorted peak bed file with ID names"),
            None => info!("saved sorted peak bed file with no ID"),
        }
        Ok(peaks.len())
    }
}

/// Derive the output path from the bedGraph path: a `.bg` (or `.bedgraph`,
/// optionally gzipped) suffix becomes `_peaks.bed`, any other name gets
/// `_peaks.bed` appended.
pub fn default_output_path<P: AsRef<Path>>(bedgraph: P) -> PathBuf {
    let bedgraph = bedgraph.as_ref();
    let file_name = bedgraph
        .file_name()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = INPUT_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix).filter(|x| !x.is_empty()))
        .unwrap_or(&file_name);
    bedgraph.with_file_name(format!("{}{}", stem, OUTPUT_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn signal() -> Vec<BedGraph<f64>> {
        vec![
            BedGraph::new("chr1", 100, 150, 1.0),
            BedGraph::new("chr1", 150, 151, 0.2),
            BedGraph::new("chr1", 160, 200, 2.0),
            BedGraph::new("chr1", 500, 520, 5.0),
            BedGraph::new("chr1", 900, 902, 5.0),
            BedGraph::new("chr2", 0, 10, 3.0),
        ]
    }

    #[rstest]
    #[case("sample.bg", "sample_peaks.bed")]
    #[case("data/sample.bg", "data/sample_peaks.bed")]
    #[case("data/sample.bg.gz", "data/sample_peaks.bed")]
    #[case("sample.bedgraph", "sample_peaks.bed")]
    #[case("sample.bgx", "sample.bgx_peaks.bed")]
    #[case("sample.txt", "sample.txt_peaks.bed")]
    #[case(".bg", ".bg_peaks.bed")]
    fn test_default_output_path(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(default_output_path(input), PathBuf::from(expected));
    }

    #[test]
    fn test_call_merge() -> Result<()> {
        let caller = PeakCallerBuilder::new(1.0)
            .with_min_length(10)
            .with_inter_peak_distance(20)
            .build()?;
        let peaks: Vec<String> = caller.call(signal()).iter().map(|x| x.to_string()).collect();
        assert_eq!(
            peaks,
            vec!["chr1\t100\t200\t1\t3", "chr1\t500\t520\t2\t5", "chr2\t0\t10\t3\t3"],
        );
        Ok(())
    }

    #[test]
    fn test_call_keep_highest_without_ids() -> Result<()> {
        let caller = PeakCallerBuilder::new(1.0)
            .with_min_length(10)
            .with_max_length(50)
            .with_inter_peak_distance(20)
            .with_close_mode(CloseMode::KeepHighest)
            .with_ids(false)
            .build()?;
        let peaks: Vec<String> = caller.call(signal()).iter().map(|x| x.to_string()).collect();
        assert_eq!(peaks, vec!["chr1\t160\t200\t2", "chr1\t500\t520\t5", "chr2\t0\t10\t3"]);
        Ok(())
    }

    #[test]
    fn test_call_blacklist() -> Result<()> {
        let caller = PeakCallerBuilder::new(1.0)
            .with_min_length(10)
            .with_inter_peak_distance(20)
            .with_id_prefix("peak")
            .with_blacklist_regions([
                GenomicRange::new("chr1", 519, 600),
                GenomicRange::new("chr2", 10, 20),
            ])
            .build()?;
        let peaks: Vec<String> = caller.call(signal()).iter().map(|x| x.to_string()).collect();
        assert_eq!(peaks, vec!["chr1\t100\t200\tpeak1\t3", "chr2\t0\t10\tpeak2\t3"]);
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            PeakCallerBuilder::new(1.0).with_min_length(10).with_max_length(5).build(),
            Err(Error::InvalidConfig(_)),
        ));
        assert!(matches!(PeakCallerBuilder::new(f64::NAN).build(), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            PeakCallerBuilder::new(1.0).with_blacklist("no/such/blacklist.bed").build(),
            Err(Error::Io { .. }),
        ));
    }

    #[test]
    fn test_run() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("signal.bg");
        let blacklist = dir.path().join("blacklist.bed");
        std::fs::write(
            &input,
            "track type=bedGraph\nchr1\t0\t10\t4\nchr1\t10\t20\t1\nchr1\t50\t60\t2\n",
        )?;
        std::fs::write(&blacklist, "chr1\t55\t56\tbad\n")?;

        let output = default_output_path(&input);
        let caller = PeakCallerBuilder::new(2.0).with_blacklist(&blacklist).build()?;
        assert_eq!(caller.run(&input, &output)?, 1);
        assert_eq!(std::fs::read_to_string(&output)?, "chr1\t0\t10\t1\t4\n");
        Ok(())
    }

    #[test]
    fn test_run_parse_error_writes_nothing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("signal.bg");
        std::fs::write(&input, "chr1\t0\t10\t4\nchr1\t10\t20\n")?;

        let output = dir.path().join("out.bed");
        let caller = PeakCallerBuilder::new(2.0).build()?;
        match caller.run(&input, &output) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a parse error, got {:?}", other),
        }
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn test_conflicting_modes_write_nothing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("out.bed");
        let result = CloseMode::from_flags(true, true).and_then(|mode| {
            PeakCallerBuilder::new(1.0).with_close_mode(mode).build()?.run("unused.bg", &output)
        });
        assert!(matches!(
            result,
            Err(Error::ConflictingCloseModes { merge: true, keep_highest: true })
        ));
        assert!(!output.exists());
        Ok(())
    }
}
