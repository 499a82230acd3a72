pub mod io;
pub mod map;
mod bed_trait;

pub use bed_trait::{merge_sorted_bed_with, merge_sorted_bed_within, BEDLike, MergeBed};

use std::{fmt, str::FromStr};

pub(crate) const DELIMITER: char = '\t';

/// A minimal BED record with only 3 fields.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GenomicRange(String, u64, u64);

impl GenomicRange {
    pub fn new<C>(chrom: C, start: u64, end: u64) -> Self
    where
        C: Into<String>,
    {
        Self(chrom.into(), start, end)
    }
}

impl BEDLike for GenomicRange {
    fn chrom(&self) -> &str {
        &self.0
    }
    fn start(&self) -> u64 {
        self.1
    }
    fn end(&self) -> u64 {
        self.2
    }
}

impl fmt::Display for GenomicRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}{}", self.chrom(), DELIMITER, self.start(), DELIMITER, self.end())
    }
}

/// Parse the first three columns of a BED line. Remaining columns are ignored.
impl FromStr for GenomicRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split(DELIMITER);
        let chrom = parse_chrom(&mut fields)?;
        let (start, end) = parse_range(&mut fields)?;
        Ok(GenomicRange::new(chrom, start, end))
    }
}

/// The bedGraph format allows display of continuous-valued data in track format.
/// This display type is useful for probability scores and transcriptome data.
#[derive(Clone, Debug, PartialEq)]
pub struct BedGraph<V> {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub value: V,
}

impl<V> BedGraph<V> {
    pub fn new<C>(chrom: C, start: u64, end: u64, value: V) -> Self
    where
        C: Into<String>,
    {
        Self { chrom: chrom.into(), start, end, value }
    }
}

impl<V> BEDLike for BedGraph<V> {
    fn chrom(&self) -> &str {
        &self.chrom
    }
    fn start(&self) -> u64 {
        self.start
    }
    fn end(&self) -> u64 {
        self.end
    }
}

impl<V> fmt::Display for BedGraph<V>
where
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}{}{}",
            self.chrom(),
            DELIMITER, self.start(),
            DELIMITER, self.end(),
            DELIMITER, self.value,
        )
    }
}

impl<V> FromStr for BedGraph<V>
where
    V: FromStr,
{
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split(DELIMITER);
        let chrom = parse_chrom(&mut fields)?.to_string();
        let (start, end) = parse_range(&mut fields)?;
        let value = fields
            .next()
            .ok_or(ParseError::MissingValue)
            .and_then(|s| s.trim().parse().map_err(|_| ParseError::InvalidValue(s.to_string())))?;
        Ok(Self { chrom, start, end, value })
    }
}

fn parse_chrom<'a, I>(fields: &mut I) -> Result<&'a str, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingReferenceSequenceName)
}

fn parse_start<'a, I>(fields: &mut I) -> Result<u64, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    fields
        .next()
        .ok_or(ParseError::MissingStartPosition)
        .and_then(|s| lexical::parse(s.trim()).map_err(ParseError::InvalidStartPosition))
}

fn parse_end<'a, I>(fields: &mut I) -> Result<u64, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    fields
        .next()
        .ok_or(ParseError::MissingEndPosition)
        .and_then(|s| lexical::parse(s.trim()).map_err(ParseError::InvalidEndPosition))
}

/// Records must span at least one base.
fn parse_range<'a, I>(fields: &mut I) -> Result<(u64, u64), ParseError>
where
    I: Iterator<Item = &'a str>,
{
    let start = parse_start(fields)?;
    let end = parse_end(fields)?;
    if start >= end {
        Err(ParseError::EmptyRange { start, end })
    } else {
        Ok((start, end))
    }
}

/// An error returned when a raw BED or bedGraph record fails to parse.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The reference sequence name is missing.
    #[error("missing reference sequence name")]
    MissingReferenceSequenceName,
    /// The start position is missing.
    #[error("missing start position")]
    MissingStartPosition,
    /// The start position is invalid.
    #[error("invalid start position: {0}")]
    InvalidStartPosition(lexical::Error),
    /// The end position is missing.
    #[error("missing end position")]
    MissingEndPosition,
    /// The end position is invalid.
    #[error("invalid end position: {0}")]
    InvalidEndPosition(lexical::Error),
    /// The end position is not past the start position.
    #[error("start position {start} is not before end position {end}")]
    EmptyRange { start: u64, end: u64 },
    /// The bedGraph value is missing.
    #[error("missing value")]
    MissingValue,
    /// The bedGraph value is invalid.
    #[error("invalid value: {0:?}")]
    InvalidValue(String),
}
