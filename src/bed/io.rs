use crate::bed::{BEDLike, ParseError};
use crate::error::{Error, Result};

use flate2::read::MultiGzDecoder;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read, Write},
    marker::PhantomData,
    path::Path,
    str::FromStr,
};

/// Line prefixes of track definition, browser and comment lines.
const HEADER_PREFIXES: [&str; 3] = ["#", "track", "browser"];

/// An iterator over records of a BED reader. Parse errors carry the 1-based
/// line number of the offending record.
///
/// This is created by calling [`Reader::into_records`].
pub struct IntoRecords<B, R> {
    inner: Reader<R>,
    buf: String,
    phantom: PhantomData<B>,
}

impl<B, R> IntoRecords<B, R>
where
    R: Read,
    B: FromStr,
{
    pub fn new(inner: Reader<R>) -> Self {
        Self { inner, buf: String::new(), phantom: PhantomData }
    }
}

impl<B, R> Iterator for IntoRecords<B, R>
where
    R: Read,
    B: FromStr<Err = ParseError>,
{
    type Item = std::result::Result<B, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.inner.read_record(&mut self.buf) {
                Ok(LineSize::Size(0)) => return None,
                Ok(LineSize::Skip) => continue,
                Ok(_) => {
                    let line = self.inner.line_number;
                    let record = self.buf.parse();
                    return Some(record.map_err(|source| RecordError::Parse { line, source }));
                }
                Err(e) => return Some(Err(RecordError::Io(e))),
            }
        }
    }
}

/// An error raised while iterating over records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Parse { line: usize, source: ParseError },
}

/// A BED reader.
pub struct Reader<R> {
    inner: BufReader<R>,
    line_number: usize,
}

impl<R> Reader<R>
where
    R: Read,
{
    /// Creates a BED reader.
    pub fn new(inner: R) -> Self {
        Self { inner: BufReader::new(inner), line_number: 0 }
    }

    /// Reads a single raw BED record. Header, comment and blank lines are
    /// reported as [`LineSize::Skip`].
    pub fn read_record(&mut self, buf: &mut String) -> io::Result<LineSize> {
        let size = read_line(&mut self.inner, buf)?;
        if size > 0 {
            self.line_number += 1;
        }
        if size > 0 && is_header_line(buf) {
            Ok(LineSize::Skip)
        } else {
            Ok(LineSize::Size(size))
        }
    }

    pub fn into_records<B: FromStr + BEDLike>(self) -> IntoRecords<B, R> {
        IntoRecords::new(self)
    }
}

pub enum LineSize {
    Size(usize),
    Skip,
}

fn is_header_line(line: &str) -> bool {
    line.trim().is_empty() || HEADER_PREFIXES.iter().any(|x| line.starts_with(x))
}

fn read_line<R>(reader: &mut R, buf: &mut String) -> io::Result<usize>
where
    R: BufRead,
{
    const LINE_FEED: char = '\n';
    const CARRIAGE_RETURN: char = '\r';

    match reader.read_line(buf) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buf.ends_with(LINE_FEED) {
                buf.pop();

                if buf.ends_with(CARRIAGE_RETURN) {
                    buf.pop();
                }
            }
            Ok(n)
        }
        Err(e) => Err(e),
    }
}

/// A BED writer.
pub struct Writer<W> {
    inner: W,
}

impl<W> Writer<W>
where
    W: Write,
{
    /// Creates a BED writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes a BED record.
    pub fn write_record<B>(&mut self, record: &B) -> io::Result<()>
    where
        B: std::fmt::Display + BEDLike,
    {
        writeln!(&mut self.inner, "{}", record)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Open a plain or gzip-compressed file. Compression is detected from the
/// gzip magic bytes rather than the file extension.
pub fn open_file<P: AsRef<Path>>(file: P) -> io::Result<Box<dyn Read>> {
    const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

    let mut reader = BufReader::new(File::open(file.as_ref())?);
    if reader.fill_buf()?.starts_with(&GZIP_MAGIC) {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Read every record of a BED-like file into memory.
pub fn read_records<B, P>(path: P) -> Result<Vec<B>>
where
    B: FromStr<Err = ParseError> + BEDLike,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let to_error = |e: RecordError| match e {
        RecordError::Io(source) => Error::Io { path: path.to_path_buf(), source },
        RecordError::Parse { line, source } => {
            Error::Parse { path: path.to_path_buf(), line, source }
        }
    };
    let file = open_file(path).map_err(|e| to_error(RecordError::Io(e)))?;
    Reader::new(file).into_records().map(|r| r.map_err(to_error)).collect()
}
