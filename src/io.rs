//! FASTA streams, reference loading and alignment outputs.
//!
//! A reference is either a GenBank record carrying its own features or a
//! FASTA file whose feature table lives next to it as `<stem>.cds`, one
//! whitespace-separated feature per line:
//!
//! ```text
//! CDS      gag   336..1838
//! CDS      pol   1631..4642   codon_start=2
//! protein  p17   336..731
//! ```
//!
//! Coordinates are 1-based and inclusive; spliced features list their ranges
//! separated by commas. `#` starts a comment.

use std::fs::File;
use std::io::{self, Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use bio::io::fasta;
use log::{info, warn};

use crate::alphabet::Symbol;
use crate::genbank;
use crate::genome::{CdsFeature, Genome};
use crate::sequence::{NtSequence, Sequence};
use crate::stats::ScoreTrace;
use crate::{AlignerError, Result};

fn record_to_sequence(record: &fasta::Record) -> Result<NtSequence> {
    Ok(NtSequence::from_text(record.id(), record.seq())?.with_description(record.desc().map(String::from)))
}

/// Streams nucleotide records; a read failure ends the stream.
pub struct QueryReader {
    records: Box<dyn Iterator<Item = io::Result<fasta::Record>> + Send>,
    done: bool,
}

impl QueryReader {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_reader(File::open(path)?))
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            records: Box::new(fasta::Reader::new(reader).records()),
            done: false,
        }
    }
}

impl Iterator for QueryReader {
    type Item = NtSequence;

    fn next(&mut self) -> Option<NtSequence> {
        if self.done {
            return None;
        }
        let parsed = match self.records.next()? {
            Ok(record) => record_to_sequence(&record),
            Err(e) => Err(e.into()),
        };
        match parsed {
            Ok(seq) => Some(seq),
            Err(e) => {
                warn!("Stopped reading queries: {e}");
                self.done = true;
                None
            }
        }
    }
}

/// First record of a FASTA stream.
pub fn read_fasta_sequence<R: Read>(reader: R, source: &Path) -> Result<NtSequence> {
    match fasta::Reader::new(reader).records().next() {
        Some(record) => record_to_sequence(&record?),
        None => Err(AlignerError::Parse {
            line: 1,
            message: format!("no FASTA record in {}", source.display()),
        }),
    }
}

/// `ref.fasta` -> `ref.cds`
pub fn sidecar_path(reference: &Path) -> PathBuf {
    reference.with_extension("cds")
}

/// Annotated CDS and protein product features from a feature table.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub cds: Vec<CdsFeature>,
    pub proteins: Vec<CdsFeature>,
}

pub(crate) fn parse_ranges(text: &str, line: usize) -> Result<Vec<Range<usize>>> {
    let parse_error = |message: String| AlignerError::Parse { line, message };
    text.split(',')
        .map(|part| {
            let (start, end) = part
                .split_once("..")
                .ok_or_else(|| parse_error(format!("range {part:?} is not start..end")))?;
            let start: usize = start
                .trim()
                .parse()
                .map_err(|_| parse_error(format!("bad range start {start:?}")))?;
            let end: usize = end
                .trim()
                .parse()
                .map_err(|_| parse_error(format!("bad range end {end:?}")))?;
            if start == 0 || end < start {
                return Err(parse_error(format!("invalid range {start}..{end}")));
            }
            Ok(start - 1..end)
        })
        .collect()
}

pub fn parse_feature_table(text: &str, reference: &NtSequence) -> Result<FeatureTable> {
    let mut table = FeatureTable::default();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(AlignerError::Parse {
                line,
                message: format!("expected KIND NAME RANGES, got {content:?}"),
            });
        }

        let ranges = parse_ranges(fields[2], line)?;
        let mut frame_offset = 0;
        for attr in &fields[3..] {
            match attr.split_once('=') {
                Some(("codon_start", value)) => {
                    let start: usize = value.parse().map_err(|_| AlignerError::Parse {
                        line,
                        message: format!("bad codon_start {value:?}"),
                    })?;
                    frame_offset = start.saturating_sub(1);
                }
                _ => warn!("Ignoring attribute {attr:?} on line {line}"),
            }
        }

        let feature = CdsFeature::new(fields[1], ranges, frame_offset, reference)?;
        match fields[0].to_ascii_lowercase().as_str() {
            "cds" => table.cds.push(feature),
            "protein" | "mat_peptide" => table.proteins.push(feature),
            other => {
                return Err(AlignerError::Parse {
                    line,
                    message: format!("unknown feature kind {other:?}"),
                })
            }
        }
    }
    table.cds.sort_by_key(|f| f.span().start);
    Ok(table)
}

/// Loads the reference genome and its protein products.
///
/// A file starting with a `LOCUS` line is read as GenBank. `features`
/// replaces the record's own features, or the sibling `.cds` table of a FASTA
/// reference. A FASTA reference without any table aligns on nucleotides only.
pub fn read_reference(path: &Path, features: Option<&Path>) -> Result<(Genome, Vec<CdsFeature>)> {
    let text = std::fs::read_to_string(path)?;
    let (reference, embedded) = if genbank::looks_like_genbank(&text) {
        let record = genbank::parse_genbank(&text)?;
        let reference = record.reference()?;
        let table = record.feature_table(&reference)?;
        info!(
            "Read GenBank record {} with {} CDS and {} protein features",
            record.locus,
            table.cds.len(),
            table.proteins.len()
        );
        (reference, Some(table))
    } else {
        (read_fasta_sequence(text.as_bytes(), path)?, None)
    };

    let table_path = match (features, &embedded) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, None) => Some(sidecar_path(path)).filter(|p| p.exists()),
        (None, Some(_)) => None,
    };

    let table = match (table_path, embedded) {
        (None, Some(table)) => table,
        (Some(path), _) => {
            let text = std::fs::read_to_string(&path)?;
            let table = parse_feature_table(&text, &reference)?;
            info!(
                "Read {} CDS and {} protein features from {}",
                table.cds.len(),
                table.proteins.len(),
                path.display()
            );
            table
        }
        (None, None) => {
            warn!("No feature table for {}; aligning without CDS", path.display());
            FeatureTable::default()
        }
    };

    let genome = Genome::new(reference, table.cds)?;
    Ok((genome, table.proteins))
}

/// FASTA output of aligned pairs.
pub struct AlignmentWriter<W: Write> {
    writer: fasta::Writer<W>,
}

impl AlignmentWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> AlignmentWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: fasta::Writer::new(writer),
        }
    }

    pub fn write_sequence<T: Symbol>(&mut self, seq: &Sequence<T>) -> Result<()> {
        self.writer
            .write(seq.name(), seq.description(), seq.to_text().as_bytes())?;
        Ok(())
    }

    pub fn write_pair<T: Symbol>(&mut self, reference: &Sequence<T>, query: &Sequence<T>) -> Result<()> {
        self.write_sequence(reference)?;
        self.write_sequence(query)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Tab-separated per-column score traces, one line per query:
/// name, first and last aligned column, then the windowed sums.
pub struct ScoreTraceWriter<W: Write> {
    writer: W,
    window: usize,
}

impl ScoreTraceWriter<io::BufWriter<File>> {
    pub fn create(path: &Path, window: usize) -> Result<Self> {
        Ok(Self::new(io::BufWriter::new(File::create(path)?), window))
    }
}

impl<W: Write> ScoreTraceWriter<W> {
    pub fn new(writer: W, window: usize) -> Self {
        Self {
            writer,
            window: window.max(1),
        }
    }

    pub fn write_trace(&mut self, name: &str, trace: &ScoreTrace) -> Result<()> {
        write!(self.writer, "{name}\t{}\t{}", trace.begin, trace.end)?;
        for sum in trace.windowed(self.window) {
            write!(self.writer, "\t{sum}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
