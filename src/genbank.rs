//! GenBank flat file references.
//!
//! Only the first record of a file is read. Its ORIGIN sequence becomes the
//! reference, `CDS` features become coding regions and `mat_peptide`
//! features become protein products.

use std::ops::Range;

use log::{debug, warn};

use crate::genome::CdsFeature;
use crate::io::{parse_ranges, FeatureTable};
use crate::sequence::NtSequence;
use crate::{AlignerError, Result};

/// A feature from the FEATURES table, with its location as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenbankFeature {
    pub kind: String,
    pub location: String,
    pub qualifiers: Vec<(String, String)>,
    pub line: usize,
}

impl GenbankFeature {
    /// First value of `key`, without surrounding quotes.
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().trim_matches('"'))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenbankRecord {
    pub locus: String,
    pub definition: String,
    pub sequence: Vec<u8>,
    pub features: Vec<GenbankFeature>,
}

#[derive(PartialEq)]
enum Section {
    Header,
    Features,
    Origin,
}

pub fn looks_like_genbank(text: &str) -> bool {
    text.lines()
        .find(|l| !l.trim().is_empty())
        .map_or(false, |l| l.starts_with("LOCUS"))
}

pub fn parse_genbank(text: &str) -> Result<GenbankRecord> {
    let mut record = GenbankRecord::default();
    let mut section = Section::Header;
    let mut has_locus = false;
    let mut has_origin = false;

    for (index, line) in text.lines().enumerate() {
        if line.starts_with("//") {
            break;
        }
        if section == Section::Origin {
            record
                .sequence
                .extend(line.bytes().filter(u8::is_ascii_alphabetic).map(|b| b.to_ascii_uppercase()));
            continue;
        }
        if line.starts_with("ORIGIN") {
            section = Section::Origin;
            has_origin = true;
            continue;
        }
        if line.starts_with("FEATURES") {
            section = Section::Features;
            continue;
        }
        if section == Section::Features && line.starts_with(' ') {
            feature_line(line, index + 1, &mut record.features);
            continue;
        }

        // BASE COUNT and friends end the feature table
        section = Section::Header;
        if let Some(rest) = line.strip_prefix("LOCUS") {
            record.locus = rest.split_whitespace().next().unwrap_or_default().to_string();
            has_locus = true;
        } else if let Some(rest) = line.strip_prefix("DEFINITION") {
            record.definition = rest.trim().to_string();
        }
    }

    if !has_locus {
        return Err(AlignerError::Parse {
            line: 1,
            message: "GenBank record has no LOCUS line".to_string(),
        });
    }
    if !has_origin || record.sequence.is_empty() {
        return Err(AlignerError::Parse {
            line: text.lines().count(),
            message: format!("GenBank record {} has no ORIGIN sequence", record.locus),
        });
    }
    debug!(
        "Parsed GenBank record {}: {} bases, {} features",
        record.locus,
        record.sequence.len(),
        record.features.len()
    );
    Ok(record)
}

// Feature keys start at column 5, qualifiers and continuations at column 21.
fn feature_line(line: &str, line_no: usize, features: &mut Vec<GenbankFeature>) {
    let key_column = line.get(..21).unwrap_or(line).trim();
    if !key_column.is_empty() {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let kind = parts.next().unwrap_or_default().to_string();
        let location = parts.next().unwrap_or_default().trim().to_string();
        features.push(GenbankFeature {
            kind,
            location,
            qualifiers: Vec::new(),
            line: line_no,
        });
        return;
    }

    let Some(feature) = features.last_mut() else {
        return;
    };
    let content = line.trim();
    if let Some(qualifier) = content.strip_prefix('/') {
        let (key, value) = qualifier.split_once('=').unwrap_or((qualifier, ""));
        feature.qualifiers.push((key.to_string(), value.to_string()));
    } else if let Some((_, value)) = feature.qualifiers.last_mut() {
        value.push(' ');
        value.push_str(content);
    } else {
        // location wrapped over several lines
        feature.location.push_str(content);
    }
}

impl GenbankRecord {
    pub fn reference(&self) -> Result<NtSequence> {
        let description = Some(self.definition.clone()).filter(|d| !d.is_empty());
        Ok(NtSequence::from_text(self.locus.as_str(), &self.sequence)?.with_description(description))
    }

    /// Coding regions and protein products of the record.
    ///
    /// Features on the reverse strand or on another record are skipped with
    /// a warning.
    pub fn feature_table(&self, reference: &NtSequence) -> Result<FeatureTable> {
        let mut table = FeatureTable::default();
        for feature in &self.features {
            let (names, target) = match feature.kind.as_str() {
                "CDS" => (["gene", "product", "locus_tag"], &mut table.cds),
                "mat_peptide" => (["product", "gene", "note"], &mut table.proteins),
                _ => continue,
            };
            let Some(ranges) = feature_ranges(feature)? else {
                warn!(
                    "Skipping {} at line {} with location {}",
                    feature.kind, feature.line, feature.location
                );
                continue;
            };
            let name = names
                .iter()
                .find_map(|key| feature.qualifier(key))
                .map_or_else(|| format!("{}{}", feature.kind, target.len() + 1), str::to_string);
            let frame_offset = match feature.qualifier("codon_start") {
                Some(value) => value
                    .parse::<usize>()
                    .map_err(|_| AlignerError::Parse {
                        line: feature.line,
                        message: format!("bad codon_start {value:?}"),
                    })?
                    .saturating_sub(1),
                None => 0,
            };
            target.push(CdsFeature::new(name, ranges, frame_offset, reference)?);
        }
        table.cds.sort_by_key(|f| f.span().start);
        Ok(table)
    }
}

// None for locations this aligner cannot follow.
fn feature_ranges(feature: &GenbankFeature) -> Result<Option<Vec<Range<usize>>>> {
    let location: String = feature
        .location
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '<' && *c != '>')
        .collect();
    if location.contains("complement") || location.contains(':') {
        return Ok(None);
    }
    let inner = ["join(", "order("]
        .iter()
        .find_map(|prefix| location.strip_prefix(prefix).and_then(|l| l.strip_suffix(')')))
        .unwrap_or(location.as_str());
    parse_ranges(inner, feature.line).map(Some)
}
