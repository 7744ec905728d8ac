use crate::alphabet::{AminoAcid, Nucleotide};
use crate::genome_scorer::GenomeScorer;
use crate::matrix::{MatrixName, SubstitutionMatrix};
use crate::scoring::SimpleScorer;
use crate::{AlignerError, Result};

/// Every tunable scoring parameter, built once and handed to preprocessing
/// and scorer construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    pub nt_weight: i32,
    pub nt_gap_open: i32,
    pub nt_gap_extend: i32,
    pub nt_match: i32,
    pub nt_mismatch: i32,
    pub aa_weight: i32,
    pub aa_gap_open: i32,
    pub aa_gap_extend: i32,
    pub aa_matrix: MatrixName,
    pub aa_frameshift: i32,
    pub aa_misalign: i32,
    pub frame_window: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            nt_weight: crate::NT_WEIGHT,
            nt_gap_open: crate::NT_GAP_OPEN,
            nt_gap_extend: crate::NT_GAP_EXTEND,
            nt_match: crate::NT_MATCH,
            nt_mismatch: crate::NT_MISMATCH,
            aa_weight: crate::AA_WEIGHT,
            aa_gap_open: crate::AA_GAP_OPEN,
            aa_gap_extend: crate::AA_GAP_EXTEND,
            aa_matrix: MatrixName::default(),
            aa_frameshift: crate::AA_FRAMESHIFT,
            aa_misalign: crate::AA_MISALIGN,
            frame_window: crate::FRAME_WINDOW,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AlignerError::InvalidConfig(msg));
        if self.nt_weight < 0 || self.aa_weight < 0 {
            return invalid(format!(
                "weights must be non-negative (nt {}, aa {})",
                self.nt_weight, self.aa_weight
            ));
        }
        if self.nt_weight == 0 && self.aa_weight == 0 {
            return invalid("at least one of the nt and aa weights must be positive".to_string());
        }
        for (name, cost) in [
            ("nt-gap-open", self.nt_gap_open),
            ("nt-gap-extend", self.nt_gap_extend),
            ("aa-gap-open", self.aa_gap_open),
            ("aa-gap-extend", self.aa_gap_extend),
            ("aa-frameshift", self.aa_frameshift),
            ("aa-misalign", self.aa_misalign),
        ] {
            if cost > 0 {
                return invalid(format!("{name} must not be positive, got {cost}"));
            }
        }
        if self.nt_match < self.nt_mismatch {
            return invalid(format!(
                "nt-match ({}) is lower than nt-mismatch ({})",
                self.nt_match, self.nt_mismatch
            ));
        }
        if self.frame_window == 0 {
            return invalid("frame window must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn nt_scorer(&self) -> Result<SimpleScorer<Nucleotide>> {
        let matrix = SubstitutionMatrix::nucleotide(self.nt_match, self.nt_mismatch);
        SimpleScorer::new(matrix, self.nt_gap_open, self.nt_gap_extend)
    }

    pub fn aa_scorer(&self) -> Result<SimpleScorer<AminoAcid>> {
        Ok(
            SimpleScorer::new(self.aa_matrix.build(), self.aa_gap_open, self.aa_gap_extend)?
                .with_frameshift_cost(self.aa_frameshift)
                .with_misalignment_cost(self.aa_misalign),
        )
    }

    pub fn genome_scorer(&self) -> Result<GenomeScorer> {
        self.validate()?;
        Ok(GenomeScorer::new(
            self.nt_scorer()?,
            self.aa_scorer()?,
            self.nt_weight,
            self.aa_weight,
        )
        .with_frame_window(self.frame_window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.aa_matrix, MatrixName::Blosum30);
        let scorer = config.genome_scorer().unwrap();
        assert_eq!(scorer.nt_weight(), 1);
        assert_eq!(scorer.aa_scorer().frameshift_cost(), -100);
        assert_eq!(scorer.frame_window(), 1);
    }

    #[test]
    fn test_rejects_positive_costs() {
        let config = ScoringConfig {
            nt_gap_open: 5,
            ..ScoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(AlignerError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_weights() {
        let negative = ScoringConfig {
            aa_weight: -1,
            ..ScoringConfig::default()
        };
        assert!(negative.validate().is_err());
        let zero = ScoringConfig {
            nt_weight: 0,
            aa_weight: 0,
            ..ScoringConfig::default()
        };
        assert!(zero.genome_scorer().is_err());
        let window = ScoringConfig {
            frame_window: 0,
            ..ScoringConfig::default()
        };
        assert!(window.validate().is_err());
    }
}
