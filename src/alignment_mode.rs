use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    #[default]
    Global, // Needleman-Wunsch, trailing gaps free
    Local,  // Smith-Waterman, unaligned reference reported as skipped
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMode::Global => write!(f, "global"),
            AlignmentMode::Local => write!(f, "local"),
        }
    }
}
