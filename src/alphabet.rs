use std::fmt::Debug;

/// Behaviour shared by every alignment alphabet.
///
/// `int_rep` is the dense index used for matrix lookup, always `< COUNT`.
pub trait Symbol: Copy + Eq + Debug + Send + Sync + 'static {
    const GAP: Self;
    const MISSING: Self;
    const COUNT: usize;

    fn int_rep(self) -> usize;
    fn from_byte(byte: u8) -> Option<Self>;
    fn to_char(self) -> char;
    fn is_ambiguity(self) -> bool;

    fn is_stop_codon(self) -> bool {
        false
    }

    fn is_misaligned(self) -> bool {
        false
    }

    fn is_gap(self) -> bool {
        self == Self::GAP
    }

    fn is_missing(self) -> bool {
        self == Self::MISSING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    M,
    R,
    W,
    S,
    Y,
    K,
    V,
    H,
    D,
    B,
    N,
    Gap,
    Missing,
}

impl Nucleotide {
    pub const ALL: [Nucleotide; 17] = [
        Nucleotide::A,
        Nucleotide::C,
        Nucleotide::G,
        Nucleotide::T,
        Nucleotide::M,
        Nucleotide::R,
        Nucleotide::W,
        Nucleotide::S,
        Nucleotide::Y,
        Nucleotide::K,
        Nucleotide::V,
        Nucleotide::H,
        Nucleotide::D,
        Nucleotide::B,
        Nucleotide::N,
        Nucleotide::Gap,
        Nucleotide::Missing,
    ];

    const BASES: [Nucleotide; 4] = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T];

    // Bit set over A=1, C=2, G=4, T=8
    fn mask(self) -> u8 {
        use Nucleotide::*;
        match self {
            A => 0b0001,
            C => 0b0010,
            G => 0b0100,
            T => 0b1000,
            M => 0b0011,
            R => 0b0101,
            W => 0b1001,
            S => 0b0110,
            Y => 0b1010,
            K => 0b1100,
            V => 0b0111,
            H => 0b1011,
            D => 0b1101,
            B => 0b1110,
            N => 0b1111,
            Gap | Missing => 0,
        }
    }

    /// Concrete bases this symbol may stand for, in A, C, G, T order.
    pub fn expansions(self) -> impl Iterator<Item = Nucleotide> {
        let mask = self.mask();
        Self::BASES.into_iter().filter(move |b| b.mask() & mask != 0)
    }

    pub fn is_base(self) -> bool {
        self.mask().count_ones() == 1
    }

    // Row/column of the NCBI codon table, which orders bases T, C, A, G.
    fn codon_index(self) -> usize {
        match self {
            Nucleotide::T => 0,
            Nucleotide::C => 1,
            Nucleotide::A => 2,
            _ => 3,
        }
    }
}

impl Symbol for Nucleotide {
    const GAP: Self = Nucleotide::Gap;
    const MISSING: Self = Nucleotide::Missing;
    const COUNT: usize = 17;

    fn int_rep(self) -> usize {
        self as usize
    }

    fn from_byte(byte: u8) -> Option<Self> {
        use Nucleotide::*;
        let n = match byte.to_ascii_uppercase() {
            b'A' => A,
            b'C' => C,
            b'G' => G,
            b'T' | b'U' => T,
            b'M' => M,
            b'R' => R,
            b'W' => W,
            b'S' => S,
            b'Y' => Y,
            b'K' => K,
            b'V' => V,
            b'H' => H,
            b'D' => D,
            b'B' => B,
            b'N' | b'X' => N,
            b'-' | b'.' => Gap,
            b'?' => Missing,
            _ => return None,
        };
        Some(n)
    }

    fn to_char(self) -> char {
        b"ACGTMRWSYKVHDBN-?"[self as usize] as char
    }

    fn is_ambiguity(self) -> bool {
        self.mask().count_ones() > 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    X,
    Stop,
    Gap,
    Missing,
}

const AMINO_CHARS: &[u8; 24] = b"ARNDCQEGHILKMFPSTWYVX*-?";

impl AminoAcid {
    pub const ALL: [AminoAcid; 24] = {
        use AminoAcid::*;
        [
            Ala, Arg, Asn, Asp, Cys, Gln, Glu, Gly, His, Ile, Leu, Lys, Met, Phe, Pro, Ser, Thr,
            Trp, Tyr, Val, X, Stop, Gap, Missing,
        ]
    };

    pub fn is_standard(self) -> bool {
        (self as usize) < 20
    }
}

impl Symbol for AminoAcid {
    const GAP: Self = AminoAcid::Gap;
    const MISSING: Self = AminoAcid::Missing;
    const COUNT: usize = 24;

    fn int_rep(self) -> usize {
        self as usize
    }

    fn from_byte(byte: u8) -> Option<Self> {
        let upper = byte.to_ascii_uppercase();
        match upper {
            b'B' | b'Z' | b'J' | b'U' | b'O' => Some(AminoAcid::X),
            b'.' => Some(AminoAcid::Gap),
            _ => AMINO_CHARS
                .iter()
                .position(|&c| c == upper)
                .map(|i| Self::ALL[i]),
        }
    }

    fn to_char(self) -> char {
        AMINO_CHARS[self as usize] as char
    }

    fn is_ambiguity(self) -> bool {
        self == AminoAcid::X
    }

    fn is_stop_codon(self) -> bool {
        self == AminoAcid::Stop
    }

    fn is_misaligned(self) -> bool {
        self == AminoAcid::X
    }
}

// NCBI translation table 1, indexed 16*first + 4*second + third over T, C, A, G.
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

fn translate_bases(a: Nucleotide, b: Nucleotide, c: Nucleotide) -> AminoAcid {
    let idx = 16 * a.codon_index() + 4 * b.codon_index() + c.codon_index();
    AminoAcid::from_byte(STANDARD_CODE[idx]).unwrap_or(AminoAcid::X)
}

/// Translates one codon with the standard genetic code.
///
/// Ambiguous codons resolve to the residue every expansion agrees on, else `X`.
/// Any missing base gives `Missing`; a fully gapped codon gives `Gap` and a partly
/// gapped one `X`.
pub fn translate_codon(codon: [Nucleotide; 3]) -> AminoAcid {
    if codon.iter().any(|n| n.is_missing()) {
        return AminoAcid::Missing;
    }
    let gaps = codon.iter().filter(|n| n.is_gap()).count();
    if gaps == 3 {
        return AminoAcid::Gap;
    }
    if gaps > 0 {
        return AminoAcid::X;
    }

    let [a, b, c] = codon;
    let mut resolved = None;
    for x in a.expansions() {
        for y in b.expansions() {
            for z in c.expansions() {
                let aa = translate_bases(x, y, z);
                match resolved {
                    None => resolved = Some(aa),
                    Some(prev) if prev != aa => return AminoAcid::X,
                    Some(_) => {}
                }
            }
        }
    }
    resolved.unwrap_or(AminoAcid::X)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codon(s: &str) -> [Nucleotide; 3] {
        let b = s.as_bytes();
        [
            Nucleotide::from_byte(b[0]).unwrap(),
            Nucleotide::from_byte(b[1]).unwrap(),
            Nucleotide::from_byte(b[2]).unwrap(),
        ]
    }

    #[test]
    fn test_nucleotide_parsing() {
        assert_eq!(Nucleotide::from_byte(b'a'), Some(Nucleotide::A));
        assert_eq!(Nucleotide::from_byte(b'U'), Some(Nucleotide::T));
        assert_eq!(Nucleotide::from_byte(b'-'), Some(Nucleotide::Gap));
        assert_eq!(Nucleotide::from_byte(b'?'), Some(Nucleotide::Missing));
        assert_eq!(Nucleotide::from_byte(b'Z'), None);
        for n in Nucleotide::ALL {
            assert_eq!(Nucleotide::from_byte(n.to_char() as u8), Some(n));
            assert!(n.int_rep() < Nucleotide::COUNT);
        }
    }

    #[test]
    fn test_ambiguity_and_expansions() {
        assert!(!Nucleotide::A.is_ambiguity());
        assert!(Nucleotide::R.is_ambiguity());
        assert!(!Nucleotide::Gap.is_ambiguity());
        let r: Vec<_> = Nucleotide::R.expansions().collect();
        assert_eq!(r, vec![Nucleotide::A, Nucleotide::G]);
        assert_eq!(Nucleotide::N.expansions().count(), 4);
    }

    #[test]
    fn test_translate_codon() {
        assert_eq!(translate_codon(codon("ATG")), AminoAcid::Met);
        assert_eq!(translate_codon(codon("TAA")), AminoAcid::Stop);
        assert_eq!(translate_codon(codon("GGG")), AminoAcid::Gly);
        assert_eq!(translate_codon(codon("TGG")), AminoAcid::Trp);
        // GGN is always glycine
        assert_eq!(translate_codon(codon("GGN")), AminoAcid::Gly);
        assert_eq!(translate_codon(codon("NNN")), AminoAcid::X);
        assert_eq!(translate_codon(codon("A-G")), AminoAcid::X);
        assert_eq!(translate_codon(codon("---")), AminoAcid::Gap);
        assert_eq!(translate_codon(codon("A?G")), AminoAcid::Missing);
    }

    #[test]
    fn test_amino_acid_flags() {
        assert!(AminoAcid::X.is_ambiguity());
        assert!(AminoAcid::X.is_misaligned());
        assert!(AminoAcid::Stop.is_stop_codon());
        assert!(!AminoAcid::Leu.is_misaligned());
        assert_eq!(AminoAcid::from_byte(b'w'), Some(AminoAcid::Trp));
        assert_eq!(AminoAcid::from_byte(b'B'), Some(AminoAcid::X));
        assert_eq!(AminoAcid::Stop.to_char(), '*');
    }
}
