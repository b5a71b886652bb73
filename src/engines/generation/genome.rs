use std::fmt;

/// Fixed-length bit string encoding one candidate x value.
///
/// Bit 0 is the most significant bit, so the string reads as the binary
/// numeral of the encoded integer. Crossover and mutation work on plain bit
/// positions; `GenomeCodec` turns a genotype into an `Individual`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genotype(Vec<bool>);

impl Genotype {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// Big-endian encoding of `value` in exactly `len` bits.
    ///
    /// Bits of `value` above `len` are dropped.
    pub fn from_integer(value: u64, len: usize) -> Self {
        let bits = (0..len)
            .rev()
            .map(|shift| shift < 64 && (value >> shift) & 1 == 1)
            .collect();
        Self(bits)
    }

    /// Parses a string of `0`/`1` characters
    pub fn parse(text: &str) -> Option<Self> {
        text.chars()
            .map(|c| match c {
                '0' => Some(false),
                '1' => Some(true),
                _ => None,
            })
            .collect::<Option<Vec<bool>>>()
            .map(Self)
    }

    pub fn to_integer(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn flip(&mut self, index: usize) {
        self.0[index] = !self.0[index];
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_encoding_is_big_endian() {
        let genotype = Genotype::parse("00101").unwrap();
        assert_eq!(genotype.to_integer(), 5);
        assert_eq!(Genotype::from_integer(5, 5), genotype);
        assert_eq!(genotype.to_string(), "00101");
    }

    #[test]
    fn test_from_integer_truncates_high_bits() {
        assert_eq!(Genotype::from_integer(0b1_0110, 4).to_string(), "0110");
    }

    #[test]
    fn test_parse_rejects_other_characters() {
        assert!(Genotype::parse("01a1").is_none());
        assert_eq!(Genotype::parse("").map(|g| g.len()), Some(0));
    }

    #[test]
    fn test_flip() {
        let mut genotype = Genotype::parse("000").unwrap();
        genotype.flip(1);
        assert_eq!(genotype.to_string(), "010");
        genotype.flip(1);
        assert_eq!(genotype.to_integer(), 0);
    }
}
