use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Which half of a parameter's partition a value was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquivalenceClass {
    Valid,
    Invalid,
}

impl EquivalenceClass {
    fn from_bit(bit: u64) -> Self {
        if bit == 0 {
            EquivalenceClass::Valid
        } else {
            EquivalenceClass::Invalid
        }
    }
}

impl Display for EquivalenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EquivalenceClass::Valid => "valid",
            EquivalenceClass::Invalid => "invalid",
        };
        write!(f, "{label}")
    }
}

/// Per-parameter class selection over `width` parameters. Bit `p` (counting
/// from the least significant bit) selects the class of parameter `p`; a set
/// bit means that parameter is drawn from its invalid class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassMask {
    bits: u64,
    width: usize,
}

impl ClassMask {
    pub(crate) fn new(bits: u64, width: usize) -> Self {
        Self { bits, width }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn class_of(&self, position: usize) -> EquivalenceClass {
        if position >= self.width {
            return EquivalenceClass::Valid;
        }
        EquivalenceClass::from_bit((self.bits >> position) & 1)
    }

    pub fn is_all_valid(&self) -> bool {
        self.bits() == 0
    }
}

impl Display for ClassMask {
    /// One digit per parameter, parameter 0 first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for position in 0..self.width {
            let digit = match self.class_of(position) {
                EquivalenceClass::Valid => '0',
                EquivalenceClass::Invalid => '1',
            };
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_p_selects_parameter_p() {
        let mask = ClassMask::new(0b01, 2);
        assert_eq!(mask.class_of(0), EquivalenceClass::Invalid);
        assert_eq!(mask.class_of(1), EquivalenceClass::Valid);
        assert_eq!(mask.to_string(), "10");

        let mask = ClassMask::new(0b110, 3);
        assert_eq!(mask.class_of(0), EquivalenceClass::Valid);
        assert_eq!(mask.class_of(2), EquivalenceClass::Invalid);
        assert_eq!(mask.to_string(), "011");
    }

    #[test]
    fn positions_past_width_read_as_valid() {
        assert_eq!(ClassMask::new(0b1, 1).class_of(1), EquivalenceClass::Valid);
    }

    #[test]
    fn zero_mask_is_all_valid() {
        assert!(ClassMask::new(0, 3).is_all_valid());
        assert!(!ClassMask::new(0b100, 3).is_all_valid());
        assert_eq!(ClassMask::new(0b100, 3).to_string(), "001");
        assert_eq!(ClassMask::new(0, 3).to_string(), "000");
    }
}
