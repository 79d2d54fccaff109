//! Z80 flag register bits and shared flag builders.

/// Sign flag (bit 7) - copy of bit 7 of the result.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if the result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5) - usually a copy of bit 5 of the result.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry out of bit 3 (bit 11 for 16-bit ops).
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3) - usually a copy of bit 3 of the result.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2) - parity for logic, overflow for arithmetic.
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if the last operation was a subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7 (bit 15 for 16-bit ops).
pub const CF: u8 = 0b0000_0001;

/// Compute parity of a byte (true if even number of 1 bits).
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// S, Z and the undocumented Y/X bits for a result byte.
#[must_use]
pub const fn sz53(value: u8) -> u8 {
    let mut f = 0;
    if value == 0 {
        f |= ZF;
    }
    if value & 0x80 != 0 {
        f |= SF;
    }
    f |= value & (YF | XF);
    f
}

/// [`sz53`] plus parity in P/V.
#[must_use]
pub const fn sz53p(value: u8) -> u8 {
    let mut f = sz53(value);
    if parity(value) {
        f |= PF;
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_counts_set_bits() {
        assert!(parity(0x00));
        assert!(!parity(0x01));
        assert!(parity(0x03));
        assert!(parity(0xFF));
        assert!(!parity(0x80));
    }

    #[test]
    fn sz53p_builds_expected_bits() {
        assert_eq!(sz53p(0x00), ZF | PF);
        assert_eq!(sz53p(0x80), SF);
        assert_eq!(sz53p(0x28), YF | XF | PF);
        assert_eq!(sz53(0xFF), SF | YF | XF);
    }
}
