//! Hard limits of the language, enforced with compile errors on overflow.

/// Maximum number of part instances in one module body.
pub const MAX_PARTS: usize = 64;

/// Maximum number of wire statements in one module body, synthesized
/// aggregation wires included.
pub const MAX_WIRES: usize = 32;

/// Maximum total input bit count of one module.
pub const MAX_INPUT_BITS: u32 = 160;

/// Maximum total output bit count of one module.
pub const MAX_OUTPUT_BITS: u32 = 128;

/// Maximum number of module definitions in a compilation session, the three
/// built-in primitives included.
pub const MAX_MODULES: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_match_language_contract() {
        assert_eq!(MAX_PARTS, 64);
        assert_eq!(MAX_WIRES, 32);
        assert_eq!(MAX_INPUT_BITS, 160);
        assert_eq!(MAX_OUTPUT_BITS, 128);
        assert_eq!(MAX_MODULES, 64);
    }
}
