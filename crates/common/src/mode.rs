//! Parameter (addressing) modes.

/// How an operand's raw cell value is interpreted.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterMode {
    /// The operand is an address.
    #[default]
    Position = 0,
    /// The operand is the value itself. Never valid as a write target.
    Immediate = 1,
    /// The operand is an offset from the relative base.
    Relative = 2,
}

impl ParameterMode {
    /// Map a single decimal mode digit to a mode.
    pub fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(ParameterMode::Position),
            1 => Some(ParameterMode::Immediate),
            2 => Some(ParameterMode::Relative),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits() {
        assert_eq!(ParameterMode::from_digit(0), Some(ParameterMode::Position));
        assert_eq!(ParameterMode::from_digit(1), Some(ParameterMode::Immediate));
        assert_eq!(ParameterMode::from_digit(2), Some(ParameterMode::Relative));
        assert_eq!(ParameterMode::from_digit(3), None);
        assert_eq!(ParameterMode::from_digit(9), None);
    }

    #[test]
    fn default_is_position() {
        assert_eq!(ParameterMode::default(), ParameterMode::Position);
    }
}
