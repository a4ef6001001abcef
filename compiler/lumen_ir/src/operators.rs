//! Binary and unary operators and the precedence table.
//!
//! Lumen groups operators of equal precedence left to right and puts every
//! arithmetic operator on one level, so `1 + 2 · 3` is `(1 + 2) · 3`.
//! Parentheses are the only way to override the grouping.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Map operator text (including ASCII aliases) to an operator.
    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "×" | "·" | "*" => BinaryOp::Mul,
            "÷" | "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "^" => BinaryOp::Pow,
            "=" => BinaryOp::Eq,
            "≠" | "!=" => BinaryOp::NotEq,
            "<" => BinaryOp::Lt,
            "≤" | "<=" => BinaryOp::LtEq,
            ">" => BinaryOp::Gt,
            "≥" | ">=" => BinaryOp::GtEq,
            "&" => BinaryOp::And,
            "|" => BinaryOp::Or,
            _ => return None,
        })
    }

    /// Canonical symbol, used in messages.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "·",
            Self::Div => "÷",
            Self::Rem => "%",
            Self::Pow => "^",
            Self::Eq => "=",
            Self::NotEq => "≠",
            Self::Lt => "<",
            Self::LtEq => "≤",
            Self::Gt => ">",
            Self::GtEq => "≥",
            Self::And => "&",
            Self::Or => "|",
        }
    }

    /// Binding strength; higher binds tighter.
    ///
    /// - 3: every arithmetic operator
    /// - 2: comparison and equality
    /// - 1: `&` `|`
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Rem | Self::Pow => 3,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 2,
            Self::And | Self::Or => 1,
        }
    }

    pub const fn is_arithmetic(self) -> bool {
        self.precedence() == 3
    }

    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Lt | Self::LtEq | Self::Gt | Self::GtEq)
    }

    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq)
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<UnaryOp> {
        match symbol {
            "-" => Some(UnaryOp::Negate),
            "¬" | "~" => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "¬",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_one_operator() {
        assert_eq!(BinaryOp::from_symbol("×"), Some(BinaryOp::Mul));
        assert_eq!(BinaryOp::from_symbol("*"), Some(BinaryOp::Mul));
        assert_eq!(BinaryOp::from_symbol("<="), Some(BinaryOp::LtEq));
        assert_eq!(BinaryOp::from_symbol("=="), None);
    }

    #[test]
    fn arithmetic_shares_one_level() {
        assert_eq!(BinaryOp::Add.precedence(), BinaryOp::Mul.precedence());
        assert!(BinaryOp::Lt.precedence() < BinaryOp::Pow.precedence());
        assert!(BinaryOp::Or.precedence() < BinaryOp::Eq.precedence());
    }
}
