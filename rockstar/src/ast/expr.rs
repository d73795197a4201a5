//! Expression AST nodes

use super::{Block, Variable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Constant; evaluation always produces a fresh value
    Literal(Literal),

    /// Function literal
    Function(Rc<FunctionDef>),

    /// Variable read, with any index expressions applied
    Lookup(Variable),

    /// Binary operation. Arithmetic folds every right-hand operand into the
    /// left (`a + b, c` is `(a + b) + c`); the rest take exactly one.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Vec<Expr>,
    },

    /// Unary operation
    Unary { op: UnaryOp, expr: Box<Expr> },

    /// Function call
    Call(FunctionCall),

    /// Remove and return the last element of an array or string
    Pop(Variable),

    /// Remove and return the first element of an array or string
    Dequeue(Variable),
}

/// Literal constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Number(Decimal),
    Str(String),
    Bool(bool),
    Null,
    Mysterious,
}

/// Function definition: parameters and body, no environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub params: Vec<Variable>,
    pub body: Block,
}

/// Call site: the variable holding the closure, and argument expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub function: Variable,
    #[serde(default)]
    pub args: Vec<Expr>,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    // Arithmetic
    Plus,
    Minus,
    Times,
    Divide,

    // Comparison
    Equals,
    NotEquals,
    IdenticalTo,
    NotIdenticalTo,
    LessThan,
    LessThanEqual,
    MoreThan,
    MoreThanEqual,

    // Logical
    And,
    Or,
    Nor,
}

impl BinaryOp {
    /// Comparisons make their left-hand variable the pronoun subject when
    /// used as a condition
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equals
                | BinaryOp::NotEquals
                | BinaryOp::IdenticalTo
                | BinaryOp::NotIdenticalTo
                | BinaryOp::LessThan
                | BinaryOp::LessThanEqual
                | BinaryOp::MoreThan
                | BinaryOp::MoreThanEqual
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Divide
        )
    }

    /// Lower-case name used in tree dumps
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Plus => "plus",
            BinaryOp::Minus => "minus",
            BinaryOp::Times => "times",
            BinaryOp::Divide => "divide",
            BinaryOp::Equals => "equals",
            BinaryOp::NotEquals => "not equals",
            BinaryOp::IdenticalTo => "identical to",
            BinaryOp::NotIdenticalTo => "not identical to",
            BinaryOp::LessThan => "less than",
            BinaryOp::LessThanEqual => "less than or equal",
            BinaryOp::MoreThan => "more than",
            BinaryOp::MoreThanEqual => "more than or equal",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Nor => "nor",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Plus => write!(f, "+"),
            BinaryOp::Minus => write!(f, "-"),
            BinaryOp::Times => write!(f, "*"),
            BinaryOp::Divide => write!(f, "/"),
            BinaryOp::Equals => write!(f, "=="),
            BinaryOp::NotEquals => write!(f, "!="),
            BinaryOp::IdenticalTo => write!(f, "==="),
            BinaryOp::NotIdenticalTo => write!(f, "!=="),
            BinaryOp::LessThan => write!(f, "<"),
            BinaryOp::LessThanEqual => write!(f, "<="),
            BinaryOp::MoreThan => write!(f, ">"),
            BinaryOp::MoreThanEqual => write!(f, ">="),
            BinaryOp::And => write!(f, "and"),
            BinaryOp::Or => write!(f, "or"),
            BinaryOp::Nor => write!(f, "nor"),
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// Logical not
    Not,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

impl Expr {
    pub fn number(n: impl Into<Decimal>) -> Expr {
        Expr::Literal(Literal::Number(n.into()))
    }

    pub fn string(s: impl Into<String>) -> Expr {
        Expr::Literal(Literal::Str(s.into()))
    }

    pub fn boolean(b: bool) -> Expr {
        Expr::Literal(Literal::Bool(b))
    }

    pub fn null() -> Expr {
        Expr::Literal(Literal::Null)
    }

    pub fn mysterious() -> Expr {
        Expr::Literal(Literal::Mysterious)
    }

    pub fn lookup(variable: Variable) -> Expr {
        Expr::Lookup(variable)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: vec![rhs],
        }
    }

    /// Arithmetic over a list of right-hand operands
    pub fn fold(op: BinaryOp, lhs: Expr, rhs: Vec<Expr>) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs,
        }
    }

    pub fn not(expr: Expr) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(expr),
        }
    }

    pub fn function(params: Vec<Variable>, body: Block) -> Expr {
        Expr::Function(Rc::new(FunctionDef { params, body }))
    }

    pub fn call(function: Variable, args: Vec<Expr>) -> Expr {
        Expr::Call(FunctionCall { function, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_ops() {
        assert!(BinaryOp::Equals.is_comparison());
        assert!(BinaryOp::MoreThanEqual.is_comparison());
        assert!(!BinaryOp::And.is_comparison());
        assert!(!BinaryOp::Plus.is_comparison());
    }

    #[test]
    fn test_arithmetic_ops() {
        assert!(BinaryOp::Divide.is_arithmetic());
        assert!(!BinaryOp::Nor.is_arithmetic());
    }

    #[test]
    fn test_binary_builder_wraps_single_rhs() {
        let expr = Expr::binary(BinaryOp::Plus, Expr::number(1), Expr::number(2));
        let Expr::Binary { rhs, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(rhs.len(), 1);
    }

    #[test]
    fn test_op_display() {
        assert_eq!(BinaryOp::IdenticalTo.to_string(), "===");
        assert_eq!(UnaryOp::Not.to_string(), "not");
    }
}
