//! Abstract Syntax Tree definitions
//!
//! The tree is produced by an external parser; everything here derives serde
//! so a parser can hand a [`Program`] across as JSON.

mod expr;
mod pretty;
mod variable;

pub use expr::*;
pub use variable::*;

use serde::{Deserialize, Serialize};

/// A program is a sequence of blocks, run in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub blocks: Vec<Block>,
}

/// Statements run in order until one signals something other than `Next`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(blocks: Vec<Block>) -> Self {
        Program { blocks }
    }

    /// Program with a single block
    pub fn from_statements(statements: Vec<Statement>) -> Self {
        Program {
            blocks: vec![Block::new(statements)],
        }
    }
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Block { statements }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// `say X`: write the value's text followed by `suffix`
    Output {
        expr: Expr,
        #[serde(default = "newline")]
        suffix: String,
    },

    /// `debug X`
    Debug(Expr),

    /// `let X be Y`: always binds in the current scope
    Declare {
        variable: Variable,
        #[serde(default)]
        expr: Option<Expr>,
    },

    /// `put Y into X`
    Assign { variable: Variable, expr: Expr },

    /// `while` / `until`
    Loop {
        kind: LoopKind,
        condition: Expr,
        body: Block,
    },

    /// `if` with optional `else`
    Conditional {
        condition: Expr,
        consequent: Block,
        #[serde(default)]
        alternate: Option<Block>,
    },

    /// Function call whose result is discarded
    Call(FunctionCall),

    /// `return X`
    Return(Expr),

    /// Stop the whole program
    Exit,

    /// `continue` / `take it to the top`
    Continue,

    /// `break`
    Break,

    /// `rock X with Y, Z`: append to a string or push onto an array
    Enlist { variable: Variable, exprs: Vec<Expr> },

    /// `split` / `join` / `cast`
    Mutation {
        op: MutationOp,
        expr: Expr,
        #[serde(default)]
        target: Option<Variable>,
        #[serde(default)]
        modifier: Option<Expr>,
    },

    /// `turn X up` / `turn X down` / `turn X round`
    Rounding { variable: Variable, round: Round },

    /// `listen to X`
    Listen(Option<Variable>),

    /// `build X up` / `knock X down`
    Crement { variable: Variable, delta: i64 },

    /// Bare expression, evaluated for its side effects
    Expression(Expr),

    /// `X holds Y`: one-character string from a code point
    Ninja { variable: Variable, number: Expr },

    /// Iterate array elements
    ForIn(ForLoop),

    /// Iterate array map entries
    ForOf(ForLoop),
}

fn newline() -> String {
    "\n".to_string()
}

/// `while` runs while the condition is truthy, `until` while it is falsey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    While,
    Until,
}

impl LoopKind {
    /// Truthiness the condition must have for the body to run
    pub fn compare_to(self) -> bool {
        matches!(self, LoopKind::While)
    }
}

/// Built-in mutation operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOp {
    Split,
    Join,
    Cast,
}

/// Rounding direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    /// Floor
    Down,
    /// Ceiling
    Up,
    /// Nearest, ties to even
    Nearest,
}

/// Shared shape of `for-in` and `for-of` loops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoop {
    value: Variable,
    #[serde(default)]
    index: Option<Variable>,
    pub expr: Expr,
    pub body: Block,
    /// Simple loop variables become `the <name>` common variables
    #[serde(default)]
    pub prepend_article: bool,
}

impl ForLoop {
    pub fn new(
        value: Variable,
        index: Option<Variable>,
        expr: Expr,
        body: Block,
        prepend_article: bool,
    ) -> Self {
        ForLoop {
            value,
            index,
            expr,
            body,
            prepend_article,
        }
    }

    /// Variable bound to each element or entry value
    pub fn value(&self) -> Variable {
        self.with_article(&self.value)
    }

    /// Variable bound to each position or entry key
    pub fn index(&self) -> Option<Variable> {
        self.index.as_ref().map(|index| self.with_article(index))
    }

    fn with_article(&self, variable: &Variable) -> Variable {
        if self.prepend_article && variable.kind == VariableKind::Simple {
            Variable::common(format!("the {}", variable.name))
        } else {
            variable.clone()
        }
    }
}

impl Statement {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Output { .. } => "output",
            Statement::Debug(_) => "debug",
            Statement::Declare { .. } => "declare",
            Statement::Assign { .. } => "assign",
            Statement::Loop { kind: LoopKind::While, .. } => "while",
            Statement::Loop { kind: LoopKind::Until, .. } => "until",
            Statement::Conditional { .. } => "if",
            Statement::Call(_) => "call",
            Statement::Return(_) => "return",
            Statement::Exit => "exit",
            Statement::Continue => "continue",
            Statement::Break => "break",
            Statement::Enlist { .. } => "enlist",
            Statement::Mutation { .. } => "mutation",
            Statement::Rounding { .. } => "rounding",
            Statement::Listen(_) => "listen",
            Statement::Crement { .. } => "crement",
            Statement::Expression(_) => "expression",
            Statement::Ninja { .. } => "ninja",
            Statement::ForIn(_) => "for-in",
            Statement::ForOf(_) => "for-of",
        }
    }

    pub fn output(expr: Expr) -> Statement {
        Statement::Output {
            expr,
            suffix: newline(),
        }
    }

    pub fn assign(variable: Variable, expr: Expr) -> Statement {
        Statement::Assign { variable, expr }
    }

    pub fn declare(variable: Variable, expr: Option<Expr>) -> Statement {
        Statement::Declare { variable, expr }
    }
}
