//! Variables and their lookup keys

use super::Expr;
use serde::{Deserialize, Serialize};

/// Naming grammar a variable was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// `counter`
    Simple,
    /// `my heart`, `the night`
    Common,
    /// `Doctor Feelgood`
    Proper,
    /// `it`, `she`, `them`: refers to the current subject
    Pronoun,
}

/// A variable reference, optionally indexed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Name as written in the source
    pub name: String,
    pub kind: VariableKind,
    /// Index expressions, outermost first
    #[serde(default)]
    pub indexes: Vec<Expr>,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Variable {
            name: name.into(),
            kind,
            indexes: Vec::new(),
        }
    }

    pub fn simple(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Simple)
    }

    pub fn common(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Common)
    }

    pub fn proper(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Proper)
    }

    pub fn pronoun(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Pronoun)
    }

    /// Add an index expression
    pub fn at(mut self, index: Expr) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn is_pronoun(&self) -> bool {
        self.kind == VariableKind::Pronoun
    }

    /// The same variable without its indexes
    pub fn unindexed(&self) -> Variable {
        Variable::new(self.name.clone(), self.kind)
    }

    /// Normalized storage key. Whitespace runs in multi-word names collapse
    /// to `_`; proper names are upper-cased, everything else lower-cased.
    ///
    /// Pronouns have no storage of their own and must be qualified against
    /// an environment first; their key is just the lower-cased pronoun.
    pub fn key(&self) -> String {
        match self.kind {
            VariableKind::Simple | VariableKind::Pronoun => self.name.to_lowercase(),
            VariableKind::Common => self.joined_name().to_lowercase(),
            VariableKind::Proper => self.joined_name().to_uppercase(),
        }
    }

    fn joined_name(&self) -> String {
        self.name.split_whitespace().collect::<Vec<_>>().join("_")
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            VariableKind::Simple => "simple",
            VariableKind::Common => "common",
            VariableKind::Proper => "proper",
            VariableKind::Pronoun => return write!(f, "pronoun: {}", self.name),
        };
        write!(f, "{kind}: {}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_key_is_lowercase() {
        assert_eq!(Variable::simple("Counter").key(), "counter");
    }

    #[test]
    fn test_common_keys_normalize_whitespace_and_case() {
        let a = Variable::common("MY VARIABLE");
        let b = Variable::common("my   variable");
        assert_eq!(a.key(), "my_variable");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_proper_key_is_uppercase() {
        assert_eq!(Variable::proper("Doctor  Feelgood").key(), "DOCTOR_FEELGOOD");
    }

    #[test]
    fn test_indexes_do_not_change_key() {
        let v = Variable::simple("list").at(Expr::number(0));
        assert_eq!(v.key(), "list");
        assert_eq!(v.indexes.len(), 1);
        assert!(v.unindexed().indexes.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Variable::common("the night").to_string(), "common: the_night");
        assert_eq!(Variable::pronoun("it").to_string(), "pronoun: it");
    }
}
