//! Environment for variable bindings and the pronoun subject

use super::array::{self, Array};
use super::error::{InterpResult, RuntimeError};
use super::number;
use super::string;
use super::value::Value;
use crate::ast::Variable;
use crate::io::IoRef;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// Reserved common variable holding the process arguments
pub const ARGUMENTS: &str = "__arguments__";

/// Where a write lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Nearest environment that already owns the key, else the current one
    Global,
    /// Always the current environment
    Local,
}

/// Environment holding variable bindings
pub struct Environment {
    /// Variable bindings in this scope, by normalized key
    bindings: HashMap<String, Value>,
    /// Parent environment for lexical scoping
    parent: Option<EnvRef>,
    /// Last assigned or compared variable; not inherited by children
    subject: Option<Variable>,
    io: IoRef,
}

impl Environment {
    /// Create a new root environment
    pub fn new(io: IoRef) -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: None,
            subject: None,
            io,
        }
    }

    /// Root environment with the process arguments bound to `__arguments__`
    pub fn with_args<I, S>(io: IoRef, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut env = Self::new(io);
        let args: Vec<Value> = args.into_iter().map(Value::string).collect();
        env.bindings
            .insert(Variable::common(ARGUMENTS).key(), Value::array(args));
        env
    }

    /// Create a new environment with a parent, sharing its I/O
    pub fn with_parent(parent: EnvRef) -> Self {
        let io = Rc::clone(&parent.borrow().io);
        Environment {
            bindings: HashMap::new(),
            parent: Some(parent),
            subject: None,
            io,
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<&EnvRef> {
        self.parent.as_ref()
    }

    /// Whether this scope itself binds `key`
    pub fn owns(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Look up a key in the scope chain; unbound keys read as mysterious
    pub fn lookup_value(&self, key: &str) -> Value {
        if let Some(value) = self.bindings.get(key) {
            value.clone()
        } else if let Some(parent) = &self.parent {
            parent.borrow().lookup_value(key)
        } else {
            Value::Mysterious
        }
    }

    pub fn subject(&self) -> Option<&Variable> {
        self.subject.as_ref()
    }

    pub fn update_subject(&mut self, variable: &Variable) {
        self.subject = Some(variable.unindexed());
    }

    /// Resolve a pronoun to the current subject; other variables pass through
    pub fn qualify_pronoun(&self, variable: &Variable) -> InterpResult<Variable> {
        if !variable.is_pronoun() {
            return Ok(variable.unindexed());
        }
        self.subject
            .clone()
            .ok_or_else(|| RuntimeError::unbound_pronoun(&variable.name))
    }

    /// Store a value in this scope, optionally through evaluated indexes.
    /// An indexed write to a missing slot creates an empty array there.
    pub fn set_local(
        &mut self,
        variable: &Variable,
        indexes: &[Value],
        value: Value,
    ) -> InterpResult<Value> {
        let key = variable.key();
        if indexes.is_empty() {
            self.bindings.insert(key, value.clone());
            return Ok(value);
        }
        let slot = self
            .bindings
            .entry(key)
            .or_insert_with(|| Value::array(Array::new()));
        match slot {
            Value::Array(cell) => array::set_path(cell, indexes, value.clone())?,
            Value::Str(cell) => string::set_char_at(cell, indexes, &value.to_text()),
            Value::Number(n) => *n = number::set_bit(*n, indexes, value.is_truthy()),
            _ => return Err(RuntimeError::not_indexable(&variable.name)),
        }
        Ok(value)
    }

    pub fn write(&self, text: &str) {
        self.io.borrow_mut().write(text);
    }

    pub fn read_line(&self) -> Option<String> {
        self.io.borrow_mut().read()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.bindings.keys().collect();
        keys.sort();
        f.debug_struct("Environment")
            .field("bindings", &keys)
            .field("subject", &self.subject.as_ref().map(|v| v.key()))
            .field("root", &self.is_root())
            .finish()
    }
}

/// Create a child environment from a parent reference
pub fn child_env(parent: &EnvRef) -> EnvRef {
    Environment::with_parent(Rc::clone(parent)).into_ref()
}

/// Environment a write to `key` lands in
pub fn store_for(env: &EnvRef, key: &str, scope: Scope) -> EnvRef {
    if scope == Scope::Local {
        return Rc::clone(env);
    }
    let mut current = Rc::clone(env);
    loop {
        if current.borrow().owns(key) {
            return current;
        }
        let parent = current.borrow().parent.clone();
        match parent {
            Some(parent) => current = parent,
            None => return Rc::clone(env),
        }
    }
}
