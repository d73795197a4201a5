//! Statement executor and expression evaluator

use super::array::Array;
use super::env::{child_env, store_for, EnvRef, Scope};
use super::error::{InterpResult, RuntimeError};
use super::flow::{Outcome, Signal};
use super::mutation;
use super::number::{self, Numeric};
use super::string;
use super::value::{Closure, Value};
use crate::ast::{
    BinaryOp, Block, Expr, ForLoop, FunctionCall, FunctionDef, Literal, LoopKind, Program,
    Statement, UnaryOp, Variable,
};
use crate::config::Config;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Argument expressions not consumed by the call site that wrote them.
///
/// Nested calls in one argument list share a bucket: a call evaluates at
/// most as many of its own arguments as it has parameters, takes any it is
/// short of from the bucket, and leaves its surplus for the calls around it.
#[derive(Debug, Default)]
struct ArgBucket<'a> {
    pending: VecDeque<&'a Expr>,
}

/// The interpreter
pub struct Interpreter {
    config: Config,
    /// Current function call depth
    depth: usize,
}

impl Interpreter {
    /// Create an interpreter with the default limits
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Interpreter { config, depth: 0 }
    }

    /// Run every block of a program, stopping early on `exit`
    #[tracing::instrument(level = "debug", skip_all, fields(blocks = program.blocks.len()))]
    pub fn execute(&mut self, program: &Program, env: &EnvRef) -> InterpResult<Outcome> {
        let mut outcome = Outcome::unknown();
        for block in &program.blocks {
            outcome = match self.execute_block(block, env) {
                Err(e) if e.is_exit() => Outcome::exit(),
                other => other?,
            };
            if outcome.signal == Signal::Exit {
                tracing::debug!("program exited");
                break;
            }
        }
        Ok(outcome)
    }

    /// Evaluate an expression with automatic stack growth for deep recursion
    pub fn eval(&mut self, expr: &Expr, env: &EnvRef) -> InterpResult<Value> {
        let (red_zone, grow) = (self.config.stack_red_zone, self.config.stack_grow_size);
        stacker::maybe_grow(red_zone, grow, || self.eval_inner(expr, env))
    }

    fn execute_block(&mut self, block: &Block, env: &EnvRef) -> InterpResult<Outcome> {
        let mut outcome = Outcome::unknown();
        for statement in &block.statements {
            outcome = self.execute_statement(statement, env)?;
            if outcome.stops_block() {
                break;
            }
        }
        Ok(outcome)
    }

    fn execute_statement(&mut self, statement: &Statement, env: &EnvRef) -> InterpResult<Outcome> {
        let (red_zone, grow) = (self.config.stack_red_zone, self.config.stack_grow_size);
        stacker::maybe_grow(red_zone, grow, || {
            tracing::trace!(kind = statement.kind(), "execute");
            self.execute_statement_inner(statement, env)
        })
    }

    fn execute_statement_inner(
        &mut self,
        statement: &Statement,
        env: &EnvRef,
    ) -> InterpResult<Outcome> {
        match statement {
            Statement::Output { expr, suffix } => {
                let value = self.eval(expr, env)?;
                let env = env.borrow();
                env.write(&string::unescape(&value.to_text())?);
                env.write(suffix);
                Ok(Outcome::next(value))
            }

            Statement::Debug(expr) => {
                let value = self.eval(expr, env)?;
                let name = match expr {
                    Expr::Lookup(variable) => format!("{}: ", variable.name),
                    _ => String::new(),
                };
                // Display quotes strings and matches `to_text` for everything else
                let line = format!("DEBUG: {name}{} {value}\n", value.type_name());
                env.borrow().write(&line);
                Ok(Outcome::next(value))
            }

            Statement::Declare { variable, expr } => {
                let value = match expr {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Mysterious,
                };
                self.assign(env, variable, value, Scope::Local)
            }

            Statement::Assign { variable, expr } => {
                let value = self.eval(expr, env)?;
                self.assign(env, variable, value, Scope::Global)
            }

            Statement::Loop {
                kind,
                condition,
                body,
            } => self.run_loop(*kind, condition, body, env),

            Statement::Conditional {
                condition,
                consequent,
                alternate,
            } => {
                update_subject_from_condition(condition, env);
                if self.eval(condition, env)?.is_truthy() {
                    self.execute_block(consequent, env)
                } else if let Some(alternate) = alternate {
                    self.execute_block(alternate, env)
                } else {
                    Ok(Outcome::unknown())
                }
            }

            Statement::Call(call) => {
                let value = self.call(call, env, &mut ArgBucket::default())?;
                Ok(Outcome::next(value))
            }

            Statement::Return(expr) => Ok(Outcome::ret(self.eval(expr, env)?)),
            Statement::Exit => Ok(Outcome::exit()),
            Statement::Continue => Ok(Outcome::skip()),
            Statement::Break => Ok(Outcome::brk()),

            Statement::Enlist { variable, exprs } => self.enlist(variable, exprs, env),

            Statement::Mutation {
                op,
                expr,
                target,
                modifier,
            } => {
                let source = self.eval(expr, env)?;
                let modifier = match modifier {
                    Some(modifier) => Some(self.eval(modifier, env)?),
                    None => None,
                };
                let result = mutation::apply(*op, &source, modifier.as_ref())?;
                if let Some(target) = target {
                    let qualified = env.borrow().qualify_pronoun(target)?;
                    env.borrow_mut().set_local(&qualified, &[], result.clone())?;
                    if !target.is_pronoun() {
                        env.borrow_mut().update_subject(target);
                    }
                }
                Ok(Outcome::next(result))
            }

            Statement::Rounding { variable, round } => {
                let value = self.lookup(variable, env)?;
                let Value::Number(n) = value else {
                    return Err(RuntimeError::type_error(format!(
                        "Can't apply rounding to variable {} of type {}",
                        variable.name,
                        value.type_name()
                    )));
                };
                let rounded = Value::Number(mutation::round(n, *round));
                self.set_variable(env, variable, rounded, Scope::Global)
            }

            Statement::Listen(variable) => {
                let input = env.borrow().read_line();
                let value = input.map_or(Value::Null, Value::string);
                match variable {
                    Some(variable) => self.set_variable(env, variable, value, Scope::Global),
                    None => Ok(Outcome::next(value)),
                }
            }

            Statement::Crement { variable, delta } => self.crement(variable, *delta, env),

            Statement::Expression(expr) => Ok(Outcome::next(self.eval(expr, env)?)),

            Statement::Ninja { variable, number } => {
                let code = self.eval(number, env)?;
                let cell = Rc::new(RefCell::new(String::new()));
                string::append(&cell, &code)?;
                self.assign(env, variable, Value::Str(cell), Scope::Global)
            }

            Statement::ForIn(lp) => self.for_in(lp, env),
            Statement::ForOf(lp) => self.for_of(lp, env),
        }
    }

    /// Bind a value; function literals become closures bound locally
    fn assign(
        &mut self,
        env: &EnvRef,
        variable: &Variable,
        value: Value,
        scope: Scope,
    ) -> InterpResult<Outcome> {
        match value {
            Value::Function(function) => {
                let closure = make_closure(env, function, variable)?;
                self.set_variable(env, variable, closure, Scope::Local)
            }
            other => self.set_variable(env, variable, other, scope),
        }
    }

    fn set_variable(
        &mut self,
        env: &EnvRef,
        variable: &Variable,
        value: Value,
        scope: Scope,
    ) -> InterpResult<Outcome> {
        let target = env.borrow().qualify_pronoun(variable)?;
        let store = store_for(env, &target.key(), scope);
        if !variable.is_pronoun() {
            env.borrow_mut().update_subject(&target);
        }
        let indexes = self.eval_all(&variable.indexes, env)?;
        let stored = store.borrow_mut().set_local(&target, &indexes, value)?;
        Ok(Outcome::next(stored))
    }

    fn lookup(&mut self, variable: &Variable, env: &EnvRef) -> InterpResult<Value> {
        let key = env.borrow().qualify_pronoun(variable)?.key();
        let mut value = env.borrow().lookup_value(&key);
        for index in &variable.indexes {
            let index = self.eval(index, env)?;
            value = value.at_index(&index);
        }
        Ok(value)
    }

    fn eval_all(&mut self, exprs: &[Expr], env: &EnvRef) -> InterpResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e, env)).collect()
    }

    fn eval_inner(&mut self, expr: &Expr, env: &EnvRef) -> InterpResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::Function(def) => Ok(Value::Function(Rc::clone(def))),
            Expr::Lookup(variable) => self.lookup(variable, env),
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs, env),
            Expr::Unary {
                op: UnaryOp::Not,
                expr,
            } => Ok(Value::Bool(!self.eval(expr, env)?.is_truthy())),
            Expr::Call(call) => self.call(call, env, &mut ArgBucket::default()),
            Expr::Pop(variable) => {
                let value = self.lookup_unindexed(variable, env)?;
                Ok(match &value {
                    Value::Array(a) => a.borrow_mut().pop(),
                    Value::Str(s) => string::pop(s),
                    _ => Value::Null,
                })
            }
            Expr::Dequeue(variable) => {
                let value = self.lookup_unindexed(variable, env)?;
                Ok(match &value {
                    Value::Array(a) => a.borrow_mut().dequeue(),
                    Value::Str(s) => string::dequeue(s),
                    _ => Value::Null,
                })
            }
        }
    }

    fn lookup_unindexed(&self, variable: &Variable, env: &EnvRef) -> InterpResult<Value> {
        let key = env.borrow().qualify_pronoun(variable)?.key();
        Ok(env.borrow().lookup_value(&key))
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &[Expr],
        env: &EnvRef,
    ) -> InterpResult<Value> {
        let left = self.eval(lhs, env)?;
        if op.is_arithmetic() {
            return rhs.iter().try_fold(left, |acc, operand| {
                let right = self.eval(operand, env)?;
                acc.arithmetic(op, &right)
            });
        }
        let operand = rhs.first().ok_or_else(|| {
            RuntimeError::type_error(format!("Missing right-hand operand for {op}"))
        })?;
        match op {
            BinaryOp::And if !left.is_truthy() => return Ok(left),
            BinaryOp::Or if left.is_truthy() => return Ok(left),
            BinaryOp::And | BinaryOp::Or => return self.eval(operand, env),
            _ => {}
        }
        let right = self.eval(operand, env)?;
        let result = match op {
            BinaryOp::Nor => !left.is_truthy() && !right.is_truthy(),
            BinaryOp::Equals => left.loose_eq(&right),
            BinaryOp::NotEquals => !left.loose_eq(&right),
            BinaryOp::IdenticalTo => left.identical(&right),
            BinaryOp::NotIdenticalTo => !left.identical(&right),
            BinaryOp::LessThan => left.compare(&right)?.is_lt(),
            BinaryOp::LessThanEqual => left.compare(&right)?.is_le(),
            BinaryOp::MoreThan => left.compare(&right)?.is_gt(),
            BinaryOp::MoreThanEqual => left.compare(&right)?.is_ge(),
            other => return left.arithmetic(other, &right),
        };
        Ok(Value::Bool(result))
    }

    fn run_loop(
        &mut self,
        kind: LoopKind,
        condition: &Expr,
        body: &Block,
        env: &EnvRef,
    ) -> InterpResult<Outcome> {
        let mut outcome = Outcome::unknown();
        while self.eval(condition, env)?.is_truthy() == kind.compare_to() {
            update_subject_from_condition(condition, env);
            outcome = self.execute_block(body, env)?;
            match outcome.signal {
                Signal::Break => return Ok(Outcome::next(outcome.value)),
                Signal::Return | Signal::Exit => return Ok(outcome),
                _ => {}
            }
        }
        Ok(finish_loop(outcome))
    }

    fn for_in(&mut self, lp: &ForLoop, env: &EnvRef) -> InterpResult<Outcome> {
        let Value::Array(array) = self.eval(&lp.expr, env)? else {
            return Err(RuntimeError::type_error(
                "Can't use for-in loops on something that is not an array",
            ));
        };
        let (value_var, index_var) = (lp.value(), lp.index());
        let scope = child_env(env);
        let mut outcome = Outcome::unknown();
        let mut position = 0;
        // Length is re-read each pass so the body may grow or shrink the array
        loop {
            let item = array.borrow().items().get(position).cloned();
            let Some(item) = item else {
                break;
            };
            self.set_variable(&scope, &value_var, item, Scope::Local)?;
            if let Some(index) = &index_var {
                let at = Value::number(Decimal::from(position));
                self.set_variable(&scope, index, at, Scope::Local)?;
            }
            position += 1;
            outcome = self.execute_block(&lp.body, &scope)?;
            if outcome.escapes_loop() {
                return Ok(outcome);
            }
            if outcome.signal == Signal::Break {
                return Ok(Outcome::next(outcome.value));
            }
        }
        Ok(finish_loop(outcome))
    }

    fn for_of(&mut self, lp: &ForLoop, env: &EnvRef) -> InterpResult<Outcome> {
        let Value::Array(array) = self.eval(&lp.expr, env)? else {
            return Err(RuntimeError::type_error(
                "Can't use for-of loops on something that is not an array",
            ));
        };
        let entries: Vec<(Value, Value)> = array
            .borrow()
            .entries()
            .map(|(key, value)| (key.value().deep_clone(), value.clone()))
            .collect();
        let (value_var, key_var) = (lp.value(), lp.index());
        let scope = child_env(env);
        let mut outcome = Outcome::unknown();
        for (key, value) in entries {
            self.set_variable(&scope, &value_var, value, Scope::Local)?;
            if let Some(key_var) = &key_var {
                self.set_variable(&scope, key_var, key, Scope::Local)?;
            }
            outcome = self.execute_block(&lp.body, &scope)?;
            if outcome.escapes_loop() {
                return Ok(outcome);
            }
            if outcome.signal == Signal::Break {
                return Ok(Outcome::next(outcome.value));
            }
        }
        Ok(finish_loop(outcome))
    }

    fn enlist(&mut self, variable: &Variable, exprs: &[Expr], env: &EnvRef) -> InterpResult<Outcome> {
        let target = env.borrow().qualify_pronoun(variable)?;
        let current = env.borrow().lookup_value(&target.key());
        if let Value::Str(cell) = &current {
            for expr in exprs {
                let value = self.eval(expr, env)?;
                string::append(cell, &value)?;
            }
            return Ok(Outcome::next(current));
        }
        let array = match current {
            Value::Array(array) => array,
            other => {
                let array = match other {
                    Value::Mysterious => Array::new(),
                    value => Array::from(vec![value]),
                };
                let array = Rc::new(RefCell::new(array));
                env.borrow_mut()
                    .set_local(&target, &[], Value::Array(Rc::clone(&array)))?;
                array
            }
        };
        for expr in exprs {
            let value = self.eval(expr, env)?;
            array.borrow_mut().push(value);
        }
        Ok(Outcome::next(Value::Array(array)))
    }

    fn crement(&mut self, variable: &Variable, delta: i64, env: &EnvRef) -> InterpResult<Outcome> {
        let mut target = env.borrow().qualify_pronoun(variable)?;
        target.indexes = variable.indexes.clone();
        let current = self.lookup(&target, env)?;
        let updated = match &current {
            Value::Null => Value::number(delta),
            Value::Bool(_) if delta % 2 == 0 => return Ok(Outcome::next(current)),
            Value::Bool(b) => Value::Bool(!b),
            Value::Str(s) if s.borrow().is_empty() => Value::number(delta),
            Value::Str(_) => return Err(RuntimeError::string_not_incrementable(&target.name)),
            other => match other.numeric() {
                Some(n) => Value::Number(number::add(n, Decimal::from(delta))?),
                None => {
                    return Err(RuntimeError::not_incrementable(
                        &target.name,
                        other.type_name(),
                    ));
                }
            },
        };
        self.assign(env, &target, updated, Scope::Global)
    }

    fn call<'a>(
        &mut self,
        call: &'a FunctionCall,
        env: &EnvRef,
        bucket: &mut ArgBucket<'a>,
    ) -> InterpResult<Value> {
        let Value::Closure(closure) = self.lookup(&call.function, env)? else {
            return Err(RuntimeError::not_a_function(&call.function.name));
        };
        let params = &closure.function.params;
        let arity = params.len();

        let mut values = Vec::with_capacity(arity);
        for arg in call.args.iter().take(arity) {
            let value = match arg {
                Expr::Call(nested) => self.call(nested, env, bucket)?,
                other => self.eval(other, env)?,
            };
            values.push(value);
        }

        let short = || {
            let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
            RuntimeError::arity_mismatch(&call.function.name, &names, call.args.len())
        };
        if call.args.len() + bucket.pending.len() < arity {
            return Err(short());
        }
        while values.len() < arity {
            let expr = bucket.pending.pop_front().ok_or_else(short)?;
            values.push(self.eval(expr, env)?);
        }
        bucket.pending.extend(call.args.iter().skip(arity));

        let args: Vec<Value> = values.iter().map(Value::deep_clone).collect();
        self.apply(&closure, args)
    }

    /// Run a closure body in a fresh child of its captured scope
    fn apply(&mut self, closure: &Rc<Closure>, args: Vec<Value>) -> InterpResult<Value> {
        self.depth += 1;
        if self.depth > self.config.max_call_depth {
            self.depth -= 1;
            tracing::warn!(depth = self.depth, "call depth limit reached");
            return Err(RuntimeError::stack_overflow(self.config.max_call_depth));
        }
        tracing::debug!(function = %closure.name.name, depth = self.depth, "call");

        let result = self.apply_inner(closure, args);
        self.depth -= 1;
        let outcome = result?;
        match outcome.signal {
            Signal::Return => Ok(outcome.value),
            Signal::Exit => Err(RuntimeError::exit()),
            _ => Ok(Value::Mysterious),
        }
    }

    fn apply_inner(&mut self, closure: &Closure, args: Vec<Value>) -> InterpResult<Outcome> {
        let local = child_env(&closure.scope);
        let params = &closure.function.params;
        for (param, value) in params.iter().zip(args) {
            self.set_variable(&local, param, value, Scope::Local)?;
        }
        if let Some(last) = params.last() {
            local.borrow_mut().update_subject(last);
        }
        self.execute_block(&closure.function.body, &local)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a program with the default configuration
pub fn execute(program: &Program, env: &EnvRef) -> InterpResult<Outcome> {
    Interpreter::new().execute(program, env)
}

/// Evaluate an expression with the default configuration
pub fn eval(expr: &Expr, env: &EnvRef) -> InterpResult<Value> {
    Interpreter::new().eval(expr, env)
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::string(s.as_str()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
        Literal::Mysterious => Value::Mysterious,
    }
}

/// Bind a function to the variable it is assigned to. At the root the
/// closure gets its own child scope; elsewhere it shares the defining one.
fn make_closure(
    env: &EnvRef,
    function: Rc<FunctionDef>,
    variable: &Variable,
) -> InterpResult<Value> {
    let name = env.borrow().qualify_pronoun(variable)?;
    let scope = if env.borrow().is_root() {
        child_env(env)
    } else {
        Rc::clone(env)
    };
    Ok(Value::Closure(Rc::new(Closure {
        function,
        name,
        scope,
    })))
}

/// `if x is 5` makes `x` the subject
fn update_subject_from_condition(condition: &Expr, env: &EnvRef) {
    let Expr::Binary { op, lhs, .. } = condition else {
        return;
    };
    if let Expr::Lookup(variable) = lhs.as_ref() {
        if op.is_comparison() && !variable.is_pronoun() {
            env.borrow_mut().update_subject(variable);
        }
    }
}

/// A `continue` on the last pass doesn't leak out of the loop
fn finish_loop(outcome: Outcome) -> Outcome {
    match outcome.signal {
        Signal::Skip => Outcome::next(outcome.value),
        _ => outcome,
    }
}
