//! Indented tree dump of the AST, used for debugging parser output

use super::*;
use std::fmt::{self, Display, Formatter, Write};

const INDENT: &str = "  ";

struct Printer<'a, 'b> {
    out: &'a mut Formatter<'b>,
    depth: usize,
}

impl Printer<'_, '_> {
    fn line(&mut self, text: impl Display) -> fmt::Result {
        for _ in 0..self.depth {
            self.out.write_str(INDENT)?;
        }
        writeln!(self.out, "{text}")
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> fmt::Result) -> fmt::Result {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn block(&mut self, block: &Block) -> fmt::Result {
        block.statements.iter().try_for_each(|s| self.statement(s))
    }

    fn labelled_block(&mut self, label: &str, block: &Block) -> fmt::Result {
        self.line(label)?;
        self.nested(|p| p.block(block))
    }

    fn variable(&mut self, variable: &Variable) -> fmt::Result {
        self.line(variable)?;
        if variable.indexes.is_empty() {
            return Ok(());
        }
        self.nested(|p| {
            p.line(if variable.indexes.len() == 1 { "index:" } else { "indexes:" })?;
            p.nested(|p| variable.indexes.iter().try_for_each(|i| p.expr(i)))
        })
    }

    fn statement(&mut self, statement: &Statement) -> fmt::Result {
        match statement {
            Statement::Output { expr, .. } => {
                self.line("output:")?;
                self.nested(|p| p.expr(expr))
            }
            Statement::Debug(expr) => {
                self.line("debug:")?;
                self.nested(|p| p.expr(expr))
            }
            Statement::Declare { variable, expr } => {
                self.line("declare:")?;
                self.nested(|p| {
                    p.variable(variable)?;
                    expr.as_ref().map_or(Ok(()), |e| p.expr(e))
                })
            }
            Statement::Assign { variable, expr } => {
                self.line("assign:")?;
                self.nested(|p| {
                    p.variable(variable)?;
                    p.expr(expr)
                })
            }
            Statement::Loop { kind, condition, body } => {
                self.line(match kind {
                    LoopKind::While => "while:",
                    LoopKind::Until => "until:",
                })?;
                self.nested(|p| {
                    p.expr(condition)?;
                    p.labelled_block("loop:", body)
                })
            }
            Statement::Conditional {
                condition,
                consequent,
                alternate,
            } => {
                self.line("if:")?;
                self.nested(|p| {
                    p.expr(condition)?;
                    p.labelled_block("then:", consequent)?;
                    match alternate {
                        Some(block) => p.labelled_block("else:", block),
                        None => Ok(()),
                    }
                })
            }
            Statement::Call(call) => self.call(call),
            Statement::Return(expr) => {
                self.line("return:")?;
                self.nested(|p| p.expr(expr))
            }
            Statement::Exit => self.line("exit"),
            Statement::Continue => self.line("continue"),
            Statement::Break => self.line("break"),
            Statement::Enlist { variable, exprs } => {
                self.line("enlist:")?;
                self.nested(|p| {
                    p.variable(variable)?;
                    exprs.iter().try_for_each(|e| p.expr(e))
                })
            }
            Statement::Mutation {
                op,
                expr,
                target,
                modifier,
            } => {
                let name = match op {
                    MutationOp::Split => "split:",
                    MutationOp::Join => "join:",
                    MutationOp::Cast => "cast:",
                };
                self.line(name)?;
                self.nested(|p| {
                    p.expr(expr)?;
                    if let Some(target) = target {
                        p.line("into:")?;
                        p.nested(|p| p.variable(target))?;
                    }
                    if let Some(modifier) = modifier {
                        p.line("with:")?;
                        p.nested(|p| p.expr(modifier))?;
                    }
                    Ok(())
                })
            }
            Statement::Rounding { variable, round } => {
                let name = match round {
                    Round::Down => "round down:",
                    Round::Up => "round up:",
                    Round::Nearest => "round nearest:",
                };
                self.line(name)?;
                self.nested(|p| p.variable(variable))
            }
            Statement::Listen(None) => self.line("listen"),
            Statement::Listen(Some(variable)) => {
                self.line("listen:")?;
                self.nested(|p| p.variable(variable))
            }
            Statement::Crement { variable, delta } => {
                let name = if *delta < 0 { "decrement" } else { "increment" };
                self.line(format_args!("{name} {}:", delta.unsigned_abs()))?;
                self.nested(|p| p.variable(variable))
            }
            Statement::Expression(expr) => self.expr(expr),
            Statement::Ninja { variable, number } => {
                self.line("ninja:")?;
                self.nested(|p| {
                    p.variable(variable)?;
                    p.expr(number)
                })
            }
            Statement::ForIn(lp) => self.for_loop("for-in:", lp),
            Statement::ForOf(lp) => self.for_loop("for-of:", lp),
        }
    }

    fn for_loop(&mut self, label: &str, lp: &ForLoop) -> fmt::Result {
        self.line(label)?;
        self.nested(|p| {
            p.variable(&lp.value())?;
            if let Some(index) = lp.index() {
                p.variable(&index)?;
            }
            p.expr(&lp.expr)?;
            p.labelled_block("loop:", &lp.body)
        })
    }

    fn call(&mut self, call: &FunctionCall) -> fmt::Result {
        self.line("call:")?;
        self.nested(|p| {
            p.variable(&call.function)?;
            if call.args.is_empty() {
                return Ok(());
            }
            p.line("args:")?;
            p.nested(|p| call.args.iter().try_for_each(|a| p.expr(a)))
        })
    }

    fn expr(&mut self, expr: &Expr) -> fmt::Result {
        match expr {
            Expr::Literal(literal) => self.line(literal),
            Expr::Function(def) => {
                self.line("function:")?;
                self.nested(|p| {
                    if !def.params.is_empty() {
                        p.line("args:")?;
                        p.nested(|p| def.params.iter().try_for_each(|v| p.variable(v)))?;
                    }
                    p.labelled_block("body:", &def.body)
                })
            }
            Expr::Lookup(variable) => {
                self.line("lookup:")?;
                self.nested(|p| p.variable(variable))
            }
            Expr::Binary { op, lhs, rhs } => {
                self.line(format_args!("{}:", op.name()))?;
                self.nested(|p| {
                    p.expr(lhs)?;
                    rhs.iter().try_for_each(|e| p.expr(e))
                })
            }
            Expr::Unary { op, expr } => {
                self.line(format_args!("{op}:"))?;
                self.nested(|p| p.expr(expr))
            }
            Expr::Call(call) => self.call(call),
            Expr::Pop(variable) => {
                self.line("pop:")?;
                self.nested(|p| p.variable(variable))
            }
            Expr::Dequeue(variable) => {
                self.line("dequeue:")?;
                self.nested(|p| p.variable(variable))
            }
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "number: {}", n.normalize()),
            Literal::Str(s) => {
                f.write_str("string: \"")?;
                for c in s.chars() {
                    match c {
                        '\n' => f.write_str("\\n")?,
                        '"' => f.write_str("\\\"")?,
                        c => f.write_char(c)?,
                    }
                }
                f.write_char('"')
            }
            Literal::Bool(b) => write!(f, "boolean: {b}"),
            Literal::Null => f.write_str("null"),
            Literal::Mysterious => f.write_str("mysterious"),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut printer = Printer { out: f, depth: 0 };
        self.blocks.iter().try_for_each(|b| printer.block(b))
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.block(self)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.statement(self)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.expr(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_assignment_and_output() {
        let program = Program::from_statements(vec![
            Statement::assign(
                Variable::common("my heart"),
                Expr::fold(
                    BinaryOp::Plus,
                    Expr::number(1),
                    vec![Expr::number(2), Expr::string("x")],
                ),
            ),
            Statement::output(Expr::lookup(Variable::pronoun("it"))),
        ]);
        insta::assert_snapshot!(program.to_string(), @r#"
        assign:
          common: my_heart
          plus:
            number: 1
            number: 2
            string: "x"
        output:
          lookup:
            pronoun: it
        "#);
    }

    #[test]
    fn test_dump_conditional_with_indexed_variable() {
        let statement = Statement::Conditional {
            condition: Expr::binary(
                BinaryOp::MoreThan,
                Expr::lookup(Variable::simple("list").at(Expr::number(0))),
                Expr::number(3),
            ),
            consequent: Block::new(vec![Statement::Break]),
            alternate: Some(Block::new(vec![Statement::Continue])),
        };
        insta::assert_snapshot!(statement.to_string(), @r"
        if:
          more than:
            lookup:
              simple: list
                index:
                  number: 0
            number: 3
          then:
            break
          else:
            continue
        ");
    }

    #[test]
    fn test_dump_function() {
        let function = Expr::function(
            vec![Variable::simple("x")],
            Block::new(vec![Statement::Return(Expr::lookup(Variable::simple("x")))]),
        );
        insta::assert_snapshot!(function.to_string(), @r"
        function:
          args:
            simple: x
          body:
            return:
              lookup:
                simple: x
        ");
    }
}
