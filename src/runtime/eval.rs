//! Expression evaluation.

use rand::Rng;

use crate::lang::{BinaryOp, Builtin, Error, Expr, LogicalOp, UnaryOp, Value};

use super::environment::ScopeId;
use super::Interpreter;

impl Interpreter {
    pub(crate) fn evaluate(&mut self, expr: &Expr, scope: ScopeId) -> Result<Value, Error> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner, scope),
            Expr::Unary { op, operand, line } => {
                let value = self.evaluate(operand, scope)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Negate => value
                        .expect_number("operand of '-'")
                        .map(|n| Value::Number(-n))
                        .map_err(|e| e.at_line(*line)),
                }
            }
            Expr::Binary {
                left,
                op,
                right,
                line,
            } => {
                let left = self.evaluate(left, scope)?;
                let right = self.evaluate(right, scope)?;
                binary(*op, &left, &right).map_err(|e| e.at_line(*line))
            }
            Expr::Logical { left, op, right } => {
                let left = self.evaluate(left, scope)?;
                match (op, left.is_truthy()) {
                    (LogicalOp::Or, true) | (LogicalOp::And, false) => Ok(left),
                    _ => self.evaluate(right, scope),
                }
            }
            Expr::Assign { name, value, line } => {
                let value = self.evaluate(value, scope)?;
                self.env
                    .assign(scope, name, value.clone())
                    .map_err(|e| e.at_line(*line))?;
                Ok(value)
            }
            Expr::Variable { name, line } => {
                self.env.get(scope, name).map_err(|e| e.at_line(*line))
            }
            Expr::Call {
                builtin,
                args,
                line,
            } => {
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(*builtin, &args).map_err(|e| e.at_line(*line))
            }
        }
    }

    fn call(&mut self, builtin: Builtin, args: &[Value]) -> Result<Value, Error> {
        if args.len() != builtin.arity() {
            return Err(Error::runtime(format!(
                "{} expects {} argument(s), got {}",
                builtin.name(),
                builtin.arity(),
                args.len()
            )));
        }
        let number = |i: usize| {
            args[i].expect_number(&format!("argument {} of {}", i + 1, builtin.name()))
        };

        let value = match builtin {
            Builtin::Random => Value::Number(self.rng.gen::<f64>()),
            Builtin::Input => {
                let key = args[0].expect_str("INPUT key")?;
                Value::Bool(self.input.is_key_down(key))
            }
            Builtin::MouseX => {
                let (x, _) = self.input.pointer_position();
                Value::Number((x / self.scale).floor())
            }
            Builtin::MouseY => {
                let (_, y) = self.input.pointer_position();
                Value::Number((y / self.scale).floor())
            }
            Builtin::Int => Value::Number(args[0].to_int()?),
            Builtin::Abs => Value::Number(number(0)?.abs()),
            Builtin::Floor => Value::Number(number(0)?.floor()),
            Builtin::Ceil => Value::Number(number(0)?.ceil()),
            Builtin::Min => Value::Number(number(0)?.min(number(1)?)),
            Builtin::Max => Value::Number(number(0)?.max(number(1)?)),
            Builtin::Lerp => {
                let (a, b, t) = (number(0)?, number(1)?, number(2)?);
                Value::Number(a + (b - a) * t)
            }
        };
        Ok(value)
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Error> {
    let numbers = || left.numeric_pair(right, op.symbol());
    match op {
        BinaryOp::Add => left.add(right),
        BinaryOp::Equal => Ok(Value::Bool(left.equals(right))),
        BinaryOp::NotEqual => Ok(Value::Bool(!left.equals(right))),
        BinaryOp::Subtract => numbers().map(|(a, b)| Value::Number(a - b)),
        BinaryOp::Multiply => numbers().map(|(a, b)| Value::Number(a * b)),
        BinaryOp::Divide => numbers().map(|(a, b)| Value::Number(a / b)),
        BinaryOp::Less => numbers().map(|(a, b)| Value::Bool(a < b)),
        BinaryOp::LessEqual => numbers().map(|(a, b)| Value::Bool(a <= b)),
        BinaryOp::Greater => numbers().map(|(a, b)| Value::Bool(a > b)),
        BinaryOp::GreaterEqual => numbers().map(|(a, b)| Value::Bool(a >= b)),
    }
}
