//! Operation Engine (component C, §4.C).
//!
//! Dispatches unary and binary operators against [`Value`] pairs. Each binary operator
//! tries its applicable operand categories in the order §4.C lists them: String/Char
//! concatenation, `DynNum` arithmetic, bitwise, logical, elementwise, equality, then
//! `instanceof` — a mismatch that matches none of them is a `TypeMismatch`.

use std::rc::Rc;

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::{Error, ErrorKind, Position, Result};
use crate::numeric::DynNum;
use crate::value::{arabic_bool, shared, TypeDescriptor, Value};

/// Unary operators: `+ - ! ~`, pre/post increment/decrement, `typeof`, `sizeof` (the
/// latter two are dispatched directly by `eval.rs` since they need the operand's
/// `TypeDescriptor`/size rather than a transformed `Value`).
pub fn apply_unary(op: UnaryOp, operand: &Value, pos: Position) -> Result<Value> {
    match op {
        UnaryOp::Neg => match operand {
            Value::Number(n) => Ok(Value::Number(DynNum::Int(0).sub(n, pos)?)),
            _ => Err(type_mismatch("unary -", pos)),
        },
        UnaryOp::Not => Ok(Value::Boolean(!operand.truthy())),
        UnaryOp::BitNot => match operand {
            Value::Number(n) if n.category() == crate::numeric::Category::Int => {
                let minus_one = DynNum::Int(-1);
                Ok(Value::Number(minus_one.sub(n, pos)?))
            }
            Value::Number(_) => Err(Error::new(ErrorKind::UnsupportedBitwiseDecimal, "~".to_string(), pos)),
            _ => Err(type_mismatch("~", pos)),
        },
    }
}

/// `++`/`--` step amount is always integer `1` regardless of the operand's width
/// (§4.C "increment/decrement operate in the operand's own representation").
pub fn step_value(operand: &Value, pos: Position, increment: bool) -> Result<Value> {
    match operand {
        Value::Number(n) => {
            let one = DynNum::Int(1);
            let result = if increment { n.add(&one, pos)? } else { n.sub(&one, pos)? };
            Ok(Value::Number(result))
        }
        _ => Err(type_mismatch(if increment { "++" } else { "--" }, pos)),
    }
}

/// `&&`/`||` are short-circuiting and must return the *deciding operand value*, not a
/// coerced boolean (§4.C rule 5) — the evaluator special-cases `BinaryOp::And`/`Or`
/// before either operand is evaluated so the unevaluated side is never touched. This
/// fallback only exists for callers that already hold both operand values; it keeps
/// the same "return the operand, not `truthy()`" semantics for consistency.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value, pos: Position) -> Result<Value> {
    use BinaryOp::*;
    match op {
        Eq => return Ok(Value::Boolean(left.structural_eq(right))),
        NotEq => return Ok(Value::Boolean(!left.structural_eq(right))),
        And => return Ok(if left.truthy() { right.clone() } else { left.clone() }),
        Or => return Ok(if left.truthy() { left.clone() } else { right.clone() }),
        _ => {}
    }

    match op {
        Add => add(left, right, pos),
        Sub => numeric_binop(left, right, pos, DynNum::sub, "-"),
        Mul => mul(left, right, pos),
        Div => numeric_binop(left, right, pos, DynNum::div, "/"),
        IntDiv => int_div(left, right, pos),
        Mod => numeric_binop(left, right, pos, DynNum::rem, "%"),
        ElemAdd => elementwise(left, right, pos, BinaryOp::Add),
        ElemSub => elementwise(left, right, pos, BinaryOp::Sub),
        ElemMul => elementwise(left, right, pos, BinaryOp::Mul),
        ElemDiv => elementwise(left, right, pos, BinaryOp::Div),
        ElemMod => elementwise(left, right, pos, BinaryOp::Mod),
        Lt => compare(left, right, pos).map(|o| Value::Boolean(o.is_lt())),
        Le => compare(left, right, pos).map(|o| Value::Boolean(o.is_le())),
        Gt => compare(left, right, pos).map(|o| Value::Boolean(o.is_gt())),
        Ge => compare(left, right, pos).map(|o| Value::Boolean(o.is_ge())),
        BitAnd => bitwise(left, right, pos, |a, b| a & b, "&")
            .or_else(|_| set_op(left, right, pos, SetOp::Intersection)),
        BitOr => bitwise(left, right, pos, |a, b| a | b, "|").or_else(|_| set_op(left, right, pos, SetOp::Union)),
        BitXor => bitwise(left, right, pos, |a, b| a ^ b, "^").or_else(|_| set_op(left, right, pos, SetOp::SymmetricDifference)),
        Shl => bitwise(left, right, pos, |a, b| a.wrapping_shl(b as u32), "<<"),
        Shr => bitwise(left, right, pos, |a, b| a.wrapping_shr(b as u32), ">>"),
        Ushr => bitwise(left, right, pos, |a, b| ((a as u64) >> (b as u32)) as i64, ">>>"),
        Eq | NotEq | And | Or => unreachable!("handled above"),
    }
}

/// `+`: numeric addition, or string/char concatenation (§4.C rule 1: "String/Char
/// operands in `+` concatenate rather than erroring").
fn add(left: &Value, right: &Value, pos: Position) -> Result<Value> {
    match (left, right) {
        (Value::String(_), _) | (_, Value::String(_)) if is_stringy(left) && is_stringy(right) => {
            Ok(Value::string(format!("{}{}", left.format_interpolated(), right.format_interpolated())))
        }
        (Value::Number(_), Value::Number(_)) => numeric_binop(left, right, pos, DynNum::add, "+"),
        (Value::List(a), _) => {
            let mut items = a.borrow().clone();
            items.push(right.clone());
            Ok(Value::List(shared(items)))
        }
        _ => Err(type_mismatch("+", pos)),
    }
}

fn is_stringy(v: &Value) -> bool {
    matches!(v, Value::String(_) | Value::Char(_))
}

/// `*`: numeric multiplication, or `string * N` repetition (§4.C rule 1: "`*` with an
/// integer N repeats (N≥0; negative → `NegativeNumber` error)").
fn mul(left: &Value, right: &Value, pos: Position) -> Result<Value> {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => numeric_binop(left, right, pos, DynNum::mul, "*"),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => repeat_string(s, n, pos),
        _ => Err(type_mismatch("*", pos)),
    }
}

fn repeat_string(s: &Rc<str>, n: &DynNum, pos: Position) -> Result<Value> {
    if n.is_negative() {
        return Err(Error::new(ErrorKind::NegativeNumber, "*".to_string(), pos));
    }
    let count = n.to_f64() as usize;
    Ok(Value::string(s.repeat(count)))
}

fn numeric_binop(
    left: &Value,
    right: &Value,
    pos: Position,
    f: impl Fn(&DynNum, &DynNum, Position) -> Result<DynNum>,
    symbol: &str,
) -> Result<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(a, b, pos)?)),
        _ => Err(type_mismatch(symbol, pos)),
    }
}

/// `قسمة_صحيحة` / IntDiv: truncated integer division regardless of operand category
/// (§4.C rule 3).
fn int_div(left: &Value, right: &Value, pos: Position) -> Result<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if b.is_zero() {
                return Err(Error::at(ErrorKind::DivisionByZero, pos));
            }
            let quotient = a.div(b, pos)?;
            let truncated = DynNum::parse(&(quotient.to_f64().trunc() as i64).to_string(), pos)?;
            Ok(Value::Number(truncated))
        }
        _ => Err(type_mismatch("div", pos)),
    }
}

fn compare(left: &Value, right: &Value, pos: Position) -> Result<std::cmp::Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.compare(b)),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Char(a), Value::Char(b)) => Ok(a.cmp(b)),
        (Value::TemporalPoint(a), Value::TemporalPoint(b)) => Ok(a.compare(b)),
        _ => Err(type_mismatch("ordering", pos)),
    }
}

fn bitwise(left: &Value, right: &Value, pos: Position, f: impl Fn(i64, i64) -> i64, symbol: &str) -> Result<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if a.category() != crate::numeric::Category::Int || b.category() != crate::numeric::Category::Int {
                return Err(Error::new(ErrorKind::UnsupportedBitwiseDecimal, symbol.to_string(), pos));
            }
            let result = f(a.to_i64_lossy(), b.to_i64_lossy());
            Ok(Value::Number(DynNum::parse(&result.to_string(), pos)?))
        }
        (Value::Boolean(a), Value::Boolean(b)) => match symbol {
            "&" => Ok(Value::Boolean(*a & *b)),
            "|" => Ok(Value::Boolean(*a | *b)),
            "^" => Ok(Value::Boolean(*a ^ *b)),
            _ => Err(type_mismatch(symbol, pos)),
        },
        _ => Err(type_mismatch(symbol, pos)),
    }
}

enum SetOp {
    Union,
    Intersection,
    SymmetricDifference,
}

/// §4.C rule 7: `&`/`|`/`^` on two `Set` operands perform intersection/union/symmetric
/// difference instead of bitwise combination.
fn set_op(left: &Value, right: &Value, pos: Position, op: SetOp) -> Result<Value> {
    match (left, right) {
        (Value::Set(a), Value::Set(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            let ordered = a.ordered || b.ordered;
            let mut result = crate::value::OrderedSet::new(ordered);
            match op {
                SetOp::Union => {
                    for v in a.entries.iter().chain(b.entries.iter()) {
                        result.insert(v.clone());
                    }
                }
                SetOp::Intersection => {
                    for v in a.entries.iter() {
                        if b.contains(v) {
                            result.insert(v.clone());
                        }
                    }
                }
                SetOp::SymmetricDifference => {
                    for v in a.entries.iter() {
                        if !b.contains(v) {
                            result.insert(v.clone());
                        }
                    }
                    for v in b.entries.iter() {
                        if !a.contains(v) {
                            result.insert(v.clone());
                        }
                    }
                }
            }
            Ok(Value::Set(shared(result)))
        }
        _ => Err(type_mismatch("set operation", pos)),
    }
}

/// `.+.`/`.-.`/`.*.`/`./.`/`.%.`: elementwise application over two equal-length lists,
/// or a list against a scalar (§4.C rule 6).
fn elementwise(left: &Value, right: &Value, pos: Position, scalar_op: BinaryOp) -> Result<Value> {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            if a.len() != b.len() {
                return Err(Error::new(ErrorKind::TypeMismatch, "elementwise length mismatch".to_string(), pos));
            }
            let result: Result<Vec<Value>> = a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| apply_binary(scalar_op, x, y, pos))
                .collect();
            Ok(Value::List(shared(result?)))
        }
        (Value::List(a), scalar) => {
            let result: Result<Vec<Value>> = a.borrow().iter().map(|x| apply_binary(scalar_op, x, scalar, pos)).collect();
            Ok(Value::List(shared(result?)))
        }
        // Scalar on the left broadcasts across the right operand too (§4.C rule 6: "if
        // one side is a scalar, broadcast across the other" — not list-on-left only).
        (scalar, Value::List(b)) => {
            let result: Result<Vec<Value>> = b.borrow().iter().map(|y| apply_binary(scalar_op, scalar, y, pos)).collect();
            Ok(Value::List(shared(result?)))
        }
        _ => Err(type_mismatch("elementwise", pos)),
    }
}

pub fn instance_of(value: &Value, descriptor: &TypeDescriptor) -> bool {
    descriptor.accepts(value)
}

/// `EmptyArgument` sentinel (§4.C rule 9): calling a builtin with `_` in an argument
/// position passes this marker instead of a value, signalling "use the default".
pub fn empty_argument_marker() -> Value {
    Value::TypeToken(Rc::new(TypeDescriptor::var()))
}

fn type_mismatch(op: &str, pos: Position) -> Error {
    Error::new(ErrorKind::TypeMismatch, op.to_string(), pos)
}

pub fn bool_text(value: bool) -> &'static str {
    arabic_bool(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    #[test]
    fn add_concatenates_strings() {
        let result = apply_binary(
            BinaryOp::Add,
            &Value::string("أ"),
            &Value::string("ب"),
            Position::UNKNOWN,
        )
        .unwrap();
        assert_eq!(result.format_interpolated(), "أب");
    }

    #[test]
    fn elementwise_add_requires_equal_length() {
        let a = Value::list(vec![Value::Number(DynNum::Int(1))]);
        let b = Value::list(vec![Value::Number(DynNum::Int(1)), Value::Number(DynNum::Int(2))]);
        let err = apply_binary(BinaryOp::ElemAdd, &a, &b, Position::UNKNOWN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn elementwise_broadcasts_scalar_on_either_side() {
        let list = Value::list(vec![Value::Number(DynNum::Int(1)), Value::Number(DynNum::Int(2)), Value::Number(DynNum::Int(3))]);
        let scalar = Value::Number(DynNum::Int(5));

        let right_broadcast = apply_binary(BinaryOp::ElemAdd, &list, &scalar, Position::UNKNOWN).unwrap();
        let left_broadcast = apply_binary(BinaryOp::ElemAdd, &scalar, &list, Position::UNKNOWN).unwrap();
        assert_eq!(right_broadcast.format_interpolated(), left_broadcast.format_interpolated());
        assert_eq!(right_broadcast.format_interpolated(), "قائمة: [6, 7, 8]");
    }

    #[test]
    fn and_or_fallback_returns_deciding_operand() {
        let zero = Value::Number(DynNum::Int(0));
        let s = Value::string("x");
        assert_eq!(
            apply_binary(BinaryOp::Or, &zero, &s, Position::UNKNOWN).unwrap().format_interpolated(),
            "x"
        );
        assert_eq!(
            apply_binary(BinaryOp::And, &zero, &s, Position::UNKNOWN).unwrap().format_interpolated(),
            "0"
        );
    }

    #[test]
    fn mul_repeats_strings() {
        let result = apply_binary(BinaryOp::Mul, &Value::string("ab"), &Value::Number(DynNum::Int(3)), Position::UNKNOWN).unwrap();
        assert_eq!(result.format_interpolated(), "ababab");
    }

    #[test]
    fn mul_rejects_negative_repeat_count() {
        let err = apply_binary(BinaryOp::Mul, &Value::string("ab"), &Value::Number(DynNum::Int(-1)), Position::UNKNOWN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NegativeNumber);
    }

    #[test]
    fn bitwise_on_decimal_is_rejected() {
        let a = Value::Number(DynNum::Double(1.5));
        let b = Value::Number(DynNum::Double(2.5));
        let err = apply_binary(BinaryOp::BitAnd, &a, &b, Position::UNKNOWN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedBitwiseDecimal);
    }

    #[test]
    fn set_union_deduplicates() {
        let a = Value::Set(shared({
            let mut s = crate::value::OrderedSet::new(false);
            s.insert(Value::Number(DynNum::Int(1)));
            s
        }));
        let b = Value::Set(shared({
            let mut s = crate::value::OrderedSet::new(false);
            s.insert(Value::Number(DynNum::Int(1)));
            s.insert(Value::Number(DynNum::Int(2)));
            s
        }));
        let result = apply_binary(BinaryOp::BitOr, &a, &b, Position::UNKNOWN).unwrap();
        if let Value::Set(s) = result {
            assert_eq!(s.borrow().entries.len(), 2);
        } else {
            panic!("expected set");
        }
    }
}
