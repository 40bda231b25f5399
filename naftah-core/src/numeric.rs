//! Dynamic numeric tower (component A, §4.A).
//!
//! `DynNum` is a tagged union over the eight host widths the spec names. Construction
//! always picks the narrowest width that preserves the literal; promotion widens two
//! operands to a common representation before an operation runs. Overflow during an
//! operation widens the *result* one step at a time rather than wrapping (§9 open
//! question: "pick one: widen eagerly is recommended" — this module follows that).

use std::cmp::Ordering;
use std::fmt;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::error::{Error, ErrorKind, Position, Result};
use crate::locale::ARABIC_DECIMAL_SEPARATOR;

/// The eight representations of §3 "DynNum", ordered narrowest-to-widest within each
/// category.
#[derive(Debug, Clone)]
pub enum DynNum {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    BigInt(BigInt),
    Float(f32),
    Double(f64),
    BigDecimal(BigDecimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Int,
    Decimal,
}

/// Width rank within a category; used to pick the wider of two operands (§4.A
/// "promote to the wider of the two widths").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Width {
    Byte,
    Short,
    Int,
    Long,
    BigInt,
    Float,
    Double,
    BigDecimal,
}

impl DynNum {
    pub fn category(&self) -> Category {
        match self {
            DynNum::Byte(_) | DynNum::Short(_) | DynNum::Int(_) | DynNum::Long(_) | DynNum::BigInt(_) => {
                Category::Int
            }
            DynNum::Float(_) | DynNum::Double(_) | DynNum::BigDecimal(_) => Category::Decimal,
        }
    }

    pub fn width(&self) -> Width {
        match self {
            DynNum::Byte(_) => Width::Byte,
            DynNum::Short(_) => Width::Short,
            DynNum::Int(_) => Width::Int,
            DynNum::Long(_) => Width::Long,
            DynNum::BigInt(_) => Width::BigInt,
            DynNum::Float(_) => Width::Float,
            DynNum::Double(_) => Width::Double,
            DynNum::BigDecimal(_) => Width::BigDecimal,
        }
    }

    /// Construct from a (possibly Eastern-Arabic-digit) literal, picking the narrowest
    /// representation that round-trips exactly (§4.A "Parsing dynamic numbers").
    pub fn parse(literal: &str, pos: Position) -> Result<DynNum> {
        let normalized = crate::locale::translit_digits(literal);
        let is_integer_shaped = !normalized.contains('.')
            && !normalized.contains('e')
            && !normalized.contains('E');

        if is_integer_shaped {
            if let Ok(v) = normalized.parse::<i8>() {
                return Ok(DynNum::Byte(v));
            }
            if let Ok(v) = normalized.parse::<i16>() {
                return Ok(DynNum::Short(v));
            }
            if let Ok(v) = normalized.parse::<i32>() {
                return Ok(DynNum::Int(v));
            }
            if let Ok(v) = normalized.parse::<i64>() {
                return Ok(DynNum::Long(v));
            }
            return normalized
                .parse::<BigInt>()
                .map(DynNum::BigInt)
                .map_err(|_| Error::new(ErrorKind::InvalidNumber, literal.to_string(), pos));
        }

        let f64_val = normalized
            .parse::<f64>()
            .map_err(|_| Error::new(ErrorKind::InvalidNumber, literal.to_string(), pos))?;
        if f64_val.is_nan() {
            return Err(Error::new(ErrorKind::NaNValue, literal.to_string(), pos));
        }
        if f64_val.is_infinite() {
            return Err(Error::new(ErrorKind::InfiniteDecimal, literal.to_string(), pos));
        }
        // Float fits if narrowing to f32 and back loses nothing relative to the f64 parse.
        if let Ok(f32_val) = normalized.parse::<f32>() {
            if f32_val.is_finite() && f32_val as f64 == f64_val {
                return Ok(DynNum::Float(f32_val));
            }
        }
        if f64_val.to_string() == normalized {
            return Ok(DynNum::Double(f64_val));
        }
        normalized
            .parse::<BigDecimal>()
            .map(DynNum::BigDecimal)
            .map_err(|_| Error::new(ErrorKind::InvalidNumber, literal.to_string(), pos))
    }

    /// Parse `'digits'R` with `radix` in 2..36 (§4.A); digits accepted case-insensitively.
    pub fn parse_radix(digits: &str, radix: u32, pos: Position) -> Result<DynNum> {
        if !(2..=36).contains(&radix) {
            return Err(Error::new(ErrorKind::InvalidRadix, radix.to_string(), pos));
        }
        let normalized = crate::locale::translit_digits(digits);
        if let Ok(v) = i64::from_str_radix(&normalized, radix) {
            if let Ok(b) = i8::try_from(v) {
                return Ok(DynNum::Byte(b));
            }
            if let Ok(s) = i16::try_from(v) {
                return Ok(DynNum::Short(s));
            }
            if let Ok(i) = i32::try_from(v) {
                return Ok(DynNum::Int(i));
            }
            return Ok(DynNum::Long(v));
        }
        BigInt::parse_bytes(normalized.to_ascii_uppercase().as_bytes(), radix)
            .map(DynNum::BigInt)
            .ok_or_else(|| Error::new(ErrorKind::InvalidNumber, digits.to_string(), pos))
    }

    /// Narrow a wide representation back down to the smallest width that still holds
    /// the value exactly (used after BigInt/BigDecimal arithmetic settles).
    pub fn coerce_to_narrowest(self) -> DynNum {
        match self {
            DynNum::BigInt(ref b) => {
                if let Some(v) = b.to_i64() {
                    if let Ok(v8) = i8::try_from(v) {
                        return DynNum::Byte(v8);
                    }
                    if let Ok(v16) = i16::try_from(v) {
                        return DynNum::Short(v16);
                    }
                    if let Ok(v32) = i32::try_from(v) {
                        return DynNum::Int(v32);
                    }
                    return DynNum::Long(v);
                }
                self
            }
            other => other,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            DynNum::Byte(v) => *v == 0,
            DynNum::Short(v) => *v == 0,
            DynNum::Int(v) => *v == 0,
            DynNum::Long(v) => *v == 0,
            DynNum::BigInt(v) => v.is_zero(),
            DynNum::Float(v) => *v == 0.0,
            DynNum::Double(v) => *v == 0.0,
            DynNum::BigDecimal(v) => v.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            DynNum::Byte(v) => *v < 0,
            DynNum::Short(v) => *v < 0,
            DynNum::Int(v) => *v < 0,
            DynNum::Long(v) => *v < 0,
            DynNum::BigInt(v) => v.sign() == num_bigint::Sign::Minus,
            DynNum::Float(v) => *v < 0.0,
            DynNum::Double(v) => *v < 0.0,
            DynNum::BigDecimal(v) => v.sign() == bigdecimal::num_bigint::Sign::Minus,
        }
    }

    fn to_big_int(&self) -> BigInt {
        match self {
            DynNum::Byte(v) => BigInt::from(*v),
            DynNum::Short(v) => BigInt::from(*v),
            DynNum::Int(v) => BigInt::from(*v),
            DynNum::Long(v) => BigInt::from(*v),
            DynNum::BigInt(v) => v.clone(),
            _ => BigInt::zero(),
        }
    }

    fn to_big_decimal(&self) -> BigDecimal {
        match self {
            DynNum::Byte(v) => BigDecimal::from(*v),
            DynNum::Short(v) => BigDecimal::from(*v),
            DynNum::Int(v) => BigDecimal::from(*v),
            DynNum::Long(v) => BigDecimal::from(*v),
            DynNum::BigInt(v) => BigDecimal::from(v.clone()),
            DynNum::Float(v) => BigDecimal::try_from(*v as f64).unwrap_or_default(),
            DynNum::Double(v) => BigDecimal::try_from(*v).unwrap_or_default(),
            DynNum::BigDecimal(v) => v.clone(),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            DynNum::Byte(v) => *v as f64,
            DynNum::Short(v) => *v as f64,
            DynNum::Int(v) => *v as f64,
            DynNum::Long(v) => *v as f64,
            DynNum::BigInt(v) => v.to_f64().unwrap_or(f64::NAN),
            DynNum::Float(v) => *v as f64,
            DynNum::Double(v) => *v,
            DynNum::BigDecimal(v) => v.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// §4.A promotion rule for a pair of operands: decimal wins over int, then widen
    /// to the wider of the two within the winning category.
    pub fn promote_pair(a: &DynNum, b: &DynNum) -> (DynNum, DynNum) {
        let category = if a.category() == Category::Decimal || b.category() == Category::Decimal {
            Category::Decimal
        } else {
            Category::Int
        };
        let width = a.width().max(b.width());
        let target = match (category, width) {
            (Category::Int, Width::Byte) => Width::Byte,
            (Category::Int, Width::Short) => Width::Short,
            (Category::Int, Width::Int) => Width::Int,
            (Category::Int, Width::Long) => Width::Long,
            (Category::Int, _) => Width::BigInt,
            (Category::Decimal, w) if w <= Width::Float => Width::Float,
            (Category::Decimal, w) if w <= Width::Double => Width::Double,
            (Category::Decimal, _) => Width::BigDecimal,
        };
        (a.cast_to(target), b.cast_to(target))
    }

    fn cast_to(&self, width: Width) -> DynNum {
        match width {
            Width::Byte => DynNum::Byte(self.to_i64_lossy() as i8),
            Width::Short => DynNum::Short(self.to_i64_lossy() as i16),
            Width::Int => DynNum::Int(self.to_i64_lossy() as i32),
            Width::Long => DynNum::Long(self.to_i64_lossy()),
            Width::BigInt => DynNum::BigInt(self.to_big_int()),
            Width::Float => DynNum::Float(self.to_f64() as f32),
            Width::Double => DynNum::Double(self.to_f64()),
            Width::BigDecimal => DynNum::BigDecimal(self.to_big_decimal()),
        }
    }

    pub(crate) fn to_i64_lossy(&self) -> i64 {
        match self {
            DynNum::Byte(v) => *v as i64,
            DynNum::Short(v) => *v as i64,
            DynNum::Int(v) => *v as i64,
            DynNum::Long(v) => *v,
            DynNum::BigInt(v) => v.to_i64().unwrap_or(0),
            DynNum::Float(v) => *v as i64,
            DynNum::Double(v) => *v as i64,
            DynNum::BigDecimal(v) => v.to_i64().unwrap_or(0),
        }
    }

    fn widen_one_step(&self) -> Option<DynNum> {
        match self {
            DynNum::Byte(v) => Some(DynNum::Short(*v as i16)),
            DynNum::Short(v) => Some(DynNum::Int(*v as i32)),
            DynNum::Int(v) => Some(DynNum::Long(*v as i64)),
            DynNum::Long(v) => Some(DynNum::BigInt(BigInt::from(*v))),
            DynNum::BigInt(_) => None,
            DynNum::Float(v) => Some(DynNum::Double(*v as f64)),
            DynNum::Double(v) => Some(DynNum::BigDecimal(BigDecimal::try_from(*v).unwrap_or_default())),
            DynNum::BigDecimal(_) => None,
        }
    }

    pub fn add(&self, other: &DynNum, pos: Position) -> Result<DynNum> {
        self.checked_op(other, pos, ArithOp::Add)
    }

    pub fn sub(&self, other: &DynNum, pos: Position) -> Result<DynNum> {
        self.checked_op(other, pos, ArithOp::Sub)
    }

    pub fn mul(&self, other: &DynNum, pos: Position) -> Result<DynNum> {
        self.checked_op(other, pos, ArithOp::Mul)
    }

    pub fn div(&self, other: &DynNum, pos: Position) -> Result<DynNum> {
        let (a, b) = DynNum::promote_pair(self, other);
        if b.is_zero() {
            if a.category() == Category::Int {
                return Err(Error::at(ErrorKind::DivisionByZero, pos));
            }
            return Err(Error::new(ErrorKind::InfiniteDecimal, "division by zero".into(), pos));
        }
        a.checked_op(&b, pos, ArithOp::Div)
    }

    /// Modulo keeps the dividend's sign (truncated division, §4.C rule 3).
    pub fn rem(&self, other: &DynNum, pos: Position) -> Result<DynNum> {
        if other.is_zero() && other.category() == Category::Int {
            return Err(Error::at(ErrorKind::DivisionByZero, pos));
        }
        self.checked_op(other, pos, ArithOp::Rem)
    }

    /// `**`: exponentiation, widening eagerly on overflow like the other ops.
    pub fn pow(&self, other: &DynNum, pos: Position) -> Result<DynNum> {
        let (base, _) = DynNum::promote_pair(self, other);
        if base.category() == Category::Decimal {
            let result = base.to_f64().powf(other.to_f64());
            if result.is_infinite() {
                return Err(Error::new(ErrorKind::InfiniteDecimal, String::new(), pos));
            }
            return Ok(DynNum::Double(result));
        }
        let exp = other.to_i64_lossy();
        if exp < 0 {
            return Ok(DynNum::Double(base.to_f64().powf(exp as f64)));
        }
        let mut acc = base.to_big_int();
        let mut result = BigInt::from(1);
        let mut e = exp as u64;
        while e > 0 {
            if e & 1 == 1 {
                result *= &acc;
            }
            acc = &acc * &acc;
            e >>= 1;
        }
        Ok(DynNum::BigInt(result).coerce_to_narrowest())
    }

    fn checked_op(&self, other: &DynNum, pos: Position, op: ArithOp) -> Result<DynNum> {
        let (a, b) = DynNum::promote_pair(self, other);
        match (&a, &b) {
            (DynNum::BigInt(x), DynNum::BigInt(y)) => {
                Ok(DynNum::BigInt(op.apply_big_int(x, y)).coerce_to_narrowest())
            }
            (DynNum::BigDecimal(x), DynNum::BigDecimal(y)) => Ok(DynNum::BigDecimal(op.apply_big_decimal(x, y))),
            (DynNum::Float(x), DynNum::Float(y)) => {
                let r = op.apply_f64(*x as f64, *y as f64) as f32;
                if r.is_infinite() {
                    return Err(Error::new(ErrorKind::InfiniteDecimal, String::new(), pos));
                }
                Ok(DynNum::Float(r))
            }
            (DynNum::Double(x), DynNum::Double(y)) => {
                let r = op.apply_f64(*x, *y);
                if r.is_infinite() {
                    return Err(Error::new(ErrorKind::InfiniteDecimal, String::new(), pos));
                }
                Ok(DynNum::Double(r))
            }
            _ => {
                let x = a.to_i64_lossy();
                let y = b.to_i64_lossy();
                match op.apply_i64_checked(x, y) {
                    Some(r) => Ok(cast_int_to_width(r, a.width())),
                    None => match a.widen_one_step() {
                        Some(wider) => wider.checked_op(&b.widen_one_step().unwrap_or(b.clone()), pos, op),
                        None => Ok(DynNum::BigInt(op.apply_big_int(&a.to_big_int(), &b.to_big_int())).coerce_to_narrowest()),
                    },
                }
            }
        }
    }

    pub fn compare(&self, other: &DynNum) -> Ordering {
        let (a, b) = DynNum::promote_pair(self, other);
        match (&a, &b) {
            (DynNum::BigInt(x), DynNum::BigInt(y)) => x.cmp(y),
            (DynNum::BigDecimal(x), DynNum::BigDecimal(y)) => x.cmp(y),
            _ => a.to_f64().partial_cmp(&b.to_f64()).unwrap_or(Ordering::Equal),
        }
    }

    /// Formats the value with the Arabic decimal separator in place of `.`, per §4.F.6
    /// (digits themselves stay Western — S6's `10000.006` interpolates as `10000٫006`,
    /// not with Eastern-Arabic digit glyphs).
    pub fn format_as_arabic_text(&self) -> String {
        let ascii = match self {
            DynNum::Byte(v) => v.to_string(),
            DynNum::Short(v) => v.to_string(),
            DynNum::Int(v) => v.to_string(),
            DynNum::Long(v) => v.to_string(),
            DynNum::BigInt(v) => v.to_string(),
            DynNum::Float(v) => format_decimal_ascii(*v as f64),
            DynNum::Double(v) => format_decimal_ascii(*v),
            DynNum::BigDecimal(v) => v.to_string(),
        };
        ascii.replace('.', &ARABIC_DECIMAL_SEPARATOR.to_string())
    }
}

fn format_decimal_ascii(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// The arithmetic operations `checked_op` dispatches across every representation.
#[derive(Debug, Clone, Copy)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    fn apply_i64_checked(self, a: i64, b: i64) -> Option<i64> {
        match self {
            ArithOp::Add => a.checked_add(b),
            ArithOp::Sub => a.checked_sub(b),
            ArithOp::Mul => a.checked_mul(b),
            ArithOp::Div => a.checked_div(b),
            ArithOp::Rem => a.checked_rem(b),
        }
    }

    fn apply_big_int(self, a: &BigInt, b: &BigInt) -> BigInt {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
            ArithOp::Rem => a % b,
        }
    }

    fn apply_big_decimal(self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
            ArithOp::Rem => a % b,
        }
    }

    fn apply_f64(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
            ArithOp::Rem => a % b,
        }
    }
}

fn cast_int_to_width(v: i64, width: Width) -> DynNum {
    match width {
        Width::Byte => i8::try_from(v).map(DynNum::Byte).unwrap_or_else(|_| DynNum::Short(v as i16)),
        Width::Short => i16::try_from(v).map(DynNum::Short).unwrap_or(DynNum::Int(v as i32)),
        Width::Int => i32::try_from(v).map(DynNum::Int).unwrap_or(DynNum::Long(v)),
        _ => DynNum::Long(v),
    }
}

impl PartialEq for DynNum {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl fmt::Display for DynNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynNum::Byte(v) => write!(f, "{v}"),
            DynNum::Short(v) => write!(f, "{v}"),
            DynNum::Int(v) => write!(f, "{v}"),
            DynNum::Long(v) => write!(f, "{v}"),
            DynNum::BigInt(v) => write!(f, "{v}"),
            DynNum::Float(v) => write!(f, "{v}"),
            DynNum::Double(v) => write!(f, "{v}"),
            DynNum::BigDecimal(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowest_representation_chosen() {
        assert!(matches!(DynNum::parse("5", Position::UNKNOWN).unwrap(), DynNum::Byte(5)));
        assert!(matches!(DynNum::parse("200", Position::UNKNOWN).unwrap(), DynNum::Short(200)));
        assert!(matches!(DynNum::parse("40000", Position::UNKNOWN).unwrap(), DynNum::Int(40000)));
    }

    #[test]
    fn overflow_widens_to_bigint() {
        let n = DynNum::parse("20", Position::UNKNOWN).unwrap();
        let mut fact = DynNum::parse("1", Position::UNKNOWN).unwrap();
        for i in 1..=20i64 {
            let operand = DynNum::parse(&i.to_string(), Position::UNKNOWN).unwrap();
            fact = fact.mul(&operand, Position::UNKNOWN).unwrap();
        }
        let _ = n;
        assert_eq!(fact.to_string(), "2432902008176640000");
    }

    #[test]
    fn add_then_subtract_is_identity() {
        let a = DynNum::parse("100", Position::UNKNOWN).unwrap();
        let b = DynNum::parse("37", Position::UNKNOWN).unwrap();
        let sum = a.add(&b, Position::UNKNOWN).unwrap();
        let back = sum.sub(&b, Position::UNKNOWN).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn division_by_zero_in_int_category_errors() {
        let a = DynNum::parse("10", Position::UNKNOWN).unwrap();
        let zero = DynNum::parse("0", Position::UNKNOWN).unwrap();
        assert!(a.div(&zero, Position::UNKNOWN).is_err());
    }

    #[test]
    fn modulo_keeps_dividend_sign() {
        let a = DynNum::Int(-7);
        let b = DynNum::Int(3);
        let r = a.rem(&b, Position::UNKNOWN).unwrap();
        assert_eq!(r.to_f64(), -1.0);
    }

    #[test]
    fn radix_round_trip() {
        for radix in 2..=36u32 {
            let n = DynNum::parse("123", Position::UNKNOWN).unwrap();
            let text = match &n {
                DynNum::Byte(v) => to_radix_string(*v as i64, radix),
                _ => unreachable!(),
            };
            let parsed = DynNum::parse_radix(&text, radix, Position::UNKNOWN).unwrap();
            assert_eq!(parsed.to_f64(), 123.0);
        }
    }

    fn to_radix_string(mut v: i64, radix: u32) -> String {
        if v == 0 {
            return "0".to_string();
        }
        let digits = "0123456789abcdefghijklmnopqrstuvwxyz";
        let mut out = Vec::new();
        let neg = v < 0;
        v = v.abs();
        while v > 0 {
            out.push(digits.as_bytes()[(v % radix as i64) as usize]);
            v /= radix as i64;
        }
        if neg {
            out.push(b'-');
        }
        out.reverse();
        String::from_utf8(out).unwrap()
    }
}
