//! The runtime value model (component A, §3 DATA MODEL).
//!
//! `Value` is the tagged sum every expression evaluates to. Containers are shared
//! (`Rc<RefCell<..>>`) so that in-place mutation (`list[0] := v`, field assignment,
//! closures capturing an enclosing object) behaves the way a dynamically-typed
//! interpreter's heap does; the crate is single-threaded-cooperative throughout
//! (concurrency runtime tasks run on one executor, §9 "single-threaded cooperative
//! backends are acceptable"), so `Rc`/`RefCell` never needs to cross a real OS thread
//! boundary.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::Block;
use crate::concurrency::{ActorHandle, ChannelHandle, TaskHandle};
use crate::error::{Error, ErrorKind, Position, Result};
use crate::host::HostObject;
use crate::numeric::DynNum;
use crate::temporal::{TemporalAmount, TemporalPoint};

pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Built-in categorical type tags (§3 "TypeDescriptor").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    List,
    Set,
    Map,
    Pair,
    Triple,
    Tuple,
    Struct,
    String,
    Char,
    Byte,
    Short,
    Int,
    Long,
    BigInt,
    Float,
    Double,
    BigDecimal,
    VarNumber,
    Var,
    Duration,
    Period,
    PeriodDuration,
    Date,
    Time,
    DateTime,
    Boolean,
    Void,
    Host,
}

impl TypeTag {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeTag::Byte
                | TypeTag::Short
                | TypeTag::Int
                | TypeTag::Long
                | TypeTag::BigInt
                | TypeTag::Float
                | TypeTag::Double
                | TypeTag::BigDecimal
                | TypeTag::VarNumber
        )
    }

    /// Numeric widening rank, used by [`TypeDescriptor::accepts_numeric`] (§4.A
    /// assignability: "DynNum is assignable to any numeric T it losslessly fits").
    fn numeric_rank(self) -> Option<u8> {
        Some(match self {
            TypeTag::Byte => 0,
            TypeTag::Short => 1,
            TypeTag::Int => 2,
            TypeTag::Long => 3,
            TypeTag::BigInt => 4,
            TypeTag::Float => 5,
            TypeTag::Double => 6,
            TypeTag::BigDecimal => 7,
            _ => return None,
        })
    }
}

/// `{raw-class, type-parameters, array-component}` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub raw_class: String,
    pub tag: Option<TypeTag>,
    pub type_parameters: Vec<TypeDescriptor>,
    pub array_component: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    pub fn simple(tag: TypeTag, name: impl Into<String>) -> Self {
        Self {
            raw_class: name.into(),
            tag: Some(tag),
            type_parameters: Vec::new(),
            array_component: None,
        }
    }

    pub fn var() -> Self {
        Self::simple(TypeTag::Var, "var")
    }

    pub fn host(name: impl Into<String>) -> Self {
        Self {
            raw_class: name.into(),
            tag: Some(TypeTag::Host),
            type_parameters: Vec::new(),
            array_component: None,
        }
    }

    /// §4.A "Assignability": does `value` assign to `self`?
    pub fn accepts(&self, value: &Value) -> bool {
        match self.tag {
            None => true,
            Some(TypeTag::Var) => true,
            Some(TypeTag::Struct) => true,
            Some(tag) if tag.is_numeric() => match value {
                Value::Number(n) => self.accepts_numeric(n),
                _ => false,
            },
            Some(TypeTag::String) => matches!(value, Value::String(_)),
            Some(TypeTag::Char) => matches!(value, Value::Char(_)),
            Some(TypeTag::Boolean) => matches!(value, Value::Boolean(_)),
            Some(TypeTag::Date) | Some(TypeTag::Time) | Some(TypeTag::DateTime) => {
                matches!(value, Value::TemporalPoint(_))
            }
            Some(TypeTag::Duration) | Some(TypeTag::Period) | Some(TypeTag::PeriodDuration) => {
                matches!(value, Value::TemporalAmount(_))
            }
            Some(TypeTag::List) => match value {
                Value::List(items) => self.accepts_container_elements(&items.borrow()),
                _ => false,
            },
            Some(TypeTag::Set) => match value {
                Value::Set(s) => self.accepts_container_elements(&s.borrow().entries),
                _ => false,
            },
            Some(TypeTag::Map) => match value {
                Value::Map(m) => {
                    let m = m.borrow();
                    let key_ty = self.type_parameters.first();
                    let val_ty = self.type_parameters.get(1);
                    m.entries.iter().all(|(k, v)| {
                        key_ty.map(|t| t.accepts(k)).unwrap_or(true)
                            && val_ty.map(|t| t.accepts(v)).unwrap_or(true)
                    })
                }
                _ => false,
            },
            Some(TypeTag::Pair) => match value {
                Value::Pair(a, b) => {
                    self.type_parameters.first().map(|t| t.accepts(a)).unwrap_or(true)
                        && self.type_parameters.get(1).map(|t| t.accepts(b)).unwrap_or(true)
                }
                _ => false,
            },
            Some(TypeTag::Triple) => match value {
                Value::Triple(a, b, c) => {
                    self.type_parameters.first().map(|t| t.accepts(a)).unwrap_or(true)
                        && self.type_parameters.get(1).map(|t| t.accepts(b)).unwrap_or(true)
                        && self.type_parameters.get(2).map(|t| t.accepts(c)).unwrap_or(true)
                }
                _ => false,
            },
            Some(TypeTag::Tuple) => match value {
                Value::Tuple(items) => {
                    items.len() == self.type_parameters.len()
                        && items
                            .iter()
                            .zip(self.type_parameters.iter())
                            .all(|(v, t)| t.accepts(v))
                }
                _ => false,
            },
            Some(TypeTag::Void) => false,
            Some(TypeTag::Host) => match value {
                Value::HostObject(h) => h.class.is_subtype_of(&self.raw_class),
                _ => false,
            },
        }
    }

    fn accepts_container_elements(&self, items: &[Value]) -> bool {
        match self.type_parameters.first() {
            Some(elem_ty) => items.iter().all(|v| elem_ty.accepts(v)),
            None => true,
        }
    }

    fn accepts_numeric(&self, n: &DynNum) -> bool {
        let Some(target_rank) = self.tag.and_then(TypeTag::numeric_rank) else {
            return matches!(self.tag, Some(TypeTag::VarNumber));
        };
        let value_rank = n.width() as u8;
        value_rank <= target_rank || matches!(self.tag, Some(TypeTag::VarNumber))
    }
}

/// An ordered-or-unordered set of values (§3 "Set(set<Value> with optional
/// insertion-ordering flag)"). Backed by a `Vec` regardless: equality and iteration
/// honor insertion order only when `ordered` is set (§4.C rule 7).
#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
    pub entries: Vec<Value>,
    pub ordered: bool,
}

impl OrderedSet {
    pub fn new(ordered: bool) -> Self {
        Self { entries: Vec::new(), ordered }
    }

    pub fn insert(&mut self, value: Value) -> bool {
        if self.entries.iter().any(|v| v.structural_eq(&value)) {
            return false;
        }
        self.entries.push(value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.entries.iter().any(|v| v.structural_eq(value))
    }
}

/// §3 "Map(mapping<Value,Value> with optional insertion-ordering flag)".
#[derive(Debug, Clone, Default)]
pub struct OrderedMap {
    pub entries: Vec<(Value, Value)>,
    pub ordered: bool,
}

impl OrderedMap {
    pub fn new(ordered: bool) -> Self {
        Self { entries: Vec::new(), ordered }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k.structural_eq(key)).map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.structural_eq(&key)) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Structural equality that honors insertion order only when both sides are
    /// `ordered` (§9 open question: equality on two maps with different insertion
    /// order but identical pairs is equal unless `ordered` was requested).
    pub fn structural_eq(&self, other: &OrderedMap) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        if self.ordered && other.ordered {
            return self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((k1, v1), (k2, v2))| k1.structural_eq(k2) && v1.structural_eq(v2));
        }
        self.entries
            .iter()
            .all(|(k, v)| other.get(k).map(|ov| ov.structural_eq(v)).unwrap_or(false))
    }
}

/// An `Object(mapping<name,Declaration>)` value — the runtime representation of an
/// `@{...}`/`{name:=...}` object literal (§4.F.1).
pub type ObjectFields = Shared<Vec<(String, Value)>>;

#[derive(Clone)]
pub struct DeclaredFunction {
    pub name: String,
    pub is_async: bool,
    pub params: Vec<crate::ast::Param>,
    pub return_type: Option<crate::ast::QualifiedName>,
    pub body: Rc<Block>,
    pub implementation_name: Option<String>,
    pub depth: usize,
    /// Captured enclosing frames, for closures created inside nested scopes (actor
    /// bodies, `scope { }` blocks). Functions declared at top level capture nothing.
    pub closure: Option<crate::scope::ScopeSnapshot>,
}

impl fmt::Debug for DeclaredFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredFunction").field("name", &self.name).finish()
    }
}

pub type BuiltinFn = dyn Fn(&[Value], Position) -> Result<Value>;

#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: String,
    pub arity: Option<usize>,
    pub invoke: Rc<BuiltinFn>,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction").field("name", &self.name).finish()
    }
}

/// The tagged value sum (§3).
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    None,
    Boolean(bool),
    Char(char),
    String(Rc<str>),
    NaN,
    Number(DynNum),
    TemporalPoint(TemporalPoint),
    TemporalAmount(TemporalAmount),
    List(Shared<Vec<Value>>),
    Tuple(Rc<Vec<Value>>),
    Set(Shared<OrderedSet>),
    Map(Shared<OrderedMap>),
    Pair(Box<Value>, Box<Value>),
    Triple(Box<Value>, Box<Value>, Box<Value>),
    Object(ObjectFields),
    HostObject(HostObject),
    Function(Rc<DeclaredFunction>),
    BuiltinFunction(Rc<BuiltinFunction>),
    Task(TaskHandle),
    Channel(ChannelHandle),
    Actor(ActorHandle),
    TypeToken(Rc<TypeDescriptor>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(shared(items))
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::None => "None",
            Value::Boolean(_) => "Boolean",
            Value::Char(_) => "Char",
            Value::String(_) => "String",
            Value::NaN => "NaN",
            Value::Number(_) => "DynNum",
            Value::TemporalPoint(_) => "TemporalPoint",
            Value::TemporalAmount(_) => "TemporalAmount",
            Value::List(_) => "List",
            Value::Tuple(_) => "Tuple",
            Value::Set(_) => "Set",
            Value::Map(_) => "Map",
            Value::Pair(..) => "Pair",
            Value::Triple(..) => "Triple",
            Value::Object(_) => "Object",
            Value::HostObject(_) => "HostObject",
            Value::Function(_) => "Function",
            Value::BuiltinFunction(_) => "BuiltinFunction",
            Value::Task(_) => "Task",
            Value::Channel(_) => "Channel",
            Value::Actor(_) => "Actor",
            Value::TypeToken(_) => "TypeToken",
        }
    }

    /// §4.C rule 5: operand truthiness.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null | Value::None | Value::NaN => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::Char(c) => *c != '\0',
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Set(s) => !s.borrow().entries.is_empty(),
            Value::Map(m) => !m.borrow().entries.is_empty(),
            Value::Object(fields) => !fields.borrow().is_empty(),
            _ => true,
        }
    }

    /// Structural equality (§4.C rule 7). `NaN` never equals anything, including
    /// itself (§3 invariant); host objects compare by reference identity.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::NaN, _) | (_, Value::NaN) => false,
            (Value::Null, Value::Null) => true,
            (Value::None, Value::None) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::TemporalPoint(a), Value::TemporalPoint(b)) => a == b,
            (Value::TemporalAmount(a), Value::TemporalAmount(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Set(a), Value::Set(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                if a.entries.len() != b.entries.len() {
                    return false;
                }
                if a.ordered && b.ordered {
                    a.entries.iter().zip(b.entries.iter()).all(|(x, y)| x.structural_eq(y))
                } else {
                    a.entries.iter().all(|x| b.contains(x))
                }
            }
            (Value::Map(a), Value::Map(b)) => a.borrow().structural_eq(&b.borrow()),
            (Value::Pair(a1, a2), Value::Pair(b1, b2)) => a1.structural_eq(b1) && a2.structural_eq(b2),
            (Value::Triple(a1, a2, a3), Value::Triple(b1, b2, b3)) => {
                a1.structural_eq(b1) && a2.structural_eq(b2) && a3.structural_eq(b3)
            }
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().find(|(k2, _)| k2 == k).map(|(_, v2)| v2.structural_eq(v)).unwrap_or(false))
            },
            (Value::HostObject(a), Value::HostObject(b)) => a.identity_eq(b),
            (Value::TypeToken(a), Value::TypeToken(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltinFunction(a), Value::BuiltinFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Task(a), Value::Task(b)) => a.identity_eq(b),
            (Value::Channel(a), Value::Channel(b)) => a.identity_eq(b),
            (Value::Actor(a), Value::Actor(b)) => a.identity_eq(b),
            _ => false,
        }
    }

    /// §4.F.6 string interpolation formatting (also used by plain `Display`, §C of
    /// SPEC_FULL.md, so the CLI's `--expression` output and interpolation never
    /// diverge).
    pub fn format_interpolated(&self) -> String {
        match self {
            Value::Null | Value::None => "<فارغ>".to_string(),
            Value::NaN => "ليس_رقماً".to_string(),
            Value::Boolean(true) => "صحيح".to_string(),
            Value::Boolean(false) => "خطأ".to_string(),
            Value::Char(c) => c.to_string(),
            Value::String(s) => s.to_string(),
            Value::Number(n) => n.format_as_arabic_text(),
            Value::TemporalPoint(p) => p.format_as_arabic_text(),
            Value::TemporalAmount(a) => a.format_as_arabic_text(),
            Value::List(items) => format_kind("قائمة", items.borrow().iter()),
            Value::Tuple(items) => format_kind("مجموعة", items.iter()),
            Value::Set(s) => format_kind("طقم", s.borrow().entries.iter()),
            Value::Map(m) => {
                let m = m.borrow();
                let rendered: Vec<String> = m
                    .entries
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k.format_interpolated(), v.format_interpolated()))
                    .collect();
                format!("خريطة: [{}]", rendered.join(", "))
            }
            Value::Pair(a, b) => format!("زوج: [{}, {}]", a.format_interpolated(), b.format_interpolated()),
            Value::Triple(a, b, c) => format!(
                "ثلاثي: [{}, {}, {}]",
                a.format_interpolated(),
                b.format_interpolated(),
                c.format_interpolated()
            ),
            Value::Object(fields) => {
                let rendered: Vec<String> = fields
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{k}:={}", v.format_interpolated()))
                    .collect();
                format!("كائن: [{}]", rendered.join(", "))
            }
            Value::HostObject(h) => format!("<{}>", h.class.qualified_name),
            Value::Function(f) => format!("<دالة {}>", f.name),
            Value::BuiltinFunction(f) => format!("<دالة {}>", f.name),
            Value::Task(_) => "<مهمة>".to_string(),
            Value::Channel(_) => "<قناة>".to_string(),
            Value::Actor(_) => "<فاعل>".to_string(),
            Value::TypeToken(t) => format!("<نوع {}>", t.raw_class),
        }
    }

    pub fn type_of(&self) -> TypeDescriptor {
        let tag = match self {
            Value::Null | Value::None => TypeTag::Var,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Char(_) => TypeTag::Char,
            Value::String(_) => TypeTag::String,
            Value::NaN => TypeTag::Double,
            Value::Number(n) => match n {
                DynNum::Byte(_) => TypeTag::Byte,
                DynNum::Short(_) => TypeTag::Short,
                DynNum::Int(_) => TypeTag::Int,
                DynNum::Long(_) => TypeTag::Long,
                DynNum::BigInt(_) => TypeTag::BigInt,
                DynNum::Float(_) => TypeTag::Float,
                DynNum::Double(_) => TypeTag::Double,
                DynNum::BigDecimal(_) => TypeTag::BigDecimal,
            },
            Value::TemporalPoint(p) => p.type_tag(),
            Value::TemporalAmount(a) => a.type_tag(),
            Value::List(_) => TypeTag::List,
            Value::Tuple(_) => TypeTag::Tuple,
            Value::Set(_) => TypeTag::Set,
            Value::Map(_) => TypeTag::Map,
            Value::Pair(..) => TypeTag::Pair,
            Value::Triple(..) => TypeTag::Triple,
            Value::Object(_) => TypeTag::Struct,
            Value::HostObject(_) => TypeTag::Host,
            Value::Function(_) | Value::BuiltinFunction(_) => TypeTag::Var,
            Value::Task(_) | Value::Channel(_) | Value::Actor(_) => TypeTag::Var,
            Value::TypeToken(_) => TypeTag::Var,
        };
        TypeDescriptor::simple(tag, self.tag())
    }

    /// `sizeof` (§4.C unary operations).
    pub fn size_of(&self, pos: Position) -> Result<usize> {
        Ok(match self {
            Value::String(s) => s.chars().count(),
            Value::List(items) => items.borrow().len(),
            Value::Tuple(items) => items.len(),
            Value::Set(s) => s.borrow().entries.len(),
            Value::Map(m) => m.borrow().entries.len(),
            Value::Pair(..) => 2,
            Value::Triple(..) => 3,
            Value::Object(fields) => fields.borrow().len(),
            _ => return Err(Error::new(ErrorKind::TypeMismatch, "sizeof".to_string(), pos)),
        })
    }
}

fn format_kind<'a>(kind: &str, items: impl Iterator<Item = &'a Value>) -> String {
    let rendered: Vec<String> = items.map(|v| v.format_interpolated()).collect();
    format!("{kind}: [{}]", rendered.join(", "))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_interpolated())
    }
}

pub fn arabic_bool(value: bool) -> &'static str {
    if value {
        "صحيح"
    } else {
        "خطأ"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_never_equal() {
        assert!(!Value::NaN.structural_eq(&Value::NaN));
    }

    #[test]
    fn none_and_null_are_distinct() {
        assert!(!Value::None.structural_eq(&Value::Null));
    }

    #[test]
    fn lists_compare_structurally() {
        let a = Value::list(vec![Value::Number(DynNum::Int(1)), Value::Number(DynNum::Int(2))]);
        let b = Value::list(vec![Value::Number(DynNum::Int(1)), Value::Number(DynNum::Int(2))]);
        assert!(a.structural_eq(&b));
    }

    #[test]
    fn truthy_rules_match_spec() {
        assert!(!Value::NaN.truthy());
        assert!(!Value::Null.truthy());
        assert!(!Value::string("").truthy());
        assert!(Value::string("x").truthy());
        assert!(!Value::Number(DynNum::Int(0)).truthy());
    }

    #[test]
    fn maps_ignore_order_unless_both_ordered() {
        let mut a = OrderedMap::new(false);
        a.insert(Value::string("a"), Value::Number(DynNum::Int(1)));
        a.insert(Value::string("b"), Value::Number(DynNum::Int(2)));
        let mut b = OrderedMap::new(false);
        b.insert(Value::string("b"), Value::Number(DynNum::Int(2)));
        b.insert(Value::string("a"), Value::Number(DynNum::Int(1)));
        assert!(a.structural_eq(&b));
    }
}
