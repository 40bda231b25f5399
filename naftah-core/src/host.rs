//! Host Interop Bridge (component E, §4.E).
//!
//! Naftah values can wrap host-provided objects (`HostObject`) and call host-provided
//! classes/packages without the evaluator knowing their concrete shape — the bridge
//! only needs a name, a subtype check, and a constructor/method table, the same three
//! things the teacher's `ResourceResolver` abstracts over for FHIR resources
//! (`libs/fhirpath/src/context.rs`). Overload resolution follows §4.E's explicit cost
//! table rather than Rust's own trait resolution, since Naftah overloads are chosen at
//! runtime from dynamically-typed arguments.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, ErrorKind, Position, Result};
use crate::value::{TypeDescriptor, Value};

/// A host class descriptor: enough to answer `instanceof`/assignability questions and
/// to look up constructors and methods (§4.E "HostClassDirectory").
pub struct HostClass {
    pub qualified_name: String,
    pub supertypes: Vec<String>,
    pub constructors: Vec<HostOverload>,
    pub methods: Vec<HostOverload>,
}

impl HostClass {
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.qualified_name == name || self.supertypes.iter().any(|s| s == name)
    }
}

impl fmt::Debug for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostClass").field("qualified_name", &self.qualified_name).finish()
    }
}

/// One constructor/method signature: a name, a parameter type list, and the actual
/// host-side implementation. Builtin packages (§4.E "builtin_packages") register these
/// directly; a real host bridge (JVM, WASM, FFI) would populate them via reflection.
pub struct HostOverload {
    pub name: String,
    pub params: Vec<TypeDescriptor>,
    pub invoke: Rc<dyn Fn(&[Value], Position) -> Result<Value>>,
}

impl fmt::Debug for HostOverload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostOverload")
            .field("name", &self.name)
            .field("arity", &self.params.len())
            .finish()
    }
}

/// A directory of host classes, queried by qualified name (§4.E). `RuntimeConfig`'s
/// `builtin_classes`/`builtin_packages` lists name the entries this directory is
/// expected to resolve.
#[derive(Default)]
pub struct HostClassDirectory {
    classes: Vec<Rc<HostClass>>,
}

impl HostClassDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: Rc<HostClass>) {
        self.classes.push(class);
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<Rc<HostClass>> {
        self.classes.iter().find(|c| c.qualified_name == qualified_name).cloned()
    }

    /// Constructs a `new T(args...)` value by resolving the best-matching constructor
    /// overload (§4.E overload resolution).
    pub fn construct(&self, qualified_name: &str, args: &[Value], pos: Position) -> Result<Value> {
        let class = self
            .lookup(qualified_name)
            .ok_or_else(|| Error::new(ErrorKind::InvocableNotFound, qualified_name.to_string(), pos))?;
        let overload = resolve_overload(&class.constructors, args, pos)?;
        let result = (overload.invoke)(args, pos)?;
        Ok(result)
    }

    pub fn invoke_method(&self, object: &HostObject, method: &str, args: &[Value], pos: Position) -> Result<Value> {
        let candidates: Vec<&HostOverload> = object.class.methods.iter().filter(|m| m.name == method).collect();
        if candidates.is_empty() {
            return Err(Error::new(ErrorKind::InvocableNotFound, method.to_string(), pos));
        }
        let chosen = resolve_overload_among(&candidates, args, pos)?;
        (chosen.invoke)(args, pos)
    }
}

/// A host-provided object instance: an opaque payload plus the class descriptor used
/// for `instanceof`/overload resolution. Identity equality (§4.C rule 7 "host objects
/// compare by reference identity").
#[derive(Clone)]
pub struct HostObject {
    pub class: Rc<HostClass>,
    pub payload: Rc<dyn std::any::Any>,
}

impl HostObject {
    pub fn new(class: Rc<HostClass>, payload: Rc<dyn std::any::Any>) -> Self {
        Self { class, payload }
    }

    pub fn identity_eq(&self, other: &HostObject) -> bool {
        Rc::ptr_eq(&self.class, &other.class) && Rc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject").field("class", &self.class.qualified_name).finish()
    }
}

/// §4.E overload resolution cost table: 0 exact, 1 subtype, 2 numeric widening, 3
/// container-element conversion, 4 unboxing `null`/`None`; `+inf` (rejected) on
/// arity/assignability mismatch.
fn overload_cost(params: &[TypeDescriptor], args: &[Value]) -> Option<u32> {
    if params.len() != args.len() {
        return None;
    }
    let mut total = 0u32;
    for (param, arg) in params.iter().zip(args.iter()) {
        if !param.accepts(arg) {
            return None;
        }
        total += match (param.tag, arg) {
            (Some(t), Value::Number(_)) if t.is_numeric() => {
                if arg.type_of().tag == Some(t) {
                    0
                } else {
                    2
                }
            }
            (Some(crate::value::TypeTag::Host), Value::HostObject(h)) => {
                if h.class.qualified_name == param.raw_class {
                    0
                } else {
                    1
                }
            }
            (_, Value::Null) | (_, Value::None) => 4,
            (Some(crate::value::TypeTag::List), _) | (Some(crate::value::TypeTag::Set), _) => 3,
            _ => 0,
        };
    }
    Some(total)
}

fn resolve_overload<'a>(overloads: &'a [HostOverload], args: &[Value], pos: Position) -> Result<&'a HostOverload> {
    let refs: Vec<&HostOverload> = overloads.iter().collect();
    resolve_overload_among(&refs, args, pos)
}

/// Picks the lowest-cost overload; ties broken by declaration order, an exact tie at
/// the lowest cost across more than one candidate is `AmbiguousOverload` (§4.E).
fn resolve_overload_among<'a>(overloads: &[&'a HostOverload], args: &[Value], pos: Position) -> Result<&'a HostOverload> {
    let mut scored: Vec<(u32, usize)> = overloads
        .iter()
        .enumerate()
        .filter_map(|(i, o)| overload_cost(&o.params, args).map(|c| (c, i)))
        .collect();
    if scored.is_empty() {
        return Err(Error::new(ErrorKind::ArityMismatch, String::new(), pos));
    }
    scored.sort_by_key(|(cost, _)| *cost);
    let best_cost = scored[0].0;
    let tied: Vec<usize> = scored.iter().filter(|(c, _)| *c == best_cost).map(|(_, i)| *i).collect();
    if tied.len() > 1 {
        return Err(Error::new(ErrorKind::AmbiguousOverload, String::new(), pos));
    }
    Ok(overloads[tied[0]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::DynNum;
    use crate::value::TypeTag;

    fn make_overload(name: &str, params: Vec<TypeDescriptor>) -> HostOverload {
        HostOverload {
            name: name.to_string(),
            params,
            invoke: Rc::new(|_args, _pos| Ok(Value::Null)),
        }
    }

    #[test]
    fn exact_arity_mismatch_is_rejected() {
        let overloads = vec![make_overload("f", vec![TypeDescriptor::simple(TypeTag::Int, "Int")])];
        let refs: Vec<&HostOverload> = overloads.iter().collect();
        let err = resolve_overload_among(&refs, &[], Position::UNKNOWN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
    }

    #[test]
    fn exact_match_wins_over_widening() {
        let overloads = vec![
            make_overload("f", vec![TypeDescriptor::simple(TypeTag::Long, "Long")]),
            make_overload("f", vec![TypeDescriptor::simple(TypeTag::Int, "Int")]),
        ];
        let refs: Vec<&HostOverload> = overloads.iter().collect();
        let args = [Value::Number(DynNum::Int(5))];
        let chosen = resolve_overload_among(&refs, &args, Position::UNKNOWN).unwrap();
        assert!(matches!(chosen.params[0].tag, Some(TypeTag::Int)));
    }

    #[test]
    fn host_objects_compare_by_identity() {
        let class = Rc::new(HostClass {
            qualified_name: "Widget".to_string(),
            supertypes: vec![],
            constructors: vec![],
            methods: vec![],
        });
        let payload: Rc<dyn std::any::Any> = Rc::new(42i32);
        let a = HostObject::new(class.clone(), payload.clone());
        let b = HostObject::new(class, payload);
        assert!(a.identity_eq(&b));
    }
}
