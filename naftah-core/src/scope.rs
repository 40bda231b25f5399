//! Scope & Declaration model (component D, §4.D).
//!
//! A [`Scope`] is an ordered stack of frames, each frame a `name -> Declaration`
//! mapping. Lookup walks top to bottom and returns the deepest (nearest) binding;
//! writing an undeclared name creates it in the top frame; writing a `const` after its
//! first initialization is rejected.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::QualifiedName;
use crate::error::{Error, ErrorKind, Position, Result};
use crate::value::{DeclaredFunction, TypeDescriptor, Value};

/// §3 "Declaration (sealed)". Pattern-matched rather than virtually dispatched (§9
/// "Deep inheritance of declaration types").
#[derive(Debug, Clone)]
pub enum Declaration {
    Variable(Box<Binding>),
    Parameter(Box<Binding>),
    Function(Rc<DeclaredFunction>),
    Implementation(Rc<Implementation>),
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub is_const: bool,
    pub declared_type: Option<TypeDescriptor>,
    pub current_value: Value,
    pub is_updated: bool,
    pub depth: usize,
    pub origin_position: Position,
}

#[derive(Debug, Clone)]
pub struct Implementation {
    pub name: String,
    pub functions: HashMap<String, Rc<DeclaredFunction>>,
    pub depth: usize,
}

impl Declaration {
    pub fn depth(&self) -> usize {
        match self {
            Declaration::Variable(b) | Declaration::Parameter(b) => b.depth,
            Declaration::Function(f) => f.depth,
            Declaration::Implementation(i) => i.depth,
        }
    }

    pub fn value(&self) -> Option<Value> {
        match self {
            Declaration::Variable(b) | Declaration::Parameter(b) => Some(b.current_value.clone()),
            Declaration::Function(f) => Some(Value::Function(f.clone())),
            Declaration::Implementation(_) => None,
        }
    }
}

#[derive(Default, Clone)]
struct Frame {
    names: HashMap<String, Declaration>,
    /// Loop/scope labels active at this frame, to reject duplicate reuse (§4.F.3
    /// "reusing the same label inside the same loop is rejected").
    labels: Vec<String>,
}

/// The scope stack. Cheaply cloneable (`Rc<RefCell<..>>` per frame) so that closures
/// (functions, actor bodies) can capture an immutable [`ScopeSnapshot`] without deep
/// copying every binding.
pub struct Scope {
    frames: Vec<Rc<RefCell<Frame>>>,
}

/// A captured view of a [`Scope`] at closure-creation time (§4.F "closures capture an
/// immutable snapshot", §5 "Shared Scope between parent and child tasks is not
/// permitted by default").
#[derive(Clone)]
pub struct ScopeSnapshot {
    frames: Vec<Rc<RefCell<Frame>>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![Rc::new(RefCell::new(Frame::default()))],
        }
    }

    pub fn from_snapshot(snapshot: &ScopeSnapshot) -> Self {
        Self {
            frames: snapshot.frames.clone(),
        }
    }

    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            frames: self.frames.clone(),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Rc::new(RefCell::new(Frame::default())));
    }

    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn push_label(&mut self, label: &str, pos: Position) -> Result<()> {
        let mut frame = self.frames.last().expect("scope always has a frame").borrow_mut();
        if frame.labels.iter().any(|l| l == label) {
            return Err(Error::new(ErrorKind::InvalidLoopLabel, label.to_string(), pos));
        }
        frame.labels.push(label.to_string());
        Ok(())
    }

    pub fn pop_label(&mut self, label: &str) {
        let mut frame = self.frames.last().expect("scope always has a frame").borrow_mut();
        frame.labels.retain(|l| l != label);
    }

    /// Walks top to bottom returning the deepest (nearest) binding (§4.D).
    pub fn lookup(&self, name: &str) -> Option<Declaration> {
        for frame in self.frames.iter().rev() {
            if let Some(decl) = frame.borrow().names.get(name) {
                return Some(decl.clone());
            }
        }
        None
    }

    pub fn lookup_value(&self, name: &str, pos: Position) -> Result<Value> {
        self.lookup(name)
            .and_then(|d| d.value())
            .ok_or_else(|| Error::new(ErrorKind::VariableNotFound, name.to_string(), pos))
    }

    /// A write to an undeclared name at the top frame creates it (§4.D); this helper is
    /// used for destructuring / multi-assignment targets that declare implicitly.
    pub fn declare_variable(
        &mut self,
        name: &str,
        is_const: bool,
        declared_type: Option<TypeDescriptor>,
        value: Value,
        pos: Position,
    ) {
        let depth = self.depth();
        let decl = Declaration::Variable(Box::new(Binding {
            name: name.to_string(),
            is_const,
            declared_type,
            current_value: value,
            is_updated: true,
            depth,
            origin_position: pos,
        }));
        self.frames
            .last()
            .expect("scope always has a frame")
            .borrow_mut()
            .names
            .insert(name.to_string(), decl);
    }

    pub fn declare_function(&mut self, name: &str, func: Rc<DeclaredFunction>) {
        self.frames
            .last()
            .expect("scope always has a frame")
            .borrow_mut()
            .names
            .insert(name.to_string(), Declaration::Function(func));
    }

    pub fn declare_implementation(&mut self, name: &str, implementation: Rc<Implementation>) {
        self.frames
            .last()
            .expect("scope always has a frame")
            .borrow_mut()
            .names
            .insert(name.to_string(), Declaration::Implementation(implementation));
    }

    /// Assignment to an existing binding: rejects writes to `const`s after their first
    /// write (§4.D "Constants: ... second write -> ConstantReassignment"), and
    /// enforces `declared_type` assignability (§3 Variable invariant).
    pub fn assign(&mut self, name: &str, value: Value, pos: Position) -> Result<()> {
        for frame in self.frames.iter().rev() {
            let mut frame = frame.borrow_mut();
            if let Some(decl) = frame.names.get_mut(name) {
                match decl {
                    Declaration::Variable(b) | Declaration::Parameter(b) => {
                        if b.is_const && b.is_updated {
                            return Err(Error::new(ErrorKind::ConstantReassignment, name.to_string(), pos));
                        }
                        if let Some(ty) = &b.declared_type {
                            if !ty.accepts(&value) {
                                return Err(Error::new(ErrorKind::Assignability, name.to_string(), pos));
                            }
                        }
                        b.current_value = value;
                        b.is_updated = true;
                        return Ok(());
                    }
                    Declaration::Function(_) | Declaration::Implementation(_) => {
                        return Err(Error::new(ErrorKind::TypeMismatch, name.to_string(), pos));
                    }
                }
            }
        }
        // Writing an undeclared name at the top frame creates it (§4.D).
        self.declare_variable(name, false, None, value, pos);
        Ok(())
    }

    pub fn resolve_qualified(&self, path: &QualifiedName, pos: Position) -> Result<Value> {
        let full = path.to_dotted();
        if let Some(value) = self.lookup_value(&full, pos).ok() {
            return Ok(value);
        }
        // Fall back to resolving the first segment then walking `:` as member access;
        // `eval.rs` handles object/implementation member resolution beyond plain
        // variable lookup.
        self.lookup_value(path.parts.first().map(String::as_str).unwrap_or(&full), pos)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::DynNum;

    #[test]
    fn lookup_sees_nearest_binding_across_frames() {
        let mut scope = Scope::new();
        scope.declare_variable("x", false, None, Value::Number(DynNum::Int(1)), Position::UNKNOWN);
        scope.push_frame();
        assert_eq!(scope.lookup_value("x", Position::UNKNOWN).unwrap().tag(), "DynNum");
        scope.declare_variable("x", false, None, Value::Number(DynNum::Int(2)), Position::UNKNOWN);
        assert!(matches!(scope.lookup_value("x", Position::UNKNOWN).unwrap(), Value::Number(DynNum::Int(2))));
        scope.pop_frame();
        assert!(matches!(scope.lookup_value("x", Position::UNKNOWN).unwrap(), Value::Number(DynNum::Int(1))));
    }

    #[test]
    fn constant_reassignment_is_rejected() {
        let mut scope = Scope::new();
        scope.declare_variable("c", true, None, Value::Number(DynNum::Int(1)), Position::UNKNOWN);
        let err = scope.assign("c", Value::Number(DynNum::Int(2)), Position::UNKNOWN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ConstantReassignment);
    }

    #[test]
    fn duplicate_label_in_same_frame_rejected() {
        let mut scope = Scope::new();
        scope.push_label("outer", Position::UNKNOWN).unwrap();
        let err = scope.push_label("outer", Position::UNKNOWN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLoopLabel);
    }

    #[test]
    fn property_declare_then_lookup_through_frames() {
        let mut scope = Scope::new();
        scope.declare_variable("n", false, None, Value::Number(DynNum::Int(42)), Position::UNKNOWN);
        scope.push_frame();
        assert!(matches!(scope.lookup_value("n", Position::UNKNOWN).unwrap(), Value::Number(DynNum::Int(42))));
        scope.pop_frame();
        assert!(matches!(scope.lookup_value("n", Position::UNKNOWN).unwrap(), Value::Number(DynNum::Int(42))));
    }
}
