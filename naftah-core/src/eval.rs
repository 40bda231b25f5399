//! Tree-Walking Evaluator (component F, §4.F) — the component every other module in
//! this crate exists to serve. Executes a parsed [`Program`] directly against the
//! [`crate::scope::Scope`] model, dispatching operators through [`crate::ops`],
//! numerics through [`crate::numeric`], and host/concurrency/temporal values through
//! their own modules.
//!
//! Recursive evaluation has to be `async` end-to-end: `await`/`spawn`/channel receive
//! can appear at any expression position, and a function body can itself call another
//! function that awaits. Rust doesn't let an `async fn` call itself directly (the
//! future would have unbounded size), so the mutually-recursive methods below return
//! a hand-boxed `Pin<Box<dyn Future>>` and wrap their body in `Box::pin(async move {
//! .. })`, the same pattern used for recursive pipeline stages elsewhere in the
//! broader pack (`knhk-workflow-engine/src/execution/engine.rs`) — without `Send`
//! here, since Naftah values are `Rc`-based and the whole runtime is
//! single-threaded (§9).

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::ast::{BinaryOp, Block, Expr, Param, Program, QualifiedName, Stmt, StringPart, TemporalKind};
use crate::concurrency::{ActorHandle, ChannelHandle, ConcurrencyScope, ContextMap, TaskHandle};
use crate::config::RuntimeConfig;
use crate::error::{Error, ErrorKind, Position, Result};
use crate::host::HostClassDirectory;
use crate::numeric::DynNum;
use crate::ops;
use crate::scope::{Declaration, Implementation, Scope};
use crate::temporal_parse;
use crate::value::{shared, DeclaredFunction, ObjectFields, TypeDescriptor, TypeTag, Value};

const SELF_BINDING: &str = "ذات";

/// A boxed, non-`Send` future, for the mutually-recursive evaluator methods that
/// can't be plain `async fn` (see module docs).
type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// §3 "Signal": the control-flow effect a statement produces, threaded back up
/// through block/loop/function execution instead of using Rust's own `return`/`break`
/// (§4.F.5 "break/continue/return propagate as a first-class signal value").
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    None,
    Break(Option<String>),
    Continue(Option<String>),
    Return(Option<Value>),
}

impl Signal {
    fn is_none(&self) -> bool {
        matches!(self, Signal::None)
    }
}

/// State shared across every task/closure spawned from the same program run: host
/// class directory and runtime configuration never change per-task (§4.E, §6).
pub struct RuntimeShared {
    pub config: RuntimeConfig,
    pub host: HostClassDirectory,
}

/// One evaluation context: its own [`Scope`] (a stack of frames) plus a pointer to the
/// program-wide shared state. Cloning an `Interpreter` for a spawned task clones only
/// the `Rc`s, never the bindings themselves (§4.G "a child task's scope starts from a
/// captured snapshot, not a live alias").
pub struct Interpreter {
    scope: Scope,
    shared: Rc<RuntimeShared>,
    concurrency_scopes: Vec<ConcurrencyScope>,
    context: ContextMap,
}

impl Interpreter {
    pub fn new(config: RuntimeConfig, host: HostClassDirectory) -> Self {
        Self {
            scope: Scope::new(),
            shared: Rc::new(RuntimeShared { config, host }),
            concurrency_scopes: Vec::new(),
            context: ContextMap::new(),
        }
    }

    fn child_for_task(&self, snapshot: crate::scope::ScopeSnapshot) -> Self {
        Self {
            scope: Scope::from_snapshot(&snapshot),
            shared: self.shared.clone(),
            concurrency_scopes: Vec::new(),
            context: self.context.inherit(),
        }
    }

    pub async fn run_program(&mut self, program: &Program) -> Result<Value> {
        let block = Block { statements: program.items.clone() };
        let (value, signal) = self.exec_block(&block).await?;
        match signal {
            Signal::Return(Some(v)) => Ok(v),
            Signal::Return(None) => Ok(Value::Null),
            Signal::None => Ok(value),
            Signal::Break(_) | Signal::Continue(_) => Err(Error::at(ErrorKind::OrphanSignal, Position::UNKNOWN)),
        }
    }

    /// Executes a block's statements in sequence inside the current frame, returning
    /// the value of its last bare expression statement (used by `try`'s implicit
    /// "ok" value and by function bodies whose last statement is an expression) along
    /// with whatever signal interrupted it, if any.
    fn exec_block<'a>(&'a mut self, block: &'a Block) -> BoxFuture<'a, Result<(Value, Signal)>> {
        Box::pin(async move {
            let mut last = Value::Null;
            for stmt in &block.statements {
                let (value, signal) = self.exec_stmt(stmt).await?;
                last = value;
                if !signal.is_none() {
                    return Ok((last, signal));
                }
            }
            Ok((last, Signal::None))
        })
    }

    fn exec_stmt<'a>(&'a mut self, stmt: &'a Stmt) -> BoxFuture<'a, Result<(Value, Signal)>> {
        Box::pin(async move {
        match stmt {
            Stmt::VariableDecl { name, declared_type, init, span } => {
                let pos = pos(*span);
                let value = match init {
                    Some(expr) => self.eval_expr(expr).await?,
                    None => Value::Null,
                };
                let ty = declared_type.as_ref().map(|q| type_descriptor_from_name(q));
                if let Some(ty) = &ty {
                    if !ty.accepts(&value) {
                        return Err(Error::new(ErrorKind::Assignability, name.clone(), pos));
                    }
                }
                self.scope.declare_variable(name, false, ty, value, pos);
                Ok((Value::Null, Signal::None))
            }
            Stmt::ConstantDecl { name, declared_type, init, span } => {
                let pos = pos(*span);
                let value = self.eval_expr(init).await?;
                let ty = declared_type.as_ref().map(|q| type_descriptor_from_name(q));
                if let Some(ty) = &ty {
                    if !ty.accepts(&value) {
                        return Err(Error::new(ErrorKind::Assignability, name.clone(), pos));
                    }
                }
                self.scope.declare_variable(name, true, ty, value, pos);
                Ok((Value::Null, Signal::None))
            }
            Stmt::FunctionDecl { name, params, return_type, body, span } => {
                let _ = return_type;
                let func = Rc::new(DeclaredFunction {
                    name: name.clone(),
                    is_async: false,
                    params: params.clone(),
                    return_type: return_type.clone(),
                    body: Rc::new(body.clone()),
                    implementation_name: None,
                    depth: self.scope.depth(),
                    closure: Some(self.scope.snapshot()),
                });
                let _ = span;
                self.scope.declare_function(name, func);
                Ok((Value::Null, Signal::None))
            }
            Stmt::ImplementationDecl { type_name, methods, span } => {
                let _ = span;
                let mut table = std::collections::HashMap::new();
                for method in methods {
                    if let Stmt::FunctionDecl { name, params, return_type, body, .. } = method {
                        let func = Rc::new(DeclaredFunction {
                            name: name.clone(),
                            is_async: false,
                            params: params.clone(),
                            return_type: return_type.clone(),
                            body: Rc::new(body.clone()),
                            implementation_name: Some(type_name.to_dotted()),
                            depth: self.scope.depth(),
                            closure: Some(self.scope.snapshot()),
                        });
                        table.insert(name.clone(), func);
                    }
                }
                let implementation = Rc::new(Implementation {
                    name: type_name.to_dotted(),
                    functions: table,
                    depth: self.scope.depth(),
                });
                self.scope.declare_implementation(&type_name.to_dotted(), implementation);
                Ok((Value::Null, Signal::None))
            }
            Stmt::ActorDecl { name, handlers, span } => {
                let _ = span;
                let mut table = std::collections::HashMap::new();
                for handler in handlers {
                    if let Stmt::FunctionDecl { name: hname, params, return_type, body, .. } = handler {
                        let func = Rc::new(DeclaredFunction {
                            name: hname.clone(),
                            is_async: false,
                            params: params.clone(),
                            return_type: return_type.clone(),
                            body: Rc::new(body.clone()),
                            implementation_name: Some(name.clone()),
                            depth: self.scope.depth(),
                            closure: Some(self.scope.snapshot()),
                        });
                        table.insert(hname.clone(), func);
                    }
                }
                let blueprint = Rc::new(Implementation { name: name.clone(), functions: table, depth: self.scope.depth() });
                self.scope.declare_implementation(name, blueprint);
                Ok((Value::Null, Signal::None))
            }
            Stmt::Import { path, alias, span } => {
                let _ = (path, alias, span);
                // Module loading is a host/filesystem concern outside this core (§1);
                // imports are accepted syntactically and resolved by the embedding CLI.
                Ok((Value::Null, Signal::None))
            }
            Stmt::ExprStmt { expr, span } => {
                let _ = span;
                let value = self.eval_expr(expr).await?;
                Ok((value, Signal::None))
            }
            Stmt::Assign { target, value, span } => {
                let pos = pos(*span);
                let v = self.eval_expr(value).await?;
                self.assign_target(target, v.clone(), pos).await?;
                Ok((v, Signal::None))
            }
            Stmt::If { condition, then_branch, else_ifs, else_branch, span } => {
                let _ = span;
                if self.eval_expr(condition).await?.truthy() {
                    self.scope.push_frame();
                    let result = self.exec_block(then_branch).await;
                    self.scope.pop_frame();
                    return result;
                }
                for (cond, branch) in else_ifs {
                    if self.eval_expr(cond).await?.truthy() {
                        self.scope.push_frame();
                        let result = self.exec_block(branch).await;
                        self.scope.pop_frame();
                        return result;
                    }
                }
                if let Some(branch) = else_branch {
                    self.scope.push_frame();
                    let result = self.exec_block(branch).await;
                    self.scope.pop_frame();
                    return result;
                }
                Ok((Value::Null, Signal::None))
            }
            Stmt::ForRange { label, variable, start, end, down, step, body, span } => {
                let pos = pos(*span);
                let start_v = self.eval_expr(start).await?;
                let end_v = self.eval_expr(end).await?;
                let step_v = match step {
                    Some(e) => self.eval_expr(e).await?,
                    None => Value::Number(DynNum::Int(1)),
                };
                let (Value::Number(mut current), Value::Number(end_n), Value::Number(step_n)) = (start_v, end_v, step_v)
                else {
                    return Err(Error::new(ErrorKind::TypeMismatch, "for-range bounds".to_string(), pos));
                };
                if let Some(l) = label {
                    self.scope.push_label(l, pos)?;
                }
                self.scope.push_frame();
                let result = loop {
                    let continue_loop = if *down { current.compare(&end_n).is_ge() } else { current.compare(&end_n).is_le() };
                    if !continue_loop {
                        break Ok((Value::Null, Signal::None));
                    }
                    self.scope.declare_variable(variable, false, None, Value::Number(current.clone()), pos);
                    let (_, signal) = match self.exec_block(body).await {
                        Ok(r) => r,
                        Err(e) => break Err(e),
                    };
                    match reconcile_loop_signal(signal, label.as_deref()) {
                        LoopOutcome::Continue => {}
                        LoopOutcome::Break => break Ok((Value::Null, Signal::None)),
                        LoopOutcome::Propagate(s) => break Ok((Value::Null, s)),
                    }
                    current = if *down { current.sub(&step_n, pos)? } else { current.add(&step_n, pos)? };
                };
                self.scope.pop_frame();
                if let Some(l) = label {
                    self.scope.pop_label(l);
                }
                result
            }
            Stmt::ForIn { label, variable, iterable, body, span } => {
                let pos = pos(*span);
                let items = self.iterate(iterable, pos).await?;
                if let Some(l) = label {
                    self.scope.push_label(l, pos)?;
                }
                self.scope.push_frame();
                let mut outcome = Signal::None;
                for item in items {
                    self.scope.declare_variable(variable, false, None, item, pos);
                    let (_, signal) = self.exec_block(body).await?;
                    match reconcile_loop_signal(signal, label.as_deref()) {
                        LoopOutcome::Continue => {}
                        LoopOutcome::Break => break,
                        LoopOutcome::Propagate(s) => {
                            outcome = s;
                            break;
                        }
                    }
                }
                self.scope.pop_frame();
                if let Some(l) = label {
                    self.scope.pop_label(l);
                }
                Ok((Value::Null, outcome))
            }
            Stmt::While { label, condition, body, span } => {
                let pos = pos(*span);
                if let Some(l) = label {
                    self.scope.push_label(l, pos)?;
                }
                self.scope.push_frame();
                let mut outcome = Signal::None;
                while self.eval_expr(condition).await?.truthy() {
                    let (_, signal) = self.exec_block(body).await?;
                    match reconcile_loop_signal(signal, label.as_deref()) {
                        LoopOutcome::Continue => {}
                        LoopOutcome::Break => break,
                        LoopOutcome::Propagate(s) => {
                            outcome = s;
                            break;
                        }
                    }
                }
                self.scope.pop_frame();
                if let Some(l) = label {
                    self.scope.pop_label(l);
                }
                Ok((Value::Null, outcome))
            }
            Stmt::RepeatUntil { label, body, condition, span } => {
                let pos = pos(*span);
                if let Some(l) = label {
                    self.scope.push_label(l, pos)?;
                }
                self.scope.push_frame();
                let mut outcome = Signal::None;
                loop {
                    let (_, signal) = self.exec_block(body).await?;
                    match reconcile_loop_signal(signal, label.as_deref()) {
                        LoopOutcome::Continue => {}
                        LoopOutcome::Break => break,
                        LoopOutcome::Propagate(s) => {
                            outcome = s;
                            break;
                        }
                    }
                    if self.eval_expr(condition).await?.truthy() {
                        break;
                    }
                }
                self.scope.pop_frame();
                if let Some(l) = label {
                    self.scope.pop_label(l);
                }
                Ok((Value::Null, outcome))
            }
            Stmt::Case { subject, arms, default, span } => {
                let _ = span;
                let subject_value = self.eval_expr(subject).await?;
                for (candidates, branch) in arms {
                    for candidate in candidates {
                        let candidate_value = self.eval_expr(candidate).await?;
                        if subject_value.structural_eq(&candidate_value) {
                            self.scope.push_frame();
                            let result = self.exec_block(branch).await;
                            self.scope.pop_frame();
                            return result;
                        }
                    }
                }
                if let Some(branch) = default {
                    self.scope.push_frame();
                    let result = self.exec_block(branch).await;
                    self.scope.pop_frame();
                    return result;
                }
                Ok((Value::Null, Signal::None))
            }
            Stmt::Break { label, span } => {
                let _ = span;
                Ok((Value::Null, Signal::Break(label.clone())))
            }
            Stmt::Continue { label, span } => {
                let _ = span;
                Ok((Value::Null, Signal::Continue(label.clone())))
            }
            Stmt::Return { value, span } => {
                let _ = span;
                let v = match value {
                    Some(expr) => Some(self.eval_expr(expr).await?),
                    None => None,
                };
                Ok((Value::Null, Signal::Return(v)))
            }
            Stmt::Try { body, ok_binding, ok_branch, error_binding, error_branch, span } => {
                let pos = pos(*span);
                self.scope.push_frame();
                let outcome = self.exec_block(body).await;
                self.scope.pop_frame();
                match outcome {
                    Err(e) => {
                        self.scope.push_frame();
                        if let Some(name) = error_binding {
                            self.scope.declare_variable(name, false, None, Value::string(e.localized(self.shared.config.locale)), pos);
                        }
                        let result = self.exec_block(error_branch).await;
                        self.scope.pop_frame();
                        result
                    }
                    Ok((value, signal)) => {
                        if !signal.is_none() {
                            return Ok((value, signal));
                        }
                        let unwrapped = match &value {
                            Value::Pair(tag, inner) if matches!(tag.as_ref(), Value::String(s) if s.as_ref() == "خطأ") => {
                                self.scope.push_frame();
                                if let Some(name) = error_binding {
                                    self.scope.declare_variable(name, false, None, (**inner).clone(), pos);
                                }
                                let result = self.exec_block(error_branch).await;
                                self.scope.pop_frame();
                                return result;
                            }
                            Value::Pair(tag, inner) if matches!(tag.as_ref(), Value::String(s) if s.as_ref() == "نجاح") => {
                                (**inner).clone()
                            }
                            other => other.clone(),
                        };
                        match ok_branch {
                            Some(branch) => {
                                self.scope.push_frame();
                                if let Some(name) = ok_binding {
                                    self.scope.declare_variable(name, false, None, unwrapped, pos);
                                }
                                let result = self.exec_block(branch).await;
                                self.scope.pop_frame();
                                result
                            }
                            None => Ok((unwrapped, Signal::None)),
                        }
                    }
                }
            }
            Stmt::TryOption { body, some_binding, some_branch, none_branch, span } => {
                let pos = pos(*span);
                self.scope.push_frame();
                let (value, signal) = self.exec_block(body).await?;
                self.scope.pop_frame();
                if !signal.is_none() {
                    return Ok((value, signal));
                }
                self.scope.push_frame();
                let result = if matches!(value, Value::None) {
                    self.exec_block(none_branch).await
                } else {
                    self.scope.declare_variable(some_binding, false, None, value, pos);
                    self.exec_block(some_branch).await
                };
                self.scope.pop_frame();
                result
            }
            Stmt::ScopeBlock { ordered, body, span } => {
                let pos = pos(*span);
                self.concurrency_scopes.push(ConcurrencyScope::new(*ordered));
                self.scope.push_frame();
                let exec_result = self.exec_block(body).await;
                self.scope.pop_frame();
                let concurrency = self.concurrency_scopes.pop().expect("pushed above");
                let (value, signal) = exec_result?;
                concurrency.join_all().await.map_err(|e| e)?;
                let _ = pos;
                Ok((value, signal))
            }
            Stmt::Block(block) => {
                self.scope.push_frame();
                let result = self.exec_block(block).await;
                self.scope.pop_frame();
                result
            }
        }
        })
    }

    /// Evaluates the statement target of an `Assign` (`target := value`), writing
    /// through to the right container (variable, list/map index, or object field).
    fn assign_target<'a>(&'a mut self, target: &'a Expr, value: Value, pos: Position) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
        match target {
            Expr::Identifier(name, _) => self.scope.assign(name, value, pos),
            Expr::Index { collection, index, .. } => {
                let container = self.eval_expr(collection).await?;
                let index_value = self.eval_expr(index).await?;
                match container {
                    Value::List(items) => {
                        let i = index_as_usize(&index_value, pos)?;
                        let mut items = items.borrow_mut();
                        if i >= items.len() {
                            return Err(Error::at(ErrorKind::IndexOutOfBounds, pos));
                        }
                        items[i] = value;
                        Ok(())
                    }
                    Value::Map(map) => {
                        map.borrow_mut().insert(index_value, value);
                        Ok(())
                    }
                    // Sets are positional by insertion order (§4.F.2 "set assignment by
                    // index is positional into its insertion order").
                    Value::Set(set) => {
                        let i = index_as_usize(&index_value, pos)?;
                        let mut set = set.borrow_mut();
                        if i >= set.entries.len() {
                            return Err(Error::at(ErrorKind::IndexOutOfBounds, pos));
                        }
                        set.entries[i] = value;
                        Ok(())
                    }
                    // Tuples have no interior mutability (`Rc<Vec<Value>>`, not
                    // `Shared<Vec<Value>>>`), so assignment rebuilds the tuple and writes
                    // the new value back through `collection`'s own target (variable,
                    // member, or a further index) rather than mutating in place.
                    Value::Tuple(items) => {
                        let i = index_as_usize(&index_value, pos)?;
                        if i >= items.len() {
                            return Err(Error::at(ErrorKind::IndexOutOfBounds, pos));
                        }
                        let mut updated = (*items).clone();
                        updated[i] = value;
                        self.assign_target(collection, Value::Tuple(Rc::new(updated)), pos).await
                    }
                    _ => Err(Error::new(ErrorKind::TypeMismatch, "index assignment".to_string(), pos)),
                }
            }
            Expr::Member { receiver, name, .. } => {
                let object = self.eval_expr(receiver).await?;
                match object {
                    Value::Object(fields) => {
                        set_field(&fields, name, value);
                        Ok(())
                    }
                    _ => Err(Error::new(ErrorKind::TypeMismatch, "member assignment".to_string(), pos)),
                }
            }
            _ => Err(Error::new(ErrorKind::Syntax, "invalid assignment target".to_string(), pos)),
        }
        })
    }

    /// Produces the sequence `for-in` walks over: `List`/`Set`/`Tuple` elements, or
    /// `Map` entries as `Pair(key, value)` (§4.F.3 "iterating a map yields pairs").
    async fn iterate(&mut self, expr: &Expr, pos: Position) -> Result<Vec<Value>> {
        let value = self.eval_expr(expr).await?;
        Ok(match value {
            Value::List(items) => items.borrow().clone(),
            Value::Set(s) => s.borrow().entries.clone(),
            Value::Tuple(items) => items.as_ref().clone(),
            Value::Map(m) => m
                .borrow()
                .entries
                .iter()
                .map(|(k, v)| Value::Pair(Box::new(k.clone()), Box::new(v.clone())))
                .collect(),
            Value::String(s) => s.chars().map(Value::Char).collect(),
            _ => return Err(Error::new(ErrorKind::TypeMismatch, "for-in iterable".to_string(), pos)),
        })
    }

    pub fn eval_expr<'a>(&'a mut self, expr: &'a Expr) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
        match expr {
            Expr::NullLiteral(_) => Ok(Value::Null),
            Expr::NoneLiteral(_) => Ok(Value::None),
            Expr::BoolLiteral(b, _) => Ok(Value::Boolean(*b)),
            Expr::NaNLiteral(_) => Ok(Value::NaN),
            Expr::NumberLiteral(text, span) => Ok(Value::Number(DynNum::parse(text, pos(*span))?)),
            Expr::RadixLiteral { digits, radix, span } => Ok(Value::Number(DynNum::parse_radix(digits, *radix, pos(*span))?)),
            Expr::CharLiteral(c, _) => Ok(Value::Char(*c)),
            Expr::StringLiteral { parts, raw, span } => self.eval_string_literal(parts, *raw, pos(*span)),
            Expr::ByteStringLiteral(text, _) => {
                Ok(Value::list(text.bytes().map(|b| Value::Number(DynNum::Byte(b as i8))).collect()))
            }
            Expr::TemporalLiteral { marker, value, span } => {
                let pos = pos(*span);
                match marker {
                    TemporalKind::Instant => Ok(Value::TemporalPoint(temporal_parse::parse_instant(value, pos)?)),
                    TemporalKind::Point => Ok(Value::TemporalPoint(temporal_parse::parse_point(value, pos)?)),
                    TemporalKind::Amount => Ok(Value::TemporalAmount(temporal_parse::parse_amount(value, pos)?)),
                    TemporalKind::Value => Ok(Value::TemporalAmount(temporal_parse::parse_between(value, pos)?)),
                }
            }
            Expr::Identifier(name, span) => self.scope.lookup_value(name, pos(*span)),
            Expr::QualifiedAccess { .. } => {
                let parts = flatten_qualified(expr);
                self.scope.resolve_qualified(&QualifiedName::new(parts), expr_pos(expr))
            }
            Expr::SelfExpr(span) => self.scope.lookup_value(SELF_BINDING, pos(*span)),
            Expr::ListLiteral { elements, span } => {
                let mut items = Vec::with_capacity(elements.len());
                for e in elements {
                    items.push(self.eval_expr(e).await?);
                }
                let _ = span;
                Ok(Value::list(items))
            }
            Expr::SetLiteral { elements, span } => {
                let _ = span;
                let mut set = crate::value::OrderedSet::new(false);
                for e in elements {
                    let v = self.eval_expr(e).await?;
                    set.insert(v);
                }
                Ok(Value::Set(shared(set)))
            }
            Expr::MapLiteral { entries, span } => {
                let _ = span;
                let mut map = crate::value::OrderedMap::new(false);
                for (k, v) in entries {
                    let key = self.eval_expr(k).await?;
                    let value = self.eval_expr(v).await?;
                    map.insert(key, value);
                }
                Ok(Value::Map(shared(map)))
            }
            Expr::ObjectLiteral { fields, span } => {
                let _ = span;
                let mut values = Vec::with_capacity(fields.len());
                for (name, e) in fields {
                    let v = self.eval_expr(e).await?;
                    values.push((name.clone(), v));
                }
                Ok(Value::Object(shared(values)))
            }
            Expr::Index { collection, index, optional, span } => {
                let pos = pos(*span);
                let container = self.eval_expr(collection).await?;
                let index_value = self.eval_expr(index).await?;
                self.index_value(container, index_value, *optional, pos)
            }
            Expr::Call { callee, overload, args, span } => {
                let pos = pos(*span);
                let mut arg_values = Vec::with_capacity(args.len());
                for a in args {
                    arg_values.push(self.eval_expr(a).await?);
                }
                self.eval_call(callee, *overload, arg_values, pos).await
            }
            Expr::Member { receiver, name, optional, span } => {
                let pos = pos(*span);
                let object = self.eval_expr(receiver).await?;
                self.member_access(object, name, *optional, pos)
            }
            Expr::Unary { op, operand, span } => {
                let pos = pos(*span);
                let v = self.eval_expr(operand).await?;
                ops::apply_unary(*op, &v, pos)
            }
            Expr::Binary { left, op: BinaryOp::And, right, .. } => {
                let l = self.eval_expr(left).await?;
                if l.truthy() {
                    self.eval_expr(right).await
                } else {
                    Ok(l)
                }
            }
            Expr::Binary { left, op: BinaryOp::Or, right, .. } => {
                let l = self.eval_expr(left).await?;
                if l.truthy() {
                    Ok(l)
                } else {
                    self.eval_expr(right).await
                }
            }
            Expr::Binary { left, op, right, span } => {
                let pos = pos(*span);
                let l = self.eval_expr(left).await?;
                let r = self.eval_expr(right).await?;
                ops::apply_binary(*op, &l, &r, pos)
            }
            Expr::InstanceOf { value, type_name, span } => {
                let _ = span;
                let v = self.eval_expr(value).await?;
                let descriptor = type_descriptor_from_name(type_name);
                Ok(Value::Boolean(ops::instance_of(&v, &descriptor)))
            }
            Expr::TypeOf { value, span } => {
                let _ = span;
                let v = self.eval_expr(value).await?;
                Ok(Value::TypeToken(Rc::new(v.type_of())))
            }
            Expr::SizeOf { value, span } => {
                let pos = pos(*span);
                let v = self.eval_expr(value).await?;
                Ok(Value::Number(DynNum::parse(&v.size_of(pos)?.to_string(), pos)?))
            }
            Expr::PreIncrement { target, span } => self.step(target, pos(*span), true, true).await,
            Expr::PreDecrement { target, span } => self.step(target, pos(*span), false, true).await,
            Expr::PostIncrement { target, span } => self.step(target, pos(*span), true, false).await,
            Expr::PostDecrement { target, span } => self.step(target, pos(*span), false, false).await,
            Expr::Coalesce { left, right, span } => {
                let _ = span;
                let l = self.eval_expr(left).await?;
                if matches!(l, Value::Null | Value::None) {
                    self.eval_expr(right).await
                } else {
                    Ok(l)
                }
            }
            Expr::SomeWrap { value, .. } => self.eval_expr(value).await,
            Expr::OkWrap { value, .. } => {
                let v = self.eval_expr(value).await?;
                Ok(Value::Pair(Box::new(Value::string("نجاح")), Box::new(v)))
            }
            Expr::ErrorWrap { value, .. } => {
                let v = self.eval_expr(value).await?;
                Ok(Value::Pair(Box::new(Value::string("خطأ")), Box::new(v)))
            }
            Expr::Spawn { body, .. } => {
                let snapshot = self.scope.snapshot();
                let shared = self.shared.clone();
                let context = self.context.inherit();
                let body_expr = (**body).clone();
                let task = TaskHandle::spawn(async move {
                    let mut interp = Interpreter {
                        scope: Scope::from_snapshot(&snapshot),
                        shared,
                        concurrency_scopes: Vec::new(),
                        context,
                    };
                    interp.eval_expr(&body_expr).await
                });
                if let Some(scope) = self.concurrency_scopes.last_mut() {
                    scope.track(task.clone());
                }
                Ok(Value::Task(task))
            }
            Expr::Await { task, span } => {
                let pos = pos(*span);
                let v = self.eval_expr(task).await?;
                match v {
                    Value::Task(t) => t.join().await,
                    _ => Err(Error::new(ErrorKind::TypeMismatch, "await".to_string(), pos)),
                }
            }
            Expr::Send { actor, message, span } => {
                let pos = pos(*span);
                let actor_value = self.eval_expr(actor).await?;
                let message_value = self.eval_expr(message).await?;
                match actor_value {
                    Value::Actor(a) => {
                        a.send(message_value, pos)?;
                        Ok(Value::Null)
                    }
                    _ => Err(Error::new(ErrorKind::TypeMismatch, "send".to_string(), pos)),
                }
            }
            Expr::New { type_name, args, span } => {
                let pos = pos(*span);
                let mut arg_values = Vec::with_capacity(args.len());
                for a in args {
                    arg_values.push(self.eval_expr(a).await?);
                }
                self.construct(type_name, arg_values, pos).await
            }
        }
        })
    }

    fn eval_string_literal(&mut self, parts: &[StringPart], raw: bool, pos: Position) -> Result<Value> {
        if raw {
            let text: String = parts
                .iter()
                .map(|p| match p {
                    StringPart::Literal(s) => s.clone(),
                    StringPart::Interp { name, .. } => format!("${{{name}}}"),
                })
                .collect();
            return Ok(Value::string(text));
        }
        let mut out = String::new();
        for part in parts {
            match part {
                StringPart::Literal(s) => out.push_str(s),
                StringPart::Interp { name, default } => match self.scope.lookup_value(name, pos) {
                    Ok(v) => out.push_str(&v.format_interpolated()),
                    Err(_) => out.push_str(default.as_deref().unwrap_or("<فارغ>")),
                },
            }
        }
        Ok(Value::string(out))
    }

    fn index_value(&self, container: Value, index_value: Value, optional: bool, pos: Position) -> Result<Value> {
        match &container {
            Value::List(items) => {
                let items = items.borrow();
                match index_as_usize(&index_value, pos) {
                    Ok(i) if i < items.len() => Ok(items[i].clone()),
                    _ if optional => Ok(Value::None),
                    _ => Err(Error::at(ErrorKind::IndexOutOfBounds, pos)),
                }
            }
            Value::Tuple(items) => match index_as_usize(&index_value, pos) {
                Ok(i) if i < items.len() => Ok(items[i].clone()),
                _ if optional => Ok(Value::None),
                _ => Err(Error::at(ErrorKind::IndexOutOfBounds, pos)),
            },
            Value::Map(map) => {
                let map = map.borrow();
                match map.get(&index_value) {
                    Some(v) => Ok(v.clone()),
                    None if optional => Ok(Value::None),
                    None => Err(Error::at(ErrorKind::KeyNotFound, pos)),
                }
            }
            Value::Set(set) => {
                let set = set.borrow();
                match index_as_usize(&index_value, pos) {
                    Ok(i) if i < set.entries.len() => Ok(set.entries[i].clone()),
                    Ok(_) if optional => Ok(Value::None),
                    Ok(_) => Err(Error::at(ErrorKind::IndexOutOfBounds, pos)),
                    Err(_) if optional => Ok(Value::None),
                    Err(e) => Err(e),
                }
            }
            Value::Object(fields) => {
                let fields = fields.borrow();
                let key = match &index_value {
                    Value::String(s) => s.to_string(),
                    _ => return Err(Error::new(ErrorKind::TypeMismatch, "index".to_string(), pos)),
                };
                match fields.iter().find(|(n, _)| n.as_str() == key) {
                    Some((_, v)) => Ok(v.clone()),
                    None if optional => Ok(Value::None),
                    None => Err(Error::at(ErrorKind::KeyNotFound, pos)),
                }
            }
            Value::Null | Value::None if optional => Ok(Value::None),
            Value::Null | Value::None => Err(Error::at(ErrorKind::VariableNotFound, pos)),
            Value::Pair(a, b) => match index_as_usize(&index_value, pos)? {
                0 => Ok((**a).clone()),
                1 => Ok((**b).clone()),
                _ if optional => Ok(Value::None),
                _ => Err(Error::at(ErrorKind::IndexOutOfBounds, pos)),
            },
            Value::Triple(a, b, c) => match index_as_usize(&index_value, pos)? {
                0 => Ok((**a).clone()),
                1 => Ok((**b).clone()),
                2 => Ok((**c).clone()),
                _ if optional => Ok(Value::None),
                _ => Err(Error::at(ErrorKind::IndexOutOfBounds, pos)),
            },
            Value::String(s) => match index_as_usize(&index_value, pos) {
                Ok(i) => s.chars().nth(i).map(Value::Char).ok_or_else(|| Error::at(ErrorKind::IndexOutOfBounds, pos)),
                Err(e) if optional => {
                    let _ = e;
                    Ok(Value::None)
                }
                Err(e) => Err(e),
            },
            _ => Err(Error::new(ErrorKind::TypeMismatch, "index".to_string(), pos)),
        }
    }

    fn member_access(&self, object: Value, name: &str, optional: bool, pos: Position) -> Result<Value> {
        match object {
            Value::Object(fields) => {
                let fields = fields.borrow();
                match fields.iter().find(|(n, _)| n.as_str() == name) {
                    Some((_, v)) => Ok(v.clone()),
                    None if optional => Ok(Value::None),
                    None => Err(Error::new(ErrorKind::KeyNotFound, name.to_string(), pos)),
                }
            }
            Value::HostObject(h) => match self.shared.host.invoke_method(&h, name, &[], pos) {
                Ok(v) => Ok(v),
                Err(_) if optional => Ok(Value::None),
                Err(e) => Err(e),
            },
            Value::Null | Value::None if optional => Ok(Value::None),
            _ => Err(Error::new(ErrorKind::TypeMismatch, name.to_string(), pos)),
        }
    }

    fn eval_call<'a>(&'a mut self, callee: &'a Expr, overload: Option<u32>, args: Vec<Value>, pos: Position) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
        let _ = overload;
        if let Expr::Member { receiver, name, optional, .. } = callee {
            let object = self.eval_expr(receiver).await?;
            return match &object {
                Value::Channel(ch) => match name.as_str() {
                    "أرسل" => {
                        let value = args.into_iter().next().ok_or_else(|| Error::at(ErrorKind::EmptyArgument, pos))?;
                        ch.send(value, pos)?;
                        Ok(Value::Null)
                    }
                    "استقبل" => ch.receive(pos).await,
                    "أغلق" => {
                        ch.close();
                        Ok(Value::Null)
                    }
                    _ => Err(Error::new(ErrorKind::InvocableNotFound, name.clone(), pos)),
                },
                Value::HostObject(h) => self.shared.host.invoke_method(h, name, &args, pos),
                Value::Object(fields) => {
                    let method = fields.borrow().iter().find(|(n, _)| n.as_str() == name).map(|(_, v)| v.clone());
                    match method {
                        Some(Value::Function(f)) => self.call_function(f, args, Some(object.clone()), pos).await,
                        Some(Value::BuiltinFunction(f)) => (f.invoke)(&args, pos),
                        Some(_) => Err(Error::new(ErrorKind::InvocableNotFound, name.clone(), pos)),
                        None if *optional => Ok(Value::None),
                        None => Err(Error::new(ErrorKind::InvocableNotFound, name.clone(), pos)),
                    }
                }
                _ => Err(Error::new(ErrorKind::TypeMismatch, name.clone(), pos)),
            };
        }
        let callee_value = self.eval_expr(callee).await?;
        match callee_value {
            Value::Function(f) => self.call_function(f, args, None, pos).await,
            Value::BuiltinFunction(f) => (f.invoke)(&args, pos),
            _ => Err(Error::at(ErrorKind::InvocableNotFound, pos)),
        }
        })
    }

    fn call_function<'a>(&'a mut self, func: Rc<DeclaredFunction>, args: Vec<Value>, receiver: Option<Value>, pos: Position) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
        if args.len() > func.params.len() {
            return Err(Error::at(ErrorKind::ArityMismatch, pos));
        }
        let mut call_scope = match &func.closure {
            Some(snapshot) => Scope::from_snapshot(snapshot),
            None => Scope::new(),
        };
        call_scope.push_frame();
        {
            let mut callee_interp = Interpreter {
                scope: call_scope,
                shared: self.shared.clone(),
                concurrency_scopes: Vec::new(),
                context: self.context.inherit(),
            };
            if let Some(receiver) = receiver {
                callee_interp.scope.declare_variable(SELF_BINDING, true, None, receiver, pos);
            }
            for (i, param) in func.params.iter().enumerate() {
                let value = match args.get(i) {
                    Some(v) => v.clone(),
                    None => match &param.default {
                        Some(expr) => callee_interp.eval_expr(expr).await?,
                        None => return Err(Error::at(ErrorKind::ArityMismatch, pos)),
                    },
                };
                bind_param(&mut callee_interp.scope, param, value, pos);
            }
            let body = func.body.clone();
            let (value, signal) = callee_interp.exec_block(&body).await?;
            match signal {
                Signal::Return(Some(v)) => Ok(v),
                Signal::Return(None) => Ok(Value::Null),
                Signal::None => Ok(value),
                Signal::Break(_) | Signal::Continue(_) => Err(Error::at(ErrorKind::OrphanSignal, pos)),
            }
        }
        })
    }

    fn step<'a>(&'a mut self, target: &'a Expr, pos: Position, increment: bool, is_pre: bool) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            let current = self.eval_expr(target).await?;
            let stepped = ops::step_value(&current, pos, increment)?;
            self.assign_target(target, stepped.clone(), pos).await?;
            Ok(if is_pre { stepped } else { current })
        })
    }

    async fn construct(&mut self, type_name: &QualifiedName, args: Vec<Value>, pos: Position) -> Result<Value> {
        let dotted = type_name.to_dotted();
        if dotted == "قناة" {
            let _ = args;
            return Ok(Value::Channel(ChannelHandle::new()));
        }
        match self.shared.host.construct(&dotted, &args, pos) {
            Ok(v) => return Ok(v),
            Err(e) if e.kind != ErrorKind::InvocableNotFound => return Err(e),
            Err(_) => {}
        }
        let decl = self.scope.lookup(&dotted);
        if let Some(Declaration::Implementation(implementation)) = decl {
            let actor = ActorHandle::new();
            actor.mark_spawned(pos)?;
            if let Some(handler) = implementation.functions.values().next().cloned() {
                let inbox = actor.inbox().clone();
                let snapshot = self.scope.snapshot();
                let shared = self.shared.clone();
                let context = self.context.inherit();
                TaskHandle::spawn(async move {
                    loop {
                        let message = match inbox.receive(Position::UNKNOWN).await {
                            Ok(Value::None) => break,
                            Ok(m) => m,
                            Err(_) => break,
                        };
                        let mut interp = Interpreter {
                            scope: Scope::from_snapshot(&snapshot),
                            shared: shared.clone(),
                            concurrency_scopes: Vec::new(),
                            context: context.inherit(),
                        };
                        let _ = interp.call_function(handler.clone(), vec![message], None, Position::UNKNOWN).await;
                    }
                    Ok(Value::Null)
                });
            }
            return Ok(Value::Actor(actor));
        }
        Err(Error::new(ErrorKind::InvocableNotFound, dotted, pos))
    }
}

enum LoopOutcome {
    Continue,
    Break,
    Propagate(Signal),
}

fn reconcile_loop_signal(signal: Signal, current_label: Option<&str>) -> LoopOutcome {
    match signal {
        Signal::None => LoopOutcome::Continue,
        Signal::Break(label) if label_matches(&label, current_label) => LoopOutcome::Break,
        Signal::Continue(label) if label_matches(&label, current_label) => LoopOutcome::Continue,
        other => LoopOutcome::Propagate(other),
    }
}

fn label_matches(label: &Option<String>, current: Option<&str>) -> bool {
    match label {
        None => true,
        Some(l) => Some(l.as_str()) == current,
    }
}

fn bind_param(scope: &mut Scope, param: &Param, value: Value, pos: Position) {
    let ty = param.declared_type.as_ref().map(type_descriptor_from_name);
    scope.declare_variable(&param.name, false, ty, value, pos);
}

fn set_field(fields: &ObjectFields, name: &str, value: Value) {
    let mut fields = fields.borrow_mut();
    if let Some(slot) = fields.iter_mut().find(|(n, _)| n.as_str() == name) {
        slot.1 = value;
    } else {
        fields.push((name.to_string(), value));
    }
}

fn index_as_usize(value: &Value, pos: Position) -> Result<usize> {
    match value {
        Value::Number(n) if !n.is_negative() => Ok(n.to_f64() as usize),
        _ => Err(Error::new(ErrorKind::TypeMismatch, "index".to_string(), pos)),
    }
}

fn flatten_qualified(expr: &Expr) -> Vec<String> {
    match expr {
        Expr::QualifiedAccess { base, name, .. } => {
            let mut parts = flatten_qualified(base);
            parts.push(name.clone());
            parts
        }
        Expr::Identifier(name, _) => vec![name.clone()],
        _ => Vec::new(),
    }
}

fn expr_pos(expr: &Expr) -> Position {
    match expr {
        Expr::QualifiedAccess { span, .. } | Expr::Identifier(_, span) => pos(*span),
        _ => Position::UNKNOWN,
    }
}

/// Maps a parsed type name to the built-in [`TypeTag`] it denotes, or treats it as a
/// host class name otherwise (§4.A "TypeDescriptor ... raw_class carries a host
/// qualified name when no built-in tag applies").
fn type_descriptor_from_name(name: &QualifiedName) -> TypeDescriptor {
    let simple = name.parts.last().map(String::as_str).unwrap_or_default();
    let tag = match simple {
        "متغير" => Some(TypeTag::Var),
        "نص" => Some(TypeTag::String),
        "حرف" => Some(TypeTag::Char),
        "منطقي" => Some(TypeTag::Boolean),
        "بايت" => Some(TypeTag::Byte),
        "قصير" => Some(TypeTag::Short),
        "صحيح" => Some(TypeTag::Int),
        "طويل" => Some(TypeTag::Long),
        "كبير" => Some(TypeTag::BigInt),
        "عائم" => Some(TypeTag::Float),
        "مضاعف" => Some(TypeTag::Double),
        "عشري" => Some(TypeTag::BigDecimal),
        "عدد" => Some(TypeTag::VarNumber),
        "قائمة" => Some(TypeTag::List),
        "طقم" => Some(TypeTag::Set),
        "خريطة" => Some(TypeTag::Map),
        "زوج" => Some(TypeTag::Pair),
        "ثلاثي" => Some(TypeTag::Triple),
        "مجموعة" => Some(TypeTag::Tuple),
        "كائن" => Some(TypeTag::Struct),
        "مدة" => Some(TypeTag::Duration),
        "فترة" => Some(TypeTag::Period),
        "تاريخ" => Some(TypeTag::Date),
        "وقت" => Some(TypeTag::Time),
        "تاريخ_ووقت" => Some(TypeTag::DateTime),
        _ => None,
    };
    match tag {
        Some(t) => TypeDescriptor::simple(t, name.to_dotted()),
        None => TypeDescriptor::host(name.to_dotted()),
    }
}

fn pos(span: crate::token::Span) -> Position {
    Position::new(span.line, span.column)
}

/// Splits a non-raw string literal's contents into literal/interpolation fragments
/// (§4.F.1). Recognizes `${…}`, `{…}$`, and `{{…}}`; inside each, either a bare
/// identifier or a `name:default` form.
pub mod interp_string {
    use crate::ast::StringPart;

    pub fn split_interpolation(text: &str) -> Vec<StringPart> {
        let chars: Vec<char> = text.chars().collect();
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '$' && chars.get(i + 1) == Some(&'{') {
                let Some(end) = find_close(&chars, i + 2, '}') else {
                    literal.push(chars[i]);
                    i += 1;
                    continue;
                };
                flush(&mut parts, &mut literal);
                parts.push(parse_body(&chars[i + 2..end]));
                i = end + 1;
            } else if chars[i] == '{' && chars.get(i + 1) == Some(&'{') {
                let Some(end) = find_double_close(&chars, i + 2) else {
                    literal.push(chars[i]);
                    i += 1;
                    continue;
                };
                flush(&mut parts, &mut literal);
                parts.push(parse_body(&chars[i + 2..end]));
                i = end + 2;
            } else if chars[i] == '{' {
                let Some(end) = find_close(&chars, i + 1, '}') else {
                    literal.push(chars[i]);
                    i += 1;
                    continue;
                };
                if chars.get(end + 1) == Some(&'$') {
                    flush(&mut parts, &mut literal);
                    parts.push(parse_body(&chars[i + 1..end]));
                    i = end + 2;
                } else {
                    literal.push(chars[i]);
                    i += 1;
                }
            } else {
                literal.push(chars[i]);
                i += 1;
            }
        }
        flush(&mut parts, &mut literal);
        parts
    }

    fn find_close(chars: &[char], from: usize, close: char) -> Option<usize> {
        (from..chars.len()).find(|&j| chars[j] == close)
    }

    fn find_double_close(chars: &[char], from: usize) -> Option<usize> {
        let mut j = from;
        while j + 1 < chars.len() {
            if chars[j] == '}' && chars[j + 1] == '}' {
                return Some(j);
            }
            j += 1;
        }
        None
    }

    fn flush(parts: &mut Vec<StringPart>, literal: &mut String) {
        if !literal.is_empty() {
            parts.push(StringPart::Literal(std::mem::take(literal)));
        }
    }

    fn parse_body(body: &[char]) -> StringPart {
        let body: String = body.iter().collect();
        match body.split_once(':') {
            Some((name, default)) => StringPart::Interp {
                name: name.trim().to_string(),
                default: Some(default.to_string()),
            },
            None => StringPart::Interp { name: body.trim().to_string(), default: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn run(src: &str) -> Result<Value> {
        let mut parser = Parser::new(src)?;
        let program = parser.parse_program()?;
        crate::concurrency::run_to_completion(async {
            let mut interp = Interpreter::new(RuntimeConfig::default(), HostClassDirectory::new());
            interp.run_program(&program).await
        })
    }

    #[test]
    fn arithmetic_expression_evaluates() {
        let value = run("1 + 2 * 3;").unwrap();
        assert!(matches!(value, Value::Number(DynNum::Byte(7) | DynNum::Short(7) | DynNum::Int(7))));
    }

    #[test]
    fn variable_declaration_then_use() {
        let value = run("متغير س := 10; س + 5;").unwrap();
        assert_eq!(value.to_string(), Value::Number(DynNum::Int(15)).to_string());
    }

    #[test]
    fn for_range_loop_accumulates() {
        let value = run("متغير المجموع := 0; لكل ع := 1 إلى 5 نفذ { المجموع := المجموع + ع; } المجموع;").unwrap();
        assert_eq!(value.to_string(), Value::Number(DynNum::Int(15)).to_string());
    }

    #[test]
    fn interpolation_substitutes_bound_name() {
        let value = run("متغير الاسم := \"علي\"; \"مرحباً ${الاسم}\";").unwrap();
        assert_eq!(value.to_string(), "مرحباً علي");
    }

    #[test]
    fn tuple_index_assignment_rebuilds_and_writes_back() {
        // There is no tuple literal *syntax* to drive this through `run`, so this
        // exercises `assign_target`'s `Value::Tuple` arm directly against the AST
        // shape a future tuple-literal production would also produce (§4.F.2:
        // "collection assignment obj[idx] := v requires list/tuple/map/set").
        let pos = Position::UNKNOWN;
        let span = crate::token::Span::default();
        let updated = crate::concurrency::run_to_completion(async {
            let mut interp = Interpreter::new(RuntimeConfig::default(), HostClassDirectory::new());
            interp.scope.declare_variable(
                "زوج",
                false,
                None,
                Value::Tuple(Rc::new(vec![Value::Number(DynNum::Int(1)), Value::Number(DynNum::Int(2))])),
                pos,
            );
            let target = Expr::Index {
                collection: Box::new(Expr::Identifier("زوج".to_string(), span)),
                index: Box::new(Expr::NumberLiteral("1".to_string(), span)),
                optional: false,
                span,
            };
            interp.assign_target(&target, Value::Number(DynNum::Int(99)), pos).await?;
            match interp.scope.lookup_value("زوج", pos)? {
                Value::Tuple(items) => Ok(format!("{},{}", items[0], items[1])),
                _ => unreachable!(),
            }
        })
        .unwrap();
        assert_eq!(updated, "1,99");
    }

    #[test]
    fn set_index_assignment_is_positional_by_insertion_order() {
        let pos = Position::UNKNOWN;
        let span = crate::token::Span::default();
        let updated = crate::concurrency::run_to_completion(async {
            let mut interp = Interpreter::new(RuntimeConfig::default(), HostClassDirectory::new());
            let mut set = crate::value::OrderedSet::new(true);
            set.insert(Value::Number(DynNum::Int(10)));
            set.insert(Value::Number(DynNum::Int(20)));
            interp.scope.declare_variable("طقم", false, None, Value::Set(crate::value::shared(set)), pos);
            let target = Expr::Index {
                collection: Box::new(Expr::Identifier("طقم".to_string(), span)),
                index: Box::new(Expr::NumberLiteral("1".to_string(), span)),
                optional: false,
                span,
            };
            interp.assign_target(&target, Value::Number(DynNum::Int(99)), pos).await?;
            match interp.scope.lookup_value("طقم", pos)? {
                Value::Set(s) => Ok(s.borrow().entries[1].to_string()),
                _ => unreachable!(),
            }
        })
        .unwrap();
        assert_eq!(updated, "99");
    }

    #[test]
    fn and_returns_deciding_operand_not_a_coerced_boolean() {
        // §4.C rule 5: "a && b returns b when a is truthy else a" — not `Boolean(true)`.
        let value = run("0 && \"س\";").unwrap();
        assert_eq!(value.to_string(), "0");
        let value = run("\"أ\" && \"ب\";").unwrap();
        assert_eq!(value.to_string(), "ب");
    }

    #[test]
    fn or_returns_deciding_operand_not_a_coerced_boolean() {
        let value = run("0 || \"س\";").unwrap();
        assert_eq!(value.to_string(), "س");
        let value = run("\"أ\" || \"ب\";").unwrap();
        assert_eq!(value.to_string(), "أ");
    }

    #[test]
    fn and_short_circuits_without_evaluating_the_right_operand() {
        // If the right side were eagerly evaluated, `1/0` would raise `DivisionByZero`.
        let value = run("0 && (1/0);").unwrap();
        assert_eq!(value.to_string(), "0");
    }

    #[test]
    fn or_short_circuits_without_evaluating_the_right_operand() {
        let value = run("1 || (1/0);").unwrap();
        assert_eq!(value.to_string(), "1");
    }

    #[test]
    fn interpolation_of_unbound_name_yields_empty_marker() {
        let value = run("\"مرحباً ${الاسم}\";").unwrap();
        assert_eq!(value.to_string(), "مرحباً <فارغ>");
    }

    #[test]
    fn interpolation_with_explicit_default_skips_the_marker() {
        let value = run("\"${الاسم:ضيف}\";").unwrap();
        assert_eq!(value.to_string(), "ضيف");
    }

    #[test]
    fn interp_string_recognizes_all_three_bracket_forms() {
        use interp_string::split_interpolation;
        assert_eq!(
            split_interpolation("${س}"),
            vec![StringPart::Interp { name: "س".to_string(), default: None }]
        );
        assert_eq!(
            split_interpolation("{س}$"),
            vec![StringPart::Interp { name: "س".to_string(), default: None }]
        );
        assert_eq!(
            split_interpolation("{{س}}"),
            vec![StringPart::Interp { name: "س".to_string(), default: None }]
        );
    }
}
