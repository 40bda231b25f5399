//! Recursive-descent parser producing the [`crate::ast`] tree from a [`Lexer`]'s token
//! stream.
//!
//! Structured after the teacher's `parser.rs`: a single-token lookahead cursor with
//! `advance`/`expect`/`current_token_is`, a recursion-depth guard against pathological
//! input, and one `parse_*` method per precedence level. Naftah is statement-oriented, so
//! the entry point is `parse_program` rather than a single `parse_expression`; the
//! expression precedence chain below is this implementation's own resolution of the
//! "operators, by category" groupings in §4.C (the exact grammar is out of scope, §1).
//!
//! Precedence (lowest to highest):
//! 1. logical or
//! 2. logical and
//! 3. equality (=, !=)
//! 4. instanceof (نوع)
//! 5. relational (<, <=, >, >=)
//! 6. bitwise or / xor / and
//! 7. shift (<<, >>, >>>)
//! 8. additive (+, -, element-wise .+/.-)
//! 9. multiplicative (*, /, قسمة_صحيحة, باقي, element-wise .*//./%)
//! 10. unary (-, !, ~, prefix ++/--)
//! 11. postfix (call, member, index, postfix ++/--, ??)
//! 12. primary

use crate::ast::*;
use crate::error::{Error, ErrorKind, Position, Result};
use crate::lexer::Lexer;
use crate::token::{Keyword, Span, Symbol, Token, TokenKind};

pub struct Parser {
    lexer: Lexer,
    current: Token,
    depth: usize,
}

const MAX_RECURSION_DEPTH: usize = 256;

impl Parser {
    pub fn new(input: &str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    fn pos(span: Span) -> Position {
        Position::new(span.line, span.column)
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn check_depth(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_RECURSION_DEPTH {
            return Err(Error::new(
                ErrorKind::Syntax,
                "expression nested too deeply",
                Self::pos(self.current.span),
            ));
        }
        Ok(())
    }

    fn leave_depth(&mut self) {
        self.depth -= 1;
    }

    fn is_symbol(&self, sym: Symbol) -> bool {
        matches!(&self.current.kind, TokenKind::Symbol(s) if *s == sym)
    }

    fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(k) if *k == kw)
    }

    fn eat_symbol(&mut self, sym: Symbol) -> Result<()> {
        if self.is_symbol(sym) {
            self.advance()?;
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::Syntax,
                format!("expected {sym:?}, found {:?}", self.current.kind),
                Self::pos(self.current.span),
            ))
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> Result<()> {
        if self.is_keyword(kw) {
            self.advance()?;
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::Syntax,
                format!("expected {kw:?}, found {:?}", self.current.kind),
                Self::pos(self.current.span),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current.kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance()?;
                Ok(name)
            }
            other => Err(Error::new(
                ErrorKind::Syntax,
                format!("expected identifier, found {other:?}"),
                Self::pos(self.current.span),
            )),
        }
    }

    fn parse_qualified_name(&mut self) -> Result<QualifiedName> {
        let mut parts = vec![self.expect_identifier()?];
        while self.is_symbol(Symbol::Colon) {
            self.advance()?;
            parts.push(self.expect_identifier()?);
        }
        Ok(QualifiedName::new(parts))
    }

    fn opt_type_annotation(&mut self) -> Result<Option<QualifiedName>> {
        if self.is_symbol(Symbol::Colon) {
            self.advance()?;
            Ok(Some(self.parse_qualified_name()?))
        } else {
            Ok(None)
        }
    }

    fn opt_label(&mut self) -> Option<String> {
        // `تسمية: لكل ...` style labels are written as `name@` immediately before the
        // loop keyword; represented at this layer as an identifier followed by `:`.
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            let save = self.current.clone();
            if self.advance().is_ok() && self.is_symbol(Symbol::Colon) {
                let _ = self.advance();
                return Some(name);
            }
            self.current = save;
        }
        None
    }

    // ---- program / statements -----------------------------------------------------

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut items = Vec::new();
        while !matches!(self.current.kind, TokenKind::Eof) {
            items.push(self.parse_stmt()?);
        }
        Ok(Program { items })
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.eat_symbol(Symbol::LBrace)?;
        let mut statements = Vec::new();
        while !self.is_symbol(Symbol::RBrace) {
            statements.push(self.parse_stmt()?);
        }
        self.advance()?; // }
        Ok(Block::new(statements))
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let span = self.current.span;
        match self.current.kind.clone() {
            TokenKind::Keyword(Keyword::Variable) => self.parse_variable_decl(span),
            TokenKind::Keyword(Keyword::Constant) => self.parse_constant_decl(span),
            TokenKind::Keyword(Keyword::Function) => self.parse_function_decl(span),
            TokenKind::Keyword(Keyword::Implementation) => self.parse_implementation_decl(span),
            TokenKind::Keyword(Keyword::Actor) => self.parse_actor_decl(span),
            TokenKind::Keyword(Keyword::Import) => self.parse_import(span),
            TokenKind::Keyword(Keyword::If) => self.parse_if(span, None),
            TokenKind::Keyword(Keyword::For) => self.parse_for(span, None),
            TokenKind::Keyword(Keyword::While) => self.parse_while(span, None),
            TokenKind::Keyword(Keyword::Repeat) => self.parse_repeat(span, None),
            TokenKind::Keyword(Keyword::Case) => self.parse_case(span),
            TokenKind::Keyword(Keyword::Break) => self.parse_break(span),
            TokenKind::Keyword(Keyword::Continue) => self.parse_continue(span),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(span),
            TokenKind::Keyword(Keyword::Try) => self.parse_try(span),
            TokenKind::Keyword(Keyword::Scope) => self.parse_scope_block(span),
            TokenKind::Symbol(Symbol::LBrace) => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Identifier(_) => {
                if let Some(label) = self.opt_label() {
                    return self.parse_labelled(label, span);
                }
                self.parse_expr_or_assign(span)
            }
            _ => self.parse_expr_or_assign(span),
        }
    }

    fn parse_labelled(&mut self, label: String, span: Span) -> Result<Stmt> {
        match self.current.kind.clone() {
            TokenKind::Keyword(Keyword::For) => self.parse_for(span, Some(label)),
            TokenKind::Keyword(Keyword::While) => self.parse_while(span, Some(label)),
            TokenKind::Keyword(Keyword::Repeat) => self.parse_repeat(span, Some(label)),
            _ => Err(Error::new(
                ErrorKind::Syntax,
                "a label must be followed by a loop",
                Self::pos(span),
            )),
        }
    }

    fn parse_variable_decl(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // متغير
        let name = self.expect_identifier()?;
        let declared_type = self.opt_type_annotation()?;
        let init = if self.is_symbol(Symbol::Assign) {
            self.advance()?;
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.eat_stmt_end()?;
        Ok(Stmt::VariableDecl {
            name,
            declared_type,
            init,
            span,
        })
    }

    fn parse_constant_decl(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // ثابت
        let name = self.expect_identifier()?;
        let declared_type = self.opt_type_annotation()?;
        self.eat_symbol(Symbol::Assign)?;
        let init = self.parse_expr()?;
        self.eat_stmt_end()?;
        Ok(Stmt::ConstantDecl {
            name,
            declared_type,
            init,
            span,
        })
    }

    fn eat_stmt_end(&mut self) -> Result<()> {
        if self.is_symbol(Symbol::Semicolon) {
            self.advance()?;
        }
        Ok(())
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        self.eat_symbol(Symbol::LParen)?;
        let mut params = Vec::new();
        while !self.is_symbol(Symbol::RParen) {
            let name = self.expect_identifier()?;
            let declared_type = self.opt_type_annotation()?;
            let default = if self.is_symbol(Symbol::Eq) {
                self.advance()?;
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param {
                name,
                declared_type,
                default,
            });
            if self.is_symbol(Symbol::Comma) {
                self.advance()?;
            }
        }
        self.advance()?; // )
        Ok(params)
    }

    fn parse_function_decl(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // دالة
        let name = self.expect_identifier()?;
        let params = self.parse_params()?;
        let return_type = self.opt_type_annotation()?;
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDecl {
            name,
            params,
            return_type,
            body,
            span,
        })
    }

    fn parse_implementation_decl(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // تطبيق
        let type_name = self.parse_qualified_name()?;
        self.eat_symbol(Symbol::LBrace)?;
        let mut methods = Vec::new();
        while !self.is_symbol(Symbol::RBrace) {
            methods.push(self.parse_stmt()?);
        }
        self.advance()?;
        Ok(Stmt::ImplementationDecl {
            type_name,
            methods,
            span,
        })
    }

    fn parse_actor_decl(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // فاعل
        let name = self.expect_identifier()?;
        self.eat_symbol(Symbol::LBrace)?;
        let mut handlers = Vec::new();
        while !self.is_symbol(Symbol::RBrace) {
            handlers.push(self.parse_stmt()?);
        }
        self.advance()?;
        Ok(Stmt::ActorDecl {
            name,
            handlers,
            span,
        })
    }

    fn parse_import(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // استورد
        let path = self.parse_qualified_name()?;
        let alias = if self.is_keyword(Keyword::As) {
            self.advance()?;
            Some(self.expect_identifier()?)
        } else {
            None
        };
        self.eat_stmt_end()?;
        Ok(Stmt::Import { path, alias, span })
    }

    fn parse_if(&mut self, span: Span, _label: Option<String>) -> Result<Stmt> {
        self.advance()?; // إذا
        let condition = self.parse_expr()?;
        self.eat_keyword(Keyword::Then)?;
        let then_branch = self.parse_block()?;
        let mut else_ifs = Vec::new();
        while self.is_keyword(Keyword::ElseIf) {
            self.advance()?;
            let cond = self.parse_expr()?;
            self.eat_keyword(Keyword::Then)?;
            let body = self.parse_block()?;
            else_ifs.push((cond, body));
        }
        let else_branch = if self.is_keyword(Keyword::Else) {
            self.advance()?;
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_ifs,
            else_branch,
            span,
        })
    }

    fn parse_for(&mut self, span: Span, label: Option<String>) -> Result<Stmt> {
        self.advance()?; // لكل
        let variable = self.expect_identifier()?;
        if self.is_keyword(Keyword::In) {
            self.advance()?;
            let iterable = self.parse_expr()?;
            let body = self.parse_block()?;
            return Ok(Stmt::ForIn {
                label,
                variable,
                iterable,
                body,
                span,
            });
        }
        self.eat_symbol(Symbol::Assign)?;
        let start = self.parse_expr()?;
        let down = if self.is_keyword(Keyword::To) {
            self.advance()?;
            false
        } else {
            self.eat_keyword(Keyword::DownTo)?;
            true
        };
        let end = self.parse_expr()?;
        let step = if self.is_keyword(Keyword::Step) {
            self.advance()?;
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.eat_keyword(Keyword::Do)?;
        let body = self.parse_block()?;
        Ok(Stmt::ForRange {
            label,
            variable,
            start,
            end,
            down,
            step,
            body,
            span,
        })
    }

    fn parse_while(&mut self, span: Span, label: Option<String>) -> Result<Stmt> {
        self.advance()?; // طالما
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            label,
            condition,
            body,
            span,
        })
    }

    fn parse_repeat(&mut self, span: Span, label: Option<String>) -> Result<Stmt> {
        self.advance()?; // كرر
        let body = self.parse_block()?;
        self.eat_keyword(Keyword::Until)?;
        let condition = self.parse_expr()?;
        self.eat_stmt_end()?;
        Ok(Stmt::RepeatUntil {
            label,
            body,
            condition,
            span,
        })
    }

    fn parse_case(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // حالة
        let subject = self.parse_expr()?;
        self.eat_symbol(Symbol::LBrace)?;
        let mut arms = Vec::new();
        let mut default = None;
        while !self.is_symbol(Symbol::RBrace) {
            if self.is_keyword(Keyword::Else) {
                self.advance()?;
                self.eat_symbol(Symbol::Arrow)?;
                default = Some(self.parse_block()?);
                continue;
            }
            self.eat_keyword(Keyword::Of)?;
            let mut matches = vec![self.parse_expr()?];
            while self.is_symbol(Symbol::Comma) {
                self.advance()?;
                matches.push(self.parse_expr()?);
            }
            self.eat_symbol(Symbol::Arrow)?;
            let body = self.parse_block()?;
            arms.push((matches, body));
        }
        self.advance()?;
        Ok(Stmt::Case {
            subject,
            arms,
            default,
            span,
        })
    }

    fn opt_break_label(&mut self) -> Option<String> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            let _ = self.advance();
            Some(name)
        } else {
            None
        }
    }

    fn parse_break(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?;
        let label = self.opt_break_label();
        self.eat_stmt_end()?;
        Ok(Stmt::Break { label, span })
    }

    fn parse_continue(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?;
        let label = self.opt_break_label();
        self.eat_stmt_end()?;
        Ok(Stmt::Continue { label, span })
    }

    fn parse_return(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?;
        let value = if self.is_symbol(Symbol::Semicolon) || self.is_symbol(Symbol::RBrace) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.eat_stmt_end()?;
        Ok(Stmt::Return { value, span })
    }

    fn parse_try(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // حاول
        let body = self.parse_block()?;
        if self.is_keyword(Keyword::Some) {
            self.advance()?;
            let some_binding = self.expect_identifier()?;
            let some_branch = self.parse_block()?;
            self.eat_keyword(Keyword::None)?;
            let none_branch = self.parse_block()?;
            return Ok(Stmt::TryOption {
                body,
                some_binding,
                some_branch,
                none_branch,
                span,
            });
        }
        let (ok_binding, ok_branch) = if self.is_keyword(Keyword::Ok) {
            self.advance()?;
            let binding = self.expect_identifier()?;
            let branch = self.parse_block()?;
            (Some(binding), Some(branch))
        } else {
            (None, None)
        };
        self.eat_keyword(Keyword::Error)?;
        let error_binding = Some(self.expect_identifier()?);
        let error_branch = self.parse_block()?;
        Ok(Stmt::Try {
            body,
            ok_binding,
            ok_branch,
            error_binding,
            error_branch,
            span,
        })
    }

    fn parse_scope_block(&mut self, span: Span) -> Result<Stmt> {
        self.advance()?; // نطاق
        let ordered = if self.is_keyword(Keyword::Ordered) {
            self.advance()?;
            true
        } else {
            false
        };
        let body = self.parse_block()?;
        Ok(Stmt::ScopeBlock {
            ordered,
            body,
            span,
        })
    }

    fn parse_expr_or_assign(&mut self, span: Span) -> Result<Stmt> {
        let expr = self.parse_expr()?;
        if self.is_symbol(Symbol::Assign) {
            self.advance()?;
            let value = self.parse_expr()?;
            self.eat_stmt_end()?;
            return Ok(Stmt::Assign {
                target: expr,
                value,
                span,
            });
        }
        self.eat_stmt_end()?;
        Ok(Stmt::ExprStmt { expr, span })
    }

    // ---- expressions ----------------------------------------------------------------

    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.check_depth()?;
        let result = self.parse_or();
        self.leave_depth();
        result
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        loop {
            let op_span = self.current.span;
            let matched = self.is_symbol(Symbol::OrOr) || self.is_keyword(Keyword::Or);
            if !matched {
                break;
            }
            self.advance()?;
            let right = self.parse_and()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
                span: op_span,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_equality()?;
        loop {
            let op_span = self.current.span;
            let matched = self.is_symbol(Symbol::AndAnd) || self.is_keyword(Keyword::And);
            if !matched {
                break;
            }
            self.advance()?;
            let right = self.parse_equality()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
                span: op_span,
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut left = self.parse_instanceof()?;
        loop {
            let op = if self.is_symbol(Symbol::EqEq) {
                BinaryOp::Eq
            } else if self.is_symbol(Symbol::NotEq) {
                BinaryOp::NotEq
            } else {
                break;
            };
            let span = self.current.span;
            self.advance()?;
            let right = self.parse_instanceof()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_instanceof(&mut self) -> Result<Expr> {
        let value = self.parse_relational()?;
        if self.is_keyword(Keyword::InstanceOf) {
            let span = self.current.span;
            self.advance()?;
            let type_name = self.parse_qualified_name()?;
            return Ok(Expr::InstanceOf {
                value: Box::new(value),
                type_name,
                span,
            });
        }
        Ok(value)
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut left = self.parse_bitor()?;
        loop {
            let op = if self.is_symbol(Symbol::Lt) {
                BinaryOp::Lt
            } else if self.is_symbol(Symbol::Le) {
                BinaryOp::Le
            } else if self.is_symbol(Symbol::Gt) {
                BinaryOp::Gt
            } else if self.is_symbol(Symbol::Ge) {
                BinaryOp::Ge
            } else {
                break;
            };
            let span = self.current.span;
            self.advance()?;
            let right = self.parse_bitor()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> Result<Expr> {
        let mut left = self.parse_bitxor()?;
        while self.is_symbol(Symbol::Pipe) {
            let span = self.current.span;
            self.advance()?;
            let right = self.parse_bitxor()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::BitOr,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> Result<Expr> {
        let mut left = self.parse_bitand()?;
        while self.is_symbol(Symbol::Caret) {
            let span = self.current.span;
            self.advance()?;
            let right = self.parse_bitand()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::BitXor,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> Result<Expr> {
        let mut left = self.parse_shift()?;
        while self.is_symbol(Symbol::Amp) {
            let span = self.current.span;
            self.advance()?;
            let right = self.parse_shift()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::BitAnd,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.is_symbol(Symbol::Shl) {
                BinaryOp::Shl
            } else if self.is_symbol(Symbol::Shr) {
                BinaryOp::Shr
            } else if self.is_symbol(Symbol::Ushr) {
                BinaryOp::Ushr
            } else {
                break;
            };
            let span = self.current.span;
            self.advance()?;
            let right = self.parse_additive()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.is_symbol(Symbol::Plus) {
                BinaryOp::Add
            } else if self.is_symbol(Symbol::Minus) {
                BinaryOp::Sub
            } else if self.is_symbol(Symbol::DotPlus) {
                BinaryOp::ElemAdd
            } else if self.is_symbol(Symbol::DotMinus) {
                BinaryOp::ElemSub
            } else {
                break;
            };
            let span = self.current.span;
            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.is_symbol(Symbol::Star) {
                BinaryOp::Mul
            } else if self.is_symbol(Symbol::Slash) {
                BinaryOp::Div
            } else if self.is_symbol(Symbol::Percent) || self.is_keyword(Keyword::Mod) {
                BinaryOp::Mod
            } else if self.is_keyword(Keyword::Div) {
                BinaryOp::IntDiv
            } else if self.is_symbol(Symbol::DotStar) {
                BinaryOp::ElemMul
            } else if self.is_symbol(Symbol::DotSlash) {
                BinaryOp::ElemDiv
            } else if self.is_symbol(Symbol::DotPercent) {
                BinaryOp::ElemMod
            } else {
                break;
            };
            let span = self.current.span;
            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let span = self.current.span;
        if self.is_symbol(Symbol::Minus) {
            self.advance()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                span,
            });
        }
        if self.is_symbol(Symbol::Bang) {
            self.advance()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        if self.is_symbol(Symbol::Tilde) {
            self.advance()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::BitNot,
                operand: Box::new(operand),
                span,
            });
        }
        if self.is_symbol(Symbol::PlusPlus) {
            self.advance()?;
            let target = self.parse_unary()?;
            return Ok(Expr::PreIncrement {
                target: Box::new(target),
                span,
            });
        }
        if self.is_symbol(Symbol::MinusMinus) {
            self.advance()?;
            let target = self.parse_unary()?;
            return Ok(Expr::PreDecrement {
                target: Box::new(target),
                span,
            });
        }
        if self.is_keyword(Keyword::TypeOf) {
            self.advance()?;
            let value = self.parse_unary()?;
            return Ok(Expr::TypeOf {
                value: Box::new(value),
                span,
            });
        }
        if self.is_keyword(Keyword::SizeOf) {
            self.advance()?;
            let value = self.parse_unary()?;
            return Ok(Expr::SizeOf {
                value: Box::new(value),
                span,
            });
        }
        if self.is_keyword(Keyword::Await) {
            self.advance()?;
            let task = self.parse_unary()?;
            return Ok(Expr::Await {
                task: Box::new(task),
                span,
            });
        }
        if self.is_keyword(Keyword::Spawn) {
            self.advance()?;
            let body = self.parse_unary()?;
            return Ok(Expr::Spawn {
                body: Box::new(body),
                span,
            });
        }
        if self.is_keyword(Keyword::Some) {
            self.advance()?;
            let value = self.parse_unary()?;
            return Ok(Expr::SomeWrap {
                value: Box::new(value),
                span,
            });
        }
        if self.is_keyword(Keyword::Ok) {
            self.advance()?;
            let value = self.parse_unary()?;
            return Ok(Expr::OkWrap {
                value: Box::new(value),
                span,
            });
        }
        if self.is_keyword(Keyword::Error) {
            self.advance()?;
            let value = self.parse_unary()?;
            return Ok(Expr::ErrorWrap {
                value: Box::new(value),
                span,
            });
        }
        if self.is_keyword(Keyword::New) {
            self.advance()?;
            let type_name = self.parse_qualified_name()?;
            let args = self.parse_args()?;
            return Ok(Expr::New { type_name, args, span });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.is_symbol(Symbol::Dot) {
                let span = self.current.span;
                self.advance()?;
                let name = self.expect_identifier()?;
                if self.is_symbol(Symbol::LParen) {
                    let args = self.parse_args()?;
                    expr = Expr::Call {
                        callee: Box::new(Expr::Member {
                            receiver: Box::new(expr),
                            name,
                            optional: false,
                            span,
                        }),
                        overload: None,
                        args,
                        span,
                    };
                } else {
                    expr = Expr::Member {
                        receiver: Box::new(expr),
                        name,
                        optional: false,
                        span,
                    };
                }
            } else if self.is_symbol(Symbol::QuestionDot) {
                let span = self.current.span;
                self.advance()?;
                let name = self.expect_identifier()?;
                expr = Expr::Member {
                    receiver: Box::new(expr),
                    name,
                    optional: true,
                    span,
                };
            } else if self.is_symbol(Symbol::LBracket) {
                let span = self.current.span;
                self.advance()?;
                let index = self.parse_expr()?;
                self.eat_symbol(Symbol::RBracket)?;
                expr = Expr::Index {
                    collection: Box::new(expr),
                    index: Box::new(index),
                    optional: false,
                    span,
                };
            } else if self.is_symbol(Symbol::QuestionBracket) {
                let span = self.current.span;
                self.advance()?;
                let index = self.parse_expr()?;
                self.eat_symbol(Symbol::RBracket)?;
                expr = Expr::Index {
                    collection: Box::new(expr),
                    index: Box::new(index),
                    optional: true,
                    span,
                };
            } else if self.is_symbol(Symbol::LParen) {
                let span = self.current.span;
                let args = self.parse_args()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    overload: None,
                    args,
                    span,
                };
            } else if self.is_symbol(Symbol::ColonColon) {
                let span = self.current.span;
                self.advance()?;
                let overload = self.parse_number_literal_as_u32()?;
                self.eat_symbol(Symbol::LParen)?;
                let args = self.parse_args_inner()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    overload: Some(overload),
                    args,
                    span,
                };
            } else if self.is_symbol(Symbol::QuestionQuestion) {
                let span = self.current.span;
                self.advance()?;
                let right = self.parse_unary()?;
                expr = Expr::Coalesce {
                    left: Box::new(expr),
                    right: Box::new(right),
                    span,
                };
            } else if self.is_symbol(Symbol::PlusPlus) {
                let span = self.current.span;
                self.advance()?;
                expr = Expr::PostIncrement {
                    target: Box::new(expr),
                    span,
                };
            } else if self.is_symbol(Symbol::MinusMinus) {
                let span = self.current.span;
                self.advance()?;
                expr = Expr::PostDecrement {
                    target: Box::new(expr),
                    span,
                };
            } else if self.is_symbol(Symbol::LeftArrow) {
                let span = self.current.span;
                self.advance()?;
                let message = self.parse_unary()?;
                expr = Expr::Send {
                    actor: Box::new(expr),
                    message: Box::new(message),
                    span,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_number_literal_as_u32(&mut self) -> Result<u32> {
        match self.current.kind.clone() {
            TokenKind::Number(s) => {
                let span = self.current.span;
                self.advance()?;
                s.parse::<u32>().map_err(|_| {
                    Error::new(ErrorKind::Syntax, "expected overload index", Self::pos(span))
                })
            }
            _ => Err(Error::new(
                ErrorKind::Syntax,
                "expected overload index",
                Self::pos(self.current.span),
            )),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        self.eat_symbol(Symbol::LParen)?;
        self.parse_args_inner()
    }

    fn parse_args_inner(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        while !self.is_symbol(Symbol::RParen) {
            args.push(self.parse_expr()?);
            if self.is_symbol(Symbol::Comma) {
                self.advance()?;
            }
        }
        self.advance()?; // )
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let span = self.current.span;
        match self.current.kind.clone() {
            TokenKind::Number(s) => {
                self.advance()?;
                Ok(Expr::NumberLiteral(s, span))
            }
            TokenKind::RadixNumber { digits, radix } => {
                self.advance()?;
                Ok(Expr::RadixLiteral { digits, radix, span })
            }
            TokenKind::Char(c) => {
                self.advance()?;
                Ok(Expr::CharLiteral(c, span))
            }
            TokenKind::Str { value, raw } => {
                self.advance()?;
                let parts = if raw {
                    vec![StringPart::Literal(value)]
                } else {
                    crate::eval::interp_string::split_interpolation(&value)
                };
                Ok(Expr::StringLiteral { parts, raw, span })
            }
            TokenKind::ByteString(value) => {
                self.advance()?;
                Ok(Expr::ByteStringLiteral(value, span))
            }
            TokenKind::Temporal { marker, value } => {
                self.advance()?;
                let kind = match marker {
                    crate::token::TemporalMarker::Zaman => TemporalKind::Instant,
                    crate::token::TemporalMarker::NuqtaZamania => TemporalKind::Point,
                    crate::token::TemporalMarker::MiqdarZamani => TemporalKind::Amount,
                    crate::token::TemporalMarker::QimaZamania => TemporalKind::Value,
                };
                Ok(Expr::TemporalLiteral {
                    marker: kind,
                    value,
                    span,
                })
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance()?;
                Ok(Expr::BoolLiteral(true, span))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance()?;
                Ok(Expr::BoolLiteral(false, span))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance()?;
                Ok(Expr::NullLiteral(span))
            }
            TokenKind::Keyword(Keyword::None) => {
                self.advance()?;
                Ok(Expr::NoneLiteral(span))
            }
            TokenKind::Keyword(Keyword::NaN) => {
                self.advance()?;
                Ok(Expr::NaNLiteral(span))
            }
            TokenKind::Keyword(Keyword::Self_) => {
                self.advance()?;
                Ok(Expr::SelfExpr(span))
            }
            TokenKind::Symbol(Symbol::LParen) => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.eat_symbol(Symbol::RParen)?;
                Ok(inner)
            }
            TokenKind::Symbol(Symbol::LBracket) => self.parse_list_literal(span),
            TokenKind::Symbol(Symbol::HashLBrace) => self.parse_set_literal(span),
            TokenKind::Symbol(Symbol::DollarLBrace) => self.parse_map_literal(span),
            TokenKind::Symbol(Symbol::AtLBrace) => self.parse_object_literal(span),
            TokenKind::Identifier(name) => {
                self.advance()?;
                if self.is_symbol(Symbol::Colon) {
                    let mut parts = vec![name];
                    while self.is_symbol(Symbol::Colon) {
                        self.advance()?;
                        parts.push(self.expect_identifier()?);
                    }
                    Ok(Expr::QualifiedAccess {
                        base: Box::new(Expr::Identifier(parts.remove(0), span)),
                        name: parts.join(":"),
                        span,
                    })
                } else {
                    Ok(Expr::Identifier(name, span))
                }
            }
            other => Err(Error::new(
                ErrorKind::Syntax,
                format!("unexpected token in expression: {other:?}"),
                Self::pos(span),
            )),
        }
    }

    fn parse_list_literal(&mut self, span: Span) -> Result<Expr> {
        self.advance()?; // [
        let mut elements = Vec::new();
        while !self.is_symbol(Symbol::RBracket) {
            elements.push(self.parse_expr()?);
            if self.is_symbol(Symbol::Comma) {
                self.advance()?;
            }
        }
        self.advance()?;
        Ok(Expr::ListLiteral { elements, span })
    }

    fn parse_set_literal(&mut self, span: Span) -> Result<Expr> {
        self.advance()?; // #{
        let mut elements = Vec::new();
        while !self.is_symbol(Symbol::RBrace) {
            elements.push(self.parse_expr()?);
            if self.is_symbol(Symbol::Comma) {
                self.advance()?;
            }
        }
        self.advance()?;
        Ok(Expr::SetLiteral { elements, span })
    }

    fn parse_object_literal(&mut self, span: Span) -> Result<Expr> {
        self.advance()?; // @{
        let mut fields = Vec::new();
        while !self.is_symbol(Symbol::RBrace) {
            let name = self.expect_identifier()?;
            self.eat_symbol(Symbol::Assign)?;
            let value = self.parse_expr()?;
            fields.push((name, value));
            if self.is_symbol(Symbol::Comma) {
                self.advance()?;
            }
        }
        self.advance()?; // }
        Ok(Expr::ObjectLiteral { fields, span })
    }

    fn parse_map_literal(&mut self, span: Span) -> Result<Expr> {
        self.advance()?; // ${
        let mut entries = Vec::new();
        while !self.is_symbol(Symbol::RBrace) {
            let key = self.parse_expr()?;
            self.eat_symbol(Symbol::Arrow)?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            if self.is_symbol(Symbol::Comma) {
                self.advance()?;
            }
        }
        self.advance()?;
        Ok(Expr::MapLiteral { entries, span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Program {
        Parser::new(src).unwrap().parse_program().unwrap()
    }

    #[test]
    fn variable_decl_with_initializer() {
        let program = parse("متغير عدد := 1 + 2;");
        assert_eq!(program.items.len(), 1);
        match &program.items[0] {
            Stmt::VariableDecl { name, init, .. } => {
                assert_eq!(name, "عدد");
                assert!(matches!(init, Some(Expr::Binary { op: BinaryOp::Add, .. })));
            }
            other => panic!("unexpected stmt: {other:?}"),
        }
    }

    #[test]
    fn if_else_if_else_chain() {
        let program = parse("إذا صحيح فإن { } وإلا_إذا خطأ_منطقي فإن { } وإلا { }");
        assert_eq!(program.items.len(), 1);
        assert!(matches!(program.items[0], Stmt::If { .. }));
    }

    #[test]
    fn for_range_downto_with_step() {
        let program = parse("لكل ع := 10 تنازلياً 1 بخطوة 2 نفذ { }");
        match &program.items[0] {
            Stmt::ForRange { down, step, .. } => {
                assert!(*down);
                assert!(step.is_some());
            }
            other => panic!("unexpected stmt: {other:?}"),
        }
    }

    #[test]
    fn member_call_and_index_chain() {
        let program = parse("عدد.اطبع()[0];");
        match &program.items[0] {
            Stmt::ExprStmt { expr, .. } => {
                assert!(matches!(expr, Expr::Index { .. }));
            }
            other => panic!("unexpected stmt: {other:?}"),
        }
    }

    #[test]
    fn new_expression_constructs_qualified_type() {
        let program = parse("جديد جافا:لغة:سلسلة(س);");
        match &program.items[0] {
            Stmt::ExprStmt { expr, .. } => match expr {
                Expr::New { type_name, args, .. } => {
                    assert_eq!(type_name.to_dotted(), "جافا:لغة:سلسلة");
                    assert_eq!(args.len(), 1);
                }
                other => panic!("unexpected expr: {other:?}"),
            },
            other => panic!("unexpected stmt: {other:?}"),
        }
    }

    #[test]
    fn qualified_call_with_overload_index() {
        let program = parse("جافا:لغة:سلسلة::1(س);");
        match &program.items[0] {
            Stmt::ExprStmt { expr, .. } => {
                assert!(matches!(
                    expr,
                    Expr::Call {
                        overload: Some(1),
                        ..
                    }
                ));
            }
            other => panic!("unexpected stmt: {other:?}"),
        }
    }
}
