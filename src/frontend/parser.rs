use crate::bytecode::code::Code;
use crate::bytecode::label::LabelId;
use crate::bytecode::op::{CompOp, Op};
use crate::bytecode::operand::{Cond, Operand, OperandKind};
use crate::frontend::diagnostic::{Diagnostics, Message};
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::symtab::{SymbolError, Tab};
use crate::symtab::obj::{ObjId, ObjKind};
use crate::symtab::structure::{CHAR_TYPE, INT_TYPE, NO_TYPE, StructId, StructKind};

use TokenKind::*;

const MAX_GLOBALS: usize = 32767;
const MAX_FIELDS: usize = 32767;
const MAX_LOCALS: usize = 127;

/// Tokens that must be scanned after an error before the next one is reported.
const MIN_ERROR_DIST: u32 = 3;

// =============================================================================
// SYNCHRONIZATION SETS
// =============================================================================

const FIRST_DECL: &[TokenKind] = &[Final, Ident, Class];
const BREAK_DECL: &[TokenKind] = &[LBrace, Eof];

const FIRST_METHOD_DECL: &[TokenKind] = &[Ident, Void];
const BREAK_METHOD_DECL: &[TokenKind] = &[RBrace, Eof];

/// Statement starts used for resynchronization. `Ident` and `{` are left out
/// so that recovery does not stop inside an expression or a nested block.
const FIRST_STAT_RECOVERY: &[TokenKind] = &[If, While, Break, Return, Read, Print, Semicolon];
const BREAK_STAT: &[TokenKind] = &[RBrace, Eof];

const FIRST_STATEMENT: &[TokenKind] = &[Ident, If, While, Break, Return, Read, Print, LBrace, Semicolon];
const FIRST_FACTOR: &[TokenKind] = &[Ident, Number, CharConst, New, LPar];
const FIRST_ASSIGNOP: &[TokenKind] = &[Assign, PlusAs, MinusAs, TimesAs, SlashAs, RemAs];
const FIRST_MULOP: &[TokenKind] = &[Times, Slash, Rem];

/// Single-pass recursive-descent compiler for MicroJava.
///
/// Each production is one method. Name resolution, type checking and code
/// emission happen while the production is recognized; nothing is deferred.
///
/// Errors never abort parsing. They are recorded in [`Parser::diagnostics`],
/// throttled by the distance to the previous error, and the three recovery
/// routines resynchronize on declaration, method and statement boundaries.
pub struct Parser {
    lexer: Lexer,
    pub diagnostics: Diagnostics,
    pub tab: Tab,
    pub code: Code,
    /// Last recognized token.
    t: Token,
    /// Lookahead token.
    la: Token,
    /// Tokens scanned since the last error.
    error_dist: u32,
    program: Option<ObjId>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            diagnostics: Diagnostics::new(),
            tab: Tab::new(),
            code: Code::new(),
            // placeholder so that an error on the very first token has a position
            t: Token::new(None, 1, 1),
            la: Token::new(None, 1, 1),
            error_dist: MIN_ERROR_DIST,
            program: Option::None,
        }
    }

    /// Parses the whole compilation unit.
    pub fn parse(&mut self) {
        self.scan();
        self.program();
        self.check(Eof);
    }

    /// The program object, once `program <ident>` has been seen.
    pub fn program_obj(&self) -> Option<ObjId> {
        self.program
    }

    // =========================================================================
    // Token handling
    // =========================================================================

    fn sym(&self) -> TokenKind {
        self.la.kind
    }

    fn scan(&mut self) {
        let next = self.lexer.next_token(&mut self.diagnostics);
        self.t = std::mem::replace(&mut self.la, next);
        self.error_dist = self.error_dist.saturating_add(1);
    }

    fn check(&mut self, expected: TokenKind) {
        if self.sym() == expected {
            self.scan();
        } else {
            self.error(Message::TokenExpected(expected));
        }
    }

    /// Reports at the lookahead position unless an error was reported
    /// fewer than [`MIN_ERROR_DIST`] tokens ago.
    fn error(&mut self, message: Message) {
        self.error_at(self.la.line, self.la.col, message);
    }

    fn error_at(&mut self, line: usize, col: usize, message: Message) {
        if self.error_dist >= MIN_ERROR_DIST {
            self.diagnostics.report(line, col, message);
        }
        self.error_dist = 0;
    }

    fn report(&mut self, result: Result<(), Message>) {
        if let Err(message) = result {
            self.error(message);
        }
    }

    // =========================================================================
    // Symbol table access
    // =========================================================================

    fn insert(&mut self, kind: ObjKind, ty: StructId) -> ObjId {
        let name = self.t.name().to_string();
        match self.tab.insert(kind, &name, ty) {
            Ok(obj) => obj,
            Err(err) => {
                let obj = match &err {
                    SymbolError::Duplicate { obj, .. } => *obj,
                    _ => self.tab.no_obj,
                };
                self.error(err.into());
                obj
            }
        }
    }

    fn find(&mut self, name: &str) -> ObjId {
        match self.tab.find(name) {
            Ok(obj) => obj,
            Err(err) => {
                self.error(err.into());
                self.tab.no_obj
            }
        }
    }

    fn find_field(&mut self, name: &str, ty: StructId) -> ObjId {
        match self.tab.find_field(name, ty) {
            Ok(obj) => obj,
            Err(err) => {
                self.error(err.into());
                self.tab.no_obj
            }
        }
    }

    fn load(&mut self, x: &mut Operand) {
        let result = self.code.load(x);
        self.report(result);
    }

    fn is_int(x: &Operand) -> bool {
        x.ty == INT_TYPE
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `Program = "program" ident { ConstDecl | VarDecl | ClassDecl } "{" { MethodDecl } "}"`
    fn program(&mut self) {
        self.check(Program);
        self.check(Ident);
        let prog = self.insert(ObjKind::Prog, NO_TYPE);
        self.program = Some(prog);
        self.tab.open_scope();

        loop {
            match self.sym() {
                Final => self.const_decl(),
                Ident => self.var_decl(),
                Class => self.class_decl(),
                s if BREAK_DECL.contains(&s) => break,
                _ => self.recover_decl(),
            }
        }
        if self.tab.cur_n_vars() > MAX_GLOBALS {
            self.error(Message::TooManyGlobals);
        }

        self.check(LBrace);
        loop {
            let s = self.sym();
            if FIRST_METHOD_DECL.contains(&s) {
                self.method_decl();
            } else if BREAK_METHOD_DECL.contains(&s) {
                break;
            } else {
                self.recover_method_decl();
            }
        }
        self.check(RBrace);

        if self.code.main_pc.is_none() {
            self.error(Message::MainNotFound);
        }
        self.code.data_size = self.tab.cur_n_vars();
        let locals = self.tab.cur_locals();
        self.tab.obj_mut(prog).locals = locals;
        self.tab.close_scope();
    }

    /// `ConstDecl = "final" Type ident "=" ( number | charConst ) ";"`
    fn const_decl(&mut self) {
        self.check(Final);
        let ty = self.ty();
        self.check(Ident);
        let con = self.insert(ObjKind::Con, ty);
        self.check(Assign);

        if (self.sym() == CharConst && ty != CHAR_TYPE) || (self.sym() == Number && ty != INT_TYPE) {
            self.error(Message::IncompatibleTypes);
        }
        match self.sym() {
            CharConst | Number => {
                self.scan();
                self.tab.obj_mut(con).val = self.t.value;
            }
            _ => self.error(Message::InvalidConstType),
        }
        self.check(Semicolon);
    }

    /// `VarDecl = Type ident { "," ident } ";"`
    fn var_decl(&mut self) {
        let ty = self.ty();
        self.check(Ident);
        self.insert(ObjKind::Var, ty);
        while self.sym() == Comma {
            self.scan();
            self.check(Ident);
            self.insert(ObjKind::Var, ty);
        }
        self.check(Semicolon);
    }

    /// `ClassDecl = "class" ident "{" { VarDecl } "}"`
    fn class_decl(&mut self) {
        self.check(Class);
        self.check(Ident);
        let class = self.tab.types.new_class();
        self.insert(ObjKind::Type, class);

        self.check(LBrace);
        self.tab.open_scope();
        while self.sym() == Ident {
            self.var_decl();
        }
        if self.tab.cur_n_vars() > MAX_FIELDS {
            self.error(Message::TooManyFields);
        }
        let fields = self.tab.cur_locals();
        self.tab.types.set_fields(class, fields);
        self.check(RBrace);
        self.tab.close_scope();
    }

    /// `MethodDecl = ( Type | "void" ) ident "(" [ FormPars ] ")" { VarDecl } Block`
    fn method_decl(&mut self) {
        let mut is_void = false;
        let mut ty = NO_TYPE;
        match self.sym() {
            Ident => {
                ty = self.ty();
                if self.tab.types.is_ref_type(ty) {
                    self.error(Message::IllegalMethodReturnType);
                }
            }
            Void => {
                self.scan();
                is_void = true;
            }
            _ => self.error(Message::InvalidMethodDecl),
        }

        self.check(Ident);
        let name = self.t.name().to_string();
        let meth = self.insert(ObjKind::Meth, ty);
        let entry = self.code.pc as i32;
        self.tab.obj_mut(meth).adr = entry;

        self.check(LPar);
        self.tab.open_scope();
        let mut has_pars = false;
        if self.sym() == Ident {
            let n_pars = self.form_pars();
            self.tab.obj_mut(meth).n_pars = n_pars;
            has_pars = true;
        }
        self.check(RPar);
        // parameters are visible to recursive calls in the body
        let locals = self.tab.cur_locals();
        self.tab.obj_mut(meth).locals = locals;

        if name == "main" {
            if !is_void {
                self.error(Message::MainNotVoid);
            }
            if has_pars {
                self.error(Message::MainWithParams);
            }
            self.code.main_pc = Some(entry as usize);
        }

        while self.sym() == Ident {
            self.var_decl();
        }
        let n_vars = self.tab.cur_n_vars();
        if n_vars > MAX_LOCALS {
            self.error(Message::TooManyLocals);
        }

        tracing::debug!(method = %name, entry, n_vars, "method");
        let n_pars = self.tab.obj(meth).n_pars;
        self.code.put_op(Op::Enter);
        self.code.put(n_pars as i32);
        self.code.put(n_vars as i32);
        self.block(ty, Option::None);

        if is_void {
            self.code.put_op(Op::Exit);
            self.code.put_op(Op::Return);
        } else {
            // falling off the end of a function is a runtime error
            self.code.put_op(Op::Trap);
            self.code.put(1);
        }
        if self.code.take_far_jump() {
            self.error(Message::JumpTooFar);
        }

        let locals = self.tab.cur_locals();
        self.tab.obj_mut(meth).locals = locals;
        self.tab.close_scope();
    }

    /// `FormPars = Type ident { "," Type ident }`
    fn form_pars(&mut self) -> usize {
        let mut n_pars = 0;
        loop {
            let ty = self.ty();
            self.check(Ident);
            self.insert(ObjKind::Var, ty);
            n_pars += 1;
            if self.sym() != Comma {
                return n_pars;
            }
            self.scan();
        }
    }

    /// `Type = ident [ "[" "]" ]`
    fn ty(&mut self) -> StructId {
        self.check(Ident);
        let name = self.t.name().to_string();
        let obj = self.find(&name);
        if self.tab.obj(obj).kind != ObjKind::Type {
            self.error(Message::TypeExpected);
        }

        let mut ty = self.tab.obj(obj).ty;
        if self.sym() == LBrack {
            self.scan();
            self.check(RBrack);
            ty = self.tab.types.array_of(ty);
        }
        ty
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// `Block = "{" { Statement } "}"`
    fn block(&mut self, meth_ty: StructId, break_label: Option<LabelId>) {
        self.check(LBrace);
        loop {
            let s = self.sym();
            if FIRST_STATEMENT.contains(&s) {
                self.statement(meth_ty, break_label);
            } else if BREAK_STAT.contains(&s) {
                break;
            } else {
                self.recover_stat();
            }
        }
        self.check(RBrace);
    }

    fn statement(&mut self, meth_ty: StructId, break_label: Option<LabelId>) {
        match self.sym() {
            Ident => {
                self.designator_statement();
                self.check(Semicolon);
            }
            If => {
                self.scan();
                self.check(LPar);
                let end = self.code.new_label();
                let cond = self.condition();
                self.code.f_jump(cond.op, cond.f_label);
                self.code.here(cond.t_label);
                self.check(RPar);

                self.statement(meth_ty, break_label);

                if self.sym() == Else {
                    self.code.jump(end);
                    self.scan();
                    self.code.here(cond.f_label);
                    self.statement(meth_ty, break_label);
                } else {
                    self.code.here(cond.f_label);
                }
                self.code.here(end);
            }
            While => {
                self.scan();
                self.check(LPar);
                let top = self.code.new_label();
                self.code.here(top);
                let cond = self.condition();
                self.code.f_jump(cond.op, cond.f_label);
                self.code.here(cond.t_label);
                self.check(RPar);

                self.statement(meth_ty, Some(cond.f_label));
                self.code.jump(top);
                self.code.here(cond.f_label);
            }
            Break => {
                self.scan();
                match break_label {
                    Some(label) => self.code.jump(label),
                    Option::None => self.error(Message::BreakOutsideLoop),
                }
                self.check(Semicolon);
            }
            Return => {
                self.scan();
                if self.sym() == Minus || FIRST_FACTOR.contains(&self.sym()) {
                    let mut x = self.expr();
                    self.load(&mut x);
                    if meth_ty == NO_TYPE {
                        let (line, col) = (self.t.line, self.t.col);
                        self.error_at(line, col, Message::UnexpectedReturnValue);
                    } else if !self.tab.types.assignable_to(x.ty, meth_ty) {
                        self.error(Message::ReturnTypeMismatch);
                    }
                } else if meth_ty != NO_TYPE {
                    self.error(Message::MissingReturnValue);
                }
                self.code.put_op(Op::Exit);
                self.code.put_op(Op::Return);
                self.check(Semicolon);
            }
            Read => {
                self.scan();
                self.check(LPar);
                let x = self.designator();
                if x.is_read_only() {
                    self.error(Message::CannotStoreToReadonly(x.kind.name().to_string()));
                } else {
                    if x.ty == CHAR_TYPE {
                        self.code.put_op(Op::BRead);
                    } else if x.ty == INT_TYPE {
                        self.code.put_op(Op::Read);
                    } else {
                        self.error(Message::IllegalReadArgument);
                    }
                    let result = self.code.assign(&x, &mut Operand::stack(x.ty));
                    self.report(result);
                }
                self.check(RPar);
                self.check(Semicolon);
            }
            Print => {
                self.scan();
                self.check(LPar);
                let mut x = self.expr();
                self.load(&mut x);
                let mut width = 0;
                if self.sym() == Comma {
                    self.scan();
                    self.check(Number);
                    width = self.t.value;
                }
                self.code.load_const(width);
                if x.ty == CHAR_TYPE {
                    self.code.put_op(Op::BPrint);
                } else if x.ty == INT_TYPE {
                    self.code.put_op(Op::Print);
                } else {
                    self.error(Message::IllegalPrintArgument);
                }
                self.check(RPar);
                self.check(Semicolon);
            }
            LBrace => self.block(meth_ty, break_label),
            Semicolon => self.scan(),
            _ => self.error(Message::InvalidStatement),
        }
    }

    /// `Designator ( Assignop Expr | ActPars | "++" | "--" )`
    fn designator_statement(&mut self) {
        let mut x = self.designator();
        let s = self.sym();

        if FIRST_ASSIGNOP.contains(&s) {
            if x.is_read_only() && x.kind != OperandKind::Stack {
                self.error(Message::CannotStoreToReadonly(x.kind.name().to_string()));
                return;
            }
            let op = self.assignop();
            if op.is_some() {
                let result = self.code.prepare_lhs(&x);
                self.report(result);
            }
            let mut y = self.expr();
            if !self.tab.types.assignable_to(y.ty, x.ty) {
                self.error(Message::IncompatibleTypes);
                return;
            }
            let result = match op {
                Option::None => self.code.assign(&x, &mut y),
                Some(_) if !Self::is_int(&x) || !Self::is_int(&y) => Err(Message::IncompatibleTypes),
                Some(op) => {
                    self.load(&mut y);
                    self.code.put_op(op);
                    self.code.assign(&x, &mut Operand::stack(x.ty))
                }
            };
            self.report(result);
        } else if s == LPar {
            self.act_pars(&mut x);
            if x.ty != NO_TYPE {
                self.code.put_op(Op::Pop);
            }
        } else if s == PPlus || s == MMinus {
            if !Self::is_int(&x) {
                self.error(Message::IncDecExpectsInt);
            } else {
                let result = self.code.inc(&x, if s == PPlus { 1 } else { -1 });
                self.report(result);
            }
            self.scan();
        } else {
            self.error(Message::InvalidDesignatorStatement);
        }
    }

    /// `Assignop = "=" | "+=" | "-=" | "*=" | "/=" | "%="`
    ///
    /// Returns the arithmetic instruction of a compound assignment.
    fn assignop(&mut self) -> Option<Op> {
        let op = match self.sym() {
            Assign => Option::None,
            PlusAs => Some(Op::Add),
            MinusAs => Some(Op::Sub),
            TimesAs => Some(Op::Mul),
            SlashAs => Some(Op::Div),
            RemAs => Some(Op::Rem),
            _ => {
                self.error(Message::InvalidAssignOp);
                return Option::None;
            }
        };
        self.scan();
        op
    }

    /// `ActPars = "(" [ Expr { "," Expr } ] ")"`
    fn act_pars(&mut self, x: &mut Operand) {
        self.check(LPar);
        let OperandKind::Meth(meth) = x.kind else {
            self.error(Message::CallToNonMethod);
            return;
        };

        let f_pars = self.tab.obj(meth).n_pars;
        let params = self.tab.obj(meth).locals.clone();
        let mut a_pars = 0;

        if self.sym() == Minus || FIRST_FACTOR.contains(&self.sym()) {
            loop {
                let mut arg = self.expr();
                self.load(&mut arg);
                if let Some(&param) = params.get(a_pars).filter(|_| a_pars < f_pars) {
                    let param_ty = self.tab.obj(param).ty;
                    if !self.tab.types.assignable_to(arg.ty, param_ty) {
                        self.error(Message::ArgumentTypeMismatch);
                    }
                }
                a_pars += 1;
                if self.sym() != Comma {
                    break;
                }
                self.scan();
            }
        }

        if a_pars != f_pars {
            self.error(Message::WrongArgumentCount);
        }
        self.check(RPar);

        self.code.method_call(&self.tab, x);
        x.kind = OperandKind::Stack;
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    /// `Condition = CondTerm { "||" CondTerm }`
    fn condition(&mut self) -> Cond {
        let mut x = self.cond_term();
        while self.sym() == Or {
            self.code.t_jump(x.op, x.t_label);
            self.scan();
            self.code.here(x.f_label);
            let y = self.cond_term();
            x.f_label = y.f_label;
            x.op = y.op;
        }
        x
    }

    /// `CondTerm = CondFact { "&&" CondFact }`
    fn cond_term(&mut self) -> Cond {
        let mut x = self.cond_fact();
        while self.sym() == And {
            self.code.f_jump(x.op, x.f_label);
            self.scan();
            let y = self.cond_fact();
            x.op = y.op;
        }
        x
    }

    /// `CondFact = Expr Relop Expr`
    fn cond_fact(&mut self) -> Cond {
        let mut x = self.expr();
        self.load(&mut x);
        let op = self.relop();
        let mut y = self.expr();
        self.load(&mut y);

        if !self.tab.types.compatible_with(x.ty, y.ty) {
            self.error(Message::IncompatibleTypes);
        }
        if self.tab.types.is_ref_type(x.ty) && op != CompOp::Eq && op != CompOp::Ne {
            self.error(Message::IllegalReferenceComparison);
        }

        Cond {
            op,
            t_label: self.code.new_label(),
            f_label: self.code.new_label(),
        }
    }

    /// `Relop = "==" | "!=" | ">" | ">=" | "<" | "<="`
    fn relop(&mut self) -> CompOp {
        let op = match self.sym() {
            Eql => CompOp::Eq,
            Neq => CompOp::Ne,
            Gtr => CompOp::Gt,
            Geq => CompOp::Ge,
            Lss => CompOp::Lt,
            Leq => CompOp::Le,
            _ => {
                self.error(Message::InvalidRelOp);
                return CompOp::Eq;
            }
        };
        self.scan();
        op
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// `Expr = [ "-" ] Term { Addop Term }`
    fn expr(&mut self) -> Operand {
        let negate = self.sym() == Minus;
        if negate {
            self.scan();
        }

        let mut x = self.term();

        if negate {
            if !Self::is_int(&x) {
                self.error(Message::UnaryMinusExpectsInt);
                return Operand::int(1);
            }
            if let OperandKind::Con(val) = x.kind {
                x.kind = OperandKind::Con(val.wrapping_neg());
            } else {
                self.load(&mut x);
                self.code.put_op(Op::Neg);
                x = Operand::stack(INT_TYPE);
            }
        }

        while self.sym() == Plus || self.sym() == Minus {
            let op = self.addop();
            self.load(&mut x);
            let mut y = self.term();
            if !Self::is_int(&x) || !Self::is_int(&y) {
                self.error(Message::IncompatibleTypes);
                return Operand::int(1);
            }
            self.load(&mut y);
            self.code.put_op(op);
        }
        x
    }

    /// `Term = Factor { Mulop Factor }`
    fn term(&mut self) -> Operand {
        let mut x = self.factor();
        while FIRST_MULOP.contains(&self.sym()) {
            let op = self.mulop();
            self.load(&mut x);
            let mut y = self.factor();
            if !Self::is_int(&x) || !Self::is_int(&y) {
                self.error(Message::IncompatibleTypes);
                return Operand::int(1);
            }
            self.load(&mut y);
            self.code.put_op(op);
        }
        x
    }

    /// `Addop = "+" | "-"`
    fn addop(&mut self) -> Op {
        let op = match self.sym() {
            Plus => Op::Add,
            Minus => Op::Sub,
            _ => {
                self.error(Message::InvalidAddOp);
                return Op::Nop;
            }
        };
        self.scan();
        op
    }

    /// `Mulop = "*" | "/" | "%"`
    fn mulop(&mut self) -> Op {
        let op = match self.sym() {
            Times => Op::Mul,
            Slash => Op::Div,
            Rem => Op::Rem,
            _ => {
                self.error(Message::InvalidMulOp);
                return Op::Nop;
            }
        };
        self.scan();
        op
    }

    /// `Factor = Designator [ ActPars ] | number | charConst | "new" ident [ "[" Expr "]" ] | "(" Expr ")"`
    fn factor(&mut self) -> Operand {
        match self.sym() {
            Ident => {
                let mut x = self.designator();
                if self.sym() == LPar {
                    if x.ty == NO_TYPE {
                        self.error(Message::VoidCallInExpression);
                        return Operand::int(1);
                    }
                    self.act_pars(&mut x);
                }
                x
            }
            Number => {
                self.scan();
                Operand::int(self.t.value)
            }
            CharConst => {
                self.scan();
                Operand::char_const(self.t.value)
            }
            New => self.new_factor(),
            LPar => {
                self.scan();
                let x = self.expr();
                self.check(RPar);
                x
            }
            _ => {
                self.error(Message::InvalidFactor);
                Operand::int(0)
            }
        }
    }

    fn new_factor(&mut self) -> Operand {
        self.scan();
        self.check(Ident);
        let name = self.t.name().to_string();
        let obj = self.find(&name);
        if self.tab.obj(obj).kind != ObjKind::Type {
            self.error(Message::TypeExpected);
            return Operand::int(1);
        }
        let ty = self.tab.obj(obj).ty;

        if self.sym() == LBrack {
            self.scan();
            let x = Operand::stack(self.tab.types.array_of(ty));
            let mut size = self.expr();
            if !Self::is_int(&size) {
                self.error(Message::ArraySizeExpectsInt);
            } else {
                self.load(&mut size);
                self.code.put_op(Op::NewArray);
                self.code.put(if ty == CHAR_TYPE { 0 } else { 1 });
            }
            self.check(RBrack);
            return x;
        }

        if !self.tab.types.is_class(ty) {
            self.error(Message::ClassTypeExpected);
            return Operand::int(1);
        }
        let n_fields = self.tab.types.fields(ty).len();
        self.code.put_op(Op::New);
        self.code.put2(n_fields as i32);
        Operand::stack(ty)
    }

    /// `Designator = ident { "." ident | "[" [ "~" ] Expr "]" }`
    ///
    /// `a[~e]` indexes from the end: the element at `len(a) - e`.
    fn designator(&mut self) -> Operand {
        self.check(Ident);
        let name = self.t.name().to_string();
        let obj = self.find(&name);
        let mut x = match Operand::from_obj(&self.tab, obj) {
            Ok(x) => x,
            Err((x, message)) => {
                self.error(message);
                x
            }
        };

        loop {
            match self.sym() {
                Period => {
                    if !self.tab.types.is_class(x.ty) {
                        self.error(Message::FieldAccessToNonClass);
                    }
                    self.scan();
                    self.check(Ident);
                    self.load(&mut x);
                    let field_name = self.t.name().to_string();
                    let field = self.find_field(&field_name, x.ty);
                    let field = self.tab.obj(field);
                    x = Operand {
                        kind: OperandKind::Fld(field.adr),
                        ty: field.ty,
                    };
                }
                LBrack => {
                    let elem = self.tab.types.elem_type(x.ty);
                    if elem.is_none() {
                        self.error(Message::IndexedAccessToNonArray);
                    }
                    self.scan();
                    let from_end = self.sym() == Tilde;
                    if from_end {
                        self.scan();
                    }

                    self.load(&mut x);
                    x = match elem {
                        Some(ty) => Operand {
                            kind: OperandKind::Elem,
                            ty,
                        },
                        Option::None => Operand {
                            kind: OperandKind::None,
                            ty: NO_TYPE,
                        },
                    };

                    if from_end {
                        self.code.put_op(Op::Dup);
                        self.code.put_op(Op::ArrayLength);
                    }

                    let mut index = self.expr();
                    if !matches!(self.tab.types.kind(index.ty), StructKind::Int) {
                        self.error(Message::ArrayIndexExpectsInt);
                        self.code.load_const(1);
                    } else {
                        self.load(&mut index);
                        if from_end {
                            self.code.put_op(Op::Sub);
                        }
                    }
                    self.check(RBrack);
                }
                _ => return x,
            }
        }
    }

    // =========================================================================
    // Error recovery
    // =========================================================================

    fn skip_until(&mut self, first: &[TokenKind], follow: &[TokenKind]) {
        loop {
            self.scan();
            let s = self.sym();
            if first.contains(&s) || follow.contains(&s) {
                break;
            }
        }
        self.error_dist = 0;
    }

    fn recover_decl(&mut self) {
        self.error(Message::DeclarationRecovery);
        self.skip_until(FIRST_DECL, BREAK_DECL);
    }

    fn recover_method_decl(&mut self) {
        self.error(Message::MethodDeclRecovery);
        self.skip_until(FIRST_METHOD_DECL, BREAK_METHOD_DECL);
    }

    fn recover_stat(&mut self) {
        let s = self.sym();
        if !FIRST_STAT_RECOVERY.contains(&s) && !BREAK_STAT.contains(&s) {
            self.error(Message::StatementRecovery);
        }
        self.skip_until(FIRST_STAT_RECOVERY, BREAK_STAT);
    }
}
