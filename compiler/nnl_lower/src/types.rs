//! Bottom-up type inference over the AST.
//!
//! Types are computed lazily and memoized per node. Inference never fails:
//! an unknown reference is `Var` here and reported when it is rendered.

use nnl_graph::Instruction;
use nnl_ir::{AstKind, BinaryOp, BindingKind, NodeId, TypeDecl, UnaryOp};

use crate::render::ensure_sufficient_stack;
use crate::resolve::Resolved;
use crate::ModuleCompiler;

/// Result type of an arithmetic operator over two operand types.
///
/// `Int` with `Int` stays `Int`; two numerics with at least one `Double`
/// become `Double`; everything else is the generic instruction's type.
pub fn arithmetic_type(op: BinaryOp, left: TypeDecl, right: TypeDecl) -> TypeDecl {
    match (left, right) {
        (TypeDecl::Int, TypeDecl::Int) => TypeDecl::Int,
        (l, r) if l.is_numeric() && r.is_numeric() => TypeDecl::Double,
        _ => arithmetic_instruction(op, TypeDecl::Var).map_or(TypeDecl::Var, Instruction::return_type),
    }
}

/// Instruction for an arithmetic operator specialized for `ty`.
pub fn arithmetic_instruction(op: BinaryOp, ty: TypeDecl) -> Option<Instruction> {
    use Instruction as I;
    let (int, double, generic) = match op {
        BinaryOp::Add => (I::AddInt, I::AddDouble, I::Add),
        BinaryOp::Sub => (I::SubtractInt, I::SubtractDouble, I::Subtract),
        BinaryOp::Mul => (I::MultiplyInt, I::MultiplyDouble, I::Multiply),
        BinaryOp::Div => (I::DivideInt, I::DivideDouble, I::Divide),
        BinaryOp::Mod => (I::ModulusInt, I::ModulusDouble, I::Modulus),
        _ => return None,
    };
    Some(match ty {
        TypeDecl::Int => int,
        TypeDecl::Double => double,
        _ => generic,
    })
}

/// Instruction for unary minus specialized for `ty`.
pub fn minus_instruction(ty: TypeDecl) -> Instruction {
    match ty {
        TypeDecl::Int => Instruction::MinusInt,
        TypeDecl::Double => Instruction::MinusDouble,
        _ => Instruction::Minus,
    }
}

impl ModuleCompiler<'_> {
    /// Type of the value `id` produces.
    pub fn type_of(&mut self, id: NodeId) -> TypeDecl {
        if !id.is_valid() {
            return TypeDecl::None;
        }
        if let Some(ty) = self.types.get(id.index()).copied().flatten() {
            return ty;
        }
        // Cycles through references (`int x = x + 1`) see `Var`.
        self.types[id.index()] = Some(TypeDecl::Var);
        let ty = ensure_sufficient_stack(|| self.infer(id));
        self.types[id.index()] = Some(ty);
        ty
    }

    fn infer(&mut self, id: NodeId) -> TypeDecl {
        match *self.ast.kind(id) {
            AstKind::Int(_) => TypeDecl::Int,
            AstKind::Double(_) => TypeDecl::Double,
            AstKind::Str(_) => TypeDecl::String,
            AstKind::Symbol(_) | AstKind::Class { .. } | AstKind::Error => TypeDecl::Var,
            AstKind::VarDecl { ty, .. } => ty,
            AstKind::Ref(name) => match self.resolve_name(id, name) {
                Some(Resolved::Decl(decl)) => self.declaration_type(decl),
                Some(Resolved::Static(_)) | None => TypeDecl::Var,
            },
            AstKind::Unary { op, operand } => match op {
                UnaryOp::Not => TypeDecl::Bool,
                UnaryOp::Negate => {
                    let ty = self.type_of(operand);
                    minus_instruction(ty).return_type()
                }
                UnaryOp::ByRef | UnaryOp::Increment | UnaryOp::Decrement => {
                    self.type_of(operand)
                }
                UnaryOp::BindingRead(kind) => self.binding_type(kind, operand),
            },
            AstKind::Binary { op, left, right } => {
                if op.is_assignment() {
                    self.type_of(left)
                } else if op.is_arithmetic() {
                    let l = self.type_of(left);
                    let r = self.type_of(right);
                    arithmetic_type(op, l, r)
                } else {
                    // Comparison, containment and logical operators.
                    TypeDecl::Bool
                }
            }
            AstKind::Path { .. } => self.binding_type(BindingKind::Variable, id),
            AstKind::Call { callee, .. } => self.callee_return_type(callee),
            AstKind::List { items } => {
                let items = self.ast.get_list(items).to_vec();
                let mut element: Option<TypeDecl> = None;
                for item in items {
                    let ty = self.type_of(item);
                    match element {
                        None => element = Some(ty),
                        Some(e) if e == ty => {}
                        Some(_) => return TypeDecl::Var,
                    }
                }
                element.and_then(TypeDecl::array_of).unwrap_or(TypeDecl::Var)
            }
            AstKind::Union { .. } => Instruction::Union.return_type(),
            AstKind::Function { .. }
            | AstKind::Using { .. }
            | AstKind::Conditional { .. }
            | AstKind::ConditionalPart { .. }
            | AstKind::For { .. }
            | AstKind::ForEach { .. }
            | AstKind::Select { .. }
            | AstKind::Lock { .. }
            | AstKind::Return { .. }
            | AstKind::CodeList { .. }
            | AstKind::Link { .. } => TypeDecl::None,
        }
    }

    fn declaration_type(&mut self, decl: NodeId) -> TypeDecl {
        match *self.ast.kind(decl) {
            AstKind::VarDecl { ty, .. } => ty,
            AstKind::Function { .. } => TypeDecl::None,
            _ => TypeDecl::Var,
        }
    }

    fn binding_type(&mut self, kind: BindingKind, path: NodeId) -> TypeDecl {
        let segments = self.binding_segments(path);
        self.bindings.type_of(kind, &segments)
    }

    /// First declared return type of the called function, `None` if it
    /// returns nothing.
    fn callee_return_type(&mut self, callee: NodeId) -> TypeDecl {
        if !callee.is_valid() {
            return TypeDecl::Var;
        }
        match *self.ast.kind(callee) {
            AstKind::Ref(name) => match self.resolve_name(callee, name) {
                Some(Resolved::Decl(decl)) => match *self.ast.kind(decl) {
                    AstKind::Function { returns, .. } => self
                        .ast
                        .get_types(returns)
                        .first()
                        .copied()
                        .unwrap_or(TypeDecl::None),
                    _ => TypeDecl::Var,
                },
                _ => TypeDecl::Var,
            },
            AstKind::Unary {
                op: UnaryOp::BindingRead(kind),
                operand,
            } => self.binding_type(kind, operand),
            _ => TypeDecl::Var,
        }
    }
}
