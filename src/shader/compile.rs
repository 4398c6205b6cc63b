use crate::foundation::error::{ShadefxError, ShadefxResult};
use crate::shader::ast::{BinaryOp, Decl, Expr, FuncDecl, Literal, Stmt, Unit, VarDecl};
use crate::shader::symbols::{ConstValue, Function, Qualifier};
use crate::shader::table::SymbolTable;
use crate::shader::types::{BaseType, Type, join_types};

/// A call site bound to a concrete overload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    /// Function whose body contains the call (empty for global initializers).
    pub caller: String,
    /// Selected overload.
    pub function: Function,
}

/// Output of [`compile_unit`].
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    /// Symbol table after every declaration in the unit.
    pub table: SymbolTable,
    /// Call sites in source order.
    pub calls: Vec<ResolvedCall>,
}

/// Walk a parsed unit in source order, building its symbol table and resolving every call.
///
/// The first static error aborts the unit.
#[tracing::instrument(skip(unit), fields(decls = unit.decls.len()))]
pub fn compile_unit(unit: &Unit) -> ShadefxResult<CompiledUnit> {
    let mut cx = UnitCompiler {
        table: SymbolTable::new(),
        calls: Vec::new(),
        caller: String::new(),
        return_type: Type::Void,
    };
    for decl in &unit.decls {
        match decl {
            Decl::Variable(v) => cx.variable(v)?,
            Decl::Function(f) => cx.function(f)?,
        }
    }
    tracing::debug!(
        functions = cx.table.user_functions().len(),
        calls = cx.calls.len(),
        "unit compiled"
    );
    Ok(CompiledUnit {
        table: cx.table,
        calls: cx.calls,
    })
}

struct UnitCompiler {
    table: SymbolTable,
    calls: Vec<ResolvedCall>,
    caller: String,
    return_type: Type,
}

impl UnitCompiler {
    fn mismatch(&self, message: impl Into<String>) -> ShadefxError {
        ShadefxError::TypeMismatch {
            message: message.into(),
            scope: self.table.scope(),
        }
    }

    fn variable(&mut self, v: &VarDecl) -> ShadefxResult<()> {
        let mut const_value = None;
        if let Some(init) = &v.init {
            let ty = self.type_of(init)?;
            if ty != v.ty {
                return Err(self.mismatch(format!(
                    "cannot initialize `{}` of type {} with {}",
                    v.name, v.ty, ty
                )));
            }
            if v.qualifier == Some(Qualifier::Const)
                && let Expr::Literal { value } = init
            {
                const_value = Some(match *value {
                    Literal::Float(f) => ConstValue::Float(f),
                    Literal::Int(i) => ConstValue::Int(i),
                    Literal::Bool(b) => ConstValue::Bool(b),
                });
            }
        }
        self.table.declare_variable(
            &v.name,
            v.ty,
            v.qualifier,
            v.precision,
            v.array_size,
            const_value,
            false,
        )?;
        Ok(())
    }

    fn function(&mut self, f: &FuncDecl) -> ShadefxResult<()> {
        self.table.enter_frame()?;
        self.table
            .declare_function(&f.name, f.return_type, f.params.clone())?;
        self.caller = f.name.clone();
        self.return_type = f.return_type;
        for stmt in &f.body {
            self.stmt(stmt)?;
        }
        self.caller.clear();
        self.return_type = Type::Void;
        self.table.exit_frame()
    }

    fn stmt(&mut self, stmt: &Stmt) -> ShadefxResult<()> {
        match stmt {
            Stmt::Variable(v) => self.variable(v),
            Stmt::Assign { target, value } => {
                let ty = self.type_of(value)?;
                let scope = self.table.scope();
                let Some(var) = self.table.reference_variable(target) else {
                    return Err(ShadefxError::UndeclaredVariable {
                        name: target.clone(),
                        scope,
                    });
                };
                let (var_ty, qualifier) = (var.ty(), var.qualifier());
                if qualifier.is_some() {
                    return Err(self.mismatch(format!("cannot assign to read-only `{target}`")));
                }
                if var_ty != ty {
                    return Err(self.mismatch(format!(
                        "cannot assign {ty} to `{target}` of type {var_ty}"
                    )));
                }
                Ok(())
            }
            Stmt::Expr { expr } => self.type_of(expr).map(|_| ()),
            Stmt::Return { value } => {
                let ty = match value {
                    Some(e) => self.type_of(e)?,
                    None => Type::Void,
                };
                if ty != self.return_type {
                    return Err(self.mismatch(format!(
                        "`{}` returns {} but the statement returns {}",
                        self.caller, self.return_type, ty
                    )));
                }
                Ok(())
            }
        }
    }

    fn type_of(&mut self, expr: &Expr) -> ShadefxResult<Type> {
        match expr {
            Expr::Literal { value } => Ok(match value {
                Literal::Float(_) => Type::Float,
                Literal::Int(_) => Type::Int,
                Literal::Bool(_) => Type::Bool,
            }),
            Expr::Ident { name } => {
                let scope = self.table.scope();
                self.table
                    .reference_variable(name)
                    .map(|v| v.ty())
                    .ok_or_else(|| ShadefxError::UndeclaredVariable {
                        name: name.clone(),
                        scope,
                    })
            }
            Expr::Call { name, args } => {
                let arg_types = args
                    .iter()
                    .map(|a| self.type_of(a))
                    .collect::<ShadefxResult<Vec<_>>>()?;
                let Some(func) = self.table.get_function_for_signature(name, &arg_types) else {
                    return Err(ShadefxError::UnresolvedFunction {
                        name: name.clone(),
                        args: join_types(&arg_types),
                        scope: self.table.scope(),
                    });
                };
                let func = func.clone();
                let ret = func.return_type();
                self.calls.push(ResolvedCall {
                    caller: self.caller.clone(),
                    function: func,
                });
                Ok(ret)
            }
            Expr::Construct { ty, args } => self.construct(*ty, args),
            Expr::Binary { op, lhs, rhs } => {
                let l = self.type_of(lhs)?;
                let r = self.type_of(rhs)?;
                self.binary(*op, l, r)
            }
            Expr::Field { base, selector } => {
                let ty = self.type_of(base)?;
                self.swizzle(ty, selector)
            }
        }
    }

    fn construct(&mut self, ty: Type, args: &[Expr]) -> ShadefxResult<Type> {
        if matches!(ty.base_type(), BaseType::Void | BaseType::Sampler) {
            return Err(self.mismatch(format!("{ty} cannot be constructed")));
        }
        let arg_types = args
            .iter()
            .map(|a| self.type_of(a))
            .collect::<ShadefxResult<Vec<_>>>()?;
        if arg_types
            .iter()
            .any(|t| matches!(t.base_type(), BaseType::Void | BaseType::Sampler))
        {
            return Err(self.mismatch(format!(
                "invalid arguments to {ty}({})",
                join_types(&arg_types)
            )));
        }
        let lanes: usize = arg_types.iter().map(|t| t.field_count()).sum();
        let broadcast = arg_types.len() == 1 && !arg_types[0].is_vector();
        if broadcast || lanes == ty.field_count() {
            Ok(ty)
        } else {
            Err(self.mismatch(format!(
                "{ty} needs {} components, got {lanes}",
                ty.field_count()
            )))
        }
    }

    fn binary(&self, op: BinaryOp, l: Type, r: Type) -> ShadefxResult<Type> {
        let numeric = |t: Type| matches!(t.base_type(), BaseType::Float | BaseType::Int);
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                if !numeric(l) || !numeric(r) || l.base_type() != r.base_type() {
                    return Err(self.mismatch(format!("arithmetic on {l} and {r}")));
                }
                if l == r || !r.is_vector() {
                    Ok(l)
                } else if !l.is_vector() {
                    Ok(r)
                } else {
                    Err(self.mismatch(format!("arithmetic on {l} and {r}")))
                }
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                if l == r && numeric(l) && !l.is_vector() {
                    Ok(Type::Bool)
                } else {
                    Err(self.mismatch(format!("comparison of {l} and {r}")))
                }
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                if l == r && l != Type::Void {
                    Ok(Type::Bool)
                } else {
                    Err(self.mismatch(format!("equality of {l} and {r}")))
                }
            }
            BinaryOp::And | BinaryOp::Or => {
                if l == Type::Bool && r == Type::Bool {
                    Ok(Type::Bool)
                } else {
                    Err(self.mismatch(format!("logical operator on {l} and {r}")))
                }
            }
        }
    }

    fn swizzle(&self, ty: Type, selector: &str) -> ShadefxResult<Type> {
        const SETS: [&str; 2] = ["xyzw", "rgba"];
        let base = ty.base_type();
        if matches!(base, BaseType::Void | BaseType::Sampler) || selector.is_empty() {
            return Err(self.mismatch(format!("cannot select `.{selector}` from {ty}")));
        }
        let valid = SETS.iter().any(|set| {
            selector.chars().all(|c| {
                set.find(c)
                    .map(|i| i < ty.field_count())
                    .unwrap_or(false)
            })
        });
        let out = if valid {
            Type::vector(base, selector.len())
        } else {
            None
        };
        out.ok_or_else(|| self.mismatch(format!("cannot select `.{selector}` from {ty}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/compile.rs"]
mod tests;
