use std::collections::HashMap;

use crate::foundation::error::{ScopeKind, ShadefxError, ShadefxResult};
use crate::shader::catalogue::{CoreSymbols, find_function};
use crate::shader::symbols::{ConstValue, Function, Param, Precision, Qualifier, Variable};
use crate::shader::types::{BaseType, Type};

/// Per-unit scope manager: global scope plus at most one active function frame.
///
/// Function frames do not nest. Call [`SymbolTable::enter_frame`] before declaring a function so
/// its parameters (and, for `main`, the builtin constants) land in the new frame.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    global_vars: HashMap<String, Variable>,
    global_order: Vec<String>,
    local_vars: HashMap<String, Variable>,
    local_order: Vec<String>,
    functions: Vec<Function>,
    num_core_functions: usize,
    num_samplers: i32,
    num_params: i32,
    global: bool,
    current_function: String,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table seeded with the core catalogue.
    pub fn new() -> Self {
        let core = CoreSymbols::get();
        let functions = core.functions().to_vec();
        let output = core.output_variable().clone();
        let name = output.name().to_owned();
        let mut global_vars = HashMap::new();
        global_vars.insert(name.clone(), output);
        Self {
            global_vars,
            global_order: vec![name],
            local_vars: HashMap::new(),
            local_order: Vec::new(),
            num_core_functions: functions.len(),
            functions,
            num_samplers: 0,
            num_params: 0,
            global: true,
            current_function: String::new(),
        }
    }

    /// `true` while no function frame is active.
    pub fn in_global_scope(&self) -> bool {
        self.global
    }

    /// Scope context used in diagnostics.
    pub fn scope(&self) -> ScopeKind {
        if self.global {
            ScopeKind::Global
        } else {
            ScopeKind::Function(self.current_function.clone())
        }
    }

    /// Declare a variable in the active scope.
    ///
    /// `param`-qualified variables must be global and receive a register: samplers from the
    /// sampler counter, everything else from the generic counter advanced by `max(1, array_size)`.
    #[allow(clippy::too_many_arguments)]
    pub fn declare_variable(
        &mut self,
        name: &str,
        ty: Type,
        qualifier: Option<Qualifier>,
        precision: Option<Precision>,
        array_size: i32,
        const_value: Option<ConstValue>,
        is_param: bool,
    ) -> ShadefxResult<&Variable> {
        let scope = self.scope();
        if name.is_empty() {
            return Err(ShadefxError::validation(format!(
                "variable names must be non-empty ({scope})"
            )));
        }
        let exists = if self.global {
            self.global_vars.contains_key(name)
        } else {
            self.local_vars.contains_key(name)
        };
        if exists {
            return Err(ShadefxError::DuplicateName {
                name: name.to_owned(),
                scope,
            });
        }
        if array_size == 0 {
            return Err(ShadefxError::InvalidArraySize {
                name: name.to_owned(),
                size: array_size,
                scope,
            });
        }

        let mut reg = -1;
        if qualifier == Some(Qualifier::Param) {
            if !self.global {
                return Err(ShadefxError::Scope {
                    name: name.to_owned(),
                    scope,
                    message: "param variables must be declared at global scope".to_owned(),
                });
            }
            if ty.base_type() == BaseType::Sampler {
                reg = self.num_samplers;
                self.num_samplers += 1;
            } else {
                reg = self.num_params;
                self.num_params += array_size.max(1);
            }
        }

        let var = Variable::new(
            name,
            ty,
            qualifier,
            precision,
            reg,
            array_size,
            const_value,
            is_param,
        );
        tracing::trace!(name, %ty, reg, %scope, "declare variable");
        let (vars, order) = if self.global {
            (&mut self.global_vars, &mut self.global_order)
        } else {
            (&mut self.local_vars, &mut self.local_order)
        };
        order.push(name.to_owned());
        Ok(&*vars.entry(name.to_owned()).or_insert(var))
    }

    /// Declare a function and bind its parameters in the current frame.
    ///
    /// Fails with [`ShadefxError::Scope`] when no frame is active.
    ///
    /// A zero-parameter `main` declared into an empty frame also receives the builtin constants
    /// (`pos0`, `pos1`, `pixcoord`, `jsl_vertexColor`); no other function sees them.
    pub fn declare_function(
        &mut self,
        name: &str,
        return_type: Type,
        params: Vec<Param>,
    ) -> ShadefxResult<&Function> {
        if self.global {
            return Err(ShadefxError::Scope {
                name: name.to_owned(),
                scope: ScopeKind::Global,
                message: "enter a function frame before declaring a function".to_owned(),
            });
        }
        let func = Function::new(name, return_type, params);
        if self.functions.contains(&func) {
            return Err(ShadefxError::DuplicateFunction {
                signature: func.to_string(),
                scope: ScopeKind::Global,
            });
        }
        self.current_function = name.to_owned();

        if name == "main" && func.params().is_empty() && self.local_vars.is_empty() {
            for var in CoreSymbols::get().builtin_constants() {
                self.local_order.push(var.name().to_owned());
                self.local_vars.insert(var.name().to_owned(), var.clone());
            }
        }

        for p in func.params() {
            if self.local_vars.contains_key(&p.name) {
                return Err(ShadefxError::DuplicateName {
                    name: p.name.clone(),
                    scope: ScopeKind::Function(name.to_owned()),
                });
            }
            let var = Variable::new(p.name.clone(), p.ty, None, None, -1, -1, None, true);
            self.local_order.push(p.name.clone());
            self.local_vars.insert(p.name.clone(), var);
        }

        tracing::debug!(signature = %func, "declare function");
        self.functions.push(func);
        Ok(&self.functions[self.functions.len() - 1])
    }

    /// Enter a function frame, discarding the previous frame's locals.
    pub fn enter_frame(&mut self) -> ShadefxResult<()> {
        if !self.global {
            return Err(ShadefxError::Scope {
                name: self.current_function.clone(),
                scope: self.scope(),
                message: "function frames do not nest".to_owned(),
            });
        }
        self.global = false;
        self.current_function.clear();
        self.local_vars.clear();
        self.local_order.clear();
        Ok(())
    }

    /// Leave the active function frame.
    pub fn exit_frame(&mut self) -> ShadefxResult<()> {
        if self.global {
            return Err(ShadefxError::Scope {
                name: String::new(),
                scope: ScopeKind::Global,
                message: "no function frame to exit".to_owned(),
            });
        }
        self.global = true;
        Ok(())
    }

    /// Resolve a call site by name and positional argument types (return type ignored).
    pub fn get_function_for_signature(
        &self,
        name: &str,
        param_types: &[Type],
    ) -> Option<&Function> {
        find_function(&self.functions, name, param_types)
    }

    /// Look up a visible variable: frame locals first, then globals.
    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        if !self.global
            && let Some(v) = self.local_vars.get(name)
        {
            return Some(v);
        }
        self.global_vars.get(name)
    }

    /// Like [`SymbolTable::get_variable`], recording a use of the variable.
    pub fn reference_variable(&mut self, name: &str) -> Option<&Variable> {
        let var = if !self.global && self.local_vars.contains_key(name) {
            self.local_vars.get_mut(name)
        } else {
            self.global_vars.get_mut(name)
        }?;
        var.mark_used();
        Some(&*var)
    }

    /// Global variables in declaration order.
    pub fn global_variables(&self) -> Vec<&Variable> {
        self.global_order
            .iter()
            .filter_map(|n| self.global_vars.get(n))
            .collect()
    }

    /// Variables of the current (or most recent) frame in declaration order.
    pub fn local_variables(&self) -> Vec<&Variable> {
        self.local_order
            .iter()
            .filter_map(|n| self.local_vars.get(n))
            .collect()
    }

    /// Non-sampler `param` globals ordered by register.
    pub fn param_variables(&self) -> Vec<&Variable> {
        self.registered(|ty| ty.base_type() != BaseType::Sampler)
    }

    /// Sampler `param` globals ordered by register.
    pub fn sampler_variables(&self) -> Vec<&Variable> {
        self.registered(|ty| ty.base_type() == BaseType::Sampler)
    }

    fn registered(&self, keep: impl Fn(Type) -> bool) -> Vec<&Variable> {
        let mut out: Vec<&Variable> = self
            .global_vars
            .values()
            .filter(|v| v.qualifier() == Some(Qualifier::Param) && keep(v.ty()))
            .collect();
        out.sort_by_key(|v| v.reg());
        out
    }

    /// Number of sampler registers allocated.
    pub fn num_samplers(&self) -> i32 {
        self.num_samplers
    }

    /// Number of generic parameter register slots allocated.
    pub fn num_param_registers(&self) -> i32 {
        self.num_params
    }

    /// Every known function, core first.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Functions declared by the unit, in declaration order.
    pub fn user_functions(&self) -> &[Function] {
        &self.functions[self.num_core_functions..]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/table.rs"]
mod tests;
