//! Builtin variables and intrinsic overloads shared by every compilation unit.
//!
//! Overload families are produced by small pure combinators so one intrinsic name gets its
//! whole set of vector-width variants from a single line in [`CoreSymbols::build`].

use std::sync::OnceLock;

use crate::shader::symbols::{Function, Param, Precision, Qualifier, Variable};
use crate::shader::types::Type;

/// Names of the read-only builtins visible inside `main`.
pub const BUILTIN_CONSTANTS: [&str; 4] = ["pos0", "pos1", "pixcoord", "jsl_vertexColor"];

/// Name of the mutable shader output.
pub const OUTPUT_VARIABLE: &str = "color";

const UNARY: [&str; 12] = [
    "abs",
    "floor",
    "ceil",
    "fract",
    "sign",
    "sqrt",
    "sin",
    "cos",
    "tan",
    "normalize",
    "ddx",
    "ddy",
];

fn float_n(width: usize) -> Type {
    match width {
        1 => Type::Float,
        2 => Type::Float2,
        3 => Type::Float3,
        _ => Type::Float4,
    }
}

fn bool_n(width: usize) -> Type {
    match width {
        1 => Type::Bool,
        2 => Type::Bool2,
        3 => Type::Bool3,
        _ => Type::Bool4,
    }
}

fn func(name: &str, ret: Type, params: &[(&str, Type)]) -> Function {
    Function::new(
        name,
        ret,
        params.iter().map(|&(n, t)| Param::new(n, t)).collect(),
    )
}

/// `T -> T` for widths 1–4.
pub(crate) fn overloads_unary(name: &str) -> Vec<Function> {
    (1..=4)
        .map(|w| func(name, float_n(w), &[("x", float_n(w))]))
        .collect()
}

/// `(T, T) -> T` for widths 1–4.
pub(crate) fn overloads_binary(name: &str) -> Vec<Function> {
    (1..=4)
        .map(|w| {
            let t = float_n(w);
            func(name, t, &[("x", t), ("y", t)])
        })
        .collect()
}

/// [`overloads_binary`] plus `(T, float) -> T` for widths 2–4.
pub(crate) fn overloads_min_max(name: &str) -> Vec<Function> {
    let mut out = overloads_binary(name);
    out.extend((2..=4).map(|w| {
        let t = float_n(w);
        func(name, t, &[("x", t), ("y", Type::Float)])
    }));
    out
}

/// `(T, T, T) -> T` for widths 1–4 plus `(T, float, float) -> T` for widths 2–4.
pub(crate) fn overloads_clamp(name: &str) -> Vec<Function> {
    let mut out: Vec<Function> = (1..=4)
        .map(|w| {
            let t = float_n(w);
            func(name, t, &[("val", t), ("min", t), ("max", t)])
        })
        .collect();
    out.extend((2..=4).map(|w| {
        let t = float_n(w);
        func(
            name,
            t,
            &[("val", t), ("min", Type::Float), ("max", Type::Float)],
        )
    }));
    out
}

/// `(T, T, T) -> T` for widths 1–4 plus `(float, float, T) -> T` for widths 2–4.
pub(crate) fn overloads_smoothstep(name: &str) -> Vec<Function> {
    let mut out: Vec<Function> = (1..=4)
        .map(|w| {
            let t = float_n(w);
            func(name, t, &[("min", t), ("max", t), ("val", t)])
        })
        .collect();
    out.extend((2..=4).map(|w| {
        let t = float_n(w);
        func(
            name,
            t,
            &[("min", Type::Float), ("max", Type::Float), ("val", t)],
        )
    }));
    out
}

/// `(T, T, T) -> T` for widths 1–4 plus `(T, T, float) -> T` for widths 2–4.
pub(crate) fn overloads_mix(name: &str) -> Vec<Function> {
    let mut out: Vec<Function> = (1..=4)
        .map(|w| {
            let t = float_n(w);
            func(name, t, &[("x", t), ("y", t), ("a", t)])
        })
        .collect();
    out.extend((2..=4).map(|w| {
        let t = float_n(w);
        func(name, t, &[("x", t), ("y", t), ("a", Type::Float)])
    }));
    out
}

/// `boolN -> bool` for N = 2..4.
pub(crate) fn overloads_bool_reduce(name: &str) -> Vec<Function> {
    (2..=4)
        .map(|w| func(name, Type::Bool, &[("x", bool_n(w))]))
        .collect()
}

/// `T -> float` for widths 1–4.
pub(crate) fn overloads_float_reduce(name: &str) -> Vec<Function> {
    (1..=4)
        .map(|w| func(name, Type::Float, &[("x", float_n(w))]))
        .collect()
}

/// `(T, T) -> float` for widths 1–4.
pub(crate) fn overloads_float_reduce_binary(name: &str) -> Vec<Function> {
    (1..=4)
        .map(|w| {
            let t = float_n(w);
            func(name, Type::Float, &[("x", t), ("y", t)])
        })
        .collect()
}

/// The process-wide builtin symbol set.
#[derive(Debug)]
pub struct CoreSymbols {
    variables: Vec<Variable>,
    functions: Vec<Function>,
}

impl CoreSymbols {
    /// Shared, lazily built catalogue.
    pub fn get() -> &'static CoreSymbols {
        static CORE: OnceLock<CoreSymbols> = OnceLock::new();
        CORE.get_or_init(Self::build)
    }

    fn build() -> Self {
        let variables = vec![
            Variable::new(
                "pos0",
                Type::Float2,
                Some(Qualifier::Const),
                None,
                -1,
                -1,
                None,
                false,
            ),
            Variable::new(
                "pos1",
                Type::Float2,
                Some(Qualifier::Const),
                None,
                -1,
                -1,
                None,
                false,
            ),
            Variable::new(
                "pixcoord",
                Type::Float2,
                Some(Qualifier::Const),
                None,
                -1,
                -1,
                None,
                false,
            ),
            Variable::new(
                "jsl_vertexColor",
                Type::Float4,
                Some(Qualifier::Const),
                Some(Precision::Lowp),
                -1,
                -1,
                None,
                false,
            ),
            Variable::new(OUTPUT_VARIABLE, Type::Float4, None, None, -1, -1, None, false),
        ];

        let mut functions = vec![
            func(
                "sample",
                Type::Float4,
                &[("s", Type::Sampler), ("loc", Type::Float2)],
            ),
            func(
                "sample",
                Type::Float4,
                &[("s", Type::LSampler), ("loc", Type::Float2)],
            ),
            func(
                "sample",
                Type::Float4,
                &[("s", Type::FSampler), ("loc", Type::Float2)],
            ),
            func("intcast", Type::Int, &[("x", Type::Float)]),
        ];
        functions.extend(overloads_bool_reduce("any"));
        for name in UNARY {
            functions.extend(overloads_unary(name));
        }
        functions.extend(overloads_binary("pow"));
        for name in ["min", "max", "mod"] {
            functions.extend(overloads_min_max(name));
        }
        functions.extend(overloads_clamp("clamp"));
        functions.extend(overloads_smoothstep("smoothstep"));
        functions.extend(overloads_mix("mix"));
        functions.extend(overloads_float_reduce("length"));
        for name in ["dot", "distance"] {
            functions.extend(overloads_float_reduce_binary(name));
        }

        tracing::debug!(
            variables = variables.len(),
            functions = functions.len(),
            "core symbol catalogue built"
        );
        Self {
            variables,
            functions,
        }
    }

    /// All builtin variables: the four constants followed by the output.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// The read-only builtins injected into `main`.
    pub fn builtin_constants(&self) -> impl Iterator<Item = &Variable> {
        self.variables
            .iter()
            .filter(|v| v.qualifier() == Some(Qualifier::Const))
    }

    /// The mutable `color` output.
    pub fn output_variable(&self) -> &Variable {
        &self.variables[self.variables.len() - 1]
    }

    /// All builtin functions in declaration order.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// All overloads declared under `name`.
    pub fn overloads<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Function> + 'a {
        self.functions.iter().filter(move |f| f.name() == name)
    }

    /// First function matching `name` and positional parameter types.
    pub fn get_function(&self, name: &str, param_types: &[Type]) -> Option<&Function> {
        find_function(&self.functions, name, param_types)
    }
}

/// Linear scan shared by the catalogue and symbol tables.
pub(crate) fn find_function<'a>(
    functions: &'a [Function],
    name: &str,
    param_types: &[Type],
) -> Option<&'a Function> {
    functions.iter().find(|f| f.matches(name, param_types))
}

#[cfg(test)]
#[path = "../../tests/unit/shader/catalogue.rs"]
mod tests;
