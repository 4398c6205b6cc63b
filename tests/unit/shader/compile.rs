use super::*;
use crate::shader::symbols::Param;

fn main_fn(body: Vec<Stmt>) -> Decl {
    Decl::Function(FuncDecl {
        name: "main".to_owned(),
        return_type: Type::Void,
        params: vec![],
        body,
    })
}

fn global(name: &str, ty: Type) -> Decl {
    Decl::Variable(VarDecl::new(name, ty).with_qualifier(Qualifier::Param))
}

#[test]
fn sample_shader_compiles_and_resolves_calls() {
    let unit = Unit {
        decls: vec![
            global("img", Type::Sampler),
            global("threshold", Type::Float),
            main_fn(vec![
                Stmt::Variable(VarDecl::new("c", Type::Float4).with_init(Expr::call(
                    "sample",
                    vec![Expr::ident("img"), Expr::ident("pos0")],
                ))),
                Stmt::Assign {
                    target: "color".to_owned(),
                    value: Expr::construct(
                        Type::Float4,
                        vec![
                            Expr::call(
                                "clamp",
                                vec![
                                    Expr::field(Expr::ident("c"), "rgb"),
                                    Expr::ident("threshold"),
                                    Expr::float(1.0),
                                ],
                            ),
                            Expr::field(Expr::ident("c"), "a"),
                        ],
                    ),
                },
            ]),
        ],
    };
    let out = compile_unit(&unit).unwrap();
    let names: Vec<&str> = out.calls.iter().map(|c| c.function.name()).collect();
    assert_eq!(names, vec!["sample", "clamp"]);
    assert!(out.calls.iter().all(|c| c.caller == "main"));
    assert_eq!(
        out.calls[1].function.param_types(),
        vec![Type::Float3, Type::Float, Type::Float]
    );
    assert_eq!(out.table.num_samplers(), 1);
    assert_eq!(out.table.num_param_registers(), 1);
    assert!(out.table.get_variable("threshold").unwrap().is_referenced());
    assert!(out.table.get_variable("color").unwrap().is_referenced());
}

#[test]
fn builtins_are_invisible_outside_main() {
    let helper = Decl::Function(FuncDecl {
        name: "helper".to_owned(),
        return_type: Type::Float2,
        params: vec![],
        body: vec![Stmt::Return {
            value: Some(Expr::ident("pixcoord")),
        }],
    });
    match compile_unit(&Unit { decls: vec![helper] }) {
        Err(ShadefxError::UndeclaredVariable { name, scope }) => {
            assert_eq!(name, "pixcoord");
            assert_eq!(scope.to_string(), "scope of function `helper`");
        }
        other => panic!("expected UndeclaredVariable, got {other:?}"),
    }
}

#[test]
fn unresolved_call_reports_argument_types() {
    let unit = Unit {
        decls: vec![main_fn(vec![Stmt::Expr {
            expr: Expr::call(
                "min",
                vec![
                    Expr::float(1.0),
                    Expr::construct(Type::Float3, vec![Expr::float(0.0)]),
                ],
            ),
        }])],
    };
    match compile_unit(&unit) {
        Err(ShadefxError::UnresolvedFunction { name, args, .. }) => {
            assert_eq!(name, "min");
            assert_eq!(args, "float, float3");
        }
        other => panic!("expected UnresolvedFunction, got {other:?}"),
    }
}

#[test]
fn user_functions_resolve_by_parameter_types() {
    let unit = Unit {
        decls: vec![
            Decl::Function(FuncDecl {
                name: "luma".to_owned(),
                return_type: Type::Float,
                params: vec![Param::new("c", Type::Float3)],
                body: vec![Stmt::Return {
                    value: Some(Expr::call(
                        "dot",
                        vec![
                            Expr::ident("c"),
                            Expr::construct(
                                Type::Float3,
                                vec![
                                    Expr::float(0.2125),
                                    Expr::float(0.7154),
                                    Expr::float(0.0721),
                                ],
                            ),
                        ],
                    )),
                }],
            }),
            main_fn(vec![Stmt::Variable(
                VarDecl::new("l", Type::Float).with_init(Expr::call(
                    "luma",
                    vec![Expr::field(Expr::ident("jsl_vertexColor"), "rgb")],
                )),
            )]),
        ],
    };
    let out = compile_unit(&unit).unwrap();
    assert_eq!(out.calls.len(), 2);
    assert_eq!(out.calls[0].caller, "luma");
    assert_eq!(out.calls[1].function.name(), "luma");
    assert_eq!(out.table.user_functions().len(), 2);
}

#[test]
fn local_param_declaration_is_a_scope_error() {
    let unit = Unit {
        decls: vec![main_fn(vec![Stmt::Variable(
            VarDecl::new("p", Type::Float).with_qualifier(Qualifier::Param),
        )])],
    };
    assert!(matches!(
        compile_unit(&unit),
        Err(ShadefxError::Scope { .. })
    ));
}

#[test]
fn duplicate_global_is_reported() {
    let unit = Unit {
        decls: vec![global("a", Type::Float), global("a", Type::Float2)],
    };
    assert!(matches!(
        compile_unit(&unit),
        Err(ShadefxError::DuplicateName { .. })
    ));
}

#[test]
fn const_literal_init_is_recorded() {
    let unit = Unit {
        decls: vec![Decl::Variable(
            VarDecl::new("k", Type::Int)
                .with_qualifier(Qualifier::Const)
                .with_init(Expr::int(3)),
        )],
    };
    let out = compile_unit(&unit).unwrap();
    assert_eq!(
        out.table.get_variable("k").unwrap().const_value(),
        Some(&ConstValue::Int(3))
    );
}

#[test]
fn type_errors() {
    let cases = vec![
        Stmt::Assign {
            target: "pos0".to_owned(),
            value: Expr::construct(Type::Float2, vec![Expr::float(0.0)]),
        },
        Stmt::Assign {
            target: "color".to_owned(),
            value: Expr::float(1.0),
        },
        Stmt::Expr {
            expr: Expr::binary(BinaryOp::Add, Expr::float(1.0), Expr::int(1)),
        },
        Stmt::Expr {
            expr: Expr::binary(BinaryOp::And, Expr::bool(true), Expr::int(1)),
        },
        Stmt::Expr {
            expr: Expr::field(Expr::ident("pos0"), "xyz"),
        },
        Stmt::Expr {
            expr: Expr::construct(Type::Float4, vec![Expr::float(0.0), Expr::float(1.0)]),
        },
        Stmt::Return {
            value: Some(Expr::float(0.0)),
        },
    ];
    for stmt in cases {
        let unit = Unit {
            decls: vec![main_fn(vec![stmt.clone()])],
        };
        match compile_unit(&unit) {
            Err(ShadefxError::TypeMismatch { .. }) => {}
            other => panic!("{stmt:?}: expected TypeMismatch, got {other:?}"),
        }
    }
}

#[test]
fn vector_scalar_arithmetic_and_swizzles() {
    let unit = Unit {
        decls: vec![main_fn(vec![
            Stmt::Variable(VarDecl::new("v", Type::Float2).with_init(Expr::binary(
                BinaryOp::Mul,
                Expr::float(2.0),
                Expr::ident("pixcoord"),
            ))),
            Stmt::Variable(VarDecl::new("b", Type::Bool).with_init(Expr::binary(
                BinaryOp::Lt,
                Expr::field(Expr::ident("v"), "y"),
                Expr::float(0.5),
            ))),
            Stmt::Assign {
                target: "color".to_owned(),
                value: Expr::field(Expr::ident("jsl_vertexColor"), "abgr"),
            },
        ])],
    };
    compile_unit(&unit).unwrap();
}

#[test]
fn unit_deserializes_from_json() {
    let src = r#"{
        "decls": [
            {"kind": "variable", "name": "img", "type": "sampler", "qualifier": "param"},
            {"kind": "variable", "name": "weights", "type": "float4", "qualifier": "param", "array_size": 3},
            {"kind": "function", "name": "main", "return_type": "void", "body": [
                {"kind": "assign", "target": "color", "value":
                    {"kind": "call", "name": "sample", "args": [
                        {"kind": "ident", "name": "img"},
                        {"kind": "ident", "name": "pos0"}
                    ]}
                }
            ]}
        ]
    }"#;
    let unit = Unit::from_json(src).unwrap();
    assert_eq!(unit.decls.len(), 3);
    let out = compile_unit(&unit).unwrap();
    assert_eq!(out.table.num_param_registers(), 3);
    assert_eq!(
        out.calls[0].function.to_string(),
        "float4 sample(sampler, float2)"
    );
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Unit::from_json(r#"{"decls": [{"kind": "nope"}]}"#).unwrap_err();
    assert!(matches!(err, ShadefxError::Serde(_)));
}
