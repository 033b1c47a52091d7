//! Property-based tests for the DDS grammar and array reshaping.
//!
//! proptest generates nested declarations and arbitrary shapes, and
//! shrinks failures down to a minimal schema or shape.

use dap2::parser::parse_dds;
use dap2::{Scalar, Value};
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    }
}

// =============================================================================
// Declaration generator
// =============================================================================

const BASE_TYPES: &[&str] = &[
    "Byte", "Int16", "UInt16", "Int32", "UInt32", "Float32", "Float64", "String", "Url",
];

#[derive(Debug, Clone)]
enum Decl {
    /// Base type with either all-named or all-anonymous dimensions.
    Base(&'static str, bool, Vec<usize>),
    /// Grid array type and the size of each mapped dimension.
    Grid(&'static str, Vec<usize>),
    Structure(Vec<Decl>),
    Sequence(Vec<Decl>),
}

fn base_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(BASE_TYPES)
}

fn decl() -> impl Strategy<Value = Decl> {
    let leaf = prop_oneof![
        (base_type(), any::<bool>(), prop::collection::vec(1usize..6, 0..3))
            .prop_map(|(kind, named, dims)| Decl::Base(kind, named, dims)),
        (base_type(), prop::collection::vec(1usize..6, 1..3))
            .prop_map(|(kind, dims)| Decl::Grid(kind, dims)),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Decl::Structure),
            prop::collection::vec(inner, 0..4).prop_map(Decl::Sequence),
        ]
    })
}

fn write_decl(decl: &Decl, name: &str, out: &mut String) {
    match decl {
        Decl::Base(kind, named, dims) => {
            out.push_str(&format!("{} {}", kind, name));
            for (i, size) in dims.iter().enumerate() {
                if *named {
                    out.push_str(&format!("[dim{} = {}]", i, size));
                } else {
                    out.push_str(&format!("[{}]", size));
                }
            }
            out.push_str(";\n");
        },
        Decl::Grid(kind, dims) => {
            out.push_str("Grid {\n  Array:\n");
            out.push_str(&format!("    {} {}", kind, name));
            for (i, size) in dims.iter().enumerate() {
                out.push_str(&format!("[axis{} = {}]", i, size));
            }
            out.push_str(";\n  Maps:\n");
            for (i, size) in dims.iter().enumerate() {
                out.push_str(&format!("    Float64 axis{}[axis{} = {}];\n", i, i, size));
            }
            out.push_str(&format!("}} {};\n", name));
        },
        Decl::Structure(children) | Decl::Sequence(children) => {
            let keyword = if matches!(decl, Decl::Structure(_)) {
                "Structure"
            } else {
                "Sequence"
            };
            out.push_str(&format!("{} {{\n", keyword));
            for (i, child) in children.iter().enumerate() {
                write_decl(child, &format!("{}_{}", name, i), out);
            }
            out.push_str(&format!("}} {};\n", name));
        },
    }
}

fn dds_text(decls: &[Decl]) -> String {
    let mut out = String::from("Dataset {\n");
    for (i, decl) in decls.iter().enumerate() {
        write_decl(decl, &format!("v{}", i), &mut out);
    }
    out.push_str("} generated;\n");
    out
}

fn ints(n: usize) -> Vec<Scalar> {
    (0..n as i32).map(Scalar::Int32).collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(config())]

    #[test]
    fn dds_reserialization_keeps_structure(decls in prop::collection::vec(decl(), 0..5)) {
        let original = parse_dds(&dds_text(&decls)).unwrap();
        let reparsed = parse_dds(&original.to_dds()).unwrap();
        prop_assert_eq!(reparsed.variable_count(), original.variable_count());
        prop_assert_eq!(reparsed.depth(), original.depth());
        prop_assert_eq!(reparsed, original);
    }

    #[test]
    fn reshape_then_flatten_is_identity(shape in prop::collection::vec(0usize..5, 0..4)) {
        let flat = ints(shape.iter().product());
        let value = Value::reshape(flat.clone(), &shape);
        prop_assert_eq!(value.flatten(), flat);
    }

    #[test]
    fn reshape_keeps_nonempty_shape(shape in prop::collection::vec(1usize..5, 1..4)) {
        let value = Value::reshape(ints(shape.iter().product()), &shape);
        prop_assert_eq!(value.array_shape(), shape);
    }
}
