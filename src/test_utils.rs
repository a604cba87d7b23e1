use std::sync::Arc;

use crate::diagnostics::Location;
use crate::plugins::PluginRegistry;
use crate::symbols::table::SymbolTable;
use crate::symbols::{ConSymb, FieldDecl, MapKind, MapSymb, TypeAtom};
use crate::terms::{Term, TermIndex};

/// A small program:
///
/// ```text
/// RED, GREEN, BLUE, NIL
/// Color ::= RED + GREEN + BLUE
/// IntList ::= new (head: Integer, tail: IntList + NIL)
/// Dist ::= fun (from: Geo.Point, to: Geo.Point => d: Real)
/// Geo.Point ::= new (x: Real, y: Real)
/// Geo.Triple ::= new (Integer, String, Color)
/// ```
pub fn sample_symbol_table() -> SymbolTable {
    let mut table = SymbolTable::new("sample", Arc::new(PluginRegistry::empty()));
    let mut flags = Vec::new();
    let root = table.root();
    let loc = Location::default();

    for c in ["RED", "GREEN", "BLUE", "NIL"].iter() {
        table.declare_constant(root, c, loc, &mut flags).unwrap();
    }
    table
        .declare_union(
            root,
            "Color",
            vec![
                TypeAtom::name("RED"),
                TypeAtom::name("GREEN"),
                TypeAtom::name("BLUE"),
            ],
            loc,
            &mut flags,
        )
        .unwrap();
    table
        .declare_constructor(
            root,
            ConSymb::new(
                "IntList",
                vec![
                    FieldDecl::labeled("head", vec![TypeAtom::name("Integer")]),
                    FieldDecl::labeled(
                        "tail",
                        vec![TypeAtom::name("IntList"), TypeAtom::name("NIL")],
                    ),
                ],
                true,
            ),
            None,
            loc,
            &mut flags,
        )
        .unwrap();

    let geo = table.add_namespace(root, "Geo", loc, &mut flags).unwrap();
    table
        .declare_constructor(
            geo,
            ConSymb::new(
                "Point",
                vec![
                    FieldDecl::labeled("x", vec![TypeAtom::name("Real")]),
                    FieldDecl::labeled("y", vec![TypeAtom::name("Real")]),
                ],
                true,
            ),
            None,
            loc,
            &mut flags,
        )
        .unwrap();
    table
        .declare_constructor(
            geo,
            ConSymb::new(
                "Triple",
                vec![
                    FieldDecl::new(vec![TypeAtom::name("Integer")]),
                    FieldDecl::new(vec![TypeAtom::name("String")]),
                    FieldDecl::new(vec![TypeAtom::name("Color")]),
                ],
                true,
            ),
            None,
            loc,
            &mut flags,
        )
        .unwrap();

    table
        .declare_map(
            root,
            MapSymb::new(
                "Dist",
                vec![
                    FieldDecl::labeled("from", vec![TypeAtom::name("Geo.Point")]),
                    FieldDecl::labeled("to", vec![TypeAtom::name("Geo.Point")]),
                    FieldDecl::labeled("d", vec![TypeAtom::name("Real")]),
                ],
                2,
                MapKind::Fun,
                false,
            ),
            None,
            loc,
            &mut flags,
        )
        .unwrap();

    assert!(flags.is_empty(), "{:?}", flags);
    table
}

/// The term index of [sample_symbol_table].
pub fn sample_index() -> TermIndex {
    let mut flags = Vec::new();
    let index = TermIndex::new(sample_symbol_table(), &mut flags).unwrap();
    assert!(flags.is_empty(), "{:?}", flags);
    index
}

/// A user constant by name.
pub fn constant(index: &TermIndex, name: &str) -> Term {
    let sym = index.symbols().resolve(name).unwrap();
    index.mk_apply(&sym, &[]).0
}

/// An application of a constructor or map by name.
pub fn apply(index: &TermIndex, name: &str, args: &[Term]) -> Term {
    let sym = index.symbols().resolve(name).unwrap();
    index.mk_apply(&sym, args).0
}

/// The type constant `#name`.
pub fn type_cnst(index: &TermIndex, name: &str) -> Term {
    constant(index, &format!("#{}", name))
}

/// The `IntList` holding `values`, terminated by `NIL`.
pub fn int_list(index: &TermIndex, values: &[i64]) -> Term {
    values
        .iter()
        .rev()
        .fold(constant(index, "NIL"), |tail, v| {
            apply(index, "IntList", &[index.mk_int(*v), tail])
        })
}
