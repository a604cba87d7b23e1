use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use once_cell::sync::OnceCell;
use rustc_hash::FxHasher;

use crate::diagnostics::{messages, ErrorCode, Flag, Location};
use crate::operators::{OpCode, OpKind, OperatorRef};
use crate::symbols::namespace::NamespaceId;
use crate::symbols::names::TypeCnstName;
use crate::symbols::table::{SymbolTable, BOOLEAN_NAME, FALSE_NAME, TRUE_NAME};
use crate::symbols::{
    fmt_rational, BaseCnstSymb, BaseSortKind, Cnst, Symbol, SymbolKey, TypeAtom, UserCnstKind,
};

use self::type_set::TypeSet;

/// The total order on terms and the min/max comparison of types.
pub mod order;

/// The lattice of base sorts.
pub mod sorts;

/// Canonical union types and widening.
pub mod type_set;

type FxDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Whether a term denotes a value, contains a logic variable, or denotes a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Groundness {
    /// A single concrete value.
    Ground,
    /// Contains a logic variable.
    Variable,
    /// A type.
    Type,
}

/// An interned term node.
pub struct TermNode {
    uid: u64,
    symbol: Symbol,
    args: Box<[Term]>,
    groundness: Groundness,
    symbolic: bool,
}

/// A hash-consed term. Equal terms are the same allocation, so equality is pointer equality.
#[derive(Clone)]
pub struct Term(Arc<TermNode>);

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.uid.hash(state)
    }
}

impl Term {
    /// The head symbol.
    pub fn symbol(&self) -> &Symbol {
        &self.0.symbol
    }

    /// The children.
    pub fn args(&self) -> &[Term] {
        &self.0.args
    }

    /// The interning order of the term, unique per index.
    pub fn uid(&self) -> u64 {
        self.0.uid
    }

    /// Ground, variable or type.
    pub fn groundness(&self) -> Groundness {
        self.0.groundness
    }

    /// True for terms denoting a single value.
    pub fn is_ground(&self) -> bool {
        self.0.groundness == Groundness::Ground
    }

    /// True for terms denoting a set of values.
    pub fn is_type(&self) -> bool {
        self.0.groundness == Groundness::Type
    }

    /// True if the term contains a symbolic constant or an uninterpreted operator application.
    pub fn is_symbolic_term(&self) -> bool {
        self.0.symbolic
    }

    /// The value of a constant term.
    pub fn as_cnst(&self) -> Option<&Cnst> {
        self.symbol().as_cnst()
    }

    /// The value of a numeric constant term.
    pub fn as_rational(&self) -> Option<&BigRational> {
        self.as_cnst().and_then(Cnst::as_rational)
    }

    /// The value of a string constant term.
    pub fn as_str(&self) -> Option<&str> {
        self.as_cnst().and_then(Cnst::as_str)
    }

    /// The id of the sort this term is, for user sort terms.
    pub fn user_sort_id(&self) -> Option<usize> {
        match self.symbol() {
            Symbol::UserSort(s) => s.info().get_registration().map(|r| r.id),
            _ => None,
        }
    }

    /// The id of the derived sort of the head constructor or map.
    pub fn data_sort_id(&self) -> Option<usize> {
        self.symbol()
            .data_decl()?
            .get_sort()?
            .info()
            .get_registration()
            .map(|r| r.id)
    }

    fn is_op(&self, kind: OpKind) -> bool {
        self.symbol().as_op() == Some(OpCode::Builtin(kind))
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Symbol::BaseCnst(c) => match c.get_value() {
                Cnst::Numeric(r) => fmt_rational(r, f),
                Cnst::String(s) => write!(f, "{:?}", s),
            },
            Symbol::BaseOp(_) if self.is_op(OpKind::TypeUnn) => {
                write!(f, "{} + {}", self.args()[0], self.args()[1])
            }
            Symbol::BaseOp(_) if self.is_op(OpKind::Range) => {
                write!(f, "{}..{}", self.args()[0], self.args()[1])
            }
            sym => {
                f.write_str(&sym.full_name())?;
                if !self.args().is_empty() {
                    f.write_str("(")?;
                    for (i, a) in self.args().iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct TermKey {
    symbol: SymbolKey,
    args: Box<[u64]>,
}

fn derive_groundness(symbol: &Symbol, args: &[Term]) -> Groundness {
    let intrinsic = match symbol {
        Symbol::BaseSort(_) | Symbol::UserSort(_) | Symbol::Unn(_) => Some(Groundness::Type),
        Symbol::BaseOp(op) if op.code.is_type_constructor() => Some(Groundness::Type),
        Symbol::UserCnst(c) if c.get_kind() == UserCnstKind::Variable => {
            Some(Groundness::Variable)
        }
        _ => None,
    };
    intrinsic.unwrap_or_else(|| {
        if args.iter().any(Term::is_type) {
            Groundness::Type
        } else if args.iter().any(|a| a.groundness() == Groundness::Variable) {
            Groundness::Variable
        } else {
            Groundness::Ground
        }
    })
}

fn derive_symbolic(symbol: &Symbol, args: &[Term]) -> bool {
    let intrinsic = match symbol {
        Symbol::UserCnst(c) => c.get_kind() == UserCnstKind::Symbolic,
        Symbol::BaseOp(op) => !op.code.is_type_constructor(),
        _ => false,
    };
    intrinsic || args.iter().any(Term::is_symbolic_term)
}

/// The hash-consing authority. Interns terms, provides the canonical singletons and implements the
/// operations of the type lattice.
///
/// Interning is safe from many threads at once.
pub struct TermIndex {
    symbols: SymbolTable,
    terms: FxDashMap<TermKey, Term>,
    cnsts: FxDashMap<Cnst, Arc<BaseCnstSymb>>,
    next_uid: AtomicU64,
    ids: Arc<AtomicUsize>,
    true_value: Term,
    false_value: Term,
    zero_value: Term,
    empty_string_value: Term,
    any_type: OnceCell<Term>,
    boolean_type: OnceCell<Term>,
    labels: BTreeMap<String, Vec<Symbol>>,
}

impl TermIndex {
    /// Builds the index for a finished symbol table, resolving the canonical forms of unions and the
    /// argument types of constructors and maps. Undefined names are reported and yield `None`.
    pub fn new(symbols: SymbolTable, flags: &mut Vec<Flag>) -> Option<TermIndex> {
        let ids = symbols.id_counter();
        let mut index = TermIndex {
            terms: FxDashMap::default(),
            cnsts: FxDashMap::default(),
            next_uid: AtomicU64::new(0),
            ids,
            true_value: Self::placeholder_cnst(),
            false_value: Self::placeholder_cnst(),
            zero_value: Self::placeholder_cnst(),
            empty_string_value: Self::placeholder_cnst(),
            any_type: OnceCell::new(),
            boolean_type: OnceCell::new(),
            labels: BTreeMap::new(),
            symbols,
        };

        index.true_value = index.mk_root_cnst(TRUE_NAME);
        index.false_value = index.mk_root_cnst(FALSE_NAME);
        index.zero_value = index.mk_int(0);
        index.empty_string_value = index.mk_string("");

        if !index.resolve_declarations(flags) {
            return None;
        }
        index.labels = index.build_label_index();
        Some(index)
    }

    fn placeholder_cnst() -> Term {
        Term(Arc::new(TermNode {
            uid: u64::MAX,
            symbol: Symbol::BaseCnst(Arc::new(BaseCnstSymb::new(usize::MAX, Cnst::int(0)))),
            args: Box::new([]),
            groundness: Groundness::Ground,
            symbolic: false,
        }))
    }

    fn mk_root_cnst(&self, name: &str) -> Term {
        let sym = self
            .symbols
            .resolve(name)
            .unwrap_or_else(|| panic!("{} is declared by every symbol table", name));
        self.mk_apply(&sym, &[]).0
    }

    /// The symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Mutable access to the symbol table for minting fresh constants.
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Interns a constant. The flag is true if the term did not exist before.
    pub fn mk_cnst(&self, value: Cnst) -> (Term, bool) {
        let symbol = match self.cnsts.entry(value) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(v) => {
                let id = self.ids.fetch_add(1, Ordering::SeqCst);
                let sym = Arc::new(BaseCnstSymb::new(id, v.key().clone()));
                v.insert(sym.clone());
                sym
            }
        };
        self.mk_apply(&Symbol::BaseCnst(symbol), &[])
    }

    /// Interns an application. The number of arguments must match the arity of the symbol.
    pub fn mk_apply(&self, symbol: &Symbol, args: &[Term]) -> (Term, bool) {
        assert_eq!(
            symbol.arity(),
            args.len(),
            "{} applied to the wrong number of arguments",
            symbol
        );
        let key = TermKey {
            symbol: symbol.key(),
            args: args.iter().map(Term::uid).collect(),
        };
        match self.terms.entry(key) {
            Entry::Occupied(e) => (e.get().clone(), false),
            Entry::Vacant(v) => {
                let t = Term(Arc::new(TermNode {
                    uid: self.next_uid.fetch_add(1, Ordering::SeqCst),
                    symbol: symbol.clone(),
                    args: args.to_vec().into_boxed_slice(),
                    groundness: derive_groundness(symbol, args),
                    symbolic: derive_symbolic(symbol, args),
                }));
                v.insert(t.clone());
                (t, true)
            }
        }
    }

    /// The number of interned terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if nothing was interned.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Interns a rational.
    pub fn mk_numeric(&self, r: BigRational) -> Term {
        self.mk_cnst(Cnst::Numeric(r)).0
    }

    /// Interns an integer.
    pub fn mk_int<T: Into<BigInt>>(&self, v: T) -> Term {
        self.mk_numeric(BigRational::from_integer(v.into()))
    }

    /// Interns a string.
    pub fn mk_string(&self, s: &str) -> Term {
        self.mk_cnst(Cnst::String(s.to_owned())).0
    }

    /// `TRUE` or `FALSE`.
    pub fn mk_bool(&self, b: bool) -> Term {
        if b {
            self.true_value.clone()
        } else {
            self.false_value.clone()
        }
    }

    /// The derived constant `TRUE`.
    pub fn true_value(&self) -> &Term {
        &self.true_value
    }

    /// The derived constant `FALSE`.
    pub fn false_value(&self) -> &Term {
        &self.false_value
    }

    /// The number zero.
    pub fn zero_value(&self) -> &Term {
        &self.zero_value
    }

    /// The empty string.
    pub fn empty_string_value(&self) -> &Term {
        &self.empty_string_value
    }

    /// The type of every value: all numbers, all strings, every user sort and every declared constant.
    pub fn canonical_any_type(&self) -> &Term {
        self.any_type
            .get()
            .expect("the any type is resolved when the index is built")
    }

    /// The type `TRUE + FALSE`.
    pub fn canonical_boolean_type(&self) -> &Term {
        self.boolean_type
            .get()
            .expect("the boolean type is resolved when the index is built")
    }

    /// The operator symbol building union types.
    pub fn type_union_symbol(&self) -> &Symbol {
        self.op_symbol(OpKind::TypeUnn)
    }

    /// The operator symbol building integer ranges.
    pub fn range_symbol(&self) -> &Symbol {
        self.op_symbol(OpKind::Range)
    }

    /// The symbol of a built-in operator.
    pub fn op_symbol(&self, kind: OpKind) -> &Symbol {
        self.symbols
            .get_op_symbol(OpCode::Builtin(kind))
            .unwrap_or_else(|| panic!("built-in operator {:?} has a symbol", kind))
    }

    /// The operator behind an operator code.
    pub fn get_operator(&self, code: OpCode) -> Option<OperatorRef> {
        match code {
            OpCode::Builtin(k) => Some(OperatorRef::Builtin(k)),
            OpCode::Plugin(id) => self
                .symbols
                .get_plugins()
                .get(id)
                .map(OperatorRef::Plugin),
        }
    }

    /// The term of a base sort.
    pub fn mk_sort(&self, kind: BaseSortKind) -> Term {
        self.mk_apply(self.symbols.get_sort_symbol(kind), &[]).0
    }

    /// The type term of the integers from `lo` to `hi`, a constant if they coincide.
    pub fn mk_range(&self, lo: BigInt, hi: BigInt) -> Term {
        if lo == hi {
            return self.mk_int(lo);
        }
        let args = [self.mk_int(lo), self.mk_int(hi)];
        self.mk_apply(self.range_symbol(), &args).0
    }

    /// Folds `combine` over the components of a type, descending with an explicit worklist into every
    /// component for which `expand` yields children.
    pub fn fold_components<A>(
        &self,
        t: &Term,
        init: A,
        mut expand: impl FnMut(&Term) -> Option<Vec<Term>>,
        mut combine: impl FnMut(A, &Term) -> A,
    ) -> A {
        let mut acc = init;
        let mut pending = vec![t.clone()];
        while let Some(next) = pending.pop() {
            match expand(&next) {
                Some(children) => pending.extend(children.into_iter().rev()),
                None => acc = combine(acc, &next),
            }
        }
        acc
    }

    /// The direct components of a union term, `None` for anything else.
    fn union_children(&self, t: &Term) -> Option<Vec<Term>> {
        match t.symbol() {
            Symbol::BaseOp(_) if t.is_op(OpKind::TypeUnn) => Some(t.args().to_vec()),
            Symbol::Unn(u) => Some(u.get_canonical().cloned().into_iter().collect()),
            _ => None,
        }
    }

    /// Decomposes a type term into its canonical set.
    pub fn type_set(&self, t: &Term) -> TypeSet {
        self.fold_components(
            t,
            TypeSet::new(),
            |c| self.union_children(c),
            |mut res, c| {
                res.union_with(&self.component_set(c));
                res
            },
        )
    }

    fn component_set(&self, t: &Term) -> TypeSet {
        match t.symbol() {
            Symbol::BaseCnst(c) => match c.get_value() {
                Cnst::Numeric(r) => TypeSet::of_rational(r.clone()),
                Cnst::String(s) => TypeSet::of_string(s),
            },
            Symbol::BaseSort(s) => TypeSet::of_sort(s.kind),
            Symbol::BaseOp(_) if t.is_op(OpKind::Range) => {
                match (t.args()[0].as_rational(), t.args()[1].as_rational()) {
                    (Some(lo), Some(hi)) => {
                        TypeSet::of_range(lo.ceil().to_integer(), hi.floor().to_integer())
                    }
                    _ => TypeSet::new(),
                }
            }
            _ => {
                let mut res = TypeSet::new();
                res.add_data(t.clone());
                res
            }
        }
    }

    /// Builds the canonical term of a type: a right nested union of base sorts, ranges, constants and
    /// data members. `None` for the empty type.
    pub fn mk_type(&self, set: &TypeSet) -> Option<Term> {
        let mut components = Vec::new();
        components.extend(
            set.get_sorts()
                .iter()
                .filter(|s| s.is_numeric())
                .map(|s| self.mk_sort(*s)),
        );
        components.extend(
            set.get_ranges()
                .iter()
                .map(|r| self.mk_range(r.lo.clone(), r.hi.clone())),
        );
        components.extend(set.get_fractions().iter().map(|f| self.mk_numeric(f.clone())));
        if set.get_sorts().contains(&BaseSortKind::String) {
            components.push(self.mk_sort(BaseSortKind::String));
        }
        components.extend(set.get_strings().iter().map(|s| self.mk_string(s)));
        components.extend(set.get_data().iter().cloned());

        let mut rev = components.into_iter().rev();
        let last = rev.next()?;
        let union = self.type_union_symbol().clone();
        Some(rev.fold(last, |acc, c| self.mk_apply(&union, &[c, acc]).0))
    }

    /// The union of two types.
    pub fn mk_union(&self, a: &Term, b: &Term) -> Term {
        let set = self.type_set(a).union(&self.type_set(b));
        self.mk_type(&set)
            .unwrap_or_else(|| panic!("the union of {} and {} is inhabited", a, b))
    }

    /// The intersection of two types, `None` if it is empty.
    pub fn mk_intersection(&self, a: &Term, b: &Term) -> Option<Term> {
        self.mk_type(&self.intersect_sets(&self.type_set(a), &self.type_set(b)))
    }

    /// Intersects canonical sets, including their data members.
    pub fn intersect_sets(&self, a: &TypeSet, b: &TypeSet) -> TypeSet {
        let mut res = a.intersect_basic(b);
        let mut data = Vec::new();
        for x in a.get_data().iter() {
            for y in b.get_data().iter() {
                data.extend(self.intersect_data(x, y));
            }
        }
        res.set_data(data);
        res
    }

    fn intersect_data(&self, x: &Term, y: &Term) -> Option<Term> {
        if x == y {
            return Some(x.clone());
        }
        if let Some(s) = x.user_sort_id() {
            return if y.data_sort_id() == Some(s) {
                Some(y.clone())
            } else {
                None
            };
        }
        if let Some(s) = y.user_sort_id() {
            return if x.data_sort_id() == Some(s) {
                Some(x.clone())
            } else {
                None
            };
        }
        if x.symbol().data_decl().is_none() || x.symbol() != y.symbol() {
            return None;
        }
        let args = x
            .args()
            .iter()
            .zip(y.args().iter())
            .map(|(a, b)| self.mk_intersection(a, b))
            .collect::<Option<Vec<_>>>()?;
        Some(self.mk_apply(x.symbol(), &args).0)
    }

    /// Checks that a value is a member of a type.
    pub fn is_member(&self, value: &Term, ty: &Term) -> bool {
        self.set_contains(&self.type_set(ty), value)
    }

    /// Checks that a value is a member of a canonical set.
    pub fn set_contains(&self, set: &TypeSet, value: &Term) -> bool {
        if let Some(r) = value.as_rational() {
            return set.contains_rational(r);
        }
        if let Some(s) = value.as_str() {
            return set.contains_string(s);
        }
        set.get_data().iter().any(|d| self.data_contains(d, value))
    }

    fn data_contains(&self, d: &Term, v: &Term) -> bool {
        if d == v {
            return true;
        }
        if let Some(s) = d.user_sort_id() {
            return v.data_sort_id() == Some(s);
        }
        d.symbol().data_decl().is_some()
            && d.symbol() == v.symbol()
            && d.args()
                .iter()
                .zip(v.args().iter())
                .all(|(dt, va)| self.is_member(va, dt))
    }

    /// Checks that every member of `a` is a member of `b`.
    pub fn is_subset(&self, a: &Term, b: &Term) -> bool {
        let (sa, sb) = (self.type_set(a), self.type_set(b));
        sa.is_basic_subset(&sb)
            && sa
                .get_data()
                .iter()
                .all(|d| sb.get_data().iter().any(|e| self.data_subset(d, e)))
    }

    fn data_subset(&self, d: &Term, e: &Term) -> bool {
        if d == e {
            return true;
        }
        if let Some(s) = e.user_sort_id() {
            return d.user_sort_id() == Some(s) || d.data_sort_id() == Some(s);
        }
        e.symbol().data_decl().is_some()
            && d.symbol() == e.symbol()
            && d.args()
                .iter()
                .zip(e.args().iter())
                .all(|(x, y)| self.is_subset(x, y))
    }

    /// Replaces every constructor or map application in a type by the derived sort of its head.
    pub fn mk_data_widened_type(&self, t: &Term) -> Term {
        let mut set = self.type_set(t);
        let data = set
            .get_data()
            .iter()
            .map(|d| match d.symbol().data_decl().and_then(|dd| dd.get_sort()) {
                Some(sort) => self.mk_apply(&Symbol::UserSort(sort.clone()), &[]).0,
                None => d.clone(),
            })
            .collect();
        set.set_data(data);
        self.mk_type(&set).unwrap_or_else(|| t.clone())
    }

    /// A sufficient subtype check: the data widened `a` is a subset of `b`.
    pub fn is_subtype_widened(&self, a: &Term, b: &Term) -> bool {
        self.is_subset(&self.mk_data_widened_type(a), b)
    }

    /// The canonical type of a symbol, or of argument `index` of a constructor or map.
    pub fn get_canonical_term(&self, symbol: &Symbol, index: Option<usize>) -> Option<Term> {
        match (symbol, index) {
            (Symbol::Con(_), Some(i)) | (Symbol::Map(_), Some(i)) => {
                symbol.data_decl()?.get_arg_types()?.get(i).cloned()
            }
            (_, Some(_)) => None,
            (Symbol::Con(_), None) | (Symbol::Map(_), None) => {
                let sort = symbol.data_decl()?.get_sort()?.clone();
                Some(self.mk_apply(&Symbol::UserSort(sort), &[]).0)
            }
            (Symbol::Unn(u), None) => u.get_canonical().cloned(),
            (Symbol::BaseOp(_), None) => None,
            (Symbol::UserCnst(c), None) if c.get_kind() == UserCnstKind::Variable => None,
            (s, None) => Some(self.mk_apply(s, &[]).0),
        }
    }

    /// The type constant term `#Name` or `#Name[index]` of a type symbol.
    pub fn mk_type_cnst(&self, symbol: &Symbol, index: Option<usize>) -> Option<Term> {
        let tc = self.symbols.get_type_constant(symbol, index)?;
        Some(self.mk_apply(&tc, &[]).0)
    }

    /// Decodes a type constant term into the symbol it names and the optional argument index.
    pub fn decode_type_cnst(&self, t: &Term) -> Option<(Symbol, Option<usize>)> {
        let (ns, name) = match t.symbol() {
            Symbol::UserCnst(c) if c.get_kind() == UserCnstKind::TypeCnst => {
                (c.info().get_registration()?.namespace, c.info().get_name())
            }
            _ => return None,
        };
        let decoded = TypeCnstName::parse(name)?;
        let symbol = self.symbols.resolve_from(ns, &decoded.name)?;
        if let Some(i) = decoded.index {
            if symbol.data_decl().is_none() || i >= symbol.arity() {
                return None;
            }
        }
        Some((symbol, decoded.index))
    }

    /// The type named by a type constant term.
    pub fn type_of_type_cnst(&self, t: &Term) -> Option<Term> {
        let (symbol, index) = self.decode_type_cnst(t)?;
        self.get_canonical_term(&symbol, index)
    }

    /// The data symbols declaring a field labeled `label`.
    pub fn get_label_owners(&self, label: &str) -> &[Symbol] {
        self.labels.get(label).map(|v| &v[..]).unwrap_or(&[])
    }

    fn build_label_index(&self) -> BTreeMap<String, Vec<Symbol>> {
        let mut labels: BTreeMap<String, Vec<Symbol>> = BTreeMap::new();
        for label in self
            .symbols
            .get_namespaces()
            .all_symbols()
            .iter()
            .filter_map(|(_, s)| s.data_decl())
            .flat_map(|d| d.get_fields().iter().filter_map(|f| f.label.clone()))
        {
            if labels.contains_key(&label) {
                continue;
            }
            let owners = self
                .symbols
                .inverse_label_lookup(&label)
                .into_iter()
                .filter_map(|sort| sort.get_data_symbol())
                .collect();
            labels.insert(label, owners);
        }
        labels
    }

    fn atom_type(
        &self,
        ns: NamespaceId,
        atom: &TypeAtom,
        unions: &BTreeMap<usize, TypeSet>,
    ) -> Result<TypeSet, String> {
        match atom {
            TypeAtom::Cnst(Cnst::Numeric(r)) => Ok(TypeSet::of_rational(r.clone())),
            TypeAtom::Cnst(Cnst::String(s)) => Ok(TypeSet::of_string(s)),
            TypeAtom::Range(lo, hi) => {
                let mut res = TypeSet::new();
                res.add_range(lo.clone(), hi.clone());
                Ok(res)
            }
            TypeAtom::Name(n) => {
                let symbol = self.symbols.resolve_from(ns, n).ok_or_else(|| n.clone())?;
                match &symbol {
                    Symbol::BaseSort(s) => Ok(TypeSet::of_sort(s.kind)),
                    Symbol::Unn(_) => Ok(unions.get(&symbol.id()).cloned().unwrap_or_default()),
                    Symbol::UserCnst(c)
                        if matches!(
                            c.get_kind(),
                            UserCnstKind::Variable | UserCnstKind::Symbolic
                        ) =>
                    {
                        Err(n.clone())
                    }
                    _ => {
                        let t = self
                            .get_canonical_term(&symbol, None)
                            .ok_or_else(|| n.clone())?;
                        Ok(self.type_set(&t))
                    }
                }
            }
        }
    }

    fn atoms_type(
        &self,
        ns: NamespaceId,
        atoms: &[TypeAtom],
        unions: &BTreeMap<usize, TypeSet>,
        undefined: &mut Vec<String>,
    ) -> TypeSet {
        let mut res = TypeSet::new();
        for a in atoms.iter() {
            match self.atom_type(ns, a, unions) {
                Ok(t) => res.union_with(&t),
                Err(name) => undefined.push(name),
            }
        }
        res
    }

    fn resolve_declarations(&mut self, flags: &mut Vec<Flag>) -> bool {
        let program = self.symbols.get_program().to_owned();
        let all = self.symbols.get_namespaces().all_symbols();
        let mut ok = true;

        let mut any = TypeSet::of_sort(BaseSortKind::Real);
        any.add_sort(BaseSortKind::String);
        for (_, s) in all.iter() {
            match s {
                Symbol::Con(_) | Symbol::Map(_) => {
                    if let Some(t) = self.get_canonical_term(s, None) {
                        any.add_data(t);
                    }
                }
                Symbol::UserCnst(c)
                    if !matches!(
                        c.get_kind(),
                        UserCnstKind::Variable | UserCnstKind::Symbolic
                    ) =>
                {
                    any.add_data(self.mk_apply(s, &[]).0);
                }
                _ => (),
            }
        }
        let any_term = self
            .mk_type(&any)
            .unwrap_or_else(|| self.mk_sort(BaseSortKind::Real));
        if self.any_type.set(any_term).is_err() {
            panic!("declarations resolved twice");
        }

        let unions = all
            .iter()
            .filter_map(|(ns, s)| match s {
                Symbol::Unn(u) => Some((*ns, s.id(), u.clone())),
                _ => None,
            })
            .collect::<Vec<_>>();

        // Unions may refer to each other, iterate to the least fixed point.
        let mut sets: BTreeMap<usize, TypeSet> = BTreeMap::new();
        for round in 0..=unions.len() {
            let mut changed = false;
            for (ns, id, u) in unions.iter() {
                let mut undefined = Vec::new();
                let set = self.atoms_type(*ns, u.get_components(), &sets, &mut undefined);
                if round == 0 {
                    for name in undefined.into_iter() {
                        flags.push(Flag::error(
                            Location::default(),
                            messages::undefined_symbol(&name, &u.info().get_full_name()),
                            ErrorCode::UndefinedSymbol,
                            &program,
                        ));
                        ok = false;
                    }
                }
                if sets.get(id) != Some(&set) {
                    sets.insert(*id, set);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        for (_, id, u) in unions.iter() {
            match sets.get(id).and_then(|s| self.mk_type(s)) {
                Some(t) => u.set_canonical(t),
                None => {
                    flags.push(Flag::error(
                        Location::default(),
                        format!("{} has an empty type", u.info().get_full_name()),
                        ErrorCode::EmptyType,
                        &program,
                    ));
                    ok = false;
                }
            }
        }

        for (ns, s) in all.iter() {
            let data = match s.data_decl() {
                Some(d) => d,
                None => continue,
            };
            let mut types = Vec::with_capacity(data.arity());
            for field in data.get_fields().iter() {
                if field.is_any {
                    types.push(self.canonical_any_type().clone());
                    continue;
                }
                let mut undefined = Vec::new();
                let set = self.atoms_type(*ns, &field.ty, &sets, &mut undefined);
                for name in undefined.into_iter() {
                    flags.push(Flag::error(
                        Location::default(),
                        messages::undefined_symbol(&name, &s.full_name()),
                        ErrorCode::UndefinedSymbol,
                        &program,
                    ));
                    ok = false;
                }
                match self.mk_type(&set) {
                    Some(t) => types.push(t),
                    None => {
                        flags.push(Flag::error(
                            Location::default(),
                            format!("a field of {} has an empty type", s.full_name()),
                            ErrorCode::EmptyType,
                            &program,
                        ));
                        ok = false;
                        types.push(self.canonical_any_type().clone());
                    }
                }
            }
            data.set_arg_types(types);
        }

        let boolean = self
            .symbols
            .resolve(BOOLEAN_NAME)
            .and_then(|b| self.get_canonical_term(&b, None));
        match boolean {
            Some(b) => {
                let _ = self.boolean_type.set(b);
            }
            None => panic!("Boolean is declared by every symbol table"),
        }

        debug!(
            "resolved {} unions and {} symbols, {} terms interned",
            unions.len(),
            all.len(),
            self.len()
        );
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use pretty_assertions::assert_eq;

    #[test]
    fn interning_is_hash_consing() {
        let index = test_utils::sample_index();
        let (a, new_a) = index.mk_cnst(Cnst::int(5));
        let (b, new_b) = index.mk_cnst(Cnst::int(5));
        assert!(new_a);
        assert!(!new_b);
        assert_eq!(a, b);
        assert_eq!(a.uid(), b.uid());
        assert_eq!(index.zero_value(), &index.mk_int(0));
        assert_eq!(index.empty_string_value(), &index.mk_string(""));
    }

    #[test]
    fn groundness_of_terms() {
        let index = test_utils::sample_index();
        let one = index.mk_int(1);
        let nat = index.mk_sort(BaseSortKind::Natural);
        assert_eq!(one.groundness(), Groundness::Ground);
        assert_eq!(nat.groundness(), Groundness::Type);

        let point = index.symbols().resolve("Geo.Point").unwrap();
        let p = index.mk_apply(&point, &[one.clone(), one.clone()]).0;
        assert!(p.is_ground());
        let pt = index.mk_apply(&point, &[one, nat]).0;
        assert!(pt.is_type());
        assert!(!pt.is_symbolic_term());
    }

    #[test]
    fn deep_unions_are_flattened_in_order() {
        let index = test_utils::sample_index();
        let union = index.type_union_symbol().clone();
        let nested = (0..1000)
            .rev()
            .fold(index.mk_string("end"), |acc, i| {
                index.mk_apply(&union, &[index.mk_int(i * 2), acc]).0
            });
        let leaves = index.fold_components(
            &nested,
            Vec::new(),
            |t| {
                if t.is_op(OpKind::TypeUnn) {
                    Some(t.args().to_vec())
                } else {
                    None
                }
            },
            |mut acc, t| {
                acc.push(t.clone());
                acc
            },
        );
        assert_eq!(leaves.len(), 1001);
        assert_eq!(leaves[0], index.mk_int(0));
        assert_eq!(leaves[1000], index.mk_string("end"));
        assert_eq!(index.type_set(&nested).get_ranges().len(), 1000);
    }

    #[test]
    fn canonical_unions() {
        let index = test_utils::sample_index();
        let color = index.symbols().resolve("Color").unwrap();
        let t = index.get_canonical_term(&color, None).unwrap();
        assert_eq!(index.type_set(&t).get_data().len(), 3);
        assert!(index.is_member(&test_utils::constant(&index, "RED"), &t));
        assert!(!index.is_member(&index.true_value().clone(), &t));

        let boolean = index.canonical_boolean_type();
        assert!(index.is_member(index.true_value(), boolean));
        assert!(index.is_member(index.false_value(), boolean));
        assert!(!index.is_member(&index.mk_int(1), boolean));
    }

    #[test]
    fn unions_of_numbers_are_canonical() {
        let index = test_utils::sample_index();
        let a = index.mk_union(&index.mk_sort(BaseSortKind::PosInteger), &index.mk_int(0));
        assert_eq!(a, index.mk_sort(BaseSortKind::Natural));

        let b = index.mk_union(&index.mk_int(1), &index.mk_int(2));
        assert_eq!(b, index.mk_range(1.into(), 2.into()));
        assert_eq!(b.to_string(), "1..2");

        let c = index.mk_union(&index.mk_string("a"), &index.mk_int(2));
        assert_eq!(c.to_string(), "2 + \"a\"");
    }

    #[test]
    fn intersections_of_data() {
        let index = test_utils::sample_index();
        let point = index.symbols().resolve("Geo.Point").unwrap();
        let point_sort = index.get_canonical_term(&point, None).unwrap();
        let one = index.mk_int(1);
        let p = index.mk_apply(&point, &[one.clone(), one.clone()]).0;
        assert_eq!(index.mk_intersection(&point_sort, &p), Some(p.clone()));

        let nat = index.mk_sort(BaseSortKind::Natural);
        let neg = index.mk_sort(BaseSortKind::NegInteger);
        let pn = index.mk_apply(&point, &[nat.clone(), nat]).0;
        let pg = index.mk_apply(&point, &[neg.clone(), neg]).0;
        assert_eq!(index.mk_intersection(&pn, &pg), None);
        assert_eq!(index.mk_intersection(&pn, &p), Some(p.clone()));
        assert!(index.is_member(&p, &pn));
        assert!(index.is_subset(&pn, &point_sort));
        assert!(!index.is_subset(&point_sort, &pn));
        assert!(index.is_subtype_widened(&p, &point_sort));
        assert_eq!(index.mk_data_widened_type(&p), point_sort);
    }

    #[test]
    fn any_type_contains_everything() {
        let index = test_utils::sample_index();
        let any = index.canonical_any_type();
        let point = index.symbols().resolve("Geo.Point").unwrap();
        let one = index.mk_int(1);
        let p = index.mk_apply(&point, &[one.clone(), one]).0;
        assert!(index.is_member(&p, any));
        assert!(index.is_member(&index.mk_string("x"), any));
        assert!(index.is_member(index.true_value(), any));
        let tc = index.mk_type_cnst(&point, None).unwrap();
        assert!(index.is_member(&tc, any));
    }

    #[test]
    fn type_constants_decode() {
        let index = test_utils::sample_index();
        let triple = index.symbols().resolve("Geo.Triple").unwrap();
        for k in 0..3 {
            let tc = index.mk_type_cnst(&triple, Some(k)).unwrap();
            assert_eq!(index.decode_type_cnst(&tc), Some((triple.clone(), Some(k))));
        }
        assert_eq!(index.mk_type_cnst(&triple, Some(3)), None);
        let string_field = index
            .type_of_type_cnst(&index.mk_type_cnst(&triple, Some(1)).unwrap())
            .unwrap();
        assert_eq!(string_field, index.mk_sort(BaseSortKind::String));
    }

    #[test]
    fn undefined_names_are_flagged() {
        let mut table = SymbolTable::new(
            "bad",
            Arc::new(crate::plugins::PluginRegistry::empty()),
        );
        let mut flags = Vec::new();
        let root = table.root();
        table.declare_union(
            root,
            "U",
            vec![TypeAtom::name("Missing")],
            Location::default(),
            &mut flags,
        );
        assert!(flags.is_empty());
        assert!(TermIndex::new(table, &mut flags).is_none());
        assert!(flags.iter().any(|f| f.code == ErrorCode::UndefinedSymbol));
    }

    #[test]
    fn interning_from_many_threads() {
        let index = Arc::new(test_utils::sample_index());
        let handles = (0..4)
            .map(|_| {
                let index = index.clone();
                std::thread::spawn(move || (0..50).map(|i| index.mk_int(i)).collect::<Vec<_>>())
            })
            .collect::<Vec<_>>();
        let terms = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        for other in terms.iter().skip(1) {
            assert_eq!(other, &terms[0]);
        }
    }
}
