use std::{
    borrow::Cow,
    fmt::{self, Display},
    hash::{Hash, Hasher},
    sync::{Arc, Weak},
};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::operators::OpCode;
use crate::terms::Term;

use self::namespace::NamespaceId;
use self::size_expr::SizeExpr;

/// Identifier and type-constant grammars.
pub mod names;

/// The tree of lexical scopes holding declared symbols.
pub mod namespace;

/// Cardinality expressions attached to generated sorts.
pub mod size_expr;

/// The symbol table owning the namespace tree and the built-in symbols.
pub mod table;

/// The built-in sorts. Every numeric sort denotes a set of rationals, [BaseSortKind::String] the set of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BaseSortKind {
    /// Integers greater or equal to zero.
    Natural,
    /// Integers greater than zero.
    PosInteger,
    /// Integers less than zero.
    NegInteger,
    /// All integers.
    Integer,
    /// All rationals.
    Real,
    /// All strings.
    String,
}

impl BaseSortKind {
    /// Every base sort, in table order.
    pub const ALL: [BaseSortKind; 6] = [
        BaseSortKind::Natural,
        BaseSortKind::PosInteger,
        BaseSortKind::NegInteger,
        BaseSortKind::Integer,
        BaseSortKind::Real,
        BaseSortKind::String,
    ];

    /// The source-level name of the sort.
    pub fn get_name(self) -> &'static str {
        match self {
            BaseSortKind::Natural => "Natural",
            BaseSortKind::PosInteger => "PosInteger",
            BaseSortKind::NegInteger => "NegInteger",
            BaseSortKind::Integer => "Integer",
            BaseSortKind::Real => "Real",
            BaseSortKind::String => "String",
        }
    }

    /// Looks a sort up by its source-level name.
    pub fn from_name(name: &str) -> Option<BaseSortKind> {
        BaseSortKind::ALL
            .iter()
            .copied()
            .find(|k| k.get_name() == name)
    }

    /// True for every sort but [BaseSortKind::String].
    pub fn is_numeric(self) -> bool {
        self != BaseSortKind::String
    }

    /// True if the sort only contains integers.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            BaseSortKind::Natural
                | BaseSortKind::PosInteger
                | BaseSortKind::NegInteger
                | BaseSortKind::Integer
        )
    }

    /// Checks membership of a rational in a numeric sort.
    pub fn contains_rational(self, r: &BigRational) -> bool {
        match self {
            BaseSortKind::Real => true,
            BaseSortKind::String => false,
            BaseSortKind::Integer => r.is_integer(),
            BaseSortKind::Natural => r.is_integer() && !r.is_negative(),
            BaseSortKind::PosInteger => r.is_integer() && r.is_positive(),
            BaseSortKind::NegInteger => r.is_integer() && r.is_negative(),
        }
    }

    /// The smallest base sort containing the rational.
    pub fn of_rational(r: &BigRational) -> BaseSortKind {
        if !r.is_integer() {
            BaseSortKind::Real
        } else if r.is_positive() {
            BaseSortKind::PosInteger
        } else if r.is_zero() {
            BaseSortKind::Natural
        } else {
            BaseSortKind::NegInteger
        }
    }

    /// The integer interval denoted by an integral sort as `(lower, upper)` where `None` is unbounded.
    pub fn int_bounds(self) -> Option<(Option<BigInt>, Option<BigInt>)> {
        match self {
            BaseSortKind::Natural => Some((Some(BigInt::zero()), None)),
            BaseSortKind::PosInteger => Some((Some(BigInt::one()), None)),
            BaseSortKind::NegInteger => Some((None, Some(-BigInt::one()))),
            BaseSortKind::Integer => Some((None, None)),
            BaseSortKind::Real | BaseSortKind::String => None,
        }
    }
}

impl Display for BaseSortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get_name())
    }
}

/// The value carried by a base constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cnst {
    /// An arbitrary precision rational.
    Numeric(BigRational),
    /// An immutable unicode string.
    String(String),
}

impl Cnst {
    /// Creates an integral numeric constant.
    pub fn int<T: Into<BigInt>>(v: T) -> Cnst {
        Cnst::Numeric(BigRational::from_integer(v.into()))
    }

    /// Creates a string constant.
    pub fn string<S: Into<String>>(s: S) -> Cnst {
        Cnst::String(s.into())
    }

    /// The rational of a numeric constant.
    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Cnst::Numeric(r) => Some(r),
            Cnst::String(_) => None,
        }
    }

    /// The string of a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cnst::String(s) => Some(s),
            Cnst::Numeric(_) => None,
        }
    }
}

/// Writes a rational the way the language prints it: `3`, `-1/2`.
pub fn fmt_rational(r: &BigRational, f: &mut impl fmt::Write) -> fmt::Result {
    if r.is_integer() {
        write!(f, "{}", r.numer())
    } else {
        write!(f, "{}/{}", r.numer(), r.denom())
    }
}

impl Display for Cnst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cnst::Numeric(r) => fmt_rational(r, f),
            Cnst::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// The tag every switch over symbols dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// A built-in sort.
    BaseSortSymb,
    /// A numeric or string constant.
    BaseCnstSymb,
    /// A built-in or plugin operator.
    BaseOpSymb,
    /// A user constant, variable, type constant or symbolic constant.
    UserCnstSymb,
    /// The sort derived from a constructor or map.
    UserSortSymb,
    /// A union of types.
    UnnSymb,
    /// A data constructor.
    ConSymb,
    /// A map (function) constructor.
    MapSymb,
}

/// Distinguishes the different roles of user constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserCnstKind {
    /// A constant declared by the user.
    New,
    /// A constant derived by the system such as `TRUE` and `FALSE`.
    Derived,
    /// A logic variable.
    Variable,
    /// A value-level name for a type, `#Name` or `#Name[i]`.
    TypeCnst,
    /// A fresh constant standing for an unknown value during symbolic execution.
    Symbolic,
}

/// Set once when a user symbol is added to a namespace.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The globally unique id.
    pub id: usize,
    /// The namespace holding the symbol.
    pub namespace: NamespaceId,
    /// The dot-joined name from the root.
    pub full_name: String,
}

/// Name and registration state shared by all user symbols.
#[derive(Debug)]
pub struct UserSymbolInfo {
    name: String,
    auto_generated: bool,
    registration: OnceCell<Registration>,
}

impl UserSymbolInfo {
    fn new(name: String, auto_generated: bool) -> UserSymbolInfo {
        UserSymbolInfo {
            name,
            auto_generated,
            registration: OnceCell::new(),
        }
    }

    /// The local name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Auto generated symbols skip identifier validation.
    pub fn is_auto_generated(&self) -> bool {
        self.auto_generated
    }

    /// The registration, if the symbol was added to a namespace.
    pub fn get_registration(&self) -> Option<&Registration> {
        self.registration.get()
    }

    /// The full name, or the local name before registration.
    pub fn get_full_name(&self) -> &str {
        self.registration
            .get()
            .map(|r| r.full_name.as_str())
            .unwrap_or(&self.name)
    }

    pub(crate) fn register(&self, registration: Registration) {
        if self.registration.set(registration).is_err() {
            panic!("symbol {} was registered twice", self.name);
        }
    }
}

/// A built-in sort symbol.
#[derive(Debug, Clone, Copy)]
pub struct BaseSortSymb {
    /// The sort.
    pub kind: BaseSortKind,
    id: usize,
}

/// A numeric or string constant symbol, allocated by the term index.
#[derive(Debug)]
pub struct BaseCnstSymb {
    id: usize,
    value: Cnst,
}

impl BaseCnstSymb {
    pub(crate) fn new(id: usize, value: Cnst) -> BaseCnstSymb {
        BaseCnstSymb { id, value }
    }

    /// The constant's value.
    pub fn get_value(&self) -> &Cnst {
        &self.value
    }
}

/// A built-in or plugin operator symbol.
#[derive(Debug, Clone)]
pub struct BaseOpSymb {
    /// The operator identity.
    pub code: OpCode,
    id: usize,
    arity: usize,
    name: Arc<str>,
}

impl BaseOpSymb {
    pub(crate) fn new(code: OpCode, id: usize, arity: usize, name: &str) -> BaseOpSymb {
        BaseOpSymb {
            code,
            id,
            arity,
            name: Arc::from(name),
        }
    }
}

/// A user constant.
#[derive(Debug)]
pub struct UserCnstSymb {
    info: UserSymbolInfo,
    kind: UserCnstKind,
}

impl UserCnstSymb {
    /// Creates an unregistered constant.
    pub fn new(name: &str, kind: UserCnstKind, auto_generated: bool) -> UserCnstSymb {
        UserCnstSymb {
            info: UserSymbolInfo::new(name.to_owned(), auto_generated),
            kind,
        }
    }

    /// Name and registration.
    pub fn info(&self) -> &UserSymbolInfo {
        &self.info
    }

    /// The role of this constant.
    pub fn get_kind(&self) -> UserCnstKind {
        self.kind
    }
}

/// An unresolved component of a declared type: a sort or constant name, a constant, or an integer range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeAtom {
    /// A (possibly dotted) name of a sort, union, constructor, map or constant.
    Name(String),
    /// A numeric or string constant.
    Cnst(Cnst),
    /// The integers from `lo` to `hi` inclusive.
    Range(BigInt, BigInt),
}

impl TypeAtom {
    /// Shorthand for [TypeAtom::Name].
    pub fn name(n: &str) -> TypeAtom {
        TypeAtom::Name(n.to_owned())
    }
}

/// A declared field of a constructor or map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// An optional label used by selection.
    pub label: Option<String>,
    /// Fields marked `any` are not checked for type membership.
    pub is_any: bool,
    /// The declared type as a union of atoms.
    pub ty: Vec<TypeAtom>,
}

impl FieldDecl {
    /// An unlabeled field.
    pub fn new(ty: Vec<TypeAtom>) -> FieldDecl {
        FieldDecl {
            label: None,
            is_any: false,
            ty,
        }
    }

    /// A labeled field.
    pub fn labeled(label: &str, ty: Vec<TypeAtom>) -> FieldDecl {
        FieldDecl {
            label: Some(label.to_owned()),
            is_any: false,
            ty,
        }
    }
}

/// The declaration shared by constructors and maps.
#[derive(Debug)]
pub struct DataDecl {
    fields: Vec<FieldDecl>,
    sort: OnceCell<Arc<UserSortSymb>>,
    arg_types: OnceCell<Box<[Term]>>,
}

impl DataDecl {
    fn new(fields: Vec<FieldDecl>) -> DataDecl {
        DataDecl {
            fields,
            sort: OnceCell::new(),
            arg_types: OnceCell::new(),
        }
    }

    /// The declared fields in order.
    pub fn get_fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// The number of fields.
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// The position of the field carrying `label`.
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.label.as_deref() == Some(label))
    }

    /// The derived sort, once the symbol was added to a namespace.
    pub fn get_sort(&self) -> Option<&Arc<UserSortSymb>> {
        self.sort.get()
    }

    /// The canonical argument types, once declarations were resolved.
    pub fn get_arg_types(&self) -> Option<&[Term]> {
        self.arg_types.get().map(|b| &b[..])
    }

    pub(crate) fn link_sort(&self, sort: Arc<UserSortSymb>) {
        if self.sort.set(sort).is_err() {
            panic!("data symbol linked to two sorts");
        }
    }

    pub(crate) fn set_arg_types(&self, types: Vec<Term>) {
        if self.arg_types.set(types.into_boxed_slice()).is_err() {
            panic!("argument types resolved twice");
        }
    }
}

/// A data constructor.
#[derive(Debug)]
pub struct ConSymb {
    info: UserSymbolInfo,
    data: DataDecl,
    is_new: bool,
}

impl ConSymb {
    /// Creates an unregistered constructor. `is_new` constructors may appear in models.
    pub fn new(name: &str, fields: Vec<FieldDecl>, is_new: bool) -> ConSymb {
        ConSymb {
            info: UserSymbolInfo::new(name.to_owned(), false),
            data: DataDecl::new(fields),
            is_new,
        }
    }

    /// Name and registration.
    pub fn info(&self) -> &UserSymbolInfo {
        &self.info
    }

    /// Fields, derived sort and argument types.
    pub fn data(&self) -> &DataDecl {
        &self.data
    }

    /// True for `new` constructors.
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

/// The kinds of maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    /// A function.
    Fun,
    /// An injective function.
    Inj,
    /// A bijective function.
    Bij,
    /// A surjective function.
    Sur,
}

/// A map constructor: the first `dom_arity` fields form the domain, the rest the codomain.
#[derive(Debug)]
pub struct MapSymb {
    info: UserSymbolInfo,
    data: DataDecl,
    dom_arity: usize,
    map_kind: MapKind,
    is_partial: bool,
}

impl MapSymb {
    /// Creates an unregistered map.
    pub fn new(
        name: &str,
        fields: Vec<FieldDecl>,
        dom_arity: usize,
        map_kind: MapKind,
        is_partial: bool,
    ) -> MapSymb {
        assert!(dom_arity <= fields.len(), "map domain larger than its fields");
        MapSymb {
            info: UserSymbolInfo::new(name.to_owned(), false),
            data: DataDecl::new(fields),
            dom_arity,
            map_kind,
            is_partial,
        }
    }

    /// Name and registration.
    pub fn info(&self) -> &UserSymbolInfo {
        &self.info
    }

    /// Fields, derived sort and argument types.
    pub fn data(&self) -> &DataDecl {
        &self.data
    }

    /// The number of domain fields.
    pub fn get_dom_arity(&self) -> usize {
        self.dom_arity
    }

    /// The kind of map.
    pub fn get_map_kind(&self) -> MapKind {
        self.map_kind
    }

    /// True if the map need not be total.
    pub fn is_partial(&self) -> bool {
        self.is_partial
    }
}

/// A union of types. Partial definitions of the same union coalesce.
#[derive(Debug)]
pub struct UnnSymb {
    info: UserSymbolInfo,
    components: Vec<TypeAtom>,
    canonical: OnceCell<Term>,
}

impl UnnSymb {
    /// Creates an unregistered union.
    pub fn new(name: &str, components: Vec<TypeAtom>) -> UnnSymb {
        UnnSymb::with_info(UserSymbolInfo::new(name.to_owned(), false), components)
    }

    fn with_info(info: UserSymbolInfo, components: Vec<TypeAtom>) -> UnnSymb {
        UnnSymb {
            info,
            components,
            canonical: OnceCell::new(),
        }
    }

    /// Name and registration.
    pub fn info(&self) -> &UserSymbolInfo {
        &self.info
    }

    /// The declared components.
    pub fn get_components(&self) -> &[TypeAtom] {
        &self.components
    }

    /// The canonical type term, once declarations were resolved.
    pub fn get_canonical(&self) -> Option<&Term> {
        self.canonical.get()
    }

    pub(crate) fn set_canonical(&self, t: Term) {
        if self.canonical.set(t).is_err() {
            panic!("union {} resolved twice", self.info.name);
        }
    }

    /// Coalesces two partial definitions, keeping the registration of `self`.
    pub(crate) fn merge(&self, other: &UnnSymb) -> UnnSymb {
        let mut components = self.components.clone();
        for c in other.components.iter() {
            if !components.contains(c) {
                components.push(c.clone());
            }
        }
        let info = UserSymbolInfo::new(self.info.name.clone(), self.info.auto_generated);
        if let Some(reg) = self.info.get_registration() {
            info.register(reg.clone());
        }
        UnnSymb::with_info(info, components)
    }
}

/// Back reference from a derived sort to the symbol it was derived from.
#[derive(Debug)]
pub enum DataOwner {
    /// Derived from a constructor.
    Con(Weak<ConSymb>),
    /// Derived from a map.
    Map(Weak<MapSymb>),
}

/// The sort of all values built by one constructor or map.
#[derive(Debug)]
pub struct UserSortSymb {
    info: UserSymbolInfo,
    owner: DataOwner,
    size: Option<SizeExpr>,
}

impl UserSortSymb {
    pub(crate) fn new(name: &str, owner: DataOwner, size: Option<SizeExpr>) -> UserSortSymb {
        UserSortSymb {
            info: UserSymbolInfo::new(name.to_owned(), true),
            owner,
            size,
        }
    }

    /// Name and registration.
    pub fn info(&self) -> &UserSymbolInfo {
        &self.info
    }

    /// The constructor or map this sort was derived from.
    pub fn get_data_symbol(&self) -> Option<Symbol> {
        match &self.owner {
            DataOwner::Con(c) => c.upgrade().map(Symbol::Con),
            DataOwner::Map(m) => m.upgrade().map(Symbol::Map),
        }
    }

    /// The declared cardinality, if any.
    pub fn get_size(&self) -> Option<&SizeExpr> {
        self.size.as_ref()
    }
}

/// Keys symbols for hashing and interning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKey {
    /// A base sort.
    Sort(BaseSortKind),
    /// A base constant by id.
    Cnst(usize),
    /// An operator by code.
    Op(OpCode),
    /// A user symbol by id.
    User(usize),
}

/// Every named entity of the term algebra.
#[derive(Debug, Clone)]
pub enum Symbol {
    /// A built-in sort.
    BaseSort(BaseSortSymb),
    /// A numeric or string constant.
    BaseCnst(Arc<BaseCnstSymb>),
    /// An operator.
    BaseOp(BaseOpSymb),
    /// A user constant.
    UserCnst(Arc<UserCnstSymb>),
    /// A derived sort.
    UserSort(Arc<UserSortSymb>),
    /// A union.
    Unn(Arc<UnnSymb>),
    /// A constructor.
    Con(Arc<ConSymb>),
    /// A map.
    Map(Arc<MapSymb>),
}

impl Symbol {
    /// The kind tag.
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::BaseSort(_) => SymbolKind::BaseSortSymb,
            Symbol::BaseCnst(_) => SymbolKind::BaseCnstSymb,
            Symbol::BaseOp(_) => SymbolKind::BaseOpSymb,
            Symbol::UserCnst(_) => SymbolKind::UserCnstSymb,
            Symbol::UserSort(_) => SymbolKind::UserSortSymb,
            Symbol::Unn(_) => SymbolKind::UnnSymb,
            Symbol::Con(_) => SymbolKind::ConSymb,
            Symbol::Map(_) => SymbolKind::MapSymb,
        }
    }

    /// Name and registration of user symbols.
    pub fn user_info(&self) -> Option<&UserSymbolInfo> {
        match self {
            Symbol::UserCnst(s) => Some(s.info()),
            Symbol::UserSort(s) => Some(s.info()),
            Symbol::Unn(s) => Some(s.info()),
            Symbol::Con(s) => Some(s.info()),
            Symbol::Map(s) => Some(s.info()),
            Symbol::BaseSort(_) | Symbol::BaseCnst(_) | Symbol::BaseOp(_) => None,
        }
    }

    /// The id, `None` for a user symbol not yet added to a namespace.
    pub fn try_id(&self) -> Option<usize> {
        match self {
            Symbol::BaseSort(s) => Some(s.id),
            Symbol::BaseCnst(s) => Some(s.id),
            Symbol::BaseOp(s) => Some(s.id),
            _ => self
                .user_info()
                .and_then(|i| i.get_registration())
                .map(|r| r.id),
        }
    }

    /// The id. Using an unregistered symbol in a term is a bug.
    pub fn id(&self) -> usize {
        self.try_id()
            .unwrap_or_else(|| panic!("symbol {} used before it was registered", self.name()))
    }

    /// The number of arguments an application of this symbol takes.
    pub fn arity(&self) -> usize {
        match self {
            Symbol::BaseOp(op) => op.arity,
            Symbol::Con(c) => c.data().arity(),
            Symbol::Map(m) => m.data().arity(),
            Symbol::BaseSort(_)
            | Symbol::BaseCnst(_)
            | Symbol::UserCnst(_)
            | Symbol::UserSort(_)
            | Symbol::Unn(_) => 0,
        }
    }

    /// The local name.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Symbol::BaseSort(s) => Cow::Borrowed(s.kind.get_name()),
            Symbol::BaseCnst(c) => Cow::Owned(c.value.to_string()),
            Symbol::BaseOp(op) => Cow::Borrowed(&op.name),
            _ => Cow::Borrowed(
                self.user_info()
                    .map(|i| i.get_name())
                    .unwrap_or_default(),
            ),
        }
    }

    /// The dotted name from the root namespace.
    pub fn full_name(&self) -> Cow<'_, str> {
        match self.user_info() {
            Some(info) => Cow::Borrowed(info.get_full_name()),
            None => self.name(),
        }
    }

    /// The interning key.
    pub fn key(&self) -> SymbolKey {
        match self {
            Symbol::BaseSort(s) => SymbolKey::Sort(s.kind),
            Symbol::BaseCnst(c) => SymbolKey::Cnst(c.id),
            Symbol::BaseOp(op) => SymbolKey::Op(op.code),
            _ => SymbolKey::User(self.id()),
        }
    }

    /// The declaration of constructors and maps.
    pub fn data_decl(&self) -> Option<&DataDecl> {
        match self {
            Symbol::Con(c) => Some(c.data()),
            Symbol::Map(m) => Some(m.data()),
            _ => None,
        }
    }

    /// True for symbols that only occur in type terms.
    pub fn is_type_symbol(&self) -> bool {
        match self {
            Symbol::BaseSort(_) | Symbol::UserSort(_) | Symbol::Unn(_) => true,
            Symbol::BaseOp(op) => op.code.is_type_constructor(),
            _ => false,
        }
    }

    /// The constant value of a base constant.
    pub fn as_cnst(&self) -> Option<&Cnst> {
        match self {
            Symbol::BaseCnst(c) => Some(c.get_value()),
            _ => None,
        }
    }

    /// The operator code of an operator symbol.
    pub fn as_op(&self) -> Option<OpCode> {
        match self {
            Symbol::BaseOp(op) => Some(op.code),
            _ => None,
        }
    }

    /// The role of a user constant.
    pub fn user_cnst_kind(&self) -> Option<UserCnstKind> {
        match self {
            Symbol::UserCnst(c) => Some(c.get_kind()),
            _ => None,
        }
    }

    pub(crate) fn base_sort(kind: BaseSortKind, id: usize) -> Symbol {
        Symbol::BaseSort(BaseSortSymb { kind, id })
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Checks that two definitions of the same name may coexist.
pub fn is_compatible_definition(existing: &Symbol, new: &Symbol) -> bool {
    match (existing, new) {
        (Symbol::UserCnst(a), Symbol::UserCnst(b)) => a.get_kind() == b.get_kind(),
        (Symbol::Unn(_), Symbol::Unn(_)) => true,
        (Symbol::Con(a), Symbol::Con(b)) => {
            a.is_new() == b.is_new() && a.data().get_fields() == b.data().get_fields()
        }
        (Symbol::Map(a), Symbol::Map(b)) => {
            a.get_dom_arity() == b.get_dom_arity()
                && a.get_map_kind() == b.get_map_kind()
                && a.is_partial() == b.is_partial()
                && a.data().get_fields() == b.data().get_fields()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smallest_sort_of_rationals() {
        assert_eq!(
            BaseSortKind::of_rational(&BigRational::from_integer(0.into())),
            BaseSortKind::Natural
        );
        assert_eq!(
            BaseSortKind::of_rational(&BigRational::from_integer((-4).into())),
            BaseSortKind::NegInteger
        );
        assert_eq!(
            BaseSortKind::of_rational(&BigRational::new(1.into(), 2.into())),
            BaseSortKind::Real
        );
    }

    #[test]
    fn constructors_with_same_fields_are_compatible() {
        let a = Symbol::Con(Arc::new(ConSymb::new(
            "Edge",
            vec![FieldDecl::labeled("src", vec![TypeAtom::name("V")])],
            true,
        )));
        let b = Symbol::Con(Arc::new(ConSymb::new(
            "Edge",
            vec![FieldDecl::labeled("src", vec![TypeAtom::name("V")])],
            true,
        )));
        let c = Symbol::Con(Arc::new(ConSymb::new(
            "Edge",
            vec![FieldDecl::labeled("dst", vec![TypeAtom::name("V")])],
            true,
        )));
        assert!(is_compatible_definition(&a, &b));
        assert!(!is_compatible_definition(&a, &c));
    }

    #[test]
    fn rationals_print_as_fractions() {
        assert_eq!(Cnst::Numeric(BigRational::new((-1).into(), 2.into())).to_string(), "-1/2");
        assert_eq!(Cnst::int(7).to_string(), "7");
        assert_eq!(Cnst::string("a\"b").to_string(), "\"a\\\"b\"");
    }
}
