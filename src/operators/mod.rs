//! The operator table. Every operator has a validator, a ground evaluator with an optional symbolic path,
//! an application constrainer and a pair of Galois approximations. Built-in operators dispatch on
//! [OpKind]; plugin operators are wrapped by [crate::plugins::RegisteredPlugin].

use std::fmt::{self, Display};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Flag, Location};
use crate::plugins::RegisteredPlugin;
use crate::terms::{Term, TermIndex};

/// Upward and downward type approximations.
pub mod approx;

/// Ground and symbolic evaluators.
pub mod eval;

/// Syntactic checks run before evaluation.
pub mod validate;


/// Whether an argument position takes an expression or a comprehension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgShape {
    /// A comprehension is not allowed here.
    Forbidden,
    /// Only a comprehension is allowed here.
    Required,
    /// Either form is allowed here. A comprehension may appear in no other position.
    Optional,
}

macro_rules! op_kinds {
    ($($(#[$doc:meta])* $kind:ident => ($name:expr, $arity:expr)),+ $(,)?) => {
        /// The built-in operators.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum OpKind {
            $($(#[$doc])* $kind),+
        }

        impl OpKind {
            /// Every built-in operator, in code order.
            pub const ALL: &'static [OpKind] = &[$(OpKind::$kind),+];

            /// The human readable name used in diagnostics.
            pub fn get_name(self) -> &'static str {
                match self {
                    $(OpKind::$kind => $name),+
                }
            }

            /// The number of arguments.
            pub fn arity(self) -> usize {
                match self {
                    $(OpKind::$kind => $arity),+
                }
            }
        }
    };
}

op_kinds! {
    /// `x + y`
    Add => ("+", 2),
    /// `x - y`
    Sub => ("-", 2),
    /// `x * y`
    Mul => ("*", 2),
    /// `x / y`
    Div => ("/", 2),
    /// Euclidean remainder.
    Mod => ("%", 2),
    /// Euclidean quotient.
    Qtnt => ("qtnt", 2),
    /// `-x`
    Neg => ("neg", 1),
    /// `-1`, `0` or `1`.
    Sign => ("sign", 1),
    /// Larger of two terms in the term order.
    Max => ("max", 2),
    /// Smaller of two terms in the term order.
    Min => ("min", 2),
    /// Greatest common divisor of integers.
    GCD => ("gcd", 2),
    /// Least common multiple of integers.
    LCM => ("lcm", 2),
    /// Conjunction.
    And => ("and", 2),
    /// Disjunction.
    Or => ("or", 2),
    /// Implication.
    Impl => ("impl", 2),
    /// Negation.
    Not => ("not", 1),
    /// Equality.
    Eq => ("=", 2),
    /// Disequality.
    Neq => ("!=", 2),
    /// Less than.
    Lt => ("<", 2),
    /// Less or equal.
    Le => ("<=", 2),
    /// Greater than.
    Gt => (">", 2),
    /// Greater or equal.
    Ge => (">=", 2),
    /// Field selection by label.
    Sel => (".", 2),
    /// Number of answers of a comprehension.
    Count => ("count", 1),
    /// True if a comprehension has no answers.
    No => ("no", 1),
    /// Sum over a comprehension.
    Sum => ("sum", 2),
    /// Product over a comprehension.
    Prod => ("prod", 2),
    /// Conjunction over a comprehension.
    AndAll => ("andAll", 2),
    /// Disjunction over a comprehension.
    OrAll => ("orAll", 2),
    /// Largest answer of a comprehension.
    MaxAll => ("maxAll", 2),
    /// Smallest answer of a comprehension.
    MinAll => ("minAll", 2),
    /// Greatest common divisor over a comprehension.
    GCDAll => ("gcdAll", 2),
    /// Least common multiple over a comprehension.
    LCMAll => ("lcmAll", 2),
    /// The sorted answers of a comprehension as a cons list.
    ToList => ("toList", 3),
    /// Position of a term among the sorted answers of a comprehension.
    ToOrdinal => ("toOrdinal", 3),
    /// Suffix from a position.
    StrAfter => ("strAfter", 2),
    /// Prefix up to a position.
    StrBefore => ("strBefore", 2),
    /// Position of a substring.
    StrFind => ("strFind", 3),
    /// Character at a position.
    StrGetAt => ("strGetAt", 2),
    /// Concatenation.
    StrJoin => ("strJoin", 2),
    /// Number of characters.
    StrLength => ("strLength", 1),
    /// Lower case.
    StrLower => ("strLower", 1),
    /// Replaces the first occurrence of a substring.
    StrReplace => ("strReplace", 3),
    /// Reverses the characters.
    StrReverse => ("strReverse", 1),
    /// Upper case.
    StrUpper => ("strUpper", 1),
    /// True if the first string occurs in the second.
    IsSubstring => ("isSubstring", 2),
    /// Printed form of a term.
    ToString => ("toString", 1),
    /// Naturals and decimal strings to naturals.
    ToNatural => ("toNatural", 1),
    /// Type constant of the head of a term.
    ToSymbol => ("toSymbol", 1),
    /// Length of a cons list.
    LstLength => ("lstLength", 2),
    /// Reversal of a cons list.
    LstReverse => ("lstReverse", 2),
    /// First position of an element in a cons list.
    LstFind => ("lstFind", 4),
    /// Every position of an element in a cons list.
    LstFindAll => ("lstFindAll", 4),
    /// Every position not holding an element in a cons list.
    LstFindAllNot => ("lstFindAllNot", 4),
    /// Element at a position of a cons list.
    LstGetAt => ("lstGetAt", 3),
    /// True if a value belongs to the type named by a type constant.
    RflIsMember => ("rflIsMember", 2),
    /// True if one named type is contained in another.
    RflIsSubtype => ("rflIsSubtype", 2),
    /// Type constant of an argument position.
    RflGetArgType => ("rflGetArgType", 2),
    /// Arity of the symbol named by a type constant.
    RflGetArity => ("rflGetArity", 1),
    /// Union of types.
    TypeUnn => ("+", 2),
    /// Integer range type.
    Range => ("..", 2),
    /// Module relabeling.
    Relabel => ("relabel", 3),
    /// Find clause.
    Find => ("find", 3),
    /// Comprehension.
    Compr => ("compr", 2),
}

impl OpKind {
    /// Syntactic forms that only exist in the table and must never be evaluated.
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            OpKind::TypeUnn | OpKind::Range | OpKind::Relabel | OpKind::Find | OpKind::Compr
        )
    }

    /// Operators with an aggregate over a comprehension.
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            OpKind::Count
                | OpKind::No
                | OpKind::Sum
                | OpKind::Prod
                | OpKind::AndAll
                | OpKind::OrAll
                | OpKind::MaxAll
                | OpKind::MinAll
                | OpKind::GCDAll
                | OpKind::LCMAll
                | OpKind::ToList
                | OpKind::ToOrdinal
        )
    }

    /// Operators with a symbolic evaluation path.
    pub fn has_symbolic_path(self) -> bool {
        matches!(
            self,
            OpKind::Add
                | OpKind::Sub
                | OpKind::Mul
                | OpKind::Div
                | OpKind::Mod
                | OpKind::Qtnt
                | OpKind::Neg
                | OpKind::Sign
                | OpKind::Max
                | OpKind::Min
                | OpKind::GCD
                | OpKind::LCM
                | OpKind::And
                | OpKind::Or
                | OpKind::Impl
                | OpKind::Not
                | OpKind::Eq
                | OpKind::Neq
                | OpKind::Lt
                | OpKind::Le
                | OpKind::Gt
                | OpKind::Ge
        )
    }

    /// The shape of argument `pos`. Aggregates take their comprehension last; `toList` and `toOrdinal`
    /// also accept a single value there.
    pub fn arg_shape(self, pos: usize) -> ArgShape {
        if !self.is_aggregate() || pos + 1 != self.arity() {
            return ArgShape::Forbidden;
        }
        match self {
            OpKind::ToList | OpKind::ToOrdinal => ArgShape::Optional,
            _ => ArgShape::Required,
        }
    }

    /// Looks up a non-reserved operator by name.
    pub fn from_name(name: &str) -> Option<OpKind> {
        OpKind::ALL
            .iter()
            .copied()
            .find(|k| !k.is_reserved() && k.get_name() == name)
    }
}

impl Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get_name())
    }
}

/// The identity of a registered plugin operator. Plugin ids start above every built-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PluginOpId(pub u32);

/// The identity of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpCode {
    /// A built-in operator.
    Builtin(OpKind),
    /// A plugin operator.
    Plugin(PluginOpId),
}

impl OpCode {
    /// Operators whose applications are type terms.
    pub fn is_type_constructor(self) -> bool {
        matches!(self, OpCode::Builtin(OpKind::TypeUnn) | OpCode::Builtin(OpKind::Range))
    }
}

/// A bound argument of an evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bindable {
    /// A value.
    Value(Term),
    /// A comprehension to be handed to the fact store.
    Comprehension(Term),
}

impl Bindable {
    /// The bound term.
    pub fn term(&self) -> &Term {
        match self {
            Bindable::Value(t) | Bindable::Comprehension(t) => t,
        }
    }
}

/// The query engine consumed by aggregate operators.
pub trait FactQuery {
    /// Answers of a comprehension together with their number. The projected value of each answer is its
    /// last argument.
    fn query(&self, comprehension: &Term) -> (Vec<Term>, usize);
}

/// An obligation an operator places on its operands when applied symbolically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideConstraint {
    /// The term is not zero.
    NonZero(Term),
    /// The term is an integer.
    IsInteger(Term),
    /// The term is a natural.
    IsNatural(Term),
}

/// The external collector of symbolic applications.
pub trait SymbolicEncoder {
    /// Registers a symbolic operator application and the constraints under which it is defined.
    fn encode(&mut self, app: &Term, constraints: &[SideConstraint]);
}

/// Everything an evaluator may consult.
pub struct EvalContext<'a> {
    /// The term index results are interned in.
    pub index: &'a TermIndex,
    /// The fact store, needed by aggregates.
    pub facts: Option<&'a dyn FactQuery>,
    /// The symbolic encoder, needed for symbolic arguments.
    pub encoder: Option<&'a mut dyn SymbolicEncoder>,
}

impl<'a> EvalContext<'a> {
    /// A context for purely ground evaluation.
    pub fn new(index: &'a TermIndex) -> EvalContext<'a> {
        EvalContext {
            index,
            facts: None,
            encoder: None,
        }
    }

    /// Attaches a fact store.
    pub fn with_facts(mut self, facts: &'a dyn FactQuery) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Attaches a symbolic encoder.
    pub fn with_encoder(mut self, encoder: &'a mut dyn SymbolicEncoder) -> Self {
        self.encoder = Some(encoder);
        self
    }
}

/// One argument of an operator application as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgForm {
    /// An ordinary expression.
    Expr,
    /// A comprehension.
    Comprehension,
}

/// The syntactic shape of an operator application, all a validator looks at.
#[derive(Debug, Clone)]
pub struct AppSyntax {
    /// The applied operator.
    pub op: OpCode,
    /// The written arguments.
    pub args: Vec<ArgForm>,
    /// Where the application was written.
    pub location: Location,
}

impl AppSyntax {
    /// An application of `op` to plain expressions.
    pub fn new(op: OpCode, args: Vec<ArgForm>, location: Location) -> AppSyntax {
        AppSyntax { op, args, location }
    }
}

/// The common interface of built-in and plugin operators.
pub trait Operator {
    /// The name used in diagnostics.
    fn get_name(&self) -> &str;

    /// The number of arguments.
    fn get_arity(&self) -> usize;

    /// Checks the arity and comprehension shape of an application, reporting `BadSyntax` flags.
    fn validate(&self, app: &AppSyntax, program: &str, flags: &mut Vec<Flag>) -> bool;

    /// Evaluates on bound arguments. `None` if the operator does not apply to them.
    fn evaluate(&self, ctx: &mut EvalContext<'_>, args: &[Bindable]) -> Option<Term>;

    /// The side constraints of an application whose arguments are not all known.
    fn constrain_application(&self, _index: &TermIndex, _args: &[Term]) -> Vec<SideConstraint> {
        Vec::new()
    }

    /// Infers the result type from argument types. The result holds exactly one type.
    fn approximate_up(&self, index: &TermIndex, args: &[Term]) -> Option<Vec<Term>>;

    /// Infers necessary argument types from the expected result type. `args` are the argument types known
    /// so far; only operators with syntactic arguments, such as the label of `Sel`, read them.
    fn approximate_down(
        &self,
        index: &TermIndex,
        expected: &Term,
        args: &[Term],
    ) -> Option<Vec<Term>>;
}

impl Operator for OpKind {
    fn get_name(&self) -> &str {
        OpKind::get_name(*self)
    }

    fn get_arity(&self) -> usize {
        self.arity()
    }

    fn validate(&self, app: &AppSyntax, program: &str, flags: &mut Vec<Flag>) -> bool {
        validate::validate_builtin(*self, app, program, flags)
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>, args: &[Bindable]) -> Option<Term> {
        eval::evaluate(*self, ctx, args)
    }

    fn constrain_application(&self, index: &TermIndex, args: &[Term]) -> Vec<SideConstraint> {
        eval::symbolic::side_constraints(*self, index, args)
    }

    fn approximate_up(&self, index: &TermIndex, args: &[Term]) -> Option<Vec<Term>> {
        approx::approximate_up(*self, index, args)
    }

    fn approximate_down(
        &self,
        index: &TermIndex,
        expected: &Term,
        args: &[Term],
    ) -> Option<Vec<Term>> {
        approx::approximate_down(*self, index, expected, args)
    }
}

/// A resolved operator.
#[derive(Clone)]
pub enum OperatorRef {
    /// A built-in operator.
    Builtin(OpKind),
    /// A registered plugin.
    Plugin(Arc<RegisteredPlugin>),
}

impl OperatorRef {
    fn inner(&self) -> &dyn Operator {
        match self {
            OperatorRef::Builtin(k) => k,
            OperatorRef::Plugin(p) => p.as_ref(),
        }
    }
}

impl Operator for OperatorRef {
    fn get_name(&self) -> &str {
        self.inner().get_name()
    }

    fn get_arity(&self) -> usize {
        self.inner().get_arity()
    }

    fn validate(&self, app: &AppSyntax, program: &str, flags: &mut Vec<Flag>) -> bool {
        self.inner().validate(app, program, flags)
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>, args: &[Bindable]) -> Option<Term> {
        self.inner().evaluate(ctx, args)
    }

    fn constrain_application(&self, index: &TermIndex, args: &[Term]) -> Vec<SideConstraint> {
        self.inner().constrain_application(index, args)
    }

    fn approximate_up(&self, index: &TermIndex, args: &[Term]) -> Option<Vec<Term>> {
        self.inner().approximate_up(index, args)
    }

    fn approximate_down(
        &self,
        index: &TermIndex,
        expected: &Term,
        args: &[Term],
    ) -> Option<Vec<Term>> {
        self.inner().approximate_down(index, expected, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_and_arities() {
        assert_eq!(OpKind::Add.get_name(), "+");
        assert_eq!(OpKind::LstFind.arity(), 4);
        assert_eq!(OpKind::from_name("+"), Some(OpKind::Add));
        assert_eq!(OpKind::from_name(".."), None);
        assert_eq!(OpKind::from_name("strJoin"), Some(OpKind::StrJoin));
        assert!(OpKind::ALL.iter().all(|k| k.arity() > 0));
    }

    #[test]
    fn aggregates_take_comprehensions_last() {
        assert_eq!(OpKind::Sum.arg_shape(0), ArgShape::Forbidden);
        assert_eq!(OpKind::Sum.arg_shape(1), ArgShape::Required);
        assert_eq!(OpKind::Count.arg_shape(0), ArgShape::Required);
        assert_eq!(OpKind::ToList.arg_shape(2), ArgShape::Optional);
        assert_eq!(OpKind::ToOrdinal.arg_shape(0), ArgShape::Forbidden);
        assert_eq!(OpKind::Add.arg_shape(1), ArgShape::Forbidden);
    }
}
