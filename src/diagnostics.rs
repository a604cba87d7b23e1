use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// How bad a [Flag] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational.
    Info,
    /// Suspicious but not fatal.
    Warning,
    /// The program is rejected.
    Error,
}

/// The class of problem a [Flag] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Wrong arity or illegal comprehension placement.
    BadSyntax,
    /// A malformed identifier.
    BadId,
    /// An incompatible redefinition of a symbol.
    DuplicateDefs,
    /// A declaration names a symbol that does not exist.
    UndefinedSymbol,
    /// A union or field type without members.
    EmptyType,
}

/// A position in a source program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// 1-based line, 0 when unknown.
    pub line: usize,
    /// 1-based column, 0 when unknown.
    pub column: usize,
}

impl Location {
    /// Creates a location.
    pub fn new(line: usize, column: usize) -> Location {
        Location { line, column }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

/// A compiler diagnostic. Validators and namespace operations append these to a shared list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// How bad the problem is.
    pub severity: Severity,
    /// Where it happened.
    pub location: Location,
    /// A human readable description.
    pub message: String,
    /// The kind of problem.
    pub code: ErrorCode,
    /// The program the location refers to.
    pub program: String,
}

impl Flag {
    /// Creates an error flag.
    pub fn error(location: Location, message: String, code: ErrorCode, program: &str) -> Flag {
        Flag {
            severity: Severity::Error,
            location,
            message,
            code,
            program: program.to_owned(),
        }
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {:?} {:?}: {}",
            self.program, self.location, self.severity, self.code, self.message
        )
    }
}

/// Common message texts.
pub mod messages {
    /// Arity mismatch of an operator application.
    pub fn bad_arity(op: &str, expected: usize, found: usize) -> String {
        format!(
            "{} expects {} argument(s) but was given {}",
            op, expected, found
        )
    }

    /// A comprehension where a value is required.
    pub fn comprehension_forbidden(op: &str, pos: usize) -> String {
        format!(
            "{} does not accept a comprehension in argument {}",
            op,
            pos + 1
        )
    }

    /// A value where a comprehension is required.
    pub fn comprehension_required(op: &str, pos: usize) -> String {
        format!("{} requires a comprehension in argument {}", op, pos + 1)
    }

    /// An illegal identifier.
    pub fn bad_id(name: &str, kind: &str) -> String {
        format!("{} is not a legal {} name", name, kind)
    }

    /// An incompatible redefinition.
    pub fn duplicate_def(name: &str, ns: &str) -> String {
        if ns.is_empty() {
            format!("{} has multiple incompatible definitions", name)
        } else {
            format!("{} has multiple incompatible definitions in {}", name, ns)
        }
    }

    /// An undefined name in a declaration.
    pub fn undefined_symbol(name: &str, user: &str) -> String {
        format!("{} used in the definition of {} is undefined", name, user)
    }
}
