use std::fmt::{self, Display};
use std::num::ParseIntError;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, digit1};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::multi::{many0_count, separated_list1};
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

/// The character separating namespace names in a qualified name.
pub const NAME_SEPARATOR: char = '.';

/// The prefix of every type constant.
pub const TYPE_CNST_PREFIX: &str = "#";

/// Parses an identifier, `[A-Za-z_][A-Za-z0-9_']*`.
pub fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_"), tag("'")))),
    ))(input)
}

/// Parses a dot separated sequence of identifiers.
pub fn parse_qualified_name(input: &str) -> IResult<&str, &str> {
    recognize(separated_list1(tag("."), parse_identifier))(input)
}

/// True if the whole string is a legal identifier.
pub fn is_identifier(name: &str) -> bool {
    all_consuming(parse_identifier)(name).is_ok()
}

/// Splits `A.B.c` into `["A", "B", "c"]`.
pub fn split_dotted(name: &str) -> Vec<&str> {
    name.split(NAME_SEPARATOR).collect()
}

/// Joins names with the separator, skipping empty parts so the root contributes nothing.
pub fn join_dotted<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut res = String::new();
    for p in parts.into_iter().filter(|p| !p.is_empty()) {
        if !res.is_empty() {
            res.push(NAME_SEPARATOR);
        }
        res.push_str(p);
    }
    res
}

/// The decoded form of a type constant name, `#Name` or `#Name[index]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeCnstName {
    /// The (possibly qualified) name of the sort, union, constructor or map.
    pub name: String,
    /// The argument position, for constructors and maps.
    pub index: Option<usize>,
}

fn parse_index(input: &str) -> IResult<&str, usize> {
    map_res::<_, _, _, _, ParseIntError, _, _>(
        delimited(tag("["), digit1, tag("]")),
        |d: &str| d.parse::<usize>(),
    )(input)
}

/// Parses a type constant name.
pub fn parse_type_cnst_name(input: &str) -> IResult<&str, TypeCnstName> {
    map(
        preceded(
            tag(TYPE_CNST_PREFIX),
            pair(parse_qualified_name, opt(parse_index)),
        ),
        |(name, index)| TypeCnstName {
            name: name.to_owned(),
            index,
        },
    )(input)
}

impl TypeCnstName {
    /// A reference to the whole type.
    pub fn new(name: &str) -> TypeCnstName {
        TypeCnstName {
            name: name.to_owned(),
            index: None,
        }
    }

    /// A reference to the type of argument `index`.
    pub fn with_index(name: &str, index: usize) -> TypeCnstName {
        TypeCnstName {
            name: name.to_owned(),
            index: Some(index),
        }
    }

    /// Decodes a complete type constant name.
    pub fn parse(s: &str) -> Option<TypeCnstName> {
        all_consuming(parse_type_cnst_name)(s)
            .ok()
            .map(|(_, res)| res)
    }
}

impl Display for TypeCnstName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TYPE_CNST_PREFIX, self.name)?;
        if let Some(i) = self.index {
            write!(f, "[{}]", i)?;
        }
        Ok(())
    }
}
