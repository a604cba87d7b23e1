use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{App, Arg};
use formula_core::operators::{OpKind, Operator, OperatorRef};
use formula_core::plugins::{self, stock, PluginRegistry};
use formula_core::symbols::names::parse_qualified_name;
use formula_core::symbols::table::SymbolTable;
use formula_core::terms::{Term, TermIndex};
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, separated_pair};
use nom::IResult;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

/// One component of a type written on the command line.
#[derive(Debug, Clone, PartialEq)]
enum Component {
    Number(BigRational),
    Range(BigInt, BigInt),
    Str(String),
    Name(String),
}

fn parse_int(input: &str) -> IResult<&str, BigInt> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<BigInt>()
    })(input)
}

fn parse_number(input: &str) -> IResult<&str, BigRational> {
    map_res(
        pair(parse_int, opt(preceded(char('/'), parse_int))),
        |(n, d)| match d {
            Some(d) if d.is_zero() => Err("zero denominator"),
            Some(d) => Ok(BigRational::new(n, d)),
            None => Ok(BigRational::from_integer(n)),
        },
    )(input)
}

fn parse_component(input: &str) -> IResult<&str, Component> {
    alt((
        map(separated_pair(parse_int, tag(".."), parse_int), |(lo, hi)| {
            Component::Range(lo, hi)
        }),
        map(parse_number, Component::Number),
        map(
            delimited(char('"'), opt(is_not("\"")), char('"')),
            |s: Option<&str>| Component::Str(s.unwrap_or_default().to_owned()),
        ),
        map(
            recognize(pair(opt(char('#')), parse_qualified_name)),
            |s: &str| Component::Name(s.to_owned()),
        ),
    ))(input)
}

/// Parses `A + B + ...`.
fn parse_type(input: &str) -> IResult<&str, Vec<Component>> {
    delimited(
        multispace0,
        separated_list1(delimited(multispace0, char('+'), multispace0), parse_component),
        multispace0,
    )(input)
}

fn component_term(index: &TermIndex, c: &Component) -> anyhow::Result<Term> {
    Ok(match c {
        Component::Number(r) => index.mk_numeric(r.clone()),
        Component::Range(lo, hi) if lo <= hi => index.mk_range(lo.clone(), hi.clone()),
        Component::Range(lo, hi) => return Err(anyhow!("empty range {}..{}", lo, hi)),
        Component::Str(s) => index.mk_string(s),
        Component::Name(n) => {
            let symbol = index
                .symbols()
                .resolve(n)
                .ok_or_else(|| anyhow!("unknown name {}", n))?;
            index
                .get_canonical_term(&symbol, None)
                .ok_or_else(|| anyhow!("{} does not name a type", n))?
        }
    })
}

fn type_term(index: &TermIndex, text: &str) -> anyhow::Result<Term> {
    let (_, comps) = all_consuming(parse_type)(text)
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("malformed type {}", text))?;
    let mut res: Option<Term> = None;
    for c in comps.iter() {
        let t = component_term(index, c)?;
        res = Some(match res {
            Some(acc) => index.mk_union(&acc, &t),
            None => t,
        });
    }
    res.ok_or_else(|| anyhow!("empty type"))
}

fn find_operator(registry: &PluginRegistry, name: &str) -> Option<OperatorRef> {
    OpKind::from_name(name)
        .filter(|k| !k.is_reserved())
        .map(OperatorRef::Builtin)
        .or_else(|| registry.find(name).map(OperatorRef::Plugin))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = App::new("approximate")
        .about("Prints the type approximation of an operator")
        .arg(Arg::with_name("op").required(true).index(1))
        .arg(
            Arg::with_name("types")
                .required(true)
                .multiple(true)
                .index(2),
        )
        .arg(
            Arg::with_name("down")
                .long("down")
                .help("Approximate downward from the last type as the expected result"),
        )
        .arg(
            Arg::with_name("plugins")
                .long("plugins")
                .takes_value(true)
                .help("Plugin directories separated by ;"),
        )
        .get_matches();

    let op_name = matches.value_of("op").unwrap();
    let type_texts: Vec<&str> = matches.values_of("types").unwrap().collect();

    let dirs: Vec<PathBuf> = match matches.value_of("plugins") {
        Some(d) => plugins::parse_plugin_dirs(d),
        None => plugins::plugin_dirs_from_env(),
    };
    let registry = Arc::new(PluginRegistry::new(
        Box::new(plugins::loader::ManifestLoader::new(stock::catalog())),
        dirs,
    ));

    let mut flags = Vec::new();
    let table = SymbolTable::new("approximate", registry.clone());
    let index = TermIndex::new(table, &mut flags)
        .ok_or_else(|| anyhow!("unable to build the term index: {:?}", flags))?;

    let op = find_operator(&registry, op_name)
        .ok_or_else(|| anyhow!("unknown operator {}", op_name))?;

    let mut types = type_texts
        .iter()
        .map(|t| type_term(&index, t))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if matches.is_present("down") {
        let expected = types
            .pop()
            .ok_or_else(|| anyhow!("--down needs an expected type"))?;
        match op.approximate_down(&index, &expected, &types) {
            Some(args) => {
                for a in args.iter() {
                    println!("{}", a);
                }
            }
            None => println!("no arguments produce {}", expected),
        }
    } else {
        if types.len() != op.get_arity() {
            return Err(anyhow!(
                "{} takes {} arguments, got {}",
                op.get_name(),
                op.get_arity(),
                types.len()
            ));
        }
        match op.approximate_up(&index, &types) {
            Some(res) => println!("{}", res[0]),
            None => println!("no result"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_unions() {
        let (rest, comps) = parse_type(" Natural + -2..5 + \"ab\" + 1/2 + #Color").unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            comps,
            vec![
                Component::Name("Natural".to_owned()),
                Component::Range(BigInt::from(-2), BigInt::from(5)),
                Component::Str("ab".to_owned()),
                Component::Number(BigRational::new(1.into(), 2.into())),
                Component::Name("#Color".to_owned()),
            ]
        );
    }

    #[test]
    fn builds_types() {
        let table = SymbolTable::new("t", Arc::new(PluginRegistry::empty()));
        let index = TermIndex::new(table, &mut Vec::new()).unwrap();
        assert_eq!(type_term(&index, "3 + 4").unwrap().to_string(), "3..4");
        assert!(type_term(&index, "5..2").is_err());
        assert!(type_term(&index, "1/0").is_err());
        assert!(type_term(&index, "Nowhere").is_err());
    }
}
