use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use miette::GraphicalReportHandler;
use nom::{
    character::complete::{digit1, one_of},
    combinator::{map_res, opt, recognize},
    error::{FromExternalError, ParseError},
    sequence::pair,
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};

// Thanks to FasterThanLime! https://fasterthanli.me/series/advent-of-code-2022/part-11

pub const DEFAULT_INPUT: &str = "input";

pub type Span<'a> = LocatedSpan<&'a str>;

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("bad input")]
pub struct BadInput {
    #[source_code]
    src: String,

    #[label("{kind}")]
    bad_bit: miette::SourceSpan,

    kind: String,
}

/// Signed decimal integer, parsed into whatever `T` the caller asks for.
pub fn parse_number<'a, T, E>(i: Span<'a>) -> IResult<Span<'a>, T, E>
where
    T: FromStr,
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, T::Err>,
{
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |i: Span<'a>| {
        i.fragment().parse::<T>()
    })(i)
}

fn innermost(e: ErrorTree<Span<'_>>) -> Option<(usize, String)> {
    match e {
        GenericErrorTree::Base { location, kind } => {
            Some((location.location_offset(), kind.to_string()))
        }
        GenericErrorTree::Stack { base, .. } => innermost(*base),
        GenericErrorTree::Alt(alts) => alts.into_iter().find_map(innermost),
    }
}

/// Runs `parse_fun` over the whole of `l`. On failure the error message is a
/// rendered miette snippet pointing at the column where parsing stopped.
pub fn parse_nice<'a, T, F>(l: &'a str, parse_fun: F) -> Result<T>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(Span::new(l));
    let e = match line {
        Ok(line) => return Ok(line),
        Err(e) => e,
    };

    let (offset, kind) = innermost(e).unwrap_or((0, "unparseable".to_string()));
    let err = BadInput {
        src: l.to_string(),
        bad_bit: miette::SourceSpan::new(offset.into(), 0.into()),
        kind,
    };

    let mut s = String::new();
    match GraphicalReportHandler::new().render_report(&mut s, &err) {
        Ok(()) => Err(anyhow!(s)),
        Err(_) => Err(err.into()),
    }
}

/// First positional argument, or [`DEFAULT_INPUT`] when there is none.
pub fn input_path(mut args: impl Iterator<Item = String>) -> PathBuf {
    args.nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT))
}

pub fn read_input_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("unable to read input file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn number(i: Span) -> IResult<Span, i32, ErrorTree<Span>> {
        parse_number(i)
    }

    #[rstest]
    #[case("0", 0)]
    #[case("42", 42)]
    #[case("-17", -17)]
    #[case("+5", 5)]
    #[case("007", 7)]
    fn parse_number_ok(#[case] input: &str, #[case] expected: i32) {
        let res = parse_nice(input, number);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("x")]
    #[case("12a")]
    #[case("--3")]
    #[case("+-3")]
    #[case("+")]
    #[case("99999999999")]
    fn parse_number_bad(#[case] input: &str) {
        let res = parse_nice(input, number);
        assert!(res.is_err());
        assert!(res.unwrap_err().to_string().contains("bad input"));
    }

    #[test]
    fn innermost_points_at_trailing_garbage() {
        let e: Result<i32, ErrorTree<Span>> = final_parser(number)(Span::new("12a"));
        let (offset, _) = innermost(e.unwrap_err()).unwrap();
        assert_eq!(offset, 2);
    }

    #[test]
    fn input_path_default() {
        let path = input_path(["day2".to_string()].into_iter());
        assert_eq!(path, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn input_path_from_argument() {
        let path = input_path(["day2".to_string(), "other.txt".to_string()].into_iter());
        assert_eq!(path, PathBuf::from("other.txt"));
    }

    #[test]
    fn read_missing_file() {
        let res = read_input_file("definitely/not/here");
        assert!(res.is_err());
        assert!(res
            .unwrap_err()
            .to_string()
            .contains("unable to read input file definitely/not/here"));
    }
}
