use crate::error::{RecurError, Result};
use crate::schedule::Schedule;
use crate::store::Store;
use pest::iterators::Pairs;
use pest::Parser;

use std::path::Path;

#[derive(Parser)]
#[grammar = "recurring.pest"]
pub struct RecurringParser;

/// Pieces of a template header line, borrowed from the line itself.
#[derive(Debug, PartialEq)]
pub struct Header<'h> {
    pub date: &'h str,
    pub separator: &'h str,
    pub period: &'h str,
    /// Everything after the closing parenthesis, line terminator included.
    pub rest: &'h str,
}

/// Splits a config line into header pieces, `None` when the line does not
/// open a template.
pub fn parse_header(line: &str) -> Result<Option<Header<'_>>> {
    let header = match RecurringParser::parse(Rule::header, line) {
        Ok(mut pairs) => pairs
            .next()
            .ok_or_else(|| RecurError::parse(format!("empty header: '{}'", line)))?,
        // The grammar only matches header lines, any other line is body text.
        Err(_) => return Ok(None),
    };

    let consumed = header.as_span().end();
    let mut pieces = header.into_inner();
    Ok(Some(Header {
        date: next_str(&mut pieces, line)?,
        separator: next_str(&mut pieces, line)?,
        period: next_str(&mut pieces, line)?,
        rest: &line[consumed..],
    }))
}

fn next_str<'h>(pairs: &mut Pairs<'h, Rule>, line: &str) -> Result<&'h str> {
    pairs
        .next()
        .map(|pair| pair.as_str())
        .ok_or_else(|| RecurError::parse(format!("incomplete header: '{}'", line)))
}

/// Parses config text. Reading from disk is left to [`parse_file`].
pub fn parse(input: &str) -> Result<Schedule> {
    Schedule::from_lines(input.split_inclusive('\n'))
}

pub fn parse_file(path: &Path, store: &dyn Store) -> Result<Schedule> {
    Schedule::from_lines(store.read_lines(path)?)
}
