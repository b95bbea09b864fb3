//! Text parsers for operator tables and datasets
//!
//! Both formats are whitespace separated. A dataset starts with the header
//! `objects invariants main` (main is 1-based), optionally followed by one
//! invariant name per line and one known-theory value per object, and ends
//! with the invariant values of every object in object-major order.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ConjectureError, Result};
use crate::semantics::{
    check_dimensions, Dataset, InvariantValue, OperatorSet, OperatorTable, TriState,
    NUMERIC_OPERATORS, PROPERTY_OPERATORS,
};
use crate::tree::{ContentLabel, LabelKind};

/// Part of the input a parse error was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    OperatorTable,
    Header,
    InvariantNames,
    KnownTheory,
    /// Invariant values of the object with this 1-based index
    Object(usize),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::OperatorTable => write!(f, "operator table"),
            Section::Header => write!(f, "dataset header"),
            Section::InvariantNames => write!(f, "invariant names"),
            Section::KnownTheory => write!(f, "known theory"),
            Section::Object(object) => write!(f, "values of object {}", object),
        }
    }
}

/// Malformed input, located by section, line and (for tokens) column
#[derive(Debug, Clone)]
pub struct ParseError {
    pub section: Section,
    pub line_number: usize,
    pub column: Option<usize>,
    pub message: String,
    pub source_line: String,
}

impl ParseError {
    pub fn new(
        section: Section,
        line_number: usize,
        message: impl Into<String>,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            section,
            line_number,
            column: None,
            message: message.into(),
            source_line: source_line.into(),
        }
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line_number)?;
        if let Some(column) = self.column {
            write!(f, ", column {}", column)?;
        }
        write!(
            f,
            " ({}): {}\n  | {}",
            self.section, self.message, self.source_line
        )?;
        if let Some(column) = self.column {
            write!(f, "\n  | {}^", " ".repeat(column.saturating_sub(1)))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Which optional dataset sections are present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetOptions {
    /// One name line per invariant follows the header
    pub invariant_names: bool,
    /// One known-theory value per object follows the names
    pub known_theory: bool,
}

/// A whitespace-delimited token and where it came from
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    section: Section,
    line_number: usize,
    line: &'a str,
    column: usize,
}

impl Token<'_> {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.section, self.line_number, message, self.line).at_column(self.column)
    }
}

/// Walks the input token by token, or line by line for name sections.
struct Cursor<'a> {
    lines: Vec<&'a str>,
    line: usize,
    column: usize,
    section: Section,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, section: Section) -> Self {
        Self {
            lines: text.lines().collect(),
            line: 0,
            column: 0,
            section,
        }
    }

    fn enter(&mut self, section: Section) {
        self.section = section;
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        while self.line < self.lines.len() {
            let text = self.lines[self.line];
            let rest = &text[self.column..];
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                self.line += 1;
                self.column = 0;
                continue;
            }
            let start = self.column + (rest.len() - trimmed.len());
            let len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            self.column = start + len;
            return Some(Token {
                text: &text[start..start + len],
                section: self.section,
                line_number: self.line + 1,
                line: text,
                column: start + 1,
            });
        }
        None
    }

    /// Next non-blank line that has not been started yet, trimmed.
    fn next_line(&mut self) -> std::result::Result<Option<(usize, &'a str)>, ParseError> {
        if self.column > 0 {
            let text = self.lines[self.line];
            if !text[self.column..].trim().is_empty() {
                return Err(ParseError::new(
                    self.section,
                    self.line + 1,
                    "unexpected trailing input",
                    text,
                )
                .at_column(self.column + 1));
            }
            self.line += 1;
            self.column = 0;
        }
        while self.line < self.lines.len() {
            let text = self.lines[self.line];
            self.line += 1;
            if !text.trim().is_empty() {
                return Ok(Some((self.line, text.trim())));
            }
        }
        Ok(None)
    }

    fn end_of_input(&self, expected: &str) -> ParseError {
        let last = self.lines.len().max(1);
        let content = self.lines.last().copied().unwrap_or("");
        ParseError::new(
            self.section,
            last,
            format!("unexpected end of input, expected {}", expected),
            content,
        )
    }

    fn expect_token(&mut self, expected: &str) -> std::result::Result<Token<'a>, ParseError> {
        match self.next_token() {
            Some(token) => Ok(token),
            None => Err(self.end_of_input(expected)),
        }
    }

    fn expect_count(&mut self, expected: &str) -> std::result::Result<usize, ParseError> {
        let token = self.expect_token(expected)?;
        token
            .text
            .parse::<usize>()
            .map_err(|_| token.error(format!("expected {}, found '{}'", expected, token.text)))
    }

    fn expect_value<V>(&mut self, expected: &str) -> std::result::Result<V, ParseError>
    where
        V: FromStr,
        V::Err: fmt::Display,
    {
        let token = self.expect_token(expected)?;
        token
            .text
            .parse::<V>()
            .map_err(|e| token.error(format!("invalid {} '{}': {}", expected, token.text, e)))
    }

    fn finish(&mut self) -> std::result::Result<(), ParseError> {
        match self.next_token() {
            Some(token) => Err(token.error(format!("unexpected trailing input '{}'", token.text))),
            None => Ok(()),
        }
    }
}

fn parse_kind(text: &str) -> Option<LabelKind> {
    match text.to_lowercase().as_str() {
        "u" | "unary" => Some(LabelKind::Unary),
        "c" | "commutative-binary" => Some(LabelKind::CommutativeBinary),
        "n" | "noncommutative-binary" => Some(LabelKind::NonCommutativeBinary),
        _ => None,
    }
}

fn read_operator_table<V: 'static>(
    cursor: &mut Cursor<'_>,
    table: &OperatorTable<V>,
) -> Result<OperatorSet> {
    cursor.enter(Section::OperatorTable);
    let count = cursor.expect_count("operator count")?;

    let mut operators = OperatorSet::default();
    for _ in 0..count {
        let token = cursor.expect_token("operator")?;
        let label = match parse_kind(token.text) {
            Some(kind) => {
                let id = cursor.expect_count("operator id")?;
                ContentLabel::new(kind, id)
            }
            None => table
                .find_token(token.text)
                .ok_or_else(|| token.error(format!("unknown operator '{}'", token.text)))?,
        };
        operators.insert(label.kind, label.id);
    }

    operators.validate(table)?;
    Ok(operators)
}

fn read_dataset<V>(
    cursor: &mut Cursor<'_>,
    options: &DatasetOptions,
    value_name: &str,
) -> Result<Dataset<V>>
where
    V: InvariantValue + FromStr,
    V::Err: fmt::Display,
{
    cursor.enter(Section::Header);
    let objects = cursor.expect_count("object count")?;
    let invariants = cursor.expect_count("invariant count")?;
    let main_token = cursor.expect_token("main invariant")?;
    let main = match main_token.text.parse::<usize>() {
        Ok(main) if main >= 1 => main - 1,
        _ => {
            return Err(main_token
                .error(format!(
                    "main invariant must be a 1-based index, found '{}'",
                    main_token.text
                ))
                .into())
        }
    };
    check_dimensions(objects, invariants, main)?;

    let mut names = Vec::new();
    if options.invariant_names {
        cursor.enter(Section::InvariantNames);
        names.reserve(invariants);
        for _ in 0..invariants {
            match cursor.next_line()? {
                Some((_, name)) => names.push(name.to_string()),
                None => return Err(cursor.end_of_input("invariant name").into()),
            }
        }
    }

    let mut theory = Vec::new();
    if options.known_theory {
        cursor.enter(Section::KnownTheory);
        theory.reserve(objects);
        for _ in 0..objects {
            theory.push(cursor.expect_value::<V>(&format!("known theory {}", value_name))?);
        }
    }

    let mut values = Vec::with_capacity((objects * invariants).min(1 << 20));
    for object in 0..objects {
        cursor.enter(Section::Object(object + 1));
        for _ in 0..invariants {
            values.push(cursor.expect_value::<V>(value_name)?);
        }
    }

    let mut dataset = Dataset::new(objects, invariants, main, values)?;
    if options.invariant_names {
        dataset = dataset.with_names(names)?;
    }
    if options.known_theory {
        dataset = dataset.with_theory(theory)?;
    }
    Ok(dataset)
}

/// Parse an operator selection: a count followed by that many records.
///
/// A record is either a kind and an id (`U 3`, `commutative-binary 0`) or
/// the operator's stack token (`/2`, `max`).
pub fn parse_operator_table<V: 'static>(text: &str, table: &OperatorTable<V>) -> Result<OperatorSet> {
    let mut cursor = Cursor::new(text, Section::OperatorTable);
    let operators = read_operator_table(&mut cursor, table)?;
    cursor.finish()?;
    Ok(operators)
}

fn parse_dataset<V>(text: &str, options: &DatasetOptions, value_name: &str) -> Result<Dataset<V>>
where
    V: InvariantValue + FromStr,
    V::Err: fmt::Display,
{
    let mut cursor = Cursor::new(text, Section::Header);
    let dataset = read_dataset(&mut cursor, options, value_name)?;
    cursor.finish()?;
    Ok(dataset)
}

fn parse_input<V>(
    text: &str,
    table: &OperatorTable<V>,
    options: &DatasetOptions,
    value_name: &str,
) -> Result<(OperatorSet, Dataset<V>)>
where
    V: InvariantValue + FromStr + 'static,
    V::Err: fmt::Display,
{
    let mut cursor = Cursor::new(text, Section::OperatorTable);
    let operators = read_operator_table(&mut cursor, table)?;
    let dataset = read_dataset(&mut cursor, options, value_name)?;
    cursor.finish()?;
    Ok((operators, dataset))
}

/// Parse a dataset of real-valued invariants (`nan` marks a missing value).
pub fn parse_numeric_dataset(text: &str, options: &DatasetOptions) -> Result<Dataset<f64>> {
    parse_dataset(text, options, "number")
}

/// Parse a dataset of properties (`1`, `0`, or `-1` for undefined).
pub fn parse_property_dataset(text: &str, options: &DatasetOptions) -> Result<Dataset<TriState>> {
    parse_dataset(text, options, "property value")
}

/// Parse an operator selection directly followed by a numeric dataset.
pub fn parse_numeric_input(
    text: &str,
    options: &DatasetOptions,
) -> Result<(OperatorSet, Dataset<f64>)> {
    parse_input(text, &NUMERIC_OPERATORS, options, "number")
}

/// Parse an operator selection directly followed by a property dataset.
pub fn parse_property_input(
    text: &str,
    options: &DatasetOptions,
) -> Result<(OperatorSet, Dataset<TriState>)> {
    parse_input(text, &PROPERTY_OPERATORS, options, "property value")
}

/// Read a whole input file, or standard input for `-`.
pub fn read_source(path: &Path) -> Result<String> {
    let mut content = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| ConjectureError::io(path, e))?;
    } else {
        content = std::fs::read_to_string(path).map_err(|e| ConjectureError::io(path, e))?;
    }
    Ok(content)
}
