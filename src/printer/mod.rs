//! Rendering conjectures as text
//!
//! Readable output writes one conjecture per line in infix form. Stack
//! output writes each conjecture as a postorder token list, one token per
//! line, followed by the main invariant, the comparator and an empty line,
//! so a consumer can rebuild it with a plain operand stack.

use std::io::{self, Write};

use crate::semantics::{Dataset, InvariantValue, OperatorTable};
use crate::tree::{Expression, LabelKind};

/// Output style for conjectures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Readable,
    Stack,
}

/// Renders expressions over one dataset's invariants
#[derive(Debug)]
pub struct ExpressionPrinter<V: 'static> {
    table: &'static OperatorTable<V>,
    names: Vec<String>,
    main: usize,
    comparator: &'static str,
}

impl<V: 'static> ExpressionPrinter<V> {
    /// Invariants without names are called `I1`, `I2`, ...
    pub fn new(
        table: &'static OperatorTable<V>,
        names: Option<&[String]>,
        invariant_count: usize,
        main: usize,
        comparator: &'static str,
    ) -> Self {
        let names = match names {
            Some(names) => names.to_vec(),
            None => (1..=invariant_count).map(|i| format!("I{}", i)).collect(),
        };
        Self {
            table,
            names,
            main,
            comparator,
        }
    }

    pub fn for_dataset(
        table: &'static OperatorTable<V>,
        dataset: &Dataset<V>,
        comparator: &'static str,
    ) -> Self
    where
        V: InvariantValue,
    {
        Self::new(
            table,
            dataset.names(),
            dataset.invariant_count(),
            dataset.main_invariant(),
            comparator,
        )
    }

    pub fn main_name(&self) -> &str {
        &self.names[self.main]
    }

    /// Fully parenthesised infix form of `expression`.
    pub fn infix(&self, expression: &Expression) -> String {
        let mut operands: Vec<String> = Vec::with_capacity(expression.len());
        for &label in expression.labels() {
            let text = match label.kind {
                LabelKind::Invariant => self.names[label.id].clone(),
                LabelKind::Unary => {
                    let notation = self.table.notation(label);
                    let operand = pop(&mut operands);
                    format!("{}{}{}", notation.open, operand, notation.close)
                }
                LabelKind::CommutativeBinary | LabelKind::NonCommutativeBinary => {
                    let notation = self.table.notation(label);
                    let right = pop(&mut operands);
                    let left = pop(&mut operands);
                    format!(
                        "{}{}{}{}{}",
                        notation.open, left, notation.middle, right, notation.close
                    )
                }
            };
            operands.push(text);
        }
        pop(&mut operands)
    }

    /// `<expression> <comparator> <main invariant>`
    pub fn conjecture(&self, expression: &Expression) -> String {
        format!(
            "{} {} {}",
            self.infix(expression),
            self.comparator,
            self.main_name()
        )
    }

    /// Postorder tokens, main invariant and comparator, one per line, ending
    /// with an empty line.
    pub fn stack(&self, expression: &Expression) -> String {
        let mut out = String::new();
        for &label in expression.labels() {
            match label.kind {
                LabelKind::Invariant => out.push_str(&self.names[label.id]),
                _ => out.push_str(self.table.notation(label).token),
            }
            out.push('\n');
        }
        out.push_str(self.main_name());
        out.push('\n');
        out.push_str(self.comparator);
        out.push_str("\n\n");
        out
    }

    pub fn write_all<W: Write>(
        &self,
        out: &mut W,
        conjectures: &[Expression],
        format: OutputFormat,
    ) -> io::Result<()> {
        for conjecture in conjectures {
            match format {
                OutputFormat::Readable => writeln!(out, "{}", self.conjecture(conjecture))?,
                OutputFormat::Stack => write!(out, "{}", self.stack(conjecture))?,
            }
        }
        out.flush()
    }
}

fn pop(operands: &mut Vec<String>) -> String {
    match operands.pop() {
        Some(operand) => operand,
        None => panic!("expression is missing an operand"),
    }
}
