//! Formula abstract syntax tree.
//!
//! An [`Ast`] is built once by the parser and never mutated. Cell references
//! inside it are stored relative to the cell the formula was entered into, so
//! the same tree can be rendered for any other base cell with [`Ast::to_text`].
//!
//! Every walk over the tree (evaluation, rendering, reference collection) goes
//! through [`AstVisitor`] and [`Ast::fold`].

use std::sync::Arc;

use super::cell_ref::{CellRef, Position};
use super::format::format_number;

/// Precedence of leaves, function calls and unary minus.
const MAX_PREC: u8 = 100;

/// Rendered in place of an infinite literal; it scans back to infinity.
const OVERFLOW_LITERAL: &str = "1e999";

/// The functions a formula may apply.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Min => "min",
            Op::Max => "max",
        }
    }

    /// `min` and `max` are written as calls; the rest are infix operators.
    pub fn is_function(self) -> bool {
        matches!(self, Op::Min | Op::Max)
    }

    pub fn from_function_name(name: &str) -> Option<Op> {
        match name {
            "min" => Some(Op::Min),
            "max" => Some(Op::Max),
            _ => None,
        }
    }

    pub(crate) fn from_punct(c: char) -> Option<Op> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' => Some(Op::Mul),
            '/' => Some(Op::Div),
            _ => None,
        }
    }

    fn prec(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 10,
            Op::Mul | Op::Div => 20,
            Op::Min | Op::Max => MAX_PREC,
        }
    }

    /// Apply this function to already-evaluated arguments.
    ///
    /// Division follows IEEE rules, so `1/0` is infinite and `0/0` is NaN.
    pub fn apply(self, args: &[f64]) -> f64 {
        match (self, args) {
            (Op::Sub, [a]) => -a,
            (Op::Add, [a, b]) => a + b,
            (Op::Sub, [a, b]) => a - b,
            (Op::Mul, [a, b]) => a * b,
            (Op::Div, [a, b]) => a / b,
            (Op::Min, [first, rest @ ..]) => rest.iter().fold(*first, |acc, &x| {
                if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.min(x) }
            }),
            (Op::Max, [first, rest @ ..]) => rest.iter().fold(*first, |acc, &x| {
                if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.max(x) }
            }),
            // Arity is fixed by the parser.
            _ => f64::NAN,
        }
    }
}

/// A parsed formula.
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    Num(f64),
    Ref(CellRef),
    App { op: Op, kids: Arc<[Ast]> },
}

/// A bottom-up walk over an [`Ast`]: children are visited before their parent.
pub trait AstVisitor {
    type Output;

    fn visit_num(&mut self, value: f64) -> Self::Output;
    fn visit_ref(&mut self, cell_ref: &CellRef) -> Self::Output;
    fn visit_app(&mut self, op: Op, kids: Vec<Self::Output>) -> Self::Output;
}

impl Ast {
    pub fn app(op: Op, kids: Vec<Ast>) -> Ast {
        Ast::App {
            op,
            kids: kids.into(),
        }
    }

    pub fn fold<V: AstVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Ast::Num(value) => visitor.visit_num(*value),
            Ast::Ref(cell_ref) => visitor.visit_ref(cell_ref),
            Ast::App { op, kids } => {
                let kids = kids.iter().map(|kid| kid.fold(visitor)).collect();
                visitor.visit_app(*op, kids)
            }
        }
    }

    /// Render with minimal parentheses, relative references rebased to `base`.
    pub fn to_text(&self, base: Position) -> String {
        self.fold(&mut TextRenderer { base }).text
    }

    /// Every in-range cell this formula references when entered into `base`.
    pub fn references(&self, base: Position) -> Vec<Position> {
        let mut collector = RefCollector {
            base,
            refs: Vec::new(),
        };
        self.fold(&mut collector);
        collector.refs
    }
}

struct Rendered {
    text: String,
    prec: u8,
}

impl Rendered {
    fn wrapped(&self, paren: bool) -> String {
        if paren {
            format!("({})", self.text)
        } else {
            self.text.clone()
        }
    }
}

struct TextRenderer {
    base: Position,
}

impl AstVisitor for TextRenderer {
    type Output = Rendered;

    fn visit_num(&mut self, value: f64) -> Rendered {
        // A literal too large for f64 parsed as infinity; write one back.
        let text = if value == f64::INFINITY {
            OVERFLOW_LITERAL.to_string()
        } else {
            format_number(value)
        };
        Rendered {
            text,
            prec: MAX_PREC,
        }
    }

    fn visit_ref(&mut self, cell_ref: &CellRef) -> Rendered {
        Rendered {
            text: cell_ref.to_text(self.base),
            prec: MAX_PREC,
        }
    }

    fn visit_app(&mut self, op: Op, kids: Vec<Rendered>) -> Rendered {
        let text = match (op, kids.as_slice()) {
            (Op::Sub, [operand]) => format!("-{}", operand.wrapped(operand.prec < MAX_PREC)),
            (op, [lhs, rhs]) if !op.is_function() => format!(
                "{}{}{}",
                lhs.wrapped(lhs.prec < op.prec()),
                op.symbol(),
                rhs.wrapped(rhs.prec <= op.prec())
            ),
            (op, args) => {
                let args: Vec<&str> = args.iter().map(|a| a.text.as_str()).collect();
                format!("{}({})", op.symbol(), args.join(", "))
            }
        };
        let prec = match (op, kids.len()) {
            (Op::Sub, 1) => MAX_PREC,
            _ => op.prec(),
        };
        Rendered { text, prec }
    }
}

struct RefCollector {
    base: Position,
    refs: Vec<Position>,
}

impl AstVisitor for RefCollector {
    type Output = ();

    fn visit_num(&mut self, _value: f64) {}

    fn visit_ref(&mut self, cell_ref: &CellRef) {
        if let Some(pos) = cell_ref.resolve(self.base) {
            self.refs.push(pos);
        }
    }

    fn visit_app(&mut self, _op: Op, _kids: Vec<()>) {}
}
