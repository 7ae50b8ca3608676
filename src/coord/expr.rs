//! Numeric expressions that evaluate either as scalars or as SQL
//!
//! [`Numeric`] is the small arithmetic surface the geodesic formulas need.
//! `f64` implements it by computing directly; [`Expr`] implements it by
//! building a tree that renders to an SQL fragment. Sub-expressions made
//! only of literals are folded while the tree is built, so a formula over a
//! fixed center point renders with its trigonometry on the center already
//! evaluated.

use std::collections::HashMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Arithmetic needed by the geodesic formulas
pub trait Numeric:
    Clone
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn lit(value: f64) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn sqrt(self) -> Self;
    fn to_radians(self) -> Self;
    fn to_degrees(self) -> Self;
    /// Four-quadrant arctangent of `self / x`
    fn atan2(self, x: Self) -> Self;
    /// Euclidean remainder, always in `[0, modulus)`
    fn modulo(self, modulus: f64) -> Self;
    /// `then` when `self >= 0`, otherwise `otherwise`
    fn if_non_negative(self, then: Self, otherwise: Self) -> Self;
}

impl Numeric for f64 {
    fn lit(value: f64) -> Self {
        value
    }
    fn sin(self) -> Self {
        f64::sin(self)
    }
    fn cos(self) -> Self {
        f64::cos(self)
    }
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    fn to_radians(self) -> Self {
        f64::to_radians(self)
    }
    fn to_degrees(self) -> Self {
        f64::to_degrees(self)
    }
    fn atan2(self, x: Self) -> Self {
        f64::atan2(self, x)
    }
    fn modulo(self, modulus: f64) -> Self {
        self.rem_euclid(modulus)
    }
    fn if_non_negative(self, then: Self, otherwise: Self) -> Self {
        if self >= 0.0 {
            then
        } else {
            otherwise
        }
    }
}

/// A source of named column values for in-memory evaluation
pub trait Row {
    fn value(&self, column: &str) -> Option<f64>;
}

impl Row for HashMap<String, f64> {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column).copied()
    }
}

impl Row for HashMap<&str, f64> {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column).copied()
    }
}

/// Single-argument SQL functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Sqrt,
    Radians,
    Degrees,
}

impl Func {
    fn apply(self, v: f64) -> f64 {
        match self {
            Self::Sin => v.sin(),
            Self::Cos => v.cos(),
            Self::Sqrt => v.sqrt(),
            Self::Radians => v.to_radians(),
            Self::Degrees => v.to_degrees(),
        }
    }

    fn sql_name(self) -> &'static str {
        match self {
            Self::Sin => "SIN",
            Self::Cos => "COS",
            Self::Sqrt => "SQRT",
            Self::Radians => "RADIANS",
            Self::Degrees => "DEGREES",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    fn apply(self, l: f64, r: f64) -> f64 {
        match self {
            Self::Add => l + r,
            Self::Sub => l - r,
            Self::Mul => l * r,
            Self::Div => l / r,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// A numeric SQL expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Literal(f64),
    Column(String),
    Neg(Box<Expr>),
    Call(Func, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Atan2(Box<Expr>, Box<Expr>),
    Modulo(Box<Expr>, f64),
    NonNegative {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    pub fn as_literal(&self) -> Option<f64> {
        match self {
            Self::Literal(v) => Some(*v),
            _ => None,
        }
    }

    fn call(func: Func, arg: Expr) -> Self {
        match arg.as_literal() {
            Some(v) => Self::Literal(func.apply(v)),
            None => Self::Call(func, Box::new(arg)),
        }
    }

    fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        match (left.as_literal(), right.as_literal()) {
            (Some(l), Some(r)) => Self::Literal(op.apply(l, r)),
            _ => Self::Binary(op, Box::new(left), Box::new(right)),
        }
    }

    /// Evaluate against a row; `None` wherever SQL would yield NULL
    pub fn eval(&self, row: &dyn Row) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Literal(v) => Some(*v),
            Self::Column(name) => row.value(name),
            Self::Neg(e) => e.eval(row).map(|v| -v),
            Self::Call(func, e) => e.eval(row).map(|v| func.apply(v)),
            Self::Binary(op, l, r) => Some(op.apply(l.eval(row)?, r.eval(row)?)),
            Self::Atan2(y, x) => Some(y.eval(row)?.atan2(x.eval(row)?)),
            Self::Modulo(e, m) => e.eval(row).map(|v| v.rem_euclid(*m)),
            Self::NonNegative {
                test,
                then,
                otherwise,
            } => {
                if test.eval(row)? >= 0.0 {
                    then.eval(row)
                } else {
                    otherwise.eval(row)
                }
            }
        }
    }

    /// Render as an SQL fragment
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Literal(v) => literal_sql(*v),
            Self::Column(name) => name.clone(),
            Self::Neg(e) => format!("(-{})", e.to_sql()),
            Self::Call(func, e) => format!("{}({})", func.sql_name(), e.to_sql()),
            Self::Binary(op, l, r) => {
                format!("({} {} {})", l.to_sql(), op.symbol(), r.to_sql())
            }
            Self::Atan2(y, x) => format!("ATAN2({}, {})", y.to_sql(), x.to_sql()),
            Self::Modulo(e, m) => {
                format!("MOD(CAST({} AS DECIMAL), {})", e.to_sql(), literal_sql(*m))
            }
            Self::NonNegative {
                test,
                then,
                otherwise,
            } => format!(
                "CASE WHEN {} >= 0 THEN {} ELSE {} END",
                test.to_sql(),
                then.to_sql(),
                otherwise.to_sql()
            ),
        }
    }
}

/// Negative literals are parenthesized so `a - -1` never renders as `a --1`
pub(crate) fn literal_sql(v: f64) -> String {
    if v < 0.0 {
        format!("({})", v)
    } else {
        v.to_string()
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Add, self, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Sub, self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Mul, self, rhs)
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Div, self, rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        match self.as_literal() {
            Some(v) => Expr::Literal(-v),
            None => Expr::Neg(Box::new(self)),
        }
    }
}

impl Numeric for Expr {
    fn lit(value: f64) -> Self {
        Expr::Literal(value)
    }
    fn sin(self) -> Self {
        Expr::call(Func::Sin, self)
    }
    fn cos(self) -> Self {
        Expr::call(Func::Cos, self)
    }
    fn sqrt(self) -> Self {
        Expr::call(Func::Sqrt, self)
    }
    fn to_radians(self) -> Self {
        Expr::call(Func::Radians, self)
    }
    fn to_degrees(self) -> Self {
        Expr::call(Func::Degrees, self)
    }
    fn atan2(self, x: Self) -> Self {
        match (self.as_literal(), x.as_literal()) {
            (Some(y), Some(x)) => Expr::Literal(y.atan2(x)),
            _ => Expr::Atan2(Box::new(self), Box::new(x)),
        }
    }
    fn modulo(self, modulus: f64) -> Self {
        match self.as_literal() {
            Some(v) => Expr::Literal(v.rem_euclid(modulus)),
            None => Expr::Modulo(Box::new(self), modulus),
        }
    }
    fn if_non_negative(self, then: Self, otherwise: Self) -> Self {
        match self.as_literal() {
            Some(v) if v >= 0.0 => then,
            Some(_) => otherwise,
            None => Expr::NonNegative {
                test: Box::new(self),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
        }
    }
}
