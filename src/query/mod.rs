// src/query/mod.rs

//! Structured descriptors for the grouped aggregate queries the reports run.
//!
//! A descriptor is rendered to DuckDB SQL against a table name; every column,
//! alias and table identifier goes through [`quote_ident`].

pub mod ident;

pub use ident::{is_simple_ident, quote_ident};

use std::fmt::Write;
use std::ops::{Add, Div, Mul, Sub};

/// A scalar or aggregate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    /// Reference to an output column alias, e.g. in ORDER BY.
    Alias(String),
    Int(i64),
    Sum(Box<Expr>),
    Avg(Box<Expr>),
    Min(Box<Expr>),
    Max(Box<Expr>),
    Round(Box<Expr>, u32),
    NullIf(Box<Expr>, Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl Expr {
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn alias(name: impl Into<String>) -> Self {
        Expr::Alias(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::Int(value)
    }

    pub fn sum(self) -> Self {
        Expr::Sum(Box::new(self))
    }

    pub fn avg(self) -> Self {
        Expr::Avg(Box::new(self))
    }

    pub fn min(self) -> Self {
        Expr::Min(Box::new(self))
    }

    pub fn max(self) -> Self {
        Expr::Max(Box::new(self))
    }

    pub fn round(self, digits: u32) -> Self {
        Expr::Round(Box::new(self), digits)
    }

    pub fn null_if(self, other: Expr) -> Self {
        Expr::NullIf(Box::new(self), Box::new(other))
    }

    fn binary(self, op: BinaryOp, rhs: Expr) -> Self {
        Expr::Binary(Box::new(self), op, Box::new(rhs))
    }

    /// Render as DuckDB SQL.
    pub fn render(&self) -> String {
        match self {
            Expr::Column(name) | Expr::Alias(name) => quote_ident(name),
            Expr::Int(v) => v.to_string(),
            Expr::Sum(e) => format!("SUM({})", e.render()),
            Expr::Avg(e) => format!("AVG({})", e.render()),
            Expr::Min(e) => format!("MIN({})", e.render()),
            Expr::Max(e) => format!("MAX({})", e.render()),
            Expr::Round(e, digits) => format!("ROUND({}, {})", e.render(), digits),
            Expr::NullIf(a, b) => format!("NULLIF({}, {})", a.render(), b.render()),
            Expr::Binary(a, op, b) => format!("({} {} {})", a.render(), op.symbol(), b.render()),
        }
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Add, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Sub, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Mul, rhs)
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Div, rhs)
    }
}

/// How a trailing window's lower bound is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBound {
    /// `col >= (SELECT MAX(col) - N ...)`
    AtLeast,
    /// `col BETWEEN (SELECT MAX(col) - N ...) AND (SELECT MAX(col) ...)`
    Between,
}

/// Row filter applied before grouping.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals {
        column: String,
        value: i64,
    },
    /// Rows within `years` of the largest `column` value currently in the table.
    TrailingWindow {
        column: String,
        years: i64,
        bound: WindowBound,
    },
    /// Rows whose `column` is among the `limit` groups ranked highest by `rank`.
    InTopN {
        column: String,
        rank: Expr,
        limit: u64,
    },
}

impl Filter {
    pub fn render(&self, table: &str) -> String {
        let table = quote_ident(table);
        match self {
            Filter::Equals { column, value } => format!("{} = {}", quote_ident(column), value),
            Filter::TrailingWindow {
                column,
                years,
                bound,
            } => {
                let col = quote_ident(column);
                let lower = format!("(SELECT MAX({col}) - {years} FROM {table})");
                match bound {
                    WindowBound::AtLeast => format!("{col} >= {lower}"),
                    WindowBound::Between => {
                        format!("{col} BETWEEN {lower} AND (SELECT MAX({col}) FROM {table})")
                    }
                }
            }
            Filter::InTopN {
                column,
                rank,
                limit,
            } => {
                let col = quote_ident(column);
                format!(
                    "{col} IN (SELECT {col} FROM {table} GROUP BY {col} ORDER BY {} DESC LIMIT {limit})",
                    rank.render()
                )
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: Expr,
    pub order: Order,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub expr: Expr,
    pub alias: String,
}

/// `SELECT .. FROM table [WHERE ..] [GROUP BY ..] [ORDER BY ..] [LIMIT n]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateQuery {
    pub select: Vec<Projection>,
    pub filter: Option<Filter>,
    pub group_by: Vec<String>,
    pub order_by: Vec<SortKey>,
    pub limit: Option<u64>,
}

impl AggregateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, expr: Expr, alias: impl Into<String>) -> Self {
        self.select.push(Projection {
            expr,
            alias: alias.into(),
        });
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, expr: Expr, order: Order) -> Self {
        self.order_by.push(SortKey { expr, order });
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Render against `table`. Sort keys are emitted exactly as declared.
    pub fn render(&self, table: &str) -> String {
        let select = self
            .select
            .iter()
            .map(|p| format!("{} AS {}", p.expr.render(), quote_ident(&p.alias)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {} FROM {}", select, quote_ident(table));

        // writing into a String cannot fail
        if let Some(filter) = &self.filter {
            let _ = write!(sql, " WHERE {}", filter.render(table));
        }
        if !self.group_by.is_empty() {
            let cols = self
                .group_by
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(sql, " GROUP BY {}", cols);
        }
        if !self.order_by.is_empty() {
            let keys = self
                .order_by
                .iter()
                .map(|k| match k.order {
                    Order::Asc => format!("{} ASC", k.expr.render()),
                    Order::Desc => format!("{} DESC", k.expr.render()),
                })
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(sql, " ORDER BY {}", keys);
        }
        if let Some(n) = self.limit {
            let _ = write!(sql, " LIMIT {}", n);
        }
        sql
    }
}
