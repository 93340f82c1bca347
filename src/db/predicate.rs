//! Filter predicates
//!
//! Turns the optional fields of a list filter into a conjunction of SQL
//! conditions. Building a predicate never fails: a field that is empty, zero
//! or unparseable simply contributes no condition, and a predicate without
//! conditions matches every row.

use chrono::NaiveDate;
use sqlx::{Database, Encode, QueryBuilder, Type};

use crate::config::DatabaseDriver;
use crate::models::{ArticleFilter, TagFilter, TopicFilter};

/// Date format accepted in `created_start` / `created_end`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A value bound to a placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i64),
}

/// A single condition of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`
    Eq {
        column: &'static str,
        value: BindValue,
    },
    /// Calendar date of `created_at` within `[start, end]`
    CreatedBetween { start: NaiveDate, end: NaiveDate },
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Predicate matching every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches_all(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Add an equality on a text column when `value` is non-empty
    fn text_eq(self, column: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.and(Condition::Eq {
                column,
                value: BindValue::Text(v.to_string()),
            }),
            _ => self,
        }
    }

    /// Add an equality on an ID column when `value` is non-zero
    fn id_eq(self, column: &'static str, value: Option<i64>) -> Self {
        match value {
            Some(v) if v != 0 => self.and(Condition::Eq {
                column,
                value: BindValue::Int(v),
            }),
            _ => self,
        }
    }

    /// Add the creation-date range when both bounds are valid dates
    fn created_between(self, start: Option<&str>, end: Option<&str>) -> Self {
        match date_range(start, end) {
            Some((start, end)) => self.and(Condition::CreatedBetween { start, end }),
            None => self,
        }
    }

    /// Append ` WHERE ...` (or nothing) to a query under construction.
    ///
    /// Column names are qualified with `alias` when one is given.
    pub fn push_where<'args, DB>(
        &self,
        qb: &mut QueryBuilder<'args, DB>,
        driver: DatabaseDriver,
        alias: Option<&str>,
    ) where
        DB: Database,
        String: Encode<'args, DB> + Type<DB>,
        i64: Encode<'args, DB> + Type<DB>,
    {
        if self.conditions.is_empty() {
            return;
        }

        let qualify = |column: &str| match alias {
            Some(alias) => format!("{}.{}", alias, column),
            None => column.to_string(),
        };

        qb.push(" WHERE ");
        let mut separated = qb.separated(" AND ");
        for condition in &self.conditions {
            match condition {
                Condition::Eq { column, value } => {
                    separated.push(format!("{} = ", qualify(column)));
                    match value {
                        BindValue::Text(v) => separated.push_bind_unseparated(v.clone()),
                        BindValue::Int(v) => separated.push_bind_unseparated(*v),
                    };
                }
                Condition::CreatedBetween { start, end } => {
                    separated.push(format!(
                        "{} BETWEEN ",
                        created_date_expr(driver, &qualify("created_at"))
                    ));
                    separated.push_bind_unseparated(start.format(DATE_FORMAT).to_string());
                    separated.push_unseparated(" AND ");
                    separated.push_bind_unseparated(end.format(DATE_FORMAT).to_string());
                }
            }
        }
    }
}

/// SQL expression yielding the `YYYY-MM-DD` date of a timestamp column
fn created_date_expr(driver: DatabaseDriver, column: &str) -> String {
    match driver {
        // Timestamps are stored as RFC 3339 text; the first ten characters are the date
        DatabaseDriver::Sqlite => format!("substr({}, 1, 10)", column),
        DatabaseDriver::Mysql => format!("DATE({})", column),
    }
}

/// Parse both bounds of a creation-date range.
///
/// The range is only usable when both bounds are present and valid.
pub fn date_range(start: Option<&str>, end: Option<&str>) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::parse_from_str(start?.trim(), DATE_FORMAT).ok()?;
    let end = NaiveDate::parse_from_str(end?.trim(), DATE_FORMAT).ok()?;
    Some((start, end))
}

impl From<&TagFilter> for Predicate {
    fn from(filter: &TagFilter) -> Self {
        Predicate::all()
            .text_eq("label", filter.label.as_deref())
            .created_between(filter.created_start.as_deref(), filter.created_end.as_deref())
    }
}

impl From<&TopicFilter> for Predicate {
    fn from(filter: &TopicFilter) -> Self {
        Predicate::all()
            .text_eq("label", filter.label.as_deref())
            .created_between(filter.created_start.as_deref(), filter.created_end.as_deref())
    }
}

impl From<&ArticleFilter> for Predicate {
    fn from(filter: &ArticleFilter) -> Self {
        Predicate::all()
            .text_eq("status", filter.status.as_deref())
            .id_eq("topic_id", filter.topic)
            .created_between(filter.created_start.as_deref(), filter.created_end.as_deref())
    }
}
