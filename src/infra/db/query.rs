//! SQL rendering of list filters.
//!
//! Public camelCase field names are translated through a per-table column map;
//! every value is bound, never interpolated.

use sqlx::{Postgres, QueryBuilder};

use crate::application::pagination::{
    Condition, Filter, FilterValue, PageQuery, PaginationError, SortSpec, WhereBranch,
};
use crate::application::repos::RepoError;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Column {
    Direct(&'static str),
    /// Holds when any live related row satisfies the condition. `source` is
    /// the `FROM ... WHERE <join>` part of the sub-select.
    Related {
        source: &'static str,
        column: &'static str,
    },
}

#[derive(Debug)]
pub(crate) struct Table {
    pub from: &'static str,
    pub alias: &'static str,
    pub columns: &'static [(&'static str, Column)],
}

impl Table {
    fn column(&self, field: &str) -> Result<Column, RepoError> {
        self.columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
            .ok_or_else(|| unknown_field(field))
    }
}

fn unknown_field(field: &str) -> RepoError {
    RepoError::Pagination(PaginationError::UnknownField {
        field: field.to_string(),
    })
}

/// ` WHERE <alias>.deleted_at IS NULL AND (<filter>)`.
pub(crate) fn push_where(
    qb: &mut QueryBuilder<'_, Postgres>,
    table: &Table,
    filter: &Filter,
) -> Result<(), RepoError> {
    qb.push(" WHERE ");
    qb.push(table.alias);
    qb.push(".deleted_at IS NULL");
    if filter.is_unrestricted() {
        return Ok(());
    }

    qb.push(" AND (");
    for (index, branch) in filter.branches().iter().enumerate() {
        if index > 0 {
            qb.push(" OR ");
        }
        push_branch(qb, table, branch)?;
    }
    qb.push(")");
    Ok(())
}

fn push_branch(
    qb: &mut QueryBuilder<'_, Postgres>,
    table: &Table,
    branch: &WhereBranch,
) -> Result<(), RepoError> {
    qb.push("(");
    for (index, condition) in branch.conditions.iter().enumerate() {
        if index > 0 {
            qb.push(" AND ");
        }
        match table.column(condition.field())? {
            Column::Direct(column) => push_condition(qb, column, condition),
            Column::Related { source, column } => {
                qb.push("EXISTS (SELECT 1 FROM ");
                qb.push(source);
                qb.push(" AND ");
                push_condition(qb, column, condition);
                qb.push(")");
            }
        }
    }
    qb.push(")");
    Ok(())
}

fn push_condition(qb: &mut QueryBuilder<'_, Postgres>, column: &str, condition: &Condition) {
    qb.push(column);
    match condition {
        Condition::Eq { value, .. } => {
            qb.push(" = ");
            push_value(qb, value);
        }
        Condition::ContainsInsensitive { term, .. } => {
            qb.push(" ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(term)));
        }
        Condition::Between { from, to, .. } => {
            qb.push(" BETWEEN ");
            qb.push_bind(*from);
            qb.push(" AND ");
            qb.push_bind(*to);
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Text(text) => qb.push_bind(text.clone()),
        FilterValue::Uuid(id) => qb.push_bind(*id),
        FilterValue::Int(number) => qb.push_bind(*number),
        FilterValue::Float(number) => qb.push_bind(*number),
        FilterValue::Timestamp(at) => qb.push_bind(*at),
    };
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// ` ORDER BY <column> <dir>, <alias>.id <dir>`; related fields cannot sort.
pub(crate) fn push_order(
    qb: &mut QueryBuilder<'_, Postgres>,
    table: &Table,
    sort: &SortSpec,
) -> Result<(), RepoError> {
    let Column::Direct(column) = table.column(&sort.field)? else {
        return Err(unknown_field(&sort.field));
    };
    let direction = sort.direction.as_sql();
    qb.push(" ORDER BY ");
    qb.push(column);
    qb.push(" ");
    qb.push(direction);
    qb.push(", ");
    qb.push(table.alias);
    qb.push(".id ");
    qb.push(direction);
    Ok(())
}

pub(crate) fn push_slice(qb: &mut QueryBuilder<'_, Postgres>, query: &PageQuery) {
    qb.push(" LIMIT ");
    qb.push_bind(clamp_i64(query.take));
    qb.push(" OFFSET ");
    qb.push_bind(clamp_i64(query.skip));
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `SELECT COUNT(*) FROM <table>` restricted by the query filter.
pub(crate) fn count_query(
    table: &Table,
    query: &PageQuery,
) -> Result<QueryBuilder<'static, Postgres>, RepoError> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
    qb.push(table.from);
    push_where(&mut qb, table, &query.filter)?;
    Ok(qb)
}

/// `<select> FROM <table> [joins]` plus filter, order and slice.
pub(crate) fn page_query(
    select: &'static str,
    joins: &'static str,
    table: &Table,
    query: &PageQuery,
) -> Result<QueryBuilder<'static, Postgres>, RepoError> {
    let mut qb = QueryBuilder::new(select);
    qb.push(" FROM ");
    qb.push(table.from);
    qb.push(joins);
    push_where(&mut qb, table, &query.filter)?;
    push_order(&mut qb, table, &query.sort)?;
    push_slice(&mut qb, query);
    Ok(qb)
}
