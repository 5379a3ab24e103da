//! Renders expression trees and clause lists into parameterized SQL

use std::sync::Arc;

use crate::error::Error;
use crate::error::Result;
use crate::expr::Aggregate;
use crate::expr::Column;
use crate::expr::Expression;
use crate::expr::Op;
use crate::expr::Predicate;
use crate::expr::Subquery;
use crate::model::Model;
use crate::query::Query;
use crate::query::Selectable;
use crate::session::Core;
use crate::table::TableReference;
use crate::value::Value;

/// Accumulates SQL text and bound arguments for one statement.
///
/// A builder is created fresh for every `build()` call, so compiling the same
/// statement twice yields the same [`Query`].
pub struct Builder<'a> {
    core:  &'a Core,
    model: Arc<Model>,
    quote: char,
    sql:   String,
    args:  Vec<Value>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(core: &'a Core, model: Arc<Model>) -> Self {
        Self { quote: core.dialect().quoter(), core, model, sql: String::with_capacity(128), args: Vec::new() }
    }

    /// Model of the statement being built.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Writes `name` wrapped in the dialect's quote character.
    pub fn quote(&mut self, name: &str) {
        self.sql.push(self.quote);
        self.sql.push_str(name);
        self.sql.push(self.quote);
    }

    pub fn add_arg(&mut self, value: Value) {
        self.args.push(value);
    }

    /// Column name of an unqualified field of the statement's model.
    pub fn column_name(&self, field: &str) -> Result<String> {
        self.model.column_of(field).map(str::to_string)
    }

    pub fn build_expression(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Column(column) => self.build_column(column, false),
            Expression::Value(value) => {
                self.write_char('?');
                self.add_arg(value.clone());
                Ok(())
            }
            Expression::Predicate(predicate) => self.build_predicate(predicate),
            Expression::Aggregate(aggregate) => self.build_aggregate(aggregate, false),
            Expression::Math(math) => {
                self.build_expression(&math.left)?;
                self.write_char(' ');
                self.write_str(math.op.as_str());
                self.write_char(' ');
                self.build_expression(&math.right)
            }
            Expression::Raw(raw) => {
                self.write_str(&raw.sql);
                self.args.extend(raw.args.iter().cloned());
                Ok(())
            }
            Expression::Subquery(sub) => self.build_subquery(sub, false),
            Expression::SubqueryExpr(expr) => {
                self.write_str(expr.keyword);
                self.write_char(' ');
                self.build_subquery(&expr.sub, false)
            }
        }
    }

    /// Left-folds `predicates` with AND and renders the result.
    pub(crate) fn build_predicates(&mut self, predicates: &[Predicate]) -> Result<()> {
        let Some((first, rest)) = predicates.split_first() else {
            return Ok(());
        };
        let folded = rest.iter().cloned().fold(first.clone(), Predicate::and);
        self.build_predicate(&folded)
    }

    fn build_predicate(&mut self, predicate: &Predicate) -> Result<()> {
        // `IN ()` is not valid SQL in either dialect.
        if predicate.op == Op::In
            && matches!(&predicate.right, Expression::Raw(list) if list.args.is_empty() && list.sql == "()")
        {
            return Err(Error::unsupported_expression(predicate));
        }
        if let Some(left) = &predicate.left {
            self.build_side(left)?;
            self.write_char(' ');
        }
        if predicate.op != Op::Raw {
            self.write_str(predicate.op.as_str());
            self.write_char(' ');
        }
        self.build_side(&predicate.right)
    }

    // Only nested predicates get parentheses.
    fn build_side(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Predicate(predicate) => {
                self.write_char('(');
                self.build_predicate(predicate)?;
                self.write_char(')');
                Ok(())
            }
            other => self.build_expression(other),
        }
    }

    pub(crate) fn build_column(&mut self, column: &Column, use_alias: bool) -> Result<()> {
        let (qualifier, name) = self.resolve_column(column.table.as_ref(), &column.name)?;
        if let Some(qualifier) = qualifier {
            self.quote(&qualifier);
            self.write_char('.');
        }
        self.quote(&name);
        if use_alias {
            self.build_as(column.alias.as_deref());
        }
        Ok(())
    }

    /// Returns the table alias to qualify with and the stored column name.
    fn resolve_column(&self, table: Option<&TableReference>, field: &str) -> Result<(Option<String>, String)> {
        match table {
            None => Ok((None, self.column_name(field)?)),
            Some(TableReference::Table(table)) => {
                let model = (table.model)(self.core.registry())?;
                Ok((table.alias.clone(), model.column_of(field)?.to_string()))
            }
            Some(TableReference::Subquery(sub)) => Ok((sub.alias.clone(), self.subquery_column(sub, field)?)),
            Some(TableReference::Join(join)) => Err(Error::unsupported_expression(join)),
        }
    }

    // A subquery exposes its projection: aliases as they are, plain columns by
    // their name in the inner model.
    fn subquery_column(&self, sub: &Subquery, field: &str) -> Result<String> {
        let inner = (sub.model)(self.core.registry())?;
        if sub.columns.is_empty() {
            return inner.column_of(field).map(str::to_string);
        }

        for selectable in &sub.columns {
            match selectable {
                Selectable::Column(column) if column.alias.as_deref() == Some(field) => return Ok(field.to_string()),
                Selectable::Column(column) if column.alias.is_none() && column.name == field => {
                    return match &column.table {
                        None => inner.column_of(field).map(str::to_string),
                        Some(table) => self.resolve_column(Some(table), field).map(|(_, name)| name),
                    };
                }
                Selectable::Aggregate(aggregate) if aggregate.alias.as_deref() == Some(field) => {
                    return Ok(field.to_string());
                }
                _ => {}
            }
        }

        Err(Error::unknown_field(field))
    }

    pub(crate) fn build_aggregate(&mut self, aggregate: &Aggregate, use_alias: bool) -> Result<()> {
        let column = self.column_name(&aggregate.arg)?;
        self.write_str(aggregate.func);
        self.write_char('(');
        self.quote(&column);
        self.write_char(')');
        if use_alias {
            self.build_as(aggregate.alias.as_deref());
        }
        Ok(())
    }

    /// Compiles the inner statement, drops its terminator and splices its
    /// arguments in at the current position.
    pub(crate) fn build_subquery(&mut self, sub: &Subquery, use_alias: bool) -> Result<()> {
        let query = sub.builder.build()?;
        let sql = query.sql.strip_suffix(';').unwrap_or(&query.sql);
        self.write_char('(');
        self.write_str(sql);
        self.write_char(')');
        self.args.extend(query.args);
        if use_alias {
            self.build_as(sub.alias.as_deref());
        }
        Ok(())
    }

    pub(crate) fn build_selectable(&mut self, selectable: &Selectable) -> Result<()> {
        match selectable {
            Selectable::Column(column) => self.build_column(column, true),
            Selectable::Aggregate(aggregate) => self.build_aggregate(aggregate, true),
            Selectable::Raw(raw) => self.build_expression(&Expression::Raw(raw.clone())),
        }
    }

    /// Renders a FROM target. `None` is the statement's own model.
    pub(crate) fn build_table(&mut self, table: Option<&TableReference>) -> Result<()> {
        match table {
            None => {
                let name = self.model.table_name.clone();
                self.quote(&name);
            }
            Some(TableReference::Table(table)) => {
                let model = (table.model)(self.core.registry())?;
                self.quote(model.table_name());
                self.build_as(table.alias.as_deref());
            }
            Some(TableReference::Join(join)) => {
                self.write_char('(');
                self.build_table(Some(&join.left))?;
                self.write_char(' ');
                self.write_str(join.kind.as_str());
                self.write_char(' ');
                self.build_table(Some(&join.right))?;
                if !join.using.is_empty() {
                    self.write_str(" USING (");
                    for (i, field) in join.using.iter().enumerate() {
                        if i > 0 {
                            self.write_char(',');
                        }
                        let column = self.column_name(field)?;
                        self.quote(&column);
                    }
                    self.write_char(')');
                }
                if !join.on.is_empty() {
                    self.write_str(" ON ");
                    self.build_predicates(&join.on)?;
                }
                self.write_char(')');
            }
            Some(TableReference::Subquery(sub)) => self.build_subquery(sub, true)?,
        }
        Ok(())
    }

    pub(crate) fn build_as(&mut self, alias: Option<&str>) {
        if let Some(alias) = alias {
            self.write_str(" AS ");
            self.quote(alias);
        }
    }

    pub(crate) fn finish(mut self) -> Query {
        self.sql.push(';');
        tracing::trace!(sql = %self.sql, args = self.args.len(), "compiled");
        Query { sql: self.sql, args: self.args }
    }
}
