//! Per-database SQL differences: identifier quoting and upsert clauses

use crate::builder::Builder;
use crate::error::Error;
use crate::error::Result;
use crate::expr::Assignable;

/// What to do when an INSERT hits a uniqueness conflict.
#[derive(Clone, Debug, Default)]
pub struct Upsert {
    pub(crate) conflict_columns: Vec<String>,
    pub(crate) assigns:          Vec<Assignable>,
}

impl Upsert {
    pub fn conflict_columns(&self) -> &[String] {
        &self.conflict_columns
    }

    pub fn assigns(&self) -> &[Assignable] {
        &self.assigns
    }
}

pub trait Dialect: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn quoter(&self) -> char;

    /// Appends the conflict clause of an upsert to an INSERT that has already
    /// been written up to its VALUES list.
    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quoter(&self) -> char {
        '`'
    }

    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
        if upsert.assigns.is_empty() {
            return Err(Error::NoUpdatedColumns);
        }
        builder.write_str(" ON DUPLICATE KEY UPDATE ");
        for (i, assign) in upsert.assigns.iter().enumerate() {
            if i > 0 {
                builder.write_char(',');
            }
            match assign {
                Assignable::Column(column) => {
                    let name = builder.column_name(&column.name)?;
                    builder.quote(&name);
                    builder.write_str("=VALUES(");
                    builder.quote(&name);
                    builder.write_char(')');
                }
                Assignable::Assignment(assignment) => {
                    let name = builder.column_name(&assignment.column)?;
                    builder.quote(&name);
                    builder.write_char('=');
                    builder.build_expression(&assignment.value)?;
                }
                other => return Err(Error::UnsupportedAssignableType { node: format!("{:?}", other) }),
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quoter(&self) -> char {
        '`'
    }

    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
        if upsert.assigns.is_empty() {
            return Err(Error::NoUpdatedColumns);
        }
        builder.write_str(" ON CONFLICT");
        if !upsert.conflict_columns.is_empty() {
            builder.write_char('(');
            for (i, field) in upsert.conflict_columns.iter().enumerate() {
                if i > 0 {
                    builder.write_char(',');
                }
                let name = builder.column_name(field)?;
                builder.quote(&name);
            }
            builder.write_char(')');
        }
        builder.write_str(" DO UPDATE SET ");

        for (i, assign) in upsert.assigns.iter().enumerate() {
            if i > 0 {
                builder.write_char(',');
            }
            match assign {
                Assignable::Column(column) => {
                    let name = builder.column_name(&column.name)?;
                    builder.quote(&name);
                    builder.write_str("=excluded.");
                    builder.quote(&name);
                }
                Assignable::Assignment(assignment) => {
                    let name = builder.column_name(&assignment.column)?;
                    builder.quote(&name);
                    builder.write_char('=');
                    builder.build_expression(&assignment.value)?;
                }
                other => return Err(Error::UnsupportedAssignableType { node: format!("{:?}", other) }),
            }
        }
        Ok(())
    }
}
