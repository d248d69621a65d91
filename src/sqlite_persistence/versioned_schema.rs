use anyhow::{bail, Result};
use rusqlite::{params, Connection};

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

/// Offset added to every schema version before writing it to `PRAGMA user_version`,
/// so that a fresh sqlite file (user_version 0) is never mistaken for one of ours.
pub const BASE_DB_VERSION: usize = 7700;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                check: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            _ => None,
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<&'static str>,
    /// Raw SQL expression placed inside a column level `CHECK (...)`.
    pub check: Option<&'static str>,
    pub foreign_key: Option<&'static ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
                if column.is_primary_key {
                    sql.push_str(" PRIMARY KEY");
                }
                if column.non_null {
                    sql.push_str(" NOT NULL");
                }
                if column.is_unique {
                    sql.push_str(" UNIQUE");
                }
                if let Some(default_value) = column.default_value {
                    sql.push_str(&format!(" DEFAULT {}", default_value));
                }
                if let Some(check) = column.check {
                    sql.push_str(&format!(" CHECK ({})", check));
                }
                if let Some(fk) = column.foreign_key {
                    sql.push_str(&format!(
                        " REFERENCES {}({}) ON DELETE CASCADE",
                        fk.foreign_table, fk.foreign_column
                    ));
                }
                sql
            })
            .chain(
                self.unique_constraints
                    .iter()
                    .map(|columns| format!("UNIQUE ({})", columns.join(", "))),
            )
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({});", self.name, columns)
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.create_sql(), params![])?;
        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        struct ActualColumn {
            name: String,
            sql_type: String,
            non_null: bool,
            is_primary_key: bool,
        }

        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual_columns = stmt
            .query_map(params![], |row| {
                Ok(ActualColumn {
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                    non_null: row.get::<_, i32>(3)? == 1,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found: [{}]",
                self.name,
                actual_columns.len(),
                self.columns.len(),
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual.name
                );
            }
            if SqlType::from_sql(&actual.sql_type) != Some(expected.sql_type) {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    actual.sql_type
                );
            }
            if actual.non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    actual.non_null
                );
            }
            if actual.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} column {} primary key mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.is_primary_key,
                    actual.is_primary_key
                );
            }
        }

        for (index_name, _) in self.indices {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, self.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !exists {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }

        if !self.unique_constraints.is_empty() {
            let unique_column_sets = self.unique_column_sets(conn)?;
            for expected in self.unique_constraints {
                let mut expected_sorted: Vec<&str> = expected.to_vec();
                expected_sorted.sort();
                let found = unique_column_sets.iter().any(|actual| {
                    actual.iter().map(String::as_str).collect::<Vec<_>>() == expected_sorted
                });
                if !found {
                    bail!(
                        "Table {} is missing unique constraint on ({})",
                        self.name,
                        expected.join(", ")
                    );
                }
            }
        }

        Ok(())
    }

    /// Column sets (sorted) of every unique index sqlite keeps for this table.
    fn unique_column_sets(&self, conn: &Connection) -> Result<Vec<Vec<String>>> {
        let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", self.name))?;
        let unique_indices = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i32>(2)?)))?
            .filter_map(|r| r.ok())
            .filter(|(_, unique)| *unique == 1)
            .map(|(name, _)| name)
            .collect::<Vec<_>>();

        let mut out = Vec::with_capacity(unique_indices.len());
        for index_name in unique_indices {
            let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
            let mut columns = idx_stmt
                .query_map([], |row| row.get::<_, String>(2))?
                .filter_map(|r| r.ok())
                .collect::<Vec<_>>();
            columns.sort();
            out.push(columns);
        }
        Ok(out)
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}
