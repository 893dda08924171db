//! In-memory table model.
//!
//! A [`Table`] is a header row plus records padded to the header width.
//! Empty cells stand in for missing values.

use serde::Serialize;

use hostfilter_shared::{ColumnNames, HostFilterError, Result};

/// One row of the table. Always exactly as wide as the table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(Vec<String>);

impl Record {
    /// Build a record, padding with empty cells up to `width`.
    pub fn new(mut fields: Vec<String>, width: usize) -> Self {
        if fields.len() < width {
            fields.resize(width, String::new());
        }
        Self(fields)
    }

    /// The cell at `idx`, or `None` when it is empty (missing value).
    pub fn field(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str).filter(|s| !s.is_empty())
    }

    /// All cells, verbatim.
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// The host identity of this record under `columns`.
    pub fn host_key(&self, columns: &Columns) -> HostKey {
        HostKey {
            ip: self.field(columns.ip).unwrap_or_default().to_string(),
            host_name: self.field(columns.host_name).unwrap_or_default().to_string(),
        }
    }
}

/// An ordered sequence of records sharing one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    /// Create a table with the given header and no records.
    pub fn with_headers(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
        }
    }

    /// Append a row, padding it to the header width.
    pub fn push_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        self.records.push(Record::new(fields, self.headers.len()));
    }

    /// `false` when the source had no header row at all.
    pub fn has_header(&self) -> bool {
        !self.headers.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Index of a header, matched exactly after trimming whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Resolved positions of the (Name, IP, HostName) columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub name: usize,
    pub ip: usize,
    pub host_name: usize,
}

impl Columns {
    /// Look up all three columns, reporting every one that is absent.
    pub fn resolve(table: &Table, names: &ColumnNames) -> Result<Self> {
        let lookup = |name: &str| table.column_index(name);

        match (
            lookup(&names.name),
            lookup(&names.ip),
            lookup(&names.host_name),
        ) {
            (Some(name), Some(ip), Some(host_name)) => Ok(Self {
                name,
                ip,
                host_name,
            }),
            (name, ip, host_name) => {
                let missing: Vec<&str> = [
                    (name, names.name.as_str()),
                    (ip, names.ip.as_str()),
                    (host_name, names.host_name.as_str()),
                ]
                .into_iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, n)| n)
                .collect();

                Err(HostFilterError::schema(format!(
                    "missing required column(s): {} (found: {})",
                    missing.join(", "),
                    table.headers.join(", ")
                )))
            }
        }
    }
}

/// Composite host identity. Missing values are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HostKey {
    pub ip: String,
    pub host_name: String,
}

impl std::fmt::Display for HostKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ip, self.host_name)
    }
}
