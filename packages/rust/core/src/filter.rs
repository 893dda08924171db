//! Host exclusion filter.
//!
//! Hosts are identified by their (IP, HostName) pair. Any host with at least
//! one record whose `Name` contains the marker is excluded entirely; every
//! other host is kept once, by its first record.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, instrument};

use hostfilter_shared::{ColumnNames, Result};

use crate::table::{Columns, HostKey, Table};

/// Hosts that already run the agent.
pub type ExclusionSet = HashSet<HostKey>;

/// Row and host counts from one filter run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Records in the input table.
    pub input_rows: usize,
    /// Distinct hosts in the exclusion set.
    pub excluded_hosts: usize,
    /// Records dropped because their host is excluded.
    pub excluded_rows: usize,
    /// Records dropped as repeats of an already-kept host.
    pub duplicate_rows: usize,
    /// Records in the output table.
    pub output_rows: usize,
}

/// Filtered table plus its statistics.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub table: Table,
    pub stats: FilterStats,
}

/// Collect the hosts having any record whose name contains `marker`.
///
/// Records with an empty name never match.
pub fn exclusion_set(table: &Table, columns: &Columns, marker: &str) -> ExclusionSet {
    table
        .records
        .iter()
        .filter(|r| r.field(columns.name).is_some_and(|name| name.contains(marker)))
        .map(|r| r.host_key(columns))
        .collect()
}

/// Drop every record of an excluded host, then keep the first record of each
/// remaining host. Order and schema are preserved; `table` is not modified.
///
/// A table without a header row passes through as an empty table.
#[instrument(skip_all, fields(rows = table.len(), marker = %marker))]
pub fn filter_hosts(table: &Table, names: &ColumnNames, marker: &str) -> Result<FilterOutcome> {
    if !table.has_header() {
        debug!("input has no header row");
        return Ok(FilterOutcome {
            table: Table::default(),
            stats: FilterStats::default(),
        });
    }

    let columns = Columns::resolve(table, names)?;
    let excluded = exclusion_set(table, &columns, marker);

    let mut stats = FilterStats {
        input_rows: table.len(),
        excluded_hosts: excluded.len(),
        ..FilterStats::default()
    };

    let mut seen: HashSet<HostKey> = HashSet::new();
    let mut output = Table::with_headers(table.headers.clone());

    for record in &table.records {
        let key = record.host_key(&columns);
        if excluded.contains(&key) {
            stats.excluded_rows += 1;
            continue;
        }
        if !seen.insert(key) {
            stats.duplicate_rows += 1;
            continue;
        }
        output.records.push(record.clone());
    }

    stats.output_rows = output.len();

    info!(
        input_rows = stats.input_rows,
        excluded_hosts = stats.excluded_hosts,
        excluded_rows = stats.excluded_rows,
        duplicate_rows = stats.duplicate_rows,
        output_rows = stats.output_rows,
        "filter complete"
    );

    Ok(FilterOutcome {
        table: output,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostfilter_shared::{DEFAULT_MARKER, HostFilterError};

    fn table(rows: &[[&str; 3]]) -> Table {
        let mut t = Table::with_headers(vec!["Name".into(), "IP".into(), "HostName".into()]);
        for row in rows {
            t.push_row(*row);
        }
        t
    }

    fn run(t: &Table) -> FilterOutcome {
        filter_hosts(t, &ColumnNames::default(), DEFAULT_MARKER).expect("filter")
    }

    fn keys(t: &Table) -> Vec<(&str, &str)> {
        t.records
            .iter()
            .map(|r| (r.fields()[1].as_str(), r.fields()[2].as_str()))
            .collect()
    }

    #[test]
    fn agent_host_is_removed_entirely() {
        let input = table(&[
            ["NinjaRMMAgent.exe", "10.0.0.1", "A"],
            ["chrome.exe", "10.0.0.1", "A"],
            ["chrome.exe", "10.0.0.2", "B"],
        ]);
        let out = run(&input);

        assert_eq!(out.table.records.len(), 1);
        assert_eq!(out.table.records[0].fields(), ["chrome.exe", "10.0.0.2", "B"]);
        assert_eq!(
            out.stats,
            FilterStats {
                input_rows: 3,
                excluded_hosts: 1,
                excluded_rows: 2,
                duplicate_rows: 0,
                output_rows: 1,
            }
        );
    }

    #[test]
    fn empty_table_yields_empty_output() {
        let out = run(&Table::default());
        assert!(!out.table.has_header());
        assert!(out.table.is_empty());
        assert_eq!(out.stats, FilterStats::default());
    }

    #[test]
    fn header_only_table_keeps_header() {
        let out = run(&table(&[]));
        assert_eq!(out.table.headers, ["Name", "IP", "HostName"]);
        assert!(out.table.records.is_empty());
    }

    #[test]
    fn missing_name_never_marks_host() {
        let mut input = table(&[["chrome.exe", "10.0.0.5", "E"]]);
        input.push_row(["", "10.0.0.5", "E"]);
        input.push_row(["NinjaRMMAgent.exe", "10.0.0.6", "F"]);
        input.push_row(["", "10.0.0.6", "F"]);

        let cols = Columns::resolve(&input, &ColumnNames::default()).unwrap();
        let excluded = exclusion_set(&input, &cols, DEFAULT_MARKER);
        assert_eq!(excluded.len(), 1);
        assert!(excluded.contains(&HostKey {
            ip: "10.0.0.6".into(),
            host_name: "F".into()
        }));

        let out = run(&input);
        assert_eq!(keys(&out.table), [("10.0.0.5", "E")]);
    }

    #[test]
    fn marker_match_is_case_sensitive_substring() {
        let input = table(&[
            ["C:\\Program Files\\NinjaRMMAgent\\agent.exe", "1.1.1.1", "X"],
            ["ninjarmmagent.exe", "2.2.2.2", "Y"],
        ]);
        let out = run(&input);
        assert_eq!(keys(&out.table), [("2.2.2.2", "Y")]);
    }

    #[test]
    fn without_marker_output_is_stable_dedup() {
        let input = table(&[
            ["a.exe", "10.0.0.3", "C"],
            ["b.exe", "10.0.0.4", "D"],
            ["c.exe", "10.0.0.3", "C"],
            ["d.exe", "10.0.0.3", "C2"],
        ]);
        let out = run(&input);

        let names: Vec<&str> = out
            .table
            .records
            .iter()
            .map(|r| r.fields()[0].as_str())
            .collect();
        assert_eq!(names, ["a.exe", "b.exe", "d.exe"]);
        assert_eq!(out.stats.duplicate_rows, 1);
        assert_eq!(out.stats.excluded_hosts, 0);
    }

    #[test]
    fn same_ip_different_hostname_are_distinct_hosts() {
        let input = table(&[
            ["NinjaRMMAgent.exe", "10.0.0.1", "A"],
            ["chrome.exe", "10.0.0.1", "A-renamed"],
        ]);
        let out = run(&input);
        assert_eq!(keys(&out.table), [("10.0.0.1", "A-renamed")]);
    }

    #[test]
    fn output_invariants_hold() {
        let input = table(&[
            ["x.exe", "10.0.0.1", "A"],
            ["NinjaRMMAgent.exe", "10.0.0.2", "B"],
            ["y.exe", "10.0.0.2", "B"],
            ["z.exe", "10.0.0.1", "A"],
            ["w.exe", "", ""],
            ["v.exe", "", ""],
            ["u.exe", "10.0.0.3", "C"],
        ]);
        let cols = Columns::resolve(&input, &ColumnNames::default()).unwrap();
        let excluded = exclusion_set(&input, &cols, DEFAULT_MARKER);
        let out = run(&input);

        let mut seen = HashSet::new();
        for record in &out.table.records {
            let key = record.host_key(&cols);
            assert!(!excluded.contains(&key), "excluded host {key} in output");
            assert!(seen.insert(key.clone()), "host {key} appears twice");
        }
        assert_eq!(out.table.records.len(), 3);
    }

    #[test]
    fn filtering_is_deterministic_and_idempotent() {
        let input = table(&[
            ["NinjaRMMAgent.exe", "10.0.0.1", "A"],
            ["chrome.exe", "10.0.0.2", "B"],
            ["edge.exe", "10.0.0.2", "B"],
            ["chrome.exe", "10.0.0.3", "C"],
        ]);
        let first = run(&input);
        let second = run(&input);
        assert_eq!(first.table, second.table);

        let again = run(&first.table);
        assert_eq!(again.table, first.table);
    }

    #[test]
    fn extra_columns_preserved_and_input_untouched() {
        let mut input = Table::with_headers(vec![
            "HostName".into(),
            "Owner".into(),
            "IP".into(),
            "Name".into(),
        ]);
        input.push_row(["A", "ops", "10.0.0.1", "svc.exe"]);
        let before = input.clone();

        let out = run(&input);
        assert_eq!(out.table, before);
        assert_eq!(input, before);
    }

    #[test]
    fn missing_columns_is_schema_error() {
        let input = Table::with_headers(vec!["Name".into(), "Address".into()]);
        let err = filter_hosts(&input, &ColumnNames::default(), DEFAULT_MARKER).unwrap_err();
        assert!(matches!(err, HostFilterError::Schema { .. }));
    }
}
