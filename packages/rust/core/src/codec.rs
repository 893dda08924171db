//! CSV decoding and encoding.
//!
//! Inventory exports arrive in a single-byte Windows code page, so text
//! decoding is done explicitly with `encoding_rs` before the bytes reach the
//! `csv` parser. Both directions are strict: undecodable input is a parse
//! error and unrepresentable output is an encode error, never a silent
//! replacement.

use std::borrow::Cow;
use std::path::Path;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use encoding_rs::Encoding;
use tracing::{debug, instrument};

use hostfilter_shared::{HostFilterError, Result, write_atomic};

use crate::table::{Record, Table};

/// Resolve a WHATWG encoding label (e.g. `windows-1252`, `cp1252`, `utf-8`).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| HostFilterError::config(format!("unknown encoding label '{label}'")))
}

/// Resolve a label for writing. Encodings that `encoding_rs` cannot produce
/// (UTF-16, `replacement`) are rejected rather than silently written as UTF-8.
pub fn resolve_output_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = resolve_encoding(label)?;
    check_writable(encoding)?;
    Ok(encoding)
}

fn check_writable(encoding: &'static Encoding) -> Result<()> {
    if encoding.output_encoding() != encoding {
        return Err(HostFilterError::config(format!(
            "{} is not supported as an output encoding",
            encoding.name()
        )));
    }
    Ok(())
}

/// Bytes that Windows code page 1252 leaves undefined. WHATWG maps them to
/// C1 controls; the Windows codec rejects them.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8d, 0x8f, 0x90, 0x9d];

/// Decode `bytes` without replacement. A leading BOM character is dropped.
///
/// Under windows-1252 the five code points the code page leaves undefined are
/// rejected as well.
pub fn decode_text<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Result<Cow<'a, str>> {
    if encoding == encoding_rs::WINDOWS_1252 {
        if let Some(offset) = bytes.iter().position(|b| CP1252_UNDEFINED.contains(b)) {
            return Err(HostFilterError::parse(format!(
                "byte 0x{:02x} at offset {offset} is undefined in windows-1252",
                bytes[offset]
            )));
        }
    }

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| {
            HostFilterError::parse(format!("input is not valid {} text", encoding.name()))
        })?;

    Ok(match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
        Cow::Owned(s) => match s.strip_prefix('\u{feff}') {
            Some(rest) => Cow::Owned(rest.to_string()),
            None => Cow::Owned(s),
        },
    })
}

/// Encode `text` without replacement.
pub fn encode_text<'a>(text: &'a str, encoding: &'static Encoding) -> Result<Cow<'a, [u8]>> {
    check_writable(encoding)?;
    let (bytes, used, had_errors) = encoding.encode(text);
    if had_errors {
        let offending = text
            .chars()
            .find(|c| used.encode(c.encode_utf8(&mut [0; 4])).2)
            .map(|c| format!(" (first offending character: {c:?})"))
            .unwrap_or_default();
        return Err(HostFilterError::encode(format!(
            "output cannot be represented as {}{offending}",
            used.name()
        )));
    }
    Ok(bytes)
}

/// Parse CSV text with a header row into a [`Table`].
///
/// Records shorter than the header are padded with empty cells; a record
/// wider than the header is rejected. Text with no header row yields an
/// empty table.
pub fn parse_table(text: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| HostFilterError::parse(format!("failed to read header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let width = headers.len();
    let mut table = Table::with_headers(headers);

    for row in reader.records() {
        let row = row.map_err(|e| HostFilterError::parse(format!("malformed CSV: {e}")))?;
        if row.len() > width {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            return Err(HostFilterError::parse(format!(
                "line {line}: expected at most {width} fields, found {}",
                row.len()
            )));
        }
        table
            .records
            .push(Record::new(row.iter().map(str::to_string).collect(), width));
    }

    debug!(columns = width, rows = table.len(), "parsed CSV table");
    Ok(table)
}

/// Render a table as CSV text (`\n` line endings, minimal quoting).
pub fn render_table(table: &Table) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let serialize_err = |e: csv::Error| HostFilterError::encode(format!("CSV serialization failed: {e}"));

    if !table.headers.is_empty() {
        writer.write_record(&table.headers).map_err(serialize_err)?;
    }
    for record in &table.records {
        writer.write_record(record.fields()).map_err(serialize_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| HostFilterError::encode(format!("CSV serialization failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| HostFilterError::encode(e.to_string()))
}

/// Read, decode, and parse a CSV file.
#[instrument(skip(encoding), fields(encoding = encoding.name()))]
pub fn read_table(path: &Path, encoding: &'static Encoding) -> Result<Table> {
    let bytes = std::fs::read(path).map_err(|e| HostFilterError::io(path, e))?;
    let text = decode_text(&bytes, encoding)?;
    let table = parse_table(&text)?;
    debug!(bytes = bytes.len(), rows = table.len(), "loaded table");
    Ok(table)
}

/// Render, encode, and atomically write a table. Returns the bytes written.
#[instrument(skip(table, encoding), fields(encoding = encoding.name(), rows = table.len()))]
pub fn write_table(path: &Path, table: &Table, encoding: &'static Encoding) -> Result<Vec<u8>> {
    let text = render_table(table)?;
    let bytes = encode_text(&text, encoding)?.into_owned();
    write_atomic(path, &bytes)?;
    Ok(bytes)
}
