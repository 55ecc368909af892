//! Canonical CSV reader/writer. Column order lives in
//! [`transaction::COLUMNS`](crate::transaction::COLUMNS); this module only
//! moves rows in and out.

use crate::errors::Result;
use crate::transaction::{COLUMNS, Transaction};
use anyhow::Context;
use csv::{ReaderBuilder, WriterBuilder};
use std::io::{Read, Write};
use tracing::info;

/// Formatting knobs, passed explicitly to every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }
}

/// Write `txs` in canonical column order, header first if configured.
pub fn write_transactions<W: Write>(sink: W, txs: &[Transaction], format: &CsvFormat) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(false)
        .from_writer(sink);

    if format.has_headers {
        wtr.write_record(COLUMNS)?;
    }
    for tx in txs {
        wtr.write_record(tx.to_row())?;
    }
    wtr.flush()?;
    info!(rows = txs.len(), "wrote canonical CSV");
    Ok(())
}

/// Read canonical rows back. Any malformed row aborts the read with its
/// 1-based data row number; ids are `row-<n>`.
pub fn read_transactions<R: Read>(source: R, format: &CsvFormat) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(format.has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut txs = Vec::new();
    for (idx, row) in rdr.records().enumerate() {
        let n = idx + 1;
        let row = row.with_context(|| format!("reading row {n}"))?;
        let fields: Vec<&str> = row.iter().collect();
        let tx = Transaction::from_row(format!("row-{n}"), &fields)
            .with_context(|| format!("row {n}"))?;
        txs.push(tx);
    }
    info!(rows = txs.len(), "read canonical CSV");
    Ok(txs)
}
