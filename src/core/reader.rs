use crate::domain::model::Table;
use crate::utils::error::{ReconError, Result};
use calamine::{Data, Reader};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated `.csv`.
    Csv,
    /// Pipe-separated `.txt` export.
    PipeDelimited,
    /// `.xlsx` / `.xls` workbook; only the first sheet is read.
    Excel,
}

impl InputFormat {
    pub const EXTENSIONS: [&'static str; 4] = ["csv", "txt", "xlsx", "xls"];

    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "txt" => Ok(InputFormat::PipeDelimited),
            "xlsx" | "xls" => Ok(InputFormat::Excel),
            _ => Err(ReconError::UnsupportedFormat {
                path: path.to_string(),
                extension,
            }),
        }
    }
}

/// Parses file contents into a [`Table`]. The first row is the header.
pub fn parse_table(data: &[u8], format: InputFormat, label: &str, prefix: &str) -> Result<Table> {
    let table = match format {
        InputFormat::Csv => parse_delimited(data, b',', label, prefix)?,
        InputFormat::PipeDelimited => parse_delimited(data, b'|', label, prefix)?,
        InputFormat::Excel => parse_workbook(data, label, prefix)?,
    };

    tracing::debug!(
        "Parsed {} as {:?}: {} columns, {} rows",
        label,
        format,
        table.headers.len(),
        table.len()
    );

    Ok(table)
}

fn header_names<'h>(cells: impl Iterator<Item = &'h str>) -> Vec<String> {
    cells
        .enumerate()
        .map(|(i, h)| {
            let h = h.trim_start_matches('\u{feff}').trim();
            if h.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            }
        })
        .collect()
}

/// Pads short rows; rejects rows wider than the header.
fn push_row(table: &mut Table, row: usize, mut cells: Vec<String>) -> Result<()> {
    let width = table.headers.len();
    if cells.len() > width {
        // Trailing blank cells past the header are harmless.
        while cells.len() > width && cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
    }
    if cells.len() > width {
        return Err(ReconError::InvalidValue {
            file: table.label.clone(),
            row,
            column: "(record)".to_string(),
            value: cells.join(","),
            reason: format!("{} fields, header has {}", cells.len(), width),
        });
    }

    cells.resize(width, String::new());
    table.rows.push(cells);
    Ok(())
}

fn no_header(label: &str) -> ReconError {
    ReconError::InsufficientData {
        message: format!("{} has no header row", label),
    }
}

fn parse_delimited(data: &[u8], delimiter: u8, label: &str, prefix: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = header_names(reader.headers()?.iter());
    if headers.is_empty() {
        return Err(no_header(label));
    }

    let mut table = Table::new(label, prefix, headers);
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        push_row(&mut table, row, record.iter().map(str::to_string).collect())?;
    }

    Ok(table)
}

fn excel_cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.time() == chrono::NaiveTime::MIN => ts.format("%Y-%m-%d").to_string(),
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn parse_workbook(data: &[u8], label: &str, prefix: &str) -> Result<Table> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReconError::InsufficientData {
            message: format!("{} has no worksheets", label),
        })??;

    let mut rows = range.rows();
    let header_cells: Vec<String> = rows
        .next()
        .ok_or_else(|| no_header(label))?
        .iter()
        .map(excel_cell_text)
        .collect();
    let headers = header_names(header_cells.iter().map(String::as_str));

    let mut table = Table::new(label, prefix, headers);
    for (row, cells) in rows.enumerate() {
        let cells: Vec<String> = cells.iter().map(excel_cell_text).collect();
        // Formatted-but-empty rows at the bottom of a sheet.
        if cells.iter().all(String::is_empty) {
            continue;
        }
        push_row(&mut table, row, cells)?;
    }

    Ok(table)
}
