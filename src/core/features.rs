use crate::core::columns::ResolvedColumns;
use crate::domain::model::{PairFeatures, Table};
use crate::utils::error::{ReconError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const SECONDS_PER_DAY: i64 = 86_400;

// Day-first formats come before month-name and compact ones.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %B %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];

/// Parses a monetary cell such as `1,234.50`, `(12.00)`, `$ 9` or `100 USD`.
pub fn parse_amount(raw: &str) -> std::result::Result<f64, String> {
    let mut text = raw.trim();
    if text.is_empty() {
        return Err("empty value".to_string());
    }

    let parens = text.starts_with('(') && text.ends_with(')');
    if parens {
        text = &text[1..text.len() - 1];
    }

    let is_noise = |c: char| c.is_alphabetic() || c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c);

    // The sign may sit on either side of a currency marker: "-$5", "$-5", "USD -5".
    text = text.trim_matches(is_noise);
    let minus = text.starts_with('-');
    if minus || text.starts_with('+') {
        text = &text[1..];
    }

    let cleaned: String = text
        .trim_matches(is_noise)
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.starts_with(['-', '+']) {
        return Err("more than one sign".to_string());
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| "not a number".to_string())?;
    if !value.is_finite() {
        return Err("not a finite number".to_string());
    }

    Ok(if parens != minus { -value } else { value })
}

fn year_is_plausible(fmt: &str, year: i32) -> bool {
    // %Y happily accepts "24", which belongs to the %y variants instead.
    !fmt.contains("%Y") || year >= 100
}

/// Parses a date cell, day-first, with an optional time of day.
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err("empty value".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_utc());
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            if year_is_plausible(fmt, date.year()) {
                return date
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| "invalid date".to_string());
            }
        }

        for time in TIME_FORMATS {
            for sep in [" ", "T"] {
                let full = format!("{}{}{}", fmt, sep, time);
                if let Ok(dt) = NaiveDateTime::parse_from_str(text, &full) {
                    if year_is_plausible(fmt, dt.year()) {
                        return Ok(dt);
                    }
                }
            }
        }
    }

    Err("unrecognised date format".to_string())
}

/// Whole days between two timestamps, floored toward negative infinity
/// before taking the absolute value (so minus twelve hours counts as one day).
pub fn day_difference(mt: NaiveDateTime, ledger: NaiveDateTime) -> i64 {
    (ledger - mt)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY)
        .abs()
}

/// Values of one table's role columns, parsed once up front.
struct ParsedColumns<'a> {
    amounts: Vec<f64>,
    dates: Vec<NaiveDateTime>,
    currency: Option<Vec<&'a str>>,
    desc: Option<Vec<&'a str>>,
}

impl<'a> ParsedColumns<'a> {
    fn parse(table: &'a Table, cols: &ResolvedColumns) -> Result<Self> {
        let invalid = |row: usize, col: usize, reason: String| ReconError::InvalidValue {
            file: table.label.clone(),
            row,
            column: table.headers[col].clone(),
            value: table.cell(row, col).to_string(),
            reason,
        };

        let amounts = (0..table.len())
            .map(|row| parse_amount(table.cell(row, cols.amount)).map_err(|r| invalid(row, cols.amount, r)))
            .collect::<Result<Vec<_>>>()?;

        let dates = (0..table.len())
            .map(|row| parse_date(table.cell(row, cols.date)).map_err(|r| invalid(row, cols.date, r)))
            .collect::<Result<Vec<_>>>()?;

        let text_column =
            |col: usize| -> Vec<&'a str> { (0..table.len()).map(|row| table.cell(row, col)).collect() };

        Ok(Self {
            amounts,
            dates,
            currency: cols.currency.map(text_column),
            desc: cols.desc.map(text_column),
        })
    }
}

// Blank cells never match, not even each other.
fn cells_match(side_a: &Option<Vec<&str>>, side_b: &Option<Vec<&str>>, i: usize, j: usize) -> u8 {
    match (side_a, side_b) {
        (Some(a), Some(b)) => u8::from(!a[i].is_empty() && a[i] == b[j]),
        _ => 0,
    }
}

/// Builds the full cross product of File 1 × File 2 rows, File 1 outermost.
pub fn extract_features(
    expected: &Table,
    expected_cols: &ResolvedColumns,
    posted: &Table,
    posted_cols: &ResolvedColumns,
) -> Result<Vec<PairFeatures>> {
    let mt = ParsedColumns::parse(expected, expected_cols)?;
    let ledger = ParsedColumns::parse(posted, posted_cols)?;

    let total = expected
        .len()
        .checked_mul(posted.len())
        .ok_or_else(|| ReconError::processing("pair count overflows usize"))?;

    let mut pairs = Vec::with_capacity(total);
    for i in 0..expected.len() {
        for j in 0..posted.len() {
            pairs.push(PairFeatures {
                mt_index: i,
                ledger_index: j,
                amount_diff: (ledger.amounts[j] - mt.amounts[i]).abs(),
                date_diff: day_difference(mt.dates[i], ledger.dates[j]),
                currency_match: cells_match(&mt.currency, &ledger.currency, i, j),
                desc_match: cells_match(&mt.desc, &ledger.desc, i, j),
            });
        }
    }

    tracing::debug!("Built {} pair feature vectors", pairs.len());
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ColumnMap;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn table(label: &str, prefix: &str, headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(label, prefix, headers.iter().map(|s| s.to_string()).collect());
        t.rows = rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();
        t
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("100").unwrap(), 100.0);
        assert_eq!(parse_amount(" 1,234.50 ").unwrap(), 1234.5);
        assert_eq!(parse_amount("(12.25)").unwrap(), -12.25);
        assert_eq!(parse_amount("-3").unwrap(), -3.0);
        assert_eq!(parse_amount("$ 9.99").unwrap(), 9.99);
        assert_eq!(parse_amount("100 USD").unwrap(), 100.0);
        assert_eq!(parse_amount("-$5.00").unwrap(), -5.0);
        assert_eq!(parse_amount("$-5.00").unwrap(), -5.0);
        assert_eq!(parse_amount("-€ 1,200").unwrap(), -1200.0);
        assert_eq!(parse_amount("USD -40").unwrap(), -40.0);
        assert_eq!(parse_amount("+£7").unwrap(), 7.0);
        assert!(parse_amount("--5").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_parse_date_is_day_first() {
        assert_eq!(parse_date("01/02/2024").unwrap(), ymd(2024, 2, 1));
        assert_eq!(parse_date("13-02-2024").unwrap(), ymd(2024, 2, 13));
        assert_eq!(parse_date("05.03.2024").unwrap(), ymd(2024, 3, 5));
        assert_eq!(parse_date("01/02/24").unwrap(), ymd(2024, 2, 1));
        assert_eq!(parse_date("2024-02-01").unwrap(), ymd(2024, 2, 1));
        assert_eq!(parse_date("20240201").unwrap(), ymd(2024, 2, 1));
        assert_eq!(parse_date("1 Feb 2024").unwrap(), ymd(2024, 2, 1));
        assert_eq!(parse_date("01-Feb-2024").unwrap(), ymd(2024, 2, 1));
        assert!(parse_date("31/02/2024").is_err());
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_date_with_time() {
        let dt = parse_date("01/02/2024 13:30").unwrap();
        assert_eq!(dt, ymd(2024, 2, 1) + chrono::Duration::minutes(13 * 60 + 30));
        let iso = parse_date("2024-02-01T06:00:00").unwrap();
        assert_eq!(iso, ymd(2024, 2, 1) + chrono::Duration::hours(6));
        assert!(parse_date("2024-02-01T06:00:00Z").is_ok());
    }

    #[test]
    fn test_day_difference_floors_before_abs() {
        let a = ymd(2024, 1, 10);
        assert_eq!(day_difference(a, ymd(2024, 1, 13)), 3);
        assert_eq!(day_difference(a, ymd(2024, 1, 7)), 3);
        let half_day_earlier = a - chrono::Duration::hours(12);
        assert_eq!(day_difference(a, half_day_earlier), 1);
        let half_day_later = a + chrono::Duration::hours(12);
        assert_eq!(day_difference(a, half_day_later), 0);
    }

    #[test]
    fn test_every_pair_gets_four_features() {
        let map = ColumnMap::default();
        let mt = table(
            "mt.csv",
            "mt_",
            &["Amount", "Date", "Currency", "Narration"],
            &[
                &["100", "01/01/2024", "USD", "Invoice 1"],
                &["50", "05/01/2024", "EUR", ""],
            ],
        );
        let ledger = table(
            "ledger.csv",
            "ledger_",
            &["amt", "post_date", "ccy", "description"],
            &[
                &["100", "02/01/2024", "USD", "Invoice 1"],
                &["45.5", "01/01/2024", "EUR", ""],
                &["70", "10/01/2024", "GBP", "Other"],
            ],
        );
        let mt_cols = ResolvedColumns::resolve(&mt, &map).unwrap();
        let ld_cols = ResolvedColumns::resolve(&ledger, &map).unwrap();
        let pairs = extract_features(&mt, &mt_cols, &ledger, &ld_cols).unwrap();

        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|p| p.as_vector().len() == PairFeatures::COUNT));
        assert_eq!((pairs[0].mt_index, pairs[0].ledger_index), (0, 0));
        assert_eq!((pairs[3].mt_index, pairs[3].ledger_index), (1, 0));

        assert_eq!(pairs[0].amount_diff, 0.0);
        assert_eq!(pairs[0].date_diff, 1);
        assert_eq!(pairs[0].currency_match, 1);
        assert_eq!(pairs[0].desc_match, 1);

        // Both descriptions blank: not a match.
        assert_eq!(pairs[4].amount_diff, 4.5);
        assert_eq!(pairs[4].date_diff, 4);
        assert_eq!(pairs[4].currency_match, 1);
        assert_eq!(pairs[4].desc_match, 0);
    }

    #[test]
    fn test_missing_optional_columns_score_zero() {
        let map = ColumnMap::default();
        let mt = table("mt.csv", "mt_", &["amount", "date", "ccy"], &[&["1", "01/01/2024", "USD"]]);
        let ledger = table("ld.csv", "ledger_", &["amount", "date"], &[&["1", "01/01/2024"]]);
        let mt_cols = ResolvedColumns::resolve(&mt, &map).unwrap();
        let ld_cols = ResolvedColumns::resolve(&ledger, &map).unwrap();
        let pairs = extract_features(&mt, &mt_cols, &ledger, &ld_cols).unwrap();
        assert_eq!(pairs[0].currency_match, 0);
        assert_eq!(pairs[0].desc_match, 0);
    }

    #[test]
    fn test_unparseable_cell_reports_location() {
        let map = ColumnMap::default();
        let mt = table("mt.csv", "mt_", &["amount", "date"], &[&["1", "01/01/2024"], &["1", "soon"]]);
        let ledger = table("ld.csv", "ledger_", &["amount", "date"], &[&["1", "01/01/2024"]]);
        let mt_cols = ResolvedColumns::resolve(&mt, &map).unwrap();
        let ld_cols = ResolvedColumns::resolve(&ledger, &map).unwrap();
        let err = extract_features(&mt, &mt_cols, &ledger, &ld_cols).unwrap_err();
        match err {
            ReconError::InvalidValue { file, row, column, value, .. } => {
                assert_eq!(file, "mt.csv");
                assert_eq!(row, 1);
                assert_eq!(column, "date");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
