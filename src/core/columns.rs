use crate::domain::model::{ColumnMap, Table};
use crate::utils::error::{ReconError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Amount,
    Date,
    Currency,
    Description,
}

impl ColumnRole {
    pub fn candidates<'a>(&self, map: &'a ColumnMap) -> &'a [String] {
        match self {
            ColumnRole::Amount => &map.amount,
            ColumnRole::Date => &map.date,
            ColumnRole::Currency => &map.currency,
            ColumnRole::Description => &map.desc,
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnRole::Amount => "amount",
            ColumnRole::Date => "date",
            ColumnRole::Currency => "currency",
            ColumnRole::Description => "description",
        };
        f.write_str(name)
    }
}

/// Returns the first header containing a candidate, case-insensitively.
///
/// Candidates are tried in priority order; for each one the headers are
/// scanned left to right, so an earlier candidate always wins over a
/// header that appears earlier in the file.
pub fn find_column<S: AsRef<str>>(headers: &[String], candidates: &[S]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    candidates.iter().find_map(|name| {
        let needle = name.as_ref().trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        lowered.iter().position(|h| h.contains(&needle))
    })
}

/// Column positions of one table for each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub amount: usize,
    pub date: usize,
    pub currency: Option<usize>,
    pub desc: Option<usize>,
}

impl ResolvedColumns {
    pub fn resolve(table: &Table, map: &ColumnMap) -> Result<Self> {
        let required = |role: ColumnRole| {
            let candidates = role.candidates(map);
            find_column(&table.headers, candidates).ok_or_else(|| ReconError::MissingColumn {
                file: table.label.clone(),
                role: role.to_string(),
                candidates: candidates.join(", "),
            })
        };

        let resolved = Self {
            amount: required(ColumnRole::Amount)?,
            date: required(ColumnRole::Date)?,
            currency: find_column(&table.headers, ColumnRole::Currency.candidates(map)),
            desc: find_column(&table.headers, ColumnRole::Description.candidates(map)),
        };

        tracing::debug!(
            "{}: amount='{}' date='{}' currency={:?} desc={:?}",
            table.label,
            table.headers[resolved.amount],
            table.headers[resolved.date],
            resolved.currency.map(|i| &table.headers[i]),
            resolved.desc.map(|i| &table.headers[i]),
        );

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_find_column_substring_case_insensitive() {
        let h = headers(&["Ref", "Txn Amount", "Value Date"]);
        assert_eq!(find_column(&h, &["amount", "amt", "value"]), Some(1));
        assert_eq!(find_column(&h, &["date"]), Some(2));
        assert_eq!(find_column(&h, &["ccy"]), None);
    }

    #[test]
    fn test_find_column_candidate_priority_beats_header_order() {
        // "value" is listed after "amount", so "Amount" wins even though
        // "Value" comes first in the file.
        let h = headers(&["Value", "Amount"]);
        assert_eq!(find_column(&h, &["amount", "amt", "value"]), Some(1));
    }

    #[test]
    fn test_find_column_ignores_blank_candidates() {
        let h = headers(&["anything"]);
        assert_eq!(find_column(&h, &["", "  "]), None);
    }

    #[test]
    fn test_resolve_requires_amount_and_date() {
        let map = ColumnMap::default();
        let table = Table::new("ledger.csv", "ledger_", headers(&["Amt", "Narration"]));
        let err = ResolvedColumns::resolve(&table, &map).unwrap_err();
        match err {
            ReconError::MissingColumn { file, role, .. } => {
                assert_eq!(file, "ledger.csv");
                assert_eq!(role, "date");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_optional_columns() {
        let map = ColumnMap::default();
        let table = Table::new(
            "mt.csv",
            "mt_",
            headers(&["Post_Date", "CCY", "Amount", "Details"]),
        );
        let cols = ResolvedColumns::resolve(&table, &map).unwrap();
        assert_eq!(cols.amount, 2);
        assert_eq!(cols.date, 0);
        assert_eq!(cols.currency, Some(1));
        assert_eq!(cols.desc, Some(3));

        let bare = Table::new("mt.csv", "mt_", headers(&["amount", "date"]));
        let cols = ResolvedColumns::resolve(&bare, &map).unwrap();
        assert_eq!(cols.currency, None);
        assert_eq!(cols.desc, None);
    }
}
