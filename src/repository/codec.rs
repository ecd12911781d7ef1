//! Mapping between the logical shape of composite fields and their relational
//! columns. Every pair here satisfies `decode(encode(x)) == x`.
//!
//! | logical                     | storage                                   |
//! |-----------------------------|-------------------------------------------|
//! | `location {city,state,country}` | three `TEXT NOT NULL` columns, `''` when blank |
//! | `skills` / `requirements`   | JSON array text; `"[]"` = explicit empty, `NULL` = never set |
//! | `salary {min,max,currency}` | two nullable integers + currency (`USD` when unset) |
//! | `targetAudience`            | JSON array text; `NULL` = `["all"]`       |
//!
//! Searches over these fields go through the SQL fragments below so that every
//! repository matches them the same way.

use std::collections::BTreeSet;

use crate::{
    domain::{default_audience, Audience, Location, Salary, DEFAULT_CURRENCY},
    error::{AppError, Result},
};

/// Stored for a list that was set to nothing, as opposed to `NULL` (never set).
pub const EMPTY_LIST_MARKER: &str = "[]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationColumns {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl LocationColumns {
    pub fn encode(location: &Location) -> Self {
        Self {
            city: location.city.clone(),
            state: location.state.clone(),
            country: location.country.clone(),
        }
    }

    pub fn decode(self) -> Location {
        Location {
            city: self.city,
            state: self.state,
            country: self.country,
        }
    }
}

pub fn encode_list(items: &[String]) -> Result<String> {
    if items.is_empty() {
        return Ok(EMPTY_LIST_MARKER.to_string());
    }
    serde_json::to_string(items).map_err(|e| AppError::Internal(format!("list encoding failed: {}", e)))
}

pub fn decode_list(stored: Option<&str>) -> Result<Vec<String>> {
    match stored.map(str::trim) {
        None | Some("") | Some(EMPTY_LIST_MARKER) => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text)
            .map_err(|e| AppError::Database(format!("Invalid list column {:?}: {}", text, e))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryColumns {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: String,
}

impl SalaryColumns {
    pub fn encode(salary: &Salary) -> Self {
        let currency = if salary.currency.trim().is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            salary.currency.clone()
        };
        Self {
            min: salary.min,
            max: salary.max,
            currency,
        }
    }

    pub fn decode(min: Option<i64>, max: Option<i64>, currency: Option<String>) -> Salary {
        let currency = currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        Salary { min, max, currency }
    }
}

pub fn encode_audience(audience: &BTreeSet<Audience>) -> Result<String> {
    let names: Vec<&str> = audience.iter().map(Audience::as_str).collect();
    serde_json::to_string(&names)
        .map_err(|e| AppError::Internal(format!("audience encoding failed: {}", e)))
}

pub fn decode_audience(stored: Option<&str>) -> Result<BTreeSet<Audience>> {
    let Some(text) = stored.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(default_audience());
    };
    let names: Vec<String> = serde_json::from_str(text)
        .map_err(|e| AppError::Database(format!("Invalid audience column {:?}: {}", text, e)))?;
    names
        .iter()
        .map(|name| {
            Audience::from_str(name)
                .ok_or_else(|| AppError::Database(format!("Invalid audience: {}", name)))
        })
        .collect()
}

/// Matches announcements visible to one audience: rows targeting `all`, rows
/// targeting the bound audience, and legacy rows with no audience stored.
/// Binds one parameter: the audience name.
pub const AUDIENCE_MATCHES_SQL: &str = "(a.target_audience IS NULL \
     OR EXISTS (SELECT 1 FROM json_each(a.target_audience) aud \
                WHERE aud.value = 'all' OR aud.value = ?))";

/// Substring match against any element of a JSON list column. Binds one `LIKE` pattern.
pub fn list_element_like_sql(column: &str) -> String {
    format!(
        "EXISTS (SELECT 1 FROM json_each({}) item WHERE item.value LIKE ? ESCAPE '\\')",
        column
    )
}

/// `LIKE` pattern for a case-insensitive substring match; use with `ESCAPE '\'`.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_round_trip_including_blank_parts() {
        let cases = [
            Location::default(),
            Location {
                city: "Nairobi".into(),
                state: String::new(),
                country: "Kenya".into(),
            },
            Location {
                city: "Austin".into(),
                state: "TX".into(),
                country: "USA".into(),
            },
        ];
        for loc in cases {
            assert_eq!(LocationColumns::encode(&loc).decode(), loc);
        }
    }

    #[test]
    fn list_round_trip_and_markers() {
        let skills = vec!["rust".to_string(), "sql, advanced".to_string(), "\"quoted\"".to_string()];
        let encoded = encode_list(&skills).unwrap();
        assert_eq!(decode_list(Some(&encoded)).unwrap(), skills);

        let empty = encode_list(&[]).unwrap();
        assert_eq!(empty, EMPTY_LIST_MARKER);
        assert!(decode_list(Some(&empty)).unwrap().is_empty());
        assert!(decode_list(None).unwrap().is_empty());
    }

    #[test]
    fn list_decode_rejects_garbage() {
        assert!(decode_list(Some("not json")).is_err());
    }

    #[test]
    fn salary_round_trip_and_default_currency() {
        let salary = Salary {
            min: Some(50_000),
            max: None,
            currency: "EUR".into(),
        };
        let cols = SalaryColumns::encode(&salary);
        assert_eq!(SalaryColumns::decode(cols.min, cols.max, Some(cols.currency)), salary);

        let unset = SalaryColumns::decode(None, None, None);
        assert_eq!(unset, Salary::default());
        assert_eq!(unset.currency, "USD");

        let blank = Salary {
            min: None,
            max: None,
            currency: String::new(),
        };
        assert_eq!(SalaryColumns::encode(&blank).currency, "USD");
    }

    #[test]
    fn audience_round_trip_and_default() {
        let audience = BTreeSet::from([Audience::Alumni, Audience::Student]);
        let encoded = encode_audience(&audience).unwrap();
        assert_eq!(decode_audience(Some(&encoded)).unwrap(), audience);

        let all = default_audience();
        assert_eq!(decode_audience(Some(&encode_audience(&all).unwrap())).unwrap(), all);
        assert_eq!(decode_audience(None).unwrap(), all);
        assert!(decode_audience(Some(r#"["staff"]"#)).is_err());
    }

    #[test]
    fn list_element_fragment_targets_column() {
        let sql = list_element_like_sql("p.skills");
        assert!(sql.contains("json_each(p.skills)"));
        assert!(sql.ends_with("ESCAPE '\\')"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("eng"), "%eng%");
        assert_eq!(like_pattern(" 100%_a\\b "), "%100\\%\\_a\\\\b%");
    }
}
