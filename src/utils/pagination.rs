use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Parse a requested page. Accepts integers, integral floats and numeric
/// strings; anything else, zero or negative is rejected.
pub fn validate_page(raw: Option<&JsonValue>) -> Result<u32> {
    let Some(raw) = raw else {
        return Ok(1);
    };
    match raw {
        JsonValue::Null => Ok(1),
        JsonValue::Number(n) => {
            if let Some(v) = n.as_u64() {
                positive(v as f64, raw)
            } else if let Some(v) = n.as_i64() {
                positive(v as f64, raw)
            } else {
                positive(n.as_f64().unwrap_or(f64::NAN), raw)
            }
        }
        JsonValue::String(s) => parse_page_str(s),
        other => Err(Error::InvalidPage(format!(
            "\"page\" must be a number, got {}",
            other
        ))),
    }
}

pub fn parse_page_str(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| Error::InvalidPage(format!("\"page\" must be a number, got '{}'", raw)))?;
    positive(value, &JsonValue::String(raw.to_string()))
}

fn positive(value: f64, raw: &JsonValue) -> Result<u32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::InvalidPage(format!(
            "\"page\" must be an integer, got {}",
            raw
        )));
    }
    if value < 1.0 {
        return Err(Error::InvalidPage(format!(
            "\"page\" must be greater than or equal to 1, got {}",
            raw
        )));
    }
    // Every page this far out is past the last one.
    Ok(value.min(u32::MAX as f64) as u32)
}

pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Slice `[(page-1)*per_page, page*per_page)`; past the end yields no items.
pub fn paginate<T>(items: Vec<T>, page: u32, per_page: usize) -> Page<T> {
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let start = (page as usize - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();

    Page {
        items,
        total,
        page,
        per_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_page_defaults_to_first() {
        assert_eq!(validate_page(None).unwrap(), 1);
        assert_eq!(validate_page(Some(&JsonValue::Null)).unwrap(), 1);
    }

    #[test]
    fn accepts_integers_and_numeric_strings() {
        assert_eq!(validate_page(Some(&json!(3))).unwrap(), 3);
        assert_eq!(validate_page(Some(&json!(2.0))).unwrap(), 2);
        assert_eq!(validate_page(Some(&json!("4"))).unwrap(), 4);
        assert_eq!(parse_page_str(" 7 ").unwrap(), 7);
    }

    #[test]
    fn rejects_zero_negative_fractional_and_garbage() {
        for bad in [json!(0), json!(-1), json!(1.5), json!("abc"), json!(true), json!([1])] {
            assert!(
                matches!(validate_page(Some(&bad)), Err(Error::InvalidPage(_))),
                "{} should be rejected",
                bad
            );
        }
        assert!(matches!(parse_page_str("0"), Err(Error::InvalidPage(_))));
        assert!(matches!(parse_page_str("-2"), Err(Error::InvalidPage(_))));
        assert!(matches!(parse_page_str("2.5"), Err(Error::InvalidPage(_))));
        assert!(matches!(parse_page_str("NaN"), Err(Error::InvalidPage(_))));
    }

    #[test]
    fn pages_concatenate_to_the_full_set() {
        for total in [0usize, 1, 9, 10, 11, 25, 30] {
            let items: Vec<usize> = (0..total).collect();
            let pages = paginate(items.clone(), 1, 10).total_pages;
            assert_eq!(pages, total.div_ceil(10));

            let mut joined = Vec::new();
            for page in 1..=pages.max(1) as u32 {
                joined.extend(paginate(items.clone(), page, 10).items);
            }
            assert_eq!(joined, items);
        }
    }

    #[test]
    fn page_beyond_last_is_empty() {
        let page = paginate((0..12).collect::<Vec<_>>(), 5, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn page_past_u32_range_is_an_empty_page() {
        let page = validate_page(Some(&json!(5_000_000_000u64))).unwrap();
        assert_eq!(page, u32::MAX);
        assert_eq!(parse_page_str("5000000000").unwrap(), u32::MAX);

        let out = paginate((0..12).collect::<Vec<_>>(), page, 10);
        assert!(out.items.is_empty());
        assert_eq!(out.total, 12);
    }
}
