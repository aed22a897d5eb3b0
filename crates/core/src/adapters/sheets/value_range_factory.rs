use google_sheets4::api::ValueRange;
use serde_json::Value;
use std::borrow::Cow;

pub trait ValueRangeFactory {
    fn from_rows(rows: Vec<Vec<String>>) -> Self;
}

fn wrap_value<'a, T: Into<Cow<'a, str>>>(value: T) -> Value {
    Value::String(value.into().into_owned())
}

impl ValueRangeFactory for ValueRange {
    /// Rows are padded to the widest one so that shorter rows overwrite the
    /// cells they would otherwise leave untouched.
    fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let values = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row.into_iter().map(wrap_value).collect()
            })
            .collect();

        ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_value() {
        let value = wrap_value("1");
        assert_eq!(value, Value::String("1".to_string()));
    }

    #[test]
    fn test_from_rows_pads_to_widest_row() {
        let value_range = ValueRange::from_rows(vec![
            vec!["id".to_string(), "title".to_string()],
            vec!["1".to_string()],
        ]);
        assert_eq!(
            value_range.values,
            Some(vec![
                vec![
                    Value::String("id".to_string()),
                    Value::String("title".to_string())
                ],
                vec![Value::String("1".to_string()), Value::String(String::new())]
            ]),
            "Short rows should be padded with empty strings"
        );
    }

    #[test]
    fn test_from_rows_empty() {
        let value_range = ValueRange::from_rows(vec![]);
        assert_eq!(value_range.values, Some(vec![]));
    }
}
