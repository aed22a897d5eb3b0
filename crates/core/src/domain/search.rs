use super::record::Record;

/// Case-insensitive substring match over every user-visible column of the
/// record. The generated id is not searched. A blank query matches everything.
pub fn matches(record: &Record, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    let rating = record.rating.to_string();
    let fields = [
        record.title.as_str(),
        record.category.label(),
        record.tags.as_str(),
        rating.as_str(),
        record.review.as_str(),
        record.created_at.as_str(),
        record.file_link.as_deref().unwrap_or_default(),
    ];

    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

pub fn filter(records: Vec<Record>, query: &str) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| matches(record, query))
        .collect()
}
