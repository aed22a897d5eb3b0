use std::fmt::Formatter;

/// A worksheet row, stored as a zero-based index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row {
    index: u32,
}

impl Row {
    /// The first row of the worksheet holds the column names.
    pub const HEADER: Row = Row { index: 0 };

    pub fn from_index(index: u32) -> Self {
        Row { index }
    }

    /// Row holding the `position`-th data record (zero-based), right below the header.
    pub fn for_record(position: usize) -> Self {
        Row::from_index(u32::try_from(position).unwrap_or(u32::MAX).saturating_add(1))
    }

    /// Returns the row number as a 1-based index, as shown in the spreadsheet UI
    /// and used in A1 notation.
    /// # Examples
    /// ```
    /// use catalog_core::domain::sheets::row::Row;
    /// let row = Row::from_index(0);
    /// assert_eq!(row.number(), 1);
    /// let row = Row::from_index(25);
    /// assert_eq!(row.number(), 26);
    /// ```
    pub fn number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    /// Returns the row index as a zero-based index, as used by dimension ranges
    /// in batch update requests.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row(index: {}, row: {})", self.index(), self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_display() {
        let row = Row::from_index(0);
        assert_eq!(row.to_string(), "1");
    }

    #[test]
    fn test_row_debug() {
        let row = Row::from_index(4);
        assert_eq!(format!("{:?}", row), "Row(index: 4, row: 5)");
    }

    #[test]
    fn test_record_rows_start_below_header() {
        assert_eq!(Row::for_record(0).number(), 2);
        assert_eq!(Row::for_record(3).number(), 5);
    }
}
