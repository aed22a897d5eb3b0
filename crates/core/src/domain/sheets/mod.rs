pub mod a1_notation;
pub mod column;
pub mod record_row;
pub mod row;
