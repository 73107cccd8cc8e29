pub mod normalize;
pub mod overdue;
pub mod parser;
pub mod tables;

pub use normalize::normalize_draw_date;
pub use overdue::{compute_overdue, reference_instant};
pub use parser::{parse_records, parse_winning_numbers};
pub use tables::{build_tables, build_tables_concurrently, DayOrder, DerivedTables};
