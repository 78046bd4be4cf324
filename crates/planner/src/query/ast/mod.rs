pub mod create_table;
pub mod drop_table;
pub mod max_date;
pub mod select;
