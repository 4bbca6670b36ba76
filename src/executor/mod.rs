pub mod row_reader;
pub mod scan;
pub mod sequential_scan;
