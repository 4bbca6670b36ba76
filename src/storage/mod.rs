pub mod allocation;
pub mod blob;
pub mod catalog;
pub mod header;
pub mod options;
pub mod pager;
pub mod schema;
pub mod storage_manager;
pub mod table;
