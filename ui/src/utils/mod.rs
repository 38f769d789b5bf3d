pub mod drop_handler;
pub mod share_sheet;
