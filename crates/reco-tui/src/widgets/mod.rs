//! Ratatui widgets for the reco TUI.

pub mod category_list;
pub mod command_bar;
pub mod help;
pub mod query_form;
pub mod results;
pub mod status_bar;
