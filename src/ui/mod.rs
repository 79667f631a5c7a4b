pub mod search_bar;
pub mod search_results;
