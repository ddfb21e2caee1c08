pub mod edit;
pub mod keywords;
pub mod tables;
