pub mod common;

pub mod a001_category;
pub mod a002_unit_of_measure;
pub mod a003_item;
