pub mod pages;
pub mod test_helpers;
