pub mod constants;
pub mod datetime;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
