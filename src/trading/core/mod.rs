pub mod params;
pub mod pipeline;
pub mod rate_validator;
pub mod trade;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;
