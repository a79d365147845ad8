//! Test module for zodiac
//!
//! Scenario tests per component plus property-based tests using proptest
//! to check the invariants of the validator.



#[cfg(test)]
pub mod env_tests;

#[cfg(test)]
pub mod contract_tests;

#[cfg(test)]
pub mod property_tests;
