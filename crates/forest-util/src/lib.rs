//! Test-support utilities shared by the tree suites.

pub mod fuzzer;

pub use fuzzer::Fuzzer;
