//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! mock adapters. Everything runs on the host with real threads and short
//! loop intervals.

mod mock_hw;
mod program_tests;
mod system_tests;
