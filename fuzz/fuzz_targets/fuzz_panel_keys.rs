//! Fuzz target: `Action::from_key`
//!
//! Arbitrary key lines must decode to an action or to nothing, never
//! panic, and a decoded program name never exceeds its fixed capacity.
//!
//! cargo fuzz run fuzz_panel_keys

#![no_main]

use libfuzzer_sys::fuzz_target;
use microwave::Action;
use microwave::app::commands::PROGRAM_NAME_LEN;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    if let Some(Action::Start(name)) = Action::from_key(&line) {
        assert!(!name.is_empty(), "start needs a program name");
        assert!(name.len() <= PROGRAM_NAME_LEN);
    }
});
