//! Program catalog: resolves the name carried by a start action.

use crate::config::SystemConfig;
use crate::program::ProgramLogic;
use crate::program::defrost::DefrostingProgram;

/// Build the program registered under `name` (case-insensitive).
pub fn lookup(name: &str, config: &SystemConfig) -> Option<Box<dyn ProgramLogic>> {
    let name = name.trim().to_ascii_lowercase();
    match name.as_str() {
        "defrost" | "defrosting" => Some(Box::new(DefrostingProgram::new(config))),
        _ => None,
    }
}
