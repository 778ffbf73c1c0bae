use clauseguard_core::error::ClauseError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), ClauseError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
