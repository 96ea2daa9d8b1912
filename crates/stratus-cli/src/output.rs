use std::io::{self, Write};

use serde::Serialize;

use crate::error::CliError;

pub fn render<T: Serialize>(payload: &T, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_json(&mut stdout.lock(), payload, pretty)
}

fn write_json<W: Write, T: Serialize>(out: &mut W, payload: &T, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    writeln!(out, "{text}")?;
    Ok(())
}
