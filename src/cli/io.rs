//! JSON output for one-shot commands: one object per line on stdout.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Writes `{"status":"ok","data":...}` to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    write_response_to(&mut stdout, data)
}

fn write_response_to<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_one_line() {
        let mut buffer = Vec::new();
        write_response_to(&mut buffer, serde_json::json!({"total": 3})).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "{\"data\":{\"total\":3},\"status\":\"ok\"}\n");
    }
}
