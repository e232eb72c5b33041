//! `get_current_time` tool

use agent_tools::{Arguments, InputSchema, ParamType, ToolDescriptor, ToolHandler};
use chrono::{DateTime, Local, TimeZone};
use serde_json::{Value, json};
use std::fmt::{Display, Write};

pub const TOOL_NAME: &str = "get_current_time";

/// Format used when the caller does not pass one
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render `time` with strftime-style `format`
///
/// Unknown specifiers are an error rather than a panic.
pub fn format_time<Tz>(time: &DateTime<Tz>, format: &str) -> anyhow::Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    write!(out, "{}", time.format(format))
        .map_err(|_| anyhow::anyhow!("invalid time format: {format:?}"))?;
    Ok(out)
}

/// Local wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentTime;

impl ToolHandler for CurrentTime {
    fn call(&self, args: &Arguments) -> anyhow::Result<Value> {
        let format = args.str("format")?;
        Ok(Value::String(format_time(&Local::now(), format)?))
    }
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        TOOL_NAME,
        "Get the current local time formatted with a strftime-style format string",
        InputSchema::new().optional(
            "format",
            ParamType::String,
            json!(DEFAULT_TIME_FORMAT),
            Some("Time format string, e.g. \"%Y-%m-%d %H:%M:%S\""),
        ),
        CurrentTime,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_fixed_time() {
        let time = Utc.with_ymd_and_hms(2024, 1, 5, 8, 3, 9).unwrap();

        assert_eq!(format_time(&time, DEFAULT_TIME_FORMAT).unwrap(), "2024-01-05 08:03:09");
        assert_eq!(format_time(&time, "%Y-%m-%d").unwrap(), "2024-01-05");
        assert_eq!(format_time(&time, "%H:%M").unwrap(), "08:03");
        assert_eq!(format_time(&time, "plain text").unwrap(), "plain text");
    }

    #[test]
    fn test_invalid_format_is_an_error() {
        let time = Utc.with_ymd_and_hms(2024, 1, 5, 8, 3, 9).unwrap();
        assert!(format_time(&time, "%Q").is_err());
    }

    #[test]
    fn test_handler_uses_default_format() {
        let tool = descriptor();
        let args = tool.input_schema().validate(json!({})).unwrap();
        let value = CurrentTime.call(&args).unwrap();
        let text = value.as_str().unwrap();

        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(text.len(), 19);
        assert_eq!(&text[4..5], "-");
        assert_eq!(&text[10..11], " ");
    }
}
