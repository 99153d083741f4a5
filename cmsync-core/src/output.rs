//! Output helpers (made by FontLab https://www.fontlab.com/)

use std::io::Write;

use anyhow::Result;

use crate::sync::SyncReport;

/// Write the report as prettified JSON followed by a newline.
pub fn write_json_pretty(report: &SyncReport, mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write the would-be build file verbatim (used for dry runs).
pub fn write_rendered(text: &str, mut w: impl Write) -> Result<()> {
    w.write_all(text.as_bytes())?;
    Ok(())
}
