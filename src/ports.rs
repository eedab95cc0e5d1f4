use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Expand a command-line port specification into the list of ports to probe.
///
/// Comma-separated entries, each either a single port (`80`) or an inclusive
/// range (`8000-8010`). Order is preserved and duplicates are kept; the scan
/// engine records one result per requested entry.
pub fn parse_port_spec(spec: &str) -> Result<Vec<u16>> {
    let mut out = Vec::new();
    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            bail!("empty entry in port list: {spec}");
        }
        push_entry(&mut out, entry)?;
    }
    Ok(out)
}

/// Load a port list from a file, one entry per line.
///
/// Each line holds a single port or an inclusive `start-end` range.
/// Everything after `#` is ignored; blank lines are skipped.
pub fn load_ports_from_path(path: impl AsRef<Path>) -> Result<Vec<u16>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read ports file: {}", path.as_ref().display()))?;

    let mut out = Vec::new();
    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }
        push_entry(&mut out, line).with_context(|| format!("line {line_no}"))?;
    }
    Ok(out)
}

/// Every TCP port, in ascending order.
pub fn all_ports() -> Vec<u16> {
    (1..=u16::MAX).collect()
}

fn push_entry(out: &mut Vec<u16>, entry: &str) -> Result<()> {
    if let Some((a, b)) = entry.split_once('-') {
        let start =
            parse_port(a.trim()).with_context(|| format!("invalid start in range: {a}"))?;
        let end = parse_port(b.trim()).with_context(|| format!("invalid end in range: {b}"))?;
        if start > end {
            bail!("invalid range {start}-{end} (start > end)");
        }
        out.extend(start..=end);
        return Ok(());
    }

    let port = parse_port(entry).with_context(|| format!("invalid port value: {entry}"))?;
    out.push(port);
    Ok(())
}

fn parse_port(s: &str) -> Result<u16> {
    let val: u32 = s
        .parse()
        .with_context(|| format!("not a port number: {s}"))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
