use std::path::Path;

use anyhow::{Context, Result, bail};
use glowbeat_play::{InputEvent, InputKind};

/// Reads a recorded input log: one `positionMs,kind` per line, where kind is
/// `tap`, `hold-start` or `hold-end`. Blank lines and `#` comments are skipped.
/// Returned events are sorted by position.
pub fn read(path: &Path) -> Result<Vec<InputEvent>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading input log {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing input log {}", path.display()))
}

pub fn parse(text: &str) -> Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((position, kind)) = line.split_once(',') else {
            bail!("line {}: expected `positionMs,kind`, got `{line}`", line_no + 1);
        };
        let position_ms: f64 = position
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad position `{position}`", line_no + 1))?;
        if !position_ms.is_finite() {
            bail!("line {}: position must be finite", line_no + 1);
        }
        let kind: InputKind = kind
            .parse()
            .with_context(|| format!("line {}", line_no + 1))?;
        events.push(InputEvent { kind, position_ms });
    }
    events.sort_by(|a, b| a.position_ms.total_cmp(&b.position_ms));
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_sorts() {
        let events = parse("# recorded\n1100,tap\n\n900, hold-start\n1500,hold-end\n").unwrap();
        let kinds: Vec<InputKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![InputKind::HoldStart, InputKind::Tap, InputKind::HoldEnd]
        );
        assert_eq!(events[0].position_ms, 900.0);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(parse("1000").is_err());
        assert!(parse("abc,tap").is_err());
        assert!(parse("1000,jump").is_err());
        assert!(parse("inf,tap").is_err());
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.csv");
        std::fs::write(&path, "100,tap\n").unwrap();
        assert_eq!(read(&path).unwrap().len(), 1);
    }
}
