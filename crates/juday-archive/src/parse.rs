//! Archive parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ line scan              → raw blocks (candidate key + body lines)
//!          └─ strict key check  → ArchiveEntry, or a counted skip

use juday_core::sheet::DayKey;

/// One valid block decoded from an archive document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
  pub day:  DayKey,
  pub body: String,
}

/// The result of parsing an archive document.
///
/// Parsing is total: format violations never abort the document. A block
/// whose key is not a strict, real `YYYY-MM-DD` date is dropped and counted
/// in `skipped`; fully empty blocks are discarded without counting.
#[derive(Debug, Default)]
pub struct ParsedArchive {
  /// Valid entries in document order. Duplicate days are preserved here;
  /// deduplication is the importer's policy, not the parser's.
  pub entries: Vec<ArchiveEntry>,
  /// Count of malformed blocks dropped during parsing.
  pub skipped: usize,
}

/// Parse an archive document.
///
/// A block starts at each line beginning with `---`; the remainder of that
/// line is the candidate key and the following lines (stripped of the
/// blank-line padding the writer inserts) are the body. Text before the
/// first separator is junk: skipped and counted unless it is all blank.
pub fn parse_archive(input: &str) -> ParsedArchive {
  let mut blocks: Vec<(Option<String>, Vec<&str>)> = Vec::new();
  let mut current: Option<(Option<String>, Vec<&str>)> = None;

  for raw in input.split('\n') {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if let Some(rest) = line.strip_prefix("---") {
      if let Some(block) = current.take() {
        blocks.push(block);
      }
      current = Some((Some(rest.trim_end().to_string()), Vec::new()));
    } else if let Some((_, lines)) = current.as_mut() {
      lines.push(line);
    } else {
      // Content before any separator forms a keyless block.
      current = Some((None, vec![line]));
    }
  }
  if let Some(block) = current.take() {
    blocks.push(block);
  }

  let mut parsed = ParsedArchive::default();
  for (key, lines) in blocks {
    let body = trim_blank_padding(&lines).join("\n");
    match key {
      None => {
        if !body.is_empty() {
          parsed.skipped += 1;
        }
      }
      Some(k) if k.is_empty() && body.is_empty() => {}
      Some(k) => match DayKey::parse(&k) {
        Ok(day) => parsed.entries.push(ArchiveEntry { day, body }),
        Err(_) => parsed.skipped += 1,
      },
    }
  }
  parsed
}

/// Strip leading and trailing empty lines; interior blank lines are body.
fn trim_blank_padding<'a>(lines: &[&'a str]) -> Vec<&'a str> {
  let start = lines.iter().position(|l| !l.is_empty());
  let end = lines.iter().rposition(|l| !l.is_empty());
  match (start, end) {
    (Some(s), Some(e)) => lines[s..=e].to_vec(),
    _ => Vec::new(),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
