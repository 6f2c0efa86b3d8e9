//! Cold-start loader for the saved swarm state.
//!
//! The state file is plain text, one record per line:
//!
//! ```text
//! <40 hex infohash>:<base10 seed count hint>:<base10 downloaded>
//! ```
//!
//! Only the `downloaded` counter survives into the store. The seed count
//! is a hint written by other tracker implementations; peers cannot be
//! resurrected without their addresses, so it is parsed and discarded.
//! Unparseable lines are skipped.
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::PersistentTorrents;
use tracing::warn;

/// The outcome of parsing a saved-state file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedStateFile {
    pub torrents: PersistentTorrents,
    pub skipped_lines: u64,
}

fn parse_line(line: &str) -> Option<(InfoHash, u32)> {
    let mut fields = line.splitn(3, ':');

    let info_hash = fields.next()?.parse::<InfoHash>().ok()?;
    let _seed_count_hint = fields.next()?.parse::<u64>().ok()?;
    let downloaded = fields.next()?.trim().parse::<u32>().ok()?;

    Some((info_hash, downloaded))
}

/// Parses saved-state file content. Malformed lines are skipped and
/// counted, like the access list loader does.
#[must_use]
pub fn parse_state_file(content: &str) -> ParsedStateFile {
    let mut parsed = ParsedStateFile::default();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Some((info_hash, downloaded)) => {
                parsed.torrents.insert(info_hash, downloaded);
            }
            None => {
                warn!("skipping unparsable state file line: {line}");
                parsed.skipped_lines += 1;
            }
        }
    }

    parsed
}

/// Reads and parses a saved-state file.
///
/// # Errors
///
/// Will return `Err` if the file cannot be read.
pub fn load_state_file(path: &str) -> Result<ParsedStateFile, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_state_file(&content))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use swarm_tracker_primitives::info_hash::InfoHash;

    use super::parse_state_file;

    #[test]
    fn it_should_parse_infohash_seeds_and_downloaded_fields() {
        let parsed = parse_state_file("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0:12:34\n");

        let info_hash = InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap();

        assert_eq!(parsed.torrents.get(&info_hash), Some(&34));
        assert_eq!(parsed.skipped_lines, 0);
    }

    #[test]
    fn it_should_skip_and_count_unparsable_lines() {
        let content = "not a record\n3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0:12\n3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0:12:34\n";

        let parsed = parse_state_file(content);

        assert_eq!(parsed.torrents.len(), 1);
        assert_eq!(parsed.skipped_lines, 2);
    }

    #[test]
    fn it_should_ignore_blank_lines() {
        let parsed = parse_state_file("\n\n");

        assert!(parsed.torrents.is_empty());
        assert_eq!(parsed.skipped_lines, 0);
    }
}
