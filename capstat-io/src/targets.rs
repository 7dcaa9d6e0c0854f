use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use capstat_core::models::Target;
use capstat_core::utils::{LineTokenizer, is_header_line};
use log::warn;

use crate::bedgraph::open_lines;
use crate::error::{CapstatIoError, Result};

///
/// Read a `chrom start end name [strand]` targets file, keyed by target name.
///
/// Header and comment lines are skipped. A name given twice keeps the later target.
///
pub fn read_targets(path: &Path) -> Result<BTreeMap<String, Target>> {
    let mut targets = BTreeMap::new();

    for (i, line) in open_lines(path)?.enumerate() {
        let line = line?;
        if is_header_line(&line) {
            continue;
        }

        let target: Target = line.parse().map_err(|source| CapstatIoError::Track {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;

        if let Some(previous) = targets.insert(target.name.clone(), target) {
            warn!(
                "Target `{}` is defined more than once in {}, keeping the last definition",
                previous.name,
                path.display()
            );
        }
    }

    Ok(targets)
}

/// One line of an inputs list: a track and the target (and optional condition) it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEntry {
    pub path: PathBuf,
    pub target: String,
    pub condition: Option<String>,
}

///
/// Read a `filepath target [condition]` inputs list.
///
/// Relative track paths are resolved against the directory holding the list. Every target
/// must exist in `targets`, otherwise the whole list is rejected.
///
pub fn read_inputs(path: &Path, targets: &BTreeMap<String, Target>) -> Result<Vec<InputEntry>> {
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let mut entries = Vec::new();

    for (i, line) in open_lines(path)?.enumerate() {
        let line = line?;
        if is_header_line(&line) {
            continue;
        }

        let mut tokens = LineTokenizer::new(&line);
        let malformed = |reason: String| CapstatIoError::MalformedInputsLine {
            path: path.to_path_buf(),
            line: i + 1,
            reason,
        };

        let file = tokens
            .next_str("filepath")
            .map_err(|e| malformed(e.to_string()))?;
        let target = tokens
            .next_str("target")
            .map_err(|e| malformed(e.to_string()))?;
        let condition = tokens.next_opt_str().map(str::to_string);
        if let Some(extra) = tokens.rest() {
            return Err(malformed(format!("unexpected trailing columns `{}`", extra)));
        }

        if !targets.contains_key(target) {
            return Err(CapstatIoError::UnknownTarget {
                path: path.to_path_buf(),
                line: i + 1,
                target: target.to_string(),
            });
        }

        entries.push(InputEntry {
            path: base.join(file),
            target: target.to_string(),
            condition,
        });
    }

    Ok(entries)
}
