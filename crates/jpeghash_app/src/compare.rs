//! Groups files that share a digest in a listing written by the batch driver.

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::record::FileName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub digest: String,
    pub files: Vec<FileName>,
}

/// Reads a TSV listing and returns every digest shared by more than one file.
///
/// Digests keep the order of their first appearance; files keep listing order
/// and their bytes exactly as listed.
/// A `!ERROR` line or a line without a tab aborts the comparison.
pub fn find_duplicates<R: BufRead>(listing: R) -> Result<Vec<DuplicateGroup>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for (n, line) in listing.split(b'\n').enumerate() {
        let line_no = n + 1;
        let mut line = line.with_context(|| format!("Failed to read listing line {line_no}"))?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        if line.is_empty() {
            continue;
        }
        if line[0] == b'!' {
            bail!(
                "Listing line {line_no} is an error record: {}",
                String::from_utf8_lossy(&line)
            );
        }
        let Some(tab) = line.iter().position(|&b| b == b'\t') else {
            bail!(
                "Listing line {line_no} has no tab separator: {}",
                String::from_utf8_lossy(&line)
            );
        };
        let Ok(digest) = std::str::from_utf8(&line[..tab]) else {
            bail!("Listing line {line_no} has a non-text digest");
        };

        let slot = *index.entry(digest.to_string()).or_insert_with(|| {
            groups.push(DuplicateGroup {
                digest: digest.to_string(),
                files: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].files.push(FileName::from(&line[tab + 1..]));
    }

    groups.retain(|g| g.files.len() > 1);
    Ok(groups)
}

pub fn write_groups<W: Write>(groups: &[DuplicateGroup], out: &mut W) -> Result<()> {
    for group in groups {
        writeln!(out, "{}", group.digest)?;
        for file in &group.files {
            out.write_all(b" - ")?;
            out.write_all(file.as_bytes())?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
