// OUI Dataset Parser Module
//
// Parses the two dataset resources.
//
// Prefix table format: one record per line, tab-separated
//   <HEX PREFIX>\t<Vendor Name>
// The prefix is 6 (MA-L, 24-bit), 7 (MA-M, 28-bit) or 9 (MA-S / IAB, 36-bit)
// uppercase hex digits without separators. There is no header row.
//
// Localization format: a JSON object mapping vendor name -> localized name.

use std::collections::HashMap;

use crate::error::Result;

/// Candidate prefix lengths in hex digits, most specific first
pub const PREFIX_LENGTHS: [usize; 3] = [9, 7, 6];

/// Vendor name keyed by uppercase hex prefix
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    entries: HashMap<String, String>,
}

impl PrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: impl Into<String>, vendor: impl Into<String>) {
        self.entries.insert(prefix.into(), vendor.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest-prefix match of an already-normalized address
    ///
    /// Tries 9, 7 and 6 leading digits in turn; the first hit wins.
    pub fn longest_match(&self, normalized: &str) -> Option<&str> {
        PREFIX_LENGTHS
            .iter()
            .filter(|&&len| normalized.len() >= len)
            .find_map(|&len| normalized.get(..len).and_then(|p| self.get(p)))
    }

    /// Number of entries at each prefix length, in `PREFIX_LENGTHS` order
    pub fn counts_by_length(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for key in self.entries.keys() {
            if let Some(i) = PREFIX_LENGTHS.iter().position(|&len| len == key.len()) {
                counts[i] += 1;
            }
        }
        counts
    }
}

/// Localized vendor name keyed by the exact vendor name
pub type LocalizationTable = HashMap<String, String>;

/// Line accounting from a prefix table parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub records: usize,
    pub skipped: usize,
}

/// Parse the tab-separated prefix table
///
/// Never fails: lines without a tab are skipped.
pub fn parse_prefix_table(data: &str) -> (PrefixTable, ParseStats) {
    let mut table = PrefixTable::new();
    let mut stats = ParseStats::default();

    for line in data.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        match line.split_once('\t') {
            Some((prefix, vendor)) => {
                table.insert(prefix, vendor);
                stats.records += 1;
            }
            None => stats.skipped += 1,
        }
    }

    (table, stats)
}

/// Parse the localization JSON document
pub fn parse_localization(data: &str) -> Result<LocalizationTable> {
    Ok(serde_json::from_str(data)?)
}

/// Strip `-` and `:` separators and uppercase
pub fn normalize_mac(mac: &str) -> String {
    mac.chars()
        .filter(|c| *c != '-' && *c != ':')
        .flat_map(char::to_uppercase)
        .collect()
}
