//! Instrument dispatch registry.
//!
//! Ported from `wrapper.py`'s `get_mapping` but built explicitly at
//! start-up instead of by enumerating an `instruments` package at import
//! time (`pkgutil.iter_modules`): each instrument contributes a plain
//! `InstrumentEntry` value, pushed in a fixed order.

use regex::Regex;
use serde_json::{Map, Value};

use crate::fields::Schema;
use crate::records::DEFAULT_MAPPING;

pub mod abbott_afinion2;
pub mod abbott_architect;
pub mod dca_vantage;
pub mod roche_cobas_c311;
pub mod sysmex_xn;

/// A registered instrument: the pattern that identifies it from the Header
/// record's text, the record-type-to-schema mapping it uses, and the
/// version string surfaced via `metadata()`.
pub struct InstrumentEntry {
    pub name: &'static str,
    pub header_rx: &'static str,
    pub version: &'static str,
    pub mapping: &'static [(&'static str, Schema)],
}

impl InstrumentEntry {
    /// `get_metadata(wrapper)`'s contract: every captured instrument module
    /// returns exactly `{"version": ..., "header_rx": ...}`.
    pub fn metadata(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("version".into(), Value::String(self.version.into()));
        m.insert("header_rx".into(), Value::String(self.header_rx.into()));
        m
    }
}

pub struct InstrumentRegistry {
    entries: Vec<InstrumentEntry>,
}

impl InstrumentRegistry {
    /// Explicit construction of the registry at process start, in the
    /// fixed order entries are pushed -- first match wins, documented here
    /// rather than left to filesystem enumeration order.
    pub fn with_builtins() -> Self {
        let mut entries = Vec::new();
        entries.push(abbott_architect::entry());
        entries.push(abbott_afinion2::entry());
        entries.push(dca_vantage::entry());
        entries.push(roche_cobas_c311::entry());
        entries.push(sysmex_xn::entry());
        InstrumentRegistry { entries }
    }

    /// Matches `header_text` (the decoded Header record / first message)
    /// against each registered `HEADER_RX` in order; returns the first hit.
    pub fn find(&self, header_text: &str) -> Option<&InstrumentEntry> {
        self.entries.iter().find(|entry| {
            Regex::new(entry.header_rx)
                .map(|re| re.is_match(header_text))
                .unwrap_or(false)
        })
    }

    /// The record-type-to-schema mapping to use for a given header line:
    /// the first matching instrument's mapping, or the default generic
    /// ASTM mapping if none match.
    pub fn mapping_for(&self, header_text: &str) -> &'static [(&'static str, Schema)] {
        self.find(header_text)
            .map(|e| e.mapping)
            .unwrap_or(DEFAULT_MAPPING)
    }
}

impl Default for InstrumentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbott_architect_header_matches() {
        let registry = InstrumentRegistry::with_builtins();
        let header = "H|\\^&|||ARCHITECT^1.00^123456789^H1P1O1R1C1Q1L1|||||||P|E 1394-97|20231205120000";
        let entry = registry.find(header).expect("architect should match");
        assert_eq!(entry.name, "abbott_architect");
    }

    #[test]
    fn unmatched_header_falls_back_to_default_mapping() {
        let registry = InstrumentRegistry::with_builtins();
        assert!(registry.find("H|\\^&|||UNKNOWN-DEVICE").is_none());
        assert_eq!(
            registry.mapping_for("H|\\^&|||UNKNOWN-DEVICE").len(),
            DEFAULT_MAPPING.len()
        );
    }
}
