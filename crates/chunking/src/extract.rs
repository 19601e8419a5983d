// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Facet extraction from document text.
//!
//! Extraction runs once per document and uses only static lookup tables
//! and regular expressions; unknown values are the literal sentinel
//! `"unknown"`, never an absent field.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use cairn_core::{Facets, MetadataKey, UNKNOWN};

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("year pattern")
});

// A capitalised name run of one to six tokens ending in a legal suffix.
// "Co." carries its period inside the suffix alternation, so trailing
// punctuation never enters the match.
static COMPANY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"((?:[A-Z&][A-Za-z0-9&'.-]* ){1,6}(?:Co\.|Corporation|Company|Corp|Inc|Ltd|LLC|Group|PLC|plc|AG|SA))(?:[^A-Za-z0-9]|$)",
    )
    .expect("company pattern")
});

// Keyword -> sector table, searched in order; the first keyword present in
// the document wins. Sector names themselves are valid keywords.
const SECTOR_LEXICON: &[(&str, &str)] = &[
    ("technology", "technology"),
    ("software", "technology"),
    ("bank", "finance"),
    ("finance", "finance"),
    ("financial", "finance"),
    ("insurance", "finance"),
    ("healthcare", "healthcare"),
    ("pharmaceutical", "healthcare"),
    ("energy", "energy"),
    ("oil", "energy"),
    ("gas", "energy"),
    ("retail", "retail"),
    ("manufacturing", "manufacturing"),
    ("real estate", "real estate"),
    ("telecom", "telecom"),
];

/// Extract the (sector, company, year) facets from a document.
///
/// Caller-supplied `overrides` win over extracted values field by field;
/// keys other than the recognised facet names are ignored.
pub fn extract_facets(document: &str, overrides: &HashMap<String, String>) -> Facets {
    let mut facets = Facets::new(
        extract_sector(document),
        extract_company(document),
        extract_year(document),
    );

    for key in MetadataKey::ALL_KEYS {
        if let Some(value) = overrides.get(key.name()) {
            if !value.trim().is_empty() {
                facets.set(key, value.trim());
            }
        }
    }

    facets
}

fn extract_year(document: &str) -> String {
    YEAR_RE
        .find(document)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn extract_company(document: &str) -> String {
    COMPANY_RE
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn extract_sector(document: &str) -> String {
    let lowered = document.to_lowercase();
    SECTOR_LEXICON
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, sector)| (*sector).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
