//! Scoring Engine: assigns compatibility scores to a candidate contact.
//!
//! Four independent axes (location, title, confidence, company), combined with
//! `ScoringWeights` and rounded to an integer. Keyword tables are data
//! (`ScoringTables`), loaded from the embedded JSON or a file at startup, so new
//! metros or titles never touch this code.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::outreach::contact::Contact;
use crate::outreach::text::{contains_prefix, contains_term};

const BUILTIN_TABLES: &str = include_str!("../../data/scoring_tables.json");

const EXACT_LOCATION: f64 = 100.0;
const METRO_NICKNAME: f64 = 90.0;
const METRO_KEYWORD: f64 = 80.0;
const REMOTE_NEUTRAL: f64 = 50.0;
const SUBSTRING_LOCATION: f64 = 30.0;

const DISQUALIFIED_TITLE: f64 = -50.0;
const TECHNICAL_FUNCTION_BONUS: f64 = 20.0;
const AGENCY_PENALTY: f64 = -30.0;

// ────────────────────────────────────────────────────────────────────────────
// Tables and weights
// ────────────────────────────────────────────────────────────────────────────

/// A named metro area. The key itself counts as a nickname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetroArea {
    pub key: String,
    #[serde(default, alias = "metro")]
    pub nicknames: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeniorityKeyword {
    pub keyword: String,
    /// Negative scores are penalties and stack; positive scores take the max tier.
    pub score: i32,
}

/// Keyword tables consulted by the scorers. Metros are consulted in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringTables {
    pub metros: Vec<MetroArea>,
    pub seniority: Vec<SeniorityKeyword>,
    pub disqualifiers: Vec<String>,
    pub technical_job_markers: Vec<String>,
    pub technical_title_keywords: Vec<String>,
    pub agency_keywords: Vec<String>,
}

impl ScoringTables {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tables: ScoringTables = serde_json::from_str(json)?;
        tables.lowercase_all();
        Ok(tables)
    }

    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(BUILTIN_TABLES)
    }

    /// Loads tables from `path` if given, otherwise the built-in set.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(Path::new(path))
                    .with_context(|| format!("Failed to read scoring tables from '{path}'"))?;
                Self::from_json(&raw)
                    .with_context(|| format!("Invalid scoring tables in '{path}'"))
            }
            None => Self::builtin().context("Built-in scoring tables are invalid"),
        }
    }

    /// First metro whose key appears in the (lowercased) job location.
    fn metro_for(&self, job_location: &str) -> Option<&MetroArea> {
        self.metros
            .iter()
            .find(|m| contains_term(job_location, &m.key))
    }

    fn lowercase_all(&mut self) {
        let lower = |v: &mut Vec<String>| v.iter_mut().for_each(|s| *s = s.trim().to_lowercase());
        for metro in &mut self.metros {
            metro.key = metro.key.trim().to_lowercase();
            lower(&mut metro.nicknames);
            lower(&mut metro.keywords);
        }
        for entry in &mut self.seniority {
            entry.keyword = entry.keyword.trim().to_lowercase();
        }
        lower(&mut self.disqualifiers);
        lower(&mut self.technical_job_markers);
        lower(&mut self.technical_title_keywords);
        lower(&mut self.agency_keywords);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub location: f64,
    pub title: f64,
    pub confidence: f64,
    pub company: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            location: 0.40,
            title: 0.35,
            confidence: 0.15,
            company: 0.10,
        }
    }
}

/// What the candidates are being scored against.
#[derive(Debug, Clone, Default)]
pub struct ScoringTarget {
    pub job_location: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub domain: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Axis scorers
// ────────────────────────────────────────────────────────────────────────────

/// Location compatibility: exact 100, metro nickname 90, metro keyword 80,
/// substring 30, remote posting 50, otherwise 0.
pub fn location_score(candidate: &str, job: &str, tables: &ScoringTables) -> f64 {
    let candidate = candidate.trim().to_lowercase();
    let job = job.trim().to_lowercase();

    if candidate.is_empty() || job.is_empty() {
        return 0.0;
    }
    if candidate == job {
        return EXACT_LOCATION;
    }

    if let Some(metro) = tables.metro_for(&job) {
        let nickname_hit = contains_term(&candidate, &metro.key)
            || metro.nicknames.iter().any(|n| contains_term(&candidate, n));
        if nickname_hit {
            return METRO_NICKNAME;
        }
        if metro.keywords.iter().any(|k| contains_term(&candidate, k)) {
            return METRO_KEYWORD;
        }
    }

    // Country-level fallback
    if candidate.contains(&job) || job.contains(&candidate) {
        return SUBSTRING_LOCATION;
    }

    // Remote postings are neutral, not a mismatch
    if job.contains("remote") || job.contains("anywhere") {
        return REMOTE_NEUTRAL;
    }

    0.0
}

/// Title compatibility: seniority tier + function bonus + agency penalty.
///
/// Disqualifying markers ("former", "ex-", ...) short-circuit to -50.
pub fn title_score(title: &str, job_title: Option<&str>, tables: &ScoringTables) -> f64 {
    let title = title.trim().to_lowercase();

    if tables.disqualifiers.iter().any(|d| contains_prefix(&title, d)) {
        return DISQUALIFIED_TITLE;
    }

    let mut tier = 0_i32;
    let mut penalties = 0_i32;
    for entry in tables
        .seniority
        .iter()
        .filter(|e| contains_term(&title, &e.keyword))
    {
        if entry.score < 0 {
            penalties += entry.score;
        } else {
            tier = tier.max(entry.score);
        }
    }

    let job_is_technical = job_title
        .map(str::to_lowercase)
        .is_some_and(|jt| tables.technical_job_markers.iter().any(|m| jt.contains(m.as_str())));
    let function_bonus = if job_is_technical
        && tables
            .technical_title_keywords
            .iter()
            .any(|k| contains_term(&title, k))
    {
        TECHNICAL_FUNCTION_BONUS
    } else {
        0.0
    };

    let agency_penalty = if tables.agency_keywords.iter().any(|k| contains_term(&title, k)) {
        AGENCY_PENALTY
    } else {
        0.0
    };

    f64::from(tier + penalties) + function_bonus + agency_penalty
}

/// Data-quality signals, additive (max 45).
pub fn confidence_score(contact: &Contact) -> f64 {
    let mut score = 0.0;
    if contact.is_resolved() && contact.confidence > 0.9 {
        score += 20.0;
    }
    if contact
        .linkedin_url
        .as_deref()
        .is_some_and(|url| url.to_lowercase().contains("linkedin.com"))
    {
        score += 10.0;
    }
    if contact
        .email_status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("valid"))
    {
        score += 15.0;
    }
    score
}

/// Company match: +20 company name, +15 domain, -10 different company, else 0.
pub fn company_score(
    contact: &Contact,
    target_company: Option<&str>,
    target_domain: Option<&str>,
) -> f64 {
    let target_company = target_company
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());
    let target_domain = target_domain
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty());

    if target_company.is_none() && target_domain.is_none() {
        return 0.0;
    }

    let company = contact.company.trim().to_lowercase();
    let domain = contact.domain.trim().to_lowercase();

    if let Some(tc) = &target_company {
        if !company.is_empty() && company.contains(tc.as_str()) {
            return 20.0;
        }
    }
    if let Some(td) = &target_domain {
        if !domain.is_empty() && domain.contains(td.as_str()) {
            return 15.0;
        }
    }
    if let Some(tc) = &target_company {
        if !company.is_empty() && !tc.contains(company.as_str()) {
            return -10.0;
        }
    }
    0.0
}

/// Weighted combination of all four axes, rounded to the nearest integer.
pub fn score_contact(
    contact: &Contact,
    target: &ScoringTarget,
    tables: &ScoringTables,
    weights: &ScoringWeights,
) -> i32 {
    let location = target
        .job_location
        .as_deref()
        .map(|job| location_score(&contact.location, job, tables))
        .unwrap_or(0.0);
    let title = title_score(&contact.position, target.job_title.as_deref(), tables);
    let confidence = confidence_score(contact);
    let company = company_score(contact, target.company.as_deref(), target.domain.as_deref());

    (weights.location * location
        + weights.title * title
        + weights.confidence * confidence
        + weights.company * company)
        .round() as i32
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ScoringTables {
        ScoringTables::builtin().unwrap()
    }

    #[test]
    fn test_builtin_tables_parse() {
        let t = tables();
        assert_eq!(t.metros.len(), 10);
        assert_eq!(t.metros[0].key, "san francisco");
        assert!(t.seniority.iter().any(|s| s.score < 0));
    }

    #[test]
    fn test_location_exact_match_case_insensitive() {
        let t = tables();
        assert_eq!(location_score("San Francisco", "San Francisco", &t), 100.0);
        assert_eq!(location_score("san francisco ", "SAN FRANCISCO", &t), 100.0);
    }

    #[test]
    fn test_location_metro_nickname() {
        let t = tables();
        assert_eq!(location_score("SF", "San Francisco", &t), 90.0);
        assert_eq!(location_score("Bay Area", "San Francisco, CA", &t), 90.0);
        assert_eq!(location_score("Brooklyn, NY", "New York", &t), 90.0);
    }

    #[test]
    fn test_location_metro_keyword() {
        let t = tables();
        assert_eq!(location_score("California", "San Francisco", &t), 80.0);
        assert_eq!(location_score("Bellevue", "Seattle", &t), 80.0);
    }

    #[test]
    fn test_location_short_keyword_not_matched_inside_word() {
        let t = tables();
        // "ca" must not match inside "chicago"
        assert_eq!(location_score("Chicago", "San Francisco", &t), 0.0);
    }

    #[test]
    fn test_location_substring_fallback() {
        let t = tables();
        assert_eq!(location_score("Berlin, Germany", "Germany", &t), 30.0);
    }

    #[test]
    fn test_location_remote_posting_neutral() {
        let t = tables();
        assert_eq!(location_score("Toronto", "Remote", &t), 50.0);
        assert_eq!(location_score("Toronto", "Anywhere in EU", &t), 50.0);
    }

    #[test]
    fn test_location_unrelated_is_zero() {
        let t = tables();
        assert_eq!(location_score("Tokyo", "Berlin", &t), 0.0);
        assert_eq!(location_score("", "Berlin", &t), 0.0);
        assert_eq!(location_score("Tokyo", "", &t), 0.0);
    }

    #[test]
    fn test_title_disqualified() {
        let t = tables();
        assert_eq!(title_score("Former VP of Engineering", None, &t), -50.0);
        assert_eq!(
            title_score("Ex-Google CTO", Some("Software Engineer"), &t),
            -50.0
        );
        assert_eq!(title_score("Seeking new opportunities", None, &t), -50.0);
    }

    #[test]
    fn test_title_disqualifier_matches_word_prefix() {
        let t = tables();
        assert_eq!(title_score("Formerly Director at Acme", None, &t), -50.0);
        assert_eq!(title_score("Former Director", None, &t), -50.0);
        // "former" inside a word is not a disqualifier
        assert!(title_score("Reformer Program Director", None, &t) > 0.0);
    }

    #[test]
    fn test_title_seniority_plus_function_bonus() {
        let t = tables();
        assert_eq!(
            title_score("Senior Software Engineer", Some("Software Engineer"), &t),
            60.0
        );
    }

    #[test]
    fn test_title_takes_max_tier() {
        let t = tables();
        assert_eq!(title_score("VP Engineering Manager", None, &t), 70.0);
        assert_eq!(title_score("CTO", None, &t), 100.0);
    }

    #[test]
    fn test_title_director_is_not_cto() {
        let t = tables();
        assert_eq!(title_score("Director of Sales", None, &t), 60.0);
    }

    #[test]
    fn test_title_no_bonus_for_non_technical_job() {
        let t = tables();
        assert_eq!(
            title_score("Senior Software Engineer", Some("Account Executive"), &t),
            40.0
        );
    }

    #[test]
    fn test_title_agency_penalties_stack() {
        let t = tables();
        // recruiter 30, agency -20 (tier table), agency -30 (agency keyword)
        assert_eq!(title_score("Agency Recruiter", None, &t), -20.0);
        // consultant -20 only; not an agency keyword
        assert_eq!(title_score("Consultant", None, &t), -20.0);
    }

    #[test]
    fn test_title_unknown_is_zero() {
        let t = tables();
        assert_eq!(title_score("Unknown Position", None, &t), 0.0);
        assert_eq!(title_score("", Some("Software Engineer"), &t), 0.0);
    }

    #[test]
    fn test_confidence_score_additive() {
        let contact = Contact {
            email: "a@acme.com".to_string(),
            confidence: 0.95,
            linkedin_url: Some("https://www.linkedin.com/in/a".to_string()),
            email_status: Some("valid".to_string()),
            ..Default::default()
        };
        assert_eq!(confidence_score(&contact), 45.0);

        let unresolved = Contact {
            confidence: 0.95,
            ..Default::default()
        };
        assert_eq!(confidence_score(&unresolved), 0.0);
    }

    #[test]
    fn test_confidence_threshold_is_strict() {
        let contact = Contact {
            email: "a@acme.com".to_string(),
            confidence: 0.9,
            ..Default::default()
        };
        assert_eq!(confidence_score(&contact), 0.0);
    }

    #[test]
    fn test_company_score_cases() {
        let mut contact = Contact {
            company: "Acme Corporation".to_string(),
            domain: "acme.com".to_string(),
            ..Default::default()
        };
        assert_eq!(company_score(&contact, Some("acme"), None), 20.0);
        assert_eq!(company_score(&contact, Some("Globex"), Some("acme.com")), 15.0);

        contact.domain.clear();
        assert_eq!(company_score(&contact, Some("Globex"), Some("globex.com")), -10.0);
        assert_eq!(company_score(&contact, None, None), 0.0);

        let blank = Contact::default();
        assert_eq!(company_score(&blank, Some("Acme"), Some("acme.com")), 0.0);
    }

    #[test]
    fn test_company_substring_either_way_is_not_penalised() {
        let contact = Contact {
            company: "Acme".to_string(),
            ..Default::default()
        };
        assert_eq!(company_score(&contact, Some("Acme Corp"), None), 0.0);
    }

    #[test]
    fn test_combined_score_weights_and_rounding() {
        let t = tables();
        let contact = Contact {
            position: "Senior Software Engineer".to_string(),
            location: "San Francisco".to_string(),
            email: "a@acme.com".to_string(),
            confidence: 0.95,
            ..Default::default()
        };
        let target = ScoringTarget {
            job_location: Some("San Francisco".to_string()),
            job_title: Some("Software Engineer".to_string()),
            ..Default::default()
        };
        // 0.40*100 + 0.35*60 + 0.15*20 + 0.10*0 = 40 + 21 + 3 = 64
        assert_eq!(
            score_contact(&contact, &target, &t, &ScoringWeights::default()),
            64
        );
    }

    #[test]
    fn test_custom_tables_from_json() {
        let t = ScoringTables::from_json(
            r#"{
                "metros": [{"key": "Berlin", "metro": ["BER"], "keywords": ["Germany"]}],
                "seniority": [],
                "disqualifiers": [],
                "technical_job_markers": [],
                "technical_title_keywords": [],
                "agency_keywords": []
            }"#,
        )
        .unwrap();
        assert_eq!(location_score("ber", "berlin", &t), 90.0);
        assert_eq!(location_score("Munich, Germany", "Berlin", &t), 80.0);
    }
}
