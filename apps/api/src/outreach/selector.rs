//! Contact Selector: scores the candidate pool and picks a diversity-balanced
//! shortlist.
//!
//! Algorithm:
//! 1. Score every candidate (see `scoring::score_contact`) and sort descending
//!    (stable, so ties keep provider order)
//! 2. Partition by title into managers, gatekeepers and others
//! 3. Take up to ceil(cap / 3) managers, then the same quota of gatekeepers
//! 4. Fill remaining slots from others, highest score first
//! 5. Backfill from any not-yet-selected candidate until the cap is reached

use crate::outreach::contact::Contact;
use crate::outreach::scoring::{score_contact, ScoringTables, ScoringTarget, ScoringWeights};
use crate::outreach::text::{contains_prefix, contains_term};

/// Default shortlist cap.
pub const MAX_CONTACTS_TO_RESOLVE: usize = 20;

const MANAGER_KEYWORDS: &[&str] = &["manager", "director", "vp", "svp", "evp", "avp", "head of"];
/// Matched as word prefixes so "hrbp" and "recruiters" count.
const GATEKEEPER_KEYWORDS: &[&str] = &["recruiter", "talent acquisition", "hr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactBucket {
    Manager,
    Gatekeeper,
    Other,
}

/// Classifies a title. Managers take precedence over gatekeepers.
pub fn bucket_for(position: &str) -> ContactBucket {
    let title = position.to_lowercase();
    if MANAGER_KEYWORDS.iter().any(|k| contains_term(&title, k)) {
        ContactBucket::Manager
    } else if GATEKEEPER_KEYWORDS.iter().any(|k| contains_prefix(&title, k)) {
        ContactBucket::Gatekeeper
    } else {
        ContactBucket::Other
    }
}

/// Scores `candidates` and returns at most `cap` of them, best first within
/// each bucket. The output is a duplicate-free subset of the input.
pub fn select_contacts(
    candidates: Vec<Contact>,
    target: &ScoringTarget,
    tables: &ScoringTables,
    weights: &ScoringWeights,
    cap: usize,
) -> Vec<Contact> {
    let mut ranked: Vec<Contact> = candidates
        .into_iter()
        .map(|mut contact| {
            contact.score = score_contact(&contact, target, tables, weights);
            contact
        })
        .collect();

    // Sort descending, highest score first
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let picked = pick_indices(&ranked, cap);

    let mut slots: Vec<Option<Contact>> = ranked.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

/// Chooses indices into an already-sorted list.
fn pick_indices(ranked: &[Contact], cap: usize) -> Vec<usize> {
    let quota = cap.div_ceil(3);

    let mut managers = Vec::new();
    let mut gatekeepers = Vec::new();
    let mut others = Vec::new();
    for (i, contact) in ranked.iter().enumerate() {
        match bucket_for(&contact.position) {
            ContactBucket::Manager => managers.push(i),
            ContactBucket::Gatekeeper => gatekeepers.push(i),
            ContactBucket::Other => others.push(i),
        }
    }

    let mut selected: Vec<usize> = Vec::with_capacity(cap.min(ranked.len()));
    let mut taken = vec![false; ranked.len()];

    let mut take = |indices: &[usize], limit: usize, selected: &mut Vec<usize>| {
        for &i in indices.iter().take(limit) {
            if selected.len() >= cap {
                return;
            }
            if !taken[i] {
                taken[i] = true;
                selected.push(i);
            }
        }
    };

    take(&managers, quota, &mut selected);
    take(&gatekeepers, quota, &mut selected);
    let remaining = cap.saturating_sub(selected.len());
    take(&others, remaining, &mut selected);

    // Backfill in score order
    let all: Vec<usize> = (0..ranked.len()).collect();
    take(&all, ranked.len(), &mut selected);

    selected
}
