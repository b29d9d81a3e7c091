//! Heuristic addresses used when the provider cannot supply a real one.

use crate::outreach::contact::Contact;
use crate::outreach::text::ascii_slug;

/// Confidence of a synthesized `first.last@domain` address.
pub const PATTERN_EMAIL_CONFIDENCE: f64 = 0.6;
/// Confidence of the generic placeholder address.
pub const PLACEHOLDER_EMAIL_CONFIDENCE: f64 = 0.3;

/// `firstname.lastname@domain`, or an empty string if any part is missing.
///
/// Names are lowercased and stripped to ASCII letters/digits; a leading `www.`
/// is dropped from the domain.
pub fn generate_fallback_email(first_name: &str, last_name: &str, domain: &str) -> String {
    if first_name.trim().is_empty() || last_name.trim().is_empty() || domain.trim().is_empty() {
        return String::new();
    }

    let first = ascii_slug(first_name);
    let last = ascii_slug(last_name);
    let domain = domain.trim().to_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain);

    if first.is_empty() || last.is_empty() || domain.is_empty() {
        return String::new();
    }

    format!("{first}.{last}@{domain}")
}

/// `contact@<slug>.com`, slugged from the company name, else the person's name.
pub fn placeholder_email(contact: &Contact) -> String {
    let slug = [contact.company.as_str(), contact.display_name().as_str()]
        .into_iter()
        .map(ascii_slug)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "company".to_string());
    format!("contact@{slug}.com")
}
