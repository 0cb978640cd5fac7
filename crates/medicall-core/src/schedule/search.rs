//! Type-ahead contact search for the compose and edit forms.

use std::cmp::Ordering;

use crate::models::Contact;

struct Ranked<'a> {
    contact: &'a Contact,
    position: usize,
    similarity: f64,
}

/// Contacts whose name contains `query`, case-insensitively.
///
/// Restricted to `executive` when one is given. Earlier matches rank first,
/// then names closer to the query (Jaro-Winkler), then alphabetical order.
/// A blank query returns nothing so the dropdown stays closed.
pub fn search_contacts<'a>(
    contacts: &'a [Contact],
    executive: Option<&str>,
    query: &str,
) -> Vec<&'a Contact> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<Ranked<'a>> = contacts
        .iter()
        .filter(|c| executive.map_or(true, |e| c.executive == e))
        .filter_map(|contact| {
            let haystack = contact.name.to_lowercase();
            let position = haystack.find(&needle)?;
            Some(Ranked {
                contact,
                position,
                similarity: strsim::jaro_winkler(&haystack, &needle),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.contact.name.cmp(&b.contact.name))
    });

    ranked.into_iter().map(|r| r.contact).collect()
}
