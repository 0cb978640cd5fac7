//! Contact models: doctors, hospitals and administrative staff owned by an executive.

use serde::{Deserialize, Deserializer, Serialize};

use super::visit::Visit;

/// The backend writes SQL `NULL` for unset columns.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Kind of contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContactCategory {
    #[default]
    #[serde(rename = "MEDICO")]
    Doctor,
    #[serde(rename = "ADMINISTRATIVO")]
    Administrative,
    #[serde(rename = "HOSPITAL")]
    Hospital,
}

/// A contact tracked by a sales executive, with its embedded visit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Immutable identity
    pub id: String,
    /// Owning sales executive (matched by name)
    #[serde(default, deserialize_with = "null_as_default")]
    pub executive: String,
    /// Display name, used by the type-ahead search
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: ContactCategory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    /// Ordered visit list
    #[serde(default, deserialize_with = "null_as_default")]
    pub visits: Vec<Visit>,
    /// Profile fields owned by the directory screens, carried through untouched
    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

impl Contact {
    /// Create a new contact with required fields.
    pub fn new(executive: String, name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            executive,
            name,
            category: ContactCategory::Doctor,
            address: String::new(),
            visits: Vec::new(),
            profile: serde_json::Map::new(),
        }
    }

    pub fn visit(&self, visit_id: &str) -> Option<&Visit> {
        self.visits.iter().find(|v| v.id == visit_id)
    }

    pub fn visit_mut(&mut self, visit_id: &str) -> Option<&mut Visit> {
        self.visits.iter_mut().find(|v| v.id == visit_id)
    }

    /// Remove a visit, keeping the order of the rest.
    pub fn remove_visit(&mut self, visit_id: &str) -> Option<Visit> {
        let pos = self.visits.iter().position(|v| v.id == visit_id)?;
        Some(self.visits.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryKind, Visit};

    #[test]
    fn test_new_contact() {
        let contact = Contact::new("ORALIA".into(), "Aida Simbron".into());
        assert_eq!(contact.executive, "ORALIA");
        assert_eq!(contact.category, ContactCategory::Doctor);
        assert!(contact.visits.is_empty());
        assert_eq!(contact.id.len(), 36);
    }

    #[test]
    fn test_profile_fields_survive_round_trip() {
        let json = r#"{
            "id": "doc-1",
            "category": null,
            "executive": "LUIS",
            "name": "Adriana Galvan Luna",
            "specialty": "Ginecología y Obstetricia",
            "address": null,
            "isInsuranceDoctor": true,
            "schedule": [],
            "visits": null
        }"#;
        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.category, ContactCategory::Doctor);
        assert_eq!(contact.address, "");
        assert!(contact.visits.is_empty());
        assert_eq!(contact.profile["specialty"], "Ginecología y Obstetricia");

        let back = serde_json::to_value(&contact).unwrap();
        assert_eq!(back["isInsuranceDoctor"], true);
        assert_eq!(back["category"], "MEDICO");
        assert_eq!(back["visits"], serde_json::json!([]));
    }

    #[test]
    fn test_remove_visit_keeps_order() {
        let mut contact = Contact::new("LUIS".into(), "Alejandra García".into());
        let day = "2024-03-05".parse().unwrap();
        for objective in ["A", "B", "C"] {
            contact
                .visits
                .push(Visit::planned(EntryKind::Visit, day, None, objective.into()));
        }
        let middle = contact.visits[1].id.clone();

        let removed = contact.remove_visit(&middle).unwrap();
        assert_eq!(removed.objective.as_deref(), Some("B"));
        let remaining: Vec<_> = contact
            .visits
            .iter()
            .filter_map(|v| v.objective.as_deref())
            .collect();
        assert_eq!(remaining, vec!["A", "C"]);
        assert!(contact.remove_visit(&middle).is_none());
    }
}
