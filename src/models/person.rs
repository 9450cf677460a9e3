use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RegistryError, Result};

/// Upper bound on the size of a person's parent set.
pub const MAX_PARENTS: usize = 2;

/// A person in the registry.
///
/// Parent links are directed (parent → child) and stored only on the child,
/// as the set of parent identifiers. There is no stored children collection;
/// children are found by querying for persons that reference a given id.
///
/// # Invariants
/// - `parents` never holds more than [`MAX_PARENTS`] ids.
/// - `parents` never contains the person's own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Assigned by the store on first save. `None` until then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub parents: BTreeSet<Uuid>,
}

impl Person {
    /// Create an unsaved person with no parents.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birthday: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birthday,
            parents: BTreeSet::new(),
        }
    }

    /// The stored id, or [`RegistryError::Unsaved`] for a person that was never saved.
    pub fn persisted_id(&self) -> Result<Uuid> {
        self.id.ok_or(RegistryError::Unsaved)
    }

    /// Whether `other` is recorded as one of this person's parents.
    ///
    /// Membership is by id, so an unsaved `other` is never a parent.
    pub fn has_parent(&self, other: &Person) -> bool {
        other.id.is_some_and(|id| self.parents.contains(&id))
    }

    pub fn has_full_parent_set(&self) -> bool {
        self.parents.len() >= MAX_PARENTS
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check field shapes and the parent-set invariant.
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(RegistryError::Invalid("first name must not be empty".into()));
        }
        if self.last_name.trim().is_empty() {
            return Err(RegistryError::Invalid("last name must not be empty".into()));
        }
        if let Some(id) = self.id {
            if self.parents.contains(&id) {
                return Err(RegistryError::SelfParenting(id));
            }
        }
        if self.parents.len() > MAX_PARENTS {
            return Err(RegistryError::Invalid(format!(
                "a person can have at most {} parents",
                MAX_PARENTS
            )));
        }
        Ok(())
    }
}

/// Input for creating a new person. Ids and parents are never accepted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonInput {
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
}

impl From<CreatePersonInput> for Person {
    fn from(input: CreatePersonInput) -> Self {
        Person::new(input.first_name, input.last_name, input.birthday)
    }
}

/// A person with their ancestry resolved, used for tree responses.
///
/// The `person` fields are flattened into the JSON response, with an
/// additional `ancestors` array holding one node per recorded parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncestryNode {
    #[serde(flatten)]
    pub person: Person,
    pub ancestors: Vec<AncestryNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birthday() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 5, 17).unwrap()
    }

    fn saved(first: &str, last: &str) -> Person {
        Person {
            id: Some(Uuid::new_v4()),
            ..Person::new(first, last, birthday())
        }
    }

    #[test]
    fn new_person_is_unsaved_and_parentless() {
        let person = Person::new("Max", "Mustermann", birthday());
        assert!(person.id.is_none());
        assert!(person.parents.is_empty());
        assert!(matches!(person.persisted_id(), Err(RegistryError::Unsaved)));
    }

    #[test]
    fn has_parent_compares_by_id() {
        let parent = saved("Reino", "Wendell");
        let mut child = saved("Wilfreda", "Steube");
        child.parents.insert(parent.id.unwrap());

        let mut renamed = parent.clone();
        renamed.first_name = "Someone".into();
        assert!(child.has_parent(&renamed));
        assert!(!child.has_parent(&Person::new("Reino", "Wendell", birthday())));
    }

    #[test]
    fn validate_rejects_blank_names() {
        let person = Person::new("  ", "Mustermann", birthday());
        assert!(matches!(person.validate(), Err(RegistryError::Invalid(_))));

        let person = Person::new("Max", "", birthday());
        assert!(matches!(person.validate(), Err(RegistryError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_more_than_two_parents() {
        let mut person = saved("Fynn", "Hirsch");
        for _ in 0..3 {
            person.parents.insert(Uuid::new_v4());
        }
        assert!(matches!(person.validate(), Err(RegistryError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_self_reference() {
        let mut person = saved("Fynn", "Hirsch");
        person.parents.insert(person.id.unwrap());
        assert!(matches!(
            person.validate(),
            Err(RegistryError::SelfParenting(_))
        ));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let person = Person::new("Max", "Mustermann", birthday());
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["firstName"], "Max");
        assert_eq!(json["lastName"], "Mustermann");
        assert_eq!(json["birthday"], "1990-05-17");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn deserializes_without_parents() {
        let person: Person = serde_json::from_str(
            r#"{"firstName":"Max","lastName":"Mustermann","birthday":"1990-05-17"}"#,
        )
        .unwrap();
        assert!(person.parents.is_empty());
        assert!(person.id.is_none());
    }
}
