//! Relationship service: the only component that mutates parent links.
//!
//! Every operation runs as a single unit of work on the injected
//! [`PersonStore`], so the load, the checks and the write of `add_parent`
//! cannot interleave with a concurrent call on the same child.

use std::collections::HashSet;

use uuid::Uuid;

use crate::db::{PersonRepository, PersonStore};
use crate::error::{RegistryError, Result};
use crate::models::{AncestryNode, Person};

#[derive(Debug, Clone)]
pub struct RelationshipService<S> {
    store: S,
}

impl<S: PersonStore> RelationshipService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist a new or updated person and return the stored entity.
    ///
    /// Every id in `person.parents` must already be stored. For an update,
    /// the parent set may not make the person their own ancestor.
    pub fn save(&self, person: &Person) -> Result<Person> {
        person.validate()?;

        self.store.atomically(|repo| {
            for &parent_id in &person.parents {
                require(repo, parent_id)?;
                if let Some(id) = person.id {
                    if is_ancestor(repo, id, parent_id)? {
                        return Err(RegistryError::CyclicParentage {
                            child: id,
                            parent: parent_id,
                        });
                    }
                }
            }
            repo.save(person)
        })
    }

    /// Remove a stored person. They disappear from every parent set that
    /// referenced them.
    pub fn delete(&self, person: &Person) -> Result<()> {
        self.delete_by_id(person.persisted_id()?)
    }

    pub fn delete_by_id(&self, id: Uuid) -> Result<()> {
        self.store.atomically(|repo| {
            if repo.delete(id)? {
                Ok(())
            } else {
                Err(RegistryError::NotFound(id))
            }
        })
    }

    /// Record `parent` as a parent of `child` and return the updated child.
    ///
    /// The child is reloaded inside the transaction; the parent set carried
    /// by the `child` argument is ignored. A child that already has two
    /// parents is rejected before anything else is checked, so the call
    /// fails the same way every time and never changes the stored set.
    /// Adding a parent that is already recorded returns the child unchanged.
    pub fn add_parent(&self, child: &Person, parent: &Person) -> Result<Person> {
        let child_id = child.persisted_id()?;
        let parent_id = parent.persisted_id()?;

        self.store.atomically(|repo| {
            let mut current = require(repo, child_id)?;
            require(repo, parent_id)?;

            if current.has_full_parent_set() {
                return Err(RegistryError::ParentLimitExceeded { child: child_id });
            }
            if child_id == parent_id {
                return Err(RegistryError::SelfParenting(child_id));
            }
            if current.parents.contains(&parent_id) {
                return Ok(current);
            }
            if is_ancestor(repo, child_id, parent_id)? {
                return Err(RegistryError::CyclicParentage {
                    child: child_id,
                    parent: parent_id,
                });
            }

            current.parents.insert(parent_id);
            repo.save(&current)
        })
    }

    pub fn find(&self, id: Uuid) -> Result<Person> {
        self.store.atomically(|repo| require(repo, id))
    }

    pub fn list(&self) -> Result<Vec<Person>> {
        self.store.atomically(|repo| repo.find_all())
    }

    pub fn parents_of(&self, id: Uuid) -> Result<Vec<Person>> {
        self.store.atomically(|repo| {
            let child = require(repo, id)?;
            child
                .parents
                .iter()
                .map(|&parent_id| require(repo, parent_id))
                .collect()
        })
    }

    pub fn children_of(&self, id: Uuid) -> Result<Vec<Person>> {
        self.store.atomically(|repo| {
            require(repo, id)?;
            repo.find_children(id)
        })
    }

    /// The person with all recorded ancestors, generation by generation.
    pub fn ancestry(&self, id: Uuid) -> Result<AncestryNode> {
        self.store.atomically(|repo| {
            let person = require(repo, id)?;
            let mut path = HashSet::from([id]);
            build_ancestry(repo, person, &mut path)
        })
    }
}

fn require(repo: &dyn PersonRepository, id: Uuid) -> Result<Person> {
    repo.find_by_id(id)?.ok_or(RegistryError::NotFound(id))
}

/// Whether `ancestor` appears anywhere above `person` in the parent graph.
fn is_ancestor(repo: &dyn PersonRepository, ancestor: Uuid, person: Uuid) -> Result<bool> {
    let mut seen = HashSet::new();
    let mut pending = vec![person];

    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        let Some(current) = repo.find_by_id(id)? else {
            continue;
        };
        if current.parents.contains(&ancestor) {
            return Ok(true);
        }
        pending.extend(current.parents.iter().copied());
    }

    Ok(false)
}

/// `path` holds the ids on the way from the root to `person`. Shared ancestors
/// on separate branches are expanded on each branch.
fn build_ancestry(
    repo: &dyn PersonRepository,
    person: Person,
    path: &mut HashSet<Uuid>,
) -> Result<AncestryNode> {
    let mut ancestors = Vec::with_capacity(person.parents.len());

    for &parent_id in &person.parents {
        if !path.insert(parent_id) {
            continue;
        }
        if let Some(parent) = repo.find_by_id(parent_id)? {
            ancestors.push(build_ancestry(repo, parent, path)?);
        }
        path.remove(&parent_id);
    }

    Ok(AncestryNode { person, ancestors })
}
