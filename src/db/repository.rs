//! Persistence port consumed by the relationship service.

use uuid::Uuid;

use crate::error::Result;
use crate::models::Person;

/// Load/save access to stored persons.
///
/// Implementations materialize `Person::parents` from the stored links on
/// every load; callers never see a partially loaded parent set.
pub trait PersonRepository {
    /// Insert a person without an id (assigning one) or overwrite an existing
    /// record, including its parent set. Updating an unknown id fails with
    /// `NotFound`.
    fn save(&self, person: &Person) -> Result<Person>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Person>>;

    /// Remove a person and every parent link that references them.
    /// Returns `false` when no such person exists.
    fn delete(&self, id: Uuid) -> Result<bool>;

    fn find_all(&self) -> Result<Vec<Person>>;

    /// Persons that list `parent_id` in their parent set.
    fn find_children(&self, parent_id: Uuid) -> Result<Vec<Person>>;
}

/// A store that can run several repository calls as one unit of work.
pub trait PersonStore: Send + Sync {
    /// Run `f` inside a write transaction. The transaction commits only if
    /// `f` returns `Ok`; any error rolls back every change made through the
    /// repository handed to `f`.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn PersonRepository) -> Result<T>;
}
