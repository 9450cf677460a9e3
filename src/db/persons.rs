use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::repository::PersonRepository;
use crate::error::{RegistryError, Result};
use crate::models::Person;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// [`PersonRepository`] over a borrowed SQLite connection or transaction.
pub struct SqlitePersons<'c> {
    conn: &'c Connection,
}

impl<'c> SqlitePersons<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn load_parents(&self, child_id: Uuid) -> Result<BTreeSet<Uuid>> {
        let mut stmt = self
            .conn
            .prepare("SELECT parent_id FROM person_parents WHERE child_id = ?")?;

        let parents = stmt
            .query_map([child_id.to_string()], |row| {
                parse_uuid(0, row.get::<_, String>(0)?)
            })?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;

        Ok(parents)
    }

    fn replace_parents(&self, child_id: Uuid, parents: &BTreeSet<Uuid>) -> Result<()> {
        self.conn.execute(
            "DELETE FROM person_parents WHERE child_id = ?",
            [child_id.to_string()],
        )?;

        let mut stmt = self
            .conn
            .prepare("INSERT INTO person_parents (child_id, parent_id) VALUES (?, ?)")?;
        for parent_id in parents {
            stmt.execute((child_id.to_string(), parent_id.to_string()))?;
        }

        Ok(())
    }

    fn with_parents(&self, mut persons: Vec<Person>) -> Result<Vec<Person>> {
        for person in &mut persons {
            if let Some(id) = person.id {
                person.parents = self.load_parents(id)?;
            }
        }
        Ok(persons)
    }
}

impl PersonRepository for SqlitePersons<'_> {
    fn save(&self, person: &Person) -> Result<Person> {
        let now = Utc::now().to_rfc3339();
        let birthday = person.birthday.format(DATE_FORMAT).to_string();

        let id = match person.id {
            None => {
                let id = Uuid::new_v4();
                self.conn.execute(
                    "INSERT INTO persons (id, first_name, last_name, birthday, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    (
                        id.to_string(),
                        &person.first_name,
                        &person.last_name,
                        &birthday,
                        &now,
                        &now,
                    ),
                )?;
                id
            }
            Some(id) => {
                let rows = self.conn.execute(
                    "UPDATE persons SET first_name = ?, last_name = ?, birthday = ?, updated_at = ?
                     WHERE id = ?",
                    (
                        &person.first_name,
                        &person.last_name,
                        &birthday,
                        &now,
                        id.to_string(),
                    ),
                )?;
                if rows == 0 {
                    return Err(RegistryError::NotFound(id));
                }
                id
            }
        };

        self.replace_parents(id, &person.parents)?;

        Ok(Person {
            id: Some(id),
            ..person.clone()
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Person>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, birthday FROM persons WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut person = person_from_row(row)?;
        person.parents = self.load_parents(id)?;
        Ok(Some(person))
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        // Links in both directions go with the row (ON DELETE CASCADE)
        let rows = self
            .conn
            .execute("DELETE FROM persons WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    fn find_all(&self) -> Result<Vec<Person>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, birthday
             FROM persons ORDER BY last_name, first_name, id",
        )?;
        let mut persons = stmt
            .query_map([], person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut links = self
            .conn
            .prepare("SELECT child_id, parent_id FROM person_parents")?;
        let mut parents_by_child: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();
        let mut rows = links.query([])?;
        while let Some(row) = rows.next()? {
            let child_id = parse_uuid(0, row.get::<_, String>(0)?)?;
            let parent_id = parse_uuid(1, row.get::<_, String>(1)?)?;
            parents_by_child.entry(child_id).or_default().insert(parent_id);
        }

        for person in &mut persons {
            if let Some(parents) = person.id.and_then(|id| parents_by_child.remove(&id)) {
                person.parents = parents;
            }
        }

        Ok(persons)
    }

    fn find_children(&self, parent_id: Uuid) -> Result<Vec<Person>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.first_name, p.last_name, p.birthday
             FROM persons p
             JOIN person_parents pp ON pp.child_id = p.id
             WHERE pp.parent_id = ?
             ORDER BY p.birthday, p.last_name, p.first_name",
        )?;
        let children = stmt
            .query_map([parent_id.to_string()], person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        self.with_parents(children)
    }
}

/// Map the `id, first_name, last_name, birthday` columns. Parents are loaded separately.
fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: Some(parse_uuid(0, row.get::<_, String>(0)?)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birthday: parse_date(3, row.get::<_, String>(3)?)?,
        parents: BTreeSet::new(),
    })
}

fn parse_uuid(column: usize, s: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn parse_date(column: usize, s: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
