use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable identity of a registered student, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub Uuid);

impl StudentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for StudentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// One registration as it is persisted in the registry slot.
///
/// Records are never edited after insertion; the registry only ever grows by
/// appending, shrinks by removal, or is cleared wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredStudent")]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub courses: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Row shape accepted on load. Slots written before identifiers existed
/// carry no `id`, and their `age` may be a bare number.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredStudent {
    #[serde(default)]
    id: Option<StudentId>,
    name: String,
    email: String,
    #[serde(default, deserialize_with = "age_text")]
    age: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    courses: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<StoredStudent> for StudentRecord {
    fn from(row: StoredStudent) -> Self {
        let id = row.id.unwrap_or_else(|| {
            StudentId::derived(&row.created_at, &row.email, &row.name)
        });
        Self {
            id,
            name: row.name,
            email: row.email,
            age: row.age,
            gender: row.gender,
            courses: row.courses,
            created_at: row.created_at,
        }
    }
}

impl StudentId {
    /// Name-based id for a row stored without one. The same row yields the
    /// same id on every load, so ids rendered from it stay valid.
    pub fn derived(created_at: &DateTime<Utc>, email: &str, name: &str) -> Self {
        let key = format!("{}\n{email}\n{name}", created_at.to_rfc3339());
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgeField {
    Text(String),
    Whole(i64),
    Fraction(f64),
}

fn age_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let age = Option::<AgeField>::deserialize(deserializer)?.map(|age| match age {
        AgeField::Text(text) => text,
        AgeField::Whole(n) => n.to_string(),
        AgeField::Fraction(n) => n.to_string(),
    });
    Ok(age.filter(|age| !age.is_empty()))
}
