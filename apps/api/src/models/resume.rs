use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted résumé submission. Rows are insert-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub summary: Option<String>,
    pub education: Option<Value>,
    pub skills: Option<Value>,
    pub projects: Option<Value>,
    pub experience: Option<Value>,
    pub hackathons: Option<Value>,
    pub pors: Option<Value>,
    pub certifications: Option<Value>,
}

/// Request body of `POST /api/generate`. Every field may be omitted or null.
///
/// Section entries keep unrecognised keys in `extra`, so a section serialises
/// back to what the client sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeSubmission {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub linkedin: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub github: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    pub education: Option<Vec<EducationEntry>>,
    pub skills: Option<BTreeMap<String, TextOrList>>,
    pub projects: Option<Vec<ProjectEntry>>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub hackathons: Option<Vec<HackathonEntry>>,
    pub pors: Option<Vec<PositionEntry>>,
    pub certifications: Option<Vec<CertificationEntry>>,
}

/// A value the client may send either as one string or as a list of strings.
/// Numbers and booleans are accepted wherever text is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for TextOrList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(scalar_text)
                .collect::<Result<Vec<_>, _>>()
                .map(TextOrList::List)
                .map_err(D::Error::custom),
            other => scalar_text(other)
                .map(TextOrList::Text)
                .map_err(D::Error::custom),
        }
    }
}

/// Text fields take strings, numbers or booleans; `9199455366` becomes
/// `"9199455366"`. Null is absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(value).map(Some).map_err(D::Error::custom),
    }
}

fn scalar_text(value: Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) => Err("invalid type: sequence, expected text".to_string()),
        Value::Object(_) => Err("invalid type: map, expected text".to_string()),
    }
}

impl TextOrList {
    /// Non-blank items, trimmed. A single string is one item.
    pub fn items(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            TextOrList::Text(text) => vec![text.as_str()],
            TextOrList::List(list) => list.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub dates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub gpa: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub github_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub live_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Internship or job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub dates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<TextOrList>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackathonEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub organizer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub achievement: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Position of responsibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<TextOrList>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
