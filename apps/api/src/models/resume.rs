//! Resume payload — the typed form of the JSON body posted by the editor.
//!
//! Every field is optional. Scalars accept strings, numbers, booleans or `null`
//! and always decode to a `String`; lists accept `null` as empty.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResumeData {
    #[serde(deserialize_with = "lenient_record")]
    pub profile: Profile,
    #[serde(deserialize_with = "lenient_record")]
    pub skills: Skills,
    #[serde(deserialize_with = "lenient_list")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub projects: Vec<ProjectEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub leadership: Vec<LeadershipEntry>,
    #[serde(deserialize_with = "lenient_text_list")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(deserialize_with = "lenient_text")]
    pub linkedin: String,
    #[serde(deserialize_with = "lenient_text")]
    pub github: String,
    #[serde(deserialize_with = "lenient_text")]
    pub website: String,
    #[serde(deserialize_with = "lenient_text")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Skills {
    #[serde(deserialize_with = "lenient_text")]
    pub languages: String,
    #[serde(deserialize_with = "lenient_text")]
    pub technologies: String,
    #[serde(deserialize_with = "lenient_text")]
    pub professional: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "lenient_text")]
    pub university: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub degree: String,
    /// Older clients send this as `gpa`.
    #[serde(alias = "gpa", deserialize_with = "lenient_text")]
    pub cgpa: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "lenient_text")]
    pub company: String,
    #[serde(deserialize_with = "lenient_text")]
    pub role: String,
    #[serde(deserialize_with = "lenient_text")]
    pub location: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "lenient_text_list")]
    pub points: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub link: String,
    #[serde(deserialize_with = "lenient_text_list")]
    pub points: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeadershipEntry {
    #[serde(deserialize_with = "lenient_text")]
    pub organization: String,
    #[serde(deserialize_with = "lenient_text")]
    pub role: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "lenient_text_list")]
    pub points: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Blank checks — used by the section renderer to skip empty records
// ────────────────────────────────────────────────────────────────────────────

fn all_blank<'a>(fields: impl IntoIterator<Item = &'a String>) -> bool {
    fields.into_iter().all(|f| f.trim().is_empty())
}

impl EducationEntry {
    pub fn is_blank(&self) -> bool {
        all_blank([&self.university, &self.date, &self.degree, &self.cgpa])
    }
}

impl ExperienceEntry {
    pub fn is_blank(&self) -> bool {
        all_blank([&self.company, &self.role, &self.location, &self.date])
            && all_blank(&self.points)
    }
}

impl ProjectEntry {
    pub fn is_blank(&self) -> bool {
        all_blank([&self.name, &self.link]) && all_blank(&self.points)
    }
}

impl LeadershipEntry {
    pub fn is_blank(&self) -> bool {
        all_blank([&self.organization, &self.role, &self.date]) && all_blank(&self.points)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient deserializers
// ────────────────────────────────────────────────────────────────────────────

/// Converts a scalar JSON value to display text. Arrays and objects are rejected.
fn value_to_text<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) => Err(E::custom("expected text, found an array")),
        Value::Object(_) => Err(E::custom("expected text, found an object")),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_text(Value::deserialize(deserializer)?)
}

fn lenient_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    items
        .unwrap_or_default()
        .into_iter()
        .map(value_to_text)
        .collect()
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_decodes_to_defaults() {
        let data: ResumeData = serde_json::from_value(json!({})).unwrap();
        assert!(data.profile.name.is_empty());
        assert!(data.experience.is_empty());
        assert!(data.achievements.is_empty());
    }

    #[test]
    fn test_null_fields_treated_as_empty() {
        let data: ResumeData = serde_json::from_value(json!({
            "profile": { "name": null, "email": "a@b.c" },
            "skills": null,
            "experience": null,
            "achievements": null
        }))
        .unwrap();
        assert_eq!(data.profile.name, "");
        assert_eq!(data.profile.email, "a@b.c");
        assert!(data.skills.languages.is_empty());
        assert!(data.experience.is_empty());
    }

    #[test]
    fn test_numbers_and_booleans_become_text() {
        let data: ResumeData = serde_json::from_value(json!({
            "education": [{ "university": "MIT", "cgpa": 3.8 }],
            "achievements": [1, true]
        }))
        .unwrap();
        assert_eq!(data.education[0].cgpa, "3.8");
        assert_eq!(data.achievements, vec!["1", "true"]);
    }

    #[test]
    fn test_gpa_alias_accepted() {
        let entry: EducationEntry =
            serde_json::from_value(json!({ "university": "X", "gpa": "GPA: 3.8/4.0" })).unwrap();
        assert_eq!(entry.cgpa, "GPA: 3.8/4.0");
    }

    #[test]
    fn test_object_in_scalar_slot_rejected() {
        let result: Result<Profile, _> =
            serde_json::from_value(json!({ "name": { "first": "A" } }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let entry: ProjectEntry =
            serde_json::from_value(json!({ "name": "P", "stars": 12, "points": ["x"] })).unwrap();
        assert_eq!(entry.name, "P");
        assert_eq!(entry.points, vec!["x"]);
    }

    #[test]
    fn test_list_order_preserved() {
        let data: ResumeData = serde_json::from_value(json!({
            "experience": [{ "company": "First" }, { "company": "Second" }, { "company": "Third" }]
        }))
        .unwrap();
        let companies: Vec<_> = data.experience.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(companies, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_blank_entries_detected() {
        let blank = ExperienceEntry {
            points: vec!["   ".to_string()],
            ..Default::default()
        };
        assert!(blank.is_blank());

        let filled = ExperienceEntry {
            points: vec!["Shipped it".to_string()],
            ..Default::default()
        };
        assert!(!filled.is_blank());
    }
}
