//! Content records, one type per pipeline stage.
//!
//! ```text
//! DraftRecord ──resolve──► PublishedRecord ──render──► BuiltRecord
//!  (front matter,            (date/title/url set,        (JSON, HTML content,
//!   maybe slug/url)           no slug, name in memory)     no name, no slug)
//! ```
//!
//! `name` only exists on the draft and published types, and `slug` only on
//! [`FrontMatter`], so neither can reach a built record on disk.

use crate::frontmatter::{self, FrontMatterError};
use crate::utils::date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Keys that never survive into a built record.
const SCRUBBED_KEYS: &[&str] = &["name", "slug"];

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("front matter is missing `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error("front matter value cannot be converted to JSON")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Front matter
// ============================================================================

/// Parsed document header. Every field is optional; unknown keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, with = "date::flexible", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Explicit slug, used instead of the title when deriving the url.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Explicit url; wins over slug and title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,

    /// Inclusion in the overview index.
    #[serde(default, alias = "overviewShown", skip_serializing_if = "Option::is_none")]
    pub overview: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

// ============================================================================
// Draft
// ============================================================================

/// A draft as read from the drafts directory.
#[derive(Debug, Clone)]
pub struct DraftRecord {
    /// Source file stem.
    pub name: String,
    pub front: FrontMatter,
    /// Markdown body after the front matter.
    pub body: String,
}

impl DraftRecord {
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, FrontMatterError> {
        let (front, body) = frontmatter::parse::<FrontMatter>(text)?;
        Ok(Self {
            name: name.into(),
            front,
            body: body.to_owned(),
        })
    }
}

// ============================================================================
// Published
// ============================================================================

/// Front matter of a published document. `date`, `title` and `url` are resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedMeta {
    #[serde(with = "date::required")]
    pub date: DateTime<Utc>,

    pub title: String,

    pub url: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A resolved document ready to be written to the published directory.
#[derive(Debug, Clone)]
pub struct PublishedRecord {
    /// Source file stem, kept in memory to name the output file.
    pub name: String,
    pub meta: PublishedMeta,
    pub body: String,
}

impl PublishedRecord {
    /// Document text with re-serialized front matter.
    pub fn to_markdown(&self) -> Result<String, FrontMatterError> {
        frontmatter::serialize(&self.meta, &self.body)
    }
}

// ============================================================================
// Built
// ============================================================================

/// A JSON content record in the build output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltRecord {
    #[serde(with = "date::required")]
    pub date: DateTime<Utc>,

    pub title: String,

    pub url: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default = "default_overview", alias = "overviewShown")]
    pub overview: bool,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,

    /// Rendered HTML. `None` in index views that strip it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

fn default_overview() -> bool {
    true
}

impl BuiltRecord {
    /// Build a fresh record from a published document's front matter and its
    /// rendered HTML. `slug` and any stray `name` key are dropped.
    pub fn from_front_matter(front: FrontMatter, content: String) -> Result<Self, RecordError> {
        let FrontMatter {
            date,
            title,
            url,
            tags,
            featured,
            overview,
            extra,
            ..
        } = front;

        let extra = extra
            .into_iter()
            .filter(|(key, _)| !SCRUBBED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| Ok((key, serde_json::to_value(value)?)))
            .collect::<Result<_, serde_json::Error>>()?;

        Ok(Self {
            date: date.ok_or(RecordError::MissingField("date"))?,
            title: title.ok_or(RecordError::MissingField("title"))?,
            url: url.ok_or(RecordError::MissingField("url"))?,
            tags,
            featured: featured.unwrap_or(false),
            overview: overview.unwrap_or(true),
            extra,
            content: Some(content),
        })
    }

    /// Copy of the record without its HTML content.
    pub fn without_content(&self) -> Self {
        Self {
            content: None,
            ..self.clone()
        }
    }

    /// Content length in characters (0 when stripped).
    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_front() -> FrontMatter {
        FrontMatter {
            date: Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()),
            title: Some("Hello".into()),
            slug: Some("custom".into()),
            url: Some("2024/01/custom".into()),
            tags: vec!["rust".into()],
            featured: Some(true),
            overview: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_front_matter_overview_alias() {
        let (front, _) =
            frontmatter::parse::<FrontMatter>("---\noverviewShown: false\n---\n").unwrap();
        assert_eq!(front.overview, Some(false));
    }

    #[test]
    fn test_front_matter_keeps_unknown_keys() {
        let (front, _) =
            frontmatter::parse::<FrontMatter>("---\ntitle: T\nauthor: Ann\n---\n").unwrap();
        assert_eq!(front.title.as_deref(), Some("T"));
        assert_eq!(
            front.extra.get("author"),
            Some(&serde_yaml::Value::String("Ann".into()))
        );
    }

    #[test]
    fn test_front_matter_bad_date() {
        let result = frontmatter::parse::<FrontMatter>("---\ndate: someday\n---\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_draft_parse() {
        let draft = DraftRecord::parse("my-post", "---\ntitle: Hi\n---\nBody").unwrap();
        assert_eq!(draft.name, "my-post");
        assert_eq!(draft.front.title.as_deref(), Some("Hi"));
        assert_eq!(draft.body, "Body");
    }

    #[test]
    fn test_built_record_scrubs_name_and_slug() {
        let mut front = sample_front();
        front
            .extra
            .insert("name".into(), serde_yaml::Value::String("leak".into()));
        front
            .extra
            .insert("author".into(), serde_yaml::Value::String("Ann".into()));

        let record = BuiltRecord::from_front_matter(front, "<p>x</p>".into()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("name"));
        assert!(!object.contains_key("slug"));
        assert_eq!(object["author"], "Ann");
        assert_eq!(object["url"], "2024/01/custom");
        assert_eq!(object["content"], "<p>x</p>");
        assert_eq!(object["date"], "2024-01-15T00:00:00Z");
        assert_eq!(object["overview"], true);
    }

    #[test]
    fn test_built_record_requires_url() {
        let mut front = sample_front();
        front.url = None;
        let err = BuiltRecord::from_front_matter(front, String::new()).unwrap_err();
        assert!(matches!(err, RecordError::MissingField("url")));
    }

    #[test]
    fn test_built_record_json_round_trip_without_content() {
        let record = BuiltRecord::from_front_matter(sample_front(), "<p>x</p>".into()).unwrap();
        let stripped = record.without_content();
        let json = serde_json::to_string(&stripped).unwrap();
        assert!(!json.contains("\"content\""));

        let parsed: BuiltRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stripped);
        assert_eq!(parsed.content_len(), 0);
    }

    #[test]
    fn test_built_record_defaults_when_reading_json() {
        let json = r#"{"date":"2024-02-01T00:00:00Z","title":"T","url":"2024/02/t","overviewShown":false}"#;
        let record: BuiltRecord = serde_json::from_str(json).unwrap();
        assert!(!record.featured);
        assert!(!record.overview);
        assert!(record.tags.is_empty());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_published_markdown_has_no_slug() {
        let published = PublishedRecord {
            name: "hello".into(),
            meta: PublishedMeta {
                date: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
                title: "Hello".into(),
                url: "2024/01/hello".into(),
                tags: vec![],
                featured: None,
                overview: None,
                extra: BTreeMap::new(),
            },
            body: "# Hello\n".into(),
        };
        let text = published.to_markdown().unwrap();

        assert!(text.contains("url: 2024/01/hello"));
        assert!(!text.contains("slug"));
        assert!(!text.contains("name"));
        assert!(text.ends_with("---\n# Hello\n"));
    }
}
