use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `source` field as the News API sends it: either a bare name or an
/// `{id, name}` descriptor. Descriptor members are kept as raw JSON so a
/// numeric id or name does not lose the whole descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Name(String),
    Descriptor(serde_json::Map<String, Value>),
    Unrecognized(Value),
}

impl From<&str> for Source {
    fn from(name: &str) -> Self {
        Source::Name(name.to_string())
    }
}

impl From<String> for Source {
    fn from(name: String) -> Self {
        Source::Name(name)
    }
}

/// Collapses an upstream source to a plain display string.
///
/// Descriptors yield their name, then their id; strings and numbers count,
/// empty strings do not. Anything else is absent.
pub fn normalize_source(source: Option<Source>) -> Option<String> {
    match source? {
        Source::Name(name) => Some(name),
        Source::Descriptor(fields) => ["name", "id"]
            .into_iter()
            .find_map(|key| fields.get(key).and_then(label)),
        Source::Unrecognized(_) => None,
    }
}

fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Article fields as received, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A normalized news article. Every field may be absent, and `source` is
/// always a plain string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawArticle")]
pub struct Article {
    url: Option<String>,
    source: Option<String>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    content: Option<String>,
}

impl Article {
    pub fn new(raw: RawArticle) -> Self {
        Self {
            url: raw.url,
            source: normalize_source(raw.source),
            author: raw.author,
            title: raw.title,
            description: raw.description,
            published_at: raw.published_at,
            content: raw.content,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn published_at(&self) -> Option<&str> {
        self.published_at.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Article::new(raw)
    }
}

impl fmt::Debug for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Article")
            .field("url", &self.url)
            .field("source", &self.source)
            .field("author", &self.author)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("publishedAt", &self.published_at)
            .field("content", &self.content)
            .finish()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", present(self.title()).unwrap_or("(no title)"))?;
        if let Some(author) = present(self.author()) {
            write!(f, " by {author}")?;
        }
        write!(
            f,
            " from {}",
            present(self.source()).unwrap_or("Unknown source")
        )?;
        if let Some(published_at) = present(self.published_at()) {
            write!(f, " on {published_at}")?;
        }
        Ok(())
    }
}
