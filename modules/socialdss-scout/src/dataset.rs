use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use socialdss_common::{Post, SocialDssError};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One CSV row. Column order is the file's header order.
#[derive(Debug, Serialize, Deserialize)]
struct PostRow {
    source: String,
    title: String,
    body: String,
    upvotes: u64,
    comments_count: u64,
    created_utc: i64,
    url: Option<String>,
    id: String,
    /// Derived from `created_utc`; ignored on read.
    #[serde(default)]
    date: String,
}

impl From<&Post> for PostRow {
    fn from(post: &Post) -> Self {
        Self {
            source: post.source.clone(),
            title: post.title.clone(),
            body: post.body.clone(),
            upvotes: post.upvotes,
            comments_count: post.comments_count,
            created_utc: post.created_utc,
            url: post.url.clone(),
            id: post.id.clone(),
            date: post
                .date()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            source: row.source,
            title: row.title,
            body: row.body,
            upvotes: row.upvotes,
            comments_count: row.comments_count,
            created_utc: row.created_utc,
            id: row.id,
            url: row.url.filter(|u| !u.is_empty()),
        }
    }
}

/// Text-only view of a row; any of the columns may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextRow {
    title: Option<String>,
    body: Option<String>,
    selftext: Option<String>,
}

fn dataset_err(context: &str, e: impl std::fmt::Display) -> SocialDssError {
    SocialDssError::Dataset(format!("{context}: {e}"))
}

pub fn write_posts<W: Write>(writer: W, posts: &[Post]) -> Result<(), SocialDssError> {
    let mut csv = csv::Writer::from_writer(writer);
    for post in posts {
        csv.serialize(PostRow::from(post))
            .map_err(|e| dataset_err("writing row", e))?;
    }
    csv.flush().map_err(|e| dataset_err("flushing csv", e))?;
    Ok(())
}

pub fn save_posts(path: impl AsRef<Path>, posts: &[Post]) -> Result<(), SocialDssError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| dataset_err(&path.display().to_string(), e))?;
    write_posts(file, posts)?;
    info!(path = %path.display(), rows = posts.len(), "Saved posts");
    Ok(())
}

pub fn read_posts<R: Read>(reader: R) -> Result<Vec<Post>, SocialDssError> {
    csv::Reader::from_reader(reader)
        .deserialize::<PostRow>()
        .map(|row| row.map(Post::from).map_err(|e| dataset_err("reading row", e)))
        .collect()
}

pub fn load_posts(path: impl AsRef<Path>) -> Result<Vec<Post>, SocialDssError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| dataset_err(&path.display().to_string(), e))?;
    read_posts(file)
}

/// `title + " " + body` for every row; `selftext` stands in for a missing
/// `body` column and missing cells read as empty.
pub fn read_texts_from_csv<R: Read>(reader: R) -> Result<Vec<String>, SocialDssError> {
    csv::Reader::from_reader(reader)
        .deserialize::<TextRow>()
        .map(|row| {
            let row = row.map_err(|e| dataset_err("reading row", e))?;
            let title = row.title.unwrap_or_default();
            let body = row.body.or(row.selftext).unwrap_or_default();
            Ok(format!("{title} {body}"))
        })
        .collect()
}

pub fn load_texts_from_csv(path: impl AsRef<Path>) -> Result<Vec<String>, SocialDssError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| dataset_err(&path.display().to_string(), e))?;
    read_texts_from_csv(file)
}

/// Texts from a JSON array: each element's `selftext` (or `body`) string,
/// or the element's own JSON rendering when it has neither.
pub fn texts_from_json(json: &str) -> Result<Vec<String>, SocialDssError> {
    let value: Value = serde_json::from_str(json).map_err(|e| dataset_err("parsing json", e))?;
    let Value::Array(items) = value else {
        return Err(SocialDssError::Dataset(
            "expected a JSON array of posts".to_string(),
        ));
    };

    Ok(items
        .into_iter()
        .map(|item| {
            ["selftext", "body"]
                .iter()
                .find_map(|key| item.get(key).and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| match &item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
        })
        .collect())
}

pub fn load_texts_from_json(path: impl AsRef<Path>) -> Result<Vec<String>, SocialDssError> {
    let path = path.as_ref();
    let json =
        std::fs::read_to_string(path).map_err(|e| dataset_err(&path.display().to_string(), e))?;
    texts_from_json(&json)
}
