use serde::Deserialize;
use socialdss_common::Post;

// --- Search request ---

/// One page request against a subreddit's search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub source: String,
    pub query: String,
    pub page_size: u32,
    pub sort: String,
    /// Pagination cursor from the previous page.
    pub after: Option<String>,
    pub user_agent: String,
}

impl PageRequest {
    /// Query-string parameters in the order the endpoint documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.query.clone()),
            ("restrict_sr", "1".to_string()),
            ("limit", self.page_size.to_string()),
            ("sort", self.sort.clone()),
        ];
        if let Some(ref after) = self.after {
            params.push(("after", after.clone()));
        }
        params
    }
}

/// Raw HTTP outcome of a page request. Status handling is the fetcher's job.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

// --- search.json listing ---

/// Top-level `search.json` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchListing {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
    /// Cursor for the next page; null on the last page.
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingChild {
    pub data: RedditPost,
}

/// A single post as returned by the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedditPost {
    pub id: Option<String>,
    pub title: Option<String>,
    pub selftext: Option<String>,
    pub score: Option<i64>,
    pub num_comments: Option<i64>,
    pub created_utc: Option<f64>,
    pub url: Option<String>,
}

impl SearchListing {
    /// Next-page cursor, treating an empty string the same as null.
    pub fn next_cursor(&self) -> Option<String> {
        self.data.after.clone().filter(|a| !a.is_empty())
    }
}

impl RedditPost {
    /// Convert to the platform-agnostic `Post` used downstream.
    pub fn into_post(self, source: &str) -> Post {
        Post {
            source: source.to_string(),
            title: self.title.unwrap_or_default(),
            body: self.selftext.unwrap_or_default(),
            upvotes: self.score.unwrap_or(0).max(0) as u64,
            comments_count: self.num_comments.unwrap_or(0).max(0) as u64,
            created_utc: self.created_utc.unwrap_or(0.0) as i64,
            id: self.id.unwrap_or_default(),
            url: self.url.filter(|u| !u.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_maps_to_posts() {
        let json = r#"{"kind":"Listing","data":{"after":"t3_next","children":[
            {"kind":"t3","data":{"id":"abc","title":"AG1 bloating?","selftext":"Every morning",
             "score":42,"num_comments":7,"created_utc":1700000000.0,
             "url":"https://www.reddit.com/r/supplements/comments/abc/"}}]}}"#;
        let listing: SearchListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.next_cursor().as_deref(), Some("t3_next"));

        let post = listing.data.children[0].data.clone().into_post("supplements");
        assert_eq!(post.source, "supplements");
        assert_eq!(post.title, "AG1 bloating?");
        assert_eq!(post.body, "Every morning");
        assert_eq!(post.upvotes, 42);
        assert_eq!(post.comments_count, 7);
        assert_eq!(post.created_utc, 1_700_000_000);
        assert_eq!(post.id, "abc");
    }

    #[test]
    fn missing_fields_and_negative_scores_are_normalized() {
        let post = RedditPost {
            score: Some(-5),
            url: Some(String::new()),
            ..Default::default()
        }
        .into_post("frugal");
        assert_eq!(post.upvotes, 0);
        assert_eq!(post.title, "");
        assert!(post.url.is_none());
    }

    #[test]
    fn empty_or_null_cursor_ends_pagination() {
        let listing: SearchListing =
            serde_json::from_str(r#"{"data":{"after":"","children":[]}}"#).unwrap();
        assert!(listing.next_cursor().is_none());
        let listing: SearchListing = serde_json::from_str(r#"{"data":{"after":null}}"#).unwrap();
        assert!(listing.next_cursor().is_none());
        let listing: SearchListing = serde_json::from_str("{}").unwrap();
        assert!(listing.data.children.is_empty());
    }

    #[test]
    fn params_include_cursor_only_when_present() {
        let mut request = PageRequest {
            source: "nutrition".into(),
            query: "protein bar".into(),
            page_size: 25,
            sort: "new".into(),
            after: None,
            user_agent: "ua".into(),
        };
        assert!(!request.params().iter().any(|(k, _)| *k == "after"));
        request.after = Some("t3_x".into());
        assert!(request.params().contains(&("after", "t3_x".to_string())));
        assert!(request.params().contains(&("restrict_sr", "1".to_string())));
    }
}
