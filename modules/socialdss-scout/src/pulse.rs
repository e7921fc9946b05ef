use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use socialdss_common::Post;

/// Body keywords that flag a post as a potential adverse event.
pub const ADVERSE_KEYWORDS: &[&str] = &["sick", "nausea", "vomit", "headache", "rash", "bloating"];

pub const TOP_POSTS: usize = 5;

/// Headline figures for a collection of posts.
#[derive(Debug, Clone, Serialize)]
pub struct MarketPulse {
    pub volume: usize,
    /// Sum of upvotes plus sum of comments.
    pub engagement: u64,
    pub potential_adverse_events: usize,
    /// Posts per UTC day, oldest first.
    pub daily_counts: Vec<(NaiveDate, usize)>,
    /// Highest-upvoted posts, at most `TOP_POSTS`.
    pub top_posts: Vec<Post>,
}

impl MarketPulse {
    pub fn from_posts(posts: &[Post]) -> Self {
        let engagement = posts.iter().map(Post::engagement).sum();

        let potential_adverse_events = posts.iter().filter(|p| mentions_adverse_event(p)).count();

        let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for date in posts.iter().filter_map(Post::date) {
            *days.entry(date.date_naive()).or_default() += 1;
        }

        let mut top_posts = posts.to_vec();
        // stable: ties keep collection order
        top_posts.sort_by(|a, b| b.upvotes.cmp(&a.upvotes));
        top_posts.truncate(TOP_POSTS);

        Self {
            volume: posts.len(),
            engagement,
            potential_adverse_events,
            daily_counts: days.into_iter().collect(),
            top_posts,
        }
    }
}

fn mentions_adverse_event(post: &Post) -> bool {
    let body = post.body.to_lowercase();
    ADVERSE_KEYWORDS.iter().any(|k| body.contains(k))
}
