use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::types::Post;

/// How far back collected posts are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeHorizon {
    #[default]
    Last30Days,
    Last60Days,
    Last90Days,
    AllTime,
}

impl TimeHorizon {
    pub fn days(self) -> Option<i64> {
        match self {
            TimeHorizon::Last30Days => Some(30),
            TimeHorizon::Last60Days => Some(60),
            TimeHorizon::Last90Days => Some(90),
            TimeHorizon::AllTime => None,
        }
    }

    /// Posts must be strictly newer than this instant. `None` keeps everything.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|d| now - Duration::days(d))
    }

    pub fn retain(self, posts: Vec<Post>, now: DateTime<Utc>) -> Vec<Post> {
        let Some(cutoff) = self.cutoff(now) else {
            return posts;
        };
        posts
            .into_iter()
            .filter(|p| p.date().is_some_and(|d| d > cutoff))
            .collect()
    }
}

impl fmt::Display for TimeHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.days() {
            Some(d) => write!(f, "Last {d} Days"),
            None => write!(f, "All Time"),
        }
    }
}

impl FromStr for TimeHorizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "30" | "30d" => Ok(TimeHorizon::Last30Days),
            "60" | "60d" => Ok(TimeHorizon::Last60Days),
            "90" | "90d" => Ok(TimeHorizon::Last90Days),
            "all" | "all-time" => Ok(TimeHorizon::AllTime),
            other => Err(format!(
                "unknown time horizon '{other}' (expected 30, 60, 90 or all)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_at(created_utc: i64) -> Post {
        Post {
            source: "nutrition".into(),
            title: String::new(),
            body: String::new(),
            upvotes: 0,
            comments_count: 0,
            created_utc,
            id: created_utc.to_string(),
            url: None,
        }
    }

    #[test]
    fn retain_keeps_only_posts_after_cutoff() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let day = 86_400;
        let posts = vec![
            post_at(now.timestamp() - day),
            post_at(now.timestamp() - 30 * day),
            post_at(now.timestamp() - 45 * day),
        ];

        let kept = TimeHorizon::Last30Days.retain(posts.clone(), now);
        assert_eq!(kept.len(), 1, "exactly-at-cutoff is excluded");

        let kept = TimeHorizon::Last60Days.retain(posts.clone(), now);
        assert_eq!(kept.len(), 3);

        let kept = TimeHorizon::AllTime.retain(posts, now);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn parses_cli_values() {
        assert_eq!("90".parse::<TimeHorizon>().unwrap(), TimeHorizon::Last90Days);
        assert_eq!("ALL".parse::<TimeHorizon>().unwrap(), TimeHorizon::AllTime);
        assert!("7".parse::<TimeHorizon>().is_err());
        assert_eq!(TimeHorizon::Last60Days.to_string(), "Last 60 Days");
    }
}
