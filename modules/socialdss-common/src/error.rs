use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocialDssError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_stage() {
        let err = SocialDssError::Validation("no texts to analyze".into());
        assert_eq!(err.to_string(), "Validation error: no texts to analyze");
        let err = SocialDssError::Database("connection refused".into());
        assert_eq!(err.to_string(), "Database error: connection refused");
    }
}
