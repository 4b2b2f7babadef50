use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Discord API error: {0}")]
    Discord(#[from] Box<serenity::Error>),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extension '{name}' failed to load: {reason}")]
    Extension { name: &'static str, reason: String },

    #[error("Mandatory extension '{name}' is unavailable: {source}")]
    MandatoryExtension {
        name: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("Unknown pattern '{0}'")]
    UnknownPattern(String),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        Error::Discord(Box::new(err))
    }
}

impl Error {
    pub fn user_message(&self) -> &str {
        match self {
            Error::Discord(_) => "Failed to communicate with Discord. Please try again.",
            Error::Config(_) => "The bot configuration is invalid. Ask an owner to check it.",
            Error::Database(_) => "A database error occurred. Please try again later.",
            Error::Http(_) => "The request could not be completed.",
            Error::UnknownPattern(_) | Error::Regex(_) => "That lookup is not supported.",
            Error::Io(_) | Error::Extension { .. } | Error::MandatoryExtension { .. } => {
                "Something went wrong. Please try again later."
            }
        }
    }
}
