use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("{0}")]
    Validation(String),

    #[error("blog store unavailable: {0}")]
    StoreUnavailable(#[from] DbErr),

    #[error("search took longer than {budget_ms} ms")]
    Timeout { budget_ms: u64 },
}

impl From<ValidationErrors> for RepoError {
    fn from(errors: ValidationErrors) -> Self {
        RepoError::Validation(errors.to_string())
    }
}

impl RepoError {
    /// Text shown to the reader in place of the results.
    pub fn user_message(&self) -> String {
        match self {
            RepoError::Validation(msg) => format!("Please fix the form: {msg}"),
            RepoError::StoreUnavailable(_) => {
                "Blog posts are unavailable right now, please try again later.".to_string()
            }
            RepoError::Timeout { .. } => {
                "The search took too long, try a more specific title.".to_string()
            }
        }
    }
}
