//! Fatal import errors.
//!
//! These stop a batch before any record is touched. Each one carries
//! operator-facing remediation steps meant to be shown verbatim.

use blogport_cms::CmsError;
use blogport_core::config::{MANAGEMENT_TOKEN_ENV, SPACE_ID_ENV};
use thiserror::Error;

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that abort a whole import or export.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Credentials are not configured.
    #[error("Missing CMS credentials: {}", missing.join(", "))]
    Configuration {
        /// Names of the unset environment variables.
        missing: Vec<&'static str>,
    },

    /// The CMS rejected the credentials.
    #[error("Invalid or insufficient CMS permissions: {details}")]
    Authorization {
        space_id: String,
        details: String,
        error_id: Option<String>,
    },

    /// The CMS could not be reached or answered unexpectedly outside
    /// per-record processing.
    #[error(transparent)]
    Remote(#[from] CmsError),
}

impl ImportError {
    /// Short headline for display.
    #[must_use]
    pub fn headline(&self) -> String {
        match self {
            Self::Configuration { missing } if missing == &[MANAGEMENT_TOKEN_ENV] => {
                "Missing CMS management token".to_string()
            }
            Self::Configuration { .. } => "Missing CMS configuration".to_string(),
            Self::Authorization { .. } => "Invalid or insufficient permissions".to_string(),
            Self::Remote(e) => e.to_string(),
        }
    }

    /// Extra detail reported by the CMS, if any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Authorization { details, .. } => Some(details),
            _ => None,
        }
    }

    /// Step-by-step instructions for fixing the problem.
    #[must_use]
    pub fn remediation(&self) -> Vec<String> {
        match self {
            Self::Configuration { missing } => configuration_steps(missing),
            Self::Authorization {
                space_id, error_id, ..
            } => authorization_steps(space_id, error_id.as_deref()),
            Self::Remote(_) => Vec::new(),
        }
    }
}

fn configuration_steps(missing: &[&str]) -> Vec<String> {
    let mut steps: Vec<String> = missing
        .iter()
        .map(|var| format!("The {var} environment variable is not configured."))
        .collect();

    steps.extend(
        [
            "",
            "To fix this:",
            "1. Sign in to the CMS web app",
            "2. Open your profile menu > Settings > CMA tokens",
            "3. Click 'Create personal access token'",
            "4. Give it a name (e.g., 'Blogport import') and click 'Generate'",
            "5. Copy the token (it won't be shown again!)",
        ]
        .map(String::from),
    );
    steps.push(format!(
        "6. Set {MANAGEMENT_TOKEN_ENV}=<token> and {SPACE_ID_ENV}=<space id> where blogport runs"
    ));
    steps.extend(
        [
            "7. Restart blogport",
            "",
            "Note: use a Personal Access Token, NOT a Content Delivery API key.",
        ]
        .map(String::from),
    );
    steps
}

fn authorization_steps(space_id: &str, error_id: Option<&str>) -> Vec<String> {
    let mut steps: Vec<String> = [
        "Your management token has insufficient permissions.",
        "",
        "Common causes:",
        "• You're using a Content Delivery API token (read-only) instead of a Management token",
        "• Your Personal Access Token doesn't have access to this specific space",
        "• The token has been revoked or expired",
        "",
        "To fix this:",
        "1. Sign in to the CMS web app",
        "2. Open your profile menu > Settings > CMA tokens",
        "3. Create a NEW Personal Access Token:",
        "   - Click 'Create personal access token'",
        "   - Give it a name (e.g., 'Blogport CSV import')",
        "   - Click 'Generate'",
        "4. Copy the new token immediately (you can't see it again!)",
    ]
    .map(String::from)
    .to_vec();

    steps.push(format!("5. Replace {MANAGEMENT_TOKEN_ENV} with the new token and restart blogport"));
    steps.push(String::new());
    steps.push(format!("Space ID: {space_id}"));
    steps.push(format!("Error: {}", error_id.unwrap_or("Unknown")));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_lists_missing_vars() {
        let err = ImportError::Configuration {
            missing: vec![MANAGEMENT_TOKEN_ENV],
        };

        assert_eq!(err.headline(), "Missing CMS management token");
        assert!(err.to_string().contains(MANAGEMENT_TOKEN_ENV));

        let steps = err.remediation();
        assert_eq!(
            steps[0],
            format!("The {MANAGEMENT_TOKEN_ENV} environment variable is not configured.")
        );
        assert!(steps.iter().any(|s| s.starts_with("1. ")));
        assert!(steps.iter().any(|s| s.starts_with("7. ")));
        assert!(err.details().is_none());
    }

    #[test]
    fn test_configuration_error_both_missing() {
        let err = ImportError::Configuration {
            missing: vec![SPACE_ID_ENV, MANAGEMENT_TOKEN_ENV],
        };
        assert_eq!(err.headline(), "Missing CMS configuration");
        assert_eq!(
            err.remediation()
                .iter()
                .filter(|s| s.ends_with("is not configured."))
                .count(),
            2
        );
    }

    #[test]
    fn test_authorization_error_details() {
        let err = ImportError::Authorization {
            space_id: "space1".to_string(),
            details: "The access token you sent could not be found or is invalid.".to_string(),
            error_id: Some("AccessTokenInvalid".to_string()),
        };

        assert_eq!(err.headline(), "Invalid or insufficient permissions");
        assert!(err.details().unwrap().contains("could not be found"));

        let steps = err.remediation();
        assert!(steps.contains(&"Space ID: space1".to_string()));
        assert_eq!(steps.last().map(String::as_str), Some("Error: AccessTokenInvalid"));
    }

    #[test]
    fn test_authorization_error_unknown_id() {
        let err = ImportError::Authorization {
            space_id: "s".to_string(),
            details: "denied".to_string(),
            error_id: None,
        };
        assert_eq!(err.remediation().last().map(String::as_str), Some("Error: Unknown"));
    }
}
