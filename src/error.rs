//! Error types for SCIM provisioning operations.
//!
//! `ScimError` is the single error surfaced by the provider and HTTP layers.
//! Each variant knows its HTTP status and SCIM `scimType`, so the HTTP layer
//! maps errors without inspecting their messages.

/// Main error type for SCIM provisioning operations.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Resource not found errors
    #[error("{resource_type} with ID {id} not found")]
    ResourceNotFound { resource_type: String, id: String },

    /// A unique attribute value is already owned by another resource
    #[error("{resource_type} with {attribute} \"{value}\" already exists.")]
    Uniqueness {
        resource_type: String,
        attribute: String,
        value: String,
    },

    /// Invalid request format or parameters
    #[error("{message}")]
    InvalidRequest { message: String },

    /// A required attribute is missing or carries an unusable value
    #[error("{message}")]
    InvalidValue { message: String },

    /// The request body is not valid JSON for the expected shape
    #[error("Invalid request body: {message}")]
    InvalidSyntax { message: String },

    /// A PATCH path was not understood and the server rejects such paths
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    /// Errors from the storage backend
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single attribute write was refused.
///
/// The PATCH engine turns these into skipped operations; they never fail a
/// request on their own.
#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    /// The value could not be converted into the attribute's type
    #[error("Attribute '{attribute}' has an invalid value: {source}")]
    InvalidValue {
        attribute: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value has the wrong JSON shape for the attribute
    #[error("Attribute '{attribute}' expects {expected}")]
    UnexpectedType {
        attribute: String,
        expected: &'static str,
    },

    /// The sub-attribute is not defined for items of this attribute
    #[error("Attribute '{attribute}' has no sub-attribute '{sub_attribute}'")]
    UnknownSubAttribute {
        attribute: String,
        sub_attribute: String,
    },
}

/// Invalid server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL
    #[error("Invalid base URL '{0}': expected an absolute http or https URL")]
    InvalidBaseUrl(String),

    /// The base path does not start with '/' or ends with one
    #[error("Invalid base path '{0}': expected a path starting with '/' and without a trailing '/'")]
    InvalidBasePath(String),
}

/// Result type alias for SCIM operations.
pub type ScimResult<T> = Result<T, ScimError>;

impl ScimError {
    /// Create a resource not found error
    pub fn resource_not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create a uniqueness conflict error
    pub fn uniqueness(
        resource_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Uniqueness {
            resource_type: resource_type.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    /// Wrap a storage backend error
    pub fn storage<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(error))
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ResourceNotFound { .. } => 404,
            Self::Uniqueness { .. } => 409,
            Self::InvalidRequest { .. }
            | Self::InvalidValue { .. }
            | Self::InvalidSyntax { .. }
            | Self::InvalidPath { .. } => 400,
            Self::Storage(_) | Self::Json(_) => 500,
        }
    }

    /// SCIM `scimType` detail keyword, if the error has one.
    pub fn scim_type(&self) -> Option<&'static str> {
        match self {
            Self::Uniqueness { .. } => Some("uniqueness"),
            Self::InvalidValue { .. } => Some("invalidValue"),
            Self::InvalidSyntax { .. } => Some("invalidSyntax"),
            Self::InvalidPath { .. } => Some("invalidPath"),
            _ => None,
        }
    }

    /// Whether the error is a server-side failure whose detail stays private.
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl AttributeError {
    pub(crate) fn invalid_value(attribute: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidValue {
            attribute: attribute.into(),
            source,
        }
    }

    pub(crate) fn unexpected_type(attribute: impl Into<String>, expected: &'static str) -> Self {
        Self::UnexpectedType {
            attribute: attribute.into(),
            expected,
        }
    }

    pub(crate) fn unknown_sub_attribute(
        attribute: impl Into<String>,
        sub_attribute: impl Into<String>,
    ) -> Self {
        Self::UnknownSubAttribute {
            attribute: attribute.into(),
            sub_attribute: sub_attribute.into(),
        }
    }
}
