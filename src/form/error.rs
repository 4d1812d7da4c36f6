use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{label} is required")]
    Required { field: String, label: String },

    #[error("{field} upload has not finished")]
    UploadIncomplete { field: String },

    #[error("{label} cannot be changed on this record")]
    Locked { field: String, label: String },

    #[error("Record was created; reopen it from the list to edit it further")]
    CreatedWithoutId,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
