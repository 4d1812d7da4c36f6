//! Detail form state: what was loaded, what the user changed, and what
//! goes out when they save.

pub mod error;
pub mod schema;
pub mod submit;
pub mod tracker;
pub mod upload;
pub mod value;

pub use error::FormError;
pub use submit::{send_submission, upload_file};
pub use schema::{FieldKind, FieldSpec, FormSchema, Payload};
pub use tracker::{ChangeSet, ChangeTracker, EntitySnapshot, FormValues, SubmitMode, Submission, diff};
pub use upload::{LocalFile, UploadDescriptor, UploadKind, UploadRejection, UploadResponse};
pub use value::FieldValue;
