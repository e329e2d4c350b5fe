pub mod bucket_name;
pub mod labels;
pub mod object_key;

pub use bucket_name::BucketName;
pub use labels::{Label, LabelSet};
pub use object_key::ObjectKey;
