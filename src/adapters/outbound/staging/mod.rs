mod local_staging;

pub use local_staging::{LocalStaging, DEFAULT_STAGING_ROOT};
