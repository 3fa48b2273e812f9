pub mod locale_helpers;
pub mod rate_limit_helpers;
pub mod reading_time_helpers;
pub mod text_helpers;
pub mod upload_helpers;
pub mod validation_helpers;
