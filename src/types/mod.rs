mod status_code;

pub use status_code::ApiStatusCode;
