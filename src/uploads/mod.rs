pub mod services;

/// Largest request body accepted on upload routes.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
