//! File Transfer Module
//!
//! Single-file uploads bound to a user identity and downloads by reference.
//!
//! - **`storage`** - staged writes, upload records, ownership-checked serving
//! - **`handlers`** - the multipart upload and download endpoints

pub mod storage;

pub mod handlers;

pub use handlers::{download_file, upload_file, UPLOAD_FIELD};
pub use storage::{FileStorage, UploadRecord};
