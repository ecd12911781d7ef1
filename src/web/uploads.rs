use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{
    config::UploadConfig,
    error::{AppError, Result},
};

/// Allowed image extensions
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Public URL prefix under which stored files are served.
pub const URL_PREFIX: &str = "/uploads/";

fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Both the extension and the declared MIME type must name an allowed image type.
pub fn check_image(filename: &str, content_type: Option<&str>) -> Result<String> {
    let not_an_image = || AppError::BadRequest("Only image files are allowed".to_string());

    let extension = file_extension(filename).ok_or_else(not_an_image)?;
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(not_an_image());
    }

    let mime = content_type.map(|m| m.to_lowercase()).ok_or_else(not_an_image)?;
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(not_an_image());
    }

    Ok(extension)
}

/// `profile-<user>-<millis>-<nonce>.<ext>`; unique per user and instant.
pub fn profile_photo_name(user_id: Uuid, extension: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "profile-{}-{}-{}.{}",
        user_id,
        Utc::now().timestamp_millis(),
        &nonce[..8],
        extension
    )
}

/// Save an uploaded profile photo. Returns the public path, e.g.
/// `/uploads/profile-<id>-1700000000000-1a2b3c4d.png`.
pub async fn save_profile_photo(
    config: &UploadConfig,
    user_id: Uuid,
    filename: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<String> {
    if data.is_empty() {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    }
    if data.len() > config.max_file_bytes {
        return Err(AppError::BadRequest(format!(
            "File too large (max {} MB)",
            config.max_file_bytes / (1024 * 1024)
        )));
    }

    let extension = check_image(filename, content_type)?;

    let uploads_path = PathBuf::from(&config.dir);
    fs::create_dir_all(&uploads_path).await.map_err(|e| {
        AppError::Internal(format!("Failed to create uploads directory: {}", e))
    })?;

    let new_filename = profile_photo_name(user_id, &extension);
    let file_path = uploads_path.join(&new_filename);

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&file_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create file: {}", e)))?;

    file.write_all(data).await.map_err(|e| {
        AppError::Internal(format!("Failed to write file: {}", e))
    })?;
    file.flush().await.map_err(|e| {
        AppError::Internal(format!("Failed to write file: {}", e))
    })?;

    Ok(format!("{}{}", URL_PREFIX, new_filename))
}

/// Delete a stored file by its public path. Paths outside the upload
/// directory are ignored.
pub async fn delete_uploaded_file(upload_dir: &Path, url_path: &str) -> Result<()> {
    let Some(name) = url_path.strip_prefix(URL_PREFIX) else {
        return Ok(());
    };
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Ok(());
    }

    let path = upload_dir.join(name);
    if fs::try_exists(&path).await.unwrap_or(false) {
        fs::remove_file(&path).await.map_err(|e| {
            AppError::Internal(format!("Failed to delete file: {}", e))
        })?;
    }

    Ok(())
}
