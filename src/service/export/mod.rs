//! Admin exports of the alumni directory.
//!
//! Each export is rendered into its own temporary file. The returned
//! [`ExportArtifact`] owns the file: dropping it deletes the file, so callers
//! keep it alive for as long as the download is streaming.

pub mod csv_writer;
pub mod pdf;

use std::sync::Arc;

use tempfile::TempPath;

use crate::{
    domain::DirectoryEntry,
    error::{AppError, Result},
    repository::ProfileRepository,
};
use pdf::{PdfWriter, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn filename(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "alumni_export.csv",
            ExportFormat::Pdf => "alumni_export.pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            ExportFormat::Csv => ".csv",
            ExportFormat::Pdf => ".pdf",
        }
    }
}

pub struct ExportArtifact {
    pub format: ExportFormat,
    pub path: TempPath,
}

impl ExportArtifact {
    pub fn filename(&self) -> &'static str {
        self.format.filename()
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

pub struct ExportService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ExportService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn alumni_csv(&self) -> Result<ExportArtifact> {
        let entries = self.profiles.list_for_export().await?;
        render(ExportFormat::Csv, entries).await
    }

    pub async fn alumni_pdf(&self) -> Result<ExportArtifact> {
        let entries = self.profiles.list_for_export().await?;
        render(ExportFormat::Pdf, entries).await
    }
}

async fn render(format: ExportFormat, entries: Vec<DirectoryEntry>) -> Result<ExportArtifact> {
    let count = entries.len();
    let artifact = tokio::task::spawn_blocking(move || write_artifact(format, &entries))
        .await
        .map_err(|e| AppError::Internal(format!("Export task failed: {}", e)))??;

    tracing::info!("Exported {} alumni as {:?}", count, format);
    Ok(artifact)
}

fn write_artifact(format: ExportFormat, entries: &[DirectoryEntry]) -> Result<ExportArtifact> {
    let io_error = |e: std::io::Error| AppError::Internal(format!("Failed to write export: {}", e));

    let mut file = tempfile::Builder::new()
        .prefix("alumni-export-")
        .suffix(format.suffix())
        .tempfile()
        .map_err(io_error)?;

    match format {
        ExportFormat::Csv => csv_writer::write_alumni(file.as_file_mut(), entries)
            .map_err(|e| AppError::Internal(format!("Failed to write export: {}", e)))?,
        ExportFormat::Pdf => {
            use std::io::Write;
            file.as_file_mut()
                .write_all(&alumni_pdf_bytes(entries))
                .map_err(io_error)?;
        }
    }

    Ok(ExportArtifact {
        format,
        path: file.into_temp_path(),
    })
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

pub fn alumni_pdf_bytes(entries: &[DirectoryEntry]) -> Vec<u8> {
    let mut pdf = PdfWriter::new();
    pdf.line(Style::Title, "Alumni Directory");
    pdf.gap();

    for (index, entry) in entries.iter().enumerate() {
        let profile = &entry.profile;
        pdf.line(Style::Heading, &format!("{}. {}", index + 1, entry.user.name));
        pdf.line(Style::Body, &format!("   Email: {}", entry.user.email));
        pdf.line(Style::Body, &format!("   Graduation Year: {}", profile.graduation_year));
        pdf.line(Style::Body, &format!("   Department: {}", profile.department));
        pdf.line(Style::Body, &format!("   Company: {}", or_na(&profile.company)));
        pdf.line(Style::Body, &format!("   Position: {}", or_na(&profile.position)));
        pdf.gap();
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlumniProfile, Location, PrivacySettings, Role, SocialLinks, User};
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(name: &str, company: &str) -> DirectoryEntry {
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: Role::Alumni,
            is_approved: true,
            is_active: true,
            profile_photo: String::new(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        DirectoryEntry {
            profile: AlumniProfile {
                id: Uuid::new_v4(),
                user_id: user.id,
                graduation_year: 2018,
                department: "Mathematics".into(),
                degree: String::new(),
                company: company.into(),
                position: String::new(),
                location: Location {
                    city: "Austin".into(),
                    state: "TX".into(),
                    country: "USA".into(),
                },
                bio: String::new(),
                social_links: SocialLinks::default(),
                phone: String::new(),
                skills: Vec::new(),
                privacy_settings: PrivacySettings::default(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            user,
        }
    }

    #[test]
    fn csv_has_header_and_quoted_location() {
        let artifact =
            write_artifact(ExportFormat::Csv, &[entry("Ada", "Acme"), entry("Linus", "")]).unwrap();
        let body = std::fs::read_to_string(&artifact.path).unwrap();
        let mut lines = body.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Name,Email,Graduation Year,Department,Company,Position,Location,Approved"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Ada,ada@example.com,2018,Mathematics,Acme,,\"Austin, TX, USA\",true"
        );
        assert_eq!(body.lines().count(), 3);
        assert_eq!(artifact.filename(), "alumni_export.csv");
    }

    #[test]
    fn empty_csv_still_has_header() {
        let artifact = write_artifact(ExportFormat::Csv, &[]).unwrap();
        let body = std::fs::read_to_string(&artifact.path).unwrap();
        assert_eq!(body.lines().count(), 1);
    }

    #[test]
    fn pdf_lists_every_alumni() {
        let bytes = alumni_pdf_bytes(&[entry("Ada", ""), entry("Linus", "Kernel")]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("(1. Ada) Tj"));
        assert!(text.contains("(2. Linus) Tj"));
        assert!(text.contains("(   Company: N/A) Tj"));
    }

    #[test]
    fn dropping_the_artifact_removes_the_file() {
        let artifact = write_artifact(ExportFormat::Pdf, &[entry("Ada", "Acme")]).unwrap();
        let path = artifact.path.to_path_buf();
        assert!(path.exists());
        drop(artifact);
        assert!(!path.exists());
    }
}
