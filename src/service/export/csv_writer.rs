use std::io::Write;

use serde::Serialize;

use crate::domain::DirectoryEntry;

#[derive(Debug, Serialize)]
struct AlumniCsvRow<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Graduation Year")]
    graduation_year: i32,
    #[serde(rename = "Department")]
    department: &'a str,
    #[serde(rename = "Company")]
    company: &'a str,
    #[serde(rename = "Position")]
    position: &'a str,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Approved")]
    approved: bool,
}

impl<'a> From<&'a DirectoryEntry> for AlumniCsvRow<'a> {
    fn from(entry: &'a DirectoryEntry) -> Self {
        Self {
            name: &entry.user.name,
            email: &entry.user.email,
            graduation_year: entry.profile.graduation_year,
            department: &entry.profile.department,
            company: &entry.profile.company,
            position: &entry.profile.position,
            location: entry.profile.location.display(),
            approved: entry.user.is_approved,
        }
    }
}

/// Writes a header row followed by one row per alumni.
pub fn write_alumni<W: Write>(out: W, entries: &[DirectoryEntry]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for entry in entries {
        writer.serialize(AlumniCsvRow::from(entry))?;
    }
    if entries.is_empty() {
        writer.write_record([
            "Name",
            "Email",
            "Graduation Year",
            "Department",
            "Company",
            "Position",
            "Location",
            "Approved",
        ])?;
    }
    writer.flush()?;
    Ok(())
}
