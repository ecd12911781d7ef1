mod common;

use alumni_portal::domain::Role;
use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn students_see_redacted_profiles() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, ada) = app.alumni("ada@example.com", 2015, "Computer Science").await?;
    let (_, student) = app.user(Role::Student, true, "s@example.com").await?;

    let (status, _) = app
        .put(
            "/api/alumni/profile",
            &ada,
            json!({
                "phone": "555-0100",
                "location": { "city": "London", "country": "UK" },
                "privacySettings": { "showEmail": false, "showPhone": true, "showLocation": false }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/student/alumni", &student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let listed = &body["profiles"][0];
    assert_eq!(listed["user"]["email"], "Hidden");
    assert!(listed.get("phone").is_none());
    assert_eq!(listed["location"], Value::Object(Default::default()));
    assert!(listed.get("privacySettings").is_none());

    // Same rules on the single-profile route.
    let id = listed["id"].as_str().unwrap_or_default().to_string();
    let (status, body) = app.get(&format!("/api/student/alumni/{}", id), &student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["user"]["email"], "Hidden");
    assert!(body["profile"].get("phone").is_none());

    Ok(())
}

#[tokio::test]
async fn show_email_reveals_address_to_other_alumni() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, ada) = app.alumni("ada@example.com", 2015, "Computer Science").await?;
    let (_, bob) = app.alumni("bob@example.com", 2012, "Physics").await?;

    let (status, _) = app
        .put(
            "/api/alumni/profile",
            &ada,
            json!({
                "phone": "555-0100",
                "privacySettings": { "showEmail": true, "showPhone": true, "showLocation": true }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/alumni/search?department=computer", &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["profiles"][0]["user"]["email"], "ada@example.com");
    assert_eq!(body["profiles"][0]["phone"], "555-0100");

    Ok(())
}

#[tokio::test]
async fn pending_alumni_stay_out_of_the_directory() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, student) = app.user(Role::Student, true, "s@example.com").await?;
    app.alumni("listed@example.com", 2010, "Economics").await?;

    let (pending, pending_token) = app.user(Role::Alumni, false, "pending@example.com").await?;
    // Profile routes are closed until approval, so write it directly.
    let profile = alumni_portal::repository::ProfileRepository::create(
        app.ctx.profile_repo.as_ref(),
        pending.id,
        &alumni_portal::domain::ProfileData::initial(2020, "Economics".to_string()),
    )
    .await?;

    let (status, _) = app.get("/api/alumni/profile", &pending_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.get("/api/student/alumni?department=economics", &student).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["profiles"][0]["graduationYear"], 2010);

    let (status, body) = app
        .get(&format!("/api/student/alumni/{}", profile.id), &student)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Profile not found");

    let (status, _) = app
        .get(&format!("/api/student/alumni/{}", Uuid::new_v4()), &student)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn search_matches_skills_and_orders_by_graduation_year() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, older) = app.alumni("older@example.com", 2005, "Physics").await?;
    let (_, newer) = app.alumni("newer@example.com", 2019, "Physics").await?;
    let (_, viewer) = app.alumni("viewer@example.com", 2000, "History").await?;

    for token in [&older, &newer] {
        let (status, _) = app
            .put(
                "/api/alumni/profile",
                token,
                json!({ "skills": ["Rust", "Embedded Systems"] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.get("/api/alumni/search?query=embedded", &viewer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["profiles"][0]["graduationYear"], 2019);
    assert_eq!(body["profiles"][1]["graduationYear"], 2005);

    let (_, body) = app.get("/api/alumni/search?graduationYear=2005", &viewer).await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get("/api/alumni/search?query=cobol", &viewer).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["totalPages"], 0);

    Ok(())
}

#[tokio::test]
async fn owner_reads_and_updates_profile() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, ada) = app.alumni("ada@example.com", 2015, "Computer Science").await?;

    let (status, body) = app
        .put(
            "/api/alumni/profile",
            &ada,
            json!({
                "company": "  Analytical Engines Ltd ",
                "position": "Engineer",
                "bio": "Notes on the engine"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["profile"]["company"], "Analytical Engines Ltd");

    let (status, body) = app.get("/api/alumni/profile", &ada).await;
    assert_eq!(status, StatusCode::OK);
    let profile = &body["profile"];
    assert_eq!(profile["user"]["email"], "ada@example.com");
    assert_eq!(profile["department"], "Computer Science");
    assert_eq!(profile["position"], "Engineer");
    assert_eq!(profile["privacySettings"]["showLocation"], true);

    let (status, body) = app
        .put("/api/alumni/profile", &ada, json!({ "bio": "x".repeat(1001) }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "bio");

    Ok(())
}

#[tokio::test]
async fn first_profile_save_requires_year_and_department() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, fresh) = app.user(Role::Alumni, true, "fresh@example.com").await?;

    let (status, body) = app.get("/api/alumni/profile", &fresh).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Profile not found");

    let (status, _) = app
        .put("/api/alumni/profile", &fresh, json!({ "company": "Acme" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            "/api/alumni/profile",
            &fresh,
            json!({ "graduationYear": 2018, "department": "Design" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["graduationYear"], 2018);

    Ok(())
}

#[tokio::test]
async fn photo_upload_replaces_previous_file() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, ada) = app.alumni("ada@example.com", 2015, "Computer Science").await?;
    let upload_dir = std::path::PathBuf::from(&app.settings.uploads.dir);

    let (status, body) = app
        .upload("/api/alumni/profile/photo", &ada, "photo", "me.png", "image/png", b"first")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile photo uploaded successfully");
    let first = body["profilePhoto"].as_str().unwrap_or_default().to_string();
    assert!(first.starts_with("/uploads/profile-"));
    let first_file = upload_dir.join(first.trim_start_matches("/uploads/"));
    assert!(first_file.exists());

    let (status, body) = app
        .upload("/api/alumni/profile/photo", &ada, "photo", "me.jpg", "image/jpeg", b"second")
        .await;
    assert_eq!(status, StatusCode::OK);
    let second = body["profilePhoto"].as_str().unwrap_or_default().to_string();
    assert_ne!(first, second);
    assert!(!first_file.exists());

    let (status, body) = app
        .upload("/api/alumni/profile/photo", &ada, "photo", "notes.txt", "text/plain", b"x")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only image files are allowed");

    let (status, body) = app
        .upload("/api/alumni/profile/photo", &ada, "avatar", "me.png", "image/png", b"x")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");

    Ok(())
}

#[tokio::test]
async fn huge_page_numbers_return_an_empty_page() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, student) = app.user(Role::Student, true, "s@example.com").await?;
    app.alumni("ada@example.com", 2015, "Computer Science").await?;

    let (status, body) = app
        .get("/api/student/alumni?page=9223372036854775807&limit=100", &student)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["profiles"].as_array().map(Vec::len), Some(0));
    assert_eq!(
        body["currentPage"],
        alumni_portal::domain::pagination::MAX_PAGE
    );

    let (status, _) = app.get("/api/events?page=9223372036854775807", &student).await;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}
