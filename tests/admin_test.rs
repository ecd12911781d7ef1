mod common;

use alumni_portal::domain::{Role, UpdateUser};
use axum::http::{header, Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn dashboard_counts_users_events_and_jobs() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, admin) = app.user(Role::Admin, true, "admin@example.com").await?;
    let (_, ada) = app.alumni("ada@example.com", 2010, "CS").await?;
    app.user(Role::Alumni, false, "pending@example.com").await?;
    app.user(Role::Student, true, "s@example.com").await?;

    let (status, _) = app
        .post(
            "/api/alumni/jobs",
            &ada,
            json!({
                "title": "Backend Engineer",
                "company": "Acme",
                "description": "Build APIs",
                "location": "Remote",
                "contactEmail": "jobs@acme.test"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            "/api/admin/events",
            &admin,
            json!({
                "title": "Past meetup",
                "description": "Already happened",
                "date": "2001-01-01T18:00:00Z",
                "location": "Hall"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get("/api/admin/dashboard", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["statistics"];
    assert_eq!(stats["totalAlumni"], 2);
    assert_eq!(stats["approvedAlumni"], 1);
    assert_eq!(stats["pendingAlumni"], 1);
    assert_eq!(stats["totalStudents"], 1);
    assert_eq!(stats["activeUsers"], 4);
    assert_eq!(stats["totalEvents"], 1);
    assert_eq!(stats["upcomingEvents"], 0);
    assert_eq!(stats["totalJobs"], 1);
    assert_eq!(body["recentRegistrations"].as_array().map(Vec::len), Some(4));

    Ok(())
}

#[tokio::test]
async fn admin_lists_and_filters_alumni() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (admin_user, admin) = app.user(Role::Admin, true, "admin@example.com").await?;
    app.alumni("ada@example.com", 2010, "CS").await?;
    let (pending, _) = app.user(Role::Alumni, false, "pending@example.com").await?;

    let (status, body) = app.get("/api/admin/alumni", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, body) = app.get("/api/admin/alumni?isApproved=false", &admin).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["alumni"][0]["user"]["email"], "pending@example.com");
    assert!(body["alumni"][0]["profile"].is_null());

    let (status, body) = app
        .put(
            &format!("/api/admin/alumni/{}", pending.id),
            &admin,
            json!({ "name": "Renamed", "isActive": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Renamed");
    assert_eq!(body["user"]["isActive"], false);

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/api/admin/alumni/{}", admin_user.id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot delete your own account");

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/admin/alumni/{}", pending.id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/admin/alumni", &admin).await;
    assert_eq!(body["total"], 1);

    Ok(())
}

#[tokio::test]
async fn csv_export_streams_attachment() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, admin) = app.user(Role::Admin, true, "admin@example.com").await?;
    let (_, ada) = app.alumni("ada@example.com", 2010, "Computer Science").await?;
    app.put(
        "/api/alumni/profile",
        &ada,
        json!({
            "company": "Engines",
            "location": { "city": "London", "country": "UK" }
        }),
    )
    .await;

    let (status, headers, body) = app.download("/api/admin/export/csv", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=alumni_export.csv"
    );

    let text = String::from_utf8(body)?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Name,Email,Graduation Year,Department,Company,Position,Location,Approved")
    );
    let row = lines.next().unwrap_or_default();
    assert!(row.contains("ada@example.com"));
    assert!(row.contains("\"London, UK\""));

    Ok(())
}

#[tokio::test]
async fn pdf_export_is_a_pdf() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, admin) = app.user(Role::Admin, true, "admin@example.com").await?;
    let (jose, _) = app.alumni("jose@example.com", 2010, "Ingeniería").await?;
    app.ctx
        .user_repo
        .update(
            jose.id,
            UpdateUser {
                name: Some("José Núñez".to_string()),
                ..Default::default()
            },
        )
        .await?;

    let (status, headers, body) = app.download("/api/admin/export/pdf", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert!(body.starts_with(b"%PDF-"));
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("Alumni Directory"));
    // Accented names survive as WinAnsi octal escapes.
    assert!(text.contains("1. Jos\\351 N\\372\\361ez"));
    assert!(text.contains("Department: Ingenier\\355a"));
    assert!(text.contains("/Encoding /WinAnsiEncoding"));

    let (_, student) = app.user(Role::Student, true, "s@example.com").await?;
    let (status, _, _) = app.download("/api/admin/export/pdf", &student).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn job_lifecycle_and_applications() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, admin) = app.user(Role::Admin, true, "admin@example.com").await?;
    let (_, poster) = app.alumni("poster@example.com", 2008, "CS").await?;
    let (_, other) = app.alumni("other@example.com", 2011, "CS").await?;
    let (student_user, student) = app.user(Role::Student, true, "s@example.com").await?;

    let (status, body) = app
        .post(
            "/api/alumni/jobs",
            &poster,
            json!({
                "title": "Data Intern",
                "company": "Acme",
                "description": "Summer internship",
                "location": "Berlin",
                "employmentType": "internship",
                "salary": { "min": 2000, "max": 1000 },
                "contactEmail": "hr@acme.test"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "salary");

    let (status, body) = app
        .post(
            "/api/alumni/jobs",
            &poster,
            json!({
                "title": "Data Intern",
                "company": "Acme",
                "description": "Summer internship",
                "location": "Berlin",
                "employmentType": "internship",
                "salary": { "min": 1000, "max": 2000 },
                "requirements": ["SQL"],
                "contactEmail": "hr@acme.test"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["job"]["salary"]["currency"], "USD");
    let id = body["job"]["id"].as_str().unwrap_or_default().to_string();

    let (_, body) = app.get("/api/jobs?employmentType=internship", &student).await;
    assert_eq!(body["total"], 1);
    let (_, body) = app.get("/api/jobs?search=acme&location=berl", &student).await;
    assert_eq!(body["total"], 1);

    let apply = format!("/api/jobs/{}/apply", id);
    let (status, body) = app.post(&apply, &student, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["applicationCount"], 1);

    let (status, body) = app.post(&apply, &student, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Already applied to this job");

    let (status, _) = app.post(&apply, &poster, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only the poster or an admin sees applications.
    let applications = format!("/api/jobs/{}/applications", id);
    let (status, _) = app.get(&applications, &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.get(&applications, &poster).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applications"][0]["status"], "pending");

    let (status, body) = app
        .put(
            &format!("{}/{}", applications, student_user.id),
            &poster,
            json!({ "status": "reviewed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applications"][0]["status"], "reviewed");

    // Deactivated postings disappear from the public listing.
    let (status, _) = app
        .put(&format!("/api/admin/jobs/{}", id), &admin, json!({ "isActive": false }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/jobs", &student).await;
    assert_eq!(body["total"], 0);
    let (status, _) = app.get(&format!("/api/jobs/{}", id), &student).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/jobs/{}", id), &poster).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/admin/jobs", &admin).await;
    assert_eq!(body["total"], 1);

    let (status, body) = app
        .request(Method::DELETE, &format!("/api/admin/jobs/{}", id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Job posting deleted successfully");

    let (status, body) = app.get(&format!("/api/jobs/{}", id), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Job posting not found");

    Ok(())
}

#[tokio::test]
async fn announcements_follow_their_audience() -> anyhow::Result<()> {
    let app = common::spawn_app().await?;
    let (_, admin) = app.user(Role::Admin, true, "admin@example.com").await?;
    let (_, ada) = app.alumni("ada@example.com", 2010, "CS").await?;
    let (_, student) = app.user(Role::Student, true, "s@example.com").await?;

    let (status, body) = app
        .post(
            "/api/admin/announcements",
            &admin,
            json!({ "title": "Reunion", "message": "Class of 2010", "targetAudience": ["alumni"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let alumni_only = body["announcement"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = app
        .post(
            "/api/admin/announcements",
            &admin,
            json!({ "title": "Welcome", "message": "Hello everyone", "isImportant": true }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["announcement"]["targetAudience"], json!(["all"]));

    let (_, body) = app.get("/api/alumni/announcements", &ada).await;
    let titles: Vec<&str> = body["announcements"]
        .as_array()
        .map(|items| items.iter().filter_map(|a| a["title"].as_str()).collect())
        .unwrap_or_default();
    // Important first.
    assert_eq!(titles, vec!["Welcome", "Reunion"]);

    let (_, body) = app.get("/api/student/announcements", &student).await;
    assert_eq!(body["announcements"].as_array().map(Vec::len), Some(1));

    let (status, _) = app
        .get(&format!("/api/announcements/{}", alumni_only), &student)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/announcements/{}", alumni_only), &ada).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .put(
            &format!("/api/admin/announcements/{}", alumni_only),
            &admin,
            json!({ "isActive": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/announcements", &ada).await;
    assert_eq!(body["announcements"].as_array().map(Vec::len), Some(1));

    // Admin listing still includes inactive ones.
    let (_, body) = app.get("/api/admin/announcements", &admin).await;
    assert_eq!(body["total"], 2);

    Ok(())
}
