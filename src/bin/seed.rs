use alumni_portal::{
    auth::AuthService,
    config::Settings,
    domain::{
        normalize_email, Audience, AnnouncementData, EventData, EventType, EmploymentType,
        JobData, Location, NewUser, ProfileData, Role, Salary,
    },
    repository::{
        self, AnnouncementRepository, EventRepository, JobRepository, ProfileRepository,
        SqliteAnnouncementRepository, SqliteEventRepository, SqliteJobRepository,
        SqliteProfileRepository, SqliteUserRepository, UserRepository,
    },
};
use anyhow::Context;
use chrono::{Datelike, Duration, Utc};
use clap::Parser;
use fake::{
    faker::{
        address::en::{CityName, CountryName, StateName},
        company::en::CompanyName,
        job::en::Title,
        name::en::Name,
    },
    Fake,
};

const DEPARTMENTS: &[&str] = &[
    "Computer Science",
    "Mechanical Engineering",
    "Economics",
    "Physics",
    "Business Administration",
];

#[derive(Debug, Parser)]
#[command(about = "Create the admin account and optional sample data")]
struct Args {
    #[arg(long, default_value = "admin@alumni.local")]
    admin_email: String,

    #[arg(long, default_value = "admin123")]
    admin_password: String,

    #[arg(long, default_value = "System Administrator")]
    admin_name: String,

    /// Also create sample alumni, students, events, jobs and announcements.
    #[arg(long)]
    sample: bool,

    /// Number of sample alumni to generate.
    #[arg(long, default_value_t = 12)]
    alumni: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let settings = Settings::load().context("Failed to load configuration")?;

    println!("🌱 Starting database seeding...");

    let db_pool = repository::connect(&settings.database.url, 5).await?;

    let users = SqliteUserRepository::new(db_pool.clone());
    let profiles = SqliteProfileRepository::new(db_pool.clone());
    let events = SqliteEventRepository::new(db_pool.clone());
    let jobs = SqliteJobRepository::new(db_pool.clone());
    let announcements = SqliteAnnouncementRepository::new(db_pool.clone());

    // Admin account; re-running is a no-op.
    let admin_email = normalize_email(&args.admin_email);
    let admin = match users.find_by_email(&admin_email).await? {
        Some(existing) => {
            println!("  ℹ️  Admin {} already exists", existing.email);
            existing
        }
        None => {
            let admin = users
                .create(NewUser {
                    name: args.admin_name.clone(),
                    email: admin_email,
                    password_hash: AuthService::hash_password(&args.admin_password).await?,
                    role: Role::Admin,
                    is_approved: true,
                })
                .await?;
            println!("  ✅ Created admin user ({} / {})", admin.email, args.admin_password);
            admin
        }
    };

    if !args.sample {
        println!("✨ Done");
        return Ok(());
    }

    println!("👥 Creating sample alumni and students...");
    let password_hash = AuthService::hash_password("password123").await?;
    let this_year = Utc::now().year();

    let mut alumni = Vec::new();
    for i in 0..args.alumni {
        let name: String = Name().fake();
        let email = format!("alumni{}@example.com", i + 1);
        if users.find_by_email(&email).await?.is_some() {
            continue;
        }

        let user = users
            .create(NewUser {
                name,
                email,
                password_hash: password_hash.clone(),
                role: Role::Alumni,
                // Leave a few pending so the approval queue has something in it.
                is_approved: i % 4 != 3,
            })
            .await?;

        let mut data = ProfileData::initial(
            (1995..this_year).fake::<i32>(),
            DEPARTMENTS[i % DEPARTMENTS.len()].to_string(),
        );
        data.company = CompanyName().fake();
        data.position = Title().fake();
        data.location = Location {
            city: CityName().fake(),
            state: StateName().fake(),
            country: CountryName().fake(),
        };
        data.skills = vec!["communication".to_string(), "leadership".to_string()];
        data.privacy_settings.show_email = i % 2 == 0;
        profiles.create(user.id, &data).await?;

        alumni.push(user);
    }

    for i in 0..3 {
        let email = format!("student{}@example.com", i + 1);
        if users.find_by_email(&email).await?.is_some() {
            continue;
        }
        users
            .create(NewUser {
                name: Name().fake(),
                email,
                password_hash: password_hash.clone(),
                role: Role::Student,
                is_approved: true,
            })
            .await?;
    }
    println!("  ✅ Created {} alumni and 3 students", alumni.len());

    println!("📅 Creating events...");
    for (days, title, event_type, capacity) in [
        (14, "Annual Alumni Reunion", EventType::Reunion, None),
        (30, "Career Networking Night", EventType::Networking, Some(50)),
        (45, "Resume Workshop", EventType::Workshop, Some(2)),
    ] {
        events
            .create(
                admin.id,
                &EventData {
                    title: title.to_string(),
                    description: format!("{} hosted by the alumni office.", title),
                    date: Utc::now() + Duration::days(days),
                    location: "Main Campus Hall".to_string(),
                    event_type,
                    max_attendees: capacity,
                    is_active: true,
                    image: String::new(),
                },
            )
            .await?;
    }

    println!("💼 Creating job postings...");
    for poster in alumni.iter().filter(|u| u.is_approved).take(3) {
        let company: String = CompanyName().fake();
        jobs.create(
            poster.id,
            &JobData {
                title: Title().fake(),
                company: company.clone(),
                description: format!("Join the team at {}.", company),
                location: CityName().fake(),
                employment_type: EmploymentType::FullTime,
                salary: Salary {
                    min: Some(60_000),
                    max: Some(90_000),
                    ..Default::default()
                },
                requirements: vec!["Bachelor's degree".to_string()],
                contact_email: poster.email.clone(),
                is_active: true,
            },
        )
        .await?;
    }

    println!("📢 Creating announcements...");
    announcements
        .create(
            admin.id,
            &AnnouncementData {
                title: "Welcome to the Alumni Portal".to_string(),
                message: "Update your profile so classmates can find you.".to_string(),
                target_audience: [Audience::All].into_iter().collect(),
                is_important: true,
                is_active: true,
            },
        )
        .await?;
    announcements
        .create(
            admin.id,
            &AnnouncementData {
                title: "Mentorship programme".to_string(),
                message: "Students can now request an alumni mentor.".to_string(),
                target_audience: [Audience::Student, Audience::Alumni].into_iter().collect(),
                is_important: false,
                is_active: true,
            },
        )
        .await?;

    println!("✨ Seeding complete");
    Ok(())
}
