use std::{str::FromStr, sync::Arc};

use clap::Parser;
use fake::{
    Fake,
    faker::{
        lorem::en::Sentence,
        name::en::{FirstName, LastName},
        phone_number::en::PhoneNumber,
    },
};
use residence::{
    auth::AuthService,
    bootstrap,
    config::BootstrapConfig,
    domain::*,
    integrations::IntegrationManager,
    repository::UserRepository,
    service::ServiceContext,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Seed the residence database")]
struct Args {
    /// SQLite connection string
    #[arg(long, default_value = "sqlite://residence.db")]
    database_url: String,

    #[arg(long, default_value = "admin@residence.local")]
    admin_email: String,

    #[arg(long, default_value = "Admin@12345")]
    admin_password: String,

    /// Also create demo blocks, rooms, students, an application and an announcement
    #[arg(long)]
    demo: bool,

    /// Number of demo students
    #[arg(long, default_value_t = 8)]
    students: usize,
}

struct BlockSeed {
    name: &'static str,
    gender: GenderDesignation,
    description: &'static str,
}

const BLOCKS: [BlockSeed; 3] = [
    BlockSeed {
        name: "Block A",
        gender: GenderDesignation::Male,
        description: "Male residence close to the sports complex",
    },
    BlockSeed {
        name: "Block B",
        gender: GenderDesignation::Female,
        description: "Female residence next to the library",
    },
    BlockSeed {
        name: "Block C",
        gender: GenderDesignation::Mixed,
        description: "Mixed residence for postgraduate students",
    },
];

fn email_part(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let connect_options = SqliteConnectOptions::from_str(&args.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let auth_service = Arc::new(AuthService::new(db_pool.clone(), 24));
    let ctx = ServiceContext::new(db_pool.clone(), Arc::new(IntegrationManager::new()), auth_service);

    let admin_config = BootstrapConfig {
        seed_default_admin: true,
        admin_email: args.admin_email.clone(),
        admin_password: args.admin_password.clone(),
        ..BootstrapConfig::default()
    };

    match bootstrap::ensure_default_admin(&ctx.user_service, &admin_config).await? {
        Some(admin) => println!("  ✅ Created admin user ({} / {})", admin.email, args.admin_password),
        None => println!("  ℹ️  An administrator already exists, skipping"),
    }

    if !args.demo {
        println!("✨ Done");
        return Ok(());
    }

    println!("🏢 Creating blocks and rooms...");
    let mut blocks = Vec::new();
    for seed in BLOCKS {
        let block = match ctx.room_service.create_block(CreateBlockRequest {
            name: seed.name.to_string(),
            gender: seed.gender,
            description: Some(seed.description.to_string()),
        }).await {
            Ok(block) => block,
            Err(e) => {
                println!("  ⚠️  Skipping {}: {}", seed.name, e);
                continue;
            }
        };

        for floor in 1..=2 {
            for number in 1..=3 {
                let room_type = if number == 3 { RoomType::Double } else { RoomType::Single };
                ctx.room_service.create_room(CreateRoomRequest {
                    block_id: block.id,
                    room_number: format!("{}{}0{}", &seed.name[6..], floor, number),
                    floor,
                    capacity: if room_type == RoomType::Double { 2 } else { 1 },
                    room_type,
                    gender: seed.gender,
                    amenities: vec!["Desk".to_string(), "Wardrobe".to_string(), "WiFi".to_string()],
                }).await?;
            }
        }

        println!("  ✅ {} with 6 rooms", block.name);
        blocks.push(block);
    }

    println!("👥 Creating students...");
    let mut students = Vec::new();
    for i in 0..args.students {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let gender = if i % 2 == 0 { Gender::Female } else { Gender::Male };

        let student = ctx.user_service.register(RegisterRequest {
            email: format!("{}.{}{}@students.residence.local", email_part(&first), email_part(&last), i),
            password: "password123".to_string(),
            full_name: format!("{} {}", first, last),
            gender: Some(gender),
            student_number: Some(format!("S{:06}", 100_000 + i)),
            phone: Some(PhoneNumber().fake()),
        }).await?;

        students.push(student);
    }
    println!("  ✅ Created {} students (password: password123)", students.len());

    if let Some(student) = students.first() {
        let preferred = blocks
            .iter()
            .find(|block| student.gender.map(|g| block.gender.admits(g)).unwrap_or(false))
            .map(|block| block.id);

        ctx.application_service.submit(student, SubmitApplicationRequest {
            preferred_block_id: preferred,
            room_type: RoomType::Single,
            special_requirements: None,
            emergency_contact_name: Some(format!("{} {}", FirstName().fake::<String>(), LastName().fake::<String>())),
            emergency_contact_phone: Some(PhoneNumber().fake()),
            emergency_contact_relationship: Some("Parent".to_string()),
            academic_year: Some("2025/2026".to_string()),
            semester: Some("First".to_string()),
        }).await?;
        println!("  ✅ Pending application for {}", student.full_name);
    }

    println!("📢 Creating announcements...");
    let admin_filter = UserFilter {
        role: Some(UserRole::Admin),
        ..Default::default()
    };
    let author = ctx.user_repo
        .list(admin_filter, 1, 0)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no administrator to author announcements"))?;
    let content: String = Sentence(8..16).fake();
    ctx.announcement_service.create(&author, CreateAnnouncementRequest {
        title: "Welcome to the residence portal".to_string(),
        content,
        announcement_type: AnnouncementType::General,
        priority: AnnouncementPriority::Medium,
        target_audience: TargetAudience::All,
        expires_at: None,
        publish_now: true,
    }).await?;
    println!("  ✅ Published welcome announcement");

    println!("✨ Done");
    Ok(())
}
