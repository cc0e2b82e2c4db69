use chrono::{Duration, Utc};
use clap::Parser;
use evently::{
    config::EventRules,
    domain::{
        CreateCategoryRequest, CreateUserRequest, Location, NewEvent, OrganizerEventPatch,
        OrganizerStateAction, RequestStatus, ResolutionTarget,
    },
    repository::{CategoryRepository, UserRepository},
    service::ServiceContext,
};
use sqlx::sqlite::SqlitePoolOptions;

/// Populate a database with demo users, events and participation requests.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// SQLite connection string
    #[arg(long, default_value = "sqlite:evently.db?mode=rwc")]
    database_url: String,

    /// Number of participants requesting a seat at the moderated event
    #[arg(long, default_value_t = 5)]
    participants: usize,

    /// Seats available at the moderated event
    #[arg(long, default_value_t = 3)]
    limit: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let ctx = ServiceContext::new(db_pool, EventRules::default());

    println!("👥 Creating users...");
    let organizer = ctx.user_repo.create(CreateUserRequest {
        name: "Olga Organizer".to_string(),
        email: "organizer@evently.local".to_string(),
    }).await?;

    let mut participants = Vec::with_capacity(args.participants);
    for i in 0..args.participants {
        participants.push(ctx.user_repo.create(CreateUserRequest {
            name: format!("Participant {}", i + 1),
            email: format!("participant{}@evently.local", i + 1),
        }).await?);
    }
    println!("  ✅ Created organizer and {} participants", participants.len());

    let category = ctx.category_repo.create(CreateCategoryRequest {
        name: "Meetups".to_string(),
    }).await?;

    println!("📅 Creating events...");
    let moderated = ctx.event_service.create_event(organizer.id, NewEvent {
        category_id: category.id,
        title: "Rust Systems Meetup".to_string(),
        annotation: "An evening of talks about async runtimes and storage engines".to_string(),
        description: "Two talks, one lightning round, and plenty of time to argue about lifetimes.".to_string(),
        event_date: Utc::now() + Duration::days(14),
        location: Location { lat: 59.93, lon: 30.31 },
        paid: false,
        participant_limit: args.limit,
        request_moderation: true,
    }).await?;
    ctx.event_service.publish(moderated.id).await?;

    let open = ctx.event_service.create_event(organizer.id, NewEvent {
        category_id: category.id,
        title: "Open Park Run".to_string(),
        annotation: "A free community run around the park, everyone welcome".to_string(),
        description: "Meet at the main gate. No registration review, just show up on time.".to_string(),
        event_date: Utc::now() + Duration::days(7),
        location: Location { lat: 59.94, lon: 30.27 },
        paid: false,
        participant_limit: 0,
        request_moderation: false,
    }).await?;
    ctx.event_service.publish(open.id).await?;

    let draft = ctx.event_service.create_event(organizer.id, NewEvent {
        category_id: category.id,
        title: "Compiler Workshop".to_string(),
        annotation: "Hands-on workshop writing a tiny compiler from scratch".to_string(),
        description: "Bring a laptop. We will build a lexer, a parser and a code generator.".to_string(),
        event_date: Utc::now() + Duration::days(30),
        location: Location { lat: 59.95, lon: 30.32 },
        paid: true,
        participant_limit: 20,
        request_moderation: true,
    }).await?;
    ctx.event_service.edit_by_organizer(organizer.id, draft.id, OrganizerEventPatch {
        state_action: Some(OrganizerStateAction::SendToReview),
        ..Default::default()
    }).await?;
    println!("  ✅ Created 2 published events and 1 draft");

    println!("🎟️  Creating participation requests...");
    let mut pending = Vec::new();
    for participant in &participants {
        let request = ctx.request_service.create_request(participant.id, moderated.id).await?;
        if request.status == RequestStatus::Pending {
            pending.push(request.id);
        }
        ctx.request_service.create_request(participant.id, open.id).await?;
    }

    if !pending.is_empty() {
        let result = ctx.request_service
            .resolve_batch(organizer.id, moderated.id, &pending, ResolutionTarget::Confirmed)
            .await?;
        println!(
            "  ✅ Resolved moderated event: {} confirmed, {} rejected",
            result.confirmed.len(),
            result.rejected.len()
        );
    }

    println!("🎉 Seeding complete!");
    Ok(())
}
