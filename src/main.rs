//! Motorent - command-line client for the Motorent car rental platform

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motorent::{
    api::ApiClient,
    config::Config,
    services::{AdminService, BookingService, FleetService, SessionManager},
    storage::FileTokenStore,
};

const USAGE: &str = "\
Usage: motorent <command> [args]

Browsing
  cars                                 list the fleet
  car <id>                             one car with its reviews

Account
  register <username> <email> <password>
  login <email> <password>
  logout
  whoami
  update-profile <email> <password>
  delete-account

Bookings and reviews (login required)
  bookings                             my bookings and total spend
  book <car-id> <start> <end>          dates as YYYY-MM-DD
  cancel <booking-id>
  review <car-id> <rating> [comment]   rating 1-5

Administration (admin role required)
  admin                                dashboard summary
";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motorent=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print!("{}", USAGE);
        return Ok(());
    };

    let config = Config::load_with_env(Path::new("config.yml"))?;
    let api = Arc::new(ApiClient::new(&config.api)?);
    let store = FileTokenStore::boxed(config.storage.token_path.clone());
    let session = SessionManager::new(api.clone(), store);

    // Pick up a persisted session; a dead token just means a guest start,
    // but an unreachable backend is worth a warning before the command
    // itself fails more loudly
    if let Err(e) = session.restore().await {
        tracing::warn!("could not restore the previous session: {}", e);
    }

    let fleet = FleetService::new(api.clone());
    let bookings = BookingService::new(api.clone());
    let admin = AdminService::new(api.clone());

    match command.as_str() {
        "cars" => {
            for car in fleet.browse().await? {
                println!(
                    "#{:<4} {:<24} {:>8.2}/day  [{}]",
                    car.id,
                    car.label(),
                    car.price_per_day,
                    car.status
                );
            }
        }
        "car" => {
            let id = parse_arg::<i64>(&args, 1, "car id")?;
            let details = fleet.car_details(id).await?;
            let car = &details.car;
            println!("{} - {:.2}/day [{}]", car.label(), car.price_per_day, car.status);
            if details.reviews.is_empty() {
                println!("No reviews yet.");
            }
            for review in &details.reviews {
                let comment = review.comment.as_deref().unwrap_or("");
                println!("  {}/5 by {} - {}", review.rating, review.username, comment);
            }
        }
        "register" => {
            let (username, email, password) = (
                required(&args, 1, "username")?,
                required(&args, 2, "email")?,
                required(&args, 3, "password")?,
            );
            let message = session.register(username, email, password).await?;
            println!("{}", message);
            println!("Now log in with: motorent login {} <password>", email);
        }
        "login" => {
            let (email, password) = (required(&args, 1, "email")?, required(&args, 2, "password")?);
            let user = session.login(email, password).await?;
            println!("Logged in as {} ({})", user.username, session.role());
        }
        "logout" => {
            session.logout().await?;
            println!("Logged out.");
        }
        "whoami" => match session.current_user() {
            Some(user) => println!(
                "{} <{}> - role: {}",
                user.username,
                user.email,
                session.role()
            ),
            None => println!("Not logged in ({}).", session.role()),
        },
        "update-profile" => {
            let (email, password) = (required(&args, 1, "email")?, required(&args, 2, "password")?);
            let message = session.update_profile(email, password).await?;
            println!("{}", message);
        }
        "delete-account" => {
            session.delete_account().await?;
            println!("Account deleted.");
        }
        "bookings" => {
            let user = require_login(&session)?;
            let token = session.token().context("no session token")?;
            let mine = bookings.my_bookings(&token, user.id).await?;
            if mine.is_empty() {
                println!("No bookings yet.");
            }
            for entry in &mine {
                let car = entry
                    .car
                    .as_ref()
                    .map(|car| car.label())
                    .unwrap_or_else(|| format!("car #{}", entry.booking.car_id));
                let total = entry
                    .total_price()
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "#{:<4} {:<24} {} -> {}  [{}]  total {}",
                    entry.booking.id,
                    car,
                    entry.booking.start_date,
                    entry.booking.end_date,
                    entry.booking.status,
                    total
                );
            }
            println!("Total spent: {:.2}", BookingService::total_spent(&mine));
        }
        "book" => {
            let user = require_login(&session)?;
            let token = session.token().context("no session token")?;
            let car_id = parse_arg::<i64>(&args, 1, "car id")?;
            let start = parse_arg::<chrono::NaiveDate>(&args, 2, "start date")?;
            let end = parse_arg::<chrono::NaiveDate>(&args, 3, "end date")?;
            let message = bookings.book(&token, user.id, car_id, start, end).await?;
            println!("{}", message);
        }
        "cancel" => {
            let user = require_login(&session)?;
            let token = session.token().context("no session token")?;
            let booking_id = parse_arg::<i64>(&args, 1, "booking id")?;
            let mine = bookings.my_bookings(&token, user.id).await?;
            let entry = mine
                .iter()
                .find(|entry| entry.booking.id == booking_id)
                .with_context(|| format!("no booking #{} on this account", booking_id))?;
            bookings.cancel(&token, &entry.booking).await?;
            println!("Booking #{} cancelled.", booking_id);
        }
        "review" => {
            require_login(&session)?;
            let token = session.token().context("no session token")?;
            let car_id = parse_arg::<i64>(&args, 1, "car id")?;
            let rating = parse_arg::<u8>(&args, 2, "rating")?;
            let comment = (args.len() > 3).then(|| args[3..].join(" "));
            let message = fleet.submit_review(&token, car_id, rating, comment).await?;
            println!("{}", message);
        }
        "admin" => {
            if !session.role().can_manage_fleet() {
                bail!("the admin dashboard requires the admin role (you are: {})", session.role());
            }
            let token = session.token().context("no session token")?;
            let dashboard = admin.load_dashboard(&token).await?;
            println!(
                "Dashboard: {} bookings, {} cars, {} reviews, {} users",
                dashboard.bookings.len(),
                dashboard.cars.len(),
                dashboard.reviews.len(),
                dashboard.users.len()
            );
            for booking in &dashboard.bookings {
                println!(
                    "  booking #{:<4} user {:<4} car {:<4} {} -> {}  [{}]",
                    booking.id,
                    booking.user_id,
                    booking.car_id,
                    booking.start_date,
                    booking.end_date,
                    booking.status
                );
            }
        }
        other => {
            eprintln!("Unknown command: {}\n", other);
            print!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing argument: {}", name))
}

fn parse_arg<T>(args: &[String], index: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(args, index, name)?
        .parse::<T>()
        .with_context(|| format!("invalid {}", name))
}

fn require_login(session: &SessionManager) -> Result<motorent::models::User> {
    session
        .current_user()
        .context("You must be logged in to do that (motorent login <email> <password>)")
}
