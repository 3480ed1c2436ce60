//! Walkthrough of the placeholder and weather facades.
//!
//! Environment:
//! - `PLACEHOLDER_BASE_URL`, `PLACEHOLDER_API_KEY`, `PLACEHOLDER_TIMEOUT_SECS`
//!   configure the posts/users client.
//! - `WEATHER_BASE_URL` overrides the weather API root.
//! - `WEATHER_API_KEY` enables the weather section.
//! - `RUST_LOG` controls log verbosity (default `info`).

use std::thread;
use std::time::Duration;

use apiclient_core::{
    Call, ConfigError, DispatchError, DispatcherConfig, PlaceholderApi, RequestDispatcher, Units,
    WeatherApi, PLACEHOLDER_BASE_URL, WEATHER_BASE_URL,
};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let placeholder = match DispatcherConfig::from_env("PLACEHOLDER") {
        Ok(config) => config,
        Err(ConfigError::Missing(_)) => DispatcherConfig::new(PLACEHOLDER_BASE_URL),
        Err(e) => return Err(e),
    };
    let weather_url =
        std::env::var("WEATHER_BASE_URL").unwrap_or_else(|_| WEATHER_BASE_URL.to_string());
    let weather_key = std::env::var("WEATHER_API_KEY").ok().filter(|k| !k.is_empty());

    tracing::info!(?placeholder, weather = %weather_url, "starting api demo");

    println!("API Client Sample");
    println!("{}", "=".repeat(50));

    let api = PlaceholderApi::from_dispatcher(RequestDispatcher::from_config(placeholder));

    if let Err(e) = placeholder_demo(&api) {
        println!("API Error: {e}");
    }
    match weather_key {
        Some(key) => {
            if let Err(e) = weather_demo(&WeatherApi::with_base_url(&weather_url, &key)) {
                println!("Weather API Error: {e}");
            }
        }
        None => {
            println!("\n=== Weather API Demo ===");
            println!("Skipping weather API demo - set WEATHER_API_KEY to enable it");
        }
    }
    sequential_requests_demo(&api);
    error_handling_demo(&api);

    println!("\n{}", "=".repeat(50));
    println!("Sample completed.");
    Ok(())
}

fn placeholder_demo(api: &PlaceholderApi) -> Result<(), DispatchError> {
    println!("=== JSONPlaceholder API Demo ===");

    println!("1. Getting first 5 posts...");
    for post in api.get_posts(None)?.iter().take(5) {
        println!("  Post {}: {}...", post["id"], clip(text(&post["title"]), 50));
    }

    println!("\n2. Getting post #1...");
    let post = api.get_post(1)?;
    println!("  Title: {}", text(&post["title"]));
    println!("  Body: {}...", clip(text(&post["body"]), 100));

    println!("\n3. Creating new post...");
    let created = api.create_post(
        "Sample API Test Post",
        "This post was created using the API client sample code.",
        1,
    )?;
    println!("  Created post with ID: {}", created["id"]);

    println!("\n4. Getting users...");
    for user in api.get_users()?.iter().take(3) {
        println!(
            "  User {}: {} ({})",
            user["id"],
            text(&user["name"]),
            text(&user["email"])
        );
    }
    Ok(())
}

fn weather_demo(api: &WeatherApi) -> Result<(), DispatchError> {
    println!("\n=== Weather API Demo ===");

    println!("1. Getting current weather for London...");
    let weather = api.current_weather("London", Units::Metric)?;
    println!("  Temperature: {}°C", weather["main"]["temp"]);
    println!("  Description: {}", text(&weather["weather"][0]["description"]));
    println!("  Humidity: {}%", weather["main"]["humidity"]);

    println!("\n2. Getting 3-day forecast for New York...");
    let forecast = api.forecast("New York", Some(3), Units::Metric)?;
    let entries = forecast["list"].as_array().map_or(0, Vec::len);
    println!("  Forecast entries: {entries}");
    Ok(())
}

/// Five back-to-back lookups with a short pause between them.
fn sequential_requests_demo(api: &PlaceholderApi) {
    println!("\n=== Sequential Requests Demo ===");
    for id in 1..=5 {
        match api.get_post(id) {
            Ok(post) => println!("  Request {id}: Got post '{}...'", clip(text(&post["title"]), 30)),
            Err(e) => println!("  Request {id}: Failed - {e}"),
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn error_handling_demo(api: &PlaceholderApi) {
    println!("\n=== Error Handling Demo ===");

    if let Err(e) = api.client().get("/nonexistent-endpoint", Call::new()) {
        println!("Expected error for invalid endpoint: {e}");
    }

    match api.get_post(99999) {
        Ok(_) => println!("Post retrieved successfully (or API returns empty response)"),
        Err(e) => println!("Error retrieving non-existent post: {e} (kind: {:?})", e.kind()),
    }
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

fn clip(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
