//! Stock report formatting
//!
//! Turns a [`StockNotification`] into a chat-ready report: a title, a colour,
//! an ordered list of fields and a footer. Chat integrations either map the
//! report onto their own rich message type or send [`StockReport::render_text`].

use serde::Serialize;

use gagstock_core::AggregateSnapshot;

use crate::notifier::StockNotification;

const REPORT_TITLE: &str = "🌾 Grow A Garden — Stock Tracker";
const REPORT_COLOR: u32 = 0x6A9955;
const REPORT_AUTHOR: &str = "Sunnel";

/// One titled section of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl ReportField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }
}

/// Rendered stock update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockReport {
    pub title: String,
    pub color: u32,
    pub fields: Vec<ReportField>,
    pub footer: String,
}

fn bullet_list(items: impl IntoIterator<Item = String>, empty: &str) -> String {
    let lines: Vec<String> = items.into_iter().map(|item| format!("- {}", item)).collect();
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

fn seed_list(snapshot: &AggregateSnapshot) -> String {
    bullet_list(
        snapshot.seeds.iter().map(|seed| match snapshot.seed_emoji(seed) {
            Some(emoji) => format!("{} {}", emoji, seed),
            None => seed.clone(),
        }),
        "No seeds.",
    )
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

impl StockReport {
    pub fn from_notification(notification: &StockNotification) -> Self {
        let snapshot = &notification.snapshot;
        let countdowns = &notification.countdowns;
        let weather = &snapshot.weather;

        let gear = bullet_list(snapshot.gear.iter().cloned(), "No gear.");
        let eggs = bullet_list(snapshot.eggs.iter().cloned(), "No eggs.");
        let cosmetics = bullet_list(snapshot.cosmetics.iter().cloned(), "No cosmetics.");
        let honey = bullet_list(
            snapshot
                .honey
                .iter()
                .map(|item| format!("{}: {}", item.name, item.value)),
            "No honey stock.",
        );

        let fields = vec![
            ReportField::new("🛠️ Gear", gear, true),
            ReportField::new("🌱 Seeds", seed_list(snapshot), true),
            ReportField::new("🥚 Eggs", eggs, true),
            ReportField::new(
                "🎨 Cosmetics",
                format!("{}\n⏳ Restock in: {}", cosmetics, countdowns.cosmetics),
                false,
            ),
            ReportField::new(
                "🍯 Honey Stock",
                format!("{}\n⏳ Restock in: {}", honey, countdowns.honey),
                false,
            ),
            ReportField::new(
                "🌤️ Weather",
                format!(
                    "{} {}",
                    or_default(&weather.icon, "🌦️"),
                    or_default(&weather.current_weather, "Unknown")
                ),
                true,
            ),
            ReportField::new(
                "🪴 Crop Bonus",
                or_default(&weather.crop_bonuses, "None").to_string(),
                true,
            ),
            ReportField::new("⏳ Gear/Seed Restock", countdowns.gear_seed.clone(), true),
            ReportField::new("⏳ Egg Restock", countdowns.egg.clone(), true),
        ];

        Self {
            title: REPORT_TITLE.to_string(),
            color: REPORT_COLOR,
            fields,
            footer: format!(
                "Created by {} | Last Updated: {}",
                REPORT_AUTHOR, notification.last_updated
            ),
        }
    }

    /// Render as a markdown message body of at most `limit` characters
    pub fn render_text(&self, limit: usize) -> String {
        let mut body = format!("**{}**\n", self.title);
        for field in &self.fields {
            body.push_str(&format!("\n**{}**\n{}\n", field.name, field.value));
        }
        body.push_str(&format!("\n_{}_", self.footer));

        truncate_chars(body, limit)
    }
}

fn truncate_chars(text: String, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text;
    }
    if limit == 0 {
        return String::new();
    }

    let mut truncated: String = text.chars().take(limit - 1).collect();
    truncated.push('…');
    truncated
}
