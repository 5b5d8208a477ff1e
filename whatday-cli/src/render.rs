//! TUI rendering traits for whatday types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to whatday-core types using owo_colors.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use whatday_core::datetime::display_clock;
use whatday_core::{DayStats, Event, Locale, Settings};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self, locale: Locale) -> String;
}

/// Number of id characters shown; any unique prefix is accepted back.
const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn all_day_label(locale: Locale) -> &'static str {
    match locale {
        Locale::Thai => "ทั้งวัน",
        Locale::English => "all-day",
    }
}

impl Render for Event {
    fn render(&self, locale: Locale) -> String {
        let check = if self.completed {
            "✓".green().to_string()
        } else {
            "○".dimmed().to_string()
        };

        let time = match (self.time.is_empty(), self.end_time.as_deref()) {
            (true, _) => all_day_label(locale).to_string(),
            (false, Some(end)) => format!("{}–{}", display_clock(&self.time), display_clock(end)),
            (false, None) => display_clock(&self.time).to_string(),
        };

        let title = if self.completed {
            self.title.strikethrough().dimmed().to_string()
        } else {
            self.title.bold().to_string()
        };

        let mut line = format!(
            "  {} {:<11} {} {} {}",
            check,
            time,
            title,
            self.category().label(locale).dimmed(),
            format!("[{}]", short_id(&self.id)).dimmed()
        );

        if !self.notify {
            line.push_str(&format!(" {}", "🔕".dimmed()));
        }
        if self.is_imported() {
            line.push_str(&format!(" {}", "ics".dimmed()));
        }
        if !self.notes.is_empty() {
            for note in self.notes.lines() {
                line.push_str(&format!("\n                {}", note.dimmed()));
            }
        }

        line
    }
}

impl Render for DayStats {
    fn render(&self, locale: Locale) -> String {
        match locale {
            Locale::Thai => format!(
                "  ทั้งหมด {}  เสร็จแล้ว {}  เหลือ {}",
                self.total,
                self.done.green(),
                self.remaining.yellow()
            ),
            Locale::English => format!(
                "  {} total  {} done  {} remaining",
                self.total,
                self.done.green(),
                self.remaining.yellow()
            ),
        }
    }
}

fn on_off(value: bool) -> String {
    if value {
        "on".green().to_string()
    } else {
        "off".dimmed().to_string()
    }
}

impl Render for Settings {
    fn render(&self, locale: Locale) -> String {
        let labels = match locale {
            Locale::Thai => ["สรุปกิจกรรมตอนเช้า", "แจ้งเตือนก่อนกิจกรรม", "อ่านออกเสียงอัตโนมัติ", "เวลาสรุปตอนเช้า"],
            Locale::English => ["Daily summary", "Before each event", "Read aloud", "Morning time"],
        };

        [
            format!("  {:<22} {}", labels[0], on_off(self.daily_summary)),
            format!("  {:<22} {}", labels[1], on_off(self.before_event)),
            format!("  {:<22} {}", labels[2], on_off(self.auto_voice)),
            format!("  {:<22} {}", labels[3], self.morning_time),
        ]
        .join("\n")
    }
}

/// "วันจันทร์ 15 มกราคม 2567 (วันนี้)" style heading.
pub fn day_heading(date: NaiveDate, today: NaiveDate, locale: Locale) -> String {
    let mut heading = format!("{} {}", locale.day_label(date), locale.date_label(date));
    if date == today {
        heading.push(' ');
        heading.push_str(locale.today_suffix());
    }
    heading.bold().to_string()
}

pub fn empty_day(locale: Locale) -> String {
    match locale {
        Locale::Thai => "  ไม่มีกิจกรรม".dimmed().to_string(),
        Locale::English => "  No events".dimmed().to_string(),
    }
}
