//! Shared types for the dashboard aggregator.

pub mod errors;

use chrono::{DateTime, Utc};
use serde::Serialize;

use ayf_content::{Announcement, Event};

pub use errors::{DashboardError, DashboardResult};

/// Row counts per entity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardCounts {
    pub events: u64,
    pub gallery: u64,
    pub announcements: u64,
    pub rsvps: u64,
    pub users: u64,
}

/// The admin overview: counts plus the nearest upcoming events and the
/// freshest published announcements.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub counts: DashboardCounts,
    pub upcoming_events: Vec<Event>,
    pub recent_announcements: Vec<Announcement>,
}

/// What kind of record an activity feed entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityKind {
    Event,
    Announcement,
    GalleryImage,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Event => "Event",
            ActivityKind::Announcement => "Announcement",
            ActivityKind::GalleryImage => "Gallery Image",
        }
    }
}

/// One entry of the cross-entity activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub id: i64,
    pub title: String,
    pub occurred_at: DateTime<Utc>,
}

/// Object counts per storage bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageUsage {
    pub images: usize,
    pub documents: usize,
    pub avatars: usize,
    pub total: usize,
}

impl StorageUsage {
    pub fn new(images: usize, documents: usize, avatars: usize) -> Self {
        Self {
            images,
            documents,
            avatars,
            total: images + documents + avatars,
        }
    }
}

/// The fixed set of tables covered by backup and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupTable {
    Events,
    Gallery,
    YearlyPlans,
    Announcements,
    EventRsvps,
    UserProfiles,
}

impl BackupTable {
    pub const ALL: [BackupTable; 6] = [
        BackupTable::Events,
        BackupTable::Gallery,
        BackupTable::YearlyPlans,
        BackupTable::Announcements,
        BackupTable::EventRsvps,
        BackupTable::UserProfiles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackupTable::Events => "events",
            BackupTable::Gallery => "gallery",
            BackupTable::YearlyPlans => "yearly_plans",
            BackupTable::Announcements => "announcements",
            BackupTable::EventRsvps => "event_rsvps",
            BackupTable::UserProfiles => "user_profiles",
        }
    }
}

impl std::str::FromStr for BackupTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "events" => Ok(BackupTable::Events),
            "gallery" => Ok(BackupTable::Gallery),
            "yearly_plans" => Ok(BackupTable::YearlyPlans),
            "announcements" => Ok(BackupTable::Announcements),
            "event_rsvps" => Ok(BackupTable::EventRsvps),
            "user_profiles" => Ok(BackupTable::UserProfiles),
            other => Err(format!("unknown table: {other}")),
        }
    }
}
