//! Behavioural tests for the dashboard service over the in-memory mock.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use ayf_auth::testing::{sample_user, StaticIdentity};
use ayf_content::services::mock_repositories::{sample_announcement, sample_event};
use ayf_content::GalleryItem;
use ayf_dashboard::services::mock_repositories::MockDashboardRepository;
use ayf_dashboard::{
    ActivityKind, BackupTable, DashboardCounts, DashboardError, DashboardService, StorageUsage,
};

fn member() -> Arc<StaticIdentity> {
    Arc::new(StaticIdentity::member(sample_user("admin@gwarinpaayf.org")))
}

fn anonymous() -> Arc<StaticIdentity> {
    Arc::new(StaticIdentity::anonymous())
}

fn gallery_item(id: i64, description: &str) -> GalleryItem {
    GalleryItem {
        id,
        image_url: format!("http://store.local/images/gallery/{id}.jpg"),
        category: None,
        description: Some(description.to_string()),
        uploaded_by: None,
        created_at: Some(Utc::now()),
    }
}

#[tokio::test]
async fn overview_combines_counts_upcoming_and_recent() {
    let repo = MockDashboardRepository::new().with_counts(DashboardCounts {
        events: 12,
        gallery: 30,
        announcements: 4,
        rsvps: 75,
        users: 20,
    });

    let today = Utc::now().date_naive();
    for offset in [20, 5, -3, 1, 9, 40] {
        let id = (offset + 100) as i64;
        repo.seed_event(sample_event(id, &format!("Event {offset}"), today + Duration::days(offset)));
    }
    repo.seed_announcement(sample_announcement(1, "Harvest", true));
    repo.seed_announcement(sample_announcement(2, "Draft", false));

    let service = DashboardService::with_repository(repo, member());
    let stats = service.dashboard_stats().await.unwrap();

    assert_eq!(stats.counts.events, 12);
    assert_eq!(stats.counts.users, 20);

    let dates: Vec<_> = stats.upcoming_events.iter().map(|event| event.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted, "nearest first");
    assert_eq!(stats.upcoming_events.len(), 5, "limited to five");
    assert!(stats
        .upcoming_events
        .iter()
        .all(|event| event.date >= today));

    assert_eq!(stats.recent_announcements.len(), 1, "drafts excluded");
}

#[tokio::test]
async fn a_failed_count_reports_zero_instead_of_failing_the_overview() {
    let repo = MockDashboardRepository::new()
        .with_counts(DashboardCounts {
            events: 12,
            gallery: 3,
            announcements: 2,
            rsvps: 9,
            users: 5,
        })
        .with_failing_event_count();

    let service = DashboardService::with_repository(repo, member());
    let stats = service.dashboard_stats().await.unwrap();

    assert_eq!(stats.counts.events, 0);
    assert_eq!(stats.counts.gallery, 3, "other counts unaffected");
}

#[tokio::test]
async fn activity_feed_merges_newest_first_and_truncates() {
    let repo = MockDashboardRepository::new();
    let now = Utc::now();

    let mut event = sample_event(1, "Retreat", now.date_naive());
    event.created_at = Some(now - Duration::hours(3));
    repo.seed_event(event);

    let mut announcement = sample_announcement(2, "Harvest", true);
    announcement.created_at = Some(now - Duration::hours(1));
    repo.seed_announcement(announcement);

    let mut image = gallery_item(3, "Group photo");
    image.created_at = Some(now - Duration::hours(2));
    repo.seed_gallery_item(image);

    let service = DashboardService::with_repository(repo, member());
    let feed = service.recent_activity(2).await.unwrap();

    assert_eq!(feed.len(), 2, "truncated to the requested size");
    assert_eq!(feed[0].kind, ActivityKind::Announcement);
    assert_eq!(feed[1].kind, ActivityKind::GalleryImage);
    assert_eq!(feed[1].title, "Group photo");
}

#[tokio::test]
async fn a_failed_feed_source_contributes_nothing() {
    let repo = MockDashboardRepository::new().with_failing_gallery_feed();
    let now = Utc::now();

    let mut event = sample_event(1, "Retreat", now.date_naive());
    event.created_at = Some(now);
    repo.seed_event(event);

    let service = DashboardService::with_repository(repo, member());
    let feed = service.recent_activity(10).await.unwrap();

    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, ActivityKind::Event);
}

#[tokio::test]
async fn backup_covers_every_table_and_tolerates_empty_ones() {
    let repo = MockDashboardRepository::new();
    repo.seed_table(
        BackupTable::Events,
        vec![json!({ "id": 1, "title": "Retreat" })],
    );

    let service = DashboardService::with_repository(repo, member());
    let backup = service.backup_data().await.unwrap();

    assert_eq!(backup.len(), BackupTable::ALL.len());
    assert_eq!(backup["events"].as_array().unwrap().len(), 1);
    assert_eq!(backup["yearly_plans"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn backup_fails_when_any_table_fetch_errors() {
    let repo = MockDashboardRepository::new().with_failing_table(BackupTable::Gallery);

    let service = DashboardService::with_repository(repo, member());
    let result = service.backup_data().await;

    assert!(matches!(result, Err(DashboardError::Remote(_))));
}

#[tokio::test]
async fn table_export_renders_rows_and_empty_tables_as_empty_string() {
    let repo = MockDashboardRepository::new();
    repo.seed_table(
        BackupTable::Announcements,
        vec![json!({ "id": 7, "title": "Harvest" })],
    );

    let service = DashboardService::with_repository(repo, member());

    let csv = service
        .export_table_csv(BackupTable::Announcements)
        .await
        .unwrap();
    assert_eq!(csv.lines().next().unwrap(), "\"id\",\"title\"");
    assert!(csv.lines().nth(1).unwrap().contains("\"Harvest\""));

    let empty = service.export_table_csv(BackupTable::Events).await.unwrap();
    assert_eq!(empty, "");
}

#[tokio::test]
async fn storage_usage_totals_the_buckets() {
    let repo =
        MockDashboardRepository::new().with_storage(StorageUsage::new(10, 4, 2));

    let service = DashboardService::with_repository(repo, member());
    let usage = service.storage_usage().await.unwrap();

    assert_eq!(usage.images, 10);
    assert_eq!(usage.total, 16);
}

#[tokio::test]
async fn database_size_reports_unknown_when_the_hook_errors() {
    let service =
        DashboardService::with_repository(MockDashboardRepository::new(), member());
    assert_eq!(service.database_size().await, "Unknown");

    let sized = DashboardService::with_repository(
        MockDashboardRepository::new().with_database_size("42 MB"),
        member(),
    );
    assert_eq!(sized.database_size().await, "42 MB");
}

#[tokio::test]
async fn retention_sweep_requires_a_session_and_deletes_both_tables() {
    let repo = MockDashboardRepository::new();
    let gated = DashboardService::with_repository(repo.clone(), anonymous());

    let denied = gated.clean_old_data(365).await;
    assert!(matches!(denied, Err(DashboardError::AuthenticationRequired)));
    assert_eq!(repo.call_count(), 0);

    let service = DashboardService::with_repository(repo.clone(), member());
    service.clean_old_data(365).await.unwrap();

    let cutoff = repo.events_cutoff().expect("events cutoff recorded");
    assert!(cutoff <= Utc::now().date_naive() - Duration::days(364));
    assert!(repo.rsvps_cutoff().is_some());
}
