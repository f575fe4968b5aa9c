//! Behavioural tests for the members service over the in-memory mock.

use std::sync::Arc;

use ayf_auth::testing::{sample_user, StaticIdentity};
use ayf_members::services::mock_repositories::{sample_profile, MockMembersRepository};
use ayf_members::{
    CreateProfileRequest, MembersError, MembersService, ProfileRole, UpdateProfileRequest,
};
use uuid::Uuid;

fn admin() -> Arc<StaticIdentity> {
    Arc::new(StaticIdentity::admin(sample_user("admin@gwarinpaayf.org")))
}

fn member() -> Arc<StaticIdentity> {
    Arc::new(StaticIdentity::member(sample_user("member@example.com")))
}

fn anonymous() -> Arc<StaticIdentity> {
    Arc::new(StaticIdentity::anonymous())
}

#[tokio::test]
async fn profile_round_trips_through_create_and_fetch() {
    let repo = MockMembersRepository::new();
    let service = MembersService::with_repository(repo, member());

    let user_id = Uuid::new_v4();
    let created = service
        .create_profile(
            user_id,
            CreateProfileRequest {
                first_name: Some("Chidi".to_string()),
                last_name: Some("Okafor".to_string()),
                department: Some("media".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, user_id);
    assert_eq!(created.role, ProfileRole::Member, "defaults to member");

    let fetched = service.profile(user_id).await.unwrap();
    assert_eq!(fetched.first_name.as_deref(), Some("Chidi"));
    assert_eq!(fetched.department.as_deref(), Some("media"));
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let repo = MockMembersRepository::new();
    let service = MembersService::with_repository(repo, member());

    let result = service.profile(Uuid::new_v4()).await;
    assert!(matches!(result, Err(MembersError::ProfileNotFound)));
}

#[tokio::test]
async fn unauthenticated_profile_write_issues_no_remote_calls() {
    let repo = MockMembersRepository::new();
    let service = MembersService::with_repository(repo.clone(), anonymous());

    let result = service
        .create_profile(Uuid::new_v4(), CreateProfileRequest::default())
        .await;

    assert!(matches!(result, Err(MembersError::AuthenticationRequired)));
    assert_eq!(repo.call_count(), 0);
}

#[tokio::test]
async fn members_by_role_only_returns_active_holders() {
    let repo = MockMembersRepository::new();
    repo.seed_profile(sample_profile(Uuid::new_v4(), "Active Editor", ProfileRole::Editor));
    let mut inactive = sample_profile(Uuid::new_v4(), "Inactive Editor", ProfileRole::Editor);
    inactive.is_active = false;
    repo.seed_profile(inactive);
    repo.seed_profile(sample_profile(Uuid::new_v4(), "Plain Member", ProfileRole::Member));

    let service = MembersService::with_repository(repo, member());
    let editors = service.members_by_role(ProfileRole::Editor).await.unwrap();

    assert_eq!(editors.len(), 1);
    assert_eq!(editors[0].first_name.as_deref(), Some("Active Editor"));
}

#[tokio::test]
async fn search_matches_either_name_case_insensitively() {
    let repo = MockMembersRepository::new();
    repo.seed_profile(sample_profile(Uuid::new_v4(), "Adaeze", ProfileRole::Member));
    repo.seed_profile(sample_profile(Uuid::new_v4(), "Emeka", ProfileRole::Member));

    let service = MembersService::with_repository(repo.clone(), member());

    let hits = service.search_members("adaeze").await.unwrap();
    assert_eq!(hits.len(), 1);

    // Blank terms short-circuit without touching the store.
    let before = repo.call_count();
    let none = service.search_members("  ").await.unwrap();
    assert!(none.is_empty());
    assert_eq!(repo.call_count(), before);
}

#[tokio::test]
async fn directory_joins_auth_users_with_their_profiles() {
    let repo = MockMembersRepository::new();

    let with_profile = sample_user("one@example.com");
    repo.seed_auth_user(with_profile.clone());
    repo.seed_profile(sample_profile(with_profile.id, "One", ProfileRole::Member));

    let without_profile = sample_user("two@example.com");
    repo.seed_auth_user(without_profile);

    let service = MembersService::with_repository(repo, admin());
    let directory = service.directory().await.unwrap();

    assert_eq!(directory.len(), 2);
    let joined = directory
        .iter()
        .find(|entry| entry.user.id == with_profile.id)
        .unwrap();
    assert!(joined.profile.is_some());
    let bare = directory
        .iter()
        .find(|entry| entry.user.id != with_profile.id)
        .unwrap();
    assert!(bare.profile.is_none());
}

#[tokio::test]
async fn directory_requires_an_administrator() {
    let repo = MockMembersRepository::new();
    let service = MembersService::with_repository(repo.clone(), member());

    let result = service.directory().await;
    assert!(matches!(result, Err(MembersError::AdminRequired)));
    assert_eq!(repo.call_count(), 0);
}

#[tokio::test]
async fn create_admin_user_provisions_account_and_profile() {
    let repo = MockMembersRepository::new();
    let service = MembersService::with_repository(repo.clone(), admin());

    let user = service
        .create_admin_user(
            "newadmin@gwarinpaayf.org",
            "a-strong-password",
            CreateProfileRequest {
                first_name: Some("Ngozi".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(user.role(), Some("admin"));
    let profile = repo.stored_profile(user.id).expect("profile row created");
    assert_eq!(profile.role, ProfileRole::Admin);
}

#[tokio::test]
async fn update_member_role_touches_auth_and_profile() {
    let repo = MockMembersRepository::new();
    let target = sample_user("target@example.com");
    repo.seed_auth_user(target.clone());
    repo.seed_profile(sample_profile(target.id, "Target", ProfileRole::Member));

    let service = MembersService::with_repository(repo.clone(), admin());
    let profile = service
        .update_member_role(target.id, ProfileRole::Editor)
        .await
        .unwrap();

    assert_eq!(profile.role, ProfileRole::Editor);
}

#[tokio::test]
async fn delete_member_removes_account_and_profile() {
    let repo = MockMembersRepository::new();
    let target = sample_user("target@example.com");
    repo.seed_auth_user(target.clone());
    repo.seed_profile(sample_profile(target.id, "Target", ProfileRole::Member));

    let service = MembersService::with_repository(repo.clone(), admin());
    service.delete_member(target.id).await.unwrap();

    assert_eq!(repo.auth_user_count(), 0);
    assert!(repo.stored_profile(target.id).is_none());
}

#[tokio::test]
async fn profile_update_applies_only_the_given_fields() {
    let repo = MockMembersRepository::new();
    let user_id = Uuid::new_v4();
    repo.seed_profile(sample_profile(user_id, "Chidi", ProfileRole::Member));

    let service = MembersService::with_repository(repo, member());
    let updated = service
        .update_profile(
            user_id,
            UpdateProfileRequest {
                bio: Some("Drummer".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.bio.as_deref(), Some("Drummer"));
    assert_eq!(updated.first_name.as_deref(), Some("Chidi"), "unchanged");
}
