//! Mock repository for testing the members service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use ayf_store::{AuthUser, StoreError, UserMetadata};

use crate::entities::{CreateProfileRequest, ProfileRole, UpdateProfileRequest, UserProfile};
use crate::services::members_service::MembersRepo;
use crate::types::{MembersError, MembersResult};

/// A plausible profile row for seeding mocks.
pub fn sample_profile(user_id: Uuid, first_name: &str, role: ProfileRole) -> UserProfile {
    UserProfile {
        id: user_id,
        first_name: Some(first_name.to_string()),
        last_name: Some("Okafor".to_string()),
        phone: None,
        date_of_birth: None,
        gender: None,
        address: None,
        city: None,
        state: None,
        occupation: None,
        department: None,
        role,
        avatar_url: None,
        bio: None,
        skills: None,
        interests: None,
        emergency_contact_name: None,
        emergency_contact_phone: None,
        is_active: true,
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

/// Mock profile + auth admin repository. Clones share state.
#[derive(Clone, Default)]
pub struct MockMembersRepository {
    profiles: Arc<Mutex<HashMap<Uuid, UserProfile>>>,
    auth_users: Arc<Mutex<HashMap<Uuid, AuthUser>>>,
    calls: Arc<AtomicUsize>,
}

impl MockMembersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_profile(&self, profile: UserProfile) {
        self.profiles.lock().unwrap().insert(profile.id, profile);
    }

    pub fn seed_auth_user(&self, user: AuthUser) {
        self.auth_users.lock().unwrap().insert(user.id, user);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored_profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.profiles.lock().unwrap().get(&user_id).cloned()
    }

    pub fn auth_user_count(&self) -> usize {
        self.auth_users.lock().unwrap().len()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl MembersRepo for MockMembersRepository {
    async fn find_profile(&self, user_id: Uuid) -> MembersResult<Option<UserProfile>> {
        self.record_call();
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn insert_profile(
        &self,
        user_id: Uuid,
        request: &CreateProfileRequest,
    ) -> MembersResult<UserProfile> {
        self.record_call();

        let profile = UserProfile {
            id: user_id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            phone: request.phone.clone(),
            date_of_birth: request.date_of_birth,
            gender: request.gender.clone(),
            address: request.address.clone(),
            city: request.city.clone(),
            state: request.state.clone(),
            occupation: request.occupation.clone(),
            department: request.department.clone(),
            role: request.role.unwrap_or_default(),
            avatar_url: request.avatar_url.clone(),
            bio: request.bio.clone(),
            skills: request.skills.clone(),
            interests: request.interests.clone(),
            emergency_contact_name: request.emergency_contact_name.clone(),
            emergency_contact_phone: request.emergency_contact_phone.clone(),
            is_active: true,
            created_at: Some(Utc::now()),
            updated_at: None,
        };

        self.profiles
            .lock()
            .unwrap()
            .insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        request: &UpdateProfileRequest,
    ) -> MembersResult<UserProfile> {
        self.record_call();

        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(&user_id)
            .ok_or(MembersError::ProfileNotFound)?;

        if let Some(first_name) = &request.first_name {
            profile.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &request.last_name {
            profile.last_name = Some(last_name.clone());
        }
        if let Some(phone) = &request.phone {
            profile.phone = Some(phone.clone());
        }
        if let Some(date_of_birth) = request.date_of_birth {
            profile.date_of_birth = Some(date_of_birth);
        }
        if let Some(role) = request.role {
            profile.role = role;
        }
        if let Some(bio) = &request.bio {
            profile.bio = Some(bio.clone());
        }
        if let Some(is_active) = request.is_active {
            profile.is_active = is_active;
        }
        profile.updated_at = Some(Utc::now());

        Ok(profile.clone())
    }

    async fn delete_profile(&self, user_id: Uuid) -> MembersResult<()> {
        self.record_call();
        self.profiles.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn list_profiles(&self) -> MembersResult<Vec<UserProfile>> {
        self.record_call();
        Ok(self.profiles.lock().unwrap().values().cloned().collect())
    }

    async fn profiles_by_role(&self, role: ProfileRole) -> MembersResult<Vec<UserProfile>> {
        self.record_call();
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .filter(|profile| profile.role == role && profile.is_active)
            .cloned()
            .collect())
    }

    async fn search_profiles(&self, term: &str) -> MembersResult<Vec<UserProfile>> {
        self.record_call();

        let needle = term.to_lowercase();
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .filter(|profile| {
                profile
                    .first_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
                    || profile
                        .last_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn list_auth_users(&self) -> MembersResult<Vec<AuthUser>> {
        self.record_call();
        Ok(self.auth_users.lock().unwrap().values().cloned().collect())
    }

    async fn create_auth_user(
        &self,
        email: &str,
        _password: &str,
        metadata: UserMetadata,
    ) -> MembersResult<AuthUser> {
        self.record_call();

        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: metadata,
            created_at: Some(Utc::now()),
            email_confirmed_at: Some(Utc::now()),
        };

        self.auth_users.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_auth_role(&self, user_id: Uuid, role: ProfileRole) -> MembersResult<AuthUser> {
        self.record_call();

        let mut users = self.auth_users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or(MembersError::Remote(
            StoreError::Api {
                status: 404,
                message: "user not found".to_string(),
            },
        ))?;

        user.user_metadata.role = Some(role.as_str().to_string());
        Ok(user.clone())
    }

    async fn delete_auth_user(&self, user_id: Uuid) -> MembersResult<()> {
        self.record_call();
        self.auth_users.lock().unwrap().remove(&user_id);
        Ok(())
    }
}
