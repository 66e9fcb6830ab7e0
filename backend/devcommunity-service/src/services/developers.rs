/// Developer profile service
///
/// Profiles are keyed by the authenticated user id. Every read returns the
/// profile with its derived reputation and content counts.
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics::votes::record_reputation_duration;
use crate::middleware::permissions::check_profile_ownership;
use crate::models::{Developer, DeveloperProfile, ProfileRequest};
use crate::services::reputation::{compute_reputation, ReputationAggregator, VoteSnapshot};

fn developer_not_found() -> AppError {
    AppError::DeveloperNotFound("Developer not found".to_string())
}

#[derive(Clone)]
pub struct DeveloperService {
    store: Arc<dyn EntityStore>,
    reputation: ReputationAggregator,
}

impl DeveloperService {
    pub fn new(store: Arc<dyn EntityStore>, reputation: ReputationAggregator) -> Self {
        Self { store, reputation }
    }

    /// Create the requester's profile; fails with `Conflict` if one exists
    pub async fn create_profile(&self, id: i64, request: ProfileRequest) -> Result<DeveloperProfile> {
        let request = request.normalized();
        request.validate()?;

        if self.store.find_developer_by_id(id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Developer profile already exists for ID: {id}"
            )));
        }

        let developer = self
            .store
            .insert_developer(&Developer {
                id,
                name: request.name,
                skill: request.skill,
                member_since: Utc::now().date_naive(),
            })
            .await?;

        info!(developer_id = id, "Developer profile created");
        self.profile_for(developer).await
    }

    /// Update the provided fields, creating the profile when it is missing
    pub async fn update_profile(&self, id: i64, request: ProfileRequest) -> Result<DeveloperProfile> {
        let request = request.normalized();
        request.validate()?;

        let developer = match self.store.find_developer_by_id(id).await? {
            Some(mut existing) => {
                if request.name.is_some() {
                    existing.name = request.name;
                }
                if request.skill.is_some() {
                    existing.skill = request.skill;
                }
                let updated = self.store.update_developer(&existing).await?;
                info!(developer_id = id, "Developer profile updated");
                updated
            }
            None => {
                let created = self
                    .store
                    .insert_developer(&Developer {
                        id,
                        name: request.name,
                        skill: request.skill,
                        member_since: Utc::now().date_naive(),
                    })
                    .await?;
                info!(developer_id = id, "Developer profile created on update");
                created
            }
        };

        self.profile_for(developer).await
    }

    pub async fn get_profile(&self, id: i64) -> Result<DeveloperProfile> {
        let developer = self
            .store
            .find_developer_by_id(id)
            .await?
            .ok_or_else(developer_not_found)?;

        self.profile_for(developer).await
    }

    pub async fn list_profiles(&self) -> Result<Vec<DeveloperProfile>> {
        let developers = self.store.list_developers().await?;
        self.build_profiles(developers).await
    }

    /// Developer with the highest computed reputation; ties go to the lowest id
    pub async fn top_by_reputation(&self) -> Result<DeveloperProfile> {
        let profiles = self.list_profiles().await?;

        profiles
            .into_iter()
            .reduce(|best, candidate| {
                if candidate.reputation > best.reputation
                    || (candidate.reputation == best.reputation && candidate.id < best.id)
                {
                    candidate
                } else {
                    best
                }
            })
            .ok_or_else(|| {
                AppError::DeveloperNotFound("There are no developers in the database.".to_string())
            })
    }

    pub async fn search_by_skill(&self, skill: &str) -> Result<Vec<DeveloperProfile>> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(AppError::Validation("skill must not be blank".to_string()));
        }

        let developers = self.store.search_developers_by_skill(skill).await?;
        self.build_profiles(developers).await
    }

    /// Delete a profile and, by cascade, everything the developer authored or cast
    pub async fn delete_developer(&self, id: i64, requester_id: i64) -> Result<()> {
        check_profile_ownership(id, requester_id)?;

        if !self.store.delete_developer(id).await? {
            return Err(developer_not_found());
        }

        info!(developer_id = id, "Developer profile deleted");
        Ok(())
    }

    async fn profile_for(&self, developer: Developer) -> Result<DeveloperProfile> {
        let mut profiles = self.build_profiles(vec![developer]).await?;
        profiles.pop().ok_or_else(developer_not_found)
    }

    /// Profiles for a batch of developers sharing one vote snapshot
    async fn build_profiles(&self, developers: Vec<Developer>) -> Result<Vec<DeveloperProfile>> {
        let start = Instant::now();
        let snapshot: VoteSnapshot = self.reputation.snapshot().await?;
        let policy = self.reputation.policy();

        let mut profiles = Vec::with_capacity(developers.len());
        for developer in developers {
            let surfaces = self.store.authored_surfaces(developer.id).await?;
            profiles.push(DeveloperProfile {
                id: developer.id,
                name: developer.name,
                skill: developer.skill,
                member_since: developer.member_since,
                reputation: compute_reputation(&surfaces, &snapshot, policy),
                total_posts: surfaces.post_ids.len(),
                total_comments: surfaces.comment_ids.len(),
                total_responses: surfaces.response_ids.len(),
                total_votes: snapshot.votes_cast_by(developer.id),
            });
        }

        record_reputation_duration("batch", start.elapsed());
        Ok(profiles)
    }
}
