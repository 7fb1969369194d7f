use std::sync::Arc;
use tracing::{info, instrument};

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::user::UserProfile;
use crate::services::geocoding_service::{resolve_address, Geocoder};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    geocoder: Arc<dyn Geocoder>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    pub async fn get_profile(&self, username: &str) -> Result<UserProfile> {
        self.store
            .get_user(username)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", username)))
    }

    pub async fn list(&self) -> Result<Vec<UserProfile>> {
        self.store.list_users().await
    }

    /// Replace the home address; the coordinate is re-resolved and swapped
    /// in whole, or nothing changes.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn update_address(&self, user: &UserProfile, address: String) -> Result<UserProfile> {
        let location = resolve_address(self.geocoder.as_ref(), &address).await?;
        let updated = self
            .store
            .update_user_location(&user.username, &address, location)
            .await?;
        info!("User address updated");
        Ok(updated)
    }
}
