//! Organization operations.
//!
//! Organizations are server-owned projections. Switching mutates the
//! server-side "active organization" and then re-fetches the user profile,
//! so client state only ever changes after the server has accepted the
//! switch.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{AuthenticatedUser, Membership, NewOrganization, Organization};

impl ApiClient {
    /// List the authenticated user's organization memberships.
    pub async fn list_organizations(&self) -> Result<Vec<Membership>, ApiError> {
        self.get_json("/organizations/my/").await
    }

    /// Create an organization owned by the authenticated user.
    pub async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<Organization, ApiError> {
        self.post_json("/organizations/", serde_json::to_value(organization)?)
            .await
    }

    /// Switch the server-side active organization, then re-fetch the user
    /// profile so `current_organization` and the membership list reflect
    /// the switch. On rejection nothing client-side changes and the error
    /// propagates.
    pub async fn switch_organization(&self, id: i64) -> Result<AuthenticatedUser, ApiError> {
        debug!(organization_id = id, "switching organization");
        self.post_empty(&format!("/organizations/{id}/switch/"), None)
            .await?;
        self.me().await
    }
}
