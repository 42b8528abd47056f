//! Wire types for the ZBooks API.
//!
//! Field names match the backend exactly; unknown fields are tolerated so
//! the client keeps working when the server grows its payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token pair returned by `/auth/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: String,
    /// Long-lived refresh token.
    pub refresh: String,
}

/// Grant returned by `/auth/otp/verify/`, the one endpoint that bundles the
/// token pair with the user profile.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpGrant {
    /// Short-lived access token.
    pub access: String,
    /// Long-lived refresh token.
    pub refresh: String,
    /// The authenticated user.
    pub user: AuthenticatedUser,
}

/// User profile from `/auth/me/`. Never persisted; re-fetched from the
/// backend after every session mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: i64,
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Role within the current organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Organization the server treats as active for this session.
    #[serde(default)]
    pub current_organization: Option<Organization>,
    /// All organizations this user belongs to.
    #[serde(default)]
    pub organizations: Vec<Membership>,
}

impl AuthenticatedUser {
    /// The membership the client should treat as current when the server
    /// has not designated one: the `is_default` entry, else the first.
    pub fn default_membership(&self) -> Option<&Membership> {
        self.organizations
            .iter()
            .find(|m| m.is_default)
            .or_else(|| self.organizations.first())
    }
}

/// Organization profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Organization ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Web site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// GST registration number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    /// PAN number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    /// Accounting currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// First day of the fiscal year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_year_start: Option<String>,
    /// IANA timezone name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A user's membership in an organization, from `/organizations/my/` and
/// the `organizations[]` list on the user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// Membership ID.
    pub id: i64,
    /// The organization.
    pub organization: Organization,
    /// Role of the user within this organization.
    #[serde(default)]
    pub role: Option<String>,
    /// Whether this is the user's default organization.
    #[serde(default)]
    pub is_default: bool,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for creating an organization via `/organizations/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewOrganization {
    /// Display name.
    pub name: String,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Web site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// GST registration number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    /// PAN number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    /// Accounting currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Default phone country code applied when none can be derived.
pub const DEFAULT_PHONE_CC: &str = "+91";
/// Default country applied when none is provided.
pub const DEFAULT_COUNTRY: &str = "India";
/// Default state applied when none is provided.
pub const DEFAULT_STATE: &str = "Maharashtra";

/// Loosely-shaped registration input.
///
/// Historical front-end forms produced several shapes: discrete
/// `phone_cc`/`phone` fields, a single combined `organization_phone`
/// string, `company_name` vs. `organization_name`, and legacy forms that
/// only carried a full name. [`RegisterForm::to_payload`] tolerates all of
/// them; it never fails.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Company name (preferred field).
    #[serde(default)]
    pub company_name: Option<String>,
    /// Company name under its older field name.
    #[serde(default)]
    pub organization_name: Option<String>,
    /// Discrete phone country code, e.g. `+91`.
    #[serde(default)]
    pub phone_cc: Option<String>,
    /// Discrete national phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Combined "country-code SP number" string from older forms.
    #[serde(default)]
    pub organization_phone: Option<String>,
    /// Country name.
    #[serde(default)]
    pub country: Option<String>,
    /// State name.
    #[serde(default)]
    pub state: Option<String>,
}

/// Fixed payload shape expected by `/auth/register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterPayload {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Company name.
    pub company_name: String,
    /// Phone country code.
    pub phone_cc: String,
    /// National phone number.
    pub phone: String,
    /// Country name.
    pub country: String,
    /// State name.
    pub state: String,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty()).map(String::from)
}

impl RegisterForm {
    /// Normalize into the fixed payload shape.
    ///
    /// Rules:
    /// - discrete `phone_cc`/`phone` win over the combined string;
    /// - a combined `organization_phone` splits on the first space; with no
    ///   space it is a bare national number under the default country code;
    /// - `company_name` falls back to `organization_name`, then to
    ///   `full_name` (legacy forms used the person's name as the company);
    /// - absent country/state/phone fields resolve to the documented
    ///   defaults.
    pub fn to_payload(&self) -> RegisterPayload {
        let (derived_cc, derived_phone) = match non_empty(self.organization_phone.as_ref()) {
            Some(combined) => match combined.split_once(' ') {
                Some((cc, number)) => {
                    (Some(cc.to_string()), Some(number.trim().to_string()))
                }
                None => (None, Some(combined)),
            },
            None => (None, None),
        };

        let company_name = non_empty(self.company_name.as_ref())
            .or_else(|| non_empty(self.organization_name.as_ref()))
            .or_else(|| non_empty(self.full_name.as_ref()))
            .unwrap_or_default();

        RegisterPayload {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            full_name: non_empty(self.full_name.as_ref()),
            company_name,
            phone_cc: non_empty(self.phone_cc.as_ref())
                .or(derived_cc)
                .unwrap_or_else(|| DEFAULT_PHONE_CC.to_string()),
            phone: non_empty(self.phone.as_ref()).or(derived_phone).unwrap_or_default(),
            country: non_empty(self.country.as_ref())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            state: non_empty(self.state.as_ref()).unwrap_or_else(|| DEFAULT_STATE.to_string()),
        }
    }
}
