//! AWS IAM Identity Store directory client.
//!
//! Uses the official aws-sdk-identitystore crate, authenticated through a
//! named profile from the shared AWS config.

use async_trait::async_trait;
use aws_sdk_identitystore::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_identitystore::types::{Email, Filter, MemberId, Name};

use idstore_connector::{
    DirectoryClient, DirectoryError, DirectoryOperation, DirectoryResult, GroupRef, MembershipRef,
    NewUser, UserRef,
};

use crate::config::Settings;

/// Failure to build a usable SDK session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Neither the settings nor the profile chain yielded a region.
    #[error("No AWS region resolved for profile '{profile}'; set REGION in the settings file")]
    NoRegion { profile: String },

    /// The profile chain yielded no credentials provider.
    #[error("No credentials available for profile '{profile}'")]
    NoCredentials { profile: String },
}

/// Attribute path for group display-name lookups.
const GROUP_DISPLAY_NAME_PATH: &str = "DisplayName";

/// Attribute path for username lookups.
const USER_NAME_PATH: &str = "UserName";

/// Email type recorded for provisioned users.
const WORK_EMAIL_TYPE: &str = "work";

/// Directory client backed by an AWS IAM Identity Store.
#[derive(Debug, Clone)]
pub struct IdentityStoreDirectory {
    client: aws_sdk_identitystore::Client,
    identity_store_id: String,
}

impl IdentityStoreDirectory {
    /// Build an SDK session from the configured profile and connect.
    ///
    /// Credentials are resolved lazily by the SDK, so an expired SSO session
    /// surfaces on the first call rather than here.
    pub async fn connect(settings: &Settings) -> Result<Self, ConnectError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .profile_name(&settings.sso_profile);

        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .map(|r| r.as_ref().to_string())
            .ok_or_else(|| ConnectError::NoRegion {
                profile: settings.sso_profile.clone(),
            })?;
        if sdk_config.credentials_provider().is_none() {
            return Err(ConnectError::NoCredentials {
                profile: settings.sso_profile.clone(),
            });
        }

        let client = aws_sdk_identitystore::Client::new(&sdk_config);

        tracing::info!(
            identity_store_id = %settings.identity_store_id,
            profile = %settings.sso_profile,
            region = %region,
            "Identity store client initialized"
        );

        Ok(Self::from_client(client, settings.identity_store_id.clone()))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(
        client: aws_sdk_identitystore::Client,
        identity_store_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            identity_store_id: identity_store_id.into(),
        }
    }

    /// The identity store this client operates on.
    pub fn identity_store_id(&self) -> &str {
        &self.identity_store_id
    }
}

#[async_trait]
impl DirectoryClient for IdentityStoreDirectory {
    async fn find_group_by_display_name(
        &self,
        display_name: &str,
    ) -> DirectoryResult<Option<GroupRef>> {
        let operation = DirectoryOperation::FindGroup;
        let filter = equality_filter(operation, GROUP_DISPLAY_NAME_PATH, display_name)?;

        let output = self
            .client
            .list_groups()
            .identity_store_id(&self.identity_store_id)
            .filters(filter)
            .send()
            .await
            .map_err(|e| map_sdk_error(operation, display_name, &e))?;

        Ok(output
            .groups()
            .first()
            .map(|group| GroupRef::new(group.group_id())))
    }

    async fn create_group(&self, display_name: &str) -> DirectoryResult<GroupRef> {
        let output = self
            .client
            .create_group()
            .identity_store_id(&self.identity_store_id)
            .display_name(display_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(DirectoryOperation::CreateGroup, display_name, &e))?;

        Ok(GroupRef::new(output.group_id()))
    }

    async fn find_user_by_username(&self, username: &str) -> DirectoryResult<Option<UserRef>> {
        let operation = DirectoryOperation::FindUser;
        let filter = equality_filter(operation, USER_NAME_PATH, username)?;

        let output = self
            .client
            .list_users()
            .identity_store_id(&self.identity_store_id)
            .filters(filter)
            .send()
            .await
            .map_err(|e| map_sdk_error(operation, username, &e))?;

        Ok(output.users().first().map(|user| UserRef::new(user.user_id())))
    }

    async fn create_user(&self, user: &NewUser<'_>) -> DirectoryResult<UserRef> {
        let name = Name::builder()
            .given_name(user.given_name)
            .family_name(user.family_name)
            .build();

        let email = Email::builder()
            .value(user.email)
            .r#type(WORK_EMAIL_TYPE)
            .primary(true)
            .build();

        let output = self
            .client
            .create_user()
            .identity_store_id(&self.identity_store_id)
            .user_name(user.username)
            .name(name)
            .display_name(user.display_name)
            .emails(email)
            .send()
            .await
            .map_err(|e| map_sdk_error(DirectoryOperation::CreateUser, user.username, &e))?;

        Ok(UserRef::new(output.user_id()))
    }

    async fn create_membership(
        &self,
        user: &UserRef,
        group: &GroupRef,
    ) -> DirectoryResult<MembershipRef> {
        let output = self
            .client
            .create_group_membership()
            .identity_store_id(&self.identity_store_id)
            .group_id(group.as_str())
            .member_id(MemberId::UserId(user.as_str().to_string()))
            .send()
            .await
            .map_err(|e| {
                let identifier = format!("{user} in {group}");
                map_sdk_error(DirectoryOperation::CreateMembership, &identifier, &e)
            })?;

        Ok(MembershipRef::new(output.membership_id()))
    }
}

/// Build an `attribute == value` list filter.
fn equality_filter(
    operation: DirectoryOperation,
    attribute_path: &str,
    value: &str,
) -> DirectoryResult<Filter> {
    Filter::builder()
        .attribute_path(attribute_path)
        .attribute_value(value)
        .build()
        .map_err(|e| DirectoryError::invalid_request(operation, e.to_string()))
}

/// Classify an SDK failure by its service error code.
fn map_sdk_error<E, R>(
    operation: DirectoryOperation,
    identifier: &str,
    err: &SdkError<E, R>,
) -> DirectoryError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(err).to_string();
    let code = err.as_service_error().and_then(|e| e.code());

    match code {
        Some("ConflictException") => DirectoryError::conflict(operation, identifier),
        Some("ThrottlingException") => DirectoryError::throttled(operation, message),
        Some("ValidationException") => DirectoryError::invalid_request(operation, message),
        _ => DirectoryError::service_failure(operation, message),
    }
}
