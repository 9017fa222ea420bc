use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::types::UserType;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use marketplace_atoms::users::{
    DirectoryError, DirectoryResult, ProfileAttribute, UserDirectory, UserProfile,
};

/// `UserDirectory` over Cognito's `ListUsers` search
#[derive(Debug, Clone)]
pub struct CognitoUserDirectory {
    client: CognitoClient,
}

impl CognitoUserDirectory {
    pub fn new(client: CognitoClient) -> Self {
        Self { client }
    }
}

/// `ListUsers` filter matching one subject, e.g. `sub = "1234-abcd"`
pub fn subject_filter(subject: &str) -> String {
    let escaped = subject.replace('\\', "\\\\").replace('"', "\\\"");
    format!("sub = \"{}\"", escaped)
}

fn profile_from_user(user: &UserType) -> UserProfile {
    UserProfile {
        username: user.username().unwrap_or_default().to_string(),
        attributes: user
            .attributes()
            .iter()
            .map(|a| ProfileAttribute {
                name: a.name().to_string(),
                value: a.value().unwrap_or_default().to_string(),
            })
            .collect(),
    }
}

#[async_trait]
impl UserDirectory for CognitoUserDirectory {
    async fn find_by_subject(&self, pool_id: &str, subject: &str) -> DirectoryResult<UserProfile> {
        let result = self
            .client
            .list_users()
            .user_pool_id(pool_id)
            .filter(subject_filter(subject))
            .send()
            .await
            .map_err(|e| DirectoryError::Backend(format!("Cognito list_users error: {}", DisplayErrorContext(&e))))?;

        let users = result.users();
        if users.len() > 1 {
            tracing::warn!("⚠️ {} users share sub {} in pool {}", users.len(), subject, pool_id);
        }

        users
            .first()
            .map(profile_from_user)
            .ok_or_else(|| DirectoryError::NotFound {
                pool_id: pool_id.to_string(),
                subject: subject.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cognitoidentityprovider::types::AttributeType;

    #[test]
    fn filter_quotes_the_subject() {
        assert_eq!(subject_filter("1234-abcd"), r#"sub = "1234-abcd""#);
        assert_eq!(subject_filter(r#"x" or "y"#), r#"sub = "x\" or \"y""#);
    }

    #[test]
    fn profile_keeps_username_and_attributes() {
        let user = UserType::builder()
            .username("alice")
            .attributes(
                AttributeType::builder()
                    .name("email")
                    .value("alice@example.com")
                    .build()
                    .unwrap(),
            )
            .attributes(AttributeType::builder().name("nickname").build().unwrap())
            .build();

        let profile = profile_from_user(&user);

        assert_eq!(profile.username, "alice");
        assert_eq!(profile.attribute("email"), Some("alice@example.com"));
        assert_eq!(profile.attribute("nickname"), Some(""));
    }
}
