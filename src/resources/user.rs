use serde::{Deserialize, Serialize};

use crate::gateway::{GatewayError, ResourceKind};

/// Admin panel account. Users carry no lifecycle flag and no image; the
/// email doubles as the duplicate key and is format-checked before any
/// store access.
pub struct User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub mobile: i64,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ResourceKind for User {
    const COLLECTION: &'static str = "users";
    const DISPLAY: &'static str = "User";
    const KEY_FIELD: &'static str = "email";
    const SOFT_DELETE: bool = false;
    const HAS_IMAGE: bool = false;

    type Create = UserCreate;
    type Patch = UserPatch;

    fn key(input: &Self::Create) -> &str {
        &input.email
    }

    fn validate(input: &Self::Create) -> Result<(), GatewayError> {
        if !is_valid_email(&input.email) {
            return Err(GatewayError::Validation("Invalid email format".to_string()));
        }
        Ok(())
    }
}

/// Same acceptance as the legacy `^[^\s@]+@[^\s@]+\.[^\s@]+$` check:
/// no whitespace, exactly one `@`, and a dot inside the domain with at
/// least one character on each side.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[test]
    fn email_validation_follows_the_legacy_rule() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.co"));

        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("no-domain@"));
        assert!(!is_valid_email("@no-local.com"));
        assert!(!is_valid_email("missing@dot"));
        assert!(!is_valid_email("dot@ends."));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("space in@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn unknown_fields_in_create_input_are_ignored() {
        let input: UserCreate = serde_json::from_value(json!({
            "name": "Admin",
            "email": "admin@example.com",
            "mobile": 9876543210i64,
            "password": "secret",
            "isDeleted": true,
            "id": "client-picked"
        }))
        .unwrap();
        assert_eq!(input.email, "admin@example.com");

        let encoded = serde_json::to_value(&input).unwrap();
        assert!(encoded.get("isDeleted").is_none());
        assert!(encoded.get("id").is_none());
    }

    #[tokio::test]
    async fn users_carry_neither_lifecycle_flag_nor_image() {
        let store = MemoryStore::new().with_unique_keys(&[("users", "email")]);
        let gateway: Gateway<User> = Gateway::new(Arc::new(store));

        let doc = gateway
            .create(
                UserCreate {
                    name: "Admin".into(),
                    email: "admin@example.com".into(),
                    mobile: 9876543210,
                    password: "secret".into(),
                },
                None,
            )
            .await
            .unwrap();

        assert!(doc.get("isDeleted").is_none());
        assert!(doc.get("image").is_none());
        assert_eq!(doc.get("mobile"), Some(&json!(9876543210i64)));

        // No lifecycle flag means list applies no filter
        assert_eq!(gateway.list().await.unwrap().len(), 1);

        // The patch type reaches passwords and mobiles, never emails
        let patch = UserPatch { mobile: Some(1234567890), ..Default::default() };
        let updated = gateway
            .update(&doc.id().unwrap().to_string(), patch, None)
            .await
            .unwrap();
        assert_eq!(updated.get("mobile"), Some(&json!(1234567890i64)));
        assert_eq!(updated.get("email"), Some(&Value::String("admin@example.com".into())));
    }
}
