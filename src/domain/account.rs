// Account domain model

/// Sent in the `From` header when no contact email is configured.
pub const PLACEHOLDER_EMAIL: &str = "exemple@email.com";

/// Credentials and meter identity for the consumption API.
///
/// Built once at startup and shared read-only with the fetcher and the
/// update service.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountContext {
    api_key: String,
    point_id: String,
    email: Option<String>,
}

impl AccountContext {
    pub fn new(api_key: String, point_id: String, email: Option<String>) -> Self {
        // An empty email is as good as none
        let email = email.filter(|e| !e.trim().is_empty());
        Self {
            api_key,
            point_id,
            email,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn point_id(&self) -> &str {
        &self.point_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Value for the `From` request header
    pub fn contact_email(&self) -> &str {
        self.email().unwrap_or(PLACEHOLDER_EMAIL)
    }
}

impl std::fmt::Debug for AccountContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountContext")
            .field("api_key", &"***")
            .field("point_id", &self.point_id)
            .field("email", &self.email)
            .finish()
    }
}
