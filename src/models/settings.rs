use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub version: String,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub ai: AISettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            server: ServerSettings::default(),
            auth: AuthSettings::default(),
            ai: AISettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// IANA zone used to bucket entries by calendar day.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: vec![],
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub url: String,
    pub anon_key: String,
    pub cookie_name: String,
    pub cookie_max_age_secs: i64,
    pub secure_cookies: bool,
    pub protected_routes: Vec<String>,
    pub auth_routes: Vec<String>,
    pub login_path: String,
    pub home_path: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            cookie_name: "sb-auth".to_string(),
            cookie_max_age_secs: 60 * 60 * 24 * 7,
            secure_cookies: false,
            protected_routes: vec![
                "/dashboard".to_string(),
                "/profile".to_string(),
                "/settings".to_string(),
                "/history".to_string(),
                "/api/protected".to_string(),
            ],
            auth_routes: vec![
                "/login".to_string(),
                "/signup".to_string(),
                "/forgot-password".to_string(),
            ],
            login_path: "/login".to_string(),
            home_path: "/dashboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AISettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.4,
            max_tokens: 700,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub database_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "justwrite.db".to_string(),
        }
    }
}
