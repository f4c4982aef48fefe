use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub document: DocumentConfig,
    pub mailgun: MailgunConfig,
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Largest evidence file accepted, in bytes
    pub max_upload_size: usize,
    /// Directory under which per-submission directories are created
    pub upload_root: PathBuf,
    /// Directory holding the HTML page templates
    pub pages_dir: PathBuf,
}

/// Reimbursement document template settings
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub template_path: PathBuf,
}

/// Credentials and endpoint for the Mailgun messages API
#[derive(Debug, Clone)]
pub struct MailgunConfig {
    pub domain: String,
    pub api_key: String,
    pub api_base_url: String,
    pub timeout: Duration,
}

/// Envelope used for every claim notification
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let mailgun = MailgunConfig::from_env()?;
        let notification = NotificationConfig::from_env(&mailgun.domain)?;

        Ok(Config {
            app: AppConfig::from_env()?,
            document: DocumentConfig::from_env(),
            mailgun,
            notification,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let max_upload_size = env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_UPLOAD_SIZE must be a valid number".to_string())?;

        let upload_root = env::var("UPLOAD_ROOT").unwrap_or_else(|_| ".".to_string());
        let pages_dir = env::var("PAGES_DIR").unwrap_or_else(|_| "templates/pages".to_string());

        Ok(Self {
            host,
            port,
            max_upload_size,
            upload_root: PathBuf::from(upload_root),
            pages_dir: PathBuf::from(pages_dir),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DocumentConfig {
    pub const DEFAULT_TEMPLATE_PATH: &'static str = "Wellness Reimbursement Form.docx";

    pub fn from_env() -> Self {
        let template_path = env::var("TEMPLATE_PATH")
            .unwrap_or_else(|_| Self::DEFAULT_TEMPLATE_PATH.to_string());

        Self {
            template_path: PathBuf::from(template_path),
        }
    }
}

impl MailgunConfig {
    const DEFAULT_API_BASE_URL: &'static str = "https://api.mailgun.net/v3";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn from_env() -> Result<Self, String> {
        let domain =
            env::var("DOMAIN").map_err(|_| "DOMAIN environment variable is required".to_string())?;

        let api_key =
            env::var("APIKEY").map_err(|_| "APIKEY environment variable is required".to_string())?;

        let api_base_url = env::var("MAILGUN_API_BASE")
            .unwrap_or_else(|_| Self::DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = env::var("DELIVERY_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DELIVERY_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            domain,
            api_key,
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl NotificationConfig {
    const DEFAULT_SUBJECT: &'static str = "Wellness reimbursement claim";
    const DEFAULT_BODY: &'static str =
        "A new wellness reimbursement claim was submitted. The completed form and the supporting evidence are attached.";

    pub fn from_env(domain: &str) -> Result<Self, String> {
        let recipient = env::var("RECIPIENT")
            .map_err(|_| "RECIPIENT environment variable is required".to_string())?;

        let sender = env::var("SENDER")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("noreply@{}", domain));

        let subject = env::var("EMAIL_SUBJECT").unwrap_or_else(|_| Self::DEFAULT_SUBJECT.to_string());
        let body = env::var("EMAIL_BODY").unwrap_or_else(|_| Self::DEFAULT_BODY.to_string());

        Ok(Self {
            sender,
            recipient,
            subject,
            body,
        })
    }
}
