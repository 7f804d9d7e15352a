use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_size: usize,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Which object storage implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Any S3-compatible endpoint (GCS interoperability, AWS S3, MinIO)
    S3,
    /// Process-local storage, contents are lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" | "gcs" => Ok(Self::S3),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "STORAGE_BACKEND must be one of: s3, memory (got '{}')",
                other
            )),
        }
    }
}

/// Where storage credentials come from
///
/// Resolved once at startup and handed to the storage client; nothing
/// downstream looks credentials up on its own.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// HMAC access/secret key pair supplied in configuration
    Static {
        access_key: String,
        secret_key: String,
    },
    /// Resolved from the deployment environment (env vars, profile, instance metadata)
    Ambient,
}

impl CredentialSource {
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialSource::Static { .. } => "static",
            CredentialSource::Ambient => "ambient",
        }
    }
}

// Never print secrets
impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Static { access_key, .. } => f
                .debug_struct("Static")
                .field("access_key", access_key)
                .field("secret_key", &"***")
                .finish(),
            CredentialSource::Ambient => f.write_str("Ambient"),
        }
    }
}

/// Object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Bucket holding every object, fixed for the process lifetime
    pub bucket: String,
    /// S3 XML API endpoint URL
    pub endpoint: String,
    /// Region used for request signing
    pub region: String,
    /// Use http://endpoint/bucket instead of http://bucket.endpoint
    pub path_style: bool,
    pub credentials: CredentialSource,
    /// Lifetime of signed download URLs
    pub signed_url_expiry_secs: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size = env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_UPLOAD_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_upload_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "PDF Store API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Upload, list, sign and delete PDF documents".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    const DEFAULT_ENDPOINT: &'static str = "https://storage.googleapis.com";
    const DEFAULT_REGION: &'static str = "auto";
    const DEFAULT_SIGNED_URL_EXPIRY_SECS: u32 = 3600; // 1 hour
    const MAX_SIGNED_URL_EXPIRY_SECS: u32 = 604_800; // 7 days, SigV4 limit

    pub fn from_env() -> Result<Self, String> {
        let backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse::<StorageBackend>()?;

        let bucket = Self::parse_bucket(env::var("STORAGE_BUCKET").ok())?;

        let endpoint =
            env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());

        let region =
            env::var("STORAGE_REGION").unwrap_or_else(|_| Self::DEFAULT_REGION.to_string());

        let path_style = env::var("STORAGE_PATH_STYLE")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|_| "STORAGE_PATH_STYLE must be true or false".to_string())?;

        let credentials = Self::parse_credentials(
            env::var("STORAGE_ACCESS_KEY").ok(),
            env::var("STORAGE_SECRET_KEY").ok(),
        )?;

        let signed_url_expiry_secs =
            Self::parse_expiry(env::var("SIGNED_URL_EXPIRY_SECS").ok())?;

        Ok(Self {
            backend,
            bucket,
            endpoint,
            region,
            path_style,
            credentials,
            signed_url_expiry_secs,
        })
    }

    fn parse_bucket(value: Option<String>) -> Result<String, String> {
        value
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "STORAGE_BUCKET environment variable is required".to_string())
    }

    fn parse_expiry(value: Option<String>) -> Result<u32, String> {
        let secs = match value {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| "SIGNED_URL_EXPIRY_SECS must be a valid number".to_string())?,
            None => Self::DEFAULT_SIGNED_URL_EXPIRY_SECS,
        };

        if !(1..=Self::MAX_SIGNED_URL_EXPIRY_SECS).contains(&secs) {
            return Err(format!(
                "SIGNED_URL_EXPIRY_SECS must be between 1 and {}",
                Self::MAX_SIGNED_URL_EXPIRY_SECS
            ));
        }

        Ok(secs)
    }

    /// Both keys, or neither (ambient resolution)
    fn parse_credentials(
        access_key: Option<String>,
        secret_key: Option<String>,
    ) -> Result<CredentialSource, String> {
        let access_key = access_key.filter(|s| !s.is_empty());
        let secret_key = secret_key.filter(|s| !s.is_empty());

        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) => Ok(CredentialSource::Static {
                access_key,
                secret_key,
            }),
            (None, None) => Ok(CredentialSource::Ambient),
            _ => Err(
                "STORAGE_ACCESS_KEY and STORAGE_SECRET_KEY must be set together".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("s3".parse::<StorageBackend>(), Ok(StorageBackend::S3));
        assert_eq!("GCS".parse::<StorageBackend>(), Ok(StorageBackend::S3));
        assert_eq!(" memory ".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("azure".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_bucket_is_required() {
        assert!(StorageConfig::parse_bucket(None).is_err());
        assert!(StorageConfig::parse_bucket(Some("   ".to_string())).is_err());
        assert_eq!(
            StorageConfig::parse_bucket(Some("pdf-bucket".to_string())),
            Ok("pdf-bucket".to_string())
        );
    }

    #[test]
    fn test_signed_url_expiry_defaults_to_one_hour() {
        assert_eq!(StorageConfig::parse_expiry(None), Ok(3600));
    }

    #[test]
    fn test_signed_url_expiry_bounds() {
        assert!(StorageConfig::parse_expiry(Some("0".to_string())).is_err());
        assert_eq!(StorageConfig::parse_expiry(Some("1".to_string())), Ok(1));
        assert_eq!(
            StorageConfig::parse_expiry(Some("604800".to_string())),
            Ok(604_800)
        );
        assert!(StorageConfig::parse_expiry(Some("604801".to_string())).is_err());
        assert!(StorageConfig::parse_expiry(Some("soon".to_string())).is_err());
    }

    #[test]
    fn test_credentials_static_or_ambient() {
        assert_eq!(
            StorageConfig::parse_credentials(Some("ak".to_string()), Some("sk".to_string())),
            Ok(CredentialSource::Static {
                access_key: "ak".to_string(),
                secret_key: "sk".to_string(),
            })
        );
        assert_eq!(
            StorageConfig::parse_credentials(None, Some(String::new())),
            Ok(CredentialSource::Ambient)
        );
        assert!(StorageConfig::parse_credentials(Some("ak".to_string()), None).is_err());
    }

    #[test]
    fn test_credential_debug_hides_secret() {
        let source = CredentialSource::Static {
            access_key: "ak".to_string(),
            secret_key: "super-secret".to_string(),
        };
        let printed = format!("{:?}", source);

        assert!(printed.contains("ak"));
        assert!(!printed.contains("super-secret"));
    }
}
