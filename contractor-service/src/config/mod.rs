use crate::services::record_store::TableRef;
use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_optional_env, is_production};
use service_core::error::AppError;
use std::time::Duration;

/// Base and table of the community leaders table in the deployed workspace.
const DEFAULT_LEADERS_BASE: &str = "app7924YTWUI9YhMK";
const DEFAULT_LEADERS_TABLE: &str = "tbl5Tl74DBlHg2805";

#[derive(Debug, Clone)]
pub struct ContractorConfig {
    pub common: core_config::Config,
    pub airtable: AirtableConfig,
    pub tables: TablesConfig,
    pub documents: DocumentsConfig,
    pub drive: DriveSettings,
    pub fetch: FetchConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_key: Secret<String>,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct TablesConfig {
    /// One row per invoice submission.
    pub ledger: TableRef,
    /// Contractor / community leader status rows.
    pub leaders: TableRef,
    pub purchase_orders: TableRef,
    /// Field matched against the invoice email when looking up a leader.
    pub leader_email_field: String,
}

#[derive(Debug, Clone)]
pub struct DocumentsConfig {
    pub output_dir: String,
    pub template_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub folder_id: String,
    /// Service account key file contents (JSON).
    pub credentials: Secret<String>,
    pub upload_url: String,
}

/// Drive upload settings as found in the environment.
#[derive(Debug, Clone)]
pub enum DriveSettings {
    Disabled,
    /// Only one of the folder id and the service account key was set.
    Incomplete,
    Enabled(DriveConfig),
}

impl DriveSettings {
    fn from_parts(
        folder_id: Option<String>,
        credentials: Option<String>,
        upload_url: String,
    ) -> Self {
        match (folder_id, credentials) {
            (Some(folder_id), Some(credentials)) => DriveSettings::Enabled(DriveConfig {
                folder_id,
                credentials: Secret::new(credentials),
                upload_url,
            }),
            (Some(_), None) | (None, Some(_)) => DriveSettings::Incomplete,
            (None, None) => DriveSettings::Disabled,
        }
    }
}

/// Limits applied when downloading invoice attachments.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_bytes: 25 * 1024 * 1024,
        }
    }
}

impl FetchConfig {
    fn load() -> Result<Self, AppError> {
        let defaults = Self::default();
        Ok(Self {
            timeout: Duration::from_secs(parse_env(
                "INVOICE_FETCH_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            connect_timeout: Duration::from_secs(parse_env(
                "INVOICE_FETCH_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout.as_secs(),
            )?),
            max_bytes: parse_env("INVOICE_FETCH_MAX_BYTES", defaults.max_bytes)?,
        })
    }
}

fn parse_env(key: &str, default: u64) -> Result<u64, AppError> {
    match get_optional_env(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!("{} must be a whole number, got '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

impl ContractorConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common = core_config::Config::load()?;
        let is_prod = is_production();

        let ledger_base = get_env("AIRTABLE_BASE_ID", None, is_prod)?;
        let ledger_table = get_env("AIRTABLE_TABLE_ID", None, is_prod)?;

        let tables = TablesConfig {
            ledger: TableRef::new(&ledger_base, &ledger_table),
            leaders: TableRef::new(
                &get_env("COMMUNITY_LEADERS_BASE_ID", Some(DEFAULT_LEADERS_BASE), false)?,
                &get_env("COMMUNITY_LEADERS_TABLE_ID", Some(DEFAULT_LEADERS_TABLE), false)?,
            ),
            purchase_orders: TableRef::new(
                &get_env("PURCHASE_ORDERS_BASE_ID", Some(&ledger_base), false)?,
                &get_env("PURCHASE_ORDERS_TABLE_ID", Some("Purchase Orders"), false)?,
            ),
            leader_email_field: get_env("LEADER_EMAIL_FIELD", Some("Email"), false)?,
        };

        let drive = DriveSettings::from_parts(
            get_optional_env("GOOGLE_DRIVE_FOLDER_ID"),
            get_optional_env("GOOGLE_SERVICE_ACCOUNT_JSON"),
            get_env(
                "GOOGLE_UPLOAD_URL",
                Some("https://www.googleapis.com/upload"),
                false,
            )?,
        );

        Ok(ContractorConfig {
            common,
            airtable: AirtableConfig {
                api_key: Secret::new(get_env("AIRTABLE_API_KEY", None, is_prod)?),
                api_url: get_env(
                    "AIRTABLE_API_URL",
                    Some("https://api.airtable.com/v0"),
                    false,
                )?,
            },
            tables,
            documents: DocumentsConfig {
                output_dir: get_env(
                    "GENERATED_CONTRACTS_DIR",
                    Some("generated_contracts"),
                    false,
                )?,
                template_path: get_optional_env("CONTRACT_TEMPLATE_PATH"),
            },
            drive,
            fetch: FetchConfig::load()?,
            otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
        })
    }
}
