use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_u16,
    parse_u64,
};
use super::secret::{load_or_create_token_secret, ACCESS_SECRET_FILE, REFRESH_SECRET_FILE};
use super::types::{
    ApiSettings, AuthSettings, ConfigError, CorsSettings, DatabaseSettings, RedisSettings,
    RuntimeSettings, SecuritySettings, SeedAccount, SeedSettings, ServerHost, ServerPort,
    ServerSettings, Settings, TelemetrySettings,
};
use crate::core::security;
use crate::core::verification::DEFAULT_CODE_TTL_SECONDS;
use crate::db::types::UserRole;

pub(crate) const DEFAULT_JWT_ISSUER: &str = "learning-management-system";

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("LMS_HOST", "0.0.0.0");
        let port = env_or_default("LMS_PORT", "8000");

        let environment =
            parse_environment(env_optional("LMS_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("LMS_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Learning Management API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        // Strict mode refuses generated secrets; validate() reports the missing one.
        let explicit_access_secret = env_optional("ACCESS_TOKEN_SECRET");
        let explicit_refresh_secret = env_optional("REFRESH_TOKEN_SECRET");
        let access_token_secret = match explicit_access_secret {
            Some(value) => value,
            None if strict_config => String::new(),
            None => load_or_create_token_secret(ACCESS_SECRET_FILE),
        };
        let refresh_token_secret = match explicit_refresh_secret {
            Some(value) => value,
            None if strict_config => String::new(),
            None => load_or_create_token_secret(REFRESH_SECRET_FILE),
        };

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "15"),
        )?;
        let refresh_token_expire_days = parse_u64(
            "REFRESH_TOKEN_EXPIRE_DAYS",
            env_or_default("REFRESH_TOKEN_EXPIRE_DAYS", "7"),
        )?;
        let jwt_issuer = env_or_default("JWT_ISSUER", DEFAULT_JWT_ISSUER);
        let cookie_secure = env_optional("COOKIE_SECURE")
            .map(|value| parse_bool(&value))
            .unwrap_or(environment.is_production());

        let verification_code_ttl_seconds = parse_u64(
            "VERIFICATION_CODE_TTL_SECONDS",
            env_or_default("VERIFICATION_CODE_TTL_SECONDS", &DEFAULT_CODE_TTL_SECONDS.to_string()),
        )?;
        let rate_limit = parse_u64("AUTH_RATE_LIMIT", env_or_default("AUTH_RATE_LIMIT", "10"))?;
        let rate_window_seconds = parse_u64(
            "AUTH_RATE_WINDOW_SECONDS",
            env_or_default("AUTH_RATE_WINDOW_SECONDS", "300"),
        )?;

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "lms");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "lms");
        let database_url = env_optional("DATABASE_URL");

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let log_level = env_or_default("LMS_LOG_LEVEL", "info");
        let json = env_optional("LMS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let seed_accounts = [
            seed_account(
                UserRole::Professor,
                "FIRST_PROFESSOR_USERNAME",
                "FIRST_PROFESSOR_EMAIL",
                "FIRST_PROFESSOR_PASSWORD",
                "professor",
            )?,
            seed_account(
                UserRole::Ta,
                "FIRST_TA_USERNAME",
                "FIRST_TA_EMAIL",
                "FIRST_TA_PASSWORD",
                "assistant",
            )?,
        ];

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings {
                access_token_secret,
                refresh_token_secret,
                access_token_expire_minutes,
                refresh_token_expire_days,
                jwt_issuer,
                cookie_secure,
            },
            auth: AuthSettings { verification_code_ttl_seconds, rate_limit, rate_window_seconds },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
            seed: SeedSettings { accounts: seed_accounts.into_iter().flatten().collect() },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn auth(&self) -> &AuthSettings {
        &self.auth
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn seed(&self) -> &SeedSettings {
        &self.seed
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.access_token_expire_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: "0".to_string(),
            });
        }

        if self.security.refresh_token_expire_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "REFRESH_TOKEN_EXPIRE_DAYS",
                value: "0".to_string(),
            });
        }

        if self.security.jwt_issuer.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "JWT_ISSUER",
                value: String::from("<empty>"),
            });
        }

        if self.auth.verification_code_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "VERIFICATION_CODE_TTL_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.auth.rate_window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "AUTH_RATE_WINDOW_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.runtime.strict_config || self.runtime.environment.is_production() {
            if self.security.access_token_secret.is_empty() {
                return Err(ConfigError::MissingSecret("ACCESS_TOKEN_SECRET"));
            }
            if self.security.refresh_token_secret.is_empty() {
                return Err(ConfigError::MissingSecret("REFRESH_TOKEN_SECRET"));
            }
            if self.database.database_url.is_none() && self.database.postgres_password.is_empty()
            {
                return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
            }
        }

        if self.security.access_token_secret == self.security.refresh_token_secret {
            return Err(ConfigError::SharedTokenSecret);
        }

        Ok(())
    }
}

/// An account is seeded only when both its email and password are set. Seeded
/// passwords follow the same strength rule as sign-up.
fn seed_account(
    role: UserRole,
    username_var: &'static str,
    email_var: &'static str,
    password_var: &'static str,
    default_username: &str,
) -> Result<Option<SeedAccount>, ConfigError> {
    let (Some(email), Some(password)) = (env_optional(email_var), env_optional(password_var))
    else {
        return Ok(None);
    };

    if !email.contains('@') {
        return Err(ConfigError::InvalidValue { field: email_var, value: email });
    }
    if !security::is_strong_password(&password) {
        return Err(ConfigError::InvalidValue {
            field: password_var,
            value: String::from("<weak password>"),
        });
    }

    Ok(Some(SeedAccount {
        role,
        username: env_or_default(username_var, default_username),
        email,
        password,
    }))
}
