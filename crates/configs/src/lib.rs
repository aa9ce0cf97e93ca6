use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_op_timeout")]
    pub op_timeout_secs: u64,
    #[serde(default = "default_update_attempts")]
    pub update_max_attempts: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_ttl_secs: default_cache_ttl(),
            op_timeout_secs: default_op_timeout(),
            update_max_attempts: default_update_attempts(),
        }
    }
}

fn default_data_dir() -> String { "data".to_string() }
fn default_cache_ttl() -> u64 { 30 }
fn default_op_timeout() -> u64 { 10 }
fn default_update_attempts() -> u32 { 5 }

/// One admission tier: a wholesale-renewed window and a request budget.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitTier {
    pub window_secs: u64,
    pub max: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_public_tier")]
    pub public: LimitTier,
    #[serde(default = "default_admin_tier")]
    pub admin: LimitTier,
    #[serde(default = "default_form_tier")]
    pub form: LimitTier,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { public: default_public_tier(), admin: default_admin_tier(), form: default_form_tier() }
    }
}

fn default_public_tier() -> LimitTier { LimitTier { window_secs: 60, max: 300 } }
fn default_admin_tier() -> LimitTier { LimitTier { window_secs: 300, max: 60 } }
fn default_form_tier() -> LimitTier { LimitTier { window_secs: 3600, max: 5 } }

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub production: bool,
    #[serde(default = "default_csrf_ttl")]
    pub csrf_ttl_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { production: false, csrf_ttl_secs: default_csrf_ttl() }
    }
}

fn default_csrf_ttl() -> u64 { 7200 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        // 配置文件缺失时退回默认值（环境变量仍可覆盖）
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.limits.validate()?;
        self.security.normalize_from_env();
        self.security.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                self.port = p;
            }
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var("DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = dir;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir is empty; provide it in config.toml or DATA_DIR"));
        }
        if self.op_timeout_secs == 0 {
            return Err(anyhow!("storage.op_timeout_secs must be a positive number of seconds"));
        }
        if self.update_max_attempts == 0 {
            return Err(anyhow!("storage.update_max_attempts must be >= 1"));
        }
        Ok(())
    }
}

impl LimitsConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, tier) in [("public", &self.public), ("admin", &self.admin), ("form", &self.form)] {
            if tier.window_secs == 0 {
                return Err(anyhow!("limits.{name}.window_secs must be >= 1"));
            }
            if tier.max == 0 {
                return Err(anyhow!("limits.{name}.max must be >= 1"));
            }
        }
        Ok(())
    }
}

impl SecurityConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(v) = std::env::var("PRODUCTION") {
            self.production = matches!(v.trim(), "1" | "true" | "yes");
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.csrf_ttl_secs < 60 {
            return Err(anyhow!("security.csrf_ttl_secs must be >= 60"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().expect("defaults valid");
        assert_eq!(cfg.storage.update_max_attempts, 5);
        assert_eq!(cfg.limits.form.max, 5);
    }

    #[test]
    fn parses_partial_toml() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [limits.admin]
            window_secs = 120
            max = 20
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.limits.admin.max, 20);
        // 未提供的段落使用默认值
        assert_eq!(cfg.limits.public.max, 300);
        assert_eq!(cfg.storage.data_dir, "data");
    }

    #[test]
    fn rejects_zero_limits() {
        let mut cfg = AppConfig::default();
        cfg.limits.admin.max = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }
}
