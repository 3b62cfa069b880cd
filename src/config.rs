//! Runtime configuration for protocol executions.

use serde::{Deserialize, Serialize};

use crate::ot::SecurityLevel;
use crate::params::{BuiltinParameters, ParameterSource, GroupParameters, RFC5114_2048_256};
use crate::{Error, Result};

/// Default location of the TOML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/protocol.toml";

/// Largest accepted Sigma challenge width.
pub const MAX_SOUNDNESS_BITS: usize = 256;

/// Protocol configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Which group and arithmetic backend to run over.
    pub group: GroupSettings,
    /// Sigma protocol settings.
    pub sigma: SigmaSettings,
    /// Oblivious transfer settings.
    pub ot: OtSettings,
    /// TCP transport settings.
    pub transport: TransportSettings,
}

/// Arithmetic backend for the configured group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Arbitrary-precision software arithmetic; works for every named group.
    Software,
    /// Fixed-width constant-time arithmetic; RFC 5114 only.
    FixedWidth,
    /// The native P-256 implementation.
    Native,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    /// Name known to [`BuiltinParameters`].
    pub name: String,
    pub backend: Backend,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigmaSettings {
    /// Challenge width `t`; soundness error is `2^-t`.
    pub soundness_bits: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtSettings {
    pub security: SecurityLevel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Hostname or IP address.
    pub host: String,
    pub port: u16,
    /// Largest accepted frame in bytes.
    pub max_frame_len: usize,
}

impl TransportSettings {
    /// `host:port`, suitable for connecting or binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            group: GroupSettings {
                name: "P-256".to_string(),
                backend: Backend::Native,
            },
            sigma: SigmaSettings { soundness_bits: 80 },
            ot: OtSettings {
                security: SecurityLevel::OneSidedSimulation,
            },
            transport: TransportSettings {
                host: "127.0.0.1".to_string(),
                port: 7766,
                max_frame_len: crate::channel::DEFAULT_MAX_FRAME_LEN,
            },
        }
    }
}

impl ProtocolConfig {
    /// Loads configuration from `.env`, the TOML file and the environment.
    ///
    /// Configuration priority: environment variables > TOML file > defaults.
    /// The file is read from `DLOG_CONFIG_PATH`, falling back to
    /// [`DEFAULT_CONFIG_PATH`]. Nested keys use a double underscore, e.g.
    /// `DLOG_SIGMA__SOUNDNESS_BITS=40`.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> figment::error::Result<Self> {
        let _ = dotenvy::dotenv();
        let path =
            std::env::var("DLOG_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(&path)
    }

    /// Loads defaults, then `path`, then `DLOG_` environment variables.
    #[allow(clippy::result_large_err)]
    pub fn load(path: &str) -> figment::error::Result<Self> {
        use figment::providers::{Env, Format, Serialized, Toml};
        use figment::Figment;

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("DLOG_").split("__"))
            .extract()
    }

    /// Rejects settings no execution could run with.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedGroup`] for an unknown group name or a backend
    ///   that does not implement the named group.
    /// - [`Error::InvalidParams`] for a zero port or frame limit.
    /// - [`Error::SecurityLevel`] for a challenge width of 0 or above
    ///   [`MAX_SOUNDNESS_BITS`].
    pub fn validate(&self) -> Result<()> {
        let parameters = BuiltinParameters.lookup(&self.group.name)?;
        match (self.group.backend, &parameters) {
            (Backend::Software, _) => {}
            (Backend::FixedWidth, GroupParameters::Zp(_))
                if self.group.name == RFC5114_2048_256 => {}
            (Backend::Native, GroupParameters::EcFp(_)) if self.group.name == "P-256" => {}
            (backend, _) => {
                return Err(Error::UnsupportedGroup(format!(
                    "backend {backend:?} does not implement {}",
                    self.group.name
                )))
            }
        }
        if self.transport.port == 0 {
            return Err(Error::InvalidParams(
                "transport.port must be non-zero".to_string(),
            ));
        }
        if self.transport.max_frame_len == 0 {
            return Err(Error::InvalidParams(
                "transport.max_frame_len must be non-zero".to_string(),
            ));
        }
        let bits = self.sigma.soundness_bits;
        if bits == 0 || bits > MAX_SOUNDNESS_BITS {
            return Err(Error::SecurityLevel(format!(
                "sigma.soundness_bits must be in 1..={MAX_SOUNDNESS_BITS}, got {bits}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ProtocolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transport.addr(), "127.0.0.1:7766");
        assert_eq!(config.ot.security, SecurityLevel::OneSidedSimulation);
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let mut config = ProtocolConfig::default();
        config.group.name = "P-521".to_string();
        assert!(matches!(config.validate(), Err(Error::UnsupportedGroup(_))));

        let mut config = ProtocolConfig::default();
        config.group.name = "K-233".to_string();
        assert!(matches!(config.validate(), Err(Error::UnsupportedGroup(_))));
        config.group.backend = Backend::Software;
        assert!(config.validate().is_ok());

        let mut config = ProtocolConfig::default();
        config.transport.port = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidParams(_))));

        for bits in [0, 257] {
            let mut config = ProtocolConfig::default();
            config.sigma.soundness_bits = bits;
            assert!(matches!(config.validate(), Err(Error::SecurityLevel(_))));
        }
    }

    #[test]
    fn file_and_environment_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "protocol.toml",
                r#"
                [group]
                name = "RFC5114-2048-256"
                backend = "fixed_width"

                [ot]
                security = "semi_honest"
                "#,
            )?;
            jail.set_env("DLOG_SIGMA__SOUNDNESS_BITS", "40");
            jail.set_env("DLOG_TRANSPORT__PORT", "9000");

            let config = ProtocolConfig::load("protocol.toml")?;
            assert_eq!(config.group.name, RFC5114_2048_256);
            assert_eq!(config.group.backend, Backend::FixedWidth);
            assert_eq!(config.ot.security, SecurityLevel::SemiHonest);
            assert_eq!(config.sigma.soundness_bits, 40);
            assert_eq!(config.transport.port, 9000);
            assert_eq!(config.transport.host, "127.0.0.1");
            assert!(config.validate().is_ok());
            Ok(())
        });
    }
}
