use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Persistence backend types
///
/// Defined in core because it is read by configuration and by the store factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Codes kept on the device, no identity required
    Local,
    /// Codes kept in the hosted table, scoped to the signed-in user
    Remote,
}

impl StoreBackend {
    pub fn requires_identity(&self) -> bool {
        matches!(self, StoreBackend::Remote)
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StoreBackend::Local),
            "remote" | "hosted" => Ok(StoreBackend::Remote),
            _ => Err(anyhow::anyhow!("Invalid store backend: {}", s)),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreBackend::Local => write!(f, "local"),
            StoreBackend::Remote => write!(f, "remote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!("local".parse::<StoreBackend>().unwrap(), StoreBackend::Local);
        assert_eq!("REMOTE".parse::<StoreBackend>().unwrap(), StoreBackend::Remote);
        assert_eq!("hosted".parse::<StoreBackend>().unwrap(), StoreBackend::Remote);
        assert!("s3".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_only_remote_requires_identity() {
        assert!(!StoreBackend::Local.requires_identity());
        assert!(StoreBackend::Remote.requires_identity());
    }
}
