//! Product branding for the SDK.
//!
//! The Agentrix and PayMind APIs speak the same protocol; they differ only in
//! their default endpoint, webhook header and environment variable prefix.
//! A [`Brand`] carries those strings so a single client implementation serves
//! both products.

/// Product-specific strings applied on top of the shared client contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brand {
    /// Display name (e.g. `"Agentrix"`).
    pub name: &'static str,
    /// Default API base URL, without trailing slash.
    pub default_base_url: &'static str,
    /// HTTP header carrying the webhook signature.
    pub signature_header: &'static str,
    /// Prefix for environment variables such as `AGENTRIX_API_KEY`.
    pub env_prefix: &'static str,
}

impl Brand {
    /// The Agentrix API.
    pub const AGENTRIX: Self = Self {
        name: "Agentrix",
        default_base_url: "https://api.agentrix.com/api",
        signature_header: "Agentrix-Signature",
        env_prefix: "AGENTRIX",
    };

    /// The PayMind API.
    pub const PAYMIND: Self = Self {
        name: "PayMind",
        default_base_url: "https://api.paymind.com/api",
        signature_header: "X-PayMind-Signature",
        env_prefix: "PAYMIND",
    };

    /// Looks up a brand by case-insensitive name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::AGENTRIX, Self::PAYMIND]
            .into_iter()
            .find(|brand| brand.name.eq_ignore_ascii_case(name))
    }

    /// Returns the `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!(
            "{}-rust-sdk/{}",
            self.name.to_ascii_lowercase(),
            env!("CARGO_PKG_VERSION")
        )
    }

    /// Returns the name of the environment variable `<PREFIX>_<suffix>`.
    #[must_use]
    pub fn env_var(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.env_prefix)
    }
}

impl Default for Brand {
    fn default() -> Self {
        Self::AGENTRIX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Brand::from_name("paymind"), Some(Brand::PAYMIND));
        assert_eq!(Brand::from_name("AGENTRIX"), Some(Brand::AGENTRIX));
        assert_eq!(Brand::from_name("stripe"), None);
    }

    #[test]
    fn test_env_var_uses_prefix() {
        assert_eq!(Brand::PAYMIND.env_var("API_KEY"), "PAYMIND_API_KEY");
        assert!(Brand::AGENTRIX.user_agent().starts_with("agentrix-rust-sdk/"));
    }
}
