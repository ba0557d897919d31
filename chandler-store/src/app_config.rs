use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Applied to the settlement subtotal, e.g. 0.07 for 7% GST.
    pub tax_rate: f64,
    /// Allowed absolute drift between a submitted line total and
    /// unit_price * quantity.
    pub price_tolerance: f64,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: usize,
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: usize,
}

fn default_page_limit() -> usize {
    50
}

fn default_max_page_limit() -> usize {
    200
}

impl BusinessRules {
    pub fn tax_rate_decimal(&self) -> Decimal {
        Decimal::from_f64_retain(self.tax_rate).unwrap_or(Decimal::ZERO)
    }

    pub fn price_tolerance_decimal(&self) -> Decimal {
        Decimal::from_f64_retain(self.price_tolerance).unwrap_or(Decimal::ZERO)
    }
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            tax_rate: 0.0,
            price_tolerance: 0.005,
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CHANDLER__SERVER__PORT=9090` overrides server.port
            .add_source(config::Environment::with_prefix("CHANDLER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_converts_to_decimal() {
        let rules = BusinessRules::default();
        assert_eq!(rules.price_tolerance_decimal(), Decimal::from_f64_retain(0.005).unwrap());
        assert_eq!(rules.tax_rate_decimal(), Decimal::ZERO);
    }
}
