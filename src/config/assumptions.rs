use crate::domain::model::{
    AppreciationPolicy, Archetype, ArchetypeDefaults, FinancingTerms, ShareParameters,
};
use crate::domain::ports::AssumptionsProvider;
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{validate_fraction, validate_non_negative, validate_positive, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 模型假設：預設融資條件、股份參數、各類型營運預設值、增值政策
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub platform_fee_rate: f64,
    pub financing: FinancingTerms,
    pub shares: ShareParameters,
    pub archetypes: ArchetypeDefaultsTable,
    pub appreciation: AppreciationPolicy,
    pub projection: ProjectionConfig,
}

/// Each table replaces its archetype's defaults as a whole when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeDefaultsTable {
    pub single_family: ArchetypeDefaults,
    pub multifamily: ArchetypeDefaults,
    pub business: ArchetypeDefaults,
    pub ground_lease: ArchetypeDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub holding_periods: Vec<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            platform_fee_rate: 0.01,
            financing: FinancingTerms::default(),
            shares: ShareParameters::default(),
            archetypes: ArchetypeDefaultsTable::default(),
            appreciation: AppreciationPolicy::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl Default for ArchetypeDefaultsTable {
    fn default() -> Self {
        Self {
            single_family: ArchetypeDefaults::for_archetype(Archetype::SingleFamily),
            multifamily: ArchetypeDefaults::for_archetype(Archetype::Multifamily),
            business: ArchetypeDefaults::for_archetype(Archetype::Business),
            ground_lease: ArchetypeDefaults::for_archetype(Archetype::GroundLease),
        }
    }
}

impl ArchetypeDefaultsTable {
    pub fn get(&self, archetype: Archetype) -> &ArchetypeDefaults {
        match archetype {
            Archetype::SingleFamily => &self.single_family,
            Archetype::Multifamily => &self.multifamily,
            Archetype::Business => &self.business,
            Archetype::GroundLease => &self.ground_lease,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            holding_periods: vec![1.0, 3.0, 5.0, 10.0],
        }
    }
}

impl ModelConfig {
    /// 從 TOML 檔案載入假設
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading model assumptions from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析假設，未填寫的區塊使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ModelConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ModelError::ConfigError {
            message: format!("TOML serialization error: {}", e),
        })
    }

    pub fn with_holding_periods(mut self, holding_periods: Vec<f64>) -> Self {
        self.projection.holding_periods = holding_periods;
        self
    }

    pub fn with_appreciation(mut self, policy: AppreciationPolicy) -> Self {
        self.appreciation = policy;
        self
    }

    /// 驗證假設的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_fraction("platform_fee_rate", self.platform_fee_rate)?;
        crate::core::financing::validate_terms(&self.financing)?;
        validate_positive("shares.share_price", self.shares.share_price)?;
        validate_non_negative("shares.min_investment", self.shares.min_investment)?;

        for archetype in Archetype::ALL {
            let defaults = self.archetypes.get(archetype);
            let prefix = format!("archetypes.{}", archetype);
            if defaults.unit_count == 0 {
                return Err(ModelError::invalid_input(
                    &format!("{}.unit_count", prefix),
                    defaults.unit_count,
                    "Unit count must be at least 1",
                ));
            }
            validate_fraction(&format!("{}.occupancy_rate", prefix), defaults.occupancy_rate)?;
            validate_fraction(&format!("{}.operating_margin", prefix), defaults.operating_margin)?;
            validate_fraction(
                &format!("{}.management_fee_rate", prefix),
                defaults.management_fee_rate,
            )?;
            validate_fraction(&format!("{}.insurance_rate", prefix), defaults.insurance_rate)?;
            validate_fraction(&format!("{}.property_tax_rate", prefix), defaults.property_tax_rate)?;
            validate_fraction(&format!("{}.maintenance_rate", prefix), defaults.maintenance_rate)?;
        }

        if self.projection.holding_periods.is_empty() {
            return Err(ModelError::ConfigError {
                message: "projection.holding_periods must list at least one period".to_string(),
            });
        }
        for &years in &self.projection.holding_periods {
            crate::core::projection::validate_holding_period(years)?;
        }

        Ok(())
    }
}

impl AssumptionsProvider for ModelConfig {
    fn archetype_defaults(&self, archetype: Archetype) -> ArchetypeDefaults {
        *self.archetypes.get(archetype)
    }

    fn platform_fee_rate(&self) -> f64 {
        self.platform_fee_rate
    }

    fn default_financing(&self) -> FinancingTerms {
        self.financing
    }

    fn default_share_parameters(&self) -> ShareParameters {
        self.shares
    }

    fn appreciation_policy(&self) -> &AppreciationPolicy {
        &self.appreciation
    }

    fn holding_periods(&self) -> &[f64] {
        &self.projection.holding_periods
    }
}

impl Validate for ModelConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.holding_periods(), &[1.0, 3.0, 5.0, 10.0]);
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
platform_fee_rate = 0.015

[financing]
loan_to_value = 0.6
interest_rate = 0.07
interest_only_years = 2.0
amortization_years = 25.0
loan_term_years = 7.0

[appreciation]
multifamily = 0.3
ground_lease = 0.08

[projection]
holding_periods = [5.0, 7.0]
"#;

        let config = ModelConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.platform_fee_rate, 0.015);
        assert_eq!(config.financing.loan_to_value, 0.6);
        assert_eq!(config.appreciation.rate_for(Archetype::Multifamily), 0.3);
        assert_eq!(config.appreciation.rate_for(Archetype::Business), 0.0);
        assert_eq!(config.holding_periods(), &[5.0, 7.0]);
        // untouched sections keep their defaults
        assert_eq!(config.shares, ShareParameters::default());
        assert_eq!(config.archetypes, ArchetypeDefaultsTable::default());
    }

    #[test]
    fn test_archetype_table_override() {
        let toml_content = r#"
[archetypes.business]
unit_count = 1
occupancy_rate = 1.0
operating_margin = 0.35
management_fee_rate = 0.0
insurance_rate = 0.002
property_tax_rate = 0.01
maintenance_rate = 0.01
"#;

        let config = ModelConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.archetype_defaults(Archetype::Business).operating_margin, 0.35);
        assert_eq!(config.archetype_defaults(Archetype::Multifamily).unit_count, 24);
        assert_eq!(
            config.archetype_defaults(Archetype::Multifamily),
            ArchetypeDefaults::for_archetype(Archetype::Multifamily)
        );
    }

    #[test]
    fn test_config_validation() {
        let bad_ltv = r#"
[financing]
loan_to_value = 1.2
interest_rate = 0.07
interest_only_years = 2.0
amortization_years = 25.0
loan_term_years = 7.0
"#;
        assert!(ModelConfig::from_toml_str(bad_ltv).is_err());

        let bad_periods = r#"
[projection]
holding_periods = [5.0, 0.0]
"#;
        assert!(matches!(
            ModelConfig::from_toml_str(bad_periods),
            Err(ModelError::InvalidHoldingPeriod { .. })
        ));

        let unknown_archetype = r#"
[appreciation]
castle = 0.5
"#;
        assert!(ModelConfig::from_toml_str(unknown_archetype).is_err());

        let zero_units = r#"
[archetypes.multifamily]
unit_count = 0
occupancy_rate = 0.93
operating_margin = 1.0
management_fee_rate = 0.08
insurance_rate = 0.004
property_tax_rate = 0.012
maintenance_rate = 0.05
"#;
        assert!(matches!(
            ModelConfig::from_toml_str(zero_units),
            Err(ModelError::InvalidInput { ref field, .. }) if field == "archetypes.multifamily.unit_count"
        ));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = ModelConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = ModelConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[shares]\nshare_price = 250.0\nmin_investment = 500.0\n")
            .unwrap();

        let config = ModelConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.shares.share_price, 250.0);
        assert_eq!(config.shares.max_investment, None);
    }
}
