use crate::utils::error::{ModelError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ModelError::invalid_input(
            field_name,
            value,
            "Value must be a finite number",
        ));
    }
    Ok(())
}

pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    if value <= 0.0 {
        return Err(ModelError::invalid_input(
            field_name,
            value,
            "Value must be greater than zero",
        ));
    }
    Ok(())
}

pub fn validate_non_negative(field_name: &str, value: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    if value < 0.0 {
        return Err(ModelError::invalid_input(
            field_name,
            value,
            "Value cannot be negative",
        ));
    }
    Ok(())
}

/// 比例值 (佔用率、利潤率、費率) 必須介於 0 與 1 之間
pub fn validate_fraction(field_name: &str, value: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    validate_range(field_name, value, 0.0, 1.0)
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ModelError::invalid_input(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(
    property_id: &str,
    field_name: &str,
    value: &'a Option<T>,
) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ModelError::IncompleteProperty {
        property_id: property_id.to_string(),
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ModelError::invalid_input(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("share_price", 1000.0).is_ok());
        assert!(validate_positive("share_price", 0.0).is_err());
        assert!(validate_positive("share_price", -5.0).is_err());
        assert!(validate_positive("share_price", f64::NAN).is_err());
        assert!(validate_positive("share_price", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_fraction() {
        assert!(validate_fraction("occupancy_rate", 0.0).is_ok());
        assert!(validate_fraction("occupancy_rate", 0.95).is_ok());
        assert!(validate_fraction("occupancy_rate", 1.0).is_ok());
        assert!(validate_fraction("occupancy_rate", 1.01).is_err());
        assert!(validate_fraction("occupancy_rate", -0.1).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(5.0);
        let missing: Option<f64> = None;
        assert_eq!(*validate_required_field("p-1", "unit_count", &present).unwrap(), 5.0);
        match validate_required_field("p-1", "unit_count", &missing) {
            Err(ModelError::IncompleteProperty { property_id, field }) => {
                assert_eq!(property_id, "p-1");
                assert_eq!(field, "unit_count");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
