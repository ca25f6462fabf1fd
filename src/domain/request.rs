//! Customer attributes submitted for churn scoring.
//!
//! Based on the telco churn schema the shipped pipeline was trained on.

use serde::{Deserialize, Serialize};

use crate::ChurnError;

/// Inclusive tenure bounds in months.
pub const TENURE_MIN: i64 = 0;
pub const TENURE_MAX: i64 = 72;

pub const DEFAULT_TENURE: i64 = 12;
pub const DEFAULT_MONTHLY_CHARGES: f64 = 70.0;
pub const DEFAULT_TOTAL_CHARGES: f64 = 800.0;

/// Contract term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Contract {
    #[default]
    MonthToMonth,
    OneYear,
    TwoYear,
}

impl Contract {
    pub const ALL: [Contract; 3] = [Self::MonthToMonth, Self::OneYear, Self::TwoYear];

    /// Category string expected by the pipeline's `Contract` column.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::MonthToMonth => "Month-to-month",
            Self::OneYear => "One year",
            Self::TwoYear => "Two year",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    #[must_use]
    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl std::fmt::Display for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Billing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    ElectronicCheck,
    MailedCheck,
    BankTransfer,
    CreditCard,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        Self::ElectronicCheck,
        Self::MailedCheck,
        Self::BankTransfer,
        Self::CreditCard,
    ];

    /// Category string expected by the pipeline's `PaymentMethod` column.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ElectronicCheck => "Electronic check",
            Self::MailedCheck => "Mailed check",
            Self::BankTransfer => "Bank transfer (automatic)",
            Self::CreditCard => "Credit card (automatic)",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    #[must_use]
    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + step) % all.len()]
}

/// Values as collected by the form, before domain validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub tenure: i64,
    pub monthly_charges: f64,
    pub total_charges: f64,
    pub contract: Contract,
    pub payment_method: PaymentMethod,
}

impl Default for RawInputs {
    fn default() -> Self {
        Self {
            tenure: DEFAULT_TENURE,
            monthly_charges: DEFAULT_MONTHLY_CHARGES,
            total_charges: DEFAULT_TOTAL_CHARGES,
            contract: Contract::default(),
            payment_method: PaymentMethod::default(),
        }
    }
}

/// A validated, single-row scoring request.
///
/// Fields are private so every instance has passed [`PredictionRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRequest {
    tenure: i64,
    monthly_charges: f64,
    total_charges: f64,
    contract: Contract,
    payment_method: PaymentMethod,
}

impl PredictionRequest {
    /// Build a request, checking every numeric field against its domain.
    ///
    /// # Errors
    /// Returns `ChurnError::Validation` listing every out-of-domain field.
    pub fn new(
        tenure: i64,
        monthly_charges: f64,
        total_charges: f64,
        contract: Contract,
        payment_method: PaymentMethod,
    ) -> Result<Self, ChurnError> {
        let mut errors = Vec::new();

        if !(TENURE_MIN..=TENURE_MAX).contains(&tenure) {
            errors.push(format!(
                "Tenure {tenure} out of range [{TENURE_MIN}, {TENURE_MAX}]"
            ));
        }
        if !monthly_charges.is_finite() || monthly_charges < 0.0 {
            errors.push(format!(
                "Monthly charges {monthly_charges} must be a non-negative number"
            ));
        }
        if !total_charges.is_finite() || total_charges < 0.0 {
            errors.push(format!(
                "Total charges {total_charges} must be a non-negative number"
            ));
        }

        if !errors.is_empty() {
            return Err(ChurnError::Validation(errors.join(", ")));
        }

        Ok(Self {
            tenure,
            monthly_charges,
            total_charges,
            contract,
            payment_method,
        })
    }

    #[must_use]
    pub fn tenure(&self) -> i64 {
        self.tenure
    }

    #[must_use]
    pub fn monthly_charges(&self) -> f64 {
        self.monthly_charges
    }

    #[must_use]
    pub fn total_charges(&self) -> f64 {
        self.total_charges
    }

    #[must_use]
    pub fn contract(&self) -> Contract {
        self.contract
    }

    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }
}

impl TryFrom<RawInputs> for PredictionRequest {
    type Error = ChurnError;

    fn try_from(raw: RawInputs) -> Result<Self, Self::Error> {
        Self::new(
            raw.tenure,
            raw.monthly_charges,
            raw.total_charges,
            raw.contract,
            raw.payment_method,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tenure: i64) -> RawInputs {
        RawInputs {
            tenure,
            ..RawInputs::default()
        }
    }

    #[test]
    fn test_defaults_match_form_defaults() {
        let r = RawInputs::default();
        assert_eq!(r.tenure, 12);
        assert!((r.monthly_charges - 70.0).abs() < f64::EPSILON);
        assert!((r.total_charges - 800.0).abs() < f64::EPSILON);
        assert_eq!(r.contract, Contract::MonthToMonth);
        assert_eq!(r.payment_method, PaymentMethod::ElectronicCheck);
    }

    #[test]
    fn test_tenure_boundaries_accepted() {
        assert!(PredictionRequest::try_from(raw(0)).is_ok());
        assert!(PredictionRequest::try_from(raw(72)).is_ok());
    }

    #[test]
    fn test_tenure_out_of_range_rejected() {
        assert!(matches!(
            PredictionRequest::try_from(raw(73)),
            Err(ChurnError::Validation(_))
        ));
        assert!(PredictionRequest::try_from(raw(-1)).is_err());
    }

    #[test]
    fn test_negative_or_nan_charges_rejected() {
        let negative = RawInputs {
            monthly_charges: -0.01,
            ..RawInputs::default()
        };
        assert!(PredictionRequest::try_from(negative).is_err());

        let nan = RawInputs {
            total_charges: f64::NAN,
            ..RawInputs::default()
        };
        assert!(PredictionRequest::try_from(nan).is_err());

        let zero = RawInputs {
            monthly_charges: 0.0,
            total_charges: 0.0,
            ..RawInputs::default()
        };
        assert!(PredictionRequest::try_from(zero).is_ok());
    }

    #[test]
    fn test_validation_lists_every_field() {
        let bad = RawInputs {
            tenure: 100,
            monthly_charges: -1.0,
            total_charges: -1.0,
            ..RawInputs::default()
        };
        match PredictionRequest::try_from(bad) {
            Err(ChurnError::Validation(msg)) => {
                assert!(msg.contains("Tenure"));
                assert!(msg.contains("Monthly"));
                assert!(msg.contains("Total"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_enum_labels_and_cycling() {
        assert_eq!(Contract::OneYear.label(), "One year");
        assert_eq!(Contract::TwoYear.next(), Contract::MonthToMonth);
        assert_eq!(Contract::MonthToMonth.prev(), Contract::TwoYear);
        assert_eq!(
            PaymentMethod::BankTransfer.to_string(),
            "Bank transfer (automatic)"
        );
        assert_eq!(PaymentMethod::CreditCard.next(), PaymentMethod::ElectronicCheck);
        assert_eq!(PaymentMethod::ElectronicCheck.prev(), PaymentMethod::CreditCard);
    }
}
