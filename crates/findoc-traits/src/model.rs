//! Structured investment data extracted from a statement.
//!
//! The wire shape (camelCase JSON with four sections `total`,
//! `classification`, `stocks` and `fixedIncome`) is produced by the
//! structured analyzer and persisted verbatim:
//! - monetary values are plain decimal numbers, no currency symbols
//! - optional values are `null` or missing, never a sentinel number
//! - dates use the calendar form `YYYY-MM-DD`
//! - every list element carries a [`Confidence`] and a short justification

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TraitError;
use crate::ids::AnalysisId;

fn default_currency() -> String {
    "BRL".to_string()
}

// =============================================================================
// CONFIDENCE
// =============================================================================

/// Extraction confidence score, always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Full confidence.
    pub const CERTAIN: Confidence = Confidence(1.0);

    /// Create a confidence score, rejecting non-finite or out-of-range values.
    pub fn new(value: f64) -> Result<Self, TraitError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TraitError::InvalidInput(format!(
                "confidence must be within [0, 1], got {}",
                value
            )))
        }
    }

    /// Get the score.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = TraitError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// =============================================================================
// TOTAL
// =============================================================================

/// Aggregate invested amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalInvested {
    /// Total invested across all asset classes
    pub total_invested_amount: Decimal,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
}

// =============================================================================
// ASSET CLASSIFICATION
// =============================================================================

/// Breakdown of the portfolio by asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClassification {
    /// Total invested
    pub total_invested: Decimal,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Asset classes, in statement order
    #[serde(default)]
    pub classes: Vec<AssetClass>,
}

/// One asset class line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClass {
    /// Asset class name as printed on the statement
    pub asset_class_name: String,
    /// Amount invested in this class
    pub invested: Decimal,
    /// Share of the total, as a decimal fraction
    pub percentage: Decimal,
    /// Extraction confidence
    pub confidence: Confidence,
    /// Why the analyzer assigned this confidence
    #[serde(default)]
    pub confidence_reason: String,
}

// =============================================================================
// STOCKS
// =============================================================================

/// Equity positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPortfolio {
    /// Total invested in equities
    pub total_invested: Decimal,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Positions
    #[serde(default)]
    pub stocks: Vec<StockHolding>,
}

/// One equity position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHolding {
    /// Exchange ticker (e.g. PETR4, BOVA11)
    pub ticker: String,
    /// Number of shares
    pub quantity: i64,
    /// Average acquisition price
    pub average_price: Decimal,
    /// Amount invested
    pub total_invested: Decimal,
    /// Current market value
    #[serde(default)]
    pub current_value: Option<Decimal>,
    /// Absolute return
    #[serde(default, rename = "return")]
    pub return_amount: Option<Decimal>,
    /// Return as a decimal fraction
    #[serde(default)]
    pub return_percentage: Option<Decimal>,
    /// Extraction confidence
    pub confidence: Confidence,
    /// Why the analyzer assigned this confidence
    #[serde(default)]
    pub confidence_reason: String,
}

// =============================================================================
// FIXED INCOME
// =============================================================================

/// Fixed-income positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedIncomePortfolio {
    /// Total invested in fixed income
    pub total_invested: Decimal,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Positions
    #[serde(default)]
    pub assets: Vec<FixedIncomeAsset>,
}

/// One fixed-income position (CDB, LCI, debenture, treasury, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedIncomeAsset {
    /// Instrument name
    pub name: String,
    /// Instrument type (LCI, CDB, Debenture, ...)
    #[serde(default, rename = "type")]
    pub asset_type: String,
    /// Issuer
    #[serde(default)]
    pub issuer: String,
    /// Amount invested
    pub invested_amount: Decimal,
    /// Current value
    #[serde(default)]
    pub current_value: Option<Decimal>,
    /// Absolute return
    #[serde(default, rename = "return")]
    pub return_amount: Option<Decimal>,
    /// Return as a decimal fraction
    #[serde(default)]
    pub return_percentage: Option<Decimal>,
    /// Rate description ("96% CDI", "IPCA + 3.6%")
    #[serde(default)]
    pub rate: String,
    /// Maturity date
    #[serde(default)]
    pub maturity_date: Option<NaiveDate>,
    /// Application (purchase) date
    #[serde(default)]
    pub application_date: Option<NaiveDate>,
    /// Extraction confidence
    pub confidence: Confidence,
    /// Why the analyzer assigned this confidence
    #[serde(default)]
    pub confidence_reason: String,
}

// =============================================================================
// INVESTMENT REPORT
// =============================================================================

/// The structured record produced by the analyzer for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReport {
    /// Aggregate total
    pub total: TotalInvested,
    /// Asset-class breakdown
    pub classification: AssetClassification,
    /// Equity holdings
    pub stocks: StockPortfolio,
    /// Fixed-income holdings
    pub fixed_income: FixedIncomePortfolio,
}

impl InvestmentReport {
    /// Describe required amounts that are negative.
    ///
    /// Amounts are advisory: the analyzer owns their correctness, so these
    /// are reported, not rejected.
    pub fn advisories(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut check = |label: String, value: Decimal| {
            if value.is_sign_negative() && !value.is_zero() {
                out.push(format!("{} is negative ({})", label, value));
            }
        };

        check("total.totalInvestedAmount".into(), self.total.total_invested_amount);
        check(
            "classification.totalInvested".into(),
            self.classification.total_invested,
        );
        for class in &self.classification.classes {
            check(format!("classification[{}].invested", class.asset_class_name), class.invested);
        }
        check("stocks.totalInvested".into(), self.stocks.total_invested);
        for stock in &self.stocks.stocks {
            check(format!("stocks[{}].totalInvested", stock.ticker), stock.total_invested);
        }
        check("fixedIncome.totalInvested".into(), self.fixed_income.total_invested);
        for asset in &self.fixed_income.assets {
            check(format!("fixedIncome[{}].investedAmount", asset.name), asset.invested_amount);
        }

        out
    }
}

// =============================================================================
// ANALYSIS RESULT
// =============================================================================

/// A stored analysis: the analyzer's record plus identity and lifetime.
///
/// Built once when the pipeline completes and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Identifier handed back to the caller
    pub analysis_id: AnalysisId,
    /// When the analysis completed
    pub created_at: DateTime<Utc>,
    /// When the result stops being retrievable
    pub expires_at: DateTime<Utc>,
    /// Aggregate total
    pub total: TotalInvested,
    /// Asset-class breakdown
    pub classification: AssetClassification,
    /// Equity holdings
    pub stocks: StockPortfolio,
    /// Fixed-income holdings
    pub fixed_income: FixedIncomePortfolio,
}

impl AnalysisResult {
    /// Stamp a report with an identifier and a lifetime starting now.
    pub fn new(
        analysis_id: AnalysisId,
        report: InvestmentReport,
        ttl: Duration,
    ) -> Result<Self, TraitError> {
        Self::created_at(analysis_id, report, Utc::now(), ttl)
    }

    /// Stamp a report with an explicit creation instant.
    pub fn created_at(
        analysis_id: AnalysisId,
        report: InvestmentReport,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TraitError> {
        if ttl.is_zero() {
            return Err(TraitError::InvalidInput("ttl must be positive".into()));
        }
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| TraitError::InvalidInput(format!("ttl out of range: {}", e)))?;
        let expires_at = created_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TraitError::InvalidInput("ttl out of range".into()))?;

        Ok(Self {
            analysis_id,
            created_at,
            expires_at,
            total: report.total,
            classification: report.classification,
            stocks: report.stocks,
            fixed_income: report.fixed_income,
        })
    }

    /// The analyzer's record, without identity or lifetime.
    pub fn report(&self) -> InvestmentReport {
        InvestmentReport {
            total: self.total.clone(),
            classification: self.classification.clone(),
            stocks: self.stocks.clone(),
            fixed_income: self.fixed_income.clone(),
        }
    }
}
