use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Credential (or membership) whose renewal rules are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DesignationCode {
    #[serde(rename = "CFP")]
    Cfp,
    #[serde(rename = "CPA")]
    Cpa,
    #[serde(rename = "EA")]
    Ea,
    #[serde(rename = "CEP")]
    Cep,
    #[serde(rename = "ECA")]
    Eca,
    #[serde(rename = "CFA")]
    Cfa,
    #[serde(rename = "CLU")]
    Clu,
    #[serde(rename = "ChFC")]
    Chfc,
    #[serde(rename = "CIMA")]
    Cima,
    #[serde(rename = "CIMC")]
    Cimc,
    #[serde(rename = "CPWA")]
    Cpwa,
    #[serde(rename = "CRPS")]
    Crps,
    #[serde(rename = "RICP")]
    Ricp,
    #[serde(rename = "CDFA")]
    Cdfa,
    #[serde(rename = "AIF")]
    Aif,
    #[serde(rename = "IAR")]
    Iar,
    #[serde(rename = "CLE")]
    Cle,
    #[serde(rename = "NAPFA")]
    Napfa,
}

impl DesignationCode {
    pub const fn ordered() -> [Self; 18] {
        [
            Self::Cfp,
            Self::Cfa,
            Self::Cpa,
            Self::Cle,
            Self::Clu,
            Self::Ea,
            Self::Chfc,
            Self::Cima,
            Self::Cimc,
            Self::Cpwa,
            Self::Crps,
            Self::Ricp,
            Self::Cdfa,
            Self::Aif,
            Self::Iar,
            Self::Cep,
            Self::Eca,
            Self::Napfa,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cfp => "CFP",
            Self::Cpa => "CPA",
            Self::Ea => "EA",
            Self::Cep => "CEP",
            Self::Eca => "ECA",
            Self::Cfa => "CFA",
            Self::Clu => "CLU",
            Self::Chfc => "ChFC",
            Self::Cima => "CIMA",
            Self::Cimc => "CIMC",
            Self::Cpwa => "CPWA",
            Self::Crps => "CRPS",
            Self::Ricp => "RICP",
            Self::Cdfa => "CDFA",
            Self::Aif => "AIF",
            Self::Iar => "IAR",
            Self::Cle => "CLE",
            Self::Napfa => "NAPFA",
        }
    }
}

impl fmt::Display for DesignationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown designation '{0}'")]
pub struct UnknownDesignationCode(pub String);

impl FromStr for DesignationCode {
    type Err = UnknownDesignationCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownDesignationCode(trimmed.to_string()))
    }
}

/// Subject area a CE record is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeCategory {
    Ethics,
    FinancialPlanning,
    Investments,
    Tax,
    Retirement,
    Insurance,
    EstatePlanning,
    Accounting,
    Legal,
    ProductKnowledge,
    General,
}

impl CeCategory {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::Ethics,
            Self::FinancialPlanning,
            Self::Investments,
            Self::Tax,
            Self::Retirement,
            Self::Insurance,
            Self::EstatePlanning,
            Self::Accounting,
            Self::Legal,
            Self::ProductKnowledge,
            Self::General,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ethics => "Ethics",
            Self::FinancialPlanning => "Financial Planning",
            Self::Investments => "Investments",
            Self::Tax => "Tax",
            Self::Retirement => "Retirement",
            Self::Insurance => "Insurance",
            Self::EstatePlanning => "Estate Planning",
            Self::Accounting => "Accounting",
            Self::Legal => "Legal",
            Self::ProductKnowledge => "Product Knowledge",
            Self::General => "General",
        }
    }

    /// Match free-form category text against the known aliases.
    pub fn from_alias(value: &str) -> Option<Self> {
        let normalized = normalize(value);
        let category = match normalized.as_str() {
            "ethics" | "professional ethics" | "ethics regulation" => Self::Ethics,
            "financial planning" | "planning" | "fp" | "general financial planning" => {
                Self::FinancialPlanning
            }
            "investments" | "investment" | "investment planning" | "portfolio management" => {
                Self::Investments
            }
            "tax" | "taxes" | "taxation" | "tax planning" | "federal tax" => Self::Tax,
            "retirement" | "retirement planning" | "retirement income" => Self::Retirement,
            "insurance" | "insurance planning" | "risk management" => Self::Insurance,
            "estate" | "estate planning" | "estates trusts" => Self::EstatePlanning,
            "accounting" | "auditing" | "accounting auditing" => Self::Accounting,
            "legal" | "law" | "regulatory" | "regulation" => Self::Legal,
            "products" | "product knowledge" | "products knowledge" => Self::ProductKnowledge,
            "" | "general" | "other" | "uncategorized" | "elective" => Self::General,
            _ => return None,
        };
        Some(category)
    }

    /// Classify a record from its category text and title.
    ///
    /// Any mention of ethics in either field files the record under
    /// [`CeCategory::Ethics`]; otherwise the category text is matched against
    /// known aliases and unknown text falls back to [`CeCategory::General`].
    pub fn classify(category: &str, title: &str) -> Self {
        let mentions_ethics = |text: &str| text.to_ascii_lowercase().contains("ethics");
        if mentions_ethics(category) || mentions_ethics(title) {
            return Self::Ethics;
        }

        Self::from_alias(category).unwrap_or(Self::General)
    }
}

fn normalize(value: &str) -> String {
    let replaced = value.replace(['_', '-', '&', '/'], " ");
    replaced
        .split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("and"))
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Links a user to a designation profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDesignation {
    pub code: DesignationCode,
    /// Date the designation was acquired or last renewed.
    pub acquired_on: NaiveDate,
    #[serde(default)]
    pub birth_month: Option<u32>,
    #[serde(default)]
    pub credential_number: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl UserDesignation {
    pub fn new(code: DesignationCode, acquired_on: NaiveDate) -> Self {
        Self {
            code,
            acquired_on,
            birth_month: None,
            credential_number: None,
            state: None,
        }
    }

    pub fn with_birth_month(mut self, month: u32) -> Self {
        self.birth_month = Some(month);
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into().trim().to_ascii_uppercase());
        self
    }
}

/// Half-open renewal window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComplianceCycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ComplianceCycle {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Last day inside the window, as shown to users.
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start)
    }

    pub fn is_closed(&self, as_of: NaiveDate) -> bool {
        self.end <= as_of
    }
}
