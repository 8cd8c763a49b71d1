use crate::compliance::CeCategory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub u64);

/// A completed continuing-education activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeRecord {
    pub id: RecordId,
    pub owner: UserId,
    pub tenant: TenantId,
    pub title: String,
    #[serde(default)]
    pub provider: String,
    pub category: CeCategory,
    pub hours: f64,
    /// `None` when the source carried no completion date.
    pub completed_on: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sponsor_approved: bool,
    /// Flagged as an ethics course independently of its category.
    #[serde(default)]
    pub ethics_course: bool,
    #[serde(default)]
    pub subject_area: String,
}

impl CeRecord {
    pub fn new(title: &str, category: CeCategory, hours: f64, completed_on: NaiveDate) -> Self {
        Self {
            id: RecordId(0),
            owner: UserId(0),
            tenant: TenantId(0),
            title: title.to_string(),
            provider: String::new(),
            category,
            hours,
            completed_on: Some(completed_on),
            description: String::new(),
            sponsor_approved: false,
            ethics_course: false,
            subject_area: String::new(),
        }
    }

    pub fn owned_by(mut self, owner: UserId, tenant: TenantId) -> Self {
        self.owner = owner;
        self.tenant = tenant;
        self
    }

    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    pub fn sponsor_approved(mut self) -> Self {
        self.sponsor_approved = true;
        self
    }

    pub fn ethics_course(mut self) -> Self {
        self.ethics_course = true;
        self
    }

    /// Same owner, title, completion date and hours.
    pub fn is_duplicate_of(&self, other: &CeRecord) -> bool {
        self.owner == other.owner
            && self.title == other.title
            && self.completed_on == other.completed_on
            && self.hours.to_bits() == other.hours.to_bits()
    }
}

/// Unvalidated record fields as entered by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub title: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub category: String,
    pub hours: f64,
    #[serde(default)]
    pub completed_on: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sponsor_approved: bool,
    #[serde(default)]
    pub ethics_course: bool,
    #[serde(default)]
    pub subject_area: String,
}
