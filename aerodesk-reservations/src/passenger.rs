use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aerodesk_core::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Dni,
    Passport,
    CivicBooklet,
    EnrollmentBook,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Dni => "DNI",
            DocumentType::Passport => "PASSPORT",
            DocumentType::CivicBooklet => "CIVIC_BOOKLET",
            DocumentType::EnrollmentBook => "ENROLLMENT_BOOK",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "DNI" => Ok(DocumentType::Dni),
            "PASSPORT" => Ok(DocumentType::Passport),
            "CIVIC_BOOKLET" => Ok(DocumentType::CivicBooklet),
            "ENROLLMENT_BOOK" => Ok(DocumentType::EnrollmentBook),
            other => Err(CoreError::internal(format!(
                "unknown document type: {other}"
            ))),
        }
    }
}

/// A passenger, optionally linked 1:1 to a system user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub document_type: DocumentType,
    pub document: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl Passenger {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let born = self.date_of_birth?;
        let mut age = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            age -= 1;
        }
        Some(age)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPassenger {
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub document_type: DocumentType,
    pub document: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Updatable passenger fields. `document` and `email` are identity fields:
/// the store rejects changing them once any reservation references the
/// passenger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassengerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<DocumentType>,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl PassengerPatch {
    pub fn touches_identity(&self) -> bool {
        self.document.is_some() || self.email.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_derivation() {
        let p = Passenger {
            id: Uuid::new_v4(),
            user_id: None,
            first_name: "Ana".to_string(),
            last_name: "Paz".to_string(),
            document_type: DocumentType::Dni,
            document: "30111222".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15),
        };
        let before_birthday = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        let after_birthday = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(p.age_on(before_birthday), Some(35));
        assert_eq!(p.age_on(after_birthday), Some(36));
    }

    #[test]
    fn test_age_unknown_without_birth_date() {
        let p = Passenger {
            id: Uuid::new_v4(),
            user_id: None,
            first_name: "Ana".to_string(),
            last_name: "Paz".to_string(),
            document_type: DocumentType::Passport,
            document: "AA123456".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            date_of_birth: None,
        };
        assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()), None);
    }

    #[test]
    fn test_identity_patch_detection() {
        assert!(!PassengerPatch::default().touches_identity());
        let patch = PassengerPatch {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        assert!(patch.touches_identity());
    }
}
