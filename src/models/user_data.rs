use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SWISS_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+41|0041|0)[1-9][0-9]{8}$").expect("valid phone regex"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    StreetAddress,
    CityPostal,
    Phone,
    Email,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::FirstName,
        Field::LastName,
        Field::StreetAddress,
        Field::CityPostal,
        Field::Phone,
        Field::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::StreetAddress => "street_address",
            Field::CityPostal => "city_postal",
            Field::Phone => "phone",
            Field::Email => "email",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "first_name" | "nome" => Some(Field::FirstName),
            "last_name" | "cognome" => Some(Field::LastName),
            "street_address" | "via_numero" => Some(Field::StreetAddress),
            "city_postal" | "paese_cap" => Some(Field::CityPostal),
            "phone" | "telefono" => Some(Field::Phone),
            "email" => Some(Field::Email),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::FirstName => "nome",
            Field::LastName => "cognome",
            Field::StreetAddress => "via e numero civico",
            Field::CityPostal => "paese e codice postale",
            Field::Phone => "telefono",
            Field::Email => "email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

type Setter = fn(&mut UserData, String) -> Result<(), ValidationError>;

// Order matches `Field::ALL`.
const SETTERS: [(Field, Setter); 6] = [
    (Field::FirstName, |d, v| {
        d.first_name = Some(v);
        Ok(())
    }),
    (Field::LastName, |d, v| {
        d.last_name = Some(v);
        Ok(())
    }),
    (Field::StreetAddress, |d, v| {
        d.street_address = Some(v);
        Ok(())
    }),
    (Field::CityPostal, |d, v| {
        d.city_postal = Some(v);
        Ok(())
    }),
    (Field::Phone, |d, v| {
        validate_phone(&v)?;
        d.phone = Some(v);
        Ok(())
    }),
    (Field::Email, |d, v| {
        validate_email(&v)?;
        d.email = Some(v);
        Ok(())
    }),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserData {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street_address: Option<String>,
    pub city_postal: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl UserData {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::FirstName => self.first_name.as_deref(),
            Field::LastName => self.last_name.as_deref(),
            Field::StreetAddress => self.street_address.as_deref(),
            Field::CityPostal => self.city_postal.as_deref(),
            Field::Phone => self.phone.as_deref(),
            Field::Email => self.email.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) -> Result<(), ValidationError> {
        let setter = SETTERS
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, s)| *s)
            .unwrap_or(|_, _| Ok(()));
        setter(self, value.into())
    }

    // `self` is never modified; the first invalid value wins.
    pub fn with_updates(&self, updates: &[(Field, String)]) -> Result<UserData, ValidationError> {
        let mut next = self.clone();
        for (field, value) in updates {
            next.set(*field, value.clone())?;
        }
        Ok(next)
    }

    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_some())
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn known_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        Field::ALL
            .iter()
            .filter_map(|f| {
                self.get(*f)
                    .map(|v| (f.as_str().to_string(), serde_json::Value::from(v)))
            })
            .collect()
    }

    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if SWISS_PHONE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError {
            field: Field::Phone,
            message: "Numero di telefono svizzero non valido. Formato: +41XXXXXXXXX o 0XXXXXXXXX"
                .to_string(),
        })
    }
}

fn validate_email(value: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError {
            field: Field::Email,
            message: "Indirizzo email non valido".to_string(),
        })
    }
}
