//! Reference-data entity type (sectors, warehouses, requesters, ...)

use serde::{Deserialize, Serialize};

use crate::core::identity::{IdPrefix, RecordId};

/// The closed set of reference-data categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "armazens", alias = "warehouse")]
    Warehouse,
    #[serde(rename = "clientes", alias = "client")]
    Client,
    #[serde(rename = "sectores", alias = "sector")]
    Sector,
    #[serde(rename = "operadores", alias = "operator")]
    Operator,
    #[serde(rename = "solicitantes", alias = "requester")]
    Requester,
    #[serde(rename = "contatos", alias = "contact")]
    Contact,
    #[serde(rename = "usuarios", alias = "user")]
    User,
}

impl EntityType {
    /// Get all entity types, in the order the management screens list them
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::Warehouse,
            EntityType::Client,
            EntityType::Sector,
            EntityType::Operator,
            EntityType::Requester,
            EntityType::Contact,
            EntityType::User,
        ]
    }

    /// Stored bucket label
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Warehouse => "armazens",
            EntityType::Client => "clientes",
            EntityType::Sector => "sectores",
            EntityType::Operator => "operadores",
            EntityType::Requester => "solicitantes",
            EntityType::Contact => "contatos",
            EntityType::User => "usuarios",
        }
    }

    /// English singular name used on the command line
    pub fn singular(&self) -> &'static str {
        match self {
            EntityType::Warehouse => "warehouse",
            EntityType::Client => "client",
            EntityType::Sector => "sector",
            EntityType::Operator => "operator",
            EntityType::Requester => "requester",
            EntityType::Contact => "contact",
            EntityType::User => "user",
        }
    }

    /// Human label for headings
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Warehouse => "Armazéns",
            EntityType::Client => "Clientes",
            EntityType::Sector => "Sectores",
            EntityType::Operator => "Operadores",
            EntityType::Requester => "Solicitantes",
            EntityType::Contact => "WhatsApp",
            EntityType::User => "Usuários",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.singular())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        EntityType::all()
            .iter()
            .copied()
            .find(|t| {
                lower == t.singular() || lower == t.as_str() || lower == format!("{}s", t.singular())
            })
            .ok_or_else(|| {
                format!(
                    "Unknown entity type: {} (valid: warehouse, client, sector, operator, requester, contact, user)",
                    s
                )
            })
    }
}

/// A reference-data record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Unique identifier
    pub id: RecordId,

    /// Display name, unique per type (case-insensitive)
    pub name: String,

    /// Category
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Owning sector, for requesters only. Soft reference: may dangle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,

    /// Phone digits, for contacts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Entity {
    /// Create a new entity with a freshly generated id.
    ///
    /// `parent_id` is kept only for requesters and `phone` only for contacts;
    /// the phone is reduced to its digits.
    pub fn new(
        entity_type: EntityType,
        name: String,
        parent_id: Option<RecordId>,
        phone: Option<&str>,
    ) -> Self {
        let parent_id = match entity_type {
            EntityType::Requester => parent_id,
            _ => None,
        };
        let phone = match entity_type {
            EntityType::Contact => phone.map(digits_only).filter(|p| !p.is_empty()),
            _ => None,
        };

        Self {
            id: RecordId::new(IdPrefix::Ent),
            name,
            entity_type,
            parent_id,
            phone,
        }
    }

    /// Build one of the fixed seed records
    pub(crate) fn seed(id: &str, name: &str, entity_type: EntityType) -> Self {
        Self {
            id: RecordId::from(id),
            name: name.to_string(),
            entity_type,
            parent_id: None,
            phone: None,
        }
    }

    /// Case-insensitive name comparison used for duplicate detection
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// Keep only the ASCII digits of a string
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
