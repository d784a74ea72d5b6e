//! Custody request ("solicitação") entity type

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::identity::RecordId;

/// Request lifecycle flag. Both states may move to the other at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    #[serde(rename = "Em Curso", alias = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "Finalizado", alias = "FINISHED")]
    Finished,
}

impl RequestStatus {
    pub fn all() -> &'static [RequestStatus] {
        &[RequestStatus::InProgress, RequestStatus::Finished]
    }

    /// Display label, as stored
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::InProgress => "Em Curso",
            RequestStatus::Finished => "Finalizado",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "in-progress" | "em curso" | "em-curso" => Ok(RequestStatus::InProgress),
            "finished" | "finalizado" => Ok(RequestStatus::Finished),
            _ => Err(format!("Unknown status: {} (valid: in-progress, finished)", s)),
        }
    }
}

/// Processing stage attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Treatment {
    #[default]
    #[serde(rename = "Preparação Z1")]
    PreparacaoZ1,
    #[serde(rename = "Preparação Z2")]
    PreparacaoZ2,
    #[serde(rename = "Consulta Z1")]
    ConsultaZ1,
    #[serde(rename = "Consulta Z2")]
    ConsultaZ2,
    #[serde(rename = "Sala Reuniões")]
    SalaReunioes,
    #[serde(rename = "Controlo de Qualidade")]
    ControloQualidade,
    #[serde(rename = "Sala DG")]
    SalaDg,
    #[serde(rename = "Serviços Exterior")]
    ServicosExterior,
    #[serde(rename = "Digitalização")]
    Digitalizacao,
    #[serde(rename = "Indexação")]
    Indexacao,
}

impl Treatment {
    pub fn all() -> &'static [Treatment] {
        &[
            Treatment::PreparacaoZ1,
            Treatment::PreparacaoZ2,
            Treatment::ConsultaZ1,
            Treatment::ConsultaZ2,
            Treatment::SalaReunioes,
            Treatment::ControloQualidade,
            Treatment::SalaDg,
            Treatment::ServicosExterior,
            Treatment::Digitalizacao,
            Treatment::Indexacao,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Treatment::PreparacaoZ1 => "Preparação Z1",
            Treatment::PreparacaoZ2 => "Preparação Z2",
            Treatment::ConsultaZ1 => "Consulta Z1",
            Treatment::ConsultaZ2 => "Consulta Z2",
            Treatment::SalaReunioes => "Sala Reuniões",
            Treatment::ControloQualidade => "Controlo de Qualidade",
            Treatment::SalaDg => "Sala DG",
            Treatment::ServicosExterior => "Serviços Exterior",
            Treatment::Digitalizacao => "Digitalização",
            Treatment::Indexacao => "Indexação",
        }
    }

    /// Command-line slug, e.g. `controlo-de-qualidade`
    pub fn slug(&self) -> &'static str {
        match self {
            Treatment::PreparacaoZ1 => "preparacao-z1",
            Treatment::PreparacaoZ2 => "preparacao-z2",
            Treatment::ConsultaZ1 => "consulta-z1",
            Treatment::ConsultaZ2 => "consulta-z2",
            Treatment::SalaReunioes => "sala-reunioes",
            Treatment::ControloQualidade => "controlo-de-qualidade",
            Treatment::SalaDg => "sala-dg",
            Treatment::ServicosExterior => "servicos-exterior",
            Treatment::Digitalizacao => "digitalizacao",
            Treatment::Indexacao => "indexacao",
        }
    }
}

impl std::fmt::Display for Treatment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Treatment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Treatment::all()
            .iter()
            .copied()
            .find(|t| t.slug() == wanted || t.label().to_lowercase() == wanted)
            .ok_or_else(|| {
                let valid: Vec<_> = Treatment::all().iter().map(|t| t.slug()).collect();
                format!("Unknown treatment: {} (valid: {})", s, valid.join(", "))
            })
    }
}

/// Fields supplied when registering a request
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    pub caixa: String,
    pub cliente: String,
    pub localizacao_origem: String,
    pub localizacao_atual: String,
    pub sector: String,
    pub solicitante: String,
    pub tratamento: Treatment,
    pub operador: String,
    /// Nominal start date; `None` means the creation day
    pub data_inicio: Option<NaiveDate>,
    pub estado: RequestStatus,
}

/// A stored custody request.
///
/// `sector` and `solicitante` are copies of entity names taken at creation
/// time, not references. `data_atual` and `dias` are frozen at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: RecordId,

    /// Box number
    pub caixa: String,

    /// Client name
    pub cliente: String,

    #[serde(default)]
    pub localizacao_origem: String,

    #[serde(default)]
    pub localizacao_atual: String,

    pub sector: String,

    pub solicitante: String,

    #[serde(default)]
    pub tratamento: Treatment,

    #[serde(default)]
    pub operador: String,

    pub data_inicio: NaiveDate,

    pub data_atual: NaiveDate,

    pub dias: u32,

    #[serde(default)]
    pub estado: RequestStatus,
}
