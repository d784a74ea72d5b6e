//! Request Store: custody requests, most recent first

use chrono::{DateTime, NaiveDate, Utc};
use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::{IdPrefix, RecordId};
use crate::entities::request::{RequestDraft, RequestRecord, RequestStatus};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Fields that must be non-empty, in the order they are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Caixa,
    Cliente,
    Sector,
    Solicitante,
}

impl RequiredField {
    pub fn name(&self) -> &'static str {
        match self {
            RequiredField::Caixa => "caixa",
            RequiredField::Cliente => "cliente",
            RequiredField::Sector => "sector",
            RequiredField::Solicitante => "solicitante",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejections raised when registering a request
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum RequestError {
    #[error("required field '{0}' is empty")]
    #[diagnostic(
        code(gestdoc::request::missing_field),
        help("caixa, cliente, sector and solicitante are all required.")
    )]
    MissingRequiredField(RequiredField),
}

/// Whole days between `start` (taken as midnight UTC) and `now`, rounded up.
///
/// A request started today and registered at 14:00 therefore counts one day.
pub fn elapsed_days(start: NaiveDate, now: DateTime<Utc>) -> u32 {
    let start = start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let millis = (now - start).num_milliseconds().unsigned_abs();
    let days = millis.div_ceil(MILLIS_PER_DAY as u64);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Check required fields in fixed order, reporting the first empty one
pub fn validate(draft: &RequestDraft) -> Result<(), RequestError> {
    let checks = [
        (RequiredField::Caixa, &draft.caixa),
        (RequiredField::Cliente, &draft.cliente),
        (RequiredField::Sector, &draft.sector),
        (RequiredField::Solicitante, &draft.solicitante),
    ];
    for (field, value) in checks {
        if value.trim().is_empty() {
            return Err(RequestError::MissingRequiredField(field));
        }
    }
    Ok(())
}

/// Flat collection of requests, index 0 is the most recent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStore {
    records: Vec<RequestRecord>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<RequestRecord>) -> Self {
        Self { records }
    }

    pub fn all(&self) -> &[RequestRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&RequestRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Validate and register a request at the front of the collection.
    ///
    /// `data_atual` and `dias` are computed from `now` and never updated.
    pub fn create(
        &mut self,
        draft: RequestDraft,
        now: DateTime<Utc>,
    ) -> Result<&RequestRecord, RequestError> {
        validate(&draft)?;

        let today = now.date_naive();
        let data_inicio = draft.data_inicio.unwrap_or(today);

        let record = RequestRecord {
            id: RecordId::new(IdPrefix::Sol),
            caixa: draft.caixa.trim().to_string(),
            cliente: draft.cliente.trim().to_string(),
            localizacao_origem: draft.localizacao_origem.trim().to_string(),
            localizacao_atual: draft.localizacao_atual.trim().to_string(),
            sector: draft.sector.trim().to_string(),
            solicitante: draft.solicitante.trim().to_string(),
            tratamento: draft.tratamento,
            operador: draft.operador.trim().to_string(),
            data_inicio,
            data_atual: today,
            dias: elapsed_days(data_inicio, now),
            estado: draft.estado,
        };

        self.records.insert(0, record);
        Ok(&self.records[0])
    }

    /// Remove the matching record; returns whether one was removed
    pub fn delete(&mut self, id: &RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        before != self.records.len()
    }

    /// Replace `estado` on the matching record; returns whether it exists
    pub fn update_status(&mut self, id: &RecordId, status: RequestStatus) -> bool {
        match self.records.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.estado = status;
                true
            }
            None => false,
        }
    }

    /// Full scan with a predicate
    pub fn query<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a RequestRecord> + 'a
    where
        P: Fn(&RequestRecord) -> bool + 'a,
    {
        self.records.iter().filter(move |r| predicate(r))
    }

    pub fn count_by_status(&self, status: RequestStatus) -> usize {
        self.query(|r| r.estado == status).count()
    }
}
