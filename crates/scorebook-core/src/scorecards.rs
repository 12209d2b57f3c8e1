//! Scorecard CRUD service.
//!
//! Scorecards are user-designed tables: a list of typed fields and the
//! values entered for them. Every mutation is authorized against the
//! card's `created_by`; reads by id are open, and public cards can also be
//! fetched through their share token.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use scorebook_state::{
    FieldType, FieldValue, ScorecardField, ScorecardId, ScorecardKind, ScorecardRecord,
    ScorecardStore, ScorecardValue, StorageError, UserId,
};

use crate::domain::error::{Result, ScoreError};
use crate::obs;

/// A stored scorecard as the service hands it out.
pub type Scorecard = ScorecardRecord;

/// Field definition supplied by a caller. Ids are generated when absent and
/// `order` always follows list position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            id: None,
            name: name.into(),
            field_type,
            options: None,
            required,
        }
    }
}

/// Starter fields for each kind of scorecard.
pub fn template_fields(kind: ScorecardKind) -> Vec<FieldSpec> {
    let team = FieldSpec::new("Team Name", FieldType::Text, true);
    match kind {
        ScorecardKind::Cricket => vec![
            team,
            FieldSpec::new("Runs", FieldType::Number, true),
            FieldSpec::new("Wickets", FieldType::Number, true),
            FieldSpec::new("Overs", FieldType::Number, true),
        ],
        ScorecardKind::Football => vec![
            team,
            FieldSpec::new("Goals", FieldType::Number, true),
            FieldSpec::new("Yellow Cards", FieldType::Number, false),
            FieldSpec::new("Red Cards", FieldType::Number, false),
        ],
        ScorecardKind::Custom => vec![team, FieldSpec::new("Score", FieldType::Number, true)],
    }
}

/// Input for [`ScorecardService::create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScorecard {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ScorecardKind,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub values: Vec<ScorecardValue>,
    #[serde(default)]
    pub is_public: bool,
}

impl NewScorecard {
    /// A card of `kind` carrying that kind's template fields.
    pub fn from_template(title: impl Into<String>, kind: ScorecardKind) -> Self {
        Self {
            title: title.into(),
            description: None,
            kind,
            fields: template_fields(kind),
            values: Vec::new(),
            is_public: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update. Only the parts that are `Some` are replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `Some("")` clears the description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<ScorecardValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Convert raw text into a value of the field's type.
///
/// Checkboxes accept `true`/`false`, `yes`/`no` and `1`/`0`. Select values
/// must be one of the field's options when it has any.
pub fn parse_field_value(field: &ScorecardField, raw: &str) -> Result<FieldValue> {
    let raw = raw.trim();
    let value = match field.field_type {
        FieldType::Number => raw.parse::<f64>().map(FieldValue::Number).map_err(|_| {
            ScoreError::validation(format!("{}: '{raw}' is not a number", field.name))
        })?,
        FieldType::Checkbox => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => FieldValue::Bool(true),
            "false" | "no" | "0" => FieldValue::Bool(false),
            _ => {
                return Err(ScoreError::validation(format!(
                    "{}: '{raw}' is not a checkbox value",
                    field.name
                )))
            }
        },
        FieldType::Text | FieldType::Select => FieldValue::Text(raw.to_string()),
    };
    check_value(field, &value)?;
    Ok(value)
}

fn check_value(field: &ScorecardField, value: &FieldValue) -> Result<()> {
    let fits = matches!(
        (field.field_type, value),
        (FieldType::Number, FieldValue::Number(_))
            | (FieldType::Checkbox, FieldValue::Bool(_))
            | (FieldType::Text, FieldValue::Text(_))
            | (FieldType::Select, FieldValue::Text(_))
    );
    if !fits {
        return Err(ScoreError::validation(format!(
            "{}: value {value} does not match field type {:?}",
            field.name, field.field_type
        )));
    }
    if let (FieldType::Select, FieldValue::Text(choice), Some(options)) =
        (field.field_type, value, &field.options)
    {
        if !options.iter().any(|o| o == choice) {
            return Err(ScoreError::validation(format!(
                "{}: '{choice}' is not one of {}",
                field.name,
                options.join(", ")
            )));
        }
    }
    Ok(())
}

fn build_fields(specs: Vec<FieldSpec>) -> Result<Vec<ScorecardField>> {
    if specs.is_empty() {
        return Err(ScoreError::validation("a scorecard needs at least one field"));
    }

    let mut fields: Vec<ScorecardField> = Vec::with_capacity(specs.len());
    for (order, def) in specs.into_iter().enumerate() {
        let name = def.name.trim().to_string();
        if name.is_empty() {
            return Err(ScoreError::validation(format!("field {order} has no name")));
        }
        let id = def
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        if fields.iter().any(|f| f.id == id) {
            return Err(ScoreError::validation(format!("duplicate field id {id}")));
        }
        fields.push(ScorecardField {
            id,
            name,
            field_type: def.field_type,
            options: def.options,
            required: def.required,
            order: order as u32,
        });
    }
    Ok(fields)
}

fn check_values(fields: &[ScorecardField], values: &[ScorecardValue]) -> Result<()> {
    for v in values {
        let field = fields
            .iter()
            .find(|f| f.id == v.field_id)
            .ok_or_else(|| ScoreError::validation(format!("unknown field id {}", v.field_id)))?;
        check_value(field, &v.value)?;
    }
    Ok(())
}

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ScoreError::validation("title is required"));
    }
    Ok(title.to_string())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Find a field by id, or by name ignoring case.
pub fn resolve_field<'a>(card: &'a Scorecard, key: &str) -> Option<&'a ScorecardField> {
    card.fields
        .iter()
        .find(|f| f.id == key)
        .or_else(|| card.fields.iter().find(|f| f.name.eq_ignore_ascii_case(key)))
}

/// Scorecard operations over a [`ScorecardStore`].
pub struct ScorecardService<S> {
    store: S,
}

impl<S> ScorecardService<S>
where
    S: ScorecardStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input), fields(owner = %owner, title = %input.title))]
    pub async fn create(&self, owner: &UserId, input: NewScorecard) -> Result<Scorecard> {
        let title = clean_title(&input.title)?;
        let fields = build_fields(input.fields)?;
        check_values(&fields, &input.values)?;

        let now = Utc::now();
        let record = ScorecardRecord {
            id: ScorecardId::new(),
            title,
            description: clean_description(input.description),
            kind: input.kind,
            fields,
            values: input.values,
            created_by: owner.clone(),
            is_public: input.is_public,
            share_token: None,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert(record).await?;
        obs::emit_scorecard_created(&stored.id.0, &owner.0);
        Ok(stored)
    }

    pub async fn get(&self, id: &ScorecardId) -> Result<Scorecard> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ScoreError::ScorecardNotFound(id.to_string()))
    }

    /// Fetch a public card by share token.
    pub async fn get_shared(&self, token: &str) -> Result<Scorecard> {
        match self.store.get_by_share_token(token).await? {
            Some(card) if card.is_public => Ok(card),
            _ => Err(ScoreError::SharedScorecardNotFound(token.to_string())),
        }
    }

    /// The owner's cards, newest first.
    pub async fn list(&self, owner: &UserId) -> Result<Vec<Scorecard>> {
        Ok(self.store.list_by_owner(owner).await?)
    }

    async fn owned(&self, owner: &UserId, id: &ScorecardId) -> Result<Scorecard> {
        let card = self.get(id).await?;
        if card.created_by != *owner {
            return Err(ScoreError::Forbidden {
                id: id.to_string(),
                owner: owner.to_string(),
            });
        }
        Ok(card)
    }

    async fn write(&self, mut card: Scorecard) -> Result<Scorecard> {
        card.updated_at = Utc::now();
        match self.store.replace(card).await {
            Ok(card) => Ok(card),
            Err(StorageError::ScorecardNotFound { id }) => Err(ScoreError::ScorecardNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial update.
    ///
    /// Replacing `fields` drops values whose field no longer exists, unless
    /// the patch also supplies `values`.
    #[instrument(skip(self, patch), fields(owner = %owner, scorecard_id = %id))]
    pub async fn update(
        &self,
        owner: &UserId,
        id: &ScorecardId,
        patch: ScorecardPatch,
    ) -> Result<Scorecard> {
        let mut card = self.owned(owner, id).await?;

        if let Some(title) = patch.title {
            card.title = clean_title(&title)?;
        }
        if patch.description.is_some() {
            card.description = clean_description(patch.description);
        }
        if let Some(specs) = patch.fields {
            card.fields = build_fields(specs)?;
            let fields = &card.fields;
            card.values.retain(|v| fields.iter().any(|f| f.id == v.field_id));
        }
        if let Some(values) = patch.values {
            card.values = values;
        }
        check_values(&card.fields, &card.values)?;
        if let Some(is_public) = patch.is_public {
            card.is_public = is_public;
        }

        self.write(card).await
    }

    /// Set individual values from raw text, addressing fields by id or name.
    /// Values for other fields are kept.
    #[instrument(skip(self, entries), fields(owner = %owner, scorecard_id = %id))]
    pub async fn set_values(
        &self,
        owner: &UserId,
        id: &ScorecardId,
        entries: &[(String, String)],
    ) -> Result<Scorecard> {
        let mut card = self.owned(owner, id).await?;

        for (key, raw) in entries {
            let field = resolve_field(&card, key)
                .ok_or_else(|| ScoreError::validation(format!("no field named {key}")))?;
            let value = parse_field_value(field, raw)?;
            let field_id = field.id.clone();
            match card.values.iter_mut().find(|v| v.field_id == field_id) {
                Some(existing) => existing.value = value,
                None => card.values.push(ScorecardValue { field_id, value }),
            }
        }

        self.write(card).await
    }

    /// Issue a fresh share token and make the card public.
    #[instrument(skip(self), fields(owner = %owner, scorecard_id = %id))]
    pub async fn share(&self, owner: &UserId, id: &ScorecardId) -> Result<String> {
        let mut card = self.owned(owner, id).await?;
        let token = Uuid::new_v4().to_string();
        card.share_token = Some(token.clone());
        card.is_public = true;
        self.write(card).await?;
        obs::emit_scorecard_shared(&id.0);
        Ok(token)
    }

    #[instrument(skip(self), fields(owner = %owner, scorecard_id = %id))]
    pub async fn delete(&self, owner: &UserId, id: &ScorecardId) -> Result<()> {
        self.owned(owner, id).await?;
        if !self.store.delete(id).await? {
            return Err(ScoreError::ScorecardNotFound(id.to_string()));
        }
        obs::emit_scorecard_deleted(&id.0);
        Ok(())
    }
}
