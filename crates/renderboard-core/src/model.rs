use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

/// One asset-generation job document, as fetched.
///
/// Every field is optional. Scalars of the wrong JSON type decode to `None`,
/// nested blocks of the wrong shape are dropped, and the numeric/timestamp
/// fields are kept raw so the enrichment passes can coerce them leniently.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(rename = "_id", deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub job_id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub user_id: Option<String>,
    pub created_at: Option<Value>,
    pub updated_at: Option<Value>,
    #[serde(deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::nested")]
    pub model_config: Option<ModelConfig>,
    #[serde(deserialize_with = "lenient::nested")]
    pub quality_analysis: Option<QualityAnalysis>,
    pub result_downloaded_at: Option<Value>,
    #[serde(deserialize_with = "lenient::nested")]
    pub error: Option<JobError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub model_title: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub model_type: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub output_type: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub provider: Option<String>,
    pub inputs: Option<Value>,
    #[serde(deserialize_with = "lenient::nested")]
    pub cost_config: Option<CostConfig>,
    #[serde(deserialize_with = "lenient::nested")]
    pub model_meta_data: Option<ModelMetaData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CostConfig {
    pub default_cost: Option<Value>,
    pub rules: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelMetaData {
    #[serde(rename = "openAIModelId", deserialize_with = "lenient::string")]
    pub openai_model_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityAnalysis {
    pub score: Option<Value>,
    pub rewritten_prompt: Option<Value>,
    #[serde(deserialize_with = "lenient::string")]
    pub reasoning: Option<String>,
    pub transformed_score: Option<Value>,
    #[serde(deserialize_with = "lenient::string")]
    pub quality_check_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobError {
    #[serde(deserialize_with = "lenient::string")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub message: Option<String>,
}

impl JobRecord {
    /// Decodes a store document. A document that is not an object yields an empty record.
    pub fn from_document(doc: Value) -> Self {
        match serde_json::from_value(doc) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(event = "record_decode_failed", error = %e);
                Self::default()
            }
        }
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_config.as_ref()?.id.as_deref()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_config.as_ref()?.name.as_deref()
    }

    pub fn model_title(&self) -> Option<&str> {
        self.model_config.as_ref()?.model_title.as_deref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.model_config.as_ref()?.provider.as_deref()
    }

    pub fn inputs(&self) -> Option<&Value> {
        self.model_config.as_ref()?.inputs.as_ref()
    }

    pub fn openai_model_id(&self) -> Option<&str> {
        self.model_config
            .as_ref()?
            .model_meta_data
            .as_ref()?
            .openai_model_id
            .as_deref()
    }

    pub fn default_cost_raw(&self) -> Option<&Value> {
        self.model_config
            .as_ref()?
            .cost_config
            .as_ref()?
            .default_cost
            .as_ref()
    }

    pub fn quality_score_raw(&self) -> Option<&Value> {
        self.quality_analysis.as_ref()?.score.as_ref()
    }

    pub fn rewritten_prompt_raw(&self) -> Option<&Value> {
        self.quality_analysis.as_ref()?.rewritten_prompt.as_ref()
    }
}

/// Task-type tag inferred from the model id / name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    T2i,
    I2i,
    I2v,
    V2v,
    T2v,
    T2s,
    S2v,
    Minimatics,
    CharacterModels,
    SoundEffects,
    Unknown,
}

impl TaskType {
    pub const ALL: [TaskType; 11] = [
        TaskType::T2i,
        TaskType::I2i,
        TaskType::I2v,
        TaskType::V2v,
        TaskType::T2v,
        TaskType::T2s,
        TaskType::S2v,
        TaskType::Minimatics,
        TaskType::CharacterModels,
        TaskType::SoundEffects,
        TaskType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::T2i => "t2i",
            TaskType::I2i => "i2i",
            TaskType::I2v => "i2v",
            TaskType::V2v => "v2v",
            TaskType::T2v => "t2v",
            TaskType::T2s => "t2s",
            TaskType::S2v => "s2v",
            TaskType::Minimatics => "minimatics",
            TaskType::CharacterModels => "character_models",
            TaskType::SoundEffects => "sound_effects",
            TaskType::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Task types offered for the per-task breakdown.
    pub fn is_main(&self) -> bool {
        crate::constants::MAIN_MODEL_TYPES.contains(self)
    }

    pub fn bucket(&self) -> TaskBucket {
        TaskBucket::from(*self)
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown task type '{s}'"))
    }
}

/// Display bucket: the aggregated task types pass through, the rest fold into `Other`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskBucket {
    T2i,
    I2i,
    I2v,
    V2v,
    T2v,
    Other,
}

impl TaskBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskBucket::T2i => "t2i",
            TaskBucket::I2i => "i2i",
            TaskBucket::I2v => "i2v",
            TaskBucket::V2v => "v2v",
            TaskBucket::T2v => "t2v",
            TaskBucket::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t2i" => Some(TaskBucket::T2i),
            "i2i" => Some(TaskBucket::I2i),
            "i2v" => Some(TaskBucket::I2v),
            "v2v" => Some(TaskBucket::V2v),
            "t2v" => Some(TaskBucket::T2v),
            "other" => Some(TaskBucket::Other),
            _ => None,
        }
    }
}

impl From<TaskType> for TaskBucket {
    fn from(t: TaskType) -> Self {
        match t {
            TaskType::T2i => TaskBucket::T2i,
            TaskType::I2i => TaskBucket::I2i,
            TaskType::I2v => TaskBucket::I2v,
            TaskType::V2v => TaskBucket::V2v,
            TaskType::T2v => TaskBucket::T2v,
            _ => TaskBucket::Other,
        }
    }
}

impl std::fmt::Display for TaskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown task bucket '{s}'"))
    }
}

/// A job record plus every derived column.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRow {
    #[serde(flatten)]
    pub record: JobRecord,
    #[serde(rename = "created_at")]
    pub created_at_utc: Option<DateTime<Utc>>,
    pub dt: Option<String>,
    pub iso_year: Option<i32>,
    pub iso_week: Option<String>,
    pub week_start: Option<NaiveDate>,
    pub model_type: TaskType,
    pub model_type_agg: TaskBucket,
    pub model_title_extracted: Option<String>,
    pub default_cost: Option<f64>,
    pub quality_score: Option<f64>,
    pub was_downloaded: bool,
    pub has_rewrite: bool,
}

impl EnrichedRow {
    pub fn date(&self) -> Option<NaiveDate> {
        self.created_at_utc.map(|t| t.date_naive())
    }

    pub fn title(&self) -> Option<&str> {
        self.model_title_extracted.as_deref()
    }
}
