//! Task-type classification and display-title resolution.
//!
//! Both are ordered rule tables evaluated top to bottom, first match wins.
//! The order encodes precedence between overlapping heuristics and must not
//! be rearranged.

use serde_json::Value;

use crate::lenient;
use crate::model::{JobRecord, TaskType};

struct TaskRule {
    /// Substring searched in the lower-cased model id.
    id_token: Option<&'static str>,
    /// Phrase searched in the model name, case-sensitive.
    name_phrase: &'static str,
    task: TaskType,
}

const TASK_RULES: &[TaskRule] = &[
    TaskRule { id_token: Some("t2i"), name_phrase: "Text to Image", task: TaskType::T2i },
    TaskRule { id_token: Some("i2i"), name_phrase: "Image to Image", task: TaskType::I2i },
    TaskRule { id_token: Some("i2v"), name_phrase: "Image to Video", task: TaskType::I2v },
    TaskRule { id_token: Some("v2v"), name_phrase: "Video to Video", task: TaskType::V2v },
    TaskRule { id_token: Some("t2v"), name_phrase: "Text to Video", task: TaskType::T2v },
    TaskRule { id_token: Some("t2s"), name_phrase: "Text to Speech", task: TaskType::T2s },
    TaskRule { id_token: Some("s2v"), name_phrase: "Speech to Video", task: TaskType::S2v },
    TaskRule { id_token: None, name_phrase: "Minimatics", task: TaskType::Minimatics },
    TaskRule { id_token: None, name_phrase: "Character Models", task: TaskType::CharacterModels },
    TaskRule { id_token: None, name_phrase: "Sound Effects", task: TaskType::SoundEffects },
];

pub fn classify_model_type(model_id: Option<&str>, model_name: Option<&str>) -> TaskType {
    let id = model_id.unwrap_or_default().to_lowercase();
    let name = model_name.unwrap_or_default();

    TASK_RULES
        .iter()
        .find(|rule| {
            rule.id_token.is_some_and(|tok| id.contains(tok)) || name.contains(rule.name_phrase)
        })
        .map(|rule| rule.task)
        .unwrap_or(TaskType::Unknown)
}

pub const UNKNOWN_T2S_MODEL: &str = "unknown_t2s_model";
pub const UNKNOWN_OPENAI_MODEL: &str = "unknown_openai_model";
pub const UNKNOWN_REPLICATE_MODEL: &str = "unknown_replicate_model";

struct TitleRule {
    task: TaskType,
    /// Upper-cased provider the rule is restricted to.
    provider: Option<&'static str>,
    resolve: fn(&JobRecord, TaskType) -> Option<String>,
    sentinel: &'static str,
}

const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        task: TaskType::T2s,
        provider: None,
        resolve: tts_model_from_inputs,
        sentinel: UNKNOWN_T2S_MODEL,
    },
    TitleRule {
        task: TaskType::I2i,
        provider: Some("OPENAI"),
        resolve: openai_model_id,
        sentinel: UNKNOWN_OPENAI_MODEL,
    },
    TitleRule {
        task: TaskType::I2i,
        provider: Some("REPLICATE"),
        resolve: replicate_model_id,
        sentinel: UNKNOWN_REPLICATE_MODEL,
    },
];

/// Resolves the human-facing title. Falls through to `modelConfig.modelTitle`
/// when no provider/task rule applies, which may be absent.
pub fn extract_model_title(record: &JobRecord, task: TaskType) -> Option<String> {
    let provider = record.provider().unwrap_or_default().to_uppercase();

    for rule in TITLE_RULES {
        if rule.task != task {
            continue;
        }
        if rule.provider.is_some_and(|p| p != provider) {
            continue;
        }
        let title = (rule.resolve)(record, task)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| rule.sentinel.to_string());
        return Some(title);
    }

    record.model_title().map(str::to_owned)
}

fn tts_model_from_inputs(record: &JobRecord, _task: TaskType) -> Option<String> {
    let params = InputParams::from_value(record.inputs()?)?;
    params.find_model().filter(|v| lenient::is_truthy(v)).map(lenient::display)
}

fn openai_model_id(record: &JobRecord, _task: TaskType) -> Option<String> {
    record.openai_model_id().map(str::to_owned)
}

fn replicate_model_id(record: &JobRecord, task: TaskType) -> Option<String> {
    let id = record.model_id().filter(|id| !id.is_empty())?;
    let prefix = format!("{}-", task.as_str());
    Some(id.strip_prefix(prefix.as_str()).unwrap_or(id).to_string())
}

/// `modelConfig.inputs` comes either as a key → value map or as a list of
/// `{id, value, defaultValue}` parameter records.
enum InputParams<'a> {
    Map(&'a serde_json::Map<String, Value>),
    List(&'a [Value]),
}

impl<'a> InputParams<'a> {
    fn from_value(v: &'a Value) -> Option<Self> {
        match v {
            Value::Object(m) => Some(InputParams::Map(m)),
            Value::Array(items) => Some(InputParams::List(items)),
            _ => None,
        }
    }

    /// `tts_model` by exact (case-insensitive) name first, then any name containing `model`.
    fn find_model(&self) -> Option<&'a Value> {
        self.find(|name| name == "tts_model")
            .or_else(|| self.find(|name| name.contains("model")))
    }

    fn find(&self, pred: impl Fn(&str) -> bool) -> Option<&'a Value> {
        match self {
            InputParams::Map(m) => m
                .iter()
                .find(|(k, _)| pred(&k.to_lowercase()))
                .map(|(_, v)| v),
            InputParams::List(items) => items
                .iter()
                .filter_map(Value::as_object)
                .find(|item| {
                    let id = item.get("id").map(lenient::display).unwrap_or_default();
                    pred(&id.to_lowercase())
                })
                .map(|item| {
                    match item.get("value").filter(|v| lenient::is_truthy(v)) {
                        Some(v) => v,
                        None => item.get("defaultValue").unwrap_or(&Value::Null),
                    }
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(doc: Value) -> JobRecord {
        JobRecord::from_document(doc)
    }

    #[test]
    fn test_classify_by_id_case_insensitive() {
        assert_eq!(classify_model_type(Some("FLUX-T2I-pro"), None), TaskType::T2i);
        assert_eq!(classify_model_type(Some("kling-i2v"), None), TaskType::I2v);
        assert_eq!(classify_model_type(Some("eleven-t2s"), None), TaskType::T2s);
    }

    #[test]
    fn test_classify_by_name_phrase() {
        assert_eq!(classify_model_type(None, Some("Veo 3 Text to Video")), TaskType::T2v);
        assert_eq!(classify_model_type(Some(""), Some("Minimatics Studio")), TaskType::Minimatics);
        assert_eq!(
            classify_model_type(None, Some("Character Models")),
            TaskType::CharacterModels
        );
        assert_eq!(classify_model_type(None, Some("Sound Effects v2")), TaskType::SoundEffects);
    }

    #[test]
    fn test_name_phrase_is_case_sensitive() {
        assert_eq!(classify_model_type(None, Some("text to image")), TaskType::Unknown);
    }

    #[test]
    fn test_rule_order_decides_overlaps() {
        // both t2i and t2v present: t2i is listed first
        assert_eq!(classify_model_type(Some("combo-t2v-t2i"), None), TaskType::T2i);
        // id rule for i2v beats a later name phrase
        assert_eq!(classify_model_type(Some("x-i2v"), Some("Text to Speech")), TaskType::I2v);
        // an earlier name phrase beats a later id token
        assert_eq!(classify_model_type(Some("x-t2s"), Some("Image to Image")), TaskType::I2i);
    }

    #[test]
    fn test_unknown_when_nothing_matches() {
        assert_eq!(classify_model_type(None, None), TaskType::Unknown);
        assert_eq!(classify_model_type(Some("upscaler"), Some("Upscale")), TaskType::Unknown);
    }

    #[test]
    fn test_t2s_title_from_map_inputs() {
        let r = record(json!({"modelConfig": {"inputs": {"voice": "x", "TTS_Model": "eleven_v3", "model_alt": "y"}}}));
        assert_eq!(extract_model_title(&r, TaskType::T2s).as_deref(), Some("eleven_v3"));

        let r = record(json!({"modelConfig": {"inputs": {"voice": "x", "speech_model": "eleven_turbo"}}}));
        assert_eq!(extract_model_title(&r, TaskType::T2s).as_deref(), Some("eleven_turbo"));
    }

    #[test]
    fn test_t2s_title_from_list_inputs_uses_default_value() {
        let r = record(json!({"modelConfig": {"inputs": [
            {"id": "text", "value": "hello"},
            {"id": "tts_model", "value": "", "defaultValue": "eleven_multilingual_v2"}
        ]}}));
        assert_eq!(
            extract_model_title(&r, TaskType::T2s).as_deref(),
            Some("eleven_multilingual_v2")
        );
    }

    #[test]
    fn test_t2s_title_sentinel() {
        let r = record(json!({"modelConfig": {"inputs": [{"id": "voice", "value": "v"}]}}));
        assert_eq!(extract_model_title(&r, TaskType::T2s).as_deref(), Some(UNKNOWN_T2S_MODEL));

        // an exact tts_model hit with an empty value does not fall through to other keys
        let r = record(json!({"modelConfig": {"inputs": {"tts_model": "", "voice_model": "v2"}}}));
        assert_eq!(extract_model_title(&r, TaskType::T2s).as_deref(), Some(UNKNOWN_T2S_MODEL));

        let r = record(json!({"modelConfig": {"modelTitle": "ElevenLabs"}}));
        assert_eq!(extract_model_title(&r, TaskType::T2s).as_deref(), Some(UNKNOWN_T2S_MODEL));
    }

    #[test]
    fn test_openai_i2i_uses_metadata_not_model_id() {
        let r = record(json!({"modelConfig": {
            "id": "i2i-gpt", "provider": "openai", "modelTitle": "GPT Image",
            "modelMetaData": {"openAIModelId": "gpt-image-1"}
        }}));
        assert_eq!(extract_model_title(&r, TaskType::I2i).as_deref(), Some("gpt-image-1"));

        let r = record(json!({"modelConfig": {"id": "i2i-gpt", "provider": "OPENAI"}}));
        assert_eq!(extract_model_title(&r, TaskType::I2i).as_deref(), Some(UNKNOWN_OPENAI_MODEL));
    }

    #[test]
    fn test_replicate_i2i_strips_prefix() {
        let r = record(json!({"modelConfig": {"id": "i2i-foo-model", "provider": "Replicate"}}));
        assert_eq!(extract_model_title(&r, TaskType::I2i).as_deref(), Some("foo-model"));

        let r = record(json!({"modelConfig": {"id": "flux-kontext", "provider": "REPLICATE"}}));
        assert_eq!(extract_model_title(&r, TaskType::I2i).as_deref(), Some("flux-kontext"));

        let r = record(json!({"modelConfig": {"provider": "REPLICATE", "modelTitle": "x"}}));
        assert_eq!(
            extract_model_title(&r, TaskType::I2i).as_deref(),
            Some(UNKNOWN_REPLICATE_MODEL)
        );
    }

    #[test]
    fn test_fallback_to_declared_title() {
        let r = record(json!({"modelConfig": {"id": "i2i-x", "provider": "FAL", "modelTitle": "Seedream"}}));
        assert_eq!(extract_model_title(&r, TaskType::I2i).as_deref(), Some("Seedream"));

        let r = record(json!({"modelConfig": {"provider": "OPENAI", "modelTitle": "Sora"}}));
        assert_eq!(extract_model_title(&r, TaskType::T2v).as_deref(), Some("Sora"));

        let r = record(json!({}));
        assert_eq!(extract_model_title(&r, TaskType::Unknown), None);
    }
}
