use crate::model::TaskType;

pub const DEFAULT_COLLECTION: &str = "assetGenJobs";
pub const DEFAULT_MAX_TIME_MS: u64 = 10_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 900;
pub const DEFAULT_TOP_N: usize = 8;

/// Task types selectable in the per-task breakdown.
pub const MAIN_MODEL_TYPES: [TaskType; 6] = [
    TaskType::T2i,
    TaskType::I2i,
    TaskType::I2v,
    TaskType::V2v,
    TaskType::T2v,
    TaskType::T2s,
];

/// Task types that keep their own bucket in the overview; everything else is `other`.
pub const AGG_MODEL_TYPES: [TaskType; 5] = [
    TaskType::T2i,
    TaskType::I2i,
    TaskType::I2v,
    TaskType::V2v,
    TaskType::T2v,
];

/// Label used for the folded tail of a top-N series.
pub const OTHER_LABEL: &str = "Other";

/// Field paths the fetcher asks the store for.
pub const BASE_PROJECTION: &[&str] = &[
    "_id",
    "jobId",
    "userId",
    "createdAt",
    "updatedAt",
    "status",
    "modelConfig.id",
    "modelConfig.name",
    "modelConfig.modelTitle",
    "modelConfig.modelType",
    "modelConfig.outputType",
    "modelConfig.provider",
    "modelConfig.inputs",
    "modelConfig.costConfig.defaultCost",
    "modelConfig.costConfig.rules",
    "modelConfig.modelMetaData.openAIModelId",
    "qualityAnalysis.score",
    "qualityAnalysis.rewrittenPrompt",
    "qualityAnalysis.reasoning",
    "qualityAnalysis.transformedScore",
    "qualityAnalysis.qualityCheckStatus",
    "resultDownloadedAt",
    "error.code",
    "error.message",
];
