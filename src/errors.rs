use thiserror::Error;

/// Errors raised by the interaction engine.
///
/// Expected failure modes (element absent, strategy mismatch, timeout while
/// waiting) are reported through outcome objects, not through this type;
/// `EngineError` surfaces only where no meaningful context remains to
/// continue in: frame resolution the caller explicitly requested that cannot
/// be satisfied, malformed descriptors, and substrate faults.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no locating strategies provided")]
    NoStrategiesProvided,

    #[error("cannot build a locator from descriptor '{descriptor}': {reason}")]
    LocatorConstructionFailed { descriptor: String, reason: String },

    #[error("element located by '{strategy}' is not actionable: {reason}")]
    ElementNotActionable { strategy: String, reason: String },

    #[error("fill via '{strategy}' failed: {reason}")]
    FillFailed { strategy: String, reason: String },

    #[error("iframe step {step} matched nothing within {timeout_ms}ms: {detail}")]
    FrameNotFound {
        step: usize,
        timeout_ms: u64,
        detail: String,
    },

    #[error("iframe at step {step} resolved but its document is unreachable")]
    FrameDetached { step: usize },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("all {count} strategies exhausted: {attempted:?}")]
    AllStrategiesExhausted { count: usize, attempted: Vec<String> },

    #[error("WebDriver failure: {0}")]
    WebDriverFailed(String),
}

impl EngineError {
    /// Stable machine-readable code, used as the `reason` field of JSON
    /// outcomes.
    pub fn reason(&self) -> &'static str {
        match self {
            EngineError::NoStrategiesProvided => "no_strategies_provided",
            EngineError::LocatorConstructionFailed { .. } => "locator_construction_failed",
            EngineError::ElementNotActionable { .. } => "element_not_actionable",
            EngineError::FillFailed { .. } => "fill_failed",
            EngineError::FrameNotFound { .. } => "frame_not_found",
            EngineError::FrameDetached { .. } => "frame_detached",
            EngineError::Timeout { .. } => "timeout",
            EngineError::AllStrategiesExhausted { .. } => "all_strategies_exhausted",
            EngineError::WebDriverFailed(_) => "webdriver_failed",
        }
    }

    /// Process exit code for the CLI. Lookup failures, frame failures,
    /// connection failures and timeouts get distinct codes so shell callers
    /// can branch without parsing JSON.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::NoStrategiesProvided | EngineError::LocatorConstructionFailed { .. } => 2,
            EngineError::FrameNotFound { .. } | EngineError::FrameDetached { .. } => 3,
            EngineError::WebDriverFailed(_) => 4,
            EngineError::Timeout { .. } => 5,
            _ => 1,
        }
    }
}

impl From<fantoccini::error::CmdError> for EngineError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        EngineError::WebDriverFailed(err.to_string())
    }
}
