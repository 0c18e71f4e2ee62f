pub mod types;
pub mod ground;
pub mod physics;
pub mod murayama;
pub mod config;
pub mod analysis;

pub use types::*;
pub use ground::{ConfigurationError, GroundParameters, GroundParametersInput, Strength};
pub use murayama::{
    CentroidMethod, CriticalResult, CriticalSearch, FaceStability, ModelOptions, PressureEvaluation,
    PressureResult, PressureSolver, SafetyFactorResult, SafetyFactorSettings, SafetyFactorSolver,
    SearchError, SearchRange, SpiralGeometry,
};
pub use config::{AnalysisConfig, ConfigFileError};
pub use analysis::{AnalysisError, FaceStabilityAnalysis, FaceStabilityReport};
