/// Sampling values sent along with every chat request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tuning {
    pub temperature: f32,
    pub max_tokens: u32,
}

pub struct TuningProfile {
    pub name: &'static str,
    pub model_pattern: &'static str,
    pub tuning: Tuning,
}

pub const DEFAULT_PROFILE: TuningProfile = TuningProfile {
    name: "default",
    model_pattern: "",
    tuning: Tuning {
        temperature: 0.7,
        max_tokens: 1000,
    },
};

/// First profile whose pattern appears anywhere in the model id wins. Models
/// matching nothing use `DEFAULT_PROFILE`.
pub const TUNING_PROFILES: &[TuningProfile] = &[TuningProfile {
    name: "balanced",
    model_pattern: "deepseek",
    tuning: Tuning {
        temperature: 0.4,
        max_tokens: 800,
    },
}];

impl TuningProfile {
    pub fn for_model(model: &str) -> &'static TuningProfile {
        return TUNING_PROFILES
            .iter()
            .find(|profile| return model.contains(profile.model_pattern))
            .unwrap_or(&DEFAULT_PROFILE);
    }
}
