use crate::logic::SimulationPlan;

pub mod edge;
pub mod smoke;
pub mod strategies;

/// A named plan run once per seed and iteration.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const SCENARIOS: &[(&str, &str)] = &[
    ("smoke", "Smoke Test"),
    ("oracle-never-pops", "Oracle Never Pops"),
    ("greedy-always-pops", "Greedy Always Pops"),
    ("timid-banker", "Timid Banker"),
    ("adaptive-learner", "Adaptive Learner"),
    ("empty-session", "Empty Session"),
    ("fixed-binding", "Fixed Binding"),
    ("share-code-replay", "Share Code Replay"),
];

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let plan = match name.to_lowercase().as_str() {
        "smoke" => smoke::plan(),
        "oracle-never-pops" | "oracle" => strategies::oracle_plan(),
        "greedy-always-pops" | "greedy" => strategies::greedy_plan(),
        "timid-banker" | "timid" => strategies::timid_plan(),
        "adaptive-learner" | "adaptive" => strategies::adaptive_plan(),
        "empty-session" | "empty" => edge::empty_session_plan(),
        "fixed-binding" | "fixed" => edge::fixed_binding_plan(),
        "share-code-replay" | "share-code" => edge::share_code_replay_plan(),
        _ => return None,
    };
    let key = name.to_lowercase();
    let title = SCENARIOS
        .iter()
        .find(|(k, _)| *k == key || k.starts_with(&format!("{key}-")))
        .map_or(name, |(_, title)| *title);
    Some(TestScenario::simulation(title, plan))
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.to_vec()
}

/// Every registered scenario key, in listing order.
pub fn all_scenario_keys() -> impl Iterator<Item = &'static str> {
    SCENARIOS.iter().map(|(key, _)| *key)
}
