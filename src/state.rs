use std::sync::Arc;

use policy_gate_config::GateConfig;
use policy_gate_core::GateError;

use crate::gate::{Gate, GateBuilder};

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<Gate>,
}

impl AppState {
    pub fn new(gate: Gate) -> Self {
        Self {
            gate: Arc::new(gate),
        }
    }
}

pub async fn init_app_state(config: &GateConfig) -> Result<AppState, GateError> {
    let gate = GateBuilder::from_config(config).build().await?;
    Ok(AppState::new(gate))
}
