use dotenvy::dotenv;
use policy_gate::logging::init_tracing;
use policy_gate::metrics::{init_metrics, metrics_app};
use policy_gate::policy_gate_config::{GateConfig, ServerConfig};
use policy_gate::router::init_router;
use policy_gate::state::init_app_state;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let gate_config = GateConfig::from_env();
    let server_config = ServerConfig::from_env();

    let state = init_app_state(&gate_config).await?;
    info!(
        model = %gate_config.model_path,
        policy = ?gate_config.policy_path,
        roles_header = gate_config.roles_header_enabled,
        default_role = %gate_config.default_role,
        "Authorization gate ready"
    );

    let mut app = init_router(state);
    if let Some(handle) = init_metrics() {
        app = app.merge(metrics_app(handle));
    }

    let address = server_config.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
