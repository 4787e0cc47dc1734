use crate::{Res, cli::auth_flow, config::Config, success};

pub async fn auth(config: &Config) -> Res<()> {
    let flow = auth_flow(config);
    flow.get_valid_access_token().await?;
    success!(
        "Authentication successful! Credentials stored in {}",
        flow.store().path().display()
    );
    Ok(())
}
