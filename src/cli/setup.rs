use crate::{Res, config::Config, db::Database, success};

pub fn setup(config: &Config) -> Res<()> {
    Database::open(&config.database_path)?;
    success!("Database ready at {}", config.database_path.display());
    Ok(())
}
