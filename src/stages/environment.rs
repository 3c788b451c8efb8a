//! Python virtual environment for the logger.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::shell::CommandSpec;

use super::{Stage, StageContext, StageName, StageReport};

/// Creates the virtual environment if it is missing, then installs the
/// logger's dependencies into it.
pub struct EnvironmentStage;

impl Stage for EnvironmentStage {
    fn name(&self) -> StageName {
        StageName::Environment
    }

    fn apply(&self, ctx: &mut StageContext<'_>) -> Result<StageReport> {
        let config = ctx.config;

        if ctx.root.exists(&config.venv_dir) {
            ctx.skip(format!(
                "virtual environment {} already exists",
                config.venv_dir.display()
            ));
        } else {
            ctx.run(
                CommandSpec::new(config.python.as_str())
                    .args(["-m", "venv"])
                    .arg(config.venv_dir.display().to_string()),
            )?;
        }

        {
            let mut venv = Activation::enter(ctx, &config.venv_dir);
            let python = config.venv_python().display().to_string();

            venv.run(CommandSpec::new(python.as_str()).args([
                "-m",
                "pip",
                "install",
                "--upgrade",
                "pip",
            ]))?;

            if venv.root.exists(&config.requirements) {
                venv.run(
                    CommandSpec::new(python.as_str())
                        .args(["-m", "pip", "install", "-r"])
                        .arg(config.requirements.display().to_string()),
                )?;
            } else {
                venv.skip(format!(
                    "no requirements file at {}",
                    config.requirements.display()
                ));
            }
        }

        Ok(ctx.finish(self.name()))
    }
}

/// An activated virtual environment.
///
/// While the guard lives, every command run through the context sees
/// `VIRTUAL_ENV` and a `PATH` starting with the environment's `bin`
/// directory. Dropping the guard restores the previous overrides, whether
/// the scope ends normally or through `?`.
pub struct Activation<'c, 'a> {
    ctx: &'c mut StageContext<'a>,
    saved: Vec<(String, Option<String>)>,
}

impl<'c, 'a> Activation<'c, 'a> {
    pub fn enter(ctx: &'c mut StageContext<'a>, venv: &Path) -> Self {
        let bin = venv.join("bin");
        let inherited = ctx
            .env()
            .get("PATH")
            .cloned()
            .or_else(|| std::env::var("PATH").ok())
            .unwrap_or_default();
        let path = if inherited.is_empty() {
            bin.display().to_string()
        } else {
            format!("{}:{}", bin.display(), inherited)
        };

        let mut saved = Vec::new();
        for (key, value) in [
            ("VIRTUAL_ENV", venv.display().to_string()),
            ("PATH", path),
        ] {
            let previous = ctx.env_mut().insert(key.to_string(), value);
            saved.push((key.to_string(), previous));
        }

        info!("Activated virtual environment {}", venv.display());
        Self { ctx, saved }
    }
}

impl<'a> Deref for Activation<'_, 'a> {
    type Target = StageContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for Activation<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for Activation<'_, '_> {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            match previous {
                Some(value) => {
                    self.ctx.env_mut().insert(key, value);
                }
                None => {
                    self.ctx.env_mut().remove(&key);
                }
            }
        }
        debug!("Deactivated virtual environment");
    }
}
