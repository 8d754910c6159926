use std::path::Path;

use earl_core::EarlConfig;

pub fn init(path: &str, min: f64, max: f64) -> anyhow::Result<()> {
    let output = Path::new(path).join("earl.toml");
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    let config = EarlConfig::scaffold(min, max);
    config.policy.to_policy()?;
    std::fs::write(&output, config.to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}
