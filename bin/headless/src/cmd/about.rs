//! About command - prints name, version and homepage

use color_eyre::eyre::Result;
use headless_core::{Config, Environment, PublishConfig};

/// Run the about command.
pub fn run() -> Result<()> {
    let about = PublishConfig::resolve(&Config::default(), Environment::Staging);

    println!("{} {}", about.name, about.version);
    println!();
    println!("  Publishes CMS content as JSON and an XML sitemap to remote storage,");
    println!("  then notifies the front end through a webhook.");
    println!();
    println!("  Homepage: {}", about.homepage_link);

    Ok(())
}
