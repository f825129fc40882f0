//! docweave CLI - publish extracted doclets as a documentation site

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use docweave_core::{publish, Config, HtmlRenderer, Input, PublishOptions};

mod logging;

#[derive(Parser, Debug)]
#[command(name = "docweave")]
#[command(version = docweave_core::VERSION)]
#[command(about = "Turn extracted doclets into a cross-linked documentation site", long_about = None)]
struct Cli {
    /// Extractor output: a JSON document with `doclets` and `tutorials`
    input: PathBuf,

    /// Output root for the generated site
    #[arg(short, long, default_value = "out")]
    destination: PathBuf,

    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    configure: Option<PathBuf>,

    /// Template directory whose `static/` folder is copied into the output
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// README shown on the home page, as rendered HTML
    #[arg(short = 'R', long)]
    readme: Option<PathBuf>,

    /// Site title appended to every page title
    #[arg(long, default_value = "Documentation")]
    title: String,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = load_config(cli.configure.as_deref())?;
    if cli.show_config {
        let toml = config
            .to_toml_string()
            .context("Failed to serialize configuration")?;
        print!("{}", toml);
        return Ok(());
    }

    let input = Input::from_path(&cli.input)
        .with_context(|| format!("Failed to load input '{}'", cli.input.display()))?;

    let readme = match &cli.readme {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read README '{}'", path.display()))?,
        ),
        None => None,
    };

    let options = PublishOptions {
        destination: cli.destination.clone(),
        template_dir: cli.template.clone(),
        base_dir: base_dir(cli.configure.as_deref()),
        readme,
    };

    let renderer = HtmlRenderer::new(cli.title.clone());
    let report = publish(input, &config, &options, &renderer)
        .context("Failed to publish documentation")?;

    println!(
        "Generated {} page(s) in {}",
        report.pages.len(),
        report.output_dir.display()
    );
    if report.skipped_sources > 0 {
        println!("Skipped {} unreadable source file(s)", report.skipped_sources);
    }
    if report.assets.failed > 0 {
        println!("{} static file(s) could not be copied", report.assets.failed);
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("Failed to load configuration '{}'", path.display())),
        None => Ok(Config::default()),
    }
}

/// Static-file globs are relative to the configuration file's directory
fn base_dir(config: Option<&Path>) -> PathBuf {
    config
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "docweave",
            "doclets.json",
            "-d",
            "site",
            "-c",
            "conf/docweave.toml",
            "-R",
            "README.html",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.input, PathBuf::from("doclets.json"));
        assert_eq!(cli.destination, PathBuf::from("site"));
        assert_eq!(cli.readme, Some(PathBuf::from("README.html")));
        assert!(cli.verbose);
        assert_eq!(cli.title, "Documentation");
    }

    #[test]
    fn test_destination_defaults_to_out() {
        let cli = Cli::try_parse_from(["docweave", "doclets.json"]).unwrap();
        assert_eq!(cli.destination, PathBuf::from("out"));
        assert!(cli.configure.is_none());
    }

    #[test]
    fn test_base_dir() {
        assert_eq!(base_dir(None), PathBuf::from("."));
        assert_eq!(base_dir(Some(Path::new("docweave.toml"))), PathBuf::from("."));
        assert_eq!(
            base_dir(Some(Path::new("conf/docweave.toml"))),
            PathBuf::from("conf")
        );
    }

    #[test]
    fn test_load_config_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docweave.toml");
        std::fs::write(&path, "[template]\nbogus = 1\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("docweave.toml"));
    }
}
