use crate::cli::ConvertArgs;
use crate::config::PartialConversionConfig;
use crate::error::{CliError, Result};
use qprm::core::params::Parameter;
use qprm::workflows::convert;
use tracing::{info, warn};

pub fn run(args: ConvertArgs) -> Result<()> {
    let partial_config = PartialConversionConfig::load(&args.inputs)?;
    info!("Merging configuration from job file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args.inputs, args.output.as_deref())?;

    let Some(output) = config.output.clone() else {
        return Err(CliError::Config(
            "An output path is required either in the job file (`output`) or via --output."
                .to_string(),
        ));
    };

    println!(
        "Converting {} input file(s) into a '{}' parameter set...",
        config.inputs.len(),
        config.ff_type
    );
    let outcome = convert::run(&config)?;

    for (input, report) in config.inputs.iter().zip(&outcome.reports) {
        println!(
            "  ✓ {} {}: {} new, {} duplicate, {} overwritten",
            input.format,
            input.path.display(),
            report.inserted,
            report.duplicates,
            report.overwritten.len()
        );
        for previous in &report.overwritten {
            warn!("Overwritten by {}: {}", input.path.display(), previous);
            println!("      replaced {} {}", previous.class(), previous.identity());
        }
    }

    println!(
        "✓ {} parameters written to: {}",
        outcome.repository.store().len(),
        output.display()
    );
    Ok(())
}
