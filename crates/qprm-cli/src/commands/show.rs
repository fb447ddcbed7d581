use crate::cli::ShowArgs;
use crate::config::PartialConversionConfig;
use crate::error::Result;
use qprm::core::params::ParamClass;
use qprm::core::store::ParameterStore;
use qprm::workflows::convert;
use tracing::info;

pub fn run(args: ShowArgs) -> Result<()> {
    let partial_config = PartialConversionConfig::load(&args.inputs)?;
    let mut config = partial_config.merge_with_cli(&args.inputs, None)?;
    config.output = None;

    let outcome = convert::run(&config)?;
    let store = outcome.repository.store();
    info!("Loaded {} parameters.", store.len());

    print!("{}", summary(store));

    if args.print {
        println!();
        print!("{}", outcome.repository.to_prm_string());
    }
    Ok(())
}

fn summary(store: &ParameterStore) -> String {
    let scaling = store.ff_type().scaling_14();
    let mut lines = vec![
        format!("Force field: {}", store.ff_type()),
        format!(
            "1-4 scaling: electrostatic {:.4}, vdW {:.4}",
            scaling.electrostatic, scaling.vdw
        ),
        format!("{:<20} {:>8}", "options", store.options().len()),
    ];
    for class in ParamClass::ALL {
        lines.push(format!("{:<20} {:>8}", class.name(), store.class_len(class)));
    }
    lines.push(format!("{:<20} {:>8}", "total", store.len()));
    lines.join("\n") + "\n"
}
