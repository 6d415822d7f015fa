use std::fs;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

struct Args {
    iterations: usize,
    schema_path: String,
    instance_path: Option<String>,
    method: String,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    Ok(Args {
        iterations: args.opt_value_from_str("--iterations")?.unwrap_or(10_000),
        schema_path: args.value_from_str("--schema")?,
        instance_path: args.opt_value_from_str("--instance")?,
        method: args.value_from_str("--method")?,
    })
}

fn read_json(path: &str) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;
    let schema = read_json(&args.schema_path)?;

    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    match args.method.as_str() {
        "build" => {
            for _ in 0..args.iterations {
                let _ = jsonschema_predicate::validator_for(&schema)?;
            }
        }
        "is_valid" => {
            let Some(path) = &args.instance_path else {
                return Err("`--instance` is required for `is_valid`".into());
            };
            let instance = read_json(path)?;
            let predicate = jsonschema_predicate::validator_for(&schema)?;
            for _ in 0..args.iterations {
                let _ = predicate.is_valid(&instance);
            }
        }
        "inspect" => {
            let source = jsonschema_predicate::options().inspect(&schema)?;
            #[allow(clippy::print_stdout)]
            {
                println!("{source}");
            }
        }
        method => return Err(format!("Unknown method: {method}").into()),
    }
    Ok(())
}
