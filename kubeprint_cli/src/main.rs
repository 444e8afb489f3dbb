#[macro_use] extern crate clap;
#[macro_use] extern crate log;

use kubeprint::*;
use clap::{Arg, App, AppSettings, SubCommand, ArgMatches};
use std::path::Path;
use std::process;

fn print_error_debug(e: &Error) {
    // print causes of error if present
    for e in e.iter().skip(1) {
        warn!("caused by: {}", e);
    }
}

#[tokio::main]
async fn main() {
    let app = App::new("kubeprint")
        .version(crate_version!())
        .setting(AppSettings::VersionlessSubcommands)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::ColoredHelp)
        .setting(AppSettings::DeriveDisplayOrder)
        .global_settings(&[AppSettings::ColoredHelp])
        .about("Compose kubernetes clusters out of ordered addons")
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .global(true)
            .help("Increase verbosity"))
        .arg(Arg::with_name("debug")
            .short("d")
            .long("debug")
            .global(true)
            .help("Adds line numbers to log statements"))
        .arg(Arg::with_name("file")
            .short("f")
            .long("file")
            .takes_value(true)
            .global(true)
            .help("Blueprint file to use (defaults to blueprint.yml)"))

        .subcommand(SubCommand::with_name("synth")
            .about("Build the blueprint and print the resulting construct graph")
            .arg(Arg::with_name("dot")
                .long("dot")
                .help("Generate dot output for graphviz")))

        .subcommand(SubCommand::with_name("validate")
            .about("Verify the blueprint file and run a full build"))

        .subcommand(SubCommand::with_name("status")
            .arg(Arg::with_name("json")
                .long("json")
                .help("Output the states as json"))
            .about("Build the blueprint and print the state of every addon"))

        .subcommand(SubCommand::with_name("list-addons")
            .arg(Arg::with_name("metadata")
                .long("metadata")
                .short("m")
                .help("Include dependencies, conflicts and architectures"))
            .about("List the addons of the blueprint in deployment order"));

    let args = app.get_matches();
    let name = args.subcommand_name().unwrap_or("kubeprint").to_string();
    if let Err(e) = run(&args).await {
        error!("{} error: {}", name, e);
        print_error_debug(&e);
        process::exit(1);
    }
    process::exit(0);
}

async fn run(args: &ArgMatches<'_>) -> Result<()> {
    // initialise deps and set log default - always show INFO messages (+1)
    loggerv::Logger::new()
        .verbosity(args.occurrences_of("verbose") + 1)
        .module_path(true)
        .line_numbers(args.is_present("debug"))
        .init()
        .map_err(|e| ErrorKind::Msg(format!("failed to set up logging: {}", e)))?;
    kubeprint::init()?;

    // Ignore SIGPIPE errors to avoid having to use let _ = write! everywhere
    // See https://github.com/rust-lang/rust/issues/46016
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    // Dispatch arguments to internal handlers. Pass on handled result.
    dispatch_commands(args).await
}

/// Read the blueprint file from a global "file" Arg or the default location
fn resolve_blueprint(args: &ArgMatches) -> Result<BlueprintConfig> {
    let conf = if let Some(f) = args.value_of("file") {
        BlueprintConfig::read_from(Path::new(f))?
    } else {
        BlueprintConfig::read()?
    };
    Ok(conf)
}

/// Dispatch clap arguments to kubeprint handlers
async fn dispatch_commands(args: &ArgMatches<'_>) -> Result<()> {
    if let Some(a) = args.subcommand_matches("list-addons") {
        let conf = resolve_blueprint(a)?;
        if a.is_present("metadata") {
            return kubeprint::list::registry(&conf);
        }
        return kubeprint::list::addons(&conf);
    }
    else if let Some(a) = args.subcommand_matches("validate") {
        let conf = resolve_blueprint(a)?;
        let bp = kubeprint::filebacked::builder(&conf).build().await?;
        info!("{} is valid ({} constructs)", conf.name, bp.stack().len());
        return Ok(());
    }
    else if let Some(a) = args.subcommand_matches("status") {
        let conf = resolve_blueprint(a)?;
        let builder = kubeprint::filebacked::builder(&conf);
        let mut bp = builder.prepare()?;
        // states are printed even when the build fails
        let res = builder.provision(&mut bp).await;
        kubeprint::list::states(&bp, a.is_present("json"))?;
        return res;
    }
    else if let Some(a) = args.subcommand_matches("synth") {
        let conf = resolve_blueprint(a)?;
        let bp = kubeprint::filebacked::builder(&conf).build().await?;
        let out = if a.is_present("dot") {
            bp.stack().to_dot()
        } else {
            bp.stack().to_yaml()?
        };
        println!("{}", out);
        return Ok(());
    }
    unreachable!("Subcommand valid, but not implemented")
}
