//! A thin demonstration binary wiring a canned `transc_front::TranslationUnit`
//! through `transc::translate` and `transc_target::render`. It does *not*
//! drive a real C front-end (spec §1 scopes that out); it exists only so the
//! workspace has an executable surface to smoke-test, the way `rustc` itself
//! sits atop the rest of the compiler in the teacher tree.

mod demos;

use clap::{App, Arg};
use std::fs;
use std::process;

fn main() {
    tracing_subscriber::fmt::init();

    let matches = App::new("transc")
        .about("Translates a canned C translation unit to Target source, for smoke-testing the translator core")
        .arg(
            Arg::with_name("demo")
                .help("Which built-in translation unit to run")
                .possible_values(demos::NAMES)
                .default_value("typedef"),
        )
        .arg(
            Arg::with_name("list")
                .long("list")
                .help("List the available demo translation units and exit"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Write the rendered output here instead of stdout"),
        )
        .get_matches();

    if matches.is_present("list") {
        for name in demos::NAMES {
            println!("{}", name);
        }
        return;
    }

    let demo_name = matches.value_of("demo").unwrap();
    let unit = match demos::build(demo_name) {
        Some(unit) => unit,
        None => {
            eprintln!("error: no such demo `{}` (try --list)", demo_name);
            process::exit(1);
        }
    };

    let nodes = transc::translate(&unit);
    let rendered = transc_target::render(&nodes);

    match matches.value_of("output") {
        Some(path) => {
            if let Err(e) = fs::write(path, &rendered) {
                eprintln!("error: couldn't write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", rendered),
    }
}
