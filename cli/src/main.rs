use clap::Parser;
use ir::Module;
use rulecast::Config;

fn main() {
    env_logger::init();
    let cfg = Config::parse();

    // Parsing an on-disk LLIR module is out of scope (spec §1); a real
    // deployment plugs that parser in here and passes its `Module` to
    // `rulecast::run`. This binary exercises the CLI surface and
    // exit-code mapping against an empty module.
    let module = Module::default();

    match rulecast::run(&cfg, &module) {
        Ok(text) => print!("{text}"),
        Err(err) => {
            log::error!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}
