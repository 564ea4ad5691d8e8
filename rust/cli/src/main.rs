use std::io;

fn main() {
    pontoon_cli::logging::init_logging();
    let code = pontoon_cli::run(std::env::args(), &mut io::stdout(), &mut io::stderr());
    std::process::exit(code);
}
