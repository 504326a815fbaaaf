use accessequity::app::EquityCliArguments;
use clap::Parser;

fn main() {
    env_logger::init();
    let args = EquityCliArguments::parse();
    match args.op.run() {
        Ok(_) => log::info!("finished."),
        Err(e) => {
            log::error!("failed running accessequity: {e}");
            std::process::exit(1);
        }
    }
}
