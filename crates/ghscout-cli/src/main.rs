fn main() {
    if let Err(error) = ghscout_cli::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
