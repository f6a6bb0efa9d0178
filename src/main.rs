fn main() {
    if let Err(err) = neuvo::cli::main() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
